// ABOUTME: Role label schema written onto article documents under the reserved nr- attribute namespace.
// ABOUTME: Defines LabelKind, Label payloads, and helpers to apply and query labels on a Snapshot.

//! Label attributes.
//!
//! Every attribute the engine writes starts with `nr-`. Labels are attributes
//! on existing elements, so they survive serialization, cloning, and pruning
//! without a side table.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use ego_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::dom::{ElementData, Snapshot};

/// Element wrapping a single text node.
pub const TEXT_WRAPPER_TAG: &str = "nr-text";
/// Stable 0-based element identifier.
pub const NODE_ID_ATTR: &str = "nr-id";
/// 1-based text wrapper sequence number.
pub const SEQ_ATTR: &str = "nr-seq";

pub const TITLE_ATTR: &str = "nr-title";
pub const DATE_ATTR: &str = "nr-date";
pub const DATE_VALUE_ATTR: &str = "nr-date-value";
pub const CONTENT_ATTR: &str = "nr-content";
pub const CONTENT_TAG_ATTR: &str = "nr-content-tag";
pub const META_ATTR: &str = "nr-meta";
pub const META_VALUE_ATTR: &str = "nr-meta-value";

/// The role a labeled element plays in an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelKind {
    Title,
    Date,
    Author,
    Keywords,
    Category,
    Content,
    TableHeader,
    TableCell,
}

impl LabelKind {
    pub const ALL: [LabelKind; 8] = [
        LabelKind::Title,
        LabelKind::Date,
        LabelKind::Author,
        LabelKind::Keywords,
        LabelKind::Category,
        LabelKind::Content,
        LabelKind::TableHeader,
        LabelKind::TableCell,
    ];

    /// Attribute carrying this kind's marker.
    pub fn attr(self) -> &'static str {
        match self {
            LabelKind::Title => TITLE_ATTR,
            LabelKind::Date => DATE_ATTR,
            LabelKind::Author | LabelKind::Keywords | LabelKind::Category => META_ATTR,
            LabelKind::Content | LabelKind::TableHeader | LabelKind::TableCell => CONTENT_ATTR,
        }
    }

    /// Attribute value identifying this kind.
    pub fn marker(self) -> &'static str {
        match self {
            LabelKind::Title => "title",
            LabelKind::Date => "date",
            LabelKind::Author => "author",
            LabelKind::Keywords => "keywords",
            LabelKind::Category => "category",
            LabelKind::Content => "content",
            LabelKind::TableHeader => "table-header",
            LabelKind::TableCell => "table-cell",
        }
    }

    pub fn matches(self, el: &ElementData) -> bool {
        el.attr(self.attr()) == Some(self.marker())
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// A label together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Title,
    Date(DateTime<Utc>),
    Author(String),
    Keywords(Vec<String>),
    Category(String),
    /// Body text; `tag` is the element's original tag name.
    Content { tag: String },
    TableHeader,
    TableCell,
}

impl Label {
    pub fn kind(&self) -> LabelKind {
        match self {
            Label::Title => LabelKind::Title,
            Label::Date(_) => LabelKind::Date,
            Label::Author(_) => LabelKind::Author,
            Label::Keywords(_) => LabelKind::Keywords,
            Label::Category(_) => LabelKind::Category,
            Label::Content { .. } => LabelKind::Content,
            Label::TableHeader => LabelKind::TableHeader,
            Label::TableCell => LabelKind::TableCell,
        }
    }

    fn write_to(&self, el: &mut ElementData) {
        let kind = self.kind();
        el.set_attr(kind.attr(), kind.marker());
        match self {
            Label::Date(at) => {
                el.set_attr(DATE_VALUE_ATTR, at.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Label::Author(v) | Label::Category(v) => el.set_attr(META_VALUE_ATTR, v.as_str()),
            Label::Keywords(words) => {
                let encoded = serde_json::to_string(words).unwrap_or_else(|_| "[]".to_string());
                el.set_attr(META_VALUE_ATTR, encoded);
            }
            Label::Content { tag } => el.set_attr(CONTENT_TAG_ATTR, tag.as_str()),
            Label::Title | Label::TableHeader | Label::TableCell => {}
        }
    }
}

/// True if the element carries any role label.
pub fn has_any_label(el: &ElementData) -> bool {
    el.has_attr(TITLE_ATTR)
        || el.has_attr(DATE_ATTR)
        || el.has_attr(CONTENT_ATTR)
        || el.has_attr(META_ATTR)
}

impl Snapshot {
    /// Write a label onto an element. Returns false for non-element nodes.
    pub fn apply_label(&mut self, id: NodeId, label: &Label) -> bool {
        let Some(mut node) = self.tree_mut().get_mut(id) else {
            return false;
        };
        match node.value() {
            crate::dom::DomNode::Element(el) => {
                label.write_to(el);
                true
            }
            _ => false,
        }
    }

    /// Identifiers of every element labeled with `kind`.
    pub fn labeled_ids(&self, kind: LabelKind) -> BTreeSet<u64> {
        self.elements()
            .filter_map(|n| n.value().as_element())
            .filter(|el| kind.matches(el))
            .filter_map(|el| el.attr(NODE_ID_ATTR).and_then(|v| v.parse().ok()))
            .collect()
    }

    /// Count of elements labeled with `kind`.
    pub fn label_count(&self, kind: LabelKind) -> usize {
        self.elements()
            .filter_map(|n| n.value().as_element())
            .filter(|el| kind.matches(el))
            .count()
    }
}
