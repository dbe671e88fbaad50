// ABOUTME: Labels author, keywords, and category from meta tags, author links, and byline spans.
// ABOUTME: Also hosts the meta and JSON-LD lookups shared with the title and date labelers.

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::dom::{element, normalized_text, text_content, DomNode, ElementData, Snapshot};
use crate::labels::Label;

static BYLINE_CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)author|byline").unwrap());

/// Where an author value can come from, tried in order.
#[derive(Debug, Clone, Copy)]
enum AuthorSource {
    MetaName,
    MetaArticleAuthor,
    RelAuthorLink,
    BylineSpan,
}

const AUTHOR_SOURCES: &[AuthorSource] = &[
    AuthorSource::MetaName,
    AuthorSource::MetaArticleAuthor,
    AuthorSource::RelAuthorLink,
    AuthorSource::BylineSpan,
];

impl AuthorSource {
    fn find(self, snapshot: &Snapshot) -> Option<(NodeId, String)> {
        let node = match self {
            AuthorSource::MetaName => find_meta(snapshot, "name", "author"),
            AuthorSource::MetaArticleAuthor => find_meta(snapshot, "property", "article:author"),
            AuthorSource::RelAuthorLink => snapshot.find(|el| {
                el.is("a")
                    && el.attr("rel").is_some_and(|rel| {
                        rel.split_whitespace()
                            .any(|r| r.eq_ignore_ascii_case("author"))
                    })
            }),
            AuthorSource::BylineSpan => snapshot
                .find(|el| el.is("span") && el.classes().any(|c| BYLINE_CLASS_RE.is_match(c))),
        }?;
        let value = match self {
            AuthorSource::MetaName | AuthorSource::MetaArticleAuthor => meta_content(node)?,
            AuthorSource::RelAuthorLink | AuthorSource::BylineSpan => normalized_text(node),
        };
        (!value.is_empty()).then(|| (node.id(), value))
    }
}

/// First `<meta>` whose `attr` equals `value`, ignoring ASCII case.
pub fn find_meta<'a>(
    snapshot: &'a Snapshot,
    attr: &str,
    value: &str,
) -> Option<NodeRef<'a, DomNode>> {
    snapshot.find(|el| {
        el.is("meta")
            && el
                .attr(attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
    })
}

/// Trimmed, non-empty `content` attribute of a meta node.
pub fn meta_content(node: NodeRef<'_, DomNode>) -> Option<String> {
    let content = element(node)?.attr("content")?.trim();
    (!content.is_empty()).then(|| content.to_string())
}

fn is_ld_json(el: &ElementData) -> bool {
    el.is("script")
        && el
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
}

/// The first JSON-LD block, when its top level is a JSON object.
///
/// Only the first block is consulted; arrays and `@graph` wrappers are not
/// searched.
pub fn first_ld_json(snapshot: &Snapshot) -> Option<(NodeId, Map<String, Value>)> {
    let script = snapshot.find(is_ld_json)?;
    match serde_json::from_str::<Value>(text_content(script).trim()) {
        Ok(Value::Object(map)) => Some((script.id(), map)),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "ignoring malformed JSON-LD block");
            None
        }
    }
}

/// Split a comma-separated keyword list, keeping order and dropping blanks.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Label author, keywords, and category. Each kind is labeled at most once.
pub fn mark_metadata(snapshot: &mut Snapshot) {
    if let Some((id, author)) = AUTHOR_SOURCES.iter().find_map(|s| s.find(snapshot)) {
        debug!(%author, "author found");
        snapshot.apply_label(id, &Label::Author(author));
    }

    let keywords = find_meta(snapshot, "name", "keywords")
        .and_then(|node| meta_content(node).map(|c| (node.id(), split_keywords(&c))));
    if let Some((id, words)) = keywords {
        if !words.is_empty() {
            snapshot.apply_label(id, &Label::Keywords(words));
        }
    }

    let category = find_meta(snapshot, "property", "article:section")
        .and_then(|node| meta_content(node).map(|c| (node.id(), c)));
    if let Some((id, section)) = category {
        snapshot.apply_label(id, &Label::Category(section));
    }
}
