// ABOUTME: Serializable results: extracted article summaries, per-URL batch reports, and discovered groups.
// ABOUTME: ExtractedArticle is read back from the label attributes of a pruned document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discovery::{AnchorGroup, GroupFeatures, PaginationSession, SessionMode};
use crate::dom::{element, element_ancestors, normalized_text, text_content, Snapshot};
use crate::error::{ErrorCode, NewsroomError};
use crate::formats::render;
use crate::labels::{
    LabelKind, CONTENT_TAG_ATTR, DATE_VALUE_ATTR, META_VALUE_ATTR, NODE_ID_ATTR,
};
use crate::options::ContentType;

/// One labeled body element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub id: u64,
    pub tag: String,
    pub text: String,
}

/// One labeled table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCellRecord {
    pub id: u64,
    pub kind: LabelKind,
    pub text: String,
}

/// What an article's labels say, plus its pruned markup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub content: Vec<ContentBlock>,
    pub table_cells: Vec<TableCellRecord>,
    /// The pruned document as HTML.
    pub clean_html: String,
    /// The pruned body rendered in the requested content type.
    pub rendered: String,
}

impl ExtractedArticle {
    /// Read every label back out of a pruned document.
    pub fn from_clean(url: &str, clean: &Snapshot, content_type: ContentType) -> Self {
        let mut article = ExtractedArticle {
            url: url.to_string(),
            clean_html: clean.html(),
            rendered: render(&clean.body_html(), content_type),
            ..Default::default()
        };

        for node in clean.elements() {
            let Some(el) = element(node) else {
                continue;
            };
            let id = el.attr(NODE_ID_ATTR).and_then(|v| v.parse().ok()).unwrap_or_default();

            if LabelKind::Title.matches(el) && article.title.is_none() {
                article.title = title_text(node);
            }
            if LabelKind::Date.matches(el) && article.date_published.is_none() {
                article.date_published = el
                    .attr(DATE_VALUE_ATTR)
                    .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                    .map(|d| d.with_timezone(&Utc));
            }
            if LabelKind::Author.matches(el) {
                article.author = el.attr(META_VALUE_ATTR).map(str::to_string);
            }
            if LabelKind::Category.matches(el) {
                article.category = el.attr(META_VALUE_ATTR).map(str::to_string);
            }
            if LabelKind::Keywords.matches(el) {
                article.keywords = el
                    .attr(META_VALUE_ATTR)
                    .and_then(|v| serde_json::from_str(v).ok())
                    .unwrap_or_default();
            }
            if LabelKind::Content.matches(el) {
                // Nested content labels are already covered by the outer block.
                let nested = element_ancestors(node)
                    .filter_map(element)
                    .any(|a| LabelKind::Content.matches(a));
                if !nested {
                    article.content.push(ContentBlock {
                        id,
                        tag: el.attr(CONTENT_TAG_ATTR).unwrap_or(el.name.as_str()).to_string(),
                        text: normalized_text(node),
                    });
                }
            }
            for kind in [LabelKind::TableHeader, LabelKind::TableCell] {
                if kind.matches(el) {
                    article.table_cells.push(TableCellRecord {
                        id,
                        kind,
                        text: normalized_text(node),
                    });
                }
            }
        }
        article
    }

    /// Body text blocks joined by blank lines.
    pub fn body_text(&self) -> String {
        self.content
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn has_title(&self) -> bool {
        self.title.as_ref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_date(&self) -> bool {
        self.date_published.is_some()
    }
}

/// Title text of a title-labeled node: meta content, JSON-LD headline, or element text.
fn title_text(node: ego_tree::NodeRef<'_, crate::dom::DomNode>) -> Option<String> {
    let el = element(node)?;
    if el.is("meta") {
        return el.attr("content").map(|c| c.trim().to_string());
    }
    if el.is("script") {
        let value: serde_json::Value = serde_json::from_str(text_content(node).trim()).ok()?;
        return value
            .get("headline")
            .and_then(|h| h.as_str())
            .map(|h| h.trim().to_string());
    }
    Some(normalized_text(node))
}

/// A URL whose extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    pub url: String,
    pub code: ErrorCode,
    pub message: String,
}

impl From<&NewsroomError> for ExtractionFailure {
    fn from(err: &NewsroomError) -> Self {
        Self {
            url: err.url.clone(),
            code: err.code,
            message: err.to_string(),
        }
    }
}

/// Outcome of one URL in a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArticleReport {
    Extracted(Box<ExtractedArticle>),
    Failed(ExtractionFailure),
}

impl ArticleReport {
    pub fn is_extracted(&self) -> bool {
        matches!(self, ArticleReport::Extracted(_))
    }

    pub fn url(&self) -> &str {
        match self {
            ArticleReport::Extracted(a) => &a.url,
            ArticleReport::Failed(f) => &f.url,
        }
    }
}

/// Summary of one discovered article-link group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredGroup {
    pub ancestry: String,
    pub urls: Vec<String>,
    pub hidden_ratio: f64,
    pub features: GroupFeatures,
}

impl From<&AnchorGroup> for DiscoveredGroup {
    fn from(group: &AnchorGroup) -> Self {
        Self {
            ancestry: group.ancestry.clone(),
            urls: group.urls.clone(),
            hidden_ratio: group.hidden_ratio(),
            features: group.features.clone(),
        }
    }
}

/// Summary of a finished discovery session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub base_url: String,
    pub mode: SessionMode,
    pub groups: Vec<DiscoveredGroup>,
    /// Every URL across groups, first occurrence order.
    pub urls: Vec<String>,
}

impl From<&PaginationSession> for DiscoveryReport {
    fn from(session: &PaginationSession) -> Self {
        Self {
            base_url: session.base_url.clone(),
            mode: session.mode,
            groups: session.discovered_groups.iter().map(DiscoveredGroup::from).collect(),
            urls: session.urls(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_labels_back() {
        let mut snap = Snapshot::parse(
            r#"<html><head><meta property="og:title" content=" Acme Q3 "><meta name="keywords" content="a"></head>
            <body><p nr-id="4">Outer <b nr-id="5">bold</b></p><table><tr><th nr-id="8">H</th></tr></table></body></html>"#,
        );
        let ids: Vec<_> = snap.elements().map(|n| n.id()).collect();
        for id in ids {
            let Some(el) = snap.get(id).and_then(element).cloned() else {
                continue;
            };
            let label = match el.name.as_str() {
                "meta" if el.attr("property").is_some() => Label::Title,
                "meta" => Label::Keywords(vec!["energy".into(), "grid".into()]),
                "p" => Label::Content { tag: "p".into() },
                "b" => Label::Content { tag: "b".into() },
                "th" => Label::TableHeader,
                _ => continue,
            };
            snap.apply_label(id, &label);
        }

        let article = ExtractedArticle::from_clean("https://acme.com/a", &snap, ContentType::Text);
        assert_eq!(article.title.as_deref(), Some("Acme Q3"));
        assert_eq!(article.keywords, vec!["energy", "grid"]);
        assert_eq!(
            article.content,
            vec![ContentBlock {
                id: 4,
                tag: "p".into(),
                text: "Outer bold".into()
            }]
        );
        assert_eq!(article.table_cells.len(), 1);
        assert_eq!(article.table_cells[0].kind, LabelKind::TableHeader);
        assert!(article.has_title());
        assert!(!article.has_date());
    }

    #[test]
    fn failure_report_carries_code_and_url() {
        let err = NewsroomError::protection_bypass("https://acme.com/a", "navigate", None);
        let report = ArticleReport::Failed(ExtractionFailure::from(&err));
        assert!(!report.is_extracted());
        assert_eq!(report.url(), "https://acme.com/a");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["code"], "protection_bypass");
    }
}
