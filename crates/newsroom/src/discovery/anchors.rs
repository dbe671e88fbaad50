// ABOUTME: Collects candidate anchors from a listing page with their ancestry paths and visibility.
// ABOUTME: Filters out empty, fragment, script, phone, mail, and social-network links before grouping.

use ego_tree::NodeRef;
use serde::Serialize;

use super::features::{is_social_media_url, is_typical_anchor};
use crate::dom::{element, element_ancestors, normalize_spaces, text_content, DomNode, Snapshot};

/// One usable link on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorRecord {
    /// The `href` exactly as written in the page.
    pub href: String,
    pub text: String,
    /// Ancestor tags with ids and classes, root first.
    pub strict_ancestry: String,
    /// Ancestor tag names only, root first. This is the grouping key.
    pub flexible_ancestry: String,
    pub hidden: bool,
    pub typical: bool,
}

/// Hrefs that never lead anywhere useful.
fn is_unusable_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    matches!(href, "" | "/" | "#")
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("tel:")
        || lower.starts_with("mailto:")
}

/// Every anchor with a usable, non-social href, in document order.
pub fn collect_anchors(snapshot: &Snapshot) -> Vec<AnchorRecord> {
    snapshot
        .elements()
        .filter_map(|node| {
            let el = element(node)?;
            if !el.is("a") {
                return None;
            }
            let href = el.attr("href")?.trim();
            if is_unusable_href(href) || is_social_media_url(href) {
                return None;
            }
            let text = normalize_spaces(&text_content(node));
            Some(AnchorRecord {
                href: href.to_string(),
                typical: is_typical_anchor(href, &text),
                text,
                strict_ancestry: strict_ancestry(node),
                flexible_ancestry: flexible_ancestry(node),
                hidden: is_hidden(node),
            })
        })
        .collect()
}

/// Ancestor tag names joined with " > ", outermost first.
pub fn flexible_ancestry(node: NodeRef<'_, DomNode>) -> String {
    let mut path: Vec<&str> = element_ancestors(node)
        .filter_map(element)
        .map(|el| el.name.as_str())
        .collect();
    path.reverse();
    path.join(" > ")
}

/// Like [`flexible_ancestry`] but each step carries `#id` and `.class` suffixes.
pub fn strict_ancestry(node: NodeRef<'_, DomNode>) -> String {
    let mut path: Vec<String> = element_ancestors(node)
        .filter_map(element)
        .map(|el| {
            let mut step = el.name.clone();
            if let Some(id) = el.attr("id").filter(|id| !id.is_empty()) {
                step.push('#');
                step.push_str(id);
            }
            let classes: Vec<&str> = el.classes().collect();
            if !classes.is_empty() {
                step.push('.');
                step.push_str(&classes.join("."));
            }
            step
        })
        .collect();
    path.reverse();
    path.join(" > ")
}

/// True if the element or one of its three nearest ancestors is hidden by
/// an inline `display:none` or a class containing "hidden".
pub fn is_hidden(node: NodeRef<'_, DomNode>) -> bool {
    std::iter::once(node)
        .chain(element_ancestors(node).take(3))
        .filter_map(element)
        .any(|el| {
            let inline_none = el
                .attr("style")
                .map(|s| s.replace(' ', "").to_lowercase().contains("display:none"))
                .unwrap_or(false);
            inline_none || el.classes().any(|c| c.to_lowercase().contains("hidden"))
        })
}
