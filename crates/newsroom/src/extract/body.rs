// ABOUTME: Locates the article container and labels body elements, stopping at the first section boundary.
// ABOUTME: Tables are labeled cell by cell; boilerplate lines are skipped without halting the walk.

//! Body classification.
//!
//! The walk visits target tags inside the article container in document
//! order and recurses into their children. Each element is judged on its
//! direct text: the text nodes it owns plus the text wrappers the addressing
//! pass inserted in place of those nodes. Three outcomes are possible:
//!
//! - boilerplate (copyright lines, calls to action): the element is left
//!   unlabeled and the walk continues;
//! - section boundary ("Forward-Looking Statements", "About Acme"): the walk
//!   halts and nothing after it is labeled;
//! - content: the element gets a content label carrying its tag name.

use std::collections::HashSet;
use std::ops::ControlFlow;

use aho_corasick::AhoCorasick;
use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::{
    element, element_ancestors, element_children, element_descendants, has_ancestor_tag,
    normalize_spaces, normalized_text, visible_len, DomNode, Snapshot,
};
use crate::labels::{Label, TEXT_WRAPPER_TAG};
use crate::options::Options;

/// Tags the walk starts from.
pub const TARGET_TAGS: &[&str] = &["p", "h2", "h3", "h4", "ul", "ol", "table", "blockquote"];

/// Containers whose blocks never count as the article.
const EXCLUDED_ANCESTORS: &[&str] = &["nav", "footer", "aside", "script", "style", "noscript"];

static CONTENT_CLASS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(article|post|entry).*content",
        r"(?i)main-content",
        r"(?i)story-content",
        r"(?i)news-content",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BOILERPLATE_PHRASES: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build([
            "copyright",
            "all rights reserved",
            "terms of use",
            "terms of service",
            "privacy policy",
            "contact us",
            "share this",
            "follow us",
            "subscribe to",
        ])
        .unwrap()
});

static STRICT_SECTION_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^forward[\s-]*looking[\s-]*statements?$",
        r"^safe\s+harbor\s+statements?$",
        r"^\s*about\s+[a-z\s]+$",
        r"^\s*[a-z\s]+'?s\s+safe\s+harbor\s+statement$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LENIENT_SECTION_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"forward[\s-]*looking[\s-]*statements?",
        r"safe\s+harbor\s+statements?",
        r"about\s+[a-z\s]+",
        r"[a-z\s]+'?s\s+safe\s+harbor\s+statement",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// How a piece of direct text is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    Content,
    Boilerplate,
    SectionBoundary,
}

/// Classify an element's direct text. `bold` reports whether the element
/// is visually bold; only bold text can trigger a lenient boundary match.
pub fn classify_text(text: &str, bold: bool) -> TextClass {
    if BOILERPLATE_PHRASES.is_match(text) {
        return TextClass::Boilerplate;
    }
    let lowered = text.trim().to_lowercase();
    if STRICT_SECTION_HEADERS.iter().any(|re| re.is_match(&lowered)) {
        return TextClass::SectionBoundary;
    }
    if bold && LENIENT_SECTION_HEADERS.iter().any(|re| re.is_match(&lowered)) {
        return TextClass::SectionBoundary;
    }
    TextClass::Content
}

/// Bold tag, inline bold weight, or a class token containing "bold".
pub fn is_bold(node: NodeRef<'_, DomNode>) -> bool {
    let Some(el) = element(node) else {
        return false;
    };
    if el.is_any(&["b", "strong"]) {
        return true;
    }
    let inline_bold = el.attr("style").is_some_and(|s| {
        let style = s.replace(' ', "").to_lowercase();
        style.contains("font-weight:bold") || style.contains("font-weight:700")
    });
    inline_bold || el.classes().any(|c| c.to_lowercase().contains("bold"))
}

/// Text owned by this element: its own text nodes and its text wrappers.
pub fn direct_text(node: NodeRef<'_, DomNode>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for child in node.children() {
        match child.value() {
            DomNode::Text(t) => parts.push(t.to_string()),
            DomNode::Element(el) if el.is(TEXT_WRAPPER_TAG) => parts.push(normalized_text(child)),
            _ => {}
        }
    }
    normalize_spaces(&parts.join(" "))
}

fn is_tag(node: NodeRef<'_, DomNode>, tag: &str) -> bool {
    element(node).is_some_and(|el| el.is(tag))
}

/// Find the element holding the article body.
pub fn find_container<'a>(snapshot: &'a Snapshot, opts: &Options) -> Option<NodeRef<'a, DomNode>> {
    if let Some(article) = snapshot.find(|el| el.is("article")) {
        return Some(article);
    }

    for pattern in CONTENT_CLASS_PATTERNS.iter() {
        let found = snapshot.elements().find(|n| {
            element(*n).is_some_and(|el| el.is("div") && el.classes().any(|c| pattern.is_match(c)))
                && visible_len(*n) > opts.min_content_chars
        });
        if found.is_some() {
            return found;
        }
    }

    // Largest block outside navigation and chrome. The first one wins ties.
    snapshot
        .elements()
        .filter(|n| {
            element(*n).is_some_and(|el| el.is_any(&["div", "section"]))
                && !has_ancestor_tag(*n, EXCLUDED_ANCESTORS)
        })
        .map(|n| (visible_len(n), n))
        .fold(None, |best: Option<(usize, NodeRef<'a, DomNode>)>, (len, n)| match best {
            Some((b, _)) if b >= len => best,
            _ => Some((len, n)),
        })
        .map(|(_, n)| n)
}

/// The labels a walk decided on, applied after the walk finishes.
#[derive(Debug, Default)]
struct BodyWalk {
    visited: HashSet<NodeId>,
    labels: Vec<(NodeId, Label)>,
}

impl BodyWalk {
    /// Label the non-empty header and data cells of a table. True if any were found.
    fn mark_table(&mut self, table: NodeRef<'_, DomNode>) -> bool {
        let mut found = false;
        for cell in element_descendants(table) {
            let label = match element(cell) {
                Some(el) if el.is("th") => Label::TableHeader,
                Some(el) if el.is("td") => Label::TableCell,
                _ => continue,
            };
            if normalized_text(cell).is_empty() {
                continue;
            }
            self.labels.push((cell.id(), label));
            found = true;
        }
        found
    }

    fn visit(&mut self, node: NodeRef<'_, DomNode>) -> ControlFlow<()> {
        if !self.visited.insert(node.id()) {
            return ControlFlow::Continue(());
        }
        let Some(el) = element(node) else {
            return ControlFlow::Continue(());
        };

        let text = direct_text(node);
        if !text.is_empty() {
            match classify_text(&text, is_bold(node)) {
                TextClass::SectionBoundary => {
                    debug!(
                        tag = %el.name,
                        text = %text,
                        "section boundary; ignoring the rest of the body"
                    );
                    return ControlFlow::Break(());
                }
                TextClass::Boilerplate => {
                    debug!(tag = %el.name, "skipping boilerplate");
                }
                TextClass::Content => self.labels.push((
                    node.id(),
                    Label::Content {
                        tag: el.name.clone(),
                    },
                )),
            }
        }

        for child in element_children(node) {
            if is_tag(child, TEXT_WRAPPER_TAG) {
                continue;
            }
            if is_tag(child, "table") {
                if self.mark_table(child) {
                    self.visited.insert(child.id());
                }
                continue;
            }
            self.visit(child)?;
        }
        ControlFlow::Continue(())
    }

    fn run(&mut self, container: NodeRef<'_, DomNode>) {
        for node in element_descendants(container) {
            let Some(el) = element(node) else {
                continue;
            };
            if !el.is_any(TARGET_TAGS) || self.visited.contains(&node.id()) {
                continue;
            }
            let in_table = element_ancestors(node)
                .take_while(|a| a.id() != container.id())
                .any(|a| is_tag(a, "table"));
            if el.is("table") || in_table {
                if el.is("table") && self.mark_table(node) {
                    self.visited.insert(node.id());
                }
                continue;
            }
            if self.visit(node).is_break() {
                break;
            }
        }
    }
}

/// Label the article body. Returns the number of content labels applied.
pub fn mark_content(snapshot: &mut Snapshot, opts: &Options) -> usize {
    let Some(container) = find_container(snapshot, opts) else {
        debug!("no article container found");
        return 0;
    };
    debug!(
        tag = %element(container).map(|el| el.name.as_str()).unwrap_or(""),
        "article container"
    );

    let mut walk = BodyWalk::default();
    walk.run(container);

    let content = walk
        .labels
        .iter()
        .filter(|(_, label)| matches!(label, Label::Content { .. }))
        .count();
    for (id, label) in &walk.labels {
        snapshot.apply_label(*id, label);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::address::address;
    use crate::labels::LabelKind;

    fn labeled(html: &str) -> Snapshot {
        let mut snap = Snapshot::parse(html);
        address(&mut snap);
        mark_content(&mut snap, &Options::default());
        snap
    }

    fn texts_with(snap: &Snapshot, kind: LabelKind) -> Vec<String> {
        snap.elements()
            .filter(|n| element(*n).is_some_and(|el| kind.matches(el)))
            .map(normalized_text)
            .collect()
    }

    #[test]
    fn classify_text_cases() {
        assert_eq!(classify_text("Copyright 2024 Acme", false), TextClass::Boilerplate);
        assert_eq!(classify_text("Forward-Looking Statements", false), TextClass::SectionBoundary);
        assert_eq!(classify_text("About Acme Corp", false), TextClass::SectionBoundary);
        assert_eq!(
            classify_text("Acme's Safe Harbor Statement", false),
            TextClass::SectionBoundary
        );
        assert_eq!(
            classify_text("This release contains forward-looking statements.", false),
            TextClass::Content
        );
        assert_eq!(
            classify_text("This release contains forward-looking statements.", true),
            TextClass::SectionBoundary
        );
        assert_eq!(classify_text("Revenue grew 12% to $4.1 billion.", true), TextClass::Content);
    }

    #[test]
    fn bold_detection() {
        let snap = Snapshot::parse(
            r#"<html><body><strong>a</strong><p style="font-weight: bold">b</p><p class="txt-Bold">c</p><p>d</p></body></html>"#,
        );
        let bold: Vec<bool> = snap
            .elements()
            .filter(|n| element(*n).is_some_and(|el| el.is_any(&["strong", "p"])))
            .map(is_bold)
            .collect();
        assert_eq!(bold, vec![true, true, true, false]);
    }

    #[test]
    fn container_prefers_article_then_class_then_largest_block() {
        let snap = Snapshot::parse(
            "<html><body><div>lots of text here</div><article><p>x</p></article></body></html>",
        );
        let found = find_container(&snap, &Options::default()).unwrap();
        assert_eq!(element(found).unwrap().name, "article");

        let long = "word ".repeat(60);
        let html = format!(
            r#"<html><body><div class="sidebar">{long}{long}</div><div class="post-body-content">{long}</div></body></html>"#
        );
        let snap = Snapshot::parse(&html);
        let found = find_container(&snap, &Options::default()).unwrap();
        assert_eq!(element(found).unwrap().attr("class"), Some("post-body-content"));

        let snap = Snapshot::parse(
            "<html><body><nav><div>navigation links and more navigation links</div></nav><section>short body</section></body></html>",
        );
        assert!(is_tag(find_container(&snap, &Options::default()).unwrap(), "section"));
    }

    #[test]
    fn largest_block_counts_spaces_between_words() {
        let snap = Snapshot::parse(
            r#"<html><body><section id="spaced">a b c d e f</section><section id="dense">abcdefg</section></body></html>"#,
        );
        let found = find_container(&snap, &Options::default()).unwrap();
        assert_eq!(element(found).unwrap().attr("id"), Some("spaced"));
    }

    #[test]
    fn labels_paragraphs_and_list_items() {
        let snap = labeled(
            "<html><body><article><h2>Highlights</h2><p>Acme announced results.</p><ul><li>Revenue up</li><li>Margin up</li></ul></article></body></html>",
        );
        assert_eq!(
            texts_with(&snap, LabelKind::Content),
            vec!["Highlights", "Acme announced results.", "Revenue up", "Margin up"]
        );
    }

    #[test]
    fn boilerplate_is_skipped_without_halting() {
        let snap = labeled(
            "<html><body><article><p>Share this story</p><p>Acme opened a plant.</p></article></body></html>",
        );
        assert_eq!(texts_with(&snap, LabelKind::Content), vec!["Acme opened a plant."]);
    }

    #[test]
    fn strict_boundary_truncates_everything_after() {
        let snap = labeled(
            r#"<html><body><article>
            <p>Acme opened a plant in Ohio.</p>
            <h3>Forward-Looking Statements</h3>
            <p>Substantive text that still must not be labeled.</p>
            <table><tr><td>late cell</td></tr></table>
            </article></body></html>"#,
        );
        assert_eq!(texts_with(&snap, LabelKind::Content), vec!["Acme opened a plant in Ohio."]);
        assert_eq!(snap.label_count(LabelKind::TableCell), 0);
    }

    #[test]
    fn lenient_boundary_needs_bold() {
        let snap = labeled(
            r#"<html><body><article>
            <p>Read about Acme leadership changes.</p>
            <p><b>More about Acme and its brands</b></p>
            <p>Trailing text.</p>
            </article></body></html>"#,
        );
        assert_eq!(
            texts_with(&snap, LabelKind::Content),
            vec!["Read about Acme leadership changes."]
        );
    }

    #[test]
    fn tables_are_labeled_by_cell() {
        let snap = labeled(
            r#"<html><body><article><p>Results follow.</p>
            <table><tr><th>Metric</th><th></th></tr><tr><td>Revenue</td><td>$4.1B</td></tr></table>
            </article></body></html>"#,
        );
        assert_eq!(texts_with(&snap, LabelKind::TableHeader), vec!["Metric"]);
        assert_eq!(texts_with(&snap, LabelKind::TableCell), vec!["Revenue", "$4.1B"]);
        assert_eq!(texts_with(&snap, LabelKind::Content), vec!["Results follow."]);
    }

    #[test]
    fn nested_targets_are_visited_once() {
        let mut snap = Snapshot::parse(
            "<html><body><article><blockquote><p>Quoted line.</p></blockquote></article></body></html>",
        );
        address(&mut snap);
        assert_eq!(mark_content(&mut snap, &Options::default()), 1);
    }
}
