// ABOUTME: Output format converters for pruned article markup.
// ABOUTME: Handles conversion to HTML, Markdown, and plain text formats.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{DomNode, Snapshot, RAW_TEXT_TAGS};
use crate::options::ContentType;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());
static HORIZONTAL_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Elements that start a new line in plain text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "ul", "ol", "li", "blockquote", "table", "tr", "pre",
];

/// Render markup in the requested content type.
pub fn render(html: &str, content_type: ContentType) -> String {
    match content_type {
        ContentType::Html => html.to_string(),
        ContentType::Markdown => html_to_markdown(html),
        ContentType::Text => html_to_text(html),
    }
}

/// Convert HTML to Markdown using htmd.
///
/// Script, style, and noscript content is dropped. On conversion error the
/// input is returned unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = BR_RE.replace_all(html, "\n");

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.to_string());

    BLANK_LINES_RE.replace_all(&md, "\n\n").trim().to_string()
}

/// Convert HTML to plain text, one line per block element.
pub fn html_to_text(html: &str) -> String {
    let preprocessed = BR_RE.replace_all(html, "\n");
    let snapshot = Snapshot::parse(&preprocessed);

    let mut raw = String::new();
    collect_text(snapshot.root(), &mut raw);

    let spaced = HORIZONTAL_SPACE_RE.replace_all(&raw, " ");
    let lines: Vec<&str> = spaced.lines().map(str::trim).collect();
    NEWLINES_RE
        .replace_all(&lines.join("\n"), "\n")
        .trim()
        .to_string()
}

fn collect_text(node: NodeRef<'_, DomNode>, out: &mut String) {
    match node.value() {
        DomNode::Text(t) => {
            out.push_str(t);
            out.push(' ');
        }
        DomNode::Element(el) if el.is_any(RAW_TEXT_TAGS) => {}
        DomNode::Element(el) => {
            let block = el.is_any(BLOCK_TAGS);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}
