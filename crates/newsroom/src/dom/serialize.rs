// ABOUTME: Serializes snapshot trees back to HTML markup.
// ABOUTME: Escapes text and attribute values, emits void elements, and leaves raw-text content untouched.

use ego_tree::NodeRef;

use super::{DomNode, Snapshot};

impl Snapshot {
    /// Serialize the whole document.
    pub fn html(&self) -> String {
        let mut out = String::new();
        for child in self.root().children() {
            serialize_node(child, &mut out);
        }
        out
    }

    /// Inner markup of `<body>`, or an empty string when there is none.
    pub fn body_html(&self) -> String {
        self.body().map(inner_html).unwrap_or_default()
    }
}

/// Serialize a node including its own tag.
pub fn outer_html(node: NodeRef<'_, DomNode>) -> String {
    let mut out = String::new();
    serialize_node(node, &mut out);
    out
}

/// Serialize a node's children only.
pub fn inner_html(node: NodeRef<'_, DomNode>) -> String {
    let mut out = String::new();
    for child in node.children() {
        serialize_node(child, &mut out);
    }
    out
}

fn serialize_node(node: NodeRef<'_, DomNode>, out: &mut String) {
    match node.value() {
        DomNode::Document => {
            for child in node.children() {
                serialize_node(child, out);
            }
        }
        DomNode::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        DomNode::Text(t) => {
            let raw_parent = node
                .parent()
                .and_then(|p| p.value().as_element().map(|el| el.is_any(&["script", "style"])))
                .unwrap_or(false);
            if raw_parent {
                out.push_str(t);
            } else {
                out.push_str(&escape_text(t));
            }
        }
        DomNode::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        DomNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (k, v) in &el.attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }

            if is_void_element(&el.name) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in node.children() {
                serialize_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape attribute value
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is void element
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
