// ABOUTME: Mutable DOM snapshot backed by ego_tree, built from scraper's parsed document tree.
// ABOUTME: Provides node data types, text helpers, and traversal utilities shared by every pass.

//! DOM utilities for labeled documents.
//!
//! scraper parses markup into an immutable tree; the labeling passes need to
//! add attributes, insert wrapper elements, and detach subtrees. [`Snapshot`]
//! copies the parsed tree into an owned `ego_tree::Tree<DomNode>` that
//! supports those edits while keeping stable [`NodeId`]s. Cloning a snapshot
//! is a deep copy.

pub mod address;
pub mod serialize;

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};

/// Tags whose text is never visible content.
pub const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "textarea", "title", "iframe",
];

/// One node of the snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Document,
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl DomNode {
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DomNode::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, DomNode::Element(_))
    }
}

/// An element's tag name and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    pub fn is_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.is(t))
    }
}

/// Owned, mutable copy of a parsed HTML document.
#[derive(Debug, Clone)]
pub struct Snapshot {
    tree: Tree<DomNode>,
}

impl Snapshot {
    /// Parse a full HTML document. Malformed markup is repaired by the HTML5 parser.
    pub fn parse(html: &str) -> Self {
        let parsed = scraper::Html::parse_document(html);
        let mut tree = Tree::new(DomNode::Document);
        {
            let mut root = tree.root_mut();
            copy_children(parsed.tree.root(), &mut root);
        }
        Self { tree }
    }

    pub fn tree(&self) -> &Tree<DomNode> {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree<DomNode> {
        &mut self.tree
    }

    pub fn root(&self) -> NodeRef<'_, DomNode> {
        self.tree.root()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, DomNode>> {
        self.tree.get(id)
    }

    /// All element nodes in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeRef<'_, DomNode>> {
        element_descendants(self.tree.root())
    }

    /// First element matching the predicate, in document order.
    pub fn find<F>(&self, mut pred: F) -> Option<NodeRef<'_, DomNode>>
    where
        F: FnMut(&ElementData) -> bool,
    {
        self.elements()
            .find(|n| n.value().as_element().is_some_and(&mut pred))
    }

    /// The `<body>` element, if the parser produced one.
    pub fn body(&self) -> Option<NodeRef<'_, DomNode>> {
        self.find(|el| el.is("body"))
    }

    /// Set an attribute on an element. Returns false for non-element nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let Some(mut node) = self.tree.get_mut(id) else {
            return false;
        };
        match node.value() {
            DomNode::Element(el) => {
                el.set_attr(name, value);
                true
            }
            _ => false,
        }
    }

    /// Replace a text node with `wrapper` holding the same text. Returns the wrapper id.
    pub fn wrap_text(&mut self, id: NodeId, wrapper: ElementData) -> Option<NodeId> {
        let mut node = self.tree.get_mut(id)?;
        let text = match node.value() {
            DomNode::Text(t) => t.clone(),
            _ => return None,
        };
        let wrapper_id = {
            let mut inserted = node.insert_before(DomNode::Element(wrapper));
            inserted.append(DomNode::Text(text));
            inserted.id()
        };
        node.detach();
        Some(wrapper_id)
    }

    /// Detach a node and its subtree from the document.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn copy_children(src: NodeRef<'_, scraper::Node>, dst: &mut NodeMut<'_, DomNode>) {
    for child in src.children() {
        let value = match child.value() {
            scraper::Node::Doctype(d) => DomNode::Doctype(d.name().to_string()),
            scraper::Node::Element(el) => DomNode::Element(ElementData {
                name: el.name().to_string(),
                attrs: el
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
            scraper::Node::Text(t) => DomNode::Text(String::from(&**t)),
            scraper::Node::Comment(c) => DomNode::Comment(String::from(&**c)),
            _ => continue,
        };
        let mut appended = dst.append(value);
        copy_children(child, &mut appended);
    }
}

/// Element data of a node, if it is an element.
pub fn element<'a>(node: NodeRef<'a, DomNode>) -> Option<&'a ElementData> {
    node.value().as_element()
}

/// Element descendants of `node`, excluding `node` itself.
pub fn element_descendants<'a>(
    node: NodeRef<'a, DomNode>,
) -> impl Iterator<Item = NodeRef<'a, DomNode>> + 'a {
    node.descendants().skip(1).filter(|n| n.value().is_element())
}

/// Element ancestors of `node`, nearest first.
pub fn element_ancestors<'a>(
    node: NodeRef<'a, DomNode>,
) -> impl Iterator<Item = NodeRef<'a, DomNode>> + 'a {
    node.ancestors().filter(|n| n.value().is_element())
}

/// Direct element children of `node`.
pub fn element_children<'a>(
    node: NodeRef<'a, DomNode>,
) -> impl Iterator<Item = NodeRef<'a, DomNode>> + 'a {
    node.children().filter(|n| n.value().is_element())
}

/// Parent element of `node`.
pub fn parent_element(node: NodeRef<'_, DomNode>) -> Option<NodeRef<'_, DomNode>> {
    node.parent().filter(|p| p.value().is_element())
}

/// True if any ancestor element has one of `tags`.
pub fn has_ancestor_tag(node: NodeRef<'_, DomNode>, tags: &[&str]) -> bool {
    element_ancestors(node).any(|a| element(a).is_some_and(|el| el.is_any(tags)))
}

/// Concatenated text of every descendant text node.
pub fn text_content(node: NodeRef<'_, DomNode>) -> String {
    let mut out = String::new();
    for n in node.descendants() {
        if let Some(t) = n.value().as_text() {
            out.push_str(t);
        }
    }
    out
}

/// Descendant text with whitespace collapsed to single spaces.
pub fn normalized_text(node: NodeRef<'_, DomNode>) -> String {
    normalize_spaces(&text_content(node))
}

/// Text outside raw-text containers, whitespace collapsed.
pub fn visible_text(node: NodeRef<'_, DomNode>) -> String {
    let mut pieces: Vec<&str> = Vec::new();
    collect_visible(node, &mut pieces);
    normalize_spaces(&pieces.join(" "))
}

fn collect_visible<'a>(node: NodeRef<'a, DomNode>, out: &mut Vec<&'a str>) {
    match node.value() {
        DomNode::Text(t) => out.push(t),
        DomNode::Element(el) if el.is_any(RAW_TEXT_TAGS) => {}
        _ => {
            for child in node.children() {
                collect_visible(child, out);
            }
        }
    }
}

/// Character count of visible text, each text node trimmed before counting.
pub fn visible_len(node: NodeRef<'_, DomNode>) -> usize {
    let mut pieces: Vec<&str> = Vec::new();
    collect_visible(node, &mut pieces);
    pieces.iter().map(|p| p.trim().chars().count()).sum()
}

/// Text of the node's direct text children only, whitespace collapsed.
pub fn own_text(node: NodeRef<'_, DomNode>) -> String {
    let joined: Vec<&str> = node
        .children()
        .filter_map(|c| c.value().as_text())
        .collect();
    normalize_spaces(&joined.join(" "))
}

/// Normalize whitespace in text
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_copies_elements_and_attributes() {
        let snap = Snapshot::parse(r#"<html><body><p class="a b" id="x">Hi</p></body></html>"#);
        let p = snap.find(|el| el.is("p")).unwrap();
        let el = element(p).unwrap();
        assert_eq!(el.attr("id"), Some("x"));
        assert_eq!(el.classes().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(normalized_text(p), "Hi");
    }

    #[test]
    fn clone_is_independent() {
        let original = Snapshot::parse("<html><body><p>One</p></body></html>");
        let mut copy = original.clone();
        let p = copy.find(|el| el.is("p")).unwrap().id();
        copy.set_attr(p, "data-x", "1");
        let orig_p = original.find(|el| el.is("p")).unwrap();
        assert!(!element(orig_p).unwrap().has_attr("data-x"));
    }

    #[test]
    fn wrap_text_preserves_position() {
        let mut snap = Snapshot::parse("<html><body><p>A<b>B</b>C</p></body></html>");
        let p = snap.find(|el| el.is("p")).unwrap();
        let first = p.first_child().unwrap().id();
        let wrapper = snap.wrap_text(first, ElementData::new("span")).unwrap();
        let p = snap.find(|el| el.is("p")).unwrap();
        assert_eq!(p.first_child().unwrap().id(), wrapper);
        assert_eq!(normalized_text(p), "ABC");
    }

    #[test]
    fn visible_text_skips_scripts() {
        let snap = Snapshot::parse(
            "<html><body><div>Keep <script>var x = 1;</script><style>p{}</style>this</div></body></html>",
        );
        let div = snap.find(|el| el.is("div")).unwrap();
        assert_eq!(visible_text(div), "Keep this");
        assert_eq!(visible_len(div), 8);
    }

    #[test]
    fn visible_len_counts_spaces_between_words() {
        let snap = Snapshot::parse(
            "<html><body><div>  Hello big world <b> ! </b></div></body></html>",
        );
        let div = snap.find(|el| el.is("div")).unwrap();
        assert_eq!(visible_len(div), 16);
    }

    #[test]
    fn own_text_ignores_child_elements() {
        let snap = Snapshot::parse(
            "<html><body><li>Load <span>ignored</span> More</li></body></html>",
        );
        let li = snap.find(|el| el.is("li")).unwrap();
        assert_eq!(own_text(li), "Load More");
    }

    #[test]
    fn detach_removes_subtree() {
        let mut snap = Snapshot::parse("<html><body><div><p>x</p></div></body></html>");
        let div = snap.find(|el| el.is("div")).unwrap().id();
        snap.detach(div);
        assert!(snap.find(|el| el.is("p")).is_none());
    }
}
