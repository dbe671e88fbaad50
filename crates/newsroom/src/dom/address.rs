// ABOUTME: Assigns stable identifiers to every element and wraps visible text nodes in nr-text elements.
// ABOUTME: Idempotent: already-wrapped text and already-numbered elements keep their existing identifiers.

use ego_tree::NodeId;
use serde::Serialize;
use tracing::debug;

use super::{element, DomNode, ElementData, Snapshot, RAW_TEXT_TAGS};
use crate::labels::{NODE_ID_ATTR, SEQ_ATTR, TEXT_WRAPPER_TAG};

/// Counts produced by one addressing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddressStats {
    pub wrapped_text_nodes: usize,
    pub identified_elements: usize,
}

/// Wrap each non-blank text node and give every element an `nr-id`.
///
/// Wrappers are created first so that they are numbered alongside the
/// original elements in document order. Text inside raw-text containers
/// (scripts, styles, templates) is left alone.
pub fn address(snapshot: &mut Snapshot) -> AddressStats {
    let mut stats = AddressStats::default();

    let mut seq = next_counter(snapshot, SEQ_ATTR).max(1);
    let targets: Vec<NodeId> = snapshot
        .root()
        .descendants()
        .filter(|n| is_wrappable(*n))
        .map(|n| n.id())
        .collect();
    for id in targets {
        let mut wrapper = ElementData::new(TEXT_WRAPPER_TAG);
        wrapper.set_attr(SEQ_ATTR, seq.to_string());
        if snapshot.wrap_text(id, wrapper).is_some() {
            seq += 1;
            stats.wrapped_text_nodes += 1;
        }
    }

    let mut next_id = next_counter(snapshot, NODE_ID_ATTR);
    let unnumbered: Vec<NodeId> = snapshot
        .elements()
        .filter(|n| element(*n).is_some_and(|el| !el.has_attr(NODE_ID_ATTR)))
        .map(|n| n.id())
        .collect();
    for id in unnumbered {
        snapshot.set_attr(id, NODE_ID_ATTR, next_id.to_string());
        next_id += 1;
        stats.identified_elements += 1;
    }

    debug!(
        wrapped = stats.wrapped_text_nodes,
        identified = stats.identified_elements,
        "addressed document"
    );
    stats
}

fn is_wrappable(node: ego_tree::NodeRef<'_, DomNode>) -> bool {
    let Some(text) = node.value().as_text() else {
        return false;
    };
    if text.trim().is_empty() {
        return false;
    }
    match node.parent().and_then(element) {
        Some(parent) => !parent.is(TEXT_WRAPPER_TAG) && !parent.is_any(RAW_TEXT_TAGS),
        None => false,
    }
}

/// One past the largest numeric value of `attr` already present, or 0.
fn next_counter(snapshot: &Snapshot, attr: &str) -> u64 {
    snapshot
        .elements()
        .filter_map(|n| element(n).and_then(|el| el.attr(attr)))
        .filter_map(|v| v.parse::<u64>().ok())
        .max()
        .map(|m| m + 1)
        .unwrap_or(0)
}

/// Element by `nr-id`.
pub fn find_by_node_id(snapshot: &Snapshot, node_id: u64) -> Option<NodeId> {
    let wanted = node_id.to_string();
    snapshot
        .find(|el| el.attr(NODE_ID_ATTR) == Some(wanted.as_str()))
        .map(|n| n.id())
}
