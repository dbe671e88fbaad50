// ABOUTME: Builds a pruned copy of a labeled document that keeps labeled subtrees and their scaffolding.
// ABOUTME: Verification compares per-kind label id sets between the labeled original and the pruned copy.

use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use tracing::{debug, error};

use crate::dom::{element, element_ancestors, element_children, DomNode, Snapshot};
use crate::labels::{has_any_label, LabelKind};

/// Elements never removed for lacking labels.
pub const STRUCTURAL_TAGS: &[&str] = &[
    "html", "head", "body", "main", "article", "style", "script", "link", "meta", "nav", "header",
    "footer", "button", "form",
];

/// Labels of one kind differ between the labeled document and its pruned copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} labels differ after pruning: missing {missing:?}, unexpected {unexpected:?}")]
pub struct LabelMismatch {
    pub kind: LabelKind,
    pub missing: Vec<u64>,
    pub unexpected: Vec<u64>,
}

/// Every element that has a labeled descendant.
fn scaffolding(snapshot: &Snapshot) -> HashSet<NodeId> {
    let mut keep = HashSet::new();
    for node in snapshot.elements() {
        if element(node).is_some_and(has_any_label) {
            for ancestor in element_ancestors(node) {
                if !keep.insert(ancestor.id()) {
                    break;
                }
            }
        }
    }
    keep
}

fn collect_removals(
    node: NodeRef<'_, DomNode>,
    scaffold: &HashSet<NodeId>,
    doomed: &mut Vec<NodeId>,
) {
    let Some(el) = element(node) else {
        return;
    };
    if has_any_label(el) {
        return;
    }
    if !scaffold.contains(&node.id()) && !el.is_any(STRUCTURAL_TAGS) {
        doomed.push(node.id());
        return;
    }
    for child in element_children(node) {
        collect_removals(child, scaffold, doomed);
    }
}

/// Prune a copy of `labeled`, starting at `<body>`; the head is kept whole.
///
/// Labeled elements are kept with their entire subtree. Unlabeled elements
/// without labeled descendants are removed unless they are structural; the
/// children of a kept structural element are pruned in turn.
///
/// A structural element with no labeled descendants is kept as an empty
/// shell: its own tag survives, its unlabeled subtree does not.
pub fn prune(labeled: &Snapshot) -> Snapshot {
    let mut clean = labeled.clone();
    let Some(body) = clean.body().map(|b| b.id()) else {
        return clean;
    };

    let scaffold = scaffolding(&clean);
    let mut doomed = Vec::new();
    if let Some(body) = clean.get(body) {
        collect_removals(body, &scaffold, &mut doomed);
    }
    debug!(removed = doomed.len(), kept_scaffolding = scaffold.len(), "pruned document");
    for id in doomed {
        clean.detach(id);
    }
    clean
}

/// Check that every label kind covers the same element ids in both documents.
pub fn verify(original: &Snapshot, clean: &Snapshot) -> Result<(), LabelMismatch> {
    for kind in LabelKind::ALL {
        let before = original.labeled_ids(kind);
        let after = clean.labeled_ids(kind);
        if before != after {
            let mismatch = LabelMismatch {
                kind,
                missing: before.difference(&after).copied().collect(),
                unexpected: after.difference(&before).copied().collect(),
            };
            error!(%mismatch, "label verification failed");
            return Err(mismatch);
        }
    }
    Ok(())
}

/// Ids of elements in `clean` that have neither a label nor a labeled
/// descendant and are not structural.
pub fn unjustified_elements(clean: &Snapshot) -> Vec<NodeId> {
    let scaffold = scaffolding(clean);
    let Some(body) = clean.body() else {
        return Vec::new();
    };
    std::iter::once(body)
        .chain(crate::dom::element_descendants(body))
        .filter(|n| {
            element(*n).is_some_and(|el| {
                !has_any_label(el)
                    && !el.is_any(STRUCTURAL_TAGS)
                    && !scaffold.contains(&n.id())
                    && !element_ancestors(*n)
                        .filter_map(element)
                        .any(has_any_label)
            })
        })
        .map(|n| n.id())
        .collect()
}
