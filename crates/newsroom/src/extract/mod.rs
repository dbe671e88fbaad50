// ABOUTME: Article labeling passes and the label-preserving pruner.
// ABOUTME: Title, date, metadata, and body labelers run over an addressed Snapshot.

//! Article extraction.
//!
//! Each labeler takes an addressed [`Snapshot`](crate::dom::Snapshot) and
//! writes role attributes onto the elements it selects. [`article`] chains
//! them, prunes a copy, and verifies that no label was lost.

pub mod article;
pub mod body;
pub mod date;
pub mod metadata;
pub mod prune;
pub mod title;

pub use article::{extract_article, label_document};
pub use prune::{prune, verify, LabelMismatch};
