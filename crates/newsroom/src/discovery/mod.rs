// ABOUTME: Link-group discovery: anchor collection, group classification, and pagination control.
// ABOUTME: Re-exports the classifier, renderer contract, and pagination session types.

pub mod anchors;
pub mod classifier;
pub mod controls;
pub mod features;
pub mod pagination;
pub mod renderer;

pub use anchors::AnchorRecord;
pub use classifier::{classify_page, AnchorGroup, GroupFeatures};
pub use pagination::{discover, PaginationController, PaginationSession, SessionMode};
pub use renderer::{ClickOutcome, ElementHandle, PageRenderer, RenderError, StaticRenderer};
