// ABOUTME: Main library entry point for the newsroom press-release engine.
// ABOUTME: Re-exports the public API: Newsroom, NewsroomBuilder, Options, results, errors, and the renderer contract.

//! Newsroom - discovers press-release links on corporate newsroom pages and
//! extracts labeled, pruned article documents.
//!
//! Discovery groups the anchors of a rendered listing page by DOM ancestry,
//! picks the group that looks like press releases, and follows year
//! selectors, "load more" buttons, and numbered pagination through a
//! [`PageRenderer`]. Extraction labels an article's title, date, body, and
//! metadata in place, then prunes everything that carries no label.
//!
//! # Example
//!
//! ```no_run
//! use digests_newsroom::{Newsroom, NewsroomError, StaticRenderer};
//!
//! fn main() -> Result<(), NewsroomError> {
//!     let newsroom = Newsroom::builder().max_attempts(3).build();
//!     let listing = std::fs::read_to_string("news.html").unwrap_or_default();
//!     let mut renderer = StaticRenderer::new("https://example.com/news", listing);
//!     let session = newsroom.discover(&mut renderer, "https://example.com/news")?;
//!     for report in newsroom.extract_batch(&mut renderer, &session.urls()) {
//!         println!("{} extracted={}", report.url(), report.is_extracted());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod extract;
pub mod formats;
pub mod labels;
pub mod options;
pub mod result;
pub mod source;

pub use crate::client::Newsroom;
pub use crate::discovery::{
    AnchorGroup, ClickOutcome, ElementHandle, PageRenderer, PaginationSession, RenderError,
    SessionMode, StaticRenderer,
};
pub use crate::dom::Snapshot;
pub use crate::error::{ErrorCode, NewsroomError};
pub use crate::extract::LabelMismatch;
pub use crate::labels::{Label, LabelKind};
pub use crate::options::{ContentType, NewsroomBuilder, Options};
pub use crate::result::{
    ArticleReport, ContentBlock, DiscoveredGroup, DiscoveryReport, ExtractedArticle,
    ExtractionFailure, TableCellRecord,
};
