// ABOUTME: Newsroom client tying options to the discovery and extraction entry points.
// ABOUTME: Renderers are passed per call; the client itself holds only configuration.

use tracing::instrument;

use crate::discovery::{self, PageRenderer, PaginationSession};
use crate::error::NewsroomError;
use crate::extract::article;
use crate::options::{NewsroomBuilder, Options};
use crate::result::{ArticleReport, ExtractedArticle};

/// Press-release engine configured with a fixed set of [`Options`].
#[derive(Debug, Clone, Default)]
pub struct Newsroom {
    opts: Options,
}

impl Newsroom {
    /// Create a new NewsroomBuilder for configuring the client.
    pub fn builder() -> NewsroomBuilder {
        NewsroomBuilder::new()
    }

    /// Create a new Newsroom with the given options.
    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Enumerate article links on a listing site, following its pagination.
    pub fn discover<R: PageRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        base_url: &str,
    ) -> Result<PaginationSession, NewsroomError> {
        discovery::discover(renderer, base_url, &self.opts)
    }

    /// Label and prune an article page already in hand.
    #[instrument(level = "info", skip(self, html))]
    pub fn extract_html(&self, html: &str, url: &str) -> Result<ExtractedArticle, NewsroomError> {
        article::extract_article(html, url, &self.opts)
    }

    /// Navigate to an article and extract it.
    #[instrument(level = "info", skip(self, renderer))]
    pub fn extract<R: PageRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        url: &str,
    ) -> Result<ExtractedArticle, NewsroomError> {
        article::extract_rendered(renderer, url, &self.opts)
    }

    /// Extract every URL, reporting failures per URL.
    pub fn extract_batch<R: PageRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        urls: &[String],
    ) -> Vec<ArticleReport> {
        article::extract_batch(renderer, urls, &self.opts)
    }
}
