// ABOUTME: Article pipeline: address, label, prune, and verify a page, then summarize its labels.
// ABOUTME: Batch extraction turns every per-URL failure into a report entry instead of aborting.

use tracing::{error, info, instrument, warn};

use super::body::mark_content;
use super::date::mark_date;
use super::metadata::mark_metadata;
use super::prune::{prune, verify};
use super::title::mark_title;
use crate::discovery::PageRenderer;
use crate::dom::address::address;
use crate::dom::Snapshot;
use crate::error::NewsroomError;
use crate::labels::LabelKind;
use crate::options::Options;
use crate::result::{ArticleReport, ExtractedArticle, ExtractionFailure};

/// Parse and address `html`, then run every labeler over it.
pub fn label_document(html: &str, opts: &Options) -> Snapshot {
    let mut snapshot = Snapshot::parse(html);
    address(&mut snapshot);
    mark_title(&mut snapshot, opts);
    mark_date(&mut snapshot, opts);
    mark_content(&mut snapshot, opts);
    mark_metadata(&mut snapshot);
    snapshot
}

/// Label, prune, and verify an article page already in hand.
#[instrument(level = "debug", skip(html, opts))]
pub fn extract_article(
    html: &str,
    url: &str,
    opts: &Options,
) -> Result<ExtractedArticle, NewsroomError> {
    if url.is_empty() || url::Url::parse(url).is_err() {
        return Err(NewsroomError::invalid_url(
            url,
            "extract",
            Some(anyhow::anyhow!("malformed URL")),
        ));
    }
    if html.trim().is_empty() {
        return Err(NewsroomError::invalid_url(
            url,
            "extract",
            Some(anyhow::anyhow!("empty HTML")),
        ));
    }

    let labeled = label_document(html, opts);
    if LabelKind::ALL.iter().all(|kind| labeled.label_count(*kind) == 0) {
        warn!(url, "document has no labeled elements");
    }
    let clean = prune(&labeled);
    verify(&labeled, &clean).map_err(|mismatch| {
        NewsroomError::prune_verification(url, "verify", Some(anyhow::Error::new(mismatch)))
    })?;

    let article = ExtractedArticle::from_clean(url, &clean, opts.content_type);
    info!(
        url,
        title = article.title.as_deref().unwrap_or(""),
        blocks = article.content.len(),
        cells = article.table_cells.len(),
        "article extracted"
    );
    Ok(article)
}

/// Navigate to `url` and extract the rendered article.
pub fn extract_rendered<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    url: &str,
    opts: &Options,
) -> Result<ExtractedArticle, NewsroomError> {
    renderer
        .navigate(url)
        .map_err(|e| NewsroomError::from_render(url, "navigate", e))?;
    let html = renderer
        .current_html()
        .map_err(|e| NewsroomError::from_render(url, "snapshot", e))?;
    if html.trim().is_empty() {
        return Err(NewsroomError::extraction(
            url,
            "snapshot",
            Some(anyhow::anyhow!("renderer returned an empty page")),
        ));
    }
    extract_article(&html, url, opts)
}

/// Extract each URL in turn. One report per URL, in input order.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub fn extract_batch<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    urls: &[String],
    opts: &Options,
) -> Vec<ArticleReport> {
    let reports: Vec<ArticleReport> = urls
        .iter()
        .map(|url| match extract_rendered(renderer, url, opts) {
            Ok(article) => ArticleReport::Extracted(Box::new(article)),
            Err(err) => {
                if err.is_prune_verification() {
                    error!(%url, error = %err, "pruning lost labeled content");
                } else {
                    warn!(%url, error = %err, "article extraction failed");
                }
                ArticleReport::Failed(ExtractionFailure::from(&err))
            }
        })
        .collect();
    let extracted = reports.iter().filter(|r| r.is_extracted()).count();
    info!(extracted, failed = reports.len() - extracted, "batch finished");
    reports
}
