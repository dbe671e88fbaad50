// ABOUTME: Pagination state machine that drives a renderer through year filters, load-more, and next pages.
// ABOUTME: Classifies every page state it reaches and accumulates the article-link groups it finds.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::classifier::{classify_page, AnchorGroup};
use super::controls::{
    find_year_selector, load_more_candidates, next_page_candidates, YearSelector,
};
use super::renderer::{click_with_fallback, PageRenderer};
use crate::dom::Snapshot;
use crate::error::NewsroomError;
use crate::options::Options;

/// How the session enumerated the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// No year dropdown; one page loop.
    NoSelector,
    /// A year dropdown with an "all" option; one page loop after selecting it.
    YearAll,
    /// A year dropdown without "all"; one page loop per year.
    YearEnumerated,
    /// Links were already on the page but hidden. Terminal.
    ClientSide,
}

/// State accumulated while enumerating one listing site.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationSession {
    pub base_url: String,
    pub discovered_groups: Vec<AnchorGroup>,
    pub mode: SessionMode,
    /// Navigation actions left in the current page loop.
    pub attempts_remaining: usize,
}

impl PaginationSession {
    pub fn new(base_url: impl Into<String>, opts: &Options) -> Self {
        Self {
            base_url: base_url.into(),
            discovered_groups: Vec::new(),
            mode: SessionMode::NoSelector,
            attempts_remaining: opts.max_attempts,
        }
    }

    /// All resolved URLs across groups, first occurrence order, without repeats.
    pub fn urls(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.discovered_groups
            .iter()
            .flat_map(|g| g.urls.iter())
            .filter(|u| seen.insert(u.as_str()))
            .cloned()
            .collect()
    }

    pub fn is_client_side(&self) -> bool {
        self.mode == SessionMode::ClientSide
    }
}

/// Why a page loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopOutcome {
    Exhausted,
    ClientSide,
}

/// Drives one renderer through a listing site.
pub struct PaginationController<'a, R: PageRenderer + ?Sized> {
    renderer: &'a mut R,
    opts: &'a Options,
    session: PaginationSession,
}

impl<'a, R: PageRenderer + ?Sized> PaginationController<'a, R> {
    pub fn new(renderer: &'a mut R, base_url: &str, opts: &'a Options) -> Self {
        Self {
            renderer,
            opts,
            session: PaginationSession::new(base_url, opts),
        }
    }

    /// Navigate to the base URL and enumerate every reachable article group.
    pub fn run(mut self) -> Result<PaginationSession, NewsroomError> {
        let base_url = self.session.base_url.clone();
        self.renderer
            .navigate(&base_url)
            .map_err(|e| NewsroomError::from_render(&base_url, "navigate", e))?;

        let snapshot = self.snapshot()?;
        let Some(selector) = find_year_selector(&snapshot, self.opts) else {
            self.session.mode = SessionMode::NoSelector;
            self.page_loop()?;
            return Ok(self.session);
        };

        if let Some(all) = selector.all_option() {
            self.session.mode = SessionMode::YearAll;
            let all = all.to_string();
            if self.select(&selector, &all) {
                self.page_loop()?;
            } else {
                warn!(option = %all, "could not select the all-years option");
            }
            return Ok(self.session);
        }

        self.session.mode = SessionMode::YearEnumerated;
        let years: Vec<String> = selector.years().map(str::to_string).collect();
        info!(years = years.len(), "enumerating year filter");
        for year in years {
            // The dropdown may be re-rendered after each selection.
            let current = self.snapshot()?;
            let Some(live) = find_year_selector(&current, self.opts) else {
                warn!(%year, "year selector disappeared");
                break;
            };
            if !self.select(&live, &year) {
                debug!(%year, "year option could not be selected");
                continue;
            }
            if self.page_loop()? == LoopOutcome::ClientSide {
                info!(%year, "client-side pagination detected; skipping remaining years");
                break;
            }
        }
        Ok(self.session)
    }

    fn snapshot(&mut self) -> Result<Snapshot, NewsroomError> {
        let html = self
            .renderer
            .current_html()
            .map_err(|e| NewsroomError::from_render(&self.session.base_url, "snapshot", e))?;
        Ok(Snapshot::parse(&html))
    }

    fn page_url(&mut self) -> String {
        self.renderer
            .current_url()
            .unwrap_or_else(|_| self.session.base_url.clone())
    }

    fn classify_current(&mut self) -> Result<Option<AnchorGroup>, NewsroomError> {
        let snapshot = self.snapshot()?;
        let url = self.page_url();
        Ok(classify_page(&snapshot, &url, self.opts))
    }

    fn select(&mut self, selector: &YearSelector, option: &str) -> bool {
        match self.renderer.find_first(&selector.selector) {
            Some(handle) => self.renderer.select_option(&handle, option),
            None => false,
        }
    }

    /// Classify the current page, then follow load-more and next controls
    /// until none works or the attempt budget runs out.
    fn page_loop(&mut self) -> Result<LoopOutcome, NewsroomError> {
        self.session.attempts_remaining = self.opts.max_attempts;

        if let Some(group) = self.classify_current()? {
            let ratio = group.hidden_ratio();
            if ratio > self.opts.hidden_ratio_threshold {
                info!(
                    ratio,
                    urls = group.urls.len(),
                    "most article links are hidden; treating as client-side pagination"
                );
                self.session.discovered_groups.push(group);
                self.session.mode = SessionMode::ClientSide;
                return Ok(LoopOutcome::ClientSide);
            }
            self.session.discovered_groups.push(group);
        }

        while self.session.attempts_remaining > 0 {
            let moved = self.try_load_more()? || self.try_next_page()?;
            if !moved {
                break;
            }
            self.session.attempts_remaining -= 1;
            if let Some(group) = self.classify_current()? {
                debug!(urls = group.urls.len(), "group found after navigation");
                self.session.discovered_groups.push(group);
            }
        }
        Ok(LoopOutcome::Exhausted)
    }

    fn try_load_more(&mut self) -> Result<bool, NewsroomError> {
        let snapshot = self.snapshot()?;
        for control in load_more_candidates(&snapshot) {
            let Some(handle) = self.renderer.find_first(&control.selector) else {
                continue;
            };
            self.renderer.scroll_into_view(&handle);
            if click_with_fallback(self.renderer, &handle) {
                debug!(probe = control.probe, "load more clicked");
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn try_next_page(&mut self) -> Result<bool, NewsroomError> {
        let snapshot = self.snapshot()?;
        for control in next_page_candidates(&snapshot) {
            let Some(handle) = self.renderer.find_first(&control.selector) else {
                continue;
            };
            let before = self.page_url();
            self.renderer.scroll_into_view(&handle);
            if !click_with_fallback(self.renderer, &handle) {
                continue;
            }
            if self
                .renderer
                .wait_until_url_changes(&before, self.opts.url_change_timeout)
            {
                debug!(probe = control.probe, "advanced to next page");
                return Ok(true);
            }
            debug!(probe = control.probe, "next clicked but the URL did not change");
            return Ok(false);
        }
        Ok(false)
    }
}

/// Enumerate a listing site through `renderer`, starting at `base_url`.
#[instrument(level = "info", skip(renderer, opts))]
pub fn discover<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    base_url: &str,
    opts: &Options,
) -> Result<PaginationSession, NewsroomError> {
    if url::Url::parse(base_url).is_err() {
        return Err(NewsroomError::invalid_url(
            base_url,
            "discover",
            Some(anyhow::anyhow!("malformed URL")),
        ));
    }
    let session = PaginationController::new(renderer, base_url, opts).run()?;
    info!(
        mode = ?session.mode,
        groups = session.discovered_groups.len(),
        urls = session.urls().len(),
        "discovery finished"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::renderer::StaticRenderer;

    fn listing(hidden_class: &str) -> String {
        let items: String = (1..=6)
            .map(|i| {
                format!(
                    r#"<li class="{}"><a href="/news/acme-announces-item-{}">Acme announces item {}</a></li>"#,
                    if i > 1 { hidden_class } else { "" },
                    i,
                    i
                )
            })
            .collect();
        format!("<html><body><ul>{}</ul></body></html>", items)
    }

    #[test]
    fn static_page_yields_one_group() {
        let mut r = StaticRenderer::new("https://acme.com/news", listing(""));
        let session = discover(&mut r, "https://acme.com/news", &Options::default()).unwrap();
        assert_eq!(session.mode, SessionMode::NoSelector);
        assert_eq!(session.discovered_groups.len(), 1);
        assert_eq!(session.urls()[0], "https://acme.com/news/acme-announces-item-1");
        assert_eq!(session.attempts_remaining, Options::default().max_attempts);
    }

    #[test]
    fn mostly_hidden_group_is_client_side() {
        let mut r = StaticRenderer::new("https://acme.com/news", listing("hidden"));
        let session = discover(&mut r, "https://acme.com/news", &Options::default()).unwrap();
        assert!(session.is_client_side());
        assert_eq!(session.discovered_groups.len(), 1);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut r = StaticRenderer::new("", "");
        let err = discover(&mut r, "not a url", &Options::default()).unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn urls_are_deduplicated_across_groups() {
        let mut session = PaginationSession::new("https://acme.com", &Options::default());
        let group = AnchorGroup {
            ancestry: "html > body".into(),
            anchors: vec![],
            urls: vec!["https://acme.com/a".into(), "https://acme.com/b".into()],
            features: Default::default(),
        };
        session.discovered_groups.push(group.clone());
        session.discovered_groups.push(group);
        assert_eq!(session.urls().len(), 2);
    }
}
