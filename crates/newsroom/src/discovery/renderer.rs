// ABOUTME: Renderer contract the pagination controller drives, plus a static single-page implementation.
// ABOUTME: Controls are addressed by CSS paths computed from the rendered snapshot.

use std::time::Duration;

use ego_tree::NodeRef;
use scraper::{Html, Selector};
use tracing::debug;

use crate::dom::{element, element_ancestors, element_children, DomNode};

/// Failures reported by a renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("bot protection could not be bypassed")]
    ProtectionBypassFailed,
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

impl RenderError {
    pub fn is_protection_bypass(&self) -> bool {
        matches!(self, RenderError::ProtectionBypassFailed)
    }
}

/// A control located on the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// CSS path that located the element.
    pub selector: String,
    pub tag: String,
    /// Visible text, whitespace collapsed.
    pub text: String,
}

/// Result of a native click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    /// Another element would receive the click; a scripted click may still work.
    Intercepted,
    Failed,
}

/// A browser-like page the discovery loop can navigate and interact with.
///
/// Implementations own any waiting they need; methods return once the page
/// has settled.
pub trait PageRenderer {
    /// Load a URL. Bot-protection failures must be reported as
    /// [`RenderError::ProtectionBypassFailed`].
    fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Markup of the current page state.
    fn current_html(&mut self) -> Result<String, RenderError>;

    fn current_url(&mut self) -> Result<String, RenderError>;

    fn find_first(&mut self, selector: &str) -> Option<ElementHandle>;

    fn find_all(&mut self, selector: &str) -> Vec<ElementHandle> {
        self.find_first(selector).into_iter().collect()
    }

    fn scroll_into_view(&mut self, _handle: &ElementHandle) {}

    fn click(&mut self, handle: &ElementHandle) -> ClickOutcome;

    /// Click through script, bypassing overlays.
    fn scripted_click(&mut self, handle: &ElementHandle) -> bool;

    /// Choose the option with this visible text in a `<select>`.
    fn select_option(&mut self, select: &ElementHandle, visible_text: &str) -> bool;

    /// Wait until the URL differs from `previous_url`. False on timeout.
    fn wait_until_url_changes(&mut self, previous_url: &str, timeout: Duration) -> bool;
}

/// Click natively, falling back to a scripted click when intercepted.
pub fn click_with_fallback<R: PageRenderer + ?Sized>(
    renderer: &mut R,
    handle: &ElementHandle,
) -> bool {
    match renderer.click(handle) {
        ClickOutcome::Clicked => true,
        ClickOutcome::Intercepted => {
            debug!(selector = %handle.selector, "click intercepted, retrying via script");
            renderer.scripted_click(handle)
        }
        ClickOutcome::Failed => false,
    }
}

/// A CSS path from `html` down to the element, using `:nth-of-type` steps.
pub fn css_path(node: NodeRef<'_, DomNode>) -> String {
    let mut steps: Vec<String> = Vec::new();
    for current in std::iter::once(node).chain(element_ancestors(node)) {
        let Some(el) = element(current) else {
            continue;
        };
        let position = current
            .parent()
            .map(|parent| {
                element_children(parent)
                    .take_while(|sibling| sibling.id() != current.id())
                    .filter(|sibling| element(*sibling).is_some_and(|s| s.name == el.name))
                    .count()
                    + 1
            })
            .unwrap_or(1);
        if el.is("html") {
            steps.push(el.name.clone());
        } else {
            steps.push(format!("{}:nth-of-type({})", el.name, position));
        }
    }
    steps.reverse();
    steps.join(" > ")
}

/// Locate the first element matching `selector` in `html`.
pub fn locate_in_html(html: &str, selector: &str) -> Option<ElementHandle> {
    let parsed = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let found = document.select(&parsed).next()?;
    let text = found.text().collect::<Vec<_>>().join(" ");
    Some(ElementHandle {
        selector: selector.to_string(),
        tag: found.value().name().to_string(),
        text: crate::dom::normalize_spaces(&text),
    })
}

/// Serves one fixed document. Navigation succeeds but nothing is interactive,
/// so discovery sees exactly the given page.
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    url: String,
    html: String,
}

impl StaticRenderer {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

impl PageRenderer for StaticRenderer {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.url = url.to_string();
        Ok(())
    }

    fn current_html(&mut self) -> Result<String, RenderError> {
        Ok(self.html.clone())
    }

    fn current_url(&mut self) -> Result<String, RenderError> {
        Ok(self.url.clone())
    }

    fn find_first(&mut self, selector: &str) -> Option<ElementHandle> {
        locate_in_html(&self.html, selector)
    }

    fn click(&mut self, _handle: &ElementHandle) -> ClickOutcome {
        ClickOutcome::Failed
    }

    fn scripted_click(&mut self, _handle: &ElementHandle) -> bool {
        false
    }

    fn select_option(&mut self, _select: &ElementHandle, _visible_text: &str) -> bool {
        false
    }

    fn wait_until_url_changes(&mut self, _previous_url: &str, _timeout: Duration) -> bool {
        false
    }
}
