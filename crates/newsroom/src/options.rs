// ABOUTME: Configuration options for the newsroom engine including ContentType, Options, and NewsroomBuilder.
// ABOUTME: NewsroomBuilder provides a fluent API for constructing Newsroom instances with custom thresholds.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::client::Newsroom;

/// The content type format for extracted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Html,
    Markdown,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "text" | "txt" => ContentType::Text,
            _ => ContentType::Html,
        }
    }
}

/// Tunable thresholds for discovery and extraction.
#[derive(Debug, Clone)]
pub struct Options {
    /// Upper bound on successful pagination actions per page loop.
    pub max_attempts: usize,
    /// Fraction of hidden anchors above which a group signals client-side pagination.
    pub hidden_ratio_threshold: f64,
    /// Verb percentage a group must exceed to survive the verb filter.
    pub verb_percentage_threshold: f64,
    /// A group must hold strictly more URLs than this.
    pub min_group_urls: usize,
    /// Title candidates must be shorter than this many characters.
    pub max_title_chars: usize,
    /// Class-matched containers need strictly more text than this.
    pub min_content_chars: usize,
    /// Share of 4-digit options required to treat a dropdown as a year selector.
    pub year_option_ratio: f64,
    /// How long to wait for the URL to change after a next-page click.
    pub url_change_timeout: Duration,
    /// Dates after this instant are rejected. Defaults to the wall clock.
    pub reference_time: Option<DateTime<Utc>>,
    pub content_type: ContentType,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            hidden_ratio_threshold: 0.6,
            verb_percentage_threshold: 20.0,
            min_group_urls: 4,
            max_title_chars: 200,
            min_content_chars: 200,
            year_option_ratio: 0.7,
            url_change_timeout: Duration::from_secs(5),
            reference_time: None,
            content_type: ContentType::Html,
        }
    }
}

impl Options {
    /// The instant used to reject future dates.
    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

/// Builder for constructing Newsroom instances with custom configuration.
#[derive(Debug, Clone)]
pub struct NewsroomBuilder {
    opts: Options,
}

impl NewsroomBuilder {
    /// Create a new NewsroomBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the pagination attempt budget.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.opts.max_attempts = attempts;
        self
    }

    pub fn hidden_ratio_threshold(mut self, ratio: f64) -> Self {
        self.opts.hidden_ratio_threshold = ratio;
        self
    }

    pub fn verb_percentage_threshold(mut self, pct: f64) -> Self {
        self.opts.verb_percentage_threshold = pct;
        self
    }

    pub fn min_group_urls(mut self, count: usize) -> Self {
        self.opts.min_group_urls = count;
        self
    }

    pub fn max_title_chars(mut self, chars: usize) -> Self {
        self.opts.max_title_chars = chars;
        self
    }

    pub fn min_content_chars(mut self, chars: usize) -> Self {
        self.opts.min_content_chars = chars;
        self
    }

    pub fn year_option_ratio(mut self, ratio: f64) -> Self {
        self.opts.year_option_ratio = ratio;
        self
    }

    /// Set the wait applied after next-page clicks.
    pub fn url_change_timeout(mut self, timeout: Duration) -> Self {
        self.opts.url_change_timeout = timeout;
        self
    }

    /// Pin the clock used for future-date rejection.
    pub fn reference_time(mut self, at: DateTime<Utc>) -> Self {
        self.opts.reference_time = Some(at);
        self
    }

    /// Set the content type for extracted output.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.opts.content_type = content_type;
        self
    }

    /// Build the Newsroom with the configured options.
    pub fn build(self) -> Newsroom {
        Newsroom::new(self.opts)
    }
}

impl Default for NewsroomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_str_accepts_aliases() {
        assert_eq!(ContentType::from("md"), ContentType::Markdown);
        assert_eq!(ContentType::from("TXT"), ContentType::Text);
        assert_eq!(ContentType::from("anything"), ContentType::Html);
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let opts = Options::default();
        assert_eq!(opts.max_attempts, 5);
        assert_eq!(opts.min_group_urls, 4);
        assert_eq!(opts.max_title_chars, 200);
        assert_eq!(opts.url_change_timeout, Duration::from_secs(5));
        assert!((opts.hidden_ratio_threshold - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_overrides_fields() {
        let at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let newsroom = NewsroomBuilder::new()
            .max_attempts(2)
            .reference_time(at)
            .content_type(ContentType::Text)
            .build();
        assert_eq!(newsroom.options().max_attempts, 2);
        assert_eq!(newsroom.options().now(), at);
        assert_eq!(newsroom.options().content_type, ContentType::Text);
    }
}
