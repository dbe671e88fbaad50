// ABOUTME: Labels the publication date from meta tags, JSON-LD, or scored date patterns in page text.
// ABOUTME: Text dates in the future are rejected; class and keyword signals break ties between the rest.

use aho_corasick::AhoCorasick;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use super::metadata::first_ld_json;
use crate::dom::{element, element_ancestors, parent_element, text_content, DomNode, Snapshot};
use crate::labels::{Label, TEXT_WRAPPER_TAG};
use crate::options::Options;

const PUBLISHED_META_PROPERTIES: &[&str] = &["article:published_time", "og:published_time"];

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static SLASH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{2,4})").unwrap());
static MONTH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* (\d{1,2}),? (\d{4})")
        .unwrap()
});

static PUBLICATION_WORDS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(["press", "release", "published", "posted"])
        .unwrap()
});

const CLASS_SCORE: u32 = 5;
const KEYWORD_SCORE: u32 = 5;

/// Parse a date string, trying RFC3339 first then falling back to dateparser.
///
/// Date-only forms are read as midnight UTC so the calendar day never shifts.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const LOOSE_PATTERNS: &[&str] = &[
        "%Y-%m-%d",  // 2024-01-05
        "%b %e, %Y", // Jan 5, 2024
        "%e %b %Y",  // 5 Jan 2024
        "%b %d, %Y", // Jan 05, 2024
        "%d %b %Y",  // 05 Jan 2024
        "%B %e, %Y", // January 5, 2024
        "%e %B %Y",  // 5 January 2024
        "%B %d, %Y", // January 05, 2024
        "%d %B %Y",  // 05 January 2024
    ];
    for pat in LOOSE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(s, pat) {
            return midnight_utc(date);
        }
    }

    if let Ok(dt) = dateparser::parse(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Date shapes recognised inside page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDatePattern {
    /// `2024-03-05`
    Iso,
    /// `3/5/2024` or `3/5/24`, month first unless the first field exceeds 12.
    Slash,
    /// `March 5, 2024`, `Mar 5 2024`
    MonthName,
}

impl TextDatePattern {
    pub const ALL: [TextDatePattern; 3] = [
        TextDatePattern::Iso,
        TextDatePattern::Slash,
        TextDatePattern::MonthName,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            TextDatePattern::Iso => &ISO_DATE_RE,
            TextDatePattern::Slash => &SLASH_DATE_RE,
            TextDatePattern::MonthName => &MONTH_DATE_RE,
        }
    }

    fn to_date(self, caps: &Captures<'_>, now: DateTime<Utc>) -> Option<NaiveDate> {
        let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
        match self {
            TextDatePattern::Iso => NaiveDate::from_ymd_opt(num(1)? as i32, num(2)?, num(3)?),
            TextDatePattern::Slash => {
                let year = match caps.get(3)?.as_str().len() {
                    4 => num(3)? as i32,
                    2 => pivot_two_digit_year(num(3)? as i32, now.year()),
                    _ => return None,
                };
                let (first, second) = (num(1)?, num(2)?);
                let (month, day) = if first > 12 {
                    (second, first)
                } else {
                    (first, second)
                };
                NaiveDate::from_ymd_opt(year, month, day)
            }
            TextDatePattern::MonthName => {
                let month = month_number(caps.get(1)?.as_str())?;
                NaiveDate::from_ymd_opt(num(3)? as i32, month, num(2)?)
            }
        }
    }

    /// First match of this pattern in `text`, parsed relative to `now`.
    pub fn find(self, text: &str, now: DateTime<Utc>) -> Option<(String, DateTime<Utc>)> {
        let caps = self.regex().captures(text)?;
        let matched = caps.get(0)?.as_str().to_string();
        let date = self.to_date(&caps, now)?;
        Some((matched, midnight_utc(date)?))
    }
}

/// `24` is 2024 unless that lies after `current_year`, in which case it is 1924.
fn pivot_two_digit_year(yy: i32, current_year: i32) -> i32 {
    if 2000 + yy > current_year {
        1900 + yy
    } else {
        2000 + yy
    }
}

fn month_number(abbrev: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    MONTHS
        .iter()
        .position(|m| *m == abbrev)
        .map(|i| i as u32 + 1)
}

/// A date found in page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    /// The text wrapper holding the match.
    pub node: NodeId,
    pub matched: String,
    pub value: DateTime<Utc>,
    pub score: u32,
}

fn has_news_date_class(node: NodeRef<'_, DomNode>) -> bool {
    element(node).is_some_and(|el| {
        let classes = el.classes().collect::<Vec<_>>().join(" ").to_lowercase();
        classes.contains("new") && classes.contains("date")
    })
}

fn score(wrapper: NodeRef<'_, DomNode>) -> u32 {
    let mut total = 0;
    if element_ancestors(wrapper).any(has_news_date_class) {
        total += CLASS_SCORE;
    }
    let surrounding = parent_element(wrapper)
        .map(text_content)
        .unwrap_or_default();
    if PUBLICATION_WORDS.is_match(&surrounding) {
        total += KEYWORD_SCORE;
    }
    total
}

/// Scan every text wrapper for date patterns, in document order.
pub fn text_date_candidates(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<DateCandidate> {
    let mut candidates = Vec::new();
    let wrappers = snapshot
        .elements()
        .filter(|n| element(*n).is_some_and(|el| el.is(TEXT_WRAPPER_TAG)));
    for wrapper in wrappers {
        let text = text_content(wrapper);
        for pattern in TextDatePattern::ALL {
            let Some((matched, value)) = pattern.find(&text, now) else {
                continue;
            };
            if value > now {
                debug!(%matched, "skipping future date");
                continue;
            }
            candidates.push(DateCandidate {
                node: wrapper.id(),
                score: score(wrapper),
                matched,
                value,
            });
        }
    }
    candidates
}

/// Highest score wins; the earliest candidate wins ties.
pub fn best_candidate(candidates: Vec<DateCandidate>) -> Option<DateCandidate> {
    candidates.into_iter().fold(None, |best, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(c),
    })
}

fn meta_date(snapshot: &Snapshot) -> Option<(NodeId, DateTime<Utc>)> {
    snapshot
        .elements()
        .filter_map(|n| element(n).map(|el| (n.id(), el)))
        .filter(|(_, el)| {
            el.is("meta")
                && el.attr("property").is_some_and(|p| {
                    PUBLISHED_META_PROPERTIES
                        .iter()
                        .any(|want| p.trim().eq_ignore_ascii_case(want))
                })
        })
        .find_map(|(id, el)| Some((id, parse_date(el.attr("content")?)?)))
}

fn json_ld_date(snapshot: &Snapshot) -> Option<(NodeId, DateTime<Utc>)> {
    let (id, map) = first_ld_json(snapshot)?;
    let raw = map.get("datePublished").and_then(Value::as_str)?;
    Some((id, parse_date(raw)?))
}

/// Label the publication date. Returns the parsed value.
pub fn mark_date(snapshot: &mut Snapshot, opts: &Options) -> Option<DateTime<Utc>> {
    if let Some((id, at)) = meta_date(snapshot).or_else(|| json_ld_date(snapshot)) {
        debug!(date = %at, "date from metadata");
        snapshot.apply_label(id, &Label::Date(at));
        return Some(at);
    }

    let candidates = text_date_candidates(snapshot, opts.now());
    debug!(candidates = candidates.len(), "text date candidates");
    let best = best_candidate(candidates)?;
    debug!(matched = %best.matched, score = best.score, "date from page text");
    snapshot.apply_label(best.node, &Label::Date(best.value));
    Some(best.value)
}
