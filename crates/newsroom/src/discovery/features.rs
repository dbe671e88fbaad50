// ABOUTME: URL and anchor feature predicates used to score link groups on listing pages.
// ABOUTME: Covers social/utility link detection, URL structure profiling, slug length, and action-verb checks.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SOCIAL_MEDIA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[/.])?(?:facebook|twitter|instagram|linkedin|youtube|tiktok|pinterest|reddit|whatsapp)\.com(?:/|$)",
    )
    .unwrap()
});

static SCHEME_HOST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^/]+").unwrap());
static PROTOCOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());
static LABEL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9-]+\.").unwrap());
static PORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":[0-9]+").unwrap());
static FILE_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[a-zA-Z0-9]+$").unwrap());
static ANCHOR_WORD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());
static SLUG_WORD_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_\s.]").unwrap());

/// Site utility paths that never point at articles.
const UTILITY_PATHS: &[&str] = &[
    "/legal", "/terms", "/privacy", "/contact", "/careers", "/support", "/blog", "/events",
    "/about", "/faq", "/investors", "/search", "/sitemap", "/login", "/register", "/help",
    "/company",
];

/// Words that mark short anchor text as navigation.
const UTILITY_KEYWORDS: &[&str] = &[
    "legal", "terms", "policy", "privacy", "contact", "careers", "conditions", "locations",
    "faq", "investors", "about", "settings", "cookies", "blog", "support", "help", "resources",
    "events", "login", "register", "account", "search", "sitemap", "media", "press",
    "directory", "community", "company",
];

/// Verbs typical of press-release headlines.
const ACTION_VERBS: &[&str] = &[
    "announce", "start", "end", "finish", "open", "close", "report", "initiate", "terminate",
    "invest", "join", "collaborate", "hire", "agree", "surpass", "applaud", "raise", "deliver",
    "unveil", "plan", "showcase", "introduce", "present", "grant", "sign", "complete",
    "receive", "give", "select", "partner", "signal", "continue", "stop", "win", "launch", "set",
    "visit", "achieve", "dismiss", "take", "accelerate", "reach", "indicate", "enter", "exit",
    "produce", "create", "make", "move", "host", "locate", "forms",
];

const IRREGULAR_PAST: &[(&str, &str)] = &[
    ("take", "took"),
    ("give", "gave"),
    ("make", "made"),
    ("begin", "began"),
    ("win", "won"),
    ("set", "set"),
    ("create", "created"),
];

static VERB_FORMS: Lazy<HashSet<String>> = Lazy::new(|| {
    ACTION_VERBS
        .iter()
        .flat_map(|verb| verb_variations(verb))
        .collect()
});

/// True for links to the major social networks.
pub fn is_social_media_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    if lower.contains("/x.com") || lower.contains("www.x.com") {
        return true;
    }
    SOCIAL_MEDIA_RE.is_match(url)
}

/// True if an anchor points at a site utility page or reads like navigation.
pub fn is_typical_anchor(href: &str, text: &str) -> bool {
    let lower = href.to_lowercase();
    let path = SCHEME_HOST_RE.replace(&lower, "");
    let bare = path.strip_suffix('/').unwrap_or(&path);
    if UTILITY_PATHS.contains(&bare) {
        return true;
    }

    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    let words: Vec<String> = ANCHOR_WORD_SPLIT_RE
        .split(text)
        .map(|w| w.to_lowercase())
        .collect();
    words.len() <= 4 && words.iter().any(|w| UTILITY_KEYWORDS.contains(&w.as_str()))
}

/// Structural facts about one URL string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UrlStructure {
    pub has_protocol: bool,
    pub has_subdomain: bool,
    pub has_port: bool,
    pub has_query: bool,
    pub has_fragment: bool,
    pub has_file_extension: bool,
    pub is_relative: bool,
    pub multi_level_path: bool,
}

impl UrlStructure {
    pub fn analyze(url: &str) -> Self {
        let without_protocol = PROTOCOL_RE.replace(url, "");
        let domain = without_protocol.split('/').next().unwrap_or("");
        let before_query = url.split('?').next().unwrap_or("");
        let is_relative = url.starts_with('/');

        let multi_level_path = if is_relative {
            true
        } else {
            let path = without_protocol
                .split('?')
                .next()
                .unwrap_or("")
                .split('#')
                .next()
                .unwrap_or("");
            path.contains('/') && path.split('/').filter(|s| !s.is_empty()).count() >= 2
        };

        Self {
            has_protocol: PROTOCOL_RE.is_match(url),
            has_subdomain: !domain.starts_with("www.") && LABEL_PREFIX_RE.is_match(domain),
            has_port: PORT_RE.is_match(domain),
            has_query: url.contains('?'),
            has_fragment: url.contains('#'),
            has_file_extension: FILE_EXTENSION_RE.is_match(before_query),
            is_relative,
            multi_level_path,
        }
    }
}

/// Per-group counts of each structural flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StructureProfile {
    pub has_protocol: usize,
    pub has_subdomain: usize,
    pub has_port: usize,
    pub has_query: usize,
    pub has_fragment: usize,
    pub has_file_extension: usize,
    pub is_relative: usize,
    pub multi_level_path: usize,
}

impl StructureProfile {
    pub fn from_urls<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
        let mut profile = Self::default();
        for url in urls {
            let s = UrlStructure::analyze(url);
            profile.has_protocol += usize::from(s.has_protocol);
            profile.has_subdomain += usize::from(s.has_subdomain);
            profile.has_port += usize::from(s.has_port);
            profile.has_query += usize::from(s.has_query);
            profile.has_fragment += usize::from(s.has_fragment);
            profile.has_file_extension += usize::from(s.has_file_extension);
            profile.is_relative += usize::from(s.is_relative);
            profile.multi_level_path += usize::from(s.multi_level_path);
        }
        profile
    }
}

/// The slug that carries an article's identity: the last path segment, or
/// the one before it when the last is a file name. None when a file name is
/// the only segment.
fn meaningful_segment(url: &str) -> Option<&str> {
    let clean = url
        .split('?')
        .next()
        .unwrap_or("")
        .split('#')
        .next()
        .unwrap_or("");
    let clean = clean.trim_end_matches('/');
    let segments: Vec<&str> = clean.split('/').collect();
    let last = *segments.last()?;
    if FILE_EXTENSION_RE.is_match(last) {
        if segments.len() < 2 {
            return None;
        }
        Some(segments[segments.len() - 2])
    } else {
        Some(last)
    }
}

/// Character length of the meaningful last path segment.
pub fn last_path_length(url: &str) -> usize {
    meaningful_segment(url).map(|s| s.chars().count()).unwrap_or(0)
}

/// Base, third-person, and past-tense forms of a verb.
pub fn verb_variations(verb: &str) -> HashSet<String> {
    let mut forms = HashSet::new();
    forms.insert(verb.to_string());
    forms.insert(format!("{}s", verb));
    if let Some(stem) = verb.strip_suffix('y') {
        forms.insert(format!("{}ies", stem));
    }

    match IRREGULAR_PAST.iter().find(|(base, _)| *base == verb) {
        Some((_, past)) => {
            forms.insert(past.to_string());
        }
        None => {
            if verb.ends_with('e') {
                forms.insert(format!("{}d", verb));
            } else if let Some(stem) = verb.strip_suffix('y') {
                forms.insert(format!("{}ied", stem));
            } else {
                forms.insert(format!("{}ed", verb));
            }
        }
    }
    forms
}

/// True if the URL slug has at least two words and one is an action verb form.
pub fn has_action_verb(url: &str) -> bool {
    let Some(segment) = meaningful_segment(url) else {
        return false;
    };
    let words: Vec<String> = SLUG_WORD_SPLIT_RE
        .split(segment)
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    if words.len() <= 1 {
        return false;
    }
    words.iter().any(|w| VERB_FORMS.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_media_detection() {
        assert!(is_social_media_url("https://www.facebook.com/acme"));
        assert!(is_social_media_url("https://LinkedIn.com/company/acme"));
        assert!(is_social_media_url("https://x.com/acme"));
        assert!(is_social_media_url("https://twitter.com"));
        assert!(!is_social_media_url("https://example.com/news/facebook-partnership"));
    }

    #[test]
    fn typical_paths_match_exactly() {
        assert!(is_typical_anchor("/privacy", "Read"));
        assert!(is_typical_anchor("https://acme.com/careers/", "Join"));
        assert!(!is_typical_anchor("/privacy/2024-update", "Read the update"));
        assert!(!is_typical_anchor("/news/acme-opens-plant", "Acme opens new plant in Ohio today"));
    }

    #[test]
    fn typical_text_needs_keyword_and_short_text() {
        assert!(is_typical_anchor("/x", "Privacy Policy"));
        assert!(is_typical_anchor("/x", "Investor-Relations and Media"));
        assert!(!is_typical_anchor("/x", "Acme expands media partnership with Globex in Europe"));
        assert!(!is_typical_anchor("/x", ""));
    }

    #[test]
    fn structure_of_relative_and_absolute_urls() {
        let rel = UrlStructure::analyze("/news/item.pdf?x=1");
        assert!(rel.is_relative && rel.multi_level_path && rel.has_query);
        assert!(rel.has_file_extension);
        assert!(!rel.has_protocol);

        let abs = UrlStructure::analyze("https://news.acme.com:8080/2024/launch#top");
        assert!(abs.has_protocol && abs.has_subdomain && abs.has_port && abs.has_fragment);
        assert!(abs.multi_level_path);

        let www = UrlStructure::analyze("https://www.acme.com");
        assert!(!www.has_subdomain);
        assert!(!www.multi_level_path);
    }

    #[test]
    fn last_path_length_skips_file_names() {
        assert_eq!(last_path_length("/news/acme-opens-plant/"), 16);
        assert_eq!(last_path_length("/news/acme-opens-plant/index.html"), 16);
        assert_eq!(last_path_length("report.pdf"), 0);
        assert_eq!(last_path_length("/news?page=2"), 4);
    }

    #[test]
    fn verb_forms() {
        let forms = verb_variations("announce");
        assert!(forms.contains("announces") && forms.contains("announced"));
        let forms = verb_variations("take");
        assert!(forms.contains("took") && !forms.contains("taked"));
        let forms = verb_variations("deliver");
        assert!(forms.contains("delivered"));
    }

    #[test]
    fn action_verb_requires_two_words() {
        assert!(has_action_verb("/news/acme-announces-q3-results"));
        assert!(has_action_verb("/news/acme_completed_merger/index.html"));
        assert!(!has_action_verb("/news/announces"));
        assert!(!has_action_verb("/news/quarterly-results"));
    }
}
