// ABOUTME: Groups listing-page anchors by ancestry and selects the single group of article links.
// ABOUTME: Computes per-group features, applies the filter cascade, and resolves the winner's URLs.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::anchors::{collect_anchors, AnchorRecord};
use super::features::{has_action_verb, is_social_media_url, last_path_length, StructureProfile};
use crate::dom::Snapshot;
use crate::options::Options;

/// Measurements taken over one anchor group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupFeatures {
    pub url_count: usize,
    pub typical_url_count: usize,
    pub social_media_count: usize,
    pub social_media_pct: f64,
    pub structure: StructureProfile,
    pub urls_with_verbs: usize,
    pub verb_percentage: f64,
    pub last_path_mean_length: f64,
    pub last_path_median_length: usize,
    /// Another group has exactly the same URL set.
    pub twin_group: bool,
    /// Another group shares at least one URL.
    pub overlapping_urls: bool,
    pub unique_strict_ancestries: usize,
}

/// Anchors sharing one flexible ancestry path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorGroup {
    pub ancestry: String,
    pub anchors: Vec<AnchorRecord>,
    /// Hrefs in anchor order. Absolute once the group has been selected.
    pub urls: Vec<String>,
    pub features: GroupFeatures,
}

impl AnchorGroup {
    /// Fraction of anchors in this group that are hidden.
    pub fn hidden_ratio(&self) -> f64 {
        if self.anchors.is_empty() {
            return 0.0;
        }
        let hidden = self.anchors.iter().filter(|a| a.hidden).count();
        hidden as f64 / self.anchors.len() as f64
    }

    fn url_set(&self) -> BTreeSet<&str> {
        self.urls.iter().map(String::as_str).collect()
    }
}

/// Partition anchors by flexible ancestry. Within a group each href is kept once.
pub fn group_anchors(anchors: Vec<AnchorRecord>) -> Vec<AnchorGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, AnchorGroup> = HashMap::new();

    for anchor in anchors {
        let group = groups
            .entry(anchor.flexible_ancestry.clone())
            .or_insert_with(|| {
                order.push(anchor.flexible_ancestry.clone());
                AnchorGroup {
                    ancestry: anchor.flexible_ancestry.clone(),
                    anchors: Vec::new(),
                    urls: Vec::new(),
                    features: GroupFeatures::default(),
                }
            });
        if group.urls.contains(&anchor.href) {
            continue;
        }
        group.urls.push(anchor.href.clone());
        group.anchors.push(anchor);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .collect()
}

/// Fill in every group's features, including cross-group twin and overlap flags.
pub fn compute_features(groups: &mut [AnchorGroup]) {
    let sets: Vec<BTreeSet<String>> = groups
        .iter()
        .map(|g| g.url_set().into_iter().map(str::to_string).collect())
        .collect();

    for (i, group) in groups.iter_mut().enumerate() {
        let mut twin = false;
        let mut overlap = false;
        for (j, other) in sets.iter().enumerate() {
            if i == j {
                continue;
            }
            twin |= *other == sets[i];
            overlap |= !other.is_disjoint(&sets[i]);
            if twin && overlap {
                break;
            }
        }
        group.features = measure(group, twin, overlap);
    }
}

fn measure(group: &AnchorGroup, twin_group: bool, overlapping_urls: bool) -> GroupFeatures {
    let url_count = group.urls.len();
    let pct = |n: usize| {
        if url_count == 0 {
            0.0
        } else {
            n as f64 * 100.0 / url_count as f64
        }
    };

    let social_media_count = group.urls.iter().filter(|u| is_social_media_url(u)).count();
    let urls_with_verbs = group.urls.iter().filter(|u| has_action_verb(u)).count();
    let mut lengths: Vec<usize> = group.urls.iter().map(|u| last_path_length(u)).collect();
    lengths.sort_unstable();
    let last_path_mean_length = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    };
    let last_path_median_length = lengths.get(lengths.len() / 2).copied().unwrap_or(0);
    let unique_strict_ancestries = group
        .anchors
        .iter()
        .map(|a| a.strict_ancestry.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    GroupFeatures {
        url_count,
        typical_url_count: group.anchors.iter().filter(|a| a.typical).count(),
        social_media_count,
        social_media_pct: pct(social_media_count),
        structure: StructureProfile::from_urls(group.urls.iter().map(String::as_str)),
        urls_with_verbs,
        verb_percentage: pct(urls_with_verbs),
        last_path_mean_length,
        last_path_median_length,
        twin_group,
        overlapping_urls,
        unique_strict_ancestries,
    }
}

/// Drop groups whose URL set repeats an earlier group's, keeping the first.
pub fn dedupe_url_sets(groups: Vec<AnchorGroup>) -> Vec<AnchorGroup> {
    let mut seen: Vec<BTreeSet<String>> = Vec::new();
    groups
        .into_iter()
        .filter(|g| {
            let set: BTreeSet<String> = g.urls.iter().cloned().collect();
            if seen.contains(&set) {
                false
            } else {
                seen.push(set);
                true
            }
        })
        .collect()
}

/// Narrow candidate groups to at most one through the selection cascade.
///
/// Primary filters drop groups with utility links, social links, too few
/// URLs, or any single-level URL. Among survivors the verb filter applies
/// only if it leaves something; then the longest median slug wins, then the
/// largest group. Anything other than exactly one survivor is no result.
pub fn select_group(groups: Vec<AnchorGroup>, opts: &Options) -> Option<AnchorGroup> {
    let mut candidates: Vec<AnchorGroup> = groups
        .into_iter()
        .filter(|g| {
            let f = &g.features;
            f.typical_url_count == 0
                && f.url_count > opts.min_group_urls
                && f.social_media_count == 0
                && f.url_count > 0
                && f.structure.multi_level_path == f.url_count
        })
        .collect();
    debug!(remaining = candidates.len(), "after primary filters");

    if candidates.len() > 1 {
        let verb_heavy: Vec<AnchorGroup> = candidates
            .iter()
            .filter(|g| g.features.verb_percentage > opts.verb_percentage_threshold)
            .cloned()
            .collect();
        if !verb_heavy.is_empty() {
            candidates = verb_heavy;
        }
        debug!(remaining = candidates.len(), "after verb filter");
    }

    if candidates.len() > 1 {
        let best = candidates
            .iter()
            .map(|g| g.features.last_path_median_length)
            .max()
            .unwrap_or(0);
        candidates.retain(|g| g.features.last_path_median_length == best);
        debug!(remaining = candidates.len(), best, "after median slug length");
    }

    if candidates.len() > 1 {
        let best = candidates
            .iter()
            .map(|g| g.features.url_count)
            .max()
            .unwrap_or(0);
        candidates.retain(|g| g.features.url_count == best);
        debug!(remaining = candidates.len(), best, "after url count");
    }

    if candidates.len() == 1 {
        candidates.pop()
    } else {
        None
    }
}

/// Resolve an href against the page URL. Absolute hrefs pass through.
pub fn resolve_url(base: Option<&Url>, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base.map(|b| b.join(href)) {
        Some(Ok(joined)) => joined.to_string(),
        _ => {
            warn!(href, "could not resolve link against page URL");
            href.to_string()
        }
    }
}

/// Find the single article-link group on a page, with absolute URLs.
#[instrument(level = "debug", skip(snapshot, opts))]
pub fn classify_page(snapshot: &Snapshot, page_url: &str, opts: &Options) -> Option<AnchorGroup> {
    let anchors = collect_anchors(snapshot);
    let mut groups = group_anchors(anchors);
    compute_features(&mut groups);
    let groups = dedupe_url_sets(groups);
    debug!(groups = groups.len(), "grouped anchors");

    let mut winner = select_group(groups, opts)?;
    let base = Url::parse(page_url).ok();
    winner.urls = winner
        .urls
        .iter()
        .map(|href| resolve_url(base.as_ref(), href))
        .collect();
    debug!(ancestry = %winner.ancestry, urls = winner.urls.len(), "selected article group");
    Some(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(prefix: &str, slugs: &[&str]) -> String {
        slugs
            .iter()
            .map(|s| format!(r#"<li><a href="{}/{}">{}</a></li>"#, prefix, s, s.replace('-', " ")))
            .collect()
    }

    fn page(body: &str) -> Snapshot {
        Snapshot::parse(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn groups_by_ancestry_and_dedupes_hrefs() {
        let snap = page(
            r#"<ul><li><a href="/a/1">1</a></li><li><a href="/a/1">again</a></li><li><a href="/a/2">2</a></li></ul>
               <p><a href="/b/1">b</a></p>"#,
        );
        let groups = group_anchors(collect_anchors(&snap));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].urls, vec!["/a/1", "/a/2"]);
        assert_eq!(groups[1].ancestry, "html > body > p");
    }

    #[test]
    fn twin_and_overlap_flags() {
        let snap = page(
            r#"<ul><li><a href="/n/1">1</a></li><li><a href="/n/2">2</a></li></ul>
               <div><a href="/n/2">2</a><a href="/n/1">1</a></div>
               <section><a href="/n/2">2</a><a href="/n/3">3</a></section>
               <aside><a href="/x/9">9</a></aside>"#,
        );
        let mut groups = group_anchors(collect_anchors(&snap));
        compute_features(&mut groups);
        let flags: Vec<_> = groups
            .iter()
            .map(|g| (g.features.twin_group, g.features.overlapping_urls))
            .collect();
        assert_eq!(
            flags,
            vec![(true, true), (true, true), (false, true), (false, false)]
        );

        let deduped = dedupe_url_sets(groups);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].ancestry, "html > body > ul > li");
    }

    #[test]
    fn median_uses_upper_middle() {
        let snap = page(
            r#"<div><a href="/n/aa">a</a><a href="/n/bbbb">b</a><a href="/n/cccccc">c</a><a href="/n/dddddddd">d</a></div>"#,
        );
        let mut groups = group_anchors(collect_anchors(&snap));
        compute_features(&mut groups);
        assert_eq!(groups[0].features.last_path_median_length, 6);
        assert!((groups[0].features.last_path_mean_length - 5.0).abs() < 1e-9);
    }

    #[test]
    fn news_group_beats_utility_links() {
        let news = list(
            "/news",
            &[
                "acme-announces-record-quarter",
                "acme-opens-ohio-plant",
                "acme-hires-new-cfo",
                "acme-unveils-widget-pro",
                "acme-signs-supply-deal",
                "acme-reports-q3-results",
            ],
        );
        let snap = page(&format!(
            r#"<nav><ul><li><a href="/legal">Legal</a></li><li><a href="/privacy">Privacy</a></li><li><a href="/terms">Terms</a></li><li><a href="/contact">Contact</a></li></ul></nav>
               <main><ul>{}</ul></main>"#,
            news
        ));
        let group = classify_page(&snap, "https://acme.com/newsroom", &Options::default()).unwrap();
        assert_eq!(group.urls.len(), 6);
        assert_eq!(group.urls[0], "https://acme.com/news/acme-announces-record-quarter");
        assert!(group.urls.iter().all(|u| u.starts_with("https://acme.com/news/")));
        assert_eq!(group.features.verb_percentage, 100.0);
    }

    #[test]
    fn repeated_classification_is_stable() {
        let two_lists = format!(
            "<section><ul>{}</ul></section><div><ul>{}</ul></div>",
            list(
                "/news",
                &[
                    "acme-opens-plant",
                    "acme-hires-cfo",
                    "acme-signs-deal",
                    "acme-wins-award",
                    "acme-raises-guidance",
                ],
            ),
            list(
                "/products",
                &["widget-pro", "widget-max", "widget-mini", "widget-air", "widget-go"],
            ),
        );
        let snap = page(&two_lists);
        let first = classify_page(&snap, "https://acme.com/", &Options::default());
        for _ in 0..3 {
            assert_eq!(classify_page(&snap, "https://acme.com/", &Options::default()), first);
        }
        assert_eq!(first.unwrap().ancestry, "html > body > section > ul > li");
    }

    #[test]
    fn four_links_are_not_enough() {
        let snap = page(&format!(
            "<ul>{}</ul>",
            list("/news", &["a-opens-b", "c-opens-d", "e-opens-f", "g-opens-h"])
        ));
        assert!(classify_page(&snap, "https://acme.com/", &Options::default()).is_none());
    }

    #[test]
    fn single_level_urls_disqualify_a_group() {
        let snap = page(r#"<div>
            <a href="https://acme.com">x1</a><a href="/n/a-opens-b">x2</a><a href="/n/c-opens-d">x3</a>
            <a href="/n/e-opens-f">x4</a><a href="/n/g-opens-h">x5</a></div>"#);
        assert!(classify_page(&snap, "https://acme.com/", &Options::default()).is_none());
    }

    #[test]
    fn verb_filter_then_median_then_count() {
        let verbs = list(
            "/news",
            &["acme-opens-a", "acme-opens-b", "acme-opens-c", "acme-opens-d", "acme-opens-e"],
        );
        let plain = list(
            "/products",
            &[
                "industrial-widget-alpha",
                "industrial-widget-bravo",
                "industrial-widget-charlie",
                "industrial-widget-delta",
                "industrial-widget-echo",
            ],
        );
        let snap = page(&format!(
            "<ul>{}</ul><ol>{}</ol>",
            verbs, plain
        ));
        let group = classify_page(&snap, "https://acme.com/", &Options::default()).unwrap();
        assert!(group.urls[0].contains("/news/"));

        // Without verbs, the longer median slug wins.
        let short = list("/a", &["one-1", "one-2", "one-3", "one-4", "one-5"]);
        let snap = page(&format!("<ul>{}</ul><ol>{}</ol>", short, plain));
        let group = classify_page(&snap, "https://acme.com/", &Options::default()).unwrap();
        assert!(group.urls[0].contains("/products/"));
    }

    #[test]
    fn full_tie_yields_nothing() {
        let a = list("/a", &["x-1", "x-2", "x-3", "x-4", "x-5"]);
        let b = list("/b", &["y-1", "y-2", "y-3", "y-4", "y-5"]);
        let snap = page(&format!("<ul>{}</ul><ol>{}</ol>", a, b));
        assert!(classify_page(&snap, "https://acme.com/", &Options::default()).is_none());
    }

    #[test]
    fn unresolvable_href_is_kept_raw() {
        assert_eq!(resolve_url(None, "/n/1"), "/n/1");
        let base = Url::parse("https://acme.com/newsroom/").unwrap();
        assert_eq!(resolve_url(Some(&base), "item"), "https://acme.com/newsroom/item");
        assert_eq!(
            resolve_url(Some(&base), "https://other.com/x"),
            "https://other.com/x"
        );
    }
}
