// ABOUTME: Probes a listing-page snapshot for pagination controls: year dropdowns, load-more triggers, next links.
// ABOUTME: Each probe family is an ordered list; results carry CSS paths the renderer resolves and acts on.

use ego_tree::NodeRef;
use serde::Serialize;

use super::anchors::is_hidden;
use super::renderer::css_path;
use crate::dom::{
    element, element_ancestors, element_descendants, normalized_text, own_text, parent_element,
    DomNode, Snapshot,
};
use crate::options::Options;

/// A control found on the page, addressed by CSS path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlMatch {
    /// Name of the probe that matched.
    pub probe: &'static str,
    pub selector: String,
    pub text: String,
}

impl ControlMatch {
    fn new(probe: &'static str, node: NodeRef<'_, DomNode>) -> Self {
        Self {
            probe,
            selector: css_path(node),
            text: normalized_text(node),
        }
    }
}

/// A `<select>` whose options are mostly years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSelector {
    pub selector: String,
    /// Trimmed option texts in order.
    pub options: Vec<String>,
    pub has_all: bool,
}

impl YearSelector {
    /// Options that are exactly four digits.
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(String::as_str).filter(|o| is_year(o))
    }

    /// First option whose text contains "all".
    pub fn all_option(&self) -> Option<&str> {
        self.options
            .iter()
            .map(String::as_str)
            .find(|o| o.to_lowercase().contains("all"))
    }
}

fn is_year(text: &str) -> bool {
    text.len() == 4 && text.chars().all(|c| c.is_ascii_digit())
}

/// First dropdown with at least two options where years exceed the configured share.
pub fn find_year_selector(snapshot: &Snapshot, opts: &Options) -> Option<YearSelector> {
    snapshot
        .elements()
        .filter(|n| element(*n).is_some_and(|el| el.is("select")))
        .find_map(|select| {
            let options: Vec<String> = element_descendants(select)
                .filter(|n| element(*n).is_some_and(|el| el.is("option")))
                .map(normalized_text)
                .collect();
            if options.len() < 2 {
                return None;
            }
            let year_count = options.iter().filter(|o| is_year(o)).count();
            if (year_count as f64) <= options.len() as f64 * opts.year_option_ratio {
                return None;
            }
            let has_all = options.iter().any(|o| o.to_lowercase().contains("all"));
            Some(YearSelector {
                selector: css_path(select),
                options,
                has_all,
            })
        })
}

/// One way a "load more" trigger shows up in markup.
#[derive(Debug, Clone, Copy)]
enum LoadMoreProbe {
    /// Own text of one of `tags` contains the phrase.
    Text(&'static str, &'static [&'static str], &'static str),
    /// Class attribute of one of `tags` contains the fragment.
    Class(&'static str, &'static [&'static str], &'static str),
    /// Id attribute of one of `tags` contains the fragment.
    Id(&'static str, &'static [&'static str], &'static str),
    /// A button holding a "more" icon or whose own text mentions More.
    MoreIconButton,
    /// A button mentioning More that is not a "Learn More" link.
    MoreButtonNotLearn,
    /// Exact ARIA label.
    AriaLabel(&'static str, &'static str),
}

const LOAD_MORE_PROBES: &[LoadMoreProbe] = &[
    LoadMoreProbe::Text("li-more-news", &["li"], "More News"),
    LoadMoreProbe::Text("li-load-more", &["li"], "Load More"),
    LoadMoreProbe::Text("button-load-more", &["button"], "Load More"),
    LoadMoreProbe::Text("button-show-more", &["button"], "Show More"),
    LoadMoreProbe::Text("link-show-more", &["a"], "Show More"),
    LoadMoreProbe::Text("link-load-more", &["a"], "Load More"),
    LoadMoreProbe::Text("span-load-more", &["span"], "Load More"),
    LoadMoreProbe::Text("div-load-more", &["div"], "Load More"),
    LoadMoreProbe::Class("div-class-load-more", &["div"], "load-more"),
    LoadMoreProbe::Class("div-class-loadmore", &["div"], "loadMore"),
    LoadMoreProbe::Class("button-class-more", &["button"], "more"),
    LoadMoreProbe::Class("button-class-load-more", &["button"], "load-more"),
    LoadMoreProbe::Class("link-class-load-more", &["a"], "load-more"),
    LoadMoreProbe::Class("link-class-loadmore", &["a"], "loadMore"),
    LoadMoreProbe::Id("button-id-load-more", &["button"], "load-more"),
    LoadMoreProbe::Id("button-id-loadmore", &["button"], "loadMore"),
    LoadMoreProbe::Id("div-id-load-more", &["div"], "load-more"),
    LoadMoreProbe::Text("view-more", &["button", "a"], "View More"),
    LoadMoreProbe::Text("see-more", &["button", "a"], "See More"),
    LoadMoreProbe::MoreIconButton,
    LoadMoreProbe::MoreButtonNotLearn,
    LoadMoreProbe::AriaLabel("aria-load-more", "Load more"),
    LoadMoreProbe::AriaLabel("aria-show-more", "Show more"),
];

impl LoadMoreProbe {
    fn name(self) -> &'static str {
        match self {
            LoadMoreProbe::Text(name, ..)
            | LoadMoreProbe::Class(name, ..)
            | LoadMoreProbe::Id(name, ..)
            | LoadMoreProbe::AriaLabel(name, _) => name,
            LoadMoreProbe::MoreIconButton => "button-more-icon",
            LoadMoreProbe::MoreButtonNotLearn => "button-more-not-learn",
        }
    }

    fn matches(self, node: NodeRef<'_, DomNode>) -> bool {
        let Some(el) = element(node) else {
            return false;
        };
        match self {
            LoadMoreProbe::Text(_, tags, phrase) => {
                el.is_any(tags) && own_text(node).contains(phrase)
            }
            LoadMoreProbe::Class(_, tags, fragment) => {
                el.is_any(tags) && el.attr("class").is_some_and(|c| c.contains(fragment))
            }
            LoadMoreProbe::Id(_, tags, fragment) => {
                el.is_any(tags) && el.attr("id").is_some_and(|id| id.contains(fragment))
            }
            LoadMoreProbe::MoreIconButton => {
                el.is("button")
                    && (own_text(node).contains("More")
                        || element_descendants(node).any(|d| {
                            element(d).is_some_and(|i| {
                                i.is("i") && i.attr("class").is_some_and(|c| c.contains("more"))
                            })
                        }))
            }
            LoadMoreProbe::MoreButtonNotLearn => {
                let text = own_text(node);
                el.is("button") && text.contains("More") && !text.contains("Learn")
            }
            LoadMoreProbe::AriaLabel(_, label) => el.attr("aria-label") == Some(label),
        }
    }
}

/// Visible "load more" triggers, one per matching probe, in probe priority order.
pub fn load_more_candidates(snapshot: &Snapshot) -> Vec<ControlMatch> {
    LOAD_MORE_PROBES
        .iter()
        .filter_map(|probe| {
            snapshot
                .elements()
                .find(|n| probe.matches(*n) && !is_hidden(*n))
                .map(|n| ControlMatch::new(probe.name(), n))
        })
        .collect()
}

/// One way a numbered-pagination "next" control shows up. Every probe only
/// considers markup inside a list item.
#[derive(Debug, Clone, Copy)]
enum NextProbe {
    /// A list item whose class mentions both "page" and "next".
    PagerItem,
    /// An icon element with one of `classes`; the control is its parent.
    Icon {
        name: &'static str,
        tag: &'static str,
        classes: &'static [&'static str],
        within_link: bool,
    },
    /// A screen-reader "Next" span; the control is its grandparent.
    ScreenReaderNext,
    /// A span labeled "Next" for assistive tech; the control is its parent.
    AriaNextSpan,
    /// A `page=` link with a descendant classed next/right.
    PageLinkWithArrow,
    /// A `page=` link with rel=next or an aria-label mentioning Next.
    PageLinkRelNext,
}

const NEXT_PROBES: &[NextProbe] = &[
    NextProbe::PagerItem,
    NextProbe::Icon {
        name: "glyphicon-right",
        tag: "span",
        classes: &["glyphicon-menu-right"],
        within_link: true,
    },
    NextProbe::Icon {
        name: "arrow-span",
        tag: "span",
        classes: &["arrow-right", "next-arrow"],
        within_link: false,
    },
    NextProbe::Icon {
        name: "chevron-icon",
        tag: "i",
        classes: &["fa-chevron-right", "fa-arrow-right"],
        within_link: false,
    },
    NextProbe::ScreenReaderNext,
    NextProbe::AriaNextSpan,
    NextProbe::PageLinkWithArrow,
    NextProbe::PageLinkRelNext,
];

fn inside_list_item(node: NodeRef<'_, DomNode>) -> bool {
    element_ancestors(node).any(|a| element(a).is_some_and(|el| el.is("li")))
}

fn class_contains_any(node: NodeRef<'_, DomNode>, fragments: &[&str]) -> bool {
    element(node)
        .and_then(|el| el.attr("class"))
        .is_some_and(|c| fragments.iter().any(|f| c.contains(f)))
}

fn is_page_link(node: NodeRef<'_, DomNode>) -> bool {
    element(node)
        .is_some_and(|el| el.is("a") && el.attr("href").is_some_and(|h| h.contains("page=")))
}

impl NextProbe {
    fn name(self) -> &'static str {
        match self {
            NextProbe::PagerItem => "pager-item",
            NextProbe::Icon { name, .. } => name,
            NextProbe::ScreenReaderNext => "sr-only-next",
            NextProbe::AriaNextSpan => "aria-next",
            NextProbe::PageLinkWithArrow => "page-link-arrow",
            NextProbe::PageLinkRelNext => "page-link-rel-next",
        }
    }

    /// The element the probe points at, before resolving what to click.
    fn target(self, node: NodeRef<'_, DomNode>) -> Option<NodeRef<'_, DomNode>> {
        let el = element(node)?;
        match self {
            NextProbe::PagerItem => {
                let class = el.attr("class")?.to_lowercase();
                (el.is("li") && class.contains("page") && class.contains("next")).then_some(node)
            }
            NextProbe::Icon {
                tag,
                classes,
                within_link,
                ..
            } => {
                if !el.is(tag) || !class_contains_any(node, classes) || !inside_list_item(node) {
                    return None;
                }
                if within_link {
                    let link_inside_li = element_ancestors(node)
                        .take_while(|a| element(*a).is_some_and(|e| !e.is("li")))
                        .any(|a| element(a).is_some_and(|e| e.is("a")));
                    if !link_inside_li {
                        return None;
                    }
                }
                parent_element(node)
            }
            NextProbe::ScreenReaderNext => {
                if el.is("span")
                    && class_contains_any(node, &["sr-only"])
                    && own_text(node).contains("Next")
                    && inside_list_item(node)
                {
                    parent_element(node).and_then(parent_element)
                } else {
                    None
                }
            }
            NextProbe::AriaNextSpan => {
                (el.is("span") && el.attr("aria-label") == Some("Next") && inside_list_item(node))
                    .then(|| parent_element(node))
                    .flatten()
            }
            NextProbe::PageLinkWithArrow => (is_page_link(node)
                && inside_list_item(node)
                && element_descendants(node).any(|d| class_contains_any(d, &["next", "right"])))
            .then_some(node),
            NextProbe::PageLinkRelNext => (is_page_link(node)
                && inside_list_item(node)
                && (el.attr("rel").is_some_and(|r| r.contains("next"))
                    || el.attr("aria-label").is_some_and(|l| l.contains("Next"))))
            .then_some(node),
        }
    }
}

/// What to click for a matched target: the target itself if it is a link,
/// else its first descendant button, else its first descendant link.
fn clickable(target: NodeRef<'_, DomNode>) -> Option<NodeRef<'_, DomNode>> {
    let el = element(target)?;
    if el.is("a") {
        return Some(target);
    }
    let first_with = |tag: &str| {
        element_descendants(target).find(|d| element(*d).is_some_and(|e| e.is(tag)))
    };
    first_with("button").or_else(|| first_with("a"))
}

/// "Next page" controls, one per matching probe, in probe priority order.
pub fn next_page_candidates(snapshot: &Snapshot) -> Vec<ControlMatch> {
    NEXT_PROBES
        .iter()
        .filter_map(|probe| {
            let target = snapshot.elements().find_map(|n| probe.target(n))?;
            clickable(target).map(|c| ControlMatch::new(probe.name(), c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(body: &str) -> Snapshot {
        Snapshot::parse(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn year_selector_with_all_option() {
        let s = snap(
            r#"<select id="sort"><option>Newest</option><option>Oldest</option></select>
               <select id="year"><option>All</option><option>2024</option><option>2023</option><option>2022</option><option>2021</option></select>"#,
        );
        let ys = find_year_selector(&s, &Options::default()).unwrap();
        assert!(ys.has_all);
        assert_eq!(ys.all_option(), Some("All"));
        assert_eq!(ys.years().collect::<Vec<_>>(), vec!["2024", "2023", "2022", "2021"]);
        assert!(ys.selector.ends_with("select:nth-of-type(2)"));
    }

    #[test]
    fn year_selector_needs_mostly_years() {
        let s = snap(
            r#"<select><option>Select year</option><option>All topics</option><option>2024</option><option>2023</option></select>"#,
        );
        assert!(find_year_selector(&s, &Options::default()).is_none());
        let s = snap(r#"<select><option>2024</option></select>"#);
        assert!(find_year_selector(&s, &Options::default()).is_none());
    }

    #[test]
    fn load_more_probes_in_priority_order() {
        let s = snap(
            r#"<div class="load-more-wrap">x</div>
               <button id="more">Load More</button>"#,
        );
        let found = load_more_candidates(&s);
        assert_eq!(found[0].probe, "button-load-more");
        assert_eq!(found[0].text, "Load More");
        assert_eq!(found[1].probe, "div-class-load-more");
    }

    #[test]
    fn load_more_skips_hidden_controls() {
        let s = snap(r#"<button class="btn hidden">Load More</button>"#);
        assert!(load_more_candidates(&s).is_empty());
    }

    #[test]
    fn learn_more_only_matches_icon_probe() {
        let s = snap(r#"<button>Learn More</button>"#);
        let probes: Vec<_> = load_more_candidates(&s).into_iter().map(|c| c.probe).collect();
        assert_eq!(probes, vec!["button-more-icon"]);
    }

    #[test]
    fn aria_label_probe() {
        let s = snap(r#"<div role="button" aria-label="Show more">+</div>"#);
        let found = load_more_candidates(&s);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].probe, "aria-show-more");
    }

    #[test]
    fn pager_item_resolves_to_inner_link() {
        let s = snap(
            r#"<ul class="pagination"><li class="Page-Item"><a href="?page=1">1</a></li>
               <li class="page-item NEXT"><a href="?page=2">Next</a></li></ul>"#,
        );
        let found = next_page_candidates(&s);
        assert_eq!(found[0].probe, "pager-item");
        assert_eq!(found[0].text, "Next");
        assert!(found[0].selector.ends_with("li:nth-of-type(2) > a:nth-of-type(1)"));
    }

    #[test]
    fn icon_probes_climb_to_parent() {
        let s = snap(
            r#"<ul><li><a href="/news?page=3"><i class="fa fa-chevron-right"></i></a></li></ul>"#,
        );
        let probes: Vec<_> = next_page_candidates(&s).into_iter().map(|c| c.probe).collect();
        assert_eq!(probes, vec!["chevron-icon", "page-link-arrow"]);
    }

    #[test]
    fn screen_reader_next_uses_grandparent() {
        let s = snap(
            r#"<ul><li><a href="/p/2"><span><span class="sr-only">Next</span></span></a></li></ul>"#,
        );
        let found = next_page_candidates(&s);
        assert_eq!(found[0].probe, "sr-only-next");
        assert!(found[0].selector.ends_with("li:nth-of-type(1) > a:nth-of-type(1)"));
    }

    #[test]
    fn targets_without_clickables_are_skipped() {
        let s = snap(r#"<ul><li class="page-next"><span>Next</span></li></ul>"#);
        assert!(next_page_candidates(&s).is_empty());
    }

    #[test]
    fn rel_next_page_link() {
        let s = snap(r#"<ul><li><a href="/news?page=2" rel="next">2</a></li></ul>"#);
        let found = next_page_candidates(&s);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].probe, "page-link-rel-next");
    }
}
