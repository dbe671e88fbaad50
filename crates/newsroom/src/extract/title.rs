// ABOUTME: Labels the article title from Open Graph, JSON-LD headline, or article/page h1 candidates.
// ABOUTME: Among candidates under the length limit, the longest text wins.

use ego_tree::NodeId;
use serde_json::Value;
use tracing::debug;

use super::metadata::{find_meta, first_ld_json, meta_content};
use crate::dom::{element_descendants, normalized_text, Snapshot};
use crate::labels::Label;
use crate::options::Options;

/// A title candidate and the node the label would go on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCandidate {
    pub source: TitleSource,
    pub node: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    OpenGraph,
    JsonLdHeadline,
    ArticleHeading,
    PageHeading,
}

fn open_graph(snapshot: &Snapshot) -> Option<TitleCandidate> {
    let meta = find_meta(snapshot, "property", "og:title")?;
    Some(TitleCandidate {
        source: TitleSource::OpenGraph,
        node: meta.id(),
        text: meta_content(meta)?,
    })
}

fn json_ld_headline(snapshot: &Snapshot) -> Option<TitleCandidate> {
    let (node, map) = first_ld_json(snapshot)?;
    let text = map.get("headline").and_then(Value::as_str)?.trim().to_string();
    Some(TitleCandidate {
        source: TitleSource::JsonLdHeadline,
        node,
        text,
    })
}

fn article_heading(snapshot: &Snapshot) -> Option<TitleCandidate> {
    let article = snapshot.find(|el| el.is("article"))?;
    let h1 = element_descendants(article)
        .find(|n| n.value().as_element().is_some_and(|el| el.is("h1")))?;
    Some(TitleCandidate {
        source: TitleSource::ArticleHeading,
        node: h1.id(),
        text: normalized_text(h1),
    })
}

fn page_heading(snapshot: &Snapshot) -> Option<TitleCandidate> {
    let h1 = snapshot.find(|el| el.is("h1"))?;
    Some(TitleCandidate {
        source: TitleSource::PageHeading,
        node: h1.id(),
        text: normalized_text(h1),
    })
}

/// Gather title candidates in priority order. The page-wide heading is only
/// consulted when nothing else produced a candidate.
pub fn title_candidates(snapshot: &Snapshot) -> Vec<TitleCandidate> {
    let probes: [fn(&Snapshot) -> Option<TitleCandidate>; 3] =
        [open_graph, json_ld_headline, article_heading];
    let mut candidates: Vec<TitleCandidate> = probes
        .iter()
        .filter_map(|probe| probe(snapshot))
        .collect();
    if candidates.is_empty() {
        candidates.extend(page_heading(snapshot));
    }
    candidates
}

/// Longest non-empty candidate shorter than `max_chars`. Earlier candidates win ties.
pub fn best_title(candidates: Vec<TitleCandidate>, max_chars: usize) -> Option<TitleCandidate> {
    candidates
        .into_iter()
        .filter(|c| !c.text.is_empty() && c.text.chars().count() < max_chars)
        .fold(None, |best: Option<TitleCandidate>, c| match best {
            Some(b) if b.text.chars().count() >= c.text.chars().count() => Some(b),
            _ => Some(c),
        })
}

/// Label the best title candidate. Returns its text.
pub fn mark_title(snapshot: &mut Snapshot, opts: &Options) -> Option<String> {
    let candidates = title_candidates(snapshot);
    debug!(candidates = candidates.len(), "title candidates");
    let best = best_title(candidates, opts.max_title_chars)?;
    debug!(source = ?best.source, title = %best.text, "title selected");
    snapshot.apply_label(best.node, &Label::Title);
    Some(best.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::element;
    use crate::labels::LabelKind;

    fn title_tag(snap: &Snapshot) -> Option<String> {
        snap.elements()
            .filter_map(element)
            .find(|el| LabelKind::Title.matches(el))
            .map(|el| el.name.clone())
    }

    #[test]
    fn longest_valid_candidate_wins() {
        let og = "A".repeat(50);
        let h1 = "B".repeat(80);
        let html = format!(
            r#"<html><head><meta property="og:title" content="{og}"></head><body><article><h1>{h1}</h1></article></body></html>"#
        );
        let mut snap = Snapshot::parse(&html);
        let title = mark_title(&mut snap, &Options::default());
        assert_eq!(title.as_deref(), Some(h1.as_str()));
        assert_eq!(title_tag(&snap).as_deref(), Some("h1"));
    }

    #[test]
    fn overlong_candidates_are_ignored() {
        let long = "L".repeat(200);
        let html = format!(
            r#"<html><head><meta property="og:title" content="Short headline"></head><body><article><h1>{long}</h1></article></body></html>"#
        );
        let mut snap = Snapshot::parse(&html);
        let title = mark_title(&mut snap, &Options::default());
        assert_eq!(title.as_deref(), Some("Short headline"));
        assert_eq!(title_tag(&snap).as_deref(), Some("meta"));
    }

    #[test]
    fn json_ld_headline_labels_the_script() {
        let mut snap = Snapshot::parse(
            r#"<html><head><script type="application/ld+json">{"@type":"NewsArticle","headline":"Acme Reports Record Third Quarter"}</script></head><body><h1>Acme</h1></body></html>"#,
        );
        let title = mark_title(&mut snap, &Options::default());
        assert_eq!(title.as_deref(), Some("Acme Reports Record Third Quarter"));
        assert_eq!(title_tag(&snap).as_deref(), Some("script"));
    }

    #[test]
    fn page_heading_is_a_fallback_only() {
        let mut snap = Snapshot::parse(
            "<html><body><h1>Newsroom</h1><div><h1>Acme names new CFO</h1></div></body></html>",
        );
        assert_eq!(
            mark_title(&mut snap, &Options::default()).as_deref(),
            Some("Newsroom")
        );

        let snap = Snapshot::parse(
            r#"<html><head><meta property="og:title" content="Hi"></head><body><h1>A much longer page heading</h1></body></html>"#,
        );
        let sources: Vec<_> = title_candidates(&snap).into_iter().map(|c| c.source).collect();
        assert_eq!(sources, vec![TitleSource::OpenGraph]);
    }

    #[test]
    fn no_candidates_no_label() {
        let mut snap = Snapshot::parse("<html><body><p>text</p></body></html>");
        assert!(mark_title(&mut snap, &Options::default()).is_none());
        assert_eq!(snap.label_count(LabelKind::Title), 0);
    }
}
