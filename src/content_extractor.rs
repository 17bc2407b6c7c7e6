//! Core content-extraction algorithm: the pre-pass scorer, top-candidate
//! promoter, and sibling aggregator, operating directly on the mutable
//! `kuchikikiki` tree so that removals and retags during the walk are
//! visible to everything downstream.

use crate::constants::{
    ParseFlags, ALTER_TO_DIV_EXCEPTIONS, MINIMUM_TOPCANDIDATES, REGEXPS, TAGS_TO_SCORE,
};
use crate::dom;
use crate::options::ReadabilityOptions;
use crate::scoring;
use kuchikikiki::NodeRef;

/// Everything the orchestrator needs out of one extraction attempt.
pub struct GrabResult {
    /// The aggregator's wrapper `<div>`. In the fallback case its only child
    /// is `top` itself; otherwise its children are the qualifying siblings.
    pub article_content: NodeRef,
    /// The promoted top candidate. Equal to `article_content`'s single child
    /// when `needed_to_create_top_candidate` is set — the orchestrator uses
    /// `top` directly as the final page container in that case instead of
    /// unwrapping `article_content`'s children into a fresh one.
    pub top: NodeRef,
    pub needed_to_create_top_candidate: bool,
    /// A byline discovered in the body markup itself (rel="author" or a
    /// class/id byline match), distinct from the meta-tag byline the
    /// metadata extractor finds. Takes precedence when present.
    pub byline: Option<String>,
}

/// Run the scorer, promoter, and aggregator once against `body` with a given
/// flag set. Returns `None` only when `body` itself can't be walked (it
/// always can); a document with no real candidates still produces a result
/// via the promoter's fallback path.
pub fn grab_article(
    body: &NodeRef,
    flags: ParseFlags,
    options: &ReadabilityOptions,
) -> Option<GrabResult> {
    let (elements_to_score, byline) = prepass(body, flags);
    let candidates = score_elements(&elements_to_score, flags);
    let k = options.nb_top_candidates.max(1);
    let ranked = rank_candidates(&candidates, k);

    let promoted = promote_top_candidate(body, &ranked, flags);
    let article_content = aggregate_siblings(&promoted.node, options);

    Some(GrabResult {
        article_content,
        top: promoted.node,
        needed_to_create_top_candidate: promoted.needed_fallback,
        byline,
    })
}

/// Depth-first pre-pass: byline discovery, unlikely-candidate removal,
/// empty-structure removal, scoring collection, and DIV normalization, in
/// that fixed order at every node.
fn prepass(body: &NodeRef, flags: ParseFlags) -> (Vec<NodeRef>, Option<String>) {
    let mut elements_to_score = Vec::new();
    let mut byline: Option<String> = None;
    let mut current = Some(body.clone());

    while let Some(node) = current {
        if !dom::is_element(&node) {
            current = dom::get_next_node(&node, false);
            continue;
        }

        if !dom::is_probably_visible(&node) {
            current = dom::remove_and_get_next(&node);
            continue;
        }

        let tag = dom::tag_name(&node).unwrap_or_default();
        let match_str = dom::match_string(&node);

        if byline.is_none() {
            let is_author_rel = dom::get_attr(&node, "rel").as_deref() == Some("author");
            if (is_author_rel || REGEXPS.byline.is_match(&match_str))
                && scoring::is_valid_byline(&node, &match_str)
            {
                byline = Some(dom::get_inner_text(&node, true));
                current = dom::remove_and_get_next(&node);
                continue;
            }
        }

        if flags.contains(ParseFlags::STRIP_UNLIKELYS)
            && REGEXPS.unlikely_candidates.is_match(&match_str)
            && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_str)
            && tag != "BODY"
            && tag != "A"
        {
            current = dom::remove_and_get_next(&node);
            continue;
        }

        if matches!(
            tag.as_str(),
            "DIV" | "SECTION" | "HEADER" | "H1" | "H2" | "H3" | "H4" | "H5" | "H6"
        ) && dom::is_element_without_content(&node)
        {
            current = dom::remove_and_get_next(&node);
            continue;
        }

        if TAGS_TO_SCORE.contains(&tag.as_str()) {
            elements_to_score.push(node.clone());
        }

        if tag == "DIV" {
            if dom::has_single_p_inside(&node) {
                let p = dom::element_children_of(&node)
                    .into_iter()
                    .next()
                    .expect("has_single_p_inside guarantees one element child");
                dom::replace_with(&node, &p);
                elements_to_score.push(p.clone());
                current = dom::get_next_node(&p, false);
                continue;
            } else if !dom::has_child_block_element(&node) {
                let p = dom::retag(&node, "p");
                elements_to_score.push(p.clone());
                current = dom::get_next_node(&p, false);
                continue;
            } else {
                for text_child in dom::direct_nonempty_text_children(&node) {
                    let span = dom::new_element(
                        "p",
                        &[("style", "display:inline"), ("class", "readability-styled")],
                    );
                    span.append(dom::new_text(&text_child.text_contents()));
                    dom::replace_with(&text_child, &span);
                }
            }
        }

        current = dom::get_next_node(&node, false);
    }

    (elements_to_score, byline)
}

/// Accumulate ancestor scores and return the distinct set of enrolled
/// candidates, in first-enrolled order.
fn score_elements(elements_to_score: &[NodeRef], flags: ParseFlags) -> Vec<NodeRef> {
    let mut candidates = Vec::new();

    for element in elements_to_score {
        if element.parent().is_none() {
            continue;
        }

        if dom::get_inner_text(element, false).chars().count() < 25 {
            continue;
        }

        let ancestors = dom::get_node_ancestors(element, 3);
        if ancestors.is_empty() {
            continue;
        }

        let score = scoring::element_score(element);

        for (level, ancestor) in ancestors.iter().enumerate() {
            let divider = match level {
                0 => 1.0,
                1 => 2.0,
                _ => (level as f64) * 3.0,
            };

            if !scoring::has_content_score(ancestor) {
                scoring::initialize_node(ancestor, flags);
                candidates.push(ancestor.clone());
            }
            scoring::add_content_score(ancestor, score / divider);
        }
    }

    candidates
}

/// Final link-density-adjusted score, descending, top `k`. This is the
/// metric used purely to rank and select candidates; every later comparison
/// (promotion thresholds, ancestor ascent, sibling thresholds) reads the raw
/// `content-score` attribute directly instead.
fn rank_candidates(candidates: &[NodeRef], k: usize) -> Vec<(NodeRef, f64)> {
    let mut top: Vec<(NodeRef, f64)> = Vec::with_capacity(k);

    for candidate in candidates {
        let raw = scoring::get_content_score(candidate);
        let adjusted = raw * (1.0 - dom::get_link_density(candidate));

        let insert_at = top.iter().position(|(_, s)| adjusted > *s);
        match insert_at {
            Some(pos) => top.insert(pos, (candidate.clone(), adjusted)),
            None if top.len() < k => top.push((candidate.clone(), adjusted)),
            None => continue,
        }
        top.truncate(k);
    }

    top
}

struct PromotedTop {
    node: NodeRef,
    needed_fallback: bool,
}

/// Fallback creation, shared-ancestor promotion, ancestor ascent, and
/// only-child collapse.
fn promote_top_candidate(body: &NodeRef, ranked: &[(NodeRef, f64)], flags: ParseFlags) -> PromotedTop {
    let needs_fallback = match ranked.first() {
        Some((node, _)) => dom::tag_is(node, "BODY"),
        None => true,
    };

    let mut top = if needs_fallback {
        let wrapper = dom::new_element("div", &[]);
        for child in body.children().collect::<Vec<_>>() {
            child.detach();
            wrapper.append(child);
        }
        body.append(wrapper.clone());
        scoring::initialize_node(&wrapper, flags);
        wrapper
    } else {
        ranked[0].0.clone()
    };

    if !needs_fallback {
        let top_score = ranked[0].1;
        let alternative_ancestor_lists: Vec<Vec<NodeRef>> = ranked[1..]
            .iter()
            .filter(|(_, score)| *score >= top_score * 0.75)
            .map(|(node, _)| dom::get_node_ancestors(node, 0))
            .collect();

        if alternative_ancestor_lists.len() >= MINIMUM_TOPCANDIDATES {
            let mut parent = top.parent();
            while let Some(candidate_ancestor) = parent {
                if dom::tag_is(&candidate_ancestor, "BODY") {
                    break;
                }
                let hits = alternative_ancestor_lists
                    .iter()
                    .filter(|list| list.iter().any(|n| *n == candidate_ancestor))
                    .count();
                if hits >= MINIMUM_TOPCANDIDATES {
                    top = candidate_ancestor;
                    break;
                }
                parent = candidate_ancestor.parent();
            }
        }
    }

    scoring::ensure_initialized(&top, flags);

    let mut last_score = scoring::get_content_score(&top);
    let threshold = last_score / 3.0;
    let mut parent = top.parent();
    while let Some(candidate_parent) = parent {
        if dom::tag_is(&candidate_parent, "BODY") {
            break;
        }
        if !scoring::has_content_score(&candidate_parent) {
            parent = candidate_parent.parent();
            continue;
        }
        let parent_score = scoring::get_content_score(&candidate_parent);
        if parent_score < threshold {
            break;
        }
        if parent_score > last_score {
            top = candidate_parent;
            break;
        }
        last_score = parent_score;
        parent = candidate_parent.parent();
    }

    loop {
        let Some(parent) = top.parent() else { break };
        if dom::tag_is(&parent, "BODY") || dom::count_element_children(&parent) != 1 {
            break;
        }
        top = parent;
    }

    scoring::ensure_initialized(&top, flags);

    PromotedTop {
        node: top,
        needed_fallback: needs_fallback,
    }
}

/// Detects a sentence-ending period (followed by whitespace, or at the end
/// of the string). A literal trailing-`$) ` pattern would be unmatchable as
/// written; this reproduces its evident intent (a short paragraph ending a
/// sentence) instead of that apparent typo.
fn has_sentence_boundary(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '.' {
            match chars.peek() {
                Some(next) if next.is_whitespace() => return true,
                None => return true,
                _ => {}
            }
        }
    }
    false
}

/// Expand `top` into its qualifying siblings.
fn aggregate_siblings(top: &NodeRef, options: &ReadabilityOptions) -> NodeRef {
    let article_content = dom::new_element("div", &[]);

    let top_score = scoring::get_content_score(top);
    let threshold = (top_score * 0.2).max(10.0);
    let top_class = dom::class_attr(top);

    let Some(parent) = top.parent() else {
        top.detach();
        article_content.append(top.clone());
        return article_content;
    };

    let siblings: Vec<NodeRef> = parent.children().collect();

    for sibling in siblings {
        let is_top = sibling == *top;

        let append = if is_top {
            true
        } else if !dom::is_element(&sibling) {
            false
        } else {
            let mut class_bonus = 0.0;
            if !top_class.is_empty() && dom::class_attr(&sibling) == top_class {
                class_bonus = top_score * 0.2;
            }

            if scoring::has_content_score(&sibling) {
                scoring::get_content_score(&sibling) + class_bonus >= threshold
            } else if dom::tag_is(&sibling, "P") {
                let text = dom::get_inner_text(&sibling, false);
                let len = text.chars().count();
                let link_density = dom::get_link_density(&sibling) + options.link_density_modifier;

                (len > 80 && link_density < 0.25)
                    || (len > 0 && len < 80 && link_density == 0.0 && has_sentence_boundary(&text))
            } else {
                false
            }
        };

        if !append {
            continue;
        }

        let final_node = if dom::is_element(&sibling) {
            let tag = dom::tag_name(&sibling).unwrap_or_default();
            if ALTER_TO_DIV_EXCEPTIONS.contains(&tag.as_str()) {
                sibling.clone()
            } else {
                dom::retag(&sibling, "div")
            }
        } else {
            sibling.clone()
        };

        final_node.detach();
        article_content.append(final_node);
    }

    article_content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ParseFlags;
    use kuchikikiki::traits::*;

    fn parse(html: &str) -> NodeRef {
        kuchikikiki::parse_html().one(html)
    }

    fn body_of(doc: &NodeRef) -> NodeRef {
        doc.select("body").unwrap().next().unwrap().as_node().clone()
    }

    fn all_flags() -> ParseFlags {
        ParseFlags::STRIP_UNLIKELYS | ParseFlags::WEIGHT_CLASSES | ParseFlags::CLEAN_CONDITIONALLY
    }

    #[test]
    fn test_grab_article_picks_paragraph_rich_div() {
        let words = "lorem ".repeat(120);
        let html = format!(
            "<html><body><div class=\"sidebar\">nav</div><article><p>{words}</p></article></body></html>"
        );
        let doc = parse(&html);
        let body = body_of(&doc);
        let options = ReadabilityOptions::default();
        let result = grab_article(&body, all_flags(), &options).unwrap();
        let text = dom::get_inner_text(&result.article_content, false);
        assert!(text.contains("lorem"));
    }

    #[test]
    fn test_fallback_creates_page_wrapper_when_body_only_candidate() {
        let html = "<html><body><p>short</p></body></html>";
        let doc = parse(&html);
        let body = body_of(&doc);
        let options = ReadabilityOptions::default();
        let result = grab_article(&body, all_flags(), &options).unwrap();
        assert!(result.needed_to_create_top_candidate || dom::tag_is(&result.top, "P"));
    }

    #[test]
    fn test_byline_discovered_and_removed() {
        let html = r#"<html><body><span class="byline">By Jane Doe</span><article><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor.</p></article></body></html>"#;
        let doc = parse(html);
        let body = body_of(&doc);
        let options = ReadabilityOptions::default();
        let result = grab_article(&body, all_flags(), &options).unwrap();
        assert_eq!(result.byline.as_deref(), Some("By Jane Doe"));
        assert!(doc.select(".byline").unwrap().next().is_none());
    }

    #[test]
    fn test_has_sentence_boundary() {
        assert!(has_sentence_boundary("Short sentence. "));
        assert!(has_sentence_boundary("Ends right here."));
        assert!(!has_sentence_boundary("no terminal period"));
    }
}
