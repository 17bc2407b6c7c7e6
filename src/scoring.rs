//! Class/id weighting and the content-scoring formula.
//!
//! Scores live on the DOM itself (`CONTENT_SCORE_ATTR`), not in a side table,
//! so that promoting or moving a node never loses its score.

use crate::constants::{ParseFlags, CONTENT_SCORE_ATTR, REGEXPS};
use crate::dom;
use kuchikikiki::NodeRef;

/// ±25 per independent class/id match; `0` when `WEIGHT_CLASSES` is off.
pub fn get_class_weight(node: &NodeRef, flags: ParseFlags) -> i32 {
    if !flags.contains(ParseFlags::WEIGHT_CLASSES) {
        return 0;
    }

    let mut weight = 0i32;
    let class = dom::class_attr(node);
    if REGEXPS.negative.is_match(&class) {
        weight -= 25;
    }
    if REGEXPS.positive.is_match(&class) {
        weight += 25;
    }

    let id = dom::id_attr(node);
    if REGEXPS.negative.is_match(&id) {
        weight -= 25;
    }
    if REGEXPS.positive.is_match(&id) {
        weight += 25;
    }

    weight
}

fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "DIV" => 5.0,
        "PRE" | "TD" | "BLOCKQUOTE" => 3.0,
        "ADDRESS" | "OL" | "UL" | "DL" | "DD" | "DT" | "LI" | "FORM" => -3.0,
        "H1" | "H2" | "H3" | "H4" | "H5" | "H6" | "TH" => -5.0,
        _ => 0.0,
    }
}

pub fn has_content_score(node: &NodeRef) -> bool {
    dom::get_attr(node, CONTENT_SCORE_ATTR).is_some()
}

pub fn get_content_score(node: &NodeRef) -> f64 {
    dom::get_attr(node, CONTENT_SCORE_ATTR)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

pub fn set_content_score(node: &NodeRef, score: f64) {
    dom::set_attr(node, CONTENT_SCORE_ATTR, &score.to_string());
}

pub fn add_content_score(node: &NodeRef, delta: f64) {
    let current = get_content_score(node);
    set_content_score(node, current + delta);
}

/// Base score by tag, plus class/id weight. Stores the result as the node's
/// `content-score`; idempotent to call only once per node (callers must
/// check `has_content_score` first — re-initializing would stomp propagated
/// score from scoring other candidates).
pub fn initialize_node(node: &NodeRef, flags: ParseFlags) {
    let tag = dom::tag_name(node).unwrap_or_default();
    let score = base_tag_score(&tag) + get_class_weight(node, flags) as f64;
    set_content_score(node, score);
}

pub fn ensure_initialized(node: &NodeRef, flags: ParseFlags) {
    if !has_content_score(node) {
        initialize_node(node, flags);
    }
}

/// `1 + (text split on ',').length + min(floor(length/100), 3)`, the
/// per-element contribution propagated to ancestors. Splitting a non-empty
/// string on a single-char delimiter always yields `comma_count + 1`
/// segments, so the literal formula is `2 + comma_count + length_bonus`.
/// Elements with < 25 chars of text don't reach this (the caller filters),
/// so there's no early-return-zero case here. `length` is character count.
pub fn element_score(node: &NodeRef) -> f64 {
    let text = dom::get_inner_text(node, false);
    let comma_count = REGEXPS.commas.find_iter(&text).count() as f64;
    let length_bonus = ((text.chars().count() / 100) as f64).min(3.0);
    2.0 + comma_count + length_bonus
}

pub fn is_valid_byline(node: &NodeRef, match_str: &str) -> bool {
    let rel = dom::get_attr(node, "rel").unwrap_or_default();
    let len = dom::get_inner_text(node, false).chars().count();
    (rel == "author" || REGEXPS.byline.is_match(match_str)) && len > 0 && len < 100
}
