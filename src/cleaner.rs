//! Post-extraction cleanup run on the aggregator's content container before
//! post-processing: style stripping, data-table classification, conditional
//! cleaning, header/embed filtering, and paragraph trimming.

use crate::constants::{
    ParseFlags, DATA_TABLE_ATTR, DEPRECATED_SIZE_ATTRIBUTE_ELEMS, PRESENTATIONAL_ATTRIBUTES,
    READABILITY_STYLED_CLASS, REGEXPS,
};
use crate::dom;
use crate::scoring;
use kuchikikiki::NodeRef;
use regex::Regex;

/// Run the full article-preparer pipeline, in a fixed order.
pub fn prep_article(article_content: &NodeRef, title: &str, flags: ParseFlags) {
    clean_styles(article_content);
    mark_data_tables(article_content);

    clean_conditionally(article_content, "form", flags);
    clean_conditionally(article_content, "fieldset", flags);
    clean(article_content, "object");
    clean(article_content, "embed");
    clean(article_content, "h1");
    clean(article_content, "footer");

    for child in dom::element_children_of(article_content) {
        clean_matched_nodes(&child, &REGEXPS.share);
    }

    if let Some(h2) = single_h2(article_content) {
        maybe_clean_redundant_h2(article_content, &h2, title);
    }

    clean(article_content, "iframe");
    clean(article_content, "input");
    clean(article_content, "textarea");
    clean(article_content, "select");
    clean(article_content, "button");
    clean_headers(article_content, flags);

    clean_conditionally(article_content, "table", flags);
    clean_conditionally(article_content, "ul", flags);
    clean_conditionally(article_content, "div", flags);

    remove_empty_paragraphs(article_content);
    remove_brs_before_paragraphs(article_content);
}

/// Recursively strip `PRESENTATIONAL_ATTRIBUTES` (plus `width`/`height` on
/// the deprecated-size-attribute elements), skipping `<svg>` subtrees and
/// anything carrying the `readability-styled` marker class.
fn clean_styles(node: &NodeRef) {
    if dom::tag_is(node, "SVG") {
        return;
    }
    if dom::has_class(node, READABILITY_STYLED_CLASS) {
        return;
    }

    if dom::is_element(node) {
        for attr in PRESENTATIONAL_ATTRIBUTES {
            dom::remove_attr(node, attr);
        }
        if let Some(tag) = dom::tag_name(node) {
            if DEPRECATED_SIZE_ATTRIBUTE_ELEMS.contains(&tag.to_ascii_lowercase().as_str()) {
                dom::remove_attr(node, "width");
                dom::remove_attr(node, "height");
            }
        }
    }

    for child in node.children().collect::<Vec<_>>() {
        clean_styles(&child);
    }
}

fn is_data_table(node: &NodeRef) -> bool {
    dom::get_attr(node, DATA_TABLE_ATTR).as_deref() == Some("true")
}

/// Classify every `<table>` as data (`true`) or layout (`false`), checking
/// `role="presentation"`, `summary`, a nested table, and structural size
/// signals in that fixed precedence order.
fn mark_data_tables(root: &NodeRef) {
    for table in dom::select_all(root, "table") {
        let is_data = classify_table(&table);
        dom::set_attr(&table, DATA_TABLE_ATTR, if is_data { "true" } else { "false" });
    }
}

fn classify_table(table: &NodeRef) -> bool {
    if dom::get_attr(table, "role").as_deref() == Some("presentation") {
        return false;
    }
    if dom::get_attr(table, "datatable").as_deref() == Some("0") {
        return false;
    }
    if dom::get_attr(table, "summary")
        .map(|s| !s.is_empty())
        .unwrap_or(false)
    {
        return true;
    }
    if let Some(caption) = dom::select_first(table, "caption") {
        if caption.children().next().is_some() {
            return true;
        }
    }
    for tag in ["col", "colgroup", "tfoot", "thead", "th"] {
        if dom::select_first(table, tag).is_some() {
            return true;
        }
    }
    if dom::select_first(table, "table").is_some() {
        return false;
    }

    let (rows, columns) = row_and_column_count(table);
    if rows >= 10 || columns > 4 {
        return true;
    }
    rows * columns > 10
}

fn attr_count(node: &NodeRef, attr: &str, default: usize) -> usize {
    dom::get_attr(node, attr)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn row_and_column_count(table: &NodeRef) -> (usize, usize) {
    let mut rows = 0usize;
    let mut max_columns = 0usize;

    for tr in dom::select_all(table, "tr") {
        rows += attr_count(&tr, "rowspan", 1);

        let columns: usize = dom::element_children_of(&tr)
            .iter()
            .filter(|cell| dom::tag_is(cell, "TD") || dom::tag_is(cell, "TH"))
            .map(|cell| attr_count(cell, "colspan", 1))
            .sum();
        max_columns = max_columns.max(columns);
    }

    (rows, max_columns)
}

/// Remove every descendant of `tag`. For `object`/`embed`/`iframe`, keep
/// elements recognized as an embedded video player.
fn clean(root: &NodeRef, tag: &str) {
    let is_embed_tag = matches!(tag, "object" | "embed" | "iframe");
    for node in dom::select_all(root, tag) {
        if is_embed_tag && looks_like_video(&node) {
            continue;
        }
        node.detach();
    }
}

fn looks_like_video(node: &NodeRef) -> bool {
    if let Some(element) = node.as_element() {
        let attrs = element.attributes.borrow();
        for (name, attribute) in attrs.map.iter() {
            if name.local.as_ref().starts_with("data-") && REGEXPS.videos.is_match(&attribute.value)
            {
                return true;
            }
        }
    }
    REGEXPS.videos.is_match(&dom::serialize_html(node))
}

fn clean_headers(root: &NodeRef, flags: ParseFlags) {
    for tag in ["h1", "h2"] {
        for node in dom::select_all(root, tag) {
            if scoring::get_class_weight(&node, flags) < 0 {
                node.detach();
            }
        }
    }
}

/// Depth-first from `e`, stopping once traversal exits `e`'s own subtree:
/// remove any node whose `class + " " + id` matches `pattern`.
fn clean_matched_nodes(e: &NodeRef, pattern: &Regex) {
    let end_marker = dom::get_next_node(e, true);
    let mut current = dom::get_next_node(e, false);

    while let Some(node) = current {
        if let Some(marker) = &end_marker {
            if node == *marker {
                break;
            }
        }

        if dom::is_element(&node) && pattern.is_match(&dom::match_string(&node)) {
            current = dom::remove_and_get_next(&node);
        } else {
            current = dom::get_next_node(&node, false);
        }
    }
}

fn single_h2(root: &NodeRef) -> Option<NodeRef> {
    let all = dom::select_all(root, "h2");
    if all.len() == 1 {
        Some(all[0].clone())
    } else {
        None
    }
}

/// Drop a lone `<h2>` that's evidently a restated title — within 50% of the
/// title's length and substring-containing one another.
fn maybe_clean_redundant_h2(root: &NodeRef, h2: &NodeRef, title: &str) {
    if title.is_empty() {
        return;
    }
    let h2_text = dom::get_inner_text(h2, false);
    let h2_len = h2_text.chars().count() as f64;
    let title_len = title.chars().count() as f64;
    let len_diff = (h2_len - title_len).abs();
    if len_diff / title_len >= 0.5 {
        return;
    }

    let contains_other = if h2_len <= title_len {
        title.contains(h2_text.as_str())
    } else {
        h2_text.contains(title)
    };

    if contains_other {
        clean(root, "h2");
    }
}

/// Remove descendants of `tag` that fail the content-quality heuristics, but
/// only when the `clean-conditionally` flag is set.
fn clean_conditionally(root: &NodeRef, tag: &str, flags: ParseFlags) {
    if !flags.contains(ParseFlags::CLEAN_CONDITIONALLY) {
        return;
    }

    let is_list = matches!(tag, "ul" | "ol");

    for node in dom::select_all(root, tag) {
        if dom::has_ancestor_tag(&node, "table", None, Some(&|ancestor| is_data_table(ancestor))) {
            continue;
        }
        if tag == "table" && is_data_table(&node) {
            continue;
        }

        if scoring::get_class_weight(&node, flags) < 0 {
            node.detach();
            continue;
        }

        let text = dom::get_inner_text(&node, false);
        if REGEXPS.commas.find_iter(&text).count() >= 10 {
            continue;
        }

        let p = dom::select_all(&node, "p").len();
        let img = dom::select_all(&node, "img").len();
        let li = dom::select_all(&node, "li").len().saturating_sub(100);
        let input = dom::select_all(&node, "input").len();
        let len = text.chars().count();
        let link_density = dom::get_link_density(&node);
        let weight = scoring::get_class_weight(&node, flags);
        let has_figure_ancestor = dom::has_ancestor_tag(&node, "figure", None, None);

        let embed_count = dom::select_all(&node, "object, embed, iframe")
            .iter()
            .filter(|embed| !looks_like_video(embed))
            .count();

        let mut remove = false;
        if !has_figure_ancestor && img > 1 && p > 0 && (p as f64 / img as f64) < 0.5 {
            remove = true;
        }
        if !is_list && li > p {
            remove = true;
        }
        if input > p / 3 {
            remove = true;
        }
        if !is_list && !has_figure_ancestor && len < 25 && (img == 0 || img > 2) {
            remove = true;
        }
        if !is_list && weight < 25 && link_density > 0.2 {
            remove = true;
        }
        if weight >= 25 && link_density > 0.5 {
            remove = true;
        }
        if (embed_count == 1 && len < 75) || embed_count > 1 {
            remove = true;
        }

        if remove {
            node.detach();
        }
    }
}

fn remove_empty_paragraphs(root: &NodeRef) {
    for p in dom::select_all(root, "p") {
        let media_count = dom::select_all(&p, "img").len()
            + dom::select_all(&p, "embed").len()
            + dom::select_all(&p, "object").len()
            + dom::select_all(&p, "iframe").len();
        if media_count == 0 && dom::get_inner_text(&p, false).trim().is_empty() {
            p.detach();
        }
    }
}

fn remove_brs_before_paragraphs(root: &NodeRef) {
    for br in dom::select_all(root, "br") {
        if br.parent().is_none() {
            continue;
        }
        let mut sibling = br.next_sibling();
        while let Some(candidate) = sibling {
            if dom::is_text(&candidate) && candidate.text_contents().trim().is_empty() {
                sibling = candidate.next_sibling();
                continue;
            }
            if dom::tag_is(&candidate, "P") {
                br.detach();
            }
            break;
        }
    }
}
