//! DOM manipulation and traversal utilities over the mutable `kuchikikiki` tree.
//!
//! The core extraction algorithm repeatedly walks the document depth-first
//! while deleting and retagging nodes in place. Every traversal primitive
//! here is built from `first_child` / `next_sibling` / `parent` rather than a
//! library-provided descendants iterator, so that a node can be detached
//! mid-walk without invalidating the cursor — the "precompute-next-then-remove"
//! discipline the algorithm depends on.

use crate::constants::{PHRASING_ELEMS, REGEXPS};
use kuchikikiki::traits::*;
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{namespace_url, ns, LocalName, QualName};
use std::collections::BTreeMap;

/// Build a fresh HTML element node with the given attributes.
pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> NodeRef {
    let name = QualName::new(None, ns!(html), LocalName::from(tag));
    let mut attributes = BTreeMap::new();
    for (key, value) in attrs {
        attributes.insert(
            ExpandedName::new(ns!(), *key),
            Attribute {
                prefix: None,
                value: value.to_string(),
            },
        );
    }
    NodeRef::new_element(name, attributes)
}

pub fn new_text(text: &str) -> NodeRef {
    NodeRef::new_text(text)
}

pub fn is_element(node: &NodeRef) -> bool {
    node.as_element().is_some()
}

pub fn is_text(node: &NodeRef) -> bool {
    node.as_text().is_some()
}

/// Upper-cased tag name, or `None` for non-element nodes.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|e| e.name.local.as_ref().to_uppercase())
}

pub fn tag_is(node: &NodeRef, tag: &str) -> bool {
    tag_name(node).map(|t| t == tag.to_uppercase()).unwrap_or(false)
}

pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|e| e.attributes.borrow().get(name).map(|v| v.to_string()))
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(e) = node.as_element() {
        e.attributes.borrow_mut().insert(name, value.to_string());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(e) = node.as_element() {
        e.attributes.borrow_mut().remove(name);
    }
}

pub fn class_attr(node: &NodeRef) -> String {
    get_attr(node, "class").unwrap_or_default()
}

pub fn id_attr(node: &NodeRef) -> String {
    get_attr(node, "id").unwrap_or_default()
}

/// `class + " " + id`, the string every positive/negative/unlikely regex
/// is matched against.
pub fn match_string(node: &NodeRef) -> String {
    format!("{} {}", class_attr(node), id_attr(node))
}

pub fn class_list(node: &NodeRef) -> Vec<String> {
    class_attr(node)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    class_list(node).iter().any(|c| c == class)
}

/// Depth-first "next node": first child unless `ignore_self_and_kids`, else
/// next sibling, else walk up parents until one has a next sibling. `None`
/// at the end of the tree.
pub fn get_next_node(node: &NodeRef, ignore_self_and_kids: bool) -> Option<NodeRef> {
    if !ignore_self_and_kids {
        if let Some(child) = node.first_child() {
            return Some(child);
        }
    }

    if let Some(sibling) = node.next_sibling() {
        return Some(sibling);
    }

    let mut current = node.parent();
    while let Some(parent) = current {
        if let Some(sibling) = parent.next_sibling() {
            return Some(sibling);
        }
        current = parent.parent();
    }

    None
}

/// Precompute the next node (ignoring `node`'s own subtree), detach `node`,
/// then return the precomputed next. Never cache an iterator across this call.
pub fn remove_and_get_next(node: &NodeRef) -> Option<NodeRef> {
    let next = get_next_node(node, true);
    node.detach();
    next
}

/// Ordered ancestors starting at the immediate parent. `max_depth == 0` means
/// unlimited.
pub fn get_node_ancestors(node: &NodeRef, max_depth: usize) -> Vec<NodeRef> {
    let mut ancestors = Vec::new();
    let mut current = node.clone();
    let mut depth = 0usize;

    while let Some(parent) = current.parent() {
        ancestors.push(parent.clone());
        depth += 1;
        if max_depth > 0 && depth >= max_depth {
            break;
        }
        current = parent;
    }

    ancestors
}

/// Trimmed concatenation of descendant text; collapses runs of 2+ whitespace
/// to a single space when `normalize_spaces` is set.
pub fn get_inner_text(node: &NodeRef, normalize_spaces: bool) -> String {
    let text = node.text_contents();
    let trimmed = text.trim();
    if normalize_spaces {
        REGEXPS.normalize.replace_all(trimmed, " ").to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn get_link_density(node: &NodeRef) -> f64 {
    let text_length = get_inner_text(node, false).chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let mut link_length = 0.0;
    if let Ok(links) = node.select("a") {
        for link in links {
            let link_node = link.as_node().clone();
            let coefficient = match get_attr(&link_node, "href") {
                Some(href) if REGEXPS.hash_url.is_match(&href) => 0.3,
                _ => 1.0,
            };
            link_length += get_inner_text(&link_node, false).chars().count() as f64 * coefficient;
        }
    }

    link_length / text_length as f64
}

/// Walk parents of `node`; true iff within `max_depth` (unlimited when
/// `max_depth` is `None`) an ancestor has the matching tag and `filter` (if
/// given) passes.
pub fn has_ancestor_tag(
    node: &NodeRef,
    tag: &str,
    max_depth: Option<usize>,
    filter: Option<&dyn Fn(&NodeRef) -> bool>,
) -> bool {
    let mut current = node.parent();
    let mut depth = 0usize;

    while let Some(parent) = current {
        if let Some(limit) = max_depth {
            if depth >= limit {
                return false;
            }
        }

        if tag_is(&parent, tag) && filter.map(|f| f(&parent)).unwrap_or(true) {
            return true;
        }

        depth += 1;
        current = parent.parent();
    }

    false
}

/// Replace `node` with a freshly-tagged element carrying the same attributes
/// and children, in the same tree position. Used by `<font>` → `<span>`
/// rewriting and the DIV → P normalization pass.
pub fn retag(node: &NodeRef, new_tag: &str) -> NodeRef {
    let attrs: Vec<(String, String)> = node
        .as_element()
        .map(|e| {
            e.attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| (name.local.as_ref().to_string(), attr.value.clone()))
                .collect()
        })
        .unwrap_or_default();
    let attr_refs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let replacement = new_element(new_tag, &attr_refs);
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
        replacement.append(child);
    }
    node.insert_before(replacement.clone());
    node.detach();
    replacement
}

fn element_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children().filter(is_element).collect()
}

/// Public alias of the element-only child list, used by callers outside this
/// module (DIV normalization, sibling aggregation) that need the same filter.
pub fn element_children_of(node: &NodeRef) -> Vec<NodeRef> {
    element_children(node)
}

pub fn count_element_children(node: &NodeRef) -> usize {
    node.children().filter(is_element).count()
}

/// Run a CSS selector against `node`'s subtree, returning an empty `Vec` (never
/// panicking) when the selector fails to parse or match.
pub fn select_all(node: &NodeRef, selector: &str) -> Vec<NodeRef> {
    node.select(selector)
        .map(|iter| iter.map(|css_match| css_match.as_node().clone()).collect())
        .unwrap_or_default()
}

pub fn select_first(node: &NodeRef, selector: &str) -> Option<NodeRef> {
    node.select(selector)
        .ok()
        .and_then(|mut iter| iter.next())
        .map(|css_match| css_match.as_node().clone())
}

/// Detach `node` and insert `replacement` (itself detached first, in case it
/// was previously one of `node`'s own children) in its place.
pub fn replace_with(node: &NodeRef, replacement: &NodeRef) {
    replacement.detach();
    node.insert_before(replacement.clone());
    node.detach();
}

/// Outer-HTML serialization of `node` and its subtree.
pub fn serialize_html(node: &NodeRef) -> String {
    let mut buffer = Vec::new();
    if node.serialize(&mut buffer).is_err() {
        return node.text_contents();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| node.text_contents())
}

/// Trimmed text empty AND (no element children OR all element children are
/// `<br>`/`<hr>`).
pub fn is_element_without_content(node: &NodeRef) -> bool {
    if !get_inner_text(node, false).trim().is_empty() {
        return false;
    }

    let children = element_children(node);
    children.is_empty() || children.iter().all(|c| tag_is(c, "BR") || tag_is(c, "HR"))
}

/// Exactly one element child, tag `<p>`, AND some text-node child with
/// non-whitespace content. This preserves the source's literal (docstring-
/// inverting) behavior rather than the "no stray text" reading the name
/// suggests.
pub fn has_single_p_inside(node: &NodeRef) -> bool {
    let children = element_children(node);
    if children.len() != 1 || !tag_is(&children[0], "P") {
        return false;
    }

    node.children()
        .any(|child| is_text(&child) && !child.text_contents().trim().is_empty())
}

/// Direct text-node children carrying non-whitespace content, in document
/// order. Used by DIV normalization's "wrap stray text in a styled `<p>`" step.
pub fn direct_nonempty_text_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children()
        .filter(|child| is_text(child) && !child.text_contents().trim().is_empty())
        .collect()
}

fn is_phrasing_content(node: &NodeRef) -> bool {
    match tag_name(node) {
        Some(tag) if PHRASING_ELEMS.contains(&tag.as_str()) => true,
        Some(tag) if tag == "A" || tag == "DEL" || tag == "INS" => node
            .children()
            .filter(is_element)
            .all(|child| is_phrasing_content(&child)),
        Some(_) => false,
        None => true,
    }
}

/// Any descendant element whose uppercase tag is in `DIV_TO_P_ELEMS`.
pub fn has_child_block_element(node: &NodeRef) -> bool {
    use crate::constants::DIV_TO_P_ELEMS;

    fn walk(node: &NodeRef) -> bool {
        for child in node.children().filter(is_element) {
            if let Some(tag) = tag_name(&child) {
                if DIV_TO_P_ELEMS.contains(&tag.as_str()) {
                    return true;
                }
            }
            if walk(&child) {
                return true;
            }
        }
        false
    }

    walk(node)
}

/// CSS/visibility gate applied before scoring: checks inline `display`/
/// `visibility`, the `hidden` attribute, and `aria-hidden` (honoring the
/// `fallback-image` class exception used for lazy-loaded images).
pub fn is_probably_visible(node: &NodeRef) -> bool {
    if let Some(style) = get_attr(node, "style") {
        let style_lower = style.to_lowercase();
        if style_lower.contains("display:none") || style_lower.contains("display: none") {
            return false;
        }
        if style_lower.contains("visibility:hidden") || style_lower.contains("visibility: hidden")
        {
            return false;
        }
    }

    if get_attr(node, "hidden").is_some() {
        return false;
    }

    if let Some(aria_hidden) = get_attr(node, "aria-hidden") {
        if aria_hidden == "true" && !has_class(node, "fallback-image") {
            return false;
        }
    }

    true
}

/// Reads `dir` off the `<html>` element, if present and one of ltr/rtl/auto.
pub fn article_direction(document: &NodeRef) -> Option<String> {
    let html = document.select("html").ok()?.next()?.as_node().clone();
    let dir = get_attr(&html, "dir")?.trim().to_lowercase();
    matches!(dir.as_str(), "ltr" | "rtl" | "auto").then_some(dir)
}
