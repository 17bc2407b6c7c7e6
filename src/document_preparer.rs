//! Prepares a freshly-parsed document for extraction: strips scripts, styles,
//! and noscript; rewrites `<font>` to `<span>`; collapses `<br>` runs into
//! `<p>` blocks.

use crate::dom;
use kuchikikiki::traits::*;
use kuchikikiki::NodeRef;

/// Remove every `<script>` (clearing its text content and `src` first) and
/// every `<noscript>` element.
pub fn strip_scripts(document: &NodeRef) {
    remove_all(document, "script", |node| {
        dom::set_attr(node, "src", "");
        for child in node.children().collect::<Vec<_>>() {
            child.detach();
        }
    });
    remove_all(document, "noscript", |_| {});
}

fn remove_all(document: &NodeRef, selector: &str, mut before_remove: impl FnMut(&NodeRef)) {
    let Ok(matches) = document.select(selector) else {
        return;
    };
    let nodes: Vec<NodeRef> = matches.map(|m| m.as_node().clone()).collect();
    for node in nodes {
        before_remove(&node);
        node.detach();
    }
}

/// Remove every `<style>` element.
pub fn strip_styles(document: &NodeRef) {
    remove_all(document, "style", |_| {});
}

/// Replace every `<font>` with `<span>` in place, retaining children.
pub fn rewrite_fonts(document: &NodeRef) {
    let Ok(matches) = document.select("font") else {
        return;
    };
    let nodes: Vec<NodeRef> = matches.map(|m| m.as_node().clone()).collect();
    for node in nodes {
        dom::retag(&node, "span");
    }
}

/// Find the next non-whitespace-only sibling, skipping whitespace-only text
/// nodes.
fn next_non_whitespace_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut current = node.next_sibling();
    while let Some(sibling) = current {
        if dom::is_text(&sibling) && sibling.text_contents().trim().is_empty() {
            current = sibling.next_sibling();
            continue;
        }
        return Some(sibling);
    }
    None
}

/// Collapse runs of `<br>` into `<p>` blocks, per the spec's `replace-brs`.
pub fn replace_brs(document: &NodeRef) {
    let Ok(matches) = document.select("br") else {
        return;
    };
    let brs: Vec<NodeRef> = matches.map(|m| m.as_node().clone()).collect();

    for br in brs {
        // `br` may already have been detached by an earlier iteration (as a
        // follow-on `<br><br>` run); skip it if so.
        if br.parent().is_none() {
            continue;
        }

        let mut removed_one = false;
        loop {
            match next_non_whitespace_sibling(&br) {
                Some(sibling) if dom::tag_is(&sibling, "BR") => {
                    sibling.detach();
                    removed_one = true;
                }
                _ => break,
            }
        }

        if !removed_one {
            continue;
        }

        let p = dom::new_element("p", &[]);
        br.insert_before(p.clone());
        br.detach();

        loop {
            let Some(sibling) = p.next_sibling() else {
                break;
            };

            if dom::tag_is(&sibling, "BR") {
                if let Some(after) = next_non_whitespace_sibling(&sibling) {
                    if dom::tag_is(&after, "BR") {
                        break;
                    }
                }
                sibling.detach();
                continue;
            }

            sibling.detach();
            p.append(sibling);
        }
    }
}

/// Full document-preparation pass: scripts, noscript, styles, fonts, then brs.
pub fn prep_document(document: &NodeRef) {
    strip_scripts(document);
    strip_styles(document);
    rewrite_fonts(document);
    replace_brs(document);
}
