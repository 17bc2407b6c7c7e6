//! Final URI absolutization and attribute stripping, run once the article
//! container is assembled: rewrites `<a>`/`<img>` URIs to absolute form and
//! strips ids/classes outside the preserve lists.

use crate::constants::{CLASSES_TO_PRESERVE, IDS_TO_PRESERVE};
use crate::dom;
use crate::uri::SourceUri;
use kuchikikiki::NodeRef;

/// For `<a>`: a `javascript:` href is replaced by a text node of its inner
/// text; otherwise `href` is absolutized. For `<img>`, `src` is absolutized.
pub fn fix_relative_uris(root: &NodeRef, source_uri: &SourceUri) {
    for anchor in dom::select_all(root, "a") {
        let Some(href) = dom::get_attr(&anchor, "href") else {
            continue;
        };

        if href.trim_start().to_ascii_lowercase().starts_with("javascript:") {
            let text = dom::new_text(&anchor.text_contents());
            dom::replace_with(&anchor, &text);
        } else {
            dom::set_attr(&anchor, "href", &source_uri.absolutize(&href));
        }
    }

    for img in dom::select_all(root, "img") {
        if let Some(src) = dom::get_attr(&img, "src") {
            dom::set_attr(&img, "src", &source_uri.absolutize(&src));
        }
    }
}

/// Recursively remove `id` unless it's in `IDS_TO_PRESERVE`, and keep only
/// classes in `CLASSES_TO_PRESERVE` (plus any caller-configured extras),
/// dropping the `class` attribute entirely when nothing survives.
pub fn clean_ids_and_classes(root: &NodeRef, extra_classes_to_preserve: &[String]) {
    clean_node(root, extra_classes_to_preserve);
}

fn clean_node(node: &NodeRef, extra: &[String]) {
    if dom::is_element(node) {
        if let Some(id) = dom::get_attr(node, "id") {
            if !IDS_TO_PRESERVE.contains(&id.as_str()) {
                dom::remove_attr(node, "id");
            }
        }

        let kept: Vec<String> = dom::class_list(node)
            .into_iter()
            .filter(|class| {
                CLASSES_TO_PRESERVE.contains(&class.as_str()) || extra.iter().any(|e| e == class)
            })
            .collect();

        if kept.is_empty() {
            dom::remove_attr(node, "class");
        } else {
            dom::set_attr(node, "class", &kept.join(" "));
        }
    }

    for child in node.children().collect::<Vec<_>>() {
        clean_node(&child, extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikikiki::traits::*;

    fn parse(html: &str) -> NodeRef {
        kuchikikiki::parse_html().one(html)
    }

    fn source() -> SourceUri {
        SourceUri::parse("https://example.com/a/").unwrap()
    }

    #[test]
    fn test_fix_relative_uris_anchor_and_img() {
        let doc = parse(r#"<div><a href="/x">k</a><img src="y.png"></div>"#);
        fix_relative_uris(&doc, &source());
        let a = doc.select("a").unwrap().next().unwrap().as_node().clone();
        assert_eq!(dom::get_attr(&a, "href").as_deref(), Some("https://example.com/x"));
        let img = doc.select("img").unwrap().next().unwrap().as_node().clone();
        assert_eq!(
            dom::get_attr(&img, "src").as_deref(),
            Some("https://example.com/a/y.png")
        );
    }

    #[test]
    fn test_javascript_anchor_becomes_text() {
        let doc = parse(r#"<div><a href="javascript:void(0)">click</a></div>"#);
        fix_relative_uris(&doc, &source());
        assert!(doc.select("a").unwrap().next().is_none());
        assert!(doc.text_contents().contains("click"));
    }

    #[test]
    fn test_clean_ids_and_classes_strips_unlisted() {
        let doc = parse(r#"<div id="foo" class="bar page"><p id="readability-page-1" class="page extra">x</p></div>"#);
        clean_ids_and_classes(&doc, &[]);
        let div = doc.select("div").unwrap().next().unwrap().as_node().clone();
        assert_eq!(dom::get_attr(&div, "id"), None);
        assert_eq!(dom::get_attr(&div, "class").as_deref(), Some("page"));
        let p = doc.select("p").unwrap().next().unwrap().as_node().clone();
        assert_eq!(dom::get_attr(&p, "id").as_deref(), Some("readability-page-1"));
        assert_eq!(dom::get_attr(&p, "class").as_deref(), Some("page"));
    }

    #[test]
    fn test_clean_ids_and_classes_extra_preserve() {
        let doc = parse(r#"<div class="keep-me other">x</div>"#);
        clean_ids_and_classes(&doc, &["keep-me".to_string()]);
        let div = doc.select("div").unwrap().next().unwrap().as_node().clone();
        assert_eq!(dom::get_attr(&div, "class").as_deref(), Some("keep-me"));
    }
}
