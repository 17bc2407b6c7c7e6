//! Meta-tag scanning, title heuristics, and favicon/image selection.

use crate::constants::REGEXPS;
use crate::dom;
use crate::uri::SourceUri;
use crate::util::word_count;
use kuchikikiki::traits::*;
use kuchikikiki::NodeRef;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: String,
    pub byline: String,
    pub excerpt: String,
    pub favicon_url: String,
    pub image_url: String,
}

/// Scan every `<meta>` tag, normalizing keys (lowercased, whitespace
/// stripped) and applying last-write-wins semantics, per the spec's §4.4.
fn collect_meta(document: &NodeRef) -> (HashMap<String, String>, String) {
    let mut values: HashMap<String, String> = HashMap::new();
    let mut byline = String::new();

    let Ok(metas) = document.select("meta") else {
        return (values, byline);
    };

    for meta in metas {
        let node = meta.as_node().clone();
        let name = dom::get_attr(&node, "name").unwrap_or_default();
        let property = dom::get_attr(&node, "property").unwrap_or_default();
        let content = dom::get_attr(&node, "content").unwrap_or_default();

        if name == "author" || property == "author" {
            byline = content.trim().to_string();
            continue;
        }

        let mut store = |raw_key: &str| {
            let normalized: String = raw_key
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            values.insert(normalized, content.trim().to_string());
        };

        if REGEXPS.meta_name.is_match(&name) {
            store(&name);
        }
        if REGEXPS.meta_property.is_match(&property) {
            store(&property);
        }
    }

    (values, byline)
}

fn h1_or_h2_text_equals(document: &NodeRef, text: &str) -> bool {
    for selector in ["h1", "h2"] {
        let Ok(matches) = document.select(selector) else {
            continue;
        };
        for m in matches {
            let node = m.as_node().clone();
            if dom::get_inner_text(&node, true) == text {
                return true;
            }
        }
    }
    false
}

fn single_h1_text(document: &NodeRef) -> Option<String> {
    let matches: Vec<NodeRef> = document
        .select("h1")
        .ok()?
        .map(|m| m.as_node().clone())
        .collect();
    if matches.len() == 1 {
        Some(dom::get_inner_text(&matches[0], true))
    } else {
        None
    }
}

/// `get-article-title`: the document-title heuristic.
fn article_title(document: &NodeRef) -> String {
    let orig = document
        .select("title")
        .ok()
        .and_then(|mut iter| iter.next())
        .map(|m| dom::get_inner_text(&m.as_node().clone(), true))
        .unwrap_or_default();

    let mut cur = orig.clone();
    let mut had_hierarchical_separator = false;

    if REGEXPS.title_separator.is_match(&orig) {
        had_hierarchical_separator = REGEXPS.title_separator_narrow.is_match(&orig);

        static TAKE_BEFORE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            regex::Regex::new(r"(?s)^(.*)[\|\-\\/>»] .*$").unwrap()
        });
        static TAKE_AFTER: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            regex::Regex::new(r"(?s)^[^\|\-\\/>»]*[\|\-\\/>»](.*)$").unwrap()
        });

        cur = TAKE_BEFORE
            .captures(&orig)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or(orig.clone());

        if word_count(&cur) < 3 {
            cur = TAKE_AFTER
                .captures(&orig)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or(orig.clone());
        }
    } else if orig.contains(": ") {
        if !h1_or_h2_text_equals(document, orig.trim()) {
            if let Some(idx) = orig.rfind(':') {
                cur = orig[idx + 1..].to_string();
            }
            if word_count(&cur) < 3 {
                if let Some(idx) = orig.find(':') {
                    cur = orig[idx + 1..].to_string();
                }
            }
        }
    } else if orig.len() > 150 || orig.len() < 15 {
        if let Some(h1_text) = single_h1_text(document) {
            cur = h1_text;
        }
    }

    cur = cur.trim().to_string();

    let cur_word_count = word_count(&cur);
    if cur_word_count <= 4
        && (!had_hierarchical_separator
            || word_count(&orig.replace(['|', '-', '\\', '/', '>', '»'], "")) as i64
                - cur_word_count as i64
                != 1)
    {
        cur = orig.trim().to_string();
    }

    cur
}

fn select_first_attr(document: &NodeRef, selector: &str, attr: &str) -> Option<String> {
    let node = document.select(selector).ok()?.next()?.as_node().clone();
    dom::get_attr(&node, attr).filter(|v| !v.is_empty())
}

fn favicon(document: &NodeRef, source_uri: &SourceUri) -> String {
    let href = select_first_attr(document, r#"head link[rel="shortcut icon"]"#, "href")
        .or_else(|| select_first_attr(document, r#"head link[rel="icon"]"#, "href"))
        .unwrap_or_default();
    if href.is_empty() {
        String::new()
    } else {
        source_uri.absolutize(&href)
    }
}

fn representative_image(
    document: &NodeRef,
    meta: &HashMap<String, String>,
    source_uri: &SourceUri,
) -> String {
    let candidate = meta
        .get("og:image:secure_url")
        .or_else(|| meta.get("og:image:url"))
        .or_else(|| meta.get("og:image"))
        .cloned()
        .or_else(|| select_first_attr(document, r#"meta[name="twitter:image"]"#, "content"))
        .or_else(|| select_first_attr(document, r#"link[rel="image_src"]"#, "href"))
        .or_else(|| select_first_attr(document, r#"meta[name="thumbnail"]"#, "content"))
        .unwrap_or_default();

    if candidate.is_empty() {
        String::new()
    } else {
        source_uri.absolutize(&candidate)
    }
}

/// Run the full metadata pass: meta tags, title heuristic, favicon, image.
pub fn grab_metadata(document: &NodeRef, source_uri: &SourceUri) -> Metadata {
    let (values, meta_byline) = collect_meta(document);

    let mut title = article_title(document);
    if title.trim().is_empty() {
        title = values
            .get("og:title")
            .or_else(|| values.get("twitter:title"))
            .cloned()
            .unwrap_or_default();
    }

    let excerpt = values
        .get("og:description")
        .or_else(|| values.get("twitter:description"))
        .or_else(|| values.get("description"))
        .cloned()
        .unwrap_or_default();

    Metadata {
        title,
        byline: meta_byline,
        excerpt,
        favicon_url: favicon(document, source_uri),
        image_url: representative_image(document, &values, source_uri),
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
        SourceUri::parse("https://example.com/a/b.html").unwrap()
    }

    #[test]
    fn test_title_separator_pipe_reverts_to_original() {
        // "Foo | Site" splits to primary "Foo" (1 word < 3), so step 2 swaps
        // to the suffix "Site". But `|` is not a slash/backslash/gt/»
        // separator, so `had_hierarchical_separator` (the *narrow* flag) is
        // false, and step 5's "no hierarchical separators originally" arm
        // fires regardless of the word-count-drop clause: revert to the
        // full original title.
        let doc = parse("<html><head><title>Foo | Site</title></head><body></body></html>");
        assert_eq!(article_title(&doc), "Foo | Site");
    }

    #[test]
    fn test_title_separator_hyphen_reverts_to_original() {
        // Same shape as the pipe case: "A - B" swaps to primary "A" (1
        // word), then to suffix "B" (also < 3 words isn't required for the
        // swap rule to have already fired), but `-` isn't a narrow
        // separator either, so step 5 reverts to the original "A - B".
        let doc = parse(
            "<html><head><title>A - B</title></head><body><h1>A - B - C</h1></body></html>",
        );
        assert_eq!(article_title(&doc), "A - B");
    }

    #[test]
    fn test_title_separator_narrow_swap_survives() {
        // ">" IS a narrow (slash/backslash/gt/») separator, so the narrow
        // flag is true. Primary "Foo" (1 word) swaps to suffix "Site"; the
        // word-count drop vs. the separator-stripped original is exactly 1,
        // so step 5's OR is false on both arms and the swap survives.
        let doc = parse("<html><head><title>Foo > Site</title></head></html>");
        assert_eq!(article_title(&doc), "Site");
    }

    #[test]
    fn test_title_separator_long_primary_kept() {
        // A 5-word primary segment never enters the swap arm (>= 3 words)
        // and clears step 5's <= 4 words revert floor, so the split
        // survives regardless of the narrow/broad distinction.
        let doc =
            parse("<html><head><title>A Great And Lengthy Headline | Site</title></head></html>");
        assert_eq!(article_title(&doc), "A Great And Lengthy Headline");
    }

    #[test]
    fn test_excerpt_precedence() {
        let doc = parse(
            r#"<html><head>
                <meta property="og:description" content="D">
                <meta name="twitter:description" content="T">
                <meta name="description" content="X">
            </head><body></body></html>"#,
        );
        let meta = grab_metadata(&doc, &source());
        assert_eq!(meta.excerpt, "D");
    }

    #[test]
    fn test_byline_from_author_meta() {
        let doc = parse(r#"<html><head><meta name="author" content="Alice"></head></html>"#);
        let meta = grab_metadata(&doc, &source());
        assert_eq!(meta.byline, "Alice");
    }
}
