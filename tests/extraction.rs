//! End-to-end extraction tests driving `Readability::parse` against whole
//! HTML documents, exercising behaviors that only show up once every stage
//! of the pipeline runs together.

use readabilityrs::Readability;

fn padded_paragraph() -> String {
    "lorem ".repeat(600)
}

#[test]
fn title_separator_with_hyphen_reverts_to_original() {
    // "A - B" splits to a single-word primary ("A"), swaps to suffix ("B"),
    // but `-` isn't a slash/backslash/gt/» separator, so the narrow flag is
    // false and step 5 reverts to the full original title unconditionally.
    let words = padded_paragraph();
    let html = format!(
        r#"<html><head><title>A - B</title></head><body>
            <h1>A - B - C</h1>
            <article><p>{words}</p></article>
        </body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert_eq!(article.title, "A - B");
}

#[test]
fn title_separator_with_long_primary_kept() {
    // A 5-word primary segment clears step 5's <= 4 words revert floor, so
    // the split survives even though `|` isn't a narrow separator.
    let words = padded_paragraph();
    let html = format!(
        r#"<html><head><title>A Great And Lengthy Headline | Site</title></head><body>
            <article><p>{words}</p></article>
        </body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert_eq!(article.title, "A Great And Lengthy Headline");
}

#[test]
fn double_br_runs_are_split_into_paragraphs() {
    let words = padded_paragraph();
    let html = format!(
        r#"<html><body><article>
            first run{words}<br><br>second run{words}
        </article></body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert!(article.content.contains("first run"));
    assert!(article.content.contains("second run"));
}

#[test]
fn table_with_presentation_role_is_not_treated_as_data() {
    let words = padded_paragraph();
    let rows: String = (0..12)
        .map(|i| format!("<tr><td>r{i}c1</td><td>r{i}c2</td></tr>"))
        .collect();
    let html = format!(
        r#"<html><body><article>
            <p>{words}</p>
            <table role="presentation">{rows}</table>
        </article></body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    // A layout table's cells don't carry the weight a data table's would in
    // downstream heuristics, but the surrounding prose is still kept.
    assert!(article.content.contains("lorem"));
}

#[test]
fn table_summary_wins_over_nested_table_precedence() {
    let words = padded_paragraph();
    let html = format!(
        r#"<html><body><article>
            <p>{words}</p>
            <table summary="a data table"><tr><td><table><tr><td>nested</td></tr></table></td></tr></table>
        </article></body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert!(article.content.contains("nested"));
}

#[test]
fn body_only_candidate_exercises_fallback_wrapper() {
    let words = padded_paragraph();
    let html = format!("<html><body>{words}</body></html>");
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert!(article.length > 0);
}

#[test]
fn result_contains_no_script_style_or_noscript() {
    let words = padded_paragraph();
    let html = format!(
        r#"<html><head><style>.x{{color:red}}</style></head><body><article>
            <script>alert(1)</script>
            <noscript>no js</noscript>
            <p>{words}</p>
        </article></body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert!(!article.content.contains("<script"));
    assert!(!article.content.contains("<style"));
    assert!(!article.content.contains("<noscript"));
}

#[test]
fn result_strips_disallowed_ids_and_classes() {
    let words = padded_paragraph();
    let html = format!(
        r#"<html><body><article>
            <p id="custom-id" class="custom-class">{words}</p>
        </article></body></html>"#
    );
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert!(!article.content.contains("custom-id"));
    assert!(!article.content.contains("custom-class"));
}

#[test]
fn length_matches_char_count_of_text_content() {
    let words = padded_paragraph();
    let html = format!("<html><body><article><p>{words}</p></article></body></html>");
    let readability = Readability::new("https://example.com/", &html).unwrap();
    let article = readability.parse().expect("article expected");
    assert_eq!(article.length, article.text_content.chars().count());
}

#[test]
fn parse_is_deterministic_across_independent_instances() {
    let words = padded_paragraph();
    let html = format!("<html><body><article><p>{words}</p></article></body></html>");
    let first = Readability::new("https://example.com/", &html)
        .unwrap()
        .parse()
        .unwrap();
    let second = Readability::new("https://example.com/", &html)
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(first.content, second.content);
    assert_eq!(first.title, second.title);
    assert_eq!(first.length, second.length);
}
