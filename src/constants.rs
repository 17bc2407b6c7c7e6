//! Constants, regular expressions, and static data used throughout the library.

use once_cell::sync::Lazy;
use regex::Regex;

// Bitflags for parsing strategies. One-way degradation only: a flag that is
// cleared during the orchestrator's retry loop is never set again within one
// `parse()` call.
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParseFlags: u32 {
        const STRIP_UNLIKELYS = 0x1;
        const WEIGHT_CLASSES = 0x2;
        const CLEAN_CONDITIONALLY = 0x4;
    }
}

pub const N_TOP_CANDIDATES: usize = 5;
pub const WORD_THRESHOLD: usize = 500;
pub const MINIMUM_TOPCANDIDATES: usize = 3;

pub const READABILITY_PAGE_ID: &str = "readability-page-1";
pub const READABILITY_CONTENT_ID: &str = "readability-content";
pub const READABILITY_STYLED_CLASS: &str = "readability-styled";
pub const PAGE_CLASS: &str = "page";

pub const CONTENT_SCORE_ATTR: &str = "_readabilityContentScore";
pub const DATA_TABLE_ATTR: &str = "_readabilityDataTable";

/// Elements scored directly during the pre-pass. DIV is deliberately absent —
/// DIVs are first normalized (collapsed into their single `<p>` child,
/// retagged to `<p>`, or split into `readability-styled` spans) and *those*
/// results join `elementsToScore`, rather than DIV itself being scored.
pub static TAGS_TO_SCORE: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["SECTION", "H2", "H3", "H4", "H5", "H6", "P", "TD", "PRE"]);

pub const DIV_TO_P_ELEMS: &[&str] = &[
    "A",
    "BLOCKQUOTE",
    "DL",
    "DIV",
    "IMG",
    "OL",
    "P",
    "PRE",
    "TABLE",
    "UL",
    "SELECT",
];

pub const ALTER_TO_DIV_EXCEPTIONS: &[&str] = &["DIV", "ARTICLE", "SECTION", "P"];

pub const IDS_TO_PRESERVE: &[&str] = &[READABILITY_CONTENT_ID, READABILITY_PAGE_ID];
pub const CLASSES_TO_PRESERVE: &[&str] = &[READABILITY_STYLED_CLASS, PAGE_CLASS];

pub const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
    "align",
    "background",
    "bgcolor",
    "border",
    "cellpadding",
    "cellspacing",
    "frame",
    "hspace",
    "rules",
    "style",
    "valign",
    "vspace",
];

pub const DEPRECATED_SIZE_ATTRIBUTE_ELEMS: &[&str] = &["table", "th", "td", "hr", "pre"];

/// Phrasing (inline) content — used by `has-child-block-element`.
pub const PHRASING_ELEMS: &[&str] = &[
    "ABBR", "AUDIO", "B", "BDO", "BR", "BUTTON", "CITE", "CODE", "DATA", "DATALIST", "DFN", "EM",
    "EMBED", "I", "IMG", "INPUT", "KBD", "LABEL", "MARK", "MATH", "METER", "NOSCRIPT", "OBJECT",
    "OUTPUT", "PROGRESS", "Q", "RUBY", "SAMP", "SMALL", "SPAN", "STRONG", "SUB", "SUP",
    "TEXTAREA", "TIME", "VAR", "WBR",
];

// Regular expressions (compiled once, process-wide, read-only).
pub static REGEXPS: Lazy<RegexPatterns> = Lazy::new(RegexPatterns::new);

pub struct RegexPatterns {
    pub unlikely_candidates: Regex,
    pub ok_maybe_its_a_candidate: Regex,
    pub positive: Regex,
    pub negative: Regex,
    pub byline: Regex,
    pub normalize: Regex,
    pub videos: Regex,
    pub hash_url: Regex,
    pub commas: Regex,
    /// Hierarchical title separator surrounded by spaces: `|`, `-`, `\`, `/`, `>`, `»`.
    pub title_separator: Regex,
    /// Narrower separator test used only to record whether the *original*
    /// title had a slash/backslash/gt/» separator (excludes `|` and `-`),
    /// per the title heuristic's step 5 revert condition.
    pub title_separator_narrow: Regex,
    pub meta_name: Regex,
    pub meta_property: Regex,
    /// Matched against `class + " " + id` for the article preparer's
    /// share-widget sweep (`clean-matched-nodes(pattern="share")`).
    pub share: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            unlikely_candidates: Regex::new(
                r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote"
            ).unwrap(),
            ok_maybe_its_a_candidate: Regex::new(
                r"(?i)and|article|body|column|content|main|mathjax|shadow"
            ).unwrap(),
            positive: Regex::new(
                r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story"
            ).unwrap(),
            negative: Regex::new(
                r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget"
            ).unwrap(),
            byline: Regex::new(
                r"(?i)byline|author|dateline|writtenby|p-author"
            ).unwrap(),
            normalize: Regex::new(
                r"\s{2,}"
            ).unwrap(),
            videos: Regex::new(
                r"(?i)//(www\.)?((dailymotion|youtube|youtube-nocookie|player\.vimeo|vimeo)\.com)"
            ).unwrap(),
            hash_url: Regex::new(
                r"^#.+"
            ).unwrap(),
            commas: Regex::new(
                "[\u{002C}\u{060C}\u{FE50}\u{FE10}\u{FE11}\u{2E41}\u{2E34}\u{2E32}\u{FF0C}]"
            ).unwrap(),
            title_separator: Regex::new(
                r" [\|\-\\/>»] "
            ).unwrap(),
            title_separator_narrow: Regex::new(
                r" [\\/>»] "
            ).unwrap(),
            meta_name: Regex::new(
                r"(?i)^\s*((twitter)\s*:\s*)?(description|title)\s*$"
            ).unwrap(),
            meta_property: Regex::new(
                r"(?i)^\s*og\s*:\s*(description|title)\s*$"
            ).unwrap(),
            share: Regex::new(r"(?i)share").unwrap(),
        }
    }
}
