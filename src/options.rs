//! Tunable knobs for an extraction run.

/// Configuration for a single [`crate::Readability::parse`] call.
///
/// Defaults reproduce the library's baseline constants
/// (`N_TOP_CANDIDATES = 5`, `WORD_THRESHOLD = 500`). Callers rarely need to
/// touch these; they exist mainly so batch pipelines can loosen the word
/// threshold for short-form content (release notes, changelog entries) without
/// forking the crate.
#[derive(Debug, Clone)]
pub struct ReadabilityOptions {
    /// Minimum `textContent` length (in characters) an attempt must reach
    /// before the orchestrator accepts it. Mirrors `WORD_THRESHOLD`.
    pub char_threshold: usize,
    /// How many top-scoring candidates are tracked for promotion decisions.
    /// Mirrors `N_TOP_CANDIDATES`.
    pub nb_top_candidates: usize,
    /// Added to `1 - link_density` when scoring a candidate; `0.0` reproduces
    /// the bare scoring formula. Exists as an escape hatch for corpora with
    /// unusually link-heavy prose (e.g. wikis).
    pub link_density_modifier: f64,
    /// Extra class tokens that survive `clean-ids-and-classes`, appended to
    /// `CLASSES_TO_PRESERVE`.
    pub classes_to_preserve: Vec<String>,
}

impl Default for ReadabilityOptions {
    fn default() -> Self {
        Self {
            char_threshold: crate::constants::WORD_THRESHOLD,
            nb_top_candidates: crate::constants::N_TOP_CANDIDATES,
            link_density_modifier: 0.0,
            classes_to_preserve: Vec::new(),
        }
    }
}

impl ReadabilityOptions {
    pub fn builder() -> ReadabilityOptionsBuilder {
        ReadabilityOptionsBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadabilityOptionsBuilder {
    inner: PartialOptions,
}

#[derive(Debug, Clone, Default)]
struct PartialOptions {
    char_threshold: Option<usize>,
    nb_top_candidates: Option<usize>,
    link_density_modifier: Option<f64>,
    classes_to_preserve: Vec<String>,
}

impl ReadabilityOptionsBuilder {
    pub fn char_threshold(mut self, value: usize) -> Self {
        self.inner.char_threshold = Some(value);
        self
    }

    pub fn nb_top_candidates(mut self, value: usize) -> Self {
        self.inner.nb_top_candidates = Some(value);
        self
    }

    pub fn link_density_modifier(mut self, value: f64) -> Self {
        self.inner.link_density_modifier = Some(value);
        self
    }

    pub fn classes_to_preserve(mut self, classes: Vec<String>) -> Self {
        self.inner.classes_to_preserve = classes;
        self
    }

    pub fn build(self) -> ReadabilityOptions {
        let defaults = ReadabilityOptions::default();
        ReadabilityOptions {
            char_threshold: self.inner.char_threshold.unwrap_or(defaults.char_threshold),
            nb_top_candidates: self
                .inner
                .nb_top_candidates
                .unwrap_or(defaults.nb_top_candidates),
            link_density_modifier: self
                .inner
                .link_density_modifier
                .unwrap_or(defaults.link_density_modifier),
            classes_to_preserve: self.inner.classes_to_preserve,
        }
    }
}
