//! Tunable analysis parameters.
//!
//! Both thresholds are empirical; they are kept configurable rather than
//! baked into the matcher.

use serde::{Deserialize, Serialize};

/// Minimum cosine similarity for a paragraph to join a category bucket.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.4;

/// Share of a literal pattern's words that must appear for a fuzzy hit.
pub const DEFAULT_FUZZY_MATCH_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Similarity must strictly exceed this value.
    pub similarity_threshold: f32,
    pub fuzzy_match_ratio: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            fuzzy_match_ratio: DEFAULT_FUZZY_MATCH_RATIO,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_fuzzy_match_ratio(mut self, ratio: f32) -> Self {
        self.fuzzy_match_ratio = ratio;
        self
    }
}
