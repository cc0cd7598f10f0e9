//! Per-document clause analysis: pattern matching plus semantic
//! categorization, folded into an [`Analysis`].

use std::sync::Arc;

use clauseguard_core::{AnalyzerConfig, Analysis, Change, PatternTable, RiskAggregator};
use tracing::{debug, warn};

use crate::categorizer::SemanticCategorizer;
use crate::provider::EmbeddingProvider;

/// Analyzes documents against a pattern table.
///
/// Holds no per-document state, so one analyzer can serve concurrent
/// analyses of independent documents.
pub struct ClauseAnalyzer {
    provider: Arc<dyn EmbeddingProvider>,
    categorizer: SemanticCategorizer,
    config: AnalyzerConfig,
}

impl ClauseAnalyzer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: AnalyzerConfig) -> Self {
        let categorizer = SemanticCategorizer::build(provider.as_ref(), config.similarity_threshold);
        Self {
            provider,
            categorizer,
            config,
        }
    }

    /// Analyze one document's paragraphs, in order.
    ///
    /// Blank paragraphs are skipped. Embedding failures never fail the
    /// analysis: the document is analyzed with neutral vectors instead and
    /// pattern matching runs as usual.
    pub fn analyze<S: AsRef<str>>(&self, table: &PatternTable, paragraphs: &[S]) -> Analysis {
        let texts: Vec<&str> = paragraphs
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| !p.trim().is_empty())
            .collect();
        let embeddings = self.embed_document(&texts);

        let mut aggregator = RiskAggregator::new();
        for (text, embedding) in texts.iter().zip(&embeddings) {
            let lower = text.to_lowercase();
            let changes = match_patterns(table, text, &lower, self.config.fuzzy_match_ratio);
            let category = self.categorizer.categorize(embedding).map(|(id, _)| id);
            aggregator.record(text, changes, category);
        }

        let analysis = aggregator.finish();
        debug!(
            paragraphs = texts.len(),
            changes = analysis.changes.len(),
            overall = %analysis.overall_risk_level,
            "document analyzed"
        );
        analysis
    }

    /// One batch call per document; neutral vectors on any failure.
    fn embed_document(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }
        let neutral = || vec![vec![0.0; self.provider.dim()]; texts.len()];
        match self.provider.embed_batch(texts) {
            Ok(vectors) if vectors.len() == texts.len() => vectors,
            Ok(vectors) => {
                warn!(
                    expected = texts.len(),
                    got = vectors.len(),
                    "embedding count mismatch, document left uncategorized"
                );
                neutral()
            }
            Err(e) => {
                warn!(error = %e, "embedding unavailable, document left uncategorized");
                neutral()
            }
        }
    }
}

/// Every match of every pattern in one paragraph, in table order.
///
/// Overlapping and duplicate matches from different patterns are all kept.
pub fn match_patterns(table: &PatternTable, paragraph: &str, lower: &str, fuzzy_ratio: f32) -> Vec<Change> {
    table
        .patterns()
        .iter()
        .flat_map(|pattern| {
            pattern
                .find_matches(paragraph, lower, fuzzy_ratio)
                .into_iter()
                .map(|matched| pattern.to_change(matched))
        })
        .collect()
}
