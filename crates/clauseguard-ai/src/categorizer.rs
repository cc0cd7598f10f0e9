//! Nearest-category lookup over lexicon keyword embeddings.

use clauseguard_core::{CategoryId, lexicon};
use tracing::{debug, warn};

use crate::provider::{EmbeddingProvider, cosine_similarity};

/// One embedding per lexicon category, built from its joined keywords.
///
/// A paragraph is assigned the most similar category when that similarity
/// strictly exceeds the threshold. Ties keep the earlier lexicon entry.
#[derive(Debug, Clone)]
pub struct SemanticCategorizer {
    anchors: Vec<(CategoryId, Vec<f32>)>,
    threshold: f32,
}

impl SemanticCategorizer {
    /// Embed every category's keyword string in one batch.
    ///
    /// If the provider fails, the categorizer is built empty and never
    /// assigns a category.
    pub fn build(provider: &dyn EmbeddingProvider, threshold: f32) -> Self {
        let texts: Vec<String> = lexicon::categories()
            .iter()
            .map(|c| c.keyword_text())
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let anchors = match provider.embed_batch(&refs) {
            Ok(vectors) if vectors.len() == refs.len() => lexicon::categories()
                .iter()
                .map(|c| c.id)
                .zip(vectors)
                .collect(),
            Ok(vectors) => {
                warn!(
                    expected = refs.len(),
                    got = vectors.len(),
                    "keyword embedding count mismatch, semantic categorization disabled"
                );
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "keyword embedding failed, semantic categorization disabled");
                Vec::new()
            }
        };
        debug!(categories = anchors.len(), threshold, "semantic categorizer ready");
        Self { anchors, threshold }
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Best category and its similarity, if above the threshold.
    ///
    /// A zero vector (the neutral embedding) never matches, whatever the
    /// threshold.
    pub fn categorize(&self, embedding: &[f32]) -> Option<(CategoryId, f32)> {
        if embedding.iter().all(|x| *x == 0.0) {
            return None;
        }
        let mut best: Option<(CategoryId, f32)> = None;
        for (id, anchor) in &self.anchors {
            let sim = cosine_similarity(embedding, anchor);
            if best.is_none_or(|(_, best_sim)| sim > best_sim) {
                best = Some((*id, sim));
            }
        }
        best.filter(|(_, sim)| *sim > self.threshold)
    }
}
