//! Analysis layer: embedding providers, semantic categorization against the
//! clause lexicon, and the per-document [`ClauseAnalyzer`].

mod analyzer;
mod categorizer;
#[cfg(feature = "onnx")]
mod embedder;
mod provider;

pub use analyzer::{ClauseAnalyzer, match_patterns};
pub use categorizer::SemanticCategorizer;
#[cfg(feature = "onnx")]
pub use embedder::Embedder;
pub use provider::{
    EmbeddingError, EmbeddingProvider, HashedEmbedder, NeutralEmbedder, cosine_similarity,
};
