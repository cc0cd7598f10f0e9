//! Embedding provider seam plus the two model-free providers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("embedding backend error: {0}")]
    Backend(String),
}

/// Maps texts to fixed-dimension vectors.
///
/// Implementations must be shareable across threads; analyses of independent
/// documents call the same provider concurrently.
pub trait EmbeddingProvider: Send + Sync {
    fn dim(&self) -> usize;

    /// One vector per input, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Cosine similarity; 0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// L2-normalize a vector in place.
pub(crate) fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// The "unavailable" provider: zero vectors that are similar to nothing.
#[derive(Debug, Clone, Copy)]
pub struct NeutralEmbedder {
    dim: usize,
}

impl NeutralEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbeddingProvider for NeutralEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(vec![vec![0.0; self.dim]; texts.len()])
    }
}

pub const DEFAULT_HASHED_DIM: usize = 512;

/// Length of the prefix stem hashed alongside each longer word.
const STEM_LEN: usize = 5;

/// Deterministic feature-hashed bag of words.
///
/// Every lowercase alphanumeric token, plus a short stem of tokens longer than
/// the stem, adds ±1 to one bucket. Lexical overlap therefore shows up as
/// cosine similarity without any model files.
#[derive(Debug, Clone, Copy)]
pub struct HashedEmbedder {
    dim: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        let lower = text.to_lowercase();
        for token in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            self.add(&mut v, token.as_bytes(), 0);
            if let Some((cut, _)) = token.char_indices().nth(STEM_LEN) {
                self.add(&mut v, token[..cut].as_bytes(), 1);
            }
        }
        normalize(&mut v);
        v
    }

    fn add(&self, v: &mut [f32], bytes: &[u8], salt: u64) {
        let hash = fnv1a_64(bytes) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let bucket = (hash % self.dim as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign;
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHED_DIM)
    }
}

impl EmbeddingProvider for HashedEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn neutral_vectors_match_nothing() {
        let e = NeutralEmbedder::new(8);
        let vecs = e.embed_batch(&["anything", "else"]).unwrap();
        assert_eq!(vecs.len(), 2);
        assert_eq!(vecs[0].len(), 8);
        assert_eq!(cosine_similarity(&vecs[0], &vecs[1]), 0.0);
    }

    #[test]
    fn hashed_is_deterministic_and_normalized() {
        let e = HashedEmbedder::default();
        let a = e.embed("Confidential Information shall remain secret.");
        let b = e.embed_batch(&["Confidential Information shall remain secret."]).unwrap();
        assert_eq!(a, b[0]);
        assert_eq!(a.len(), DEFAULT_HASHED_DIM);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
    }

    #[test]
    fn hashed_similarity_follows_word_overlap() {
        let e = HashedEmbedder::default();
        let keywords = e.embed("confidential secret proprietary trade secret");
        let close = e.embed("The Recipient shall keep all Confidential Information secret and proprietary.");
        let far = e.embed("Lorem ipsum dolor sit amet.");
        let sim_close = cosine_similarity(&keywords, &close);
        let sim_far = cosine_similarity(&keywords, &far);
        assert!(sim_close > 0.4, "expected overlap similarity, got {sim_close:.3}");
        assert!(sim_far < 0.4, "expected low similarity, got {sim_far:.3}");
    }

    #[test]
    fn hashed_stems_link_inflections() {
        let e = HashedEmbedder::default();
        let sim = cosine_similarity(&e.embed("terminate"), &e.embed("termination"));
        assert!(sim > 0.3, "shared stem should register, got {sim:.3}");
    }

    #[test]
    fn hashed_blank_text_is_zero() {
        let e = HashedEmbedder::new(16);
        assert!(e.embed("  ... ").iter().all(|x| *x == 0.0));
    }
}
