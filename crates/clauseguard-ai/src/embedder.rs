//! ONNX Runtime embedding provider for sentence-transformers models.
//!
//! Mean-pooled, L2-normalized embeddings from all-MiniLM-L6-v2 (384
//! dimensions). The model directory must contain `model.onnx` and
//! `tokenizer.json`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::provider::{EmbeddingError, EmbeddingProvider, normalize};

/// Sentence embedding provider backed by ONNX Runtime.
///
/// Inference needs exclusive access to the session, so it sits behind a
/// mutex; the tokenizer is shared freely.
pub struct Embedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dim: usize,
}

impl Embedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        // MiniLM was trained on 256-token windows; clauses rarely get near that.
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: 256,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim,
        })
    }

    fn run_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Flat [batch_size, seq_len] inputs.
        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = i64::from(id);
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = i64::from(mask);
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = i64::from(tid);
            }
        }

        let shape = [batch_size as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.clone().into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("embedding session poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        ])?;

        // Token embeddings: [batch_size, seq_len, dim].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == batch_size && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{batch_size}, {seq_len}, {}]",
            self.dim
        );
        let actual_seq_len = dims[1] as usize;

        // Mean pooling under the attention mask.
        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut pooled = vec![0.0f32; self.dim];
            let mut token_count = 0.0f32;
            for j in 0..actual_seq_len {
                let mask_val = attention_mask[i * seq_len + j] as f32;
                if mask_val > 0.0 {
                    let offset = (i * actual_seq_len + j) * self.dim;
                    for (d, p) in pooled.iter_mut().enumerate() {
                        *p += output_data[offset + d] * mask_val;
                    }
                    token_count += mask_val;
                }
            }
            if token_count > 0.0 {
                for p in &mut pooled {
                    *p /= token_count;
                }
            }
            normalize(&mut pooled);
            embeddings.push(pooled);
        }
        Ok(embeddings)
    }
}

impl EmbeddingProvider for Embedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run_batch(texts)
            .map_err(|e| EmbeddingError::Backend(format!("{e:#}")))
    }
}

/// Embedding dimension from the model's output type (last axis).
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
