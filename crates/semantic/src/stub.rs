use async_trait::async_trait;
use fxhash::hash64;
use profile::OwnerKind;

use crate::prepare::{l2_normalize_in_place, prepare_input};
use crate::{Embedder, EmbeddingConfig, EmbeddingError, EmbeddingVector};

/// Deterministic offline embedder.
///
/// Each lowercase word is hashed into one of `dimension` buckets with a hash
/// derived sign, and the result is L2-normalized. Texts sharing vocabulary get
/// a positive cosine similarity, identical texts get identical vectors, and no
/// network is involved. Input checks match [`HttpEmbedder`](crate::HttpEmbedder).
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    cfg: EmbeddingConfig,
}

impl StubEmbedder {
    pub fn new(model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            cfg: EmbeddingConfig::default().with_model(model_id, dimension),
        }
    }

    pub fn from_config(cfg: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.cfg
    }
}

pub(crate) fn hashed_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut v = vec![0f32; dim];
    for token in text
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|t| !t.is_empty())
    {
        let h = hash64(token.to_lowercase().as_bytes());
        let idx = (h % dim as u64) as usize;
        let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
        v[idx] += sign;
    }
    if v.iter().all(|x| *x == 0.0) {
        // Punctuation-only text still gets a stable, non-zero vector.
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
    }
    l2_normalize_in_place(&mut v);
    v
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model_id(&self) -> &str {
        &self.cfg.model_name
    }

    fn dimension(&self) -> usize {
        self.cfg.dimension
    }

    async fn embed(
        &self,
        owner_id: &str,
        owner_kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        let prepared = prepare_input(owner_id, text, &self.cfg)?;
        Ok(EmbeddingVector {
            owner_id: owner_id.to_string(),
            owner_kind,
            vector: hashed_vector(prepared.text, self.cfg.dimension),
            model_id: self.cfg.model_name.clone(),
            truncated: prepared.truncated,
        })
    }
}
