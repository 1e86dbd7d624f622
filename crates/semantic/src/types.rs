use profile::OwnerKind;
use serde::{Deserialize, Serialize};

/// A vector produced for one profile.
///
/// Immutable once created. Re-embedding the same owner produces a new value
/// that replaces this one; the two are never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingVector {
    pub owner_id: String,
    pub owner_kind: OwnerKind,
    pub vector: Vec<f32>,
    /// Model that produced `vector`.
    pub model_id: String,
    /// Set when the input text was cut to fit the service limit.
    #[serde(default)]
    pub truncated: bool,
}

impl EmbeddingVector {
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}
