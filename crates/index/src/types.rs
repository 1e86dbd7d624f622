use profile::OwnerKind;
use serde::{Deserialize, Serialize};

/// Metadata stored next to every vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub owner_kind: OwnerKind,
    pub owner_id: String,
    pub summary: String,
    pub model_id: String,
    /// The summary was cut to the embedder's input limit before embedding.
    #[serde(default)]
    pub truncated: bool,
    /// Free-form extra data, e.g. the serialized profile.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One (id, vector, payload) tuple.
///
/// Points are keyed by owner kind and id together, so a candidate and a job
/// sharing an identifier never overwrite each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

impl IndexPoint {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: PointPayload) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    pub fn owner_kind(&self) -> OwnerKind {
        self.payload.owner_kind
    }

    /// Storage key, `"<kind>:<id>"`.
    pub fn key(&self) -> String {
        point_key(self.payload.owner_kind, &self.id)
    }
}

pub fn point_key(kind: OwnerKind, id: &str) -> String {
    format!("{kind}:{id}")
}

/// Restricts query and count results by payload fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFilter {
    pub owner_kind: Option<OwnerKind>,
}

impl PayloadFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn kind(kind: OwnerKind) -> Self {
        Self {
            owner_kind: Some(kind),
        }
    }

    pub fn matches(&self, payload: &PointPayload) -> bool {
        self.owner_kind.is_none_or(|kind| kind == payload.owner_kind)
    }
}

/// A query hit. Similarity is cosine, higher is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub similarity: f32,
    pub payload: PointPayload,
}
