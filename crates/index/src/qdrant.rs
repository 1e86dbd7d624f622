//! Qdrant-backed [`VectorIndex`].
//!
//! Points are stored with cosine distance. Qdrant only accepts integer or UUID
//! point ids, so each point id is the UUIDv5 of `"<kind>:<id>"`: re-upserting
//! the same owner replaces the stored point. The owner id itself travels in
//! the payload.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use profile::OwnerKind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    Distance, FieldType, Filter, GetPointsBuilder, PointId, PointStruct, QueryPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::similarity::{ensure_finite, rank};
use crate::types::{point_key, IndexPoint, PayloadFilter, PointPayload, ScoredPoint};
use crate::{IndexError, VectorIndex};

const OWNER_KIND_FIELD: &str = "owner_kind";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".into(),
            api_key: None,
            collection: "talentmatch_profiles".into(),
            timeout_secs: 10,
        }
    }
}

pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
}

fn point_uuid(kind: OwnerKind, id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, point_key(kind, id).as_bytes()).to_string()
}

fn map_qdrant_error(err: QdrantError) -> IndexError {
    if let QdrantError::ResponseError { status } = &err {
        let code = format!("{:?}", status.code());
        return match code.as_str() {
            "Unavailable" | "DeadlineExceeded" | "ResourceExhausted" | "Aborted" => {
                IndexError::Unavailable(status.message().to_string())
            }
            "NotFound" | "InvalidArgument" | "PermissionDenied" | "Unauthenticated" => {
                IndexError::Configuration(status.message().to_string())
            }
            _ => IndexError::backend(status.message()),
        };
    }
    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("not found") || lowered.contains("doesn't exist") {
        IndexError::Configuration(message)
    } else if lowered.contains("transport") || lowered.contains("timeout") || lowered.contains("connect") {
        IndexError::Unavailable(message)
    } else {
        IndexError::Backend(message)
    }
}

fn to_filter(filter: &PayloadFilter) -> Option<Filter> {
    filter
        .owner_kind
        .map(|kind| Filter::must([Condition::matches(OWNER_KIND_FIELD, kind.as_str().to_string())]))
}

fn payload_from_qdrant(raw: HashMap<String, QdrantValue>) -> Result<PointPayload, IndexError> {
    let json: serde_json::Map<String, serde_json::Value> =
        raw.into_iter().map(|(k, v)| (k, v.into_json())).collect();
    serde_json::from_value(serde_json::Value::Object(json))
        .map_err(|e| IndexError::backend(format!("unreadable point payload: {e}")))
}

impl QdrantVectorIndex {
    pub fn connect(cfg: &QdrantConfig) -> Result<Self, IndexError> {
        let mut builder = Qdrant::from_url(&cfg.url).timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Configuration(format!("qdrant client: {e}")))?;
        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Create the collection with cosine distance and a keyword index on the
    /// owner kind. Meant for provisioning tooling; matching runs never call it.
    pub async fn provision_collection(&self, dimension: usize) -> Result<(), IndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(map_qdrant_error)?;
        if exists {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(map_qdrant_error)?;
        self.client
            .create_field_index(CreateFieldIndexCollectionBuilder::new(
                &self.collection,
                OWNER_KIND_FIELD,
                FieldType::Keyword,
            ))
            .await
            .map_err(map_qdrant_error)?;
        info!(collection = %self.collection, dimension, "collection_provisioned");
        Ok(())
    }

    fn to_point_struct(point: IndexPoint) -> Result<PointStruct, IndexError> {
        ensure_finite(&point.id, &point.vector)?;
        let uuid = point_uuid(point.payload.owner_kind, &point.id);
        let json = serde_json::to_value(&point.payload).map_err(IndexError::backend)?;
        let payload = Payload::try_from(json).map_err(IndexError::backend)?;
        Ok(PointStruct::new(uuid, point.vector, payload))
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn upsert(&self, point: IndexPoint) -> Result<(), IndexError> {
        self.upsert_batch(vec![point]).await
    }

    async fn upsert_batch(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        if points.is_empty() {
            return Ok(());
        }
        let count = points.len();
        let structs = points
            .into_iter()
            .map(Self::to_point_struct)
            .collect::<Result<Vec<_>, _>>()?;
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, structs).wait(true))
            .await
            .map_err(map_qdrant_error)?;
        debug!(collection = %self.collection, count, "points_upserted");
        Ok(())
    }

    #[allow(deprecated)]
    async fn get(&self, kind: OwnerKind, id: &str) -> Result<Option<IndexPoint>, IndexError> {
        use qdrant_client::qdrant::vectors_output::VectorsOptions;

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, vec![PointId::from(point_uuid(kind, id))])
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(map_qdrant_error)?;

        let Some(found) = response.result.into_iter().next() else {
            return Ok(None);
        };
        let vector = match found.vectors.and_then(|v| v.vectors_options) {
            Some(VectorsOptions::Vector(v)) => v.data,
            _ => Vec::new(),
        };
        let payload = payload_from_qdrant(found.payload)?;
        Ok(Some(IndexPoint::new(payload.owner_id.clone(), vector, payload)))
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        ensure_finite("<query>", vector)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut request = QueryPointsBuilder::new(&self.collection)
            .query(vector.to_vec())
            .limit(top_k as u64)
            .with_payload(true);
        if let Some(f) = to_filter(filter) {
            request = request.filter(f);
        }
        let response = self.client.query(request).await.map_err(map_qdrant_error)?;

        let mut results = response
            .result
            .into_iter()
            .map(|hit| {
                let payload = payload_from_qdrant(hit.payload)?;
                Ok(ScoredPoint {
                    id: payload.owner_id.clone(),
                    similarity: hit.score,
                    payload,
                })
            })
            .collect::<Result<Vec<_>, IndexError>>()?;
        // Qdrant does not promise an order among equal scores.
        rank(&mut results, top_k);
        Ok(results)
    }

    async fn count(&self, filter: &PayloadFilter) -> Result<usize, IndexError> {
        let mut request = CountPointsBuilder::new(&self.collection).exact(true);
        if let Some(f) = to_filter(filter) {
            request = request.filter(f);
        }
        let response = self.client.count(request).await.map_err(map_qdrant_error)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_and_kind_scoped() {
        assert_eq!(
            point_uuid(OwnerKind::Job, "42"),
            point_uuid(OwnerKind::Job, "42")
        );
        assert_ne!(
            point_uuid(OwnerKind::Job, "42"),
            point_uuid(OwnerKind::Candidate, "42")
        );
    }

    #[test]
    fn filter_only_when_kind_given() {
        assert!(to_filter(&PayloadFilter::any()).is_none());
        assert!(to_filter(&PayloadFilter::kind(OwnerKind::Candidate)).is_some());
    }
}
