//! # talentmatch index
//!
//! Client side of the vector index that stores profile embeddings.
//!
//! The [`VectorIndex`] trait is the whole contract the matcher relies on:
//!
//! - `upsert` is idempotent. Re-upserting an id replaces its vector and
//!   payload in one step, so readers never see half an update.
//! - `query` returns at most `top_k` hits ordered by descending cosine
//!   similarity, ties broken by ascending id.
//! - A [`PayloadFilter`] restricts hits by owner kind, so a candidate-to-job
//!   query never returns other candidates.
//!
//! Connectivity problems surface as [`IndexError::Unavailable`] and may be
//! retried. A missing collection is [`IndexError::Configuration`]: collections
//! are provisioned ahead of time, never created on first use.
//!
//! ## Backends
//!
//! - [`InMemoryVectorIndex`] for tests and single-process runs.
//! - `QdrantVectorIndex` behind the `qdrant` feature.
//!
//! ```
//! use index::{IndexPoint, InMemoryVectorIndex, PayloadFilter, PointPayload, VectorIndex};
//! use profile::OwnerKind;
//!
//! let store = InMemoryVectorIndex::new();
//! store.create_collection("profiles", 2).unwrap();
//! let index = store.client("profiles");
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let payload = PointPayload {
//!         owner_kind: OwnerKind::Job,
//!         owner_id: "j1".into(),
//!         summary: "Acme is hiring".into(),
//!         model_id: "stub".into(),
//!         truncated: false,
//!         data: serde_json::Value::Null,
//!     };
//!     index.upsert(IndexPoint::new("j1", vec![1.0, 0.0], payload)).await.unwrap();
//!     let hits = index
//!         .query(&[1.0, 0.0], 5, &PayloadFilter::kind(OwnerKind::Job))
//!         .await
//!         .unwrap();
//!     assert_eq!(hits[0].id, "j1");
//! });
//! ```

mod error;
mod memory;
mod similarity;
mod types;

#[cfg(feature = "qdrant")]
mod qdrant;

use std::sync::Arc;

use async_trait::async_trait;
use profile::OwnerKind;

pub use crate::error::IndexError;
pub use crate::memory::{InMemoryCollection, InMemoryVectorIndex};
pub use crate::similarity::{cosine_similarity, ensure_finite};
pub use crate::types::{point_key, IndexPoint, PayloadFilter, PointPayload, ScoredPoint};

#[cfg(feature = "qdrant")]
pub use crate::qdrant::{QdrantConfig, QdrantVectorIndex};

/// A vector index bound to one collection.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn collection(&self) -> &str;

    async fn upsert(&self, point: IndexPoint) -> Result<(), IndexError>;

    /// Upsert several points. Backends that can do this in one round-trip override it.
    async fn upsert_batch(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        for point in points {
            self.upsert(point).await?;
        }
        Ok(())
    }

    async fn get(&self, kind: OwnerKind, id: &str) -> Result<Option<IndexPoint>, IndexError>;

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<ScoredPoint>, IndexError>;

    async fn count(&self, filter: &PayloadFilter) -> Result<usize, IndexError>;
}

#[async_trait]
impl<T: VectorIndex + ?Sized> VectorIndex for Arc<T> {
    fn collection(&self) -> &str {
        (**self).collection()
    }

    async fn upsert(&self, point: IndexPoint) -> Result<(), IndexError> {
        (**self).upsert(point).await
    }

    async fn upsert_batch(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        (**self).upsert_batch(points).await
    }

    async fn get(&self, kind: OwnerKind, id: &str) -> Result<Option<IndexPoint>, IndexError> {
        (**self).get(kind, id).await
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        (**self).query(vector, top_k, filter).await
    }

    async fn count(&self, filter: &PayloadFilter) -> Result<usize, IndexError> {
        (**self).count(filter).await
    }
}

#[async_trait]
impl<T: VectorIndex + ?Sized> VectorIndex for Box<T> {
    fn collection(&self) -> &str {
        (**self).collection()
    }

    async fn upsert(&self, point: IndexPoint) -> Result<(), IndexError> {
        (**self).upsert(point).await
    }

    async fn upsert_batch(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        (**self).upsert_batch(points).await
    }

    async fn get(&self, kind: OwnerKind, id: &str) -> Result<Option<IndexPoint>, IndexError> {
        (**self).get(kind, id).await
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &PayloadFilter,
    ) -> Result<Vec<ScoredPoint>, IndexError> {
        (**self).query(vector, top_k, filter).await
    }

    async fn count(&self, filter: &PayloadFilter) -> Result<usize, IndexError> {
        (**self).count(filter).await
    }
}
