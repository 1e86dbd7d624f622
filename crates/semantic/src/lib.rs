//! Embedding adapter for talentmatch.
//!
//! Turns a profile's summary text into a fixed-length vector. The adapter is
//! stateless: it serializes one request, parses the response, checks the
//! dimension and stamps the model id. Retrying and caching are the caller's
//! business (see the `matcher` crate).
//!
//! Two implementations of [`Embedder`] ship here:
//!
//! - [`HttpEmbedder`] talks JSON over HTTP to OpenAI-style, Hugging Face or
//!   custom endpoints.
//! - [`StubEmbedder`] is deterministic and offline. Tests use it, and so does
//!   the CLI when no endpoint is configured.
//!
//! ## Errors
//!
//! Empty or overlong text is [`EmbeddingError::InvalidInput`] and should not be
//! retried. Network trouble, 408/429 and 5xx are [`EmbeddingError::Transient`].
//! Auth failures, unknown endpoints and dimension mismatches are
//! [`EmbeddingError::Configuration`] and abort a run.
//!
//! ## Env vars
//!
//! - `TALENTMATCH_EMBEDDING_API_URL` overrides the endpoint
//! - `TALENTMATCH_EMBEDDING_API_TOKEN` becomes a `Bearer` header
//!
//! ```
//! use profile::OwnerKind;
//! use semantic::{Embedder, StubEmbedder};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let embedder = StubEmbedder::new("stub", 64);
//! let v = rt
//!     .block_on(embedder.embed("c1", OwnerKind::Candidate, "Rust developer in Berlin"))
//!     .unwrap();
//! assert_eq!(v.vector.len(), 64);
//! ```

pub mod config;
pub mod error;
pub mod types;

mod api;
mod prepare;
mod stub;

use std::sync::Arc;

use async_trait::async_trait;
use profile::OwnerKind;

pub use crate::api::HttpEmbedder;
pub use crate::config::EmbeddingConfig;
pub use crate::error::EmbeddingError;
pub use crate::stub::StubEmbedder;
pub use crate::types::EmbeddingVector;

/// Anything that can turn text into an [`EmbeddingVector`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier stamped on every vector this embedder produces.
    fn model_id(&self) -> &str;

    /// Length of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    async fn embed(
        &self,
        owner_id: &str,
        owner_kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, EmbeddingError>;
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    async fn embed(
        &self,
        owner_id: &str,
        owner_kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        (**self).embed(owner_id, owner_kind, text).await
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    async fn embed(
        &self,
        owner_id: &str,
        owner_kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        (**self).embed(owner_id, owner_kind, text).await
    }
}
