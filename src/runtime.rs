//! Wiring from [`AppConfig`] to ready-to-run components.

use std::fs;
use std::path::Path;

use anyhow::Context;
use index::{InMemoryVectorIndex, PayloadFilter, VectorIndex};
use matcher::{IndexOutcome, SemanticMatcher};
use profile::{ingest_document, IngestConfig, Profile, ProfileSnapshot};
use semantic::{Embedder, HttpEmbedder, StubEmbedder};
use tracing::{info, warn};

use crate::config::{AppConfig, IndexBackend};

/// Semantic matcher over whichever embedder and index the config selects.
pub type DynSemanticMatcher = SemanticMatcher<Box<dyn Embedder>, Box<dyn VectorIndex>>;

/// Read a `{ "candidates": [...], "jobs": [...] }` JSON file.
///
/// Rejected records are logged and left out; they never fail the load.
pub fn read_snapshot(path: &Path, cfg: &IngestConfig) -> anyhow::Result<ProfileSnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading profiles from {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {} as JSON", path.display()))?;
    let snapshot = ingest_document(&document, cfg)
        .with_context(|| format!("ingesting {}", path.display()))?;

    for (kind, err) in &snapshot.rejected {
        warn!(%kind, index = err.record_index(), id = err.record_id(), error = %err, "record_rejected");
    }
    info!(
        candidates = snapshot.candidates.len(),
        jobs = snapshot.jobs.len(),
        rejected = snapshot.rejected.len(),
        "profiles_loaded"
    );
    Ok(snapshot)
}

/// Candidates then jobs, as tagged profiles.
pub fn all_profiles(snapshot: &ProfileSnapshot) -> Vec<Profile> {
    snapshot
        .candidates
        .iter()
        .cloned()
        .map(Profile::from)
        .chain(snapshot.jobs.iter().cloned().map(Profile::from))
        .collect()
}

fn build_embedder(cfg: &AppConfig) -> anyhow::Result<Box<dyn Embedder>> {
    if cfg.embedding.api_url.is_some() {
        let embedder = HttpEmbedder::new(cfg.embedding.clone()).context("building HTTP embedder")?;
        return Ok(Box::new(embedder));
    }
    warn!(model = %cfg.embedding.model_name, "no embedding api_url configured, using the offline stub embedder");
    Ok(Box::new(StubEmbedder::from_config(cfg.embedding.clone())?))
}

#[cfg(feature = "qdrant")]
async fn qdrant_index(cfg: &AppConfig, provision: bool) -> anyhow::Result<Box<dyn VectorIndex>> {
    let qdrant = index::QdrantVectorIndex::connect(&cfg.index.qdrant_config())?;
    if provision {
        qdrant.provision_collection(cfg.embedding.dimension).await?;
    }
    Ok(Box::new(qdrant))
}

#[cfg(not(feature = "qdrant"))]
async fn qdrant_index(_cfg: &AppConfig, _provision: bool) -> anyhow::Result<Box<dyn VectorIndex>> {
    anyhow::bail!("index.backend = \"qdrant\" needs a build with the `qdrant` feature")
}

/// Build the semantic matcher the config describes.
///
/// The in-memory backend provisions its collection on the spot. A Qdrant
/// collection is only created when `provision` is set.
pub async fn build_semantic_matcher(
    cfg: &AppConfig,
    provision: bool,
) -> anyhow::Result<DynSemanticMatcher> {
    let embedder = build_embedder(cfg)?;
    let index: Box<dyn VectorIndex> = match cfg.index.backend {
        IndexBackend::Memory => {
            let store = InMemoryVectorIndex::new();
            store.create_collection(&cfg.index.collection, cfg.embedding.dimension)?;
            Box::new(store.client(&cfg.index.collection))
        }
        IndexBackend::Qdrant => qdrant_index(cfg, provision).await?,
    };
    Ok(SemanticMatcher::new(embedder, index, cfg.semantic.clone())?)
}

/// Index `profiles` before a semantic run, unless `skip_index` says the
/// index already holds them.
///
/// Skipping is refused for the in-memory backend, which starts empty on
/// every run. Returns `None` when indexing was skipped.
pub async fn ensure_indexed<E: Embedder, I: VectorIndex>(
    matcher: &SemanticMatcher<E, I>,
    backend: IndexBackend,
    profiles: &[Profile],
    skip_index: bool,
) -> anyhow::Result<Option<IndexOutcome>> {
    if !skip_index {
        let indexed = matcher.index_profiles(profiles).await?;
        for failure in &indexed.failures {
            warn!(kind = %failure.owner_kind, id = %failure.owner_id, error = %failure.error, "not_indexed");
        }
        info!(indexed = indexed.indexed, failed = indexed.failures.len(), "profiles_indexed");
        return Ok(Some(indexed));
    }

    if backend == IndexBackend::Memory {
        anyhow::bail!(
            "--skip-index needs a persistent index; the in-memory backend starts empty on every run"
        );
    }
    let stored = matcher.index().count(&PayloadFilter::any()).await?;
    if stored == 0 {
        warn!(collection = matcher.index().collection(), "index_empty");
    } else {
        info!(collection = matcher.index().collection(), stored, "index_reused");
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::InMemoryCollection;
    use matcher::SemanticConfig;
    use profile::{Candidate, Job};

    fn matcher() -> SemanticMatcher<StubEmbedder, InMemoryCollection> {
        let store = InMemoryVectorIndex::new();
        store.create_collection("profiles", 16).unwrap();
        SemanticMatcher::new(
            StubEmbedder::new("stub", 16),
            store.client("profiles"),
            SemanticConfig::default(),
        )
        .unwrap()
    }

    fn profiles() -> Vec<Profile> {
        vec![
            Candidate::new("c1").with_summary("Rust developer").into(),
            Job::new("j1").with_summary("Hiring a Rust developer").into(),
        ]
    }

    #[tokio::test]
    async fn skip_index_is_refused_for_the_memory_backend() {
        let matcher = matcher();
        let err = ensure_indexed(&matcher, IndexBackend::Memory, &profiles(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--skip-index"));
        assert_eq!(matcher.index().count(&PayloadFilter::any()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn skip_index_reuses_a_persistent_index() {
        let matcher = matcher();
        let skipped = ensure_indexed(&matcher, IndexBackend::Qdrant, &profiles(), true)
            .await
            .unwrap();
        assert!(skipped.is_none());
        assert_eq!(matcher.index().count(&PayloadFilter::any()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn profiles_are_indexed_by_default() {
        let matcher = matcher();
        let outcome = ensure_indexed(&matcher, IndexBackend::Memory, &profiles(), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.indexed, 2);
        assert!(outcome.is_clean());
        assert_eq!(matcher.index().count(&PayloadFilter::any()).await.unwrap(), 2);
    }
}
