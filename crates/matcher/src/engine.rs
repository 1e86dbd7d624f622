//! Semantic matching: embed profiles, store them in a vector index, and query
//! the opposite partition for nearest neighbours.
//!
//! Semantic results never carry rule-based points. Each entry keeps the raw
//! cosine similarity and is ranked by it; `score` is left unset.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use index::{ensure_finite, IndexPoint, PayloadFilter, PointPayload, ScoredPoint, VectorIndex};
use profile::{OwnerKind, Profile};
use scorer::MatchResult;
use semantic::{Embedder, EmbeddingVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::cache::{EmbeddingCache, DEFAULT_CACHE_CAPACITY};
use crate::error::RecordFailure;
use crate::metrics::{MatchMetrics, RunKind};
use crate::report::{sort_failures, MatchEntry, RunOutcome};
use crate::retry::{retry_async, RetryConfig};
use crate::MatchError;


/// Points written per index round-trip.
pub const UPSERT_BATCH_SIZE: usize = 64;

/// The first profile of each `(kind, id)`, in input order.
fn first_of_each(profiles: &[Profile]) -> Vec<&Profile> {
    let mut seen = HashSet::with_capacity(profiles.len());
    profiles
        .iter()
        .filter(|&p| {
            let fresh = seen.insert((p.kind(), p.id()));
            if !fresh {
                debug!(kind = %p.kind(), id = p.id(), "duplicate_profile_ignored");
            }
            fresh
        })
        .collect()
}

/// Sources of one semantic run.
///
/// Report groups are keyed by id alone, so an id carried by both a candidate
/// and a job is rejected on both sides instead of merging two groups.
fn distinct_sources(profiles: &[Profile]) -> (Vec<&Profile>, Vec<RecordFailure>) {
    let unique = first_of_each(profiles);
    let keys: HashSet<(OwnerKind, &str)> = unique.iter().map(|&p| (p.kind(), p.id())).collect();
    let mut failures = Vec::new();
    let sources = unique
        .into_iter()
        .filter(|&p| {
            if !keys.contains(&(p.kind().opposite(), p.id())) {
                return true;
            }
            let err = MatchError::Validation(format!(
                "id `{}` is used by both a candidate and a job",
                p.id()
            ));
            warn!(kind = %p.kind(), id = p.id(), "ambiguous_source_id");
            failures.push(RecordFailure::new(p.kind(), p.id(), &err));
            false
        })
        .collect();
    (sources, failures)
}

const QUERY_OWNER_ID: &str = "query";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Neighbours returned per source profile unless the caller overrides it.
    pub top_k: usize,
    /// Embedding and query calls in flight at once.
    pub embed_concurrency: usize,
    pub cache_capacity: usize,
    pub retry: RetryConfig,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            embed_concurrency: 4,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry: RetryConfig::default(),
        }
    }
}

impl SemanticConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_embed_concurrency(mut self, limit: usize) -> Self {
        self.embed_concurrency = limit;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.top_k == 0 {
            return Err(MatchError::Configuration("semantic.top_k must be positive".into()));
        }
        if self.embed_concurrency == 0 {
            return Err(MatchError::Configuration(
                "semantic.embed_concurrency must be positive".into(),
            ));
        }
        self.retry.validate()
    }
}

/// Result of [`SemanticMatcher::index_profiles`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub indexed: usize,
    pub failures: Vec<RecordFailure>,
}

impl IndexOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Semantic matcher over one embedder and one vector index collection.
///
/// Holds no state beyond the explicit [`EmbeddingCache`]. Per-record failures
/// (invalid input, exhausted retries) are collected and the run goes on;
/// configuration-class errors abort the run.
pub struct SemanticMatcher<E, I> {
    embedder: E,
    index: I,
    cache: Arc<EmbeddingCache>,
    config: SemanticConfig,
    metrics: Option<Arc<dyn MatchMetrics>>,
}

impl<E: Embedder, I: VectorIndex> SemanticMatcher<E, I> {
    pub fn new(embedder: E, index: I, config: SemanticConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let cache = Arc::new(EmbeddingCache::new(config.cache_capacity));
        Ok(Self {
            embedder,
            index,
            cache,
            config,
            metrics: None,
        })
    }

    /// Use a caller-owned cache, e.g. one shared across several runs.
    pub fn with_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    async fn embed_text(
        &self,
        owner_id: &str,
        kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, MatchError> {
        let retried = retry_async(&self.config.retry, "embed", |_| {
            self.embedder.embed(owner_id, kind, text)
        })
        .await;
        if retried.attempts > 1 {
            debug!(id = owner_id, attempts = retried.attempts, "embed_retried");
        }
        Ok(retried.into_result()?)
    }

    async fn cached_or_embedded(&self, profile: &Profile) -> Result<EmbeddingVector, MatchError> {
        let (kind, id, summary) = (profile.kind(), profile.id(), profile.summary());
        if let Some(hit) = self.cache.get(kind, id, self.embedder.model_id(), summary) {
            return Ok(hit);
        }
        let vector = self.embed_text(id, kind, summary).await?;
        self.cache.insert(summary, vector.clone());
        Ok(vector)
    }

    /// Cached vector, else the stored point when its summary and model still
    /// match, else a fresh embedding.
    async fn vector_for(&self, profile: &Profile) -> Result<EmbeddingVector, MatchError> {
        let (kind, id, summary) = (profile.kind(), profile.id(), profile.summary());
        let model = self.embedder.model_id();
        if let Some(hit) = self.cache.get(kind, id, model, summary) {
            return Ok(hit);
        }

        let stored = retry_async(&self.config.retry, "get", |_| self.index.get(kind, id))
            .await
            .into_result()?;
        if let Some(point) = stored.filter(|p| {
            p.payload.model_id == model && p.payload.summary == summary && !p.vector.is_empty()
        }) {
            let vector = EmbeddingVector {
                owner_id: id.to_string(),
                owner_kind: kind,
                vector: point.vector,
                model_id: point.payload.model_id,
                truncated: point.payload.truncated,
            };
            self.cache.insert(summary, vector.clone());
            return Ok(vector);
        }

        let vector = self.embed_text(id, kind, summary).await?;
        self.cache.insert(summary, vector.clone());
        Ok(vector)
    }

    fn point_for(profile: &Profile, vector: EmbeddingVector) -> Result<IndexPoint, MatchError> {
        let data = serde_json::to_value(profile).map_err(|e| {
            MatchError::Validation(format!("profile {} is not serializable: {e}", profile.id()))
        })?;
        let payload = PointPayload {
            owner_kind: profile.kind(),
            owner_id: profile.id().to_string(),
            summary: profile.summary().to_string(),
            model_id: vector.model_id,
            truncated: vector.truncated,
            data,
        };
        Ok(IndexPoint::new(vector.owner_id, vector.vector, payload))
    }

    fn record(&self, kind: RunKind, start: Instant, results: usize, failures: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.record_run(kind, start.elapsed(), results, failures);
        }
    }

    /// Embed every profile and upsert it into the index.
    ///
    /// A profile whose summary cannot be embedded, or whose batch could not be
    /// written after retries, is reported in [`IndexOutcome::failures`].
    #[instrument(name = "matcher.index", skip_all, fields(profiles = profiles.len(), collection = self.index.collection()))]
    pub async fn index_profiles(&self, profiles: &[Profile]) -> Result<IndexOutcome, MatchError> {
        let start = Instant::now();
        let mut failures = Vec::new();
        let mut points = Vec::with_capacity(profiles.len());

        let mut pending = stream::iter(first_of_each(profiles))
            .map(move |profile| async move {
                let vector = self.cached_or_embedded(profile).await.and_then(|v| {
                    ensure_finite(&v.owner_id, &v.vector)?;
                    Ok(v)
                });
                (profile, vector)
            })
            .buffer_unordered(self.config.embed_concurrency);
        while let Some((profile, result)) = pending.next().await {
            match result {
                Ok(vector) => points.push(Self::point_for(profile, vector)?),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(kind = %profile.kind(), id = profile.id(), error = %err, "profile_skipped");
                    failures.push(RecordFailure::new(profile.kind(), profile.id(), &err));
                }
            }
        }
        points.sort_by_key(IndexPoint::key);

        let mut indexed = 0;
        for chunk in points.chunks(UPSERT_BATCH_SIZE) {
            let retried = retry_async(&self.config.retry, "upsert", |_| {
                self.index.upsert_batch(chunk.to_vec())
            })
            .await;
            match retried.result.map_err(MatchError::from) {
                Ok(()) => indexed += chunk.len(),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(count = chunk.len(), attempts = retried.attempts, error = %err, "upsert_failed");
                    failures.extend(
                        chunk
                            .iter()
                            .map(|p| RecordFailure::new(p.owner_kind(), &p.id, &err)),
                    );
                }
            }
        }

        sort_failures(&mut failures);
        info!(
            indexed,
            failed = failures.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "index_complete"
        );
        self.record(RunKind::Index, start, indexed, failures.len());
        Ok(IndexOutcome { indexed, failures })
    }

    async fn neighbours(&self, profile: &Profile, top_k: usize) -> Result<Vec<MatchEntry>, MatchError> {
        let vector = self.vector_for(profile).await?;
        let source = profile.kind();
        let filter = PayloadFilter::kind(source.opposite());
        let hits = retry_async(&self.config.retry, "query", |_| {
            self.index.query(&vector.vector, top_k, &filter)
        })
        .await
        .into_result()?;

        Ok(hits
            .into_iter()
            .map(|hit| {
                let result = match source {
                    OwnerKind::Candidate => MatchResult::semantic(profile.id(), hit.id, hit.similarity),
                    OwnerKind::Job => MatchResult::semantic(hit.id, profile.id(), hit.similarity),
                };
                MatchEntry::from_result(result, source)
            })
            .collect())
    }

    /// Nearest opposite-kind neighbours for each profile, `top_k` defaulting
    /// to [`SemanticConfig::top_k`].
    ///
    /// Profiles are embedded only when neither the cache nor the index holds
    /// a vector for their current summary. Profiles must be indexed first to
    /// show up as neighbours of others.
    #[instrument(name = "matcher.semantic", skip_all, fields(profiles = profiles.len(), collection = self.index.collection()))]
    pub async fn match_profiles(
        &self,
        profiles: &[Profile],
        top_k: Option<usize>,
    ) -> Result<RunOutcome, MatchError> {
        let top_k = top_k.unwrap_or(self.config.top_k);
        if top_k == 0 {
            return Err(MatchError::Validation("top_k must be positive".into()));
        }
        let start = Instant::now();
        let (sources, rejected) = distinct_sources(profiles);
        let mut outcome = RunOutcome {
            failures: rejected,
            ..RunOutcome::default()
        };

        let mut pending = stream::iter(sources)
            .map(move |profile| async move { (profile, self.neighbours(profile, top_k).await) })
            .buffer_unordered(self.config.embed_concurrency);
        while let Some((profile, result)) = pending.next().await {
            match result {
                Ok(entries) => {
                    debug!(id = profile.id(), neighbours = entries.len(), "profile_matched");
                    outcome.report.insert_group(profile.id(), entries);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(kind = %profile.kind(), id = profile.id(), error = %err, "profile_skipped");
                    outcome
                        .failures
                        .push(RecordFailure::new(profile.kind(), profile.id(), &err));
                }
            }
        }

        sort_failures(&mut outcome.failures);
        let matches = outcome.report.total_entries();
        info!(
            groups = outcome.report.len(),
            matches,
            failed = outcome.failures.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "semantic_match_complete"
        );
        self.record(RunKind::SemanticMatch, start, matches, outcome.failures.len());
        Ok(outcome)
    }

    /// Free-text search over one partition, or both when `kind` is `None`.
    #[instrument(name = "matcher.search", skip_all, fields(kind = ?kind, limit = limit))]
    pub async fn search_text(
        &self,
        text: &str,
        kind: Option<OwnerKind>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, MatchError> {
        if limit == 0 {
            return Err(MatchError::Validation("limit must be positive".into()));
        }
        let start = Instant::now();
        // The query is embedded as a pseudo-profile of the opposite kind.
        let as_kind = kind.map_or(OwnerKind::Candidate, OwnerKind::opposite);
        let query = self.embed_text(QUERY_OWNER_ID, as_kind, text).await?;
        let filter = kind.map(PayloadFilter::kind).unwrap_or_default();

        let hits = retry_async(&self.config.retry, "query", |_| {
            self.index.query(&query.vector, limit, &filter)
        })
        .await
        .into_result()?;

        info!(hits = hits.len(), elapsed_micros = start.elapsed().as_micros() as u64, "search_complete");
        self.record(RunKind::TextSearch, start, hits.len(), 0);
        Ok(hits)
    }
}
