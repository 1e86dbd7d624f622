//! # talentmatch
//!
//! Matches job postings and candidate listings two ways:
//!
//! - **Rule-based**: an explainable point score in `[0, 100]` from remote
//!   compatibility, location and technology overlap (see [`scorer`]).
//! - **Semantic**: nearest neighbours by cosine similarity of profile
//!   embeddings stored in a vector index (see [`matcher::SemanticMatcher`]).
//!
//! The two result sets share one report shape but are never blended into a
//! single number.
//!
//! This crate re-exports the workspace members and adds what a deployment
//! needs around them: layered configuration ([`AppConfig`]), tracing setup
//! ([`init_tracing`]) and config-driven wiring ([`build_semantic_matcher`]).
//!
//! ```
//! use talentmatch::{run_rule_scan, Candidate, Job, RemotePolicy, RuleScan, ScoringConfig};
//!
//! let candidate = Candidate::new("c1")
//!     .with_location("Berlin")
//!     .with_remote(RemotePolicy::RemoteOnly)
//!     .with_technologies(["python", "go"]);
//! let job = Job::new("j1")
//!     .with_location("Berlin")
//!     .with_remote(RemotePolicy::Onsite)
//!     .with_technologies(["python", "rust"]);
//!
//! let report = run_rule_scan(&[candidate], &[job], &ScoringConfig::default(), &RuleScan::default()).unwrap();
//! assert_eq!(report.get("c1").unwrap()[0].score, Some(47.5));
//! ```

pub mod config;
pub mod logging;
pub mod runtime;

pub use crate::config::{AppConfig, ConfigLoadError, IndexBackend, IndexSettings};
pub use crate::logging::init_tracing;
pub use crate::runtime::{
    all_profiles, build_semantic_matcher, ensure_indexed, read_snapshot, DynSemanticMatcher,
};

pub use index::{
    cosine_similarity, InMemoryCollection, InMemoryVectorIndex, IndexError, IndexPoint,
    PayloadFilter, PointPayload, ScoredPoint, VectorIndex,
};
pub use matcher::{
    diagnose, run_rule_scan, CancelFlag, EmbeddingCache, GroupBy, IndexOutcome, MatchEntry,
    MatchError, MatchMetrics, MatchReport, RecordFailure, RecordingMetrics, RetryConfig, RuleScan,
    RunOutcome, SemanticConfig, SemanticMatcher,
};
pub use profile::{
    ingest_candidates, ingest_document, ingest_jobs, Candidate, IngestBatch, IngestConfig, Job,
    OwnerKind, Profile, ProfileError, ProfileSnapshot, RemotePolicy, TechSet,
};
pub use scorer::{
    evaluate, score, Criterion, MatchMethod, MatchResult, ScoredPair, ScoringConfig,
    ScoringWeights, Verdict,
};
pub use semantic::{Embedder, EmbeddingConfig, EmbeddingError, EmbeddingVector, HttpEmbedder, StubEmbedder};

#[cfg(feature = "qdrant")]
pub use index::{QdrantConfig, QdrantVectorIndex};
