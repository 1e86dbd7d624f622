//! Candidate and job profiles for the talentmatch engine.
//!
//! Profiles are typed records validated once at the ingestion boundary. The
//! scorer and embedding adapter consume [`Candidate`] and [`Job`] directly and
//! never inspect raw JSON.
//!
//! ```
//! use profile::{ingest_candidates, IngestConfig, RemotePolicy};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({ "id": "c1", "location": "Berlin", "remote": "remote only", "technologies": "Python, Go" }),
//!     json!({ "body": "missing identifier" }),
//! ];
//! let batch = ingest_candidates(&records, &IngestConfig::default());
//! assert_eq!(batch.accepted.len(), 1);
//! assert_eq!(batch.rejected.len(), 1);
//! assert_eq!(batch.accepted[0].remote, RemotePolicy::RemoteOnly);
//! assert!(batch.accepted[0].technologies.contains("python"));
//! ```

mod config;
mod error;
mod ingest;
mod normalize;
mod remote;
mod summary;
mod tech;
mod types;

pub use config::IngestConfig;
pub use error::ProfileError;
pub use ingest::{
    ingest_candidate, ingest_candidates, ingest_document, ingest_job, ingest_jobs, IngestBatch,
    ProfileSnapshot, RawFlag, RawId, RawProfileRecord, RawTechnologies,
};
pub use normalize::{collapse_whitespace, normalize_key};
pub use remote::RemotePolicy;
pub use summary::{candidate_summary, job_summary};
pub use tech::TechSet;
pub use types::{Candidate, Job, OwnerKind, Profile};
