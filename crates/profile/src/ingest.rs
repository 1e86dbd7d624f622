//! Mapping-oriented ingestion of candidate and job records.
//!
//! Input is a sequence of JSON objects as produced by the extraction stage.
//! Each record is validated on its own: a malformed record becomes a
//! [`ProfileError`] in [`IngestBatch::rejected`] and the rest of the batch is
//! still processed.

use std::collections::HashSet;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

use crate::config::IngestConfig;
use crate::error::ProfileError;
use crate::normalize::{non_blank, normalize_key};
use crate::remote::RemotePolicy;
use crate::summary::{candidate_summary, job_summary};
use crate::tech::TechSet;
use crate::types::{Candidate, Job, OwnerKind};

/// One record as it arrives from the extraction stage. Every field is optional
/// at this level; [`ingest_candidate`] and [`ingest_job`] decide what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProfileRecord {
    #[serde(alias = "identifier")]
    pub id: Option<RawId>,
    #[serde(alias = "text")]
    pub body: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "remote_policy", alias = "remote_preference")]
    pub remote: Option<RawFlag>,
    #[serde(alias = "relocate")]
    pub willing_to_relocate: Option<RawFlag>,
    #[serde(alias = "skills")]
    pub technologies: Option<RawTechnologies>,
    #[serde(alias = "raw_summary")]
    pub summary: Option<String>,
}

/// Identifiers arrive as strings or as numeric post ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_trimmed(self) -> String {
        match self {
            RawId::Text(s) => s.trim().to_string(),
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Yes/no style field given either as a JSON boolean or as free text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Text(String),
}

impl RawFlag {
    fn as_bool(&self) -> bool {
        match self {
            RawFlag::Bool(b) => *b,
            RawFlag::Text(t) => matches!(
                normalize_key(t).as_str(),
                "yes" | "y" | "true" | "1" | "willing"
            ),
        }
    }

    fn as_remote_policy(&self) -> RemotePolicy {
        match self {
            RawFlag::Bool(true) => RemotePolicy::RemoteOnly,
            RawFlag::Bool(false) => RemotePolicy::Onsite,
            RawFlag::Text(t) => RemotePolicy::parse_lenient(t),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTechnologies {
    List(Vec<String>),
    Delimited(String),
}

impl RawTechnologies {
    fn into_set(self) -> TechSet {
        match self {
            RawTechnologies::List(items) => items.into_iter().collect(),
            RawTechnologies::Delimited(line) => TechSet::parse_delimited(&line),
        }
    }
}

/// Outcome of ingesting one batch of records.
#[derive(Debug, Clone)]
pub struct IngestBatch<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<ProfileError>,
}

impl<T> Default for IngestBatch<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> IngestBatch<T> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Candidates and jobs read from one profile document.
#[derive(Debug, Clone, Default)]
pub struct ProfileSnapshot {
    pub candidates: Vec<Candidate>,
    pub jobs: Vec<Job>,
    pub rejected: Vec<(OwnerKind, ProfileError)>,
}

fn peek_id(value: &Value) -> Option<String> {
    match value.get("id").or_else(|| value.get("identifier"))? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode(index: usize, value: &Value) -> Result<(String, RawProfileRecord), ProfileError> {
    if !value.is_object() {
        return Err(ProfileError::Malformed {
            index,
            id: None,
            reason: "expected a JSON object".to_string(),
        });
    }

    let mut raw = RawProfileRecord::deserialize(value).map_err(|e| ProfileError::Malformed {
        index,
        id: peek_id(value),
        reason: e.to_string(),
    })?;

    let id = raw
        .id
        .take()
        .map(RawId::into_trimmed)
        .filter(|id| !id.is_empty())
        .ok_or(ProfileError::MissingIdentifier { index })?;

    Ok((id, raw))
}

fn finish_summary(given: Option<&str>, composed: String, body: &str, config: &IngestConfig) -> String {
    if let Some(summary) = non_blank(given) {
        return summary;
    }
    if config.include_body_in_summary && !body.is_empty() {
        format!("{composed}\n\n{body}")
    } else {
        composed
    }
}

/// Validate and convert a single candidate record.
pub fn ingest_candidate(
    index: usize,
    value: &Value,
    config: &IngestConfig,
) -> Result<Candidate, ProfileError> {
    let (id, raw) = decode(index, value)?;

    let mut candidate = Candidate::new(id);
    candidate.body = raw.body.as_deref().map(str::trim).unwrap_or_default().to_string();
    candidate.location = non_blank(raw.location.as_deref());
    candidate.remote = raw
        .remote
        .as_ref()
        .map(RawFlag::as_remote_policy)
        .unwrap_or_default();
    candidate.willing_to_relocate = raw
        .willing_to_relocate
        .as_ref()
        .is_some_and(RawFlag::as_bool);
    candidate.technologies = raw.technologies.map(RawTechnologies::into_set).unwrap_or_default();

    let composed = candidate_summary(&candidate);
    candidate.summary = finish_summary(raw.summary.as_deref(), composed, &candidate.body, config);
    Ok(candidate)
}

/// Validate and convert a single job record.
pub fn ingest_job(index: usize, value: &Value, config: &IngestConfig) -> Result<Job, ProfileError> {
    let (id, raw) = decode(index, value)?;

    let mut job = Job::new(id);
    job.body = raw.body.as_deref().map(str::trim).unwrap_or_default().to_string();
    job.company = non_blank(raw.company.as_deref());
    job.position = non_blank(raw.position.as_deref());
    job.location = non_blank(raw.location.as_deref());
    job.remote = raw
        .remote
        .as_ref()
        .map(RawFlag::as_remote_policy)
        .unwrap_or_default();
    job.technologies = raw.technologies.map(RawTechnologies::into_set).unwrap_or_default();

    if config.require_job_technologies && job.technologies.is_empty() {
        return Err(ProfileError::EmptyTechnologies { index, id: job.id });
    }

    let composed = job_summary(&job);
    job.summary = finish_summary(raw.summary.as_deref(), composed, &job.body, config);
    Ok(job)
}

fn candidate_id(candidate: &Candidate) -> &str {
    &candidate.id
}

fn job_id(job: &Job) -> &str {
    &job.id
}

/// Convert each record, rejecting any whose id an earlier accepted record of
/// the same kind already holds.
fn ingest_with<T, F>(
    kind: OwnerKind,
    records: &[Value],
    id_of: fn(&T) -> &str,
    mut convert: F,
) -> IngestBatch<T>
where
    F: FnMut(usize, &Value) -> Result<T, ProfileError>,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "profile.ingest", kind = %kind, records = records.len());
    let _guard = span.enter();

    let mut batch = IngestBatch::default();
    let mut seen = HashSet::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        let converted = convert(index, value).and_then(|profile| {
            let id = id_of(&profile);
            if seen.insert(id.to_string()) {
                Ok(profile)
            } else {
                Err(ProfileError::DuplicateIdentifier {
                    index,
                    id: id.to_string(),
                })
            }
        });
        match converted {
            Ok(profile) => batch.accepted.push(profile),
            Err(err) => {
                warn!(
                    kind = %kind,
                    index,
                    id = err.record_id().unwrap_or_default(),
                    error = %err,
                    "profile_rejected"
                );
                batch.rejected.push(err);
            }
        }
    }

    let elapsed_micros = start.elapsed().as_micros() as u64;
    info!(
        kind = %kind,
        accepted = batch.accepted.len(),
        rejected = batch.rejected.len(),
        elapsed_micros,
        "ingest_complete"
    );
    batch
}

pub fn ingest_candidates(records: &[Value], config: &IngestConfig) -> IngestBatch<Candidate> {
    ingest_with(OwnerKind::Candidate, records, candidate_id, |i, v| {
        ingest_candidate(i, v, config)
    })
}

pub fn ingest_jobs(records: &[Value], config: &IngestConfig) -> IngestBatch<Job> {
    ingest_with(OwnerKind::Job, records, job_id, |i, v| ingest_job(i, v, config))
}

fn section<'a>(document: &'a Value, key: &str) -> Result<&'a [Value], ProfileError> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ProfileError::InvalidDocument(format!(
            "`{key}` must be an array"
        ))),
    }
}

/// Ingest a `{ "candidates": [...], "jobs": [...] }` document.
///
/// Either list may be absent, but not both. Identifiers are unique across the
/// whole document: a job reusing a candidate's id is rejected.
pub fn ingest_document(document: &Value, config: &IngestConfig) -> Result<ProfileSnapshot, ProfileError> {
    if !document.is_object() {
        return Err(ProfileError::InvalidDocument(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    if document.get("candidates").is_none() && document.get("jobs").is_none() {
        return Err(ProfileError::InvalidDocument(
            "expected a `candidates` or `jobs` array".to_string(),
        ));
    }

    let candidates = ingest_candidates(section(document, "candidates")?, config);
    let candidate_ids: HashSet<&str> = candidates.accepted.iter().map(|c| c.id.as_str()).collect();
    let jobs = ingest_with(OwnerKind::Job, section(document, "jobs")?, job_id, |i, v| {
        let job = ingest_job(i, v, config)?;
        if candidate_ids.contains(job.id.as_str()) {
            return Err(ProfileError::SharedIdentifier { index: i, id: job.id });
        }
        Ok(job)
    });

    let rejected = candidates
        .rejected
        .into_iter()
        .map(|e| (OwnerKind::Candidate, e))
        .chain(jobs.rejected.into_iter().map(|e| (OwnerKind::Job, e)))
        .collect();

    debug!(
        candidates = candidates.accepted.len(),
        jobs = jobs.accepted.len(),
        "profile_document_loaded"
    );

    Ok(ProfileSnapshot {
        candidates: candidates.accepted,
        jobs: jobs.accepted,
        rejected,
    })
}
