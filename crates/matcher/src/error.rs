use index::IndexError;
use profile::{OwnerKind, ProfileError};
use scorer::ScoringError;
use semantic::EmbeddingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("match run cancelled")]
    Cancelled,
    /// Nothing in the run can succeed; aborts immediately.
    #[error("invalid matcher configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("validation error: {0}")]
    Validation(String),
}

impl MatchError {
    pub fn is_fatal(&self) -> bool {
        match self {
            MatchError::Configuration(_) => true,
            MatchError::Index(e) => e.is_fatal(),
            MatchError::Embedding(e) => e.is_fatal(),
            MatchError::Cancelled | MatchError::Validation(_) => false,
        }
    }
}

impl From<ScoringError> for MatchError {
    fn from(err: ScoringError) -> Self {
        MatchError::Configuration(err.to_string())
    }
}

impl From<ProfileError> for MatchError {
    fn from(err: ProfileError) -> Self {
        MatchError::Validation(err.to_string())
    }
}

/// A profile that dropped out of a run. The rest of the batch carries on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub owner_kind: OwnerKind,
    pub owner_id: String,
    pub error: String,
    /// Whether the last error was retryable, i.e. retries were exhausted.
    pub retryable: bool,
}

impl RecordFailure {
    pub(crate) fn new(owner_kind: OwnerKind, owner_id: &str, err: &MatchError) -> Self {
        let retryable = match err {
            MatchError::Index(e) => e.is_retryable(),
            MatchError::Embedding(e) => e.is_retryable(),
            _ => false,
        };
        Self {
            owner_kind,
            owner_id: owner_id.to_string(),
            error: err.to_string(),
            retryable,
        }
    }
}
