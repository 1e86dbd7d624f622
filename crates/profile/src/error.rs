//! Error types for profile ingestion.
//!
//! Every variant produced while ingesting a batch carries the zero-based
//! position of the offending record so callers can report it back to whoever
//! produced the data. The identifier is attached whenever it could be read.
//!
//! ```
//! use profile::ProfileError;
//!
//! let err = ProfileError::MissingIdentifier { index: 3 };
//! assert_eq!(err.to_string(), "record 3: missing identifier");
//! assert_eq!(err.record_index(), Some(3));
//! ```

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    /// The record has no identifier, or only whitespace.
    #[error("record {index}: missing identifier")]
    MissingIdentifier { index: usize },

    /// The record is not an object or one of its fields has the wrong type.
    #[error("record {index}: malformed record: {reason}")]
    Malformed {
        index: usize,
        id: Option<String>,
        reason: String,
    },

    /// A job with no technologies while the ingest config requires them.
    #[error("record {index} ({id}): job has no technologies")]
    EmptyTechnologies { index: usize, id: String },

    /// The identifier was already taken by an earlier record of the same kind.
    #[error("record {index} ({id}): duplicate identifier")]
    DuplicateIdentifier { index: usize, id: String },

    /// A job reusing a candidate's identifier.
    #[error("record {index} ({id}): identifier already used by a candidate")]
    SharedIdentifier { index: usize, id: String },

    #[error("unknown owner kind: {0}")]
    UnknownOwnerKind(String),

    /// The top-level profile document does not have the expected shape.
    #[error("invalid profile document: {0}")]
    InvalidDocument(String),
}

impl ProfileError {
    pub fn record_index(&self) -> Option<usize> {
        match self {
            ProfileError::MissingIdentifier { index }
            | ProfileError::Malformed { index, .. }
            | ProfileError::EmptyTechnologies { index, .. }
            | ProfileError::DuplicateIdentifier { index, .. }
            | ProfileError::SharedIdentifier { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            ProfileError::Malformed { id, .. } => id.as_deref(),
            ProfileError::EmptyTechnologies { id, .. }
            | ProfileError::DuplicateIdentifier { id, .. }
            | ProfileError::SharedIdentifier { id, .. } => Some(id),
            _ => None,
        }
    }
}
