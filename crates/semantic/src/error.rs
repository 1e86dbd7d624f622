use thiserror::Error;

/// Errors surfaced while turning a profile summary into a vector.
///
/// Every per-record variant carries the owner id so callers can report the
/// failing profile and keep going with the rest of the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbeddingError {
    /// Empty text, or text over the service limit when truncation is off. Not retryable.
    #[error("invalid embedding input for {owner_id}: {reason}")]
    InvalidInput { owner_id: String, reason: String },
    /// Network failure, timeout, throttling or a 5xx from the service. Retryable.
    #[error("embedding service unavailable for {owner_id}: {reason}")]
    Transient { owner_id: String, reason: String },
    /// Credentials, endpoint or model/dimension mismatch. Fatal for the run.
    #[error("embedding service misconfigured for {owner_id}: {reason}")]
    Configuration { owner_id: String, reason: String },
    /// The service answered with something that is not an embedding.
    #[error("invalid embedding response for {owner_id}: {reason}")]
    InvalidResponse { owner_id: String, reason: String },
    /// Rejected by [`EmbeddingConfig::validate`](crate::EmbeddingConfig::validate).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
}

impl EmbeddingError {
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            EmbeddingError::InvalidInput { owner_id, .. }
            | EmbeddingError::Transient { owner_id, .. }
            | EmbeddingError::Configuration { owner_id, .. }
            | EmbeddingError::InvalidResponse { owner_id, .. } => Some(owner_id),
            EmbeddingError::InvalidConfig(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, EmbeddingError::Transient { .. })
    }

    /// Whether the error makes every further call pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Configuration { .. } | EmbeddingError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> EmbeddingError {
        EmbeddingError::Transient {
            owner_id: "c-1".into(),
            reason: "HTTP 503".into(),
        }
    }

    #[test]
    fn only_transient_is_retryable() {
        assert!(transient().is_retryable());
        for err in [
            EmbeddingError::InvalidInput {
                owner_id: "c-1".into(),
                reason: "empty".into(),
            },
            EmbeddingError::Configuration {
                owner_id: "c-1".into(),
                reason: "401".into(),
            },
            EmbeddingError::InvalidResponse {
                owner_id: "c-1".into(),
                reason: "no data".into(),
            },
            EmbeddingError::InvalidConfig("dimension".into()),
        ] {
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }
    }

    #[test]
    fn display_includes_owner() {
        let msg = transient().to_string();
        assert!(msg.contains("c-1"));
        assert!(msg.contains("HTTP 503"));
        assert_eq!(transient().owner_id(), Some("c-1"));
    }

    #[test]
    fn configuration_is_fatal() {
        let err = EmbeddingError::Configuration {
            owner_id: "j".into(),
            reason: "dimension mismatch".into(),
        };
        assert!(err.is_fatal());
        assert!(!transient().is_fatal());
    }
}
