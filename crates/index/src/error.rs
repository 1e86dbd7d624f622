use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Connectivity loss or a timeout talking to the index service. Retryable.
    #[error("vector index unavailable: {0}")]
    Unavailable(String),
    /// Missing collection or a misconfigured client. Fatal, never retried.
    #[error("vector index configuration error: {0}")]
    Configuration(String),
    #[error("vector dimension mismatch for {id}: expected {expected}, got {actual}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
    /// A NaN or infinite component. Rejected before it reaches storage or ranking.
    #[error("vector for {id} is not finite: component {position} is {value}")]
    NonFiniteVector {
        id: String,
        position: usize,
        value: f32,
    },
    #[error("backend error: {0}")]
    Backend(String),
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn missing_collection(name: &str) -> Self {
        Self::Configuration(format!("collection `{name}` does not exist"))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, IndexError::Unavailable(_))
    }

    /// Configuration-class errors; no later call can succeed either.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IndexError::Configuration(_) | IndexError::DimensionMismatch { .. }
        )
    }
}
