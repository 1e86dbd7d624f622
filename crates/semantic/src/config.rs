use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

pub const ENV_API_URL: &str = "TALENTMATCH_EMBEDDING_API_URL";
pub const ENV_API_TOKEN: &str = "TALENTMATCH_EMBEDDING_API_TOKEN";

/// Settings for the embedding adapter.
///
/// # Example
/// ```
/// use semantic::EmbeddingConfig;
///
/// let cfg = EmbeddingConfig::default()
///     .with_api_url("https://api.openai.com/v1/embeddings")
///     .with_api_provider("openai")
///     .with_bearer_token("sk-xxx");
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.api_auth_header.as_deref(), Some("Bearer sk-xxx"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding endpoint. Required by the HTTP embedder, ignored by the stub.
    pub api_url: Option<String>,
    /// Full `Authorization` header value (e.g. `"Bearer sk-xxx"`).
    pub api_auth_header: Option<String>,
    /// Request/response dialect: `"openai"`, `"hf"` or `"custom"`.
    pub api_provider: String,
    /// Model identifier sent to the service and stamped on every vector.
    pub model_name: String,
    /// Expected vector length; must match the vector index collection.
    pub dimension: usize,
    /// Longest text, in characters, the service accepts.
    pub max_input_chars: usize,
    /// Truncate overlong text instead of rejecting it. Truncation is flagged on the vector.
    pub truncate_overlong: bool,
    pub timeout_secs: u64,
    /// L2-normalize vectors after they come back.
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_auth_header: None,
            api_provider: "openai".into(),
            model_name: "text-embedding-ada-002".into(),
            dimension: 1536,
            max_input_chars: 8000,
            truncate_overlong: false,
            timeout_secs: 30,
            normalize: false,
        }
    }
}

impl EmbeddingConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_api_provider(mut self, provider: impl Into<String>) -> Self {
        self.api_provider = provider.into();
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.api_auth_header = Some(format!("Bearer {token}"));
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>, dimension: usize) -> Self {
        self.model_name = model_name.into();
        self.dimension = dimension;
        self
    }

    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    pub fn with_truncation(mut self, truncate: bool) -> Self {
        self.truncate_overlong = truncate;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Apply `TALENTMATCH_EMBEDDING_API_URL` / `TALENTMATCH_EMBEDDING_API_TOKEN`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with a custom lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(url.trim().to_string());
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self = self.with_bearer_token(token.trim());
        }
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model_name.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig("model_name must not be empty".into()));
        }
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig("dimension must be positive".into()));
        }
        if self.max_input_chars == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "max_input_chars must be positive".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(EmbeddingError::InvalidConfig("timeout_secs must be positive".into()));
        }
        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EmbeddingError::InvalidConfig(format!(
                    "api_url must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }
}
