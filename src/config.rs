//! Application configuration.
//!
//! Values come from, in increasing priority:
//!
//! 1. built-in defaults,
//! 2. an optional config file (`talentmatch.toml`, `.yaml` or `.json` in the
//!    working directory, or an explicit path),
//! 3. environment variables prefixed `TALENTMATCH__`, with `__` between
//!    nesting levels, e.g. `TALENTMATCH__SCORING__MIN_MATCH_SCORE=50`.
//!
//! A `.env` file is loaded first when present. The embedding endpoint and
//! token can also be set through `TALENTMATCH_EMBEDDING_API_URL` and
//! `TALENTMATCH_EMBEDDING_API_TOKEN`.
//!
//! ## Example TOML
//!
//! ```toml
//! log_level = "debug"
//!
//! [scoring]
//! min_match_score = 45
//!
//! [scoring.weights]
//! remote = 25
//! location_exact = 20
//! relocation = 10
//! technology = 55
//!
//! [embedding]
//! api_url = "https://api.openai.com/v1/embeddings"
//! model_name = "text-embedding-3-small"
//! dimension = 1536
//!
//! [semantic]
//! top_k = 5
//! embed_concurrency = 4
//!
//! [semantic.retry]
//! max_attempts = 3
//! base_delay = 200
//! max_delay = 5000
//!
//! [index]
//! backend = "memory"
//! collection = "talentmatch_profiles"
//! ```

use std::path::Path;

use config::{Environment, File, Source};
use matcher::SemanticConfig;
use profile::IngestConfig;
use scorer::ScoringConfig;
use semantic::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of environment variables read by [`AppConfig::load`].
pub const ENV_PREFIX: &str = "TALENTMATCH";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_NAME: &str = "talentmatch";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// A `.env` file exists but could not be read or parsed.
    #[error("failed to load .env: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Accept a missing `.env`; surface anything else.
fn dotenv_outcome<T>(loaded: dotenvy::Result<T>) -> Result<(), ConfigLoadError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Process-local index, rebuilt on every run.
    #[default]
    Memory,
    /// Qdrant over gRPC; needs the `qdrant` feature.
    Qdrant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default)]
    pub backend: IndexBackend,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Qdrant endpoint.
    #[serde(default = "default_index_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_index_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            collection: default_collection(),
            url: default_index_url(),
            api_key: None,
            timeout_secs: default_index_timeout_secs(),
        }
    }
}

impl IndexSettings {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "index.collection must not be empty".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "index.timeout_secs must be positive".into(),
            ));
        }
        if self.backend == IndexBackend::Qdrant && cfg!(not(feature = "qdrant")) {
            return Err(ConfigLoadError::Validation(
                "index.backend = \"qdrant\" needs the `qdrant` feature".into(),
            ));
        }
        Ok(())
    }

    #[cfg(feature = "qdrant")]
    pub fn qdrant_config(&self) -> index::QdrantConfig {
        index::QdrantConfig {
            url: self.url.clone(),
            api_key: self.api_key.clone(),
            collection: self.collection.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Everything the `talentmatch` binary needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"matcher=debug,info"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub index: IndexSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            ingest: IngestConfig::default(),
            scoring: ScoringConfig::default(),
            embedding: EmbeddingConfig::default(),
            semantic: SemanticConfig::default(),
            index: IndexSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, the config file and the environment, then validate.
    ///
    /// With `path` the file must exist; otherwise `talentmatch.{toml,yaml,json}`
    /// is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        dotenv_outcome(dotenvy::dotenv())?;

        let env = Self::environment();
        let cfg = match path {
            Some(path) => Self::from_sources(File::from(path).required(true), env)?,
            None => Self::from_sources(File::with_name(DEFAULT_CONFIG_NAME).required(false), env)?,
        };

        let cfg = AppConfig {
            embedding: cfg.embedding.with_env_overrides(),
            ..cfg
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// The `TALENTMATCH__*` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// Layer `env` over `file`, without validating.
    pub fn from_sources<S>(file: S, env: Environment) -> Result<Self, ConfigLoadError>
    where
        S: Source + Send + Sync + 'static,
    {
        let cfg = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation("log_level must not be empty".into()));
        }
        self.scoring
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.embedding
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.semantic
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.index.validate()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_collection() -> String {
    "talentmatch_profiles".to_string()
}

fn default_index_url() -> String {
    "http://localhost:6334".to_string()
}

fn default_index_timeout_secs() -> u64 {
    10
}
