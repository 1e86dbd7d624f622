use std::time::{Duration, Instant};

use async_trait::async_trait;
use profile::OwnerKind;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::prepare::{check_dimension, l2_normalize_in_place, prepare_input};
use crate::{Embedder, EmbeddingConfig, EmbeddingError, EmbeddingVector};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

fn api_provider_kind(cfg: &EmbeddingConfig) -> ApiProviderKind {
    match cfg.api_provider.to_ascii_lowercase().as_str() {
        "hf" | "huggingface" => ApiProviderKind::HuggingFace,
        "openai" | "gpt" => ApiProviderKind::OpenAI,
        _ => ApiProviderKind::Custom,
    }
}

fn build_api_payload(provider: ApiProviderKind, text: &str, cfg: &EmbeddingConfig) -> Value {
    match provider {
        ApiProviderKind::HuggingFace => json!({ "inputs": text }),
        ApiProviderKind::OpenAI => json!({ "input": text, "model": cfg.model_name }),
        ApiProviderKind::Custom => json!({ "text": text, "model": cfg.model_name }),
    }
}

/// Embedder backed by a JSON-over-HTTP embedding service.
///
/// One request per profile. The reqwest client is pooled and shared by clones.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    provider: ApiProviderKind,
    cfg: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(cfg: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        cfg.validate()?;
        let url = cfg.api_url.clone().ok_or_else(|| {
            EmbeddingError::InvalidConfig("api_url is required for the HTTP embedder".into())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url,
            provider: api_provider_kind(&cfg),
            cfg,
        })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.cfg
    }

    async fn send(&self, owner_id: &str, payload: &Value) -> Result<Value, EmbeddingError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(header) = self.cfg.api_auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request
            .json(payload)
            .send()
            .await
            .map_err(|e| classify_transport(owner_id, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(owner_id, status, &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse {
                owner_id: owner_id.to_string(),
                reason: format!("invalid JSON response: {e}"),
            })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.cfg.model_name
    }

    fn dimension(&self) -> usize {
        self.cfg.dimension
    }

    async fn embed(
        &self,
        owner_id: &str,
        owner_kind: OwnerKind,
        text: &str,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        let start = Instant::now();
        let prepared = prepare_input(owner_id, text, &self.cfg)?;
        let payload = build_api_payload(self.provider, prepared.text, &self.cfg);

        let response = self.send(owner_id, &payload).await?;
        let mut vector = parse_embedding_response(response).map_err(|reason| {
            EmbeddingError::InvalidResponse {
                owner_id: owner_id.to_string(),
                reason,
            }
        })?;
        check_dimension(owner_id, &vector, &self.cfg)?;
        if self.cfg.normalize {
            l2_normalize_in_place(&mut vector);
        }

        debug!(
            owner_id,
            owner_kind = %owner_kind,
            dimension = vector.len(),
            truncated = prepared.truncated,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "embedding_created"
        );

        Ok(EmbeddingVector {
            owner_id: owner_id.to_string(),
            owner_kind,
            vector,
            model_id: self.cfg.model_name.clone(),
            truncated: prepared.truncated,
        })
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
fn classify_status(owner_id: &str, status: StatusCode, body: &str) -> EmbeddingError {
    let owner_id = owner_id.to_string();
    let reason = format!("HTTP {status}: {}", preview(body.trim()));
    match status.as_u16() {
        408 | 429 | 500..=599 => EmbeddingError::Transient { owner_id, reason },
        400 | 413 | 422 => EmbeddingError::InvalidInput { owner_id, reason },
        401 | 403 | 404 => EmbeddingError::Configuration { owner_id, reason },
        _ => EmbeddingError::InvalidResponse { owner_id, reason },
    }
}

fn classify_transport(owner_id: &str, err: &reqwest::Error) -> EmbeddingError {
    let owner_id = owner_id.to_string();
    let reason = format!("HTTP request failed: {err}");
    if err.is_builder() {
        EmbeddingError::Configuration { owner_id, reason }
    } else if err.is_decode() {
        EmbeddingError::InvalidResponse { owner_id, reason }
    } else {
        EmbeddingError::Transient { owner_id, reason }
    }
}

/// Pull the first vector out of any of the supported response shapes.
fn parse_embedding_response(value: Value) -> Result<Vec<f32>, String> {
    parse_embeddings_from_value(value)?
        .into_iter()
        .next()
        .ok_or_else(|| "response did not contain an embedding".to_string())
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, String> {
    match value {
        Value::Object(mut map) => {
            if let Some(vector) = map.remove("vector") {
                return parse_embedding_vector(vector).map(|v| vec![v]);
            }
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| "missing `embedding` field in data item".to_string())
                            .and_then(parse_embedding_vector),
                        _ => Err("unexpected entry inside `data` array".to_string()),
                    })
                    .collect();
            }
            Err("unsupported response shape".to_string())
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, String> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|v| vec![v]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, String> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| format!("embedding value {num} does not fit in f32")),
                other => Err(format!("embedding entries must be numbers, got {other}")),
            })
            .collect(),
        other => Err(format!("embedding vector must be an array, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape_per_provider() {
        let cfg = EmbeddingConfig::default();
        assert_eq!(
            build_api_payload(ApiProviderKind::OpenAI, "hi", &cfg),
            json!({ "input": "hi", "model": "text-embedding-ada-002" })
        );
        assert_eq!(
            build_api_payload(ApiProviderKind::HuggingFace, "hi", &cfg),
            json!({ "inputs": "hi" })
        );
        assert_eq!(
            build_api_payload(ApiProviderKind::Custom, "hi", &cfg),
            json!({ "text": "hi", "model": "text-embedding-ada-002" })
        );
    }

    #[test]
    fn provider_names_are_case_insensitive() {
        let cfg = EmbeddingConfig::default().with_api_provider("HuggingFace");
        assert_eq!(api_provider_kind(&cfg), ApiProviderKind::HuggingFace);
        let cfg = EmbeddingConfig::default().with_api_provider("anything");
        assert_eq!(api_provider_kind(&cfg), ApiProviderKind::Custom);
    }

    #[test]
    fn parses_every_supported_response_shape() {
        let openai = json!({ "data": [{ "embedding": [0.1, 0.2] }], "model": "ada" });
        assert_eq!(parse_embedding_response(openai).unwrap(), vec![0.1, 0.2]);

        let embeddings = json!({ "embeddings": [[1.0, 2.0]] });
        assert_eq!(parse_embedding_response(embeddings).unwrap(), vec![1.0, 2.0]);

        let vector = json!({ "vector": [3.0, 4.0], "model": "custom" });
        assert_eq!(parse_embedding_response(vector).unwrap(), vec![3.0, 4.0]);

        assert_eq!(parse_embedding_response(json!([5.0, 6.0])).unwrap(), vec![5.0, 6.0]);
        assert_eq!(parse_embedding_response(json!([[7.0], [8.0]])).unwrap(), vec![7.0]);
    }

    #[test]
    fn rejects_malformed_responses() {
        assert!(parse_embedding_response(json!({ "status": "ok" })).is_err());
        assert!(parse_embedding_response(json!([])).is_err());
        assert!(parse_embedding_response(json!({ "data": [{ "vec": [1.0] }] })).is_err());
        assert!(parse_embedding_response(json!(["a", "b"])).is_err());
    }

    #[test]
    fn rejects_values_that_overflow_f32() {
        let err = parse_embedding_response(json!({ "vector": [0.5, 1e39] })).unwrap_err();
        assert!(err.contains("1e39"), "{err}");
        let err = parse_embedding_response(json!([[0.1, -3.5e38]])).unwrap_err();
        assert!(err.contains("f32"));
        assert_eq!(
            parse_embedding_response(json!([f64::from(f32::MAX)])).unwrap(),
            vec![f32::MAX]
        );
    }

    #[test]
    fn status_classification() {
        let transient = [408u16, 429, 500, 502, 503];
        for code in transient {
            let err = classify_status("c1", StatusCode::from_u16(code).unwrap(), "");
            assert!(err.is_retryable(), "{code} should be retryable");
        }
        for code in [400u16, 413, 422] {
            let err = classify_status("c1", StatusCode::from_u16(code).unwrap(), "too long");
            assert!(matches!(err, EmbeddingError::InvalidInput { .. }));
        }
        for code in [401u16, 403, 404] {
            let err = classify_status("c1", StatusCode::from_u16(code).unwrap(), "");
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn constructor_requires_url() {
        let err = HttpEmbedder::new(EmbeddingConfig::default()).unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidConfig(_)));
        assert!(HttpEmbedder::new(EmbeddingConfig::default().with_api_url("http://127.0.0.1:1")).is_ok());
    }
}
