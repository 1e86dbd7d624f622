//! Input checks before a request and vector post-processing after it.

use tracing::warn;

use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PreparedInput<'a> {
    pub text: &'a str,
    pub truncated: bool,
}

/// Trim `text`, reject it when empty, and apply the length limit.
///
/// Overlong text is cut on a char boundary only when the config allows it;
/// otherwise it is rejected. A cut is always logged and reported back.
pub(crate) fn prepare_input<'a>(
    owner_id: &str,
    text: &'a str,
    cfg: &EmbeddingConfig,
) -> Result<PreparedInput<'a>, EmbeddingError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EmbeddingError::InvalidInput {
            owner_id: owner_id.to_string(),
            reason: "text is empty".into(),
        });
    }

    let Some((cut, _)) = text.char_indices().nth(cfg.max_input_chars) else {
        return Ok(PreparedInput {
            text,
            truncated: false,
        });
    };

    if !cfg.truncate_overlong {
        return Err(EmbeddingError::InvalidInput {
            owner_id: owner_id.to_string(),
            reason: format!(
                "text has {} characters, limit is {}",
                text.chars().count(),
                cfg.max_input_chars
            ),
        });
    }

    warn!(
        owner_id,
        limit = cfg.max_input_chars,
        original_bytes = text.len(),
        "embedding_input_truncated"
    );
    Ok(PreparedInput {
        text: &text[..cut],
        truncated: true,
    })
}

/// In-place L2 normalization. Zero vectors are left untouched.
pub(crate) fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f64 = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        v.iter_mut().for_each(|x| *x = (f64::from(*x) * inv_norm) as f32);
    }
}

/// Check the service answered with the configured dimension.
pub(crate) fn check_dimension(
    owner_id: &str,
    vector: &[f32],
    cfg: &EmbeddingConfig,
) -> Result<(), EmbeddingError> {
    if vector.len() == cfg.dimension {
        return Ok(());
    }
    Err(EmbeddingError::Configuration {
        owner_id: owner_id.to_string(),
        reason: format!(
            "model {} returned {} dimensions, expected {}",
            cfg.model_name,
            vector.len(),
            cfg.dimension
        ),
    })
}
