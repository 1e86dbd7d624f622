use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points awarded per criterion.
///
/// `relocation` is the partial location credit for a candidate willing to move
/// to an onsite job. The other three are the maxima of the breakdown and must
/// not exceed 100 together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub remote: f64,
    pub location_exact: f64,
    pub relocation: f64,
    pub technology: f64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    remote: 25.0,
    location_exact: 20.0,
    relocation: 10.0,
    technology: 55.0,
};

pub const DEFAULT_MIN_MATCH_SCORE: f64 = 40.0;

/// Upper bound of every rule-based score.
pub const MAX_SCORE: f64 = 100.0;

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    /// Highest total these weights can produce.
    pub fn max_total(&self) -> f64 {
        self.remote + self.location_exact + self.technology
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("invalid scoring config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Pairs scoring at or above this value are matches.
    pub min_match_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
        }
    }
}

impl ScoringConfig {
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_min_match_score(mut self, min_match_score: f64) -> Self {
        self.min_match_score = min_match_score;
        self
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let w = &self.weights;
        for (name, value) in [
            ("remote", w.remote),
            ("location_exact", w.location_exact),
            ("relocation", w.relocation),
            ("technology", w.technology),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "weight `{name}` must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if w.relocation > w.location_exact {
            return Err(ScoringError::InvalidConfig(format!(
                "relocation weight {} exceeds exact location weight {}",
                w.relocation, w.location_exact
            )));
        }
        if w.max_total() > MAX_SCORE {
            return Err(ScoringError::InvalidConfig(format!(
                "weights add up to {} which exceeds {MAX_SCORE}",
                w.max_total()
            )));
        }
        if !self.min_match_score.is_finite() || !(0.0..=MAX_SCORE).contains(&self.min_match_score) {
            return Err(ScoringError::InvalidConfig(format!(
                "min_match_score must be within 0..={MAX_SCORE} (got {})",
                self.min_match_score
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_max_score() {
        assert!((DEFAULT_WEIGHTS.max_total() - MAX_SCORE).abs() < 1e-9);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_negative_and_non_finite_weights() {
        let negative = ScoringConfig::default().with_weights(ScoringWeights {
            remote: -1.0,
            ..DEFAULT_WEIGHTS
        });
        assert!(negative.validate().is_err());

        let nan = ScoringConfig::default().with_weights(ScoringWeights {
            technology: f64::NAN,
            ..DEFAULT_WEIGHTS
        });
        assert!(nan.validate().is_err());
    }

    #[test]
    fn rejects_weights_over_one_hundred() {
        let cfg = ScoringConfig::default().with_weights(ScoringWeights {
            technology: 60.0,
            ..DEFAULT_WEIGHTS
        });
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn rejects_relocation_above_exact_location() {
        let cfg = ScoringConfig::default().with_weights(ScoringWeights {
            relocation: 30.0,
            ..DEFAULT_WEIGHTS
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        assert!(ScoringConfig::default().with_min_match_score(120.0).validate().is_err());
        assert!(ScoringConfig::default().with_min_match_score(0.0).validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ScoringConfig =
            serde_json::from_str(r#"{ "min_match_score": 55, "weights": { "remote": 30, "technology": 50 } }"#)
                .unwrap();
        assert_eq!(cfg.min_match_score, 55.0);
        assert_eq!(cfg.weights.remote, 30.0);
        assert_eq!(cfg.weights.location_exact, 20.0);
        assert!(cfg.validate().is_ok());
    }
}
