//! Rule-based scoring of candidate/job pairs.
//!
//! Three criteria contribute points: remote compatibility, location and
//! technology overlap. Weights and the match threshold come from
//! [`ScoringConfig`]; the defaults are 25/20/10/55 with a threshold of 40.
//!
//! ```
//! use profile::{Candidate, Job, RemotePolicy};
//! use scorer::{evaluate, Criterion, ScoringConfig, Verdict};
//!
//! let candidate = Candidate::new("c1")
//!     .with_location("Berlin")
//!     .with_remote(RemotePolicy::RemoteOnly)
//!     .with_technologies(["python", "go"]);
//! let job = Job::new("j1")
//!     .with_location("Remote")
//!     .with_remote(RemotePolicy::RemoteOnly)
//!     .with_technologies(["go", "java"]);
//!
//! let pair = evaluate(&candidate, &job, &ScoringConfig::default());
//! assert_eq!(pair.result.score, 52.5);
//! assert_eq!(pair.result.points(Criterion::Remote), 25.0);
//! assert_eq!(pair.verdict, Verdict::Match);
//! ```

mod config;
mod score;
mod types;

pub use config::{
    ScoringConfig, ScoringError, ScoringWeights, DEFAULT_MIN_MATCH_SCORE, DEFAULT_WEIGHTS,
    MAX_SCORE,
};
pub use score::{evaluate, is_match, score};
pub use types::{Criterion, MatchMethod, MatchResult, ScoredPair, Verdict};
