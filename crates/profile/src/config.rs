use serde::{Deserialize, Serialize};

/// Knobs for turning raw mapping records into typed profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Reject jobs whose technology set ends up empty.
    pub require_job_technologies: bool,
    /// Append the free-text body to summaries composed from structured fields.
    pub include_body_in_summary: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            require_job_technologies: false,
            include_body_in_summary: true,
        }
    }
}

impl IngestConfig {
    pub fn with_require_job_technologies(mut self, require: bool) -> Self {
        self.require_job_technologies = require;
        self
    }

    pub fn with_body_in_summary(mut self, include: bool) -> Self {
        self.include_body_in_summary = include;
        self
    }
}
