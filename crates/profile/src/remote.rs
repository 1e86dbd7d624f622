use serde::{Deserialize, Serialize};

use crate::normalize::normalize_key;

/// Remote-work stance shared by candidate preferences and job policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemotePolicy {
    RemoteOnly,
    Hybrid,
    Onsite,
    #[default]
    Unspecified,
}

const HYBRID_PHRASES: &[&str] = &[
    "hybrid",
    "remote ok",
    "remote friendly",
    "remote-friendly",
    "remote possible",
    "partially remote",
    "flexible",
];

const ONSITE_PHRASES: &[&str] = &[
    "onsite",
    "on-site",
    "on site",
    "in office",
    "in-office",
    "not remote",
    "no remote",
];

impl RemotePolicy {
    /// Interpret the free-text value of a "Remote:" line.
    ///
    /// Hybrid phrasing wins over the bare word "remote", and an explicit "no"
    /// reads as onsite. Anything unrecognised stays [`RemotePolicy::Unspecified`].
    pub fn parse_lenient(raw: &str) -> Self {
        let value = normalize_key(raw);
        if value.is_empty() {
            return RemotePolicy::Unspecified;
        }
        if HYBRID_PHRASES.iter().any(|p| value.contains(p)) {
            return RemotePolicy::Hybrid;
        }
        if ONSITE_PHRASES.iter().any(|p| value.contains(p))
            || value == "no"
            || value.starts_with("no ")
            || value.starts_with("no,")
        {
            return RemotePolicy::Onsite;
        }
        if value.contains("remote") || value == "yes" || value.starts_with("yes") {
            return RemotePolicy::RemoteOnly;
        }
        RemotePolicy::Unspecified
    }

    /// Whether remote work is acceptable under this policy.
    pub fn allows_remote(self) -> bool {
        matches!(self, RemotePolicy::RemoteOnly | RemotePolicy::Hybrid)
    }

    /// Whether the policy involves being physically present somewhere.
    pub fn is_on_premises(self) -> bool {
        matches!(self, RemotePolicy::Onsite | RemotePolicy::Hybrid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RemotePolicy::RemoteOnly => "remote_only",
            RemotePolicy::Hybrid => "hybrid",
            RemotePolicy::Onsite => "onsite",
            RemotePolicy::Unspecified => "unspecified",
        }
    }
}
