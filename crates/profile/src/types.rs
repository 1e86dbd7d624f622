use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::remote::RemotePolicy;
use crate::tech::TechSet;

/// Which side of the market a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Candidate,
    Job,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Candidate => "candidate",
            OwnerKind::Job => "job",
        }
    }

    /// The kind a profile of this kind is matched against.
    pub fn opposite(self) -> Self {
        match self {
            OwnerKind::Candidate => OwnerKind::Job,
            OwnerKind::Job => OwnerKind::Candidate,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" | "candidates" => Ok(OwnerKind::Candidate),
            "job" | "jobs" => Ok(OwnerKind::Job),
            other => Err(ProfileError::UnknownOwnerKind(other.to_string())),
        }
    }
}

/// A job seeker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote: RemotePolicy,
    #[serde(default)]
    pub willing_to_relocate: bool,
    #[serde(default)]
    pub technologies: TechSet,
    #[serde(default)]
    pub summary: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: String::new(),
            location: None,
            remote: RemotePolicy::Unspecified,
            willing_to_relocate: false,
            technologies: TechSet::new(),
            summary: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_remote(mut self, remote: RemotePolicy) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_relocation(mut self, willing: bool) -> Self {
        self.willing_to_relocate = willing;
        self
    }

    pub fn with_technologies<S: AsRef<str>>(mut self, techs: impl IntoIterator<Item = S>) -> Self {
        self.technologies = techs.into_iter().collect();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remote: RemotePolicy,
    #[serde(default)]
    pub technologies: TechSet,
    #[serde(default)]
    pub summary: String,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: String::new(),
            company: None,
            position: None,
            location: None,
            remote: RemotePolicy::Unspecified,
            technologies: TechSet::new(),
            summary: String::new(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_remote(mut self, remote: RemotePolicy) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_technologies<S: AsRef<str>>(mut self, techs: impl IntoIterator<Item = S>) -> Self {
        self.technologies = techs.into_iter().collect();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Either side of a match, tagged by owner kind when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    Candidate(Candidate),
    Job(Job),
}

impl Profile {
    pub fn id(&self) -> &str {
        match self {
            Profile::Candidate(c) => &c.id,
            Profile::Job(j) => &j.id,
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Profile::Candidate(_) => OwnerKind::Candidate,
            Profile::Job(_) => OwnerKind::Job,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            Profile::Candidate(c) => &c.summary,
            Profile::Job(j) => &j.summary,
        }
    }

    pub fn technologies(&self) -> &TechSet {
        match self {
            Profile::Candidate(c) => &c.technologies,
            Profile::Job(j) => &j.technologies,
        }
    }
}

impl From<Candidate> for Profile {
    fn from(value: Candidate) -> Self {
        Profile::Candidate(value)
    }
}

impl From<Job> for Profile {
    fn from(value: Job) -> Self {
        Profile::Job(value)
    }
}
