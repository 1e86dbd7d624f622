#![allow(dead_code)]

use serde_json::{json, Value};
use talentmatch::{ingest_document, IngestConfig, ProfileSnapshot};

/// Two candidates, three jobs. Expected rule-based scores:
///
/// | pair                        | remote | location | tech | total |
/// |-----------------------------|--------|----------|------|-------|
/// | c-berlin / j-berlin-onsite  | 25     | 20       | 27.5 | 72.5  |
/// | c-berlin / j-remote-go      | 25     | 0        | 0    | 25    |
/// | c-lisbon / j-remote-go      | 25     | 0        | 55   | 80    |
/// | c-lisbon / j-berlin-onsite  | 0      | 0        | 0    | 0     |
/// | any / j-vague               | 0      | 0        | 0    | 0     |
pub fn document() -> Value {
    json!({
        "candidates": [
            {
                "id": "c-berlin",
                "location": "Berlin",
                "remote": "Hybrid",
                "technologies": "Python, Rust",
                "summary": "rust tokio async systems programmer"
            },
            {
                "id": "c-lisbon",
                "location": "Lisbon",
                "remote": "remote only",
                "skills": ["Go", "Kubernetes"],
                "summary": "figma illustrator visual designer branding"
            },
            { "body": "no identifier, rejected" }
        ],
        "jobs": [
            {
                "id": "j-berlin-onsite",
                "company": "Acme",
                "location": "berlin",
                "remote": "onsite",
                "technologies": ["rust", "python", "postgres", "aws"],
                "summary": "rust tokio systems engineer"
            },
            {
                "id": "j-remote-go",
                "company": "Globex",
                "remote": true,
                "technologies": "go; kubernetes",
                "summary": "visual designer figma branding role"
            },
            { "id": "j-vague", "body": "We are hiring." }
        ]
    })
}

pub fn snapshot() -> ProfileSnapshot {
    ingest_document(&document(), &IngestConfig::default()).expect("document ingests")
}
