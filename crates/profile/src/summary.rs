//! Summary sentences composed from structured profile fields.
//!
//! Used when a record carries no summary of its own. The output is stable for a
//! given set of fields, so embeddings computed from it are reproducible.

use crate::tech::TechSet;
use crate::types::{Candidate, Job};

const LISTED_TECHNOLOGIES: usize = 3;

fn technology_list(techs: &TechSet) -> String {
    let listed: Vec<&str> = techs.iter().take(LISTED_TECHNOLOGIES).collect();
    let mut out = listed.join(", ");
    if techs.len() > LISTED_TECHNOLOGIES {
        out.push_str(", and more");
    }
    out
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"<Location>-based developer with skills in <techs> who is available for remote work and willing to relocate"`
pub fn candidate_summary(candidate: &Candidate) -> String {
    let mut parts = Vec::new();
    if let Some(location) = &candidate.location {
        parts.push(format!("{location}-based"));
    }
    if candidate.technologies.is_empty() {
        parts.push("developer".to_string());
    } else {
        parts.push(format!(
            "developer with skills in {}",
            technology_list(&candidate.technologies)
        ));
    }

    let mut prefs = Vec::new();
    if candidate.remote.allows_remote() {
        prefs.push("available for remote work");
    }
    if candidate.willing_to_relocate {
        prefs.push("willing to relocate");
    }
    if !prefs.is_empty() {
        parts.push(format!("who is {}", prefs.join(" and ")));
    }

    capitalize_first(&parts.join(" "))
}

/// `"<Company> is hiring for <Position> in <Location> with remote options using <techs>"`
pub fn job_summary(job: &Job) -> String {
    let company = job.company.as_deref().unwrap_or("Company");
    let mut parts = vec![format!("{company} is hiring")];
    if let Some(position) = &job.position {
        parts.push(format!("for {position}"));
    }
    if let Some(location) = &job.location {
        parts.push(format!("in {location}"));
    }
    if job.remote.allows_remote() {
        parts.push("with remote options".to_string());
    }
    if !job.technologies.is_empty() {
        parts.push(format!("using {}", technology_list(&job.technologies)));
    }
    capitalize_first(&parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemotePolicy;

    #[test]
    fn candidate_summary_lists_all_preferences() {
        let candidate = Candidate::new("c1")
            .with_location("berlin")
            .with_remote(RemotePolicy::RemoteOnly)
            .with_relocation(true)
            .with_technologies(["Rust", "Go"]);
        assert_eq!(
            candidate_summary(&candidate),
            "Berlin-based developer with skills in go, rust who is available for remote work and willing to relocate"
        );
    }

    #[test]
    fn candidate_summary_without_fields() {
        assert_eq!(candidate_summary(&Candidate::new("c2")), "Developer");
    }

    #[test]
    fn job_summary_truncates_long_technology_lists() {
        let job = Job::new("j1")
            .with_company("Acme")
            .with_position("Backend Engineer")
            .with_location("NYC")
            .with_remote(RemotePolicy::Hybrid)
            .with_technologies(["a", "b", "c", "d"]);
        assert_eq!(
            job_summary(&job),
            "Acme is hiring for Backend Engineer in NYC with remote options using a, b, c, and more"
        );
    }

    #[test]
    fn job_summary_falls_back_to_placeholder_company() {
        let job = Job::new("j2").with_remote(RemotePolicy::Onsite);
        assert_eq!(job_summary(&job), "Company is hiring");
    }
}
