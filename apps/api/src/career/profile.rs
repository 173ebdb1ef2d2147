use serde::{Deserialize, Serialize};

use crate::index::MetadataFilter;
use crate::models::job_role::ExperienceLevel;

/// Metadata keys written by job indexing and read by matching filters.
pub const EXPERIENCE_LEVEL_FIELD: &str = "experience_level";
pub const INDUSTRY_FIELD: &str = "industry";

/// The user's side of a match request. Built once per request and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserQueryProfile {
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub preferred_industries: Vec<String>,
}

impl UserQueryProfile {
    /// Descriptive text embedded as the query vector.
    /// Field order is fixed; empty optional fields are omitted.
    pub fn query_text(&self) -> String {
        let mut parts = vec![
            format!("Skills: {}", self.skills.join(", ")),
            format!("Experience level: {}", self.experience_level),
        ];
        if !self.interests.is_empty() {
            parts.push(format!("Interests: {}", self.interests.join(", ")));
        }
        if !self.preferred_industries.is_empty() {
            parts.push(format!(
                "Preferred industries: {}",
                self.preferred_industries.join(", ")
            ));
        }
        parts.join(". ")
    }

    /// Tier adjacency filter, plus an industry filter when industries are preferred.
    pub fn search_filters(&self) -> MetadataFilter {
        let mut filters = MetadataFilter::new();
        filters.insert(
            EXPERIENCE_LEVEL_FIELD.to_string(),
            self.experience_level
                .matchable_levels()
                .iter()
                .map(|l| l.as_str().to_string())
                .collect(),
        );
        if !self.preferred_industries.is_empty() {
            filters.insert(
                INDUSTRY_FIELD.to_string(),
                self.preferred_industries.clone(),
            );
        }
        filters
    }
}
