use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::career::profile::{EXPERIENCE_LEVEL_FIELD, INDUSTRY_FIELD};
use crate::errors::AppError;
use crate::index::Metadata;

/// Seniority tier shared by job roles and user profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }

    /// Job tiers a user at this level is matched against.
    /// Asymmetric at the ends: entry reaches up to mid, senior reaches down to mid.
    pub fn matchable_levels(&self) -> &'static [ExperienceLevel] {
        match self {
            ExperienceLevel::Entry => &[ExperienceLevel::Entry, ExperienceLevel::Mid],
            ExperienceLevel::Mid => &[
                ExperienceLevel::Entry,
                ExperienceLevel::Mid,
                ExperienceLevel::Senior,
            ],
            ExperienceLevel::Senior => &[ExperienceLevel::Mid, ExperienceLevel::Senior],
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entry" => Ok(ExperienceLevel::Entry),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            other => Err(AppError::InvalidInput(format!(
                "experience_level must be one of entry, mid, senior (got '{other}')"
            ))),
        }
    }
}

/// Raw `job_roles` row. `experience_level` is validated on conversion to [`JobRole`].
#[derive(Debug, Clone, FromRow)]
pub struct JobRoleRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub career_path: String,
    pub experience_level: String,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub industry: String,
    pub embedding_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRole {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Display order is significant; skill gaps are reported in this order.
    pub required_skills: Vec<String>,
    /// Hierarchical path such as "Software > Engineering".
    pub career_path: String,
    pub experience_level: ExperienceLevel,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub industry: String,
    /// Id of the matching record in the similarity index, once indexed.
    pub embedding_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRoleRow> for JobRole {
    type Error = AppError;

    fn try_from(row: JobRoleRow) -> Result<Self, Self::Error> {
        let experience_level = row.experience_level.parse().map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "job role {} has unknown experience level '{}'",
                row.id,
                row.experience_level
            ))
        })?;

        Ok(JobRole {
            id: row.id,
            title: row.title,
            description: row.description,
            required_skills: row.required_skills,
            career_path: row.career_path,
            experience_level,
            salary_range: row.salary_range,
            location: row.location,
            industry: row.industry,
            embedding_id: row.embedding_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl JobRole {
    /// Text embedded for the role and stored in the similarity index.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {}. Required skills: {}. Industry: {}",
            self.title,
            self.description,
            self.required_skills.join(", "),
            self.industry
        )
    }

    /// Metadata stored with the role's vector. Matching filters read
    /// `experience_level` and `industry` from it.
    pub fn index_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), Value::from(self.title.as_str()));
        metadata.insert(INDUSTRY_FIELD.to_string(), Value::from(self.industry.as_str()));
        metadata.insert(
            EXPERIENCE_LEVEL_FIELD.to_string(),
            Value::from(self.experience_level.as_str()),
        );
        metadata.insert(
            "career_path".to_string(),
            Value::from(self.career_path.as_str()),
        );
        if let Some(location) = &self.location {
            metadata.insert("location".to_string(), Value::from(location.as_str()));
        }
        metadata
    }
}

/// A validated job role ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewJobRole {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub career_path: String,
    pub experience_level: ExperienceLevel,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub industry: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_experience_level_is_case_insensitive() {
        assert_eq!("Senior".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Senior);
        assert_eq!(" mid ".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Mid);
    }

    #[test]
    fn test_unknown_experience_level_is_invalid_input() {
        let err = "principal".parse::<ExperienceLevel>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_matchable_levels_adjacency() {
        use ExperienceLevel::*;
        assert_eq!(Entry.matchable_levels(), &[Entry, Mid]);
        assert_eq!(Mid.matchable_levels(), &[Entry, Mid, Senior]);
        assert_eq!(Senior.matchable_levels(), &[Mid, Senior]);
    }

    #[test]
    fn test_row_with_bad_level_fails_conversion() {
        let row = JobRoleRow {
            id: 7,
            title: "Analyst".to_string(),
            description: "d".to_string(),
            required_skills: vec!["SQL".to_string()],
            career_path: "Data > Analytics".to_string(),
            experience_level: "staff".to_string(),
            salary_range: None,
            location: None,
            industry: "tech".to_string(),
            embedding_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(JobRole::try_from(row).is_err());
    }

    #[test]
    fn test_index_metadata_carries_filter_fields() {
        let job = crate::testing::job_role(5, "SRE", &["Linux"], ExperienceLevel::Senior, "tech");
        let metadata = job.index_metadata();
        assert_eq!(metadata[INDUSTRY_FIELD], "tech");
        assert_eq!(metadata[EXPERIENCE_LEVEL_FIELD], "senior");
        assert!(!metadata.contains_key("location"));
    }

    #[test]
    fn test_embedding_text_format() {
        let mut job = crate::testing::job_role(1, "Data Analyst", &["SQL", "Excel"], ExperienceLevel::Entry, "tech");
        job.description = "Analyze data".to_string();
        assert_eq!(
            job.embedding_text(),
            "Data Analyst. Analyze data. Required skills: SQL, Excel. Industry: tech"
        );
    }
}
