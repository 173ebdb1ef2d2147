//! Learning recommendations for skill gaps.
//!
//! Default: `TemplatedLearningRecommender` (deterministic placeholder entries).
//! A real course/certification catalog plugs in behind `LearningRecommender`
//! without touching the advisor or handlers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::job_role::JobRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Course,
    Certification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub duration: Option<String>,
    pub difficulty: Difficulty,
}

/// Resources suggested for a single missing skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecommendation {
    pub skill: String,
    pub resources: Vec<LearningResource>,
}

/// Carried in `AppState` (via the advisor) as `Arc<dyn LearningRecommender>`.
#[async_trait]
pub trait LearningRecommender: Send + Sync {
    /// One recommendation per gap, in gap order.
    async fn recommend(
        &self,
        skill_gaps: &[String],
        job_role: &JobRole,
    ) -> Result<Vec<LearningRecommendation>, AppError>;
}

/// Two fixed resources per gap: an online course and a certification.
pub struct TemplatedLearningRecommender;

#[async_trait]
impl LearningRecommender for TemplatedLearningRecommender {
    async fn recommend(
        &self,
        skill_gaps: &[String],
        _job_role: &JobRole,
    ) -> Result<Vec<LearningRecommendation>, AppError> {
        Ok(templated_recommendations(skill_gaps))
    }
}

pub fn templated_recommendations(skill_gaps: &[String]) -> Vec<LearningRecommendation> {
    skill_gaps
        .iter()
        .map(|skill| LearningRecommendation {
            skill: skill.clone(),
            resources: vec![
                LearningResource {
                    title: format!("Learn {skill} - Online Course"),
                    resource_type: ResourceType::Course,
                    provider: "Various Platforms".to_string(),
                    url: None,
                    duration: Some("4-8 weeks".to_string()),
                    difficulty: Difficulty::Beginner,
                },
                LearningResource {
                    title: format!("{skill} Certification"),
                    resource_type: ResourceType::Certification,
                    provider: "Industry Standard".to_string(),
                    url: None,
                    duration: Some("2-3 months".to_string()),
                    difficulty: Difficulty::Intermediate,
                },
            ],
        })
        .collect()
}
