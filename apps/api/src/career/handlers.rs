//! Axum route handlers for the Career API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::career::advisor::SkillAnalysis;
use crate::career::learning::LearningRecommendation;
use crate::career::profile::UserQueryProfile;
use crate::career::skill_gap::skill_coverage;
use crate::errors::AppError;
use crate::models::job_role::{ExperienceLevel, JobRole};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeSkillsRequest {
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub preferred_industries: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    pub user_skills: Vec<String>,
    pub target_job_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SkillGapResponse {
    pub job_role: JobRole,
    pub skill_gaps: Vec<String>,
    pub recommended_learning: Vec<LearningRecommendation>,
    /// Share of required skills already covered, 0.0 to 1.0.
    pub coverage: f32,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathQuery {
    /// Comma-separated skill list.
    pub user_skills: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LearningPathResponse {
    pub job_role: JobRole,
    pub skill_gaps: Vec<String>,
    pub recommended_learning: Vec<LearningRecommendation>,
    pub career_progression: Vec<String>,
}

impl AnalyzeSkillsRequest {
    fn into_profile(self) -> Result<UserQueryProfile, AppError> {
        validate_skills("skills", &self.skills)?;
        let experience_level = match self.experience_level.as_deref() {
            Some(level) => level.parse()?,
            None => ExperienceLevel::default(),
        };

        Ok(UserQueryProfile {
            skills: self.skills,
            interests: self.interests.unwrap_or_default(),
            experience_level,
            preferred_industries: self.preferred_industries.unwrap_or_default(),
        })
    }
}

/// An empty list is fine: every required skill is then a gap.
fn validate_skills(field: &str, skills: &[String]) -> Result<(), AppError> {
    // A blank skill is a substring of every required skill and would hide all gaps.
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err(AppError::InvalidInput(format!(
            "{field} cannot contain blank entries"
        )));
    }
    Ok(())
}

fn resolve_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize, AppError> {
    let limit = requested.unwrap_or(default);
    if limit == 0 || limit > max {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {max}"
        )));
    }
    Ok(limit)
}

async fn load_job(state: &AppState, id: i64) -> Result<JobRole, AppError> {
    state
        .jobs
        .get_job_role_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job role {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/career/analyze-skills
///
/// Matches the user's profile against the job catalog and returns ranked,
/// explained career recommendations.
pub async fn handle_analyze_skills(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeSkillsRequest>,
) -> Result<Json<SkillAnalysis>, AppError> {
    let limit = resolve_limit(
        request.limit,
        state.config.default_match_limit,
        state.config.max_match_limit,
    )?;
    let profile = request.into_profile()?;

    let analysis = state.advisor.analyze(&profile, limit).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/career/skill-gap-analysis
///
/// Gaps and learning suggestions for one target role.
pub async fn handle_skill_gap_analysis(
    State(state): State<AppState>,
    Json(request): Json<SkillGapRequest>,
) -> Result<Json<SkillGapResponse>, AppError> {
    validate_skills("user_skills", &request.user_skills)?;
    let job_role = load_job(&state, request.target_job_id).await?;
    let assessment = state
        .advisor
        .assess_role(&request.user_skills, &job_role)
        .await?;

    let coverage = skill_coverage(job_role.required_skills.len(), assessment.skill_gaps.len());
    Ok(Json(SkillGapResponse {
        job_role,
        skill_gaps: assessment.skill_gaps,
        recommended_learning: assessment.recommended_learning,
        coverage,
    }))
}

/// GET /api/v1/career/learning-path/:job_role_id?user_skills=a,b
///
/// Learning plan and progression ladder for one role.
pub async fn handle_learning_path(
    State(state): State<AppState>,
    Path(job_role_id): Path<i64>,
    Query(query): Query<LearningPathQuery>,
) -> Result<Json<LearningPathResponse>, AppError> {
    let job_role = load_job(&state, job_role_id).await?;
    let user_skills: Vec<String> = query
        .user_skills
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let assessment = state.advisor.assess_role(&user_skills, &job_role).await?;
    Ok(Json(LearningPathResponse {
        job_role,
        skill_gaps: assessment.skill_gaps,
        recommended_learning: assessment.recommended_learning,
        career_progression: assessment.career_progression,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::index::InMemoryIndex;
    use crate::testing::{job_role, test_state, InMemoryJobStore};

    fn state_with(jobs: Vec<JobRole>) -> AppState {
        test_state(
            Arc::new(InMemoryJobStore::with_jobs(jobs)),
            Arc::new(InMemoryIndex::new(3)),
            vec![1.0, 0.0, 0.0],
        )
    }

    fn analyze_request(level: Option<&str>, limit: Option<usize>) -> AnalyzeSkillsRequest {
        AnalyzeSkillsRequest {
            skills: vec!["Rust".to_string()],
            interests: None,
            experience_level: level.map(str::to_string),
            preferred_industries: None,
            limit,
        }
    }

    #[test]
    fn test_profile_defaults_to_entry() {
        let profile = analyze_request(None, None).into_profile().unwrap();
        assert_eq!(profile.experience_level, ExperienceLevel::Entry);
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn test_bad_tier_is_invalid_input() {
        let err = analyze_request(Some("guru"), None).into_profile().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_skill_rejected() {
        let mut request = analyze_request(None, None);
        request.skills.push("  ".to_string());
        assert!(matches!(request.into_profile(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_skill_list_accepted() {
        let mut request = analyze_request(None, None);
        request.skills.clear();
        assert!(request.into_profile().unwrap().skills.is_empty());
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(resolve_limit(None, 10, 50).unwrap(), 10);
        assert_eq!(resolve_limit(Some(50), 10, 50).unwrap(), 50);
        assert!(resolve_limit(Some(0), 10, 50).is_err());
        assert!(resolve_limit(Some(51), 10, 50).is_err());
    }

    #[tokio::test]
    async fn test_analyze_with_empty_catalog_summarizes_input_skills() {
        let state = state_with(vec![]);
        let Json(analysis) = handle_analyze_skills(
            State(state),
            Json(analyze_request(Some("mid"), Some(5))),
        )
        .await
        .unwrap();

        assert_eq!(analysis.total_matches, 0);
        assert!(analysis.analysis_summary.contains("Rust"));
    }

    #[tokio::test]
    async fn test_skill_gap_analysis_reports_coverage() {
        let job = job_role(4, "Platform Engineer", &["Rust", "Kubernetes", "Terraform", "AWS"], ExperienceLevel::Mid, "tech");
        let state = state_with(vec![job]);

        let Json(response) = handle_skill_gap_analysis(
            State(state),
            Json(SkillGapRequest {
                user_skills: vec!["rust".to_string(), "aws".to_string()],
                target_job_id: 4,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.skill_gaps, vec!["Kubernetes", "Terraform"]);
        assert_eq!(response.recommended_learning.len(), 2);
        assert_eq!(response.coverage, 0.5);
    }

    #[tokio::test]
    async fn test_skill_gap_analysis_rejects_blank_skill() {
        let job = job_role(4, "Platform Engineer", &["Rust", "Kubernetes"], ExperienceLevel::Mid, "tech");

        let result = handle_skill_gap_analysis(
            State(state_with(vec![job])),
            Json(SkillGapRequest {
                user_skills: vec!["  ".to_string()],
                target_job_id: 4,
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_skill_gap_analysis_without_skills_has_zero_coverage() {
        let job = job_role(4, "Platform Engineer", &["Rust", "Kubernetes"], ExperienceLevel::Mid, "tech");

        let Json(response) = handle_skill_gap_analysis(
            State(state_with(vec![job])),
            Json(SkillGapRequest {
                user_skills: vec![],
                target_job_id: 4,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.skill_gaps, vec!["Rust", "Kubernetes"]);
        assert_eq!(response.coverage, 0.0);
    }

    #[tokio::test]
    async fn test_analyze_with_no_skills_returns_no_match_summary() {
        let mut request = analyze_request(None, None);
        request.skills.clear();

        let Json(analysis) = handle_analyze_skills(State(state_with(vec![])), Json(request))
            .await
            .unwrap();

        assert_eq!(analysis.total_matches, 0);
        assert!(analysis.analysis_summary.contains("couldn't find matching career paths"));
    }

    #[tokio::test]
    async fn test_skill_gap_analysis_unknown_job_is_not_found() {
        let result = handle_skill_gap_analysis(
            State(state_with(vec![])),
            Json(SkillGapRequest {
                user_skills: vec![],
                target_job_id: 1,
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_learning_path_parses_comma_separated_skills() {
        let job = job_role(2, "Data Analyst", &["SQL", "Tableau", "Python"], ExperienceLevel::Entry, "tech");
        let state = state_with(vec![job]);

        let Json(response) = handle_learning_path(
            State(state),
            Path(2),
            Query(LearningPathQuery {
                user_skills: Some("sql, python ,".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.skill_gaps, vec!["Tableau"]);
        assert_eq!(response.career_progression[0], "Junior Data Analyst");
    }

    #[tokio::test]
    async fn test_learning_path_without_skills_lists_every_requirement() {
        let job = job_role(2, "Data Analyst", &["SQL", "Tableau"], ExperienceLevel::Entry, "tech");
        let Json(response) = handle_learning_path(
            State(state_with(vec![job])),
            Path(2),
            Query(LearningPathQuery { user_skills: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.skill_gaps, vec!["SQL", "Tableau"]);
    }
}
