//! Career Advisor: orchestrates the full matching pipeline for one request.
//!
//! Flow: BuildingQuery → Embedding → Retrieving → Hydrating → Scoring →
//!       Summarizing → Done. An `Err` from any step ends the request.
//!
//! Embedding and retrieval failures are fatal and surfaced with their cause.
//! Hydration drops candidates the relational store does not know about, so
//! `total_matches` only ever counts fully scored matches. Scoring runs
//! concurrently per candidate; the similarity index's order is kept as-is.

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::career::learning::{LearningRecommendation, LearningRecommender};
use crate::career::profile::UserQueryProfile;
use crate::career::progression::build_career_progression;
use crate::career::skill_gap::analyze_skill_gaps;
use crate::embedding::EmbeddingGateway;
use crate::errors::AppError;
use crate::index::{SimilarityCandidate, SimilarityIndex};
use crate::jobs::store::JobRoleStore;
use crate::models::job_role::JobRole;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    BuildingQuery,
    Embedding,
    Retrieving,
    Hydrating,
    Scoring,
    Summarizing,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::BuildingQuery => "building_query",
            PipelineStage::Embedding => "embedding",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Hydrating => "hydrating",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Summarizing => "summarizing",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recommended role with everything needed to present it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerMatch {
    pub job_role: JobRole,
    pub similarity_score: f32,
    pub skill_gaps: Vec<String>,
    pub recommended_learning: Vec<LearningRecommendation>,
    pub career_progression: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub matches: Vec<CareerMatch>,
    pub total_matches: usize,
    pub analysis_summary: String,
}

/// Gap, learning and progression output for a single role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssessment {
    pub skill_gaps: Vec<String>,
    pub recommended_learning: Vec<LearningRecommendation>,
    pub career_progression: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Advisor
// ────────────────────────────────────────────────────────────────────────────

pub struct CareerAdvisor {
    embedder: Arc<EmbeddingGateway>,
    index: Arc<dyn SimilarityIndex>,
    jobs: Arc<dyn JobRoleStore>,
    learning: Arc<dyn LearningRecommender>,
}

impl CareerAdvisor {
    pub fn new(
        embedder: Arc<EmbeddingGateway>,
        index: Arc<dyn SimilarityIndex>,
        jobs: Arc<dyn JobRoleStore>,
        learning: Arc<dyn LearningRecommender>,
    ) -> Self {
        Self {
            embedder,
            index,
            jobs,
            learning,
        }
    }

    /// Runs the matching pipeline and returns up to `limit` ranked matches.
    pub async fn analyze(
        &self,
        profile: &UserQueryProfile,
        limit: usize,
    ) -> Result<SkillAnalysis, AppError> {
        let mut stage = PipelineStage::BuildingQuery;
        let result = self.run_pipeline(profile, limit, &mut stage).await;
        if let Err(e) = &result {
            error!("Career analysis failed during {stage}: {e}");
        }
        result
    }

    async fn run_pipeline(
        &self,
        profile: &UserQueryProfile,
        limit: usize,
        stage: &mut PipelineStage,
    ) -> Result<SkillAnalysis, AppError> {
        let query_text = profile.query_text();

        enter(stage, PipelineStage::Embedding);
        let query_vector = self.embedder.embed(&query_text).await?;

        enter(stage, PipelineStage::Retrieving);
        let filters = profile.search_filters();
        let candidates = self
            .index
            .query(&query_vector, limit, Some(&filters))
            .await
            .map_err(|e| AppError::upstream(PipelineStage::Retrieving.as_str(), e))?;
        debug!(
            "{} index returned {} candidates",
            self.index.name(),
            candidates.len()
        );

        enter(stage, PipelineStage::Hydrating);
        let hydrated = self.hydrate(&candidates).await?;

        enter(stage, PipelineStage::Scoring);
        let matches = try_join_all(
            hydrated
                .into_iter()
                .map(|(job_role, score)| self.score_match(profile, job_role, score)),
        )
        .await?;

        enter(stage, PipelineStage::Summarizing);
        let analysis_summary = summarize(&matches, profile);

        enter(stage, PipelineStage::Done);
        info!(
            "Career analysis found {} matches for {} skills",
            matches.len(),
            profile.skills.len()
        );

        Ok(SkillAnalysis {
            total_matches: matches.len(),
            matches,
            analysis_summary,
        })
    }

    /// Loads the job role behind each candidate, keeping candidate order.
    /// Candidates whose id is unknown to the store are dropped; store errors are not.
    pub async fn hydrate(
        &self,
        candidates: &[SimilarityCandidate],
    ) -> Result<Vec<(JobRole, f32)>, AppError> {
        let lookups = candidates.iter().map(|candidate| async move {
            let Ok(id) = candidate.id.parse::<i64>() else {
                warn!(
                    "Similarity index returned non-numeric job id '{}'; dropping it",
                    candidate.id
                );
                return Ok(None);
            };
            let job_role = self.jobs.get_job_role_by_id(id).await?;
            if job_role.is_none() {
                warn!("Job role {id} is in the similarity index but not the store; dropping it");
            }
            Ok::<_, AppError>(job_role.map(|job| (job, candidate.score)))
        });

        let resolved = try_join_all(lookups).await?;
        let found: Vec<(JobRole, f32)> = resolved.into_iter().flatten().collect();
        if found.len() < candidates.len() {
            info!(
                "Dropped {} of {} candidates during hydration",
                candidates.len() - found.len(),
                candidates.len()
            );
        }
        Ok(found)
    }

    /// Skill gaps, learning suggestions and progression for one role.
    pub async fn assess_role(
        &self,
        user_skills: &[String],
        job_role: &JobRole,
    ) -> Result<RoleAssessment, AppError> {
        let skill_gaps = analyze_skill_gaps(user_skills, &job_role.required_skills);
        let recommended_learning = self.learning.recommend(&skill_gaps, job_role).await?;
        let career_progression = build_career_progression(
            &job_role.title,
            &job_role.career_path,
            job_role.experience_level,
        );

        Ok(RoleAssessment {
            skill_gaps,
            recommended_learning,
            career_progression,
        })
    }

    async fn score_match(
        &self,
        profile: &UserQueryProfile,
        job_role: JobRole,
        similarity_score: f32,
    ) -> Result<CareerMatch, AppError> {
        let assessment = self.assess_role(&profile.skills, &job_role).await?;
        Ok(CareerMatch {
            job_role,
            similarity_score,
            skill_gaps: assessment.skill_gaps,
            recommended_learning: assessment.recommended_learning,
            career_progression: assessment.career_progression,
        })
    }
}

fn enter(stage: &mut PipelineStage, next: PipelineStage) {
    debug!("Career analysis: {stage} → {next}");
    *stage = next;
}

/// Short synopsis of the result set for display above the match list.
pub fn summarize(matches: &[CareerMatch], profile: &UserQueryProfile) -> String {
    let Some(top) = matches.first() else {
        return format!(
            "Based on your skills ({}), we couldn't find matching career paths. \
             Consider expanding your skill set or exploring related fields.",
            profile.skills.join(", ")
        );
    };

    let average = matches.iter().map(|m| m.similarity_score).sum::<f32>() / matches.len() as f32;
    let lead_skills: Vec<&str> = profile.skills.iter().take(3).map(String::as_str).collect();

    let mut summary = format!(
        "Based on your {}-level skills in {}, ",
        profile.experience_level,
        lead_skills.join(", ")
    );
    summary.push_str(&format!(
        "we found {} matching career paths. ",
        matches.len()
    ));
    summary.push_str(&format!(
        "Your top match is {} with {:.2} similarity. ",
        top.job_role.title, top.similarity_score
    ));
    summary.push_str(&format!("Average match score: {average:.2}. "));

    if !top.skill_gaps.is_empty() {
        let focus: Vec<&str> = top.skill_gaps.iter().take(3).map(String::as_str).collect();
        summary.push_str(&format!(
            "Focus on developing: {} to improve your chances.",
            focus.join(", ")
        ));
    }

    summary
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
