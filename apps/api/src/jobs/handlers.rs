//! Axum route handlers for the job catalog.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::career::profile::{EXPERIENCE_LEVEL_FIELD, INDUSTRY_FIELD};
use crate::errors::AppError;
use crate::index::MetadataFilter;
use crate::jobs::store::JobFilter;
use crate::models::job_role::{ExperienceLevel, JobRole, NewJobRole};
use crate::state::AppState;

const MAX_PAGE_SIZE: i64 = 1000;
const REINDEX_PAGE_SIZE: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub career_path: String,
    pub experience_level: String,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub industry: String,
}

#[derive(Debug, Deserialize)]
pub struct SimilarJobsQuery {
    pub query: String,
    pub limit: Option<usize>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub indexed: usize,
}

#[derive(Debug, Serialize)]
pub struct SimilarJob {
    pub job_role: JobRole,
    pub similarity_score: f32,
}

impl ListJobsQuery {
    fn into_filter(self) -> Result<JobFilter, AppError> {
        let defaults = JobFilter::default();
        let skip = self.skip.unwrap_or(defaults.skip);
        let limit = self.limit.unwrap_or(defaults.limit);
        if skip < 0 {
            return Err(AppError::InvalidInput("skip cannot be negative".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok(JobFilter {
            skip,
            limit,
            industry: self.industry,
            experience_level: self.experience_level.as_deref().map(str::parse::<ExperienceLevel>).transpose()?,
        })
    }
}

impl CreateJobRequest {
    fn into_new_job(self) -> Result<NewJobRole, AppError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("career_path", &self.career_path),
            ("industry", &self.industry),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
            }
        }
        let required_skills: Vec<String> = self
            .required_skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if required_skills.is_empty() {
            return Err(AppError::InvalidInput(
                "required_skills cannot be empty".to_string(),
            ));
        }

        Ok(NewJobRole {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            required_skills,
            career_path: self.career_path.trim().to_string(),
            experience_level: self.experience_level.parse::<ExperienceLevel>()?,
            salary_range: self.salary_range,
            location: self.location,
            industry: self.industry.trim().to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobRole>>, AppError> {
    let filter = query.into_filter()?;
    let jobs = state.jobs.list_job_roles(&filter).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobRole>, AppError> {
    let job = state
        .jobs
        .get_job_role_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job role {id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
///
/// Inserts the role, embeds it and stores the vector under the role id.
/// If embedding or indexing fails the inserted row is removed again, so a
/// role is never visible in the catalog without a vector behind it.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRole>), AppError> {
    let new_job = request.into_new_job()?;
    let mut job = state.jobs.insert_job_role(&new_job).await?;

    let embedding_id = job.id.to_string();
    if let Err(e) = index_job(&state, &job, &embedding_id).await {
        error!("Indexing job role {} failed, removing it: {e}", job.id);
        discard_row(&state, job.id).await;
        return Err(e);
    }

    if let Err(e) = state.jobs.set_embedding_id(job.id, &embedding_id).await {
        error!("Recording embedding id for job role {} failed, removing it: {e}", job.id);
        if let Err(delete_err) = state.index.delete(&embedding_id).await {
            warn!("Failed to remove vector {embedding_id} from {}: {delete_err}", state.index.name());
        }
        discard_row(&state, job.id).await;
        return Err(e);
    }
    job.embedding_id = Some(embedding_id);

    info!("Created job role {} ({})", job.id, job.title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// Best-effort removal of a half-created row. The caller's error is what gets returned.
async fn discard_row(state: &AppState, id: i64) {
    if let Err(e) = state.jobs.delete_job_role(id).await {
        warn!("Failed to remove job role {id} after a failed create: {e}");
    }
}

async fn index_job(state: &AppState, job: &JobRole, embedding_id: &str) -> Result<(), AppError> {
    let vector = state.embedder.embed(&job.embedding_text()).await?;
    state
        .index
        .upsert(embedding_id, vector, job.index_metadata())
        .await
        .map_err(|e| AppError::upstream("indexing", e))
}

/// POST /api/v1/jobs/reindex
///
/// Re-embeds every stored role page by page and overwrites its vector.
/// Stops at the first failure; pages already written stay written.
pub async fn handle_reindex_jobs(
    State(state): State<AppState>,
) -> Result<Json<ReindexResponse>, AppError> {
    let mut filter = JobFilter {
        limit: REINDEX_PAGE_SIZE,
        ..JobFilter::default()
    };
    let mut indexed = 0;

    loop {
        let page = state.jobs.list_job_roles(&filter).await?;
        if page.is_empty() {
            break;
        }

        let texts: Vec<String> = page.iter().map(JobRole::embedding_text).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = state.embedder.embed_many(&text_refs).await?;

        for (job, vector) in page.iter().zip(vectors) {
            let embedding_id = job.id.to_string();
            state
                .index
                .upsert(&embedding_id, vector, job.index_metadata())
                .await
                .map_err(|e| AppError::upstream("indexing", e))?;
            if job.embedding_id.as_deref() != Some(embedding_id.as_str()) {
                state.jobs.set_embedding_id(job.id, &embedding_id).await?;
            }
        }

        indexed += page.len();
        if (page.len() as i64) < filter.limit {
            break;
        }
        filter.skip += filter.limit;
    }

    info!("Re-indexed {indexed} job roles into {}", state.index.name());
    Ok(Json(ReindexResponse { indexed }))
}

/// GET /api/v1/jobs/search/similar?query=...
///
/// Free-text search over the catalog. Filters are exact: no tier adjacency.
pub async fn handle_search_similar(
    State(state): State<AppState>,
    Query(query): Query<SimilarJobsQuery>,
) -> Result<Json<Vec<SimilarJob>>, AppError> {
    let limit = query.limit.unwrap_or(state.config.default_match_limit);
    if limit == 0 || limit > state.config.max_match_limit {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            state.config.max_match_limit
        )));
    }

    let mut filters = MetadataFilter::new();
    if let Some(level) = query.experience_level.as_deref() {
        let level: ExperienceLevel = level.parse()?;
        filters.insert(EXPERIENCE_LEVEL_FIELD.to_string(), vec![level.as_str().to_string()]);
    }
    if let Some(industry) = query.industry {
        filters.insert(INDUSTRY_FIELD.to_string(), vec![industry]);
    }

    let vector = state.embedder.embed(&query.query).await?;
    let candidates = state
        .index
        .query(&vector, limit, (!filters.is_empty()).then_some(&filters))
        .await?;

    let results = state
        .advisor
        .hydrate(&candidates)
        .await?
        .into_iter()
        .map(|(job_role, similarity_score)| SimilarJob {
            job_role,
            similarity_score,
        })
        .collect();
    Ok(Json(results))
}
