pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::career::handlers as career;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Career matching
        .route(
            "/api/v1/career/analyze-skills",
            post(career::handle_analyze_skills),
        )
        .route(
            "/api/v1/career/skill-gap-analysis",
            post(career::handle_skill_gap_analysis),
        )
        .route(
            "/api/v1/career/learning-path/:job_role_id",
            get(career::handle_learning_path),
        )
        // Job catalog
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/reindex", post(jobs::handle_reindex_jobs))
        .route("/api/v1/jobs/search/similar", get(jobs::handle_search_similar))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .with_state(state)
}
