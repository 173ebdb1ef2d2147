//! Test doubles and fixtures shared by unit tests.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::career::advisor::CareerAdvisor;
use crate::career::learning::TemplatedLearningRecommender;
use crate::config::Config;
use crate::embedding::{EmbeddingError, EmbeddingGateway, EmbeddingProvider};
use crate::errors::AppError;
use crate::index::{IndexError, Metadata, MetadataFilter, SimilarityCandidate, SimilarityIndex};
use crate::jobs::store::{JobFilter, JobRoleStore};
use crate::models::job_role::{ExperienceLevel, JobRole, NewJobRole};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Embedding
// ────────────────────────────────────────────────────────────────────────────

/// Embedding provider that returns a fixed vector, or always fails.
pub struct ScriptedEmbedder {
    name: &'static str,
    response: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn returning(name: &'static str, vector: Vec<f32>) -> Self {
        Self {
            name,
            response: Some(vector),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or_else(|| EmbeddingError::Api {
            provider: self.name,
            status: 503,
            message: "scripted failure".to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity index
// ────────────────────────────────────────────────────────────────────────────

/// Index whose every call fails, for upstream-error paths.
pub struct FailingIndex;

#[async_trait]
impl SimilarityIndex for FailingIndex {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn upsert(&self, _id: &str, _vector: Vec<f32>, _metadata: Metadata) -> Result<(), IndexError> {
        Err(unavailable())
    }

    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
        _filters: Option<&MetadataFilter>,
    ) -> Result<Vec<SimilarityCandidate>, IndexError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &str) -> Result<(), IndexError> {
        Err(unavailable())
    }
}

fn unavailable() -> IndexError {
    IndexError::Api {
        status: 503,
        message: "index unavailable".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job store
// ────────────────────────────────────────────────────────────────────────────

pub struct InMemoryJobStore {
    jobs: Mutex<Vec<JobRole>>,
    next_id: AtomicI64,
    reject_embedding_ids: bool,
    reject_deletes: bool,
}

impl InMemoryJobStore {
    pub fn with_jobs(jobs: Vec<JobRole>) -> Self {
        let next_id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
        Self {
            jobs: Mutex::new(jobs),
            next_id: AtomicI64::new(next_id),
            reject_embedding_ids: false,
            reject_deletes: false,
        }
    }

    /// `set_embedding_id` fails.
    pub fn rejecting_embedding_ids(mut self) -> Self {
        self.reject_embedding_ids = true;
        self
    }

    /// Inserts succeed; `set_embedding_id` and deletes fail.
    pub fn rejecting_writes_after_insert(mut self) -> Self {
        self.reject_embedding_ids = true;
        self.reject_deletes = true;
        self
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[async_trait]
impl JobRoleStore for InMemoryJobStore {
    async fn get_job_role_by_id(&self, id: i64) -> Result<Option<JobRole>, AppError> {
        Ok(self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned())
    }

    async fn list_job_roles(&self, filter: &JobFilter) -> Result<Vec<JobRole>, AppError> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs
            .iter()
            .filter(|j| filter.industry.as_ref().map_or(true, |i| &j.industry == i))
            .filter(|j| filter.experience_level.map_or(true, |l| j.experience_level == l))
            .skip(filter.skip as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_job_role(&self, job: &NewJobRole) -> Result<JobRole, AppError> {
        let role = JobRole {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: job.title.clone(),
            description: job.description.clone(),
            required_skills: job.required_skills.clone(),
            career_path: job.career_path.clone(),
            experience_level: job.experience_level,
            salary_range: job.salary_range.clone(),
            location: job.location.clone(),
            industry: job.industry.clone(),
            embedding_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.jobs.lock().unwrap().push(role.clone());
        Ok(role)
    }

    async fn set_embedding_id(&self, id: i64, embedding_id: &str) -> Result<(), AppError> {
        if self.reject_embedding_ids {
            return Err(AppError::Internal(anyhow::anyhow!("update rejected")));
        }
        if let Some(job) = self.jobs.lock().unwrap().iter_mut().find(|j| j.id == id) {
            job.embedding_id = Some(embedding_id.to_string());
            job.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_job_role(&self, id: i64) -> Result<(), AppError> {
        if self.reject_deletes {
            return Err(AppError::Internal(anyhow::anyhow!("delete rejected")));
        }
        self.jobs.lock().unwrap().retain(|j| j.id != id);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn job_role(
    id: i64,
    title: &str,
    skills: &[&str],
    level: ExperienceLevel,
    industry: &str,
) -> JobRole {
    JobRole {
        id,
        title: title.to_string(),
        description: format!("{title} role"),
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        career_path: "Technology > Engineering".to_string(),
        experience_level: level,
        salary_range: None,
        location: None,
        industry: industry.to_string(),
        embedding_id: Some(id.to_string()),
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        embedding_dimension: 3,
        embedding_timeout: Duration::from_secs(1),
        index_timeout: Duration::from_secs(1),
        default_match_limit: 10,
        max_match_limit: 50,
        vertex: None,
        openai: None,
        pinecone: None,
    }
}

/// Application state over in-memory collaborators and a fixed query embedding.
pub fn test_state(
    jobs: Arc<InMemoryJobStore>,
    index: Arc<dyn SimilarityIndex>,
    query_vector: Vec<f32>,
) -> AppState {
    let config = test_config();
    let primary: Arc<dyn EmbeddingProvider> =
        Arc::new(ScriptedEmbedder::returning("vertex", query_vector));
    let embedder = Arc::new(EmbeddingGateway::new(
        Some(primary),
        None,
        config.embedding_dimension,
    ));
    let advisor = Arc::new(CareerAdvisor::new(
        embedder.clone(),
        index.clone(),
        jobs.clone(),
        Arc::new(TemplatedLearningRecommender),
    ));

    AppState {
        config,
        jobs,
        embedder,
        index,
        advisor,
    }
}
