use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::job_role::{ExperienceLevel, JobRole, JobRoleRow, NewJobRole};

/// Listing filters for the job catalog.
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub skip: i64,
    pub limit: i64,
    pub industry: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            industry: None,
            experience_level: None,
        }
    }
}

/// Relational store of job roles. Carried in `AppState` as `Arc<dyn JobRoleStore>`.
#[async_trait]
pub trait JobRoleStore: Send + Sync {
    async fn get_job_role_by_id(&self, id: i64) -> Result<Option<JobRole>, AppError>;

    async fn list_job_roles(&self, filter: &JobFilter) -> Result<Vec<JobRole>, AppError>;

    async fn insert_job_role(&self, job: &NewJobRole) -> Result<JobRole, AppError>;

    async fn set_embedding_id(&self, id: i64, embedding_id: &str) -> Result<(), AppError>;

    async fn delete_job_role(&self, id: i64) -> Result<(), AppError>;
}

pub struct PgJobRoleStore {
    pool: PgPool,
}

impl PgJobRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRoleStore for PgJobRoleStore {
    async fn get_job_role_by_id(&self, id: i64) -> Result<Option<JobRole>, AppError> {
        let row = sqlx::query_as::<_, JobRoleRow>("SELECT * FROM job_roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(JobRole::try_from).transpose()
    }

    async fn list_job_roles(&self, filter: &JobFilter) -> Result<Vec<JobRole>, AppError> {
        let rows = sqlx::query_as::<_, JobRoleRow>(
            r#"
            SELECT * FROM job_roles
            WHERE ($1::text IS NULL OR industry = $1)
              AND ($2::text IS NULL OR experience_level = $2)
            ORDER BY id
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(filter.industry.as_deref())
        .bind(filter.experience_level.map(|l| l.as_str()))
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobRole::try_from).collect()
    }

    async fn insert_job_role(&self, job: &NewJobRole) -> Result<JobRole, AppError> {
        let row = sqlx::query_as::<_, JobRoleRow>(
            r#"
            INSERT INTO job_roles
                (title, description, required_skills, career_path, experience_level,
                 salary_range, location, industry)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.required_skills)
        .bind(&job.career_path)
        .bind(job.experience_level.as_str())
        .bind(job.salary_range.as_deref())
        .bind(job.location.as_deref())
        .bind(&job.industry)
        .fetch_one(&self.pool)
        .await?;

        JobRole::try_from(row)
    }

    async fn set_embedding_id(&self, id: i64, embedding_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE job_roles SET embedding_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(embedding_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_job_role(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM job_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
