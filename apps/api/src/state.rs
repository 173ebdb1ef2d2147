use std::sync::Arc;

use crate::career::advisor::CareerAdvisor;
use crate::config::Config;
use crate::embedding::EmbeddingGateway;
use crate::index::SimilarityIndex;
use crate::jobs::store::JobRoleStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Relational store of job roles. Default: `PgJobRoleStore`.
    pub jobs: Arc<dyn JobRoleStore>,
    pub embedder: Arc<EmbeddingGateway>,
    /// Pinecone when configured, otherwise the in-process index.
    pub index: Arc<dyn SimilarityIndex>,
    pub advisor: Arc<CareerAdvisor>,
}
