mod career;
mod config;
mod db;
mod embedding;
mod errors;
mod index;
mod jobs;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::career::advisor::CareerAdvisor;
use crate::career::learning::TemplatedLearningRecommender;
use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::EmbeddingGateway;
use crate::jobs::store::PgJobRoleStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Advisor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    let jobs = Arc::new(PgJobRoleStore::new(db));

    // Initialize embedding providers (Vertex primary, OpenAI fallback)
    let embedder = Arc::new(EmbeddingGateway::from_config(&config));
    info!("Embedding dimension: {}", embedder.dimension());

    // Initialize similarity index (Pinecone, or in-process when unset)
    let index = index::from_config(&config)?;
    info!("Similarity index: {}", index.name());

    let advisor = Arc::new(CareerAdvisor::new(
        embedder.clone(),
        index.clone(),
        jobs.clone(),
        Arc::new(TemplatedLearningRecommender),
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        jobs,
        embedder,
        index,
        advisor,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
