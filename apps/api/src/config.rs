use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Vector length every embedding provider and the similarity index must agree on.
    pub embedding_dimension: usize,
    pub embedding_timeout: Duration,
    pub index_timeout: Duration,
    pub default_match_limit: usize,
    pub max_match_limit: usize,
    /// Primary embedding provider. `None` when `GOOGLE_CLOUD_PROJECT` is unset.
    pub vertex: Option<VertexConfig>,
    /// Secondary embedding provider. `None` when `OPENAI_API_KEY` is unset.
    pub openai: Option<OpenAiConfig>,
    /// Hosted similarity index. `None` falls back to the in-process index.
    pub pinecone: Option<PineconeConfig>,
}

#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project: String,
    pub location: String,
    pub access_token: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index_name: String,
    pub control_url: String,
    pub cloud: String,
    pub region: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let vertex = optional_env("GOOGLE_CLOUD_PROJECT").map(|project| VertexConfig {
            project,
            location: env_or("GOOGLE_CLOUD_LOCATION", "us-central1"),
            access_token: env_or("GOOGLE_ACCESS_TOKEN", ""),
            model: env_or("VERTEX_EMBEDDING_MODEL", "textembedding-gecko@001"),
        });

        let openai = optional_env("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
        });

        let pinecone = optional_env("PINECONE_API_KEY").map(|api_key| PineconeConfig {
            api_key,
            index_name: env_or("PINECONE_INDEX_NAME", "career-advisor"),
            control_url: env_or("PINECONE_CONTROL_URL", "https://api.pinecone.io"),
            cloud: env_or("PINECONE_CLOUD", "aws"),
            region: env_or("PINECONE_REGION", "us-east-1"),
        });

        let default_match_limit = parse_env("DEFAULT_MATCH_LIMIT", 10)?;
        let max_match_limit = parse_env("MAX_MATCH_LIMIT", 50)?;
        anyhow::ensure!(
            default_match_limit >= 1 && default_match_limit <= max_match_limit,
            "DEFAULT_MATCH_LIMIT must be between 1 and MAX_MATCH_LIMIT ({max_match_limit})"
        );

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", 768)?,
            embedding_timeout: Duration::from_secs(parse_env("EMBEDDING_TIMEOUT_SECS", 30)?),
            index_timeout: Duration::from_secs(parse_env("INDEX_TIMEOUT_SECS", 30)?),
            default_match_limit,
            max_match_limit,
            vertex,
            openai,
            pinecone,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank variables the same: the feature is not configured.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
