//! Embedding Gateway: turns text into fixed-length vectors.
//!
//! Providers are tried in order: the primary (Vertex AI) first, then the
//! secondary (OpenAI-compatible) if the primary fails. At most one fallback
//! hop is taken; the secondary's failure is returned to the caller as-is.
//!
//! Every call site that needs an embedding goes through `EmbeddingGateway`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub mod openai;
pub mod vertex;

pub use openai::OpenAiEmbedder;
pub use vertex::VertexEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("No embedding provider is configured")]
    NotConfigured,

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned no embedding")]
    EmptyResponse { provider: &'static str },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A single embedding backend. Implement this to add a provider without
/// touching the gateway or its callers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short label used in logs and error messages.
    fn name(&self) -> &'static str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Ordered provider chain with a single fallback hop.
pub struct EmbeddingGateway {
    providers: Vec<Arc<dyn EmbeddingProvider>>,
    dimension: usize,
}

impl EmbeddingGateway {
    pub fn new(
        primary: Option<Arc<dyn EmbeddingProvider>>,
        secondary: Option<Arc<dyn EmbeddingProvider>>,
        dimension: usize,
    ) -> Self {
        Self {
            providers: primary.into_iter().chain(secondary).collect(),
            dimension,
        }
    }

    /// Builds the gateway from configuration. A provider whose client cannot be
    /// constructed is logged and left out, as if it had not been configured.
    pub fn from_config(config: &Config) -> Self {
        let primary = config.vertex.as_ref().and_then(|vertex| {
            match VertexEmbedder::new(vertex, config.embedding_timeout) {
                Ok(embedder) => {
                    info!(
                        "Vertex AI embeddings initialized (project: {}, model: {})",
                        vertex.project, vertex.model
                    );
                    Some(Arc::new(embedder) as Arc<dyn EmbeddingProvider>)
                }
                Err(e) => {
                    warn!("Failed to initialize Vertex AI embeddings: {e:#}");
                    None
                }
            }
        });

        let secondary = config.openai.as_ref().and_then(|openai| {
            match OpenAiEmbedder::new(
                openai,
                Some(config.embedding_dimension),
                config.embedding_timeout,
            ) {
                Ok(embedder) => {
                    info!("OpenAI embeddings initialized (model: {})", openai.model);
                    Some(Arc::new(embedder) as Arc<dyn EmbeddingProvider>)
                }
                Err(e) => {
                    warn!("Failed to initialize OpenAI embeddings: {e:#}");
                    None
                }
            }
        });

        let gateway = Self::new(primary, secondary, config.embedding_dimension);
        if !gateway.is_configured() {
            warn!("No embedding provider configured; matching requests will fail");
        }
        gateway
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Embeds `text`, falling back to the secondary provider once if the primary fails.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.providers.is_empty() {
            return Err(EmbeddingError::NotConfigured);
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut last_error = None;
        for (attempt, provider) in self.providers.iter().enumerate() {
            if attempt > 0 {
                info!("Falling back to {} embeddings", provider.name());
            }
            match self.embed_with(provider.as_ref(), text).await {
                Ok(vector) => return Ok(vector),
                Err(e) => {
                    warn!("{} embedding failed: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(EmbeddingError::NotConfigured))
    }

    /// Embeds each text in turn. The first failure aborts the rest of the batch.
    pub async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    async fn embed_with(
        &self,
        provider: &dyn EmbeddingProvider,
        text: &str,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let vector = provider.embed(text).await?;
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
