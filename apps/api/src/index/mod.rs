//! Similarity Index: stores (id, vector, metadata) and answers filtered
//! nearest-neighbour queries ordered by descending cosine similarity.
//!
//! `AppState` holds an `Arc<dyn SimilarityIndex>`: Pinecone when configured,
//! otherwise the in-process `InMemoryIndex`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub mod memory;
pub mod pinecone;

pub use memory::InMemoryIndex;
pub use pinecone::PineconeIndex;

/// Opaque metadata stored alongside each vector and echoed back on query.
pub type Metadata = serde_json::Map<String, Value>;

/// Membership filter: metadata field → allowed values. An entry passes when,
/// for every field, its metadata value is one of the allowed values.
pub type MetadataFilter = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityCandidate {
    pub id: String,
    /// Higher is more similar. Cosine-derived; range depends on the backend.
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inserts or replaces the vector and metadata stored under `id`.
    async fn upsert(&self, id: &str, vector: Vec<f32>, metadata: Metadata)
        -> Result<(), IndexError>;

    /// Returns at most `top_k` candidates passing `filters`, most similar first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: Option<&MetadataFilter>,
    ) -> Result<Vec<SimilarityCandidate>, IndexError>;

    /// Removes `id`. Deleting an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<(), IndexError>;
}

/// Picks the index backend from configuration.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn SimilarityIndex>> {
    match &config.pinecone {
        Some(pinecone) => {
            let index = PineconeIndex::new(pinecone, config.embedding_dimension, config.index_timeout)?;
            info!("Pinecone index configured: {}", pinecone.index_name);
            Ok(Arc::new(index))
        }
        None => {
            warn!("PINECONE_API_KEY not set; using the in-process similarity index");
            Ok(Arc::new(InMemoryIndex::new(config.embedding_dimension)))
        }
    }
}

/// True when `metadata` satisfies every field of `filter`.
/// String values compare directly; other JSON scalars compare by their rendering.
pub fn metadata_matches(metadata: &Metadata, filter: &MetadataFilter) -> bool {
    filter.iter().all(|(field, allowed)| match metadata.get(field) {
        Some(Value::String(s)) => allowed.iter().any(|a| a == s),
        Some(Value::Null) | None => false,
        Some(other) => {
            let rendered = other.to_string();
            allowed.iter().any(|a| *a == rendered)
        }
    })
}

/// Cosine similarity in [-1, 1]. Zero-length vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
