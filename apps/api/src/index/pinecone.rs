//! Pinecone-backed similarity index.
//!
//! The data-plane host is resolved on first use through the control plane.
//! If the index does not exist yet it is created with the configured
//! dimension and the cosine metric.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{IndexError, Metadata, MetadataFilter, SimilarityCandidate, SimilarityIndex};
use crate::config::PineconeConfig;

const API_VERSION: &str = "2024-07";

pub struct PineconeIndex {
    client: Client,
    control_url: String,
    index_name: String,
    dimension: usize,
    cloud: String,
    region: String,
    host: OnceCell<String>,
}

impl PineconeIndex {
    pub fn new(config: &PineconeConfig, dimension: usize, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!config.api_key.trim().is_empty(), "missing Pinecone API key");
        anyhow::ensure!(!config.index_name.trim().is_empty(), "missing Pinecone index name");

        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(config.api_key.trim()).context("invalid Pinecone API key")?,
        );
        headers.insert(
            "X-Pinecone-API-Version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Pinecone HTTP client")?;

        Ok(Self {
            client,
            control_url: config.control_url.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            dimension,
            cloud: config.cloud.clone(),
            region: config.region.clone(),
            host: OnceCell::new(),
        })
    }

    /// Data-plane base URL, resolved (and the index created) on first call.
    async fn host(&self) -> Result<&str, IndexError> {
        self.host
            .get_or_try_init(|| self.resolve_host())
            .await
            .map(String::as_str)
    }

    async fn resolve_host(&self) -> Result<String, IndexError> {
        let url = format!("{}/indexes/{}", self.control_url, self.index_name);
        let response = self.client.get(&url).send().await?;

        let description: IndexDescription = if response.status() == StatusCode::NOT_FOUND {
            warn!("Index {} doesn't exist, creating it...", self.index_name);
            self.create_index().await?
        } else {
            check_status(response).await?.json().await?
        };

        info!("Connected to Pinecone index: {}", self.index_name);
        Ok(normalize_host(&description.host))
    }

    async fn create_index(&self) -> Result<IndexDescription, IndexError> {
        let body = json!({
            "name": self.index_name,
            "dimension": self.dimension,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": self.cloud, "region": self.region } }
        });
        let response = self
            .client
            .post(format!("{}/indexes", self.control_url))
            .json(&body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Response, IndexError> {
        let url = format!("{}{}", self.host().await?, path);
        let response = self.client.post(&url).json(body).send().await?;
        check_status(response).await
    }
}

#[async_trait]
impl SimilarityIndex for PineconeIndex {
    fn name(&self) -> &'static str {
        "pinecone"
    }

    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<(), IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let request = UpsertRequest {
            vectors: vec![VectorRecord {
                id,
                values: &vector,
                metadata: &metadata,
            }],
        };
        self.post("/vectors/upsert", &request).await?;
        info!("Upserted embedding for job {id}");
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: Option<&MetadataFilter>,
    ) -> Result<Vec<SimilarityCandidate>, IndexError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter: filters.and_then(pinecone_filter),
        };
        let response: QueryResponse = self.post("/query", &request).await?.json().await?;
        debug!("Pinecone query returned {} matches", response.matches.len());

        Ok(response
            .matches
            .into_iter()
            .map(|m| SimilarityCandidate {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), IndexError> {
        self.post("/vectors/delete", &json!({ "ids": [id] })).await?;
        info!("Deleted embedding for job {id}");
        Ok(())
    }
}

/// Translates a membership filter into Pinecone's `$in` syntax.
/// An empty filter means "unfiltered" and is omitted from the request.
fn pinecone_filter(filter: &MetadataFilter) -> Option<Value> {
    if filter.is_empty() {
        return None;
    }
    let clauses: serde_json::Map<String, Value> = filter
        .iter()
        .map(|(field, allowed)| (field.clone(), json!({ "$in": allowed })))
        .collect();
    Some(Value::Object(clauses))
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn check_status(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(IndexError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<VectorRecord<'a>>,
}

#[derive(Serialize)]
struct VectorRecord<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a Metadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<Metadata>,
}
