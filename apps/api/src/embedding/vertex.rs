//! Vertex AI text-embedding client (primary provider).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider};
use crate::config::VertexConfig;

const PROVIDER: &str = "vertex";

#[derive(Clone)]
pub struct VertexEmbedder {
    client: Client,
    endpoint: String,
}

impl VertexEmbedder {
    pub fn new(config: &VertexConfig, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(
            !config.access_token.trim().is_empty(),
            "GOOGLE_ACCESS_TOKEN is required for Vertex AI embeddings"
        );

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.access_token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid Google access token")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Vertex AI HTTP client")?;

        Ok(Self {
            client,
            endpoint: predict_endpoint(config),
        })
    }
}

fn predict_endpoint(config: &VertexConfig) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:predict",
        location = config.location,
        project = config.project,
        model = config.model,
    )
}

#[async_trait]
impl EmbeddingProvider for VertexEmbedder {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = PredictRequest {
            instances: vec![PredictInstance { content: text }],
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: PredictResponse = response.json().await?;
        debug!("Vertex AI embedding succeeded");
        parsed.into_vector()
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    embeddings: PredictionEmbeddings,
}

#[derive(Debug, Deserialize)]
struct PredictionEmbeddings {
    values: Vec<f32>,
}

impl PredictResponse {
    fn into_vector(self) -> Result<Vec<f32>, EmbeddingError> {
        self.predictions
            .into_iter()
            .next()
            .map(|p| p.embeddings.values)
            .filter(|v| !v.is_empty())
            .ok_or(EmbeddingError::EmptyResponse { provider: PROVIDER })
    }
}
