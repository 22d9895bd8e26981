use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error_for_status;
use crate::approaches::EmbeddingClient;
use crate::config::{Config, OpenAiHost};
use crate::error::{ApiError, Result};
use crate::models::VectorQuery;

const K_NEAREST_NEIGHBORS: usize = 50;

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub host: OpenAiHost,
    pub endpoint: String,
    pub api_version: String,
    pub api_key: Option<String>,
    pub model: String,
    pub deployment: Option<String>,
    pub dimensions: usize,
    pub embedding_field: String,
}

impl EmbeddingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.openai_host,
            endpoint: config.openai_endpoint.clone(),
            api_version: config.openai_api_version.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
            deployment: config.embedding_deployment.clone(),
            dimensions: config.embedding_dimensions,
            embedding_field: config.embedding_field.clone(),
        }
    }

    fn url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        match self.host {
            OpenAiHost::Azure => format!(
                "{}/openai/deployments/{}/embeddings?api-version={}",
                endpoint,
                self.deployment.as_deref().unwrap_or(&self.model),
                self.api_version
            ),
            OpenAiHost::OpenAi => format!("{}/embeddings", endpoint),
        }
    }

    /// Only the text-embedding-3 family accepts a `dimensions` parameter.
    fn supports_dimensions(&self) -> bool {
        self.model.starts_with("text-embedding-3")
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbeddingClient {
    http: reqwest::Client,
    settings: EmbeddingSettings,
}

impl OpenAiEmbeddingClient {
    pub fn new(http: reqwest::Client, settings: EmbeddingSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn compute_text_embedding(&self, text: &str) -> Result<VectorQuery> {
        let mut body = json!({
            "input": text,
            "model": self.settings.model,
        });
        if self.settings.supports_dimensions() {
            body["dimensions"] = json!(self.settings.dimensions);
        }

        let mut request = self.http.post(self.settings.url()).json(&body);
        if let Some(key) = &self.settings.api_key {
            request = match self.settings.host {
                OpenAiHost::Azure => request.header("api-key", key),
                OpenAiHost::OpenAi => request.bearer_auth(key),
            };
        }

        let response = error_for_status("embedding service", request.send().await?).await?;
        let parsed: EmbeddingResponse = response.json().await?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ApiError::Upstream("embedding response contained no data".to_string()))?;
        debug!(dimensions = vector.len(), "Computed query embedding");

        Ok(VectorQuery {
            vector,
            k_nearest_neighbors: K_NEAREST_NEIGHBORS,
            fields: self.settings.embedding_field.clone(),
        })
    }
}
