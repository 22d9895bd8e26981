// HTTP clients for the hosted embedding and search services

pub mod embedding;
pub mod search;

pub use embedding::{EmbeddingSettings, OpenAiEmbeddingClient};
pub use search::{AzureSearchClient, SearchSettings};

use crate::error::{ApiError, Result};

/// Turns a non-2xx response into an `Upstream` error carrying the body.
pub(crate) async fn error_for_status(service: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Upstream(format!(
        "{} returned {}: {}",
        service, status, body
    )))
}
