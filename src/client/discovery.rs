//! Icon suggestions from a free-text query.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::rejection;
use crate::config::ClientConfig;
use crate::error::{PlaygroundError, ServiceError};

/// Path of the discovery endpoint.
pub const SUGGEST_PATH: &str = "/suggest";

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Something that proposes Iconify references for a query.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ServiceError>;
}

/// Discovery client for `POST /suggest`.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    endpoint: String,
    client: reqwest::Client,
}

impl DiscoveryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, PlaygroundError> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    pub fn with_client(config: &ClientConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.api_endpoint(SUGGEST_PATH),
            client,
        }
    }
}

#[async_trait]
impl DiscoveryBackend for DiscoveryClient {
    #[instrument(skip(self))]
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ServiceError> {
        tracing::debug!("Requesting icon suggestions");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SuggestRequest { query })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Suggestion request failed: {}", e);
                ServiceError::Transport(e)
            })?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body: SuggestResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse suggestions: {}", e);
            ServiceError::Malformed(format!("Failed to parse suggestions: {}", e))
        })?;

        Ok(clean_suggestions(body.suggestions))
    }
}

/// Drops blanks and duplicates, keeping the service's order.
fn clean_suggestions(suggestions: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(suggestions.len());
    for suggestion in suggestions {
        let suggestion = suggestion.trim();
        if !suggestion.is_empty() && !cleaned.iter().any(|s| s == suggestion) {
            cleaned.push(suggestion.to_string());
        }
    }
    cleaned
}
