//! HTTP clients for the remote collaborators.
//!
//! Each collaborator sits behind a small async trait so a session can be
//! driven against an in-memory backend in tests:
//!
//! - [`GenerationBackend`]: multipart `POST /generate`, returns the image.
//! - [`DiscoveryBackend`]: `POST /suggest`, returns Iconify references.
//! - [`PersistenceBackend`]: authenticated CRUD for settings and
//!   collections.

pub mod discovery;
pub mod persistence;

pub use discovery::{DiscoveryBackend, DiscoveryClient};
pub use persistence::{HttpPersistenceClient, PersistenceBackend};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::instrument;

use crate::artifact::GeneratedArtifact;
use crate::config::ClientConfig;
use crate::error::{PlaygroundError, ServiceError};
use crate::request::RequestPayload;

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/generate";

// ============================================================================
// GenerationBackend
// ============================================================================

/// Something that turns a payload into an image.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submits one request. No retries.
    ///
    /// `token` is attached as a bearer header when present.
    async fn generate(
        &self,
        payload: RequestPayload,
        token: Option<&str>,
    ) -> Result<GeneratedArtifact, ServiceError>;
}

/// Generation client speaking multipart HTTP.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    /// Creates a client for the configured API URL.
    pub fn new(config: &ClientConfig) -> Result<Self, PlaygroundError> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(config: &ClientConfig, client: reqwest::Client) -> Self {
        let endpoint = config.api_endpoint(GENERATE_PATH);
        tracing::debug!(%endpoint, "Creating generation client");
        Self { endpoint, client }
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    #[instrument(skip(self, payload, token), fields(input = payload.input.key(), format = ?payload.format))]
    async fn generate(
        &self,
        payload: RequestPayload,
        token: Option<&str>,
    ) -> Result<GeneratedArtifact, ServiceError> {
        tracing::debug!(fields = ?payload.keys(), "Sending generation request");

        let form = payload.into_multipart()?;
        let mut req = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!("Generation request failed: {}", e);
            ServiceError::Transport(e)
        })?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            tracing::error!("Generation service returned an empty body");
            return Err(ServiceError::Malformed("empty response body".into()));
        }

        tracing::debug!(bytes = bytes.len(), content_type = ?content_type, "Generation successful");
        Ok(GeneratedArtifact::new(bytes.to_vec(), content_type))
    }
}

// ============================================================================
// Error bodies
// ============================================================================

/// Converts a non-2xx response into [`ServiceError::Rejected`].
pub(crate) async fn rejection(response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = parse_detail(&body);
    tracing::error!(status = status.as_u16(), detail = ?detail, "Service returned error");
    ServiceError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

/// Extracts the human-readable `detail` from a JSON error body.
///
/// Accepts a plain string or a list of validation entries (each with a
/// `msg`), which are joined with `"; "`.
pub fn parse_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = match value.get("detail")? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => other.get("msg").and_then(Value::as_str).map(str::to_string),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    (!detail.is_empty()).then_some(detail)
}
