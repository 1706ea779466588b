//! Authenticated CRUD for saved settings and collections.
//!
//! Routes, all relative to the persistence URL and all requiring a bearer
//! token:
//!
//! | Method | Path                | Body / result            |
//! |--------|---------------------|--------------------------|
//! | GET    | `/settings`         | `[SavedSettings]`        |
//! | POST   | `/settings`         | `SavedSettings` → same   |
//! | DELETE | `/settings/{id}`    |                          |
//! | GET    | `/collections`      | `[Collection]`           |
//! | POST   | `/collections`      | `Collection` → same      |
//! | DELETE | `/collections/{id}` |                          |
//!
//! A POST with an `id` updates that record; without one it creates a new
//! record and the response carries the assigned id.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::rejection;
use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::error::{PlaygroundError, ServiceError};
use crate::settings::SavedSettings;

/// Settings and collection storage.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn list_settings(&self, token: &str) -> Result<Vec<SavedSettings>, ServiceError>;
    async fn save_settings(
        &self,
        token: &str,
        settings: &SavedSettings,
    ) -> Result<SavedSettings, ServiceError>;
    async fn delete_settings(&self, token: &str, id: &str) -> Result<(), ServiceError>;

    async fn list_collections(&self, token: &str) -> Result<Vec<Collection>, ServiceError>;
    async fn save_collection(
        &self,
        token: &str,
        collection: &Collection,
    ) -> Result<Collection, ServiceError>;
    async fn delete_collection(&self, token: &str, id: &str) -> Result<(), ServiceError>;
}

/// REST client for the persistence service.
#[derive(Debug, Clone)]
pub struct HttpPersistenceClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpPersistenceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, PlaygroundError> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    pub fn with_client(config: &ClientConfig, client: reqwest::Client) -> Self {
        Self {
            config: config.clone(),
            client,
        }
    }

    /// URL for a resource kind, or for one record of it when `id` is given.
    ///
    /// The id is pushed as a single escaped path segment.
    fn route(&self, resource: &str, id: Option<&str>) -> Result<Url, ServiceError> {
        let endpoint = self.config.persistence_endpoint(resource);
        let mut url = Url::parse(&endpoint).map_err(|e| {
            ServiceError::Malformed(format!("invalid persistence URL {endpoint}: {e}"))
        })?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| {
                    ServiceError::Malformed(format!("persistence URL cannot take a path: {endpoint}"))
                })?
                .push(id);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ServiceError> {
        tracing::debug!(%method, %url, "Persistence request");

        let mut req = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!("Persistence request failed: {}", e);
            ServiceError::Transport(e)
        })?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse persistence response: {}", e);
            ServiceError::Malformed(format!("Failed to parse response: {}", e))
        })
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Malformed(e.to_string()))
}

#[async_trait]
impl PersistenceBackend for HttpPersistenceClient {
    #[instrument(skip(self, token))]
    async fn list_settings(&self, token: &str) -> Result<Vec<SavedSettings>, ServiceError> {
        let url = self.route("settings", None)?;
        let response = self.send(Method::GET, url, token, None).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, token, settings), fields(name = %settings.name, id = ?settings.id))]
    async fn save_settings(
        &self,
        token: &str,
        settings: &SavedSettings,
    ) -> Result<SavedSettings, ServiceError> {
        let url = self.route("settings", None)?;
        let response = self
            .send(Method::POST, url, token, Some(to_body(settings)?))
            .await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, token))]
    async fn delete_settings(&self, token: &str, id: &str) -> Result<(), ServiceError> {
        let url = self.route("settings", Some(id))?;
        self.send(Method::DELETE, url, token, None).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_collections(&self, token: &str) -> Result<Vec<Collection>, ServiceError> {
        let url = self.route("collections", None)?;
        let response = self.send(Method::GET, url, token, None).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, token, collection), fields(name = %collection.name, icons = collection.icons.len()))]
    async fn save_collection(
        &self,
        token: &str,
        collection: &Collection,
    ) -> Result<Collection, ServiceError> {
        let url = self.route("collections", None)?;
        let response = self
            .send(Method::POST, url, token, Some(to_body(collection)?))
            .await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, token))]
    async fn delete_collection(&self, token: &str, id: &str) -> Result<(), ServiceError> {
        let url = self.route("collections", Some(id))?;
        self.send(Method::DELETE, url, token, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsSnapshot;

    #[test]
    fn settings_body_is_flat() {
        let settings = SavedSettings::new("Dark", SettingsSnapshot::default());
        let value = to_body(&settings).unwrap();
        assert_eq!(value["name"], "Dark");
        assert_eq!(value["size"], 256);
    }

    fn client(config: ClientConfig) -> HttpPersistenceClient {
        HttpPersistenceClient::with_client(&config, reqwest::Client::new())
    }

    #[test]
    fn routes_join_persistence_url() {
        let client = client(
            ClientConfig::new("http://api.local").with_persistence_url("http://store.local/"),
        );
        assert_eq!(
            client.route("settings", None).unwrap().as_str(),
            "http://store.local/settings"
        );
        assert_eq!(
            client.route("settings", Some("abc")).unwrap().as_str(),
            "http://store.local/settings/abc"
        );
    }

    #[test]
    fn record_ids_are_escaped() {
        let client = client(ClientConfig::new("http://store.local/api"));
        assert_eq!(
            client.route("collections", Some("a/b c?x#y")).unwrap().as_str(),
            "http://store.local/api/collections/a%2Fb%20c%3Fx%23y"
        );
    }

    #[test]
    fn bad_base_url_is_malformed() {
        let client = client(ClientConfig::new("not a url"));
        assert!(matches!(
            client.route("settings", None),
            Err(ServiceError::Malformed(_))
        ));
    }
}
