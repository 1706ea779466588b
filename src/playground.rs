//! The playground session: input, settings, the current artifact, and the
//! collaborators every user action talks to.

use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::GeneratedArtifact;
use crate::client::{
    DiscoveryBackend, DiscoveryClient, GenerationBackend, HttpGenerationClient,
    HttpPersistenceClient, PersistenceBackend,
};
use crate::collection::{Collection, SavedIcon};
use crate::config::ClientConfig;
use crate::error::{PlaygroundError, Result, ValidationError};
use crate::export::{DownloadSink, ExportedFile, Exporter, OutputFormat};
use crate::identity::{Anonymous, Identity, StaticIdentity};
use crate::request::{RequestPayload, RequestTarget, build_request};
use crate::settings::{Configurable, SavedSettings, SettingsSnapshot};
use crate::source::InputSelection;
use crate::visual::VisualConfig;

/// Target used for analytics events.
pub const ANALYTICS_TARGET: &str = "icongen::analytics";

/// Where [`Playground::save_to_collection`] puts the icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionTarget {
    /// Start a new collection with this name.
    New(String),
    /// Append to the collection with this id.
    Existing(String),
}

// ============================================================================
// Playground
// ============================================================================

/// One user session.
///
/// The input selection and visual settings are plain fields mutated through
/// their own named operations. The generated artifact is only ever replaced
/// as a whole, and only by a successful [`generate`](Self::generate).
///
/// # Example
///
/// ```no_run
/// use icongen_client::{ClientConfig, OutputFormat, Playground};
///
/// # async fn run() -> icongen_client::Result<()> {
/// let mut playground = Playground::from_config(&ClientConfig::from_env()?)?;
/// playground.input.set_icon_name("mdi:home");
/// playground.config.set_icon_color("dodgerblue");
///
/// playground.generate().await?;
/// let png = playground.export(OutputFormat::Png).await?;
/// # Ok(())
/// # }
/// ```
pub struct Playground {
    /// Input source selection.
    pub input: InputSelection,

    /// Visual settings.
    pub config: VisualConfig,

    last_query: String,
    artifact: Option<GeneratedArtifact>,

    generation: Arc<dyn GenerationBackend>,
    discovery: Option<Arc<dyn DiscoveryBackend>>,
    persistence: Option<Arc<dyn PersistenceBackend>>,
    identity: Arc<dyn Identity>,
}

impl Playground {
    /// Creates a session with defaults and an anonymous identity.
    pub fn new(generation: Arc<dyn GenerationBackend>) -> Self {
        Self {
            input: InputSelection::default(),
            config: VisualConfig::default(),
            last_query: String::new(),
            artifact: None,
            generation,
            discovery: None,
            persistence: None,
            identity: Arc::new(Anonymous),
        }
    }

    /// Creates a session wired to the HTTP services in `config`.
    ///
    /// A configured auth token becomes a static identity.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = config.http_client()?;

        let mut playground = Self::new(Arc::new(HttpGenerationClient::with_client(
            config,
            http.clone(),
        )))
        .with_discovery(Arc::new(DiscoveryClient::with_client(config, http.clone())))
        .with_persistence(Arc::new(HttpPersistenceClient::with_client(config, http)));

        if let Some(token) = &config.auth_token {
            playground = playground.with_identity(Arc::new(StaticIdentity::from_token(token)));
        }
        Ok(playground)
    }

    pub fn with_identity(mut self, identity: Arc<dyn Identity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn DiscoveryBackend>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceBackend>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// The last successfully generated icon.
    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.artifact.as_ref()
    }

    /// The query last sent for suggestions.
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    // ---- Generation ----

    /// The payload [`generate`](Self::generate) would send right now.
    pub fn preview_request(&self) -> Result<RequestPayload> {
        let source = self.input.active()?;
        Ok(build_request(&source, &self.config, RequestTarget::Preview)?)
    }

    /// Generates an icon for the current input and settings.
    ///
    /// Validation runs before anything is sent. On any failure the previous
    /// artifact is kept.
    pub async fn generate(&mut self) -> Result<&GeneratedArtifact> {
        let payload = self.preview_request().inspect_err(|e| {
            tracing::warn!(error = %e, "Generation rejected before sending");
        })?;

        let token = self.identity.bearer_token().await;
        let artifact = self
            .generation
            .generate(payload, token.as_deref())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Icon generation failed"))?;

        tracing::info!(
            bytes = artifact.len(),
            input = self.input.kind().as_str(),
            "Icon generated"
        );
        Ok(self.artifact.insert(artifact))
    }

    // ---- Export ----

    /// Produces a downloadable file from the current artifact.
    ///
    /// Failures are logged and returned; the artifact is never modified.
    pub async fn export(&self, format: OutputFormat) -> Result<ExportedFile> {
        let artifact = self.artifact.as_ref().ok_or(ValidationError::NoArtifact)?;
        let source = self.input.active().ok();
        let token = self.identity.bearer_token().await;

        let exporter = Exporter {
            source: source.as_ref(),
            config: &self.config,
            backend: self.generation.as_ref(),
            token: token.as_deref(),
        };

        let file = exporter
            .export(artifact, format)
            .await
            .inspect_err(|e| tracing::error!(%format, error = %e, "Export failed"))?;

        tracing::info!(
            target: ANALYTICS_TARGET,
            event = "download_icon",
            format = %format,
            input_type = self.input.kind().as_str(),
            size = self.config.size(),
            has_bg = self.config.has_background(),
            "download_icon"
        );
        Ok(file)
    }

    /// Exports and hands the file to `sink`.
    pub async fn download(&self, format: OutputFormat, sink: &dyn DownloadSink) -> Result<PathBuf> {
        let file = self.export(format).await?;
        Ok(sink.save(&file)?)
    }

    // ---- Discovery ----

    /// Asks for Iconify references matching `query` and remembers the query.
    pub async fn suggest(&mut self, query: &str) -> Result<Vec<String>> {
        let discovery = self
            .discovery
            .clone()
            .ok_or_else(|| PlaygroundError::Config("no discovery endpoint configured".into()))?;

        self.last_query = query.trim().to_string();
        let suggestions = discovery.suggest(&self.last_query).await?;
        tracing::debug!(count = suggestions.len(), "Received suggestions");
        Ok(suggestions)
    }

    // ---- Settings presets ----

    /// Snapshot of the current settings, including the last query.
    pub fn current_settings(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            last_query: self.last_query.clone(),
            ..self.config.export_settings()
        }
    }

    /// Restores settings (and the last query) from a snapshot.
    pub fn apply_settings(&mut self, settings: &SettingsSnapshot) {
        self.config.apply_settings(settings);
        self.last_query = settings.last_query.clone();
    }

    /// Lists saved presets.
    pub async fn list_settings(&self) -> Result<Vec<SavedSettings>> {
        let (persistence, token) = self.authenticated().await?;
        Ok(persistence.list_settings(&token).await?)
    }

    /// Saves the current settings under `name`.
    ///
    /// With `id`, the existing preset is updated in place.
    pub async fn save_settings(&self, name: &str, id: Option<&str>) -> Result<SavedSettings> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let (persistence, token) = self.authenticated().await?;

        let mut preset = SavedSettings::new(name, self.current_settings());
        if let Some(id) = id {
            preset = preset.with_id(id);
        }

        let saved = persistence.save_settings(&token, &preset).await?;
        tracing::info!(name, id = ?saved.id, "Saved settings");
        Ok(saved)
    }

    /// Loads the preset with `id` into this session.
    pub async fn load_settings(&mut self, id: &str) -> Result<SavedSettings> {
        let preset = self
            .list_settings()
            .await?
            .into_iter()
            .find(|s| s.id.as_deref() == Some(id))
            .ok_or_else(|| ValidationError::NotFound {
                what: "settings",
                id: id.to_string(),
            })?;

        self.apply_settings(&preset.settings);
        tracing::info!(name = %preset.name, "Loaded settings");
        Ok(preset)
    }

    /// Deletes a preset.
    pub async fn delete_settings(&self, id: &str) -> Result<()> {
        let (persistence, token) = self.authenticated().await?;
        persistence.delete_settings(&token, id).await?;
        Ok(())
    }

    // ---- Collections ----

    /// Lists the user's collections.
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let (persistence, token) = self.authenticated().await?;
        Ok(persistence.list_collections(&token).await?)
    }

    /// Saves the current artifact to a collection.
    ///
    /// Gradient icons are refused outright. Otherwise this needs a signed-in
    /// user and an SVG artifact.
    pub async fn save_to_collection(&self, target: CollectionTarget) -> Result<Collection> {
        if self.config.icon_color().is_gradient() {
            return Err(ValidationError::GradientNotCollectable.into());
        }
        let (persistence, token) = self.authenticated().await?;

        let artifact = self.artifact.as_ref().ok_or(ValidationError::NoArtifact)?;
        let svg = artifact.svg_text().ok_or(ValidationError::NotSvg)?;
        let icon = SavedIcon::new(self.input.display_name(), svg);

        let collection = match target {
            CollectionTarget::New(name) => Collection::new(&name, icon)?,
            CollectionTarget::Existing(id) => {
                let mut existing = find_collection(persistence.list_collections(&token).await?, &id)?;
                existing.push_icon(icon);
                existing
            }
        };

        let saved = persistence.save_collection(&token, &collection).await?;
        tracing::info!(name = %saved.name, icons = saved.len(), "Saved icon to collection");
        Ok(saved)
    }

    /// Removes one icon from a collection.
    pub async fn remove_collection_icon(&self, id: &str, index: usize) -> Result<Collection> {
        let (persistence, token) = self.authenticated().await?;

        let mut collection = find_collection(persistence.list_collections(&token).await?, id)?;
        collection.remove_icon(index)?;

        Ok(persistence.save_collection(&token, &collection).await?)
    }

    /// Deletes a collection.
    pub async fn delete_collection(&self, id: &str) -> Result<()> {
        let (persistence, token) = self.authenticated().await?;
        persistence.delete_collection(&token, id).await?;
        Ok(())
    }

    /// Saves one collection icon through `sink` as `<name>-<n>.svg`.
    pub fn download_collection_icon(
        &self,
        collection: &Collection,
        index: usize,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf> {
        let (icon, file_name) = collection.icon_download(index)?;
        let file = ExportedFile {
            file_name,
            format: OutputFormat::Svg,
            bytes: icon.svg.as_bytes().to_vec(),
        };
        Ok(sink.save(&file)?)
    }

    /// The persistence backend and a token, or why they are unavailable.
    async fn authenticated(&self) -> Result<(Arc<dyn PersistenceBackend>, String)> {
        let persistence = self
            .persistence
            .clone()
            .ok_or_else(|| PlaygroundError::Config("no persistence endpoint configured".into()))?;
        let token = self
            .identity
            .bearer_token()
            .await
            .ok_or(ValidationError::NotAuthenticated)?;
        Ok((persistence, token))
    }
}

fn find_collection(collections: Vec<Collection>, id: &str) -> Result<Collection> {
    collections
        .into_iter()
        .find(|c| c.id.as_deref() == Some(id))
        .ok_or_else(|| {
            ValidationError::NotFound {
                what: "collection",
                id: id.to_string(),
            }
            .into()
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><rect width="8" height="8" fill="#fff"/></svg>"##;

    /// Answers with a fixed SVG, or fails when told to.
    #[derive(Default)]
    struct StubBackend {
        fail: Mutex<bool>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn generate(
            &self,
            _payload: RequestPayload,
            _token: Option<&str>,
        ) -> std::result::Result<GeneratedArtifact, ServiceError> {
            *self.calls.lock().unwrap() += 1;
            if *self.fail.lock().unwrap() {
                return Err(ServiceError::Rejected {
                    status: 500,
                    detail: None,
                });
            }
            Ok(GeneratedArtifact::new(SVG.as_bytes(), Some("image/svg+xml".into())))
        }
    }

    #[tokio::test]
    async fn generate_stores_artifact() {
        let mut playground = Playground::new(Arc::new(StubBackend::default()));
        assert!(playground.artifact().is_none());

        playground.generate().await.unwrap();
        assert!(playground.artifact().unwrap().is_svg());
    }

    #[tokio::test]
    async fn failure_keeps_previous_artifact() {
        let backend = Arc::new(StubBackend::default());
        let mut playground = Playground::new(backend.clone());
        playground.generate().await.unwrap();
        let before = playground.artifact().cloned();

        *backend.fail.lock().unwrap() = true;
        let err = playground.generate().await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to generate icon");
        assert_eq!(playground.artifact().cloned(), before);
    }

    #[tokio::test]
    async fn validation_failure_sends_nothing() {
        let backend = Arc::new(StubBackend::default());
        let mut playground = Playground::new(backend.clone());
        playground.input.set_icon_name("");

        let err = playground.generate().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(*backend.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn export_requires_artifact() {
        let playground = Playground::new(Arc::new(StubBackend::default()));
        let err = playground.export(OutputFormat::Svg).await.unwrap_err();
        assert!(matches!(
            err,
            PlaygroundError::Validation(ValidationError::NoArtifact)
        ));
    }

    #[tokio::test]
    async fn svg_export_is_passthrough() {
        let backend = Arc::new(StubBackend::default());
        let mut playground = Playground::new(backend.clone());
        playground.generate().await.unwrap();

        let file = playground.export(OutputFormat::Svg).await.unwrap();
        assert_eq!(file.bytes, SVG.as_bytes());
        assert_eq!(*backend.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn persistence_requires_configuration_and_login() {
        let playground = Playground::new(Arc::new(StubBackend::default()));
        let err = playground.list_settings().await.unwrap_err();
        assert!(matches!(err, PlaygroundError::Config(_)));
    }

    #[tokio::test]
    async fn gradient_icons_are_not_collectable() {
        let mut playground = Playground::new(Arc::new(StubBackend::default()));
        playground.generate().await.unwrap();
        playground.config.set_icon_gradient(true);

        let err = playground
            .save_to_collection(CollectionTarget::New("Mine".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlaygroundError::Validation(ValidationError::GradientNotCollectable)
        ));
    }

    #[test]
    fn settings_carry_last_query() {
        let mut playground = Playground::new(Arc::new(StubBackend::default()));
        playground.last_query = "rocket".into();
        playground.config.set_size(64);

        let snapshot = playground.current_settings();
        assert_eq!(snapshot.last_query, "rocket");
        assert_eq!(snapshot.size, 64);

        let mut other = Playground::new(Arc::new(StubBackend::default()));
        other.apply_settings(&snapshot);
        assert_eq!(other.last_query(), "rocket");
        assert_eq!(other.config.size(), 64);
    }
}
