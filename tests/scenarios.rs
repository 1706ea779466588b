//! End-to-end session scenarios against in-memory backends.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use icongen_client::{
    Collection, CollectionTarget, DiscoveryBackend, DownloadSink, ExportError, ExportedFile,
    GeneratedArtifact, GenerationBackend, GradientDirection, InputKind, OutputFormat,
    PersistenceBackend, Playground, PlaygroundError, RequestPayload, SavedSettings, ServiceError,
    SessionIdentity, StaticIdentity, UploadedFile, UserSession, ValidationError,
};

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><circle cx="8" cy="8" r="6" fill="#1e90ff"/></svg>"##;

// ============================================================================
// Test backends
// ============================================================================

/// Records every payload and answers from a queue of canned responses.
///
/// When the queue is empty it answers with [`SVG`].
#[derive(Default)]
struct RecordingBackend {
    requests: Mutex<Vec<(BTreeMap<String, String>, Option<String>)>>,
    responses: Mutex<Vec<Result<GeneratedArtifact, ServiceError>>>,
}

impl RecordingBackend {
    fn push_response(&self, response: Result<GeneratedArtifact, ServiceError>) {
        self.responses.lock().unwrap().push(response);
    }

    fn requests(&self) -> Vec<BTreeMap<String, String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(fields, _)| fields.clone())
            .collect()
    }

    fn tokens(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    async fn generate(
        &self,
        payload: RequestPayload,
        token: Option<&str>,
    ) -> Result<GeneratedArtifact, ServiceError> {
        let mut fields: BTreeMap<String, String> = payload
            .text_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if payload.keys().contains(&"file") {
            fields.insert("file".into(), "<binary>".into());
        }
        self.requests
            .lock()
            .unwrap()
            .push((fields, token.map(str::to_string)));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(GeneratedArtifact::new(SVG.as_bytes(), Some("image/svg+xml".into())))
        } else {
            responses.remove(0)
        }
    }
}

/// Settings and collections kept in memory, with ids assigned on save.
#[derive(Default)]
struct MemoryStore {
    settings: Mutex<Vec<SavedSettings>>,
    collections: Mutex<Vec<Collection>>,
    next_id: Mutex<u32>,
}

impl MemoryStore {
    fn assign_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("id-{}", *next)
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> Option<&String>) {
    match items.iter().position(|i| id_of(i) == id_of(&item)) {
        Some(pos) => items[pos] = item,
        None => items.push(item),
    }
}

#[async_trait]
impl PersistenceBackend for MemoryStore {
    async fn list_settings(&self, _token: &str) -> Result<Vec<SavedSettings>, ServiceError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_settings(
        &self,
        _token: &str,
        settings: &SavedSettings,
    ) -> Result<SavedSettings, ServiceError> {
        let mut saved = settings.clone();
        if saved.id.is_none() {
            saved.id = Some(self.assign_id());
        }
        upsert(&mut *self.settings.lock().unwrap(), saved.clone(), |s| s.id.as_ref());
        Ok(saved)
    }

    async fn delete_settings(&self, _token: &str, id: &str) -> Result<(), ServiceError> {
        self.settings
            .lock()
            .unwrap()
            .retain(|s| s.id.as_deref() != Some(id));
        Ok(())
    }

    async fn list_collections(&self, _token: &str) -> Result<Vec<Collection>, ServiceError> {
        Ok(self.collections.lock().unwrap().clone())
    }

    async fn save_collection(
        &self,
        _token: &str,
        collection: &Collection,
    ) -> Result<Collection, ServiceError> {
        let mut saved = collection.clone();
        if saved.id.is_none() {
            saved.id = Some(self.assign_id());
        }
        upsert(&mut *self.collections.lock().unwrap(), saved.clone(), |c| c.id.as_ref());
        Ok(saved)
    }

    async fn delete_collection(&self, _token: &str, id: &str) -> Result<(), ServiceError> {
        self.collections
            .lock()
            .unwrap()
            .retain(|c| c.id.as_deref() != Some(id));
        Ok(())
    }
}

struct FixedSuggestions(Vec<String>);

#[async_trait]
impl DiscoveryBackend for FixedSuggestions {
    async fn suggest(&self, _query: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Keeps downloads in memory.
#[derive(Default)]
struct MemorySink {
    files: Mutex<Vec<ExportedFile>>,
}

impl DownloadSink for MemorySink {
    fn save(&self, file: &ExportedFile) -> Result<PathBuf, ExportError> {
        self.files.lock().unwrap().push(file.clone());
        Ok(PathBuf::from(&file.file_name))
    }
}

fn keys(fields: &BTreeMap<String, String>) -> Vec<&str> {
    fields.keys().map(String::as_str).collect()
}

fn signed_in(backend: Arc<RecordingBackend>, store: Arc<MemoryStore>) -> Playground {
    Playground::new(backend)
        .with_persistence(store)
        .with_identity(Arc::new(StaticIdentity::new(UserSession::new("u1", "tok"))))
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn minimal_iconify_request() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());

    playground.input.set_icon_name("mdi:home");
    playground.config.set_icon_color("dodgerblue");
    playground.config.set_size(128);
    playground.generate().await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(keys(&requests[0]), vec!["color", "icon_name", "size"]);
    assert_eq!(requests[0]["icon_name"], "mdi:home");
    assert_eq!(requests[0]["size"], "128");
    assert_eq!(requests[0]["color"], "dodgerblue");
    assert_eq!(backend.tokens(), vec![None]);
}

#[tokio::test]
async fn jpeg_gradient_is_rejected_without_request() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());

    let jpeg = UploadedFile::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg", "photo.jpg").unwrap();
    playground.input.set_upload(jpeg);
    playground.input.select(InputKind::Upload);
    playground.config.set_icon_gradient(true);

    let err = playground.generate().await.unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Validation(ValidationError::JpegRecolor)
    ));
    assert!(err.user_message().contains("Background color is still supported"));
    assert!(backend.requests().is_empty());
    assert!(playground.artifact().is_none());
}

#[tokio::test]
async fn jpeg_with_background_only_is_sent() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());

    playground.input.set_direct_url("https://example.com/photos/cat.jpeg?w=300");
    playground.input.select(InputKind::Url);
    playground.config.set_background_color("#222");
    playground.generate().await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request["direct_url"], "https://example.com/photos/cat.jpeg?w=300");
    assert_eq!(request["bg_color"], "#222");
    assert_eq!(request["scale"], "0.7");
    assert!(!request.contains_key("color"));
    assert!(!request.contains_key("icon_name"));
}

#[tokio::test]
async fn service_detail_is_surfaced_and_artifact_kept() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());
    playground.generate().await.unwrap();
    let before = playground.artifact().cloned();

    backend.push_response(Err(ServiceError::Rejected {
        status: 404,
        detail: Some("Icon 'mdi:nope' not found".into()),
    }));
    playground.input.set_icon_name("mdi:nope");

    let err = playground.generate().await.unwrap_err();
    assert_eq!(err.user_message(), "Icon 'mdi:nope' not found");
    assert_eq!(playground.artifact().cloned(), before);
}

#[tokio::test]
async fn bearer_token_follows_session() {
    let backend = Arc::new(RecordingBackend::default());
    let identity = Arc::new(SessionIdentity::new());
    let mut playground = Playground::new(backend.clone()).with_identity(identity.clone());

    playground.generate().await.unwrap();
    identity.sign_in(UserSession::new("u1", "secret"));
    playground.generate().await.unwrap();
    identity.sign_out();
    playground.generate().await.unwrap();

    assert_eq!(
        backend.tokens(),
        vec![None, Some("secret".to_string()), None]
    );
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn ico_export_rebuilds_full_payload() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());

    playground.input.set_icon_name("mdi:home");
    playground.config.set_background_gradient(true);
    playground.config.set_background_gradient_stops("#000", "#fff");
    playground.config.set_background_direction(GradientDirection::Diagonal);
    playground.config.set_border_radius(20);
    playground.generate().await.unwrap();

    backend.push_response(Ok(GeneratedArtifact::new(
        vec![0, 0, 1, 0],
        Some("image/x-icon".into()),
    )));
    let file = playground.export(OutputFormat::Ico).await.unwrap();
    assert_eq!(file.bytes, vec![0, 0, 1, 0]);
    assert!(file.file_name.ends_with(".ico"));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    let preview = &requests[0];
    let ico = &requests[1];

    assert!(!preview.contains_key("format"));
    assert_eq!(ico["format"], "ico");
    assert_eq!(ico["bg_color"], "(#000,#fff)");
    assert_eq!(ico["bg_direction"], "diagonal");
    assert_eq!(ico["border_radius"], "20");

    // Same rules on both paths, apart from the format field.
    let mut without_format = ico.clone();
    without_format.remove("format");
    assert_eq!(&without_format, preview);
}

#[tokio::test]
async fn animated_webp_round_trips() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());

    playground.config.set_animation_duration(2.0);
    playground.config.set_animation_enabled(true);
    playground.config.set_scale(1.25);
    playground.generate().await.unwrap();

    backend.push_response(Ok(GeneratedArtifact::new(
        b"RIFF\0\0\0\0WEBP".to_vec(),
        Some("image/webp".into()),
    )));
    let file = playground.export(OutputFormat::Webp).await.unwrap();
    assert!(file.bytes.starts_with(b"RIFF"));

    let request = &backend.requests()[1];
    assert_eq!(request["format"], "webp");
    assert_eq!(request["animation"], "spin:2s");
    assert_eq!(request["scale"], "1.25");
}

#[tokio::test]
async fn static_exports_stay_local() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());
    playground.generate().await.unwrap();

    let sink = MemorySink::default();
    for format in [OutputFormat::Svg, OutputFormat::Png, OutputFormat::Webp] {
        playground.download(format, &sink).await.unwrap();
    }

    assert_eq!(backend.requests().len(), 1);

    let files = sink.files.lock().unwrap();
    assert_eq!(files[0].bytes, SVG.as_bytes());
    assert!(files[1].bytes.starts_with(b"\x89PNG"));
    assert!(files[1].file_name.ends_with(".png"));
    assert_eq!(&files[2].bytes[8..12], b"WEBP");

    let decoded = image::load_from_memory(&files[1].bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 16));
}

#[tokio::test]
async fn failed_round_trip_keeps_artifact() {
    let backend = Arc::new(RecordingBackend::default());
    let mut playground = Playground::new(backend.clone());
    playground.generate().await.unwrap();
    let before = playground.artifact().cloned();

    backend.push_response(Err(ServiceError::Rejected {
        status: 500,
        detail: None,
    }));
    let err = playground.export(OutputFormat::Ico).await.unwrap_err();
    assert_eq!(err.user_message(), "ICO download failed");
    assert_eq!(playground.artifact().cloned(), before);
}

#[tokio::test]
async fn undecodable_artifact_fails_raster_export_only() {
    let backend = Arc::new(RecordingBackend::default());
    backend.push_response(Ok(GeneratedArtifact::new(
        b"definitely not an image".to_vec(),
        Some("image/png".into()),
    )));
    let mut playground = Playground::new(backend.clone());
    playground.generate().await.unwrap();

    let err = playground.export(OutputFormat::Png).await.unwrap_err();
    assert!(matches!(err, PlaygroundError::Export(ExportError::Decode(_))));

    // Passthrough still works with the same artifact.
    assert!(playground.export(OutputFormat::Svg).await.is_ok());
}

// ============================================================================
// Settings and collections
// ============================================================================

#[tokio::test]
async fn settings_save_and_reload() {
    let backend = Arc::new(RecordingBackend::default());
    let store = Arc::new(MemoryStore::default());
    let mut playground = signed_in(backend.clone(), store.clone())
        .with_discovery(Arc::new(FixedSuggestions(vec!["mdi:rocket".into()])));

    assert_eq!(playground.suggest(" rocket ").await.unwrap(), vec!["mdi:rocket"]);
    playground.config.set_background_color("navy");
    playground.config.set_outline_width(2);
    let saved = playground.save_settings("  Night  ", None).await.unwrap();
    assert_eq!(saved.name, "Night");
    assert_eq!(saved.settings.last_query, "rocket");
    let id = saved.id.clone().unwrap();

    let mut fresh = signed_in(backend, store.clone());
    fresh.load_settings(&id).await.unwrap();
    assert_eq!(fresh.config.background().solid(), "navy");
    assert_eq!(fresh.config.scale(), 0.7);
    assert_eq!(fresh.config.outline_width(), 2);
    assert_eq!(fresh.last_query(), "rocket");

    // Updating in place keeps a single preset.
    fresh.config.set_size(32);
    fresh.save_settings("Night", Some(id.as_str())).await.unwrap();
    let all = fresh.list_settings().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].settings.size, 32);

    fresh.delete_settings(&id).await.unwrap();
    assert!(fresh.list_settings().await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_need_name_and_login() {
    let backend = Arc::new(RecordingBackend::default());
    let store = Arc::new(MemoryStore::default());

    let anonymous = Playground::new(backend.clone()).with_persistence(store.clone());
    let err = anonymous.save_settings("Mine", None).await.unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Validation(ValidationError::NotAuthenticated)
    ));

    let user = signed_in(backend, store);
    let err = user.save_settings("   ", None).await.unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Validation(ValidationError::EmptyName)
    ));
}

#[tokio::test]
async fn collection_lifecycle() {
    let backend = Arc::new(RecordingBackend::default());
    let store = Arc::new(MemoryStore::default());
    let mut playground = signed_in(backend, store);

    playground.input.set_icon_name("mdi:home");
    playground.generate().await.unwrap();
    let created = playground
        .save_to_collection(CollectionTarget::New("Favorites".into()))
        .await
        .unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.icons[0].name, "mdi:home");
    assert_eq!(created.icons[0].svg, SVG);

    playground.input.set_icon_name("mdi:star");
    playground.generate().await.unwrap();
    let updated = playground
        .save_to_collection(CollectionTarget::Existing(id.clone()))
        .await
        .unwrap();
    assert_eq!(updated.len(), 2);

    let sink = MemorySink::default();
    let path = playground
        .download_collection_icon(&updated, 1, &sink)
        .unwrap();
    assert_eq!(path, PathBuf::from("mdi:star-2.svg"));

    let trimmed = playground.remove_collection_icon(&id, 0).await.unwrap();
    assert_eq!(trimmed.icons[0].name, "mdi:star");

    playground.delete_collection(&id).await.unwrap();
    assert!(playground.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn gradient_icon_cannot_be_collected() {
    let backend = Arc::new(RecordingBackend::default());
    let store = Arc::new(MemoryStore::default());
    let mut playground = signed_in(backend, store.clone());

    playground.config.set_icon_gradient(true);
    playground.generate().await.unwrap();

    let err = playground
        .save_to_collection(CollectionTarget::New("Gradients".into()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Validation(ValidationError::GradientNotCollectable)
    ));
    assert!(store.collections.lock().unwrap().is_empty());
}

#[tokio::test]
async fn raster_artifact_cannot_be_collected() {
    let backend = Arc::new(RecordingBackend::default());
    backend.push_response(Ok(GeneratedArtifact::new(
        vec![0x89, b'P', b'N', b'G'],
        Some("image/png".into()),
    )));
    let store = Arc::new(MemoryStore::default());
    let mut playground = signed_in(backend, store);
    playground.generate().await.unwrap();

    let err = playground
        .save_to_collection(CollectionTarget::New("Pngs".into()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlaygroundError::Validation(ValidationError::NotSvg)
    ));
}
