//! Input sources for icon generation.
//!
//! An icon can come from an Iconify reference (`collection:name`), a direct
//! image URL, or an uploaded file. [`InputSelection`] remembers a value for
//! every variant so switching back and forth never loses what the user typed;
//! [`InputSource`] is the single active variant handed to the request builder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, ValidationError};

/// Reference shown in a fresh session.
pub const DEFAULT_ICON: &str = "simple-icons:openai";

/// Public Iconify endpoint used for input previews.
pub const ICONIFY_API: &str = "https://api.iconify.design";

/// MIME types accepted for uploads.
pub const ACCEPTED_UPLOAD_TYPES: [&str; 5] = [
    "image/svg+xml",
    "image/png",
    "image/webp",
    "image/jpeg",
    "image/jpg",
];

// ============================================================================
// InputKind
// ============================================================================

/// Which input variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Iconify,
    Url,
    Upload,
}

impl InputKind {
    /// Stable lowercase name, as used in analytics events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iconify => "iconify",
            Self::Url => "url",
            Self::Upload => "upload",
        }
    }
}

// ============================================================================
// UploadedFile
// ============================================================================

/// An image file supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    bytes: Vec<u8>,
    mime: String,
    file_name: String,
}

impl UploadedFile {
    /// Wraps file contents, rejecting anything but SVG, PNG, WebP or JPEG.
    pub fn new(
        bytes: Vec<u8>,
        mime: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mime = mime.into().trim().to_ascii_lowercase();
        if !ACCEPTED_UPLOAD_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::UnsupportedUpload { mime });
        }
        Ok(Self {
            bytes,
            mime,
            file_name: file_name.into(),
        })
    }

    /// Reads a file from disk, inferring its type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlaygroundError> {
        let path = path.as_ref();
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_for_extension)
            .unwrap_or("application/octet-stream");

        // Reject before reading so large unsupported files are never loaded.
        if !ACCEPTED_UPLOAD_TYPES.contains(&mime) {
            return Err(ValidationError::UnsupportedUpload { mime: mime.into() }.into());
        }

        let bytes = std::fs::read(path).map_err(crate::error::ExportError::Io)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(bytes, mime, file_name)?)
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Normalized MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Original file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns true for JPEG uploads.
    pub fn is_jpeg(&self) -> bool {
        matches!(self.mime.as_str(), "image/jpeg" | "image/jpg")
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

// ============================================================================
// InputSource
// ============================================================================

/// The single active input for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A `collection:name` Iconify identifier.
    Iconify { reference: String },
    /// A direct link to an image.
    DirectUrl { url: String },
    /// A user-supplied file.
    UploadedFile(UploadedFile),
}

impl InputSource {
    /// Creates an Iconify source.
    pub fn iconify(reference: impl Into<String>) -> Self {
        Self::Iconify {
            reference: reference.into(),
        }
    }

    /// Creates a direct URL source.
    pub fn direct_url(url: impl Into<String>) -> Self {
        Self::DirectUrl { url: url.into() }
    }

    /// Returns which variant this is.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Iconify { .. } => InputKind::Iconify,
            Self::DirectUrl { .. } => InputKind::Url,
            Self::UploadedFile(_) => InputKind::Upload,
        }
    }

    /// The JPEG constraint: true for JPEG uploads and for URLs whose path
    /// ends in `.jpg`/`.jpeg`.
    ///
    /// Such inputs carry no alpha channel, so icon recoloring is refused.
    pub fn is_jpeg(&self) -> bool {
        match self {
            Self::Iconify { .. } => false,
            Self::DirectUrl { url } => url_points_to_jpeg(url),
            Self::UploadedFile(file) => file.is_jpeg(),
        }
    }
}

/// Checks whether a URL's path ends in `.jpg` or `.jpeg`, ignoring case
/// and any query string or fragment.
pub fn url_points_to_jpeg(url: &str) -> bool {
    let path = match reqwest::Url::parse(url.trim()) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let path = path.to_ascii_lowercase();
    path.ends_with(".jpg") || path.ends_with(".jpeg")
}

// ============================================================================
// InputSelection
// ============================================================================

/// Stored values for every input variant plus which one is active.
///
/// Switching the active kind keeps the other values for when the user
/// switches back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSelection {
    kind: InputKind,
    icon_name: String,
    direct_url: String,
    upload: Option<UploadedFile>,
}

impl Default for InputSelection {
    fn default() -> Self {
        Self {
            kind: InputKind::Iconify,
            icon_name: DEFAULT_ICON.to_string(),
            direct_url: String::new(),
            upload: None,
        }
    }
}

impl InputSelection {
    /// Creates a selection with session defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Switches the active kind without clearing any stored value.
    pub fn select(&mut self, kind: InputKind) {
        self.kind = kind;
    }

    /// Stored Iconify reference.
    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    /// Stores an Iconify reference.
    pub fn set_icon_name(&mut self, reference: impl Into<String>) {
        self.icon_name = reference.into();
    }

    /// Stored direct URL.
    pub fn direct_url(&self) -> &str {
        &self.direct_url
    }

    /// Stores a direct URL.
    pub fn set_direct_url(&mut self, url: impl Into<String>) {
        self.direct_url = url.into();
    }

    /// Stored upload, if any.
    pub fn upload(&self) -> Option<&UploadedFile> {
        self.upload.as_ref()
    }

    /// Stores an upload.
    pub fn set_upload(&mut self, file: UploadedFile) {
        self.upload = Some(file);
    }

    /// Resolves the active variant.
    ///
    /// Fails with [`ValidationError::MissingInput`] when the active variant
    /// has no usable value.
    pub fn active(&self) -> Result<InputSource, ValidationError> {
        match self.kind {
            InputKind::Iconify => non_blank(&self.icon_name).map(InputSource::iconify),
            InputKind::Url => non_blank(&self.direct_url).map(InputSource::direct_url),
            InputKind::Upload => self
                .upload
                .clone()
                .map(InputSource::UploadedFile)
                .ok_or(ValidationError::MissingInput),
        }
    }

    /// JPEG constraint for the active variant; false when nothing is selected.
    pub fn is_jpeg(&self) -> bool {
        match self.kind {
            InputKind::Iconify => false,
            InputKind::Url => !self.direct_url.trim().is_empty() && url_points_to_jpeg(&self.direct_url),
            InputKind::Upload => self.upload.as_ref().is_some_and(UploadedFile::is_jpeg),
        }
    }

    /// URL that previews the active input, when one exists.
    pub fn preview_url(&self) -> Option<String> {
        match self.kind {
            InputKind::Iconify => {
                non_blank(&self.icon_name).ok().map(|r| format!("{ICONIFY_API}/{r}.svg"))
            }
            InputKind::Url => non_blank(&self.direct_url).ok().map(str::to_string),
            InputKind::Upload => None,
        }
    }

    /// Name used when saving the generated icon to a collection.
    pub fn display_name(&self) -> String {
        match self.kind {
            InputKind::Iconify => self.icon_name.trim().to_string(),
            InputKind::Url => self
                .direct_url
                .split(['?', '#'])
                .next()
                .and_then(|p| p.trim_end_matches('/').rsplit('/').next())
                .filter(|s| !s.is_empty())
                .unwrap_or("icon")
                .to_string(),
            InputKind::Upload => self
                .upload
                .as_ref()
                .map(|f| f.file_name().to_string())
                .unwrap_or_else(|| "icon".to_string()),
        }
    }
}

fn non_blank(value: &str) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingInput)
    } else {
        Ok(trimmed)
    }
}

// ============================================================================
// Tests
// ============================================================================
