//! Turning the current artifact into a downloadable file.
//!
//! Each output format takes one of three paths:
//!
//! | Format          | Path                                              |
//! |-----------------|---------------------------------------------------|
//! | svg             | passthrough, bytes saved as-is                    |
//! | png             | local decode + re-encode                          |
//! | webp (static)   | local decode + re-encode                          |
//! | webp (animated) | second round-trip with `format=webp`              |
//! | ico             | second round-trip with `format=ico`               |
//!
//! Round-trips rebuild the payload through [`build_request`], so they follow
//! exactly the same field rules as the preview.

pub mod raster;

pub use raster::RasterFormat;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::artifact::GeneratedArtifact;
use crate::client::GenerationBackend;
use crate::error::{ExportError, PlaygroundError, ValidationError};
use crate::request::{RequestTarget, ServerFormat, build_request};
use crate::source::InputSource;
use crate::visual::{ParseEnumError, VisualConfig};

// ============================================================================
// OutputFormat
// ============================================================================

/// A downloadable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
    Webp,
    Ico,
}

impl OutputFormat {
    pub const ALL: [Self; 4] = [Self::Svg, Self::Png, Self::Webp, Self::Ico];

    /// File extension, also used as the format's name.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Ico => "ico",
        }
    }

    /// How this format is produced given the current animation flag.
    pub fn strategy(&self, animated: bool) -> ExportStrategy {
        match self {
            Self::Svg => ExportStrategy::Passthrough,
            Self::Png => ExportStrategy::Rasterize(RasterFormat::Png),
            Self::Webp if animated => ExportStrategy::RoundTrip(ServerFormat::Webp),
            Self::Webp => ExportStrategy::Rasterize(RasterFormat::Webp),
            Self::Ico => ExportStrategy::RoundTrip(ServerFormat::Ico),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("output format", s))
    }
}

/// The path an export takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStrategy {
    /// Save the artifact bytes unchanged.
    Passthrough,
    /// Decode locally and re-encode.
    Rasterize(RasterFormat),
    /// Ask the service to compose the format.
    RoundTrip(ServerFormat),
}

// ============================================================================
// ExportedFile
// ============================================================================

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    /// Wraps bytes under a fresh timestamped name.
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: export_file_name(format, Utc::now().timestamp_millis()),
            format,
            bytes,
        }
    }
}

/// `icon-<unix millis>.<ext>`.
pub fn export_file_name(format: OutputFormat, timestamp_millis: i64) -> String {
    format!("icon-{}.{}", timestamp_millis, format.extension())
}

// ============================================================================
// Exporter
// ============================================================================

/// Everything an export may need besides the artifact.
///
/// The source and settings are only read for round-trip formats, so local
/// formats still export after the input has been cleared.
pub struct Exporter<'a> {
    pub source: Option<&'a InputSource>,
    pub config: &'a VisualConfig,
    pub backend: &'a dyn GenerationBackend,
    pub token: Option<&'a str>,
}

impl Exporter<'_> {
    /// Produces `format` from `artifact`.
    ///
    /// The artifact is only read; a failed export leaves it untouched.
    pub async fn export(
        &self,
        artifact: &GeneratedArtifact,
        format: OutputFormat,
    ) -> Result<ExportedFile, PlaygroundError> {
        let strategy = format.strategy(self.config.animation().is_enabled());
        tracing::debug!(%format, ?strategy, "Exporting icon");

        let bytes = match strategy {
            ExportStrategy::Passthrough => {
                if !artifact.is_svg() {
                    tracing::warn!("Artifact does not look like SVG; saving it unchanged");
                }
                artifact.bytes().to_vec()
            }
            ExportStrategy::Rasterize(raster) => raster::rasterize(artifact, raster)?,
            ExportStrategy::RoundTrip(server) => self.round_trip(server).await?,
        };

        Ok(ExportedFile::new(format, bytes))
    }

    async fn round_trip(&self, format: ServerFormat) -> Result<Vec<u8>, PlaygroundError> {
        let source = self.source.ok_or(ValidationError::MissingInput)?;
        let payload = build_request(source, self.config, RequestTarget::Export(format))?;

        let artifact = self
            .backend
            .generate(payload, self.token)
            .await
            .map_err(|source| {
                tracing::error!(%format, error = %source, "Export round-trip failed");
                ExportError::RoundTrip { format, source }
            })?;

        Ok(artifact.bytes().to_vec())
    }
}

// ============================================================================
// Download sinks
// ============================================================================

/// Where finished downloads go.
pub trait DownloadSink: Send + Sync {
    /// Stores the file and returns where it ended up.
    fn save(&self, file: &ExportedFile) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a directory.
///
/// Each file is written to a temporary file next to its destination and
/// then renamed into place, so a failed write never leaves a partial file.
/// The temporary file is removed on every failure path.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, file: &ExportedFile) -> Result<PathBuf, ExportError> {
        use std::io::Write;

        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(&file.file_name);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&file.bytes)?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;

        tracing::info!(path = %target.display(), bytes = file.bytes.len(), "Saved download");
        Ok(target)
    }
}

// ============================================================================
// Tests
// ============================================================================
