//! Error types for the icon generation client.
//!
//! Failures fall into three groups, each caught at the operation boundary
//! that produced it:
//!
//! - [`ValidationError`]: detected locally before any network call.
//! - [`ServiceError`]: the generation or persistence service rejected the
//!   request or could not be reached.
//! - [`ExportError`]: a single export attempt failed (decode, encode,
//!   second round-trip, or writing the download).
//!
//! [`PlaygroundError`] wraps all of them and knows how to phrase each one
//! for the user.

use thiserror::Error;

use crate::request::ServerFormat;

/// Message shown when the service fails without a `detail` of its own.
pub const GENERIC_FAILURE: &str = "Failed to generate icon";

/// Convenience alias used across the crate.
pub type Result<T, E = PlaygroundError> = std::result::Result<T, E>;

// ============================================================================
// ValidationError
// ============================================================================

/// A user-input problem detected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The active input variant has no value yet.
    #[error("Select an icon, URL, or file before generating")]
    MissingInput,

    /// A JPEG input cannot be recolored; it has no alpha channel to key on.
    #[error("JPEG/JPG icons cannot change icon color. Background color is still supported.")]
    JpegRecolor,

    /// The uploaded file is not one of the accepted image types.
    #[error("Please upload SVG, PNG, WebP, or JPEG file (got {mime})")]
    UnsupportedUpload { mime: String },

    /// Gradient-colored icons are not stored in collections.
    #[error(
        "Gradient icons cannot be saved to a collection. Download the icon or save your settings instead."
    )]
    GradientNotCollectable,

    /// A preset or collection name was blank.
    #[error("Please enter a name")]
    EmptyName,

    /// The operation needs a signed-in session.
    #[error("Please log in first")]
    NotAuthenticated,

    /// Export or save was requested before any icon was generated.
    #[error("Generate an icon first")]
    NoArtifact,

    /// The generated artifact is not SVG text and cannot be stored inline.
    #[error("The generated icon is not SVG text")]
    NotSvg,

    /// No saved preset or collection has this id.
    #[error("No saved {what} with id {id}")]
    NotFound { what: &'static str, id: String },

    /// A collection icon index does not exist.
    #[error("Icon {index} does not exist in a collection of {len}")]
    IconIndexOutOfRange { index: usize, len: usize },
}

// ============================================================================
// ServiceError
// ============================================================================

/// A failure reported by, or while reaching, a remote collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with a non-2xx status.
    ///
    /// `detail` is the service's own message, shown verbatim when present.
    #[error("{}", .detail.as_deref().unwrap_or(GENERIC_FAILURE))]
    Rejected { status: u16, detail: Option<String> },

    /// The request never completed (connection, TLS, timeout).
    #[error("{GENERIC_FAILURE}: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but its body was not what the endpoint promises.
    #[error("unexpected response from service: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Text suitable for showing to the user.
    ///
    /// Transport failures collapse to [`GENERIC_FAILURE`]; the underlying
    /// error is only logged.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { .. } => self.to_string(),
            Self::Transport(_) | Self::Malformed(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

// ============================================================================
// ExportError
// ============================================================================

/// A failure confined to one export attempt.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The artifact could not be interpreted as an image.
    #[error("could not read the generated icon as an image: {0}")]
    Decode(String),

    /// Re-encoding to the target raster format failed.
    #[error("could not encode {format}: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// The second server round-trip for a server-composed format failed.
    #[error("{} download failed", .format.label())]
    RoundTrip {
        format: ServerFormat,
        #[source]
        source: ServiceError,
    },

    /// Writing the downloaded file failed.
    #[error("could not save download: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// PlaygroundError
// ============================================================================

/// Top-level error for every session operation.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Invalid client configuration (bad URL, unreadable env value).
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlaygroundError {
    /// Returns the message to surface to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Returns true for failures caught before any request was dispatched.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
