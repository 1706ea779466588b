//! The image returned by the generation service.

use std::sync::Arc;

/// A generated icon as raw bytes plus the content type the service reported.
///
/// The bytes are shared, so cloning an artifact never copies the image. A
/// session replaces its artifact wholesale after each successful
/// generation; artifacts are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    bytes: Arc<[u8]>,
    content_type: Option<String>,
}

impl GeneratedArtifact {
    /// Wraps a response body.
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            content_type: content_type.map(|c| c.trim().to_ascii_lowercase()),
        }
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty body.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type from the response headers, lowercased.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns true if the artifact is SVG markup.
    ///
    /// Trusts an `image/svg+xml` content type, otherwise sniffs the start of
    /// the body for an `<svg` or XML prolog.
    pub fn is_svg(&self) -> bool {
        if let Some(ct) = self.content_type() {
            if ct.starts_with("image/svg+xml") {
                return true;
            }
            if ct.starts_with("image/") {
                return false;
            }
        }
        let head = &self.bytes[..self.bytes.len().min(512)];
        let head = String::from_utf8_lossy(head);
        let head = head.trim_start_matches('\u{feff}').trim_start();
        head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
    }

    /// The artifact as SVG text, when it is UTF-8 SVG.
    pub fn svg_text(&self) -> Option<&str> {
        if !self.is_svg() {
            return None;
        }
        std::str::from_utf8(&self.bytes).ok()
    }
}
