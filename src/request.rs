//! Translation of an input source plus visual settings into the multipart
//! field set the generation service accepts.
//!
//! [`build_request`] is the only place payloads are assembled. The preview
//! generation and both server-composed exports (ICO, animated WebP) all go
//! through it, so the inclusion rules cannot drift between call sites.

use std::fmt;

use reqwest::multipart::{Form, Part};

use crate::error::ValidationError;
use crate::source::{InputSource, UploadedFile};
use crate::visual::{GradientDirection, NEUTRAL_SCALE, Paint, VisualConfig};

// ============================================================================
// Targets
// ============================================================================

/// An output format that only the service can compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerFormat {
    Ico,
    Webp,
}

impl ServerFormat {
    /// Value of the `format` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ico => "ico",
            Self::Webp => "webp",
        }
    }

    /// Upper-case name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ico => "ICO",
            Self::Webp => "WEBP",
        }
    }
}

impl fmt::Display for ServerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a payload is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestTarget {
    /// The primary generation call. Never carries `format`.
    #[default]
    Preview,
    /// A second round-trip for a format the client cannot produce itself.
    Export(ServerFormat),
}

impl RequestTarget {
    fn format(&self) -> Option<ServerFormat> {
        match self {
            Self::Preview => None,
            Self::Export(format) => Some(*format),
        }
    }
}

// ============================================================================
// RequestPayload
// ============================================================================

/// The single input field of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadInput {
    IconName(String),
    DirectUrl(String),
    File(UploadedFile),
}

impl PayloadInput {
    /// Multipart field name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::IconName(_) => "icon_name",
            Self::DirectUrl(_) => "direct_url",
            Self::File(_) => "file",
        }
    }
}

/// The field set of one generation request.
///
/// `None` fields are left out of the request entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload {
    pub input: PayloadInput,
    pub size: u32,
    pub scale: Option<f32>,
    pub color: Option<String>,
    pub direction: Option<GradientDirection>,
    pub bg_color: Option<String>,
    pub bg_direction: Option<GradientDirection>,
    pub border_radius: Option<u32>,
    pub outline_width: Option<u32>,
    pub outline_color: Option<String>,
    pub animation: Option<String>,
    pub format: Option<ServerFormat>,
}

impl RequestPayload {
    /// Text fields in wire order. The uploaded file, if any, is not included.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        match &self.input {
            PayloadInput::IconName(name) => fields.push(("icon_name", name.clone())),
            PayloadInput::DirectUrl(url) => fields.push(("direct_url", url.clone())),
            PayloadInput::File(_) => {}
        }

        fields.push(("size", self.size.to_string()));

        let optional = [
            ("scale", self.scale.map(|s| s.to_string())),
            ("color", self.color.clone()),
            ("direction", self.direction.map(|d| d.as_str().to_string())),
            ("bg_color", self.bg_color.clone()),
            ("bg_direction", self.bg_direction.map(|d| d.as_str().to_string())),
            ("border_radius", self.border_radius.map(|r| r.to_string())),
            ("outline_width", self.outline_width.map(|w| w.to_string())),
            ("outline_color", self.outline_color.clone()),
            ("animation", self.animation.clone()),
            ("format", self.format.map(|f| f.as_str().to_string())),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );

        fields
    }

    /// Every key present in the payload, the file field included.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.text_fields().into_iter().map(|(k, _)| k).collect();
        if let PayloadInput::File(_) = self.input {
            keys.insert(0, "file");
        }
        keys
    }

    /// Returns the text value of a field.
    pub fn get(&self, key: &str) -> Option<String> {
        self.text_fields()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.keys().contains(&key)
    }

    /// Converts the payload into a multipart form body.
    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (key, value) in self.text_fields() {
            form = form.text(key, value);
        }

        if let PayloadInput::File(file) = self.input {
            let part = Part::bytes(file.bytes().to_vec())
                .file_name(file.file_name().to_string())
                .mime_str(file.mime())?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds the payload for `target`.
///
/// Fails with [`ValidationError::MissingInput`] when the Iconify reference or
/// URL is blank, and with [`ValidationError::JpegRecolor`] when the input is a JPEG and
/// the settings ask for a non-default icon color. Nothing is dispatched in
/// that case.
pub fn build_request(
    source: &InputSource,
    config: &VisualConfig,
    target: RequestTarget,
) -> Result<RequestPayload, ValidationError> {
    let input = match source {
        InputSource::Iconify { reference } => PayloadInput::IconName(required(reference)?),
        InputSource::DirectUrl { url } => PayloadInput::DirectUrl(required(url)?),
        InputSource::UploadedFile(file) => PayloadInput::File(file.clone()),
    };

    let jpeg = source.is_jpeg();
    if jpeg && config.recolors_icon() {
        return Err(ValidationError::JpegRecolor);
    }

    let scale = config.scale();
    let scale = ((scale - NEUTRAL_SCALE).abs() > f32::EPSILON).then_some(scale);

    let (color, direction) = if jpeg {
        (None, None)
    } else {
        paint_fields(config.icon_color().paint())
    };
    let (bg_color, bg_direction) = paint_fields(config.background().paint());

    let border_radius = Some(config.border_radius()).filter(|r| *r > 0);
    let outline_width = Some(config.outline_width()).filter(|w| *w > 0);
    let outline_color = config.effective_outline_color().map(str::to_string);

    Ok(RequestPayload {
        input,
        size: config.size(),
        scale,
        color,
        direction,
        bg_color,
        bg_direction,
        border_radius,
        outline_width,
        outline_color,
        animation: config.animation().encode(),
        format: target.format(),
    })
}

fn required(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingInput);
    }
    Ok(value.to_string())
}

fn paint_fields(paint: Option<Paint<'_>>) -> (Option<String>, Option<GradientDirection>) {
    match paint {
        Some(Paint::Gradient(gradient)) => (Some(gradient.encode()), Some(gradient.direction)),
        Some(Paint::Solid(value)) => (Some(value.to_string()), None),
        None => (None, None),
    }
}

// ============================================================================
// Tests
// ============================================================================
