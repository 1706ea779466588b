//! Local raster re-encoding of a generated artifact.
//!
//! SVG artifacts are rendered with resvg at their own intrinsic size; raster
//! artifacts are decoded with `image`. Either way the result is drawn once
//! at native resolution and encoded to PNG or WebP.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::artifact::GeneratedArtifact;
use crate::error::ExportError;

/// A format the client encodes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    /// Static (single-frame, lossless) WebP.
    Webp,
}

impl RasterFormat {
    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Webp => ImageFormat::WebP,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Decodes and re-encodes an artifact. Decode failures are final.
pub fn rasterize(artifact: &GeneratedArtifact, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
    let image = decode(artifact)?;
    encode(&image, format)
}

/// Draws an artifact into an RGBA buffer at its native size.
pub fn decode(artifact: &GeneratedArtifact) -> Result<RgbaImage, ExportError> {
    if artifact.is_empty() {
        return Err(ExportError::Decode("empty artifact".into()));
    }

    if artifact.is_svg() {
        let svg = std::str::from_utf8(artifact.bytes())
            .map_err(|e| ExportError::Decode(format!("SVG is not UTF-8: {e}")))?;
        return render_svg(svg);
    }

    image::load_from_memory(artifact.bytes())
        .map(|img| img.to_rgba8())
        .map_err(|e| ExportError::Decode(e.to_string()))
}

/// Encodes an RGBA buffer.
pub fn encode(image: &RgbaImage, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format.image_format())
        .map_err(|source| ExportError::Encode {
            format: format.name(),
            source,
        })?;
    Ok(out.into_inner())
}

/// Renders SVG markup at its intrinsic size.
fn render_svg(svg: &str) -> Result<RgbaImage, ExportError> {
    let tree = Tree::from_str(svg, &Options::default())
        .map_err(|e| ExportError::Decode(e.to_string()))?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ExportError::Decode(format!("cannot draw a {width}x{height} image")))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia stores premultiplied alpha
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }

    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
