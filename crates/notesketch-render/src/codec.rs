//! Conversion between the raster surface and portable snapshots.
//!
//! Snapshots are PNG data URLs. Decoding also accepts JPEG and WebP, with or
//! without a `data:` header.

use crate::surface::RasterSurface;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};
use notesketch_core::{Snapshot, Stroke};
use std::io::Cursor;
use thiserror::Error;

/// Snapshot codec errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is empty")]
    Empty,
    #[error("Snapshot is not a base64 data URL")]
    NotBase64,
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for codec operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Encode the surface as a PNG.
pub fn encode_png(surface: &RasterSurface) -> SnapshotResult<Vec<u8>> {
    let mut bytes = Vec::new();
    surface
        .pixels()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Encode the surface as a snapshot.
///
/// Returns `None` when nothing is committed: an empty sketch has no
/// snapshot, rather than an encoded blank image.
pub fn encode(surface: &RasterSurface, committed: &[Stroke]) -> SnapshotResult<Option<Snapshot>> {
    if committed.is_empty() {
        return Ok(None);
    }
    let png = encode_png(surface)?;
    Ok(Some(Snapshot::from_png_base64(&STANDARD.encode(png))))
}

/// Decode a snapshot into an RGBA image without touching any surface.
pub fn decode_image(snapshot: &Snapshot) -> SnapshotResult<RgbaImage> {
    let payload = snapshot.base64_payload().ok_or(SnapshotError::NotBase64)?;
    if payload.is_empty() {
        return Err(SnapshotError::Empty);
    }
    let bytes = STANDARD.decode(payload)?;

    let format = image::guess_format(&bytes).map_err(|_| SnapshotError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP) {
        return Err(SnapshotError::UnsupportedFormat);
    }
    Ok(image::load_from_memory_with_format(&bytes, format)?.to_rgba8())
}

/// Decode a snapshot and draw it onto the surface, letterboxed to fit.
///
/// The image becomes the surface's backdrop. On error the surface is left
/// unchanged.
pub fn decode(snapshot: &Snapshot, surface: &mut RasterSurface) -> SnapshotResult<()> {
    let image = decode_image(snapshot)?;
    log::debug!(
        "decoded {}x{} snapshot onto {}x{} surface",
        image.width(),
        image.height(),
        surface.width(),
        surface.height()
    );
    surface.set_backdrop(Some(image));
    Ok(())
}
