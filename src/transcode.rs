//! Lead-image transcoding — pure Rust, in memory.
//!
//! Converts an arbitrary supported raster image (JPEG, PNG, WebP) to AVIF at
//! quality 80, preserving the source pixel dimensions. The pipeline mirrors
//! a canvas draw: decode the source bytes, copy them onto a fresh RGBA
//! surface sized to the source, re-encode the surface.
//!
//! Each failure mode is distinct and reported to the caller — nothing is
//! silently defaulted:
//!
//! - [`TranscodeError::Decode`] — unsupported or corrupt input
//! - [`TranscodeError::Surface`] — the pixel surface could not be created
//! - [`TranscodeError::Encode`] — the encoder failed or produced no output
//!
//! No retries happen here; retry policy belongs to the caller.

use image::codecs::avif::AvifEncoder;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Everything encodes to this codec.
pub const TARGET_CONTENT_TYPE: &str = "image/avif";
/// File extension matching [`TARGET_CONTENT_TYPE`].
pub const TARGET_EXTENSION: &str = "avif";
/// Fixed encoding quality (0–100 scale; the contract's 0.8).
const QUALITY: u8 = 80;
/// rav1e speed preset. 6 trades a little size for reasonable throughput.
const SPEED: u8 = 6;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("image decode failed - check file format: {0}")]
    Decode(String),
    #[error("pixel surface unavailable: {0}")]
    Surface(String),
    #[error("AVIF encode failed: {0}")]
    Encode(String),
}

/// An encoded lead image, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

/// Transcode raw image bytes to AVIF at fixed quality.
///
/// One call, one outcome: the encoded image or one of the three error kinds.
pub fn transcode(source: &[u8]) -> Result<EncodedImage, TranscodeError> {
    let decoded =
        image::load_from_memory(source).map_err(|e| TranscodeError::Decode(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    let surface = draw_to_surface(&decoded, width, height)?;

    let mut bytes = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(Cursor::new(&mut bytes), SPEED, QUALITY);
    DynamicImage::ImageRgba8(surface)
        .write_with_encoder(encoder)
        .map_err(|e| TranscodeError::Encode(e.to_string()))?;

    if bytes.is_empty() {
        return Err(TranscodeError::Encode("encoder produced no output".into()));
    }

    Ok(EncodedImage {
        bytes,
        width,
        height,
        content_type: TARGET_CONTENT_TYPE,
    })
}

/// Copy the decoded pixels onto a fresh RGBA surface of the source size.
fn draw_to_surface(
    decoded: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<RgbaImage, TranscodeError> {
    RgbaImage::from_raw(width, height, decoded.to_rgba8().into_raw()).ok_or_else(|| {
        TranscodeError::Surface(format!("cannot allocate {width}x{height} RGBA surface"))
    })
}
