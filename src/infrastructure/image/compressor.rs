//! Adaptive JPEG compression for uploads.
//!
//! Images are first scaled so their longer side fits `max_dimension`, then the
//! JPEG quality is bisected over `[0.0, 1.0]` to land near a byte budget.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::errors::CompressError;

/// Upload size budget in bytes.
pub const DEFAULT_TARGET_BYTES: usize = 500 * 1024;

/// Longest allowed side of an uploaded image, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 600;

/// Maximum number of encodes per compression.
pub const MAX_ATTEMPTS: usize = 6;

/// Relative distance from the target that ends the search early.
pub const TOLERANCE: f64 = 0.1;

/// Quality used for copies written to the disk cache.
pub const PERSIST_QUALITY: f32 = 0.9;

const INITIAL_QUALITY: f32 = 0.5;
const PLACEHOLDER_SIZE: u32 = 50;
const PLACEHOLDER_QUALITY: f32 = 0.01;

/// Size and dimension limits for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionTarget {
    /// Byte budget for the encoded image.
    #[serde(default = "default_target_bytes")]
    pub target_bytes: usize,
    /// Longest allowed side in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_target_bytes() -> usize {
    DEFAULT_TARGET_BYTES
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

impl Default for CompressionTarget {
    fn default() -> Self {
        Self {
            target_bytes: DEFAULT_TARGET_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl CompressionTarget {
    /// Compresses an image against this target.
    ///
    /// # Errors
    /// Returns error if the image has no pixels.
    pub fn compress(&self, image: &DynamicImage) -> Result<CompressedImage, CompressError> {
        compress(image, self.target_bytes, self.max_dimension)
    }
}

/// Output of [`compress`].
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Encoded JPEG.
    pub bytes: Vec<u8>,
    /// Quality the bytes were encoded at.
    pub quality: f32,
    /// Number of encodes performed.
    pub attempts: usize,
    /// Width after scaling.
    pub width: u32,
    /// Height after scaling.
    pub height: u32,
}

impl CompressedImage {
    /// Returns true if the size landed within [`TOLERANCE`] of `target_bytes`.
    #[must_use]
    pub fn within_tolerance(&self, target_bytes: usize) -> bool {
        within_tolerance(self.bytes.len(), target_bytes)
    }
}

#[allow(clippy::cast_precision_loss)]
fn within_tolerance(size: usize, target_bytes: usize) -> bool {
    (size as f64 - target_bytes as f64).abs() < target_bytes as f64 * TOLERANCE
}

/// Scales and encodes `image` so the result approaches `target_bytes`.
///
/// Performs at most [`MAX_ATTEMPTS`] encodes and returns the last one when no
/// attempt lands within [`TOLERANCE`] of the target.
///
/// # Errors
/// Returns error if the image has no pixels.
pub fn compress(
    image: &DynamicImage,
    target_bytes: usize,
    max_dimension: u32,
) -> Result<CompressedImage, CompressError> {
    let rgb = fit_within(image, max_dimension).to_rgb8();

    let mut min = 0.0_f32;
    let mut max = 1.0_f32;
    let mut quality = INITIAL_QUALITY;
    let mut attempts = 0;
    let mut encoded_quality = quality;
    let mut bytes = Vec::new();

    while attempts < MAX_ATTEMPTS {
        bytes = encode_rgb(&rgb, quality)?;
        encoded_quality = quality;
        attempts += 1;

        trace!(attempt = attempts, quality, size = bytes.len(), "Compression attempt");

        if within_tolerance(bytes.len(), target_bytes) {
            break;
        }

        if bytes.len() < target_bytes {
            min = quality;
        } else {
            max = quality;
        }
        quality = (min + max) / 2.0;
    }

    debug!(
        size_kb = bytes.len() / 1024,
        quality = encoded_quality,
        attempts,
        width = rgb.width(),
        height = rgb.height(),
        "Compressed image"
    );

    Ok(CompressedImage {
        bytes,
        quality: encoded_quality,
        attempts,
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Scales `image` down so its longer side equals `max_dimension`.
///
/// Images already within bounds are returned unchanged.
#[must_use]
pub fn fit_within(image: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let longer = width.max(height);
    if longer <= max_dimension || max_dimension == 0 {
        return image.clone();
    }

    let scale = f64::from(max_dimension) / f64::from(longer);
    let (new_width, new_height) = if width >= height {
        (max_dimension, scaled_side(height, scale))
    } else {
        (scaled_side(width, scale), max_dimension)
    };

    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_side(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale).round() as u32).max(1)
}

/// Encodes an image as JPEG at `quality` in `[0.0, 1.0]`.
///
/// # Errors
/// Returns error if the image has no pixels.
pub fn encode_jpeg(image: &DynamicImage, quality: f32) -> Result<Vec<u8>, CompressError> {
    encode_rgb(&image.to_rgb8(), quality)
}

/// Returns a small grey JPEG sent when a product has no photo.
///
/// # Errors
/// Returns error if encoding fails.
pub fn placeholder_jpeg() -> Result<Vec<u8>, CompressError> {
    let grey = RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, image::Rgb([128, 128, 128]));
    encode_rgb(&grey, PLACEHOLDER_QUALITY)
}

fn encode_rgb(rgb: &RgbImage, quality: f32) -> Result<Vec<u8>, CompressError> {
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(CompressError::EmptyImage { width, height });
    }

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality));
    encoder
        .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| CompressError::Encode {
            message: e.to_string(),
        })?;

    Ok(out.into_inner())
}

/// Maps `[0.0, 1.0]` onto the encoder's `1..=100` scale.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// Deterministic high-entropy image that does not compress well.
    fn noisy(width: u32, height: u32) -> DynamicImage {
        let buf = ImageBuffer::from_fn(width, height, |x, y| {
            let mut v = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263);
            v = (v ^ (v >> 13)).wrapping_mul(1_274_126_177);
            let [r, g, b, _] = v.to_le_bytes();
            Rgb([r, g, b])
        });
        DynamicImage::ImageRgb8(buf)
    }

    #[test]
    fn test_large_photo_is_scaled_and_bounded() {
        let image = noisy(4000, 3000);

        let out = compress(&image, 500 * 1024, 600).unwrap();

        assert_eq!((out.width, out.height), (600, 450));
        assert!(out.attempts <= MAX_ATTEMPTS);
        assert!(out.attempts == MAX_ATTEMPTS || out.within_tolerance(500 * 1024));

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert!(decoded.width().max(decoded.height()) <= 600);
    }

    #[test]
    fn test_portrait_keeps_aspect_ratio() {
        let fitted = fit_within(&noisy(300, 1200), 600);
        assert_eq!((fitted.width(), fitted.height()), (150, 600));
    }

    #[test]
    fn test_small_image_not_resized() {
        let fitted = fit_within(&noisy(120, 80), 600);
        assert_eq!((fitted.width(), fitted.height()), (120, 80));
    }

    #[test]
    fn test_unreachable_budget_raises_quality_for_six_attempts() {
        let image = DynamicImage::new_rgb8(32, 32);

        let out = compress(&image, 50 * 1024 * 1024, 600).unwrap();

        assert_eq!(out.attempts, MAX_ATTEMPTS);
        assert!((out.quality - 0.984_375).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_budget_lowers_quality_for_six_attempts() {
        let image = noisy(64, 64);

        let out = compress(&image, 1, 600).unwrap();

        assert_eq!(out.attempts, MAX_ATTEMPTS);
        assert!((out.quality - 0.015_625).abs() < 1e-6);
        assert!(!out.bytes.is_empty());
    }

    #[test]
    fn test_stops_early_within_tolerance() {
        let image = noisy(200, 150);
        let target = encode_jpeg(&image, INITIAL_QUALITY).unwrap().len();

        let out = compress(&image, target, 600).unwrap();

        assert_eq!(out.attempts, 1);
        assert!((out.quality - INITIAL_QUALITY).abs() < f32::EPSILON);
        assert!(out.within_tolerance(target));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = DynamicImage::new_rgb8(0, 0);
        assert!(matches!(
            compress(&image, 1000, 600),
            Err(CompressError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_placeholder_decodes() {
        let bytes = placeholder_jpeg().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 50));
    }

    #[test]
    fn test_quality_mapping_is_clamped() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(1.0), 100);
    }
}
