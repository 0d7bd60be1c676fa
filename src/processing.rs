use crate::constants::{MAX_QUALITY, MIN_QUALITY, QUALITY_STEP};
use crate::error::{Result, SqueezeError};
use crate::validation::{validate_dimensions, validate_source_size};
use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::debug;

/// A JPEG that fits the budget it was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub quality: u8,
    pub size: u64,
}

/// Quality levels in the order the budget search tries them: 95, 90, ..., 10.
pub fn quality_levels() -> impl Iterator<Item = u8> {
    (MIN_QUALITY..=MAX_QUALITY)
        .rev()
        .step_by(QUALITY_STEP as usize)
}

/// Decodes a downloaded image, whatever its source format.
///
/// # Security
/// - Rejects payloads above the maximum file size before decoding
/// - Rejects images whose dimensions exceed the maximum allowed
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    validate_source_size(bytes.len() as u64)?;

    let img = image::load_from_memory(bytes)?;

    let (width, height) = img.dimensions();
    validate_dimensions(width, height)?;

    Ok(img)
}

/// Encodes an image as JPEG at a fixed quality with optimized Huffman tables.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    encode_rgb(&img.to_rgb8(), quality)
}

fn encode_rgb(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = rgb.dimensions();
    validate_dimensions(width, height)?;

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(Vec::new())?;
    comp.write_scanlines(rgb.as_raw())?;
    Ok(comp.finish()?)
}

/// Finds the highest quality whose encoding fits within `budget` bytes.
///
/// Qualities are tried strictly in the order of [`quality_levels`] and the
/// first one that fits is accepted, even if a lower quality would have been
/// larger. When nothing fits, the smallest size seen is reported with the
/// error and no artifact is produced.
///
/// # Example
/// ```
/// use image::DynamicImage;
/// use drive_squeeze::processing::compress_to_budget;
///
/// let img = DynamicImage::new_rgb8(64, 64);
/// let artifact = compress_to_budget(&img, 512 * 1024).unwrap();
/// assert_eq!(artifact.quality, 95);
/// assert!(artifact.size <= 512 * 1024);
/// ```
pub fn compress_to_budget(img: &DynamicImage, budget: u64) -> Result<EncodedArtifact> {
    let rgb = img.to_rgb8();
    let mut smallest = u64::MAX;

    for quality in quality_levels() {
        let bytes = encode_rgb(&rgb, quality)?;
        let size = bytes.len() as u64;
        debug!(quality, size, budget, "encoded candidate");

        if size <= budget {
            return Ok(EncodedArtifact {
                bytes,
                quality,
                size,
            });
        }
        smallest = smallest.min(size);
    }

    Err(SqueezeError::CompressionBudgetUnreachable { budget, smallest })
}
