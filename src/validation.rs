use crate::constants::{
    BYTES_PER_KB, MAX_BUDGET_KB, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION, MIN_BUDGET_KB,
    SUPPORTED_IMAGE_EXTENSIONS,
};
use crate::error::{Result, SqueezeError};
use std::path::Path;

/// Validate a budget entered in KB and convert it to bytes.
pub fn budget_bytes(budget_kb: u32) -> Result<u64> {
    if !(MIN_BUDGET_KB..=MAX_BUDGET_KB).contains(&budget_kb) {
        return Err(SqueezeError::InvalidBudget(
            budget_kb,
            MIN_BUDGET_KB,
            MAX_BUDGET_KB,
        ));
    }
    Ok(budget_kb as u64 * BYTES_PER_KB)
}

/// Reject downloaded payloads too large to decode safely.
pub fn validate_source_size(size: u64) -> Result<()> {
    if size > MAX_FILE_SIZE {
        return Err(SqueezeError::FileTooLarge(size, MAX_FILE_SIZE));
    }
    Ok(())
}

pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(SqueezeError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }
    Ok(())
}

/// Check if the file extension indicates it might be an image
pub fn is_potential_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// MIME type for an image path, judged by extension.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_bounds() {
        assert_eq!(budget_bytes(500).unwrap(), 512_000);
        assert_eq!(budget_bytes(50).unwrap(), 51_200);
        assert_eq!(budget_bytes(2048).unwrap(), 2_097_152);
        assert!(matches!(
            budget_bytes(49),
            Err(SqueezeError::InvalidBudget(49, 50, 2048))
        ));
        assert!(matches!(
            budget_bytes(2049),
            Err(SqueezeError::InvalidBudget(2049, 50, 2048))
        ));
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(1920, 1080).is_ok());
        assert!(validate_dimensions(0, 10).is_err());
        assert!(validate_dimensions(20001, 10).is_err());
    }

    #[test]
    fn test_validate_source_size() {
        assert!(validate_source_size(1024).is_ok());
        assert!(matches!(
            validate_source_size(MAX_FILE_SIZE + 1),
            Err(SqueezeError::FileTooLarge(_, _))
        ));
    }

    #[test]
    fn test_is_potential_image_file() {
        assert!(is_potential_image_file(Path::new("test.jpg")));
        assert!(is_potential_image_file(Path::new("test.PNG")));
        assert!(is_potential_image_file(Path::new("test.webp")));
        assert!(!is_potential_image_file(Path::new("users.csv")));
        assert!(!is_potential_image_file(Path::new("test")));
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("a.tif")), Some("image/tiff"));
        assert_eq!(image_mime_type(Path::new("a.txt")), None);
    }
}
