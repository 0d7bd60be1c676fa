/// Highest JPEG quality tried by the budget search.
pub const MAX_QUALITY: u8 = 95;
/// Lowest JPEG quality tried; the search stops below this.
pub const MIN_QUALITY: u8 = 10;
pub const QUALITY_STEP: u8 = 5;

pub const DEFAULT_BUDGET_KB: u32 = 500;
pub const MIN_BUDGET_KB: u32 = 50;
pub const MAX_BUDGET_KB: u32 = 2048;
pub const BYTES_PER_KB: u64 = 1024;

pub const BRIGHTNESS_FACTOR: f32 = 1.2;
pub const COLOR_FACTOR: f32 = 1.3;
pub const CONTRAST_FACTOR: f32 = 1.2;
pub const SHARPNESS_FACTOR: f32 = 1.1;

/// Source files above this size are rejected before decoding (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 20000;

pub const COMPRESSED_PREFIX: &str = "compressed_";
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DESTINATION_FOLDER_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub const DEFAULT_CREDENTIAL_TABLE: &str = "users.csv";
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_CONFIG_FILE: &str = "drive-squeeze.toml";
pub const ENV_PREFIX: &str = "DRIVE_SQUEEZE";

pub const DEFAULT_DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif"];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const SIZE_PREFIX: &str = "📊";
pub const FOLDER_PREFIX: &str = "📁";
