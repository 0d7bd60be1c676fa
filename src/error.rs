use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("Credential table '{table}' not found in folder '{folder_id}'")]
    CredentialTableMissing { table: String, folder_id: String },

    #[error("Username or password is incorrect")]
    AuthenticationMismatch,

    #[error("Cannot compress under {budget} bytes (smallest result: {smallest} bytes)")]
    CompressionBudgetUnreachable { budget: u64, smallest: u64 },

    #[error("Transfer failed: {0}")]
    TransferFailure(String),

    #[error("All {0} files in the batch failed")]
    EmptyBatchResult(usize),

    #[error("Credential table is malformed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid budget: {0} KB. Must be between {1} and {2} KB")]
    InvalidBudget(u32, u32, u32),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unknown file: {0}")]
    FileNotFound(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Async runtime error: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for SqueezeError {
    fn from(err: reqwest::Error) -> Self {
        SqueezeError::TransferFailure(err.to_string())
    }
}

impl SqueezeError {
    /// Only a missing credential table ends the session; everything else is
    /// reported and the user may carry on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SqueezeError::CredentialTableMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, SqueezeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_table_is_fatal() {
        let missing = SqueezeError::CredentialTableMissing {
            table: "users.csv".to_string(),
            folder_id: "root".to_string(),
        };
        assert!(missing.is_fatal());
        assert!(!SqueezeError::AuthenticationMismatch.is_fatal());
        assert!(!SqueezeError::TransferFailure("timeout".to_string()).is_fatal());
        assert!(!SqueezeError::CompressionBudgetUnreachable {
            budget: 10,
            smallest: 20
        }
        .is_fatal());
    }

    #[test]
    fn test_budget_unreachable_message() {
        let err = SqueezeError::CompressionBudgetUnreachable {
            budget: 512000,
            smallest: 819200,
        };
        let msg = err.to_string();
        assert!(msg.contains("512000"));
        assert!(msg.contains("819200"));
    }
}
