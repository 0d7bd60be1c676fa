pub mod auth;
pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod drive;
pub mod enhance;
pub mod error;
pub mod logger;
pub mod notify;
pub mod processing;
pub mod session;
pub mod utils;
pub mod validation;

pub use auth::{AuthGate, CredentialCache, CredentialRecord, SessionContext};
pub use batch::{compress_batch, run_batch, BatchReport};
pub use config::{AppConfig, StoreKind};
pub use drive::{open_store, DriveFile, FileStore, GoogleDrive, LocalStore};
pub use enhance::{enhance_image, Enhancement};
pub use error::{Result, SqueezeError};
pub use notify::{ConsoleNotifier, Notification, Notifier};
pub use processing::{compress_to_budget, encode_jpeg, EncodedArtifact};
