//! File listing and transfer against the hosting service.
//!
//! Everything above this module talks to a [`FileStore`]; the Google Drive
//! and local-directory backends are interchangeable.

pub mod google;
pub mod local;

use crate::config::{AppConfig, StoreKind};
use crate::error::Result;
use serde::Deserialize;

pub use google::GoogleDrive;
pub use local::LocalStore;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Blocking access to a folder-structured file store.
pub trait FileStore {
    /// Non-trashed files in `folder_id` whose content type is an image.
    fn list_images(&self, folder_id: &str) -> Result<Vec<DriveFile>>;

    /// The first non-trashed file called `name` directly inside `folder_id`.
    fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<DriveFile>>;

    fn download(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Creates a file, or overwrites `existing_file_id` in place when given.
    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        parent_folder_id: &str,
        mime_type: &str,
        existing_file_id: Option<&str>,
    ) -> Result<DriveFile>;

    /// Returns the id of the new folder.
    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> Result<String>;
}

/// Opens the backend selected in the configuration.
pub fn open_store(config: &AppConfig) -> Result<Box<dyn FileStore>> {
    match config.store {
        StoreKind::Google => Ok(Box::new(GoogleDrive::new(config)?)),
        StoreKind::Local => Ok(Box::new(LocalStore::new(&config.local_root)?)),
    }
}
