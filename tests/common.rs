#![allow(dead_code)]

use drive_squeeze::drive::{DriveFile, FileStore, LocalStore};
use drive_squeeze::error::{Result, SqueezeError};
use drive_squeeze::notify::{Notification, Notifier};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

pub const CREDENTIALS: &str = "username,password,folder_id\nadmin,secret,photos\nalice,pw,alice\n";

/// A small flat image; encodes to well under a kilobyte at any quality.
pub fn flat_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 140, 200])))
}

/// Deterministic noise, which JPEG compresses badly.
pub fn noisy_image(width: u32, height: u32) -> DynamicImage {
    let mut state: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut channel = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        Rgb([channel(), channel(), channel()])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn write_png(dir: &Path, name: &str, img: &DynamicImage) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), png_bytes(img)).unwrap();
}

/// A local store with the credential table at its root and empty user folders.
pub fn create_drive() -> (TempDir, LocalStore) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.csv"), CREDENTIALS).unwrap();
    fs::create_dir(temp_dir.path().join("photos")).unwrap();
    fs::create_dir(temp_dir.path().join("alice")).unwrap();
    let store = LocalStore::new(temp_dir.path()).unwrap();
    (temp_dir, store)
}

/// Non-hidden subdirectories of `dir`.
pub fn subfolders(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Compressed { file_name: String, uploaded_as: String, quality: u8 },
    Failed { file_name: String, error: String },
    AllFailed(usize),
}

/// Records notifications instead of printing them.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    pub events: Vec<Event>,
}

impl CollectingNotifier {
    pub fn per_file(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !matches!(e, Event::AllFailed(_)))
            .count()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, notification: Notification<'_>) {
        let event = match notification {
            Notification::Compressed {
                file_name,
                uploaded_as,
                quality,
                ..
            } => Event::Compressed {
                file_name: file_name.to_string(),
                uploaded_as: uploaded_as.to_string(),
                quality,
            },
            Notification::Failed { file_name, error } => Event::Failed {
                file_name: file_name.to_string(),
                error: error.to_string(),
            },
            Notification::AllFailed { attempted } => Event::AllFailed(attempted),
        };
        self.events.push(event);
    }
}

/// Wraps a store and fails downloads of one file id or uploads of one name.
pub struct FlakyStore<'a> {
    pub inner: &'a dyn FileStore,
    pub failing_download_id: Option<String>,
    pub failing_upload_name: Option<String>,
}

impl<'a> FlakyStore<'a> {
    pub fn failing_download(inner: &'a dyn FileStore, id: &str) -> Self {
        Self {
            inner,
            failing_download_id: Some(id.to_string()),
            failing_upload_name: None,
        }
    }

    pub fn failing_upload(inner: &'a dyn FileStore, name: &str) -> Self {
        Self {
            inner,
            failing_download_id: None,
            failing_upload_name: Some(name.to_string()),
        }
    }
}

impl FileStore for FlakyStore<'_> {
    fn list_images(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.inner.list_images(folder_id)
    }

    fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<DriveFile>> {
        self.inner.find_file(name, folder_id)
    }

    fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        if self.failing_download_id.as_deref() == Some(file_id) {
            return Err(SqueezeError::TransferFailure(format!(
                "{}: connection reset",
                file_id
            )));
        }
        self.inner.download(file_id)
    }

    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        parent_folder_id: &str,
        mime_type: &str,
        existing_file_id: Option<&str>,
    ) -> Result<DriveFile> {
        if self.failing_upload_name.as_deref() == Some(name) {
            return Err(SqueezeError::TransferFailure(format!(
                "{}: upload rejected",
                name
            )));
        }
        self.inner
            .upload(bytes, name, parent_folder_id, mime_type, existing_file_id)
    }

    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> Result<String> {
        self.inner.create_folder(name, parent_folder_id)
    }
}
