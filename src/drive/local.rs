use super::{DriveFile, FileStore};
use crate::constants::FOLDER_MIME_TYPE;
use crate::error::{Result, SqueezeError};
use crate::validation::{image_mime_type, is_potential_image_file};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A directory tree standing in for the hosting service.
///
/// Ids are `/`-separated paths relative to the root; `""` and `"root"` both
/// name the root folder. Entries whose name starts with `.` are treated as
/// trashed and never listed or found.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &str) -> Result<PathBuf> {
        let id = if id == "root" { "" } else { id };
        let relative = Path::new(id);
        // only plain components; no `..`, no absolute paths
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(SqueezeError::FileNotFound(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn id_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn describe(&self, path: &Path) -> DriveFile {
        let mime_type = if path.is_dir() {
            FOLDER_MIME_TYPE
        } else {
            image_mime_type(path).unwrap_or("application/octet-stream")
        };
        let parents = path
            .parent()
            .map(|parent| vec![self.id_for(parent)])
            .unwrap_or_default();

        DriveFile {
            id: self.id_for(path),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: mime_type.to_string(),
            parents,
        }
    }

    fn existing_dir(&self, id: &str) -> Result<PathBuf> {
        let dir = self.resolve(id)?;
        if !dir.is_dir() {
            return Err(SqueezeError::FileNotFound(id.to_string()));
        }
        Ok(dir)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(SqueezeError::TransferFailure(format!(
            "invalid file name: {:?}",
            name
        )));
    }
    Ok(())
}

fn transfer_error(id: &str, err: std::io::Error) -> SqueezeError {
    SqueezeError::TransferFailure(format!("{}: {}", id, err))
}

impl FileStore for LocalStore {
    fn list_images(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let dir = self.existing_dir(folder_id)?;
        let mut files = Vec::new();

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| SqueezeError::TransferFailure(e.to_string()))?;
            if entry.file_type().is_file() && is_potential_image_file(entry.path()) {
                files.push(self.describe(entry.path()));
            }
        }

        Ok(files)
    }

    fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<DriveFile>> {
        if validate_name(name).is_err() {
            return Ok(None);
        }
        let path = self.existing_dir(folder_id)?.join(name);
        if path.is_file() {
            Ok(Some(self.describe(&path)))
        } else {
            Ok(None)
        }
    }

    fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let path = self.resolve(file_id)?;
        fs::read(&path).map_err(|e| transfer_error(file_id, e))
    }

    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        parent_folder_id: &str,
        _mime_type: &str,
        existing_file_id: Option<&str>,
    ) -> Result<DriveFile> {
        let path = match existing_file_id {
            Some(id) => {
                let path = self.resolve(id)?;
                if !path.is_file() {
                    return Err(SqueezeError::FileNotFound(id.to_string()));
                }
                path
            }
            None => {
                validate_name(name)?;
                self.existing_dir(parent_folder_id)?.join(name)
            }
        };

        fs::write(&path, bytes).map_err(|e| transfer_error(name, e))?;
        Ok(self.describe(&path))
    }

    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> Result<String> {
        validate_name(name)?;
        let path = self.existing_dir(parent_folder_id.unwrap_or(""))?.join(name);
        // a second folder with the same name in the same second lands in the same directory
        fs::create_dir_all(&path).map_err(|e| transfer_error(name, e))?;
        Ok(self.id_for(&path))
    }
}
