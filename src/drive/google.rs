use super::{DriveFile, FileStore};
use crate::config::AppConfig;
use crate::constants::FOLDER_MIME_TYPE;
use crate::error::{Result, SqueezeError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Runtime;
use tracing::debug;

const FILE_FIELDS: &str = "id,name,mimeType,parents";
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Google Drive v3 over REST, authorised with a bearer access token.
///
/// Requests are issued on an owned single-threaded runtime so callers see a
/// plain blocking API.
pub struct GoogleDrive {
    client: Client,
    runtime: Runtime,
    api_base_url: String,
    upload_base_url: String,
    access_token: String,
}

impl GoogleDrive {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SqueezeError::Config(config::ConfigError::NotFound("access_token".to_string()))
            })?
            .to_string();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqueezeError::Runtime(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            runtime,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Runs a `files.list` query, following `nextPageToken` until the last page.
    async fn query_files(&self, query: &str) -> Result<Vec<DriveFile>> {
        let fields = format!("nextPageToken,files({})", FILE_FIELDS);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/files", self.api_base_url))
                .bearer_auth(&self.access_token)
                .query(&[
                    ("q", query),
                    ("fields", fields.as_str()),
                    ("pageSize", PAGE_SIZE),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let page: FileList = ensure_success(response).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = files.len(), "listed files");
        Ok(files)
    }

    async fn download_async(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base_url, file_id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn create_metadata(
        &self,
        name: &str,
        mime_type: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<DriveFile> {
        let mut metadata = json!({ "name": name, "mimeType": mime_type });
        if let Some(parent) = parent_folder_id {
            metadata["parents"] = json!([parent]);
        }

        let response = self
            .client
            .post(format!("{}/files", self.api_base_url))
            .bearer_auth(&self.access_token)
            .query(&[("fields", FILE_FIELDS)])
            .json(&metadata)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn upload_async(
        &self,
        bytes: &[u8],
        name: &str,
        parent_folder_id: &str,
        mime_type: &str,
        existing_file_id: Option<&str>,
    ) -> Result<DriveFile> {
        let file_id = match existing_file_id {
            Some(id) => id.to_string(),
            None => {
                self.create_metadata(name, mime_type, Some(parent_folder_id))
                    .await?
                    .id
            }
        };
        debug!(file_id = %file_id, size = bytes.len(), "uploading media");

        let response = self
            .client
            .patch(format!("{}/files/{}", self.upload_base_url, file_id))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
            .header(CONTENT_TYPE, mime_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

impl FileStore for GoogleDrive {
    fn list_images(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.runtime.block_on(self.query_files(&images_query(folder_id)))
    }

    fn find_file(&self, name: &str, folder_id: &str) -> Result<Option<DriveFile>> {
        let files = self
            .runtime
            .block_on(self.query_files(&name_query(name, folder_id)))?;
        Ok(files.into_iter().next())
    }

    fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        self.runtime.block_on(self.download_async(file_id))
    }

    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        parent_folder_id: &str,
        mime_type: &str,
        existing_file_id: Option<&str>,
    ) -> Result<DriveFile> {
        self.runtime.block_on(self.upload_async(
            bytes,
            name,
            parent_folder_id,
            mime_type,
            existing_file_id,
        ))
    }

    fn create_folder(&self, name: &str, parent_folder_id: Option<&str>) -> Result<String> {
        let folder = self
            .runtime
            .block_on(self.create_metadata(name, FOLDER_MIME_TYPE, parent_folder_id))?;
        Ok(folder.id)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SqueezeError::TransferFailure(format!(
        "HTTP {}: {}",
        status,
        body.trim()
    )))
}

/// Escapes a value for use inside a single-quoted Drive query literal.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn images_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType contains 'image/' and trashed = false",
        escape_query_value(folder_id)
    )
}

pub fn name_query(name: &str, folder_id: &str) -> String {
    format!(
        "name = '{}' and '{}' in parents and trashed = false",
        escape_query_value(name),
        escape_query_value(folder_id)
    )
}
