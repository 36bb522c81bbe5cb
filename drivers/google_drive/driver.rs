//! Google Drive driver
//!
//! OAuth refresh_token authorization with lazy access-token refresh,
//! paginated listing, and resumable chunked upload so large transfers
//! never hold more than one chunk in memory.

use async_trait::async_trait;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;
use tokio_util::io::StreamReader;

use crate::storage::{Entry, StorageDriver};
use crate::utils::fix_and_clean_path;

use super::util;

// ============ Configuration ============

/// Google Drive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleDriveConfig {
    /// OAuth 2.0 client ID
    pub client_id: String,
    /// OAuth 2.0 client secret
    pub client_secret: String,
    /// Refresh token obtained through OAuth authorization
    pub refresh_token: String,
    /// Root directory ID (defaults to "root")
    #[serde(default = "default_root_id")]
    pub root_id: String,
    /// Upload chunk size (MB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
}

fn default_root_id() -> String {
    "root".to_string()
}
fn default_chunk_size() -> u64 {
    5
}

// ============ API response structures ============

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FilesResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    files: Vec<GoogleFile>,
}

#[derive(Debug, Deserialize)]
struct GoogleFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "modifiedTime")]
    modified_time: Option<DateTime<Utc>>,
    size: Option<String>,
    #[serde(rename = "webContentLink")]
    web_content_link: Option<String>,
    #[serde(rename = "shortcutDetails")]
    shortcut_details: Option<ShortcutDetails>,
}

#[derive(Debug, Deserialize)]
struct ShortcutDetails {
    #[serde(rename = "targetId")]
    target_id: String,
    #[serde(rename = "targetMimeType")]
    target_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrivesResponse {
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    drives: Vec<SharedDrive>,
}

/// One shared drive, from the provider's `drives` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedDrive {
    pub id: String,
    pub name: String,
}

// ============ Constants ============

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const SHORTCUT_MIME: &str = "application/vnd.google-apps.shortcut";

const FILES_LIST_FIELDS: &str =
    "files(id,name,mimeType,size,modifiedTime,webContentLink,shortcutDetails),nextPageToken";
const FILE_INFO_FIELDS: &str = "id,name,mimeType,size,modifiedTime,webContentLink";
const DRIVES_LIST_FIELDS: &str = "drives(id,name),nextPageToken";

// ============ Driver ============

/// Google Drive driver
pub struct GoogleDriveDriver {
    config: GoogleDriveConfig,
    client: Client,
    access_token: RwLock<Option<String>>,
}

impl GoogleDriveDriver {
    pub fn new(config: GoogleDriveConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            access_token: RwLock::new(None),
        }
    }

    /// Get a cached access token, refreshing on first use
    async fn get_access_token(&self) -> Result<String> {
        {
            let token = self.access_token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }
        self.do_refresh_token().await
    }

    /// Exchange the refresh token for a new access token
    async fn do_refresh_token(&self) -> Result<String> {
        if self.config.client_id.is_empty() || self.config.client_secret.is_empty() {
            return Err(anyhow!("client_id or client_secret not configured"));
        }

        let mut params = HashMap::new();
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("client_secret", self.config.client_secret.as_str());
        params.insert("refresh_token", self.config.refresh_token.as_str());
        params.insert("grant_type", "refresh_token");

        let response = self.client.post(TOKEN_URL).form(&params).send().await?;

        if response.status().is_success() {
            let token_resp: TokenResponse = response.json().await?;
            {
                let mut at = self.access_token.write().await;
                *at = Some(token_resp.access_token.clone());
            }
            Ok(token_resp.access_token)
        } else {
            let error: TokenError = response.json().await.unwrap_or_else(|_| TokenError {
                error: "unknown".to_string(),
                error_description: None,
            });
            Err(anyhow!(
                "Token refresh failed: {}",
                error.error_description.unwrap_or(error.error)
            ))
        }
    }

    /// Issue an API request, refreshing the token once on a 401
    async fn request(
        &self,
        url: &str,
        method: reqwest::Method,
        body: Option<Value>,
    ) -> Result<reqwest::Response> {
        let token = self.get_access_token().await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {}", token))
            .query(&[("supportsAllDrives", "true")]);

        if let Some(ref b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;

        if response.status() == 401 {
            {
                let mut at = self.access_token.write().await;
                *at = None;
            }
            let new_token = self.do_refresh_token().await?;

            let mut request = self
                .client
                .request(method, url)
                .header("Authorization", format!("Bearer {}", new_token))
                .query(&[("supportsAllDrives", "true")]);

            if let Some(b) = body {
                request = request.json(&b);
            }

            return Ok(request.send().await?);
        }

        Ok(response)
    }

    /// Decode the provider's error envelope into a readable message
    async fn api_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        match response.json::<ApiError>().await {
            Ok(error) => anyhow!("API error: {}", error.error.message),
            Err(_) => anyhow!("API error: HTTP {}", status),
        }
    }

    /// Fetch one page-walked directory listing
    async fn get_files(&self, parent_id: &str) -> Result<Vec<GoogleFile>> {
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let q = format!("'{}' in parents and trashed=false", parent_id);
            let mut url = format!(
                "{}/files?q={}&fields={}&orderBy={}&pageSize=1000&includeItemsFromAllDrives=true",
                API_BASE,
                urlencoding::encode(&q),
                urlencoding::encode(FILES_LIST_FIELDS),
                urlencoding::encode("folder,name"),
            );

            if let Some(ref token) = page_token {
                url = format!("{}&pageToken={}", url, token);
            }

            let response = self.request(&url, reqwest::Method::GET, None).await?;
            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }

            let files_resp: FilesResponse = response.json().await?;
            all_files.extend(files_resp.files);

            page_token = files_resp.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(all_files)
    }

    /// Fetch a single file's descriptor
    async fn get_file(&self, file_id: &str) -> Result<GoogleFile> {
        let url = format!(
            "{}/files/{}?fields={}",
            API_BASE,
            file_id,
            urlencoding::encode(FILE_INFO_FIELDS)
        );

        let response = self.request(&url, reqwest::Method::GET, None).await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.json().await?)
    }

    fn file_to_entry(&self, file: GoogleFile, parent_spec: &str) -> Entry {
        // Shortcuts resolve to their target
        let (id, mime_type) = if file.mime_type == SHORTCUT_MIME {
            match file.shortcut_details {
                Some(details) => (
                    details.target_id,
                    details.target_mime_type.unwrap_or(file.mime_type),
                ),
                None => (file.id, file.mime_type),
            }
        } else {
            (file.id, file.mime_type)
        };

        let is_dir = mime_type == FOLDER_MIME;
        let size = file.size.and_then(|s| s.parse().ok()).unwrap_or(0);

        // Display name falls back to the identifier when absent
        let name = if file.name.is_empty() {
            id.clone()
        } else {
            file.name
        };

        Entry {
            path: util::join_entry_path(parent_spec, &id),
            name,
            is_dir,
            size,
            mime_type: (!is_dir).then_some(mime_type),
            modified: if is_dir { None } else { file.modified_time },
        }
    }

    async fn delete_by_id(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}", API_BASE, file_id);
        let response = self.request(&url, reqwest::Method::DELETE, None).await?;

        if response.status().is_success() || response.status() == 204 {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Create a resumable upload session, returning the session URL
    async fn create_upload_session(
        &self,
        parent_id: &str,
        name: &str,
        size_hint: Option<u64>,
    ) -> Result<String> {
        let url = format!(
            "{}/files?uploadType=resumable&supportsAllDrives=true",
            UPLOAD_BASE
        );
        let token = self.get_access_token().await?;

        let metadata = json!({
            "name": name,
            "parents": [parent_id]
        });

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("X-Upload-Content-Type", "application/octet-stream")
            .json(&metadata);

        if let Some(size) = size_hint {
            request = request.header("X-Upload-Content-Length", size.to_string());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        response
            .headers()
            .get("location")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Upload session returned no location URL"))
    }
}

// ============ StorageDriver implementation ============

#[async_trait]
impl StorageDriver for GoogleDriveDriver {
    fn name(&self) -> &str {
        "google_drive"
    }

    async fn list(&self, path: &str, recursive: bool) -> Result<Vec<Entry>> {
        let normalized = fix_and_clean_path(path);
        let parent_spec = normalized.trim_matches('/').to_string();
        let parent_id = util::leaf_id(&normalized, &self.config.root_id).to_string();

        let mut out = Vec::new();
        let mut stack = vec![(parent_spec, parent_id)];

        while let Some((spec, id)) = stack.pop() {
            let files = self.get_files(&id).await?;
            for file in files {
                let entry = self.file_to_entry(file, &spec);
                if recursive && entry.is_dir {
                    let child_id = util::leaf_id(&entry.path, &self.config.root_id).to_string();
                    stack.push((entry.path.clone(), child_id));
                }
                out.push(entry);
            }
        }

        Ok(out)
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let file_id = util::leaf_id(path, &self.config.root_id);
        let url = format!(
            "{}/files/{}?alt=media&acknowledgeAbuse=true",
            API_BASE, file_id
        );

        let response = self.request(&url, reqwest::Method::GET, None).await?;
        if !response.status().is_success() {
            return Err(anyhow!("Download failed: HTTP {}", response.status()));
        }

        Ok(response.bytes().await?)
    }

    async fn open_reader(&self, path: &str) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
        let file_id = util::leaf_id(path, &self.config.root_id);
        let url = format!(
            "{}/files/{}?alt=media&acknowledgeAbuse=true",
            API_BASE, file_id
        );

        let response = self.request(&url, reqwest::Method::GET, None).await?;
        if !response.status().is_success() {
            return Err(anyhow!("Download failed: HTTP {}", response.status()));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .boxed();
        Ok(Box::new(StreamReader::new(stream)))
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let normalized = fix_and_clean_path(path);
        let (parent_id, name) = util::split_create_path(&normalized, &self.config.root_id)?;
        let token = self.get_access_token().await?;

        let metadata = json!({
            "name": name,
            "parents": [parent_id]
        });
        let content_type = mime_guess::from_path(name).first_or_octet_stream();

        // multipart/related: metadata part + content part
        let boundary = "gdrive_demo_boundary";
        let mut body = Vec::with_capacity(data.len() + 512);
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}--", boundary).as_bytes());

        let url = format!(
            "{}/files?uploadType=multipart&supportsAllDrives=true",
            UPLOAD_BASE
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn put_stream(
        &self,
        path: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send>,
        size_hint: Option<u64>,
    ) -> Result<()> {
        let normalized = fix_and_clean_path(path);
        let (parent_id, name) = util::split_create_path(&normalized, &self.config.root_id)?;

        let upload_url = self
            .create_upload_session(parent_id, name, size_hint)
            .await?;

        let chunk_size = (self.config.chunk_size.max(1) * 1024 * 1024) as usize;
        let mut buf = vec![0u8; chunk_size];
        let mut uploaded: u64 = 0;

        loop {
            // Fill one chunk; a short read only means EOF
            let mut filled = 0;
            while filled < chunk_size {
                let n = reader.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            let is_last = filled < chunk_size;
            let end = uploaded + filled as u64;

            let content_range = if is_last {
                if filled == 0 {
                    // The previous chunk was the end of the stream (or the
                    // stream was empty); finalize with the known total
                    format!("bytes */{}", uploaded)
                } else {
                    format!("bytes {}-{}/{}", uploaded, end - 1, end)
                }
            } else {
                let total = size_hint
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "*".to_string());
                format!("bytes {}-{}/{}", uploaded, end - 1, total)
            };

            let response = self
                .client
                .put(&upload_url)
                .header("Content-Range", &content_range)
                .header("Content-Length", filled.to_string())
                .body(buf[..filled].to_vec())
                .send()
                .await?;

            let status = response.status();
            // 308 Resume Incomplete, or 200/201 once the upload is complete
            if !status.is_success() && status.as_u16() != 308 {
                let text = response.text().await.unwrap_or_default();
                return Err(anyhow!("Chunk upload failed: HTTP {} - {}", status, text));
            }

            uploaded = end;
            tracing::debug!(
                "Google Drive chunk uploaded: range={}, total={}",
                content_range,
                uploaded
            );

            if is_last || status.is_success() {
                break;
            }
        }

        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let normalized = fix_and_clean_path(path);
        let (parent_id, name) = util::split_create_path(&normalized, &self.config.root_id)?;

        let body = json!({
            "name": name,
            "parents": [parent_id],
            "mimeType": FOLDER_MIME
        });

        let url = format!("{}/files", API_BASE);
        let response = self.request(&url, reqwest::Method::POST, Some(body)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let file_id = util::leaf_id(path, &self.config.root_id);
        self.delete_by_id(file_id).await
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        // Drive removes a folder and its contents in one call
        let folder_id = util::leaf_id(path, &self.config.root_id);
        self.delete_by_id(folder_id).await
    }

    async fn move_item(&self, from: &str, to: &str) -> Result<()> {
        let file_id = util::leaf_id(from, &self.config.root_id);
        let from_parent = util::parent_id(from, &self.config.root_id);

        let normalized_to = fix_and_clean_path(to);
        let (to_parent, new_name) = util::split_create_path(&normalized_to, &self.config.root_id)?;

        let url = if to_parent != from_parent {
            format!(
                "{}/files/{}?addParents={}&removeParents={}",
                API_BASE, file_id, to_parent, from_parent
            )
        } else {
            format!("{}/files/{}", API_BASE, file_id)
        };

        let body = json!({ "name": new_name });
        let response = self.request(&url, reqwest::Method::PATCH, Some(body)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn metadata(&self, path: &str) -> Result<Entry> {
        let normalized = fix_and_clean_path(path);
        let file_id = util::leaf_id(&normalized, &self.config.root_id);
        let file = self.get_file(file_id).await?;

        let parent_spec = match normalized.trim_matches('/').rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => String::new(),
        };

        Ok(self.file_to_entry(file, &parent_spec))
    }

    async fn url(&self, path: &str) -> Result<String> {
        let file_id = util::leaf_id(path, &self.config.root_id);
        let file = self.get_file(file_id).await?;

        if let Some(link) = file.web_content_link {
            return Ok(link);
        }

        // Files without a content link still resolve through the uc endpoint
        let link = url::Url::parse_with_params(
            "https://drive.google.com/uc",
            &[("id", file_id), ("export", "download")],
        )?;
        Ok(link.to_string())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// ============ Provider-specific operations ============
//
// These sit outside the StorageDriver abstraction; handlers reach them
// through `as_any()` the way the original reached the SDK service object.

impl GoogleDriveDriver {
    /// Grant a permission on a file. `role`/`permission_type` follow the
    /// Drive permission resource ("reader"/"anyone" makes a file
    /// link-readable without being discoverable).
    pub async fn create_permission(
        &self,
        file_id: &str,
        role: &str,
        permission_type: &str,
        allow_file_discovery: bool,
    ) -> Result<()> {
        let url = format!("{}/files/{}/permissions", API_BASE, file_id);

        let body = json!({
            "role": role,
            "type": permission_type,
            "allowFileDiscovery": allow_file_discovery
        });

        let response = self.request(&url, reqwest::Method::POST, Some(body)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Enumerate top-level shared drives
    pub async fn list_shared_drives(&self) -> Result<Vec<SharedDrive>> {
        let mut all_drives = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/drives?pageSize=100&fields={}",
                API_BASE,
                urlencoding::encode(DRIVES_LIST_FIELDS)
            );
            if let Some(ref token) = page_token {
                url = format!("{}&pageToken={}", url, token);
            }

            let response = self.request(&url, reqwest::Method::GET, None).await?;
            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }

            let drives_resp: DrivesResponse = response.json().await?;
            all_drives.extend(drives_resp.drives);

            page_token = drives_resp.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(all_drives)
    }

    /// Convert a Drive-native document to the target MIME type, returning
    /// the converted bytes as a stream
    pub async fn export(
        &self,
        file_id: &str,
        mime_type: &str,
    ) -> Result<BoxStream<'static, std::io::Result<Bytes>>> {
        let url = format!(
            "{}/files/{}/export?mimeType={}",
            API_BASE,
            file_id,
            urlencoding::encode(mime_type)
        );

        let response = self.request(&url, reqwest::Method::GET, None).await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .boxed())
    }
}

// ============ DriverFactory implementation ============

pub struct GoogleDriveDriverFactory;

impl crate::drivers::DriverFactory for GoogleDriveDriverFactory {
    fn driver_type(&self) -> &'static str {
        "google_drive"
    }

    fn create_driver(&self, config: Value) -> Result<Box<dyn StorageDriver>> {
        let gd_config: GoogleDriveConfig = serde_json::from_value(config)?;
        Ok(Box::new(GoogleDriveDriver::new(gd_config)))
    }
}
