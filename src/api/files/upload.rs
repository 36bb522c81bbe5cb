use std::sync::Arc;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::AppState;
use gdrive_demo::utils::join_path;

use super::common::{find_dir_by_name, google_disk, ApiResult, LookupError};
use super::{DEMO_ASSET, DEMO_DIR, DEMO_FILE};

/// GET /put - write a literal text object
pub async fn put_literal(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    disk.put(DEMO_FILE, Bytes::from_static(b"Hello World")).await?;

    Ok("File was saved to Google Drive".into_response())
}

/// GET /put-existing - upload a local asset's bytes
pub async fn put_existing(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let file_path = state.assets_dir.join(DEMO_ASSET);
    let data = match tokio::fs::read(&file_path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(
                LookupError::LocalFileNotFound(file_path.display().to_string()).into_response()
            );
        }
        Err(e) => return Err(e.into()),
    };

    disk.put(DEMO_ASSET, Bytes::from(data)).await?;

    Ok("File was saved to Google Drive".into_response())
}

/// GET /put-in-dir - write an object into a directory located by display name
pub async fn put_in_dir(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    // There could be duplicate directory names; first match wins
    let Some(dir) = find_dir_by_name(&entries, DEMO_DIR) else {
        return Ok(LookupError::DirectoryNotFound(DEMO_DIR.to_string()).into_response());
    };

    disk.put(&join_path(&dir.path, DEMO_FILE), Bytes::from_static(b"Hello World"))
        .await?;

    Ok("File was created in the sub directory in Google Drive".into_response())
}
