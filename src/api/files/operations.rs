use std::sync::Arc;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;
use gdrive_demo::utils::join_path;

use super::common::{
    find_dir_by_name, find_file_by_name, google_disk, ApiResult, LookupError,
};
use super::{DEMO_DIR, DEMO_FILE, RENAME_DIR, RENAME_TARGET, SUB_DIR};

/// GET /create-dir - create a directory in the root
pub async fn create_dir(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    disk.create_dir(DEMO_DIR).await?;

    Ok("Directory was created in Google Drive".into_response())
}

/// GET /create-sub-dir - locate the parent by display name, then create a
/// child directory under it
pub async fn create_sub_dir(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    // There could be duplicate directory names; first match wins
    let Some(dir) = find_dir_by_name(&entries, DEMO_DIR) else {
        return Ok(LookupError::DirectoryNotFound(DEMO_DIR.to_string()).into_response());
    };

    disk.create_dir(&join_path(&dir.path, SUB_DIR)).await?;

    Ok("Sub Directory was created in Google Drive".into_response())
}

/// GET /delete - delete a file located by display name
pub async fn delete_file(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    // There can be duplicate file names; first match wins
    let Some(file) = find_file_by_name(&entries, DEMO_FILE) else {
        return Ok(LookupError::EntryNotFound(DEMO_FILE.to_string()).into_response());
    };

    disk.delete(&file.path).await?;

    Ok("File was deleted from Google Drive".into_response())
}

/// GET /delete-dir - delete a directory located by display name
pub async fn delete_dir(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    let Some(dir) = find_dir_by_name(&entries, DEMO_DIR) else {
        return Ok(LookupError::DirectoryNotFound(DEMO_DIR.to_string()).into_response());
    };

    disk.delete_dir(&dir.path).await?;

    Ok("Directory was deleted from Google Drive".into_response())
}

/// GET /rename-dir - create a directory, then rename it through its
/// identifier
pub async fn rename_dir(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    // First create a directory to rename
    disk.create_dir(RENAME_DIR).await?;

    // Now find it and use its identifier to rename it
    let entries = disk.list("/", false).await?;
    let Some(dir) = find_dir_by_name(&entries, RENAME_DIR) else {
        return Ok(LookupError::DirectoryNotFound(RENAME_DIR.to_string()).into_response());
    };

    disk.move_item(&dir.path, RENAME_TARGET).await?;

    Ok("Directory was renamed in Google Drive".into_response())
}
