use std::sync::Arc;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::AppState;

use super::common::{drive_service, find_file_by_name, google_disk, ApiResult, LookupError};
use super::DEMO_FILE;

/// GET /share - store a demo file, make it link-readable through the
/// provider permission API, and return its public URL
pub async fn share(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    // Store a demo file
    disk.put(DEMO_FILE, Bytes::from_static(b"Hello World")).await?;

    // Find it to get its identifier
    let entries = disk.list("/", false).await?;
    let Some(file) = find_file_by_name(&entries, DEMO_FILE) else {
        return Ok(LookupError::EntryNotFound(DEMO_FILE.to_string()).into_response());
    };

    // Readable by anyone with the link, but not discoverable
    let service = drive_service(&disk)?;
    service
        .create_permission(&file.path, "reader", "anyone", false)
        .await?;

    let url = disk.url(&file.path).await?;

    Ok(url.into_response())
}
