use std::sync::Arc;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::Utc;
use tokio_util::io::ReaderStream;

use crate::state::AppState;

use super::common::{
    find_file_by_name, google_disk, newest_file_by_name, ApiResult, LookupError,
};
use super::{DEMO_ASSET, DEMO_FILE};

const OCTET_STREAM: &str = "application/octet-stream";

/// GET /get - locate a file by display name and return its full content
/// as an attachment
pub async fn get_file(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    // There could be duplicate file names; first match wins
    let Some(file) = find_file_by_name(&entries, DEMO_FILE) else {
        return Ok(LookupError::EntryNotFound(DEMO_FILE.to_string()).into_response());
    };

    let data = disk.read(&file.path).await?;

    let content_type = file
        .mime_type
        .clone()
        .unwrap_or_else(|| OCTET_STREAM.to_string());

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", DEMO_FILE),
        )
        .body(Body::from(data))?)
}

/// GET /put-get-stream - upload a local file through a stream, then stream
/// the remote content back, so neither direction materializes the payload
pub async fn put_get_stream(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    // Assume this is a large file: upload it chunk by chunk from the
    // local reader instead of buffering it
    let file_path = state.assets_dir.join(DEMO_ASSET);
    let local = match tokio::fs::File::open(&file_path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(
                LookupError::LocalFileNotFound(file_path.display().to_string()).into_response()
            );
        }
        Err(e) => return Err(e.into()),
    };
    let size = local.metadata().await?.len();

    disk.put_stream(DEMO_ASSET, Box::new(local), Some(size)).await?;

    let entries = disk.list("/", false).await?;
    // There could be duplicate file names; first match wins
    let Some(file) = find_file_by_name(&entries, DEMO_ASSET) else {
        return Ok(LookupError::EntryNotFound(DEMO_ASSET.to_string()).into_response());
    };

    // Pass the remote bytes through to the response as they arrive
    let reader = disk.open_reader(&file.path).await?;
    let stream = ReaderStream::new(reader);

    let content_type = file
        .mime_type
        .clone()
        .unwrap_or_else(|| OCTET_STREAM.to_string());

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(stream))?)
}

/// GET /newest - write a fresh timestamp, then return the content of the
/// most recently modified entry with that name (duplicates resolved by
/// recency, not list order)
pub async fn newest(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    disk.put(DEMO_FILE, Bytes::from(now)).await?;

    let entries = disk.list("/", false).await?;
    let Some(file) = newest_file_by_name(&entries, DEMO_FILE) else {
        return Ok(LookupError::EntryNotFound(DEMO_FILE.to_string()).into_response());
    };

    let data = disk.read(&file.path).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .body(Body::from(data))?)
}
