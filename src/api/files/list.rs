use std::sync::Arc;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::state::AppState;

use super::common::{
    drive_service, find_dir_by_name, google_disk, ApiResult, LookupError,
};
use super::DEMO_DIR;

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Also list sub-directory contents
    #[serde(default)]
    pub recursive: bool,
    /// "file" or "dir"; files only when absent
    pub r#type: Option<String>,
}

/// GET /list-files - list the root directory as {identifier: display name}
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListFilesQuery>,
) -> ApiResult<Json<Value>> {
    let disk = google_disk(&state).await?;
    let entries = disk.list("/", query.recursive).await?;

    let want_dirs = query.r#type.as_deref() == Some("dir");

    let mut map = Map::new();
    for entry in entries.iter().filter(|e| e.is_dir == want_dirs) {
        map.insert(entry.path.clone(), Value::String(entry.name.clone()));
    }

    Ok(Json(Value::Object(map)))
}

/// GET /list-team-drives - enumerate shared drives through the provider
/// extension API (not part of the filesystem abstraction)
pub async fn list_team_drives(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let disk = google_disk(&state).await?;
    let service = drive_service(&disk)?;

    let drives = service.list_shared_drives().await?;

    let mut map = Map::new();
    for drive in drives {
        map.insert(drive.id, Value::String(drive.name));
    }

    Ok(Json(Value::Object(map)))
}

/// GET /list-folder-contents - list a directory located by display name.
/// For simplicity the folder is assumed to live in the root directory.
pub async fn list_folder_contents(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let entries = disk.list("/", false).await?;
    // There could be duplicate directory names; first match wins
    let Some(dir) = find_dir_by_name(&entries, DEMO_DIR) else {
        return Ok(LookupError::DirectoryNotFound(DEMO_DIR.to_string()).into_response());
    };

    let contents = disk.list(&dir.path, false).await?;

    let mut map = Map::new();
    for entry in &contents {
        map.insert(
            entry.path.clone(),
            Value::String(format!("{}/{}", DEMO_DIR, entry.name)),
        );
    }

    Ok(Json(Value::Object(map)).into_response())
}
