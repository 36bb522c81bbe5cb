use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::state::AppState;
use gdrive_demo::drivers::google_drive::GoogleDriveDriver;
use gdrive_demo::storage::{DriverBox, Entry};

/// Name of the disk every demo route talks to
pub const GOOGLE_DISK: &str = "google";

/// Unhandled remote-provider fault: logged, rendered as a generic
/// server error page
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Unhandled storage fault: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type ApiResult<T> = Result<T, AppError>;

/// Failed lookups are data, not faults: the demo answers them with a
/// human-readable message and a 200, matching the original wording
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Local file \"{0}\" does not exist!")]
    LocalFileNotFound(String),
    #[error("Directory \"{0}\" does not exist!")]
    DirectoryNotFound(String),
    #[error("File \"{0}\" does not exist!")]
    EntryNotFound(String),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.to_string()).into_response()
    }
}

/// The demo disk
pub async fn google_disk(state: &AppState) -> ApiResult<DriverBox> {
    Ok(state.disks.disk(GOOGLE_DISK).await?)
}

/// Escape hatch to the provider client, for operations the filesystem
/// abstraction does not cover (permissions, shared drives, export)
pub fn drive_service(disk: &DriverBox) -> ApiResult<&GoogleDriveDriver> {
    disk.as_any()
        .downcast_ref::<GoogleDriveDriver>()
        .ok_or_else(|| {
            AppError(anyhow::anyhow!(
                "Disk \"{}\" is not backed by Google Drive",
                GOOGLE_DISK
            ))
        })
}

// Display names are not unique within a listing, so every lookup picks an
// explicit policy instead of assuming uniqueness.

/// First file whose display name matches, in provider order
pub fn find_file_by_name<'a>(entries: &'a [Entry], name: &str) -> Option<&'a Entry> {
    entries.iter().find(|e| !e.is_dir && e.name == name)
}

/// First directory whose display name matches, in provider order
pub fn find_dir_by_name<'a>(entries: &'a [Entry], name: &str) -> Option<&'a Entry> {
    entries.iter().find(|e| e.is_dir && e.name == name)
}

/// Most recently modified file whose display name matches; later entries
/// win ties, like sorting by modification time and taking the last
pub fn newest_file_by_name<'a>(entries: &'a [Entry], name: &str) -> Option<&'a Entry> {
    entries
        .iter()
        .filter(|e| !e.is_dir && e.name == name)
        .max_by_key(|e| e.modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn file(path: &str, name: &str, modified_secs: i64) -> Entry {
        Entry {
            path: path.to_string(),
            name: name.to_string(),
            is_dir: false,
            size: 0,
            mime_type: Some("text/plain".to_string()),
            modified: Some(Utc.timestamp_opt(modified_secs, 0).unwrap()),
        }
    }

    fn dir(path: &str, name: &str) -> Entry {
        Entry {
            path: path.to_string(),
            name: name.to_string(),
            is_dir: true,
            size: 0,
            mime_type: None,
            modified: None,
        }
    }

    #[test]
    fn test_first_match_wins_for_duplicate_names() {
        let entries = vec![
            dir("d1", "dup"),
            file("f1", "dup", 100),
            file("f2", "dup", 200),
        ];

        // first FILE in provider order, skipping the same-named directory
        assert_eq!(find_file_by_name(&entries, "dup").unwrap().path, "f1");
        assert_eq!(find_dir_by_name(&entries, "dup").unwrap().path, "d1");
        assert!(find_file_by_name(&entries, "missing").is_none());
    }

    #[test]
    fn test_newest_match_wins_by_modified_time() {
        let entries = vec![
            file("old", "test.txt", 100),
            file("other", "readme.md", 900),
            file("new", "test.txt", 200),
        ];

        assert_eq!(newest_file_by_name(&entries, "test.txt").unwrap().path, "new");
    }

    #[test]
    fn test_newest_match_ties_pick_the_later_entry() {
        let entries = vec![file("a", "test.txt", 100), file("b", "test.txt", 100)];

        assert_eq!(newest_file_by_name(&entries, "test.txt").unwrap().path, "b");
    }

    #[test]
    fn test_lookup_error_wording() {
        assert_eq!(
            LookupError::EntryNotFound("test.txt".to_string()).to_string(),
            "File \"test.txt\" does not exist!"
        );
        assert_eq!(
            LookupError::DirectoryNotFound("Test Dir".to_string()).to_string(),
            "Directory \"Test Dir\" does not exist!"
        );
        assert_eq!(
            LookupError::LocalFileNotFound("public/a.png".to_string()).to_string(),
            "Local file \"public/a.png\" does not exist!"
        );
    }
}
