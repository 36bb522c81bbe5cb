use std::path::PathBuf;

use gdrive_demo::storage::DiskManager;

/// Shared application state handed to every route handler
pub struct AppState {
    /// Named storage disks; the demo routes all use the "google" disk
    pub disks: DiskManager,
    /// Directory holding local demo files for the upload routes
    pub assets_dir: PathBuf,
}
