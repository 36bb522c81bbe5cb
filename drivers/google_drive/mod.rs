pub mod driver;
pub mod util;

pub use driver::{GoogleDriveConfig, GoogleDriveDriver, GoogleDriveDriverFactory, SharedDrive};
