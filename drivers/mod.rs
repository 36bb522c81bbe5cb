// Driver package
pub mod google_drive;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::storage::StorageDriver;

/// Driver factory trait
pub trait DriverFactory: Send + Sync {
    /// Driver type name, as referenced by disk definitions in config.json
    fn driver_type(&self) -> &'static str;

    /// Create a driver instance from its JSON configuration
    fn create_driver(&self, config: serde_json::Value) -> anyhow::Result<Box<dyn StorageDriver>>;
}

// Global driver registry
static DRIVER_REGISTRY: Lazy<HashMap<&'static str, Box<dyn DriverFactory>>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, Box<dyn DriverFactory>> = HashMap::new();

    // Register Google Drive driver
    let google = google_drive::GoogleDriveDriverFactory;
    registry.insert(google.driver_type(), Box::new(google));

    registry
});

/// List all available driver types
pub fn available_drivers() -> Vec<&'static str> {
    DRIVER_REGISTRY.keys().copied().collect()
}

/// Create a driver by type and configuration
pub fn create_driver(
    driver_type: &str,
    config: serde_json::Value,
) -> anyhow::Result<Box<dyn StorageDriver>> {
    match DRIVER_REGISTRY.get(driver_type) {
        Some(factory) => factory.create_driver(config),
        None => Err(anyhow::anyhow!("Unknown driver type: {}", driver_type)),
    }
}
