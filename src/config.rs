//! Application configuration module
//!
//! Manages application configuration loaded from config.json.
//! Creates a default config file on first run so the user only has to
//! fill in their Google OAuth credentials.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Local asset configuration
    pub assets: AssetsConfig,
    /// Named disks, keyed by the name handlers look them up with
    pub disks: HashMap<String, DiskConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Local asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding local demo files for the upload routes
    pub dir: String,
}

/// One disk definition: which driver backs it and the driver's own config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    pub driver_type: String,
    pub config: serde_json::Value,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut disks = HashMap::new();
        disks.insert(
            "google".to_string(),
            DiskConfig {
                driver_type: "google_drive".to_string(),
                config: json!({
                    "client_id": "",
                    "client_secret": "",
                    "refresh_token": "",
                    "root_id": "root",
                    "chunk_size": 5
                }),
            },
        );

        Self {
            server: ServerConfig::default(),
            assets: AssetsConfig::default(),
            disks,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "public".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the server bind address
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the local asset directory path
    pub fn get_assets_dir(&self) -> PathBuf {
        PathBuf::from(&self.assets.dir)
    }
}

/// Get the config file path
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create a default one if not exists
pub fn load_config() -> Result<AppConfig, String> {
    let config_path = get_config_path();

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(&config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let config_path = get_config_path();

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(&config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trip() {
        let config = AppConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.get_bind_address(), "0.0.0.0:8080");
        assert_eq!(parsed.assets.dir, "public");

        let google = parsed.disks.get("google").unwrap();
        assert_eq!(google.driver_type, "google_drive");
        assert_eq!(google.config["root_id"], "root");
    }
}
