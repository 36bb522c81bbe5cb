use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Result};

use super::StorageDriver;

pub type DriverBox = Arc<dyn StorageDriver>;

/// Disk manager: named driver instances, looked up per request by the
/// route handlers (`disks.disk("google")`).
#[derive(Clone, Default)]
pub struct DiskManager {
    disks: Arc<RwLock<HashMap<String, DriverBox>>>,
}

impl DiskManager {
    pub fn new() -> Self {
        Self {
            disks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a disk under a name
    pub async fn register(&self, name: &str, driver: DriverBox) {
        let mut disks = self.disks.write().await;
        disks.insert(name.to_string(), driver);
        tracing::info!("Disk registered: {}", name);
    }

    /// Get a disk by name
    pub async fn disk(&self, name: &str) -> Result<DriverBox> {
        let disks = self.disks.read().await;
        disks
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("Disk not configured: {}", name))
    }

    /// List registered disk names
    pub async fn list_disks(&self) -> Vec<String> {
        let disks = self.disks.read().await;
        disks.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Entry;
    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::io::AsyncRead;

    struct NullDriver;

    #[async_trait]
    impl StorageDriver for NullDriver {
        fn name(&self) -> &str {
            "null"
        }
        async fn list(&self, _path: &str, _recursive: bool) -> Result<Vec<Entry>> {
            Ok(Vec::new())
        }
        async fn read(&self, _path: &str) -> Result<Bytes> {
            Ok(Bytes::new())
        }
        async fn open_reader(&self, _path: &str) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
            Ok(Box::new(std::io::Cursor::new(Vec::new())))
        }
        async fn put_stream(
            &self,
            _path: &str,
            _reader: Box<dyn AsyncRead + Unpin + Send>,
            _size_hint: Option<u64>,
        ) -> Result<()> {
            Ok(())
        }
        async fn create_dir(&self, _path: &str) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _path: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_dir(&self, _path: &str) -> Result<()> {
            Ok(())
        }
        async fn move_item(&self, _from: &str, _to: &str) -> Result<()> {
            Ok(())
        }
        async fn metadata(&self, path: &str) -> Result<Entry> {
            Ok(Entry {
                path: path.to_string(),
                name: path.trim_matches('/').to_string(),
                is_dir: false,
                size: 0,
                mime_type: None,
                modified: None,
            })
        }
        async fn url(&self, path: &str) -> Result<String> {
            Ok(path.to_string())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let manager = DiskManager::new();
        manager.register("google", Arc::new(NullDriver)).await;

        assert!(manager.disk("google").await.is_ok());
        assert!(manager.disk("dropbox").await.is_err());
        assert_eq!(manager.list_disks().await, vec!["google".to_string()]);
    }
}
