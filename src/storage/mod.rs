use async_trait::async_trait;
use anyhow::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

/// One node in the remote file hierarchy, as returned by a listing call.
///
/// `path` is the provider's opaque locator (for Google Drive, the file ID or
/// a `/`-joined ID chain for entries below root). `name` is the
/// human-readable display name, which is NOT unique within a directory:
/// callers must pick a match policy instead of assuming uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    /// Present only for files
    pub mime_type: Option<String>,
    /// Present only for files; drives "most recent" selection
    pub modified: Option<DateTime<Utc>>,
}

/// Storage driver interface: the generic filesystem abstraction every
/// route handler talks to. One implementation per remote provider.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Driver name
    fn name(&self) -> &str;

    /// List directory contents, optionally recursing into sub-directories
    async fn list(&self, path: &str, recursive: bool) -> Result<Vec<Entry>>;

    /// Fetch complete file content
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Open a streaming reader over file content
    async fn open_reader(&self, path: &str) -> Result<Box<dyn AsyncRead + Unpin + Send>>;

    /// Write complete file data.
    ///
    /// The default implementation feeds the bytes through `put_stream`;
    /// cloud drivers can override it with a provider single-shot upload.
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let size = data.len() as u64;
        let reader = Box::new(std::io::Cursor::new(data));
        self.put_stream(path, reader, Some(size)).await
    }

    /// Write file data from a stream, so large payloads are never fully
    /// materialized in memory
    async fn put_stream(
        &self,
        path: &str,
        reader: Box<dyn AsyncRead + Unpin + Send>,
        size_hint: Option<u64>,
    ) -> Result<()>;

    /// Create a directory
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Delete a file
    async fn delete(&self, path: &str) -> Result<()>;

    /// Delete a directory
    async fn delete_dir(&self, path: &str) -> Result<()>;

    /// Move or rename an entry
    async fn move_item(&self, from: &str, to: &str) -> Result<()>;

    /// Fetch the descriptor of a single entry
    async fn metadata(&self, path: &str) -> Result<Entry>;

    /// Public URL for an identifier
    async fn url(&self, path: &str) -> Result<String>;

    /// Escape hatch: access to the concrete driver for provider-specific
    /// operations the abstraction does not cover
    fn as_any(&self) -> &dyn std::any::Any;
}

pub mod manager;

pub use manager::{DiskManager, DriverBox};

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::Mutex;

    /// In-memory driver double: root-level entries only, enough to
    /// exercise the handler-facing contract.
    struct MemoryDriver {
        entries: Mutex<HashMap<String, (String, Vec<u8>, bool)>>,
        next_id: Mutex<u64>,
    }

    impl MemoryDriver {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                next_id: Mutex::new(1),
            }
        }

        async fn alloc_id(&self) -> String {
            let mut next = self.next_id.lock().await;
            let id = format!("mem{:04}", *next);
            *next += 1;
            id
        }
    }

    #[async_trait]
    impl StorageDriver for MemoryDriver {
        fn name(&self) -> &str {
            "memory"
        }

        async fn list(&self, _path: &str, _recursive: bool) -> Result<Vec<Entry>> {
            let entries = self.entries.lock().await;
            let mut out: Vec<Entry> = entries
                .iter()
                .map(|(id, (name, data, is_dir))| Entry {
                    path: id.clone(),
                    name: name.clone(),
                    is_dir: *is_dir,
                    size: data.len() as u64,
                    mime_type: (!is_dir).then(|| "application/octet-stream".to_string()),
                    modified: (!is_dir).then(Utc::now),
                })
                .collect();
            out.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(out)
        }

        async fn read(&self, path: &str) -> Result<Bytes> {
            let entries = self.entries.lock().await;
            let (_, data, _) = entries
                .get(path)
                .ok_or_else(|| anyhow!("no such entry: {}", path))?;
            Ok(Bytes::from(data.clone()))
        }

        async fn open_reader(&self, path: &str) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
            let data = self.read(path).await?;
            Ok(Box::new(std::io::Cursor::new(data)))
        }

        async fn put_stream(
            &self,
            path: &str,
            mut reader: Box<dyn AsyncRead + Unpin + Send>,
            _size_hint: Option<u64>,
        ) -> Result<()> {
            let mut data = Vec::new();
            reader.read_to_end(&mut data).await?;

            let name = path.trim_matches('/').to_string();
            let id = self.alloc_id().await;
            let mut entries = self.entries.lock().await;
            entries.insert(id, (name, data, false));
            Ok(())
        }

        async fn create_dir(&self, path: &str) -> Result<()> {
            let name = path.trim_matches('/').to_string();
            let id = self.alloc_id().await;
            let mut entries = self.entries.lock().await;
            entries.insert(id, (name, Vec::new(), true));
            Ok(())
        }

        async fn delete(&self, path: &str) -> Result<()> {
            let mut entries = self.entries.lock().await;
            entries
                .remove(path)
                .ok_or_else(|| anyhow!("no such entry: {}", path))?;
            Ok(())
        }

        async fn delete_dir(&self, path: &str) -> Result<()> {
            self.delete(path).await
        }

        async fn move_item(&self, from: &str, to: &str) -> Result<()> {
            let mut entries = self.entries.lock().await;
            let (_, data, is_dir) = entries
                .remove(from)
                .ok_or_else(|| anyhow!("no such entry: {}", from))?;
            entries.insert(from.to_string(), (to.trim_matches('/').to_string(), data, is_dir));
            Ok(())
        }

        async fn metadata(&self, path: &str) -> Result<Entry> {
            let entries = self.entries.lock().await;
            let (name, data, is_dir) = entries
                .get(path)
                .ok_or_else(|| anyhow!("no such entry: {}", path))?;
            Ok(Entry {
                path: path.to_string(),
                name: name.clone(),
                is_dir: *is_dir,
                size: data.len() as u64,
                mime_type: None,
                modified: None,
            })
        }

        async fn url(&self, path: &str) -> Result<String> {
            Ok(format!("memory://{}", path))
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[tokio::test]
    async fn test_write_then_list_shows_entry() {
        let driver = MemoryDriver::new();
        driver
            .put("/test.txt", Bytes::from_static(b"Hello World"))
            .await
            .unwrap();

        let entries = driver.list("/", false).await.unwrap();
        assert!(entries.iter().any(|e| e.name == "test.txt" && !e.is_dir));
    }

    #[tokio::test]
    async fn test_streamed_round_trip_is_byte_exact() {
        let driver = MemoryDriver::new();

        // 1 MiB of non-repeating data, fed through a pipe so the driver
        // only ever sees it as a stream
        let payload: Vec<u8> = (0..1024 * 1024u32).map(|i| (i % 251) as u8).collect();
        let expected = payload.clone();

        let (mut tx, rx) = tokio::io::duplex(8 * 1024);
        let writer = tokio::spawn(async move {
            tx.write_all(&payload).await.unwrap();
            tx.shutdown().await.unwrap();
        });

        driver
            .put_stream("/big.bin", Box::new(rx), Some(expected.len() as u64))
            .await
            .unwrap();
        writer.await.unwrap();

        let entries = driver.list("/", false).await.unwrap();
        let entry = entries.iter().find(|e| e.name == "big.bin").unwrap();
        assert_eq!(entry.size, expected.len() as u64);

        let mut reader = driver.open_reader(&entry.path).await.unwrap();
        let mut round_tripped = Vec::new();
        reader.read_to_end(&mut round_tripped).await.unwrap();
        assert_eq!(round_tripped, expected);
    }

    #[tokio::test]
    async fn test_move_renames_entry() {
        let driver = MemoryDriver::new();
        driver.create_dir("/test").await.unwrap();

        let entries = driver.list("/", false).await.unwrap();
        let dir = entries.iter().find(|e| e.name == "test").unwrap();

        driver.move_item(&dir.path, "new-test").await.unwrap();

        let entries = driver.list("/", false).await.unwrap();
        assert!(entries.iter().any(|e| e.name == "new-test"));
        assert!(!entries.iter().any(|e| e.name == "test"));
    }
}
