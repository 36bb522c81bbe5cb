//! Path grammar shared by the Google Drive operations.
//!
//! Drive has no real paths: a "path" here is a `/`-joined chain of opaque
//! file IDs, optionally ending in a display name when an operation creates
//! an entry. Operations on existing entries take the final segment as the
//! file ID directly; creating operations take it as the new entry's name
//! and resolve the parent from the segment before it.

use anyhow::{anyhow, Result};

/// Non-empty path segments, ignoring leading/trailing/duplicate separators
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Final segment of a path interpreted as a file ID; the configured root
/// when the path is empty or `/`
pub fn leaf_id<'a>(path: &'a str, root_id: &'a str) -> &'a str {
    path_segments(path).last().copied().unwrap_or(root_id)
}

/// ID of the segment BEFORE the final one; the configured root when the
/// path has a single segment
pub fn parent_id<'a>(path: &'a str, root_id: &'a str) -> &'a str {
    let segments = path_segments(path);
    if segments.len() >= 2 {
        segments[segments.len() - 2]
    } else {
        root_id
    }
}

/// Split a creating-operation path into (parent ID, new entry name)
pub fn split_create_path<'a>(path: &'a str, root_id: &'a str) -> Result<(&'a str, &'a str)> {
    let segments = path_segments(path);
    let name = segments
        .last()
        .copied()
        .ok_or_else(|| anyhow!("Path has no name component: {:?}", path))?;
    let parent = if segments.len() >= 2 {
        segments[segments.len() - 2]
    } else {
        root_id
    };
    Ok((parent, name))
}

/// Extend a parent's ID chain with a child's ID
pub fn join_entry_path(parent_path: &str, id: &str) -> String {
    let parent = parent_path.trim_matches('/');
    if parent.is_empty() {
        id.to_string()
    } else {
        format!("{}/{}", parent, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_id() {
        assert_eq!(leaf_id("/", "root"), "root");
        assert_eq!(leaf_id("", "root"), "root");
        assert_eq!(leaf_id("abc123", "root"), "abc123");
        assert_eq!(leaf_id("/abc123/def456", "root"), "def456");
    }

    #[test]
    fn test_parent_id() {
        assert_eq!(parent_id("abc123", "root"), "root");
        assert_eq!(parent_id("/abc123/def456", "root"), "abc123");
        assert_eq!(parent_id("/", "root"), "root");
    }

    #[test]
    fn test_split_create_path() {
        // name at root
        let (parent, name) = split_create_path("test.txt", "root").unwrap();
        assert_eq!((parent, name), ("root", "test.txt"));

        // name under an ID
        let (parent, name) = split_create_path("abc123/Sub Dir", "root").unwrap();
        assert_eq!((parent, name), ("abc123", "Sub Dir"));

        assert!(split_create_path("/", "root").is_err());
    }

    #[test]
    fn test_join_entry_path() {
        assert_eq!(join_entry_path("", "abc123"), "abc123");
        assert_eq!(join_entry_path("/", "abc123"), "abc123");
        assert_eq!(join_entry_path("abc123", "def456"), "abc123/def456");
    }
}
