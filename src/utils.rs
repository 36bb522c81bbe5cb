/// Path processing utility functions

/// Clean and normalize a path:
/// 1. Replace backslashes with forward slashes
/// 2. Ensure the path starts with /
/// 3. Collapse . and .. segments and duplicate separators
pub fn fix_and_clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    };

    clean_path(&path)
}

fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Join a child segment onto a cleaned parent path
pub fn join_path(parent: &str, child: &str) -> String {
    let parent = fix_and_clean_path(parent);
    if parent == "/" {
        format!("/{}", child.trim_start_matches('/'))
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_and_clean_path() {
        assert_eq!(fix_and_clean_path(""), "/");
        assert_eq!(fix_and_clean_path("."), "/");
        assert_eq!(fix_and_clean_path(".."), "/");
        assert_eq!(fix_and_clean_path("../.."), "/");
        assert_eq!(fix_and_clean_path("a/b/c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("/a/b/c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("a\\b\\c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("/a//b///c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("/a/./b/../c"), "/a/c");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "test.txt"), "/test.txt");
        assert_eq!(join_path("/Test Dir", "Sub Dir"), "/Test Dir/Sub Dir");
        assert_eq!(join_path("abc123", "test.txt"), "/abc123/test.txt");
    }
}
