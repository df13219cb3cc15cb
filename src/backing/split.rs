//! Discovery of split raw image segments (`disk.001`, `disk.002`, ... or
//! `disk.aa`, `disk.ab`, ...).

use std::path::{Path, PathBuf};

/// Returns the ordered list of segment files belonging to the image whose
/// first segment is `first`.
///
/// Only a first segment (`.000`, `.001` or `.aa`) pulls in siblings; any
/// other file is returned on its own. Discovery stops at the first missing
/// sibling.
pub fn segment_paths(first: impl AsRef<Path>) -> Vec<PathBuf> {
    let first = first.as_ref();
    let mut paths = vec![first.to_path_buf()];

    let Some(ext) = first.extension().and_then(|e| e.to_str()) else {
        return paths;
    };
    if !is_first_segment(ext) {
        return paths;
    }

    let mut current = ext.to_string();
    while let Some(next) = next_extension(&current) {
        let candidate = first.with_extension(&next);
        if !candidate.is_file() {
            break;
        }
        paths.push(candidate);
        current = next;
    }

    if paths.len() > 1 {
        tracing::debug!(
            "Found {} split segments starting at {}",
            paths.len(),
            first.display()
        );
    }
    paths
}

fn is_first_segment(ext: &str) -> bool {
    if ext.len() >= 3 && ext.bytes().all(|b| b.is_ascii_digit()) {
        return ext.parse::<u64>().is_ok_and(|n| n <= 1);
    }
    ext == "aa"
}

fn next_extension(ext: &str) -> Option<String> {
    if ext.len() >= 3 && ext.bytes().all(|b| b.is_ascii_digit()) {
        let n: u64 = ext.parse().ok()?;
        let next = format!("{:0width$}", n + 1, width = ext.len());
        return (next.len() == ext.len()).then_some(next);
    }

    if ext.len() == 2 && ext.bytes().all(|b| b.is_ascii_lowercase()) {
        let mut bytes = ext.as_bytes().to_vec();
        for i in (0..bytes.len()).rev() {
            if bytes[i] < b'z' {
                bytes[i] += 1;
                return String::from_utf8(bytes).ok();
            }
            bytes[i] = b'a';
        }
        return None;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_next_extension() {
        assert_eq!(next_extension("001").as_deref(), Some("002"));
        assert_eq!(next_extension("009").as_deref(), Some("010"));
        assert_eq!(next_extension("999"), None);
        assert_eq!(next_extension("aa").as_deref(), Some("ab"));
        assert_eq!(next_extension("az").as_deref(), Some("ba"));
        assert_eq!(next_extension("zz"), None);
        assert_eq!(next_extension("raw"), None);
        assert_eq!(next_extension("E01"), None);
    }

    #[test]
    fn test_numeric_segments() {
        let dir = TempDir::new().unwrap();
        for ext in ["001", "002", "003"] {
            fs::write(dir.path().join(format!("disk.{}", ext)), b"x").unwrap();
        }
        fs::write(dir.path().join("disk.005"), b"x").unwrap();

        let paths = segment_paths(dir.path().join("disk.001"));
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["disk.001", "disk.002", "disk.003"]);
    }

    #[test]
    fn test_alpha_segments() {
        let dir = TempDir::new().unwrap();
        for ext in ["aa", "ab"] {
            fs::write(dir.path().join(format!("disk.{}", ext)), b"x").unwrap();
        }
        assert_eq!(segment_paths(dir.path().join("disk.aa")).len(), 2);
    }

    #[test]
    fn test_is_first_segment() {
        assert!(is_first_segment("000"));
        assert!(is_first_segment("001"));
        assert!(is_first_segment("0001"));
        assert!(is_first_segment("aa"));
        assert!(!is_first_segment("002"));
        assert!(!is_first_segment("010"));
        assert!(!is_first_segment("2023"));
        assert!(!is_first_segment("ab"));
    }

    #[test]
    fn test_dated_files_are_not_joined() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("backup.2023"), b"x").unwrap();
        fs::write(dir.path().join("backup.2024"), b"x").unwrap();

        let path = dir.path().join("backup.2023");
        assert_eq!(segment_paths(&path), vec![path]);
    }

    #[test]
    fn test_zero_based_segments() {
        let dir = TempDir::new().unwrap();
        for ext in ["000", "001"] {
            fs::write(dir.path().join(format!("disk.{}", ext)), b"x").unwrap();
        }
        assert_eq!(segment_paths(dir.path().join("disk.000")).len(), 2);
    }

    #[test]
    fn test_single_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.raw");
        fs::write(&path, b"x").unwrap();
        assert_eq!(segment_paths(&path), vec![path]);
    }
}
