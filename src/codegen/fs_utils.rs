//! Filesystem utilities for code generation

use std::fs;
use std::io;
use std::path::Path;

/// Outcome of writing one generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
}

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Write content only when it differs from what is already on disk
pub fn write_if_changed<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<WriteStatus> {
    let path = path.as_ref();

    match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => Ok(WriteStatus::Unchanged),
        Ok(_) => {
            write_file(path, contents)?;
            Ok(WriteStatus::Updated)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            write_file(path, contents)?;
            Ok(WriteStatus::Created)
        }
        Err(e) => Err(e),
    }
}

/// Recursively remove a directory; returns false when it did not exist
pub fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    match fs::remove_dir_all(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_if_changed_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.ts");

        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteStatus::Created);
        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteStatus::Unchanged);
        assert_eq!(write_if_changed(&path, "b").unwrap(), WriteStatus::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_remove_dir_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("module");
        write_file(target.join("x.ts"), "x").unwrap();

        assert!(remove_dir_if_exists(&target).unwrap());
        assert!(!target.exists());
        assert!(!remove_dir_if_exists(&target).unwrap());
    }
}
