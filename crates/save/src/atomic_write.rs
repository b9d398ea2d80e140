//! Write-rename file replacement.
//!
//! Bytes go to `{path}.tmp`, are flushed with `sync_all()`, then the temp
//! file is renamed over `path`. A crash mid-write leaves the previous save
//! intact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replace the file at `path` with `data`, creating parent
/// directories as needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rail_atomic_write_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = test_dir("creates_file");
        let path = dir.join("rails.sav");

        atomic_write(&path, b"hello rails").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello rails");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_overwrites_existing() {
        let dir = test_dir("overwrites");
        let path = dir.join("rails.sav");

        atomic_write(&path, b"version 1").unwrap();
        atomic_write(&path, b"version 2").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"version 2");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = test_dir("parent_dirs");
        let path = dir.join("nested").join("deep").join("rails.sav");

        atomic_write(&path, b"nested data").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"nested data");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_replaces_leftover_tmp() {
        let dir = test_dir("leftover_tmp");
        let path = dir.join("rails.sav");
        fs::write(&path, b"original").unwrap();
        // leftover from a crashed write
        fs::write(tmp_path(&path), b"partial garbage").unwrap();

        atomic_write(&path, b"new save").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new save");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
