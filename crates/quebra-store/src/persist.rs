//! # Atomic Persistence
//!
//! Whole-file rewrites for the ledger and the catalog.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     write_atomic(path, bytes)                           │
//! │                                                                         │
//! │  1. NamedTempFile in the same directory as `path`                      │
//! │  2. write bytes, fsync                                                 │
//! │  3. rename over `path`                                                 │
//! │                                                                         │
//! │  A crash before 3 leaves the previous file intact.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Replaces `path` with `bytes` via temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "File written");
    Ok(())
}

/// Copies `source` into `backup_dir` under a timestamped name.
///
/// Returns `None` when `source` does not exist yet.
pub fn backup_file(source: &Path, backup_dir: &Path) -> StoreResult<Option<PathBuf>> {
    if !source.exists() {
        debug!(path = %source.display(), "Nothing to back up");
        return Ok(None);
    }

    fs::create_dir_all(backup_dir).map_err(|e| StoreError::io(backup_dir, e))?;

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "backup".to_string());
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = Local::now().format("%Y%m%d_%H%M%S_%f");
    let target = backup_dir.join(format!("{stem}_{stamp}{extension}"));

    fs::copy(source, &target).map_err(|e| StoreError::io(&target, e))?;

    info!(backup = %target.display(), "Backup written");
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("file.csv");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // no temp files left behind
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dados.csv");
        let backups = dir.path().join("backups");

        assert_eq!(backup_file(&source, &backups).unwrap(), None);
        assert!(!backups.exists());

        fs::write(&source, "Data\n").unwrap();
        let target = backup_file(&source, &backups).unwrap().unwrap();

        assert!(target.starts_with(&backups));
        assert!(target.file_name().unwrap().to_string_lossy().starts_with("dados_"));
        assert_eq!(fs::read_to_string(target).unwrap(), "Data\n");
    }
}
