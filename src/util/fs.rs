//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::Builder;

/// Result of writing a file whose content may already be up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// New content was written
    Written,
    /// The file already held identical content and was left alone
    Unchanged,
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write `contents` to `path` atomically.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers see either the old file or the new one.
/// An existing file keeps its permissions; a new one gets the same mode a
/// plain create would. The parent directory must already exist.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<WriteStatus> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents {
            return Ok(WriteStatus::Unchanged);
        }
    }

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let existing_permissions = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = Builder::new();
    builder.prefix(".berth");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        // Temp files default to 0600.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("failed to write temporary file for {}", path.display()))?;
    if let Some(permissions) = existing_permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .with_context(|| format!("failed to copy permissions of {}", path.display()))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(WriteStatus::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_then_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");

        assert_eq!(write_atomic(&path, b"hello").unwrap(), WriteStatus::Written);
        assert_eq!(write_atomic(&path, b"hello").unwrap(), WriteStatus::Unchanged);
        assert_eq!(write_atomic(&path, b"world").unwrap(), WriteStatus::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "world");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        write_atomic(&tmp.path().join("a"), b"1").unwrap();

        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_onto_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let blocked = tmp.path().join("blocked");
        fs::create_dir(&blocked).unwrap();

        assert!(write_atomic(&blocked, b"data").is_err());
        assert!(blocked.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("env.sh");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o754)).unwrap();

        assert_eq!(write_atomic(&path, b"new").unwrap(), WriteStatus::Written);
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o754);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_new_file_mode_matches_plain_create() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("plain");
        fs::write(&plain, "x").unwrap();
        let atomic = tmp.path().join("atomic");
        write_atomic(&atomic, b"x").unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_remove_dir_all_if_exists() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gone");

        remove_dir_all_if_exists(&dir).unwrap();

        fs::create_dir_all(dir.join("nested")).unwrap();
        remove_dir_all_if_exists(&dir).unwrap();
        assert!(!dir.exists());
    }
}
