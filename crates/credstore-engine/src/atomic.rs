// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe file replacement.
//!
//! Content goes to a temporary file in the target's directory, is flushed to
//! disk, and is renamed over the target. Readers see either the old file or
//! the new one, never a partial write.

use std::io::Write;
use std::path::Path;

use credstore_core::{CredentialsError, Result};
use tempfile::NamedTempFile;

/// How the final rename treats an existing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Replace whatever is at the target path.
    Replace,
    /// Fail with [`CredentialsError::AlreadyExists`] if the target exists.
    CreateNew,
}

/// Atomically write `contents` to `path`.
///
/// With `private` set the file is restricted to the owner (0600 on Unix).
/// Otherwise a replaced file keeps the permissions of the file it replaces.
/// The parent directory must already exist.
pub(crate) fn write_file(path: &Path, contents: &[u8], mode: WriteMode, private: bool) -> Result<()> {
    let parent = parent_dir(path);
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| CredentialsError::io(parent, e))?;

    temp.write_all(contents)
        .map_err(|e| CredentialsError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CredentialsError::io(temp.path(), e))?;

    if private {
        restrict_permissions(temp.path())?;
    } else if mode == WriteMode::Replace
        && let Ok(existing) = std::fs::metadata(path)
    {
        std::fs::set_permissions(temp.path(), existing.permissions())
            .map_err(|e| CredentialsError::io(temp.path(), e))?;
    }

    match mode {
        WriteMode::Replace => {
            temp.persist(path)
                .map_err(|e| CredentialsError::io(path, e.error))?;
        }
        WriteMode::CreateNew => {
            temp.persist_noclobber(path).map_err(|e| {
                if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                    CredentialsError::AlreadyExists {
                        path: path.to_path_buf(),
                    }
                } else {
                    CredentialsError::io(path, e.error)
                }
            })?;
        }
    }

    sync_parent(path);
    Ok(())
}

/// Flush the directory entry after a rename. Best effort: some platforms and
/// filesystems do not support syncing a directory handle.
#[cfg(unix)]
pub(crate) fn sync_parent(path: &Path) {
    if let Ok(dir) = std::fs::File::open(parent_dir(path)) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
pub(crate) fn sync_parent(_path: &Path) {}

/// Create the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent).map_err(|e| CredentialsError::io(parent, e))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| CredentialsError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_overwrites_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "old").unwrap();

        write_file(&path, b"new", WriteMode::Replace, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn create_new_refuses_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "old").unwrap();

        let err = write_file(&path, b"new", WriteMode::CreateNew, false).unwrap_err();
        assert!(matches!(err, CredentialsError::AlreadyExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn no_temp_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        write_file(&path, b"one", WriteMode::CreateNew, false).unwrap();
        write_file(&path, b"two", WriteMode::Replace, false).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_parent_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("data");
        let err = write_file(&path, b"x", WriteMode::Replace, false).unwrap_err();
        assert!(matches!(err, CredentialsError::Io { .. }));
    }

    #[test]
    fn ensure_parent_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("data");
        ensure_parent(&path).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn replace_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_file(&path, b"new", WriteMode::Replace, false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
