use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use filetime::FileTime;

use crate::{Result, SyncError};

/// Raw filesystem primitives used while applying a sync.
pub struct FileManager;

impl FileManager {
    pub fn new() -> Self {
        Self
    }

    /// Creates `path` and any missing parents. Returns false when the directory
    /// already existed; any other entry at `path` is an error.
    pub fn ensure_directory(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(false);
        }
        match fs::create_dir_all(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(false),
            Err(e) => Err(SyncError::fs(path, e)),
        }
    }

    /// Copies `from` over `to`, keeping the access and modification times of `from`.
    pub fn copy_preserving_times(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let metadata = fs::metadata(from).map_err(|e| SyncError::fs(from, e))?;

        fs::copy(from, to).map_err(|e| SyncError::fs(to, e))?;

        filetime::set_file_times(
            to,
            FileTime::from_last_access_time(&metadata),
            FileTime::from_last_modification_time(&metadata),
        )
        .map_err(|e| SyncError::fs(to, e))?;
        Ok(())
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| SyncError::fs(path, e))
    }

    /// Fails if the directory is not empty.
    pub fn remove_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::remove_dir(path).map_err(|e| SyncError::fs(path, e))
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}
