//! Filesystem operations
//!
//! File and directory operations with path-carrying errors.

use std::path::Path;

use crate::error::RepoError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), RepoError> {
    std::fs::create_dir_all(path).map_err(|e| RepoError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), RepoError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| RepoError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read a file into a byte vector
pub fn read_file(path: &Path) -> Result<Vec<u8>, RepoError> {
    std::fs::read(path).map_err(|e| RepoError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read a file into a string
pub fn read_file_string(path: &Path) -> Result<String, RepoError> {
    std::fs::read_to_string(path).map_err(|e| RepoError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Copy a file, creating target parent directories as needed
pub fn copy_file(from: &Path, to: &Path) -> Result<(), RepoError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map(|_| ()).map_err(|e| RepoError::Io {
        path: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Move a file, creating target parent directories as needed
pub fn move_file(from: &Path, to: &Path) -> Result<(), RepoError> {
    if from == to {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::rename(from, to).map_err(|e| RepoError::Io {
        path: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a file if it exists
pub fn remove_file_if_exists(path: &Path) -> Result<(), RepoError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RepoError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}
