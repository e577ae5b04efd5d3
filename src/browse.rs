//! Directory listing for picking a scan root.
//!
//! Lists the sub-directories of a path (the home directory by default) along
//! with its parent, so a UI can step up and down the tree.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("Invalid directory: {0}")]
    InvalidDirectory(PathBuf),
    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not determine the home directory")]
    NoHomeDirectory,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Sub-directories of one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub current_path: PathBuf,
    /// Parent directory; the path itself at a filesystem root.
    pub parent_path: PathBuf,
    /// Sorted names of sub-directories (symlinks to directories included).
    pub folders: Vec<String>,
}

/// List `path`, or the home directory when `path` is `None` or empty.
pub fn list_directory(path: Option<&Path>) -> Result<DirectoryListing, BrowseError> {
    let current = match path {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => dirs::home_dir().ok_or(BrowseError::NoHomeDirectory)?,
    };

    if !current.is_dir() {
        return Err(BrowseError::InvalidDirectory(current));
    }

    let entries = fs::read_dir(&current).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => BrowseError::PermissionDenied {
            path: current.clone(),
            source: e,
        },
        _ => BrowseError::Io(e),
    })?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.path().is_dir() {
            folders.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    folders.sort();

    let parent_path = current.parent().unwrap_or(&current).to_path_buf();
    Ok(DirectoryListing {
        current_path: current,
        parent_path,
        folders,
    })
}
