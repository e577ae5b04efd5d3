//! Recursive directory enumeration.
//!
//! [`walk`] yields one [`DirListing`] per directory under the root: the
//! directory path plus the sorted names of the files directly inside it. Both
//! the resize scan and the backup catalog are built on top of it.
//!
//! ## Order
//!
//! Depth-first pre-order with siblings sorted by file name, so reports built
//! from a walk are deterministic:
//!
//! ```text
//! root/            1
//! root/a/          2
//! root/a/x/        3
//! root/b/          4
//! ```
//!
//! ## Failures
//!
//! A root that is missing, not a directory, or unreadable fails the whole
//! walk up front with a [`WalkError`]. Anything that goes wrong below the root
//! is yielded as a [`DirectoryIssue`] and the walk carries on with the next
//! directory.
//!
//! ## Symlinks
//!
//! Symlinked directories are listed as directories (never as files) but are
//! only descended when [`WalkOptions::follow_symlinks`] is set. When they are,
//! walkdir's ancestor check stops cycles and the offending link is reported as
//! a [`IssueKind::SymlinkCycle`] issue. A link that leads to a file, or to
//! nothing at all, is listed as a file and never raises an issue.

use crate::config::RefitConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Directory does not exist: {0}")]
    NotADirectory(PathBuf),
    #[error("Permission denied: {path}")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Walker settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into symlinked directories (with cycle detection).
    pub follow_symlinks: bool,
}

impl WalkOptions {
    pub fn from_config(config: &RefitConfig) -> Self {
        Self {
            follow_symlinks: config.walk.follow_symlinks,
        }
    }
}

/// Files directly inside one visited directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub dir: PathBuf,
    /// Sorted file names (anything that is not a directory).
    pub files: Vec<String>,
}

impl DirListing {
    pub fn contains(&self, name: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(name)).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Unreadable,
    SymlinkCycle,
}

/// A directory below the root that could not be walked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
    pub message: String,
}

impl DirectoryIssue {
    /// One-line form used in reports: `[WARN] <path> -> <message>`.
    pub fn log_line(&self) -> String {
        format!("[WARN] {} -> {}", self.path.display(), self.message)
    }
}

/// Start walking `root`.
///
/// The root is checked eagerly; everything below it is read lazily as the
/// returned iterator advances. Each call is independent.
pub fn walk(root: &Path, options: &WalkOptions) -> Result<Walk, WalkError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(WalkError::AccessDenied {
                path: root.to_path_buf(),
                source: e,
            });
        }
        _ => return Err(WalkError::NotADirectory(root.to_path_buf())),
    }
    if let Err(e) = fs::read_dir(root) {
        return Err(match e.kind() {
            io::ErrorKind::PermissionDenied => WalkError::AccessDenied {
                path: root.to_path_buf(),
                source: e,
            },
            _ => WalkError::Io(e),
        });
    }

    tracing::debug!(
        "Walking {} (follow symlinks: {})",
        root.display(),
        options.follow_symlinks
    );

    let entries = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter();

    Ok(Walk {
        entries,
        reported: HashSet::new(),
    })
}

/// Lazy iterator returned by [`walk`].
pub struct Walk {
    entries: walkdir::IntoIter,
    /// Directories whose listing already failed, so walkdir's own error for
    /// the same directory is not reported twice.
    reported: HashSet<PathBuf>,
}

impl Iterator for Walk {
    type Item = Result<DirListing, DirectoryIssue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => match self.issue_from(&err) {
                    Some(issue) => return Some(Err(issue)),
                    None => continue,
                },
            };

            // The root is always walked, even when it is itself a symlink.
            if entry.depth() > 0 && !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.into_path();
            return Some(match list_files(&dir) {
                Ok(files) => Ok(DirListing { dir, files }),
                Err(source) => {
                    self.reported.insert(dir.clone());
                    Err(DirectoryIssue {
                        message: source.to_string(),
                        path: dir,
                        kind: IssueKind::Unreadable,
                    })
                }
            });
        }
    }
}

impl Walk {
    fn issue_from(&self, err: &walkdir::Error) -> Option<DirectoryIssue> {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        if let Some(ancestor) = err.loop_ancestor() {
            return Some(DirectoryIssue {
                message: format!("Symlink cycle back to {}, not descending", ancestor.display()),
                path,
                kind: IssueKind::SymlinkCycle,
            });
        }
        if self.reported.contains(&path) || is_dangling_or_file_link(&path) {
            return None;
        }
        Some(DirectoryIssue {
            message: err
                .io_error()
                .map(ToString::to_string)
                .unwrap_or_else(|| err.to_string()),
            path,
            kind: IssueKind::Unreadable,
        })
    }
}

/// A symlink that does not lead to a directory. Following it can fail (when
/// it dangles) but there is nothing below it to walk, so it is not an issue.
fn is_dangling_or_file_link(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink()) && !path.is_dir()
}

/// Sorted names of the non-directory entries of `dir`.
fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks: a link to a directory is a directory here.
        if entry.path().is_dir() {
            continue;
        }
        files.push(entry.file_name().to_string_lossy().into_owned());
    }
    files.sort();
    Ok(files)
}
