//! Put backups back over their originals and retire them.
//!
//! Items are handled strictly in the order given. For each one the backup is
//! copied over the original, the written content is checksummed against the
//! backup, and only then is the backup deleted. If the copy or the check
//! fails, the backup stays where it is. One failing item never stops the rest.

use crate::fsops::{self, CopyMode};
use crate::types::{RestoreItem, RestoreOutcome, RestoreReport};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
enum RestoreError {
    #[error("backup and original are the same file")]
    SameFile,
    #[error("{0}")]
    Copy(#[source] io::Error),
    #[error("{0}")]
    Verify(#[source] io::Error),
    #[error("original restored, but the backup could not be deleted: {0}")]
    Delete(#[source] io::Error),
}

/// Restore every item, in order.
pub fn restore(items: &[RestoreItem]) -> RestoreReport {
    let mut report = RestoreReport::default();

    for item in items {
        let outcome = match restore_one(item) {
            Ok(()) => {
                report.restored += 1;
                tracing::info!(
                    "Restored {} from {}",
                    item.original_path.display(),
                    item.backup_path.display()
                );
                RestoreOutcome {
                    backup_path: item.backup_path.clone(),
                    original_path: item.original_path.clone(),
                    restored: true,
                    message: format!(
                        "Restored & Deleted Backup: {}",
                        file_name(&item.original_path)
                    ),
                }
            }
            Err(err) => {
                tracing::error!(
                    "Restore of {} failed: {}",
                    item.backup_path.display(),
                    err
                );
                RestoreOutcome {
                    backup_path: item.backup_path.clone(),
                    original_path: item.original_path.clone(),
                    restored: false,
                    message: format!(
                        "Error restoring {}: {}",
                        item.backup_path.display(),
                        err
                    ),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    report
}

fn restore_one(item: &RestoreItem) -> Result<(), RestoreError> {
    let (backup, original) = (&item.backup_path, &item.original_path);
    // Overwriting a file with itself would truncate the only copy.
    if is_same_file(backup, original) {
        return Err(RestoreError::SameFile);
    }

    fsops::copy_preserving(backup, original, CopyMode::Overwrite).map_err(RestoreError::Copy)?;
    fsops::verify_same_content(backup, original).map_err(RestoreError::Verify)?;
    fs::remove_file(backup).map_err(RestoreError::Delete)?;
    Ok(())
}

/// Same underlying file (device and inode), so hard links and symlinks count.
/// A path that cannot be opened is never the same file as anything.
fn is_same_file(a: &Path, b: &Path) -> bool {
    same_file::is_same_file(a, b).unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
