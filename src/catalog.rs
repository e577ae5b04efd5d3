//! Inventory of existing backups under a directory tree.
//!
//! Every file whose name contains the backup marker is reported, with its
//! original path rebuilt from the name. The match is a substring test, looser
//! than the prefix test the scan uses, because the original name is unknown
//! here: `notes.backup_draft.txt` is listed too, with `notes` as its
//! original.

use crate::config::RefitConfig;
use crate::naming;
use crate::types::{BackupInventory, BackupRecord};
use crate::walk::{self, WalkError, WalkOptions};
use std::path::Path;

/// Find backups under `root` using the walk settings from `config`.
pub fn find_backups(root: &Path, config: &RefitConfig) -> Result<BackupInventory, WalkError> {
    find_backups_with(root, &WalkOptions::from_config(config))
}

pub fn find_backups_with(root: &Path, options: &WalkOptions) -> Result<BackupInventory, WalkError> {
    let mut inventory = BackupInventory::default();

    for item in walk::walk(root, options)? {
        let listing = match item {
            Ok(listing) => listing,
            Err(issue) => {
                tracing::warn!("Skipping {}: {}", issue.path.display(), issue.message);
                inventory.issues.push(issue);
                continue;
            }
        };
        for file in &listing.files {
            let Some(original) = naming::original_from(file) else {
                continue;
            };
            inventory.backups.push(BackupRecord {
                backup_path: listing.dir.join(file),
                original_path: listing.dir.join(original),
                filename: file.clone(),
                backed_up_at: naming::timestamp_of(file),
            });
        }
    }

    tracing::info!(
        "Found {} backups under {}",
        inventory.backups.len(),
        root.display()
    );
    Ok(inventory)
}
