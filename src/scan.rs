//! Find, back up, and resize every copy of a named file.
//!
//! For each directory the walker yields that contains the target name:
//!
//! 1. If a sibling file is already a backup of the target
//!    ([`naming::is_backup_of`]), the match is **skipped**. Only the match's
//!    own directory is consulted; a backup elsewhere in the tree does not count.
//! 2. In a dry run, the match is reported as **processed** with a description
//!    of what would happen, and nothing is touched.
//! 3. Otherwise the file is copied to `<name>.backup_<timestamp>` (exclusive
//!    create, metadata preserved), the copy is checksummed against the
//!    original, and only then is the [`Transformer`] run on the original.
//!
//! Failures are per file. A failed copy leaves no backup behind and the
//! original untouched; a failed transform leaves the verified backup in place.
//! Either way the scan moves on to the next match, and every match ends up
//! with exactly one [`FileOutcome`] in the report.
//!
//! ## Progress
//!
//! Callers that want live output pass a channel; a [`ScanEvent`] is sent for
//! the start of the scan, each finished file, and each directory the walker
//! had to skip. Diagnostics go through `tracing` independently of that.

use crate::config::RefitConfig;
use crate::fsops::{self, CopyMode};
use crate::naming::{self, BACKUP_MARKER};
use crate::transform::{ImageResizer, ResizeParams, TransformError, Transformer};
use crate::types::{FileOutcome, OutcomeStatus, ScanReport, ScanRequest};
use crate::walk::{self, DirListing, DirectoryIssue, WalkError, WalkOptions};
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("Invalid scan request: {0}")]
    InvalidRequest(String),
}

/// Why one matched file could not be processed.
#[derive(Error, Debug)]
enum FileError {
    #[error("Backup failed: {0}")]
    Backup(#[source] io::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Progress events emitted while a scan runs.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    Started {
        root: PathBuf,
        target: String,
        dry_run: bool,
    },
    FileFinished {
        /// 1-based position among matches.
        index: usize,
        outcome: FileOutcome,
    },
    DirectorySkipped(DirectoryIssue),
}

/// Scan with the production [`ImageResizer`] configured from `config`.
pub fn scan(
    request: &ScanRequest,
    config: &RefitConfig,
    events: Option<Sender<ScanEvent>>,
) -> Result<ScanReport, ScanError> {
    let resizer = ImageResizer::new(config.resize.filter);
    scan_with_transformer(
        &resizer,
        request,
        &WalkOptions::from_config(config),
        events,
    )
}

/// Scan using a specific transformer (allows testing with a mock).
pub fn scan_with_transformer(
    transformer: &impl Transformer,
    request: &ScanRequest,
    walk_options: &WalkOptions,
    events: Option<Sender<ScanEvent>>,
) -> Result<ScanReport, ScanError> {
    validate_request(request)?;
    let listings = walk::walk(&request.root, walk_options)?;

    tracing::info!(
        "Scan started in {}. Dry Run: {}",
        request.root.display(),
        request.dry_run
    );
    emit(
        &events,
        ScanEvent::Started {
            root: request.root.clone(),
            target: request.target.clone(),
            dry_run: request.dry_run,
        },
    );

    let mut report = ScanReport {
        dry_run: request.dry_run,
        scanned_path: request.root.clone(),
        files_found: 0,
        processed: 0,
        outcomes: Vec::new(),
        issues: Vec::new(),
    };

    for item in listings {
        let listing = match item {
            Ok(listing) => listing,
            Err(issue) => {
                tracing::warn!("Skipping {}: {}", issue.path.display(), issue.message);
                emit(&events, ScanEvent::DirectorySkipped(issue.clone()));
                report.issues.push(issue);
                continue;
            }
        };
        if !listing.contains(&request.target) {
            continue;
        }

        let outcome = process_match(transformer, request, &listing);
        report.files_found += 1;
        match outcome.status {
            OutcomeStatus::Processed => {
                report.processed += 1;
                tracing::info!("Processed: {} - {}", outcome.path.display(), outcome.message);
            }
            OutcomeStatus::Skipped => {
                tracing::info!(
                    "Skipping {} because a backup was found.",
                    outcome.path.display()
                );
            }
            OutcomeStatus::Failed => {
                tracing::error!("Failed: {} - {}", outcome.path.display(), outcome.message);
            }
        }
        emit(
            &events,
            ScanEvent::FileFinished {
                index: report.files_found,
                outcome: outcome.clone(),
            },
        );
        report.outcomes.push(outcome);
    }

    tracing::info!(
        "Scan finished in {}: {} found, {} processed",
        request.root.display(),
        report.files_found,
        report.processed
    );
    Ok(report)
}

/// Reject requests that could never match or would break the naming scheme.
pub fn validate_request(request: &ScanRequest) -> Result<(), ScanError> {
    let target = request.target.as_str();
    if target.is_empty() {
        return Err(ScanError::InvalidRequest("target file name is empty".into()));
    }
    if target.contains('/') || target.contains(std::path::MAIN_SEPARATOR) {
        return Err(ScanError::InvalidRequest(format!(
            "target must be a file name, not a path: {target}"
        )));
    }
    if naming::contains_marker(target) {
        return Err(ScanError::InvalidRequest(format!(
            "target must not contain '{BACKUP_MARKER}': {target}"
        )));
    }
    if request.width == 0 || request.height == 0 {
        return Err(ScanError::InvalidRequest(format!(
            "width and height must be positive, got {}x{}",
            request.width, request.height
        )));
    }
    Ok(())
}

fn process_match(
    transformer: &impl Transformer,
    request: &ScanRequest,
    listing: &DirListing,
) -> FileOutcome {
    let path = listing.dir.join(&request.target);

    let has_backup = listing
        .files
        .iter()
        .any(|f| naming::is_backup_of(f, &request.target));
    if has_backup {
        return FileOutcome {
            path,
            status: OutcomeStatus::Skipped,
            message: "Skipped (Backup already exists)".to_string(),
            backup_path: None,
        };
    }

    let timestamp = Local::now().naive_local();
    let backup_path = naming::backup_path_for(&path, &timestamp);
    let backup_name = file_name(&backup_path);

    if request.dry_run {
        return FileOutcome {
            path,
            status: OutcomeStatus::Processed,
            message: format!(
                "[DRY RUN] Would backup to {} and resize to {}x{}",
                backup_name, request.width, request.height
            ),
            backup_path: None,
        };
    }

    match backup_then_transform(transformer, &path, &backup_path, request) {
        Ok(()) => FileOutcome {
            path,
            status: OutcomeStatus::Processed,
            message: format!("Success (Backup: {backup_name})"),
            backup_path: Some(backup_path),
        },
        Err(err) => {
            let kept = matches!(err, FileError::Transform(_)).then_some(backup_path);
            FileOutcome {
                path,
                status: OutcomeStatus::Failed,
                message: err.to_string(),
                backup_path: kept,
            }
        }
    }
}

/// Copy, verify, then mutate. The backup is complete before the original is touched.
fn backup_then_transform(
    transformer: &impl Transformer,
    path: &Path,
    backup_path: &Path,
    request: &ScanRequest,
) -> Result<(), FileError> {
    // A failed copy cleans up after itself and never touches a file it did
    // not create.
    fsops::copy_preserving(path, backup_path, CopyMode::CreateNew).map_err(FileError::Backup)?;
    if let Err(err) = fsops::verify_same_content(path, backup_path) {
        discard_incomplete_backup(backup_path);
        return Err(FileError::Backup(err));
    }

    transformer.transform(&ResizeParams {
        path: path.to_path_buf(),
        width: request.width,
        height: request.height,
    })?;
    Ok(())
}

/// Remove a backup that never became a faithful copy.
///
/// The original has not been modified at this point, and leaving the partial
/// file would make every later scan skip this match.
fn discard_incomplete_backup(backup_path: &Path) {
    match std::fs::remove_file(backup_path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove incomplete backup {}: {}",
            backup_path.display(),
            e
        ),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn emit(events: &Option<Sender<ScanEvent>>, event: ScanEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is watching progress.
        tx.send(event).ok();
    }
}
