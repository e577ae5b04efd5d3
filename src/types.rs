//! Shared request and report types.
//!
//! These cross every boundary in the crate: the engines produce them, the
//! CLI prints them, and the request layer serializes them to JSON.

use crate::walk::DirectoryIssue;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input to a resize scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Directory tree to search.
    pub root: PathBuf,
    /// Exact file name to match, e.g. `photo.png`.
    pub target: String,
    pub width: u32,
    pub height: u32,
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Processed,
    Skipped,
    Failed,
}

impl OutcomeStatus {
    /// Tag used in log lines.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Processed => "OK",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAIL",
        }
    }
}

/// What happened to one matched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: OutcomeStatus,
    pub message: String,
    /// Backup written for this file, when one was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

impl FileOutcome {
    /// `[OK|FAIL|SKIPPED] <path> -> <message>`
    pub fn log_line(&self) -> String {
        format!(
            "[{}] {} -> {}",
            self.status.tag(),
            self.path.display(),
            self.message
        )
    }
}

/// Result of a resize scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub dry_run: bool,
    pub scanned_path: PathBuf,
    /// Every match, whatever its outcome.
    pub files_found: usize,
    /// Matches processed (or that would be, in a dry run).
    pub processed: usize,
    /// One entry per match, in walk order.
    pub outcomes: Vec<FileOutcome>,
    /// Directories below the root that could not be walked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DirectoryIssue>,
}

impl ScanReport {
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn logs(&self) -> Vec<String> {
        self.outcomes.iter().map(FileOutcome::log_line).collect()
    }
}

/// An existing backup found by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub backup_path: PathBuf,
    /// Sibling path derived from the backup name.
    pub original_path: PathBuf,
    /// Backup file name.
    pub filename: String,
    /// Parsed from the name; `None` for hand-made names with a bad suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backed_up_at: Option<NaiveDateTime>,
}

/// Everything the catalog found under one root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupInventory {
    pub backups: Vec<BackupRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DirectoryIssue>,
}

/// One restore instruction: put `backup_path` back at `original_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreItem {
    pub backup_path: PathBuf,
    pub original_path: PathBuf,
}

impl From<&BackupRecord> for RestoreItem {
    fn from(record: &BackupRecord) -> Self {
        Self {
            backup_path: record.backup_path.clone(),
            original_path: record.original_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreOutcome {
    pub backup_path: PathBuf,
    pub original_path: PathBuf,
    pub restored: bool,
    /// Display line, e.g. `Restored & Deleted Backup: photo.png`.
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    pub restored: usize,
    /// One entry per item, in the order supplied.
    pub outcomes: Vec<RestoreOutcome>,
}

impl RestoreReport {
    pub fn logs(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.message.clone()).collect()
    }
}
