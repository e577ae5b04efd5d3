//! CLI output formatting for every command.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! Entities follow a two-level pattern: a header line led by a 3-digit
//! positional index, then indented context lines. Paths are shown relative to
//! the scanned root where possible.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Scanning /photos for photo.png
//! 001 a/photo.png
//!     OK: Success (Backup: photo.png.backup_20240131154500)
//! 002 b/photo.png
//!     SKIPPED: Skipped (Backup already exists)
//! [WARN] /photos/locked -> Permission denied (os error 13)
//!
//! Found 2, processed 1, skipped 1, failed 0
//! ```
//!
//! ## Backups
//!
//! ```text
//! 001 photo.png.backup_20240131154500
//!     Original: a/photo.png
//!     Backed up: 2024-01-31 15:45:00
//!
//! 1 backup
//! ```
//!
//! ## Restore
//!
//! ```text
//! 001 Restored & Deleted Backup: photo.png
//! 002 Error restoring /photos/b/photo.png.backup_...: No such file or directory
//!
//! Restored 1 of 2
//! ```

use crate::browse::DirectoryListing;
use crate::scan::ScanEvent;
use crate::types::{BackupInventory, FileOutcome, OutcomeStatus, RestoreReport, ScanReport};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root`, or the full path when it is outside `root`.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Header line plus status line for one matched file.
fn outcome_lines(index: usize, outcome: &FileOutcome, root: &Path) -> Vec<String> {
    vec![
        format!("{} {}", format_index(index), relative(&outcome.path, root)),
        format!("{}{}: {}", indent(1), outcome.status.tag(), outcome.message),
    ]
}

/// Format a single scan progress event as display lines.
///
/// `root` is the scanned directory; file paths are shown relative to it.
pub fn format_scan_event(event: &ScanEvent, root: &Path) -> Vec<String> {
    match event {
        ScanEvent::Started {
            root,
            target,
            dry_run,
        } => {
            let suffix = if *dry_run { " (dry run)" } else { "" };
            vec![format!(
                "Scanning {} for {}{}",
                root.display(),
                target,
                suffix
            )]
        }
        ScanEvent::FileFinished { index, outcome } => outcome_lines(*index, outcome, root),
        ScanEvent::DirectorySkipped(issue) => vec![issue.log_line()],
    }
}

/// Closing summary of a scan.
pub fn format_scan_summary(report: &ScanReport) -> Vec<String> {
    let mut lines = vec![String::new()];
    if report.files_found == 0 {
        lines.push("No matching files found".to_string());
        return lines;
    }
    let processed_label = if report.dry_run {
        "would process"
    } else {
        "processed"
    };
    lines.push(format!(
        "Found {}, {} {}, skipped {}, failed {}",
        report.files_found,
        processed_label,
        report.processed,
        report.count(OutcomeStatus::Skipped),
        report.count(OutcomeStatus::Failed),
    ));
    if !report.issues.is_empty() {
        let n = report.issues.len();
        let noun = if n == 1 { "directory" } else { "directories" };
        lines.push(format!("{n} {noun} could not be read"));
    }
    lines
}

pub fn print_scan_event(event: &ScanEvent, root: &Path) {
    for line in format_scan_event(event, root) {
        println!("{}", line);
    }
}

pub fn print_scan_summary(report: &ScanReport) {
    for line in format_scan_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Backups
// ============================================================================

/// Numbered inventory of backups under `root`.
pub fn format_backups(inventory: &BackupInventory, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, record) in inventory.backups.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), record.filename));
        lines.push(format!(
            "{}Original: {}",
            indent(1),
            relative(&record.original_path, root)
        ));
        if let Some(at) = record.backed_up_at {
            lines.push(format!(
                "{}Backed up: {}",
                indent(1),
                at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }
    lines.extend(inventory.issues.iter().map(|issue| issue.log_line()));

    if !lines.is_empty() {
        lines.push(String::new());
    }
    if inventory.backups.is_empty() {
        lines.push("No backups found".to_string());
    } else {
        lines.push(plural(inventory.backups.len(), "backup"));
    }
    lines
}

pub fn print_backups(inventory: &BackupInventory, root: &Path) {
    for line in format_backups(inventory, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Restore
// ============================================================================

pub fn format_restore_report(report: &RestoreReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{} {}", format_index(i + 1), o.message))
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Restored {} of {}",
        report.restored,
        report.outcomes.len()
    ));
    lines
}

pub fn print_restore_report(report: &RestoreReport) {
    for line in format_restore_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Browse
// ============================================================================

pub fn format_listing(listing: &DirectoryListing) -> Vec<String> {
    let mut lines = vec![
        listing.current_path.display().to_string(),
        format!("{}Parent: {}", indent(1), listing.parent_path.display()),
    ];
    for (i, folder) in listing.folders.iter().enumerate() {
        lines.push(format!("{}{} {}/", indent(1), format_index(i + 1), folder));
    }
    lines
}

pub fn print_listing(listing: &DirectoryListing) {
    for line in format_listing(listing) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
