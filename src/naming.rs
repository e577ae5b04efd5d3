//! Backup file naming convention.
//!
//! Every backup lives next to its original and is named by appending a fixed
//! marker and a fixed-width timestamp to the original file name:
//!
//! ```text
//! photo.png                         original
//! photo.png.backup_20240131154500   backup taken 2024-01-31 15:45:00
//! ```
//!
//! The marker never appears in a target file name (scan requests containing it
//! are rejected), so splitting on its first occurrence always recovers the
//! original name.
//!
//! ## Two recognizers
//!
//! - [`is_backup_of`] is an exact prefix test used during a scan, where the
//!   original name is known.
//! - [`contains_marker`] is a substring test used by the catalog, where it is
//!   not. Any file carrying the marker anywhere is treated as a backup
//!   candidate.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Separator between the original file name and the timestamp.
pub const BACKUP_MARKER: &str = ".backup_";

/// `strftime` layout of the timestamp suffix: 14 digits, `YYYYMMDDHHMMSS`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_LEN: usize = 14;

/// Build the backup file name for `original` taken at `timestamp`.
///
/// - `("photo.png", 2024-01-31 15:45:00)` → `"photo.png.backup_20240131154500"`
pub fn name_for(original: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}{}{}",
        original,
        BACKUP_MARKER,
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Backup path for a file: same directory, file name run through [`name_for`].
pub fn backup_path_for(original: &Path, timestamp: &NaiveDateTime) -> PathBuf {
    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    original.with_file_name(name_for(&name, timestamp))
}

/// True if `candidate` is a backup of a file named `original`.
pub fn is_backup_of(candidate: &str, original: &str) -> bool {
    candidate
        .strip_prefix(original)
        .is_some_and(|rest| rest.starts_with(BACKUP_MARKER))
}

/// True if the marker appears anywhere in `name`.
pub fn contains_marker(name: &str) -> bool {
    name.contains(BACKUP_MARKER)
}

/// Recover the original file name from a backup name.
///
/// Splits on the first marker. Returns `None` when the marker is absent.
pub fn original_from(backup_name: &str) -> Option<&str> {
    backup_name
        .split_once(BACKUP_MARKER)
        .map(|(original, _)| original)
}

/// Parse the timestamp suffix of a backup name.
///
/// Only a suffix of exactly 14 ASCII digits that forms a valid date is
/// accepted; anything else (hand-made copies, truncated names) gives `None`.
pub fn timestamp_of(backup_name: &str) -> Option<NaiveDateTime> {
    let (_, suffix) = backup_name.split_once(BACKUP_MARKER)?;
    if suffix.len() != TIMESTAMP_LEN || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(suffix, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn name_for_appends_marker_and_timestamp() {
        let name = name_for("photo.png", &ts(2024, 1, 31, 15, 45, 0));
        assert_eq!(name, "photo.png.backup_20240131154500");
    }

    #[test]
    fn name_for_zero_pads_fields() {
        let name = name_for("a.jpg", &ts(2025, 3, 4, 5, 6, 7));
        assert_eq!(name, "a.jpg.backup_20250304050607");
    }

    #[test]
    fn backup_path_stays_in_same_directory() {
        let path = backup_path_for(Path::new("/srv/a/photo.png"), &ts(2024, 1, 31, 15, 45, 0));
        assert_eq!(
            path,
            PathBuf::from("/srv/a/photo.png.backup_20240131154500")
        );
    }

    #[test]
    fn original_round_trips_through_name_for() {
        let stamps = [ts(1999, 12, 31, 23, 59, 59), ts(2024, 2, 29, 0, 0, 0)];
        let names = ["photo.png", "no-extension", "dots.in.name.jpeg", "with space.webp"];
        for t in &stamps {
            for n in names {
                assert_eq!(original_from(&name_for(n, t)), Some(n));
            }
        }
    }

    #[test]
    fn original_from_without_marker_is_none() {
        assert_eq!(original_from("photo.png"), None);
        assert_eq!(original_from("photo.png.bak"), None);
    }

    #[test]
    fn original_from_splits_on_first_marker() {
        assert_eq!(
            original_from("a.png.backup_1.backup_20240101000000"),
            Some("a.png")
        );
    }

    #[test]
    fn is_backup_of_exact_prefix() {
        assert!(is_backup_of("photo.png.backup_20240131154500", "photo.png"));
        // marker with any suffix still counts: presence is what suppresses reprocessing
        assert!(is_backup_of("photo.png.backup_", "photo.png"));
    }

    #[test]
    fn is_backup_of_rejects_other_originals() {
        assert!(!is_backup_of("other.png.backup_20240131154500", "photo.png"));
        assert!(!is_backup_of("photo.png", "photo.png"));
        assert!(!is_backup_of("xphoto.png.backup_20240131154500", "photo.png"));
        assert!(!is_backup_of("photo.png.old.backup_20240131154500", "photo.png"));
    }

    #[test]
    fn contains_marker_is_substring_match() {
        assert!(contains_marker("photo.png.backup_20240131154500"));
        assert!(contains_marker("notes.backup_draft.txt"));
        assert!(!contains_marker("photo.png"));
        assert!(!contains_marker("photo.backup"));
    }

    #[test]
    fn timestamp_of_parses_valid_suffix() {
        assert_eq!(
            timestamp_of("photo.png.backup_20240131154500"),
            Some(ts(2024, 1, 31, 15, 45, 0))
        );
    }

    #[test]
    fn timestamp_of_rejects_malformed_suffix() {
        assert_eq!(timestamp_of("photo.png"), None);
        assert_eq!(timestamp_of("photo.png.backup_2024"), None);
        assert_eq!(timestamp_of("photo.png.backup_2024013115450x"), None);
        assert_eq!(timestamp_of("photo.png.backup_20241331154500"), None);
    }
}
