//! JSON request/response boundary.
//!
//! Transport-agnostic: a front end (HTTP handler, UI bridge, or the CLI's
//! `request` command) hands in a request kind and a JSON body and gets back
//! either a JSON response or a [`RequestError`] with a status code.
//!
//! | Kind | Request body | Response |
//! |---|---|---|
//! | `scan` | `{folder_path, image_name, width, height, dry_run?}` | [`ScanResponse`] |
//! | `backups` | `{folder_path}` | [`BackupsResponse`] |
//! | `restore` | `{files: [{backup_path, original_path}]}` | [`RestoreResponse`] |
//! | `browse` | `{path?}` | [`DirectoryListing`] |
//!
//! Request fields are all optional at the serde level so a missing field
//! becomes a `Missing required fields` error (400) instead of a parse error.
//! A root that is not a directory is 404 for `scan`/`backups`; `browse`
//! answers 400 `Invalid directory`. Unreadable directories are 403.

use crate::browse::{self, BrowseError, DirectoryListing};
use crate::catalog;
use crate::config::RefitConfig;
use crate::restore;
use crate::scan::{self, ScanError};
use crate::transform::{ImageResizer, Transformer};
use crate::types::{BackupRecord, RestoreItem, ScanReport, ScanRequest};
use crate::walk::{DirectoryIssue, WalkError, WalkOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid request: {0}")]
    Invalid(String),
    #[error("Malformed request body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unknown request kind: {0}")]
    UnknownKind(String),
    #[error("Directory does not exist")]
    DirectoryNotFound(PathBuf),
    #[error("Invalid directory")]
    InvalidDirectory(PathBuf),
    #[error("Permission denied")]
    PermissionDenied(PathBuf),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    /// HTTP-style status code for the transport.
    pub fn code(&self) -> u16 {
        match self {
            Self::MissingFields
            | Self::Invalid(_)
            | Self::Malformed(_)
            | Self::UnknownKind(_)
            | Self::InvalidDirectory(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::DirectoryNotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryNotFound(p) | Self::InvalidDirectory(p) | Self::PermissionDenied(p) => {
                Some(p)
            }
            _ => None,
        }
    }

    /// `{"error": <message>, "path"?: <path>}`
    pub fn to_body(&self) -> serde_json::Value {
        match self.path() {
            Some(path) => json!({ "error": self.to_string(), "path": path }),
            None => json!({ "error": self.to_string() }),
        }
    }
}

impl From<WalkError> for RequestError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::NotADirectory(p) => Self::DirectoryNotFound(p),
            WalkError::AccessDenied { path, .. } => Self::PermissionDenied(path),
            WalkError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<ScanError> for RequestError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Walk(e) => e.into(),
            ScanError::InvalidRequest(msg) => Self::Invalid(msg),
        }
    }
}

impl From<BrowseError> for RequestError {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::InvalidDirectory(p) => Self::InvalidDirectory(p),
            BrowseError::PermissionDenied { path, .. } => Self::PermissionDenied(path),
            other => Self::Internal(other.to_string()),
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A dimension sent either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(u64),
    Text(String),
}

impl Dimension {
    /// `None` for values a form would send when left blank (0, "").
    fn value(&self, field: &str) -> Result<Option<u32>, RequestError> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) if s.trim().is_empty() => return Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| RequestError::Invalid(format!("{field} must be a number, got {s:?}")))?,
        };
        if n == 0 {
            return Ok(None);
        }
        u32::try_from(n)
            .map(Some)
            .map_err(|_| RequestError::Invalid(format!("{field} is too large: {n}")))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanPayload {
    pub folder_path: Option<PathBuf>,
    pub image_name: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    /// Absent or `null` means a real run.
    pub dry_run: Option<bool>,
}

impl ScanPayload {
    pub fn into_request(self) -> Result<ScanRequest, RequestError> {
        let width = match &self.width {
            Some(d) => d.value("width")?,
            None => None,
        };
        let height = match &self.height {
            Some(d) => d.value("height")?,
            None => None,
        };
        let root = self.folder_path.filter(|p| !p.as_os_str().is_empty());
        let target = self.image_name.filter(|n| !n.is_empty());

        match (root, target, width, height) {
            (Some(root), Some(target), Some(width), Some(height)) => Ok(ScanRequest {
                root,
                target,
                width,
                height,
                dry_run: self.dry_run.unwrap_or(false),
            }),
            _ => Err(RequestError::MissingFields),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupsPayload {
    pub folder_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestorePayload {
    pub files: Option<Vec<RestoreItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowsePayload {
    pub path: Option<PathBuf>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub status: &'static str,
    pub dry_run: bool,
    pub scanned_path: PathBuf,
    pub files_found: usize,
    pub processed: usize,
    /// `[OK|FAIL|SKIPPED] <path> -> <message>`, in walk order.
    pub logs: Vec<String>,
    /// Directories that could not be walked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<&ScanReport> for ScanResponse {
    fn from(report: &ScanReport) -> Self {
        Self {
            status: "completed",
            dry_run: report.dry_run,
            scanned_path: report.scanned_path.clone(),
            files_found: report.files_found,
            processed: report.processed,
            logs: report.logs(),
            errors: issue_lines(&report.issues),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupsResponse {
    pub backups: Vec<BackupRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreResponse {
    pub status: &'static str,
    pub restored: usize,
    pub logs: Vec<String>,
}

fn issue_lines(issues: &[DirectoryIssue]) -> Vec<String> {
    issues.iter().map(DirectoryIssue::log_line).collect()
}

// ============================================================================
// Handlers
// ============================================================================

pub fn scan(payload: ScanPayload, config: &RefitConfig) -> Result<ScanResponse, RequestError> {
    let resizer = ImageResizer::new(config.resize.filter);
    scan_with_transformer(&resizer, payload, &WalkOptions::from_config(config))
}

/// Scan handler with a specific transformer (allows testing with a mock).
pub fn scan_with_transformer(
    transformer: &impl Transformer,
    payload: ScanPayload,
    walk_options: &WalkOptions,
) -> Result<ScanResponse, RequestError> {
    let request = payload.into_request()?;
    let report = scan::scan_with_transformer(transformer, &request, walk_options, None)?;
    Ok(ScanResponse::from(&report))
}

pub fn find_backups(
    payload: BackupsPayload,
    config: &RefitConfig,
) -> Result<BackupsResponse, RequestError> {
    let root = payload
        .folder_path
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(RequestError::MissingFields)?;
    let inventory = catalog::find_backups(&root, config)?;
    Ok(BackupsResponse {
        errors: issue_lines(&inventory.issues),
        backups: inventory.backups,
    })
}

pub fn restore(payload: RestorePayload) -> Result<RestoreResponse, RequestError> {
    let items = payload.files.ok_or(RequestError::MissingFields)?;
    let report = restore::restore(&items);
    Ok(RestoreResponse {
        status: "completed",
        restored: report.restored,
        logs: report.logs(),
    })
}

pub fn browse(payload: BrowsePayload) -> Result<DirectoryListing, RequestError> {
    Ok(browse::list_directory(payload.path.as_deref())?)
}

/// The four request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Scan,
    Backups,
    Restore,
    Browse,
}

impl FromStr for RequestKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(Self::Scan),
            "backups" => Ok(Self::Backups),
            "restore" => Ok(Self::Restore),
            "browse" => Ok(Self::Browse),
            other => Err(RequestError::UnknownKind(other.to_string())),
        }
    }
}

/// Dispatch a raw JSON body to the handler for `kind`.
///
/// An empty body is treated as `{}`.
pub fn handle(
    kind: RequestKind,
    body: &str,
    config: &RefitConfig,
) -> Result<serde_json::Value, RequestError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    let value = match kind {
        RequestKind::Scan => serde_json::to_value(scan(serde_json::from_str(body)?, config)?)?,
        RequestKind::Backups => {
            serde_json::to_value(find_backups(serde_json::from_str(body)?, config)?)?
        }
        RequestKind::Restore => serde_json::to_value(restore(serde_json::from_str(body)?)?)?,
        RequestKind::Browse => serde_json::to_value(browse(serde_json::from_str(body)?)?)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::touch;
    use crate::transform::backend::tests::MockTransformer;
    use std::fs;
    use tempfile::TempDir;

    fn scan_payload(root: &Path) -> ScanPayload {
        serde_json::from_value(json!({
            "folder_path": root,
            "image_name": "photo.png",
            "width": 100,
            "height": "80",
        }))
        .unwrap()
    }

    // =========================================================================
    // Scan
    // =========================================================================

    #[test]
    fn scan_response_shape() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a/photo.png"), b"a");
        touch(&tmp.path().join("b/photo.png"), b"b");

        let response = scan_with_transformer(
            &MockTransformer::new(),
            scan_payload(tmp.path()),
            &WalkOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "completed");
        assert_eq!(json["dry_run"], false);
        assert_eq!(json["files_found"], 2);
        assert_eq!(json["processed"], 2);
        let logs = json["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        let first = logs[0].as_str().unwrap();
        assert!(first.starts_with(&format!(
            "[OK] {} -> Success (Backup: photo.png.backup_",
            tmp.path().join("a/photo.png").display()
        )));
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn missing_fields_is_400() {
        let cases = [
            json!({}),
            json!({"folder_path": "/tmp", "image_name": "p.png", "width": 10}),
            json!({"folder_path": "/tmp", "image_name": "", "width": 10, "height": 10}),
            json!({"folder_path": "/tmp", "image_name": "p.png", "width": 0, "height": 10}),
            json!({"folder_path": "", "image_name": "p.png", "width": 10, "height": 10}),
        ];
        for case in cases {
            let payload: ScanPayload = serde_json::from_value(case.clone()).unwrap();
            let err = payload.into_request().unwrap_err();
            assert!(matches!(err, RequestError::MissingFields), "{case}");
            assert_eq!(err.code(), 400);
        }
    }

    #[test]
    fn null_or_absent_dry_run_is_a_real_run() {
        for dry_run in [json!(null), json!(false)] {
            let payload: ScanPayload = serde_json::from_value(json!({
                "folder_path": "/tmp", "image_name": "p.png", "width": 1, "height": 1,
                "dry_run": dry_run,
            }))
            .unwrap();
            assert!(!payload.into_request().unwrap().dry_run);
        }
        let absent: ScanPayload = serde_json::from_value(json!({
            "folder_path": "/tmp", "image_name": "p.png", "width": 1, "height": 1
        }))
        .unwrap();
        assert!(!absent.into_request().unwrap().dry_run);

        let dry: ScanPayload = serde_json::from_value(json!({
            "folder_path": "/tmp", "image_name": "p.png", "width": 1, "height": 1,
            "dry_run": true,
        }))
        .unwrap();
        assert!(dry.into_request().unwrap().dry_run);
    }

    #[test]
    fn non_numeric_dimension_is_invalid() {
        let payload: ScanPayload = serde_json::from_value(json!({
            "folder_path": "/tmp", "image_name": "p.png", "width": "wide", "height": 10
        }))
        .unwrap();
        let err = payload.into_request().unwrap_err();
        assert!(matches!(err, RequestError::Invalid(_)));
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn scan_missing_directory_is_404() {
        let tmp = TempDir::new().unwrap();
        let err = scan_with_transformer(
            &MockTransformer::new(),
            scan_payload(&tmp.path().join("missing")),
            &WalkOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.code(), 404);
        assert_eq!(err.to_string(), "Directory does not exist");
        assert_eq!(err.to_body()["error"], "Directory does not exist");
    }

    #[test]
    fn scan_marker_in_target_is_400() {
        let tmp = TempDir::new().unwrap();
        let payload: ScanPayload = serde_json::from_value(json!({
            "folder_path": tmp.path(), "image_name": "p.png.backup_x", "width": 1, "height": 1
        }))
        .unwrap();
        let err =
            scan_with_transformer(&MockTransformer::new(), payload, &WalkOptions::default())
                .unwrap_err();
        assert_eq!(err.code(), 400);
    }

    // =========================================================================
    // Backups and restore
    // =========================================================================

    #[test]
    fn backups_then_restore_through_handle() {
        let tmp = TempDir::new().unwrap();
        let original = tmp.path().join("a/photo.png");
        touch(&original, b"resized");
        touch(&tmp.path().join("a/photo.png.backup_20240101000000"), b"original");
        let config = RefitConfig::default();

        let listed = handle(
            RequestKind::Backups,
            &json!({ "folder_path": tmp.path() }).to_string(),
            &config,
        )
        .unwrap();
        let backups = listed["backups"].as_array().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0]["original_path"], json!(original));

        let body = json!({ "files": [{
            "backup_path": backups[0]["backup_path"],
            "original_path": backups[0]["original_path"],
        }]});
        let restored = handle(RequestKind::Restore, &body.to_string(), &config).unwrap();

        assert_eq!(restored["status"], "completed");
        assert_eq!(restored["restored"], 1);
        assert_eq!(restored["logs"][0], "Restored & Deleted Backup: photo.png");
        assert_eq!(fs::read(&original).unwrap(), b"original");
    }

    #[test]
    fn restore_of_missing_backup_logs_error() {
        let tmp = TempDir::new().unwrap();
        let backup = tmp.path().join("x.png.backup_20240101000000");
        let original = tmp.path().join("x.png");
        touch(&original, b"keep");

        let response = restore(RestorePayload {
            files: Some(vec![RestoreItem {
                backup_path: backup.clone(),
                original_path: original.clone(),
            }]),
        })
        .unwrap();

        assert_eq!(response.restored, 0);
        assert_eq!(response.logs.len(), 1);
        assert!(response.logs[0].starts_with(&format!("Error restoring {}: ", backup.display())));
        assert_eq!(fs::read(&original).unwrap(), b"keep");
    }

    #[test]
    fn restore_without_files_is_400() {
        let err = restore(RestorePayload::default()).unwrap_err();
        assert!(matches!(err, RequestError::MissingFields));
    }

    #[test]
    fn backups_missing_directory_is_404() {
        let tmp = TempDir::new().unwrap();
        let err = find_backups(
            BackupsPayload {
                folder_path: Some(tmp.path().join("missing")),
            },
            &RefitConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), 404);
        assert_eq!(err.path(), Some(tmp.path().join("missing").as_path()));
    }

    // =========================================================================
    // Browse and dispatch
    // =========================================================================

    #[test]
    fn browse_invalid_directory_is_400() {
        let tmp = TempDir::new().unwrap();
        let err = browse(BrowsePayload {
            path: Some(tmp.path().join("missing")),
        })
        .unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.to_string(), "Invalid directory");
    }

    #[test]
    fn browse_lists_folders_through_handle() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();

        let value = handle(
            RequestKind::Browse,
            &json!({ "path": tmp.path() }).to_string(),
            &RefitConfig::default(),
        )
        .unwrap();

        assert_eq!(value["folders"], json!(["a", "b"]));
        assert_eq!(value["current_path"], json!(tmp.path()));
    }

    #[test]
    fn unreadable_root_is_403_with_path() {
        let path = PathBuf::from("/locked");
        let err = RequestError::from(WalkError::AccessDenied {
            path: path.clone(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        assert!(matches!(err, RequestError::PermissionDenied(_)));
        assert_eq!(err.code(), 403);
        assert_eq!(err.path(), Some(path.as_path()));
        let body = err.to_body();
        assert_eq!(body["error"], "Permission denied");
        assert_eq!(body["path"], "/locked");
    }

    #[test]
    fn scan_errors_map_to_status_codes() {
        let missing = RequestError::from(ScanError::Walk(WalkError::NotADirectory(
            PathBuf::from("/nope"),
        )));
        assert_eq!(missing.code(), 404);
        assert_eq!(missing.to_body()["path"], "/nope");

        let invalid = RequestError::from(ScanError::InvalidRequest("bad".into()));
        assert_eq!(invalid.code(), 400);
        assert!(invalid.to_body().get("path").is_none());
    }

    #[test]
    fn malformed_body_is_400() {
        let err = handle(RequestKind::Scan, "{not json", &RefitConfig::default()).unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn empty_body_is_missing_fields() {
        let err = handle(RequestKind::Scan, "  ", &RefitConfig::default()).unwrap_err();
        assert!(matches!(err, RequestError::MissingFields));
    }

    #[test]
    fn request_kind_parsing() {
        assert_eq!("scan".parse::<RequestKind>().unwrap(), RequestKind::Scan);
        assert_eq!("browse".parse::<RequestKind>().unwrap(), RequestKind::Browse);
        assert!(matches!(
            "resize".parse::<RequestKind>(),
            Err(RequestError::UnknownKind(_))
        ));
    }
}
