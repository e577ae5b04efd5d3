//! Shared test utilities for building and inspecting scratch trees.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch(&tmp.path().join("a/photo.png"), b"original");
//! write_png(&tmp.path().join("b/photo.png"), 40, 30);
//!
//! let before = snapshot_tree(tmp.path());
//! // ... dry run ...
//! assert_eq!(snapshot_tree(tmp.path()), before);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn touch(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// Write a `width`x`height` gradient PNG to `path`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Inspection
// =========================================================================

/// Every file under `root` (relative path -> content), for before/after
/// comparisons.
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}
