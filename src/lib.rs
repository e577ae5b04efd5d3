//! # Refit
//!
//! Find every copy of a named file under a directory tree, keep a backup of
//! each one next to it, resize the original in place, and put the backups
//! back later.
//!
//! # Lifecycle
//!
//! ```text
//! 1. Scan      photo.png            →  photo.png.backup_20240131154500 + resized photo.png
//! 2. Backups   root/                →  inventory of every *.backup_* file
//! 3. Restore   inventory            →  originals reinstated, backups deleted
//! ```
//!
//! A backup is the only state the tool keeps. Its name carries the original
//! file name and the time it was taken, so the inventory can be rebuilt from
//! the filesystem alone and a second scan knows to leave a file alone.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the tree, backs up and resizes each match, reports per-file outcomes |
//! | [`catalog`] | Lists existing backups and derives their original paths |
//! | [`restore`] | Copies backups over their originals and deletes them |
//! | [`walk`] | Deterministic depth-first directory walk with per-directory issues |
//! | [`naming`] | `<name>.backup_<YYYYMMDDHHMMSS>` construction and recognition |
//! | [`transform`] | The [`transform::Transformer`] seam and the `image`-based resizer |
//! | [`fsops`] | Metadata-preserving copy and SHA-256 verification |
//! | [`browse`] | Sub-directory listing for picking a scan root |
//! | [`api`] | JSON request/response boundary with status codes |
//! | [`config`] | `refit.toml` loading, merging, and validation |
//! | [`types`] | Request and report types shared by every module |
//! | [`output`] | CLI text formatting |
//!
//! # Design Decisions
//!
//! ## Backup Before Touch
//!
//! A file is only transformed after its backup has been written with an
//! exclusive create and checksummed against the original. If anything in that
//! sequence fails the original is never opened for writing, so a failed run
//! cannot lose data. Two scans racing on the same tree cannot overwrite each
//! other's backups either: the second exclusive create fails.
//!
//! ## Name-Based Recognition
//!
//! A sibling whose name starts with `<target>.backup_` means "already done".
//! There is no database or sidecar file; deleting a backup by hand makes the
//! file eligible again.
//!
//! ## Swappable Transform
//!
//! The scan drives a [`transform::Transformer`], not the resizer directly.
//! Tests run whole scans against a recording mock without decoding images.

pub mod api;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod fsops;
pub mod naming;
pub mod output;
pub mod restore;
pub mod scan;
pub mod transform;
pub mod types;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
