//! File copies that keep metadata, plus content checksums.
//!
//! Backups and restores both go through [`copy_preserving`]: content is
//! streamed, then permissions and access/modification times are carried over
//! from the source. Backups are created with [`CopyMode::CreateNew`], so an
//! existing file at the destination is never overwritten.

use sha2::{Digest, Sha256};
use std::fs::{self, File, FileTimes, Metadata, OpenOptions};
use std::io;
use std::path::Path;

/// How the destination file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Fail with `AlreadyExists` if the destination exists.
    CreateNew,
    /// Truncate and replace the destination's content.
    Overwrite,
}

/// Copy `src` to `dst`, preserving permissions and timestamps.
///
/// With [`CopyMode::CreateNew`] a destination this call created is removed
/// again if the copy fails part way, so no truncated file is left behind. A
/// destination that was never opened (missing source, existing file) is not
/// touched.
///
/// Returns the number of bytes copied.
pub fn copy_preserving(src: &Path, dst: &Path, mode: CopyMode) -> io::Result<u64> {
    let mut source = File::open(src)?;
    let meta = source.metadata()?;

    let mut options = OpenOptions::new();
    options.write(true);
    match mode {
        CopyMode::CreateNew => options.create_new(true),
        CopyMode::Overwrite => options.create(true).truncate(true),
    };
    let mut dest = options.open(dst)?;

    match fill(&mut source, &meta, &mut dest) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            drop(dest);
            if mode == CopyMode::CreateNew
                && let Err(e) = fs::remove_file(dst)
            {
                tracing::warn!("Could not remove partial copy {}: {}", dst.display(), e);
            }
            Err(err)
        }
    }
}

/// Stream content into `dest`, then carry over times and permissions.
fn fill(source: &mut File, meta: &Metadata, dest: &mut File) -> io::Result<u64> {
    let bytes = io::copy(source, dest)?;
    dest.sync_all()?;

    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    dest.set_times(times)?;
    dest.set_permissions(meta.permissions())?;

    Ok(bytes)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Error unless `a` and `b` hold identical content.
pub fn verify_same_content(a: &Path, b: &Path) -> io::Result<()> {
    let (left, right) = (hash_file(a)?, hash_file(b)?);
    if left == right {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Content mismatch after copy: {} differs from {}",
                b.display(),
                a.display()
            ),
        ))
    }
}
