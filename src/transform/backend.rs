//! Transformer trait and shared error type.
//!
//! The [`Transformer`] trait is the single capability the scan engine needs
//! from the outside world: change a file in place to new dimensions, or say
//! why it could not. The production implementation is
//! [`ImageResizer`](super::image_resizer::ImageResizer).

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Capability that mutates a file in place.
///
/// Implementations must leave the file untouched when they return an error
/// before writing, and must never create or remove other files.
pub trait Transformer {
    fn transform(&self, params: &ResizeParams) -> Result<(), TransformError>;
}

impl<T: Transformer + ?Sized> Transformer for &T {
    fn transform(&self, params: &ResizeParams) -> Result<(), TransformError> {
        (**self).transform(params)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Mock transformer that records calls and rewrites the file with a marker
    /// line instead of decoding anything.
    ///
    /// Paths registered with [`MockTransformer::failing_on`] (or every path,
    /// with [`MockTransformer::always_failing`]) return an error and leave the
    /// file alone.
    #[derive(Default)]
    pub struct MockTransformer {
        pub calls: Mutex<Vec<ResizeParams>>,
        fail_paths: HashSet<PathBuf>,
        fail_all: bool,
    }

    impl MockTransformer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn always_failing() -> Self {
            Self {
                fail_all: true,
                ..Self::default()
            }
        }

        pub fn failing_on(paths: &[&Path]) -> Self {
            Self {
                fail_paths: paths.iter().map(|p| p.to_path_buf()).collect(),
                ..Self::default()
            }
        }

        pub fn get_calls(&self) -> Vec<ResizeParams> {
            self.calls.lock().unwrap().clone()
        }

        /// Content the mock writes for a successful call.
        pub fn marker(width: u32, height: u32) -> Vec<u8> {
            format!("resized {width}x{height}").into_bytes()
        }
    }

    impl Transformer for MockTransformer {
        fn transform(&self, params: &ResizeParams) -> Result<(), TransformError> {
            self.calls.lock().unwrap().push(params.clone());
            if self.fail_all || self.fail_paths.contains(&params.path) {
                return Err(TransformError::ProcessingFailed(format!(
                    "cannot identify image file {}",
                    params.path.display()
                )));
            }
            std::fs::write(&params.path, Self::marker(params.width, params.height))?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_and_rewrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        std::fs::write(&path, b"original").unwrap();
        let mock = MockTransformer::new();

        mock.transform(&ResizeParams {
            path: path.clone(),
            width: 10,
            height: 20,
        })
        .unwrap();

        assert_eq!(mock.get_calls().len(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), MockTransformer::marker(10, 20));
    }

    #[test]
    fn failing_mock_leaves_file_alone() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        std::fs::write(&path, b"original").unwrap();
        let mock = MockTransformer::failing_on(&[&path]);

        let result = mock.transform(&ResizeParams {
            path: path.clone(),
            width: 10,
            height: 20,
        });

        assert!(matches!(result, Err(TransformError::ProcessingFailed(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }

    #[test]
    fn reference_forwards_to_inner() {
        let mock = MockTransformer::always_failing();
        let by_ref: &MockTransformer = &mock;
        let params = ResizeParams {
            path: PathBuf::from("/nowhere.png"),
            width: 1,
            height: 1,
        };
        assert!(Transformer::transform(&by_ref, &params).is_err());
        assert_eq!(mock.get_calls().len(), 1);
    }
}
