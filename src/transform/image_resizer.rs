//! Pure Rust resize backend built on the `image` crate.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Detect format | `ImageReader::with_guessed_format` (content sniffing, not extension) |
//! | Decode | `image` crate decoders (JPEG, PNG, TIFF, WebP) |
//! | Resize | `DynamicImage::resize_exact` with the configured filter |
//! | Encode | same format as the input, into memory first |
//!
//! The encoded bytes are only written over the original once encoding has
//! succeeded, so a decode or encode failure leaves the file as it was.

use super::backend::{TransformError, Transformer};
use super::params::{ResizeFilter, ResizeParams};
use image::ImageReader;
use std::io::Cursor;

/// Resizes images in place to exact dimensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    filter: ResizeFilter,
}

impl ImageResizer {
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }
}

impl Transformer for ImageResizer {
    fn transform(&self, params: &ResizeParams) -> Result<(), TransformError> {
        let path = &params.path;
        if params.width == 0 || params.height == 0 {
            return Err(TransformError::ProcessingFailed(format!(
                "Invalid target size {}x{}",
                params.width, params.height
            )));
        }

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| TransformError::UnsupportedFormat(path.display().to_string()))?;
        let img = reader.decode().map_err(|e| {
            TransformError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;

        let resized = img.resize_exact(params.width, params.height, self.filter.filter_type());

        let mut encoded = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut encoded), format)
            .map_err(|e| {
                TransformError::ProcessingFailed(format!(
                    "Failed to encode {}: {}",
                    path.display(),
                    e
                ))
            })?;
        std::fs::write(path, encoded)?;

        tracing::debug!(
            "Resized {} to {}x{} ({:?}, {})",
            path.display(),
            params.width,
            params.height,
            format,
            self.filter
        );
        Ok(())
    }
}
