//! In-place file transform, the one capability the scan engine borrows.
//!
//! - **Parameters**: [`ResizeParams`] and [`ResizeFilter`] describe the change
//! - **Backend**: the [`Transformer`] trait + [`TransformError`]
//! - **Implementation**: [`ImageResizer`], pure Rust via the `image` crate

pub mod backend;
pub mod image_resizer;
mod params;

pub use backend::{TransformError, Transformer};
pub use image_resizer::ImageResizer;
pub use params::{ResizeFilter, ResizeParams};
