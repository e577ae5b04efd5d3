//! Parameter types for the in-place transform.
//!
//! These structs describe *what* to do, not *how*. The scan engine builds a
//! [`ResizeParams`] per matched file and hands it to whatever
//! [`Transformer`](super::Transformer) it was given, so tests can swap in a
//! mock without touching real images.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Resampling filter used when resizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull-rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

/// Resize the file at `path` in place to exactly `width` x `height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeParams {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}
