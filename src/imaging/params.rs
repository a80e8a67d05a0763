//! Parameter types for image operations.
//!
//! These structs describe *what* to write, not *how*. The cache decides the
//! target box and output path; the [`backend`](super::backend) does the pixel
//! work. Keeping them apart lets tests swap in a mock backend.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Cover-scale then center-crop a decoded image to exactly `width × height`.
///
/// The output format follows the extension of `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
