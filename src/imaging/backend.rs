//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines what the generation cache needs from a
//! codec: decode once, report dimensions and normalized content for the
//! digest, then cover-crop and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate and statically linked into the binary.

use super::params::CropParams;
use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// A decoded [`Image`](ImageBackend::Image) is owned by the caller for the
/// duration of one source's planning and generation, then dropped.
pub trait ImageBackend: Sync {
    type Image;

    /// Decode an image file. Animated formats yield their first frame.
    fn decode(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Native dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Normalized content bytes the digest is computed over.
    fn content<'a>(&self, image: &'a Self::Image) -> Cow<'a, [u8]>;

    /// Scale to cover the target box, center-crop to it, and encode.
    fn cover_crop(&self, image: &Self::Image, params: &CropParams) -> Result<(), BackendError>;
}
