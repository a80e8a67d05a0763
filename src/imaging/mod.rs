//! Image processing in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed, first frame) |
//! | **Plan** | [`plan_dimensions`]: aspect math and the no-upscaling clamp |
//! | **Cover crop** | Lanczos3 `resize_exact` + centered `crop_imm` |
//! | **Encode** | by output extension; JPEG/AVIF honor the quality setting |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{DegenerateDimensions, Plan, plan_dimensions};
pub use params::{CropParams, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
