//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image` crate (pure Rust decoders, first frame) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop | `DynamicImage::crop_imm`, centered |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG, WebP, TIFF, GIF | `DynamicImage::write_to` by extension |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{calculate_fill_dimensions, center_crop_offset};
use super::params::CropParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
///
/// AVIF is excluded: the `image` crate's `"avif"` feature only enables the
/// **encoder** (rav1e), yet `ImageFormat::reading_enabled()` reports `true`
/// for it, so it is filtered out by hand.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from its bytes.
///
/// Files whose extension has no compiled-in decoder are rejected up front.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !supported_input_extensions().contains(&ext.as_str()) {
        return Err(BackendError::ProcessingFailed(format!(
            "No decoder for .{ext} files: {}",
            path.display()
        )));
    }
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => save_jpeg(img, path, quality),
        "avif" => save_avif(img, path, quality),
        other => {
            let format = ImageFormat::from_extension(other)
                .filter(|fmt| fmt.writing_enabled())
                .ok_or_else(|| {
                    BackendError::ProcessingFailed(format!("Unsupported output format: {other}"))
                })?;
            let mut writer = BufWriter::new(File::create(path)?);
            // The WebP encoder only takes 8-bit RGB(A)
            let img = match format {
                ImageFormat::WebP => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
                _ => Cow::Borrowed(img),
            };
            img.write_to(&mut writer, format).map_err(|e| {
                BackendError::ProcessingFailed(format!("{other} encode failed: {e}"))
            })
        }
    }
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

/// Encode and save as AVIF using rav1e (speed=6 for reasonable throughput).
fn save_avif(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let writer = BufWriter::new(File::create(path)?);
    let encoder =
        image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality as u8);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn content<'a>(&self, image: &'a DynamicImage) -> Cow<'a, [u8]> {
        Cow::Borrowed(image.as_bytes())
    }

    fn cover_crop(&self, image: &DynamicImage, params: &CropParams) -> Result<(), BackendError> {
        let target = (params.width, params.height);
        let (fill_w, fill_h) = calculate_fill_dimensions((image.width(), image.height()), target);

        // Scale to cover first, then crop the center
        let filled = if (fill_w, fill_h) == (image.width(), image.height()) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(image.resize_exact(fill_w, fill_h, FilterType::Lanczos3))
        };
        let (x, y) = center_crop_offset((fill_w, fill_h), target);
        let cropped = filled.crop_imm(x, y, params.width, params.height);

        save_image(&cropped, &params.output, params.quality.value())
    }
}
