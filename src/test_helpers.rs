//! Shared test utilities for the image-tag test suite.
//!
//! Provides synthetic image writers, filesystem helpers, and a small site
//! fixture (source root + destination root in one temp directory).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (tmp, site) = setup_site();
//! create_test_jpeg(&site.source_root.join("poster.jpg"), 800, 600);
//!
//! let config = config_from(r#"
//! [presets.gallery]
//! width = 400
//! "#);
//! ```

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::config::{SiteConfig, resolve_config, stock_defaults_value};
use crate::tag::SitePaths;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp directory holding `src/` (site source) and `_site/` (destination).
///
/// Keep the `TempDir` alive for the duration of the test.
pub fn setup_site() -> (TempDir, SitePaths) {
    let tmp = TempDir::new().unwrap();
    let site = SitePaths::new(tmp.path().join("src"), tmp.path().join("_site"));
    std::fs::create_dir_all(&site.source_root).unwrap();
    (tmp, site)
}

/// Parse a config snippet over the stock defaults. Panics if invalid.
pub fn config_from(toml_text: &str) -> SiteConfig {
    let overlay: toml::Value = toml::from_str(toml_text).unwrap();
    resolve_config(stock_defaults_value(), Some(overlay)).unwrap()
}

// =========================================================================
// Filesystem
// =========================================================================

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Every regular file under `dir`, recursively, sorted. Empty if `dir` is missing.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(list_files(&path));
        } else {
            files.push(path);
        }
    }
    files.sort();
    files
}

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Create a two-frame GIF. The first frame is fixed; `second` fills the second.
pub fn create_test_gif(path: &Path, width: u32, height: u32, second: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let first = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 128, 0, 255])
        }
    });
    let [r, g, b] = second;
    let second = RgbaImage::from_pixel(width, height, image::Rgba([r, g, b, 255]));
    let delay = Delay::from_numer_denom_ms(100, 1);
    let file = std::fs::File::create(path).unwrap();
    GifEncoder::new(std::io::BufWriter::new(file))
        .encode_frames([
            Frame::from_parts(first, 0, 0, delay),
            Frame::from_parts(second, 0, 0, delay),
        ])
        .unwrap();
}

// =========================================================================
// Logs
// =========================================================================

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` on this thread with a plain-text subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
