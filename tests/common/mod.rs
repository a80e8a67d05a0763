//! Fixture helpers for the integration tests.
//!
//! Integration tests link the crate as a library without `cfg(test)`, so the
//! unit-test helpers in `src/test_helpers.rs` are not visible here.

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Write a gradient image; the format follows the extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    img.save(path).unwrap();
}

/// Write a two-frame GIF with a fixed first frame and a solid `second` frame.
pub fn write_gif(path: &Path, width: u32, height: u32, second: [u8; 3]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let first = RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
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

/// Every file under `dir`, recursively, sorted. Empty if `dir` is missing.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files.sort();
    files
}
