//! Size token resolution.
//!
//! A directive's size token is either the name of a configured preset or a
//! literal `WIDTHxHEIGHT` pattern where either side may be `auto`:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | *(absent)* | native size, no preset attributes |
//! | `gallery` | the `gallery` preset (dimensions and attributes) |
//! | `350x200` | exactly 350×200, cropped to fill |
//! | `350xauto` | 350 wide, height from the aspect ratio |
//! | `AUTOx200` | 200 tall, width from the aspect ratio |
//!
//! Preset names win over patterns, so a preset called `100x100` shadows the
//! literal meaning.

use crate::config::{DEFAULT_SOURCE, PicturePreset, Preset};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("can't find the {0:?} preset; define it in the config or use a WIDTHxHEIGHT pattern")]
    UnknownPreset(String),
    #[error("size {0:?} has a zero side; use a positive number or auto")]
    ZeroSize(String),
}

/// A requested output size. `None` on an axis means "derive from the source".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl SizeRequest {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }
}

impl From<&Preset> for SizeRequest {
    fn from(preset: &Preset) -> Self {
        Self::new(preset.width, preset.height)
    }
}

/// Resolve a single-image size token into a preset.
///
/// The returned preset carries the attributes to merge under the directive's
/// own attributes; literal patterns and an absent token carry none.
pub fn resolve_size(
    token: Option<&str>,
    presets: &BTreeMap<String, Preset>,
) -> Result<Preset, SizeError> {
    let Some(token) = token else {
        return Ok(Preset::default());
    };
    if let Some(preset) = presets.get(token) {
        return Ok(preset.clone());
    }
    match parse_dimensions(token) {
        Some(size) if size.width == Some(0) || size.height == Some(0) => {
            Err(SizeError::ZeroSize(token.to_string()))
        }
        Some(size) => Ok(Preset {
            width: size.width,
            height: size.height,
            ..Preset::default()
        }),
        None => Err(SizeError::UnknownPreset(token.to_string())),
    }
}

/// Resolve a picture token into a responsive preset.
///
/// An absent token selects the picture preset named `default`.
pub fn resolve_picture<'a>(
    token: Option<&str>,
    pictures: &'a BTreeMap<String, PicturePreset>,
) -> Result<&'a PicturePreset, SizeError> {
    let name = token.unwrap_or(DEFAULT_SOURCE);
    pictures
        .get(name)
        .ok_or_else(|| SizeError::UnknownPreset(name.to_string()))
}

/// Parse a `WIDTHxHEIGHT` pattern (case-insensitive, either side `auto`).
///
/// `autoxauto` is valid and means native size.
pub fn parse_dimensions(token: &str) -> Option<SizeRequest> {
    let lower = token.to_ascii_lowercase();
    let (w, h) = lower.split_once('x')?;
    Some(SizeRequest::new(parse_axis(w)?, parse_axis(h)?))
}

/// `Some(None)` for `auto`, `Some(Some(n))` for digits, `None` otherwise.
fn parse_axis(s: &str) -> Option<Option<u32>> {
    if s == "auto" {
        return Some(None);
    }
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().map(Some)
}
