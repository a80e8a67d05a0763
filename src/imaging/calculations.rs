//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use serde::Serialize;
use thiserror::Error;

/// Final output size for one source at one requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub target_width: u32,
    pub target_height: u32,
    /// The request exceeded the native size and was shrunk to fit.
    pub was_clamped: bool,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("planned size {width}x{height} has an empty side")]
pub struct DegenerateDimensions {
    pub width: u32,
    pub height: u32,
}

/// Plan output dimensions for a source of `native` size.
///
/// A single requested axis derives the other from the native aspect ratio;
/// both axes are used as given; neither means native size. A plan never
/// exceeds the native size: an oversized request shrinks to the largest box
/// inside the native bounds that keeps the *requested* ratio.
///
/// # Examples
/// ```
/// # use image_tag::imaging::plan_dimensions;
/// // 800x600 at 400xauto → 400x300
/// let plan = plan_dimensions((800, 600), (Some(400), None)).unwrap();
/// assert_eq!((plan.target_width, plan.target_height), (400, 300));
///
/// // 800x600 at 2000x1000 → clamped to 800x400
/// let plan = plan_dimensions((800, 600), (Some(2000), Some(1000))).unwrap();
/// assert_eq!((plan.target_width, plan.target_height), (800, 400));
/// assert!(plan.was_clamped);
/// ```
pub fn plan_dimensions(
    native: (u32, u32),
    requested: (Option<u32>, Option<u32>),
) -> Result<Plan, DegenerateDimensions> {
    let (native_w, native_h) = native;
    if native_w == 0 || native_h == 0 {
        return Err(DegenerateDimensions {
            width: native_w,
            height: native_h,
        });
    }

    let nw = native_w as f64;
    let nh = native_h as f64;
    let native_ratio = nw / nh;

    let (mut w, mut h) = match requested {
        (None, None) => (nw, nh),
        (Some(rw), None) => (rw as f64, rw as f64 / native_ratio),
        (None, Some(rh)) => (native_ratio * rh as f64, rh as f64),
        (Some(rw), Some(rh)) => (rw as f64, rh as f64),
    };

    let was_clamped = w > nw || h > nh;
    if was_clamped && w > 0.0 && h > 0.0 {
        let target_ratio = w / h;
        if native_ratio < target_ratio {
            // Width is the limiting side
            w = nw;
            h = nw / target_ratio;
        } else if native_ratio > target_ratio {
            h = nh;
            w = nh * target_ratio;
        } else {
            w = nw;
            h = nh;
        }
    }

    let width = (w.round() as u32).min(native_w);
    let height = (h.round() as u32).min(native_h);
    if width == 0 || height == 0 {
        return Err(DegenerateDimensions { width, height });
    }

    Ok(Plan {
        target_width: width,
        target_height: height,
        was_clamped,
    })
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Top-left corner of a centered `target` crop inside `filled`.
pub fn center_crop_offset(filled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        filled.0.saturating_sub(target.0) / 2,
        filled.1.saturating_sub(target.1) / 2,
    )
}
