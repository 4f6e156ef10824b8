//! Conversions between normalized plan coordinates and screen pixels.
//!
//! Normalized coordinates are fractions of the *unrotated* natural image with
//! the origin at its top-left corner, so they stay valid across rotation,
//! zoom and resize.

use crate::rotation::{Affine, Rotation};
use serde::{Deserialize, Serialize};

/// A position on the plan as fractions of the unrotated image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Builds a point if both coordinates are present, finite and in `[0, 1]`.
    pub fn checked(x: Option<f64>, y: Option<f64>) -> Option<Self> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        match (x, y) {
            (Some(x), Some(y)) if in_range(x) && in_range(y) => Some(Self { x, y }),
            _ => None,
        }
    }
}

/// Projects a normalized point into the pre-rotation surface frame.
///
/// The returned point is the marker center; the caller carries it through the
/// same [`Affine`] as the image. `None` means the
/// marker cannot be placed and should be skipped.
pub fn to_screen(
    normalized_x: Option<f64>,
    normalized_y: Option<f64>,
    scaled_width: f64,
    scaled_height: f64,
) -> Option<(f64, f64)> {
    if !(scaled_width > 0.0 && scaled_height > 0.0) {
        return None;
    }
    let point = NormalizedPoint::checked(normalized_x, normalized_y)?;
    Some((point.x * scaled_width, point.y * scaled_height))
}

/// Converts a click in the rotated box frame back to a normalized point.
///
/// The click is carried back through the inverse of the box placement
/// [`Affine`]. The result is clamped into `[0, 1]` because clicks on the box
/// edge can land a rounding error outside the image.
pub fn from_screen_click(
    click_x: f64,
    click_y: f64,
    scaled_width: f64,
    scaled_height: f64,
    rotation: Rotation,
) -> NormalizedPoint {
    let placement = Affine::for_surface(rotation, scaled_width, scaled_height);
    let (ux, uy) = placement.invert(click_x, click_y);

    NormalizedPoint {
        x: clamp_unit(ux / scaled_width),
        y: clamp_unit(uy / scaled_height),
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
