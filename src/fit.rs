//! Fitting a (possibly rotated) plan image into its container.

use crate::rotation::Rotation;

/// Returns the scale that makes the oriented image fill the container minus
/// `margin`, preserving aspect ratio.
///
/// Degenerate inputs (container no larger than the margin, zero-sized image,
/// non-finite values) yield `1.0` so the image never collapses.
pub fn compute_fit(
    container_width: f64,
    container_height: f64,
    natural_width: f64,
    natural_height: f64,
    rotation: Rotation,
    margin: f64,
) -> f64 {
    let (oriented_width, oriented_height) = rotation.oriented(natural_width, natural_height);

    let finite = [container_width, container_height, oriented_width, oriented_height]
        .iter()
        .all(|v| v.is_finite());

    if !finite
        || container_width <= margin
        || container_height <= margin
        || oriented_width <= 0.0
        || oriented_height <= 0.0
    {
        return 1.0;
    }

    let scale = ((container_width - margin) / oriented_width)
        .min((container_height - margin) / oriented_height);

    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_plan_fills_matching_container() {
        let fit = compute_fit(800.0, 450.0, 1600.0, 900.0, Rotation::Deg0, 0.0);
        assert!((fit - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quarter_turn_uses_swapped_bounding_box() {
        let fit = compute_fit(800.0, 450.0, 1600.0, 900.0, Rotation::Deg90, 0.0);
        let expected = (800.0_f64 / 900.0).min(450.0 / 1600.0);
        assert!((fit - expected).abs() < 1e-12);
        assert!((fit - 0.28125).abs() < 1e-12);
    }

    #[test]
    fn margin_is_subtracted_from_both_axes() {
        let fit = compute_fit(424.0, 1024.0, 400.0, 400.0, Rotation::Deg0, 24.0);
        assert!((fit - 1.0).abs() < 1e-12);
        let fit = compute_fit(224.0, 1024.0, 400.0, 400.0, Rotation::Deg180, 24.0);
        assert!((fit - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_fall_back_to_one() {
        assert_eq!(compute_fit(0.0, 0.0, 1600.0, 900.0, Rotation::Deg0, 24.0), 1.0);
        assert_eq!(compute_fit(24.0, 500.0, 1600.0, 900.0, Rotation::Deg0, 24.0), 1.0);
        assert_eq!(compute_fit(800.0, 600.0, 0.0, 900.0, Rotation::Deg90, 24.0), 1.0);
        assert_eq!(compute_fit(800.0, 600.0, 1600.0, 0.0, Rotation::Deg0, 24.0), 1.0);
        assert_eq!(compute_fit(f64::NAN, 600.0, 1600.0, 900.0, Rotation::Deg0, 0.0), 1.0);
        assert_eq!(
            compute_fit(f64::INFINITY, f64::INFINITY, 1600.0, 900.0, Rotation::Deg0, 0.0),
            1.0
        );
    }

    #[test]
    fn result_is_always_positive_and_finite() {
        let sizes = [0.0, 1.0, 23.0, 24.0, 25.0, 480.0, 1920.0, 10_000.0];
        for &cw in &sizes {
            for &ch in &sizes {
                for &nw in &sizes {
                    for rotation in Rotation::ALL {
                        let fit = compute_fit(cw, ch, nw, 900.0, rotation, 24.0);
                        assert!(fit.is_finite() && fit > 0.0, "{cw}x{ch} {nw} {rotation}");
                    }
                }
            }
        }
    }
}
