//! Scaled plan dimensions and the box the rotated plan occupies.

use crate::rotation::{Affine, Rotation};

/// Screen-space geometry of the plan for one fit/zoom/rotation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledGeometry {
    /// Width of the unrotated image on screen.
    pub scaled_width: u32,
    /// Height of the unrotated image on screen.
    pub scaled_height: u32,
    /// Axis-aligned footprint the container has to allocate.
    pub box_width: u32,
    pub box_height: u32,
    pub rotation: Rotation,
    pub affine: Affine,
}

impl ScaledGeometry {
    pub fn scaled_size(&self) -> (f64, f64) {
        (f64::from(self.scaled_width), f64::from(self.scaled_height))
    }

    pub fn box_size(&self) -> (f64, f64) {
        (f64::from(self.box_width), f64::from(self.box_height))
    }
}

/// Combines fit scale and zoom into scaled dimensions and box placement.
pub fn compute_transform(
    natural_width: u32,
    natural_height: u32,
    fit_scale: f64,
    zoom: f64,
    rotation: Rotation,
) -> ScaledGeometry {
    let scale = fit_scale * zoom;
    let scaled_width = scale_dimension(natural_width, scale);
    let scaled_height = scale_dimension(natural_height, scale);
    let (box_width, box_height) = rotation.oriented(scaled_width, scaled_height);

    ScaledGeometry {
        scaled_width,
        scaled_height,
        box_width,
        box_height,
        rotation,
        affine: Affine::for_surface(
            rotation,
            f64::from(scaled_width),
            f64::from(scaled_height),
        ),
    }
}

fn scale_dimension(natural: u32, scale: f64) -> u32 {
    let scaled = (f64::from(natural) * scale).round();
    if scaled.is_finite() && scaled >= 1.0 {
        // Saturating float-to-int cast keeps absurd zoom levels in range.
        scaled as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::compute_fit;

    #[test]
    fn landscape_scenario_at_zero_degrees() {
        let fit = compute_fit(800.0, 450.0, 1600.0, 900.0, Rotation::Deg0, 0.0);
        let geometry = compute_transform(1600, 900, fit, 1.0, Rotation::Deg0);
        assert_eq!((geometry.scaled_width, geometry.scaled_height), (800, 450));
        assert_eq!((geometry.box_width, geometry.box_height), (800, 450));
        assert_eq!(geometry.affine, Affine::IDENTITY);
    }

    #[test]
    fn landscape_scenario_at_ninety_degrees_swaps_box() {
        let fit = compute_fit(800.0, 450.0, 1600.0, 900.0, Rotation::Deg90, 0.0);
        let geometry = compute_transform(1600, 900, fit, 1.0, Rotation::Deg90);
        assert_eq!((geometry.scaled_width, geometry.scaled_height), (450, 253));
        assert_eq!((geometry.box_width, geometry.box_height), (253, 450));
        assert_eq!(geometry.affine.translate_x, 253.0);
        assert_eq!(geometry.affine.translate_y, 0.0);
    }

    #[test]
    fn box_swaps_only_for_quarter_turns() {
        for (w, h, fit, zoom) in [(1600, 900, 0.3, 1.0), (37, 1021, 1.7, 2.4), (5, 5, 0.5, 8.0)] {
            for rotation in Rotation::ALL {
                let g = compute_transform(w, h, fit, zoom, rotation);
                if rotation.swaps_axes() {
                    assert_eq!((g.box_width, g.box_height), (g.scaled_height, g.scaled_width));
                } else {
                    assert_eq!((g.box_width, g.box_height), (g.scaled_width, g.scaled_height));
                }
            }
        }
    }

    #[test]
    fn zoom_multiplies_fit_scale() {
        let g = compute_transform(1000, 500, 0.5, 2.0, Rotation::Deg180);
        assert_eq!((g.scaled_width, g.scaled_height), (1000, 500));
        assert_eq!((g.affine.translate_x, g.affine.translate_y), (1000.0, 500.0));
    }

    #[test]
    fn tiny_scale_never_collapses_to_zero() {
        let g = compute_transform(1600, 900, 1e-6, 0.1, Rotation::Deg270);
        assert_eq!((g.scaled_width, g.scaled_height), (1, 1));
        assert_eq!((g.box_width, g.box_height), (1, 1));
        let g = compute_transform(0, 0, 1.0, 1.0, Rotation::Deg0);
        assert_eq!((g.scaled_width, g.scaled_height), (1, 1));
    }
}
