//! Quarter-turn rotations and the affine placement they induce.

use serde::{Deserialize, Serialize};

/// One of the four supported plan orientations, measured clockwise in the
/// y-down screen frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Direction of a rotate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    /// +90°.
    Clockwise,
    /// −90° (the modifier-held action).
    CounterClockwise,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Returns the rotation for an exact multiple of 90 in `0..360`.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    pub fn degrees(self) -> i64 {
        i64::from(self.quarter_turns()) * 90
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// True for 90° and 270°, where width and height trade places.
    pub fn swaps_axes(self) -> bool {
        self.quarter_turns() % 2 == 1
    }

    /// Orients a `(width, height)` pair for this rotation.
    pub fn oriented<T>(self, width: T, height: T) -> (T, T) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn rotated(self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Clockwise => Self::from_quarter_turns(self.quarter_turns() + 1),
            RotateDirection::CounterClockwise => Self::from_quarter_turns(self.quarter_turns() + 3),
        }
    }

    /// Exact `(cos, sin)` of the angle.
    fn cos_sin(self) -> (f64, f64) {
        match self {
            Self::Deg0 => (1.0, 0.0),
            Self::Deg90 => (0.0, 1.0),
            Self::Deg180 => (-1.0, 0.0),
            Self::Deg270 => (0.0, -1.0),
        }
    }
}

impl TryFrom<i64> for Rotation {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(value).ok_or_else(|| format!("invalid rotation: {value}"))
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Rotate-then-translate placement of the image surface inside its box.
///
/// Rotation is anchored at the image's top-left corner; the translation moves
/// the rotated image back so that it exactly covers `[0, box_w] × [0, box_h]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub rotation: Rotation,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        rotation: Rotation::Deg0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Builds the placement for an unrotated surface of `width × height`.
    pub fn for_surface(rotation: Rotation, width: f64, height: f64) -> Self {
        let (cos, sin) = rotation.cos_sin();
        let corners = [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)];
        let (min_x, min_y) = corners
            .iter()
            .map(|&(x, y)| (x * cos - y * sin, x * sin + y * cos))
            .fold((f64::INFINITY, f64::INFINITY), |(mx, my), (x, y)| {
                (mx.min(x), my.min(y))
            });

        // `0.0 - 0.0` style results can leave a negative zero behind.
        Self {
            rotation,
            translate_x: -min_x + 0.0,
            translate_y: -min_y + 0.0,
        }
    }

    /// Maps a point from the unrotated surface frame into the box frame.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let (cos, sin) = self.rotation.cos_sin();
        (
            x * cos - y * sin + self.translate_x,
            x * sin + y * cos + self.translate_y,
        )
    }

    /// Maps a box-frame point back onto the unrotated surface.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let (cos, sin) = self.rotation.cos_sin();
        let dx = x - self.translate_x;
        let dy = y - self.translate_y;
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_clockwise_turns_are_identity() {
        for start in Rotation::ALL {
            let mut r = start;
            for _ in 0..4 {
                r = r.rotated(RotateDirection::Clockwise);
            }
            assert_eq!(r, start);
        }
    }

    #[test]
    fn counter_clockwise_is_plus_270() {
        assert_eq!(
            Rotation::Deg0.rotated(RotateDirection::CounterClockwise),
            Rotation::Deg270
        );
        assert_eq!(
            Rotation::Deg90.rotated(RotateDirection::CounterClockwise),
            Rotation::Deg0
        );
    }

    #[test]
    fn from_degrees_rejects_non_quarter_values() {
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
    }

    #[test]
    fn affine_translations_match_literal_cases() {
        let (w, h) = (800.0, 450.0);
        let cases = [
            (Rotation::Deg0, (0.0, 0.0)),
            (Rotation::Deg90, (h, 0.0)),
            (Rotation::Deg180, (w, h)),
            (Rotation::Deg270, (0.0, w)),
        ];
        for (rotation, (tx, ty)) in cases {
            let affine = Affine::for_surface(rotation, w, h);
            assert_eq!((affine.translate_x, affine.translate_y), (tx, ty), "{rotation}");
        }
    }

    #[test]
    fn affine_keeps_corners_inside_box() {
        let (w, h) = (300.0, 120.0);
        for rotation in Rotation::ALL {
            let affine = Affine::for_surface(rotation, w, h);
            let (bw, bh) = rotation.oriented(w, h);
            for (x, y) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
                let (px, py) = affine.apply(x, y);
                assert!((0.0..=bw).contains(&px) && (0.0..=bh).contains(&py));
            }
        }
    }

    #[test]
    fn invert_undoes_apply() {
        let affine = Affine::for_surface(Rotation::Deg270, 640.0, 480.0);
        let (bx, by) = affine.apply(12.5, 400.0);
        let (x, y) = affine.invert(bx, by);
        assert!((x - 12.5).abs() < 1e-9);
        assert!((y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_plain_degrees() {
        let text = ron::to_string(&Rotation::Deg270).unwrap();
        assert_eq!(text, "270");
        let back: Rotation = ron::from_str("90").unwrap();
        assert_eq!(back, Rotation::Deg90);
        assert!(ron::from_str::<Rotation>("45").is_err());
    }
}
