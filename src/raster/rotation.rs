use std::fmt;

use kurbo::Affine;
use serde::{Deserialize, Serialize};

/// Accumulated rotation of the frame overlay, in whole degrees
///
/// The accumulated value grows without bound (each quarter-turn request adds
/// 90°); rendering only ever looks at the value wrapped into `0..360`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation {
    degrees: i32,
}

impl Rotation {
    pub const QUARTER_TURN: i32 = 90;

    pub fn from_degrees(degrees: i32) -> Self {
        Self { degrees }
    }

    pub fn from_quarter_turns(turns: i32) -> Self {
        Self {
            degrees: (turns.rem_euclid(4)) * Self::QUARTER_TURN,
        }
    }

    /// Degrees as accumulated, before wrapping
    pub fn degrees(&self) -> i32 {
        self.degrees
    }

    /// Degrees wrapped into `0..360`
    pub fn normalized(&self) -> i32 {
        self.degrees.rem_euclid(360)
    }

    /// Whether the angle lands on a multiple of 90°
    pub fn is_quarter_turn(&self) -> bool {
        self.degrees % Self::QUARTER_TURN == 0
    }

    /// Add a clockwise quarter turn
    pub fn rotated_quarter(self) -> Self {
        let degrees = match self.degrees.checked_add(Self::QUARTER_TURN) {
            Some(degrees) => degrees,
            // Only the wrapped angle is observable, so fold before overflowing.
            None => self.normalized() + Self::QUARTER_TURN,
        };
        Self { degrees }
    }

    pub fn radians(&self) -> f64 {
        f64::from(self.normalized()).to_radians()
    }

    /// Sine and cosine of the wrapped angle, exact for quarter turns
    pub fn sin_cos(&self) -> (f64, f64) {
        match self.normalized() {
            0 => (0.0, 1.0),
            90 => (1.0, 0.0),
            180 => (0.0, -1.0),
            270 => (-1.0, 0.0),
            _ => self.radians().sin_cos(),
        }
    }

    /// Rotation about the origin, clockwise in y-down coordinates
    pub fn to_affine(&self) -> Affine {
        let (sin, cos) = self.sin_cos();
        Affine::new([cos, sin, -sin, cos, 0.0, 0.0])
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.normalized())
    }
}
