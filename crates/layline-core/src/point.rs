use serde::{Deserialize, Serialize};

use crate::coord::{self, Fixp, Grid};
use crate::error::CoordError;

/// An immutable point in fixed-point coordinates.
///
/// The original stored points in one of two integer widths depending on
/// magnitude; here storage is always 64-bit, so the split disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Fixp,
    pub y: Fixp,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    #[must_use]
    pub const fn from_fixp(x: Fixp, y: Fixp) -> Self {
        Self { x, y }
    }

    pub fn from_grid(x: Grid, y: Grid) -> Result<Self, CoordError> {
        Ok(Self {
            x: coord::grid_to_fixp(x)?,
            y: coord::grid_to_fixp(y)?,
        })
    }

    pub fn from_user(x: f64, y: f64) -> Result<Self, CoordError> {
        Ok(Self {
            x: coord::user_to_fixp(x)?,
            y: coord::user_to_fixp(y)?,
        })
    }

    #[must_use]
    pub fn grid_x(&self) -> Grid {
        coord::fixp_to_grid(self.x)
    }

    #[must_use]
    pub fn grid_y(&self) -> Grid {
        coord::fixp_to_grid(self.y)
    }

    #[must_use]
    pub fn user_x(&self) -> f64 {
        coord::fixp_to_user(self.x)
    }

    #[must_use]
    pub fn user_y(&self) -> f64 {
        coord::fixp_to_user(self.y)
    }

    #[must_use]
    pub fn offset(&self, dx: Fixp, dy: Fixp) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Distance to `other` in fixed-point units.
    ///
    /// Axis-aligned pairs use the exact absolute difference; the general
    /// case uses `hypot`, which stays accurate for large coordinates.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        if self.x == other.x {
            return (other.y - self.y).abs() as f64;
        }
        if self.y == other.y {
            return (other.x - self.x).abs() as f64;
        }
        ((other.x - self.x) as f64).hypot((other.y - self.y) as f64)
    }

    /// Angle from this point to `other`, radians counter-clockwise from +X.
    #[must_use]
    pub fn angle_to(&self, other: &Point) -> f64 {
        ((other.y - self.y) as f64).atan2((other.x - self.x) as f64)
    }
}
