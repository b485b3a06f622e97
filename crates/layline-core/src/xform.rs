//! Affine transforms over fixed-point points.

use crate::coord;
use crate::error::CoordError;
use crate::point::Point;

/// A 2x3 affine transform. Applied in fixed-point space; results snap back
/// to fixed point with round-half-to-even.
///
/// Column vector convention: `x' = m00*x + m01*y + tx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    #[must_use]
    pub fn translate(dx: f64, dy: f64) -> Self {
        Affine {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn rotate_deg(angle_deg: f64) -> Self {
        let (s, c) = angle_deg.to_radians().sin_cos();
        Affine {
            m00: c,
            m01: -s,
            m10: s,
            m11: c,
            tx: 0.0,
            ty: 0.0,
        }
    }

    #[must_use]
    pub fn rotate_about(angle_deg: f64, center: Point) -> Self {
        Affine::translate(-(center.x as f64), -(center.y as f64))
            .then(&Affine::rotate_deg(angle_deg))
            .then(&Affine::translate(center.x as f64, center.y as f64))
    }

    /// Mirror across the vertical axis x = 0.
    #[must_use]
    pub fn mirror_x() -> Self {
        Affine {
            m00: -1.0,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn scale(factor: f64) -> Self {
        Affine {
            m00: factor,
            m11: factor,
            ..Self::IDENTITY
        }
    }

    /// Compose: apply `self` first, then `next`.
    #[must_use]
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            m00: next.m00 * self.m00 + next.m01 * self.m10,
            m01: next.m00 * self.m01 + next.m01 * self.m11,
            m10: next.m10 * self.m00 + next.m11 * self.m10,
            m11: next.m10 * self.m01 + next.m11 * self.m11,
            tx: next.m00 * self.tx + next.m01 * self.ty + next.tx,
            ty: next.m10 * self.tx + next.m11 * self.ty + next.ty,
        }
    }

    #[must_use]
    pub fn apply_raw(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.m00 * x + self.m01 * y + self.tx,
            self.m10 * x + self.m11 * y + self.ty,
        )
    }

    pub fn apply(&self, p: Point) -> Result<Point, CoordError> {
        let (x, y) = self.apply_raw(p.x as f64, p.y as f64);
        Ok(Point::from_fixp(coord::snap_fixp(x)?, coord::snap_fixp(y)?))
    }

    /// True when the linear part is anything other than the identity
    /// (rotation, mirroring or scaling).
    #[must_use]
    pub fn reorients(&self) -> bool {
        self.m00 != 1.0 || self.m01 != 0.0 || self.m10 != 0.0 || self.m11 != 1.0
    }

    /// Decompose the linear part into a discrete rotation: the number of
    /// counter-clockwise quadrants the +X axis lands in, and whether the
    /// transform mirrors. Non-manhattan rotations snap to the nearest
    /// quadrant.
    #[must_use]
    pub fn quadrant(&self) -> (u8, bool) {
        let angle = self.m10.atan2(self.m00);
        let quads = (angle / std::f64::consts::FRAC_PI_2).round() as i32;
        let mirrored = self.m00 * self.m11 - self.m01 * self.m10 < 0.0;
        ((quads.rem_euclid(4)) as u8, mirrored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::FIXP_PER_GRID;

    #[test]
    fn rotation_about_a_center_is_exact_on_quadrants() {
        let c = Point::from_fixp(10 * FIXP_PER_GRID, 10 * FIXP_PER_GRID);
        let t = Affine::rotate_about(90.0, c);
        let p = Point::from_fixp(20 * FIXP_PER_GRID, 10 * FIXP_PER_GRID);
        let q = t.apply(p).unwrap();
        assert_eq!(q, Point::from_fixp(10 * FIXP_PER_GRID, 20 * FIXP_PER_GRID));
    }

    #[test]
    fn composition_applies_left_to_right() {
        let t = Affine::rotate_deg(90.0).then(&Affine::translate(5.0, 0.0));
        let (x, y) = t.apply_raw(1.0, 0.0);
        assert!((x - 5.0).abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn quadrant_decomposition() {
        assert_eq!(Affine::IDENTITY.quadrant(), (0, false));
        assert_eq!(Affine::rotate_deg(90.0).quadrant(), (1, false));
        assert_eq!(Affine::rotate_deg(180.0).quadrant(), (2, false));
        assert_eq!(Affine::rotate_deg(-90.0).quadrant(), (3, false));
        assert_eq!(Affine::mirror_x().quadrant().1, true);
        // Off-axis rotations snap to the nearest quadrant.
        assert_eq!(Affine::rotate_deg(80.0).quadrant(), (1, false));
    }

    #[test]
    fn translation_overflow_is_an_error() {
        let t = Affine::translate(1e300, 0.0);
        assert!(t.apply(Point::ORIGIN).is_err());
    }
}
