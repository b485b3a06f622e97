//! Conversion between user units, grid units and fixed-point units.
//!
//! User units are doubles for the UI. One grid unit is the smallest
//! user-addressable increment. Fixed-point units scale grid units by
//! `2^FRACTION_BITS` for sub-grid intermediate precision.

use crate::error::CoordError;

/// Number of fractional bits separating fixed-point units from grid units.
pub const FRACTION_BITS: u32 = 20;

/// One grid unit expressed in fixed-point units.
pub const FIXP_PER_GRID: i64 = 1 << FRACTION_BITS;

/// A coordinate on the grid.
pub type Grid = i64;

/// A coordinate in fixed-point units.
pub type Fixp = i64;

/// Round to the nearest integer, ties to even.
fn round_half_even(value: f64) -> f64 {
    let floor = value.floor();
    let frac = value - floor;
    if frac > 0.5 {
        floor + 1.0
    } else if frac < 0.5 {
        floor
    } else if (floor * 0.5).fract() == 0.0 {
        floor
    } else {
        floor + 1.0
    }
}

fn to_i64(rounded: f64, original: f64) -> Result<i64, CoordError> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(CoordError::OutOfRange(original));
    }
    Ok(rounded as i64)
}

/// Round a user coordinate to the nearest grid line.
pub fn user_to_grid(user: f64) -> Result<Grid, CoordError> {
    to_i64(round_half_even(user), user)
}

/// Round a user coordinate to the nearest fixed-point value, keeping
/// sub-grid fractions.
pub fn user_to_fixp(user: f64) -> Result<Fixp, CoordError> {
    to_i64(round_half_even(user * FIXP_PER_GRID as f64), user)
}

/// Round a raw fixed-point double onto the fixed-point lattice.
pub fn snap_fixp(value: f64) -> Result<Fixp, CoordError> {
    to_i64(round_half_even(value), value)
}

pub fn grid_to_user(grid: Grid) -> f64 {
    grid as f64
}

pub fn fixp_to_user(fixp: Fixp) -> f64 {
    fixp as f64 / FIXP_PER_GRID as f64
}

/// Exact left shift onto the fixed-point scale.
pub fn grid_to_fixp(grid: Grid) -> Result<Fixp, CoordError> {
    grid.checked_mul(FIXP_PER_GRID)
        .ok_or(CoordError::OutOfRange(grid as f64))
}

/// Round to the nearest grid line (ties to even) and shift back down.
/// Total: every fixed-point value maps to a grid value.
pub fn fixp_to_grid(fixp: Fixp) -> Grid {
    // Arithmetic shift floors toward negative infinity, so the remainder
    // is always non-negative and one rounding rule covers both signs.
    let quot = fixp >> FRACTION_BITS;
    let rem = fixp & (FIXP_PER_GRID - 1);
    let half = FIXP_PER_GRID / 2;
    if rem > half || (rem == half && quot & 1 == 1) {
        quot + 1
    } else {
        quot
    }
}
