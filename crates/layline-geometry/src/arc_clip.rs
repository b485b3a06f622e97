//! Clipping of circle/arc-style polygons against a rectangular window.
//!
//! A clipped curve is replaced by wedge triples (center, start, end), one
//! per surviving angular span, and the style is promoted to its arc
//! equivalent.

use std::f64::consts::TAU;

use layline_core::{Fixp, Point, Rect};

use crate::error::GeometryError;
use crate::polygon::Polygon;
use crate::style::Style;

/// Outcome of `clip_arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcClip {
    /// The curve lies fully inside the window; nothing changed.
    Unchanged,
    /// Nothing of the curve lies inside the window; the caller discards
    /// the polygon. The points are left untouched.
    Empty,
    /// The points were replaced by clipped wedge geometry.
    Clipped,
}

/// Candidate boundary point: angle relative to the span start, position.
struct Candidate {
    rel: f64,
    x: f64,
    y: f64,
}

/// Clip a circle/arc-style polygon against `clip`.
///
/// `tolerance` is the near-tangency allowance, in fixed-point units, for
/// the circle/segment intersection construction.
pub fn clip_arc<L>(
    poly: &mut Polygon<L>,
    clip: Rect,
    tolerance: f64,
) -> Result<ArcClip, GeometryError> {
    let style = poly.style();
    if !style.is_curved() || style == Style::Disc {
        return Err(GeometryError::InvalidStyle {
            style: style.name(),
            count: poly.points().len(),
        });
    }
    style.validate_point_count(poly.points().len())?;

    let center = poly.points()[0];
    let radius = poly.circle_radius();
    if radius == 0.0 {
        return Err(GeometryError::DegenerateGeometry(
            "arc center coincides with its radius point",
        ));
    }

    if clip.contains_rect(&poly.bounds()) {
        return Ok(ArcClip::Unchanged);
    }
    if !clip.intersects(&poly.bounds()) {
        return Ok(ArcClip::Empty);
    }

    let full_circle = style.is_circle();
    let (start, sweep) = if full_circle {
        (0.0, TAU)
    } else {
        let s = center.angle_to(&poly.points()[1]);
        let sweep = normalize_sweep(center.angle_to(&poly.points()[2]) - s);
        (s, sweep)
    };

    // Collect candidate boundary points: the arc's own endpoints plus up
    // to two intersections per window edge, keyed by their angle from the
    // center, reordered so the span starts at angle zero.
    let mut candidates: Vec<Candidate> = Vec::new();
    if !full_circle {
        for p in [poly.points()[1], poly.points()[2]] {
            let rel = normalize_angle(center.angle_to(&p) - start);
            candidates.push(Candidate {
                rel: rel.min(sweep),
                x: p.x as f64,
                y: p.y as f64,
            });
        }
    }
    for (a, b) in clip_edges(clip) {
        for (x, y) in circle_segment_intersections(center, radius, a, b, tolerance)? {
            let angle = (y - center.y as f64).atan2(x - center.x as f64);
            let rel = normalize_angle(angle - start);
            if !full_circle && rel > sweep {
                continue;
            }
            candidates.push(Candidate { rel, x, y });
        }
    }

    candidates.sort_by(|a, b| b.rel.total_cmp(&a.rel));
    candidates.dedup_by(|a, b| (a.rel - b.rel).abs() < 1e-9);
    // A full circle wraps: 0 and 2pi name the same boundary point.
    if full_circle && candidates.len() > 1 {
        let first = &candidates[0];
        let last = &candidates[candidates.len() - 1];
        if (first.rel - last.rel - TAU).abs() < 1e-9 {
            candidates.pop();
        }
    }

    if candidates.is_empty() {
        return Ok(ArcClip::Empty);
    }

    // Walk consecutive angle pairs (descending); a pair survives when the
    // midpoint of its span lies inside the window.
    let mut wedges: Vec<Point> = Vec::new();
    let pair_count = if full_circle {
        candidates.len()
    } else {
        candidates.len().saturating_sub(1)
    };
    for i in 0..pair_count {
        let hi = &candidates[i];
        let (lo_rel, lo_x, lo_y) = if i + 1 < candidates.len() {
            let lo = &candidates[i + 1];
            (lo.rel, lo.x, lo.y)
        } else {
            // Wrap-around pair for full circles.
            let lo = &candidates[0];
            (lo.rel - TAU, lo.x, lo.y)
        };
        let mid = start + (hi.rel + lo_rel) / 2.0;
        let mx = center.x as f64 + radius * mid.cos();
        let my = center.y as f64 + radius * mid.sin();
        let inside = mx >= clip.min_x as f64
            && mx <= clip.max_x as f64
            && my >= clip.min_y as f64
            && my <= clip.max_y as f64;
        if inside {
            wedges.push(center);
            wedges.push(Point::from_fixp(lo_x.round() as Fixp, lo_y.round() as Fixp));
            wedges.push(Point::from_fixp(hi.x.round() as Fixp, hi.y.round() as Fixp));
        }
    }

    if wedges.is_empty() {
        return Ok(ArcClip::Empty);
    }
    let promoted = match style {
        Style::Circle => Style::CircleArc,
        Style::ThickCircle => Style::ThickCircleArc,
        other => other,
    };
    poly.replace_geometry(wedges, promoted);
    Ok(ArcClip::Clipped)
}

fn clip_edges(clip: Rect) -> [(Point, Point); 4] {
    let [ll, lr, ur, ul] = clip.corners();
    [(ll, lr), (lr, ur), (ur, ul), (ul, ll)]
}

/// Intersections of a circle with a segment, by the perpendicular-foot
/// construction: drop the center onto the carrier line, then step along
/// it by the half-chord. `tolerance` admits near-tangent lines.
fn circle_segment_intersections(
    center: Point,
    radius: f64,
    a: Point,
    b: Point,
    tolerance: f64,
) -> Result<Vec<(f64, f64)>, GeometryError> {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return Err(GeometryError::DegenerateGeometry(
            "zero-length clip edge",
        ));
    }
    let (ux, uy) = (dx / len, dy / len);
    let t_foot = (center.x as f64 - ax) * ux + (center.y as f64 - ay) * uy;
    let (fx, fy) = (ax + t_foot * ux, ay + t_foot * uy);
    let d = (center.x as f64 - fx).hypot(center.y as f64 - fy);

    let mut out = Vec::new();
    if d > radius + tolerance {
        return Ok(out);
    }
    let half_chord = if d >= radius {
        0.0
    } else {
        (radius * radius - d * d).sqrt()
    };
    let mut offsets = vec![t_foot - half_chord, t_foot + half_chord];
    if half_chord == 0.0 {
        offsets.truncate(1);
    }
    for t in offsets {
        if t >= -tolerance && t <= len + tolerance {
            out.push((ax + t * ux, ay + t * uy));
        }
    }
    Ok(out)
}

fn normalize_angle(a: f64) -> f64 {
    let a = a % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

fn normalize_sweep(a: f64) -> f64 {
    let a = normalize_angle(a);
    if a == 0.0 {
        TAU
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layline_core::FIXP_PER_GRID;

    fn gp(x: i64, y: i64) -> Point {
        Point::from_grid(x, y).unwrap()
    }

    fn grect(lx: i64, ly: i64, hx: i64, hy: i64) -> Rect {
        Rect::from_diagonal(gp(lx, ly), gp(hx, hy))
    }

    fn circle(cx: i64, cy: i64, r: i64) -> Polygon<()> {
        Polygon::new(vec![gp(cx, cy), gp(cx + r, cy)])
            .with_style(Style::Circle)
            .unwrap()
    }

    #[test]
    fn full_circle_clipped_to_first_quadrant() {
        let mut p = circle(0, 0, 10);
        let outcome = clip_arc(&mut p, grect(0, 0, 20, 20), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Clipped);
        assert_eq!(p.style(), Style::CircleArc);
        assert_eq!(p.points().len(), 3);
        assert_eq!(p.points()[0], gp(0, 0));
        // Counter-clockwise from 0 to 90 degrees.
        assert_eq!(p.points()[1], gp(10, 0));
        assert_eq!(p.points()[2], gp(0, 10));
    }

    #[test]
    fn fully_inside_is_a_no_op() {
        let mut p = circle(0, 0, 5);
        let before = p.points().to_vec();
        let outcome = clip_arc(&mut p, grect(-20, -20, 20, 20), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Unchanged);
        assert_eq!(p.points(), before.as_slice());
        assert_eq!(p.style(), Style::Circle);
    }

    #[test]
    fn fully_outside_is_empty() {
        let mut p = circle(0, 0, 5);
        let outcome = clip_arc(&mut p, grect(100, 100, 120, 120), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Empty);
    }

    #[test]
    fn window_inside_the_circle_keeps_nothing() {
        // The window sits wholly inside the disc; the curve itself never
        // enters it.
        let mut p = circle(0, 0, 100);
        let outcome = clip_arc(&mut p, grect(-10, -10, 10, 10), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Empty);
    }

    #[test]
    fn half_plane_clip_keeps_two_quadrants() {
        let mut p = circle(0, 0, 10);
        let outcome = clip_arc(&mut p, grect(0, -20, 20, 20), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Clipped);
        assert_eq!(p.style(), Style::CircleArc);
        // One wedge spanning -90..90 degrees.
        assert_eq!(p.points().len(), 3);
        assert_eq!(p.points()[1], gp(0, -10));
        assert_eq!(p.points()[2], gp(0, 10));
    }

    #[test]
    fn arc_keeps_only_its_span() {
        // Quarter arc 0..90, clipped to the right half-plane x >= 5.
        let mut p = Polygon::<()>::new(vec![gp(0, 0), gp(10, 0), gp(0, 10)])
            .with_style(Style::CircleArc)
            .unwrap();
        let outcome = clip_arc(&mut p, grect(5, -20, 20, 20), 1.0).unwrap();
        assert_eq!(outcome, ArcClip::Clipped);
        assert_eq!(p.points().len(), 3);
        assert_eq!(p.points()[0], gp(0, 0));
        assert_eq!(p.points()[1], gp(10, 0));
        // The cut lands where the circle crosses x = 5.
        let end = p.points()[2];
        assert_eq!(end.x, 5 * FIXP_PER_GRID);
        assert!((end.user_y() - 75f64.sqrt()).abs() < 0.01);
    }

    #[test]
    fn degenerate_radius_is_an_error() {
        let mut p = Polygon::<()>::new(vec![gp(0, 0), gp(0, 0)])
            .with_style(Style::Circle)
            .unwrap();
        assert!(clip_arc(&mut p, grect(-5, -5, 5, 5), 1.0).is_err());
    }
}
