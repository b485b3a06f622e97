//! Style-dispatched geometric predicates: containment, distance,
//! intersection, perimeter and area.
//!
//! Exact queries (on-edge, crossing counts, segment intersection) run in
//! i128 integer arithmetic; metric queries (distance, area of curved
//! shapes) run in doubles.

use std::f64::consts::{PI, TAU};

use layline_core::{Fixp, Point, Rect, FIXP_PER_GRID};

use crate::polygon::Polygon;
use crate::style::Style;

/// Sentinel base for `distance` on strictly interior queries. Deeper hits
/// (closer to the shape's center) rank more negative; boundary contact is
/// exactly zero.
pub const INSIDE_DISTANCE: f64 = -1.0e18;

/// Accepted deviation from the interpolated radius when testing arc
/// membership: half a grid unit.
const ARC_RADIUS_TOLERANCE: f64 = FIXP_PER_GRID as f64 / 2.0;

impl<L> Polygon<L> {
    /// Point-in-polygon, dispatched on style.
    ///
    /// Closed outlines accept boundary points as inside. Open outlines
    /// have no interior: only exact vertex/edge membership is accepted.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self.style() {
            Style::Filled
            | Style::Closed
            | Style::Crossed
            | Style::TextCent
            | Style::TextTop
            | Style::TextBot
            | Style::TextLeft
            | Style::TextRight
            | Style::TextTopLeft
            | Style::TextTopRight
            | Style::TextBotLeft
            | Style::TextBotRight
            | Style::TextBox => {
                if let Some(b) = self.get_box() {
                    return b.contains(p);
                }
                self.outline_contains(p)
            }
            Style::Cross | Style::BigCross => p == self.centroid(),
            Style::Opened
            | Style::OpenedDotted
            | Style::OpenedDashed
            | Style::OpenedThick
            | Style::Vectors => self.straight_edges().iter().any(|&(a, b)| on_segment(p, a, b)),
            Style::Circle | Style::ThickCircle | Style::Disc => {
                let &[c, r] = self.points() else { return false };
                c.distance(&p) <= c.distance(&r)
            }
            Style::CircleArc | Style::ThickCircleArc => self.arc_contains(p),
        }
    }

    /// Horizontal-ray crossing count with exact short-circuits for points
    /// on a vertex or an edge.
    fn outline_contains(&self, p: Point) -> bool {
        let pts = self.points();
        if pts.is_empty() {
            return false;
        }
        let mut crossings = 0u32;
        let n = pts.len();
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            if on_segment(p, a, b) {
                return true;
            }
            // Half-open rule: an edge is crossed when its endpoints straddle
            // the query row; count it when the crossing lies strictly right.
            if (a.y > p.y) != (b.y > p.y) {
                let denom = (b.y - a.y) as i128;
                let num = (a.x - p.x) as i128 * denom + (p.y - a.y) as i128 * (b.x - a.x) as i128;
                if num == 0 {
                    return true;
                }
                if (num > 0) == (denom > 0) {
                    crossings += 1;
                }
            }
        }
        crossings % 2 == 1
    }

    fn arc_contains(&self, p: Point) -> bool {
        for w in self.points().chunks_exact(3) {
            let (c, s, e) = (w[0], w[1], w[2]);
            let r1 = c.distance(&s);
            let r2 = c.distance(&e);
            let start = c.angle_to(&s);
            let sweep = normalize_sweep(c.angle_to(&e) - start);
            let rel = normalize_angle(c.angle_to(&p) - start);
            if rel > sweep {
                continue;
            }
            let r_at = r1 + (r2 - r1) * rel / sweep;
            if (c.distance(&p) - r_at).abs() <= ARC_RADIUS_TOLERANCE {
                return true;
            }
        }
        false
    }

    /// Rectangle-in-polygon: all four corners inside, and no polygon edge
    /// survives clipping against the rectangle with an interior portion.
    /// The second test stops a non-convex outline from piercing through a
    /// rectangle whose corners it contains.
    #[must_use]
    pub fn contains_rect(&self, r: Rect) -> bool {
        if !r.corners().iter().all(|&c| self.contains(c)) {
            return false;
        }
        if self.style().is_curved() {
            return true;
        }
        for &(a, b) in &self.straight_edges() {
            if let Some((mx, my)) = clipped_midpoint(a, b, r) {
                let strictly_inside = mx > r.min_x as f64
                    && mx < r.max_x as f64
                    && my > r.min_y as f64
                    && my < r.max_y as f64;
                if strictly_inside {
                    return false;
                }
            }
        }
        true
    }

    /// The closest point of this polygon to `p`, dispatched on style.
    #[must_use]
    pub fn closest_point(&self, p: Point) -> Point {
        match self.style() {
            Style::Filled
            | Style::TextCent
            | Style::TextTop
            | Style::TextBot
            | Style::TextLeft
            | Style::TextRight
            | Style::TextTopLeft
            | Style::TextTopRight
            | Style::TextBotLeft
            | Style::TextBotRight
            | Style::TextBox => {
                // Filled shapes snap to the cached rectangle when there is
                // one; otherwise narrow to the closed-outline case.
                if let Some(b) = self.get_box() {
                    return Point::from_fixp(
                        p.x.clamp(b.min_x, b.max_x),
                        p.y.clamp(b.min_y, b.max_y),
                    );
                }
                self.outline_closest(p)
            }
            Style::Closed
            | Style::Crossed
            | Style::Opened
            | Style::OpenedDotted
            | Style::OpenedDashed
            | Style::OpenedThick
            | Style::Vectors => self.outline_closest(p),
            Style::Cross | Style::BigCross => self.centroid(),
            Style::Circle | Style::ThickCircle | Style::Disc => {
                let &[c, rp] = self.points() else { return p };
                let r = c.distance(&rp);
                let d = c.distance(&p);
                if self.style() == Style::Disc && d <= r {
                    return p;
                }
                project_at_angle(c, c.angle_to(&p), r)
            }
            Style::CircleArc | Style::ThickCircleArc => self.arc_closest(p),
        }
    }

    fn outline_closest(&self, p: Point) -> Point {
        let edges = self.straight_edges();
        if edges.is_empty() {
            return self.points().first().copied().unwrap_or(p);
        }
        let mut best = edges[0].0;
        let mut best_d = f64::MAX;
        for &(a, b) in &edges {
            let q = closest_on_segment(p, a, b);
            let d = p.distance(&q);
            if d < best_d {
                best_d = d;
                best = q;
            }
        }
        best
    }

    fn arc_closest(&self, p: Point) -> Point {
        let mut best = p;
        let mut best_d = f64::MAX;
        for w in self.points().chunks_exact(3) {
            let (c, s, e) = (w[0], w[1], w[2]);
            let r1 = c.distance(&s);
            let r2 = c.distance(&e);
            let start = c.angle_to(&s);
            let sweep = normalize_sweep(c.angle_to(&e) - start);
            let rel = normalize_angle(c.angle_to(&p) - start).min(sweep);
            let r_at = r1 + (r2 - r1) * rel / sweep;
            let q = project_at_angle(c, start + rel, r_at);
            // Also consider the arc endpoints: a query behind the span's
            // seam projects wrongly otherwise.
            for cand in [q, s, e] {
                let d = p.distance(&cand);
                if d < best_d {
                    best_d = d;
                    best = cand;
                }
            }
        }
        best
    }

    /// Distance from `p` to this polygon.
    ///
    /// Returns 0 when `p` touches the boundary and a negative value based
    /// on `INSIDE_DISTANCE` when `p` is strictly inside, offset by the
    /// distance to the shape's center so deeper hits rank more negative.
    #[must_use]
    pub fn distance(&self, p: Point) -> f64 {
        match self.style() {
            Style::Filled
            | Style::Closed
            | Style::Crossed
            | Style::TextCent
            | Style::TextTop
            | Style::TextBot
            | Style::TextLeft
            | Style::TextRight
            | Style::TextTopLeft
            | Style::TextTopRight
            | Style::TextBotLeft
            | Style::TextBotRight
            | Style::TextBox => {
                if let Some(b) = self.get_box() {
                    return box_distance(p, b);
                }
                let boundary = p.distance(&self.outline_closest(p));
                if boundary == 0.0 {
                    0.0
                } else if self.outline_contains(p) {
                    INSIDE_DISTANCE + p.distance(&self.bounds().center())
                } else {
                    boundary
                }
            }
            Style::Opened
            | Style::OpenedDotted
            | Style::OpenedDashed
            | Style::OpenedThick
            | Style::Vectors => p.distance(&self.outline_closest(p)),
            Style::Cross | Style::BigCross => p.distance(&self.centroid()),
            Style::Circle | Style::ThickCircle => {
                let &[c, rp] = self.points() else { return f64::MAX };
                (c.distance(&p) - c.distance(&rp)).abs()
            }
            Style::Disc => {
                let &[c, rp] = self.points() else { return f64::MAX };
                let r = c.distance(&rp);
                let d = c.distance(&p);
                if d == r {
                    0.0
                } else if d < r {
                    INSIDE_DISTANCE + d
                } else {
                    d - r
                }
            }
            Style::CircleArc | Style::ThickCircleArc => p.distance(&self.arc_closest(p)),
        }
    }

    /// Pairwise intersection test: bounding-box reject, then exact
    /// edge-against-edge checks over bounding-box-overlapping edge pairs.
    #[must_use]
    pub fn intersects(&self, other: &Polygon<L>) -> bool {
        if !self.bounds().intersects(&other.bounds()) {
            return false;
        }
        if self.style().is_curved() {
            return curved_intersects(self, other);
        }
        if other.style().is_curved() {
            return curved_intersects(other, self);
        }
        let ea = self.straight_edges();
        let eb = other.straight_edges();
        if ea.is_empty() {
            return self.points().first().is_some_and(|&p| other.contains(p));
        }
        if eb.is_empty() {
            return other.points().first().is_some_and(|&p| self.contains(p));
        }
        for &(a1, a2) in &ea {
            let abox = Rect::from_diagonal(a1, a2);
            for &(b1, b2) in &eb {
                if !abox.intersects(&Rect::from_diagonal(b1, b2)) {
                    continue;
                }
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        false
    }

    /// Sum of drawn edge lengths. Skips the implicit closing edge for open
    /// styles; circles and arcs use their true curve length.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        match self.style() {
            Style::Circle | Style::ThickCircle | Style::Disc => {
                let &[c, rp] = self.points() else { return 0.0 };
                TAU * c.distance(&rp)
            }
            Style::CircleArc | Style::ThickCircleArc => {
                let mut total = 0.0;
                for w in self.points().chunks_exact(3) {
                    let (c, s, e) = (w[0], w[1], w[2]);
                    let sweep = normalize_sweep(c.angle_to(&e) - c.angle_to(&s));
                    total += c.distance(&s) * sweep;
                }
                total
            }
            _ => self
                .straight_edges()
                .iter()
                .map(|(a, b)| a.distance(b))
                .sum(),
        }
    }

    /// Enclosed area as a non-negative magnitude. Uses the cached
    /// rectangle when present, otherwise the shoelace formula in exact
    /// integer arithmetic. Open outlines, markers and anchor-only text
    /// have no area.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self.style() {
            Style::Opened
            | Style::OpenedDotted
            | Style::OpenedDashed
            | Style::OpenedThick
            | Style::Vectors
            | Style::Cross
            | Style::BigCross => 0.0,
            Style::Circle | Style::ThickCircle | Style::Disc => {
                let &[c, rp] = self.points() else { return 0.0 };
                let r = c.distance(&rp);
                PI * r * r
            }
            Style::CircleArc | Style::ThickCircleArc => {
                let mut total = 0.0;
                for w in self.points().chunks_exact(3) {
                    let (c, s, e) = (w[0], w[1], w[2]);
                    let r = c.distance(&s);
                    let sweep = normalize_sweep(c.angle_to(&e) - c.angle_to(&s));
                    total += r * r * sweep / 2.0;
                }
                total
            }
            _ => {
                if let Some(b) = self.get_box() {
                    return b.width() as f64 * b.height() as f64;
                }
                let pts = self.points();
                if pts.len() < 3 {
                    return 0.0;
                }
                let mut twice: i128 = 0;
                for i in 0..pts.len() {
                    let a = pts[i];
                    let b = pts[(i + 1) % pts.len()];
                    twice += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
                }
                twice.unsigned_abs() as f64 / 2.0
            }
        }
    }

    /// Drawn straight edges, honoring the style: consecutive pairs for
    /// `Vectors`, no closing edge for open styles, none for curved styles.
    pub(crate) fn straight_edges(&self) -> Vec<(Point, Point)> {
        let pts = self.points();
        match self.style() {
            Style::Vectors => pts.chunks_exact(2).map(|w| (w[0], w[1])).collect(),
            s if s.is_curved() => Vec::new(),
            s => {
                if pts.len() < 2 {
                    return Vec::new();
                }
                let mut edges: Vec<(Point, Point)> =
                    pts.windows(2).map(|w| (w[0], w[1])).collect();
                if s.closes_implicitly() && pts.len() > 2 {
                    edges.push((pts[pts.len() - 1], pts[0]));
                }
                edges
            }
        }
    }
}

fn cross(a: Point, b: Point, c: Point) -> i128 {
    (b.x - a.x) as i128 * (c.y - a.y) as i128 - (b.y - a.y) as i128 * (c.x - a.x) as i128
}

/// Exact point-on-segment test.
fn on_segment(p: Point, a: Point, b: Point) -> bool {
    cross(a, b, p) == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Exact segment intersection via orientation sign tests, including
/// collinear overlap. No divisions, so vertical and horizontal segments
/// need no special-casing.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0)) {
        return true;
    }
    (d1 == 0 && on_segment(a, c, d))
        || (d2 == 0 && on_segment(b, c, d))
        || (d3 == 0 && on_segment(c, a, b))
        || (d4 == 0 && on_segment(d, a, b))
}

/// Distance from `p` to a manhattan rectangle: 0 on the boundary, the
/// inside sentinel (offset by distance to the center) strictly inside,
/// the Euclidean clamp distance outside.
fn box_distance(p: Point, b: Rect) -> f64 {
    if b.contains(p) {
        let to_edge = (p.x - b.min_x)
            .min(b.max_x - p.x)
            .min(p.y - b.min_y)
            .min(b.max_y - p.y);
        if to_edge == 0 {
            0.0
        } else {
            INSIDE_DISTANCE + p.distance(&b.center())
        }
    } else {
        let clamped = Point::from_fixp(p.x.clamp(b.min_x, b.max_x), p.y.clamp(b.min_y, b.max_y));
        p.distance(&clamped)
    }
}

fn closest_on_segment(p: Point, a: Point, b: Point) -> Point {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return a;
    }
    let t = (((p.x - a.x) as f64 * dx + (p.y - a.y) as f64 * dy) / len2).clamp(0.0, 1.0);
    Point::from_fixp((ax + t * dx).round() as Fixp, (ay + t * dy).round() as Fixp)
}

fn project_at_angle(c: Point, angle: f64, r: f64) -> Point {
    Point::from_fixp(
        (c.x as f64 + r * angle.cos()).round() as Fixp,
        (c.y as f64 + r * angle.sin()).round() as Fixp,
    )
}

/// Normalize an angle difference into [0, 2pi).
fn normalize_angle(a: f64) -> f64 {
    let a = a % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Normalize a sweep into (0, 2pi]: coincident endpoints mean a full turn.
fn normalize_sweep(a: f64) -> f64 {
    let a = normalize_angle(a);
    if a == 0.0 {
        TAU
    } else {
        a
    }
}

/// Liang-Barsky clip of segment a-b against `r`; midpoint of the surviving
/// portion, if any.
fn clipped_midpoint(a: Point, b: Point, r: Rect) -> Option<(f64, f64)> {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let checks = [
        (-dx, ax - r.min_x as f64),
        (dx, r.max_x as f64 - ax),
        (-dy, ay - r.min_y as f64),
        (dy, r.max_y as f64 - ay),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
    }
    if t0 > t1 {
        return None;
    }
    let tm = (t0 + t1) / 2.0;
    Some((ax + tm * dx, ay + tm * dy))
}

/// Curved-vs-anything intersection; `a` is the curved one.
fn curved_intersects<L>(a: &Polygon<L>, b: &Polygon<L>) -> bool {
    let Some(&ca) = a.points().first() else {
        return false;
    };
    let ra = if a.points().len() >= 2 {
        a.circle_radius()
    } else {
        return false;
    };
    if b.style().is_curved() {
        if b.points().len() < 2 {
            return false;
        }
        let cb = b.points()[0];
        let rb = b.circle_radius();
        return ca.distance(&cb) <= ra + rb;
    }
    if b.contains(ca) {
        return true;
    }
    b.straight_edges()
        .iter()
        .any(|&(s, e)| point_segment_distance(ca, s, e) <= ra)
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(&closest_on_segment(p, a, b))
}
