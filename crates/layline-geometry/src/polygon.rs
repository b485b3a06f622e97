//! The polygon model: an owned point sequence tagged with a style.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use layline_core::{Affine, Fixp, Point, Rect};

use crate::error::GeometryError;
use crate::style::Style;

/// Rendering attributes for text-styled polygons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextDescriptor {
    /// Text height in grid units.
    pub size: f64,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
}

impl Default for TextDescriptor {
    fn default() -> Self {
        Self {
            size: 1.0,
            italic: false,
            bold: false,
            underline: false,
        }
    }
}

/// Text metadata carried only when the style is a text variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInfo {
    pub text: String,
    pub descriptor: TextDescriptor,
}

/// Tri-state manhattan-rectangle cache.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BoxCache {
    Unknown,
    NotABox,
    Box(Rect),
}

/// An ordered point sequence with a style, an optional layer tag and
/// optional text metadata.
///
/// The point array is owned exclusively by the polygon; derived points are
/// produced, not mutated, except by `transform`, which rewrites the array
/// in place. Bounds and the manhattan-rectangle flag are computed lazily
/// and invalidated on mutation.
#[derive(Debug, Clone)]
pub struct Polygon<L> {
    points: Vec<Point>,
    style: Style,
    layer: Option<L>,
    text: Option<TextInfo>,
    bounds: Cell<Option<Rect>>,
    box_cache: Cell<BoxCache>,
}

impl<L> Polygon<L> {
    /// Build from a point list. The style always starts as `Closed`.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            style: Style::Closed,
            layer: None,
            text: None,
            bounds: Cell::new(None),
            box_cache: Cell::new(BoxCache::Unknown),
        }
    }

    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.corners().to_vec())
    }

    #[must_use]
    pub fn from_center_size(center: Point, width: Fixp, height: Fixp) -> Self {
        Self::from_rect(Rect::from_center_size(center, width, height))
    }

    /// Change the style, validating the point count it implies.
    pub fn with_style(mut self, style: Style) -> Result<Self, GeometryError> {
        style.validate_point_count(self.points.len())?;
        self.style = style;
        Ok(self)
    }

    #[must_use]
    pub fn with_layer(mut self, layer: L) -> Self {
        self.layer = Some(layer);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextInfo) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    #[must_use]
    pub fn layer(&self) -> Option<&L> {
        self.layer.as_ref()
    }

    pub fn set_layer(&mut self, layer: Option<L>) {
        self.layer = layer;
    }

    #[must_use]
    pub fn text(&self) -> Option<&TextInfo> {
        self.text.as_ref()
    }

    /// Reverse the point order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
        self.invalidate();
    }

    /// Apply an affine transform to every owned point in place.
    ///
    /// Text anchors survive reorienting transforms by rotating the anchor
    /// enum, not the geometry: the transform's rotation and mirror parts
    /// are decomposed into one of the nine discrete anchor rotations.
    pub fn transform(&mut self, t: &Affine) -> Result<(), GeometryError> {
        for p in &mut self.points {
            *p = t.apply(*p)?;
        }
        if self.style.is_text_anchor() && t.reorients() {
            let (quadrants, mirrored) = t.quadrant();
            self.style = self.style.rotated_anchor(quadrants, mirrored);
        }
        self.invalidate();
        Ok(())
    }

    /// The bounding rectangle, cached until the next mutation.
    ///
    /// Circle and arc styles bound the full circle around the center; the
    /// point list alone underestimates them.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        if let Some(b) = self.bounds.get() {
            return b;
        }
        let b = self.compute_bounds();
        self.bounds.set(Some(b));
        b
    }

    /// The manhattan-rectangle view, if the point sequence forms one.
    ///
    /// Requires exactly 4 points (or 5 with the last repeating the first,
    /// for open styles) forming an axis-aligned quadrilateral in either of
    /// the two valid corner orderings. The answer is cached as a tri-state.
    #[must_use]
    pub fn get_box(&self) -> Option<Rect> {
        match self.box_cache.get() {
            BoxCache::Box(r) => return Some(r),
            BoxCache::NotABox => return None,
            BoxCache::Unknown => {}
        }
        let computed = self.compute_box();
        self.box_cache.set(match computed {
            Some(r) => BoxCache::Box(r),
            None => BoxCache::NotABox,
        });
        computed
    }

    pub(crate) fn invalidate(&mut self) {
        self.bounds.set(None);
        self.box_cache.set(BoxCache::Unknown);
    }

    /// Replace the owned points and style together (arc clipping).
    pub(crate) fn replace_geometry(&mut self, points: Vec<Point>, style: Style) {
        self.points = points;
        self.style = style;
        self.invalidate();
    }

    pub(crate) fn centroid(&self) -> Point {
        if self.points.is_empty() {
            return Point::ORIGIN;
        }
        let n = self.points.len() as i64;
        let sx: i64 = self.points.iter().map(|p| p.x).sum();
        let sy: i64 = self.points.iter().map(|p| p.y).sum();
        Point::from_fixp(sx / n, sy / n)
    }

    /// Radius of a circle-style polygon, from center to the radius point.
    pub(crate) fn circle_radius(&self) -> f64 {
        self.points[0].distance(&self.points[1])
    }

    fn compute_bounds(&self) -> Rect {
        if self.style.is_curved() && self.points.len() >= 2 {
            let mut out: Option<Rect> = None;
            let chunk = if self.style.is_arc() { 3 } else { 2 };
            for triple in self.points.chunks_exact(chunk) {
                let center = triple[0];
                let r = center.distance(&triple[1]).ceil() as Fixp;
                let b = Rect::from_diagonal(center.offset(-r, -r), center.offset(r, r));
                out = Some(match out {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
            if let Some(b) = out {
                return b;
            }
        }
        let Some(first) = self.points.first() else {
            // An empty polygon bounds nothing; give a degenerate box.
            return Rect::from_diagonal(Point::ORIGIN, Point::ORIGIN);
        };
        let mut b = Rect::from_diagonal(*first, *first);
        for p in &self.points[1..] {
            b = b.union(&Rect::from_diagonal(*p, *p));
        }
        b
    }

    fn compute_box(&self) -> Option<Rect> {
        if self.style.is_curved() || self.style.is_marker() || self.style == Style::Vectors {
            return None;
        }
        let pts: [Point; 4] = match *self.points.as_slice() {
            [a, b, c, d] => [a, b, c, d],
            [a, b, c, d, e] if e == a && self.style.is_opened() => [a, b, c, d],
            _ => return None,
        };
        let [p0, p1, p2, p3] = pts;
        let order_a = p0.x == p1.x && p2.x == p3.x && p1.y == p2.y && p3.y == p0.y;
        let order_b = p0.y == p1.y && p2.y == p3.y && p1.x == p2.x && p3.x == p0.x;
        if order_a || order_b {
            Some(Rect::from_diagonal(p0, p2))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layline_core::FIXP_PER_GRID;

    fn gp(x: i64, y: i64) -> Point {
        Point::from_grid(x, y).unwrap()
    }

    fn rect_poly(lx: i64, ly: i64, hx: i64, hy: i64) -> Polygon<()> {
        Polygon::from_rect(Rect::from_diagonal(gp(lx, ly), gp(hx, hy)))
    }

    #[test]
    fn construction_defaults_to_closed() {
        assert_eq!(rect_poly(0, 0, 4, 4).style(), Style::Closed);
    }

    #[test]
    fn box_detection_accepts_both_corner_orderings() {
        // Corner-first ordering (x pairs first).
        let a = Polygon::<()>::new(vec![gp(0, 0), gp(0, 5), gp(3, 5), gp(3, 0)]);
        assert_eq!(a.get_box(), Some(Rect::from_diagonal(gp(0, 0), gp(3, 5))));
        // Edge-first ordering (y pairs first).
        let b = Polygon::<()>::new(vec![gp(0, 0), gp(3, 0), gp(3, 5), gp(0, 5)]);
        assert_eq!(b.get_box(), Some(Rect::from_diagonal(gp(0, 0), gp(3, 5))));
    }

    #[test]
    fn box_detection_rejects_skewed_quads() {
        let p = Polygon::<()>::new(vec![gp(0, 0), gp(4, 1), gp(5, 5), gp(1, 4)]);
        assert_eq!(p.get_box(), None);
        // Cached: a second query must agree.
        assert_eq!(p.get_box(), None);
    }

    #[test]
    fn open_five_point_loop_is_a_box() {
        let p = Polygon::<()>::new(vec![gp(0, 0), gp(0, 2), gp(2, 2), gp(2, 0), gp(0, 0)])
            .with_style(Style::Opened)
            .unwrap();
        assert_eq!(p.get_box(), Some(Rect::from_diagonal(gp(0, 0), gp(2, 2))));
    }

    #[test]
    fn transform_invalidates_caches() {
        let mut p = rect_poly(0, 0, 4, 4);
        let before = p.bounds();
        assert!(p.get_box().is_some());
        p.transform(&Affine::translate(2.0 * FIXP_PER_GRID as f64, 0.0))
            .unwrap();
        let after = p.bounds();
        assert_eq!(after.min_x, before.min_x + 2 * FIXP_PER_GRID);
        assert_eq!(p.get_box(), Some(after));
    }

    #[test]
    fn rotation_rotates_text_anchor_enum() {
        let mut p = Polygon::<()>::new(vec![gp(5, 5)])
            .with_style(Style::TextTop)
            .unwrap();
        p.transform(&Affine::rotate_deg(90.0)).unwrap();
        assert_eq!(p.style(), Style::TextLeft);
    }

    #[test]
    fn circle_bounds_cover_the_full_circle() {
        let p = Polygon::<()>::new(vec![gp(0, 0), gp(10, 0)])
            .with_style(Style::Circle)
            .unwrap();
        let b = p.bounds();
        assert_eq!(b.min_x, -10 * FIXP_PER_GRID);
        assert_eq!(b.max_y, 10 * FIXP_PER_GRID);
    }

    #[test]
    fn style_validation_rejects_bad_counts() {
        assert!(Polygon::<()>::new(vec![gp(0, 0), gp(1, 1), gp(2, 2)])
            .with_style(Style::Vectors)
            .is_err());
        assert!(Polygon::<()>::new(vec![gp(0, 0), gp(1, 1)])
            .with_style(Style::Circle)
            .is_ok());
    }
}
