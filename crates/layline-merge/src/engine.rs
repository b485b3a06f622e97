//! Per-layer accumulation of polygons into merged regions.

use std::f64::consts::TAU;
use std::fmt;
use std::hash::Hash;

use cavalier_contours::polyline::Polyline;
use indexmap::IndexMap;
use tracing::{debug, trace};

use layline_core::{Affine, Point};
use layline_geometry::{Polygon, Style};

use crate::error::MergeError;
use crate::loop_tree;
use crate::region::{self, Region, TracedLoop, AREA_EPS};

/// Opaque layer identity key. The engine never inspects a layer beyond
/// equality, ordering and hashing.
pub trait Layer: Clone + Eq + Ord + Hash + fmt::Debug {}

impl<T: Clone + Eq + Ord + Hash + fmt::Debug> Layer for T {}

/// Accumulates polygons per layer and answers coverage queries against
/// the merged result. Regions are created on first insertion and removed
/// once emptied.
#[derive(Debug, Clone)]
pub struct MergeEngine<L: Layer> {
    layers: IndexMap<L, Region>,
}

impl<L: Layer> Default for MergeEngine<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Layer> MergeEngine<L> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: IndexMap::new(),
        }
    }

    /// Layers that currently hold a non-empty region.
    pub fn layers(&self) -> impl Iterator<Item = &L> {
        self.layers.keys()
    }

    #[must_use]
    pub fn is_empty(&self, layer: &L) -> bool {
        self.layers.get(layer).is_none_or(|r| r.is_empty())
    }

    /// Net merged area of a layer, in grid units squared.
    #[must_use]
    pub fn area(&self, layer: &L) -> f64 {
        self.layers.get(layer).map_or(0.0, Region::area)
    }

    pub fn delete_layer(&mut self, layer: &L) -> bool {
        self.layers.shift_remove(layer).is_some()
    }

    /// Union a polygon's coverage into a layer, creating the region on
    /// first use.
    pub fn add(&mut self, layer: L, poly: &Polygon<L>) -> Result<(), MergeError> {
        let outlines = polygon_outlines(poly)?;
        if outlines.is_empty() {
            return Ok(());
        }
        let region = self.layers.entry(layer.clone()).or_insert_with(|| {
            debug!(layer = ?layer, "creating merged region");
            Region::empty()
        });
        for pl in &outlines {
            region.union_pline(pl);
        }
        Ok(())
    }

    /// Remove a polygon's coverage from a layer. The layer entry is
    /// dropped once nothing remains.
    pub fn subtract(&mut self, layer: &L, poly: &Polygon<L>) -> Result<(), MergeError> {
        let outlines = polygon_outlines(poly)?;
        let Some(region) = self.layers.get_mut(layer) else {
            return Ok(());
        };
        for pl in &outlines {
            region.subtract_pline(pl);
        }
        if region.is_empty() {
            self.layers.shift_remove(layer);
            debug!(layer = ?layer, "merged region emptied");
        }
        Ok(())
    }

    pub fn union_layers(&mut self, a: &L, b: &L, dest: L) {
        let mut r = self.layers.get(a).cloned().unwrap_or_default();
        if let Some(rb) = self.layers.get(b) {
            r.union_region(rb);
        }
        self.install(dest, r);
    }

    pub fn intersect_layers(&mut self, a: &L, b: &L, dest: L) {
        let mut r = self.layers.get(a).cloned().unwrap_or_default();
        match self.layers.get(b) {
            Some(rb) => r.intersect_region(rb),
            None => r = Region::empty(),
        }
        self.install(dest, r);
    }

    pub fn subtract_layers(&mut self, a: &L, b: &L, dest: L) {
        let mut r = self.layers.get(a).cloned().unwrap_or_default();
        if let Some(rb) = self.layers.get(b) {
            r.subtract_region(rb);
        }
        self.install(dest, r);
    }

    /// Union a transformed copy of every layer of `other` into this
    /// engine.
    pub fn add_all(&mut self, other: &MergeEngine<L>, t: &Affine) -> Result<(), MergeError> {
        for (layer, src) in &other.layers {
            let mut moved = Region::empty();
            for lp in src.trace()? {
                let mut pts = Vec::with_capacity(lp.points.len());
                for p in lp.points {
                    pts.push(t.apply(p)?);
                }
                let pline = region::loop_pline(&pts);
                if lp.hole {
                    moved.subtract_pline(&pline);
                } else {
                    moved.union_pline(&pline);
                }
            }
            self.layers
                .entry(layer.clone())
                .or_insert_with(Region::empty)
                .union_region(&moved);
        }
        Ok(())
    }

    /// Is `poly` fully covered by the layer's merged region?
    ///
    /// Computed as shape-minus-region with a zero-area test on the
    /// residual: a near-degenerate subtraction can leave a zero-area
    /// sliver, which still counts as covered.
    pub fn contains(&self, layer: &L, poly: &Polygon<L>) -> Result<bool, MergeError> {
        let Some(region) = self.layers.get(layer) else {
            return Ok(false);
        };
        let outlines = polygon_outlines(poly)?;
        if outlines.is_empty() {
            return Ok(false);
        }
        let mut residual = Region::empty();
        for pl in &outlines {
            residual.union_pline(pl);
        }
        residual.subtract_region(region);
        Ok(residual.area() <= AREA_EPS)
    }

    /// Grow `dest` by a copy of `source` shrunk inward by `amount` grid
    /// units: every extracted loop contributes one thin quadrilateral
    /// strip per edge, offset perpendicular to the edge (direction plus
    /// 270 degrees along a clockwise walk), subtracted from the copy.
    pub fn inset_layer(&mut self, source: &L, dest: L, amount: f64) -> Result<(), MergeError> {
        let Some(src) = self.layers.get(source) else {
            return Ok(());
        };
        let mut inset = src.clone();
        if amount != 0.0 {
            for lp in src.trace()? {
                for quad in edge_strips(&lp, amount)? {
                    inset.subtract_pline(&quad);
                }
            }
        }
        self.layers
            .entry(dest)
            .or_insert_with(Region::empty)
            .union_region(&inset);
        Ok(())
    }

    /// Extract the merged polygons of a layer, reconstructing holes.
    ///
    /// A single traced loop comes back directly as one filled polygon;
    /// multiple loops go through the loop tree, which splices each hole
    /// into its enclosing loop.
    pub fn merged_points(&self, layer: &L) -> Result<Vec<Polygon<L>>, MergeError> {
        let Some(region) = self.layers.get(layer) else {
            return Ok(Vec::new());
        };
        let loops = region.trace()?;
        trace!(layer = ?layer, loops = loops.len(), "extracting merged polygons");
        let raw: Vec<Vec<Point>> = loops.into_iter().map(|l| l.points).collect();
        if raw.len() == 1 {
            let poly = Polygon::new(raw.into_iter().next().unwrap_or_default())
                .with_style(Style::Filled)
                .map_err(MergeError::from)?
                .with_layer(layer.clone());
            return Ok(vec![poly]);
        }
        loop_tree::reconstruct(raw, layer).map_err(MergeError::from)
    }

    fn install(&mut self, dest: L, r: Region) {
        if r.is_empty() {
            if self.layers.shift_remove(&dest).is_some() {
                debug!(layer = ?dest, "combined region came up empty, entry removed");
            }
        } else {
            self.layers.insert(dest, r);
        }
    }
}

/// Convert a polygon into the closed provider loops covering it.
///
/// Circle styles become two-vertex bulge-1 polylines, arc styles one pie
/// wedge per point triple, text boxes their reference box. Open outlines
/// close implicitly, matching the behavior of seeding a boundary region
/// from an open path. Zero-area shapes (markers, anchored text, vectors)
/// contribute nothing.
fn polygon_outlines<L>(poly: &Polygon<L>) -> Result<Vec<Polyline<f64>>, MergeError> {
    let style = poly.style();
    style
        .validate_point_count(poly.points().len())
        .map_err(MergeError::from)?;
    let out = match style {
        Style::Circle | Style::ThickCircle | Style::Disc => {
            let center = poly.points()[0];
            let radius = center.distance(&poly.points()[1]) / layline_core::FIXP_PER_GRID as f64;
            vec![region::circle_pline(center, radius)]
        }
        Style::CircleArc | Style::ThickCircleArc => {
            let mut wedges = Vec::new();
            for w in poly.points().chunks_exact(3) {
                let (c, s, e) = (w[0], w[1], w[2]);
                let sweep = normalize_sweep(c.angle_to(&e) - c.angle_to(&s));
                if (sweep - TAU).abs() < 1e-12 {
                    // Coincident endpoints sweep a full turn; the wedge
                    // bulge degenerates there.
                    let radius = c.distance(&s) / layline_core::FIXP_PER_GRID as f64;
                    wedges.push(region::circle_pline(c, radius));
                } else {
                    wedges.push(region::wedge_pline(c, s, e, sweep));
                }
            }
            wedges
        }
        Style::TextBox => {
            let b = poly.bounds();
            vec![region::loop_pline(&b.corners())]
        }
        Style::Vectors | Style::Cross | Style::BigCross => Vec::new(),
        s if s.is_text() => Vec::new(),
        _ => {
            if poly.points().len() < 3 {
                Vec::new()
            } else {
                vec![region::loop_pline(poly.points())]
            }
        }
    };
    Ok(out)
}

/// One inward quadrilateral strip per loop edge. The loop is walked
/// clockwise so the strip direction is uniformly edge direction + 270
/// degrees.
fn edge_strips(lp: &TracedLoop, amount: f64) -> Result<Vec<Polyline<f64>>, MergeError> {
    let mut pts = lp.points.clone();
    // Positive loops trace counter-clockwise and holes clockwise; reverse
    // both so coverage always lies on the strip side.
    pts.reverse();
    let n = pts.len();
    let mut strips = Vec::new();
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        if a == b {
            continue;
        }
        let angle = a.angle_to(&b) + 3.0 * TAU / 4.0;
        let dx = amount * angle.cos();
        let dy = amount * angle.sin();
        let quad = [
            a,
            b,
            Point::from_user(b.user_x() + dx, b.user_y() + dy)?,
            Point::from_user(a.user_x() + dx, a.user_y() + dy)?,
        ];
        strips.push(region::loop_pline(&quad));
    }
    Ok(strips)
}

fn normalize_sweep(a: f64) -> f64 {
    let a = a % TAU;
    let a = if a < 0.0 { a + TAU } else { a };
    if a == 0.0 {
        TAU
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use layline_core::{Rect, FIXP_PER_GRID};

    fn gp(x: i64, y: i64) -> Point {
        Point::from_grid(x, y).unwrap()
    }

    fn rect_poly(lx: i64, ly: i64, hx: i64, hy: i64) -> Polygon<&'static str> {
        Polygon::from_rect(Rect::from_diagonal(gp(lx, ly), gp(hx, hy)))
    }

    #[test]
    fn add_creates_and_merges_a_region() {
        let mut engine = MergeEngine::new();
        engine.add("metal1", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.add("metal1", &rect_poly(5, 0, 15, 10)).unwrap();
        assert_abs_diff_eq!(engine.area(&"metal1"), 150.0, epsilon = 1e-6);
        let polys = engine.merged_points(&"metal1").unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].layer(), Some(&"metal1"));
        assert_eq!(polys[0].style(), Style::Filled);
    }

    #[test]
    fn subtracting_everything_removes_the_layer_entry() {
        let mut engine = MergeEngine::new();
        engine.add("metal1", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.subtract(&"metal1", &rect_poly(0, 0, 10, 10)).unwrap();
        assert!(engine.is_empty(&"metal1"));
        assert_eq!(engine.layers().count(), 0);
    }

    #[test]
    fn layer_combinations_write_the_destination() {
        let mut engine = MergeEngine::new();
        engine.add("a", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.add("b", &rect_poly(5, 0, 15, 10)).unwrap();

        engine.intersect_layers(&"a", &"b", "both");
        assert_abs_diff_eq!(engine.area(&"both"), 50.0, epsilon = 1e-6);

        engine.union_layers(&"a", &"b", "either");
        assert_abs_diff_eq!(engine.area(&"either"), 150.0, epsilon = 1e-6);

        engine.subtract_layers(&"a", &"b", "only_a");
        assert_abs_diff_eq!(engine.area(&"only_a"), 50.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_combination_deletes_the_destination() {
        let mut engine = MergeEngine::new();
        engine.add("a", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.add("b", &rect_poly(20, 20, 30, 30)).unwrap();
        engine.add("dest", &rect_poly(0, 0, 1, 1)).unwrap();
        engine.intersect_layers(&"a", &"b", "dest");
        assert_eq!(engine.layers().count(), 2);
        assert!(engine.is_empty(&"dest"));
    }

    #[test]
    fn contains_answers_full_coverage_only() {
        let mut engine = MergeEngine::new();
        engine.add("m", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.add("m", &rect_poly(10, 0, 20, 10)).unwrap();
        // Spans the seam between the two added rectangles.
        assert!(engine.contains(&"m", &rect_poly(5, 2, 15, 8)).unwrap());
        assert!(!engine.contains(&"m", &rect_poly(5, 2, 25, 8)).unwrap());
        assert!(!engine.contains(&"other", &rect_poly(0, 0, 1, 1)).unwrap());
    }

    #[test]
    fn contains_accepts_exact_coverage() {
        let mut engine = MergeEngine::new();
        engine.add("m", &rect_poly(0, 0, 10, 10)).unwrap();
        assert!(engine.contains(&"m", &rect_poly(0, 0, 10, 10)).unwrap());
    }

    #[test]
    fn circles_merge_through_the_provider() {
        let mut engine = MergeEngine::new();
        let disc = Polygon::new(vec![gp(0, 0), gp(10, 0)])
            .with_style(Style::Disc)
            .unwrap();
        engine.add("via", &disc).unwrap();
        assert_abs_diff_eq!(
            engine.area(&"via"),
            std::f64::consts::PI * 100.0,
            epsilon = 1e-3
        );
        assert!(engine
            .contains(&"via", &rect_poly(-5, -5, 5, 5))
            .unwrap());
    }

    #[test]
    fn add_all_applies_the_transform() {
        let mut a = MergeEngine::new();
        a.add("m", &rect_poly(0, 0, 10, 10)).unwrap();
        let mut b = MergeEngine::new();
        b.add_all(&a, &Affine::translate(100.0 * FIXP_PER_GRID as f64, 0.0))
            .unwrap();
        assert!(b.contains(&"m", &rect_poly(100, 0, 110, 10)).unwrap());
        assert!(!b.contains(&"m", &rect_poly(0, 0, 10, 10)).unwrap());
    }

    #[test]
    fn inset_layer_shrinks_by_the_amount() {
        let mut engine = MergeEngine::new();
        engine.add("src", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.inset_layer(&"src", "shrunk", 1.0).unwrap();
        assert_abs_diff_eq!(engine.area(&"shrunk"), 64.0, epsilon = 1e-3);
        assert!(engine
            .contains(&"shrunk", &rect_poly(1, 1, 9, 9))
            .unwrap());
        assert!(!engine
            .contains(&"shrunk", &rect_poly(0, 0, 10, 10))
            .unwrap());
    }

    #[test]
    fn zero_inset_copies_verbatim() {
        let mut engine = MergeEngine::new();
        engine.add("src", &rect_poly(0, 0, 10, 10)).unwrap();
        engine.inset_layer(&"src", "copy", 0.0).unwrap();
        assert_abs_diff_eq!(engine.area(&"copy"), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn markers_and_anchored_text_merge_to_nothing() {
        let mut engine = MergeEngine::new();
        let cross = Polygon::new(vec![gp(5, 5)])
            .with_style(Style::Cross)
            .unwrap();
        engine.add("m", &cross).unwrap();
        assert_eq!(engine.layers().count(), 0);
    }
}
