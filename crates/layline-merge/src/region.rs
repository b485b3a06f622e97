//! The accumulated boolean region for one layer, backed by the planar
//! boundary-algebra provider (CavalierContours polyline booleans).
//!
//! Coverage is stored as a flat set of counter-clockwise positive loops
//! and clockwise hole loops, properly nested: a hole lies inside some
//! positive loop, an island is a positive loop inside a hole. Net area is
//! the positive sum minus the hole sum. Fixed-point coordinates cross the
//! provider seam as grid-unit doubles (exact below 2^53) and snap back to
//! the fixed-point lattice on re-entry.

use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, PlineVertex,
    Polyline,
};

use layline_core::{coord, CoordError, Point};

/// Linear tolerance (grid units) for collapsing redundant vertexes after
/// boolean operations.
const POS_EPS: f64 = 1e-6;

/// Area (grid units squared) below which a loop counts as an empty
/// sliver.
pub(crate) const AREA_EPS: f64 = 1e-6;

/// Angular step when flattening bulge arcs back into point loops.
const FLATTEN_STEP: f64 = std::f64::consts::PI / 32.0;

/// One simple closed loop traced from a region's boundary.
#[derive(Debug, Clone)]
pub struct TracedLoop {
    pub points: Vec<Point>,
    pub hole: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Region {
    pos: Vec<Polyline<f64>>,
    neg: Vec<Polyline<f64>>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.iter().all(|p| p.area().abs() <= AREA_EPS)
    }

    /// Net covered area in grid units squared.
    pub fn area(&self) -> f64 {
        let covered: f64 = self.pos.iter().map(|p| p.area().abs()).sum();
        let holes: f64 = self.neg.iter().map(|p| p.area().abs()).sum();
        (covered - holes).max(0.0)
    }

    /// Union one closed loop into the coverage.
    pub fn union_pline(&mut self, pline: &Polyline<f64>) {
        let p = simplify(pline.clone());
        if !is_valid(&p) {
            return;
        }
        // Added coverage shrinks any hole it overlaps. The hole-of-hole
        // pieces the provider reports are exactly the added loop's own
        // footprint, which the positive set picks up below.
        for h in std::mem::take(&mut self.neg) {
            let res = h.boolean(&p, BooleanOp::Not);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => self.neg.push(h),
                _ => self
                    .neg
                    .extend(res.pos_plines.into_iter().map(|r| simplify(r.pline))),
            }
        }
        self.pos.push(p);
        let (merged, captured) = merge_set(std::mem::take(&mut self.pos), &self.neg);
        self.pos = merged;
        self.neg.extend(captured);
        self.normalize();
    }

    /// Subtract one closed loop from the coverage.
    pub fn subtract_pline(&mut self, pline: &Polyline<f64>) {
        let c = simplify(pline.clone());
        if !is_valid(&c) {
            return;
        }
        let mut new_pos = Vec::new();
        for p in std::mem::take(&mut self.pos) {
            let res = p.boolean(&c, BooleanOp::Not);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => new_pos.push(p),
                _ => {
                    new_pos.extend(res.pos_plines.into_iter().map(|r| simplify(r.pline)));
                    self.neg
                        .extend(res.neg_plines.into_iter().map(|r| simplify(r.pline)));
                }
            }
        }
        self.pos = new_pos;
        self.normalize();
    }

    /// `self = self U other`.
    pub fn union_region(&mut self, other: &Region) {
        // R U (P - H) = (R U P) - (H - R - islands(H)): a hole of the
        // other region only cuts where neither region supplies coverage.
        let orig = self.clone();
        for p in &other.pos {
            self.union_pline(p);
        }
        for h in &other.neg {
            let mut cut = Region::default();
            cut.union_pline(h);
            cut.subtract_region(&orig);
            for island in loops_inside(&other.pos, h) {
                cut.subtract_pline(island);
            }
            self.subtract_region(&cut);
        }
    }

    /// `self = self - other`.
    pub fn subtract_region(&mut self, other: &Region) {
        // R - (P - H) = (R - P) U (R ^ (H - islands(H))): coverage under
        // the other's holes survives, except where an island fills them.
        let orig = self.clone();
        for p in &other.pos {
            self.subtract_pline(p);
        }
        for h in &other.neg {
            let mut keep = orig.intersect_pline(h);
            for island in loops_inside(&other.pos, h) {
                keep.subtract_pline(island);
            }
            for k in &keep.pos {
                self.union_pline(k);
            }
            for kn in &keep.neg {
                self.subtract_pline(kn);
            }
        }
    }

    /// `self = self ^ other`.
    pub fn intersect_region(&mut self, other: &Region) {
        // R ^ S = R - (R - S), which reuses the hole-aware subtraction.
        let mut excluded = self.clone();
        excluded.subtract_region(other);
        self.subtract_region(&excluded);
    }

    /// Coverage of `self` restricted to one closed loop.
    fn intersect_pline(&self, clip: &Polyline<f64>) -> Region {
        let mut out = Region::default();
        // Outermost loops first, so island pieces arrive after the holes
        // that separate them.
        let mut order: Vec<usize> = (0..self.pos.len()).collect();
        order.sort_by(|&a, &b| {
            self.pos[b]
                .area()
                .abs()
                .total_cmp(&self.pos[a].area().abs())
        });
        for i in order {
            let p = &self.pos[i];
            let res = p.boolean(clip, BooleanOp::And);
            let mut piece = Region::default();
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => continue,
                _ => {
                    piece
                        .pos
                        .extend(res.pos_plines.into_iter().map(|r| simplify(r.pline)));
                    piece
                        .neg
                        .extend(res.neg_plines.into_iter().map(|r| simplify(r.pline)));
                }
            }
            for h in loops_inside(&self.neg, p) {
                piece.subtract_pline(h);
            }
            for k in &piece.pos {
                out.union_pline(k);
            }
            for kn in &piece.neg {
                out.subtract_pline(kn);
            }
        }
        out
    }

    /// Re-trace the boundary as simple closed loops in fixed point.
    /// Positive loops come out counter-clockwise, holes clockwise; bulge
    /// arc segments are flattened.
    pub fn trace(&self) -> Result<Vec<TracedLoop>, CoordError> {
        let mut out = Vec::new();
        let tagged = self
            .pos
            .iter()
            .map(|p| (p, false))
            .chain(self.neg.iter().map(|p| (p, true)));
        for (pl, hole) in tagged {
            let n = pl.vertex_data.len();
            let mut points = Vec::with_capacity(n);
            for i in 0..n {
                let v = pl.vertex_data[i];
                let w = pl.vertex_data[(i + 1) % n];
                if v.bulge.abs() < 1e-12 {
                    points.push(Point::from_user(v.x, v.y)?);
                } else {
                    flatten_arc(v, w, &mut points)?;
                }
            }
            out.push(TracedLoop { points, hole });
        }
        Ok(out)
    }

    /// Drop slivers, merge holes, clip every hole to the innermost
    /// positive loop containing it, and normalize winding.
    fn normalize(&mut self) {
        self.pos
            .retain(|p| is_valid(p) && p.area().abs() > AREA_EPS);
        let (holes, _) = merge_set(std::mem::take(&mut self.neg), &self.pos);
        let mut clipped = Vec::new();
        for h in holes {
            if h.area().abs() <= AREA_EPS {
                continue;
            }
            let Some((hx, hy)) = first_vertex(&h) else {
                continue;
            };
            let parent = self
                .pos
                .iter()
                .filter(|p| pline_contains_point(p, hx, hy))
                .min_by(|a, b| a.area().abs().total_cmp(&b.area().abs()));
            let Some(parent) = parent else {
                continue;
            };
            let res = h.boolean(parent, BooleanOp::And);
            match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => {}
                _ => clipped.extend(
                    res.pos_plines
                        .into_iter()
                        .map(|r| simplify(r.pline))
                        .filter(|p| p.area().abs() > AREA_EPS),
                ),
            }
        }
        self.pos = normalize_winding(
            std::mem::take(&mut self.pos),
            PlineOrientation::CounterClockwise,
        );
        self.neg = normalize_winding(clipped, PlineOrientation::Clockwise);
    }
}

/// Pairwise union until stable. Holes produced by ring-closing unions are
/// captured and returned separately. A containment-only overlap does NOT
/// absorb the inner loop when a separator loop (of the opposite parity)
/// sits between the two: that inner loop is an island.
fn merge_set(
    mut plines: Vec<Polyline<f64>>,
    separators: &[Polyline<f64>],
) -> (Vec<Polyline<f64>>, Vec<Polyline<f64>>) {
    plines.retain(is_valid);
    let mut captured: Vec<Polyline<f64>> = Vec::new();
    let mut i = 0usize;
    while i < plines.len() {
        let mut merged = false;
        let mut j = i + 1;
        while j < plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            let absorb = match res.result_info {
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput => false,
                BooleanResultInfo::Pline1InsidePline2 => {
                    !separated(&plines[j], &plines[i], separators)
                }
                BooleanResultInfo::Pline2InsidePline1 => {
                    !separated(&plines[i], &plines[j], separators)
                }
                _ => true,
            };
            if absorb {
                let mut next: Vec<Polyline<f64>> = res
                    .pos_plines
                    .into_iter()
                    .map(|r| simplify(r.pline))
                    .collect();
                captured.extend(res.neg_plines.into_iter().map(|r| simplify(r.pline)));
                plines.swap_remove(j);
                plines.swap_remove(i);
                plines.append(&mut next);
                merged = true;
                break;
            }
            j += 1;
        }
        if merged {
            i = 0;
        } else {
            i += 1;
        }
    }
    (plines, captured)
}

/// Does a separator loop lie strictly between `outer` and `inner`?
fn separated(outer: &Polyline<f64>, inner: &Polyline<f64>, separators: &[Polyline<f64>]) -> bool {
    let Some((ix, iy)) = first_vertex(inner) else {
        return false;
    };
    separators.iter().any(|s| {
        pline_contains_point(s, ix, iy)
            && first_vertex(s).is_some_and(|(sx, sy)| pline_contains_point(outer, sx, sy))
    })
}

/// Loops of `set` whose first vertex lies inside `within`.
fn loops_inside<'a>(
    set: &'a [Polyline<f64>],
    within: &'a Polyline<f64>,
) -> impl Iterator<Item = &'a Polyline<f64>> + 'a {
    set.iter().filter(move |p| {
        first_vertex(p).is_some_and(|(x, y)| pline_contains_point(within, x, y))
    })
}

fn first_vertex(pl: &Polyline<f64>) -> Option<(f64, f64)> {
    pl.vertex_data.first().map(|v| (v.x, v.y))
}

/// Even-odd point test over the straight chords of a polyline. Bulges are
/// ignored: nesting decisions only need a topologically correct answer
/// for loops that do not touch the probe point.
fn pline_contains_point(pl: &Polyline<f64>, x: f64, y: f64) -> bool {
    let vs = &pl.vertex_data;
    let n = vs.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    for i in 0..n {
        let a = vs[i];
        let b = vs[(i + 1) % n];
        if (a.y > y) != (b.y > y) {
            let xi = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
            if xi > x {
                inside = !inside;
            }
        }
    }
    inside
}

fn is_valid(p: &Polyline<f64>) -> bool {
    p.is_closed() && p.vertex_count() >= 2
}

fn simplify(p: Polyline<f64>) -> Polyline<f64> {
    p.remove_redundant(POS_EPS).unwrap_or(p)
}

fn normalize_winding(plines: Vec<Polyline<f64>>, desired: PlineOrientation) -> Vec<Polyline<f64>> {
    plines
        .into_iter()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

pub(crate) fn to_plane(p: Point) -> (f64, f64) {
    (coord::fixp_to_user(p.x), coord::fixp_to_user(p.y))
}

/// A straight-edged closed loop over fixed-point points.
pub(crate) fn loop_pline(points: &[Point]) -> Polyline<f64> {
    let mut pl = Polyline::new_closed();
    for p in points {
        let (x, y) = to_plane(*p);
        pl.vertex_data.push(PlineVertex::new(x, y, 0.0));
    }
    pl
}

/// A full circle as two 180-degree arcs (two vertices, both bulge 1).
pub(crate) fn circle_pline(center: Point, radius: f64) -> Polyline<f64> {
    let (cx, cy) = to_plane(center);
    let mut pl = Polyline::new_closed();
    pl.vertex_data.push(PlineVertex::new(cx - radius, cy, 1.0));
    pl.vertex_data.push(PlineVertex::new(cx + radius, cy, 1.0));
    pl
}

/// A pie wedge: center, then a counter-clockwise bulge arc from start to
/// end, closed back to the center.
pub(crate) fn wedge_pline(center: Point, start: Point, end: Point, sweep: f64) -> Polyline<f64> {
    let (cx, cy) = to_plane(center);
    let (sx, sy) = to_plane(start);
    let (ex, ey) = to_plane(end);
    let mut pl = Polyline::new_closed();
    pl.vertex_data.push(PlineVertex::new(cx, cy, 0.0));
    pl.vertex_data
        .push(PlineVertex::new(sx, sy, (sweep / 4.0).tan()));
    pl.vertex_data.push(PlineVertex::new(ex, ey, 0.0));
    pl
}

/// Flatten one bulge arc segment into line points, start inclusive, end
/// exclusive.
fn flatten_arc(
    v: PlineVertex<f64>,
    w: PlineVertex<f64>,
    out: &mut Vec<Point>,
) -> Result<(), CoordError> {
    let theta = 4.0 * v.bulge.atan();
    let (dx, dy) = (w.x - v.x, w.y - v.y);
    let chord = dx.hypot(dy);
    if chord == 0.0 {
        out.push(Point::from_user(v.x, v.y)?);
        return Ok(());
    }
    let radius = (chord / 2.0) / (theta / 2.0).sin().abs();
    let (mx, my) = ((v.x + w.x) / 2.0, (v.y + w.y) / 2.0);
    // Unit normal to the left of the chord; the center sits on the bulge
    // side for minor arcs and opposite for major ones.
    let (lx, ly) = (-dy / chord, dx / chord);
    let offset = (radius * radius - (chord / 2.0) * (chord / 2.0))
        .max(0.0)
        .sqrt();
    let side = if theta.abs() > std::f64::consts::PI {
        -theta.signum()
    } else {
        theta.signum()
    };
    let (cx, cy) = (mx + side * offset * lx, my + side * offset * ly);
    let start_angle = (v.y - cy).atan2(v.x - cx);
    let steps = ((theta.abs() / FLATTEN_STEP).ceil() as usize).max(1);
    for k in 0..steps {
        let a = start_angle + theta * k as f64 / steps as f64;
        out.push(Point::from_user(cx + radius * a.cos(), cy + radius * a.sin())?);
    }
    Ok(())
}
