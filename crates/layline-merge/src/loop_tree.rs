//! Reconstruction of multiply-connected polygons from traced loops.
//!
//! Loops are arranged into a nesting forest (largest first, each loop
//! attached under the innermost existing loop containing its first
//! vertex), then emitted depth-first: at even depth a loop opens a new
//! polygon, at odd depth it is spliced into its parent as a hole, each
//! sub-loop closed by repeating its own first vertex. The result encodes
//! a polygon-with-holes using only simple-polygon storage.

use layline_core::Point;
use layline_geometry::{GeometryError, Polygon, Style};

/// Arena node: loops live in a flat vector, the tree references them by
/// index.
struct Node {
    loop_idx: usize,
    children: Vec<usize>,
}

pub(crate) fn reconstruct<L: Clone>(
    loops: Vec<Vec<Point>>,
    layer: &L,
) -> Result<Vec<Polygon<L>>, GeometryError> {
    let loops: Vec<Vec<Point>> = loops.into_iter().filter(|l| !l.is_empty()).collect();
    let probes: Vec<Polygon<()>> = loops.iter().map(|pts| Polygon::new(pts.clone())).collect();

    let mut order: Vec<usize> = (0..loops.len()).collect();
    order.sort_by(|&a, &b| probes[a].area().total_cmp(&probes[b].area()));

    let mut nodes: Vec<Node> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    // Largest loop first, so every outer exists before its holes arrive.
    for &idx in order.iter().rev() {
        let node_id = nodes.len();
        nodes.push(Node {
            loop_idx: idx,
            children: Vec::new(),
        });
        let probe_point = loops[idx][0];
        let mut parent: Option<usize> = None;
        loop {
            let level = match parent {
                None => &roots,
                Some(p) => &nodes[p].children,
            };
            let found = level
                .iter()
                .copied()
                .find(|&n| probes[nodes[n].loop_idx].contains(probe_point));
            match found {
                Some(n) => parent = Some(n),
                None => break,
            }
        }
        match parent {
            None => roots.push(node_id),
            Some(p) => nodes[p].children.push(node_id),
        }
    }

    let mut out = Vec::new();
    for root in roots {
        emit(&nodes, &loops, layer, root, &mut out)?;
    }
    Ok(out)
}

/// Emit one polygon per outer/hole pair; islands inside holes restart at
/// even depth.
fn emit<L: Clone>(
    nodes: &[Node],
    loops: &[Vec<Point>],
    layer: &L,
    outer: usize,
    out: &mut Vec<Polygon<L>>,
) -> Result<(), GeometryError> {
    let node = &nodes[outer];
    let outer_pts = &loops[node.loop_idx];
    if node.children.is_empty() {
        out.push(filled(outer_pts.clone(), layer)?);
        return Ok(());
    }
    for &hole_id in &node.children {
        let hole = &nodes[hole_id];
        let hole_pts = &loops[hole.loop_idx];
        let mut pts = Vec::with_capacity(outer_pts.len() + hole_pts.len() + 2);
        pts.extend_from_slice(outer_pts);
        pts.push(outer_pts[0]);
        pts.extend_from_slice(hole_pts);
        pts.push(hole_pts[0]);
        out.push(filled(pts, layer)?);
        for &island in &hole.children {
            emit(nodes, loops, layer, island, out)?;
        }
    }
    Ok(())
}

fn filled<L: Clone>(points: Vec<Point>, layer: &L) -> Result<Polygon<L>, GeometryError> {
    Ok(Polygon::new(points)
        .with_style(Style::Filled)?
        .with_layer(layer.clone()))
}
