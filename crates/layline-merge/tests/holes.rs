//! The square-donut round trip: merge, subtract, extract, and query the
//! spliced polygon-with-hole.

use layline_core::{Point, Rect};
use layline_geometry::{Polygon, Style};
use layline_merge::MergeEngine;

fn gp(x: i64, y: i64) -> Point {
    Point::from_grid(x, y).unwrap()
}

fn rect_poly(lx: i64, ly: i64, hx: i64, hy: i64) -> Polygon<&'static str> {
    Polygon::from_rect(Rect::from_diagonal(gp(lx, ly), gp(hx, hy)))
}

#[test]
fn square_donut_round_trips_with_one_spliced_polygon() {
    let mut engine = MergeEngine::new();
    // Outer 10x10 square minus an inner 4x4 square.
    engine.add("m1", &rect_poly(0, 0, 10, 10)).unwrap();
    engine.subtract(&"m1", &rect_poly(3, 3, 7, 7)).unwrap();

    let polys = engine.merged_points(&"m1").unwrap();
    assert_eq!(polys.len(), 1);

    let donut = &polys[0];
    assert_eq!(donut.style(), Style::Filled);
    assert_eq!(donut.layer(), Some(&"m1"));
    // Outer loop closed by its first vertex, then the inner loop closed
    // by its own.
    assert_eq!(donut.points().len(), 10);

    // Points in the annulus are inside.
    assert!(donut.contains(gp(1, 1)));
    assert!(donut.contains(gp(5, 1)));
    assert!(donut.contains(gp(9, 9)));
    // The hole is excluded.
    assert!(!donut.contains(gp(5, 5)));
    assert!(!donut.contains(gp(4, 6)));
    // Outside stays outside.
    assert!(!donut.contains(gp(11, 5)));
}

#[test]
fn donut_area_accounts_for_the_hole() {
    let mut engine = MergeEngine::new();
    engine.add("m1", &rect_poly(0, 0, 10, 10)).unwrap();
    engine.subtract(&"m1", &rect_poly(3, 3, 7, 7)).unwrap();
    assert!((engine.area(&"m1") - 84.0).abs() < 1e-6);

    // The hole is not covered; the annulus is.
    assert!(engine.contains(&"m1", &rect_poly(0, 0, 2, 10)).unwrap());
    assert!(!engine.contains(&"m1", &rect_poly(4, 4, 6, 6)).unwrap());
}

#[test]
fn refilling_the_hole_restores_a_simple_square() {
    let mut engine = MergeEngine::new();
    engine.add("m1", &rect_poly(0, 0, 10, 10)).unwrap();
    engine.subtract(&"m1", &rect_poly(3, 3, 7, 7)).unwrap();
    engine.add("m1", &rect_poly(3, 3, 7, 7)).unwrap();

    let polys = engine.merged_points(&"m1").unwrap();
    assert_eq!(polys.len(), 1);
    assert!(polys[0].contains(gp(5, 5)));
    assert!((engine.area(&"m1") - 100.0).abs() < 1e-6);
}

#[test]
fn nested_donuts_emit_one_polygon_per_ring_pair() {
    let mut engine = MergeEngine::new();
    // Outer ring 0..20 with hole 4..16, island 6..14 with hole 8..12.
    engine.add("m1", &rect_poly(0, 0, 20, 20)).unwrap();
    engine.subtract(&"m1", &rect_poly(4, 4, 16, 16)).unwrap();
    engine.add("m1", &rect_poly(6, 6, 14, 14)).unwrap();
    engine.subtract(&"m1", &rect_poly(8, 8, 12, 12)).unwrap();

    let polys = engine.merged_points(&"m1").unwrap();
    assert_eq!(polys.len(), 2);
    assert!(polys.iter().all(|p| p.points().len() == 10));

    let on_outer_ring = gp(2, 10);
    let in_outer_gap = gp(5, 10);
    let on_island_ring = gp(7, 10);
    let in_island_hole = gp(10, 10);
    assert!(polys.iter().any(|p| p.contains(on_outer_ring)));
    assert!(polys.iter().any(|p| p.contains(on_island_ring)));
    assert!(!polys.iter().any(|p| p.contains(in_outer_gap)));
    assert!(!polys.iter().any(|p| p.contains(in_island_hole)));
}
