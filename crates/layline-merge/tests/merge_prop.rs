use layline_core::{Point, Rect};
use layline_geometry::Polygon;
use layline_merge::MergeEngine;
use proptest::prelude::*;

fn gp(x: i64, y: i64) -> Point {
    Point::from_grid(x, y).unwrap()
}

fn rect_poly(x: i64, y: i64, w: i64, h: i64) -> Polygon<&'static str> {
    Polygon::from_rect(Rect::from_diagonal(gp(x, y), gp(x + w, y + h)))
}

prop_compose! {
    fn arb_rect()(x in -100i64..100, y in -100i64..100, w in 1i64..60, h in 1i64..60)
        -> (i64, i64, i64, i64) {
        (x, y, w, h)
    }
}

proptest! {
    #[test]
    fn union_is_idempotent(r in arb_rect()) {
        let (x, y, w, h) = r;
        let mut once = MergeEngine::new();
        once.add("m", &rect_poly(x, y, w, h)).unwrap();
        let mut twice = MergeEngine::new();
        twice.add("m", &rect_poly(x, y, w, h)).unwrap();
        twice.add("m", &rect_poly(x, y, w, h)).unwrap();
        prop_assert!((once.area(&"m") - twice.area(&"m")).abs() < 1e-6);
        prop_assert_eq!(once.merged_points(&"m").unwrap().len(), 1);
        prop_assert_eq!(twice.merged_points(&"m").unwrap().len(), 1);
    }

    #[test]
    fn subtracting_the_second_operand_leaves_a_subset(
        r in arb_rect(),
        s in arb_rect(),
    ) {
        let (rx, ry, rw, rh) = r;
        let (sx, sy, sw, sh) = s;
        let mut engine = MergeEngine::new();
        engine.add("m", &rect_poly(rx, ry, rw, rh)).unwrap();
        engine.add("m", &rect_poly(sx, sy, sw, sh)).unwrap();
        engine.subtract(&"m", &rect_poly(sx, sy, sw, sh)).unwrap();

        // Whatever remains is covered by R alone.
        let leftover = engine.area(&"m");
        prop_assert!(leftover <= (rw * rh) as f64 + 1e-6);
        for poly in engine.merged_points(&"m").unwrap() {
            let r_only = rect_poly(rx, ry, rw, rh);
            for &v in poly.points() {
                prop_assert!(r_only.contains(v));
            }
        }
    }

    #[test]
    fn disjoint_additions_stay_separate(
        w1 in 1i64..40, h1 in 1i64..40,
        w2 in 1i64..40, h2 in 1i64..40,
        gap in 1i64..50,
    ) {
        let mut engine = MergeEngine::new();
        engine.add("m", &rect_poly(0, 0, w1, h1)).unwrap();
        engine.add("m", &rect_poly(w1 + gap, 0, w2, h2)).unwrap();
        let total = (w1 * h1 + w2 * h2) as f64;
        prop_assert!((engine.area(&"m") - total).abs() < 1e-6);
        prop_assert_eq!(engine.merged_points(&"m").unwrap().len(), 2);
    }

    #[test]
    fn contains_accepts_inner_and_rejects_escaping_rectangles(
        r in arb_rect(),
        inset in 0i64..5,
    ) {
        let (x, y, w, h) = r;
        prop_assume!(w > 2 * inset && h > 2 * inset);
        let mut engine = MergeEngine::new();
        engine.add("m", &rect_poly(x, y, w, h)).unwrap();
        let inner = rect_poly(x + inset, y + inset, w - 2 * inset, h - 2 * inset);
        prop_assert!(engine.contains(&"m", &inner).unwrap());
        let escaping = rect_poly(x - 1, y, w + 1, h);
        prop_assert!(!engine.contains(&"m", &escaping).unwrap());
    }
}
