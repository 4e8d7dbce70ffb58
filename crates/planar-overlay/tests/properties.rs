//! Property tests over random star-shaped polygon pairs.

use geo::{Area, Geometry};
use nalgebra::Vector2;
use planar_overlay::geom::polygons_of;
use planar_overlay::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn pair(seed: u64, dx: f64, dy: f64, hole: bool) -> (Geometry<f64>, Geometry<f64>) {
    let cfg = RadialCfg {
        vertex_count: VertexCount::Uniform { min: 5, max: 16 },
        hole_frac: if hole { 0.3 } else { 0.0 },
        ..RadialCfg::default()
    };
    let (a, b) = draw_pair(cfg, ReplayToken { seed, index: 0 }, Vector2::new(dx, dy));
    (a.into(), b.into())
}

fn area_of(a: &Geometry<f64>, b: &Geometry<f64>, op: OverlayOp) -> f64 {
    overlay_robust(a, b, op).unwrap().unsigned_area()
}

/// Number of ring segments of `g` that appear more than once, ignoring direction.
fn repeated_segments(g: &Geometry<f64>) -> usize {
    let mut seen = HashSet::new();
    let mut repeats = 0;
    for p in polygons_of(g) {
        for ring in std::iter::once(p.exterior()).chain(p.interiors()) {
            for seg in ring.lines() {
                let s = (seg.start.x.to_bits(), seg.start.y.to_bits());
                let e = (seg.end.x.to_bits(), seg.end.y.to_bits());
                if !seen.insert(if s <= e { (s, e) } else { (e, s) }) {
                    repeats += 1;
                }
            }
        }
    }
    repeats
}

const TOL: f64 = 1e-9;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn intersection_and_union_commute(seed in any::<u64>(), dx in -1.5f64..1.5, dy in -1.5f64..1.5, hole in any::<bool>()) {
        let (a, b) = pair(seed, dx, dy, hole);
        for op in [OverlayOp::Intersection, OverlayOp::Union, OverlayOp::SymDifference] {
            let ab = area_of(&a, &b, op);
            let ba = area_of(&b, &a, op);
            prop_assert!((ab - ba).abs() < TOL, "{} not commutative: {} vs {}", op, ab, ba);
        }
    }

    #[test]
    fn areas_are_monotone(seed in any::<u64>(), dx in -1.5f64..1.5, dy in -1.5f64..1.5, hole in any::<bool>()) {
        let (a, b) = pair(seed, dx, dy, hole);
        let (area_a, area_b) = (a.unsigned_area(), b.unsigned_area());
        let inter = area_of(&a, &b, OverlayOp::Intersection);
        let uni = area_of(&a, &b, OverlayOp::Union);
        prop_assert!(uni + TOL >= area_a.max(area_b));
        prop_assert!(inter <= area_a.min(area_b) + TOL);
        // inclusion-exclusion
        prop_assert!((uni + inter - area_a - area_b).abs() < 1e-7);
        let diff = area_of(&a, &b, OverlayOp::Difference);
        prop_assert!((diff - (area_a - inter)).abs() < 1e-7);
        let sym = area_of(&a, &b, OverlayOp::SymDifference);
        prop_assert!((sym - (uni - inter)).abs() < 1e-7);
    }

    #[test]
    fn results_have_no_repeated_boundary_segments(seed in any::<u64>(), dx in -1.5f64..1.5, dy in -1.5f64..1.5, hole in any::<bool>()) {
        let (a, b) = pair(seed, dx, dy, hole);
        for op in OverlayOp::ALL {
            let r = overlay_robust(&a, &b, op).unwrap();
            prop_assert_eq!(repeated_segments(&r), 0, "{}", op);
        }
    }

    #[test]
    fn union_with_itself_is_idempotent(seed in any::<u64>(), hole in any::<bool>()) {
        let (a, _) = pair(seed, 0.0, 0.0, hole);
        let r = overlay_robust(&a, &a, OverlayOp::Union).unwrap();
        prop_assert!((r.unsigned_area() - a.unsigned_area()).abs() < TOL);
        let d = overlay_robust(&a, &a, OverlayOp::Difference).unwrap();
        prop_assert!(d.unsigned_area() < TOL);
    }

    #[test]
    fn far_apart_inputs_do_not_interact(seed in any::<u64>()) {
        let (a, b) = pair(seed, 10.0, 0.0, false);
        let inter = overlay_robust(&a, &b, OverlayOp::Intersection).unwrap();
        prop_assert!(matches!(inter, Geometry::Polygon(ref p) if p.exterior().0.is_empty()));
        let uni = overlay_robust(&a, &b, OverlayOp::Union).unwrap();
        prop_assert!(matches!(uni, Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
        prop_assert!((uni.unsigned_area() - a.unsigned_area() - b.unsigned_area()).abs() < TOL);
    }

    #[test]
    fn reduced_polygons_stay_on_grid(seed in any::<u64>(), scale in prop::sample::select(vec![10.0, 100.0, 1000.0])) {
        let (a, _) = pair(seed, 0.0, 0.0, false);
        let r = reduce_precision(&a, PrecisionModel::fixed(scale)).unwrap();
        for p in polygons_of(&r) {
            for c in &p.exterior().0 {
                prop_assert!(((c.x * scale).round() - c.x * scale).abs() < 1e-6);
                prop_assert!(((c.y * scale).round() - c.y * scale).abs() < 1e-6);
            }
        }
        prop_assert!((r.unsigned_area() - a.unsigned_area()).abs() < 8.0 / scale);
    }
}
