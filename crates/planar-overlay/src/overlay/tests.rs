use super::*;
use crate::error::OverlayError;
use crate::geom::{lines_of, points_of, polygons_of};
use geo::{coord, line_string, point, polygon, Area, GeometryCollection, LineString, MultiPoint, MultiPolygon, Polygon};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]
}

fn area(g: &Geometry<f64>) -> f64 {
    g.unsigned_area()
}

fn run(a: &Geometry<f64>, b: &Geometry<f64>, op: OverlayOp) -> Geometry<f64> {
    overlay(a, b, op, PrecisionModel::Floating).unwrap()
}

fn line_length(ls: &LineString<f64>) -> f64 {
    ls.lines().map(|l| (l.dx() * l.dx() + l.dy() * l.dy()).sqrt()).sum()
}

#[test]
fn overlapping_squares_all_ops() {
    let a: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let b: Geometry<f64> = rect(1.0, 1.0, 3.0, 3.0).into();
    let expected = [
        (OverlayOp::Intersection, 1.0),
        (OverlayOp::Union, 7.0),
        (OverlayOp::Difference, 3.0),
        (OverlayOp::SymDifference, 6.0),
    ];
    for (op, want) in expected {
        let r = run(&a, &b, op);
        assert!((area(&r) - want).abs() < 1e-12, "{op}: area {}", area(&r));
    }
    assert!(matches!(run(&a, &b, OverlayOp::Union), Geometry::Polygon(_)));
    assert!(matches!(run(&a, &b, OverlayOp::SymDifference), Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
}

#[test]
fn triangle_intersection_area() {
    let a: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let b: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)].into();
    let r = run(&a, &b, OverlayOp::Intersection);
    assert!((area(&r) - 0.5).abs() < 1e-12);
}

#[test]
fn disjoint_squares() {
    let a: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let b: Geometry<f64> = rect(5.0, 5.0, 6.0, 6.0).into();
    let inter = run(&a, &b, OverlayOp::Intersection);
    assert!(inter.is_empty());
    assert!(matches!(inter, Geometry::Polygon(_)));
    let uni = run(&a, &b, OverlayOp::Union);
    assert!(matches!(uni, Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
    assert!((area(&uni) - 2.0).abs() < 1e-12);
    let diff = run(&a, &b, OverlayOp::Difference);
    assert!((area(&diff) - 1.0).abs() < 1e-12);
}

#[test]
fn shared_edge_is_dissolved_by_union() {
    let a: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let b: Geometry<f64> = rect(1.0, 0.0, 2.0, 1.0).into();
    let r = run(&a, &b, OverlayOp::Union);
    let Geometry::Polygon(p) = r else {
        panic!("expected a single polygon, got {r:?}");
    };
    assert!(p.interiors().is_empty());
    assert!((p.unsigned_area() - 2.0).abs() < 1e-12);
}

#[test]
fn touching_squares_intersect_in_a_line() {
    let a: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let b: Geometry<f64> = rect(1.0, 0.0, 2.0, 1.0).into();
    let r = run(&a, &b, OverlayOp::Intersection);
    let Geometry::LineString(ls) = r else {
        panic!("expected a line, got {r:?}");
    };
    assert!((line_length(&ls) - 1.0).abs() < 1e-12);
    assert!(ls.0.iter().all(|c| c.x == 1.0));
}

#[test]
fn corner_touch_intersects_in_a_point() {
    let a: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let b: Geometry<f64> = rect(1.0, 1.0, 2.0, 2.0).into();
    let r = run(&a, &b, OverlayOp::Intersection);
    assert_eq!(r, Geometry::Point(point!(x: 1.0, y: 1.0)));
}

#[test]
fn union_fills_hole() {
    let with_hole: Geometry<f64> = Polygon::new(
        rect(0.0, 0.0, 4.0, 4.0).exterior().clone(),
        vec![rect(1.0, 1.0, 3.0, 3.0).exterior().clone()],
    )
    .into();
    let plug: Geometry<f64> = rect(1.0, 1.0, 3.0, 3.0).into();
    let r = run(&with_hole, &plug, OverlayOp::Union);
    let Geometry::Polygon(p) = r else {
        panic!("expected polygon, got {r:?}");
    };
    assert!(p.interiors().is_empty());
    assert!((p.unsigned_area() - 16.0).abs() < 1e-12);
}

#[test]
fn difference_keeps_hole_inside_shell() {
    let a: Geometry<f64> = rect(0.0, 0.0, 4.0, 4.0).into();
    let b: Geometry<f64> = rect(1.0, 1.0, 2.0, 2.0).into();
    let r = run(&a, &b, OverlayOp::Difference);
    let Geometry::Polygon(p) = r else {
        panic!("expected polygon, got {r:?}");
    };
    assert_eq!(p.interiors().len(), 1);
    assert!((p.unsigned_area() - 15.0).abs() < 1e-12);
}

#[test]
fn crossing_lines() {
    let a: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0)].into();
    let b: Geometry<f64> = line_string![(x: 0.0, y: 2.0), (x: 2.0, y: 0.0)].into();

    let inter = run(&a, &b, OverlayOp::Intersection);
    assert_eq!(inter, Geometry::Point(point!(x: 1.0, y: 1.0)));

    let uni = run(&a, &b, OverlayOp::Union);
    let lines = lines_of(&uni);
    assert_eq!(lines.len(), 4);
    let total: f64 = lines.iter().map(line_length).sum();
    assert!((total - 4.0 * 2f64.sqrt()).abs() < 1e-9);

    // the two pieces of `a` meet at a degree-2 node and are merged
    let diff = run(&a, &b, OverlayOp::Difference);
    let Geometry::LineString(ls) = diff else {
        panic!("expected a single line, got {diff:?}");
    };
    assert_eq!(ls.0.len(), 3);
    assert!((line_length(&ls) - 2.0 * 2f64.sqrt()).abs() < 1e-9);
}

#[test]
fn line_minus_polygon() {
    let line: Geometry<f64> = line_string![(x: -1.0, y: 1.0), (x: 3.0, y: 1.0)].into();
    let square: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let r = run(&line, &square, OverlayOp::Difference);
    let lines = lines_of(&r);
    assert_eq!(lines.len(), 2);
    for ls in &lines {
        assert!((line_length(ls) - 1.0).abs() < 1e-12);
        assert!(ls.0.iter().all(|c| c.x <= 0.0 || c.x >= 2.0));
    }

    let inside = run(&line, &square, OverlayOp::Intersection);
    let Geometry::LineString(ls) = inside else {
        panic!("expected line, got {inside:?}");
    };
    assert!((line_length(&ls) - 2.0).abs() < 1e-12);
    // input direction is kept
    assert_eq!(ls.0.first(), Some(&coord! { x: 0.0, y: 1.0 }));
}

#[test]
fn union_of_line_and_polygon_drops_covered_linework() {
    let line: Geometry<f64> = line_string![(x: -1.0, y: 1.0), (x: 3.0, y: 1.0)].into();
    let square: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let r = run(&square, &line, OverlayOp::Union);
    let Geometry::GeometryCollection(gc) = r else {
        panic!("expected collection, got {r:?}");
    };
    assert_eq!(lines_of(&Geometry::GeometryCollection(gc.clone())).len(), 2);
    assert_eq!(polygons_of(&Geometry::GeometryCollection(gc)).len(), 1);
}

#[test]
fn point_sets() {
    let a: Geometry<f64> = MultiPoint::new(vec![point!(x: 0.0, y: 0.0), point!(x: 1.0, y: 1.0)]).into();
    let b: Geometry<f64> = MultiPoint::new(vec![point!(x: 1.0, y: 1.0), point!(x: 2.0, y: 2.0)]).into();

    assert_eq!(run(&a, &b, OverlayOp::Intersection), Geometry::Point(point!(x: 1.0, y: 1.0)));
    assert_eq!(run(&a, &b, OverlayOp::Difference), Geometry::Point(point!(x: 0.0, y: 0.0)));
    assert_eq!(
        points_of(&run(&a, &b, OverlayOp::Union)),
        vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }, coord! { x: 2.0, y: 2.0 }]
    );
    assert_eq!(
        points_of(&run(&a, &b, OverlayOp::SymDifference)),
        vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 2.0 }]
    );
}

#[test]
fn point_sets_are_rounded_under_fixed_precision() {
    let a: Geometry<f64> = MultiPoint::new(vec![point!(x: 0.2, y: 0.1), point!(x: 0.4, y: -0.3)]).into();
    let r = union_unary(&a, PrecisionModel::fixed(1.0)).unwrap();
    assert_eq!(r, Geometry::Point(point!(x: 0.0, y: 0.0)));
}

#[test]
fn points_against_polygon() {
    let square: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let pts: Geometry<f64> = MultiPoint::new(vec![point!(x: 1.0, y: 1.0), point!(x: 5.0, y: 5.0)]).into();

    assert_eq!(run(&square, &pts, OverlayOp::Intersection), Geometry::Point(point!(x: 1.0, y: 1.0)));
    assert_eq!(run(&pts, &square, OverlayOp::Difference), Geometry::Point(point!(x: 5.0, y: 5.0)));

    let diff = run(&square, &pts, OverlayOp::Difference);
    assert!((area(&diff) - 4.0).abs() < 1e-12);

    let uni = run(&pts, &square, OverlayOp::Union);
    let Geometry::GeometryCollection(gc) = uni else {
        panic!("expected collection, got {uni:?}");
    };
    assert_eq!(gc.0.len(), 2);
    assert_eq!(gc.0[0], Geometry::Point(point!(x: 5.0, y: 5.0)));
    assert!(matches!(gc.0[1], Geometry::Polygon(_)));
}

#[test]
fn point_on_line_boundary_is_covered() {
    let line: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)].into();
    let p: Geometry<f64> = point!(x: 2.0, y: 0.0).into();
    assert_eq!(run(&p, &line, OverlayOp::Intersection), Geometry::Point(point!(x: 2.0, y: 0.0)));
    let r = run(&p, &line, OverlayOp::Difference);
    assert!(r.is_empty());
    assert!(matches!(r, Geometry::MultiPoint(_)));
}

#[test]
fn mixed_dimension_collection_is_rejected() {
    let gc: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
        rect(0.0, 0.0, 1.0, 1.0).into(),
        line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 3.0)].into(),
    ]));
    let b: Geometry<f64> = rect(0.5, 0.5, 2.0, 2.0).into();
    let err = overlay(&gc, &b, OverlayOp::Union, PrecisionModel::Floating).unwrap_err();
    assert!(matches!(err, OverlayError::InvalidInput(_)));
}

#[test]
fn non_finite_input_is_rejected() {
    let a: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)].into();
    let b: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let err = overlay(&a, &b, OverlayOp::Intersection, PrecisionModel::Floating).unwrap_err();
    assert!(matches!(err, OverlayError::InvalidInput(_)));
}

#[test]
fn empty_results_have_the_result_dimension() {
    let square: Geometry<f64> = rect(0.0, 0.0, 1.0, 1.0).into();
    let far_line: Geometry<f64> = line_string![(x: 5.0, y: 5.0), (x: 6.0, y: 6.0)].into();
    let empty_poly: Geometry<f64> = Polygon::new(LineString::new(vec![]), vec![]).into();

    let r = run(&square, &far_line, OverlayOp::Intersection);
    assert!(r.is_empty() && matches!(r, Geometry::LineString(_)));

    let r = run(&empty_poly, &square, OverlayOp::Difference);
    assert!(r.is_empty() && matches!(r, Geometry::Polygon(_)));

    let r = run(&square, &square, OverlayOp::Difference);
    assert!(r.is_empty() && matches!(r, Geometry::Polygon(_)));

    let r = run(&square, &square, OverlayOp::SymDifference);
    assert!(r.is_empty() && matches!(r, Geometry::Polygon(_)));
}

#[test]
fn strict_mode_drops_touching_lines_from_area_results() {
    let a: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let b: Geometry<f64> = MultiPolygon::new(vec![rect(1.0, 0.0, 3.0, 1.0), rect(2.0, 1.5, 3.0, 2.0)]).into();

    let loose = run(&a, &b, OverlayOp::Intersection);
    assert_eq!(lines_of(&loose).len(), 1);
    assert!((area(&loose) - 1.0).abs() < 1e-12);

    let strict = OverlayNg::new(&a, &b, OverlayOp::Intersection, PrecisionModel::Floating)
        .with_options(OverlayOptions::default().with_strict_mode(true))
        .result()
        .unwrap();
    assert!(matches!(strict, Geometry::Polygon(_)));
    assert!((area(&strict) - 1.0).abs() < 1e-12);

    let area_only = OverlayNg::new(&a, &b, OverlayOp::Intersection, PrecisionModel::Floating)
        .with_options(OverlayOptions::default().with_area_result_only(true))
        .result()
        .unwrap();
    assert!(matches!(area_only, Geometry::Polygon(_)));
}

#[test]
fn envelope_optimisation_does_not_change_the_result() {
    let a: Geometry<f64> = rect(0.0, 0.0, 10.0, 10.0).into();
    let b: Geometry<f64> = rect(8.0, 8.0, 12.0, 12.0).into();
    for op in OverlayOp::ALL {
        let with = run(&a, &b, op);
        let without = OverlayNg::new(&a, &b, op, PrecisionModel::Floating)
            .with_options(OverlayOptions::default().with_optimize_envelope(false))
            .result()
            .unwrap();
        assert!((area(&with) - area(&without)).abs() < 1e-9, "{op}");
    }
}

#[test]
fn unary_union_merges_components() {
    let mp: Geometry<f64> = MultiPolygon::new(vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)]).into();
    let r = union_unary(&mp, PrecisionModel::Floating).unwrap();
    assert!(matches!(r, Geometry::Polygon(_)));
    assert!((area(&r) - 7.0).abs() < 1e-12);
}

#[test]
fn flattened_hole_collapses_into_the_interior() {
    let poly: Geometry<f64> = Polygon::new(
        rect(0.0, 0.0, 10.0, 10.0).exterior().clone(),
        vec![rect(4.0, 4.0, 6.0, 4.2).exterior().clone()],
    )
    .into();
    let r = union_unary(&poly, PrecisionModel::fixed(1.0)).unwrap();
    let Geometry::Polygon(p) = r else {
        panic!("expected polygon, got {r:?}");
    };
    assert!(p.interiors().is_empty());
    assert!((p.unsigned_area() - 100.0).abs() < 1e-12);
}

#[test]
fn fixed_precision_rounds_result_vertices() {
    let a: Geometry<f64> = rect(0.1, 0.1, 2.2, 2.2).into();
    let b: Geometry<f64> = rect(1.1, 1.1, 3.3, 3.3).into();
    let r = overlay(&a, &b, OverlayOp::Intersection, PrecisionModel::fixed(1.0)).unwrap();
    let Geometry::Polygon(p) = r else {
        panic!("expected polygon, got {r:?}");
    };
    assert!(p.exterior().0.iter().all(|c| c.x.fract() == 0.0 && c.y.fract() == 0.0));
    assert!((p.unsigned_area() - 1.0).abs() < 1e-12);
}

#[test]
fn custom_noder_is_used() {
    let a: Geometry<f64> = rect(0.0, 0.0, 2.0, 2.0).into();
    let b: Geometry<f64> = rect(1.0, 1.0, 3.0, 3.0).into();
    let noder = Box::new(crate::noding::SnappingNoder::new(1e-9));
    let r = overlay_with_noder(&a, &b, OverlayOp::Intersection, noder).unwrap();
    assert!((area(&r) - 1.0).abs() < 1e-9);
}
