use super::*;
use geo::{coord, line_string, point, polygon, Geometry, GeometryCollection, MultiPoint};
use std::collections::HashSet;

#[test]
fn coord_key_folds_negative_zero() {
    let a = CoordKey::from(coord! { x: 0.0, y: -0.0 });
    let b = CoordKey::from(coord! { x: -0.0, y: 0.0 });
    assert_eq!(a, b);
    let set: HashSet<CoordKey> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn dimension_by_type() {
    let poly: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)].into();
    assert_eq!(dimension(&poly), Dim::Area);
    let line: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into();
    assert_eq!(dimension(&line), Dim::Line);
    assert_eq!(dimension(&point!(x: 1.0, y: 1.0).into()), Dim::Point);
    assert_eq!(dimension(&MultiPoint::<f64>::new(vec![]).into()), Dim::Point);
    let empty: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::<f64>::new_from(vec![]));
    assert_eq!(dimension(&empty), Dim::Empty);
    let mixed: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::new_from(vec![line, poly]));
    assert_eq!(dimension(&mixed), Dim::Area);
    assert!(Dim::Empty < Dim::Point && Dim::Line < Dim::Area);
}

#[test]
fn orientation_and_winding() {
    let p = coord! { x: 0.0, y: 0.0 };
    let q = coord! { x: 1.0, y: 0.0 };
    assert_eq!(orientation_index(p, q, coord! { x: 0.5, y: 1.0 }), 1);
    assert_eq!(orientation_index(p, q, coord! { x: 0.5, y: -1.0 }), -1);
    assert_eq!(orientation_index(p, q, coord! { x: 2.0, y: 0.0 }), 0);
    let ccw = [p, q, coord! { x: 1.0, y: 1.0 }, p];
    assert!(is_ccw(&ccw));
    let mut cw = ccw;
    cw.reverse();
    assert!(!is_ccw(&cw));
    // Flat rings are never CCW.
    assert!(!is_ccw(&[p, q, coord! { x: 2.0, y: 0.0 }, p]));
}

#[test]
fn envelope_predicates() {
    let e = Envelope::new(coord! { x: 2.0, y: 2.0 }, coord! { x: 0.0, y: 0.0 });
    assert_eq!((e.min_x, e.max_y), (0.0, 2.0));
    assert!(e.intersects_coord(coord! { x: 2.0, y: 1.0 }));
    assert!(!e.intersects_coord(coord! { x: 2.1, y: 1.0 }));
    assert!(e.intersects_segment(coord! { x: -1.0, y: 1.0 }, coord! { x: 3.0, y: 1.0 }));
    let f = Envelope::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 3.0, y: 3.0 });
    let i = e.intersection(&f).unwrap();
    assert_eq!((i.min_x, i.min_y, i.max_x, i.max_y), (1.0, 1.0, 2.0, 2.0));
    assert!(e.expand_by(1.0).covers(&f));
    assert!(!e.covers(&f));
    let far = Envelope::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 6.0, y: 6.0 });
    assert!(e.disjoint(&far) && e.intersection(&far).is_none());
    assert_eq!(far.max_magnitude(), 6.0);
}

#[test]
fn repeated_points_and_distances() {
    let a = coord! { x: 0.0, y: 0.0 };
    let b = coord! { x: 4.0, y: 0.0 };
    assert_eq!(remove_repeated(&[a, a, b, b, a]), vec![a, b, a]);
    assert_eq!(distance_to_segment(coord! { x: 2.0, y: 3.0 }, a, b), 3.0);
    assert_eq!(distance_to_segment(coord! { x: 7.0, y: 4.0 }, a, b), 5.0);
    assert_eq!(distance_to_segment(coord! { x: 0.0, y: 1.0 }, a, a), 1.0);
}

#[test]
fn non_finite_is_invalid_input() {
    let g: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: f64::NAN, y: 1.0)].into();
    assert!(matches!(check_finite(&g), Err(OverlayError::InvalidInput(_))));
    let ok: Geometry<f64> = point!(x: 1.0, y: 2.0).into();
    assert!(check_finite(&ok).is_ok());
}

#[test]
fn flatteners_walk_collections() {
    let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
    let gc: Geometry<f64> = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
        poly.clone().into(),
        Geometry::GeometryCollection(GeometryCollection::new_from(vec![poly.into()])),
    ]));
    assert_eq!(polygons_of(&gc).len(), 2);
    assert!(lines_of(&gc).is_empty());
    let mp: Geometry<f64> = MultiPoint::from(vec![(1.0, 1.0), (2.0, 2.0)]).into();
    assert_eq!(points_of(&mp).len(), 2);
}
