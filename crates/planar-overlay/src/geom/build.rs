//! Result geometry assembly.

use super::Dim;
use geo::{Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

/// Empty geometry of the given dimension.
pub fn empty_of(dim: Dim) -> Geometry<f64> {
    match dim {
        Dim::Area => Polygon::new(LineString::new(vec![]), vec![]).into(),
        Dim::Line => LineString::new(vec![]).into(),
        Dim::Point => MultiPoint::new(vec![]).into(),
        Dim::Empty => Geometry::GeometryCollection(GeometryCollection::new_from(vec![])),
    }
}

/// Most specific geometry holding the given components, or `None` when all
/// lists are empty. Mixed dimensions yield a collection ordered points,
/// lines, polygons.
pub fn assemble(
    points: Vec<Point<f64>>,
    lines: Vec<LineString<f64>>,
    polys: Vec<Polygon<f64>>,
) -> Option<Geometry<f64>> {
    let kinds = [!points.is_empty(), !lines.is_empty(), !polys.is_empty()]
        .iter()
        .filter(|k| **k)
        .count();
    match kinds {
        0 => None,
        1 if !points.is_empty() => Some(single_or_multi(points, |p| p.into(), |v| MultiPoint::new(v).into())),
        1 if !lines.is_empty() => Some(single_or_multi(lines, |l| l.into(), |v| MultiLineString::new(v).into())),
        1 => Some(single_or_multi(polys, |p| p.into(), |v| MultiPolygon::new(v).into())),
        _ => {
            let mut parts: Vec<Geometry<f64>> = Vec::with_capacity(points.len() + lines.len() + polys.len());
            parts.extend(points.into_iter().map(Geometry::Point));
            parts.extend(lines.into_iter().map(Geometry::LineString));
            parts.extend(polys.into_iter().map(Geometry::Polygon));
            Some(Geometry::GeometryCollection(GeometryCollection::new_from(parts)))
        }
    }
}

fn single_or_multi<T>(
    mut items: Vec<T>,
    single: impl FnOnce(T) -> Geometry<f64>,
    multi: impl FnOnce(Vec<T>) -> Geometry<f64>,
) -> Geometry<f64> {
    if items.len() == 1 {
        if let Some(item) = items.pop() {
            return single(item);
        }
    }
    multi(items)
}
