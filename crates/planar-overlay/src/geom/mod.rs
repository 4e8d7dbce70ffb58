//! Planar primitives shared by the noders and the overlay graph.
//!
//! - `Location`, `Dim`: topological location and geometric dimension.
//! - `Envelope`: axis-aligned box with the predicates noding and clipping need.
//! - `CoordKey`: hashable exact coordinate key (−0.0 folded into 0.0).
//! - Flatteners that pull polygons, lines and points out of any `Geometry`.
//!
//! Orientation predicates go through `geo`'s robust kernel so that noding and
//! ring classification agree on sidedness.

pub mod build;
pub mod locate;
pub mod rand;

#[cfg(test)]
mod tests;

use crate::error::{OverlayError, Result};
use geo::kernels::{Kernel, Orientation, RobustKernel};
use geo::{BoundingRect, Coord, CoordsIter, Geometry, LineString, Polygon, Rect, Winding};
use std::cmp::Ordering;

/// Topological location of a point relative to a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
}

/// Geometric dimension; `Empty` sorts below every real dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dim {
    Empty,
    Point,
    Line,
    Area,
}

impl Dim {
    #[inline]
    pub fn rank(self) -> i32 {
        match self {
            Dim::Empty => -1,
            Dim::Point => 0,
            Dim::Line => 1,
            Dim::Area => 2,
        }
    }
}

/// Dimension of a geometry by type. Empty typed geometries keep their type's
/// dimension; an empty collection is `Dim::Empty`.
pub fn dimension(g: &Geometry<f64>) -> Dim {
    match g {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Dim::Point,
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => Dim::Line,
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Dim::Area,
        Geometry::GeometryCollection(gc) => gc.iter().map(dimension).max().unwrap_or(Dim::Empty),
    }
}

/// Exact hashable key for a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(u64, u64);

impl From<Coord<f64>> for CoordKey {
    #[inline]
    fn from(c: Coord<f64>) -> Self {
        // 0.0 == -0.0 must hash alike.
        let fold = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        CoordKey(fold(c.x), fold(c.y))
    }
}

/// Lexicographic (x, then y) coordinate order.
#[inline]
pub fn cmp_coords(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// Orientation of `r` relative to the directed line `p -> q`:
/// `1` left (CCW), `-1` right (CW), `0` collinear.
#[inline]
pub fn orientation_index(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> i32 {
    match RobustKernel::orient2d(p, q, r) {
        Orientation::CounterClockwise => 1,
        Orientation::Clockwise => -1,
        Orientation::Collinear => 0,
    }
}

/// True when a closed ring winds counter-clockwise. Degenerate rings are not CCW.
pub fn is_ccw(ring: &[Coord<f64>]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    LineString::from(ring.to_vec()).is_ccw()
}

/// Copy of `pts` with consecutive duplicates removed.
pub fn remove_repeated(pts: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(pts.len());
    for &p in pts {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

#[inline]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Euclidean distance from `p` to the closed segment `a-b`.
pub fn distance_to_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    if a == b {
        return distance(p, a);
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy);
    if t <= 0.0 {
        return distance(p, a);
    }
    if t >= 1.0 {
        return distance(p, b);
    }
    distance(p, Coord { x: a.x + t * dx, y: a.y + t * dy })
}

/// Axis-aligned bounding box. Always non-empty; absent envelopes are `Option`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(a: Coord<f64>, b: Coord<f64>) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn of_coords(pts: &[Coord<f64>]) -> Option<Self> {
        let (first, rest) = pts.split_first()?;
        let mut env = Envelope::new(*first, *first);
        for &p in rest {
            env.expand_to_include(p);
        }
        Some(env)
    }

    #[inline]
    pub fn from_rect(r: Rect<f64>) -> Self {
        Envelope::new(r.min(), r.max())
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn intersects_coord(&self, p: Coord<f64>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// True when the envelope of segment `a-b` meets this envelope.
    #[inline]
    pub fn intersects_segment(&self, a: Coord<f64>, b: Coord<f64>) -> bool {
        self.intersects(&Envelope::new(a, b))
    }

    #[inline]
    pub fn intersects(&self, o: &Envelope) -> bool {
        !(o.min_x > self.max_x || o.max_x < self.min_x || o.min_y > self.max_y || o.max_y < self.min_y)
    }

    #[inline]
    pub fn disjoint(&self, o: &Envelope) -> bool {
        !self.intersects(o)
    }

    /// True when `o` lies inside this envelope (boundary included).
    #[inline]
    pub fn covers(&self, o: &Envelope) -> bool {
        o.min_x >= self.min_x && o.max_x <= self.max_x && o.min_y >= self.min_y && o.max_y <= self.max_y
    }

    pub fn intersection(&self, o: &Envelope) -> Option<Envelope> {
        if self.disjoint(o) {
            return None;
        }
        Some(Envelope {
            min_x: self.min_x.max(o.min_x),
            min_y: self.min_y.max(o.min_y),
            max_x: self.max_x.min(o.max_x),
            max_y: self.max_y.min(o.max_y),
        })
    }

    #[inline]
    pub fn expand_by(&self, d: f64) -> Envelope {
        Envelope {
            min_x: self.min_x - d,
            min_y: self.min_y - d,
            max_x: self.max_x + d,
            max_y: self.max_y + d,
        }
    }

    pub fn expand_to_include(&mut self, p: Coord<f64>) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn merge(&mut self, o: &Envelope) {
        self.min_x = self.min_x.min(o.min_x);
        self.min_y = self.min_y.min(o.min_y);
        self.max_x = self.max_x.max(o.max_x);
        self.max_y = self.max_y.max(o.max_y);
    }

    /// Largest absolute ordinate among the four bounds.
    pub fn max_magnitude(&self) -> f64 {
        self.min_x
            .abs()
            .max(self.min_y.abs())
            .max(self.max_x.abs())
            .max(self.max_y.abs())
    }
}

/// Envelope of a geometry, `None` when it has no coordinates.
pub fn envelope_of(g: &Geometry<f64>) -> Option<Envelope> {
    g.bounding_rect().map(Envelope::from_rect)
}

/// Every polygonal component of `g` (rects and triangles converted).
pub fn polygons_of(g: &Geometry<f64>) -> Vec<Polygon<f64>> {
    let mut out = Vec::new();
    collect_polygons(g, &mut out);
    out
}

fn collect_polygons(g: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match g {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc.iter().for_each(|c| collect_polygons(c, out)),
        _ => {}
    }
}

/// Every linear component of `g`.
pub fn lines_of(g: &Geometry<f64>) -> Vec<LineString<f64>> {
    let mut out = Vec::new();
    collect_lines(g, &mut out);
    out
}

fn collect_lines(g: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match g {
        Geometry::Line(l) => out.push(LineString::from(vec![l.start, l.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.iter().cloned()),
        Geometry::GeometryCollection(gc) => gc.iter().for_each(|c| collect_lines(c, out)),
        _ => {}
    }
}

/// Coordinates of every point component of `g`.
pub fn points_of(g: &Geometry<f64>) -> Vec<Coord<f64>> {
    match g {
        Geometry::Point(p) => vec![p.0],
        Geometry::MultiPoint(mp) => mp.iter().map(|p| p.0).collect(),
        Geometry::GeometryCollection(gc) => gc.iter().flat_map(points_of).collect(),
        _ => Vec::new(),
    }
}

/// Rejects NaN and infinite ordinates.
pub fn check_finite(g: &Geometry<f64>) -> Result<()> {
    match g.coords_iter().find(|c| !(c.x.is_finite() && c.y.is_finite())) {
        Some(c) => Err(OverlayError::InvalidInput(format!(
            "non-finite coordinate ({}, {})",
            c.x, c.y
        ))),
        None => Ok(()),
    }
}
