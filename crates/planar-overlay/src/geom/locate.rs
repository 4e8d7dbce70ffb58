//! Point location against areas and lines.
//!
//! Area location counts crossings of a ray running from the query point in
//! the +x direction. Upward segments include their start point and downward
//! segments their end point, so shared vertices are counted once. Segments
//! live in an R-tree so each query touches only the segments crossing the
//! ray's envelope.

use super::{orientation_index, polygons_of, lines_of, Envelope, Location};
use geo::{Coord, Geometry};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Locates coordinates relative to a fixed geometry.
pub trait PointLocator {
    fn locate(&self, p: Coord<f64>) -> Location;
}

/// Crossing-number accumulator for a single query point.
#[derive(Clone, Copy, Debug)]
pub struct RayCrossingCounter {
    p: Coord<f64>,
    crossings: usize,
    on_segment: bool,
}

impl RayCrossingCounter {
    pub fn new(p: Coord<f64>) -> Self {
        Self {
            p,
            crossings: 0,
            on_segment: false,
        }
    }

    pub fn count_segment(&mut self, p1: Coord<f64>, p2: Coord<f64>) {
        let p = self.p;
        if p1.x < p.x && p2.x < p.x {
            return;
        }
        if p == p2 {
            self.on_segment = true;
            return;
        }
        // horizontal
        if p1.y == p.y && p2.y == p.y {
            let (lo, hi) = if p1.x <= p2.x { (p1.x, p2.x) } else { (p2.x, p1.x) };
            if p.x >= lo && p.x <= hi {
                self.on_segment = true;
            }
            return;
        }
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation_index(p1, p2, p);
            if orient == 0 {
                self.on_segment = true;
                return;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient == 1 {
                self.crossings += 1;
            }
        }
    }

    #[inline]
    pub fn is_on_segment(&self) -> bool {
        self.on_segment
    }

    pub fn location(&self) -> Location {
        if self.on_segment {
            Location::Boundary
        } else if self.crossings % 2 == 1 {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Location of `p` relative to a single closed ring.
pub fn locate_in_ring(p: Coord<f64>, ring: &[Coord<f64>]) -> Location {
    let mut counter = RayCrossingCounter::new(p);
    for w in ring.windows(2) {
        counter.count_segment(w[0], w[1]);
        if counter.is_on_segment() {
            break;
        }
    }
    counter.location()
}

type IndexedSegment = GeomWithData<Rectangle<[f64; 2]>, (Coord<f64>, Coord<f64>)>;

fn segment_entry(a: Coord<f64>, b: Coord<f64>) -> IndexedSegment {
    GeomWithData::new(Rectangle::from_corners([a.x, a.y], [b.x, b.y]), (a, b))
}

/// Indexed point-in-area locator over every ring of the polygonal
/// components of a geometry.
pub struct IndexedAreaLocator {
    tree: RTree<IndexedSegment>,
    env: Option<Envelope>,
}

impl IndexedAreaLocator {
    pub fn new(g: &Geometry<f64>) -> Self {
        let mut segs = Vec::new();
        let mut env: Option<Envelope> = None;
        for poly in polygons_of(g) {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
                for w in ring.0.windows(2) {
                    segs.push(segment_entry(w[0], w[1]));
                    let seg_env = Envelope::new(w[0], w[1]);
                    match env.as_mut() {
                        Some(e) => e.merge(&seg_env),
                        None => env = Some(seg_env),
                    }
                }
            }
        }
        Self {
            tree: RTree::bulk_load(segs),
            env,
        }
    }
}

impl PointLocator for IndexedAreaLocator {
    fn locate(&self, p: Coord<f64>) -> Location {
        let env = match self.env {
            Some(e) if e.intersects_coord(p) => e,
            _ => return Location::Exterior,
        };
        let ray = AABB::from_corners([p.x, p.y], [env.max_x, p.y]);
        let mut counter = RayCrossingCounter::new(p);
        for seg in self.tree.locate_in_envelope_intersecting(&ray) {
            let (a, b) = seg.data;
            counter.count_segment(a, b);
            if counter.is_on_segment() {
                break;
            }
        }
        counter.location()
    }
}

/// Indexed point-on-line locator: `Interior` when the point lies on any
/// segment, `Exterior` otherwise. Line boundaries are not distinguished.
pub struct IndexedLineLocator {
    tree: RTree<IndexedSegment>,
}

impl IndexedLineLocator {
    pub fn new(g: &Geometry<f64>) -> Self {
        let segs: Vec<IndexedSegment> = lines_of(g)
            .iter()
            .flat_map(|ls| ls.0.windows(2).map(|w| segment_entry(w[0], w[1])).collect::<Vec<_>>())
            .collect();
        Self {
            tree: RTree::bulk_load(segs),
        }
    }
}

impl PointLocator for IndexedLineLocator {
    fn locate(&self, p: Coord<f64>) -> Location {
        let query = AABB::from_point([p.x, p.y]);
        let on_line = self.tree.locate_in_envelope_intersecting(&query).any(|seg| {
            let (a, b) = seg.data;
            orientation_index(a, b, p) == 0 && Envelope::new(a, b).intersects_coord(p)
        });
        if on_line {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}
