//! Snap-rounding noder.
//!
//! Hot pixels are the grid cells holding an input vertex or an
//! intersection. They are collected before any rounding so that rounding
//! cannot move vertices across edges. Every segment passing through a hot
//! pixel is noded at the pixel centre, and all coordinates end up on the
//! grid.

use super::index::{for_each_overlap, segment, SegIntersection, SegRef, SegmentIntersector};
use super::segment_string::NodedSegmentString;
use super::{Noder, SegmentString};
use crate::error::Result;
use crate::geom::{distance, distance_to_segment, orientation_index, CoordKey};
use crate::precision::PrecisionModel;
use geo::Coord;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};
use std::collections::HashMap;

/// Fraction of a grid cell under which vertex-segment contacts count as
/// intersections.
const NEARNESS_FACTOR: f64 = 100.0;

/// Half-width of a pixel in scaled units.
const TOLERANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug)]
pub(crate) struct HotPixel {
    /// Pixel centre (already on the grid).
    center: Coord<f64>,
    scale: f64,
    hpx: f64,
    hpy: f64,
    is_node: bool,
}

impl HotPixel {
    pub fn new(center: Coord<f64>, scale: f64) -> Self {
        Self {
            center,
            scale,
            hpx: (center.x * scale).round(),
            hpy: (center.y * scale).round(),
            is_node: false,
        }
    }

    /// Pixels are half-open: the top and right sides are excluded.
    pub fn intersects_point(&self, p: Coord<f64>) -> bool {
        let x = p.x * self.scale;
        let y = p.y * self.scale;
        !(x >= self.hpx + TOLERANCE || x < self.hpx - TOLERANCE || y >= self.hpy + TOLERANCE || y < self.hpy - TOLERANCE)
    }

    pub fn intersects_segment(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let s = self.scale;
        self.intersects_scaled(p0.x * s, p0.y * s, p1.x * s, p1.y * s)
    }

    fn intersects_scaled(&self, p0x: f64, p0y: f64, p1x: f64, p1y: f64) -> bool {
        let (px, py, qx, qy) = if p0x > p1x { (p1x, p1y, p0x, p0y) } else { (p0x, p0y, p1x, p1y) };
        let maxx = self.hpx + TOLERANCE;
        let minx = self.hpx - TOLERANCE;
        let maxy = self.hpy + TOLERANCE;
        let miny = self.hpy - TOLERANCE;
        if px.min(qx) >= maxx || px.max(qx) < minx || py.min(qy) >= maxy || py.max(qy) < miny {
            return false;
        }
        // Axis-parallel segments that reach here cross the interior or the closed sides.
        if px == qx || py == qy {
            return true;
        }
        let p = Coord { x: px, y: py };
        let q = Coord { x: qx, y: qy };
        let orient_ul = orientation_index(p, q, Coord { x: minx, y: maxy });
        if orient_ul == 0 {
            return py >= qy;
        }
        let orient_ur = orientation_index(p, q, Coord { x: maxx, y: maxy });
        if orient_ur == 0 {
            return py <= qy;
        }
        // top side
        if orient_ul != orient_ur {
            return true;
        }
        let orient_ll = orientation_index(p, q, Coord { x: minx, y: miny });
        if orient_ll == 0 {
            return true;
        }
        // left side
        if orient_ll != orient_ul {
            return true;
        }
        let orient_lr = orientation_index(p, q, Coord { x: maxx, y: miny });
        if orient_lr == 0 {
            return py >= qy;
        }
        // bottom, then right side
        orient_ll != orient_lr || orient_lr != orient_ur
    }
}

type PixelEntry = GeomWithData<[f64; 2], usize>;

/// Hot pixels keyed by their rounded centre, with an R-tree for segment queries.
pub(crate) struct HotPixelIndex {
    pm: PrecisionModel,
    scale: f64,
    pixels: Vec<HotPixel>,
    by_center: HashMap<CoordKey, usize>,
    tree: RTree<PixelEntry>,
}

impl HotPixelIndex {
    pub fn new(scale: f64) -> Self {
        Self {
            pm: PrecisionModel::fixed(scale),
            scale,
            pixels: Vec::new(),
            by_center: HashMap::new(),
            tree: RTree::new(),
        }
    }

    /// Add the pixel holding `p`. A pixel added twice holds more than one
    /// vertex and becomes a node.
    pub fn add(&mut self, p: Coord<f64>) -> usize {
        let center = self.pm.make_precise_coord(p);
        let key = CoordKey::from(center);
        if let Some(&i) = self.by_center.get(&key) {
            self.pixels[i].is_node = true;
            return i;
        }
        let i = self.pixels.len();
        self.pixels.push(HotPixel::new(center, self.scale));
        self.by_center.insert(key, i);
        self.tree.insert(GeomWithData::new([center.x, center.y], i));
        i
    }

    pub fn add_node(&mut self, p: Coord<f64>) {
        let i = self.add(p);
        self.pixels[i].is_node = true;
    }

    /// Pixels whose centre is within one cell of the segment envelope.
    pub fn query(&self, p0: Coord<f64>, p1: Coord<f64>) -> Vec<usize> {
        let pad = 1.0 / self.scale;
        let env = AABB::from_corners(
            [p0.x.min(p1.x) - pad, p0.y.min(p1.y) - pad],
            [p0.x.max(p1.x) + pad, p0.y.max(p1.y) + pad],
        );
        let mut hits: Vec<usize> = self.tree.locate_in_envelope_intersecting(&env).map(|e| e.data).collect();
        hits.sort_unstable();
        hits
    }
}

pub struct SnapRoundingNoder {
    pm: PrecisionModel,
    scale: f64,
    result: Vec<NodedSegmentString>,
}

impl SnapRoundingNoder {
    pub fn new(scale: f64) -> Self {
        Self {
            pm: PrecisionModel::fixed(scale),
            scale,
            result: Vec::new(),
        }
    }

    fn round(&self, pts: &[Coord<f64>]) -> Vec<Coord<f64>> {
        let mut out: Vec<Coord<f64>> = Vec::with_capacity(pts.len());
        for &p in pts {
            let r = self.pm.make_precise_coord(p);
            if out.last() != Some(&r) {
                out.push(r);
            }
        }
        out
    }

    /// Round one string and node it at every hot pixel its original
    /// segments pass through. `None` when it collapses to a point.
    fn snap_segments(&self, ss: &NodedSegmentString, pixels: &mut HotPixelIndex) -> Option<NodedSegmentString> {
        let pts = ss.noded_coords();
        let rounded = self.round(&pts);
        if rounded.len() <= 1 {
            return None;
        }
        let mut snapped = NodedSegmentString::new(rounded, ss.tag);
        let mut snap_index = 0;
        for w in pts.windows(2) {
            let (p0, p1) = (w[0], w[1]);
            let curr = snapped.coords[snap_index];
            if self.pm.make_precise_coord(p1) == curr {
                continue;
            }
            for hp in pixels.query(p0, p1) {
                let pixel = pixels.pixels[hp];
                // A non-node pixel holding one of the segment's own vertices
                // was created by that vertex.
                if !pixel.is_node && (pixel.intersects_point(p0) || pixel.intersects_point(p1)) {
                    continue;
                }
                if pixel.intersects_segment(p0, p1) {
                    snapped.add_intersection(pixel.center, snap_index);
                    pixels.pixels[hp].is_node = true;
                }
            }
            snap_index += 1;
        }
        Some(snapped)
    }

    /// Node interior vertices that landed on node pixels.
    fn add_vertex_nodes(ss: &mut NodedSegmentString, pixels: &HotPixelIndex) {
        let n = ss.coords.len();
        for i in 1..n.saturating_sub(1) {
            let p = ss.coords[i];
            let hit = pixels
                .query(p, p)
                .into_iter()
                .any(|hp| pixels.pixels[hp].is_node && pixels.pixels[hp].center == p);
            if hit {
                ss.add_intersection(p, i);
            }
        }
    }
}

impl Noder for SnapRoundingNoder {
    fn compute_nodes(&mut self, input: Vec<SegmentString>) -> Result<()> {
        let mut strings: Vec<NodedSegmentString> = input
            .into_iter()
            .filter(|s| s.coords.len() >= 2)
            .map(|s| NodedSegmentString::new(s.coords, s.tag))
            .collect();
        let mut pixels = HotPixelIndex::new(self.scale);

        let near_tol = 1.0 / self.scale / NEARNESS_FACTOR;
        let mut adder = SnapRoundingIntersectionAdder {
            tolerance: near_tol,
            intersections: Vec::new(),
        };
        for_each_overlap(&mut strings, near_tol, &mut adder);
        for p in adder.intersections {
            pixels.add_node(p);
        }
        for ss in &strings {
            for &p in &ss.coords {
                pixels.add(p);
            }
        }

        let mut snapped: Vec<NodedSegmentString> = strings
            .iter()
            .filter_map(|ss| self.snap_segments(ss, &mut pixels))
            .collect();
        for ss in snapped.iter_mut() {
            Self::add_vertex_nodes(ss, &pixels);
        }
        self.result = snapped;
        Ok(())
    }

    fn noded_substrings(&mut self) -> Vec<SegmentString> {
        std::mem::take(&mut self.result)
            .into_iter()
            .flat_map(NodedSegmentString::into_substrings)
            .collect()
    }

    fn name(&self) -> &'static str {
        "snap-rounding"
    }
}

/// Collects interior intersections and near vertex-segment contacts; both
/// become node pixels.
struct SnapRoundingIntersectionAdder {
    tolerance: f64,
    intersections: Vec<Coord<f64>>,
}

impl SnapRoundingIntersectionAdder {
    fn near_vertex(&mut self, strings: &mut [NodedSegmentString], p: Coord<f64>, target: SegRef) {
        let (p0, p1) = segment(strings, target);
        if distance(p, p0) < self.tolerance || distance(p, p1) < self.tolerance {
            return;
        }
        if distance_to_segment(p, p0, p1) < self.tolerance {
            self.intersections.push(p);
            strings[target.string].add_intersection(p, target.index);
        }
    }
}

impl SegmentIntersector for SnapRoundingIntersectionAdder {
    fn process(&mut self, strings: &mut [NodedSegmentString], a: SegRef, b: SegRef) {
        if a == b {
            return;
        }
        let (p00, p01) = segment(strings, a);
        let (p10, p11) = segment(strings, b);
        let li = SegIntersection::compute(p00, p01, p10, p11);
        if li.is_interior(p00, p01, p10, p11) {
            for p in li.points() {
                self.intersections.push(p);
                strings[a.string].add_intersection(p, a.index);
                strings[b.string].add_intersection(p, b.index);
            }
            return;
        }
        self.near_vertex(strings, p00, b);
        self.near_vertex(strings, p01, b);
        self.near_vertex(strings, p10, a);
        self.near_vertex(strings, p11, a);
    }
}
