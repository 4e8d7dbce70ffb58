//! Snapping noder.
//!
//! Vertices closer than the tolerance are merged into one snapped
//! coordinate, then intersections and near vertex-segment contacts are
//! noded at snapped positions. Robust to nearly coincident linework, at the
//! cost of moving vertices by up to the tolerance.

use super::index::{for_each_overlap, is_adjacent, segment, SegIntersection, SegRef, SegmentIntersector};
use super::segment_string::NodedSegmentString;
use super::{Noder, SegmentString};
use crate::error::Result;
use crate::geom::{distance, distance_to_segment};
use geo::Coord;
use rstar::RTree;

/// Point index that returns an existing point within tolerance, or inserts the query.
pub(crate) struct SnapIndex {
    tree: RTree<[f64; 2]>,
    tolerance: f64,
}

impl SnapIndex {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tree: RTree::new(),
            tolerance,
        }
    }

    pub fn snap(&mut self, p: Coord<f64>) -> Coord<f64> {
        let q = [p.x, p.y];
        if let Some(hit) = self.tree.nearest_neighbor(&q) {
            let (dx, dy) = (hit[0] - p.x, hit[1] - p.y);
            if (dx * dx + dy * dy).sqrt() <= self.tolerance {
                return Coord { x: hit[0], y: hit[1] };
            }
        }
        self.tree.insert(q);
        p
    }
}

pub struct SnappingNoder {
    tolerance: f64,
    result: Vec<NodedSegmentString>,
}

impl SnappingNoder {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            result: Vec::new(),
        }
    }

    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Noder for SnappingNoder {
    fn compute_nodes(&mut self, input: Vec<SegmentString>) -> Result<()> {
        let mut index = SnapIndex::new(self.tolerance);
        let mut strings: Vec<NodedSegmentString> = Vec::with_capacity(input.len());
        for ss in input {
            let mut snapped: Vec<Coord<f64>> = Vec::with_capacity(ss.coords.len());
            for p in ss.coords {
                let q = index.snap(p);
                if snapped.last() != Some(&q) {
                    snapped.push(q);
                }
            }
            if snapped.len() >= 2 {
                strings.push(NodedSegmentString::new(snapped, ss.tag));
            }
        }
        let mut adder = SnappingIntersectionAdder {
            tolerance: self.tolerance,
            index,
        };
        for_each_overlap(&mut strings, 2.0 * self.tolerance, &mut adder);
        self.result = strings;
        Ok(())
    }

    fn noded_substrings(&mut self) -> Vec<SegmentString> {
        std::mem::take(&mut self.result)
            .into_iter()
            .flat_map(NodedSegmentString::into_substrings)
            .collect()
    }

    fn name(&self) -> &'static str {
        "snapping"
    }
}

struct SnappingIntersectionAdder {
    tolerance: f64,
    index: SnapIndex,
}

impl SnappingIntersectionAdder {
    /// Node `p` (a vertex of `src`) onto segment `target` when it lies
    /// within tolerance of the segment but not of its endpoints.
    fn near_vertex(&self, strings: &mut [NodedSegmentString], src: SegRef, p: Coord<f64>, target: SegRef) {
        let (p0, p1) = segment(strings, target);
        if distance(p, p0) < self.tolerance || distance(p, p1) < self.tolerance {
            return;
        }
        if distance_to_segment(p, p0, p1) < self.tolerance {
            strings[target.string].add_intersection(p, target.index);
            strings[src.string].add_intersection(p, src.index);
        }
    }
}

impl SegmentIntersector for SnappingIntersectionAdder {
    fn process(&mut self, strings: &mut [NodedSegmentString], a: SegRef, b: SegRef) {
        if a == b {
            return;
        }
        let (p00, p01) = segment(strings, a);
        let (p10, p11) = segment(strings, b);
        if !is_adjacent(strings, a, b) {
            // Collinear overlaps are left to the near-vertex pass below.
            if let SegIntersection::Point(pt) = SegIntersection::compute(p00, p01, p10, p11) {
                let snapped = self.index.snap(pt);
                strings[a.string].add_intersection(snapped, a.index);
                strings[b.string].add_intersection(snapped, b.index);
            }
        }
        self.near_vertex(strings, a, p00, b);
        self.near_vertex(strings, a, p01, b);
        self.near_vertex(strings, b, p10, a);
        self.near_vertex(strings, b, p11, a);
    }
}
