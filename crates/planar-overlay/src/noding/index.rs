//! Indexed segment-pair search and the exact floating noder.

use super::segment_string::NodedSegmentString;
use super::{Noder, SegmentString};
use crate::error::Result;
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Segment `index` of string `string`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SegRef {
    pub string: usize,
    pub index: usize,
}

/// Result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum SegIntersection {
    None,
    Point(Coord<f64>),
    Collinear(Coord<f64>, Coord<f64>),
}

impl SegIntersection {
    pub fn compute(p00: Coord<f64>, p01: Coord<f64>, p10: Coord<f64>, p11: Coord<f64>) -> Self {
        match line_intersection(Line::new(p00, p01), Line::new(p10, p11)) {
            None => SegIntersection::None,
            Some(LineIntersection::SinglePoint { intersection, .. }) => SegIntersection::Point(intersection),
            Some(LineIntersection::Collinear { intersection }) => {
                if intersection.start == intersection.end {
                    SegIntersection::Point(intersection.start)
                } else {
                    SegIntersection::Collinear(intersection.start, intersection.end)
                }
            }
        }
    }

    pub fn points(&self) -> Vec<Coord<f64>> {
        match *self {
            SegIntersection::None => Vec::new(),
            SegIntersection::Point(p) => vec![p],
            SegIntersection::Collinear(a, b) => vec![a, b],
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        match self {
            SegIntersection::None => 0,
            SegIntersection::Point(_) => 1,
            SegIntersection::Collinear(..) => 2,
        }
    }

    /// True when some intersection point is not an endpoint of one of the segments.
    pub fn is_interior(&self, p00: Coord<f64>, p01: Coord<f64>, p10: Coord<f64>, p11: Coord<f64>) -> bool {
        self.points()
            .iter()
            .any(|&p| (p != p00 && p != p01) || (p != p10 && p != p11))
    }
}

/// Callback for candidate segment pairs whose envelopes overlap.
pub(crate) trait SegmentIntersector {
    fn process(&mut self, strings: &mut [NodedSegmentString], a: SegRef, b: SegRef);

    /// Stop the pair scan early.
    fn is_done(&self) -> bool {
        false
    }
}

type SegEntry = GeomWithData<Rectangle<[f64; 2]>, SegRef>;

/// Visit every pair of distinct segments whose envelopes, expanded by
/// `tolerance`, overlap. Each unordered pair is visited once.
pub(crate) fn for_each_overlap(
    strings: &mut [NodedSegmentString],
    tolerance: f64,
    isect: &mut dyn SegmentIntersector,
) {
    let entries: Vec<SegEntry> = strings
        .iter()
        .enumerate()
        .flat_map(|(s, ss)| {
            ss.coords.windows(2).enumerate().map(move |(i, w)| {
                GeomWithData::new(
                    Rectangle::from_corners([w[0].x, w[0].y], [w[1].x, w[1].y]),
                    SegRef { string: s, index: i },
                )
            })
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut pairs: Vec<(SegRef, SegRef)> = Vec::new();
    for (s, ss) in strings.iter().enumerate() {
        for (i, w) in ss.coords.windows(2).enumerate() {
            let me = SegRef { string: s, index: i };
            let search = AABB::from_corners(
                [w[0].x.min(w[1].x) - tolerance, w[0].y.min(w[1].y) - tolerance],
                [w[0].x.max(w[1].x) + tolerance, w[0].y.max(w[1].y) + tolerance],
            );
            for cand in tree.locate_in_envelope_intersecting(&search) {
                if cand.data <= me {
                    continue;
                }
                pairs.push((me, cand.data));
            }
        }
    }
    pairs.sort_unstable();
    for (a, b) in pairs {
        isect.process(strings, a, b);
        if isect.is_done() {
            break;
        }
    }
}

#[inline]
pub(crate) fn segment(strings: &[NodedSegmentString], r: SegRef) -> (Coord<f64>, Coord<f64>) {
    let c = &strings[r.string].coords;
    (c[r.index], c[r.index + 1])
}

/// Segments `a` and `b` are neighbours in one string (including the
/// closing pair of a ring).
pub(crate) fn is_adjacent(strings: &[NodedSegmentString], a: SegRef, b: SegRef) -> bool {
    if a.string != b.string {
        return false;
    }
    if a.index.abs_diff(b.index) == 1 {
        return true;
    }
    let ss = &strings[a.string];
    if ss.is_closed() {
        let max = ss.len() - 2;
        if (a.index == 0 && b.index == max) || (b.index == 0 && a.index == max) {
            return true;
        }
    }
    false
}

/// Adds every non-trivial intersection as a node on both segments.
struct IntersectionAdder;

impl SegmentIntersector for IntersectionAdder {
    fn process(&mut self, strings: &mut [NodedSegmentString], a: SegRef, b: SegRef) {
        if a == b {
            return;
        }
        let (p00, p01) = segment(strings, a);
        let (p10, p11) = segment(strings, b);
        let li = SegIntersection::compute(p00, p01, p10, p11);
        if li.count() == 0 {
            return;
        }
        // Neighbouring segments always share their common vertex.
        if li.count() == 1 && is_adjacent(strings, a, b) {
            return;
        }
        for p in li.points() {
            strings[a.string].add_intersection(p, a.index);
            strings[b.string].add_intersection(p, b.index);
        }
    }
}

/// Exact floating-point noder over an R-tree of segment envelopes.
#[derive(Default)]
pub struct IndexNoder {
    result: Vec<NodedSegmentString>,
}

impl IndexNoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Noder for IndexNoder {
    fn compute_nodes(&mut self, input: Vec<SegmentString>) -> Result<()> {
        let mut strings: Vec<NodedSegmentString> = input
            .into_iter()
            .map(|s| NodedSegmentString::new(s.coords, s.tag))
            .collect();
        for_each_overlap(&mut strings, 0.0, &mut IntersectionAdder);
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
        "index"
    }
}
