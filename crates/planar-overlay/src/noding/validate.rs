use super::index::{for_each_overlap, segment, SegIntersection, SegRef, SegmentIntersector};
use super::segment_string::NodedSegmentString;
use super::{Noder, SegmentString};
use crate::error::{OverlayError, Result};
use geo::Coord;

/// Runs another noder and checks that its substrings meet only at endpoints.
pub struct ValidatingNoder {
    inner: Box<dyn Noder>,
    result: Vec<SegmentString>,
}

impl ValidatingNoder {
    pub fn new(inner: Box<dyn Noder>) -> Self {
        Self {
            inner,
            result: Vec::new(),
        }
    }
}

impl Noder for ValidatingNoder {
    fn compute_nodes(&mut self, input: Vec<SegmentString>) -> Result<()> {
        let noded = self.inner.node(input)?;
        if let Some(at) = find_interior_intersection(&noded) {
            return Err(OverlayError::topology("found non-noded intersection", at));
        }
        self.result = noded;
        Ok(())
    }

    fn noded_substrings(&mut self) -> Vec<SegmentString> {
        std::mem::take(&mut self.result)
    }

    fn name(&self) -> &'static str {
        "validating"
    }
}

/// First location where two substrings cross or touch away from their endpoints.
pub(crate) fn find_interior_intersection(strings: &[SegmentString]) -> Option<Coord<f64>> {
    let mut wrapped: Vec<NodedSegmentString> = strings
        .iter()
        .map(|s| NodedSegmentString::new(s.coords.clone(), s.tag))
        .collect();
    let mut finder = InteriorIntersectionFinder { found: None };
    for_each_overlap(&mut wrapped, 0.0, &mut finder);
    finder.found
}

struct InteriorIntersectionFinder {
    found: Option<Coord<f64>>,
}

impl SegmentIntersector for InteriorIntersectionFinder {
    fn process(&mut self, strings: &mut [NodedSegmentString], a: SegRef, b: SegRef) {
        if a == b {
            return;
        }
        let (p00, p01) = segment(strings, a);
        let (p10, p11) = segment(strings, b);
        let li = SegIntersection::compute(p00, p01, p10, p11);
        if li.is_interior(p00, p01, p10, p11) {
            self.found = li.points().first().copied();
            return;
        }
        // Shared vertices must be string endpoints on both sides.
        let same = a.string == b.string;
        if same && a.index.abs_diff(b.index) <= 1 {
            return;
        }
        let n0 = strings[a.string].len();
        let n1 = strings[b.string].len();
        let end00 = a.index == 0;
        let end01 = a.index + 2 == n0;
        let end10 = b.index == 0;
        let end11 = b.index + 2 == n1;
        let candidates = [
            (p00, end00, p10, end10),
            (p00, end00, p11, end11),
            (p01, end01, p10, end10),
            (p01, end01, p11, end11),
        ];
        for (p, e0, q, e1) in candidates {
            if p == q && !(e0 && e1) {
                self.found = Some(p);
                return;
            }
        }
    }

    fn is_done(&self) -> bool {
        self.found.is_some()
    }
}
