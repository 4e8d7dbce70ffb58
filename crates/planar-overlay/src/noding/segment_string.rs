//! Segment strings that accumulate nodes and split into substrings.

use super::SegmentString;
use geo::Coord;
use std::cmp::Ordering;

/// A node on a segment string: the coordinate and the segment it lies on.
#[derive(Clone, Copy, Debug)]
struct SegmentNode {
    coord: Coord<f64>,
    seg_index: usize,
    /// Squared distance from the segment start vertex, used for ordering.
    dist: f64,
}

/// Segment string under noding. Nodes are recorded with
/// `add_intersection`; `into_substrings` splits at every node.
#[derive(Clone, Debug)]
pub(crate) struct NodedSegmentString {
    pub coords: Vec<Coord<f64>>,
    pub tag: usize,
    nodes: Vec<SegmentNode>,
}

impl NodedSegmentString {
    pub fn new(coords: Vec<Coord<f64>>, tag: usize) -> Self {
        Self {
            coords,
            tag,
            nodes: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords.first() == self.coords.last()
    }

    /// Record a node on segment `seg_index`. A node equal to the segment's end
    /// vertex is moved to the following segment so duplicates collapse.
    pub fn add_intersection(&mut self, pt: Coord<f64>, seg_index: usize) {
        debug_assert!(seg_index + 1 < self.coords.len());
        let mut idx = seg_index;
        if idx + 1 < self.coords.len() && pt == self.coords[idx + 1] {
            idx += 1;
        }
        self.push_node(pt, idx);
    }

    fn push_node(&mut self, pt: Coord<f64>, seg_index: usize) {
        let node = self.node_at(pt, seg_index);
        self.nodes.push(node);
    }

    fn node_at(&self, pt: Coord<f64>, seg_index: usize) -> SegmentNode {
        let base = self.coords[seg_index];
        let (dx, dy) = (pt.x - base.x, pt.y - base.y);
        SegmentNode {
            coord: pt,
            seg_index,
            dist: dx * dx + dy * dy,
        }
    }

    #[inline]
    fn is_interior(&self, n: &SegmentNode) -> bool {
        n.coord != self.coords[n.seg_index]
    }

    fn sorted_nodes(&self, with_collapses: bool) -> Vec<SegmentNode> {
        let n = self.coords.len();
        let mut nodes = self.nodes.clone();
        nodes.push(self.node_at(self.coords[0], 0));
        nodes.push(self.node_at(self.coords[n - 1], n - 1));
        sort_dedup(&mut nodes);
        if with_collapses {
            let mut collapsed: Vec<usize> = (0..n.saturating_sub(2))
                .filter(|&i| self.coords[i] == self.coords[i + 2])
                .map(|i| i + 1)
                .collect();
            // A single vertex between two equal nodes is a collapse too.
            for w in nodes.windows(2) {
                if w[0].coord != w[1].coord {
                    continue;
                }
                let mut between = w[1].seg_index as isize - w[0].seg_index as isize;
                if !self.is_interior(&w[1]) {
                    between -= 1;
                }
                if between == 1 {
                    collapsed.push(w[0].seg_index + 1);
                }
            }
            if !collapsed.is_empty() {
                for i in collapsed {
                    nodes.push(self.node_at(self.coords[i], i));
                }
                sort_dedup(&mut nodes);
            }
        }
        nodes
    }

    fn split_points(&self, n0: &SegmentNode, n1: &SegmentNode) -> Vec<Coord<f64>> {
        let npts = n1.seg_index - n0.seg_index + 2;
        if npts == 2 {
            return vec![n0.coord, n1.coord];
        }
        let use_end = self.is_interior(n1) || n1.coord != self.coords[n1.seg_index];
        let mut pts = Vec::with_capacity(npts);
        pts.push(n0.coord);
        pts.extend_from_slice(&self.coords[n0.seg_index + 1..=n1.seg_index]);
        if use_end {
            pts.push(n1.coord);
        }
        pts
    }

    /// All coordinates including inserted nodes, without consecutive repeats.
    pub fn noded_coords(&self) -> Vec<Coord<f64>> {
        let nodes = self.sorted_nodes(false);
        let mut out: Vec<Coord<f64>> = Vec::with_capacity(self.coords.len() + self.nodes.len());
        for w in nodes.windows(2) {
            for p in self.split_points(&w[0], &w[1]) {
                if out.last() != Some(&p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Split at every node (endpoints and collapse vertices included).
    pub fn into_substrings(self) -> Vec<SegmentString> {
        if self.coords.len() < 2 {
            return Vec::new();
        }
        let nodes = self.sorted_nodes(true);
        nodes
            .windows(2)
            .map(|w| SegmentString::new(self.split_points(&w[0], &w[1]), self.tag))
            .collect()
    }
}

fn sort_dedup(nodes: &mut Vec<SegmentNode>) {
    nodes.sort_by(|a, b| {
        a.seg_index
            .cmp(&b.seg_index)
            .then(a.dist.partial_cmp(&b.dist).unwrap_or(Ordering::Equal))
    });
    nodes.dedup_by(|b, a| a.seg_index == b.seg_index && a.coord == b.coord);
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        coord! { x: x, y: y }
    }

    #[test]
    fn splits_at_interior_node() {
        let mut ss = NodedSegmentString::new(vec![c(0.0, 0.0), c(2.0, 0.0), c(2.0, 2.0)], 7);
        ss.add_intersection(c(1.0, 0.0), 0);
        ss.add_intersection(c(1.0, 0.0), 0);
        assert_eq!(ss.noded_coords(), vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(2.0, 2.0)]);
        let subs = ss.into_substrings();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].coords, vec![c(0.0, 0.0), c(1.0, 0.0)]);
        assert_eq!(subs[1].coords, vec![c(1.0, 0.0), c(2.0, 0.0), c(2.0, 2.0)]);
        assert!(subs.iter().all(|s| s.tag == 7));
    }

    #[test]
    fn node_at_vertex_is_normalized() {
        let mut ss = NodedSegmentString::new(vec![c(0.0, 0.0), c(2.0, 0.0), c(2.0, 2.0)], 0);
        ss.add_intersection(c(2.0, 0.0), 0);
        ss.add_intersection(c(2.0, 0.0), 1);
        let subs = ss.into_substrings();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].coords, vec![c(0.0, 0.0), c(2.0, 0.0)]);
        assert_eq!(subs[1].coords, vec![c(2.0, 0.0), c(2.0, 2.0)]);
    }

    #[test]
    fn spike_vertex_becomes_node() {
        let ss = NodedSegmentString::new(vec![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)], 0);
        let subs = ss.into_substrings();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].coords, vec![c(0.0, 0.0), c(1.0, 0.0)]);
        assert_eq!(subs[1].coords, vec![c(1.0, 0.0), c(0.0, 0.0)]);
    }

    #[test]
    fn closed_ring_without_nodes_stays_whole() {
        let ring = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)];
        let ss = NodedSegmentString::new(ring.clone(), 0);
        assert!(ss.is_closed());
        let subs = ss.into_substrings();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].coords, ring);
    }
}
