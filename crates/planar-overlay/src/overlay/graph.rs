//! Half-edge topology graph.
//!
//! Layout
//! - Each edge yields two half-edges stored at `2k` (forward) and `2k + 1`
//!   (reverse); `sym(e) = e ^ 1`.
//! - `next[e]` is the half-edge following `e` around its left face, so the
//!   CCW successor of `e` around its origin is `next[sym(e)]`.
//! - Edge coordinates and labels live once per pair. Labels are stored for
//!   the forward direction; `label(e)` returns the view from `e`.
//! - Nodes are kept in insertion order, one representative half-edge each.

use super::label::OverlayLabel;
use crate::error::{OverlayError, Result};
use crate::geom::{orientation_index, CoordKey};
use geo::Coord;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge {
    pub orig: Coord<f64>,
    /// Second vertex along the half-edge, fixing its angle at the origin.
    pub dir_pt: Coord<f64>,
    pub forward: bool,
    next: usize,
    pub in_result_area: bool,
    pub in_result_line: bool,
    pub visited: bool,
    pub next_result: Option<usize>,
    pub next_result_max: Option<usize>,
    pub max_ring: Option<usize>,
    pub min_ring: Option<usize>,
}

impl HalfEdge {
    fn new(orig: Coord<f64>, dir_pt: Coord<f64>, forward: bool, next: usize) -> Self {
        Self {
            orig,
            dir_pt,
            forward,
            next,
            in_result_area: false,
            in_result_line: false,
            visited: false,
            next_result: None,
            next_result_max: None,
            max_ring: None,
            min_ring: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct OverlayGraph {
    half_edges: Vec<HalfEdge>,
    pts: Vec<Vec<Coord<f64>>>,
    labels: Vec<OverlayLabel>,
    node_map: HashMap<CoordKey, usize>,
    nodes: Vec<usize>,
}

#[inline]
pub(crate) fn sym(e: usize) -> usize {
    e ^ 1
}

/// Quadrant of a direction vector: NE 0, NW 1, SW 2, SE 3.
fn quadrant(dx: f64, dy: f64) -> u8 {
    match (dx >= 0.0, dy >= 0.0) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    }
}

impl OverlayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge and insert both half-edges at their origins. Returns the
    /// forward half-edge, or a topology error when a node rotation has no
    /// place for it.
    pub fn add_edge(&mut self, pts: Vec<Coord<f64>>, label: OverlayLabel) -> Result<usize> {
        debug_assert!(pts.len() >= 2);
        let n = pts.len();
        let e = self.half_edges.len();
        let s = e + 1;
        self.half_edges.push(HalfEdge::new(pts[0], pts[1], true, s));
        self.half_edges.push(HalfEdge::new(pts[n - 1], pts[n - 2], false, e));
        self.pts.push(pts);
        self.labels.push(label);
        self.insert(e)?;
        self.insert(s)?;
        Ok(e)
    }

    fn insert(&mut self, e: usize) -> Result<()> {
        let key = CoordKey::from(self.half_edges[e].orig);
        match self.node_map.get(&key) {
            Some(&node) => self.insert_at_node(node, e)?,
            None => {
                self.node_map.insert(key, e);
                self.nodes.push(e);
            }
        }
        Ok(())
    }

    fn insert_at_node(&mut self, node: usize, e: usize) -> Result<()> {
        let prev = if self.onext(node) == node {
            node
        } else {
            self.insertion_edge(node, e, |a, b| self.compare_angle(a, b))?
        };
        let save = self.onext(prev);
        self.half_edges[sym(prev)].next = e;
        self.half_edges[sym(e)].next = save;
        Ok(())
    }

    /// Half-edge after which `e` belongs in the CCW order around `node`.
    /// Fails only when `cmp` is not a consistent order of the rotation.
    fn insertion_edge(&self, node: usize, e: usize, cmp: impl Fn(usize, usize) -> Ordering) -> Result<usize> {
        let mut prev = node;
        loop {
            let next = self.onext(prev);
            let rising = cmp(next, prev) == Ordering::Greater;
            if rising && cmp(e, prev) != Ordering::Less && cmp(e, next) != Ordering::Greater {
                return Ok(prev);
            }
            // gap across the start of the angular order
            if !rising && (cmp(e, next) != Ordering::Greater || cmp(e, prev) != Ordering::Less) {
                return Ok(prev);
            }
            prev = next;
            if prev == node {
                break;
            }
        }
        Err(OverlayError::topology(
            "no insertion point found in node rotation",
            self.orig(node),
        ))
    }

    /// Angular order of two half-edges sharing an origin, CCW from the
    /// positive x-axis.
    pub fn compare_angle(&self, a: usize, b: usize) -> Ordering {
        let ea = &self.half_edges[a];
        let eb = &self.half_edges[b];
        let (dx, dy) = (ea.dir_pt.x - ea.orig.x, ea.dir_pt.y - ea.orig.y);
        let (dx2, dy2) = (eb.dir_pt.x - eb.orig.x, eb.dir_pt.y - eb.orig.y);
        if dx == dx2 && dy == dy2 {
            return Ordering::Equal;
        }
        let (q, q2) = (quadrant(dx, dy), quadrant(dx2, dy2));
        if q != q2 {
            return q.cmp(&q2);
        }
        match orientation_index(eb.orig, eb.dir_pt, ea.dir_pt) {
            1 => Ordering::Greater,
            -1 => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    /// Next half-edge CCW around the origin of `e`.
    #[inline]
    pub fn onext(&self, e: usize) -> usize {
        self.half_edges[sym(e)].next
    }

    pub fn degree(&self, e: usize) -> usize {
        self.around(e).count()
    }

    /// Half-edges leaving the origin of `e`, CCW starting with `e`.
    pub fn around(&self, e: usize) -> impl Iterator<Item = usize> + '_ {
        let mut curr = Some(e);
        std::iter::from_fn(move || {
            let out = curr?;
            let nxt = self.onext(out);
            curr = if nxt == e { None } else { Some(nxt) };
            Some(out)
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub fn edge(&self, e: usize) -> &HalfEdge {
        &self.half_edges[e]
    }

    #[inline]
    pub fn edge_mut(&mut self, e: usize) -> &mut HalfEdge {
        &mut self.half_edges[e]
    }

    /// One half-edge per node, in insertion order.
    #[inline]
    pub fn node_edges(&self) -> &[usize] {
        &self.nodes
    }

    #[inline]
    pub fn orig(&self, e: usize) -> Coord<f64> {
        self.half_edges[e].orig
    }

    #[inline]
    pub fn dest(&self, e: usize) -> Coord<f64> {
        self.half_edges[sym(e)].orig
    }

    pub fn label(&self, e: usize) -> OverlayLabel {
        let lbl = self.labels[e / 2];
        if self.half_edges[e].forward {
            lbl
        } else {
            lbl.flipped()
        }
    }

    /// Store `lbl`, given as seen from `e`.
    pub fn set_label(&mut self, e: usize, lbl: OverlayLabel) {
        self.labels[e / 2] = if self.half_edges[e].forward { lbl } else { lbl.flipped() };
    }

    /// Append the coordinates of `e` in its direction, skipping a repeated
    /// junction point.
    pub fn add_coordinates(&self, e: usize, out: &mut Vec<Coord<f64>>) {
        let pts = &self.pts[e / 2];
        let mut push = |p: Coord<f64>| {
            if out.last() != Some(&p) {
                out.push(p);
            }
        };
        if self.half_edges[e].forward {
            pts.iter().for_each(|&p| push(p));
        } else {
            pts.iter().rev().for_each(|&p| push(p));
        }
    }

    pub fn mark_in_result_area(&mut self, e: usize) {
        self.half_edges[e].in_result_area = true;
    }

    pub fn is_in_result_area_both(&self, e: usize) -> bool {
        self.half_edges[e].in_result_area && self.half_edges[sym(e)].in_result_area
    }

    pub fn unmark_from_result_area_both(&mut self, e: usize) {
        self.half_edges[e].in_result_area = false;
        self.half_edges[sym(e)].in_result_area = false;
    }

    /// Lines have no sides, so both halves are marked.
    pub fn mark_in_result_line(&mut self, e: usize) {
        self.half_edges[e].in_result_line = true;
        self.half_edges[sym(e)].in_result_line = true;
    }

    #[inline]
    pub fn is_in_result(&self, e: usize) -> bool {
        let he = &self.half_edges[e];
        he.in_result_area || he.in_result_line
    }

    #[inline]
    pub fn is_in_result_either(&self, e: usize) -> bool {
        self.is_in_result(e) || self.is_in_result(sym(e))
    }

    pub fn mark_visited_both(&mut self, e: usize) {
        self.half_edges[e].visited = true;
        self.half_edges[sym(e)].visited = true;
    }

    pub fn result_area_edges(&self) -> Vec<usize> {
        (0..self.half_edges.len())
            .filter(|&e| self.half_edges[e].in_result_area)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        coord! { x: x, y: y }
    }

    fn star() -> OverlayGraph {
        let mut g = OverlayGraph::new();
        let o = c(0.0, 0.0);
        // inserted out of angular order
        for p in [c(1.0, -1.0), c(-1.0, 1.0), c(1.0, 0.0), c(0.0, -1.0), c(1.0, 1.0), c(-1.0, -0.5)] {
            g.add_edge(vec![o, p], OverlayLabel::default()).unwrap();
        }
        g
    }

    #[test]
    fn rotation_is_ccw() {
        let g = star();
        let start = g.node_edges()[0];
        assert_eq!(g.degree(start), 6);
        let from_east: Vec<_> = {
            let east = g.around(start).find(|&e| g.edge(e).dir_pt == c(1.0, 0.0)).unwrap();
            g.around(east).map(|e| g.edge(e).dir_pt).collect()
        };
        assert_eq!(
            from_east,
            vec![c(1.0, 0.0), c(1.0, 1.0), c(-1.0, 1.0), c(-1.0, -0.5), c(0.0, -1.0), c(1.0, -1.0)]
        );
    }

    #[test]
    fn twins_and_nodes() {
        let g = star();
        assert_eq!(g.len(), 12);
        // centre plus six leaves
        assert_eq!(g.node_edges().len(), 7);
        for e in 0..g.len() {
            assert_eq!(g.dest(e), g.orig(sym(e)));
        }
        let leaf = g.node_edges()[1];
        assert_eq!(g.degree(leaf), 1);
        assert_eq!(g.onext(leaf), leaf);
    }

    #[test]
    fn closed_edge_forms_two_edge_node() {
        let mut g = OverlayGraph::new();
        let ring = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)];
        let e = g.add_edge(ring, OverlayLabel::default()).unwrap();
        assert_eq!(g.node_edges().len(), 1);
        assert_eq!(g.degree(e), 2);
        assert_eq!(g.onext(e), sym(e));
    }

    #[test]
    fn reverse_half_edge_sees_flipped_label() {
        use crate::geom::Location::{Exterior, Interior};
        use crate::overlay::label::Side;
        let mut g = OverlayGraph::new();
        let lbl = OverlayLabel::default().with_boundary(0, Exterior, Interior, false);
        let e = g.add_edge(vec![c(0.0, 0.0), c(1.0, 0.0)], lbl).unwrap();
        assert_eq!(g.label(sym(e)).side_location(0, Side::Right), Some(Exterior));
        g.set_label(sym(e), g.label(sym(e)).with_line_location(1, Interior));
        assert_eq!(g.label(e).line_location(1), Some(Interior));
        assert_eq!(g.label(e).side_location(0, Side::Right), Some(Interior));
        let mut pts = Vec::new();
        g.add_coordinates(sym(e), &mut pts);
        assert_eq!(pts, vec![c(1.0, 0.0), c(0.0, 0.0)]);
    }

    #[test]
    fn inconsistent_angle_order_is_a_topology_error() {
        let mut g = OverlayGraph::new();
        let o = c(0.0, 0.0);
        let a = g.add_edge(vec![o, c(1.0, 0.0)], OverlayLabel::default()).unwrap();
        g.add_edge(vec![o, c(0.0, 1.0)], OverlayLabel::default()).unwrap();
        let extra = g.add_edge(vec![c(5.0, 5.0), c(6.0, 5.0)], OverlayLabel::default()).unwrap();
        // both steps of the rotation look rising and the new edge sorts below both
        let cmp = |x: usize, _: usize| if x == extra { Ordering::Less } else { Ordering::Greater };
        let err = g.insertion_edge(a, extra, cmp).unwrap_err();
        match err {
            OverlayError::Topology { location, .. } => assert_eq!(location, Some(o)),
            other => panic!("expected topology error, got {other:?}"),
        }
        assert!(g.insertion_edge(a, extra, |x, y| g.compare_angle(x, y)).is_ok());
    }
}
