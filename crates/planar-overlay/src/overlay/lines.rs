//! Result line extraction.
//!
//! Line edges are selected by label, then merged into maximal chains: a
//! chain starts and ends at nodes where the number of result line edges is
//! not two. Chains with no such node are closed rings and are emitted last.

use super::graph::{sym, OverlayGraph};
use super::input::InputGeometry;
use super::label::OverlayLabel;
use super::types::OverlayOp;
use crate::geom::Location;
use geo::{Coord, LineString};

pub(crate) struct LineBuilder<'g> {
    graph: &'g mut OverlayGraph,
    op: OverlayOp,
    has_result_area: bool,
    area_index: Option<usize>,
    allow_collapse_lines: bool,
    allow_mixed_result: bool,
}

impl<'g> LineBuilder<'g> {
    pub fn new(
        graph: &'g mut OverlayGraph,
        input: &InputGeometry<'_>,
        has_result_area: bool,
        op: OverlayOp,
        strict: bool,
    ) -> Self {
        Self {
            graph,
            op,
            has_result_area,
            area_index: input.area_index(),
            allow_collapse_lines: !strict,
            allow_mixed_result: !strict,
        }
    }

    pub fn lines(mut self) -> Vec<LineString<f64>> {
        self.mark_result_lines();
        let mut lines = Vec::new();
        // chains starting at nodes
        for e in 0..self.graph.len() {
            if self.is_unvisited_line(e) && self.degree_of_lines(e) != 2 {
                lines.push(self.build_line(e));
            }
        }
        // closed rings
        for e in 0..self.graph.len() {
            if self.is_unvisited_line(e) {
                lines.push(self.build_line(e));
            }
        }
        lines
    }

    fn mark_result_lines(&mut self) {
        for e in 0..self.graph.len() {
            // linework already in the result area is not repeated as a line
            if self.graph.is_in_result_either(e) {
                continue;
            }
            if self.is_result_line(&self.graph.label(e)) {
                self.graph.mark_in_result_line(e);
            }
        }
    }

    fn is_result_line(&self, lbl: &OverlayLabel) -> bool {
        if lbl.is_boundary_singleton() {
            return false;
        }
        if !self.allow_collapse_lines && lbl.is_boundary_collapse() {
            return false;
        }
        if lbl.is_interior_collapse() {
            return false;
        }
        if self.op != OverlayOp::Intersection {
            if lbl.is_collapse_and_not_part_interior() {
                return false;
            }
            if self.has_result_area && self.area_index.is_some_and(|i| lbl.is_line_in_area(i)) {
                return false;
            }
        }
        if self.allow_mixed_result && self.op == OverlayOp::Intersection && lbl.is_boundary_touch() {
            return true;
        }
        self.op
            .is_result_of(effective_location(lbl, 0), effective_location(lbl, 1))
    }

    #[inline]
    fn is_unvisited_line(&self, e: usize) -> bool {
        let he = self.graph.edge(e);
        he.in_result_line && !he.visited
    }

    fn degree_of_lines(&self, node: usize) -> usize {
        self.graph
            .around(node)
            .filter(|&e| self.graph.edge(e).in_result_line)
            .count()
    }

    fn next_line_edge_unvisited(&self, node: usize) -> Option<usize> {
        self.graph
            .around(node)
            .skip(1)
            .find(|&e| self.is_unvisited_line(e))
    }

    fn build_line(&mut self, start: usize) -> LineString<f64> {
        let forward = self.graph.edge(start).forward;
        let mut pts: Vec<Coord<f64>> = vec![self.graph.orig(start)];
        let mut e = start;
        loop {
            self.graph.mark_visited_both(e);
            self.graph.add_coordinates(e, &mut pts);
            let at_dest = sym(e);
            if self.degree_of_lines(at_dest) != 2 {
                break;
            }
            match self.next_line_edge_unvisited(at_dest) {
                Some(next) => e = next,
                // back at the start of a ring
                None => break,
            }
        }
        // keep the direction of the input linework
        if !forward {
            pts.reverse();
        }
        LineString::new(pts)
    }
}

/// Line and collapse edges count as interior to their own input.
fn effective_location(lbl: &OverlayLabel, index: usize) -> Location {
    if lbl.is_collapse(index) || lbl.is_line(index) {
        return Location::Interior;
    }
    lbl.line_location(index).unwrap_or(Location::Exterior)
}
