//! Location labelling of the overlay graph.
//!
//! After noding, every edge knows its role for the inputs it came from but
//! not where it lies relative to the other input. Locations are filled in
//! in stages:
//! 1. around each node, area side locations are propagated across
//!    non-boundary edges;
//! 2. known line locations spread along connected linear edges;
//! 3. collapsed ring edges take their location from the ring role;
//! 4. stage 2 runs again with the collapse locations;
//! 5. edges still unlabelled are disconnected from the input and are
//!    located by point-in-area tests on their endpoints.

use super::graph::{sym, OverlayGraph};
use super::input::InputGeometry;
use super::label::Side;
use super::types::OverlayOp;
use crate::error::{OverlayError, Result};
use crate::geom::Location;
use std::collections::VecDeque;

pub(crate) struct OverlayLabeller<'g, 'i, 'a> {
    graph: &'g mut OverlayGraph,
    input: &'i InputGeometry<'a>,
}

impl<'g, 'i, 'a> OverlayLabeller<'g, 'i, 'a> {
    pub fn new(graph: &'g mut OverlayGraph, input: &'i InputGeometry<'a>) -> Self {
        Self { graph, input }
    }

    pub fn compute_labelling(&mut self) -> Result<()> {
        self.label_area_node_edges()?;
        self.label_connected_linear_edges();
        self.label_collapsed_edges();
        self.label_connected_linear_edges();
        self.label_disconnected_edges();
        Ok(())
    }

    fn label_area_node_edges(&mut self) -> Result<()> {
        let nodes = self.graph.node_edges().to_vec();
        for node in nodes {
            self.propagate_area_locations(node, 0)?;
            if self.input.has_edges(1) {
                self.propagate_area_locations(node, 1)?;
            }
        }
        Ok(())
    }

    /// Walk CCW around the node of `node_edge` carrying the location of the
    /// current sector. Non-boundary edges take that location; boundary edges
    /// must agree with it on their right side and switch it to their left.
    fn propagate_area_locations(&mut self, node_edge: usize, index: usize) -> Result<()> {
        if !self.input.is_area(index) || self.graph.degree(node_edge) == 1 {
            return Ok(());
        }
        let Some(start) = self
            .graph
            .around(node_edge)
            .find(|&e| self.graph.label(e).is_boundary(index))
        else {
            return Ok(());
        };
        let mut curr_loc = self.graph.label(start).side_location(index, Side::Left);
        let mut e = self.graph.onext(start);
        while e != start {
            let lbl = self.graph.label(e);
            if !lbl.is_boundary(index) {
                if let Some(loc) = curr_loc {
                    self.graph.set_label(e, lbl.with_line_location(index, loc));
                }
            } else {
                if lbl.side_location(index, Side::Right) != curr_loc {
                    return Err(OverlayError::topology(
                        format!("side location conflict: arg {index}"),
                        self.graph.orig(e),
                    ));
                }
                curr_loc = lbl.side_location(index, Side::Left);
            }
            e = self.graph.onext(e);
        }
        Ok(())
    }

    fn label_connected_linear_edges(&mut self) {
        self.propagate_linear_locations(0);
        if self.input.has_edges(1) {
            self.propagate_linear_locations(1);
        }
    }

    /// Spread line locations through nodes along unlabelled edges. For a
    /// linear input only `Exterior` spreads: a line's interior does not
    /// extend past its nodes.
    fn propagate_linear_locations(&mut self, index: usize) {
        let mut stack: VecDeque<usize> = (0..self.graph.len())
            .filter(|&e| {
                let lbl = self.graph.label(e);
                lbl.is_linear(index) && !lbl.is_line_location_unknown(index)
            })
            .collect();
        let is_input_line = self.input.is_line(index);
        while let Some(line_edge) = stack.pop_front() {
            let Some(loc) = self.graph.label(line_edge).line_location(index) else {
                continue;
            };
            if is_input_line && loc != Location::Exterior {
                continue;
            }
            let mut e = self.graph.onext(line_edge);
            while e != line_edge {
                let lbl = self.graph.label(e);
                if lbl.is_line_location_unknown(index) {
                    self.graph.set_label(e, lbl.with_line_location(index, loc));
                    stack.push_front(sym(e));
                }
                e = self.graph.onext(e);
            }
        }
    }

    fn label_collapsed_edges(&mut self) {
        for e in 0..self.graph.len() {
            for index in 0..2 {
                let lbl = self.graph.label(e);
                if lbl.is_line_location_unknown(index) && lbl.is_collapse(index) {
                    self.graph.set_label(e, lbl.with_collapse_location(index));
                }
            }
        }
    }

    fn label_disconnected_edges(&mut self) {
        for e in 0..self.graph.len() {
            for index in 0..2 {
                let lbl = self.graph.label(e);
                if !lbl.is_line_location_unknown(index) {
                    continue;
                }
                let loc = if self.input.is_area(index) {
                    self.locate_edge_both_ends(index, e)
                } else {
                    Location::Exterior
                };
                self.graph.set_label(e, lbl.with_location_all(index, loc));
            }
        }
    }

    /// Interior only when neither endpoint is exterior; a disconnected edge
    /// cannot cross the input boundary.
    fn locate_edge_both_ends(&self, index: usize, e: usize) -> Location {
        let loc_orig = self.input.locate_point_in_area(index, self.graph.orig(e));
        let loc_dest = self.input.locate_point_in_area(index, self.graph.dest(e));
        if loc_orig != Location::Exterior && loc_dest != Location::Exterior {
            Location::Interior
        } else {
            Location::Exterior
        }
    }

    pub fn mark_result_area_edges(&mut self, op: OverlayOp) {
        for e in 0..self.graph.len() {
            let lbl = self.graph.label(e);
            if !lbl.is_boundary_either() {
                continue;
            }
            let loc0 = lbl.side_location(0, Side::Right).unwrap_or(Location::Exterior);
            let loc1 = lbl.side_location(1, Side::Right).unwrap_or(Location::Exterior);
            if op.is_result_of(loc0, loc1) {
                self.graph.mark_in_result_area(e);
            }
        }
    }

    /// An edge with result area on both sides is interior to the result.
    pub fn unmark_duplicate_edges_from_result_area(&mut self) {
        for e in 0..self.graph.len() {
            if self.graph.is_in_result_area_both(e) {
                self.graph.unmark_from_result_area_both(e);
            }
        }
    }
}
