//! Polygon assembly from result-area half-edges.
//!
//! Result-area edges are first linked into maximal rings, which follow the
//! result boundary but may touch themselves at nodes. Each maximal ring is
//! split into minimal rings by relinking at its self-touch nodes. Minimal
//! rings are shells (CW) or holes (CCW); a maximal ring holds at most one
//! shell, and holes without one are placed in the smallest shell containing
//! them.

use super::graph::{sym, OverlayGraph};
use crate::error::{OverlayError, Result};
use crate::geom::locate::locate_in_ring;
use crate::geom::{is_ccw, Envelope, Location};
use geo::{Coord, LineString, Polygon};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkState {
    FindIncoming,
    LinkOutgoing,
}

/// A minimal ring of result edges.
#[derive(Clone, Debug)]
struct EdgeRing {
    pts: Vec<Coord<f64>>,
    env: Envelope,
    is_hole: bool,
    shell: Option<usize>,
    holes: Vec<usize>,
}

impl EdgeRing {
    /// A point of this ring that is not a vertex of `other`, or the
    /// midpoint of the first segment when every vertex is shared.
    fn point_not_in(&self, other: &EdgeRing) -> Coord<f64> {
        self.pts
            .iter()
            .copied()
            .find(|p| !other.pts.contains(p))
            .unwrap_or_else(|| {
                let (a, b) = (self.pts[0], self.pts[1]);
                Coord {
                    x: (a.x + b.x) / 2.0,
                    y: (a.y + b.y) / 2.0,
                }
            })
    }

    #[inline]
    fn contains_point(&self, p: Coord<f64>) -> bool {
        locate_in_ring(p, &self.pts) != Location::Exterior
    }
}

pub(crate) struct PolygonBuilder<'g> {
    graph: &'g mut OverlayGraph,
    rings: Vec<EdgeRing>,
    shells: Vec<usize>,
    free_holes: Vec<usize>,
}

impl<'g> PolygonBuilder<'g> {
    pub fn new(graph: &'g mut OverlayGraph) -> Self {
        Self {
            graph,
            rings: Vec::new(),
            shells: Vec::new(),
            free_holes: Vec::new(),
        }
    }

    pub fn polygons(mut self) -> Result<Vec<Polygon<f64>>> {
        let result_edges = self.graph.result_area_edges();
        for &e in &result_edges {
            self.link_max_ring_at_node(e)?;
        }
        let mut max_starts: Vec<usize> = Vec::new();
        for &e in &result_edges {
            if self.graph.label(e).is_boundary_either() && self.graph.edge(e).max_ring.is_none() {
                self.attach_max_ring(e, max_starts.len())?;
                max_starts.push(e);
            }
        }
        for (id, &start) in max_starts.iter().enumerate() {
            let min_rings = self.build_minimal_rings(start, id)?;
            self.assign_shells_and_holes(min_rings)?;
        }
        self.place_free_holes()?;
        Ok(self.shells.iter().map(|&s| self.to_polygon(s)).collect())
    }

    /// Link each incoming result edge at the node of `node_edge` to the next
    /// outgoing result edge CCW from it.
    fn link_max_ring_at_node(&mut self, node_edge: usize) -> Result<()> {
        debug_assert!(self.graph.edge(node_edge).in_result_area);
        // Start after the node edge so that it is linked last.
        let end_out = self.graph.onext(node_edge);
        let mut curr_out = end_out;
        let mut state = LinkState::FindIncoming;
        let mut curr_in: Option<usize> = None;
        loop {
            if let Some(i) = curr_in {
                if self.graph.edge(i).next_result_max.is_some() {
                    return Ok(());
                }
            }
            match state {
                LinkState::FindIncoming => {
                    let candidate = sym(curr_out);
                    if self.graph.edge(candidate).in_result_area {
                        curr_in = Some(candidate);
                        state = LinkState::LinkOutgoing;
                    }
                }
                LinkState::LinkOutgoing => {
                    if self.graph.edge(curr_out).in_result_area {
                        if let Some(i) = curr_in {
                            self.graph.edge_mut(i).next_result_max = Some(curr_out);
                        }
                        state = LinkState::FindIncoming;
                    }
                }
            }
            curr_out = self.graph.onext(curr_out);
            if curr_out == end_out {
                break;
            }
        }
        if state == LinkState::LinkOutgoing {
            return Err(OverlayError::topology("no outgoing edge found", self.graph.orig(node_edge)));
        }
        Ok(())
    }

    fn attach_max_ring(&mut self, start: usize, id: usize) -> Result<()> {
        let mut e = start;
        loop {
            if self.graph.edge(e).max_ring == Some(id) {
                return Err(OverlayError::topology(
                    "ring edge visited twice in maximal ring",
                    self.graph.orig(e),
                ));
            }
            let Some(next) = self.graph.edge(e).next_result_max else {
                return Err(OverlayError::topology("ring edge missing", self.graph.dest(e)));
            };
            self.graph.edge_mut(e).max_ring = Some(id);
            e = next;
            if e == start {
                return Ok(());
            }
        }
    }

    fn max_ring_edges(&self, start: usize) -> Vec<usize> {
        let mut out = vec![start];
        let mut e = start;
        while let Some(next) = self.graph.edge(e).next_result_max {
            if next == start {
                break;
            }
            out.push(next);
            e = next;
        }
        out
    }

    fn build_minimal_rings(&mut self, start: usize, max_id: usize) -> Result<Vec<usize>> {
        let edges = self.max_ring_edges(start);
        for &e in &edges {
            self.link_min_ring_edges_at_node(e, max_id)?;
        }
        let mut ids = Vec::new();
        for &e in &edges {
            if self.graph.edge(e).min_ring.is_none() {
                let id = self.rings.len();
                let ring = self.compute_ring(e, id)?;
                self.rings.push(ring);
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Relink the maximal ring at one node so that each incoming edge is
    /// followed by the nearest outgoing edge CW, which splits self-touching
    /// rings into minimal ones.
    fn link_min_ring_edges_at_node(&mut self, node_edge: usize, max_id: usize) -> Result<()> {
        let end_out = node_edge;
        let mut curr_max_out = Some(end_out);
        let mut curr_out = self.graph.onext(end_out);
        loop {
            let incoming = sym(curr_out);
            let he = self.graph.edge(incoming);
            if he.max_ring == Some(max_id) && he.next_result.is_some() {
                return Ok(());
            }
            curr_max_out = match curr_max_out {
                None => (self.graph.edge(curr_out).max_ring == Some(max_id)).then_some(curr_out),
                Some(out) => {
                    if self.graph.edge(incoming).max_ring == Some(max_id) {
                        self.graph.edge_mut(incoming).next_result = Some(out);
                        None
                    } else {
                        Some(out)
                    }
                }
            };
            curr_out = self.graph.onext(curr_out);
            if curr_out == end_out {
                break;
            }
        }
        if curr_max_out.is_some() {
            return Err(OverlayError::topology(
                "unmatched edge found during min-ring linking",
                self.graph.orig(node_edge),
            ));
        }
        Ok(())
    }

    fn compute_ring(&mut self, start: usize, id: usize) -> Result<EdgeRing> {
        let mut pts: Vec<Coord<f64>> = Vec::new();
        let mut e = start;
        loop {
            if self.graph.edge(e).min_ring == Some(id) {
                return Err(OverlayError::topology(
                    "edge visited twice during ring-building",
                    self.graph.orig(e),
                ));
            }
            self.graph.add_coordinates(e, &mut pts);
            self.graph.edge_mut(e).min_ring = Some(id);
            let Some(next) = self.graph.edge(e).next_result else {
                return Err(OverlayError::topology("found null edge in ring", self.graph.dest(e)));
            };
            e = next;
            if e == start {
                break;
            }
        }
        if let (Some(&first), Some(&last)) = (pts.first(), pts.last()) {
            if first != last {
                pts.push(first);
            }
        }
        let env = Envelope::of_coords(&pts)
            .ok_or_else(|| OverlayError::topology("empty result ring", self.graph.orig(start)))?;
        Ok(EdgeRing {
            is_hole: is_ccw(&pts),
            pts,
            env,
            shell: None,
            holes: Vec::new(),
        })
    }

    fn assign_shells_and_holes(&mut self, min_rings: Vec<usize>) -> Result<()> {
        let shells: Vec<usize> = min_rings.iter().copied().filter(|&r| !self.rings[r].is_hole).collect();
        match shells.as_slice() {
            [] => self.free_holes.extend(min_rings),
            [shell] => {
                let shell = *shell;
                for r in min_rings {
                    if self.rings[r].is_hole {
                        self.set_shell(r, shell);
                    }
                }
                self.shells.push(shell);
            }
            [_, second, ..] => {
                return Err(OverlayError::topology(
                    "found two shells in maximal ring",
                    self.rings[*second].pts[0],
                ))
            }
        }
        Ok(())
    }

    fn set_shell(&mut self, hole: usize, shell: usize) {
        self.rings[hole].shell = Some(shell);
        self.rings[shell].holes.push(hole);
    }

    fn place_free_holes(&mut self) -> Result<()> {
        let free = std::mem::take(&mut self.free_holes);
        for hole in free {
            if self.rings[hole].shell.is_some() {
                continue;
            }
            match self.find_containing_shell(hole) {
                Some(shell) => self.set_shell(hole, shell),
                None => {
                    return Err(OverlayError::topology(
                        "unable to assign free hole to a shell",
                        self.rings[hole].pts[0],
                    ))
                }
            }
        }
        Ok(())
    }

    /// Smallest shell properly containing the hole.
    fn find_containing_shell(&self, hole: usize) -> Option<usize> {
        let test = &self.rings[hole];
        let mut best: Option<usize> = None;
        for &s in &self.shells {
            let shell = &self.rings[s];
            // equal envelopes also rule out testing a ring against itself
            if shell.env == test.env || !shell.env.covers(&test.env) {
                continue;
            }
            if !shell.contains_point(test.point_not_in(shell)) {
                continue;
            }
            let smaller = match best {
                None => true,
                Some(b) => self.rings[b].env.covers(&shell.env),
            };
            if smaller {
                best = Some(s);
            }
        }
        best
    }

    fn to_polygon(&self, shell: usize) -> Polygon<f64> {
        let ring = &self.rings[shell];
        let holes = ring
            .holes
            .iter()
            .map(|&h| LineString::new(self.rings[h].pts.clone()))
            .collect();
        Polygon::new(LineString::new(ring.pts.clone()), holes)
    }
}
