//! Noded edges and their merging.

use super::label::OverlayLabel;
use crate::error::{OverlayError, Result};
use crate::geom::{cmp_coords, is_ccw, CoordKey, Location};
use geo::Coord;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Where an extracted chain came from. Attached to segment strings through
/// their tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EdgeSource {
    pub index: usize,
    pub is_area: bool,
    pub depth_delta: i32,
    pub is_hole: bool,
}

impl EdgeSource {
    pub fn area(index: usize, depth_delta: i32, is_hole: bool) -> Self {
        Self {
            index,
            is_area: true,
            depth_delta,
            is_hole,
        }
    }

    pub fn line(index: usize) -> Self {
        Self {
            index,
            is_area: false,
            depth_delta: 0,
            is_hole: false,
        }
    }
}

/// Depth change crossing a ring from left to right: `+1` when the polygon
/// interior lies on the right of the ring's direction.
pub(crate) fn depth_delta(ring: &[Coord<f64>], is_hole: bool) -> i32 {
    let ccw = is_ccw(ring);
    let is_oriented = if is_hole { ccw } else { !ccw };
    if is_oriented {
        1
    } else {
        -1
    }
}

fn boundary_from_delta(label: OverlayLabel, index: usize, delta: i32, is_hole: bool) -> OverlayLabel {
    match delta.signum() {
        0 => label.with_collapse(index, is_hole),
        1 => label.with_boundary(index, Location::Exterior, Location::Interior, is_hole),
        _ => label.with_boundary(index, Location::Interior, Location::Exterior, is_hole),
    }
}

/// A noded chain with the merged annotation of every coincident input chain.
#[derive(Clone, Debug)]
pub(crate) struct Edge {
    pub pts: Vec<Coord<f64>>,
    label: OverlayLabel,
    depth_delta: [i32; 2],
}

impl Edge {
    pub fn new(pts: Vec<Coord<f64>>, src: &EdgeSource) -> Self {
        let mut depth = [0; 2];
        let label = if src.is_area {
            depth[src.index] = src.depth_delta;
            boundary_from_delta(OverlayLabel::default(), src.index, src.depth_delta, src.is_hole)
        } else {
            OverlayLabel::default().with_line(src.index)
        };
        Self {
            pts,
            label,
            depth_delta: depth,
        }
    }

    /// Chains that cannot form an edge: fewer than two points, or a
    /// zero-length first or last segment.
    pub fn is_collapsed(pts: &[Coord<f64>]) -> bool {
        let n = pts.len();
        n < 2 || pts[0] == pts[1] || (n > 2 && pts[n - 1] == pts[n - 2])
    }

    /// True when the chain already runs in canonical direction.
    pub fn direction(&self) -> Result<bool> {
        let pts = &self.pts;
        let n = pts.len();
        let ord = cmp_coords(pts[0], pts[n - 1]).then(cmp_coords(pts[1], pts[n - 2]));
        match ord {
            Ordering::Less => Ok(true),
            Ordering::Greater => Ok(false),
            Ordering::Equal => Err(OverlayError::topology(
                "edge direction cannot be determined because endpoints are equal",
                pts[0],
            )),
        }
    }

    /// Whether `other` (a coincident edge) runs the same way as this one.
    pub fn relative_direction(&self, other: &Edge) -> bool {
        self.pts[0] == other.pts[0] && self.pts[1] == other.pts[1]
    }

    pub fn merge(&mut self, other: &Edge) {
        let same = self.relative_direction(other);
        let oriented = if same { other.label } else { other.label.flipped() };
        self.label = self.label.merged(&oriented);
        let flip = if same { 1 } else { -1 };
        for i in 0..2 {
            self.depth_delta[i] += flip * other.depth_delta[i];
        }
    }

    #[inline]
    pub fn depth_delta(&self, index: usize) -> i32 {
        self.depth_delta[index]
    }

    /// Final label: area roles are re-derived from the accumulated depth
    /// delta, so opposite ring edges that cancelled become collapses.
    pub fn create_label(&self) -> OverlayLabel {
        let mut lbl = self.label;
        for i in 0..2 {
            if lbl.is_area(i) {
                lbl = boundary_from_delta(lbl, i, self.depth_delta[i], lbl.is_hole(i));
            }
        }
        lbl
    }
}

/// Key identifying an edge up to direction: its first two points in
/// canonical direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct EdgeKey([CoordKey; 2]);

impl EdgeKey {
    fn of(edge: &Edge) -> Result<Self> {
        let pts = &edge.pts;
        let n = pts.len();
        let (p0, p1) = if edge.direction()? {
            (pts[0], pts[1])
        } else {
            (pts[n - 1], pts[n - 2])
        };
        Ok(EdgeKey([CoordKey::from(p0), CoordKey::from(p1)]))
    }
}

/// Merge coincident edges, keeping first-seen order.
pub(crate) fn merge_edges(edges: Vec<Edge>) -> Result<Vec<Edge>> {
    let mut merged: Vec<Edge> = Vec::with_capacity(edges.len());
    let mut by_key: HashMap<EdgeKey, usize> = HashMap::with_capacity(edges.len());
    for edge in edges {
        let key = EdgeKey::of(&edge)?;
        match by_key.get(&key) {
            Some(&i) => {
                if merged[i].pts.len() != edge.pts.len() {
                    return Err(OverlayError::topology(
                        "merge of edges of different sizes, probable noding error",
                        edge.pts[0],
                    ));
                }
                merged[i].merge(&edge);
            }
            None => {
                by_key.insert(key, merged.len());
                merged.push(edge);
            }
        }
    }
    Ok(merged)
}
