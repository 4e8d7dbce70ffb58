//! Edge extraction and noding.
//!
//! Walks both inputs, turns rings and lines into tagged segment strings,
//! nodes them, and merges the coincident results into annotated edges.

use super::clip::{LineLimiter, RingClipper};
use super::edge::{depth_delta, merge_edges, Edge, EdgeSource};
use crate::error::{OverlayError, Result};
use crate::geom::{dimension, remove_repeated, Dim, Envelope};
use crate::noding::{noder_for, Noder, SegmentString};
use crate::precision::PrecisionModel;
use geo::{Coord, Geometry, GeometryCollection, HasDimensions, LineString, Polygon};

/// Lines with more points than this are limited to the clip envelope
/// instead of being noded whole.
pub(crate) const MIN_LIMIT_PTS: usize = 20;

pub(crate) struct EdgeNodingBuilder {
    pm: PrecisionModel,
    noder: Option<Box<dyn Noder>>,
    clip_env: Option<Envelope>,
    sources: Vec<EdgeSource>,
    strings: Vec<SegmentString>,
    has_edges: [bool; 2],
}

impl EdgeNodingBuilder {
    pub fn new(pm: PrecisionModel, noder: Option<Box<dyn Noder>>) -> Self {
        Self {
            pm,
            noder,
            clip_env: None,
            sources: Vec::new(),
            strings: Vec::new(),
            has_edges: [false; 2],
        }
    }

    pub fn set_clip_envelope(&mut self, env: Envelope) {
        self.clip_env = Some(env);
    }

    /// Whether noding left at least one non-collapsed edge of input `index`.
    #[inline]
    pub fn has_edges_for(&self, index: usize) -> bool {
        self.has_edges[index]
    }

    pub fn build(&mut self, a: &Geometry<f64>, b: Option<&Geometry<f64>>) -> Result<Vec<Edge>> {
        self.add(a, 0)?;
        if let Some(b) = b {
            self.add(b, 1)?;
        }
        let mut noder = self.noder.take().unwrap_or_else(|| noder_for(self.pm));
        let input = std::mem::take(&mut self.strings);
        tracing::debug!(noder = noder.name(), strings = input.len(), "noding overlay input");
        let noded = noder.node(input)?;

        let mut edges = Vec::with_capacity(noded.len());
        for ss in noded {
            if Edge::is_collapsed(&ss.coords) {
                continue;
            }
            let src = self.sources[ss.tag];
            self.has_edges[src.index] = true;
            edges.push(Edge::new(ss.coords, &src));
        }
        let merged = merge_edges(edges)?;
        tracing::debug!(edges = merged.len(), "merged noded edges");
        Ok(merged)
    }

    fn add(&mut self, g: &Geometry<f64>, index: usize) -> Result<()> {
        if g.is_empty() {
            return Ok(());
        }
        match g {
            Geometry::Polygon(p) => self.add_polygon(p, index),
            Geometry::MultiPolygon(mp) => mp.iter().for_each(|p| self.add_polygon(p, index)),
            Geometry::Rect(r) => self.add_polygon(&r.to_polygon(), index),
            Geometry::Triangle(t) => self.add_polygon(&t.to_polygon(), index),
            Geometry::LineString(ls) => self.add_line(&ls.0, index),
            Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| self.add_line(&ls.0, index)),
            Geometry::Line(l) => self.add_line(&[l.start, l.end], index),
            Geometry::GeometryCollection(gc) => return self.add_collection(gc, index, dimension(g)),
            // points are handled by the point overlays
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        }
        Ok(())
    }

    fn add_collection(&mut self, gc: &GeometryCollection<f64>, index: usize, expected: Dim) -> Result<()> {
        for child in gc.iter() {
            if dimension(child) != expected {
                return Err(OverlayError::InvalidInput("overlay input is mixed-dimension".into()));
            }
            self.add(child, index)?;
        }
        Ok(())
    }

    fn is_clipped_completely(&self, env: &Envelope) -> bool {
        self.clip_env.is_some_and(|clip| clip.disjoint(env))
    }

    fn add_polygon(&mut self, poly: &Polygon<f64>, index: usize) {
        self.add_polygon_ring(poly.exterior(), false, index);
        // Holes have the polygon interior on the opposite side.
        for hole in poly.interiors() {
            self.add_polygon_ring(hole, true, index);
        }
    }

    fn add_polygon_ring(&mut self, ring: &LineString<f64>, is_hole: bool, index: usize) {
        let Some(env) = Envelope::of_coords(&ring.0) else {
            return;
        };
        if self.is_clipped_completely(&env) {
            return;
        }
        let pts = self.clip_ring(&ring.0, &env);
        if pts.len() < 2 {
            return;
        }
        let delta = depth_delta(&ring.0, is_hole);
        self.add_edge(pts, EdgeSource::area(index, delta, is_hole));
    }

    fn clip_ring(&self, pts: &[Coord<f64>], env: &Envelope) -> Vec<Coord<f64>> {
        match self.clip_env {
            Some(clip) if !clip.covers(env) => RingClipper::new(clip).clip(pts),
            _ => remove_repeated(pts),
        }
    }

    fn add_line(&mut self, pts: &[Coord<f64>], index: usize) {
        let Some(env) = Envelope::of_coords(pts) else {
            return;
        };
        if self.is_clipped_completely(&env) {
            return;
        }
        match self.clip_env {
            Some(clip) if pts.len() > MIN_LIMIT_PTS && !clip.covers(&env) => {
                for section in LineLimiter::new(clip).limit(pts) {
                    self.add_line_section(section, index);
                }
            }
            _ => self.add_line_section(remove_repeated(pts), index),
        }
    }

    fn add_line_section(&mut self, pts: Vec<Coord<f64>>, index: usize) {
        if pts.len() < 2 {
            return;
        }
        self.add_edge(pts, EdgeSource::line(index));
    }

    fn add_edge(&mut self, pts: Vec<Coord<f64>>, src: EdgeSource) {
        let tag = self.sources.len();
        self.sources.push(src);
        self.strings.push(SegmentString::new(pts, tag));
    }
}
