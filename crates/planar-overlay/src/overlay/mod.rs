//! Overlay engine: boolean operations on two planar geometries.
//!
//! Pipeline
//! - Extraction: rings and lines of both inputs become tagged segment
//!   strings, clipped to the envelope the result can occupy.
//! - Noding: a `Noder` splits the strings at every intersection; coincident
//!   pieces are merged into edges carrying the labels of both inputs.
//! - Graph: merged edges become twin half-edges sorted CCW around nodes.
//! - Labelling: each edge learns its location relative to both inputs.
//! - Extraction of results: polygons, then lines, then isolated points.
//!
//! Point inputs skip the graph: two point inputs are overlaid as coordinate
//! sets, and a point input against a non-point input by point location.
//!
//! This is a single attempt. Floating-point noding can fail with a topology
//! error; `crate::robust` retries such failures with other noders.

mod clip;
mod edge;
mod extract;
mod graph;
mod input;
mod label;
mod labeller;
mod lines;
mod points;
mod polygon;
mod types;

#[cfg(test)]
mod tests;

pub use types::{OverlayOp, OverlayOptions};

use crate::error::Result;
use crate::geom::build::{assemble, empty_of};
use crate::geom::{check_finite, Dim};
use crate::noding::Noder;
use crate::precision::PrecisionModel;
use extract::EdgeNodingBuilder;
use geo::{Geometry, HasDimensions};
use graph::OverlayGraph;
use input::InputGeometry;
use labeller::OverlayLabeller;
use lines::LineBuilder;
use polygon::PolygonBuilder;

/// One overlay computation. Build with `new` or `unary`, adjust options and
/// noder, then call `result`.
pub struct OverlayNg<'a> {
    a: &'a Geometry<f64>,
    b: Option<&'a Geometry<f64>>,
    op: OverlayOp,
    pm: PrecisionModel,
    opts: OverlayOptions,
    noder: Option<Box<dyn Noder>>,
}

impl<'a> OverlayNg<'a> {
    pub fn new(a: &'a Geometry<f64>, b: &'a Geometry<f64>, op: OverlayOp, pm: PrecisionModel) -> Self {
        Self {
            a,
            b: Some(b),
            op,
            pm,
            opts: OverlayOptions::default(),
            noder: None,
        }
    }

    /// Union of a single geometry with itself: nodes, dissolves and rounds it.
    pub fn unary(g: &'a Geometry<f64>, pm: PrecisionModel) -> Self {
        Self {
            a: g,
            b: None,
            op: OverlayOp::Union,
            pm,
            opts: OverlayOptions::default(),
            noder: None,
        }
    }

    pub fn with_options(mut self, opts: OverlayOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Replace the noder chosen from the precision model.
    pub fn with_noder(mut self, noder: Box<dyn Noder>) -> Self {
        self.noder = Some(noder);
        self
    }

    pub fn result(self) -> Result<Geometry<f64>> {
        check_finite(self.a)?;
        if let Some(b) = self.b {
            check_finite(b)?;
        }
        let mut input = InputGeometry::new(self.a, self.b);
        if is_empty_result(self.op, self.a, self.b, self.pm) {
            return Ok(self.empty_result(&input));
        }
        if input.is_all_points() || (input.is_single() && input.dimension(0) == Dim::Point) {
            return Ok(points::overlay_points(self.op, self.a, self.b, self.pm));
        }
        if let (Some(b), false) = (self.b, input.is_single()) {
            if input.has_points() {
                return points::overlay_mixed_points(self.op, self.a, b, self.pm);
            }
        }
        self.edge_overlay(&mut input)
    }

    fn edge_overlay(mut self, input: &mut InputGeometry<'a>) -> Result<Geometry<f64>> {
        let mut builder = EdgeNodingBuilder::new(self.pm, self.noder.take());
        if self.opts.optimize_envelope {
            if let Some(env) = clip::clipping_envelope(self.op, input, self.pm) {
                builder.set_clip_envelope(env);
            }
        }
        let edges = builder.build(self.a, self.b)?;
        input.set_collapsed(0, !builder.has_edges_for(0));
        input.set_collapsed(1, !builder.has_edges_for(1));

        let mut graph = OverlayGraph::new();
        for edge in &edges {
            graph.add_edge(edge.pts.clone(), edge.create_label())?;
        }
        tracing::debug!(
            op = %self.op,
            half_edges = graph.len(),
            nodes = graph.node_edges().len(),
            "overlay graph built"
        );

        let mut labeller = OverlayLabeller::new(&mut graph, input);
        labeller.compute_labelling()?;
        labeller.mark_result_area_edges(self.op);
        labeller.unmark_duplicate_edges_from_result_area();

        let polys = PolygonBuilder::new(&mut graph).polygons()?;
        let has_area = !polys.is_empty();
        let mut lines = Vec::new();
        let mut pts = Vec::new();
        if !self.opts.area_result_only {
            let allow_mixed = !self.opts.strict_mode;
            let allow_lines =
                !has_area || allow_mixed || matches!(self.op, OverlayOp::SymDifference | OverlayOp::Union);
            if allow_lines {
                lines = LineBuilder::new(&mut graph, input, has_area, self.op, self.opts.strict_mode).lines();
            }
            let has_components = has_area || !lines.is_empty();
            if self.op == OverlayOp::Intersection && (!has_components || allow_mixed) {
                pts = points::intersection_points(&graph, self.opts.strict_mode);
            }
        }
        tracing::debug!(
            polygons = polys.len(),
            lines = lines.len(),
            points = pts.len(),
            "overlay result extracted"
        );
        Ok(assemble(pts, lines, polys).unwrap_or_else(|| self.empty_result(input)))
    }

    fn empty_result(&self, input: &InputGeometry<'_>) -> Geometry<f64> {
        empty_of(self.op.result_dimension(input.dimension(0), input.dimension(1)))
    }
}

/// Cases whose result is empty regardless of the input details.
fn is_empty_result(op: OverlayOp, a: &Geometry<f64>, b: Option<&Geometry<f64>>, pm: PrecisionModel) -> bool {
    let empty = |g: Option<&Geometry<f64>>| g.map_or(true, |g| g.is_empty());
    match op {
        OverlayOp::Intersection => is_env_disjoint(a, b, pm),
        OverlayOp::Difference => empty(Some(a)),
        OverlayOp::Union | OverlayOp::SymDifference => empty(Some(a)) && empty(b),
    }
}

fn is_env_disjoint(a: &Geometry<f64>, b: Option<&Geometry<f64>>, pm: PrecisionModel) -> bool {
    let (Some(ea), Some(eb)) = (crate::geom::envelope_of(a), b.and_then(crate::geom::envelope_of)) else {
        return true;
    };
    if pm.is_floating() {
        return ea.disjoint(&eb);
    }
    let r = |v: f64| pm.make_precise(v);
    r(eb.min_x) > r(ea.max_x) || r(eb.max_x) < r(ea.min_x) || r(eb.min_y) > r(ea.max_y) || r(eb.max_y) < r(ea.min_y)
}

/// Overlay `a` and `b` under `pm` in a single attempt.
pub fn overlay(a: &Geometry<f64>, b: &Geometry<f64>, op: OverlayOp, pm: PrecisionModel) -> Result<Geometry<f64>> {
    OverlayNg::new(a, b, op, pm).result()
}

/// Overlay in floating precision with a caller-supplied noder.
pub fn overlay_with_noder(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    op: OverlayOp,
    noder: Box<dyn Noder>,
) -> Result<Geometry<f64>> {
    OverlayNg::new(a, b, op, PrecisionModel::Floating).with_noder(noder).result()
}

/// Union of all components of `g`.
pub fn union_unary(g: &Geometry<f64>, pm: PrecisionModel) -> Result<Geometry<f64>> {
    OverlayNg::unary(g, pm).result()
}
