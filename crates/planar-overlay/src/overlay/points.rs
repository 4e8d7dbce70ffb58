//! Point results and point inputs.
//!
//! - `intersection_points`: isolated nodes where the two inputs touch
//!   without sharing any result edge.
//! - `overlay_points`: set operations on two point inputs, keyed by rounded
//!   coordinate.
//! - `overlay_mixed_points`: a point input against a line or area input;
//!   points are located against the other input instead of being noded.

use super::graph::OverlayGraph;
use super::label::OverlayLabel;
use super::types::OverlayOp;
use super::union_unary;
use crate::error::Result;
use crate::geom::build::{assemble, empty_of};
use crate::geom::locate::{IndexedAreaLocator, IndexedLineLocator, PointLocator};
use crate::geom::{dimension, lines_of, points_of, polygons_of, CoordKey, Dim, Location};
use crate::precision::PrecisionModel;
use geo::{Coord, Geometry, HasDimensions, Point};
use std::collections::HashSet;

/// Nodes touched by edges of both inputs where no incident edge is part of
/// the result.
pub(crate) fn intersection_points(graph: &OverlayGraph, strict: bool) -> Vec<Point<f64>> {
    let is_edge_of = |lbl: &OverlayLabel, i: usize| {
        if strict && lbl.is_boundary_collapse() {
            return false;
        }
        lbl.is_boundary(i) || lbl.is_line(i)
    };
    let mut out = Vec::new();
    for &node in graph.node_edges() {
        let mut of_a = false;
        let mut of_b = false;
        let mut in_result = false;
        for e in graph.around(node) {
            if graph.is_in_result(e) {
                in_result = true;
                break;
            }
            let lbl = graph.label(e);
            of_a |= is_edge_of(&lbl, 0);
            of_b |= is_edge_of(&lbl, 1);
        }
        if !in_result && of_a && of_b {
            out.push(Point::from(graph.orig(node)));
        }
    }
    out
}

#[inline]
fn round(p: Coord<f64>, pm: PrecisionModel) -> Coord<f64> {
    if pm.is_floating() {
        p
    } else {
        pm.make_precise_coord(p)
    }
}

/// Distinct rounded point coordinates of `g`, in input order.
fn distinct_points(g: Option<&Geometry<f64>>, pm: PrecisionModel) -> Vec<Coord<f64>> {
    let mut seen: HashSet<CoordKey> = HashSet::new();
    let mut out = Vec::new();
    for p in g.map(points_of).unwrap_or_default() {
        let r = round(p, pm);
        if seen.insert(CoordKey::from(r)) {
            out.push(r);
        }
    }
    out
}

fn point_result(pts: Vec<Coord<f64>>) -> Geometry<f64> {
    let points = pts.into_iter().map(Point::from).collect();
    assemble(points, Vec::new(), Vec::new()).unwrap_or_else(|| empty_of(Dim::Point))
}

/// Overlay of two point inputs (`b` absent for a unary union).
pub(crate) fn overlay_points(
    op: OverlayOp,
    a: &Geometry<f64>,
    b: Option<&Geometry<f64>>,
    pm: PrecisionModel,
) -> Geometry<f64> {
    let pts0 = distinct_points(Some(a), pm);
    let pts1 = distinct_points(b, pm);
    let keys0: HashSet<CoordKey> = pts0.iter().map(|&p| CoordKey::from(p)).collect();
    let keys1: HashSet<CoordKey> = pts1.iter().map(|&p| CoordKey::from(p)).collect();
    let in0 = |p: &Coord<f64>| keys0.contains(&CoordKey::from(*p));
    let in1 = |p: &Coord<f64>| keys1.contains(&CoordKey::from(*p));

    let result: Vec<Coord<f64>> = match op {
        OverlayOp::Intersection => pts0.iter().copied().filter(|p| in1(p)).collect(),
        OverlayOp::Union => pts0
            .iter()
            .copied()
            .chain(pts1.iter().copied().filter(|p| !in0(p)))
            .collect(),
        OverlayOp::Difference => pts0.iter().copied().filter(|p| !in1(p)).collect(),
        OverlayOp::SymDifference => pts0
            .iter()
            .copied()
            .filter(|p| !in1(p))
            .chain(pts1.iter().copied().filter(|p| !in0(p)))
            .collect(),
    };
    point_result(result)
}

/// Overlay of a point input with a non-point input.
pub(crate) fn overlay_mixed_points(
    op: OverlayOp,
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    pm: PrecisionModel,
) -> Result<Geometry<f64>> {
    let result_dim = op.result_dimension(dimension(a), dimension(b));
    let (points, non_point_input, point_is_rhs) = if dimension(a) == Dim::Point {
        (a, b, false)
    } else {
        (b, a, true)
    };
    // The non-point input appears in the output only when the result can
    // have its dimension; it is then noded and rounded like any result.
    let non_point = if result_dim == Dim::Point {
        non_point_input.clone()
    } else {
        union_unary(non_point_input, pm)?
    };
    let non_point_dim = dimension(&non_point);
    let locator: Box<dyn PointLocator> = if non_point_dim == Dim::Area {
        Box::new(IndexedAreaLocator::new(&non_point))
    } else {
        Box::new(IndexedLineLocator::new(&non_point))
    };
    let coords = distinct_points(Some(points), pm);
    let find = |covered: bool| -> Vec<Coord<f64>> {
        coords
            .iter()
            .copied()
            .filter(|&p| (locator.locate(p) != Location::Exterior) == covered)
            .collect()
    };

    let result = match op {
        OverlayOp::Intersection => point_result(find(true)),
        OverlayOp::Union | OverlayOp::SymDifference => {
            let pts = find(false).into_iter().map(Point::from).collect();
            let lines = if non_point_dim == Dim::Line {
                lines_of(&non_point).into_iter().filter(|l| !l.is_empty()).collect()
            } else {
                Vec::new()
            };
            let polys = if non_point_dim == Dim::Area {
                polygons_of(&non_point).into_iter().filter(|p| !p.is_empty()).collect()
            } else {
                Vec::new()
            };
            assemble(pts, lines, polys).unwrap_or_else(|| empty_of(result_dim))
        }
        OverlayOp::Difference if point_is_rhs => non_point,
        OverlayOp::Difference => point_result(find(false)),
    };
    Ok(result)
}
