//! Precision reduction through unary overlay.
//!
//! Rounding every coordinate independently can make polygons invalid
//! (edges crossing, rings collapsing). Running a unary union under the target
//! precision model snap-rounds the linework instead, so collapsed parts are
//! dropped and touching parts are merged.

use crate::error::{OverlayError, Result};
use crate::geom::{dimension, Dim};
use crate::overlay::{OverlayNg, OverlayOptions};
use crate::precision::PrecisionModel;
use geo::Geometry;

/// `g` reduced to the grid of `pm`. Floating models return `g` unchanged.
/// Areal inputs give areal output only.
pub fn reduce_precision(g: &Geometry<f64>, pm: PrecisionModel) -> Result<Geometry<f64>> {
    if pm.scale().is_none() {
        return Ok(g.clone());
    }
    let opts = OverlayOptions::default().with_area_result_only(dimension(g) == Dim::Area);
    OverlayNg::unary(g, pm).with_options(opts).result().map_err(|e| {
        if e.is_topology() {
            tracing::warn!(error = %e, "precision reduction failed");
            OverlayError::InvalidInput("reduction failed, possible invalid input".into())
        } else {
            e
        }
    })
}
