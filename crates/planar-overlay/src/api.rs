//! Curated API for callers.
//!
//! One-call boolean operations run through the robust ladder; use
//! `overlay::OverlayNg` directly for a single attempt with options.

use crate::error::Result;
use geo::Geometry;

// Engine and options
pub use crate::overlay::{overlay, overlay_with_noder, union_unary, OverlayNg, OverlayOp, OverlayOptions};
// Robust ladder
pub use crate::robust::{overlay_robust, overlay_robust_with, snap_tolerance, union_unary_robust, RobustCfg, Rung};
// Precision
pub use crate::precision::{inherent_scale, robust_scale, safe_scale, PrecisionModel};
pub use crate::reduce::reduce_precision;
// Noders
pub use crate::noding::{noder_for, IndexNoder, Noder, SegmentString, SnapRoundingNoder, SnappingNoder, ValidatingNoder};
// Geometry helpers
pub use crate::geom::rand::{draw_pair, draw_polygon_radial, RadialCfg, ReplayToken, VertexCount};
pub use crate::geom::{dimension, envelope_of, Dim, Envelope, Location};

#[inline]
pub fn intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    overlay_robust(a, b, OverlayOp::Intersection)
}

#[inline]
pub fn union(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    overlay_robust(a, b, OverlayOp::Union)
}

#[inline]
pub fn difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    overlay_robust(a, b, OverlayOp::Difference)
}

#[inline]
pub fn sym_difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<Geometry<f64>> {
    overlay_robust(a, b, OverlayOp::SymDifference)
}
