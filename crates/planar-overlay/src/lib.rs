//! Planar boolean overlay of `geo` geometries.
//!
//! Intersection, union, difference and symmetric difference of points,
//! lines and polygons, computed on a fully noded half-edge graph under an
//! explicit precision model.
//!
//! Layout
//! - `geom`: locations, envelopes, point location, result assembly, random
//!   polygons.
//! - `noding`: the `Noder` trait and its index, snapping and snap-rounding
//!   implementations.
//! - `overlay`: the single-attempt engine (`OverlayNg`).
//! - `robust`: retry ladder over noders for floating-point failures.
//! - `reduce`: precision reduction through unary overlay.
//!
//! API Policy
//! - `api` is the curated surface for callers (the CLI uses it). Module
//!   paths below it may change freely.

pub mod api;
pub mod error;
pub mod geom;
pub mod noding;
pub mod overlay;
pub mod precision;
pub mod reduce;
pub mod robust;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{OverlayError, Result};
pub use overlay::{OverlayOp, OverlayOptions};
pub use precision::PrecisionModel;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{OverlayError, Result};
    pub use crate::geom::rand::{draw_pair, draw_polygon_radial, RadialCfg, ReplayToken, VertexCount};
    pub use crate::geom::{Dim, Location};
    pub use crate::overlay::{overlay, union_unary, OverlayNg, OverlayOp, OverlayOptions};
    pub use crate::precision::PrecisionModel;
    pub use crate::reduce::reduce_precision;
    pub use crate::robust::{overlay_robust, overlay_robust_with, union_unary_robust, RobustCfg, Rung};
}
