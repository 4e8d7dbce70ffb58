//! Operator and option types for the overlay engine.

use crate::geom::{Dim, Location};
use std::fmt;

/// Boolean set operation computed by an overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayOp {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

impl OverlayOp {
    pub const ALL: [OverlayOp; 4] = [
        OverlayOp::Intersection,
        OverlayOp::Union,
        OverlayOp::Difference,
        OverlayOp::SymDifference,
    ];

    /// Whether a point with the given locations relative to the two inputs
    /// belongs to the result. `Boundary` counts as `Interior`.
    pub fn is_result_of(self, loc0: Location, loc1: Location) -> bool {
        let in0 = loc0 != Location::Exterior;
        let in1 = loc1 != Location::Exterior;
        match self {
            OverlayOp::Intersection => in0 && in1,
            OverlayOp::Union => in0 || in1,
            OverlayOp::Difference => in0 && !in1,
            OverlayOp::SymDifference => in0 != in1,
        }
    }

    /// Dimension of the result when it is empty.
    pub fn result_dimension(self, dim0: Dim, dim1: Dim) -> Dim {
        match self {
            OverlayOp::Intersection => dim0.min(dim1),
            OverlayOp::Union | OverlayOp::SymDifference => dim0.max(dim1),
            OverlayOp::Difference => dim0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OverlayOp::Intersection => "intersection",
            OverlayOp::Union => "union",
            OverlayOp::Difference => "difference",
            OverlayOp::SymDifference => "symdifference",
        }
    }
}

impl fmt::Display for OverlayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OverlayOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intersection" | "and" => Ok(OverlayOp::Intersection),
            "union" | "or" => Ok(OverlayOp::Union),
            "difference" | "minus" => Ok(OverlayOp::Difference),
            "symdifference" | "symdiff" | "xor" => Ok(OverlayOp::SymDifference),
            other => Err(format!("unknown overlay op: {other}")),
        }
    }
}

/// Overlay options.
///
/// - `strict_mode`: results are homogeneous in dimension; collapsed
///   boundaries never appear as lines or points.
/// - `optimize_envelope`: clip and limit input linework to the envelope the
///   result can occupy.
/// - `area_result_only`: build polygons only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayOptions {
    pub strict_mode: bool,
    pub optimize_envelope: bool,
    pub area_result_only: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            optimize_envelope: true,
            area_result_only: false,
        }
    }
}

impl OverlayOptions {
    pub fn with_strict_mode(mut self, on: bool) -> Self {
        self.strict_mode = on;
        self
    }

    pub fn with_optimize_envelope(mut self, on: bool) -> Self {
        self.optimize_envelope = on;
        self
    }

    pub fn with_area_result_only(mut self, on: bool) -> Self {
        self.area_result_only = on;
        self
    }
}
