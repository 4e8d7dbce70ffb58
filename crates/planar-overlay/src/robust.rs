//! Robust overlay: retries failed overlays with more tolerant noders.
//!
//! Ladder (first success wins)
//! 1. Natural: floating precision with the validating index noder.
//! 2. For each of `snap_attempts` tolerances, starting at the largest input
//!    ordinate over `snap_tolerance_factor` and growing by `snap_growth`:
//!    - Snapping: the snapping noder at that tolerance;
//!    - SnapSelf: both inputs first snapped against themselves, then snapping.
//! 3. SnapRounding: fixed precision at the safe scale of the inputs.
//!
//! When every rung fails the error of the natural attempt is returned; it
//! describes the input rather than a perturbed copy of it. Invalid input is
//! never retried.

use crate::error::Result;
use crate::noding::SnappingNoder;
use crate::overlay::{OverlayNg, OverlayOp, OverlayOptions};
use crate::precision::{max_bound_magnitude, safe_scale, PrecisionModel, MAX_ROBUST_DP_DIGITS};
use geo::Geometry;
use std::fmt;

/// Parameters of the retry ladder.
#[derive(Clone, Debug, PartialEq)]
pub struct RobustCfg {
    /// Initial snap tolerance is the largest ordinate magnitude divided by this.
    pub snap_tolerance_factor: f64,
    pub snap_attempts: usize,
    pub snap_growth: f64,
    /// Significant digits kept by the final snap-rounding rung.
    pub safe_scale_digits: i32,
}

impl Default for RobustCfg {
    fn default() -> Self {
        Self {
            snap_tolerance_factor: 1e12,
            snap_attempts: 5,
            snap_growth: 10.0,
            safe_scale_digits: MAX_ROBUST_DP_DIGITS,
        }
    }
}

/// Strategy that produced a robust result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rung {
    Natural,
    Snapping { tolerance: f64 },
    SnapSelf { tolerance: f64 },
    SnapRounding { scale: f64 },
}

impl Rung {
    pub fn name(&self) -> &'static str {
        match self {
            Rung::Natural => "natural",
            Rung::Snapping { .. } => "snapping",
            Rung::SnapSelf { .. } => "snap-self",
            Rung::SnapRounding { .. } => "snap-rounding",
        }
    }
}

impl fmt::Display for Rung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rung::Natural => f.write_str("natural"),
            Rung::Snapping { tolerance } => write!(f, "snapping(tol={tolerance:e})"),
            Rung::SnapSelf { tolerance } => write!(f, "snap-self(tol={tolerance:e})"),
            Rung::SnapRounding { scale } => write!(f, "snap-rounding(scale={scale:e})"),
        }
    }
}

/// Overlay that survives floating-point noding failures.
pub fn overlay_robust(a: &Geometry<f64>, b: &Geometry<f64>, op: OverlayOp) -> Result<Geometry<f64>> {
    overlay_robust_with(a, b, op, &RobustCfg::default()).map(|(g, _)| g)
}

/// Like `overlay_robust`, also reporting which rung succeeded.
pub fn overlay_robust_with(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    op: OverlayOp,
    cfg: &RobustCfg,
) -> Result<(Geometry<f64>, Rung)> {
    run_ladder(a, Some(b), op, cfg, &attempt)
}

/// Unary union with the same retry ladder. Self-snapping is skipped: the
/// snapping rung already snaps the single input against itself.
pub fn union_unary_robust(g: &Geometry<f64>) -> Result<Geometry<f64>> {
    run_ladder(g, None, OverlayOp::Union, &RobustCfg::default(), &attempt).map(|(g, _)| g)
}

/// Initial snap tolerance for a pair of inputs.
pub fn snap_tolerance(a: &Geometry<f64>, b: Option<&Geometry<f64>>, factor: f64) -> f64 {
    max_bound_magnitude(a, b) / factor
}

/// One overlay attempt with the strategy of a rung.
type Attempt<'f> = dyn Fn(&Geometry<f64>, Option<&Geometry<f64>>, OverlayOp, Rung) -> Result<Geometry<f64>> + 'f;

fn run_ladder(
    a: &Geometry<f64>,
    b: Option<&Geometry<f64>>,
    op: OverlayOp,
    cfg: &RobustCfg,
    attempt: &Attempt<'_>,
) -> Result<(Geometry<f64>, Rung)> {
    let original = match attempt(a, b, op, Rung::Natural) {
        Ok(g) => return Ok((g, Rung::Natural)),
        Err(e) if !e.is_topology() => return Err(e),
        Err(e) => e,
    };
    tracing::warn!(%op, error = %original, "natural overlay failed, escalating");

    let mut tolerance = snap_tolerance(a, b, cfg.snap_tolerance_factor);
    for _ in 0..cfg.snap_attempts {
        if let Some(g) = try_rung(a, b, op, Rung::Snapping { tolerance }, attempt) {
            return Ok(g);
        }
        if b.is_some() {
            if let Some(g) = try_rung(a, b, op, Rung::SnapSelf { tolerance }, attempt) {
                return Ok(g);
            }
        }
        tolerance *= cfg.snap_growth;
    }

    let scale = safe_scale(max_bound_magnitude(a, b), cfg.safe_scale_digits);
    if let Some(g) = try_rung(a, b, op, Rung::SnapRounding { scale }, attempt) {
        return Ok(g);
    }
    tracing::warn!(%op, "robust overlay exhausted every strategy");
    Err(original)
}

fn try_rung(
    a: &Geometry<f64>,
    b: Option<&Geometry<f64>>,
    op: OverlayOp,
    rung: Rung,
    attempt: &Attempt<'_>,
) -> Option<(Geometry<f64>, Rung)> {
    tracing::debug!(%op, %rung, "robust overlay attempt");
    match attempt(a, b, op, rung) {
        Ok(g) => {
            tracing::info!(%op, %rung, "robust overlay succeeded with fallback");
            Some((g, rung))
        }
        Err(e) => {
            tracing::warn!(%op, %rung, error = %e, "robust overlay rung failed");
            None
        }
    }
}

fn engine<'a>(a: &'a Geometry<f64>, b: Option<&'a Geometry<f64>>, op: OverlayOp, pm: PrecisionModel) -> OverlayNg<'a> {
    match b {
        Some(b) => OverlayNg::new(a, b, op, pm),
        None => OverlayNg::unary(a, pm),
    }
}

fn attempt(a: &Geometry<f64>, b: Option<&Geometry<f64>>, op: OverlayOp, rung: Rung) -> Result<Geometry<f64>> {
    match rung {
        Rung::Natural => engine(a, b, op, PrecisionModel::Floating).result(),
        Rung::Snapping { tolerance } => engine(a, b, op, PrecisionModel::Floating)
            .with_noder(Box::new(SnappingNoder::new(tolerance)))
            .result(),
        Rung::SnapSelf { tolerance } => {
            let a = snap_self(a, tolerance)?;
            let b = b.map(|b| snap_self(b, tolerance)).transpose()?;
            attempt(&a, b.as_ref(), op, Rung::Snapping { tolerance })
        }
        Rung::SnapRounding { scale } => engine(a, b, op, PrecisionModel::fixed(scale)).result(),
    }
}

/// Unary union with a snapping noder; removes spikes and gores narrower
/// than the tolerance. Strict, so collapsed parts vanish.
fn snap_self(g: &Geometry<f64>, tolerance: f64) -> Result<Geometry<f64>> {
    OverlayNg::unary(g, PrecisionModel::Floating)
        .with_noder(Box::new(SnappingNoder::new(tolerance)))
        .with_options(OverlayOptions::default().with_strict_mode(true))
        .result()
}
