//! Precision models and scale utilities.
//!
//! - `PrecisionModel::Floating`: full double precision, no rounding.
//! - `PrecisionModel::FloatingSingle`: rounds to single precision on request; the
//!   overlay treats it as floating for noder selection.
//! - `PrecisionModel::Fixed { scale }`: grid of cell size `1/scale`; values are
//!   rounded half-up to the nearest grid line.

use crate::geom::{envelope_of, Envelope};
use geo::{Coord, CoordsIter, Geometry};

/// Number of significant decimal digits that double precision noding can
/// handle robustly.
pub const MAX_ROBUST_DP_DIGITS: i32 = 14;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PrecisionModel {
    #[default]
    Floating,
    FloatingSingle,
    Fixed {
        scale: f64,
    },
}

impl PrecisionModel {
    /// Fixed grid model. Scale must be finite and positive.
    pub fn fixed(scale: f64) -> Self {
        debug_assert!(scale.is_finite() && scale > 0.0);
        PrecisionModel::Fixed { scale }
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        !matches!(self, PrecisionModel::Fixed { .. })
    }

    #[inline]
    pub fn scale(&self) -> Option<f64> {
        match *self {
            PrecisionModel::Fixed { scale } => Some(scale),
            _ => None,
        }
    }

    /// Grid cell size for fixed models.
    #[inline]
    pub fn grid_size(&self) -> Option<f64> {
        self.scale().map(|s| 1.0 / s)
    }

    pub fn make_precise(&self, v: f64) -> f64 {
        if v.is_nan() {
            return v;
        }
        match *self {
            PrecisionModel::Floating => v,
            PrecisionModel::FloatingSingle => (v as f32) as f64,
            PrecisionModel::Fixed { scale } => {
                if scale < 1.0 {
                    // Coarse grids divide by the cell size to stay exact on integral cells.
                    let grid = 1.0 / scale;
                    (v / grid + 0.5).floor() * grid
                } else {
                    (v * scale + 0.5).floor() / scale
                }
            }
        }
    }

    #[inline]
    pub fn make_precise_coord(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.make_precise(c.x),
            y: self.make_precise(c.y),
        }
    }

    /// Fixed model at the safe scale for the given inputs (see `safe_scale`).
    pub fn safe_for(a: &Geometry<f64>, b: Option<&Geometry<f64>>) -> Self {
        let mag = max_bound_magnitude(a, b);
        PrecisionModel::fixed(safe_scale(mag, MAX_ROBUST_DP_DIGITS))
    }
}

/// Scale keeping `digits` significant digits for values up to `magnitude`.
///
/// The exponent counts the digits left of the decimal point of `magnitude`;
/// zero and non-finite magnitudes are treated as unit magnitude.
pub fn safe_scale(magnitude: f64, digits: i32) -> f64 {
    let magnitude_digits = if magnitude.is_finite() && magnitude > 0.0 {
        (magnitude.log10() + 1.0) as i32
    } else {
        1
    };
    10f64.powi(digits - magnitude_digits)
}

/// Largest scale that both represents the inputs' coordinates exactly and
/// stays within the safe scale. Returns the inherent scale when it is
/// smaller.
pub fn robust_scale(a: &Geometry<f64>, b: Option<&Geometry<f64>>) -> f64 {
    let inherent = inherent_scale(a).max(b.map(inherent_scale).unwrap_or(0.0));
    let safe = safe_scale(max_bound_magnitude(a, b), MAX_ROBUST_DP_DIGITS);
    if inherent <= safe {
        inherent
    } else {
        safe
    }
}

/// Power of ten matching the longest decimal expansion among the coordinates.
pub fn inherent_scale(g: &Geometry<f64>) -> f64 {
    g.coords_iter()
        .flat_map(|c| [c.x, c.y])
        .map(|v| 10f64.powi(decimal_places(v)))
        .fold(0.0, f64::max)
}

fn decimal_places(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    // Display for f64 prints the shortest round-tripping decimal, never in
    // exponent form.
    let s = format!("{}", v.abs());
    match s.find('.') {
        Some(dot) => (s.len() - dot - 1).min(330) as i32,
        None => 0,
    }
}

pub(crate) fn max_bound_magnitude(a: &Geometry<f64>, b: Option<&Geometry<f64>>) -> f64 {
    let mag = |g: &Geometry<f64>| envelope_of(g).map(|e: Envelope| e.max_magnitude()).unwrap_or(0.0);
    mag(a).max(b.map(mag).unwrap_or(0.0))
}
