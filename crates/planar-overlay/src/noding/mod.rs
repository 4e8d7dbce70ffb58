//! Noding: split segment strings so that they meet only at endpoints.
//!
//! Strategies
//! - `IndexNoder`: exact floating intersections, candidate pairs from an R-tree.
//! - `ValidatingNoder`: wraps another noder and fails with a topology error
//!   when its output still has interior intersections.
//! - `SnappingNoder`: snaps vertices and intersections within a tolerance.
//! - `SnapRoundingNoder`: rounds everything to a fixed grid through hot pixels.
//!
//! Every input string carries an opaque `tag` that is copied onto each of its
//! noded substrings; callers use it to find the source annotation.

mod index;
mod segment_string;
mod snap;
mod snapround;
mod validate;


pub use index::IndexNoder;
pub use snap::SnappingNoder;
pub use snapround::SnapRoundingNoder;
pub use validate::ValidatingNoder;

use crate::error::Result;
use crate::precision::PrecisionModel;
use geo::Coord;

/// A chain of coordinates plus the caller's tag.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentString {
    pub coords: Vec<Coord<f64>>,
    pub tag: usize,
}

impl SegmentString {
    pub fn new(coords: Vec<Coord<f64>>, tag: usize) -> Self {
        Self { coords, tag }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords.first() == self.coords.last()
    }
}

/// Computes a fully noded arrangement of segment strings.
pub trait Noder {
    /// Node the input; errors are topology failures.
    fn compute_nodes(&mut self, input: Vec<SegmentString>) -> Result<()>;

    /// Drains the substrings produced by the last `compute_nodes`.
    fn noded_substrings(&mut self) -> Vec<SegmentString>;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn node(&mut self, input: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        self.compute_nodes(input)?;
        Ok(self.noded_substrings())
    }
}

/// Default noder for a precision model: validated index noding when
/// floating, snap-rounding when fixed.
pub fn noder_for(pm: PrecisionModel) -> Box<dyn Noder> {
    match pm.scale() {
        Some(scale) => Box::new(SnapRoundingNoder::new(scale)),
        None => Box::new(ValidatingNoder::new(Box::new(IndexNoder::new()))),
    }
}
