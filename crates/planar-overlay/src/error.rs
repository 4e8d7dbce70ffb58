//! Error kinds raised by the overlay engine.
//!
//! - `Topology`: noding or graph construction produced an inconsistent
//!   arrangement. Recoverable only by retrying with a different noder
//!   (see `robust`).
//! - `InvalidInput`: the inputs cannot be overlaid as given. Never retried.

use geo::Coord;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OverlayError {
    #[error("topology error: {message}{}", fmt_location(.location))]
    Topology {
        message: String,
        location: Option<Coord<f64>>,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn fmt_location(loc: &Option<Coord<f64>>) -> String {
    match loc {
        Some(c) => format!(" at ({}, {})", c.x, c.y),
        None => String::new(),
    }
}

impl OverlayError {
    pub fn topology(message: impl Into<String>, location: Coord<f64>) -> Self {
        OverlayError::Topology {
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn topology_unlocated(message: impl Into<String>) -> Self {
        OverlayError::Topology {
            message: message.into(),
            location: None,
        }
    }

    #[inline]
    pub fn is_topology(&self) -> bool {
        matches!(self, OverlayError::Topology { .. })
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
