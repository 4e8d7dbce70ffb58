//! `<artifact>.provenance.json` sidecars.
//!
//! A sidecar records how an overlay artifact was produced: engine version
//! and code revision, the operator and precision model, the shape of both
//! operands and of the result, and which rung of the robust ladder
//! succeeded.

use anyhow::Result;
use geo::{Area, CoordsIter, Geometry};
use planar_overlay::api::{envelope_of, PrecisionModel};
use serde::Serialize;
use serde_json::Value;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Shape of one geometry: enough to tell whether a rerun reproduced it.
#[derive(Debug, PartialEq, Serialize)]
pub struct GeometrySummary {
    pub kind: &'static str,
    pub coords: usize,
    pub area: f64,
    /// `[min_x, min_y, max_x, max_y]`, absent when empty.
    pub envelope: Option<[f64; 4]>,
}

impl GeometrySummary {
    pub fn of(g: &Geometry<f64>) -> Self {
        Self {
            kind: kind_name(g),
            coords: g.coords_count(),
            area: g.unsigned_area(),
            envelope: envelope_of(g).map(|e| [e.min_x, e.min_y, e.max_x, e.max_y]),
        }
    }
}

fn kind_name(g: &Geometry<f64>) -> &'static str {
    match g {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

pub fn precision_label(pm: PrecisionModel) -> String {
    match pm {
        PrecisionModel::Floating => "floating".to_string(),
        PrecisionModel::FloatingSingle => "floating-single".to_string(),
        PrecisionModel::Fixed { scale } => format!("fixed(scale={scale})"),
    }
}

/// One `run` invocation.
#[derive(Debug, Serialize)]
pub struct RunRecord {
    pub op: &'static str,
    pub precision: String,
    pub strict: bool,
    /// Robust ladder rung; `None` for single attempts.
    pub rung: Option<String>,
    pub input: String,
    pub operands: [GeometrySummary; 2],
    pub result: GeometrySummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Record {
    Run(RunRecord),
    /// Stress summary as printed by the command.
    Stress(Value),
}

#[derive(Debug, Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

#[derive(Debug, Serialize)]
struct Sidecar {
    code_rev: String,
    engine_version: &'static str,
    callsite: Callsite,
    record: Record,
    outputs: Vec<String>,
}

/// Write the sidecar of `artifact` and return its path.
#[track_caller]
pub fn write_sidecar(artifact: &Path, record: Record) -> Result<PathBuf> {
    let caller = Location::caller();
    let doc = Sidecar {
        code_rev: code_rev(),
        engine_version: planar_overlay::VERSION,
        callsite: Callsite {
            file: caller.file(),
            line: caller.line(),
        },
        record,
        outputs: vec![artifact.display().to_string()],
    };
    let path = sidecar_path(artifact);
    crate::io::write_json(&path, &doc)?;
    Ok(path)
}

/// `out/union.json` -> `out/union.provenance.json`.
fn sidecar_path(artifact: &Path) -> PathBuf {
    artifact.with_extension("provenance.json")
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`.
pub fn code_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_owned)
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("GIT_COMMIT").ok().filter(|s| !s.is_empty()))
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
