//! JSON documents read and written by the CLI.
//!
//! Geometries use the `geo-types` serde layout, e.g.
//! `{"Polygon": {"exterior": [{"x": 0.0, "y": 0.0}, ...], "interiors": []}}`.

use anyhow::{Context, Result};
use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Two overlay operands.
#[derive(Debug, Deserialize, Serialize)]
pub struct OverlayInput {
    pub a: Geometry<f64>,
    pub b: Geometry<f64>,
}

/// Result document of `run`.
#[derive(Debug, Serialize)]
pub struct OverlayOutput<'a> {
    pub op: &'a str,
    /// Retry rung that produced the result; absent for single attempts.
    pub rung: Option<String>,
    pub result: &'a Geometry<f64>,
}

pub fn read_input(path: &Path) -> Result<OverlayInput> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SQUARES: &str = r#"{
        "a": {"Polygon": {"exterior": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 0.0}, {"x": 1.0, "y": 1.0}, {"x": 0.0, "y": 0.0}], "interiors": []}},
        "b": {"Point": {"x": 0.5, "y": 0.25}}
    }"#;

    #[test]
    fn reads_geo_types_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(&path, SQUARES).unwrap();
        let input = read_input(&path).unwrap();
        assert!(matches!(input.a, Geometry::Polygon(ref p) if p.exterior().0.len() == 4));
        assert!(matches!(input.b, Geometry::Point(_)));
    }

    #[test]
    fn malformed_input_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"a\": 1}").unwrap();
        let err = read_input(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/result.json");
        write_json(&path, &serde_json::json!({"ok": true})).unwrap();
        assert!(path.exists());
    }
}
