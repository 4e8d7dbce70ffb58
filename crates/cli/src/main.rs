use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use geo::{Area, Geometry};
use nalgebra::Vector2;
use planar_overlay::api::{
    draw_pair, overlay_robust_with, OverlayNg, OverlayOp, OverlayOptions, PrecisionModel, RadialCfg, ReplayToken,
    RobustCfg, VertexCount,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod io;
mod provenance;

use provenance::GeometrySummary;

#[derive(Parser)]
#[command(name = "overlay-cli")]
#[command(about = "Boolean overlay of planar geometries")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Overlay the two geometries of a JSON input and write the result
    Run {
        /// intersection | union | difference | symdifference
        #[arg(long)]
        op: OverlayOp,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Fixed precision scale; a single attempt snap-rounded to this grid
        #[arg(long)]
        scale: Option<f64>,
        /// Homogeneous results without collapse lines or points
        #[arg(long)]
        strict: bool,
    },
    /// Overlay random polygon pairs through the robust ladder and tally the rungs
    Stress {
        #[arg(long, default_value_t = 100)]
        pairs: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 24)]
        vertices: usize,
        /// Optional JSON summary path
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            op,
            input,
            out,
            scale,
            strict,
        } => run(op, &input, &out, scale, strict),
        Action::Stress {
            pairs,
            seed,
            vertices,
            out,
        } => stress(pairs, seed, vertices, out.as_deref()),
        Action::Report => report(),
    }
}

fn run(op: OverlayOp, input: &Path, out: &Path, scale: Option<f64>, strict: bool) -> Result<()> {
    tracing::info!(%op, input = %input.display(), out = %out.display(), ?scale, strict, "run");
    let doc = io::read_input(input)?;
    let (result, pm, rung) = match scale {
        Some(s) if !(s.is_finite() && s > 0.0) => bail!("scale must be finite and positive, got {s}"),
        Some(s) => {
            let pm = PrecisionModel::fixed(s);
            (single_attempt(&doc, op, pm, strict)?, pm, None)
        }
        None if strict => (single_attempt(&doc, op, PrecisionModel::Floating, true)?, PrecisionModel::Floating, None),
        None => {
            let (g, rung) = overlay_robust_with(&doc.a, &doc.b, op, &RobustCfg::default())?;
            (g, PrecisionModel::Floating, Some(rung.to_string()))
        }
    };
    io::write_json(
        out,
        &io::OverlayOutput {
            op: op.name(),
            rung: rung.clone(),
            result: &result,
        },
    )?;
    let record = provenance::RunRecord {
        op: op.name(),
        precision: provenance::precision_label(pm),
        strict,
        rung,
        input: input.display().to_string(),
        operands: [GeometrySummary::of(&doc.a), GeometrySummary::of(&doc.b)],
        result: GeometrySummary::of(&result),
    };
    provenance::write_sidecar(out, provenance::Record::Run(record))?;
    Ok(())
}

fn single_attempt(doc: &io::OverlayInput, op: OverlayOp, pm: PrecisionModel, strict: bool) -> Result<Geometry<f64>> {
    let opts = OverlayOptions::default().with_strict_mode(strict);
    Ok(OverlayNg::new(&doc.a, &doc.b, op, pm).with_options(opts).result()?)
}

/// Per-run tally of the stress command.
#[derive(Debug, Default)]
struct StressTally {
    rungs: BTreeMap<&'static str, u64>,
    failures: u64,
    /// Largest inclusion-exclusion residual |∪ + ∩ − A − B|.
    max_area_residual: f64,
}

fn stress_pair(a: &Geometry<f64>, b: &Geometry<f64>, cfg: &RobustCfg, tally: &mut StressTally) {
    let mut areas = [0.0; 2];
    for (slot, op) in [OverlayOp::Union, OverlayOp::Intersection].into_iter().enumerate() {
        match overlay_robust_with(a, b, op, cfg) {
            Ok((g, rung)) => {
                *tally.rungs.entry(rung.name()).or_default() += 1;
                areas[slot] = g.unsigned_area();
            }
            Err(e) => {
                tracing::warn!(%op, error = %e, "stress overlay failed");
                tally.failures += 1;
                return;
            }
        }
    }
    let residual = (areas[0] + areas[1] - a.unsigned_area() - b.unsigned_area()).abs();
    tally.max_area_residual = tally.max_area_residual.max(residual);
}

fn stress(pairs: u64, seed: u64, vertices: usize, out: Option<&Path>) -> Result<()> {
    tracing::info!(pairs, seed, vertices, "stress");
    let cfg = RadialCfg {
        vertex_count: VertexCount::Uniform {
            min: 3,
            max: vertices.max(3),
        },
        hole_frac: 0.3,
        ..RadialCfg::default()
    };
    let robust = RobustCfg::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tally = StressTally::default();
    for i in 0..pairs {
        let offset = Vector2::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5));
        let tok = ReplayToken { seed, index: 2 * i };
        let (a, b) = draw_pair(cfg, tok, offset);
        stress_pair(&a.into(), &b.into(), &robust, &mut tally);
    }
    let summary = json!({
        "pairs": pairs,
        "seed": seed,
        "vertices": vertices,
        "rungs": tally.rungs,
        "failures": tally.failures,
        "max_area_residual": tally.max_area_residual,
    });
    tracing::info!(failures = tally.failures, max_area_residual = tally.max_area_residual, "stress done");
    match out {
        Some(path) => {
            io::write_json(path, &summary)?;
            provenance::write_sidecar(path, provenance::Record::Stress(summary))?;
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_rev(),
        "engine_version": planar_overlay::VERSION,
        "params": {
            "robust": format!("{:?}", RobustCfg::default()),
        },
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
