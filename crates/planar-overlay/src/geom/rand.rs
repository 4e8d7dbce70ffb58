//! Random star-shaped polygons (radial jitter + replay tokens).
//!
//! Purpose
//! - Deterministic polygon source for property tests, benchmarks and CLI
//!   stress runs of the overlay engine.
//!
//! Model
//! - Start from `n` equally spaced angles on [0, 2π), add bounded angular and
//!   radial jitter, and connect the vertices in angle order. The result is
//!   simple and star-shaped around the origin, usually not convex.
//! - An optional hole is a scaled-down, reversed copy of the outline, scaled
//!   small enough to stay strictly inside the shell.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use geo::{Coord, LineString, Polygon};
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Vertex count distribution.
#[derive(Clone, Copy, Debug)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}
impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

/// Radial-jitter sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct RadialCfg {
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the base spacing Δ=2π/n. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Radial jitter (relative amplitude). Radii = `base_radius * (1 + u)`, with `u∈[-radial_jitter, radial_jitter]`. Clamped to [0, 0.9].
    pub radial_jitter: f64,
    pub base_radius: f64,
    pub random_phase: bool,
    /// Hole size relative to the shell; 0 disables the hole. Clamped so the hole stays inside.
    pub hole_frac: f64,
}
impl Default for RadialCfg {
    fn default() -> Self {
        Self {
            vertex_count: VertexCount::Fixed(12),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.25,
            base_radius: 1.0,
            random_phase: true,
            hole_frac: 0.0,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a random star-shaped polygon centred on `center`.
///
/// The shell is oriented counter-clockwise and the hole, if any, clockwise.
pub fn draw_polygon_radial(cfg: RadialCfg, tok: ReplayToken, center: Vector2<f64>) -> Polygon<f64> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertex_count.sample(&mut rng).max(3);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.9);
    let r0 = cfg.base_radius.max(1e-9);
    let delta = 2.0 * std::f64::consts::PI / (n as f64);
    let phase = if cfg.random_phase {
        rng.gen::<f64>() * 2.0 * std::f64::consts::PI
    } else {
        0.0
    };
    let mut angles: Vec<f64> = (0..n)
        .map(|k| {
            let base = phase + (k as f64) * delta;
            let jitter = (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            base + jitter
        })
        .collect();
    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pts: Vec<Vector2<f64>> = angles
        .into_iter()
        .map(|th| {
            let u = (rng.gen::<f64>() * 2.0 - 1.0) * rj;
            let r = (1.0 + u).max(1e-6) * r0;
            Vector2::new(th.cos() * r, th.sin() * r)
        })
        .collect();

    let shell = ring_from(&pts, 1.0, center);
    if cfg.hole_frac <= 0.0 || n < 4 {
        return Polygon::new(shell, vec![]);
    }
    // Chords between neighbours dip towards the origin by at most cos(Δmax/2).
    let max_gap = (1.0 + 2.0 * aj) * delta;
    let safe = (1.0 - rj) / (1.0 + rj) * (max_gap * 0.5).cos().max(0.0) * 0.9;
    let f = cfg.hole_frac.min(safe);
    if f <= 0.0 {
        return Polygon::new(shell, vec![]);
    }
    let mut hole_pts = pts;
    hole_pts.reverse();
    Polygon::new(shell, vec![ring_from(&hole_pts, f, center)])
}

/// Two overlapping polygons from consecutive tokens, the second shifted by `offset`.
pub fn draw_pair(
    cfg: RadialCfg,
    tok: ReplayToken,
    offset: Vector2<f64>,
) -> (Polygon<f64>, Polygon<f64>) {
    let a = draw_polygon_radial(cfg, tok, Vector2::zeros());
    let next = ReplayToken {
        seed: tok.seed,
        index: tok.index.wrapping_add(1),
    };
    let b = draw_polygon_radial(cfg, next, offset);
    (a, b)
}

fn ring_from(pts: &[Vector2<f64>], scale: f64, center: Vector2<f64>) -> LineString<f64> {
    let coords: Vec<Coord<f64>> = pts
        .iter()
        .map(|p| {
            let q = p * scale + center;
            Coord { x: q.x, y: q.y }
        })
        .collect();
    LineString::new(coords)
}
