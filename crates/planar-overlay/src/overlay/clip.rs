//! Envelope clipping of overlay input.
//!
//! Linework far from the region the result can occupy does not affect the
//! result, so it is clipped (rings) or limited (long lines) before noding.

use super::input::InputGeometry;
use super::types::OverlayOp;
use crate::geom::{polygons_of, Envelope};
use crate::precision::PrecisionModel;
use geo::{Coord, Geometry};

const SAFE_ENV_BUFFER_FACTOR: f64 = 0.1;
const SAFE_ENV_GRID_FACTOR: f64 = 3.0;

/// Envelope outside of which input linework cannot contribute to the
/// result, or `None` when the whole input is needed.
pub(crate) fn clipping_envelope(op: OverlayOp, input: &InputGeometry<'_>, pm: PrecisionModel) -> Option<Envelope> {
    let result_env = match op {
        OverlayOp::Intersection => {
            let a = safe_env(&input.envelope(0)?, pm);
            let b = safe_env(&input.envelope(1)?, pm);
            a.intersection(&b)?
        }
        OverlayOp::Difference => safe_env(&input.envelope(0)?, pm),
        OverlayOp::Union | OverlayOp::SymDifference => return None,
    };
    let mut clip_env = RobustClipEnvelope::new(result_env);
    for g in input.geometries() {
        clip_env.add(g);
    }
    Some(safe_env(&clip_env.envelope(), pm))
}

/// Envelope expanded enough to contain rounded coordinates and to keep
/// clipping artefacts away from the result.
pub(crate) fn safe_env(env: &Envelope, pm: PrecisionModel) -> Envelope {
    env.expand_by(safe_expand_distance(env, pm))
}

fn safe_expand_distance(env: &Envelope, pm: PrecisionModel) -> f64 {
    match pm.grid_size() {
        Some(grid) => SAFE_ENV_GRID_FACTOR * grid,
        None => {
            let mut min_size = env.width().min(env.height());
            // zero-width envelopes must not clip everything away
            if min_size <= 0.0 {
                min_size = env.width().max(env.height());
            }
            SAFE_ENV_BUFFER_FACTOR * min_size
        }
    }
}

/// Grows a target envelope to cover every polygon segment that touches it,
/// so clipped rings keep their full segments near the target.
struct RobustClipEnvelope {
    target: Envelope,
    clip: Envelope,
}

impl RobustClipEnvelope {
    fn new(target: Envelope) -> Self {
        Self { target, clip: target }
    }

    fn add(&mut self, g: &Geometry<f64>) {
        for poly in polygons_of(g) {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                for w in ring.0.windows(2) {
                    if self.target.intersects_segment(w[0], w[1]) {
                        self.clip.expand_to_include(w[0]);
                        self.clip.expand_to_include(w[1]);
                    }
                }
            }
        }
    }

    fn envelope(&self) -> Envelope {
        self.clip
    }
}

#[derive(Clone, Copy, Debug)]
enum BoxEdge {
    Bottom,
    Right,
    Top,
    Left,
}

/// Clips rings to a rectangle, edge by edge. The output is closed and may
/// run along the rectangle sides; it is not guaranteed to be valid, only to
/// have the same topology inside the rectangle.
pub(crate) struct RingClipper {
    env: Envelope,
}

impl RingClipper {
    pub fn new(env: Envelope) -> Self {
        Self { env }
    }

    pub fn clip(&self, pts: &[Coord<f64>]) -> Vec<Coord<f64>> {
        let mut out = pts.to_vec();
        for edge in [BoxEdge::Bottom, BoxEdge::Right, BoxEdge::Top, BoxEdge::Left] {
            let close_ring = matches!(edge, BoxEdge::Left);
            out = self.clip_to_box_edge(&out, edge, close_ring);
            if out.is_empty() {
                break;
            }
        }
        out
    }

    fn clip_to_box_edge(&self, pts: &[Coord<f64>], edge: BoxEdge, close_ring: bool) -> Vec<Coord<f64>> {
        let mut out: Vec<Coord<f64>> = Vec::with_capacity(pts.len() + 1);
        let Some(&last) = pts.last() else {
            return out;
        };
        let push = |out: &mut Vec<Coord<f64>>, p: Coord<f64>| {
            if out.last() != Some(&p) {
                out.push(p);
            }
        };
        let mut p0 = last;
        for &p1 in pts {
            if self.is_inside(p1, edge) {
                if !self.is_inside(p0, edge) {
                    push(&mut out, self.intersection(p0, p1, edge));
                }
                push(&mut out, p1);
            } else if self.is_inside(p0, edge) {
                push(&mut out, self.intersection(p0, p1, edge));
            }
            p0 = p1;
        }
        if close_ring {
            if let (Some(&first), Some(&end)) = (out.first(), out.last()) {
                if first != end {
                    out.push(first);
                }
            }
        }
        out
    }

    fn is_inside(&self, p: Coord<f64>, edge: BoxEdge) -> bool {
        match edge {
            BoxEdge::Bottom => p.y > self.env.min_y,
            BoxEdge::Right => p.x < self.env.max_x,
            BoxEdge::Top => p.y < self.env.max_y,
            BoxEdge::Left => p.x > self.env.min_x,
        }
    }

    fn intersection(&self, a: Coord<f64>, b: Coord<f64>, edge: BoxEdge) -> Coord<f64> {
        let e = &self.env;
        match edge {
            BoxEdge::Bottom => Coord { x: line_x_at_y(a, b, e.min_y), y: e.min_y },
            BoxEdge::Right => Coord { x: e.max_x, y: line_y_at_x(a, b, e.max_x) },
            BoxEdge::Top => Coord { x: line_x_at_y(a, b, e.max_y), y: e.max_y },
            BoxEdge::Left => Coord { x: e.min_x, y: line_y_at_x(a, b, e.min_x) },
        }
    }
}

fn line_x_at_y(a: Coord<f64>, b: Coord<f64>, y: f64) -> f64 {
    let m = (b.x - a.x) / (b.y - a.y);
    a.x + (y - a.y) * m
}

fn line_y_at_x(a: Coord<f64>, b: Coord<f64>, x: f64) -> f64 {
    let m = (b.y - a.y) / (b.x - a.x);
    a.y + (x - a.x) * m
}

/// Splits a line into the sections that touch an envelope. Each section
/// keeps the outside vertex on either side of it so that segments crossing
/// the envelope are not shortened.
pub(crate) struct LineLimiter {
    env: Envelope,
    section: Option<Vec<Coord<f64>>>,
    last_outside: Option<Coord<f64>>,
    sections: Vec<Vec<Coord<f64>>>,
}

impl LineLimiter {
    pub fn new(env: Envelope) -> Self {
        Self {
            env,
            section: None,
            last_outside: None,
            sections: Vec::new(),
        }
    }

    pub fn limit(mut self, pts: &[Coord<f64>]) -> Vec<Vec<Coord<f64>>> {
        for &p in pts {
            if self.env.intersects_coord(p) {
                self.add_point(p);
            } else {
                self.add_outside(p);
            }
        }
        self.finish_section();
        self.sections
    }

    fn add_point(&mut self, p: Coord<f64>) {
        self.start_section();
        if let Some(section) = self.section.as_mut() {
            if section.last() != Some(&p) {
                section.push(p);
            }
        }
    }

    fn add_outside(&mut self, p: Coord<f64>) {
        if self.is_last_segment_intersecting(p) {
            if let Some(prev) = self.last_outside {
                self.add_point(prev);
            }
            self.add_point(p);
        } else {
            self.finish_section();
        }
        self.last_outside = Some(p);
    }

    fn is_last_segment_intersecting(&self, p: Coord<f64>) -> bool {
        match self.last_outside {
            // previous point was inside
            None => self.section.is_some(),
            Some(prev) => self.env.intersects_segment(prev, p),
        }
    }

    fn start_section(&mut self) {
        let section = self.section.get_or_insert_with(Vec::new);
        if let Some(prev) = self.last_outside.take() {
            if section.last() != Some(&prev) {
                section.push(prev);
            }
        }
    }

    fn finish_section(&mut self) {
        let Some(mut section) = self.section.take() else {
            return;
        };
        if let Some(prev) = self.last_outside.take() {
            if section.last() != Some(&prev) {
                section.push(prev);
            }
        }
        self.sections.push(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn pts(v: &[(f64, f64)]) -> Vec<Coord<f64>> {
        v.iter().map(|&(x, y)| coord! { x: x, y: y }).collect()
    }

    fn unit_box() -> Envelope {
        Envelope::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })
    }

    #[test]
    fn ring_clipper_cuts_to_box() {
        let ring = pts(&[(-1.0, -1.0), (-1.0, 2.0), (2.0, 2.0), (2.0, -1.0), (-1.0, -1.0)]);
        let out = RingClipper::new(unit_box()).clip(&ring);
        assert_eq!(out.first(), out.last());
        assert!(out.iter().all(|p| unit_box().intersects_coord(*p)));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn ring_clipper_keeps_inside_part() {
        let ring = pts(&[(0.5, 0.5), (0.5, 3.0), (3.0, 3.0), (3.0, 0.5), (0.5, 0.5)]);
        let out = RingClipper::new(unit_box()).clip(&ring);
        assert!(out.contains(&coord! { x: 0.5, y: 0.5 }));
        assert!(out.contains(&coord! { x: 1.0, y: 1.0 }));
        assert_eq!(out.first(), out.last());
    }

    #[test]
    fn ring_clipper_drops_outside_ring() {
        let ring = pts(&[(5.0, 5.0), (5.0, 6.0), (6.0, 6.0), (5.0, 5.0)]);
        assert!(RingClipper::new(unit_box()).clip(&ring).is_empty());
    }

    #[test]
    fn line_limiter_keeps_touching_sections() {
        let line = pts(&[(-5.0, 0.5), (-4.0, 0.5), (0.5, 0.5), (5.0, 0.5), (6.0, 0.5), (6.0, 9.0)]);
        let sections = LineLimiter::new(unit_box()).limit(&line);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0], pts(&[(-4.0, 0.5), (0.5, 0.5), (5.0, 0.5)]));
    }

    #[test]
    fn line_limiter_keeps_crossing_segment() {
        let line = pts(&[(-5.0, 0.5), (5.0, 0.5), (5.0, 9.0)]);
        let sections = LineLimiter::new(unit_box()).limit(&line);
        assert_eq!(sections, vec![pts(&[(-5.0, 0.5), (5.0, 0.5)])]);
    }

    #[test]
    fn safe_env_expansion() {
        let env = Envelope::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 2.0 });
        let floating = safe_env(&env, PrecisionModel::Floating);
        assert!((floating.min_x + 0.2).abs() < 1e-12);
        let flat = Envelope::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 });
        assert!((safe_env(&flat, PrecisionModel::Floating).max_y - 1.0).abs() < 1e-12);
        let fixed = safe_env(&env, PrecisionModel::fixed(10.0));
        assert!((fixed.max_x - 10.3).abs() < 1e-12);
    }
}
