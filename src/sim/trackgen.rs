//! Procedural circuit generation
//!
//! Pipeline: noisy control ring -> Chaikin smoothing -> dense Catmull-Rom
//! centerline -> pinch-guarded boundary offsets -> orientation check ->
//! racing line -> checkpoints. Deterministic for a given seed.

use std::f32::consts::PI;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::point_in_polygon;
use super::spline::{catmull_rom_loop, chaikin_loop};
use super::track::{Checkpoint, TrackDescriptor};
use crate::consts::*;
use crate::error::Result;
use crate::heading;
use crate::tuning::Weather;

const EPS: f32 = 1e-9;

/// Inputs to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Requested asphalt width (world units)
    pub width: f32,
    /// Number of control points; more points, more corners
    pub complexity: u32,
    /// Fixed seed for reproducible tracks, `None` for a fresh one
    pub seed: Option<u64>,
    pub weather: Weather,
    pub checkpoint_count: usize,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            complexity: DEFAULT_COMPLEXITY,
            seed: None,
            weather: Weather::Clear,
            checkpoint_count: DEFAULT_CHECKPOINTS,
        }
    }
}

impl TrackParams {
    pub fn new(width: f32, complexity: u32, seed: Option<u64>, weather: Weather) -> Self {
        Self {
            width,
            complexity,
            seed,
            weather,
            ..Default::default()
        }
    }

    /// Clamp out-of-range inputs instead of rejecting them
    fn sanitized(&self) -> Self {
        let mut p = self.clone();
        if !p.width.is_finite() || p.width <= 0.0 {
            log::warn!("Track width {} unusable, using {}", p.width, DEFAULT_WIDTH);
            p.width = DEFAULT_WIDTH;
        }
        if p.complexity < MIN_COMPLEXITY {
            log::warn!("Complexity {} raised to {}", p.complexity, MIN_COMPLEXITY);
            p.complexity = MIN_COMPLEXITY;
        } else if p.complexity > MAX_COMPLEXITY {
            log::warn!("Complexity {} lowered to {}", p.complexity, MAX_COMPLEXITY);
            p.complexity = MAX_COMPLEXITY;
        }
        if p.checkpoint_count == 0 {
            log::warn!("Checkpoint count 0 replaced with {}", DEFAULT_CHECKPOINTS);
            p.checkpoint_count = DEFAULT_CHECKPOINTS;
        }
        p
    }
}

/// Generate a track from the four headline parameters
pub fn generate(width: f32, complexity: u32, seed: Option<u64>, weather: Weather) -> TrackDescriptor {
    generate_from(&TrackParams::new(width, complexity, seed, weather))
}

/// Generate with a weather tag given as text ("CLEAR", "RAIN", "SNOW")
///
/// Unknown tags fail with `Error::InvalidArgument`.
pub fn generate_tagged(
    width: f32,
    complexity: u32,
    seed: Option<u64>,
    weather_tag: &str,
) -> Result<TrackDescriptor> {
    let weather = weather_tag.parse::<Weather>()?;
    Ok(generate(width, complexity, seed, weather))
}

/// Generate from params, seeding from `params.seed` or from ambient entropy
pub fn generate_from(params: &TrackParams) -> TrackDescriptor {
    let mut rng = match params.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    generate_with_rng(params, &mut rng)
}

/// Generate using a caller-supplied random source
///
/// The descriptor's `seed` is copied from `params`; the caller is responsible
/// for keeping it consistent with `rng`.
pub fn generate_with_rng<R: Rng>(params: &TrackParams, rng: &mut R) -> TrackDescriptor {
    let params = params.sanitized();
    let n_ctrl = params.complexity as usize;

    // 1) Rough ring of noisy control points
    let controls = control_ring(n_ctrl, rng);

    // 2) Corner cutting, more passes for busier tracks
    let passes = smoothing_passes(params.complexity);
    let smoothed = chaikin_loop(&controls, passes);

    // 3) Dense centerline
    let centerline = catmull_rom_loop(&smoothed, 8 * n_ctrl);

    // 4) Shrink width on tight/wide tracks
    let width = effective_width(params.width, params.complexity);

    // 5) Boundaries with pinch guard
    let (mut inner, mut outer) = offset_boundaries(&centerline, width);

    // 6) Orientation check
    if !inner_contained(&inner, &outer) {
        std::mem::swap(&mut inner, &mut outer);
        log::info!("Swapped inner/outer boundaries after orientation check");
        if !inner_contained(&inner, &outer) {
            log::warn!("Inner boundary still escapes outer boundary after swap");
        }
    }

    // 7) Racing line
    let racing_line = racing_line(&centerline, &inner, &outer);

    // 8) Checkpoints, at most one per centerline point
    let mut checkpoint_count = params.checkpoint_count;
    if checkpoint_count > centerline.len() {
        log::warn!(
            "Checkpoint count {} lowered to {}",
            checkpoint_count,
            centerline.len()
        );
        checkpoint_count = centerline.len();
    }
    let checkpoints = checkpoints(&centerline, checkpoint_count);

    let start_pos = centerline[0];
    let start_angle = heading(centerline[0], centerline[1]);

    log::debug!(
        "Generated track: controls={}, passes={}, points={}, width {} -> {}, seed={:?}, weather={}",
        n_ctrl,
        passes,
        centerline.len(),
        params.width,
        width,
        params.seed,
        params.weather
    );

    TrackDescriptor {
        centerline,
        inner_boundary: inner,
        outer_boundary: outer,
        racing_line,
        checkpoints,
        start_pos,
        start_angle,
        width,
        seed: params.seed,
        weather_tag: params.weather,
    }
}

/// Control points jittered in angle and radius around the base circle
fn control_ring<R: Rng>(n: usize, rng: &mut R) -> Vec<Vec2> {
    let center = Vec2::new(TRACK_CENTER.0, TRACK_CENTER.1);
    let jitter = angle_jitter(n);
    (0..n)
        .map(|i| {
            let a = std::f32::consts::TAU * i as f32 / n as f32 + rng.random_range(-jitter..=jitter);
            let r = TRACK_BASE_RADIUS * rng.random_range(CONTROL_RADIUS_MIN..=CONTROL_RADIUS_MAX);
            center + Vec2::new(a.cos(), a.sin()) * r
        })
        .collect()
}

/// Largest angular offset a control point may take from its slot
pub fn angle_jitter(n: usize) -> f32 {
    let spacing = std::f32::consts::TAU / n.max(1) as f32;
    CONTROL_ANGLE_JITTER.min(CONTROL_JITTER_SPACING_FRACTION * spacing)
}

/// Chaikin passes for a given complexity
pub fn smoothing_passes(complexity: u32) -> u32 {
    if complexity >= 20 {
        4
    } else if complexity >= 14 {
        3
    } else {
        2
    }
}

/// Width actually used for geometry
pub fn effective_width(width: f32, complexity: u32) -> f32 {
    let mut w = width;
    if complexity >= 14 {
        w *= 0.9;
    }
    if complexity >= 18 {
        w *= 0.8;
    }
    if width >= 70.0 {
        w *= 0.9;
    }
    w
}

/// Fraction of half-width kept at a corner with the given turn angle
///
/// `turn` is 0 on a straight and π on a hairpin; `width_scale` is 0..1.
pub fn pinch_factor(turn: f32, width_scale: f32) -> f32 {
    (1.0 - turn / PI * PINCH_CURVATURE_GAIN * width_scale).clamp(PINCH_FLOOR, 1.0)
}

/// Angle between consecutive edge vectors (0 = straight, π = U-turn)
fn turn_angle(v1: Vec2, v2: Vec2) -> f32 {
    let l1 = v1.length();
    let l2 = v2.length();
    if l1 <= EPS || l2 <= EPS {
        return 0.0;
    }
    (v1.dot(v2) / (l1 * l2)).clamp(-1.0, 1.0).acos()
}

/// Offset both boundaries along the left-hand normal of each centerline point
fn offset_boundaries(center: &[Vec2], width: f32) -> (Vec<Vec2>, Vec<Vec2>) {
    let n = center.len();
    let half = width / 2.0;
    let width_scale = (width / PINCH_FULL_WIDTH).min(1.0);

    let mut inner = Vec::with_capacity(n);
    let mut outer = Vec::with_capacity(n);
    for i in 0..n {
        let prev = center[(i + n - 1) % n];
        let p = center[i];
        let next = center[(i + 1) % n];

        let tangent = (next - prev)
            .try_normalize()
            .or_else(|| (p - prev).try_normalize())
            .unwrap_or(Vec2::X);
        let normal = tangent.perp();

        let pinch = pinch_factor(turn_angle(p - prev, next - p), width_scale);
        let offset = normal * half * pinch;

        // Left normal faces the infield on a counter-clockwise loop
        inner.push(p + offset);
        outer.push(p - offset);
    }
    (inner, outer)
}

/// Stride used when sampling the inner boundary for the containment check
pub fn containment_stride(len: usize) -> usize {
    (len / 12).max(1)
}

fn inner_contained(inner: &[Vec2], outer: &[Vec2]) -> bool {
    if inner.is_empty() || outer.is_empty() {
        return true;
    }
    inner
        .iter()
        .step_by(containment_stride(inner.len()))
        .all(|p| point_in_polygon(*p, outer))
}

/// Curvature-biased reference line between the boundaries
fn racing_line(center: &[Vec2], inner: &[Vec2], outer: &[Vec2]) -> Vec<Vec2> {
    let n = center.len();
    (0..n)
        .map(|i| {
            let p0 = center[(i + n - 1) % n];
            let p1 = center[i];
            let p2 = center[(i + 1) % n];
            let v1 = p1 - p0;
            let v2 = p2 - p1;
            let l1 = nonzero(v1.length());
            let l2 = nonzero(v2.length());
            let curv = v1.perp_dot(v2) / (l1 * l2);
            let bias = (curv.abs() * RACING_LINE_GAIN).min(RACING_LINE_MAX_BIAS);
            let target = if curv > 0.0 { inner[i] } else { outer[i] };
            p1.lerp(target, bias)
        })
        .collect()
}

#[inline]
fn nonzero(len: f32) -> f32 {
    if len <= EPS { 1.0 } else { len }
}

/// Evenly spaced checkpoints; checkpoint 0 is the start point
fn checkpoints(center: &[Vec2], count: usize) -> Vec<Checkpoint> {
    let n = center.len();
    if n == 0 {
        return Vec::new();
    }
    let step = (n / count).max(1);
    (0..count)
        .map(|i| {
            let idx = (i * step) % n;
            let next = (idx + 1) % n;
            Checkpoint {
                position: center[idx],
                direction: (center[next] - center[idx]).try_normalize().unwrap_or(Vec2::X),
                index: i,
                passed: false,
            }
        })
        .collect()
}
