//! Top-down car with substep integration
//!
//! Each frame is split into substeps of at most `MAX_SUB_DT`. A substep
//! classifies the surface, splits velocity into forward/sideways parts, runs
//! the throttle/brake/reverse logic, applies drag and grip, enforces the
//! surface speed cap, steers, integrates, and finally resolves the outer wall.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry;
use super::track::{Surface, TrackDescriptor};
use crate::consts::*;
use crate::direction;
use crate::tuning::{CarTuning, Difficulty, Weather};

/// Direction of travel along the car's heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Stopped,
    Forward,
    Backward,
}

impl Motion {
    /// Classify a forward speed with a small dead-band around zero
    pub fn from_forward_speed(v_fwd: f32) -> Self {
        if v_fwd > MOTION_DEAD_BAND {
            Motion::Forward
        } else if v_fwd < -MOTION_DEAD_BAND {
            Motion::Backward
        } else {
            Motion::Stopped
        }
    }
}

/// A single vehicle
///
/// Pose and velocity are public for observers; control inputs are only
/// changed through `set_input` so they stay clamped.
#[derive(Debug, Clone)]
pub struct Car {
    /// World position
    pub pos: Vec2,
    /// Heading (radians); 0 faces +x
    pub angle: f32,
    /// World-frame velocity (units/s)
    pub vel: Vec2,
    /// Collision/render rectangle
    pub width: f32,
    pub height: f32,
    /// Soft overall clamp on forward speed
    pub max_speed: f32,
    throttle: f32,
    steering: f32,
    handbrake: bool,
    tuning: CarTuning,
    surface: Surface,
    /// Source for the snow wobble
    rng: Pcg32,
}

impl Car {
    /// Car at rest with NORMAL/CLEAR tuning and an unseeded wobble source
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self::with_rng(pos, angle, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Car whose stochastic effects replay identically for a given seed
    pub fn with_seed(pos: Vec2, angle: f32, seed: u64) -> Self {
        Self::with_rng(pos, angle, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(pos: Vec2, angle: f32, rng: Pcg32) -> Self {
        Self {
            pos,
            angle,
            vel: Vec2::ZERO,
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
            max_speed: CAR_SOFT_MAX_SPEED,
            throttle: 0.0,
            steering: 0.0,
            handbrake: false,
            tuning: CarTuning::default(),
            surface: Surface::Asphalt,
            rng,
        }
    }

    // ---------------- input / lifecycle ----------------

    /// Set this frame's controls; throttle and steering are clamped to [-1, 1]
    pub fn set_input(&mut self, throttle: f32, steering: f32, handbrake: bool) {
        self.throttle = clamp_unit(throttle);
        self.steering = clamp_unit(steering);
        self.handbrake = handbrake;
    }

    /// Reposition and zero velocity and inputs
    pub fn reset(&mut self, pos: Vec2, angle: f32) {
        self.pos = pos;
        self.angle = angle;
        self.vel = Vec2::ZERO;
        self.throttle = 0.0;
        self.steering = 0.0;
        self.handbrake = false;
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.tuning = CarTuning::for_conditions(difficulty, self.tuning.weather);
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.tuning = CarTuning::for_conditions(self.tuning.difficulty, weather);
    }

    pub fn tuning(&self) -> &CarTuning {
        &self.tuning
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn steering(&self) -> f32 {
        self.steering
    }

    pub fn handbrake(&self) -> bool {
        self.handbrake
    }

    /// Surface seen by the most recent substep
    pub fn surface(&self) -> Surface {
        self.surface
    }

    // ---------------- frame helpers ----------------

    /// Unit vector along the heading
    #[inline]
    pub fn forward(&self) -> Vec2 {
        direction(self.angle)
    }

    /// Speed along the heading (negative when reversing)
    pub fn forward_speed(&self) -> f32 {
        self.vel.dot(self.forward())
    }

    /// Sideways slip speed
    pub fn lateral_speed(&self) -> f32 {
        self.vel.dot(self.forward().perp())
    }

    pub fn motion(&self) -> Motion {
        Motion::from_forward_speed(self.forward_speed())
    }

    // ---------------- integration ----------------

    /// Advance the car by `dt` seconds against `track`
    ///
    /// Non-positive or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32, track: &TrackDescriptor) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let steps = ((dt / MAX_SUB_DT).ceil() as usize).max(1);
        let sub_dt = dt / steps as f32;
        for _ in 0..steps {
            self.substep(sub_dt, track);
        }
    }

    fn substep(&mut self, dt: f32, track: &TrackDescriptor) {
        // Per-frame factors were tuned at 60 fps
        let frames = dt * DRAG_REFERENCE_FPS;

        let surface = track.surface_at(self.pos);
        self.surface = surface;

        let fwd = self.forward();
        let side = fwd.perp();
        let mut v_fwd = self.vel.dot(fwd);
        let mut v_side = self.vel.dot(side);

        v_fwd = self
            .longitudinal(v_fwd, dt)
            .clamp(-self.max_speed, self.max_speed);

        v_fwd *= self.tuning.drag.powf(frames);

        v_side *= self.tuning.grip(surface).powf(frames);
        if self.tuning.weather.has_wobble() {
            let speed = v_fwd.hypot(v_side);
            if speed > SNOW_WOBBLE_MIN_SPEED {
                let kick: f32 = self.rng.random_range(-1.0..=1.0);
                v_side += kick * speed * SNOW_WOBBLE_STRENGTH * frames;
            }
        }

        // Authoritative top speed
        let cap = self.tuning.speed_cap(surface);
        let speed = v_fwd.hypot(v_side);
        if speed > cap {
            let k = cap / speed;
            v_fwd *= k;
            v_side *= k;
        }

        let surface_mod = if surface == Surface::Grass {
            GRASS_STEER_FACTOR
        } else {
            1.0
        };
        let turn_rate = self.tuning.steer_rate
            * steer_speed_factor(v_fwd)
            * surface_mod
            * self.tuning.weather.steer_factor();
        self.angle += turn_rate * self.steering * dt;

        // Recompose in the pre-steer frame; the heading change shows up as slip next substep
        self.vel = fwd * v_fwd + side * v_side;
        self.pos += self.vel * dt;

        self.resolve_outer_wall(track);
    }

    /// Throttle/brake/reverse logic on the forward speed
    fn longitudinal(&self, v_fwd: f32, dt: f32) -> f32 {
        let throttle = if self.throttle.abs() < THROTTLE_DEAD_ZONE {
            0.0
        } else {
            self.throttle
        };
        if throttle == 0.0 {
            return v_fwd;
        }

        let mut engine = self.tuning.engine_force;
        if self.handbrake {
            engine *= HANDBRAKE_FACTOR;
        }
        let accel = engine * throttle * dt;

        match (Motion::from_forward_speed(v_fwd), throttle > 0.0) {
            (Motion::Stopped, true) | (Motion::Forward, true) => v_fwd + accel,
            (Motion::Stopped, false) | (Motion::Backward, false) => {
                v_fwd + accel * REVERSE_ACCEL_FACTOR
            }
            // Braking never flips direction within a substep
            (Motion::Forward, false) => (v_fwd + accel * BRAKE_FACTOR).max(0.0),
            (Motion::Backward, true) => (v_fwd + accel * BRAKE_FACTOR).min(0.0),
        }
    }

    /// Push the car back inside the outer wall and bounce/slide its velocity
    fn resolve_outer_wall(&mut self, track: &TrackDescriptor) {
        if track.inside_outer(self.pos) {
            return;
        }
        let Some(hit) = track.nearest_outer_wall(self.pos) else {
            return;
        };

        // hit.normal points from the wall out toward the car
        let n = hit.normal;
        let t = n.perp();
        self.pos = hit.point - n * WALL_MARGIN;

        let mut vel = self.vel;
        if vel.dot(n) > 0.0 {
            vel = geometry::reflect(vel, n, WALL_RESTITUTION);
        }
        let vn = vel.dot(n);
        let mut vt = vel.dot(t) * WALL_DAMPING;
        if vt.abs() < WALL_MIN_SLIDE_SPEED {
            vt = if vt >= 0.0 {
                WALL_MIN_SLIDE_SPEED
            } else {
                -WALL_MIN_SLIDE_SPEED
            };
        }
        self.vel = n * vn * WALL_DAMPING + t * vt;

        log::trace!(
            "Wall contact at ({:.1}, {:.1}) edge {} depth {:.2}",
            hit.point.x,
            hit.point.y,
            hit.edge,
            hit.distance
        );
    }

    // ---------------- readouts ----------------

    /// World-space corners of the car rectangle, nose along the heading
    pub fn corners(&self) -> [Vec2; 4] {
        // Sprite is drawn nose-up, so the rectangle's long axis is rotated onto the heading
        let a = self.angle - std::f32::consts::FRAC_PI_2;
        let (s, c) = a.sin_cos();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|d| self.pos + Vec2::new(c * d.x - s * d.y, s * d.x + c * d.y))
    }

    /// HUD speed
    pub fn speed_kmh(&self) -> f32 {
        self.vel.length() * KMH_PER_UNIT
    }

    /// HUD tachometer, 1000 at rest to 7000 at the asphalt cap
    pub fn rpm(&self) -> u32 {
        let cap = self.tuning.speed_cap(Surface::Asphalt).max(1.0);
        let ratio = (self.vel.length() / cap).clamp(0.0, 1.0);
        (1000.0 + ratio * 6000.0) as u32
    }
}

/// Turning effectiveness falls off with forward speed
#[inline]
pub fn steer_speed_factor(v_fwd: f32) -> f32 {
    1.0 / (1.0 + v_fwd.abs() / STEER_SPEED_SCALE)
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}
