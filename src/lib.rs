//! Slipstream - A top-down racer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, vehicle dynamics, geometry)
//! - `tuning`: Difficulty/weather balance tables
//! - `settings`: Race configuration
//! - `persistence`: Track files on disk

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use settings::RaceSettings;
pub use tuning::{CarTuning, Difficulty, Weather};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed frame step for headless drivers (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Max frames to catch up per loop iteration
    pub const MAX_FRAMES_PER_UPDATE: u32 = 8;
    /// Largest physics substep (240 Hz) to keep fast cars from tunneling through walls
    pub const MAX_SUB_DT: f32 = 1.0 / 240.0;
    /// Frame rate the per-frame decay factors were tuned at
    pub const DRAG_REFERENCE_FPS: f32 = 60.0;
    /// HUD conversion: 1 world unit/s reads as 0.36 km/h
    pub const KMH_PER_UNIT: f32 = 0.36;

    /// Car collision/render rectangle
    pub const CAR_WIDTH: f32 = 20.0;
    pub const CAR_HEIGHT: f32 = 34.0;
    /// Soft overall speed clamp (units/s); surface caps are the real limit
    pub const CAR_SOFT_MAX_SPEED: f32 = 1800.0;

    /// Engine force multiplier while the handbrake is held
    pub const HANDBRAKE_FACTOR: f32 = 0.3;
    /// Reverse acceleration relative to forward
    pub const REVERSE_ACCEL_FACTOR: f32 = 0.5;
    /// Braking deceleration relative to forward acceleration
    pub const BRAKE_FACTOR: f32 = 2.5;
    /// |throttle| below this is treated as no throttle
    pub const THROTTLE_DEAD_ZONE: f32 = 0.05;
    /// |forward speed| below this counts as stopped (units/s)
    pub const MOTION_DEAD_BAND: f32 = 1.0;

    /// Steering loses effectiveness as speed rises: 1 / (1 + v / scale)
    pub const STEER_SPEED_SCALE: f32 = 350.0;
    pub const GRASS_STEER_FACTOR: f32 = 0.7;

    /// Snow wobble kicks in above this speed (units/s)
    pub const SNOW_WOBBLE_MIN_SPEED: f32 = 60.0;
    /// Lateral kick per 60 fps frame, as a fraction of speed
    pub const SNOW_WOBBLE_STRENGTH: f32 = 0.02;

    /// Outer wall response
    pub const WALL_MARGIN: f32 = 3.0;
    pub const WALL_RESTITUTION: f32 = 0.1;
    pub const WALL_DAMPING: f32 = 0.72;
    pub const WALL_MIN_SLIDE_SPEED: f32 = 70.0;

    /// Track generation
    pub const TRACK_CENTER: (f32, f32) = (600.0, 400.0);
    pub const TRACK_BASE_RADIUS: f32 = 260.0;
    pub const CONTROL_ANGLE_JITTER: f32 = 0.18;
    /// Angular jitter never exceeds this fraction of the control spacing,
    /// so neighbouring controls keep their order around the loop
    pub const CONTROL_JITTER_SPACING_FRACTION: f32 = 0.35;
    pub const CONTROL_RADIUS_MIN: f32 = 0.80;
    pub const CONTROL_RADIUS_MAX: f32 = 1.20;
    pub const MIN_COMPLEXITY: u32 = 6;
    pub const MAX_COMPLEXITY: u32 = 32;
    pub const DEFAULT_WIDTH: f32 = 50.0;
    pub const DEFAULT_COMPLEXITY: u32 = 10;
    pub const DEFAULT_CHECKPOINTS: usize = 8;
    /// Pinch guard: corridor never shrinks below this fraction of half-width
    pub const PINCH_FLOOR: f32 = 0.40;
    pub const PINCH_CURVATURE_GAIN: f32 = 1.2;
    /// Width at which the pinch guard reaches full strength
    pub const PINCH_FULL_WIDTH: f32 = 60.0;
    /// Racing line bias: gain on signed curvature, and max fraction toward a boundary
    pub const RACING_LINE_GAIN: f32 = 8.0;
    pub const RACING_LINE_MAX_BIAS: f32 = 0.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Heading (radians) of the vector from `from` to `to`
#[inline]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for a heading
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_heading_matches_direction() {
        let a = heading(Vec2::ZERO, Vec2::new(0.0, 2.0));
        assert!((a - PI / 2.0).abs() < 1e-6);
        assert!((direction(a) - Vec2::Y).length() < 1e-6);
    }
}
