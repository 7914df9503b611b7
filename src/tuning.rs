//! Data-driven car balance
//!
//! Maps (difficulty, weather) to the handful of numbers the integrator reads.
//! Recomputed when a car's difficulty or weather changes, never during a step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::KMH_PER_UNIT;
use crate::error::Error;
use crate::sim::Surface;

/// AI/physics difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "NORMAL" => Ok(Difficulty::Normal),
            "HARD" => Ok(Difficulty::Hard),
            _ => Err(Error::InvalidArgument(format!("unknown difficulty {s:?}"))),
        }
    }
}

/// Weather tag carried by a track and applied to car tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Snow,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Snow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Clear => "CLEAR",
            Weather::Rain => "RAIN",
            Weather::Snow => "SNOW",
        }
    }

    /// Multiplier on steering rate
    pub fn steer_factor(&self) -> f32 {
        match self {
            Weather::Clear => 1.0,
            Weather::Rain => 0.6,
            Weather::Snow => 0.4,
        }
    }

    /// Whether the lateral ice wobble is active
    pub fn has_wobble(&self) -> bool {
        matches!(self, Weather::Snow)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLEAR" => Ok(Weather::Clear),
            "RAIN" => Ok(Weather::Rain),
            "SNOW" => Ok(Weather::Snow),
            _ => Err(Error::InvalidArgument(format!("unknown weather tag {s:?}"))),
        }
    }
}

/// One value per driving surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerSurface {
    pub asphalt: f32,
    pub grass: f32,
    pub offroad: f32,
}

impl PerSurface {
    #[inline]
    pub fn get(&self, surface: Surface) -> f32 {
        match surface {
            Surface::Asphalt => self.asphalt,
            Surface::Grass => self.grass,
            Surface::Offroad => self.offroad,
        }
    }

    fn scaled(self, asphalt: f32, grass: f32, offroad: f32) -> Self {
        Self {
            asphalt: self.asphalt * asphalt,
            grass: self.grass * grass,
            offroad: self.offroad * offroad,
        }
    }
}

/// Resolved car parameters for one (difficulty, weather) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTuning {
    pub difficulty: Difficulty,
    pub weather: Weather,
    /// Forward acceleration at full throttle (units/s²)
    pub engine_force: f32,
    /// Per-60fps-frame decay of forward speed
    pub drag: f32,
    /// Base turn rate (rad/s at zero speed)
    pub steer_rate: f32,
    /// Top speed per surface (km/h)
    pub speed_cap_kmh: PerSurface,
    /// Per-60fps-frame retention of sideways speed (closer to 1.0 = more slide)
    pub grip: PerSurface,
}

impl Default for CarTuning {
    fn default() -> Self {
        Self::for_conditions(Difficulty::default(), Weather::default())
    }
}

impl CarTuning {
    /// Build the tuning table entry for the given conditions
    pub fn for_conditions(difficulty: Difficulty, weather: Weather) -> Self {
        // NORMAL / CLEAR baseline
        let mut engine_force = 280.0;
        let mut drag = 0.988;
        let mut steer_rate = 2.4;
        let mut speed_cap_kmh = PerSurface {
            asphalt: 120.0,
            grass: 45.0,
            offroad: 25.0,
        };
        let mut grip = PerSurface {
            asphalt: 0.90,
            grass: 0.94,
            offroad: 0.97,
        };

        match difficulty {
            Difficulty::Easy => {
                engine_force *= 0.90;
                steer_rate *= 1.10;
                speed_cap_kmh = speed_cap_kmh.scaled(0.85, 0.85, 0.85);
            }
            Difficulty::Normal => {}
            Difficulty::Hard => {
                engine_force *= 1.20;
                drag = 0.990;
                steer_rate *= 0.95;
                speed_cap_kmh = speed_cap_kmh.scaled(1.15, 1.10, 1.0);
            }
        }

        match weather {
            Weather::Clear => {}
            Weather::Rain => {
                engine_force *= 0.85;
                speed_cap_kmh = speed_cap_kmh.scaled(0.70, 0.85, 0.90);
                grip.asphalt = 0.96;
                grip.grass = 0.975;
            }
            Weather::Snow => {
                engine_force *= 0.70;
                speed_cap_kmh = speed_cap_kmh.scaled(0.55, 0.70, 0.80);
                grip.asphalt = 0.985;
                grip.grass = 0.99;
                grip.offroad = 0.99;
            }
        }

        Self {
            difficulty,
            weather,
            engine_force,
            drag,
            steer_rate,
            speed_cap_kmh,
            grip,
        }
    }

    /// Surface cap converted to simulation units/s
    #[inline]
    pub fn speed_cap(&self, surface: Surface) -> f32 {
        self.speed_cap_kmh.get(surface) / KMH_PER_UNIT
    }

    #[inline]
    pub fn grip(&self, surface: Surface) -> f32 {
        self.grip.get(surface)
    }
}
