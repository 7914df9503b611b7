//! Race settings and preferences
//!
//! Persisted as a small JSON file next to the executable (or wherever the
//! caller points). Missing or unreadable files fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CHECKPOINTS, DEFAULT_COMPLEXITY, DEFAULT_WIDTH};
use crate::error::Result;
use crate::sim::{Car, TrackParams};
use crate::tuning::{CarTuning, Difficulty, Weather};

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    // === Conditions ===
    pub difficulty: Difficulty,
    pub weather: Weather,

    // === Track ===
    /// Requested corridor width (the generator may narrow it)
    pub track_width: f32,
    /// Number of control points around the loop
    pub complexity: u32,
    pub checkpoint_count: usize,
    /// Fixed seed for a repeatable circuit; `None` rolls a new one
    pub seed: Option<u64>,
    /// Display name for saved tracks
    pub track_name: Option<String>,

    // === Session ===
    pub laps: u32,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            weather: Weather::Clear,

            track_width: DEFAULT_WIDTH,
            complexity: DEFAULT_COMPLEXITY,
            checkpoint_count: DEFAULT_CHECKPOINTS,
            seed: None,
            track_name: None,

            laps: 3,
        }
    }
}

impl RaceSettings {
    /// Generator parameters for these settings
    pub fn track_params(&self) -> TrackParams {
        TrackParams {
            width: self.track_width,
            complexity: self.complexity,
            seed: self.seed,
            weather: self.weather,
            checkpoint_count: self.checkpoint_count,
        }
    }

    /// Car tuning for the configured conditions
    pub fn tuning(&self) -> CarTuning {
        CarTuning::for_conditions(self.difficulty, self.weather)
    }

    /// Push difficulty and weather onto a car
    pub fn apply_to(&self, car: &mut Car) {
        car.set_difficulty(self.difficulty);
        car.set_weather(self.weather);
    }

    /// Load settings from a JSON file, or defaults if that fails
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file, surfacing any error
    pub fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
