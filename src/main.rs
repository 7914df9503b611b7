//! Slipstream headless driver
//!
//! Generates a circuit from settings, drops a car on the grid and lets a
//! simple centerline-following autopilot drive it for a few laps.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use slipstream::consts::*;
use slipstream::persistence::{self, TrackFile};
use slipstream::sim::{Car, TrackDescriptor, generate_from};
use slipstream::{RaceSettings, heading, normalize_angle};

/// How far ahead along the centerline the autopilot aims
const LOOKAHEAD_POINTS: usize = 12;

#[derive(Parser, Debug)]
#[command(name = "slipstream", version, about = "Generate a circuit and drive it headless")]
struct Args {
    /// Race settings JSON (defaults when omitted or unreadable)
    settings: Option<PathBuf>,

    /// Write the generated track to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Simulated time limit in seconds (default: one minute per lap)
    #[arg(long, value_parser = positive_seconds)]
    seconds: Option<f32>,
}

fn positive_seconds(s: &str) -> Result<f32, String> {
    let secs: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if secs.is_finite() && secs > 0.0 {
        Ok(secs)
    } else {
        Err(format!("expected a positive number of seconds, got {s}"))
    }
}

/// Counts checkpoints passed in order
struct LapCounter {
    next: usize,
    laps: u32,
}

impl LapCounter {
    fn new() -> Self {
        // Cars start on checkpoint 0
        Self { next: 1, laps: 0 }
    }

    /// Returns true when a lap was just completed
    fn update(&mut self, track: &mut TrackDescriptor, pos: Vec2) -> bool {
        let count = track.checkpoints.len();
        if count == 0 {
            return false;
        }
        let radius = track.width.max(20.0);
        let cp = &mut track.checkpoints[self.next % count];
        if cp.position.distance(pos) > radius {
            return false;
        }
        cp.passed = true;
        log::debug!("Checkpoint {} passed", cp.index);
        let crossed_start = cp.index == 0;
        self.next = (cp.index + 1) % count;
        if crossed_start {
            self.laps += 1;
            for cp in &mut track.checkpoints {
                cp.passed = false;
            }
            return true;
        }
        false
    }
}

/// Steer toward a centerline point a little ahead of the car
fn autopilot(car: &mut Car, track: &TrackDescriptor) {
    let Some(i) = track.nearest_centerline_index(car.pos) else {
        car.set_input(0.0, 0.0, false);
        return;
    };
    let target = track.centerline[(i + LOOKAHEAD_POINTS) % track.len()];
    let error = normalize_angle(heading(car.pos, target) - car.angle);
    let steering = (error * 2.5).clamp(-1.0, 1.0);
    // Lift in tight corners
    let throttle = if error.abs() > 0.6 { 0.35 } else { 1.0 };
    car.set_input(throttle, steering, false);
}

fn run(args: Args) -> slipstream::Result<()> {
    let settings = match &args.settings {
        Some(path) => RaceSettings::load(path),
        None => RaceSettings::default(),
    };
    log::info!(
        "Conditions: {} / {}, width {}, complexity {}",
        settings.difficulty,
        settings.weather,
        settings.track_width,
        settings.complexity
    );

    let mut track = generate_from(&settings.track_params());
    log::info!(
        "Generated track: {} points, width {:.1}, seed {:?}",
        track.len(),
        track.width,
        track.seed
    );

    if let Some(path) = &args.export {
        let file = TrackFile::new(track.clone(), settings.track_name.clone());
        persistence::save_track(path, &file)?;
    }

    let (slot, _) = track.grid_positions();
    let mut car = match track.seed {
        Some(seed) => Car::with_seed(slot, track.start_angle, seed),
        None => Car::new(slot, track.start_angle),
    };
    settings.apply_to(&mut car);

    let mut laps = LapCounter::new();
    let time_limit = args.seconds.unwrap_or(60.0 * settings.laps.max(1) as f32);

    // Uneven frame times, like a real display loop
    let frame_times = [1.0 / 50.0, 1.0 / 75.0, 1.0 / 60.0, 1.0 / 30.0];
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut frame = 0usize;
    let mut top_speed: f32 = 0.0;
    let mut next_report = 1.0;

    while elapsed < time_limit && laps.laps < settings.laps {
        let dt = frame_times[frame % frame_times.len()];
        frame += 1;
        accumulator += dt;

        let mut steps = 0;
        while accumulator >= SIM_DT && steps < MAX_FRAMES_PER_UPDATE {
            autopilot(&mut car, &track);
            car.update(SIM_DT, &track);
            accumulator -= SIM_DT;
            elapsed += SIM_DT;
            steps += 1;

            top_speed = top_speed.max(car.speed_kmh());
            if laps.update(&mut track, car.pos) {
                log::info!("Lap {} complete at {:.2}s", laps.laps, elapsed);
            }
        }

        if elapsed >= next_report {
            next_report += 1.0;
            log::debug!(
                "t={:.1}s pos=({:.0}, {:.0}) {:.0} km/h {} rpm on {:?}",
                elapsed,
                car.pos.x,
                car.pos.y,
                car.speed_kmh(),
                car.rpm(),
                car.surface()
            );
        }
    }

    log::info!(
        "Finished: {} lap(s) in {:.2}s, top speed {:.0} km/h",
        laps.laps,
        elapsed,
        top_speed
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    log::info!("Slipstream (headless) starting...");

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_all_options() {
        let args = Args::try_parse_from([
            "slipstream",
            "race.json",
            "--export",
            "track.json",
            "--seconds",
            "12.5",
        ])
        .unwrap();
        assert_eq!(args.settings, Some(PathBuf::from("race.json")));
        assert_eq!(args.export, Some(PathBuf::from("track.json")));
        assert_eq!(args.seconds, Some(12.5));

        let args = Args::try_parse_from(["slipstream"]).unwrap();
        assert!(args.settings.is_none() && args.export.is_none() && args.seconds.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_seconds() {
        for bad in ["0", "-3", "inf", "NaN", "soon"] {
            assert!(
                Args::try_parse_from(["slipstream", "--seconds", bad]).is_err(),
                "{bad}"
            );
        }
        assert!(Args::try_parse_from(["slipstream", "--export"]).is_err());
    }
}
