//! Track files on disk
//!
//! Features:
//! - Versioned JSON envelope around a `TrackDescriptor`
//! - Atomic-ish writes (tmp file, then rename)
//! - Loads bare descriptors and the legacy snake_case layout too

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::TrackDescriptor;

/// Current envelope version
pub const TRACK_FILE_VERSION: u32 = 1;

/// A saved track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFile {
    pub version: u32,
    /// Display name, if the track has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub track: TrackDescriptor,
}

impl TrackFile {
    pub fn new(track: TrackDescriptor, name: Option<String>) -> Self {
        Self {
            version: TRACK_FILE_VERSION,
            name,
            track,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyTrackFile {
    Envelope(TrackFile),
    Bare(TrackDescriptor),
}

/// Serialize a track (pretty-printed, human-readable)
pub fn to_json(file: &TrackFile) -> Result<String> {
    Ok(serde_json::to_string_pretty(file)?)
}

/// Parse an envelope or a bare descriptor
pub fn from_json(json: &str) -> Result<TrackFile> {
    let file = match serde_json::from_str::<AnyTrackFile>(json)? {
        AnyTrackFile::Envelope(file) => file,
        AnyTrackFile::Bare(track) => TrackFile::new(track, None),
    };
    if file.version > TRACK_FILE_VERSION {
        return Err(Error::InvalidArgument(format!(
            "track file version {} is newer than supported {}",
            file.version, TRACK_FILE_VERSION
        )));
    }
    Ok(file)
}

/// Write a track file, replacing any existing one
pub fn save_track(path: &Path, file: &TrackFile) -> Result<()> {
    let json = to_json(file)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    log::info!("Track saved to {}", path.display());
    Ok(())
}

/// Read a track file
pub fn load_track(path: &Path) -> Result<TrackFile> {
    let json = fs::read_to_string(path)?;
    let file = from_json(&json)?;
    log::info!(
        "Track loaded from {} ({} points)",
        path.display(),
        file.track.len()
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generate;
    use crate::tuning::Weather;
    use glam::Vec2;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("slipstream-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_save_and_load() {
        let track = generate(48.0, 11, Some(3331), Weather::Rain);
        let file = TrackFile::new(track, Some("City Circuit".into()));
        let path = scratch_path("save-load");

        save_track(&path, &file).unwrap();
        let loaded = load_track(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.name.as_deref(), Some("City Circuit"));
        assert_eq!(loaded.track.seed, Some(3331));
        assert_eq!(loaded.track.weather_tag, Weather::Rain);
        assert_eq!(loaded.track.len(), file.track.len());
        assert_eq!(loaded.track.checkpoints.len(), 8);
    }

    #[test]
    fn test_legacy_snake_case_layout() {
        let json = r#"{
            "centerline": [[0, 0], [10, 0], [10, 10]],
            "inner_boundary": [[1, 1], [9, 1], [9, 9]],
            "outer_boundary": [[-1, -1], [11, -1], [11, 11]],
            "racing_line": [[0, 0], [10, 0], [10, 10]],
            "checkpoints": [
                {"position": [0, 0], "direction": [10, 0], "index": 0, "passed": false}
            ],
            "start_pos": [0, 0],
            "start_angle": 0.0,
            "width": 50.0,
            "seed": null,
            "intended_weather": "SNOW"
        }"#;
        let file = from_json(json).unwrap();
        assert_eq!(file.version, TRACK_FILE_VERSION);
        assert_eq!(file.track.weather_tag, Weather::Snow);
        assert_eq!(file.track.inner_boundary[1], Vec2::new(9.0, 1.0));
        assert!(file.track.seed.is_none());
    }

    #[test]
    fn test_rejects_future_version() {
        let track = generate(50.0, 8, Some(1), Weather::Clear);
        let mut file = TrackFile::new(track, None);
        file.version = TRACK_FILE_VERSION + 1;
        let json = to_json(&file).unwrap();
        assert!(matches!(from_json(&json), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_weather_is_an_error() {
        let track = generate(50.0, 8, Some(1), Weather::Clear);
        let json = to_json(&TrackFile::new(track, None))
            .unwrap()
            .replace("\"CLEAR\"", "\"FOG\"");
        assert!(from_json(&json).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_track(&scratch_path("does-not-exist")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
