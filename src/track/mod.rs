// Track description consumed by the analysis: corners, downforce level and metadata
//
// Tracks are supplied by the caller (or read from a JSON file by the CLI); the
// engine never stores them.

pub mod types;

use std::path::Path;

use crate::AeroCornerError;

pub use types::{CornerDefinition, CornerRegime, DownforceLevel, DrsZone, TrackProfile};

/// Read and validate a track profile from a JSON file
pub fn load_track_profile(path: &Path) -> Result<TrackProfile, AeroCornerError> {
    if !path.exists() {
        return Err(AeroCornerError::InvalidInputFile {
            path: format!("{:?}", path),
        });
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| AeroCornerError::InputFileError { source: e })?;
    let track: TrackProfile = serde_json::from_str(&content)
        .map_err(|e| AeroCornerError::InputParseError { source: e })?;
    track.validate()?;
    Ok(track)
}
