// Reading inputs and writing snapshots for the command line tool

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use serde::de::DeserializeOwned;

use crate::AeroCornerError;
use crate::analysis::{PerformanceSnapshot, TeamEntry};

/// Read a single JSON document (car configuration, override, ...)
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AeroCornerError> {
    if !path.exists() {
        return Err(AeroCornerError::InvalidInputFile {
            path: format!("{:?}", path),
        });
    }
    let file = File::open(path).map_err(|e| AeroCornerError::InputFileError { source: e })?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AeroCornerError::InputParseError { source: e })
}

/// Read one team entry per line of a JSON lines file
pub fn read_team_entries(path: &Path) -> Result<Vec<TeamEntry>, AeroCornerError> {
    if !path.exists() {
        return Err(AeroCornerError::InvalidInputFile {
            path: format!("{:?}", path),
        });
    }
    let entries = serde_jsonlines::json_lines(path)
        .map_err(|e| AeroCornerError::InputFileError { source: e })?
        .collect::<Result<Vec<TeamEntry>, std::io::Error>>()
        .map_err(|e| AeroCornerError::InputFileError { source: e })?;
    info!("Read {} team entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Write one snapshot per line
pub fn write_snapshots(
    path: &Path,
    snapshots: &[PerformanceSnapshot],
) -> Result<(), AeroCornerError> {
    serde_jsonlines::write_json_lines(path, snapshots)
        .map_err(|e| AeroCornerError::OutputFileError { source: e })?;
    info!("Wrote {} snapshots to {:?}", snapshots.len(), path);
    Ok(())
}

/// Write a single snapshot as pretty printed JSON
pub fn write_snapshot(path: &Path, snapshot: &PerformanceSnapshot) -> Result<(), AeroCornerError> {
    let file = File::create(path).map_err(|e| AeroCornerError::OutputFileError { source: e })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|e| {
        AeroCornerError::OutputFileError {
            source: std::io::Error::other(e),
        }
    })?;
    writer
        .flush()
        .map_err(|e| AeroCornerError::OutputFileError { source: e })?;
    Ok(())
}
