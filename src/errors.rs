// Error types for aerocorner

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum AeroCornerError {
    // Validation errors raised by the computational core
    #[snafu(display("Invalid aerodynamic configuration: {field} - {reason}"))]
    InvalidConfiguration { field: String, reason: String },
    #[snafu(display("Invalid input: {field} - {reason}"))]
    InvalidInput { field: String, reason: String },

    // Engine configuration management errors
    #[snafu(display("Could not find application config directory to load or save engine config"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing engine config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error (de)serializing engine config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display(
        "Unsupported engine config version {found}, this build understands version {supported}"
    ))]
    UnsupportedConfigVersion { found: u32, supported: u32 },

    // CLI file errors
    #[snafu(display("Invalid input file: {path}"))]
    InvalidInputFile { path: String },
    #[snafu(display("Error reading input file"))]
    InputFileError { source: io::Error },
    #[snafu(display("Error parsing input file"))]
    InputParseError { source: serde_json::Error },
    #[snafu(display("Error writing output file"))]
    OutputFileError { source: io::Error },
}

impl AeroCornerError {
    pub(crate) fn invalid_configuration(field: &str, reason: impl Into<String>) -> Self {
        AeroCornerError::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        AeroCornerError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
