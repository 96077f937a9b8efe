// Measured apex speeds that replace solver output for individual regimes

use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::AeroCornerError;
use crate::track::CornerRegime;

/// One measured apex speed, as collected from a lap of telemetry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TelemetrySample {
    pub regime: CornerRegime,
    pub apex_speed_kmh: f64,
    #[serde(default)]
    pub corner_number: Option<u32>,
}

/// Measured apex speed per regime, in km/h.
///
/// A regime with a measured value bypasses the solver entirely; regimes left
/// empty are computed from the car's aerodynamic configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct TelemetryOverride {
    #[serde(default)]
    pub slow_kmh: Option<f64>,
    #[serde(default)]
    pub medium_kmh: Option<f64>,
    #[serde(default)]
    pub fast_kmh: Option<f64>,
}

impl TelemetryOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, regime: CornerRegime, apex_speed_kmh: f64) -> Self {
        *self.slot(regime) = Some(apex_speed_kmh);
        self
    }

    pub fn get(&self, regime: CornerRegime) -> Option<f64> {
        match regime {
            CornerRegime::Slow => self.slow_kmh,
            CornerRegime::Medium => self.medium_kmh,
            CornerRegime::Fast => self.fast_kmh,
        }
    }

    fn slot(&mut self, regime: CornerRegime) -> &mut Option<f64> {
        match regime {
            CornerRegime::Slow => &mut self.slow_kmh,
            CornerRegime::Medium => &mut self.medium_kmh,
            CornerRegime::Fast => &mut self.fast_kmh,
        }
    }

    /// Number of regimes with a measured value
    pub fn measured_count(&self) -> usize {
        CornerRegime::ALL
            .iter()
            .filter(|regime| self.get(**regime).is_some())
            .count()
    }

    /// Average raw samples into one measured speed per regime
    pub fn from_samples(
        samples: impl IntoIterator<Item = TelemetrySample>,
    ) -> Result<Self, AeroCornerError> {
        let grouped = samples
            .into_iter()
            .map(|sample| {
                check_speed(sample.regime, sample.apex_speed_kmh)?;
                Ok((sample.regime, sample.apex_speed_kmh))
            })
            .collect::<Result<Vec<_>, AeroCornerError>>()?
            .into_iter()
            .into_group_map();

        let mut measured = Self::new();
        for (regime, speeds) in grouped {
            let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
            *measured.slot(regime) = Some(mean);
        }
        Ok(measured)
    }

    /// Every present value must be a finite positive speed
    pub fn validate(&self) -> Result<(), AeroCornerError> {
        for regime in CornerRegime::ALL {
            if let Some(speed) = self.get(regime) {
                check_speed(regime, speed)?;
            }
        }
        Ok(())
    }

    /// Read an override from a JSON file, either the per-regime object or an
    /// array of samples
    pub fn from_file(path: &Path) -> Result<Self, AeroCornerError> {
        if !path.exists() {
            return Err(AeroCornerError::InvalidInputFile {
                path: format!("{:?}", path),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| AeroCornerError::InputFileError { source: e })?;
        let measured = match serde_json::from_str::<Vec<TelemetrySample>>(&content) {
            Ok(samples) => Self::from_samples(samples)?,
            Err(_) => serde_json::from_str::<Self>(&content)
                .map_err(|e| AeroCornerError::InputParseError { source: e })?,
        };
        measured.validate()?;
        Ok(measured)
    }
}

fn check_speed(regime: CornerRegime, speed_kmh: f64) -> Result<(), AeroCornerError> {
    if !(speed_kmh.is_finite() && speed_kmh > 0.0) {
        return Err(AeroCornerError::invalid_input(
            "telemetry",
            format!("{regime} apex speed must be a finite positive value, got {speed_kmh}"),
        ));
    }
    Ok(())
}
