// Core data structures describing the track being analyzed

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::AeroCornerError;

/// Classification of corners by their characteristic speed.
///
/// Each regime is dominated by a different physical effect: mechanical grip in
/// slow corners, a mix in medium corners and aerodynamic downforce in fast ones.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CornerRegime {
    Slow,
    Medium,
    Fast,
}

impl CornerRegime {
    /// All regimes in reporting order.
    pub const ALL: [CornerRegime; 3] =
        [CornerRegime::Slow, CornerRegime::Medium, CornerRegime::Fast];

    /// Human-readable area name used in recommendations (e.g. "Slow Corners")
    pub fn area_name(&self) -> &'static str {
        match self {
            CornerRegime::Slow => "Slow Corners",
            CornerRegime::Medium => "Medium Corners",
            CornerRegime::Fast => "Fast Corners",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CornerRegime::Slow => 0,
            CornerRegime::Medium => 1,
            CornerRegime::Fast => 2,
        }
    }
}

impl std::fmt::Display for CornerRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CornerRegime::Slow => write!(f, "Slow"),
            CornerRegime::Medium => write!(f, "Medium"),
            CornerRegime::Fast => write!(f, "Fast"),
        }
    }
}

/// How much downforce the circuit rewards overall.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DownforceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DownforceLevel {
    /// Setup priority for the circuit as a whole
    pub fn setup_focus(&self) -> &'static str {
        match self {
            DownforceLevel::Low => "Minimize drag - top speed paramount",
            DownforceLevel::Medium => "Balanced setup - optimize L/D ratio",
            DownforceLevel::High => "Maximize downforce - corner speed critical",
        }
    }
}

/// A single corner the car has to negotiate
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CornerDefinition {
    /// Corner number within the track
    pub number: u32,
    /// Optional corner name (e.g. "Grand Hotel")
    #[serde(default)]
    pub name: Option<String>,
    pub regime: CornerRegime,
    /// Radius of the racing line at the apex, meters
    pub radius_m: f64,
    /// Reference apex speed for this corner, km/h
    pub ideal_speed_kmh: f64,
}

impl CornerDefinition {
    pub fn new(
        number: u32,
        regime: CornerRegime,
        radius_m: f64,
        ideal_speed_kmh: f64,
    ) -> Result<Self, AeroCornerError> {
        let corner = Self {
            number,
            name: None,
            regime,
            radius_m,
            ideal_speed_kmh,
        };
        corner.validate()?;
        Ok(corner)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), AeroCornerError> {
        if !(self.radius_m.is_finite() && self.radius_m > 0.0) {
            return Err(AeroCornerError::invalid_input(
                "radius_m",
                format!("corner {} radius must be positive, got {}", self.number, self.radius_m),
            ));
        }
        if !(self.ideal_speed_kmh.is_finite() && self.ideal_speed_kmh > 0.0) {
            return Err(AeroCornerError::invalid_input(
                "ideal_speed_kmh",
                format!(
                    "corner {} ideal speed must be positive, got {}",
                    self.number, self.ideal_speed_kmh
                ),
            ));
        }
        Ok(())
    }
}

/// A DRS activation zone, consumed as metadata only
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DrsZone {
    pub detection_m: f64,
    pub activation_m: f64,
}

/// Everything the engine needs to know about a circuit
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackProfile {
    /// Unique track name (e.g. "Monaco")
    pub name: String,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub downforce_level: DownforceLevel,
    /// Altitude above sea level, meters
    #[serde(default)]
    pub elevation_m: f64,
    #[serde(default)]
    pub drs_zones: Vec<DrsZone>,
    /// Corners in driving order
    pub corners: Vec<CornerDefinition>,
}

impl TrackProfile {
    pub fn new(name: &str, downforce_level: DownforceLevel) -> Self {
        Self {
            name: name.to_string(),
            length_m: None,
            downforce_level,
            elevation_m: 0.0,
            drs_zones: Vec::new(),
            corners: Vec::new(),
        }
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    pub fn with_corner(mut self, corner: CornerDefinition) -> Self {
        self.corners.push(corner);
        self
    }

    /// Corners of a single regime, in driving order
    pub fn corners_of(&self, regime: CornerRegime) -> impl Iterator<Item = &CornerDefinition> {
        self.corners.iter().filter(move |c| c.regime == regime)
    }

    /// Mean ideal speed of the track's corners in a regime, if it has any
    pub fn mean_ideal_speed_kmh(&self, regime: CornerRegime) -> Option<f64> {
        let (sum, count) = self
            .corners_of(regime)
            .fold((0.0, 0usize), |(sum, count), c| (sum + c.ideal_speed_kmh, count + 1));
        if count == 0 { None } else { Some(sum / count as f64) }
    }

    /// Validate the name, every corner and that corner numbers are unique
    pub fn validate(&self) -> Result<(), AeroCornerError> {
        if self.name.trim().is_empty() {
            return Err(AeroCornerError::invalid_input("name", "track name must not be empty"));
        }
        if !self.elevation_m.is_finite() {
            return Err(AeroCornerError::invalid_input("elevation_m", "must be finite"));
        }

        let mut corner_numbers = HashSet::new();
        for corner in &self.corners {
            corner.validate()?;
            if !corner_numbers.insert(corner.number) {
                return Err(AeroCornerError::invalid_input(
                    "corners",
                    format!("duplicate corner number: {}", corner.number),
                ));
            }
        }

        Ok(())
    }
}
