use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::AeroCornerError;
use crate::track::CornerRegime;

/// Version of the engine configuration format understood by this build.
pub const CONFIG_VERSION: u32 = 1;

const CONFIG_DIR_NAME: &str = "aerocorner";
const CONFIG_FILE_NAME: &str = "engine.json";

/// Static, versioned constants consumed by every stage of the analysis.
///
/// The configuration is loaded once at startup and then passed by reference;
/// nothing in the engine mutates it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub version: u32,
    pub physics: PhysicsConstants,
    pub solver: SolverConstants,
    pub regimes: RegimeTable,
    pub recommendations: RecommendationConstants,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConstants {
    /// Air density at sea level, kg/m³
    pub air_density_sea_level: f64,
    /// Gravitational acceleration, m/s²
    pub gravity: f64,
    /// Dynamic viscosity of air, Pa·s
    pub dynamic_viscosity: f64,
    /// Reference length for the Reynolds number (car length), m
    pub characteristic_length_m: f64,
    /// Ride height floor below which ground effect stops growing, m
    pub min_ride_height_m: f64,
    pub ground_effect_gain: f64,
    pub ground_effect_decay_m: f64,
    /// Downforce per meter of ride height at which porpoising risk reaches 0.5
    pub porpoising_reference_n_per_m: f64,
    pub drs_drag_reduction: f64,
    pub drs_rear_downforce_reduction: f64,
    /// Relative drag increase per degree of yaw
    #[serde(default = "default_yaw_drag_per_deg")]
    pub yaw_drag_per_deg: f64,
    /// Scale each axle's downforce coefficient by its wing angle of attack
    #[serde(default)]
    pub wing_efficiency: bool,
    /// Speed used for the aero summary attached to every snapshot
    pub reference_speed_kmh: f64,
    /// Adjust air density for the track elevation
    pub altitude_correction: bool,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            air_density_sea_level: 1.225,
            gravity: 9.81,
            dynamic_viscosity: 1.81e-5,
            characteristic_length_m: 5.0,
            min_ride_height_m: 0.005,
            ground_effect_gain: 0.3,
            ground_effect_decay_m: 0.05,
            porpoising_reference_n_per_m: 2.5e6,
            drs_drag_reduction: 0.10,
            drs_rear_downforce_reduction: 0.15,
            yaw_drag_per_deg: default_yaw_drag_per_deg(),
            wing_efficiency: false,
            reference_speed_kmh: 250.0,
            altitude_correction: true,
        }
    }
}

fn default_yaw_drag_per_deg() -> f64 {
    0.02
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SolverConstants {
    /// Tire friction coefficient
    pub mechanical_grip: f64,
    pub car_mass_kg: f64,
    /// Fixed-point iteration cap for the slow corner aero correction
    pub max_iterations: usize,
    /// Convergence tolerance between successive iterations, m/s
    pub tolerance_mps: f64,
    /// Upper bound on the aero-to-mechanical grip ratio in the medium corner solution
    pub aero_saturation: f64,
    pub cd_reference: f64,
    pub ld_reference: f64,
}

impl Default for SolverConstants {
    fn default() -> Self {
        Self {
            mechanical_grip: 1.8,
            car_mass_kg: 798.0,
            max_iterations: 5,
            tolerance_mps: 0.05,
            aero_saturation: 0.8,
            cd_reference: 0.70,
            ld_reference: 5.0,
        }
    }
}

/// Speed bounds and rule thresholds for a single corner regime, all in km/h.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RegimeThresholds {
    pub min_kmh: f64,
    pub max_kmh: f64,
    /// At or above this apex speed the regime is reported as a strength
    pub strength_kmh: f64,
    /// At or below this apex speed the regime is reported as a weakness
    pub weakness_kmh: f64,
    /// At or below this apex speed the regime gets a high severity recommendation
    pub poor_kmh: f64,
    /// Radius used when the track has no corner of this regime, m
    pub nominal_radius_m: f64,
}

impl RegimeThresholds {
    /// Midpoint of the regime range, used as the balanced reference speed.
    pub fn baseline_kmh(&self) -> f64 {
        (self.min_kmh + self.max_kmh) / 2.0
    }

    pub fn clamp(&self, speed_kmh: f64) -> f64 {
        speed_kmh.clamp(self.min_kmh, self.max_kmh)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RegimeTable {
    pub slow: RegimeThresholds,
    pub medium: RegimeThresholds,
    pub fast: RegimeThresholds,
}

impl RegimeTable {
    pub fn for_regime(&self, regime: CornerRegime) -> &RegimeThresholds {
        match regime {
            CornerRegime::Slow => &self.slow,
            CornerRegime::Medium => &self.medium,
            CornerRegime::Fast => &self.fast,
        }
    }
}

impl Default for RegimeTable {
    fn default() -> Self {
        Self {
            slow: RegimeThresholds {
                min_kmh: 40.0,
                max_kmh: 110.0,
                strength_kmh: 85.0,
                weakness_kmh: 55.0,
                poor_kmh: 55.0,
                nominal_radius_m: 20.0,
            },
            medium: RegimeThresholds {
                min_kmh: 90.0,
                max_kmh: 180.0,
                strength_kmh: 150.0,
                weakness_kmh: 115.0,
                poor_kmh: 115.0,
                nominal_radius_m: 70.0,
            },
            fast: RegimeThresholds {
                min_kmh: 180.0,
                max_kmh: 320.0,
                strength_kmh: 280.0,
                weakness_kmh: 220.0,
                poor_kmh: 220.0,
                nominal_radius_m: 160.0,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RecommendationConstants {
    /// Sum of absolute regime deviations above which an overall balance recommendation is made
    pub overall_balance_deviation_kmh: f64,
    pub ld_target: f64,
    pub cd_target: f64,
}

impl Default for RecommendationConstants {
    fn default() -> Self {
        Self {
            overall_balance_deviation_kmh: 40.0,
            ld_target: 5.2,
            cd_target: 0.68,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            physics: PhysicsConstants::default(),
            solver: SolverConstants::default(),
            regimes: RegimeTable::default(),
            recommendations: RecommendationConstants::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the engine config file in the user's config directory.
    pub fn default_config_path() -> Result<PathBuf, AeroCornerError> {
        Ok(dirs::config_dir()
            .ok_or(AeroCornerError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config from the user's config directory, if one was saved there.
    pub fn from_local_file() -> Result<Option<Self>, AeroCornerError> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::from_file(&config_path).map(Some)
        } else {
            debug!("No engine config at {:?}, using defaults", config_path);
            Ok(None)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AeroCornerError> {
        let file =
            std::fs::File::open(path).map_err(|e| AeroCornerError::ConfigIOError { source: e })?;
        let config: EngineConfig = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| AeroCornerError::ConfigSerializeError { source: e })?;
        config.validate()?;
        info!("Loaded engine config version {} from {:?}", config.version, path);
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, AeroCornerError> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AeroCornerError> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AeroCornerError::ConfigIOError { source: e })?;
        }

        let file =
            std::fs::File::create(path).map_err(|e| AeroCornerError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| AeroCornerError::ConfigSerializeError { source: e })
    }

    /// Check the version and that every constant is physically meaningful.
    pub fn validate(&self) -> Result<(), AeroCornerError> {
        if self.version != CONFIG_VERSION {
            return Err(AeroCornerError::UnsupportedConfigVersion {
                found: self.version,
                supported: CONFIG_VERSION,
            });
        }

        let positive = [
            ("physics.air_density_sea_level", self.physics.air_density_sea_level),
            ("physics.gravity", self.physics.gravity),
            ("physics.dynamic_viscosity", self.physics.dynamic_viscosity),
            ("physics.characteristic_length_m", self.physics.characteristic_length_m),
            ("physics.min_ride_height_m", self.physics.min_ride_height_m),
            ("physics.ground_effect_decay_m", self.physics.ground_effect_decay_m),
            (
                "physics.porpoising_reference_n_per_m",
                self.physics.porpoising_reference_n_per_m,
            ),
            ("solver.mechanical_grip", self.solver.mechanical_grip),
            ("solver.car_mass_kg", self.solver.car_mass_kg),
            ("solver.tolerance_mps", self.solver.tolerance_mps),
            ("solver.cd_reference", self.solver.cd_reference),
            ("solver.ld_reference", self.solver.ld_reference),
            ("physics.reference_speed_kmh", self.physics.reference_speed_kmh),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AeroCornerError::invalid_configuration(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        let non_negative = [
            ("physics.ground_effect_gain", self.physics.ground_effect_gain),
            ("physics.yaw_drag_per_deg", self.physics.yaw_drag_per_deg),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AeroCornerError::invalid_configuration(
                    field,
                    format!("must be zero or positive, got {value}"),
                ));
            }
        }

        let fractions = [
            ("physics.drs_drag_reduction", self.physics.drs_drag_reduction),
            (
                "physics.drs_rear_downforce_reduction",
                self.physics.drs_rear_downforce_reduction,
            ),
            ("solver.aero_saturation", self.solver.aero_saturation),
        ];
        for (field, value) in fractions {
            if !(0.0..1.0).contains(&value) {
                return Err(AeroCornerError::invalid_configuration(
                    field,
                    format!("must be within [0, 1), got {value}"),
                ));
            }
        }

        if self.solver.max_iterations == 0 {
            return Err(AeroCornerError::invalid_configuration(
                "solver.max_iterations",
                "must be at least 1",
            ));
        }

        for regime in CornerRegime::ALL {
            let thresholds = self.regimes.for_regime(regime);
            if !(thresholds.min_kmh > 0.0 && thresholds.min_kmh < thresholds.max_kmh) {
                return Err(AeroCornerError::invalid_configuration(
                    "regimes",
                    format!("{regime} range must satisfy 0 < min < max"),
                ));
            }
            let rule_thresholds = [
                ("strength", thresholds.strength_kmh),
                ("weakness", thresholds.weakness_kmh),
                ("poor", thresholds.poor_kmh),
            ];
            for (name, value) in rule_thresholds {
                if !(thresholds.min_kmh..=thresholds.max_kmh).contains(&value) {
                    return Err(AeroCornerError::invalid_configuration(
                        "regimes",
                        format!("{regime} {name} threshold {value} is outside the regime range"),
                    ));
                }
            }
            if !(thresholds.nominal_radius_m.is_finite() && thresholds.nominal_radius_m > 0.0) {
                return Err(AeroCornerError::invalid_configuration(
                    "regimes",
                    format!("{regime} nominal radius must be positive"),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::new();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_regime_baselines() {
        let regimes = RegimeTable::default();
        assert_eq!(regimes.slow.baseline_kmh(), 75.0);
        assert_eq!(regimes.medium.baseline_kmh(), 135.0);
        assert_eq!(regimes.fast.baseline_kmh(), 250.0);
        assert_eq!(regimes.fast.clamp(400.0), 320.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("engine.json");

        let mut config = EngineConfig::new();
        config.solver.mechanical_grip = 1.6;
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");

        let mut config = EngineConfig::new();
        config.version = 99;
        config.save_to(&path).unwrap();

        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(AeroCornerError::UnsupportedConfigVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_rejects_non_physical_constants() {
        let mut config = EngineConfig::new();
        config.physics.air_density_sea_level = 0.0;
        assert!(matches!(
            config.validate(),
            Err(AeroCornerError::InvalidConfiguration { .. })
        ));

        let mut config = EngineConfig::new();
        config.regimes.slow.max_kmh = 30.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::new();
        config.solver.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_ground_effect_gain() {
        for gain in [-1.0, f64::NAN, f64::INFINITY] {
            let mut config = EngineConfig::new();
            config.physics.ground_effect_gain = gain;
            assert!(matches!(
                config.validate(),
                Err(AeroCornerError::InvalidConfiguration { .. })
            ));
        }

        // no ground effect at all is allowed
        let mut config = EngineConfig::new();
        config.physics.ground_effect_gain = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_thresholds_outside_regime_range() {
        let mut config = EngineConfig::new();
        config.regimes.fast.strength_kmh = 400.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::new();
        config.regimes.medium.poor_kmh = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::new();
        config.regimes.slow.weakness_kmh = 10.0;
        assert!(config.validate().is_err());

        // thresholds on the range bounds are accepted
        let mut config = EngineConfig::new();
        config.regimes.slow.poor_kmh = config.regimes.slow.min_kmh;
        config.regimes.slow.strength_kmh = config.regimes.slow.max_kmh;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_older_config_files_get_new_physics_defaults() {
        let mut json = serde_json::to_value(EngineConfig::new()).unwrap();
        let physics = json["physics"].as_object_mut().unwrap();
        physics.remove("yaw_drag_per_deg");
        physics.remove("wing_efficiency");

        let config: EngineConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config, EngineConfig::new());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = EngineConfig::from_file(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(AeroCornerError::ConfigIOError { .. })));
    }
}
