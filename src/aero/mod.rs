// Aerodynamic force model: drag, downforce with ground effect, L/D, Reynolds
// number, porpoising risk, vortex strengths and DRS deltas.

pub mod types;

use serde::{Deserialize, Serialize};

use crate::AeroCornerError;
use crate::config::PhysicsConstants;
use crate::units::mps_to_kmh;

pub use types::{AeroConfig, WingAngles};

const ISA_SEA_LEVEL_TEMP_K: f64 = 288.15;
const ISA_LAPSE_RATE_K_PER_M: f64 = 0.0065;
const AIR_GAS_CONSTANT: f64 = 287.05287; // J/(kg·K)
const TROPOPAUSE_M: f64 = 11_000.0;

// Wing angle of attack model, degrees
const WING_OPTIMAL_ANGLE_DEG: f64 = 25.0;
const WING_STALL_ANGLE_DEG: f64 = 40.0;
const WING_STALLED_EFFICIENCY: f64 = 0.3;

/// Air density in kg/m³
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AirDensity(f64);

impl AirDensity {
    pub fn new(kg_per_m3: f64) -> Result<Self, AeroCornerError> {
        if !(kg_per_m3.is_finite() && kg_per_m3 > 0.0) {
            return Err(AeroCornerError::invalid_configuration(
                "air_density",
                format!("must be positive, got {kg_per_m3}"),
            ));
        }
        Ok(Self(kg_per_m3))
    }

    pub fn sea_level(constants: &PhysicsConstants) -> Self {
        Self(constants.air_density_sea_level)
    }

    /// Density at an elevation using the ISA troposphere model.
    ///
    /// Elevations above the tropopause are treated as the tropopause.
    pub fn at_altitude(
        elevation_m: f64,
        constants: &PhysicsConstants,
    ) -> Result<Self, AeroCornerError> {
        if !elevation_m.is_finite() {
            return Err(AeroCornerError::invalid_input("elevation_m", "must be finite"));
        }
        let elevation_m = elevation_m.min(TROPOPAUSE_M);
        let exponent = constants.gravity / (AIR_GAS_CONSTANT * ISA_LAPSE_RATE_K_PER_M) - 1.0;
        let temperature_ratio = 1.0 - ISA_LAPSE_RATE_K_PER_M * elevation_m / ISA_SEA_LEVEL_TEMP_K;
        Self::new(constants.air_density_sea_level * temperature_ratio.powf(exponent))
    }

    pub fn kg_per_m3(&self) -> f64 {
        self.0
    }
}

impl Default for AirDensity {
    fn default() -> Self {
        Self::sea_level(&PhysicsConstants::default())
    }
}

/// Downforce split between the axles, Newtons
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Downforce {
    pub front_n: f64,
    pub rear_n: f64,
}

impl Downforce {
    pub fn total_n(&self) -> f64 {
        self.front_n + self.rear_n
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Advisory porpoising assessment, never used as a hard gate
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PorpoisingRisk {
    pub level: RiskLevel,
    pub score: f64,
    pub advisory: String,
}

/// Forces and derived coefficients for one configuration at one speed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PhysicsResult {
    pub velocity_mps: f64,
    pub air_density_kg_m3: f64,
    pub drag_force_n: f64,
    pub downforce: Downforce,
    pub ld_ratio: f64,
    pub reynolds_number: f64,
    /// Advisory scalar in [0, 1)
    pub porpoising_risk_score: f64,
    /// Change in drag when DRS opens (negative)
    pub drs_drag_delta_n: f64,
    /// Change in rear downforce when DRS opens (negative)
    pub drs_downforce_delta_n: f64,
    pub drs_active: bool,
}

impl PhysicsResult {
    pub fn total_downforce_n(&self) -> f64 {
        self.downforce.total_n()
    }

    /// Copy of this result with DRS open: drag and rear downforce reduced by
    /// the DRS deltas. A result that already has DRS open is returned as is.
    pub fn with_drs(&self) -> PhysicsResult {
        if self.drs_active {
            return self.clone();
        }

        let downforce = Downforce {
            front_n: self.downforce.front_n,
            rear_n: self.downforce.rear_n + self.drs_downforce_delta_n,
        };

        // porpoising score is x / (1 + x) with x proportional to total downforce
        let has_downforce = self.total_downforce_n() > 0.0;
        let porpoising_risk_score = if self.porpoising_risk_score > 0.0 && has_downforce {
            let x = self.porpoising_risk_score / (1.0 - self.porpoising_risk_score);
            let scaled = x * downforce.total_n() / self.total_downforce_n();
            scaled / (1.0 + scaled)
        } else {
            0.0
        };

        PhysicsResult {
            drag_force_n: self.drag_force_n + self.drs_drag_delta_n,
            downforce,
            porpoising_risk_score,
            drs_active: true,
            ..self.clone()
        }
    }

    /// Estimated straight-line speed gain from opening DRS, km/h.
    ///
    /// Simplified power-limited estimate v·(1 − sqrt(D_open / D_closed)),
    /// about 15 km/h at 300 km/h with the default 10% drag reduction.
    pub fn drs_top_speed_gain_kmh(&self) -> f64 {
        if self.drag_force_n <= 0.0 {
            return 0.0;
        }
        let ratio = ((self.drag_force_n + self.drs_drag_delta_n) / self.drag_force_n).max(0.0);
        mps_to_kmh(self.velocity_mps) * (1.0 - ratio.sqrt())
    }

    pub fn porpoising_risk(&self) -> PorpoisingRisk {
        let score = self.porpoising_risk_score;
        let level = if score > 0.7 {
            RiskLevel::High
        } else if score > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let advisory = if score > 0.6 {
            "Increase ride height"
        } else {
            "Configuration acceptable"
        };
        PorpoisingRisk {
            level,
            score,
            advisory: advisory.to_string(),
        }
    }
}

/// Vortex strengths around the car.
///
/// Relative index for comparing configurations, not a physical vorticity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct VortexMetrics {
    /// Front wing endplate vortex
    pub y250: f64,
    pub bargeboard: f64,
    pub diffuser: f64,
    /// Rear wing tip vortices
    pub rear_wing: f64,
    pub total: f64,
}

/// Aerodynamic force model bound to one car configuration and air density.
///
/// All methods are pure; the model can be shared freely between threads.
#[derive(Clone, Debug, PartialEq)]
pub struct AeroForceModel {
    config: AeroConfig,
    air_density: AirDensity,
    constants: PhysicsConstants,
}

impl AeroForceModel {
    pub fn new(config: AeroConfig, air_density: AirDensity) -> Result<Self, AeroCornerError> {
        Self::with_constants(config, air_density, PhysicsConstants::default())
    }

    pub fn with_constants(
        config: AeroConfig,
        air_density: AirDensity,
        constants: PhysicsConstants,
    ) -> Result<Self, AeroCornerError> {
        config.validate()?;
        // re-check density, it may have been deserialized
        AirDensity::new(air_density.kg_per_m3())?;
        Ok(Self {
            config,
            air_density,
            constants,
        })
    }

    pub fn config(&self) -> &AeroConfig {
        &self.config
    }

    pub fn air_density(&self) -> AirDensity {
        self.air_density
    }

    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    /// Validated at construction, so always strictly positive
    pub fn ld_ratio(&self) -> f64 {
        self.config.cl_total() / self.config.drag_coefficient
    }

    /// Drag coefficient including the yaw penalty, Cd·(1 + k·|yaw|)
    pub fn effective_drag_coefficient(&self) -> f64 {
        let yaw_penalty = self.constants.yaw_drag_per_deg * self.config.yaw_deg.abs();
        self.config.drag_coefficient * (1.0 + yaw_penalty)
    }

    /// Ground effect multiplier for a ride height in meters.
    ///
    /// Grows as the car gets lower and stops growing at the ride height floor.
    pub fn ground_effect_factor(&self, ride_height_m: f64) -> f64 {
        let floor = self.constants.min_ride_height_m;
        let effective = ride_height_m.max(floor);
        1.0 + self.constants.ground_effect_gain
            * (-(effective - floor) / self.constants.ground_effect_decay_m).exp()
    }

    fn dynamic_pressure_area(&self, velocity_mps: f64) -> f64 {
        0.5 * self.air_density.kg_per_m3() * velocity_mps.powi(2) * self.config.frontal_area_m2
    }

    /// Front and rear effective downforce coefficients including ground effect,
    /// and the wing angle of attack when `wing_efficiency` is enabled
    fn effective_cl(&self) -> (f64, f64) {
        let (front_wing, rear_wing) = if self.constants.wing_efficiency {
            (
                wing_efficiency(self.config.wing_angles.front_deg),
                wing_efficiency(self.config.wing_angles.rear_deg),
            )
        } else {
            (1.0, 1.0)
        };
        (
            self.config.cl_front
                * self.ground_effect_factor(self.config.ride_height_front_m)
                * front_wing,
            self.config.cl_rear
                * self.ground_effect_factor(self.config.ride_height_rear_m)
                * rear_wing,
        )
    }

    /// Total downforce per unit of squared speed, N/(m/s)²
    pub fn downforce_per_speed_squared(&self) -> f64 {
        let (front, rear) = self.effective_cl();
        0.5 * self.air_density.kg_per_m3() * self.config.frontal_area_m2 * (front + rear)
    }

    /// Front share of total downforce, percent
    pub fn aero_balance_front_pct(&self) -> f64 {
        let (front, rear) = self.effective_cl();
        front / (front + rear) * 100.0
    }

    pub fn drag_force(&self, velocity_mps: f64) -> Result<f64, AeroCornerError> {
        check_velocity(velocity_mps)?;
        Ok(self.dynamic_pressure_area(velocity_mps) * self.effective_drag_coefficient())
    }

    pub fn downforce(&self, velocity_mps: f64) -> Result<Downforce, AeroCornerError> {
        check_velocity(velocity_mps)?;
        let q_area = self.dynamic_pressure_area(velocity_mps);
        let (front, rear) = self.effective_cl();
        Ok(Downforce {
            front_n: q_area * front,
            rear_n: q_area * rear,
        })
    }

    pub fn reynolds_number(&self, velocity_mps: f64) -> Result<f64, AeroCornerError> {
        check_velocity(velocity_mps)?;
        Ok(self.air_density.kg_per_m3() * velocity_mps * self.constants.characteristic_length_m
            / self.constants.dynamic_viscosity)
    }

    pub fn vortex_generation(&self, velocity_mps: f64) -> Result<VortexMetrics, AeroCornerError> {
        check_velocity(velocity_mps)?;
        let wings = self.config.wing_angles;
        let y250 = velocity_mps * wings.front_deg.to_radians().sin() * 10.0 * 0.7;
        let bargeboard = velocity_mps * 8.0;
        let diffuser = velocity_mps * self.config.cl_rear * 5.0;
        let rear_wing = velocity_mps * wings.rear_deg.to_radians().sin() * 8.0;
        Ok(VortexMetrics {
            y250,
            bargeboard,
            diffuser,
            rear_wing,
            total: y250 + bargeboard + diffuser + rear_wing,
        })
    }

    fn porpoising_risk_score(&self, downforce: &Downforce) -> f64 {
        let ride_height = self
            .config
            .ride_height_front_m
            .min(self.config.ride_height_rear_m)
            .max(self.constants.min_ride_height_m);
        let x = downforce.total_n() / ride_height / self.constants.porpoising_reference_n_per_m;
        x / (1.0 + x)
    }

    /// Compute every force and coefficient at a speed in m/s
    pub fn compute(&self, velocity_mps: f64) -> Result<PhysicsResult, AeroCornerError> {
        let drag_force_n = self.drag_force(velocity_mps)?;
        let downforce = self.downforce(velocity_mps)?;

        Ok(PhysicsResult {
            velocity_mps,
            air_density_kg_m3: self.air_density.kg_per_m3(),
            drag_force_n,
            ld_ratio: self.ld_ratio(),
            reynolds_number: self.reynolds_number(velocity_mps)?,
            porpoising_risk_score: self.porpoising_risk_score(&downforce),
            drs_drag_delta_n: -self.constants.drs_drag_reduction * drag_force_n,
            drs_downforce_delta_n: -self.constants.drs_rear_downforce_reduction * downforce.rear_n,
            downforce,
            drs_active: false,
        })
    }

    pub fn compute_kmh(&self, velocity_kmh: f64) -> Result<PhysicsResult, AeroCornerError> {
        self.compute(crate::units::kmh_to_mps(velocity_kmh))
    }
}

/// Downforce multiplier for a wing angle of attack: linear up to the optimum,
/// collapsing past the stall angle
fn wing_efficiency(angle_deg: f64) -> f64 {
    if angle_deg < WING_STALL_ANGLE_DEG {
        (0.5 + 0.5 * angle_deg / WING_OPTIMAL_ANGLE_DEG).min(1.0)
    } else {
        WING_STALLED_EFFICIENCY
    }
}

fn check_velocity(velocity_mps: f64) -> Result<(), AeroCornerError> {
    if !velocity_mps.is_finite() || velocity_mps < 0.0 {
        return Err(AeroCornerError::invalid_input(
            "velocity",
            format!("must be a finite non-negative speed, got {velocity_mps}"),
        ));
    }
    Ok(())
}
