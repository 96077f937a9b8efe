// Aerodynamic configuration of the car under analysis

use serde::{Deserialize, Serialize};

use crate::AeroCornerError;
use crate::track::DownforceLevel;

const DEFAULT_RIDE_HEIGHT_FRONT_M: f64 = 0.012;
const DEFAULT_RIDE_HEIGHT_REAR_M: f64 = 0.014;
const MAX_YAW_DEG: f64 = 90.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct WingAngles {
    pub front_deg: f64,
    pub rear_deg: f64,
}

impl Default for WingAngles {
    fn default() -> Self {
        Self {
            front_deg: 22.0,
            rear_deg: 26.0,
        }
    }
}

/// Aerodynamic description of a car, immutable for the duration of an analysis.
///
/// Lift coefficients are expressed as positive downforce coefficients. Values
/// are checked by [`AeroConfig::validate`], which every constructor and the
/// force model run, so a deserialized config cannot skip the checks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AeroConfig {
    /// Drag coefficient (Cd)
    pub drag_coefficient: f64,
    /// Front downforce coefficient
    pub cl_front: f64,
    /// Rear downforce coefficient
    pub cl_rear: f64,
    /// Frontal area, m²
    pub frontal_area_m2: f64,
    /// Front ride height, m
    #[serde(default = "default_ride_height_front")]
    pub ride_height_front_m: f64,
    /// Rear ride height, m
    #[serde(default = "default_ride_height_rear")]
    pub ride_height_rear_m: f64,
    #[serde(default)]
    pub wing_angles: WingAngles,
    /// Yaw angle to the oncoming air, degrees. Zero in a straight line.
    #[serde(default)]
    pub yaw_deg: f64,
}

fn default_ride_height_front() -> f64 {
    DEFAULT_RIDE_HEIGHT_FRONT_M
}

fn default_ride_height_rear() -> f64 {
    DEFAULT_RIDE_HEIGHT_REAR_M
}

impl AeroConfig {
    pub fn new(
        drag_coefficient: f64,
        cl_front: f64,
        cl_rear: f64,
        frontal_area_m2: f64,
    ) -> Result<Self, AeroCornerError> {
        let config = Self {
            drag_coefficient,
            cl_front,
            cl_rear,
            frontal_area_m2,
            ride_height_front_m: DEFAULT_RIDE_HEIGHT_FRONT_M,
            ride_height_rear_m: DEFAULT_RIDE_HEIGHT_REAR_M,
            wing_angles: WingAngles::default(),
            yaw_deg: 0.0,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_ride_heights(mut self, front_m: f64, rear_m: f64) -> Result<Self, AeroCornerError> {
        self.ride_height_front_m = front_m;
        self.ride_height_rear_m = rear_m;
        self.validate()?;
        Ok(self)
    }

    pub fn with_wing_angles(
        mut self,
        front_deg: f64,
        rear_deg: f64,
    ) -> Result<Self, AeroCornerError> {
        self.wing_angles = WingAngles { front_deg, rear_deg };
        self.validate()?;
        Ok(self)
    }

    pub fn with_yaw(mut self, yaw_deg: f64) -> Result<Self, AeroCornerError> {
        self.yaw_deg = yaw_deg;
        self.validate()?;
        Ok(self)
    }

    /// Total downforce coefficient, front plus rear
    pub fn cl_total(&self) -> f64 {
        self.cl_front + self.cl_rear
    }

    /// Lift-to-drag ratio (cl_front + cl_rear) / Cd.
    ///
    /// Undefined for a non-positive drag coefficient, which is reported as an
    /// invalid configuration.
    pub fn ld_ratio(&self) -> Result<f64, AeroCornerError> {
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient > 0.0) {
            return Err(AeroCornerError::invalid_configuration(
                "drag_coefficient",
                format!("must be positive, got {}", self.drag_coefficient),
            ));
        }
        Ok(self.cl_total() / self.drag_coefficient)
    }

    pub fn validate(&self) -> Result<(), AeroCornerError> {
        let positive = [
            ("drag_coefficient", self.drag_coefficient),
            ("frontal_area_m2", self.frontal_area_m2),
            ("cl_front", self.cl_front),
            ("cl_rear", self.cl_rear),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AeroCornerError::invalid_configuration(
                    field,
                    format!("must be positive, got {value}"),
                ));
            }
        }

        let non_negative = [
            ("ride_height_front_m", self.ride_height_front_m),
            ("ride_height_rear_m", self.ride_height_rear_m),
            ("wing_angles.front_deg", self.wing_angles.front_deg),
            ("wing_angles.rear_deg", self.wing_angles.rear_deg),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AeroCornerError::invalid_configuration(
                    field,
                    format!("must be zero or positive, got {value}"),
                ));
            }
        }

        if !(self.yaw_deg.is_finite() && self.yaw_deg.abs() <= MAX_YAW_DEG) {
            return Err(AeroCornerError::invalid_configuration(
                "yaw_deg",
                format!("must be within ±{MAX_YAW_DEG}°, got {}", self.yaw_deg),
            ));
        }

        Ok(())
    }

    /// Baseline configuration for a circuit's downforce level.
    ///
    /// Low downforce circuits (Monza, Spa) trade wing for straight-line speed,
    /// high downforce circuits (Monaco, Hungary) run maximum wing and lower ride heights.
    pub fn reference_setup(level: DownforceLevel) -> Self {
        let (cd, cl_front, cl_rear, front_wing, rear_wing, rh_front, rh_rear) = match level {
            DownforceLevel::Low => (0.68, 1.2, 1.6, 15.0, 18.0, 0.015, 0.018),
            DownforceLevel::Medium => (0.70, 1.5, 2.0, 22.0, 26.0, 0.012, 0.014),
            DownforceLevel::High => (0.75, 1.8, 2.4, 30.0, 35.0, 0.008, 0.010),
        };
        Self {
            drag_coefficient: cd,
            cl_front,
            cl_rear,
            frontal_area_m2: 1.4,
            ride_height_front_m: rh_front,
            ride_height_rear_m: rh_rear,
            wing_angles: WingAngles {
                front_deg: front_wing,
                rear_deg: rear_wing,
            },
            yaw_deg: 0.0,
        }
    }
}
