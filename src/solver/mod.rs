// Apex speed estimation per corner regime
//
// Each regime blends three grip terms with fixed weights. Slow corners are
// dominated by mechanical grip, fast corners by the car's L/D ratio.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::AeroCornerError;
use crate::aero::AeroForceModel;
use crate::config::{EngineConfig, RegimeTable, SolverConstants};
use crate::track::{CornerDefinition, CornerRegime};
use crate::units::mps_to_kmh;

const SLOW_MECHANICAL_WEIGHT: f64 = 0.7;
const SLOW_COUPLED_WEIGHT: f64 = 0.3;

const MEDIUM_MECHANICAL_WEIGHT: f64 = 0.4;
const MEDIUM_DOWNFORCE_WEIGHT: f64 = 0.4;
const MEDIUM_DRAG_WEIGHT: f64 = 0.2;

const FAST_LD_WEIGHT: f64 = 0.8;
const FAST_EFFICIENCY_WEIGHT: f64 = 0.15;
const FAST_MECHANICAL_WEIGHT: f64 = 0.05;

/// Why a computed apex speed is less trustworthy than usual
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DegradationKind {
    /// The slow corner aero correction did not settle, mechanical grip only
    NonConvergence,
    /// Raw estimate fell below the regime range
    ClampedLow,
    /// Raw estimate exceeded the regime range
    ClampedHigh,
}

impl std::fmt::Display for DegradationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradationKind::NonConvergence => write!(f, "aero correction did not converge"),
            DegradationKind::ClampedLow => write!(f, "clamped to regime minimum"),
            DegradationKind::ClampedHigh => write!(f, "clamped to regime maximum"),
        }
    }
}

/// Apex speed for one corner (or one nominal corner) of a regime
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SolverOutcome {
    pub regime: CornerRegime,
    /// Speed after clamping into the regime range, km/h
    pub apex_speed_kmh: f64,
    /// Speed before clamping, km/h
    pub raw_speed_kmh: f64,
    pub degradations: Vec<DegradationKind>,
}

impl SolverOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Regime-weighted apex speed calculator for a single car.
pub struct CornerSpeedSolver<'a> {
    model: &'a AeroForceModel,
    constants: SolverConstants,
    regimes: RegimeTable,
    gravity: f64,
}

impl<'a> CornerSpeedSolver<'a> {
    pub fn new(model: &'a AeroForceModel, config: &EngineConfig) -> Self {
        Self {
            model,
            constants: config.solver,
            regimes: config.regimes,
            gravity: config.physics.gravity,
        }
    }

    pub fn solve(&self, corner: &CornerDefinition) -> Result<SolverOutcome, AeroCornerError> {
        corner.validate()?;
        self.solve_radius(corner.regime, corner.radius_m)
    }

    /// Apex speed for a corner of the given regime and radius
    pub fn solve_radius(
        &self,
        regime: CornerRegime,
        radius_m: f64,
    ) -> Result<SolverOutcome, AeroCornerError> {
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(AeroCornerError::invalid_input(
                "radius_m",
                format!("corner radius must be positive, got {radius_m}"),
            ));
        }

        let mut degradations = Vec::new();
        let speed_mps = match regime {
            CornerRegime::Slow => {
                let mechanical = self.mechanical_speed(radius_m);
                match self.coupled_speed(radius_m) {
                    Some(coupled) => {
                        SLOW_MECHANICAL_WEIGHT * mechanical + SLOW_COUPLED_WEIGHT * coupled
                    }
                    None => {
                        degradations.push(DegradationKind::NonConvergence);
                        mechanical
                    }
                }
            }
            CornerRegime::Medium => self.medium_speed(radius_m),
            CornerRegime::Fast => self.fast_speed(radius_m),
        };

        let raw_speed_kmh = mps_to_kmh(speed_mps);
        let range = self.regimes.for_regime(regime);
        if raw_speed_kmh < range.min_kmh {
            degradations.push(DegradationKind::ClampedLow);
        } else if raw_speed_kmh > range.max_kmh {
            degradations.push(DegradationKind::ClampedHigh);
        }
        let apex_speed_kmh = range.clamp(raw_speed_kmh);

        debug!(
            "{regime} corner R={radius_m:.1}m: raw {raw_speed_kmh:.1} km/h, \
             apex {apex_speed_kmh:.1} km/h {degradations:?}"
        );

        Ok(SolverOutcome {
            regime,
            apex_speed_kmh,
            raw_speed_kmh,
            degradations,
        })
    }

    /// Mechanical grip limit sqrt(μ·g·R), m/s
    pub fn mechanical_speed(&self, radius_m: f64) -> f64 {
        (self.constants.mechanical_grip * self.gravity * radius_m)
            .max(0.0)
            .sqrt()
    }

    /// Aero-to-mechanical grip ratio μ·k·R/m, where downforce = k·v²
    fn aero_grip_ratio(&self, radius_m: f64) -> f64 {
        self.constants.mechanical_grip * self.model.downforce_per_speed_squared() * radius_m
            / self.constants.car_mass_kg
    }

    /// Solve v² = μ·(m·g + DF(v))·R/m by fixed-point iteration from the
    /// mechanical speed. `None` when the iteration does not settle within
    /// the cap or leaves the finite range.
    fn coupled_speed(&self, radius_m: f64) -> Option<f64> {
        let grip = self.constants.mechanical_grip;
        let mass = self.constants.car_mass_kg;
        let mut speed = self.mechanical_speed(radius_m);

        for _ in 0..self.constants.max_iterations {
            let downforce = self.model.downforce(speed).ok()?.total_n();
            let next = (grip * (mass * self.gravity + downforce) * radius_m / mass)
                .max(0.0)
                .sqrt();
            if !next.is_finite() {
                return None;
            }
            let step = (next - speed).abs();
            speed = next;
            if step < self.constants.tolerance_mps {
                return Some(speed);
            }
        }
        None
    }

    fn medium_speed(&self, radius_m: f64) -> f64 {
        let mechanical = self.mechanical_speed(radius_m);
        let ratio = self
            .aero_grip_ratio(radius_m)
            .min(self.constants.aero_saturation);
        let downforce_limited =
            (self.constants.mechanical_grip * self.gravity * radius_m / (1.0 - ratio))
                .max(0.0)
                .sqrt();
        let drag_limited =
            mechanical * (self.constants.cd_reference / self.model.config().drag_coefficient);

        MEDIUM_MECHANICAL_WEIGHT * mechanical
            + MEDIUM_DOWNFORCE_WEIGHT * downforce_limited
            + MEDIUM_DRAG_WEIGHT * drag_limited
    }

    fn fast_speed(&self, radius_m: f64) -> f64 {
        let ld = self.model.ld_ratio();
        let ld_reference = self.constants.ld_reference;
        let ld_limited = (ld * self.gravity * radius_m).max(0.0).sqrt();
        let efficiency =
            (ld_reference * self.gravity * radius_m).max(0.0).sqrt() * (ld / ld_reference);

        FAST_LD_WEIGHT * ld_limited
            + FAST_EFFICIENCY_WEIGHT * efficiency
            + FAST_MECHANICAL_WEIGHT * self.mechanical_speed(radius_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aero::{AeroConfig, AirDensity};

    fn medium_model() -> AeroForceModel {
        let config = AeroConfig::new(0.70, 1.5, 2.0, 1.4).unwrap();
        AeroForceModel::new(config, AirDensity::default()).unwrap()
    }

    #[test]
    fn test_slow_corner_in_range() {
        let model = medium_model();
        let config = EngineConfig::default();
        let solver = CornerSpeedSolver::new(&model, &config);

        let outcome = solver.solve_radius(CornerRegime::Slow, 12.0).unwrap();
        assert!(outcome.apex_speed_kmh >= 40.0 && outcome.apex_speed_kmh <= 110.0);
        assert!(!outcome.is_degraded());
        // A hairpin is well below the weakness threshold
        assert!(outcome.apex_speed_kmh < 55.0);
        // and a little above pure mechanical grip
        let mechanical = mps_to_kmh(solver.mechanical_speed(12.0));
        assert!(outcome.apex_speed_kmh > mechanical);
    }

    #[test]
    fn test_medium_and_fast_corners_in_range() {
        let model = medium_model();
        let config = EngineConfig::default();
        let solver = CornerSpeedSolver::new(&model, &config);

        let medium = solver.solve_radius(CornerRegime::Medium, 60.0).unwrap();
        assert!(medium.apex_speed_kmh > 90.0 && medium.apex_speed_kmh < 180.0);
        assert!(!medium.is_degraded());

        let fast = solver.solve_radius(CornerRegime::Fast, 150.0).unwrap();
        assert!(fast.apex_speed_kmh > 180.0 && fast.apex_speed_kmh < 320.0);
        assert!(!fast.is_degraded());
    }

    #[test]
    fn test_clamping_is_flagged() {
        let model = medium_model();
        let config = EngineConfig::default();
        let solver = CornerSpeedSolver::new(&model, &config);

        let tight = solver.solve_radius(CornerRegime::Fast, 20.0).unwrap();
        assert_eq!(tight.apex_speed_kmh, 180.0);
        assert!(tight.raw_speed_kmh < 180.0);
        assert_eq!(tight.degradations, vec![DegradationKind::ClampedLow]);

        let huge = solver.solve_radius(CornerRegime::Fast, 2000.0).unwrap();
        assert_eq!(huge.apex_speed_kmh, 320.0);
        assert_eq!(huge.degradations, vec![DegradationKind::ClampedHigh]);
    }

    #[test]
    fn test_non_convergence_falls_back_to_mechanical() {
        let model = medium_model();
        let mut config = EngineConfig::default();
        config.solver.max_iterations = 1;
        config.solver.tolerance_mps = 1e-9;
        let solver = CornerSpeedSolver::new(&model, &config);

        let outcome = solver.solve_radius(CornerRegime::Slow, 20.0).unwrap();
        assert!(outcome.degradations.contains(&DegradationKind::NonConvergence));
        let mechanical = mps_to_kmh(solver.mechanical_speed(20.0));
        assert!((outcome.raw_speed_kmh - mechanical).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_radius() {
        let model = medium_model();
        let config = EngineConfig::default();
        let solver = CornerSpeedSolver::new(&model, &config);

        for radius in [0.0, -10.0, f64::NAN] {
            assert!(matches!(
                solver.solve_radius(CornerRegime::Medium, radius),
                Err(AeroCornerError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn test_lower_drag_helps_medium_corners() {
        let config = EngineConfig::default();
        let draggy = AeroForceModel::new(
            AeroConfig::new(0.80, 1.5, 2.0, 1.4).unwrap(),
            AirDensity::default(),
        )
        .unwrap();
        let slippery = AeroForceModel::new(
            AeroConfig::new(0.65, 1.5, 2.0, 1.4).unwrap(),
            AirDensity::default(),
        )
        .unwrap();

        let slow = CornerSpeedSolver::new(&draggy, &config)
            .solve_radius(CornerRegime::Medium, 60.0)
            .unwrap();
        let quick = CornerSpeedSolver::new(&slippery, &config)
            .solve_radius(CornerRegime::Medium, 60.0)
            .unwrap();
        assert!(quick.raw_speed_kmh > slow.raw_speed_kmh);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::aero::{AeroConfig, AirDensity};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Higher L/D never produces a lower fast corner speed at the same radius
        #[test]
        fn prop_fast_apex_monotonic_in_ld(
            cd in 0.5f64..1.0,
            cl_low in 1.0f64..3.0,
            cl_gain in 0.01f64..2.0,
            radius in 50.0f64..400.0,
        ) {
            let config = EngineConfig::default();
            let low = AeroForceModel::new(
                AeroConfig::new(cd, cl_low / 2.0, cl_low / 2.0, 1.4).unwrap(),
                AirDensity::default(),
            ).unwrap();
            let high = AeroForceModel::new(
                AeroConfig::new(cd, (cl_low + cl_gain) / 2.0, (cl_low + cl_gain) / 2.0, 1.4)
                    .unwrap(),
                AirDensity::default(),
            ).unwrap();

            let low_outcome = CornerSpeedSolver::new(&low, &config)
                .solve_radius(CornerRegime::Fast, radius).unwrap();
            let high_outcome = CornerSpeedSolver::new(&high, &config)
                .solve_radius(CornerRegime::Fast, radius).unwrap();

            prop_assert!(high_outcome.raw_speed_kmh > low_outcome.raw_speed_kmh);
            prop_assert!(high_outcome.apex_speed_kmh >= low_outcome.apex_speed_kmh);
        }

        /// Every regime stays inside its configured range
        #[test]
        fn prop_apex_speed_within_regime_range(
            cd in 0.5f64..1.2,
            cl_front in 0.5f64..3.0,
            cl_rear in 0.5f64..3.5,
            radius in 5.0f64..500.0,
        ) {
            let config = EngineConfig::default();
            let model = AeroForceModel::new(
                AeroConfig::new(cd, cl_front, cl_rear, 1.4).unwrap(),
                AirDensity::default(),
            ).unwrap();
            let solver = CornerSpeedSolver::new(&model, &config);

            for regime in CornerRegime::ALL {
                let outcome = solver.solve_radius(regime, radius).unwrap();
                let range = config.regimes.for_regime(regime);
                prop_assert!(outcome.apex_speed_kmh >= range.min_kmh);
                prop_assert!(outcome.apex_speed_kmh <= range.max_kmh);
                prop_assert!(outcome.apex_speed_kmh.is_finite());
            }
        }
    }
}
