// Orchestration of a full corner performance analysis for one team on one track

pub mod types;

use log::{info, warn};

use crate::AeroCornerError;
use crate::aero::{AeroConfig, AeroForceModel, AirDensity};
use crate::classifier::PerformanceClassifier;
use crate::config::EngineConfig;
use crate::insights::InsightGenerator;
use crate::recommendations::RecommendationEngine;
use crate::solver::{CornerSpeedSolver, DegradationKind};
use crate::telemetry::TelemetryOverride;
use crate::track::{CornerRegime, TrackProfile};

pub use types::{
    AeroSummary, CornerPerformance, CornerResult, DataQuality, DataQualitySource, DataSource,
    Degradation, PerformanceSnapshot, TeamEntry,
};

/// Outcome of evaluating one regime, before it is folded into the snapshot
struct RegimeEvaluation {
    performance: CornerPerformance,
    corners: Vec<CornerResult>,
    degradations: Vec<Degradation>,
}

/// Runs the whole pipeline: force model, solver, classifier, insights and
/// recommendations. Holds only read-only configuration, so one analyzer can
/// serve any number of requests.
pub struct CornerAnalyzer {
    config: EngineConfig,
    classifier: PerformanceClassifier,
    insights: InsightGenerator,
    recommendations: RecommendationEngine,
}

impl CornerAnalyzer {
    pub fn new(config: EngineConfig) -> Result<Self, AeroCornerError> {
        config.validate()?;
        Ok(Self {
            classifier: PerformanceClassifier::new(config.regimes),
            insights: InsightGenerator::new(config.regimes),
            recommendations: RecommendationEngine::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Air density at the track, sea level when altitude correction is off
    pub fn air_density(&self, track: &TrackProfile) -> Result<AirDensity, AeroCornerError> {
        if self.config.physics.altitude_correction {
            AirDensity::at_altitude(track.elevation_m, &self.config.physics)
        } else {
            Ok(AirDensity::sea_level(&self.config.physics))
        }
    }

    pub fn compute_snapshot(
        &self,
        team: &str,
        track: &TrackProfile,
        aero: &AeroConfig,
        telemetry: Option<&TelemetryOverride>,
    ) -> Result<PerformanceSnapshot, AeroCornerError> {
        if team.trim().is_empty() {
            return Err(AeroCornerError::invalid_input("team", "team name must not be empty"));
        }
        track.validate()?;
        if let Some(measured) = telemetry {
            measured.validate()?;
        }

        let model =
            AeroForceModel::with_constants(*aero, self.air_density(track)?, self.config.physics)?;
        let solver = CornerSpeedSolver::new(&model, &self.config);

        let slow = self.evaluate_regime(CornerRegime::Slow, &solver, track, telemetry)?;
        let medium = self.evaluate_regime(CornerRegime::Medium, &solver, track, telemetry)?;
        let fast = self.evaluate_regime(CornerRegime::Fast, &solver, track, telemetry)?;

        let mut corners = Vec::with_capacity(track.corners.len());
        let mut degradations = Vec::new();
        for evaluation in [&slow, &medium, &fast] {
            corners.extend(evaluation.corners.iter().cloned());
            degradations.extend(evaluation.degradations.iter().cloned());
        }
        // report corners in driving order
        corners.sort_by_key(|c| {
            track
                .corners
                .iter()
                .position(|d| d.number == c.number)
                .unwrap_or(usize::MAX)
        });

        let corner_performance = [slow.performance, medium.performance, fast.performance];
        let insights = self.insights.generate(team, &corner_performance);
        let recommendations = self
            .recommendations
            .generate(&corner_performance, &model, track);
        let data_quality =
            DataQuality::from_real_count(telemetry.map_or(0, TelemetryOverride::measured_count));

        for degradation in &degradations {
            warn!("{team} at {}: {degradation}", track.name);
        }
        info!(
            "{team} at {}: slow {:.1}, medium {:.1}, fast {:.1} km/h ({:?} data)",
            track.name,
            corner_performance[0].apex_speed_kmh,
            corner_performance[1].apex_speed_kmh,
            corner_performance[2].apex_speed_kmh,
            data_quality.source
        );

        Ok(PerformanceSnapshot {
            team: team.to_string(),
            track: track.name.clone(),
            corner_performance,
            corners,
            aero_summary: self.aero_summary(&model)?,
            insights,
            recommendations,
            data_quality,
            degradations,
            setup_focus: track.downforce_level.setup_focus().to_string(),
        })
    }

    /// Analyse every team of a batch on the same track, in input order
    pub fn compute_batch(
        &self,
        track: &TrackProfile,
        entries: &[TeamEntry],
    ) -> Result<Vec<PerformanceSnapshot>, AeroCornerError> {
        entries
            .iter()
            .map(|entry| {
                self.compute_snapshot(&entry.team, track, &entry.aero, entry.telemetry.as_ref())
            })
            .collect()
    }

    fn evaluate_regime(
        &self,
        regime: CornerRegime,
        solver: &CornerSpeedSolver,
        track: &TrackProfile,
        telemetry: Option<&TelemetryOverride>,
    ) -> Result<RegimeEvaluation, AeroCornerError> {
        let thresholds = self.config.regimes.for_regime(regime);
        let measured = telemetry.and_then(|t| t.get(regime));
        let mut degradations = Vec::new();

        let mut corners = Vec::new();
        for corner in track.corners_of(regime) {
            let outcome = solver.solve(corner)?;
            // an overridden regime takes no value from the solver
            if measured.is_none() {
                degradations.extend(outcome.degradations.iter().map(|kind| Degradation {
                    regime,
                    corner_number: Some(corner.number),
                    kind: *kind,
                }));
            }
            corners.push(CornerResult {
                number: corner.number,
                name: corner.name.clone(),
                regime,
                radius_m: corner.radius_m,
                apex_speed_kmh: outcome.apex_speed_kmh,
                ideal_speed_kmh: corner.ideal_speed_kmh,
                delta_to_ideal_kmh: outcome.apex_speed_kmh - corner.ideal_speed_kmh,
            });
        }

        let (apex_speed_kmh, source) = match measured {
            Some(measured) => {
                // measured values replace the solver, but still report if they are out of range
                if measured < thresholds.min_kmh {
                    degradations.push(Degradation {
                        regime,
                        corner_number: None,
                        kind: DegradationKind::ClampedLow,
                    });
                } else if measured > thresholds.max_kmh {
                    degradations.push(Degradation {
                        regime,
                        corner_number: None,
                        kind: DegradationKind::ClampedHigh,
                    });
                }
                (thresholds.clamp(measured), DataSource::Telemetry)
            }
            None if corners.is_empty() => {
                let outcome = solver.solve_radius(regime, thresholds.nominal_radius_m)?;
                degradations.extend(outcome.degradations.iter().map(|kind| Degradation {
                    regime,
                    corner_number: None,
                    kind: *kind,
                }));
                (outcome.apex_speed_kmh, DataSource::NominalCorner)
            }
            None => {
                let mean = corners.iter().map(|c| c.apex_speed_kmh).sum::<f64>()
                    / corners.len() as f64;
                (mean, DataSource::Solver)
            }
        };

        Ok(RegimeEvaluation {
            performance: CornerPerformance {
                regime,
                apex_speed_kmh,
                performance_level: self.classifier.classify(regime, apex_speed_kmh),
                source,
                corner_count: corners.len(),
            },
            corners,
            degradations,
        })
    }

    fn aero_summary(&self, model: &AeroForceModel) -> Result<AeroSummary, AeroCornerError> {
        let reference_speed_kmh = self.config.physics.reference_speed_kmh;
        let physics = model.compute_kmh(reference_speed_kmh)?;
        Ok(AeroSummary {
            reference_speed_kmh,
            with_drs: physics.with_drs(),
            aero_balance_front_pct: model.aero_balance_front_pct(),
            porpoising: physics.porpoising_risk(),
            drs_top_speed_gain_kmh: physics.drs_top_speed_gain_kmh(),
            vortices: model.vortex_generation(physics.velocity_mps)?,
            physics,
        })
    }
}

/// Analyse one team with the default engine configuration
pub fn compute_snapshot(
    team: &str,
    track: &TrackProfile,
    aero: &AeroConfig,
    telemetry: Option<&TelemetryOverride>,
) -> Result<PerformanceSnapshot, AeroCornerError> {
    CornerAnalyzer::new(EngineConfig::default())?.compute_snapshot(team, track, aero, telemetry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{CornerDefinition, DownforceLevel};

    fn monaco() -> TrackProfile {
        TrackProfile::new("Monaco", DownforceLevel::High)
            .with_corner(CornerDefinition::new(1, CornerRegime::Medium, 60.0, 130.0).unwrap())
            .with_corner(
                CornerDefinition::new(6, CornerRegime::Slow, 12.0, 48.0)
                    .unwrap()
                    .with_name("Grand Hotel Hairpin"),
            )
            .with_corner(CornerDefinition::new(8, CornerRegime::Slow, 20.0, 65.0).unwrap())
    }

    fn car() -> AeroConfig {
        AeroConfig::new(0.70, 1.5, 2.0, 1.4).unwrap()
    }

    #[test]
    fn test_regime_sources() {
        let snapshot = compute_snapshot("Ferrari", &monaco(), &car(), None).unwrap();

        let slow = snapshot.performance(CornerRegime::Slow);
        assert_eq!(slow.source, DataSource::Solver);
        assert_eq!(slow.corner_count, 2);

        let fast = snapshot.performance(CornerRegime::Fast);
        assert_eq!(fast.source, DataSource::NominalCorner);
        assert_eq!(fast.corner_count, 0);

        assert_eq!(snapshot.data_quality.source, DataQualitySource::Simulated);
        assert_eq!(snapshot.data_quality.real_count, 0);
        assert_eq!(snapshot.data_quality.simulated_count, 3);
    }

    #[test]
    fn test_multi_corner_regime_reports_mean() {
        let snapshot = compute_snapshot("Ferrari", &monaco(), &car(), None).unwrap();
        let slow_corners: Vec<_> = snapshot
            .corners
            .iter()
            .filter(|c| c.regime == CornerRegime::Slow)
            .collect();
        assert_eq!(slow_corners.len(), 2);
        let mean = (slow_corners[0].apex_speed_kmh + slow_corners[1].apex_speed_kmh) / 2.0;
        assert!((snapshot.performance(CornerRegime::Slow).apex_speed_kmh - mean).abs() < 1e-9);
    }

    #[test]
    fn test_corners_reported_in_driving_order() {
        let snapshot = compute_snapshot("Ferrari", &monaco(), &car(), None).unwrap();
        let numbers: Vec<u32> = snapshot.corners.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 6, 8]);
        assert_eq!(snapshot.corners[1].name.as_deref(), Some("Grand Hotel Hairpin"));
    }

    #[test]
    fn test_telemetry_override_bypasses_solver() {
        let measured = TelemetryOverride::new().with(CornerRegime::Medium, 150.0);
        let snapshot = compute_snapshot("Mercedes", &monaco(), &car(), Some(&measured)).unwrap();

        let medium = snapshot.performance(CornerRegime::Medium);
        assert_eq!(medium.apex_speed_kmh, 150.0);
        assert_eq!(medium.source, DataSource::Telemetry);
        assert_eq!(snapshot.data_quality.source, DataQualitySource::Mixed);
        assert_eq!(snapshot.data_quality.real_count, 1);
        assert_eq!(snapshot.data_quality.simulated_count, 2);
    }

    #[test]
    fn test_out_of_range_telemetry_is_clamped_and_flagged() {
        let measured = TelemetryOverride::new()
            .with(CornerRegime::Slow, 30.0)
            .with(CornerRegime::Medium, 200.0)
            .with(CornerRegime::Fast, 250.0);
        let snapshot = compute_snapshot("Haas", &monaco(), &car(), Some(&measured)).unwrap();

        assert_eq!(snapshot.performance(CornerRegime::Slow).apex_speed_kmh, 40.0);
        assert_eq!(snapshot.performance(CornerRegime::Medium).apex_speed_kmh, 180.0);
        assert_eq!(snapshot.data_quality.source, DataQualitySource::Real);
        assert!(snapshot.degradations.contains(&Degradation {
            regime: CornerRegime::Slow,
            corner_number: None,
            kind: DegradationKind::ClampedLow,
        }));
        assert!(snapshot.degradations.contains(&Degradation {
            regime: CornerRegime::Medium,
            corner_number: None,
            kind: DegradationKind::ClampedHigh,
        }));
    }

    #[test]
    fn test_measured_regimes_carry_no_solver_degradations() {
        // far too tight for a fast corner, the solver result is clamped to the range floor
        let kink = TrackProfile::new("Kink", DownforceLevel::Medium)
            .with_corner(CornerDefinition::new(1, CornerRegime::Fast, 20.0, 250.0).unwrap());

        let simulated = compute_snapshot("Aston Martin", &kink, &car(), None).unwrap();
        assert!(simulated.degradations.contains(&Degradation {
            regime: CornerRegime::Fast,
            corner_number: Some(1),
            kind: DegradationKind::ClampedLow,
        }));

        let measured = TelemetryOverride::new()
            .with(CornerRegime::Slow, 80.0)
            .with(CornerRegime::Medium, 140.0)
            .with(CornerRegime::Fast, 260.0);
        let snapshot = compute_snapshot("Aston Martin", &kink, &car(), Some(&measured)).unwrap();

        assert_eq!(snapshot.data_quality.source, DataQualitySource::Real);
        assert!(snapshot.degradations.is_empty(), "{:?}", snapshot.degradations);
        assert!(!snapshot.is_degraded());
        // the corner itself is still reported with the solver's estimate
        assert_eq!(snapshot.corners.len(), 1);
        assert_eq!(snapshot.corners[0].apex_speed_kmh, 180.0);
        assert_eq!(snapshot.performance(CornerRegime::Fast).apex_speed_kmh, 260.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let bad_telemetry = TelemetryOverride::new().with(CornerRegime::Fast, f64::INFINITY);
        assert!(matches!(
            compute_snapshot("Alpine", &monaco(), &car(), Some(&bad_telemetry)),
            Err(AeroCornerError::InvalidInput { .. })
        ));
        assert!(compute_snapshot("", &monaco(), &car(), None).is_err());

        let mut bad_car = car();
        bad_car.drag_coefficient = 0.0;
        assert!(matches!(
            compute_snapshot("Alpine", &monaco(), &bad_car, None),
            Err(AeroCornerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_altitude_lowers_density() {
        let analyzer = CornerAnalyzer::new(EngineConfig::default()).unwrap();
        let mexico = monaco().with_elevation(2240.0);
        let sea = analyzer.air_density(&monaco()).unwrap();
        let high = analyzer.air_density(&mexico).unwrap();
        assert!(high.kg_per_m3() < sea.kg_per_m3());

        let mut config = EngineConfig::default();
        config.physics.altitude_correction = false;
        let flat = CornerAnalyzer::new(config).unwrap();
        assert_eq!(flat.air_density(&mexico).unwrap(), sea);
    }

    #[test]
    fn test_aero_summary() {
        let snapshot = compute_snapshot("Ferrari", &monaco(), &car(), None).unwrap();
        let summary = &snapshot.aero_summary;
        assert!(!summary.physics.drs_active);
        assert!(summary.with_drs.drs_active);
        assert!(summary.with_drs.drag_force_n < summary.physics.drag_force_n);
        assert!(summary.drs_top_speed_gain_kmh > 0.0);
        assert!(summary.vortices.total > summary.vortices.bargeboard);
        assert_eq!(snapshot.setup_focus, DownforceLevel::High.setup_focus());
    }
}
