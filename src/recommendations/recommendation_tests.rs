#[cfg(test)]
mod recommendation_rule_tests {
    use crate::aero::{AeroConfig, AeroForceModel, AirDensity};
    use crate::analysis::{CornerPerformance, DataSource};
    use crate::classifier::PerformanceClassifier;
    use crate::recommendations::{Priority, RecommendationArea, RecommendationEngine, SeverityBand};
    use crate::track::{CornerDefinition, CornerRegime, DownforceLevel, TrackProfile};

    fn model() -> AeroForceModel {
        let config = AeroConfig::new(0.75, 1.5, 2.0, 1.4).unwrap();
        AeroForceModel::new(config, AirDensity::default()).unwrap()
    }

    fn performance(speeds: [f64; 3]) -> Vec<CornerPerformance> {
        let classifier = PerformanceClassifier::default();
        CornerRegime::ALL
            .iter()
            .zip(speeds)
            .map(|(regime, speed)| CornerPerformance {
                regime: *regime,
                apex_speed_kmh: speed,
                performance_level: classifier.classify(*regime, speed),
                source: DataSource::Solver,
                corner_count: 1,
            })
            .collect()
    }

    /// Track with no corners, so every regime reference is the range midpoint
    fn empty_track() -> TrackProfile {
        TrackProfile::new("Test Track", DownforceLevel::Medium)
    }

    #[test]
    fn test_all_excellent_yields_no_recommendations() {
        let engine = RecommendationEngine::default();
        let recs = engine.generate(&performance([100.0, 170.0, 310.0]), &model(), &empty_track());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_severity_bands() {
        let engine = RecommendationEngine::default();
        let perf = performance([55.0, 110.0, 150.0]);
        assert_eq!(engine.severity(&perf[0]), Some(SeverityBand::Poor));
        assert_eq!(engine.severity(&perf[1]), Some(SeverityBand::Poor));

        // Above poor but still in the bottom half of the range
        let perf = performance([60.0, 120.0, 230.0]);
        assert_eq!(engine.severity(&perf[0]), Some(SeverityBand::Marginal));
        assert_eq!(engine.severity(&perf[1]), Some(SeverityBand::Marginal));
        assert_eq!(engine.severity(&perf[2]), Some(SeverityBand::Marginal));

        let perf = performance([80.0, 140.0, 260.0]);
        assert!(perf.iter().all(|p| engine.severity(p).is_none()));
    }

    #[test]
    fn test_priority_mapping() {
        let engine = RecommendationEngine::default();
        let recs = engine.generate(&performance([50.0, 100.0, 200.0]), &model(), &empty_track());

        let fast = recs
            .iter()
            .find(|r| r.area == RecommendationArea::FastCorners)
            .unwrap();
        assert_eq!(fast.priority, Priority::Critical);
        assert_eq!(fast.issue, "Aerodynamic efficiency deficit");

        let slow = recs
            .iter()
            .find(|r| r.area == RecommendationArea::SlowCorners)
            .unwrap();
        assert_eq!(slow.priority, Priority::High);

        let medium = recs
            .iter()
            .find(|r| r.area == RecommendationArea::MediumCorners)
            .unwrap();
        assert_eq!(medium.priority, Priority::High);

        // Marginal regimes are always medium priority
        let recs = engine.generate(&performance([60.0, 120.0, 230.0]), &model(), &empty_track());
        assert!(
            recs.iter()
                .filter(|r| r.area != RecommendationArea::OverallBalance)
                .all(|r| r.priority == Priority::Medium)
        );
    }

    #[test]
    fn test_sorted_critical_first_with_balance_last() {
        let engine = RecommendationEngine::default();
        let recs = engine.generate(&performance([50.0, 100.0, 200.0]), &model(), &empty_track());

        assert_eq!(recs[0].priority, Priority::Critical);
        for pair in recs.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
        // Slow before medium within the High priority group
        assert_eq!(recs[1].area, RecommendationArea::SlowCorners);
        assert_eq!(recs[2].area, RecommendationArea::MediumCorners);
        assert_eq!(recs.last().unwrap().area, RecommendationArea::OverallBalance);
    }

    #[test]
    fn test_solutions_are_rendered_from_config() {
        let engine = RecommendationEngine::default();
        let recs = engine.generate(&performance([80.0, 140.0, 200.0]), &model(), &empty_track());
        let fast = recs
            .iter()
            .find(|r| r.area == RecommendationArea::FastCorners)
            .unwrap();

        // L/D = 3.5 / 0.75
        assert!(fast.solutions[0].contains("4.67"));
        assert!(fast.solutions[1].contains("0.750"));
        assert!(fast.solutions.iter().all(|s| !s.contains('{')));
    }

    #[test]
    fn test_overall_balance_uses_track_reference() {
        let engine = RecommendationEngine::default();
        // Ideal speeds match the computed ones, so nothing is out of balance
        let track = TrackProfile::new("Matched", DownforceLevel::Medium)
            .with_corner(CornerDefinition::new(1, CornerRegime::Slow, 20.0, 60.0).unwrap())
            .with_corner(CornerDefinition::new(2, CornerRegime::Medium, 60.0, 120.0).unwrap())
            .with_corner(CornerDefinition::new(3, CornerRegime::Fast, 150.0, 230.0).unwrap());
        let recs = engine.generate(&performance([60.0, 120.0, 230.0]), &model(), &track);
        assert!(recs.iter().all(|r| r.area != RecommendationArea::OverallBalance));

        // Same performance measured against the midpoints: 15 + 15 + 20 = 50 km/h deviation
        let recs = engine.generate(&performance([60.0, 120.0, 230.0]), &model(), &empty_track());
        let balance = recs
            .iter()
            .find(|r| r.area == RecommendationArea::OverallBalance)
            .unwrap();
        assert_eq!(balance.priority, Priority::Medium);
        assert!(balance.issue.contains("50.0"));
        assert!(balance.solutions[0].contains("fast corners"));
    }

    #[test]
    fn test_reference_speed_is_clamped() {
        let engine = RecommendationEngine::default();
        let track = TrackProfile::new("Odd", DownforceLevel::Low)
            .with_corner(CornerDefinition::new(1, CornerRegime::Slow, 10.0, 20.0).unwrap());
        assert_eq!(engine.reference_speed_kmh(CornerRegime::Slow, &track), 40.0);
        assert_eq!(engine.reference_speed_kmh(CornerRegime::Fast, &track), 250.0);
    }

    #[test]
    fn test_area_serializes_with_display_name() {
        let json = serde_json::to_string(&RecommendationArea::OverallBalance).unwrap();
        assert_eq!(json, "\"Overall Balance\"");
        assert_eq!(RecommendationArea::SlowCorners.to_string(), "Slow Corners");
    }
}

#[cfg(test)]
mod proptests {
    use crate::aero::{AeroConfig, AeroForceModel, AirDensity};
    use crate::analysis::{CornerPerformance, DataSource};
    use crate::classifier::{PerformanceClassifier, PerformanceLevel};
    use crate::recommendations::RecommendationEngine;
    use crate::track::{CornerRegime, DownforceLevel, TrackProfile};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Recommendations are sorted and present whenever a regime needs improvement
        #[test]
        fn prop_sorted_and_non_empty_when_needed(
            slow in 40.0f64..110.0,
            medium in 90.0f64..180.0,
            fast in 180.0f64..320.0,
        ) {
            let classifier = PerformanceClassifier::default();
            let performance: Vec<CornerPerformance> = CornerRegime::ALL
                .iter()
                .zip([slow, medium, fast])
                .map(|(regime, speed)| CornerPerformance {
                    regime: *regime,
                    apex_speed_kmh: speed,
                    performance_level: classifier.classify(*regime, speed),
                    source: DataSource::Solver,
                    corner_count: 0,
                })
                .collect();
            let model = AeroForceModel::new(
                AeroConfig::new(0.7, 1.5, 2.0, 1.4).unwrap(),
                AirDensity::default(),
            ).unwrap();
            let track = TrackProfile::new("Prop", DownforceLevel::Medium);

            let recs = RecommendationEngine::default().generate(&performance, &model, &track);

            for pair in recs.windows(2) {
                prop_assert!(pair[0].priority <= pair[1].priority);
            }
            let needs_work = performance
                .iter()
                .any(|p| p.performance_level == PerformanceLevel::NeedsImprovement);
            if needs_work {
                prop_assert!(!recs.is_empty());
            }
        }
    }
}
