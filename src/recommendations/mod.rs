// Engineering recommendations derived from per-regime corner performance
//
// Recommendations come from a static rule table keyed by corner regime and
// severity band. Solution texts are templates filled in from the car's
// current aerodynamic configuration.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::aero::AeroForceModel;
use crate::analysis::CornerPerformance;
use crate::classifier::PerformanceLevel;
use crate::config::{EngineConfig, RecommendationConstants, RegimeTable};
use crate::track::{CornerRegime, TrackProfile};
use crate::units::meters_to_mm;

#[cfg(test)]
mod recommendation_tests;

/// Urgency of a recommendation, most urgent first when sorted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Critical => write!(f, "Critical"),
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
        }
    }
}

/// Part of the car's performance envelope a recommendation addresses
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecommendationArea {
    #[serde(rename = "Slow Corners")]
    SlowCorners,
    #[serde(rename = "Medium Corners")]
    MediumCorners,
    #[serde(rename = "Fast Corners")]
    FastCorners,
    #[serde(rename = "Overall Balance")]
    OverallBalance,
}

impl RecommendationArea {
    pub fn for_regime(regime: CornerRegime) -> Self {
        match regime {
            CornerRegime::Slow => RecommendationArea::SlowCorners,
            CornerRegime::Medium => RecommendationArea::MediumCorners,
            CornerRegime::Fast => RecommendationArea::FastCorners,
        }
    }
}

impl std::fmt::Display for RecommendationArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationArea::SlowCorners => write!(f, "{}", CornerRegime::Slow.area_name()),
            RecommendationArea::MediumCorners => write!(f, "{}", CornerRegime::Medium.area_name()),
            RecommendationArea::FastCorners => write!(f, "{}", CornerRegime::Fast.area_name()),
            RecommendationArea::OverallBalance => write!(f, "Overall Balance"),
        }
    }
}

/// How far below expectations a regime is
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeverityBand {
    /// At or below the regime's poor threshold
    Poor,
    /// Above the poor threshold but still classified as needing improvement
    Marginal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub area: RecommendationArea,
    pub issue: String,
    /// Suggested actions, most effective first
    pub solutions: Vec<String>,
}

struct RecommendationRule {
    regime: CornerRegime,
    band: SeverityBand,
    priority: Priority,
    issue: &'static str,
    solutions: &'static [&'static str],
}

static RULES: &[RecommendationRule] = &[
    RecommendationRule {
        regime: CornerRegime::Slow,
        band: SeverityBand::Poor,
        priority: Priority::High,
        issue: "Insufficient mechanical grip",
        solutions: &[
            "Increase front wing angle by 2-3° from {front_wing}° to improve front-end grip \
             (CL_front {cl_front} needs ~+0.2)",
            "Soften front suspension by 10% for better compliance over kerbs",
            "Review differential settings - consider more locking on entry",
            "Optimize tire pressure: reduce front by 0.2 PSI for a better contact patch",
        ],
    },
    RecommendationRule {
        regime: CornerRegime::Slow,
        band: SeverityBand::Marginal,
        priority: Priority::Medium,
        issue: "Marginal performance deficit",
        solutions: &[
            "Fine-tune front wing angle (+1° from {front_wing}°)",
            "Adjust brake bias forward by 1-2% for better rotation",
        ],
    },
    RecommendationRule {
        regime: CornerRegime::Medium,
        band: SeverityBand::Poor,
        priority: Priority::High,
        issue: "Balance issues affecting mid-corner speed",
        solutions: &[
            "Increase rear wing angle by 1-2° from {rear_wing}° for better stability \
             (target CL_rear: {target_cl_rear})",
            "Stiffen anti-roll bars by 5% to reduce body roll",
            "Review suspension geometry - adjust toe angles",
            "Consider raising ride height by 2mm from {ride_height_rear_mm}mm \
             for better aero balance",
        ],
    },
    RecommendationRule {
        regime: CornerRegime::Medium,
        band: SeverityBand::Marginal,
        priority: Priority::Medium,
        issue: "Minor stability concerns",
        solutions: &[
            "Adjust rear wing flap angle (+0.5° from {rear_wing}°)",
            "Review damper settings for better weight transfer",
        ],
    },
    RecommendationRule {
        regime: CornerRegime::Fast,
        band: SeverityBand::Poor,
        priority: Priority::Critical,
        issue: "Aerodynamic efficiency deficit",
        solutions: &[
            "Current L/D ratio: {ld} - Target: >{ld_target} for competitive fast corners",
            "Reduce drag coefficient by {cd_reduction_pct}% (Cd {cd} to {cd_target}) \
             - optimize rear wing profile",
            "Increase rear downforce by 5% without compromising drag \
             (target CL: {target_cl_total})",
            "Review floor design - seal edges to prevent flow separation",
            "Lower ride height by 3mm from {ride_height_front_mm}mm (if regulations permit) \
             for better ground effect",
            "Consider DRS optimization for straight-line speed recovery",
        ],
    },
    RecommendationRule {
        regime: CornerRegime::Fast,
        band: SeverityBand::Marginal,
        priority: Priority::Medium,
        issue: "Aerodynamic refinement needed",
        solutions: &[
            "Fine-tune rear wing angle (-0.5° to reduce drag from Cd={cd})",
            "Optimize floor edge sealing for better downforce consistency",
        ],
    },
];

const OVERALL_BALANCE_ISSUE: &str =
    "Performance imbalance across corner types \
     ({deviation} km/h total deviation from track reference)";
const OVERALL_BALANCE_SOLUTIONS: &[&str] = &[
    "Re-balance aero toward {weakest_area} where the car loses the most time",
    "Current L/D ratio: {ld} - work toward {ld_target} with a balanced wing package",
    "Review front/rear downforce split (CL_front {cl_front}, CL_rear {cl_rear})",
];

/// Values substituted into the rule templates
struct TemplateValues(Vec<(&'static str, String)>);

impl TemplateValues {
    fn for_car(model: &AeroForceModel, constants: &RecommendationConstants) -> Self {
        let config = model.config();
        let cd = config.drag_coefficient;
        let cl_total = config.cl_total();
        let cd_reduction_pct = ((cd - constants.cd_target) / cd * 100.0).max(0.0);

        Self(vec![
            ("cd", format!("{cd:.3}")),
            ("cd_target", format!("{:.3}", constants.cd_target)),
            ("cd_reduction_pct", format!("{cd_reduction_pct:.1}")),
            ("cl_front", format!("{:.2}", config.cl_front)),
            ("cl_rear", format!("{:.2}", config.cl_rear)),
            ("target_cl_rear", format!("{:.2}", cl_total * 0.55)),
            ("target_cl_total", format!("{:.2}", cl_total + 0.15)),
            ("ld", format!("{:.2}", model.ld_ratio())),
            ("ld_target", format!("{:.1}", constants.ld_target)),
            ("front_wing", format!("{:.1}", config.wing_angles.front_deg)),
            ("rear_wing", format!("{:.1}", config.wing_angles.rear_deg)),
            (
                "ride_height_front_mm",
                format!("{:.0}", meters_to_mm(config.ride_height_front_m)),
            ),
            (
                "ride_height_rear_mm",
                format!("{:.0}", meters_to_mm(config.ride_height_rear_m)),
            ),
        ])
    }

    fn with(mut self, key: &'static str, value: String) -> Self {
        self.0.push((key, value));
        self
    }

    fn render(&self, template: &str) -> String {
        self.0.iter().fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{key}}}"), value)
        })
    }
}

/// Maps classified corner performance onto prioritized engineering actions.
pub struct RecommendationEngine {
    regimes: RegimeTable,
    constants: RecommendationConstants,
}

impl RecommendationEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            regimes: config.regimes,
            constants: config.recommendations,
        }
    }

    /// Severity band of a regime, `None` when it needs no attention
    pub fn severity(&self, performance: &CornerPerformance) -> Option<SeverityBand> {
        let thresholds = self.regimes.for_regime(performance.regime);
        if performance.apex_speed_kmh <= thresholds.poor_kmh {
            Some(SeverityBand::Poor)
        } else if performance.performance_level == PerformanceLevel::NeedsImprovement {
            Some(SeverityBand::Marginal)
        } else {
            None
        }
    }

    /// Speed the track asks for in a regime: the mean ideal speed of its
    /// corners clamped into the regime range, or the balanced baseline.
    pub fn reference_speed_kmh(&self, regime: CornerRegime, track: &TrackProfile) -> f64 {
        let thresholds = self.regimes.for_regime(regime);
        track
            .mean_ideal_speed_kmh(regime)
            .map(|speed| thresholds.clamp(speed))
            .unwrap_or_else(|| thresholds.baseline_kmh())
    }

    /// Recommendations sorted by priority, Critical first. Ties keep regime
    /// order, with the overall balance recommendation after the regimes.
    pub fn generate(
        &self,
        performance: &[CornerPerformance],
        model: &AeroForceModel,
        track: &TrackProfile,
    ) -> Vec<Recommendation> {
        if performance
            .iter()
            .all(|p| p.performance_level == PerformanceLevel::Excellent)
        {
            return Vec::new();
        }

        let values = TemplateValues::for_car(model, &self.constants);
        let mut recommendations: Vec<Recommendation> = CornerRegime::ALL
            .iter()
            .filter_map(|regime| performance.iter().find(|p| p.regime == *regime))
            .filter_map(|p| {
                let band = self.severity(p)?;
                let rule = RULES
                    .iter()
                    .find(|rule| rule.regime == p.regime && rule.band == band)?;
                Some(Recommendation {
                    priority: rule.priority,
                    area: RecommendationArea::for_regime(p.regime),
                    issue: values.render(rule.issue),
                    solutions: rule.solutions.iter().map(|s| values.render(s)).collect(),
                })
            })
            .collect();

        if let Some(balance) = self.overall_balance(performance, track, values) {
            recommendations.push(balance);
        }

        recommendations.sort_by_key(|r| r.priority);
        debug!(
            "{} recommendations for {}",
            recommendations.len(),
            track.name
        );
        recommendations
    }

    fn overall_balance(
        &self,
        performance: &[CornerPerformance],
        track: &TrackProfile,
        values: TemplateValues,
    ) -> Option<Recommendation> {
        let deviations: Vec<(CornerRegime, f64)> = performance
            .iter()
            .map(|p| {
                let reference = self.reference_speed_kmh(p.regime, track);
                (p.regime, p.apex_speed_kmh - reference)
            })
            .collect();
        let total: f64 = deviations.iter().map(|(_, d)| d.abs()).sum();
        if total <= self.constants.overall_balance_deviation_kmh {
            return None;
        }

        // Most negative deviation, first in regime order on ties
        let weakest = deviations
            .iter()
            .fold(None::<(CornerRegime, f64)>, |worst, &(regime, d)| match worst {
                Some((_, w)) if w <= d => worst,
                _ => Some((regime, d)),
            })
            .map(|(regime, _)| regime.area_name().to_lowercase())
            .unwrap_or_else(|| "the weakest corner type".to_string());

        let values = values
            .with("deviation", format!("{total:.1}"))
            .with("weakest_area", weakest);
        Some(Recommendation {
            priority: Priority::Medium,
            area: RecommendationArea::OverallBalance,
            issue: values.render(OVERALL_BALANCE_ISSUE),
            solutions: OVERALL_BALANCE_SOLUTIONS
                .iter()
                .map(|s| values.render(s))
                .collect(),
        })
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
