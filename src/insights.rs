// Rule-based strength and weakness statements for a team's corner performance

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::analysis::CornerPerformance;
use crate::classifier::PerformanceClassifier;
use crate::config::RegimeTable;
use crate::track::CornerRegime;

/// Normalized score spread below which the car is considered well balanced
const CONSISTENT_SPREAD: f64 = 0.15;
/// Normalized score spread above which the car is considered unbalanced
const INCONSISTENT_SPREAD: f64 = 0.45;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Strength,
    Weakness,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Insight {
    pub polarity: Polarity,
    /// `None` for statements about the car as a whole
    pub regime: Option<CornerRegime>,
    pub message: String,
}

pub struct InsightGenerator {
    regimes: RegimeTable,
    classifier: PerformanceClassifier,
}

impl InsightGenerator {
    pub fn new(regimes: RegimeTable) -> Self {
        Self {
            regimes,
            classifier: PerformanceClassifier::new(regimes),
        }
    }

    /// At most one insight per regime in Slow, Medium, Fast order, followed by
    /// an optional statement about consistency across regimes.
    pub fn generate(&self, team: &str, performance: &[CornerPerformance]) -> Vec<Insight> {
        let mut insights: Vec<Insight> = CornerRegime::ALL
            .iter()
            .filter_map(|regime| {
                performance
                    .iter()
                    .find(|p| p.regime == *regime)
                    .and_then(|p| self.regime_insight(team, p))
            })
            .collect();

        if let Some(overall) = self.consistency_insight(team, performance) {
            insights.push(overall);
        }
        insights
    }

    fn regime_insight(&self, team: &str, performance: &CornerPerformance) -> Option<Insight> {
        let thresholds = self.regimes.for_regime(performance.regime);
        let speed = performance.apex_speed_kmh;
        let delta = speed - thresholds.baseline_kmh();

        let polarity = if speed >= thresholds.strength_kmh {
            Polarity::Strength
        } else if speed <= thresholds.weakness_kmh {
            Polarity::Weakness
        } else {
            return None;
        };

        let verdict = match (performance.regime, polarity) {
            (CornerRegime::Slow, Polarity::Strength) => {
                "dominant in slow-speed corners - excellent mechanical grip and suspension tuning"
            }
            (CornerRegime::Slow, Polarity::Weakness) => {
                "struggles in slow corners - improve low-speed downforce and mechanical grip"
            }
            (CornerRegime::Medium, Polarity::Strength) => {
                "excellent mid-corner balance - well-optimized aero/mechanical balance"
            }
            (CornerRegime::Medium, Polarity::Weakness) => {
                "mid-corner instability detected - review aero balance and suspension setup"
            }
            (CornerRegime::Fast, Polarity::Strength) => {
                "superior high-speed stability - strong aerodynamic package"
            }
            (CornerRegime::Fast, Polarity::Weakness) => {
                "losing time in fast corners - increase rear downforce or reduce drag"
            }
        };

        Some(Insight {
            polarity,
            regime: Some(performance.regime),
            message: format!(
                "{team} {verdict} ({speed:.1} km/h, {delta:+.1} km/h vs balanced baseline)"
            ),
        })
    }

    fn consistency_insight(
        &self,
        team: &str,
        performance: &[CornerPerformance],
    ) -> Option<Insight> {
        let spread = match performance
            .iter()
            .map(|p| self.classifier.normalized_score(p.regime, p.apex_speed_kmh))
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::MinMax(min, max) => max - min,
            MinMaxResult::OneElement(_) | MinMaxResult::NoElements => return None,
        };

        let (polarity, message) = if spread < CONSISTENT_SPREAD {
            (
                Polarity::Strength,
                format!(
                    "{team} shows consistent performance across all corner types \
                     - versatile package"
                ),
            )
        } else if spread > INCONSISTENT_SPREAD {
            (
                Polarity::Weakness,
                format!(
                    "{team} car setup lacks consistency \
                     - consider a more balanced aerodynamic approach"
                ),
            )
        } else {
            return None;
        };

        Some(Insight {
            polarity,
            regime: None,
            message,
        })
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(RegimeTable::default())
    }
}
