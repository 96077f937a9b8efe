// Qualitative performance levels per corner regime

use serde::{Deserialize, Serialize};

use crate::config::RegimeTable;
use crate::track::CornerRegime;

const EXCELLENT_THRESHOLD: f64 = 0.75;
const AVERAGE_THRESHOLD: f64 = 0.50;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PerformanceLevel {
    Excellent,
    Average,
    NeedsImprovement,
}

impl std::fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceLevel::Excellent => write!(f, "Excellent"),
            PerformanceLevel::Average => write!(f, "Average"),
            PerformanceLevel::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

/// Maps an apex speed onto a level using the position inside the regime range.
#[derive(Clone, Debug)]
pub struct PerformanceClassifier {
    regimes: RegimeTable,
}

impl PerformanceClassifier {
    pub fn new(regimes: RegimeTable) -> Self {
        Self { regimes }
    }

    /// Position of the speed inside the regime range, 0.0 at the minimum and
    /// 1.0 at the maximum. Speeds outside the range are clamped first.
    pub fn normalized_score(&self, regime: CornerRegime, speed_kmh: f64) -> f64 {
        let range = self.regimes.for_regime(regime);
        let span = range.max_kmh - range.min_kmh;
        (range.clamp(speed_kmh) - range.min_kmh) / span
    }

    pub fn classify(&self, regime: CornerRegime, speed_kmh: f64) -> PerformanceLevel {
        let score = self.normalized_score(regime, speed_kmh);
        if score >= EXCELLENT_THRESHOLD {
            PerformanceLevel::Excellent
        } else if score >= AVERAGE_THRESHOLD {
            PerformanceLevel::Average
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }
}

impl Default for PerformanceClassifier {
    fn default() -> Self {
        Self::new(RegimeTable::default())
    }
}
