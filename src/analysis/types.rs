// Records produced by a corner performance analysis

use serde::{Deserialize, Serialize};

use crate::aero::{AeroConfig, PhysicsResult, PorpoisingRisk, VortexMetrics};
use crate::classifier::PerformanceLevel;
use crate::insights::Insight;
use crate::recommendations::Recommendation;
use crate::solver::DegradationKind;
use crate::telemetry::TelemetryOverride;
use crate::track::CornerRegime;

/// Where a regime's apex speed came from
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// Solved from the track's corners of this regime
    Solver,
    /// Solved for a nominal corner, the track has none of this regime
    NominalCorner,
    /// Measured speed supplied by the caller
    Telemetry,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CornerPerformance {
    pub regime: CornerRegime,
    pub apex_speed_kmh: f64,
    pub performance_level: PerformanceLevel,
    pub source: DataSource,
    /// Number of track corners in this regime
    pub corner_count: usize,
}

/// Solver estimate for a single corner of the track
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CornerResult {
    pub number: u32,
    pub name: Option<String>,
    pub regime: CornerRegime,
    pub radius_m: f64,
    pub apex_speed_kmh: f64,
    pub ideal_speed_kmh: f64,
    /// Apex speed minus ideal speed, negative when the car is slower
    pub delta_to_ideal_kmh: f64,
}

/// Forces on the car at the reference speed, with and without DRS
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AeroSummary {
    pub reference_speed_kmh: f64,
    pub physics: PhysicsResult,
    pub with_drs: PhysicsResult,
    pub aero_balance_front_pct: f64,
    pub porpoising: PorpoisingRisk,
    pub drs_top_speed_gain_kmh: f64,
    pub vortices: VortexMetrics,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataQualitySource {
    /// Every regime measured
    Real,
    /// Some regimes measured, some computed
    Mixed,
    /// Every regime computed
    Simulated,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataQuality {
    pub source: DataQualitySource,
    pub real_count: usize,
    pub simulated_count: usize,
}

impl DataQuality {
    pub fn from_real_count(real_count: usize) -> Self {
        let total = CornerRegime::ALL.len();
        let real_count = real_count.min(total);
        let source = match real_count {
            0 => DataQualitySource::Simulated,
            n if n == total => DataQualitySource::Real,
            _ => DataQualitySource::Mixed,
        };
        Self {
            source,
            real_count,
            simulated_count: total - real_count,
        }
    }
}

/// A computation that completed with reduced confidence
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Degradation {
    pub regime: CornerRegime,
    /// Track corner concerned, `None` for nominal corners and measured speeds
    pub corner_number: Option<u32>,
    pub kind: DegradationKind,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.corner_number {
            Some(number) => write!(f, "{} corner {}: {}", self.regime, number, self.kind),
            None => write!(f, "{} corners: {}", self.regime, self.kind),
        }
    }
}

/// Immutable result of analysing one team on one track
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PerformanceSnapshot {
    pub team: String,
    pub track: String,
    /// Slow, Medium and Fast, in that order
    pub corner_performance: [CornerPerformance; 3],
    pub corners: Vec<CornerResult>,
    pub aero_summary: AeroSummary,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub data_quality: DataQuality,
    pub degradations: Vec<Degradation>,
    pub setup_focus: String,
}

impl PerformanceSnapshot {
    pub fn performance(&self, regime: CornerRegime) -> &CornerPerformance {
        &self.corner_performance[regime.index()]
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// One line of a batch input file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeamEntry {
    pub team: String,
    pub aero: AeroConfig,
    #[serde(default)]
    pub telemetry: Option<TelemetryOverride>,
}
