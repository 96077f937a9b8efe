// Library interface for aerocorner
// This allows the binary, integration tests and benches to access the engine

pub mod aero;
pub mod analysis;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod insights;
pub mod recommendations;
pub mod solver;
pub mod telemetry;
pub mod track;
pub mod units;

// Re-export commonly used types
pub use aero::{AeroConfig, AeroForceModel, AirDensity, PhysicsResult, VortexMetrics};
pub use analysis::{
    CornerAnalyzer, CornerPerformance, DataQuality, DataQualitySource, DataSource,
    PerformanceSnapshot, TeamEntry, compute_snapshot,
};
pub use classifier::{PerformanceClassifier, PerformanceLevel};
pub use config::EngineConfig;
pub use errors::AeroCornerError;
pub use insights::{Insight, InsightGenerator, Polarity};
pub use recommendations::{Priority, Recommendation, RecommendationArea, RecommendationEngine};
pub use solver::{CornerSpeedSolver, DegradationKind};
pub use telemetry::{TelemetryOverride, TelemetrySample};
pub use track::{CornerDefinition, CornerRegime, DownforceLevel, TrackProfile};
