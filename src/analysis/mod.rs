//! Analyses that consume codec output: step locality and additivity.

pub mod additivity;
pub mod locality;

pub use additivity::{carry_free, carry_predicate, AdditivityCell, AdditivityChecker, AdditivityGrid};
pub use locality::{
    euclidean, expected_step_distance, DistanceSamples, DistanceStats, LocalityAnalyzer,
    LocalitySummary,
};
