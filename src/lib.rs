#![forbid(unsafe_code)]
#![deny(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

//! # zorder-core
//!
//! Morton (Z-order / Lebesgue) space-filling-curve codec:
//! - SWAR bit interleaving between a scalar key and D coordinates
//! - Locality analysis of consecutive keys (distance spikes, order statistics)
//! - Additive homomorphism checks with an analytical carry oracle
//!
//! The codec is a pure, stateless transform: construct it once from a bit width,
//! share it across threads, and validate inputs at the boundary.

pub mod config;
pub mod errors;
pub mod types;
/// Bit interleaving codec and its bit-by-bit reference.
pub mod codec;
/// Analyses built on top of the codec.
pub mod analysis;

pub use analysis::{
    AdditivityCell, AdditivityChecker, AdditivityGrid, DistanceSamples, DistanceStats,
    LocalityAnalyzer, LocalitySummary,
};
pub use codec::{BitCodec, MortonCodec};
pub use config::CurveConfig;
pub use errors::{Result, ZorderError};
pub use types::{Coords, DistanceSample, Key};
