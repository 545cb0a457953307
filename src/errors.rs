//! Error types for zorder-core.

use thiserror::Error;

/// Top-level error type for codec construction, boundary checks and analyses.
#[derive(Debug, Error)]
pub enum ZorderError {
    /// Key width is zero, wider than the key type, or not divisible by the axis count.
    #[error("configuration error: bit width {bits} must be in 1..={max} and divisible by {dims} axes")]
    InvalidWidth {
        /// Requested key width.
        bits: u32,
        /// Number of interleaved axes.
        dims: u32,
        /// Widest supported key.
        max: u32,
    },

    /// A codec needs at least one axis.
    #[error("configuration error: dimension count {dims} must be at least 1")]
    InvalidDimensions {
        /// Requested axis count.
        dims: u32,
    },

    /// Configured axis count does not match the codec being built.
    #[error("configuration error: codec has {expected} axes but config asks for {found}")]
    DimensionMismatch {
        /// Axis count of the codec type.
        expected: usize,
        /// Axis count found in the configuration.
        found: u32,
    },

    /// Key does not fit in the configured width.
    #[error("domain error: key {key} exceeds {bits}-bit bound {max}")]
    KeyOutOfRange {
        /// Offending key.
        key: u64,
        /// Configured key width.
        bits: u32,
        /// Largest valid key.
        max: u64,
    },

    /// A run of consecutive keys leaves the configured width.
    #[error("domain error: {len} keys from {start} exceed {bits}-bit bound {max}")]
    KeyRangeOutOfRange {
        /// First key of the run.
        start: u64,
        /// Number of keys requested.
        len: usize,
        /// Configured key width.
        bits: u32,
        /// Largest valid key.
        max: u64,
    },

    /// Output buffer length differs from the input batch.
    #[error("buffer error: expected {expected} output slots, found {found}")]
    BufferLength {
        /// Slots needed, one per input.
        expected: usize,
        /// Slots provided.
        found: usize,
    },

    /// Coordinate does not fit in the per-axis width.
    #[error("domain error: coordinate {value} on axis {axis} exceeds {axis_bits}-bit bound {max}")]
    CoordinateOutOfRange {
        /// Axis index.
        axis: usize,
        /// Offending coordinate.
        value: u64,
        /// Per-axis width.
        axis_bits: u32,
        /// Largest valid coordinate.
        max: u64,
    },

    /// Additivity domain too large to materialize.
    #[error("domain error: grid over [0, {n}]^2 does not fit in memory")]
    GridTooLarge {
        /// Requested operand bound.
        n: u64,
    },

    /// Percentile outside [0, 100].
    #[error("percentile {0} must lie in [0, 100]")]
    InvalidPercentile(f64),

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serde serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for zorder-core operations.
pub type Result<T> = std::result::Result<T, ZorderError>;
