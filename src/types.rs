//! Common value types shared by the codec and the analyses.

use serde::{Deserialize, Serialize};

/// Scalar position on the curve.
pub type Key = u64;

/// One coordinate per axis, axis 0 first (x, y, ...).
pub type Coords<const D: usize> = [u64; D];

/// Widest key the codec supports.
pub const MAX_KEY_BITS: u32 = u64::BITS;

/// Distance between the points of `key` and `key - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    /// Key whose step from its predecessor was measured.
    pub key: Key,
    /// Euclidean distance of that step.
    pub distance: f64,
}

/// All-ones mask of the low `bits` bits.
#[inline]
pub(crate) fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
