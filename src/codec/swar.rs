//! SWAR spread / compact plans derived from the axis width and axis count.
//!
//! With chunk size `c` (a power of two), bit `i` of an axis value sits at
//! `(i % c) + (i / c) * c * D`. A value is contiguous when `c >= axis_bits`,
//! fully interleaved when `c == 1`. Each stage halves or doubles `c`.

use crate::types::low_mask;

/// One shift-and-merge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwarStage {
    /// Distance the moving half travels.
    pub shift: u32,
    /// Bits that survive the merge.
    pub mask: u64,
}

/// Precomputed stages for one (axis width, axis count) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarPlan {
    dims: u32,
    axis_bits: u32,
    /// Key positions of axis 0: every `dims`-th bit.
    lane_mask: u64,
    /// Low `axis_bits` bits.
    axis_mask: u64,
    /// Contiguous -> interleaved, widest chunk first.
    spread: Vec<SwarStage>,
    /// Interleaved -> contiguous, narrowest chunk first.
    compact: Vec<SwarStage>,
}

impl SwarPlan {
    /// Derive the plan. Caller guarantees `dims >= 1`, `axis_bits >= 1` and
    /// `axis_bits * dims <= 64`.
    pub fn new(axis_bits: u32, dims: u32) -> Self {
        let top = axis_bits.next_power_of_two();

        let mut spread = Vec::new();
        let mut c = top / 2;
        while c >= 1 {
            spread.push(SwarStage {
                shift: c * (dims - 1),
                mask: chunk_mask(axis_bits, dims, c),
            });
            c /= 2;
        }

        let mut compact = Vec::with_capacity(spread.len());
        let mut c = 1;
        while c < top {
            compact.push(SwarStage {
                shift: c * (dims - 1),
                mask: chunk_mask(axis_bits, dims, 2 * c),
            });
            c *= 2;
        }

        Self {
            dims,
            axis_bits,
            lane_mask: chunk_mask(axis_bits, dims, 1),
            axis_mask: low_mask(axis_bits),
            spread,
            compact,
        }
    }

    /// Number of shift-and-merge stages in each direction.
    pub fn stages(&self) -> usize {
        self.spread.len()
    }

    /// Per-axis width.
    pub fn axis_bits(&self) -> u32 {
        self.axis_bits
    }

    /// Key bit positions owned by `axis`.
    pub fn lane_mask(&self, axis: u32) -> u64 {
        debug_assert!(axis < self.dims);
        self.lane_mask << axis
    }

    /// Move bit `i` of `v` to position `i * dims`.
    #[inline]
    pub fn spread(&self, v: u64) -> u64 {
        let mut v = v & self.axis_mask;
        for stage in &self.spread {
            v = (v | (v << stage.shift)) & stage.mask;
        }
        v
    }

    /// Inverse of [`spread`](Self::spread): gather bits at `i * dims` into bit `i`.
    #[inline]
    pub fn compact(&self, v: u64) -> u64 {
        let mut v = v & self.lane_mask;
        for stage in &self.compact {
            v = (v | (v >> stage.shift)) & stage.mask;
        }
        v
    }
}

/// Positions occupied by an `axis_bits`-wide value laid out in chunks of `c`.
fn chunk_mask(axis_bits: u32, dims: u32, c: u32) -> u64 {
    (0..axis_bits).fold(0u64, |mask, i| {
        let pos = (i % c) + (i / c) * c * dims;
        mask | (1u64 << pos)
    })
}
