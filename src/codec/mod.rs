//! Morton codec: key <-> coordinates by bit interleaving.
//!
//! `encode` turns a key into coordinates, `decode` turns coordinates back into
//! a key. Axis `a` owns key bits `i * D + a`; for two axes x takes the even
//! bits and y the odd bits.

pub mod reference;
pub mod swar;

use crate::config::{check_width, CurveConfig};
use crate::errors::{Result, ZorderError};
use crate::types::{low_mask, Coords, Key};

pub use swar::{SwarPlan, SwarStage};

/// Two-axis codec (x from even key bits, y from odd key bits).
pub type BitCodec = MortonCodec<2>;

/// Interleaving codec over `D` axes with a key width fixed at construction.
///
/// Holds only immutable precomputed masks, so one instance can be shared
/// across threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MortonCodec<const D: usize> {
    bits: u32,
    max_key: Key,
    max_coordinate: u64,
    plan: SwarPlan,
}

impl<const D: usize> MortonCodec<D> {
    /// Build a codec for `bits`-wide keys.
    ///
    /// Fails if `bits` is zero, above 64, or not divisible by `D`.
    pub fn new(bits: u32) -> Result<Self> {
        let dims = u32::try_from(D).unwrap_or(u32::MAX);
        check_width(bits, dims)?;

        let axis_bits = bits / dims;
        let plan = SwarPlan::new(axis_bits, dims);
        tracing::debug!(
            "Built {}-axis codec: {} key bits, {} bits per axis, {} stages",
            D,
            bits,
            axis_bits,
            plan.stages()
        );

        Ok(Self {
            bits,
            max_key: low_mask(bits),
            max_coordinate: low_mask(axis_bits),
            plan,
        })
    }

    /// Build from a validated config; the config's axis count must equal `D`.
    pub fn from_config(config: &CurveConfig) -> Result<Self> {
        config.validate()?;
        if config.dims as usize != D {
            return Err(ZorderError::DimensionMismatch {
                expected: D,
                found: config.dims,
            });
        }
        Self::new(config.bits)
    }

    /// Key width B.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Per-axis width B / D.
    pub fn axis_bits(&self) -> u32 {
        self.plan.axis_bits()
    }

    /// Number of axes.
    pub fn dims(&self) -> usize {
        D
    }

    /// Largest valid key, 2^B - 1.
    pub fn max_key(&self) -> Key {
        self.max_key
    }

    /// Largest valid coordinate, 2^(B/D) - 1.
    pub fn max_coordinate(&self) -> u64 {
        self.max_coordinate
    }

    /// Key bit positions owned by `axis`.
    pub fn lane_mask(&self, axis: usize) -> u64 {
        self.plan.lane_mask(axis as u32) & self.max_key
    }

    /// Number of SWAR stages run per axis.
    pub fn stages(&self) -> usize {
        self.plan.stages()
    }

    /// Fail with a domain error unless `key < 2^B`.
    pub fn check_key(&self, key: Key) -> Result<()> {
        if key > self.max_key {
            return Err(ZorderError::KeyOutOfRange {
                key,
                bits: self.bits,
                max: self.max_key,
            });
        }
        Ok(())
    }

    /// Fail with a domain error unless every axis value is `< 2^(B/D)`.
    pub fn check_coords(&self, coords: &Coords<D>) -> Result<()> {
        for (axis, &value) in coords.iter().enumerate() {
            if value > self.max_coordinate {
                return Err(ZorderError::CoordinateOutOfRange {
                    axis,
                    value,
                    axis_bits: self.axis_bits(),
                    max: self.max_coordinate,
                });
            }
        }
        Ok(())
    }

    /// Key -> coordinates, rejecting keys wider than B bits.
    pub fn encode(&self, key: Key) -> Result<Coords<D>> {
        self.check_key(key)?;
        Ok(self.encode_unchecked(key))
    }

    /// Key -> coordinates without a bound check.
    ///
    /// Bits above B - 1 are dropped; callers must not rely on that and should
    /// validate with [`check_key`](Self::check_key) first.
    #[inline]
    pub fn encode_unchecked(&self, key: Key) -> Coords<D> {
        let key = key & self.max_key;
        let mut coords = [0u64; D];
        for (axis, c) in coords.iter_mut().enumerate() {
            *c = self.plan.compact(key >> axis);
        }
        coords
    }

    /// Coordinates -> key, rejecting axis values wider than B / D bits.
    pub fn decode(&self, coords: &Coords<D>) -> Result<Key> {
        self.check_coords(coords)?;
        Ok(self.decode_unchecked(coords))
    }

    /// Coordinates -> key without a bound check. Excess high bits are dropped.
    #[inline]
    pub fn decode_unchecked(&self, coords: &Coords<D>) -> Key {
        coords
            .iter()
            .enumerate()
            .fold(0, |key, (axis, &c)| key | (self.plan.spread(c) << axis))
    }

    /// Fill `out` with the coordinates of keys `start`, `start + 1`, ...
    ///
    /// The whole batch is validated before anything is written. A run that
    /// leaves the key width fails with [`ZorderError::KeyRangeOutOfRange`].
    pub fn encode_range_into(&self, start: Key, out: &mut [Coords<D>]) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let range_err = ZorderError::KeyRangeOutOfRange {
            start,
            len: out.len(),
            bits: self.bits,
            max: self.max_key,
        };
        let last = u64::try_from(out.len() - 1)
            .ok()
            .and_then(|n| start.checked_add(n))
            .filter(|&last| last <= self.max_key)
            .ok_or(range_err)?;

        for (key, slot) in (start..=last).zip(out.iter_mut()) {
            *slot = self.encode_unchecked(key);
        }
        Ok(())
    }

    /// Decode `points` into `out`.
    ///
    /// The lengths must match and every point is validated before anything is
    /// written.
    pub fn decode_into(&self, points: &[Coords<D>], out: &mut [Key]) -> Result<()> {
        if points.len() != out.len() {
            return Err(ZorderError::BufferLength {
                expected: points.len(),
                found: out.len(),
            });
        }
        for p in points {
            self.check_coords(p)?;
        }
        for (p, slot) in points.iter().zip(out.iter_mut()) {
            *slot = self.decode_unchecked(p);
        }
        Ok(())
    }
}

impl MortonCodec<2> {
    /// Key -> `(x, y)`.
    pub fn encode_xy(&self, key: Key) -> Result<(u64, u64)> {
        let [x, y] = self.encode(key)?;
        Ok((x, y))
    }

    /// `(x, y)` -> key.
    pub fn decode_xy(&self, x: u64, y: u64) -> Result<Key> {
        self.decode(&[x, y])
    }
}
