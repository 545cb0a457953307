//! Does the codec commute with addition? Per-axis boolean grids over (a, b).
//!
//! `encode(a + b)[axis] == encode(a)[axis] + encode(b)[axis]` fails whenever a
//! carry in the key addition crosses into another axis' lane. The true cells
//! form a self-similar pattern; for two or more axes every axis holds at once
//! exactly when `a & b == 0`.

use rayon::prelude::*;
use serde::Serialize;

use crate::codec::{reference, MortonCodec};
use crate::errors::{Result, ZorderError};
use crate::types::Key;

/// Builds additivity grids from a shared codec.
#[derive(Debug, Clone, Copy)]
pub struct AdditivityChecker<'a, const D: usize> {
    codec: &'a MortonCodec<D>,
}

/// One `(a, b, axis, holds)` entry of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdditivityCell {
    /// Left operand.
    pub a: Key,
    /// Right operand.
    pub b: Key,
    /// Axis compared.
    pub axis: usize,
    /// Whether the axis value of `a + b` equals the sum of the axis values.
    pub holds: bool,
}

/// Dense per-axis boolean planes over [0, n] x [0, n], row-major in `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditivityGrid<const D: usize> {
    side: usize,
    planes: Vec<Vec<bool>>,
}

impl<'a, const D: usize> AdditivityChecker<'a, D> {
    /// Checker over a shared codec.
    pub fn new(codec: &'a MortonCodec<D>) -> Self {
        Self { codec }
    }

    /// Evaluate every `(a, b)` in [0, n] x [0, n] on every axis.
    ///
    /// `a`, `b` and `a + b` are each encoded on their own. `2n` must be a valid
    /// key so that every sum stays in range.
    pub fn check(&self, n: u64) -> Result<AdditivityGrid<D>> {
        let max_sum = n.checked_mul(2).ok_or(ZorderError::GridTooLarge { n })?;
        self.codec.check_key(max_sum)?;

        let side = usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or(ZorderError::GridTooLarge { n })?;
        let cells = side
            .checked_mul(side)
            .ok_or(ZorderError::GridTooLarge { n })?;

        tracing::info!(
            "Checking additivity over [0, {}]^2 ({} cells x {} axes)",
            n,
            cells,
            D
        );

        let codec = self.codec;
        let mut planes = vec![vec![false; cells]; D];

        // Regroup the planes as one set of D row slices per operand `a`.
        let mut rows: Vec<Vec<&mut [bool]>> = (0..side).map(|_| Vec::with_capacity(D)).collect();
        for plane in planes.iter_mut() {
            for (row, chunk) in rows.iter_mut().zip(plane.chunks_mut(side)) {
                row.push(chunk);
            }
        }

        rows.into_par_iter().enumerate().for_each(|(ai, mut row)| {
            let a = ai as Key;
            let ca = codec.encode_unchecked(a);
            for bi in 0..side {
                let b = bi as Key;
                let cb = codec.encode_unchecked(b);
                let cs = codec.encode_unchecked(a + b);
                for (axis, plane_row) in row.iter_mut().enumerate() {
                    plane_row[bi] =
                        u128::from(cs[axis]) == u128::from(ca[axis]) + u128::from(cb[axis]);
                }
            }
        });

        Ok(AdditivityGrid { side, planes })
    }
}

impl<const D: usize> AdditivityGrid<D> {
    /// Operands per side, `n + 1`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Largest operand `n`.
    pub fn max_operand(&self) -> Key {
        self.side as Key - 1
    }

    /// Result for `(a, b)` on `axis`, `None` outside the grid.
    pub fn holds(&self, a: Key, b: Key, axis: usize) -> Option<bool> {
        let plane = self.planes.get(axis)?;
        let (a, b) = (usize::try_from(a).ok()?, usize::try_from(b).ok()?);
        if a >= self.side || b >= self.side {
            return None;
        }
        plane.get(a * self.side + b).copied()
    }

    /// Row-major plane for one axis.
    ///
    /// # Panics
    /// If `axis >= D`.
    pub fn plane(&self, axis: usize) -> &[bool] {
        &self.planes[axis]
    }

    /// Every cell of every plane, axis by axis.
    pub fn cells(&self) -> impl Iterator<Item = AdditivityCell> + '_ {
        let side = self.side;
        self.planes.iter().enumerate().flat_map(move |(axis, plane)| {
            plane.iter().enumerate().map(move |(i, &holds)| AdditivityCell {
                a: (i / side) as Key,
                b: (i % side) as Key,
                axis,
                holds,
            })
        })
    }
}

/// Whether adding `a` and `b` generates no carry anywhere.
///
/// With two or more axes and `a + b` in range, this is exactly when every
/// axis is additive at once.
pub fn carry_free(a: Key, b: Key) -> bool {
    a & b == 0
}

/// Predict whether `axis` is additive for `(a, b)` without the SWAR codec.
///
/// Compares carries: the carry entering key bit `k * dims + axis` during
/// `a + b` must equal the carry entering bit `k` of the axis-only sum, for
/// every `k`, and the axis-only sum must not overflow `axis_bits`.
///
/// Requires `axis < dims` and `dims * axis_bits <= 64`, and assumes `a + b`
/// fits in `dims * axis_bits` bits.
pub fn carry_predicate(a: Key, b: Key, axis: usize, dims: usize, axis_bits: u32) -> bool {
    debug_assert!(axis < dims, "axis {} out of {} axes", axis, dims);
    let (axis, dims) = (axis as u32, u32::try_from(dims).unwrap_or(u32::MAX));
    debug_assert!(
        reference::fits_key(dims, axis_bits),
        "{} x {} bits exceed a key",
        dims,
        axis_bits
    );
    let (wa, wb) = (u128::from(a), u128::from(b));
    let key_carries = (wa + wb) ^ wa ^ wb;

    let xa = u128::from(reference::axis_value(a, axis, dims, axis_bits));
    let xb = u128::from(reference::axis_value(b, axis, dims, axis_bits));
    let axis_sum = xa + xb;
    if axis_sum >> axis_bits != 0 {
        return false;
    }
    let axis_carries = axis_sum ^ xa ^ xb;

    (0..axis_bits).all(|k| {
        let key_carry = (key_carries >> (k * dims + axis)) & 1;
        let axis_carry = (axis_carries >> k) & 1;
        key_carry == axis_carry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BitCodec;

    #[test]
    fn small_grid_by_hand() {
        let codec = BitCodec::new(8).unwrap();
        let grid = AdditivityChecker::new(&codec).check(3).unwrap();
        assert_eq!(grid.side(), 4);
        assert_eq!(grid.max_operand(), 3);

        // 1 + 1 = 2: the x carry lands in y.
        assert_eq!(grid.holds(1, 1, 0), Some(false));
        assert_eq!(grid.holds(1, 1, 1), Some(false));
        // 1 + 2 = 3: disjoint bits.
        assert_eq!(grid.holds(1, 2, 0), Some(true));
        assert_eq!(grid.holds(1, 2, 1), Some(true));
        // 3 + 1 = 4: x carry ripples through y bit 0 into x bit 1.
        assert_eq!(grid.holds(3, 1, 0), Some(true));
        assert_eq!(grid.holds(3, 1, 1), Some(false));

        assert_eq!(grid.holds(4, 0, 0), None);
        assert_eq!(grid.holds(0, 0, 2), None);
        assert_eq!(grid.cells().count(), 2 * 16);
    }

    #[test]
    fn sums_must_stay_in_range() {
        let codec = BitCodec::new(8).unwrap();
        let checker = AdditivityChecker::new(&codec);
        assert!(checker.check(127).is_ok());
        assert!(matches!(
            checker.check(128),
            Err(ZorderError::KeyOutOfRange { key: 256, .. })
        ));
        let wide = BitCodec::new(64).unwrap();
        assert!(AdditivityChecker::new(&wide).check(u64::MAX / 2 + 1).is_err());
    }

    #[test]
    fn predicate_examples() {
        assert!(carry_predicate(3, 1, 0, 2, 4));
        assert!(!carry_predicate(3, 1, 1, 2, 4));
        assert!(!carry_predicate(2, 2, 0, 2, 4));
        assert!(carry_free(0b0101, 0b1010));
        assert!(!carry_free(3, 1));
        // x = 15 on both sides: the axis sum overflows 4 bits.
        assert!(!carry_predicate(0b0101_0101, 0b0101_0101, 0, 2, 4));
    }

    #[test]
    fn planes_match_direct_evaluation() {
        let codec = MortonCodec::<3>::new(12).unwrap();
        let grid = AdditivityChecker::new(&codec).check(20).unwrap();
        assert_eq!(grid.side(), 21);
        for a in 0..=20u64 {
            let ca = codec.encode(a).unwrap();
            for b in 0..=20u64 {
                let cb = codec.encode(b).unwrap();
                let cs = codec.encode(a + b).unwrap();
                for axis in 0..3 {
                    let expected = cs[axis] == ca[axis] + cb[axis];
                    assert_eq!(grid.holds(a, b, axis), Some(expected), "({}, {}) axis {}", a, b, axis);
                    assert_eq!(grid.plane(axis)[a as usize * 21 + b as usize], expected);
                }
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of 2 axes")]
    fn predicate_rejects_missing_axis() {
        carry_predicate(1, 2, 2, 2, 32);
    }
}
