//! Bit-at-a-time interleaving, the definition the SWAR codec must reproduce.
//!
//! Key bit `i * D + a` is bit `i` of axis `a`. Slow on purpose; used as the
//! oracle in tests and as the baseline in benchmarks.

/// Interleave `coords` (axis 0 in the lowest lane) into a key.
///
/// Only the low `axis_bits` bits of each coordinate are read.
/// `coords.len() * axis_bits` must not exceed 64.
pub fn interleave(coords: &[u64], axis_bits: u32) -> u64 {
    let dims = coords.len() as u32;
    debug_assert!(fits_key(dims, axis_bits), "{} x {} bits exceed a key", dims, axis_bits);
    let mut key = 0u64;
    for i in 0..axis_bits {
        for (axis, &c) in coords.iter().enumerate() {
            let bit = (c >> i) & 1;
            key |= bit << (i * dims + axis as u32);
        }
    }
    key
}

/// Split `key` into `out.len()` axes of `axis_bits` bits each.
///
/// `out.len() * axis_bits` must not exceed 64.
pub fn deinterleave(key: u64, axis_bits: u32, out: &mut [u64]) {
    let dims = out.len() as u32;
    debug_assert!(fits_key(dims, axis_bits), "{} x {} bits exceed a key", dims, axis_bits);
    for (axis, c) in out.iter_mut().enumerate() {
        *c = 0;
        for i in 0..axis_bits {
            let bit = (key >> (i * dims + axis as u32)) & 1;
            *c |= bit << i;
        }
    }
}

/// Read axis `axis` out of `key` without touching the other lanes.
///
/// Requires `axis < dims` and `dims * axis_bits <= 64`.
pub fn axis_value(key: u64, axis: u32, dims: u32, axis_bits: u32) -> u64 {
    debug_assert!(axis < dims, "axis {} out of {} axes", axis, dims);
    debug_assert!(fits_key(dims, axis_bits), "{} x {} bits exceed a key", dims, axis_bits);
    (0..axis_bits).fold(0u64, |acc, i| acc | (((key >> (i * dims + axis)) & 1) << i))
}

/// Whether `dims` lanes of `axis_bits` bits fit in a `u64` key.
pub(crate) fn fits_key(dims: u32, axis_bits: u32) -> bool {
    dims.checked_mul(axis_bits).is_some_and(|w| w <= u64::BITS)
}
