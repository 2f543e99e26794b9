//! Bijective packing of signed chunk coordinates into one `u64` key.
//!
//! Each axis is biased by `2^(BITS-1)`, masked to `BITS` bits and shifted
//! into place, x in the lowest field. Packing is exact only inside
//! `[-BOUND, BOUND]`; outside that range keys alias. The range is a caller
//! precondition, asserted in debug builds only.

/// Bits per packed axis.
pub const BITS: u32 = 20;
/// Largest magnitude representable on every axis.
pub const BOUND: i32 = (1 << (BITS - 1)) - 1;

const BIAS: i64 = 1 << (BITS - 1);
const MASK: u64 = (1 << BITS) - 1;

/// Packed registry key for a chunk coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedCoord(pub u64);

#[inline]
pub const fn in_bounds(v: i32) -> bool {
    v >= -BOUND && v <= BOUND
}

#[inline]
fn field(v: i32) -> u64 {
    ((v as i64 + BIAS) as u64) & MASK
}

#[inline]
fn unfield(bits: u64) -> i32 {
    ((bits & MASK) as i64 - BIAS) as i32
}

#[inline]
pub fn pack(x: i32, y: i32, z: i32) -> u64 {
    debug_assert!(
        in_bounds(x) && in_bounds(y) && in_bounds(z),
        "chunk coordinate ({x}, {y}, {z}) outside packable range ±{BOUND}"
    );
    field(x) | (field(y) << BITS) | (field(z) << (2 * BITS))
}

/// Checked variant of [`pack`] for callers handling untrusted coordinates.
#[inline]
pub fn try_pack(x: i32, y: i32, z: i32) -> Option<u64> {
    if in_bounds(x) && in_bounds(y) && in_bounds(z) {
        Some(pack(x, y, z))
    } else {
        None
    }
}

#[inline]
pub fn unpack(key: u64) -> (i32, i32, i32) {
    (
        unfield(key),
        unfield(key >> BITS),
        unfield(key >> (2 * BITS)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_round_trip() {
        for &(x, y, z) in &[
            (0, 0, 0),
            (BOUND, BOUND, BOUND),
            (-BOUND, -BOUND, -BOUND),
            (BOUND, -BOUND, 0),
            (-1, 1, -1),
        ] {
            assert_eq!(unpack(pack(x, y, z)), (x, y, z));
        }
    }

    #[test]
    fn neighbours_get_distinct_keys() {
        let k = pack(-1, 0, 0);
        assert_ne!(k, pack(0, 0, 0));
        assert_ne!(k, pack(-1, -1, 0));
        assert_ne!(k, pack(-1, 0, -1));
    }

    #[test]
    fn try_pack_rejects_out_of_range() {
        assert!(try_pack(BOUND + 1, 0, 0).is_none());
        assert!(try_pack(0, -BOUND - 1, 0).is_none());
        assert_eq!(try_pack(1, 2, 3), Some(pack(1, 2, 3)));
    }

    #[test]
    fn key_fits_in_sixty_bits() {
        assert!(pack(BOUND, BOUND, BOUND) < (1u64 << (3 * BITS)));
    }
}
