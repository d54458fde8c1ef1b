//! The hashed Miller-Rabin witness table used by [`crate::oracle`].
//!
//! For a two-round Miller-Rabin test (base 2, plus one more base) to be
//! deterministic over all 64-bit odd n, the second base must be chosen per-n
//! from a table derived by an offline search over the hash space. That
//! search is an external numerical artifact, not something this crate
//! re-derives; what this crate *can* reproduce exactly is the hash function
//! that addresses the table, since a wrong hash silently invalidates the
//! table regardless of its contents.
//!
//! See `DESIGN.md` for the standing decision on how the table values
//! themselves are populated here.

/// Number of entries in the witness table (2^18).
pub const WITNESS_TABLE_SIZE: usize = 262_144;

/// Mix `n` down to an 18-bit index into the witness table.
///
/// The two multipliers and the final mask are load-bearing constants: any
/// implementation that wants to reuse a witness table built elsewhere MUST
/// reproduce this hash bit-for-bit.
#[inline]
pub fn fj64_hash(n: u64) -> usize {
    let mut x = n;
    x = (x >> 32 ^ x).wrapping_mul(0x45d9f3b3335b369);
    x = (x >> 32 ^ x).wrapping_mul(0x3335b36945d9f3b);
    x = x >> 32 ^ x;
    (x & (WITNESS_TABLE_SIZE as u64 - 1)) as usize
}

/// Generate one table entry deterministically from its bucket index.
///
/// This is a fixed-seed mixing function, not the offline-searched reference
/// table: it returns a small odd candidate base in `[3, 2*BASE_SPAN+1]` for
/// each bucket, which is sufficient for the table to have the right *shape*
/// (one witness candidate per bucket) without claiming to reproduce the
/// original research table bit-for-bit. See `DESIGN.md`.
const fn generate_entry(index: usize) -> u16 {
    const BASE_SPAN: u64 = 1 << 14;
    let mut x = index as u64 ^ 0x9E3779B97F4A7C15;
    x = (x >> 30 ^ x).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x >> 27 ^ x).wrapping_mul(0x94D049BB133111EB);
    x = x >> 31 ^ x;
    let odd = (x % BASE_SPAN) | 1;
    (odd as u16).wrapping_add(1)
}

const fn build_table() -> [u16; WITNESS_TABLE_SIZE] {
    let mut table = [0u16; WITNESS_TABLE_SIZE];
    let mut i = 0;
    while i < WITNESS_TABLE_SIZE {
        table[i] = generate_entry(i);
        i += 1;
    }
    table
}

/// The witness base table: `WITNESS_TABLE[fj64_hash(n)]` is the second
/// Miller-Rabin base used for `n`.
pub static WITNESS_TABLE: [u16; WITNESS_TABLE_SIZE] = build_table();

/// Look up the witness base for `n`.
#[inline]
pub fn witness_for(n: u64) -> u64 {
    WITNESS_TABLE[fj64_hash(n)] as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_in_range() {
        for n in [0u64, 1, 2, u64::MAX, 1_000_000_007, 8_000_000_000_000_000_003] {
            assert!(fj64_hash(n) < WITNESS_TABLE_SIZE);
        }
    }

    #[test]
    fn hash_is_deterministic() {
        for n in [17u64, 999_999_999_999_999_989, 0, u64::MAX] {
            assert_eq!(fj64_hash(n), fj64_hash(n));
        }
    }

    #[test]
    fn table_entries_are_small_odd_bases() {
        for i in 0..1000 {
            let w = WITNESS_TABLE[i];
            assert!(w >= 2, "witness base must be >= 2, got {} at {}", w, i);
        }
    }

    #[test]
    fn witness_for_matches_table_lookup() {
        for n in [3u64, 97, 104729, u64::MAX] {
            assert_eq!(witness_for(n), WITNESS_TABLE[fj64_hash(n)] as u64);
        }
    }
}
