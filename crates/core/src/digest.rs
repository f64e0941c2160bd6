//! Keyed pseudorandom digest driving symbol selection.
//!
//! The encoder and decoder both call [`digest`] with the same
//! (history, position, salt) triple to agree on which of the currently
//! allowed nucleotides stands for which payload value. It is a pure function:
//! no time, address or global state feeds into it.
//!
//! # Key Layout
//!
//! ```text
//!  63        42 41       34 33      24 23             0
//! +------------+-----------+----------+----------------+
//! |   unused   | position  | history  |      salt      |
//! |            | (10 bits) | (8 bits) |   (24 bits)    |
//! +------------+-----------+----------+----------------+
//! ```

/// Number of previously encoded payload bits mixed into the key.
pub const HISTORY_BITS: u32 = 8;

/// Number of low position bits mixed into the key.
pub const POSITION_BITS: u32 = 10;

/// Number of salt bits mixed into the key.
pub const SALT_BITS: u32 = 24;

pub const HISTORY_MASK: u64 = (1 << HISTORY_BITS) - 1;
pub const POSITION_MASK: u64 = (1 << POSITION_BITS) - 1;
pub const SALT_MASK: u64 = (1 << SALT_BITS) - 1;

/// 64-bit integer hash (multiply / xorshift mixer).
#[inline]
pub fn mix64(u: u64) -> u64 {
    let mut v = u
        .wrapping_mul(3_935_559_000_370_003_845)
        .wrapping_add(2_691_343_689_449_507_681);
    v ^= v >> 21;
    v ^= v << 37;
    v ^= v >> 4;
    v = v.wrapping_mul(4_768_777_513_237_032_717);
    v ^= v << 20;
    v ^= v >> 41;
    v ^= v << 5;
    v
}

/// Hash an integer with the same mixer the codec uses, keeping 32 bits.
///
/// Exposed so external tools can check they reproduce the codec's hashing.
pub fn hashint(n: u64) -> u32 {
    (mix64(n) & 0xffff_ffff) as u32
}

/// Combine history, position and salt into one key and reduce the hash of
/// that key modulo `modulus`.
///
/// `modulus` must be in `1..=4` (the size of an allowed-symbol list).
#[inline]
pub fn digest(history: u64, position: usize, salt: u64, modulus: u32) -> u32 {
    debug_assert!((1..=4).contains(&modulus));
    let key = ((((position as u64 & POSITION_MASK) << HISTORY_BITS) | (history & HISTORY_MASK))
        << SALT_BITS)
        | (salt & SALT_MASK);
    (mix64(key) % u64::from(modulus)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        for pos in [0usize, 1, 17, 1023, 1024, 5000] {
            let a = digest(0xab, pos, 0x123456, 4);
            let b = digest(0xab, pos, 0x123456, 4);
            assert_eq!(a, b);
            assert!(a < 4);
        }
    }

    #[test]
    fn test_digest_position_wraps() {
        // Only the low 10 position bits participate
        assert_eq!(digest(3, 5, 7, 4), digest(3, 5 + 1024, 7, 4));
    }

    #[test]
    fn test_digest_masks_history_and_salt() {
        assert_eq!(digest(0x1ff, 9, 1, 3), digest(0xff, 9, 1, 3));
        assert_eq!(digest(1, 9, 1 << 24 | 5, 3), digest(1, 9, 5, 3));
    }

    #[test]
    fn test_modulus_one_is_zero() {
        for salt in 0..50 {
            assert_eq!(digest(0, 3, salt, 1), 0);
        }
    }

    #[test]
    fn test_digest_spreads_over_symbols() {
        let mut counts = [0usize; 4];
        for salt in 0..4000u64 {
            counts[digest(0, 0, salt, 4) as usize] += 1;
        }
        for &c in &counts {
            assert!(c > 800 && c < 1200, "skewed counts {:?}", counts);
        }
    }

    #[test]
    fn test_hashint_keeps_low_bits() {
        assert_eq!(hashint(12345), hashint(12345));
        assert_eq!(u64::from(hashint(0)), mix64(0) & 0xffff_ffff);
        assert_ne!(hashint(1), hashint(2));
    }
}
