//! Sample payload generation.
//!
//! When no input file is specified, we generate a payload that exercises
//! the encoder on very different bit patterns.
//!
//! # Sections
//!
//! - Constant fills (long runs of identical bits push the constraint
//!   engine hardest)
//! - Text-like bytes from a small alphabet
//! - Short repeating patterns
//! - Uniformly random bytes

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Longest single section of one kind.
const SECTION_BYTES: usize = 512;

/// Generate `size_bytes` of mixed sample payload.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let len = (size_bytes - data.len()).min(rng.gen_range(16..=SECTION_BYTES));

        match rng.gen_range(0..10u8) {
            0..=1 => {
                let fill = if rng.gen() { 0x00 } else { 0xff };
                data.extend(std::iter::repeat(fill).take(len));
            }
            2..=5 => {
                let alphabet = b"ACGTacgt storage strand primer codec.\n";
                data.extend((0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
            }
            6..=7 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(len));
            }
            _ => data.extend((0..len).map(|_| rng.gen::<u8>())),
        }
    }

    data
}

fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let pattern_len = rng.gen_range(2..=16);
    (0..pattern_len).map(|_| rng.gen()).collect()
}
