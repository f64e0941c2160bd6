//! Synthesis/sequencing channel simulator.
//!
//! Corrupts a codetext with substitutions, deletions and insertions in a
//! single left-to-right pass, the way a noisy write/read cycle would.
//!
//! # Simulated Effects
//!
//! - **Insertion**: a uniformly random extra nucleotide, drawn repeatedly
//!   before each input symbol (does not consume input)
//! - **Deletion**: the input symbol is dropped
//! - **Substitution**: the input symbol is replaced by one of the three
//!   other nucleotides, uniformly
//!
//! # Determinism
//!
//! All randomness comes from a seeded ChaCha8 RNG. Given the same seed
//! and inputs, outputs are bit-identical.

use crate::alphabet;
use crate::error::{ConfigError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-symbol error probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Substitution probability [0.0, 1.0]
    pub sub_rate: f64,

    /// Deletion probability [0.0, 1.0]
    pub del_rate: f64,

    /// Insertion probability [0.0, 1.0)
    pub ins_rate: f64,

    /// Random seed for determinism
    pub seed: u64,
}

impl ChannelConfig {
    /// A channel that passes every symbol through.
    pub fn perfect(seed: u64) -> Self {
        Self {
            sub_rate: 0.0,
            del_rate: 0.0,
            ins_rate: 0.0,
            seed,
        }
    }

    pub fn with_rates(sub_rate: f64, del_rate: f64, ins_rate: f64, seed: u64) -> Self {
        Self {
            sub_rate,
            del_rate,
            ins_rate,
            seed,
        }
    }

    /// # Errors
    /// `ConfigError::OutOfRange` for a rate outside [0, 1], or an insertion
    /// rate of 1 (which would never consume input).
    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [("sub_rate", self.sub_rate), ("del_rate", self.del_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::out_of_range(name, rate, "0.0..=1.0").into());
            }
        }
        if !(0.0..1.0).contains(&self.ins_rate) {
            return Err(ConfigError::out_of_range("ins_rate", self.ins_rate, "0.0..1.0").into());
        }
        Ok(())
    }
}

/// Seeded error injector.
pub struct ChannelSimulator {
    config: ChannelConfig,
    rng: ChaCha8Rng,

    // Statistics
    symbols_in: u64,
    symbols_out: u64,
    substitutions: u64,
    deletions: u64,
    insertions: u64,
}

impl ChannelSimulator {
    /// # Errors
    /// Propagates [`ChannelConfig::validate`].
    pub fn new(config: ChannelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            symbols_in: 0,
            symbols_out: 0,
            substitutions: 0,
            deletions: 0,
            insertions: 0,
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Pass `codetext` through the channel.
    pub fn transmit(&mut self, codetext: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * codetext.len());
        let mut symbols = codetext.iter();
        let mut pending = symbols.next();

        while let Some(&symbol) = pending {
            if self.rng.gen::<f64>() < self.config.ins_rate {
                out.push(self.rng.gen_range(0..4u8));
                self.insertions += 1;
                continue;
            }
            pending = symbols.next();
            self.symbols_in += 1;

            if self.rng.gen::<f64>() < self.config.del_rate {
                self.deletions += 1;
            } else if self.rng.gen::<f64>() < self.config.sub_rate {
                out.push((symbol % 4 + self.rng.gen_range(1..4u8)) % 4);
                self.substitutions += 1;
            } else {
                out.push(symbol);
            }
        }

        out.shrink_to_fit();
        self.symbols_out += out.len() as u64;
        out
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            symbols_in: self.symbols_in,
            symbols_out: self.symbols_out,
            substitutions: self.substitutions,
            deletions: self.deletions,
            insertions: self.insertions,
        }
    }
}

/// One-shot corruption of a single codetext.
///
/// # Errors
/// - `AlphabetError::InvalidValue` if `codetext` holds a value above 3
/// - Propagates [`ChannelConfig::validate`]
pub fn inject_errors(
    codetext: &[u8],
    sub_rate: f64,
    del_rate: f64,
    ins_rate: f64,
    seed: u64,
) -> Result<Vec<u8>> {
    alphabet::validate(codetext)?;
    let config = ChannelConfig::with_rates(sub_rate, del_rate, ins_rate, seed);
    Ok(ChannelSimulator::new(config)?.transmit(codetext))
}

/// Counts of what the channel did so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Input symbols consumed
    pub symbols_in: u64,

    /// Symbols emitted
    pub symbols_out: u64,

    pub substitutions: u64,
    pub deletions: u64,
    pub insertions: u64,
}

impl ChannelStats {
    /// All edits per input symbol.
    pub fn error_rate(&self) -> f64 {
        if self.symbols_in == 0 {
            0.0
        } else {
            (self.substitutions + self.deletions + self.insertions) as f64
                / self.symbols_in as f64
        }
    }

    pub fn substitution_rate(&self) -> f64 {
        self.per_input(self.substitutions)
    }

    pub fn deletion_rate(&self) -> f64 {
        self.per_input(self.deletions)
    }

    pub fn insertion_rate(&self) -> f64 {
        self.per_input(self.insertions)
    }

    fn per_input(&self, count: u64) -> f64 {
        if self.symbols_in == 0 {
            0.0
        } else {
            count as f64 / self.symbols_in as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codetext(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 4) as u8).collect()
    }

    #[test]
    fn test_perfect_channel() {
        let mut sim = ChannelSimulator::new(ChannelConfig::perfect(42)).unwrap();
        let input = codetext(100);
        assert_eq!(sim.transmit(&input), input);

        let stats = sim.stats();
        assert_eq!(stats.symbols_in, 100);
        assert_eq!(stats.symbols_out, 100);
        assert_eq!(stats.error_rate(), 0.0);
    }

    #[test]
    fn test_deletion_only() {
        let config = ChannelConfig::with_rates(0.0, 0.5, 0.0, 42);
        let mut sim = ChannelSimulator::new(config).unwrap();
        let out = sim.transmit(&codetext(1000));

        let stats = sim.stats();
        assert_eq!(out.len() as u64, 1000 - stats.deletions);
        // Allow 40-60% range due to randomness
        assert!(stats.deletions >= 400 && stats.deletions <= 600);
    }

    #[test]
    fn test_substitution_changes_symbol() {
        let config = ChannelConfig::with_rates(1.0, 0.0, 0.0, 7);
        let mut sim = ChannelSimulator::new(config).unwrap();
        let input = codetext(200);
        let out = sim.transmit(&input);
        assert_eq!(out.len(), input.len());
        assert!(out.iter().zip(&input).all(|(a, b)| a != b && *a < 4));
        assert_eq!(sim.stats().substitutions, 200);
    }

    #[test]
    fn test_insertions_lengthen() {
        let config = ChannelConfig::with_rates(0.0, 0.0, 0.3, 3);
        let mut sim = ChannelSimulator::new(config).unwrap();
        let out = sim.transmit(&codetext(500));

        let stats = sim.stats();
        assert_eq!(out.len() as u64, 500 + stats.insertions);
        assert!(stats.insertions > 100);
        assert!(out.iter().all(|&s| s < 4));
    }

    #[test]
    fn test_determinism() {
        let config = ChannelConfig::with_rates(0.05, 0.03, 0.02, 12345);
        let mut sim1 = ChannelSimulator::new(config).unwrap();
        let mut sim2 = ChannelSimulator::new(config).unwrap();
        let input = codetext(300);
        assert_eq!(sim1.transmit(&input), sim2.transmit(&input));
        assert_eq!(sim1.stats(), sim2.stats());
    }

    #[test]
    fn test_invalid_rates() {
        assert!(ChannelSimulator::new(ChannelConfig::with_rates(1.5, 0.0, 0.0, 1)).is_err());
        assert!(ChannelSimulator::new(ChannelConfig::with_rates(0.0, -0.1, 0.0, 1)).is_err());
        assert!(ChannelSimulator::new(ChannelConfig::with_rates(0.0, 0.0, 1.0, 1)).is_err());
        assert!(ChannelSimulator::new(ChannelConfig::with_rates(f64::NAN, 0.0, 0.0, 1)).is_err());
    }

    #[test]
    fn test_empty_input() {
        let config = ChannelConfig::with_rates(0.1, 0.1, 0.1, 1);
        let mut sim = ChannelSimulator::new(config).unwrap();
        assert!(sim.transmit(&[]).is_empty());
        assert_eq!(sim.stats().symbols_in, 0);
    }

    #[test]
    fn test_substitution_of_out_of_range_symbol() {
        let config = ChannelConfig::with_rates(1.0, 0.0, 0.0, 5);
        let mut sim = ChannelSimulator::new(config).unwrap();
        let out = sim.transmit(&[253, 254, 255]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&s| s < 4));
    }

    #[test]
    fn test_inject_errors_rejects_invalid_codetext() {
        use crate::error::{AlphabetError, Error};

        let result = inject_errors(&[0, 1, 255, 3], 0.01, 0.01, 0.01, 9);
        assert!(matches!(
            result,
            Err(Error::Alphabet(AlphabetError::InvalidValue { value: 255, position: 2 }))
        ));
        assert_eq!(inject_errors(&codetext(40), 0.0, 0.0, 0.0, 9).unwrap(), codetext(40));
    }
}
