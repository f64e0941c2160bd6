//! Codec configuration.
//!
//! All tunables live in one [`CodecConfig`] value owned by a
//! [`crate::codec::Codec`]. Each group validates itself; the codec applies a
//! group only after validation succeeds and the derived schedule has been
//! rebuilt, so a rejected setter never leaves a half-updated configuration.

use crate::constraint::DnaConstraints;
use crate::error::{ConfigError, Result};
use crate::schedule::RatePattern;

/// Largest hypothesis budget that still fits 32-bit arena ids with room for
/// one final expansion.
pub const MAX_HYPOTHESIS_LIMIT: usize = (u32::MAX - 64) as usize;

/// Protection window, capacity and search budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Payload bits protected by the message-derived salt (NSALT)
    pub nsalt: usize,

    /// Maximum number of vbit positions in a message (MAXSEQ)
    pub max_seq: usize,

    /// Initial hypothesis arena capacity (NSTAK)
    pub initial_arena: usize,

    /// Hypotheses created before a decode gives up (HLIMIT)
    pub hypothesis_limit: usize,
}

impl SearchParams {
    /// # Errors
    /// `ConfigError::OutOfRange` for a zero `max_seq`, an `nsalt` the
    /// schedule cannot carry, or a budget beyond 32-bit arena ids.
    pub fn validate(&self) -> Result<()> {
        if self.max_seq == 0 {
            return Err(ConfigError::out_of_range("max_seq", self.max_seq, ">= 1").into());
        }
        if self.nsalt >= self.max_seq {
            return Err(ConfigError::out_of_range("nsalt", self.nsalt, "< max_seq").into());
        }
        if self.initial_arena == 0 {
            return Err(
                ConfigError::out_of_range("initial_arena", self.initial_arena, ">= 1").into(),
            );
        }
        if self.hypothesis_limit == 0 || self.hypothesis_limit > MAX_HYPOTHESIS_LIMIT {
            return Err(ConfigError::out_of_range(
                "hypothesis_limit",
                self.hypothesis_limit,
                "1..=u32::MAX - 64",
            )
            .into());
        }
        Ok(())
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            nsalt: 24,
            max_seq: 2500,
            initial_arena: 110_000,
            hypothesis_limit: 1_000_000,
        }
    }
}

/// Per-position penalties; lower cumulative score means more likely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Added when a predicted symbol matches the codetext (negative)
    pub reward: f64,

    /// Added when a predicted symbol does not match
    pub substitution: f64,

    /// Added for a hypothesized missing codetext symbol
    pub deletion: f64,

    /// Added for a hypothesized spurious codetext symbol
    pub insertion: f64,

    /// Half-width of the uniform noise added to each step (0 disables)
    pub dither: f64,
}

impl ScoreWeights {
    /// # Errors
    /// `ConfigError::OutOfRange` for non-finite weights or negative dither.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("reward", self.reward),
            ("substitution", self.substitution),
            ("deletion", self.deletion),
            ("insertion", self.insertion),
            ("dither", self.dither),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigError::out_of_range(name, value, "a finite number").into());
            }
        }
        if self.dither < 0.0 {
            return Err(ConfigError::out_of_range("dither", self.dither, ">= 0").into());
        }
        Ok(())
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            reward: -0.13,
            substitution: 1.0,
            deletion: 1.0,
            insertion: 1.0,
            dither: 0.0,
        }
    }
}

/// Complete, settled codec configuration.
///
/// `version` increases with every accepted change, so callers holding
/// results can tell whether the configuration moved underneath them.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    pub search: SearchParams,
    pub constraints: DnaConstraints,
    pub scores: ScoreWeights,
    pub rate: RatePattern,
    /// Left primer as numeric nucleotides
    pub left_primer: Vec<u8>,
    /// Right primer as numeric nucleotides
    pub right_primer: Vec<u8>,
    pub version: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            search: SearchParams::default(),
            constraints: DnaConstraints::default(),
            scores: ScoreWeights::default(),
            rate: RatePattern::Half,
            left_primer: Vec::new(),
            right_primer: Vec::new(),
            version: 0,
        }
    }
}
