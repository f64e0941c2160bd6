//! Error types for the DNA codec.
//!
//! Configuration and capacity violations are the only conditions that fail a
//! call outright. A decode that runs out of hypothesis budget is a normal
//! outcome and is reported through [`crate::decoder::DecodeStatus`], not here.

use thiserror::Error;

/// Top-level error type for all operations in the codec.
///
/// Each variant corresponds to a specific failure domain:
/// - Config: rejected parameter values (caller's configuration is untouched)
/// - Capacity: MAXSEQ or arena limits too small for the requested work
/// - Alphabet: text or numeric sequences outside A/C/G/T
/// - Bit I/O: invalid bit counts while packing or unpacking vbits
/// - I/O: file system operations (used by the simulation driver)
#[derive(Debug, Error)]
pub enum Error {
    /// A setter or constructor was given an out-of-range value
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The configured capacity is too small for this message or codetext
    #[error("capacity error: {0}")]
    Capacity(#[from] CapacityError),

    /// A sequence contained something other than a nucleotide
    #[error("alphabet error: {0}")]
    Alphabet(#[from] AlphabetError),

    /// Bit I/O operation failed
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors, raised before any computation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Rate pattern number outside 1..=6
    #[error("rate pattern {0} out of range: must be in 1..=6")]
    RatePatternOutOfRange(u8),

    /// A numeric parameter failed validation
    #[error("{name} = {value} is out of range: expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// No salt below the search bound reproduces this left-primer symbol
    #[error("no salt reproduces left primer symbol at position {position} (tried {tries})")]
    PrimerSaltNotFound { position: usize, tries: u64 },
}

impl ConfigError {
    pub(crate) fn out_of_range(
        name: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        ConfigError::OutOfRange {
            name,
            value: value.to_string(),
            expected,
        }
    }
}

/// Capacity errors. Fatal for the call; no partial result is produced.
#[derive(Debug, Error)]
pub enum CapacityError {
    /// More vbit positions are needed than MAXSEQ allows
    #[error("MAXSEQ too small: need {needed} positions, MAXSEQ is {max_seq}")]
    MaxSeqExceeded { needed: usize, max_seq: usize },

    /// The hypothesis arena cannot be addressed with 32-bit ids
    #[error("hypothesis arena exhausted at {count} entries")]
    ArenaOverflow { count: usize },
}

/// Alphabet errors.
#[derive(Debug, Error)]
pub enum AlphabetError {
    /// A primer or sequence string contained a non-ACGT character
    #[error("invalid nucleotide character {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// A numeric sequence contained a value outside 0..=3
    #[error("invalid nucleotide value {value} at position {position}")]
    InvalidValue { value: u8, position: usize },
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Invalid bit count (more than 64 bits in one operation)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
