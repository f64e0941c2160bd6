//! Rate patterns, the per-position width table, and the salt schedule.
//!
//! A [`CodeSchedule`] is derived from a [`RatePattern`], the search
//! parameters and the primers. It fixes, for every vbit position, how many
//! payload bits that position carries and which salt keys its digest. The
//! schedule is rebuilt as a whole whenever any input changes.
//!
//! # Salt Phases
//!
//! ```text
//! seq:  0 .. L-1        L .. NSP-1            NSP ..
//!      +-------------+---------------------+------------------+
//!      | primer salt | salt 0, accumulate  | accumulated salt |
//!      | per position| new salt from bits  | (fixed)          |
//!      +-------------+---------------------+------------------+
//! ```
//!
//! `L` is the left primer length and `NSP = VSALT + L`, where `VSALT` is the
//! number of positions of the width table needed to cover `nsalt` bits.

use crate::config::SearchParams;
use crate::constraint::{Allowed, ConstraintEngine, INITIAL_WINDOW};
use crate::digest::{digest, HISTORY_MASK, SALT_MASK};
use crate::error::{CapacityError, ConfigError, Result};

/// Salt candidates tried per left-primer position.
pub const PRIMER_SALT_TRIES: u64 = 100;

/// The six built-in payload rate presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatePattern {
    /// Rate 0.75, widths `[2, 1]`
    ThreeQuarters,
    /// Rate 0.6, widths `[2, 1, 1, 1, 1]`
    ThreeFifths,
    /// Rate 0.5, widths `[1]`
    Half,
    /// Rate 0.333, widths `[1, 1, 0]`
    Third,
    /// Rate 0.25, widths `[1, 0]`
    Quarter,
    /// Rate 0.166, widths `[1, 0, 0]`
    Sixth,
}

impl RatePattern {
    pub const ALL: [RatePattern; 6] = [
        RatePattern::ThreeQuarters,
        RatePattern::ThreeFifths,
        RatePattern::Half,
        RatePattern::Third,
        RatePattern::Quarter,
        RatePattern::Sixth,
    ];

    /// Look up a preset by its number, 1 through 6.
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1..=6 => Ok(Self::ALL[number as usize - 1]),
            _ => Err(ConfigError::RatePatternOutOfRange(number).into()),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            RatePattern::ThreeQuarters => 1,
            RatePattern::ThreeFifths => 2,
            RatePattern::Half => 3,
            RatePattern::Third => 4,
            RatePattern::Quarter => 5,
            RatePattern::Sixth => 6,
        }
    }

    /// Repeating cycle of payload bits per position.
    pub fn widths(self) -> &'static [u8] {
        match self {
            RatePattern::ThreeQuarters => &[2, 1],
            RatePattern::ThreeFifths => &[2, 1, 1, 1, 1],
            RatePattern::Half => &[1],
            RatePattern::Third => &[1, 1, 0],
            RatePattern::Quarter => &[1, 0],
            RatePattern::Sixth => &[1, 0, 0],
        }
    }

    /// Score reward per matching symbol tuned for this rate.
    pub fn reward(self) -> f64 {
        match self {
            RatePattern::ThreeQuarters => -0.035,
            RatePattern::ThreeFifths => -0.082,
            RatePattern::Half => -0.127,
            RatePattern::Third => -0.229,
            RatePattern::Quarter => -0.265,
            RatePattern::Sixth => -0.324,
        }
    }

    /// Payload bits per nucleotide, relative to the 2-bit maximum.
    pub fn rate(self) -> f64 {
        let widths = self.widths();
        let bits: u32 = widths.iter().map(|&w| u32::from(w)).sum();
        f64::from(bits) / (2.0 * widths.len() as f64)
    }
}

/// Derived per-position tables for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSchedule {
    rate: RatePattern,
    max_seq: usize,
    widths: Vec<u8>,
    left_primer: Vec<u8>,
    right_primer: Vec<u8>,
    primer_salts: Vec<u64>,
    vsalt: usize,
    nsp: usize,
}

impl CodeSchedule {
    /// Build the schedule for a rate pattern and primers.
    ///
    /// # Errors
    /// - `ConfigError::PrimerSaltNotFound` if no salt below
    ///   [`PRIMER_SALT_TRIES`] reproduces some left-primer symbol
    /// - `CapacityError::MaxSeqExceeded` if `max_seq` cannot hold the
    ///   protection window
    pub fn build(
        rate: RatePattern,
        search: &SearchParams,
        left_primer: &[u8],
        right_primer: &[u8],
    ) -> Result<Self> {
        let primer_salts = find_primer_salts(left_primer)?;

        let lprimer = left_primer.len();
        let pattern = rate.widths();
        let mut widths = vec![1u8; search.max_seq + 2];
        for (i, w) in widths.iter_mut().take(search.max_seq).enumerate() {
            *w = if i < lprimer { 0 } else { pattern[i % pattern.len()] };
        }

        let mut schedule = Self {
            rate,
            max_seq: search.max_seq,
            widths,
            left_primer: left_primer.to_vec(),
            right_primer: right_primer.to_vec(),
            primer_salts,
            vsalt: 0,
            nsp: 0,
        };
        schedule.vsalt = schedule.vbit_len(search.nsalt)?;
        schedule.nsp = schedule.vsalt + lprimer;

        tracing::debug!(
            rate = rate.number(),
            max_seq = search.max_seq,
            vsalt = schedule.vsalt,
            nsp = schedule.nsp,
            "code schedule rebuilt"
        );
        Ok(schedule)
    }

    pub fn rate(&self) -> RatePattern {
        self.rate
    }

    pub fn max_seq(&self) -> usize {
        self.max_seq
    }

    /// Payload bits carried at position `seq`.
    #[inline]
    pub fn width(&self, seq: usize) -> u8 {
        self.widths.get(seq).copied().unwrap_or(1)
    }

    pub fn left_primer(&self) -> &[u8] {
        &self.left_primer
    }

    pub fn right_primer(&self) -> &[u8] {
        &self.right_primer
    }

    /// Salt chosen for each left-primer position.
    pub fn primer_salts(&self) -> &[u64] {
        &self.primer_salts
    }

    /// Positions covering the protected salt bits.
    pub fn vsalt(&self) -> usize {
        self.vsalt
    }

    /// First position keyed by the message-derived salt.
    pub fn nsp(&self) -> usize {
        self.nsp
    }

    /// Number of positions needed to carry `nbits` payload bits.
    ///
    /// # Errors
    /// `CapacityError::MaxSeqExceeded` if that would reach `max_seq`.
    pub fn vbit_len(&self, nbits: usize) -> Result<usize> {
        let mut carried = 0usize;
        let mut k = 0usize;
        while carried < nbits {
            if k >= self.max_seq {
                return Err(CapacityError::MaxSeqExceeded {
                    needed: k + 1,
                    max_seq: self.max_seq,
                }
                .into());
            }
            carried += usize::from(self.widths[k]);
            k += 1;
        }
        Ok(k)
    }

    /// Total payload bits carried by the first `len` positions.
    pub fn bits_in(&self, len: usize) -> usize {
        (0..len).map(|k| usize::from(self.width(k))).sum()
    }
}

fn find_primer_salts(left_primer: &[u8]) -> Result<Vec<u64>> {
    left_primer
        .iter()
        .enumerate()
        .map(|(position, &symbol)| {
            (0..PRIMER_SALT_TRIES)
                .find(|&salt| digest(0, position, salt, 4) == u32::from(symbol))
                .ok_or_else(|| {
                    ConfigError::PrimerSaltNotFound {
                        position,
                        tries: PRIMER_SALT_TRIES,
                    }
                    .into()
                })
        })
        .collect()
}

/// Rolling state carried from one position to the next: payload history,
/// salts and the DNA window. Encoder and decoder advance it identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeState {
    /// Most recent payload bits, masked to the digest history width
    pub prev_bits: u64,
    /// Salt in force once the protection window has closed
    pub salt: u64,
    /// Salt being accumulated inside the protection window
    pub new_salt: u64,
    /// Packed window of recently emitted nucleotides
    pub window: u64,
}

impl CodeState {
    pub fn initial() -> Self {
        Self {
            prev_bits: 0,
            salt: 0,
            new_salt: 0,
            window: INITIAL_WINDOW,
        }
    }

    /// Emit the symbol encoding `vbit` at position `seq` and return it along
    /// with the state for position `seq + 1`.
    #[inline]
    pub fn step(
        &self,
        schedule: &CodeSchedule,
        engine: &ConstraintEngine,
        seq: usize,
        vbit: u8,
    ) -> (u8, CodeState) {
        let mut next = *self;
        let lprimer = schedule.left_primer.len();

        let key_salt = if seq < lprimer {
            schedule.primer_salts[seq]
        } else if seq < schedule.nsp {
            next.new_salt = ((self.new_salt << 1) & SALT_MASK) ^ u64::from(vbit);
            self.salt
        } else if seq == schedule.nsp {
            next.salt = self.new_salt;
            next.salt
        } else {
            self.salt
        };

        let allowed = if seq < lprimer {
            Allowed::ALL
        } else {
            engine.allowed(self.window)
        };
        let modulus = allowed.len();
        let index = (digest(self.prev_bits, seq, key_salt, modulus) + u32::from(vbit)) % modulus;
        let symbol = allowed.get(index);

        let width = schedule.width(seq);
        next.prev_bits = ((self.prev_bits << width) & HISTORY_MASK) | u64::from(vbit);
        next.window = engine.push(self.window, symbol);
        (symbol, next)
    }
}
