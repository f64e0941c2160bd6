//! DNA output constraints: GC balance and homopolymer runs.
//!
//! Given the packed window of recently emitted nucleotides, the engine
//! returns the ordered list of nucleotides still allowed at the next
//! position. The order is load-bearing: the digest output is an index into
//! this list, so encoder and decoder must enumerate it identically.
//!
//! # Window Register
//!
//! The window is a `u64` holding two bits per nucleotide, most recent in the
//! low bits. GC content is counted over the most recent `window - 1`
//! symbols, so that together with the symbol about to be chosen a full
//! window never leaves `[min_gc, max_gc]`.

use crate::alphabet::{A, C, G, T};
use crate::error::{ConfigError, Result};

/// "ACGTACGT..." packed two bits per symbol; a starting history with no runs
/// and balanced GC.
pub const INITIAL_WINDOW: u64 = 0x1b1b_1b1b_1b1b_1b1b;

const EVEN_BITS: u64 = 0x5555_5555_5555_5555;

/// Tunable constraint parameters. `window == 0` disables all constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnaConstraints {
    /// Number of symbols in the sliding window
    pub window: u32,

    /// Maximum G+C count in a window
    pub max_gc: u32,

    /// Minimum G+C count in a window
    pub min_gc: u32,

    /// Maximum homopolymer run length
    pub max_run: u32,
}

impl DnaConstraints {
    /// Constraints switched off: every nucleotide is always allowed.
    pub fn disabled() -> Self {
        Self {
            window: 0,
            ..Self::default()
        }
    }

    /// Check the parameter ranges.
    ///
    /// # Errors
    /// `ConfigError::OutOfRange` if `window > 32`, `max_run` is outside `1..=32`,
    /// `min_gc > max_gc`, or `max_gc` exceeds the window.
    pub fn validate(&self) -> Result<()> {
        if self.window > 32 {
            return Err(ConfigError::out_of_range("window", self.window, "0..=32").into());
        }
        if self.window == 0 {
            return Ok(());
        }
        if self.max_run == 0 || self.max_run > 32 {
            return Err(ConfigError::out_of_range("max_run", self.max_run, "1..=32").into());
        }
        if self.min_gc > self.max_gc {
            return Err(ConfigError::out_of_range("min_gc", self.min_gc, "<= max_gc").into());
        }
        if self.max_gc > self.window {
            return Err(ConfigError::out_of_range("max_gc", self.max_gc, "<= window").into());
        }
        Ok(())
    }
}

impl Default for DnaConstraints {
    fn default() -> Self {
        Self {
            window: 12,
            max_gc: 8,
            min_gc: 4,
            max_run: 4,
        }
    }
}

/// Ordered list of allowed next nucleotides, 1 to 4 entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowed {
    symbols: [u8; 4],
    len: u8,
}

impl Allowed {
    /// All four nucleotides, in A, C, G, T order.
    pub const ALL: Allowed = Allowed {
        symbols: [A, C, G, T],
        len: 4,
    };

    fn of(list: &[u8]) -> Self {
        let mut symbols = [0u8; 4];
        symbols[..list.len()].copy_from_slice(list);
        Self {
            symbols,
            len: list.len() as u8,
        }
    }

    /// Number of allowed symbols; the modulus handed to the digest.
    #[inline]
    pub fn len(&self) -> u32 {
        u32::from(self.len)
    }

    /// Never true; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The symbol at `index` (taken modulo the list length).
    #[inline]
    pub fn get(&self, index: u32) -> u8 {
        self.symbols[(index % self.len()) as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.symbols[..self.len as usize]
    }
}

/// Evaluates the constraint decision table for a window register.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintEngine {
    params: DnaConstraints,
    window_mask: u64,
    history_mask: u64,
}

impl ConstraintEngine {
    /// Build an engine from validated parameters.
    pub fn new(params: DnaConstraints) -> Self {
        let window = params.window;
        Self {
            params,
            window_mask: low_mask(2 * window),
            history_mask: low_mask(2 * window.saturating_sub(1)),
        }
    }

    pub fn params(&self) -> DnaConstraints {
        self.params
    }

    /// Mask keeping the most recent `window` symbols of a register.
    #[inline]
    pub fn window_mask(&self) -> u64 {
        self.window_mask
    }

    /// Shift `symbol` into the window register.
    #[inline]
    pub fn push(&self, window: u64, symbol: u8) -> u64 {
        ((window << 2) | u64::from(symbol)) & self.window_mask
    }

    /// G+C count among the most recent `window - 1` symbols.
    #[inline]
    pub fn gc_count(&self, window: u64) -> u32 {
        let reg = window & self.history_mask;
        // C (01) and G (10) are exactly the pairs whose two bits differ
        ((reg ^ (reg >> 1)) & EVEN_BITS).count_ones()
    }

    /// Whether the most recent `max_run` symbols are all the same.
    fn run_at_cap(&self, window: u64) -> bool {
        let last = window & 3;
        let mut reg = window >> 2;
        let mut run = 1;
        while reg & 3 == last {
            run += 1;
            if run >= self.params.max_run {
                return true;
            }
            reg >>= 2;
        }
        false
    }

    /// Allowed next nucleotides given the window register.
    pub fn allowed(&self, window: u64) -> Allowed {
        if self.params.window == 0 {
            return Allowed::ALL;
        }

        let last = (window & 3) as u8;
        let capped = self.run_at_cap(window);
        let gc = self.gc_count(window);

        if gc >= self.params.max_gc {
            match (capped, last) {
                (true, A) => Allowed::of(&[T]),
                (true, T) => Allowed::of(&[A]),
                _ => Allowed::of(&[A, T]),
            }
        } else if gc <= self.params.min_gc {
            match (capped, last) {
                (true, C) => Allowed::of(&[G]),
                (true, G) => Allowed::of(&[C]),
                _ => Allowed::of(&[C, G]),
            }
        } else if capped {
            let mut list = [0u8; 3];
            let mut n = 0;
            for s in [A, C, G, T] {
                if s != last {
                    list[n] = s;
                    n += 1;
                }
            }
            Allowed::of(&list)
        } else {
            Allowed::ALL
        }
    }
}

fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
