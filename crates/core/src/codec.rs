//! The codec facade.
//!
//! A [`Codec`] owns one settled configuration, the schedule derived from
//! it, and a reusable decoder workspace. Every operation a caller needs
//! goes through it:
//!
//! ```no_run
//! use dnacode_core::codec::Codec;
//! use dnacode_core::schedule::RatePattern;
//!
//! let mut codec = Codec::new()?;
//! codec.set_code_rate(RatePattern::Half, "TCGAAGTCAG", "TAGTGAGTG")?;
//! let strand = codec.encode(b"hello\0\0", None)?;
//! let outcome = codec.decode(&strand, Some(56))?;
//! assert_eq!(&outcome.message[..5], b"hello");
//! # Ok::<(), dnacode_core::Error>(())
//! ```
//!
//! Setters validate their input and rebuild the schedule into a fresh value
//! before swapping anything in, so a rejected call leaves the codec exactly
//! as it was.

use crate::align;
use crate::alphabet::{self, parse_acgt};
use crate::config::{CodecConfig, ScoreWeights, SearchParams};
use crate::constraint::{ConstraintEngine, DnaConstraints};
use crate::decoder::{DecodeContext, DecodeOutcome, DecodeTrace, Decoder};
use crate::encoder;
use crate::error::Result;
use crate::schedule::{CodeSchedule, RatePattern};

/// Seed of the dither generator until [`Codec::set_dither_seed`] is called.
pub const DEFAULT_DITHER_SEED: u64 = 1;

pub struct Codec {
    config: CodecConfig,
    schedule: CodeSchedule,
    engine: ConstraintEngine,
    decoder: Decoder,
}

impl Codec {
    /// A codec with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(CodecConfig::default())
    }

    /// # Errors
    /// Any validation or schedule error for `config`.
    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.search.validate()?;
        config.constraints.validate()?;
        config.scores.validate()?;
        alphabet::validate(&config.left_primer)?;
        alphabet::validate(&config.right_primer)?;
        let schedule = CodeSchedule::build(
            config.rate,
            &config.search,
            &config.left_primer,
            &config.right_primer,
        )?;

        Ok(Self {
            engine: ConstraintEngine::new(config.constraints),
            decoder: Decoder::new(config.search.initial_arena, DEFAULT_DITHER_SEED),
            config,
            schedule,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn schedule(&self) -> &CodeSchedule {
        &self.schedule
    }

    /// Number of accepted configuration changes.
    pub fn version(&self) -> u64 {
        self.config.version
    }

    pub fn code_rate(&self) -> RatePattern {
        self.config.rate
    }

    /// Left and right primers as numeric nucleotides.
    pub fn primers(&self) -> (&[u8], &[u8]) {
        (&self.config.left_primer, &self.config.right_primer)
    }

    /// Switch rate pattern and primers, and take the preset's reward.
    ///
    /// # Errors
    /// - `AlphabetError::InvalidSymbol` for a primer character outside ACGT
    /// - `ConfigError::PrimerSaltNotFound` if the left primer cannot be
    ///   reproduced
    pub fn set_code_rate(&mut self, rate: RatePattern, left: &str, right: &str) -> Result<()> {
        let left = parse_acgt(left)?;
        let right = parse_acgt(right)?;
        let schedule = CodeSchedule::build(rate, &self.config.search, &left, &right)?;

        self.schedule = schedule;
        self.config.rate = rate;
        self.config.left_primer = left;
        self.config.right_primer = right;
        self.config.scores.reward = rate.reward();
        self.bump("code rate");
        Ok(())
    }

    /// [`Codec::set_code_rate`] by preset number.
    ///
    /// # Errors
    /// `ConfigError::RatePatternOutOfRange` outside 1..=6.
    pub fn set_code_rate_number(&mut self, number: u8, left: &str, right: &str) -> Result<()> {
        self.set_code_rate(RatePattern::from_number(number)?, left, right)
    }

    pub fn search_params(&self) -> SearchParams {
        self.config.search
    }

    /// Replace the search parameters; the schedule is re-derived.
    pub fn set_search_params(&mut self, params: SearchParams) -> Result<()> {
        params.validate()?;
        let schedule = CodeSchedule::build(
            self.config.rate,
            &params,
            &self.config.left_primer,
            &self.config.right_primer,
        )?;

        self.schedule = schedule;
        self.config.search = params;
        self.decoder.set_initial_capacity(params.initial_arena);
        self.bump("search params");
        Ok(())
    }

    pub fn restore_search_params(&mut self) -> Result<()> {
        self.set_search_params(SearchParams::default())
    }

    pub fn dna_constraints(&self) -> DnaConstraints {
        self.config.constraints
    }

    pub fn set_dna_constraints(&mut self, constraints: DnaConstraints) -> Result<()> {
        constraints.validate()?;
        self.engine = ConstraintEngine::new(constraints);
        self.config.constraints = constraints;
        self.bump("dna constraints");
        Ok(())
    }

    pub fn restore_dna_constraints(&mut self) -> Result<()> {
        self.set_dna_constraints(DnaConstraints::default())
    }

    pub fn scores(&self) -> ScoreWeights {
        self.config.scores
    }

    pub fn set_scores(&mut self, scores: ScoreWeights) -> Result<()> {
        scores.validate()?;
        self.config.scores = scores;
        self.bump("scores");
        Ok(())
    }

    pub fn restore_scores(&mut self) -> Result<()> {
        self.set_scores(ScoreWeights::default())
    }

    /// Restart the decoder's dither generator.
    pub fn set_dither_seed(&mut self, seed: u64) {
        self.decoder.reseed(seed);
    }

    /// Encode `message`, optionally filling the strand to `target_len`.
    pub fn encode(&self, message: &[u8], target_len: Option<usize>) -> Result<Vec<u8>> {
        encoder::encode(&self.schedule, &self.engine, message, target_len)
    }

    /// Encode the UTF-8 bytes of `text`.
    pub fn encode_str(&self, text: &str, target_len: Option<usize>) -> Result<Vec<u8>> {
        self.encode(text.as_bytes(), target_len)
    }

    /// Decode a (possibly corrupted) codetext.
    ///
    /// With `max_payload_bits` the search stops once that many bits are
    /// decoded, leaving the last vbits unconfirmed. At rates 1 and 2 append
    /// a couple of runout bytes to the message when exact recovery matters.
    ///
    /// # Errors
    /// - `AlphabetError::InvalidValue` for values outside 0..=3
    /// - `CapacityError` if the search needs more than `max_seq` positions
    pub fn decode(
        &mut self,
        codetext: &[u8],
        max_payload_bits: Option<usize>,
    ) -> Result<DecodeOutcome> {
        alphabet::validate(codetext)?;
        let ctx = DecodeContext {
            schedule: &self.schedule,
            engine: self.engine,
            scores: self.config.scores,
            hypothesis_limit: self.config.search.hypothesis_limit,
        };
        self.decoder.decode(&ctx, codetext, max_payload_bits)
    }

    /// Decode the whole codetext and return every node on the final path.
    pub fn decode_full_trace(&mut self, codetext: &[u8]) -> Result<DecodeTrace> {
        alphabet::validate(codetext)?;
        let ctx = DecodeContext {
            schedule: &self.schedule,
            engine: self.engine,
            scores: self.config.scores,
            hypothesis_limit: self.config.search.hypothesis_limit,
        };
        self.decoder.decode_full_trace(&ctx, codetext)
    }

    /// Decode `codetext` under each of the six presets and report how far
    /// into the codetext each search got.
    ///
    /// The configuration in force before the call is restored afterwards,
    /// whether or not the sweep succeeded.
    pub fn try_all_code_rates(
        &mut self,
        hypothesis_limit: usize,
        max_seq: usize,
        codetext: &[u8],
        left: &str,
        right: &str,
    ) -> Result<[i64; 6]> {
        let saved_config = self.config.clone();
        let saved_schedule = self.schedule.clone();
        let saved_engine = self.engine;

        let result = self.sweep_code_rates(hypothesis_limit, max_seq, codetext, left, right);

        self.decoder.set_initial_capacity(saved_config.search.initial_arena);
        self.config = saved_config;
        self.schedule = saved_schedule;
        self.engine = saved_engine;
        result
    }

    fn sweep_code_rates(
        &mut self,
        hypothesis_limit: usize,
        max_seq: usize,
        codetext: &[u8],
        left: &str,
        right: &str,
    ) -> Result<[i64; 6]> {
        self.set_search_params(SearchParams {
            hypothesis_limit,
            max_seq,
            ..self.config.search
        })?;

        let mut reached = [0i64; 6];
        for (slot, rate) in reached.iter_mut().zip(RatePattern::ALL) {
            self.set_code_rate(rate, left, right)?;
            let outcome = self.decode(codetext, None)?;
            tracing::debug!(
                rate = rate.number(),
                final_offset = outcome.final_offset,
                hypotheses = outcome.hypotheses,
                "rate sweep"
            );
            *slot = outcome.final_offset;
        }
        Ok(reached)
    }

    /// Shortest strand, right primer included, that carries `payload_bytes`.
    pub fn min_strand_length(&self, payload_bytes: usize) -> Result<usize> {
        encoder::min_strand_length(&self.schedule, payload_bytes)
    }

    /// Return `seq` in the orientation that best matches `primer`.
    pub fn orient(&self, primer: &str, seq: &[u8]) -> Result<Vec<u8>> {
        let primer = parse_acgt(primer)?;
        Ok(align::orient(&primer, seq))
    }

    /// Return decoder memory above the initial arena capacity.
    pub fn release(&mut self) {
        self.decoder.release();
    }

    fn bump(&mut self, what: &'static str) {
        self.config.version += 1;
        tracing::debug!(version = self.config.version, what, "codec configuration updated");
    }
}
