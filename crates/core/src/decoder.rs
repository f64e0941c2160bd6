//! Best-first hypothesis search decoder.
//!
//! Reconstructs the most likely message from a codetext that may contain
//! substitutions, insertions and deletions at unknown places. Each
//! [`Hypothesis`] is one partial decoding: how far into the message (`seq`)
//! and into the observed codetext (`offset`) it has got, its cumulative
//! penalty, the vbit it guessed, and the rolling [`CodeState`] needed to
//! predict the next symbol.
//!
//! # Search
//!
//! Hypotheses live in an arena addressed by `u32` index; predecessor links
//! are indices into the same arena, which grows by doubling and never
//! shrinks during a decode. A min-heap keyed on score picks the next
//! hypothesis to expand. Expanding a hypothesis creates, for every possible
//! vbit at the next position:
//!
//! - a substitution child (`offset + 1`, symbol compared)
//! - a deletion child (`offset` unchanged, no comparison possible)
//! - an insertion child (`offset + 2`, symbol compared)
//!
//! The search stops when a popped hypothesis reaches the end of the
//! codetext (or the requested number of payload bits), when the hypothesis
//! budget is spent, or if the queue ever runs dry.
//!
//! # Reuse
//!
//! A `Decoder` keeps its arena and queue allocations between calls. Every
//! decode starts with [`Decoder::reset`]; [`Decoder::release`] gives memory
//! back down to the initial capacity.

use crate::config::ScoreWeights;
use crate::constraint::ConstraintEngine;
use crate::error::{CapacityError, Result};
use crate::schedule::{CodeSchedule, CodeState};
use crate::vbits;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Queue priority of the root; far above any real score.
pub const ROOT_PRIORITY: f64 = 1.0e10;

/// Most children one expansion can create: 3 edit kinds x 4 vbit values.
const MAX_FANOUT: usize = 12;

/// Edit kinds tried per vbit, in expansion order.
const SUBSTITUTION: i64 = 0;
const DELETION: i64 = -1;
const INSERTION: i64 = 1;
const SKEWS: [i64; 3] = [SUBSTITUTION, DELETION, INSERTION];

/// One node of the search tree.
#[derive(Debug, Clone, Copy)]
struct Hypothesis {
    /// Arena index of the predecessor (`None` for the root)
    pred: Option<u32>,
    /// Last codetext index consumed
    offset: i64,
    /// Message position of this node
    seq: i64,
    /// Cumulative penalty
    score: f64,
    /// Guessed vbit at `seq`
    vbit: u8,
    /// State after emitting `seq`
    state: CodeState,
}

impl Hypothesis {
    fn root() -> Self {
        Self {
            pred: None,
            offset: -1,
            seq: -1,
            score: 0.0,
            vbit: 0,
            state: CodeState::initial(),
        }
    }
}

/// Queue entry: lowest score first, then earliest arena index.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    id: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// How a decode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Reached the end of the codetext or the requested payload length
    Success,
    /// Hypothesis budget spent; the result is the farthest partial decode
    SearchExhausted,
}

impl DecodeStatus {
    /// Numeric code: 0 for success, 2 for search exhausted.
    pub fn code(self) -> u8 {
        match self {
            DecodeStatus::Success => 0,
            DecodeStatus::SearchExhausted => 2,
        }
    }
}

/// Result of [`Decoder::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub status: DecodeStatus,
    /// Decoded payload bytes
    pub message: Vec<u8>,
    /// Hypotheses created during the search
    pub hypotheses: usize,
    pub final_score: f64,
    /// Last codetext index consumed by the final hypothesis
    pub final_offset: i64,
    /// Message position of the final hypothesis
    pub final_seq: i64,
}

impl DecodeOutcome {
    pub fn errcode(&self) -> u8 {
        self.status.code()
    }

    pub fn is_success(&self) -> bool {
        self.status == DecodeStatus::Success
    }
}

/// One node on the winning path, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceNode {
    pub vbit: u8,
    pub seq: i64,
    pub offset: i64,
    pub score: f64,
    /// Arena index of this node
    pub index: u32,
    /// Arena index of its predecessor (0 is the root)
    pub predecessor: u32,
    pub prev_bits: u64,
    pub salt: u64,
    pub new_salt: u64,
}

/// Result of [`Decoder::decode_full_trace`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeTrace {
    pub status: DecodeStatus,
    pub hypotheses: usize,
    pub final_score: f64,
    pub final_offset: i64,
    pub final_seq: i64,
    /// Path from the first position to the final hypothesis
    pub nodes: Vec<TraceNode>,
}

/// Everything a search reads from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub schedule: &'a CodeSchedule,
    pub engine: ConstraintEngine,
    pub scores: ScoreWeights,
    pub hypothesis_limit: usize,
}

struct SearchEnd {
    status: DecodeStatus,
    final_id: u32,
}

/// Reusable search workspace.
pub struct Decoder {
    arena: Vec<Hypothesis>,
    queue: BinaryHeap<Candidate>,
    path: Vec<u32>,
    initial_capacity: usize,
    rng: ChaCha8Rng,
}

impl Decoder {
    /// Create a decoder with room for `initial_capacity` hypotheses; `seed`
    /// drives score dithering.
    pub fn new(initial_capacity: usize, seed: u64) -> Self {
        Self {
            arena: Vec::with_capacity(initial_capacity),
            queue: BinaryHeap::new(),
            path: Vec::new(),
            initial_capacity,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restart the dither generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Change the capacity `release` shrinks back to.
    pub fn set_initial_capacity(&mut self, capacity: usize) {
        self.initial_capacity = capacity;
        if self.arena.capacity() < capacity {
            self.arena.reserve(capacity - self.arena.len());
        }
    }

    /// Forget all hypotheses, keeping allocations.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.queue.clear();
        self.path.clear();
    }

    /// Forget all hypotheses and return memory above the initial capacity.
    pub fn release(&mut self) {
        self.reset();
        self.arena.shrink_to(self.initial_capacity);
        self.queue.shrink_to_fit();
        self.path.shrink_to_fit();
    }

    /// Hypotheses held by the last search.
    pub fn hypothesis_count(&self) -> usize {
        self.arena.len()
    }

    /// Current arena allocation, in hypotheses.
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Decode `codetext`, optionally stopping after `max_payload_bits`.
    ///
    /// # Errors
    /// Capacity errors only; running out of hypothesis budget is reported as
    /// [`DecodeStatus::SearchExhausted`] with the farthest partial decode.
    pub fn decode(
        &mut self,
        ctx: &DecodeContext<'_>,
        codetext: &[u8],
        max_payload_bits: Option<usize>,
    ) -> Result<DecodeOutcome> {
        let seq_limit = max_payload_bits
            .map(|bits| ctx.schedule.vbit_len(bits))
            .transpose()?;
        let end = self.search(ctx, codetext, seq_limit)?;
        self.trace_path(end.final_id);

        let vbits: Vec<u8> = self
            .path
            .iter()
            .map(|&id| self.arena[id as usize].vbit)
            .collect();
        let message = vbits::pack(ctx.schedule, &vbits, max_payload_bits)?;
        let last = self.arena[end.final_id as usize];

        Ok(DecodeOutcome {
            status: end.status,
            message,
            hypotheses: self.arena.len(),
            final_score: last.score,
            final_offset: last.offset,
            final_seq: last.seq,
        })
    }

    /// Decode the whole codetext and report every node on the final path.
    pub fn decode_full_trace(
        &mut self,
        ctx: &DecodeContext<'_>,
        codetext: &[u8],
    ) -> Result<DecodeTrace> {
        let end = self.search(ctx, codetext, None)?;
        self.trace_path(end.final_id);

        let nodes = self
            .path
            .iter()
            .map(|&id| {
                let h = &self.arena[id as usize];
                TraceNode {
                    vbit: h.vbit,
                    seq: h.seq,
                    offset: h.offset,
                    score: h.score,
                    index: id,
                    predecessor: h.pred.unwrap_or(0),
                    prev_bits: h.state.prev_bits,
                    salt: h.state.salt,
                    new_salt: h.state.new_salt,
                }
            })
            .collect();
        let last = self.arena[end.final_id as usize];

        Ok(DecodeTrace {
            status: end.status,
            hypotheses: self.arena.len(),
            final_score: last.score,
            final_offset: last.offset,
            final_seq: last.seq,
            nodes,
        })
    }

    fn search(
        &mut self,
        ctx: &DecodeContext<'_>,
        codetext: &[u8],
        seq_limit: Option<usize>,
    ) -> Result<SearchEnd> {
        self.reset();
        self.arena.push(Hypothesis::root());
        self.queue.push(Candidate {
            score: ROOT_PRIORITY,
            id: 0,
        });

        let last_offset = codetext.len() as i64 - 1;
        let mut farthest = (i64::MIN, 0u32);

        let end = loop {
            let Some(Candidate { id, .. }) = self.queue.pop() else {
                break SearchEnd {
                    status: DecodeStatus::Success,
                    final_id: farthest.1,
                };
            };
            let (offset, seq) = {
                let h = &self.arena[id as usize];
                (h.offset, h.seq)
            };
            if offset > farthest.0 {
                farthest = (offset, id);
            }

            if offset >= last_offset {
                break SearchEnd {
                    status: DecodeStatus::Success,
                    final_id: id,
                };
            }
            if let Some(limit) = seq_limit {
                if seq >= limit as i64 - 1 {
                    break SearchEnd {
                        status: DecodeStatus::Success,
                        final_id: id,
                    };
                }
            }
            if self.arena.len() > ctx.hypothesis_limit {
                tracing::warn!(
                    hypotheses = self.arena.len(),
                    farthest_offset = farthest.0,
                    codetext_len = codetext.len(),
                    "hypothesis budget exhausted"
                );
                break SearchEnd {
                    status: DecodeStatus::SearchExhausted,
                    final_id: farthest.1,
                };
            }

            if self.arena.capacity() - self.arena.len() < MAX_FANOUT {
                let grow = self.arena.capacity().max(MAX_FANOUT);
                self.arena.reserve(grow);
            }
            self.expand(ctx, codetext, id)?;
        };

        tracing::debug!(
            status = ?end.status,
            hypotheses = self.arena.len(),
            final_offset = self.arena[end.final_id as usize].offset,
            "decode search finished"
        );
        Ok(end)
    }

    fn expand(&mut self, ctx: &DecodeContext<'_>, codetext: &[u8], parent_id: u32) -> Result<()> {
        let parent = self.arena[parent_id as usize];
        let seq = (parent.seq + 1) as usize;
        if seq > ctx.schedule.max_seq() {
            return Err(CapacityError::MaxSeqExceeded {
                needed: seq,
                max_seq: ctx.schedule.max_seq(),
            }
            .into());
        }

        let guesses = 1u8 << ctx.schedule.width(seq);
        let mut predictions = [(0u8, parent.state); 4];
        for vbit in 0..guesses {
            predictions[vbit as usize] =
                parent.state.step(ctx.schedule, &ctx.engine, seq, vbit);
        }

        for skew in SKEWS {
            let offset = parent.offset + 1 + skew;
            if offset >= codetext.len() as i64 {
                continue;
            }
            for vbit in 0..guesses {
                let (symbol, state) = predictions[vbit as usize];
                let penalty = self.penalty(&ctx.scores, skew, symbol, codetext, offset);
                let id = u32::try_from(self.arena.len()).map_err(|_| {
                    CapacityError::ArenaOverflow {
                        count: self.arena.len(),
                    }
                })?;
                let child = Hypothesis {
                    pred: Some(parent_id),
                    offset,
                    seq: seq as i64,
                    score: parent.score + penalty,
                    vbit,
                    state,
                };
                self.queue.push(Candidate {
                    score: child.score,
                    id,
                });
                self.arena.push(child);
            }
        }
        Ok(())
    }

    fn penalty(
        &mut self,
        scores: &ScoreWeights,
        skew: i64,
        symbol: u8,
        codetext: &[u8],
        offset: i64,
    ) -> f64 {
        let mut penalty = if skew == DELETION {
            scores.deletion
        } else {
            // the only place a prediction meets the observation
            let matched = codetext[offset as usize] == symbol;
            let step = if matched {
                scores.reward
            } else {
                scores.substitution
            };
            if skew == INSERTION {
                scores.insertion + step
            } else {
                step
            }
        };
        if scores.dither > 0.0 {
            penalty += scores.dither * (2.0 * self.rng.gen::<f64>() - 1.0);
        }
        penalty
    }

    /// Fill `path` with the ids from the first position to `final_id`.
    fn trace_path(&mut self, final_id: u32) {
        self.path.clear();
        let mut id = final_id;
        while let Some(pred) = self.arena[id as usize].pred {
            self.path.push(id);
            id = pred;
        }
        self.path.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::parse_acgt;
    use crate::config::SearchParams;
    use crate::constraint::DnaConstraints;
    use crate::encoder::encode;
    use crate::schedule::RatePattern;

    struct Fixture {
        schedule: CodeSchedule,
        engine: ConstraintEngine,
        scores: ScoreWeights,
        limit: usize,
    }

    impl Fixture {
        fn new(rate: RatePattern, left: &str) -> Self {
            let schedule = CodeSchedule::build(
                rate,
                &SearchParams::default(),
                &parse_acgt(left).unwrap(),
                &[],
            )
            .unwrap();
            Self {
                schedule,
                engine: ConstraintEngine::new(DnaConstraints::default()),
                scores: ScoreWeights {
                    reward: rate.reward(),
                    ..ScoreWeights::default()
                },
                limit: 1_000_000,
            }
        }

        fn ctx(&self) -> DecodeContext<'_> {
            DecodeContext {
                schedule: &self.schedule,
                engine: self.engine,
                scores: self.scores,
                hypothesis_limit: self.limit,
            }
        }

        fn encode(&self, message: &[u8]) -> Vec<u8> {
            encode(&self.schedule, &self.engine, message, None).unwrap()
        }
    }

    #[test]
    fn test_candidate_order_is_min_heap() {
        let mut heap = BinaryHeap::new();
        heap.push(Candidate { score: 2.0, id: 1 });
        heap.push(Candidate { score: -1.0, id: 2 });
        heap.push(Candidate { score: 0.5, id: 3 });
        heap.push(Candidate { score: -1.0, id: 0 });
        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|c| c.id)).collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_error_free_decode() {
        let f = Fixture::new(RatePattern::Half, "ACGTTGCA");
        let message = b"error free!\0\0";
        let codetext = f.encode(message);
        let mut decoder = Decoder::new(1024, 1);

        let out = decoder
            .decode(&f.ctx(), &codetext, Some(8 * message.len()))
            .unwrap();
        assert_eq!(out.errcode(), 0);
        assert_eq!(&out.message[..11], &message[..11]);
        assert!(out.final_score < 0.0);
    }

    #[test]
    fn test_whole_codetext_reaches_end() {
        let f = Fixture::new(RatePattern::Half, "");
        let codetext = f.encode(b"to the end");
        let mut decoder = Decoder::new(1024, 1);
        let out = decoder.decode(&f.ctx(), &codetext, None).unwrap();
        assert!(out.is_success());
        assert_eq!(out.final_offset, codetext.len() as i64 - 1);
        assert_eq!(out.final_seq, codetext.len() as i64 - 1);
        assert!(out.message.starts_with(b"to the en"));
    }

    #[test]
    fn test_empty_codetext() {
        let f = Fixture::new(RatePattern::Half, "");
        let mut decoder = Decoder::new(16, 1);
        let out = decoder.decode(&f.ctx(), &[], None).unwrap();
        assert!(out.is_success());
        assert!(out.message.is_empty());
        assert_eq!(out.final_offset, -1);
        assert_eq!(out.hypotheses, 1);
    }

    #[test]
    fn test_corrects_single_deletion() {
        let f = Fixture::new(RatePattern::Half, "");
        let message = b"single deletion test\0\0";
        let mut codetext = f.encode(message);
        codetext.remove(60);
        let mut decoder = Decoder::new(1024, 1);
        let out = decoder
            .decode(&f.ctx(), &codetext, Some(8 * message.len()))
            .unwrap();
        assert!(out.is_success());
        assert_eq!(&out.message[..20], &message[..20]);
    }

    #[test]
    fn test_corrects_single_insertion_and_substitution() {
        let f = Fixture::new(RatePattern::Half, "");
        let message = b"insertion and substitution\0\0";
        let mut codetext = f.encode(message);
        codetext.insert(40, (codetext[40] + 1) % 4);
        codetext[120] = (codetext[120] + 2) % 4;
        let mut decoder = Decoder::new(1024, 1);
        let out = decoder
            .decode(&f.ctx(), &codetext, Some(8 * message.len()))
            .unwrap();
        assert!(out.is_success());
        assert_eq!(&out.message[..26], &message[..26]);
    }

    #[test]
    fn test_budget_exhaustion_returns_partial() {
        let mut f = Fixture::new(RatePattern::Half, "");
        f.limit = 200;
        // unrelated symbols: nothing decodes cleanly
        let codetext: Vec<u8> = (0..150).map(|i| ((i * 7 + i / 3) % 4) as u8).collect();
        let mut decoder = Decoder::new(64, 1);
        let out = decoder.decode(&f.ctx(), &codetext, None).unwrap();
        assert_eq!(out.status, DecodeStatus::SearchExhausted);
        assert_eq!(out.errcode(), 2);
        assert!(out.hypotheses > 200);
        assert!(out.final_offset < codetext.len() as i64 - 1);
    }

    #[test]
    fn test_arena_grows_and_releases() {
        let f = Fixture::new(RatePattern::Half, "");
        let codetext = f.encode(&[0x5a; 30]);
        let mut decoder = Decoder::new(16, 1);
        decoder.decode(&f.ctx(), &codetext, None).unwrap();
        assert!(decoder.hypothesis_count() > 16);
        assert!(decoder.arena_capacity() >= decoder.hypothesis_count());

        decoder.release();
        assert_eq!(decoder.hypothesis_count(), 0);
    }

    #[test]
    fn test_reuse_gives_identical_results() {
        let f = Fixture::new(RatePattern::Third, "GATC");
        let mut codetext = f.encode(b"reuse me");
        codetext.remove(30);
        let mut decoder = Decoder::new(256, 1);
        let first = decoder.decode(&f.ctx(), &codetext, None).unwrap();
        let second = decoder.decode(&f.ctx(), &codetext, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dither_is_seeded() {
        let mut f = Fixture::new(RatePattern::Half, "");
        f.scores.dither = 0.05;
        let codetext = f.encode(b"dithered");
        let a = Decoder::new(256, 9).decode(&f.ctx(), &codetext, None).unwrap();
        let b = Decoder::new(256, 9).decode(&f.ctx(), &codetext, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_trace_path() {
        let f = Fixture::new(RatePattern::Half, "ACGT");
        let codetext = f.encode(b"trace");
        let mut decoder = Decoder::new(256, 1);
        let trace = decoder.decode_full_trace(&f.ctx(), &codetext).unwrap();

        assert_eq!(trace.status, DecodeStatus::Success);
        assert_eq!(trace.nodes.len(), codetext.len());
        assert_eq!(trace.nodes[0].predecessor, 0);
        for (k, node) in trace.nodes.iter().enumerate() {
            assert_eq!(node.seq, k as i64);
            assert_eq!(node.offset, k as i64);
        }
        for pair in trace.nodes.windows(2) {
            assert_eq!(pair[1].predecessor, pair[0].index);
        }
        let last = trace.nodes.last().unwrap();
        assert_eq!(last.score, trace.final_score);
    }

    #[test]
    fn test_max_seq_exceeded_during_search() {
        let search = SearchParams {
            max_seq: 20,
            nsalt: 4,
            ..SearchParams::default()
        };
        let schedule = CodeSchedule::build(RatePattern::Half, &search, &[], &[]).unwrap();
        let engine = ConstraintEngine::new(DnaConstraints::default());
        let ctx = DecodeContext {
            schedule: &schedule,
            engine,
            scores: ScoreWeights::default(),
            hypothesis_limit: 1_000_000,
        };
        let codetext = vec![0u8; 40];
        let mut decoder = Decoder::new(64, 1);
        assert!(decoder.decode(&ctx, &codetext, None).is_err());
    }
}
