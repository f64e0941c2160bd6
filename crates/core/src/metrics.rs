//! Metrics collection and reporting for a storage simulation run.
//!
//! Tracks what happened to each strand on its way through the pipeline:
//! - Encoding (strands, nucleotides, payload bytes)
//! - Channel damage (substitutions, deletions, insertions, flips)
//! - Decoding (successes, exhausted searches, hypotheses spent)
//! - Ground-truth comparison (byte errors)
//!
//! # Thread Safety
//!
//! The `Metrics` struct is NOT thread-safe. For multi-threaded use, keep
//! per-thread metrics and merge them at the end.

use crate::channel::ChannelStats;
use crate::decoder::DecodeOutcome;
use std::time::{Duration, Instant};

/// Counters for one simulation run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Encoding ===
    /// Strands passed to the encoder
    pub strands_encoded: u64,

    /// Nucleotides emitted, primers included
    pub symbols_emitted: u64,

    /// Payload bytes fed into the encoder
    pub payload_bytes_in: u64,

    /// Payload bytes recovered by the decoder
    pub payload_bytes_out: u64,

    // === Channel ===
    pub substitutions: u64,
    pub deletions: u64,
    pub insertions: u64,

    /// Reads that came back reverse-complemented and were flipped back
    pub strands_reoriented: u64,

    // === Decoding ===
    /// Searches that reached the end of their read
    pub decode_successes: u64,

    /// Searches stopped by the hypothesis budget
    pub search_exhaustions: u64,

    /// Hypotheses created across all searches
    pub total_hypotheses: u64,

    /// Strands whose payload differs from ground truth
    pub strands_failed: u64,

    /// Payload bytes that differ from ground truth
    pub byte_errors: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            strands_encoded: 0,
            symbols_emitted: 0,
            payload_bytes_in: 0,
            payload_bytes_out: 0,
            substitutions: 0,
            deletions: 0,
            insertions: 0,
            strands_reoriented: 0,
            decode_successes: 0,
            search_exhaustions: 0,
            total_hypotheses: 0,
            strands_failed: 0,
            byte_errors: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Count one encoded strand.
    pub fn record_encode(&mut self, payload_bytes: usize, codetext_len: usize) {
        self.strands_encoded += 1;
        self.payload_bytes_in += payload_bytes as u64;
        self.symbols_emitted += codetext_len as u64;
    }

    /// Take the channel's cumulative counters.
    pub fn record_channel(&mut self, stats: &ChannelStats) {
        self.substitutions = stats.substitutions;
        self.deletions = stats.deletions;
        self.insertions = stats.insertions;
    }

    /// Count one decode and compare its payload against `expected`.
    pub fn record_decode(&mut self, outcome: &DecodeOutcome, expected: &[u8]) {
        if outcome.is_success() {
            self.decode_successes += 1;
        } else {
            self.search_exhaustions += 1;
        }
        self.total_hypotheses += outcome.hypotheses as u64;
        self.payload_bytes_out += outcome.message.len().min(expected.len()) as u64;

        let differing = expected
            .iter()
            .enumerate()
            .filter(|&(i, byte)| outcome.message.get(i) != Some(byte))
            .count() as u64;
        self.byte_errors += differing;
        if differing > 0 {
            self.strands_failed += 1;
        }
    }

    /// Strands not recovered exactly, per strand encoded.
    pub fn strand_failure_rate(&self) -> f64 {
        if self.strands_encoded == 0 {
            0.0
        } else {
            self.strands_failed as f64 / self.strands_encoded as f64
        }
    }

    /// Wrong payload bytes, per payload byte encoded.
    pub fn byte_error_rate(&self) -> f64 {
        if self.payload_bytes_in == 0 {
            0.0
        } else {
            self.byte_errors as f64 / self.payload_bytes_in as f64
        }
    }

    /// Average hypotheses per decode.
    pub fn mean_hypotheses(&self) -> f64 {
        let decodes = self.decode_successes + self.search_exhaustions;
        if decodes == 0 {
            0.0
        } else {
            self.total_hypotheses as f64 / decodes as f64
        }
    }

    /// Channel edits per emitted nucleotide.
    pub fn channel_error_rate(&self) -> f64 {
        if self.symbols_emitted == 0 {
            0.0
        } else {
            (self.substitutions + self.deletions + self.insertions) as f64
                / self.symbols_emitted as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Encoding ===");
        println!("Strands: {}", self.strands_encoded);
        println!("Nucleotides: {}", self.symbols_emitted);
        println!("Payload in:  {} bytes", self.payload_bytes_in);
        println!("Payload out: {} bytes", self.payload_bytes_out);
        println!();

        println!("=== Channel ===");
        println!("Substitutions: {}", self.substitutions);
        println!("Deletions: {}", self.deletions);
        println!("Insertions: {}", self.insertions);
        println!("Edit rate: {:.4}", self.channel_error_rate());
        println!("Reads reoriented: {}", self.strands_reoriented);
        println!();

        println!("=== Decoding ===");
        println!("Successes: {}", self.decode_successes);
        println!("Searches exhausted: {}", self.search_exhaustions);
        println!("Mean hypotheses: {:.0}", self.mean_hypotheses());
        println!(
            "Failed strands: {} ({:.2}%)",
            self.strands_failed,
            self.strand_failure_rate() * 100.0
        );
        println!(
            "Byte errors: {} ({:.4}%)",
            self.byte_errors,
            self.byte_error_rate() * 100.0
        );
        println!();
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        if self.byte_errors == 0 && self.search_exhaustions == 0 {
            println!("✓ All strands recovered");
            println!(
                "  {} strands, {} bytes in {} ms",
                self.strands_encoded,
                self.payload_bytes_in,
                self.duration().as_millis()
            );
        } else if self.byte_errors == 0 {
            println!(
                "✓ All strands recovered ({} searches exhausted)",
                self.search_exhaustions
            );
        } else {
            println!(
                "✗ {} of {} strands failed, {} byte errors",
                self.strands_failed, self.strands_encoded, self.byte_errors
            );
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             strands_encoded={}\n\
             symbols_emitted={}\n\
             payload_bytes_in={}\n\
             payload_bytes_out={}\n\
             substitutions={}\n\
             deletions={}\n\
             insertions={}\n\
             strands_reoriented={}\n\
             decode_successes={}\n\
             search_exhaustions={}\n\
             mean_hypotheses={:.1}\n\
             strands_failed={}\n\
             strand_failure_rate={:.4}\n\
             byte_errors={}\n\
             byte_error_rate={:.6}\n",
            self.duration().as_millis(),
            self.strands_encoded,
            self.symbols_emitted,
            self.payload_bytes_in,
            self.payload_bytes_out,
            self.substitutions,
            self.deletions,
            self.insertions,
            self.strands_reoriented,
            self.decode_successes,
            self.search_exhaustions,
            self.mean_hypotheses(),
            self.strands_failed,
            self.strand_failure_rate(),
            self.byte_errors,
            self.byte_error_rate(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
