//! dnacode-core: error-correcting codec for DNA data storage
//!
//! This library turns byte payloads into nucleotide strands that survive
//! substitutions, insertions and deletions, and recovers them again:
//! - Encodes payload bits into a strand through a keyed hash chain, so every
//!   symbol depends on the bits before it
//! - Keeps strands synthesizable (bounded GC content and homopolymer runs)
//! - Decodes noisy reads with a best-first search over edit hypotheses
//! - Reorients reads that came back reverse-complemented
//! - Simulates a noisy synthesis/sequencing channel with seeded randomness
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `alphabet`: Numeric nucleotide helpers
//! - `digest`: Keyed integer hash
//! - `constraint`: GC/run constraint engine
//! - `bitio`: Low-level bit reading/writing
//! - `schedule`: Rate patterns, width table, salt schedule
//! - `vbits`: Variable-rate bit codec
//! - `encoder`: Message to strand
//! - `decoder`: Hypothesis search decoder
//! - `align`: Primer alignment and orientation
//! - `channel`: Error injector with seeded randomness
//! - `codec`: Configuration-owning facade over all of the above
//! - `metrics`: Observable run behavior
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Explicit configuration**: One versioned `CodecConfig` per `Codec`
//! - **Deterministic**: Seeded randomness makes runs reproducible
//! - **Observable**: Search statistics and run metrics

pub mod align;
pub mod alphabet;
pub mod bitio;
pub mod channel;
pub mod codec;
pub mod config;
pub mod constraint;
pub mod decoder;
pub mod digest;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod vbits;

// Re-export commonly used types
pub use alphabet::{parse_acgt, reverse_complement, to_acgt_string, DnaSequence};
pub use channel::{inject_errors, ChannelConfig, ChannelSimulator, ChannelStats};
pub use codec::Codec;
pub use config::{CodecConfig, ScoreWeights, SearchParams};
pub use constraint::DnaConstraints;
pub use decoder::{DecodeOutcome, DecodeStatus, DecodeTrace, TraceNode};
pub use digest::hashint;
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use schedule::RatePattern;
