//! dnacode-sim: store a payload in simulated DNA strands and read it back.
//!
//! Pipeline per strand: payload slice -> encode (fixed strand length) ->
//! error channel -> random reverse complement -> orient -> decode ->
//! compare with ground truth. A CRC32 over the whole payload and the whole
//! recovered stream tells whether the run was lossless.

mod config;
mod input_gen;

use config::Config;
use dnacode_core::alphabet::reverse_complement;
use dnacode_core::channel::ChannelSimulator;
use dnacode_core::constraint::DnaConstraints;
use dnacode_core::error::{ConfigError, Error, Result};
use dnacode_core::{Codec, Metrics, SearchParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::Level;

/// Big-endian strand index at the start of every strand message.
pub const STRAND_ID_BYTES: usize = 2;

/// Payload bits protected by the message-derived salt: the strand id.
const STRAND_NSALT: usize = 8 * STRAND_ID_BYTES;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage");
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("run failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn build_codec(config: &Config) -> Result<Codec> {
    let mut codec = Codec::new()?;
    codec.set_search_params(SearchParams {
        nsalt: STRAND_NSALT,
        hypothesis_limit: config.hypothesis_limit,
        ..SearchParams::default()
    })?;
    if !config.constraints {
        codec.set_dna_constraints(DnaConstraints::disabled())?;
    }
    codec.set_code_rate(config.rate, &config.left_primer, &config.right_primer)?;

    let needed = codec.min_strand_length(config.bytes_per_strand())?;
    if config.payload_per_strand() == 0 || needed > config.strand_len {
        return Err(ConfigError::OutOfRange {
            name: "strand_len",
            value: config.strand_len.to_string(),
            expected: "room for primers, strand id, runout and at least one payload byte",
        }
        .into());
    }
    Ok(codec)
}

/// Strand message: id, payload slice zero-padded to full width, runout.
fn strand_message(id: u16, chunk: &[u8], config: &Config) -> Vec<u8> {
    let mut message = Vec::with_capacity(config.bytes_per_strand());
    message.extend_from_slice(&id.to_be_bytes());
    message.extend_from_slice(chunk);
    message.resize(config.bytes_per_strand(), 0);
    message
}

/// Run the whole simulation; `Ok(true)` when the payload came back intact.
fn run(config: &Config) -> Result<bool> {
    let payload = match &config.input_file {
        Some(path) => std::fs::read(path)?,
        None => input_gen::generate_sample_data(
            config.seed,
            config.strands * config.payload_per_strand(),
        ),
    };

    let mut codec = build_codec(config)?;
    let per_strand = config.payload_per_strand();
    let strand_count = payload.len().div_ceil(per_strand);
    if strand_count > usize::from(u16::MAX) + 1 {
        return Err(Error::Config(ConfigError::OutOfRange {
            name: "input size",
            value: payload.len().to_string(),
            expected: "at most 65536 strands",
        }));
    }

    tracing::info!(
        bytes = payload.len(),
        strands = strand_count,
        rate = config.rate.number(),
        strand_len = config.strand_len,
        "storing payload"
    );

    let mut channel = ChannelSimulator::new(config.channel)?;
    let mut flip_rng = ChaCha8Rng::seed_from_u64(config.flip_seed);
    let mut metrics = Metrics::new();
    let mut recovered = Vec::with_capacity(payload.len());
    let max_bits = 8 * config.bytes_per_strand();

    for (index, chunk) in payload.chunks(per_strand).enumerate() {
        let id = index as u16;
        let message = strand_message(id, chunk, config);
        let strand = codec.encode(&message, Some(config.strand_len))?;
        let truth = &message[..STRAND_ID_BYTES + chunk.len()];
        metrics.record_encode(truth.len(), strand.len());

        let mut read = channel.transmit(&strand);
        if flip_rng.gen::<f64>() < config.flip_rate {
            read = reverse_complement(&read);
        }
        let oriented = codec.orient(&config.left_primer, &read)?;
        if oriented != read {
            metrics.strands_reoriented += 1;
        }

        let outcome = codec.decode(&oriented, Some(max_bits))?;
        metrics.record_decode(&outcome, truth);

        let decoded_id = outcome
            .message
            .get(..STRAND_ID_BYTES)
            .map(|b| u16::from_be_bytes([b[0], b[1]]));
        if decoded_id != Some(id) {
            tracing::warn!(strand = id, decoded = ?decoded_id, "strand id mismatch");
        }
        tracing::debug!(
            strand = id,
            status = ?outcome.status,
            hypotheses = outcome.hypotheses,
            read_len = oriented.len(),
            "strand decoded"
        );

        let mut data: Vec<u8> = outcome
            .message
            .iter()
            .skip(STRAND_ID_BYTES)
            .take(chunk.len())
            .copied()
            .collect();
        data.resize(chunk.len(), 0);
        recovered.extend_from_slice(&data);
    }

    metrics.record_channel(&channel.stats());
    metrics.complete();
    std::fs::write(&config.output_file, &recovered)?;

    let crc_in = crc32fast::hash(&payload);
    let crc_out = crc32fast::hash(&recovered);

    if config.print_metrics {
        metrics.print_summary();
        println!("=== Integrity ===");
        println!("CRC32 in:  {:08x}", crc_in);
        println!("CRC32 out: {:08x}", crc_out);
        println!();
    }
    metrics.print_result();

    Ok(crc_in == crc_out && payload.len() == recovered.len())
}
