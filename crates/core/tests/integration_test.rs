//! Integration tests for the full storage pipeline.
//!
//! These tests verify end-to-end behavior: message -> encode -> channel ->
//! orient -> decode -> message, with verification that the decoded payload
//! matches the input.
//!
//! Strands carry two zero runout bytes after the payload: the last few
//! positions of a strand have no later symbols to confirm them, so the
//! runout absorbs that weakness and only the payload is compared.

use dnacode_core::{
    alphabet::{reverse_complement, to_acgt_string},
    channel::{inject_errors, ChannelConfig, ChannelSimulator},
    codec::Codec,
    constraint::DnaConstraints,
    decoder::DecodeStatus,
    metrics::Metrics,
    schedule::RatePattern,
    SearchParams,
};

const LEFT: &str = "TCGAAGTCAGCGTGTATTGTATG";
const RIGHT: &str = "TAGTGAGTGCGATTAAGCGTGTT";
const RUNOUT: usize = 2;

fn with_runout(payload: &[u8]) -> Vec<u8> {
    let mut message = payload.to_vec();
    message.resize(payload.len() + RUNOUT, 0);
    message
}

fn codec(rate: RatePattern) -> Codec {
    let mut codec = Codec::new().expect("default codec");
    codec.set_code_rate(rate, LEFT, RIGHT).expect("set code rate");
    codec
}

/// Every preset decodes its own error-free strands.
#[test]
fn test_round_trip_all_rates() {
    let payload = b"DNA storage round trip";
    let message = with_runout(payload);

    for rate in RatePattern::ALL {
        let mut codec = codec(rate);
        let strand = codec.encode(&message, None).expect("encode failed");
        let text = to_acgt_string(&strand);
        assert!(text.starts_with(LEFT) && text.ends_with(RIGHT));

        let outcome = codec
            .decode(&strand, Some(8 * message.len()))
            .expect("decode failed");
        assert_eq!(outcome.status, DecodeStatus::Success, "rate {:?}", rate);
        assert_eq!(&outcome.message[..payload.len()], payload, "rate {:?}", rate);
    }
}

/// Strands filled to a fixed length still decode to the payload.
#[test]
fn test_fixed_length_strand() {
    let mut codec = codec(RatePattern::Half);
    let message = with_runout(&(0..29u8).collect::<Vec<_>>());
    assert!(codec.min_strand_length(message.len()).unwrap() <= 300);

    let strand = codec.encode(&message, Some(300)).expect("encode failed");
    assert_eq!(strand.len(), 300);

    let outcome = codec
        .decode(&strand, Some(8 * message.len()))
        .expect("decode failed");
    assert!(outcome.is_success());
    assert_eq!(&outcome.message[..29], &message[..29]);
}

/// Encoded strands respect the default GC and run constraints.
#[test]
fn test_strands_are_synthesizable() {
    let codec = codec(RatePattern::ThreeFifths);
    let strand = codec.encode(&[0xffu8; 40], None).expect("encode failed");
    let params = DnaConstraints::default();

    // Primers are fixed text; check only the coded region
    let coded = &strand[LEFT.len()..strand.len() - RIGHT.len()];
    let mut run = 1;
    for pair in coded.windows(2) {
        run = if pair[0] == pair[1] { run + 1 } else { 1 };
        assert!(run <= params.max_run as usize);
    }
    for window in coded.windows(params.window as usize) {
        let gc = window.iter().filter(|&&b| b == 1 || b == 2).count() as u32;
        assert!(gc >= params.min_gc && gc <= params.max_gc);
    }
}

/// Noisy reads decode correctly for most strands.
#[test]
fn test_noisy_channel_round_trip() {
    let mut codec = codec(RatePattern::Half);
    let mut channel =
        ChannelSimulator::new(ChannelConfig::with_rates(0.01, 0.005, 0.003, 2024)).unwrap();
    let mut metrics = Metrics::new();

    let trials = 20;
    let mut recovered = 0;
    for trial in 0..trials {
        let payload: Vec<u8> = (0..20).map(|i| (i * 31 + trial * 7) as u8).collect();
        let message = with_runout(&payload);
        let strand = codec.encode(&message, None).unwrap();
        metrics.record_encode(message.len(), strand.len());

        let read = channel.transmit(&strand);
        let outcome = codec.decode(&read, Some(8 * message.len())).unwrap();
        metrics.record_decode(&outcome, &message[..payload.len()]);
        if outcome.message.get(..payload.len()) == Some(&payload[..]) {
            recovered += 1;
        }
    }
    metrics.record_channel(&channel.stats());
    metrics.complete();

    println!("{}", metrics.export_text());
    assert!(channel.stats().error_rate() > 0.0);
    assert!(recovered >= 15, "only {} of {} strands recovered", recovered, trials);
    assert_eq!(metrics.strands_encoded, trials as u64);
}

/// At one percent of each edit kind, the search consumes the whole read
/// and recovers the payload for most strands.
#[test]
fn test_noisy_read_decodes_to_end() {
    let mut codec = codec(RatePattern::Half);

    let trials = 30;
    let mut recovered = 0;
    for trial in 0..trials {
        let payload: Vec<u8> = (0..20).map(|i| (i * 13 + trial * 5) as u8).collect();
        let message = with_runout(&payload);
        let strand = codec.encode(&message, None).unwrap();
        let read = inject_errors(&strand, 0.01, 0.01, 0.01, trial as u64).unwrap();

        let outcome = codec.decode(&read, None).unwrap();
        assert_eq!(outcome.errcode(), 0, "trial {}", trial);
        assert_eq!(outcome.final_offset, read.len() as i64 - 1, "trial {}", trial);
        if outcome.message.get(..payload.len()) == Some(&payload[..]) {
            recovered += 1;
        }
    }
    assert!(recovered >= 24, "only {} of {} strands recovered", recovered, trials);
}

/// A read that came back reverse-complemented is flipped and decoded.
#[test]
fn test_orient_then_decode() {
    let mut codec = codec(RatePattern::Third);
    let payload = b"backwards";
    let message = with_runout(payload);
    let strand = codec.encode(&message, None).unwrap();

    let read = reverse_complement(&strand);
    let oriented = codec.orient(LEFT, &read).unwrap();
    assert_eq!(oriented, strand);

    let outcome = codec.decode(&oriented, Some(8 * message.len())).unwrap();
    assert_eq!(&outcome.message[..payload.len()], payload);
}

/// A tiny hypothesis budget ends the search early with errcode 2.
#[test]
fn test_search_exhaustion() {
    let mut codec = codec(RatePattern::Half);
    let strand = codec.encode(&with_runout(b"budget"), None).unwrap();
    // heavy damage forces a wide search
    let mut channel =
        ChannelSimulator::new(ChannelConfig::with_rates(0.3, 0.2, 0.2, 5)).unwrap();
    let read = channel.transmit(&strand);

    codec
        .set_search_params(SearchParams {
            hypothesis_limit: 100,
            ..SearchParams::default()
        })
        .unwrap();
    let outcome = codec.decode(&read, None).unwrap();
    assert_eq!(outcome.errcode(), 2);
    assert!(outcome.hypotheses > 100);
    assert!(outcome.final_offset < read.len() as i64 - 1);
}

/// The full trace shows where the search stepped over an indel.
#[test]
fn test_full_trace_follows_deletion() {
    let mut codec = Codec::new().unwrap();
    codec.set_code_rate(RatePattern::Half, "ACGTAC", "").unwrap();
    let mut strand = codec.encode(&with_runout(b"trace a deletion"), None).unwrap();
    strand.remove(50);

    let trace = codec.decode_full_trace(&strand).unwrap();
    assert_eq!(trace.status, DecodeStatus::Success);
    let last = trace.nodes.last().unwrap();
    assert_eq!(last.offset, strand.len() as i64 - 1);
    // one position was decoded without consuming a symbol
    assert_eq!(last.seq, last.offset + 1);
    assert_eq!(trace.nodes[10].seq, trace.nodes[10].offset);
}

/// The rate sweep identifies the rate a strand was written with.
#[test]
fn test_try_all_code_rates_finds_rate() {
    let mut writer = Codec::new().unwrap();
    writer.set_code_rate(RatePattern::Quarter, LEFT, "").unwrap();
    let strand = writer.encode(b"sweep", None).unwrap();

    let mut codec = Codec::new().unwrap();
    let version = codec.version();
    let reached = codec
        .try_all_code_rates(50_000, 2500, &strand, LEFT, "")
        .unwrap();
    assert_eq!(reached[4], strand.len() as i64 - 1);
    assert_eq!(codec.version(), version);
    assert_eq!(codec.code_rate(), RatePattern::Half);
}
