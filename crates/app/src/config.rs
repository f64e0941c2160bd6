//! Configuration for the dnacode-sim application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (every random stream is derived from one seed, so runs are reproducible).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using the reference
//! parameters. All resolved values can be printed so runs are reproducible.

use dnacode_core::channel::ChannelConfig;
use dnacode_core::schedule::RatePattern;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_LEFT_PRIMER: &str = "TCGAAGTCAGCGTGTATTGTATG";
pub const DEFAULT_RIGHT_PRIMER: &str = "TAGTGAGTGCGATTAAGCGTGTT";

/// Reference per-nucleotide error rates, scaled by 1.5 for the defaults.
const REFERENCE_RATES: (f64, f64, f64) = (0.0238, 0.0082, 0.0039);
const RATE_SCALE: f64 = 1.5;

/// Complete configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// Input file path (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Output file for the recovered payload
    pub output_file: PathBuf,

    /// Master seed every other seed is derived from
    pub seed: u64,

    // === Code ===
    pub rate: RatePattern,

    /// Total strand length in nucleotides, primers included
    pub strand_len: usize,

    /// Strands to generate when no input file is given
    pub strands: usize,

    /// Zero bytes appended to every strand message
    pub runout: usize,

    pub left_primer: String,
    pub right_primer: String,

    /// Apply the default GC/run constraints
    pub constraints: bool,

    /// Decoder hypothesis budget
    pub hypothesis_limit: usize,

    // === Channel ===
    pub channel: ChannelConfig,

    /// Probability a read comes back reverse-complemented
    pub flip_rate: f64,

    /// Seed for the flip decisions
    pub flip_seed: u64,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,

    /// Debug-level logging
    pub verbose: bool,
}

/// Parse the value following `args[*i]`.
fn next_value<T: FromStr>(args: &[String], i: &mut usize, what: &str) -> Result<T, String> {
    let flag = &args[*i];
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| format!("{} requires {}", flag, what))?;
    raw.parse()
        .map_err(|_| format!("invalid value for {}: {}", flag, raw))
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// Without `--seed` a time-based seed is chosen and printed with the
    /// configuration; with it the whole run is deterministic.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut seed: Option<u64> = None;
        let mut rate: Option<u8> = None;
        let mut strand_len: Option<usize> = None;
        let mut strands: Option<usize> = None;
        let mut sub_rate: Option<f64> = None;
        let mut del_rate: Option<f64> = None;
        let mut ins_rate: Option<f64> = None;
        let mut flip_rate: Option<f64> = None;
        let mut hypothesis_limit: Option<usize> = None;
        let mut runout: Option<usize> = None;
        let mut left_primer: Option<String> = None;
        let mut right_primer: Option<String> = None;
        let mut constraints = true;
        let mut print_config = false;
        let mut print_metrics = true;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--in" => input_file = Some(next_value(args, &mut i, "a path")?),
                "--out" => output_file = Some(next_value(args, &mut i, "a path")?),
                "--seed" => seed = Some(next_value(args, &mut i, "a number")?),
                "--rate" => rate = Some(next_value(args, &mut i, "a preset 1-6")?),
                "--strand-len" => strand_len = Some(next_value(args, &mut i, "a number")?),
                "--strands" => strands = Some(next_value(args, &mut i, "a number")?),
                "--sub" => sub_rate = Some(next_value(args, &mut i, "a rate")?),
                "--del" => del_rate = Some(next_value(args, &mut i, "a rate")?),
                "--ins" => ins_rate = Some(next_value(args, &mut i, "a rate")?),
                "--flip-rate" => flip_rate = Some(next_value(args, &mut i, "a rate")?),
                "--hlimit" => hypothesis_limit = Some(next_value(args, &mut i, "a number")?),
                "--runout" => runout = Some(next_value(args, &mut i, "a number")?),
                "--left-primer" => left_primer = Some(next_value(args, &mut i, "ACGT text")?),
                "--right-primer" => right_primer = Some(next_value(args, &mut i, "ACGT text")?),
                "--no-constraints" => constraints = false,
                "--print-config" => print_config = true,
                "--no-metrics" => print_metrics = false,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        // Derive independent streams from the master seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let channel_seed: u64 = rng.gen();
        let flip_seed: u64 = rng.gen();

        let rate = RatePattern::from_number(rate.unwrap_or(3)).map_err(|e| e.to_string())?;
        let flip_rate = flip_rate.unwrap_or(0.5);
        if !(0.0..=1.0).contains(&flip_rate) {
            return Err(format!("--flip-rate must be in 0.0..=1.0, got {}", flip_rate));
        }

        let (sub, del, ins) = REFERENCE_RATES;
        let config = Config {
            input_file,
            output_file: output_file.unwrap_or_else(|| PathBuf::from("./out.bin")),
            seed,
            rate,
            strand_len: strand_len.unwrap_or(300),
            strands: strands.unwrap_or(64),
            runout: runout.unwrap_or(2),
            left_primer: left_primer.unwrap_or_else(|| DEFAULT_LEFT_PRIMER.to_string()),
            right_primer: right_primer.unwrap_or_else(|| DEFAULT_RIGHT_PRIMER.to_string()),
            constraints,
            hypothesis_limit: hypothesis_limit.unwrap_or(1_000_000),
            channel: ChannelConfig::with_rates(
                sub_rate.unwrap_or(RATE_SCALE * sub),
                del_rate.unwrap_or(RATE_SCALE * del),
                ins_rate.unwrap_or(RATE_SCALE * ins),
                channel_seed,
            ),
            flip_rate,
            flip_seed,
            print_config,
            print_metrics,
            verbose,
        };

        Ok(config)
    }

    /// Message bytes per strand (id, payload and runout together).
    pub fn bytes_per_strand(&self) -> usize {
        let primers = self.left_primer.len() + self.right_primer.len();
        let coded = self.strand_len.saturating_sub(primers) as f64;
        (coded * self.rate.rate() / 4.0) as usize
    }

    /// Payload bytes per strand after the id and runout.
    pub fn payload_per_strand(&self) -> usize {
        self.bytes_per_strand()
            .saturating_sub(crate::STRAND_ID_BYTES + self.runout)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!(
            "Input file:  {}",
            self.input_file
                .as_ref()
                .map_or("(generate sample)".into(), |p| p.display().to_string())
        );
        println!("Output file: {}", self.output_file.display());
        println!("Seed: {}", self.seed);
        println!();
        println!("=== Code ===");
        println!("Rate preset: {} ({:.3})", self.rate.number(), self.rate.rate());
        println!("Strand length: {} nt", self.strand_len);
        println!("Bytes per strand: {}", self.bytes_per_strand());
        println!("Payload per strand: {}", self.payload_per_strand());
        println!("Runout: {} bytes", self.runout);
        println!("Left primer:  {}", self.left_primer);
        println!("Right primer: {}", self.right_primer);
        println!("Constraints: {}", if self.constraints { "on" } else { "off" });
        println!("Hypothesis limit: {}", self.hypothesis_limit);
        println!();
        println!("=== Channel ===");
        println!("Substitution rate: {:.4}", self.channel.sub_rate);
        println!("Deletion rate: {:.4}", self.channel.del_rate);
        println!("Insertion rate: {:.4}", self.channel.ins_rate);
        println!("Flip rate: {:.2}", self.flip_rate);
        println!();
    }
}

fn print_help() {
    println!("dnacode-sim: DNA storage encode / error channel / decode simulation");
    println!();
    println!("USAGE:");
    println!("    dnacode-sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>             Input file (default: generate sample)");
    println!("    --out <PATH>            Recovered payload file (default: ./out.bin)");
    println!("    --seed <N>              Random seed for determinism");
    println!();
    println!("    --rate <1-6>            Rate preset: 1=0.75 2=0.6 3=0.5 4=0.333 5=0.25 6=0.166 (default: 3)");
    println!("    --strand-len <N>        Strand length in nt, primers included (default: 300)");
    println!("    --strands <N>           Strands to generate without --in (default: 64)");
    println!("    --runout <N>            Zero bytes after each strand payload (default: 2)");
    println!("    --left-primer <ACGT>    Left primer (default: {})", DEFAULT_LEFT_PRIMER);
    println!("    --right-primer <ACGT>   Right primer (default: {})", DEFAULT_RIGHT_PRIMER);
    println!("    --no-constraints        Disable GC/homopolymer constraints");
    println!("    --hlimit <N>            Decoder hypothesis limit (default: 1000000)");
    println!();
    println!("    --sub <RATE>            Substitution rate (default: 0.0357)");
    println!("    --del <RATE>            Deletion rate (default: 0.0123)");
    println!("    --ins <RATE>            Insertion rate (default: 0.00585)");
    println!("    --flip-rate <RATE>      Reverse-complemented read rate (default: 0.5)");
    println!();
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print metrics summary");
    println!("    --verbose, -v           Debug logging");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    dnacode-sim                                  # Reference parameters");
    println!("    dnacode-sim --seed 42                        # Deterministic run");
    println!("    dnacode-sim --in file.bin --out back.bin     # Store a specific file");
    println!("    dnacode-sim --rate 1 --sub 0 --del 0 --ins 0 # Error-free, densest code");
    println!();
}
