// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::fs::File;
use std::io;
use std::io::Write;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use aerovane::core::errors::{self, Result};
use aerovane::core::pipeline::{Pipeline, PipelineOptions};

use clap::{App, Arg, ArgMatches};
use log::{error, warn};

mod source;

const DEFAULT_FREQUENCY: u32 = 433_920_000;
const DEFAULT_SAMPLE_RATE: u32 = 48_000;
const DEFAULT_LEVEL_LIMIT: i32 = 10_000;
const DEFAULT_BLOCK_SIZE: usize = 262_144;
const MINIMAL_BLOCK_SIZE: usize = 512;
const MAXIMAL_BLOCK_SIZE: usize = 4_194_304;

/// Set by the signal handler, observed at block boundaries.
static CANCEL: AtomicBool = AtomicBool::new(false);

pub struct Config {
    pub device_index: usize,
    pub frequency: u32,
    pub sample_rate: u32,
    /// Tuner gain in tenths of a dB; 0 selects automatic gain.
    pub gain: i32,
    pub level_limit: i32,
    pub decimation: u32,
    pub block_size: usize,
    pub byte_budget: Option<u64>,
    pub analyze: bool,
    pub replay: Option<String>,
    pub sync_mode: bool,
    pub output: Option<String>,
}

fn main() {
    pretty_env_logger::init();

    let config = parse_args();

    if let Err(err) = ctrlc::set_handler(|| CANCEL.store(true, Ordering::Relaxed)) {
        warn!("failed to install signal handler: {}", err);
    }

    if let Err(err) = run(config) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let raw_sink = match config.output.as_deref() {
        // A '-' dumps samples to standard output.
        Some("-") => Some(Box::new(io::stdout()) as Box<dyn Write>),
        Some(path) => Some(Box::new(File::create(path)?) as Box<dyn Write>),
        None => None,
    };

    if config.sync_mode {
        // Raw passthrough; the decoder never runs. parse_args guarantees the
        // output filename is present.
        return match raw_sink {
            Some(sink) => source::sync_passthrough(&config, sink, &CANCEL),
            None => errors::unsupported_error("sync mode requires an output file"),
        };
    }

    let opts = PipelineOptions {
        decimation: config.decimation,
        level_limit: config.level_limit,
        analyze: config.analyze,
        byte_budget: config.byte_budget,
    };

    let mut pipeline = Pipeline::new(&opts, aerovane::default::get_sensors());
    if let Some(sink) = raw_sink {
        pipeline.set_raw_sink(sink);
    }

    match config.replay.as_deref() {
        Some(path) => source::replay_file(path, &mut pipeline, &CANCEL),
        None => source::run_device(&config, &mut pipeline, &CANCEL),
    }
}

fn parse_args() -> Config {
    let matches = App::new("aerovane-rx")
        .version("0.1.0")
        .about("433.92 MHz generic data receiver for RTL2832 based DVB-T receivers")
        .arg(
            Arg::with_name("device")
                .short('d')
                .value_name("INDEX")
                .help("Device index (default: 0)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("frequency")
                .short('f')
                .value_name("HZ")
                .help("Center frequency (default: 433920000)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("sample-rate")
                .short('s')
                .value_name("HZ")
                .help("Sample rate (default: 48000)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("gain")
                .short('g')
                .value_name("DB")
                .help("Tuner gain in dB (default: 0 for auto)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("level")
                .short('l')
                .value_name("LEVEL")
                .help("Bit detection level in squared-envelope units (default: 10000)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("decimation")
                .short('c')
                .value_name("EXP")
                .help("Decimation exponent; keep one sample in 2^N (default: 0)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("block-size")
                .short('b')
                .value_name("BYTES")
                .help("Block size in bytes (default: 262144)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("samples")
                .short('n')
                .value_name("COUNT")
                .help("Number of complex samples to read before stopping (default: unlimited)")
                .takes_value(true),
        )
        .arg(Arg::with_name("analyze").short('a').help("Report pulse timings instead of decoding"))
        .arg(
            Arg::with_name("replay")
                .short('r')
                .value_name("FILE")
                .help("Read data from file instead of from a receiver")
                .takes_value(true),
        )
        .arg(Arg::with_name("sync").short('S').help("Force sync output (default: async)"))
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output file for raw filtered samples (a '-' dumps samples to stdout)")
                .index(1),
        )
        .get_matches();

    // Complex samples on the command line, bytes internally.
    let byte_budget = if matches.is_present("samples") {
        Some((parse_number::<f64>(&matches, "samples") * 2.0) as u64)
    }
    else {
        None
    };

    let config = Config {
        device_index: numeric_or(&matches, "device", 0.0) as usize,
        frequency: numeric_or(&matches, "frequency", f64::from(DEFAULT_FREQUENCY)) as u32,
        sample_rate: numeric_or(&matches, "sample-rate", f64::from(DEFAULT_SAMPLE_RATE)) as u32,
        gain: (numeric_or(&matches, "gain", 0.0) * 10.0) as i32,
        level_limit: numeric_or(&matches, "level", f64::from(DEFAULT_LEVEL_LIMIT)) as i32,
        decimation: numeric_or(&matches, "decimation", 0.0) as u32,
        block_size: clamp_block_size(numeric_or(
            &matches,
            "block-size",
            DEFAULT_BLOCK_SIZE as f64,
        ) as usize),
        byte_budget,
        analyze: matches.is_present("analyze"),
        replay: matches.value_of("replay").map(str::to_owned),
        sync_mode: matches.is_present("sync"),
        output: matches.value_of("OUTPUT").map(str::to_owned),
    };

    if config.sync_mode && config.output.is_none() {
        eprintln!("sync mode writes raw samples and requires an output filename");
        process::exit(1);
    }

    config
}

/// Parse a numeric flag, terminating with a usage message on garbage. Flags
/// accept scientific notation, so `-f 433.92e6` works.
fn parse_number<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    let value = matches.value_of(name).unwrap_or_default();
    value.parse().unwrap_or_else(|_| {
        eprintln!("invalid value for -{}: {}", name, value);
        process::exit(1);
    })
}

fn numeric_or(matches: &ArgMatches, name: &str, default: f64) -> f64 {
    if matches.is_present(name) {
        parse_number(matches, name)
    }
    else {
        default
    }
}

fn clamp_block_size(requested: usize) -> usize {
    if requested < MINIMAL_BLOCK_SIZE || requested > MAXIMAL_BLOCK_SIZE {
        warn!(
            "block size {} out of [{}, {}], falling back to {}",
            requested, MINIMAL_BLOCK_SIZE, MAXIMAL_BLOCK_SIZE, DEFAULT_BLOCK_SIZE
        );
        DEFAULT_BLOCK_SIZE
    }
    else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_block_size, DEFAULT_BLOCK_SIZE};

    #[test]
    fn verify_block_size_clamp() {
        assert_eq!(clamp_block_size(100), DEFAULT_BLOCK_SIZE);
        assert_eq!(clamp_block_size(600), 600);
        assert_eq!(clamp_block_size(512), 512);
        assert_eq!(clamp_block_size(4_194_304), 4_194_304);
        assert_eq!(clamp_block_size(4_194_305), DEFAULT_BLOCK_SIZE);
    }
}
