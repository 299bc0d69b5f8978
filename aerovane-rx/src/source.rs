// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample source adapters: the live dongle and pre-recorded file replay.
//! Both deliver blocks of interleaved 8-bit IQ samples to the pipeline, in
//! order, from a single thread, until end of stream or cancellation.

use std::fs::File;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use aerovane::core::errors::{device_error, Error, Result};
use aerovane::core::pipeline::Pipeline;
use aerovane::core::sensor::SensorDecode;

use log::{info, warn};
use rtl_sdr_rs::{DeviceId, RtlSdr, TunerGain};

use crate::Config;

/// Recordings are replayed in fixed-size chunks, independent of the live
/// block size.
const REPLAY_CHUNK: usize = 131_072;

/// Feed a pre-recorded IQ capture through the pipeline.
///
/// A trailing chunk shorter than [`REPLAY_CHUNK`] is dropped.
pub fn replay_file<S: SensorDecode>(
    path: &str,
    pipeline: &mut Pipeline<S>,
    cancel: &AtomicBool,
) -> Result<()> {
    info!("replaying samples from file: {}", path);

    let mut file = File::open(path)?;
    let mut buf = vec![0u8; REPLAY_CHUNK];
    let mut blocks = 0u64;

    while !cancel.load(Ordering::Relaxed) {
        if !fill_chunk(&mut file, &mut buf)? {
            break;
        }

        let more = pipeline.process_block(&buf)?;
        blocks += 1;

        if !more {
            break;
        }
    }

    info!("replay issued {} blocks", blocks);
    Ok(())
}

/// Read until `buf` is full. Returns `false` at end of file; a partial fill
/// is discarded.
fn fill_chunk(file: &mut File, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;

    while filled < buf.len() {
        let read = file.read(&mut buf[filled..])?;
        if read == 0 {
            return Ok(false);
        }
        filled += read;
    }

    Ok(true)
}

/// Drive the pipeline from the live device until cancellation, budget
/// exhaustion, or device failure.
pub fn run_device<S: SensorDecode>(
    config: &Config,
    pipeline: &mut Pipeline<S>,
    cancel: &AtomicBool,
) -> Result<()> {
    let mut sdr = open_configured(config)?;

    info!("reading samples...");

    let result = read_loop(&mut sdr, config, pipeline, cancel);

    if cancel.load(Ordering::Relaxed) {
        info!("user cancel, exiting");
    }
    if let Err(err) = sdr.close() {
        warn!("device close failed: {:?}", err);
    }

    result
}

fn read_loop<S: SensorDecode>(
    sdr: &mut RtlSdr,
    config: &Config,
    pipeline: &mut Pipeline<S>,
    cancel: &AtomicBool,
) -> Result<()> {
    let mut buf = vec![0u8; config.block_size];

    while !cancel.load(Ordering::Relaxed) {
        let read = match sdr.read_sync(&mut buf) {
            Ok(read) => read,
            Err(err) => {
                warn!("device read failed: {:?}", err);
                return device_error("read failed");
            }
        };

        if !pipeline.process_block(&buf[..read])? {
            break;
        }

        if read < buf.len() {
            warn!("short read, samples lost, exiting");
            break;
        }
    }

    Ok(())
}

/// Raw passthrough: device bytes straight to the sink, bypassing the
/// decoder.
pub fn sync_passthrough(
    config: &Config,
    mut sink: Box<dyn Write>,
    cancel: &AtomicBool,
) -> Result<()> {
    let mut sdr = open_configured(config)?;

    info!("reading samples in sync mode...");

    let mut buf = vec![0u8; config.block_size];
    let mut remaining = config.byte_budget;

    let result = loop {
        if cancel.load(Ordering::Relaxed) {
            info!("user cancel, exiting");
            break Ok(());
        }

        let read = match sdr.read_sync(&mut buf) {
            Ok(read) => read,
            Err(err) => {
                warn!("sync read failed: {:?}", err);
                break device_error("sync read failed");
            }
        };

        let mut len = read;
        let mut budget_hit = false;
        if let Some(rem) = remaining {
            if rem <= len as u64 {
                len = rem as usize;
                budget_hit = true;
            }
        }

        if let Err(err) = sink.write_all(&buf[..len]) {
            warn!("short write, samples lost, exiting");
            break Err(Error::IoError(err));
        }

        if let Some(rem) = remaining.as_mut() {
            *rem -= len as u64;
        }

        if budget_hit {
            break Ok(());
        }

        if read < buf.len() {
            warn!("short read, samples lost, exiting");
            break Ok(());
        }
    };

    if let Err(err) = sdr.close() {
        warn!("device close failed: {:?}", err);
    }

    result
}

/// Open the dongle and apply the receiver configuration.
///
/// Rate, frequency, and gain failures are non-fatal; a device that cannot be
/// opened or whose buffers cannot be reset is.
fn open_configured(config: &Config) -> Result<RtlSdr> {
    let mut sdr = match RtlSdr::open(DeviceId::Index(config.device_index)) {
        Ok(sdr) => sdr,
        Err(err) => {
            warn!("failed to open rtl-sdr device #{}: {:?}", config.device_index, err);
            return device_error("failed to open device");
        }
    };

    match sdr.set_sample_rate(config.sample_rate) {
        Ok(()) => info!("sample rate set to {}", config.sample_rate),
        Err(err) => warn!("failed to set sample rate: {:?}", err),
    }

    info!(
        "sample rate decimation set to {}, {} -> {}",
        config.decimation,
        config.sample_rate,
        config.sample_rate >> config.decimation
    );
    info!("bit detection level set to {}", config.level_limit);

    match sdr.set_center_freq(config.frequency) {
        Ok(()) => info!("tuned to {} Hz", config.frequency),
        Err(err) => warn!("failed to set center frequency: {:?}", err),
    }

    let gain = if config.gain == 0 { TunerGain::Auto } else { TunerGain::Manual(config.gain) };
    match sdr.set_tuner_gain(gain) {
        Ok(()) if config.gain == 0 => info!("tuner gain set to automatic"),
        Ok(()) => info!("tuner gain set to {} dB", f64::from(config.gain) / 10.0),
        Err(err) => warn!("failed to set tuner gain: {:?}", err),
    }

    if let Err(err) = sdr.reset_buffer() {
        warn!("failed to reset device buffers: {:?}", err);
        if let Err(err) = sdr.close() {
            warn!("device close failed: {:?}", err);
        }
        return device_error("failed to reset device buffers");
    }

    Ok(sdr)
}
