// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `pipeline` module couples the DSP stages to the demodulators and
//! drives one block of IQ samples end to end.

use std::io;
use std::io::Write;

use log::{debug, warn};

use crate::analyze::PulseAnalyzer;
use crate::demod::PulseSlicer;
use crate::dsp::envelope::envelope_detect;
use crate::dsp::filter::LowPassFilter;
use crate::errors::Result;
use crate::sensor::SensorDecode;

/// Tuning parameters for a [`Pipeline`].
#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    /// Envelope decimation exponent; one sample is kept per `2^decimation`.
    pub decimation: u32,
    /// Pulse detection threshold in squared-envelope units.
    pub level_limit: i32,
    /// Report pulse timings instead of demodulating bits.
    pub analyze: bool,
    /// Stop after consuming this many input bytes.
    pub byte_budget: Option<u64>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions { decimation: 0, level_limit: 10000, analyze: false, byte_budget: None }
    }
}

struct Channel<S> {
    slicer: PulseSlicer,
    sensor: S,
}

/// The block-processing coordinator.
///
/// Owns the filter state, the per-sensor slicers, and both output sinks. A
/// pipeline must only ever be driven from one thread; all decoder state is
/// carried across blocks, so blocks must arrive in order.
pub struct Pipeline<S: SensorDecode> {
    decimation: u32,
    level_limit: i32,
    bytes_remaining: Option<u64>,
    filter: LowPassFilter,
    analyzer: Option<PulseAnalyzer>,
    channels: Vec<Channel<S>>,
    env_buf: Vec<u16>,
    flt_buf: Vec<i16>,
    raw_sink: Option<Box<dyn Write>>,
    report: Box<dyn Write>,
}

impl<S: SensorDecode> Pipeline<S> {
    /// Build a pipeline decoding with the given sensors, in order.
    ///
    /// In analyzer mode the sensor set is ignored.
    pub fn new(opts: &PipelineOptions, sensors: Vec<S>) -> Self {
        let channels = sensors
            .into_iter()
            .map(|sensor| Channel { slicer: PulseSlicer::new(sensor.timing()), sensor })
            .collect();

        Pipeline {
            decimation: opts.decimation,
            level_limit: opts.level_limit,
            bytes_remaining: opts.byte_budget,
            filter: LowPassFilter::new(),
            analyzer: if opts.analyze { Some(PulseAnalyzer::new()) } else { None },
            channels,
            env_buf: Vec::new(),
            flt_buf: Vec::new(),
            raw_sink: None,
            report: Box::new(io::stderr()),
        }
    }

    /// Save the filtered blocks to `sink` as native-endian signed 16-bit
    /// samples, headerless.
    pub fn set_raw_sink(&mut self, sink: Box<dyn Write>) {
        self.raw_sink = Some(sink);
    }

    /// Redirect decoded reports and analyzer output away from stderr.
    pub fn set_report(&mut self, report: Box<dyn Write>) {
        self.report = report;
    }

    /// Process one block of interleaved 8-bit IQ samples.
    ///
    /// Returns `false` once the byte budget has been consumed; the block is
    /// truncated to the budget first, and the source should stop delivering.
    /// A short write on the raw sink is fatal.
    pub fn process_block(&mut self, iq: &[u8]) -> Result<bool> {
        let mut len = iq.len();
        let mut budget_hit = false;

        if let Some(remaining) = self.bytes_remaining {
            if remaining <= len as u64 {
                len = remaining as usize;
                budget_hit = true;
            }
        }

        let iq = &iq[..len];

        // One filtered sample per two bytes, decimated.
        let n_out = len >> (self.decimation + 1);

        if self.env_buf.len() < len / 2 {
            self.env_buf.resize(len / 2, 0);
            self.flt_buf.resize(len / 2, 0);
        }

        envelope_detect(iq, &mut self.env_buf, self.decimation);
        self.filter.process(&self.env_buf[..n_out], &mut self.flt_buf[..n_out]);

        let flt = &self.flt_buf[..n_out];
        let report = &mut self.report;

        if let Some(analyzer) = self.analyzer.as_mut() {
            analyzer.process(flt, self.level_limit, report)?;
        }
        else {
            for channel in self.channels.iter_mut() {
                let Channel { slicer, sensor } = channel;

                slicer.process(flt, self.level_limit, |frame| {
                    debug!("{} frame: {:?}", sensor.info().short_name, frame);

                    match sensor.decode(frame) {
                        Ok(reading) => {
                            if let Err(err) = write!(report, "{}", reading) {
                                warn!("report write failed: {}", err);
                            }
                        }
                        Err(err) => warn!("{}: {}", sensor.info().short_name, err),
                    }
                });
            }
        }

        if let Some(sink) = self.raw_sink.as_mut() {
            sink.write_all(bytemuck::cast_slice(flt))?;
        }

        if let Some(remaining) = self.bytes_remaining.as_mut() {
            *remaining -= len as u64;
        }

        Ok(!budget_hit)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use crate::demod::PwmTiming;
    use crate::errors::Result;
    use crate::frame::BitFrame;
    use crate::sensor::{SensorDecode, SensorInfo};

    use super::{Pipeline, PipelineOptions};

    /// A capture sink shared with the pipeline.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn take(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Reports the first row as hex, with timings matching the Rubicson
    /// profile.
    struct RowDump;

    struct RowDumpReading([u8; 5]);

    impl fmt::Display for RowDumpReading {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let b = self.0;
            writeln!(f, "row = {:02x}{:02x}{:02x}{:02x}{:02x}", b[0], b[1], b[2], b[3], b[4])?;
            writeln!(f)
        }
    }

    impl SensorDecode for RowDump {
        type Reading = RowDumpReading;

        fn info(&self) -> SensorInfo {
            SensorInfo { short_name: "rowdump", long_name: "test row dump" }
        }

        fn timing(&self) -> PwmTiming {
            PwmTiming { short_limit: 1744, long_limit: 3500, reset_limit: 5000 }
        }

        fn decode(&self, frame: &BitFrame) -> Result<Self::Reading> {
            Ok(RowDumpReading(*frame.row(0)))
        }
    }

    fn high(buf: &mut Vec<u8>, samples: usize) {
        buf.extend(std::iter::repeat(0xFF).take(2 * samples));
    }

    fn low(buf: &mut Vec<u8>, samples: usize) {
        buf.extend(std::iter::repeat(0x80).take(2 * samples));
    }

    /// A burst with Rubicson-band gaps: bits 0, 1, then terminating silence.
    /// Gap lengths are mid-band, leaving headroom for the filter's rise and
    /// fall lag around each edge.
    fn rubicson_burst() -> Vec<u8> {
        let mut iq = Vec::new();
        high(&mut iq, 100);
        low(&mut iq, 800);
        high(&mut iq, 100);
        low(&mut iq, 2500);
        high(&mut iq, 100);
        low(&mut iq, 6000);
        iq
    }

    #[test]
    fn verify_end_to_end_decode() {
        let iq = rubicson_burst();

        let report = SharedBuf::default();
        let mut pipeline = Pipeline::new(&PipelineOptions::default(), vec![RowDump]);
        pipeline.set_report(Box::new(report.clone()));

        assert!(pipeline.process_block(&iq).unwrap());

        let text = String::from_utf8(report.take()).unwrap();
        assert_eq!(text, "row = 4000000000\n\n");
    }

    #[test]
    fn verify_filtered_length_invariant() {
        for d in 0..3 {
            let opts = PipelineOptions { decimation: d, ..Default::default() };

            let sink = SharedBuf::default();
            let mut pipeline = Pipeline::new(&opts, vec![RowDump]);
            pipeline.set_raw_sink(Box::new(sink.clone()));

            let iq = vec![0x80u8; 4096];
            pipeline.process_block(&iq).unwrap();

            // Two bytes per i16 sample in the sink.
            assert_eq!(sink.take().len(), 2 * (4096 >> (d + 1)));
        }
    }

    #[test]
    fn verify_raw_sink_matches_filter_output() {
        let iq = rubicson_burst();

        let sink = SharedBuf::default();
        let mut pipeline = Pipeline::new(&PipelineOptions::default(), vec![RowDump]);
        pipeline.set_raw_sink(Box::new(sink.clone()));
        pipeline.set_report(Box::new(SharedBuf::default()));
        pipeline.process_block(&iq).unwrap();

        let mut env = vec![0u16; iq.len() / 2];
        let n = crate::dsp::envelope::envelope_detect(&iq, &mut env, 0);
        let mut expect = vec![0i16; n];
        crate::dsp::filter::LowPassFilter::new().process(&env[..n], &mut expect);

        let raw = sink.take();
        let samples: Vec<i16> = raw
            .chunks_exact(2)
            .map(|b| i16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, expect);
    }

    #[test]
    fn verify_byte_budget_truncates_block() {
        let opts = PipelineOptions { byte_budget: Some(1000), ..Default::default() };

        let sink = SharedBuf::default();
        let mut pipeline = Pipeline::new(&opts, vec![RowDump]);
        pipeline.set_raw_sink(Box::new(sink.clone()));

        let iq = vec![0x80u8; 4096];
        assert!(!pipeline.process_block(&iq).unwrap());
        assert_eq!(sink.take().len(), 1000);
    }

    #[test]
    fn verify_deterministic_output() {
        let iq = rubicson_burst();

        let mut runs = Vec::new();
        for _ in 0..2 {
            let report = SharedBuf::default();
            let sink = SharedBuf::default();
            let mut pipeline = Pipeline::new(&PipelineOptions::default(), vec![RowDump]);
            pipeline.set_report(Box::new(report.clone()));
            pipeline.set_raw_sink(Box::new(sink.clone()));

            for chunk in iq.chunks(2048) {
                pipeline.process_block(chunk).unwrap();
            }
            runs.push((report.take(), sink.take()));
        }

        assert_eq!(runs[0], runs[1]);
    }
}
