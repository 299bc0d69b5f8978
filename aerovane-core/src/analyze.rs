// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pulse timing analysis, for characterizing an unknown transmitter before
//! writing a timing profile for it.

use std::io;

/// Reports the position, length, and spacing of every pulse in the filtered
/// stream. An alternative consumer to the demodulators; it never emits bits.
///
/// Edge detection uses the same strict threshold comparison as the slicer.
pub struct PulseAnalyzer {
    sample_idx: u64,
    pulses: u64,
    pulse_start: u64,
    pulse_end: u64,
    length_total: u64,
    await_rise: bool,
    await_fall: bool,
}

impl PulseAnalyzer {
    pub fn new() -> Self {
        PulseAnalyzer {
            sample_idx: 0,
            pulses: 0,
            pulse_start: 0,
            pulse_end: 0,
            length_total: 0,
            await_rise: true,
            await_fall: false,
        }
    }

    /// Scan one filtered block, writing a report line per detected edge.
    ///
    /// The sample index runs from the start of the stream, not the block.
    /// The rising edge is reported against the pre-increment index and the
    /// falling edge against the post-increment index, matching the timing of
    /// legacy reports.
    pub fn process(
        &mut self,
        buf: &[i16],
        level_limit: i32,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        for &s in buf {
            let s = i32::from(s);

            if s > level_limit && self.await_rise {
                self.pulses += 1;
                writeln!(out, "pulse_distance {}", self.sample_idx - self.pulse_end)?;
                writeln!(
                    out,
                    "pulse_start[{}] found at sample {}, value = {}",
                    self.pulses, self.sample_idx, s
                )?;
                self.pulse_start = self.sample_idx;
                self.await_rise = false;
                self.await_fall = true;
            }

            self.sample_idx += 1;

            if s < level_limit {
                if self.await_fall {
                    let length = self.sample_idx - self.pulse_start;
                    self.length_total += length;
                    writeln!(
                        out,
                        "pulse_end  [{}] found at sample {}, pulse length = {}, pulse avg length = {}",
                        self.pulses,
                        self.sample_idx,
                        length,
                        self.length_total / self.pulses
                    )?;
                    self.pulse_end = self.sample_idx;
                    self.await_fall = false;
                }
                self.await_rise = true;
            }
        }

        Ok(())
    }
}

impl Default for PulseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
