// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pulse-width demodulation of the filtered envelope.
//!
//! Bits are encoded in the gap length between successive carrier pulses. The
//! slicer classifies each gap against a per-sensor timing profile and packs
//! the resulting bits into a [`BitFrame`]; sufficient silence terminates the
//! frame and hands it to the caller.

use crate::frame::BitFrame;

/// Pulse-width timing thresholds, in samples at the filter output rate.
///
/// A gap shorter than `short_limit` is a `0`, a gap in
/// `[short_limit, long_limit)` is a `1`, and a longer gap separates frame
/// repetitions. Silence exceeding `reset_limit` terminates the frame.
#[derive(Clone, Copy, Debug)]
pub struct PwmTiming {
    pub short_limit: i32,
    pub long_limit: i32,
    pub reset_limit: i32,
}

/// The gap-classifying threshold state machine for one timing profile.
///
/// All comparisons against the level limit are strict; a sample exactly at
/// the limit holds the current state. The intra-sample evaluation order
/// (pulse entry, gap entry, counter advance, gap classification, silence
/// reset) is load-bearing: captured sample files must decode identically
/// across versions.
pub struct PulseSlicer {
    timing: PwmTiming,
    /// Inside a carrier pulse.
    in_pulse: bool,
    /// In the gap following a pulse.
    in_gap: bool,
    /// At least one pulse seen; the counter is running.
    counting: bool,
    sample_counter: i32,
    frame: BitFrame,
}

impl PulseSlicer {
    pub fn new(timing: PwmTiming) -> Self {
        assert!(
            0 < timing.short_limit
                && timing.short_limit < timing.long_limit
                && timing.long_limit < timing.reset_limit
        );

        PulseSlicer {
            timing,
            in_pulse: false,
            in_gap: false,
            counting: false,
            sample_counter: 0,
            frame: BitFrame::new(),
        }
    }

    pub fn timing(&self) -> PwmTiming {
        self.timing
    }

    /// The frame being accumulated.
    pub fn frame(&self) -> &BitFrame {
        &self.frame
    }

    /// Run the slicer over one filtered block.
    ///
    /// `on_frame` is called for every frame terminated by silence within the
    /// block, before the frame buffer is cleared. Frames still accumulating
    /// at the end of the block carry over to the next call.
    pub fn process<F>(&mut self, buf: &[i16], level_limit: i32, mut on_frame: F)
    where
        F: FnMut(&BitFrame),
    {
        for &s in buf {
            let s = i32::from(s);

            if s > level_limit {
                self.in_pulse = true;
                self.counting = true;
            }

            if self.in_pulse && s < level_limit {
                self.in_gap = true;
                self.sample_counter = 0;
                self.in_pulse = false;
            }

            if self.counting {
                self.sample_counter += 1;
            }

            if self.in_gap && s > level_limit {
                if self.sample_counter < self.timing.short_limit {
                    self.frame.push_bit(false);
                }
                else if self.sample_counter < self.timing.long_limit {
                    self.frame.push_bit(true);
                }
                else {
                    self.frame.next_row();
                    self.in_pulse = false;
                    self.sample_counter = 0;
                }
                self.in_gap = false;
            }

            if self.sample_counter > self.timing.reset_limit {
                self.counting = false;
                self.sample_counter = 0;
                self.in_gap = false;

                on_frame(&self.frame);
                self.frame.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PulseSlicer, PwmTiming};

    const TIMING: PwmTiming = PwmTiming { short_limit: 1744, long_limit: 3500, reset_limit: 5000 };
    const LEVEL: i32 = 10000;

    fn wave(segments: &[(i16, usize)]) -> Vec<i16> {
        let mut buf = Vec::new();
        for &(value, count) in segments {
            buf.extend(std::iter::repeat(value).take(count));
        }
        buf
    }

    // The slicer increments the running counter on the rising sample before
    // classifying, so a gap of N low samples classifies as a count of N + 1.
    fn pulse_train(gap_lows: &[usize], silence: usize) -> Vec<i16> {
        let mut segments = vec![(20000, 10)];
        for &lows in gap_lows {
            segments.push((0, lows));
            segments.push((20000, 10));
        }
        segments.push((0, silence));
        wave(&segments)
    }

    #[test]
    fn verify_gap_classification_bands() {
        let mut slicer = PulseSlicer::new(TIMING);
        let buf = pulse_train(&[999, 1743, 3498, 3499], 5001);

        let mut frames = 0;
        let mut row0 = [0u8; 5];
        slicer.process(&buf, LEVEL, |frame| {
            frames += 1;
            row0 = *frame.row(0);
        });

        // Counts 1000, 1744, 3499 give bits 0, 1, 1; count 3500 advances the
        // row; the trailing silence terminates the frame.
        assert_eq!(frames, 1);
        assert_eq!(row0, [0x60, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn verify_reset_fires_one_past_limit() {
        let mut slicer = PulseSlicer::new(TIMING);

        let mut frames = 0;
        slicer.process(&wave(&[(20000, 10), (0, 5000)]), LEVEL, |_| frames += 1);
        assert_eq!(frames, 0);

        slicer.process(&wave(&[(0, 1)]), LEVEL, |_| frames += 1);
        assert_eq!(frames, 1);
    }

    #[test]
    fn verify_level_equality_holds_state() {
        let mut slicer = PulseSlicer::new(TIMING);

        // A plateau exactly at the level limit neither leaves the pulse nor
        // re-enters one, so no gap is ever classified.
        let buf = wave(&[(20000, 5), (LEVEL as i16, 3000), (20000, 5), (0, 5001)]);

        let mut frames = 0;
        slicer.process(&buf, LEVEL, |frame| {
            frames += 1;
            assert_eq!(*frame.row(0), [0x00; 5]);
            assert_eq!(frame.cursor_row(), 0);
        });
        assert_eq!(frames, 1);
    }

    #[test]
    fn verify_state_carries_across_blocks() {
        let mut slicer = PulseSlicer::new(TIMING);
        let buf = pulse_train(&[999, 1743], 5001);

        let mut frames = 0;
        let mut row0 = [0u8; 5];
        for chunk in buf.chunks(97) {
            slicer.process(chunk, LEVEL, |frame| {
                frames += 1;
                row0 = *frame.row(0);
            });
        }

        assert_eq!(frames, 1);
        assert_eq!(row0, [0x40, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn verify_idle_input_emits_nothing() {
        let mut slicer = PulseSlicer::new(TIMING);

        let mut frames = 0;
        slicer.process(&wave(&[(0, 20000)]), LEVEL, |_| frames += 1);
        assert_eq!(frames, 0);
    }
}
