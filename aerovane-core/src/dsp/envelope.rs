// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Squared-magnitude envelope detection for OOK/ASK signals.

/// Compute a noisy envelope estimate of an interleaved 8-bit IQ stream.
///
/// Each complex sample is bias-corrected by XOR with `0x80` (the stream is
/// unsigned with a mid-scale bias) and reduced to `I² + Q²`. Squaring keeps
/// the result monotone with the true envelope, which is all the downstream
/// threshold comparison needs, and the maximum value `127² + 127² = 32258`
/// fits an unsigned 16-bit word.
///
/// One envelope sample is produced for every `2^decimation` complex samples.
/// Returns the number of samples written to `env`, which must hold at least
/// `ceil((iq.len() / 2) / 2^decimation)` entries.
pub fn envelope_detect(iq: &[u8], env: &mut [u16], decimation: u32) -> usize {
    let stride = 1usize << decimation;

    let mut op = 0;

    for pair in iq.chunks_exact(2).step_by(stride) {
        let re = i32::from((pair[0] ^ 0x80) as i8);
        let im = i32::from((pair[1] ^ 0x80) as i8);

        env[op] = (re * re + im * im) as u16;
        op += 1;
    }

    op
}

#[cfg(test)]
mod tests {
    use super::envelope_detect;

    #[test]
    fn verify_full_scale_pair() {
        // 0xFF bias-corrects to +127 on both rails.
        let iq = [0xFF, 0xFF];
        let mut env = [0u16; 1];

        assert_eq!(envelope_detect(&iq, &mut env, 0), 1);
        assert_eq!(env[0], 32258);
    }

    #[test]
    fn verify_bias_midpoint_is_zero() {
        let iq = [0x80, 0x80, 0x80, 0x80];
        let mut env = [0u16; 2];

        assert_eq!(envelope_detect(&iq, &mut env, 0), 2);
        assert_eq!(env, [0, 0]);
    }

    #[test]
    fn verify_negative_rails_square_positive() {
        // 0x00 bias-corrects to -128.
        let iq = [0x00, 0x80];
        let mut env = [0u16; 1];

        envelope_detect(&iq, &mut env, 0);
        assert_eq!(env[0], 128 * 128);
    }

    #[test]
    fn verify_decimated_lengths() {
        let iq = vec![0x80u8; 512];
        let mut env = vec![0u16; 256];

        for d in 0..4 {
            let produced = envelope_detect(&iq, &mut env, d);
            assert_eq!(produced, 256 >> d);
        }
    }

    #[test]
    fn verify_decimation_keeps_first_of_stride() {
        // Four complex samples, only the first and third retained at 2^1.
        let iq = [0xFF, 0x80, 0x81, 0x80, 0xFF, 0x80, 0x82, 0x80];
        let mut env = [0u16; 4];

        let produced = envelope_detect(&iq, &mut env, 1);
        assert_eq!(produced, 2);
        assert_eq!(env[0], 127 * 127);
        assert_eq!(env[1], 127 * 127);
    }
}
