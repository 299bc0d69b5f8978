// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! First-order fixed-point IIR low-pass filter.
//!
//! The coefficients are a Butterworth(1, 0.01) design quantized to Q15:
//!
//! ```text
//! y[n] = b0·x[n] + b1·x[n-1] + a1·y[n-1]
//! ```
//!
//! with `a1` carrying the feedback sign folded in. In the narrow arithmetic
//! path every Q1.15 × Q15.0 product is shifted right by one before summation
//! so the 32-bit accumulator cannot overflow, and the accumulator is scaled
//! back by `F_SCALE - 1`. The `wide-filter` feature accumulates in 64 bits
//! instead, with the product LSBs masked off so truncation stays identical
//! at the LSB.

/// Number of fractional bits in the coefficient quantization.
pub const F_SCALE: u32 = 15;

/// Denominator coefficients in Q15. `A[0]` is unity and is never multiplied.
pub const A: [i32; 2] = [1 << F_SCALE, 31755];

/// Numerator coefficients in Q15.
pub const B: [i32; 2] = [507, 507];

/// A first-order low-pass filter over the unsigned envelope stream.
///
/// One input and one output sample of history are carried across calls so
/// the filter phase is continuous over arbitrary block boundaries.
#[derive(Default)]
pub struct LowPassFilter {
    x1: i32,
    y1: i32,
}

impl LowPassFilter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Filter `input` into `output`. Both slices must be the same length.
    ///
    /// Output samples are signed 16-bit. A slight over-range is possible near
    /// step transients; downstream threshold comparisons tolerate it.
    pub fn process(&mut self, input: &[u16], output: &mut [i16]) {
        assert_eq!(input.len(), output.len());

        for (x, y) in input.iter().zip(output.iter_mut()) {
            let x = i32::from(*x);
            let yn = step(x, self.x1, self.y1);

            *y = yn;
            self.x1 = x;
            self.y1 = i32::from(yn);
        }
    }
}

fn step(x: i32, x1: i32, y1: i32) -> i16 {
    if cfg!(feature = "wide-filter") {
        wide_step(x, x1, y1)
    }
    else {
        narrow_step(x, x1, y1)
    }
}

/// Narrow path: 32-bit accumulator with a pre-shift on every product.
///
/// Bit-exact with the legacy captures; keep as the reference for
/// compatibility tests.
fn narrow_step(x: i32, x1: i32, y1: i32) -> i16 {
    let acc = ((A[1] * y1) >> 1) + ((B[0] * x) >> 1) + ((B[1] * x1) >> 1);
    (acc >> (F_SCALE - 1)) as i16
}

/// Wide path: 64-bit accumulator, no pre-shift.
///
/// Masking the product LSBs reproduces exactly the bits the narrow path
/// discards, so both paths truncate identically.
fn wide_step(x: i32, x1: i32, y1: i32) -> i16 {
    let acc = (i64::from(A[1]) * i64::from(y1) & !1)
        + (i64::from(B[0]) * i64::from(x) & !1)
        + (i64::from(B[1]) * i64::from(x1) & !1);
    ((acc >> F_SCALE) as i32) as i16
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::{narrow_step, wide_step, LowPassFilter};

    #[test]
    fn verify_step_response_prefix() {
        // Full-scale step from rest. Hand-computed against the Q15
        // constants: y[0] = (507·32258 >> 1) >> 14, and so on.
        let input = [32258u16; 4];
        let mut output = [0i16; 4];

        LowPassFilter::new().process(&input, &mut output);

        assert_eq!(output[0], 499);
        assert_eq!(output[1], 1481);
    }

    #[test]
    fn verify_step_response_settles_near_unity() {
        let input = [32258u16; 512];
        let mut output = [0i16; 512];

        LowPassFilter::new().process(&input, &mut output);

        // DC gain is (507 + 507) / (32768 - 31755) ≈ 1.001.
        assert!(output[511] > 31500);
        assert!(output.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn verify_block_split_continuity() {
        let mut rng = SmallRng::seed_from_u64(0x4337);
        let input: Vec<u16> = (0..4096).map(|_| rng.random::<u16>() & 0x7FFF).collect();

        let mut whole = vec![0i16; 4096];
        LowPassFilter::new().process(&input, &mut whole);

        let mut split = vec![0i16; 4096];
        let mut filter = LowPassFilter::new();
        filter.process(&input[..1000], &mut split[..1000]);
        filter.process(&input[1000..1001], &mut split[1000..1001]);
        filter.process(&input[1001..], &mut split[1001..]);

        assert_eq!(whole, split);
    }

    #[test]
    fn verify_narrow_and_wide_paths_agree() {
        let mut rng = SmallRng::seed_from_u64(0x1511);

        let mut x1 = 0;
        let mut y1 = 0;

        for _ in 0..100_000 {
            let x = i32::from(rng.random::<u16>() & 0x7FFF);

            let narrow = narrow_step(x, x1, y1);
            let wide = wide_step(x, x1, y1);
            assert_eq!(narrow, wide);

            x1 = x;
            y1 = i32::from(narrow);
        }
    }
}
