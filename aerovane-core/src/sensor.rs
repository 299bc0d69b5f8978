// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `sensor` module provides the trait implemented by sensor protocol
//! decoders.

use std::fmt;

use crate::demod::PwmTiming;
use crate::errors::Result;
use crate::frame::BitFrame;

/// Basic information about a sensor protocol.
#[derive(Copy, Clone, Debug)]
pub struct SensorInfo {
    /// A short ASCII-only string identifying the protocol.
    pub short_name: &'static str,
    /// A longer, more descriptive, string identifying the protocol.
    pub long_name: &'static str,
}

/// A decoder for one sensor protocol family.
///
/// An implementation supplies the pulse-width timing profile its frames are
/// sliced with, and interprets a terminated bit frame as a sensor reading.
/// The reading's `Display` output is the decoded report, one labeled field
/// per line, terminated by a blank line.
pub trait SensorDecode {
    type Reading: fmt::Display;

    fn info(&self) -> SensorInfo;

    /// Pulse-width thresholds, in samples at the filter output rate.
    fn timing(&self) -> PwmTiming;

    /// Interpret a terminated frame.
    ///
    /// Plausibility is the caller's concern: a frame assembled from noise
    /// decodes to a garbage reading rather than an error.
    fn decode(&self, frame: &BitFrame) -> Result<Self::Reading>;
}
