// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dsp` module provides the signal-processing primitives running ahead
//! of the demodulators: envelope detection and fixed-point low-pass filtering.

pub mod envelope;
pub mod filter;
