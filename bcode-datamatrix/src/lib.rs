// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ECC-200 Data Matrix decoding.
//!
//! [`decode`] takes a captured [`bcode_core::BitMatrix`] (module-true: one matrix cell per bit,
//! already sampled off a symbol's quiet zone and finder pattern) and returns the decoded
//! [`bcode_core::DecoderResult`], trying the mirrored orientation when the first pass fails and
//! [`bcode_core::DecoderOptions::try_harder`] allows it.

pub mod bitstream;
pub mod datablock;
mod decoder;
pub mod placement;
pub mod version;

pub use decoder::decode;
