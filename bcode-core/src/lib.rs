// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared primitives for the `bcode` barcode recognition workspace.
//!
//! This crate has no knowledge of any particular symbology. `bcode-datamatrix` and
//! `bcode-pdf417` each build their own pipeline on top of the bit containers, finite-field
//! arithmetic, and Reed-Solomon decoder defined here.

pub mod bits;
pub mod errors;
pub mod field;
pub mod matrix;
pub mod reed_solomon;
pub mod result;

pub use bits::BitArray;
pub use errors::{Error, Result};
pub use field::{GaloisField, Polynomial};
pub use matrix::BitMatrix;
pub use result::{ContentType, DecoderOptions, DecoderResult, StructuredAppendInfo, SymbologyIdentifier};
