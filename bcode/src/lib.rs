// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![forbid(unsafe_code)]

//! # bcode
//!
//! `bcode` recognizes and decodes two-dimensional barcodes from a captured bit matrix.
//!
//! ## Supported symbologies
//!
//! | Symbology   | Feature flag | Default |
//! |-------------|--------------|---------|
//! | Data Matrix | `datamatrix` | Yes     |
//! | PDF417      | `pdf417`     | Yes     |
//!
//! ## Usage
//!
//! 1. Sample the captured image into a [`BitMatrix`] (module-true, already located and
//!    quiet-zone-trimmed).
//! 2. Pick a [`BarcodeFormat`] (or try each in turn) and call [`decode`].
//! 3. Inspect the returned [`DecoderResult`] for the decoded text, raw bytes, and content
//!    classification.
//!
//! Re-exports [`bcode_core`] for the shared bit-container and error types both symbologies use.

pub use bcode_core;
pub use bcode_core::{BitMatrix, DecoderOptions, DecoderResult, Error, Result};

/// Which symbology to decode a captured [`BitMatrix`] as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    #[cfg(feature = "datamatrix")]
    DataMatrix,
    #[cfg(feature = "pdf417")]
    Pdf417,
}

/// Extra geometry a PDF417 decode needs beyond the bit matrix: Data Matrix recovers its own
/// placement from the matrix dimensions alone, but PDF417's row/column layout depends on where
/// its row-indicator columns sit and how wide a module is.
#[cfg(feature = "pdf417")]
#[derive(Debug, Clone, Copy)]
pub struct Pdf417Geometry {
    pub bounding_box: bcode_pdf417::boundingbox::BoundingBox,
    pub module_width: f32,
}

/// Decodes `bits` as `format`, dispatching to the matching symbology crate.
///
/// `pdf417_geometry` is required (and ignored otherwise) when `format` is
/// [`BarcodeFormat::Pdf417`]; Data Matrix needs no extra input beyond the matrix itself.
pub fn decode(
    bits: &BitMatrix,
    format: BarcodeFormat,
    options: &DecoderOptions,
    #[cfg(feature = "pdf417")] pdf417_geometry: Option<Pdf417Geometry>,
) -> Result<DecoderResult> {
    match format {
        #[cfg(feature = "datamatrix")]
        BarcodeFormat::DataMatrix => bcode_datamatrix::decode(bits, options),
        #[cfg(feature = "pdf417")]
        BarcodeFormat::Pdf417 => {
            let geometry = pdf417_geometry.ok_or_else(|| Error::Domain("pdf417: decode requires Pdf417Geometry".into()))?;
            bcode_pdf417::decode(bits, geometry.bounding_box, geometry.module_width, options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "datamatrix")]
    #[test]
    fn rejects_an_unreadable_matrix_with_a_format_error() {
        let bits = BitMatrix::new(8, 8);
        let err = decode(
            &bits,
            BarcodeFormat::DataMatrix,
            &DecoderOptions::default(),
            #[cfg(feature = "pdf417")]
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "format");
    }
}
