// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PDF417 decoding.
//!
//! [`decode`] takes a captured [`bcode_core::BitMatrix`], the symbol's [`BoundingBox`] (the four
//! corner points a preceding finder-pattern localization step would have produced), and the
//! symbol's average module width, and returns the decoded [`bcode_core::DecoderResult`]: codeword
//! detection, row-number reconciliation, GF(929) Reed-Solomon correction with a retry over
//! ambiguous votes, and high-level bit-stream interpretation.

pub mod boundingbox;
pub mod codeword;
pub mod detection;
pub mod highlevel;
pub mod metadata;
pub mod scanning;

use bcode_core::errors::Error;
use bcode_core::result::{DecoderResult, SymbologyIdentifier};
use bcode_core::{BitMatrix, DecoderOptions, Result};

use boundingbox::BoundingBox;
use codeword::MODULES_IN_CODEWORD;
use detection::{DetectionResult, RowIndicator};

fn to_decoder_result(parsed: highlevel::ParsedContent, num_errors_corrected: usize, num_erasures_corrected: usize) -> DecoderResult {
    DecoderResult {
        symbology: SymbologyIdentifier::Pdf417,
        text: parsed.text,
        raw_bytes: parsed.raw_bytes,
        content_type: parsed.content_type,
        num_errors_corrected,
        num_erasures_corrected,
        structured_append: parsed.structured_append,
        mirrored: false,
    }
}

/// Decodes one PDF417 symbol.
///
/// `bounding_box` and `module_width` are expected from a preceding localization pass that found
/// the symbol's start/stop patterns and quiet zone; this crate picks up from a located, module-
/// scaled region, the same division of labor `bcode-datamatrix::decode` uses for its already-
/// sampled [`BitMatrix`] input.
pub fn decode(image: &BitMatrix, bounding_box: BoundingBox, module_width: f32, options: &DecoderOptions) -> Result<DecoderResult> {
    let codeword_width = module_width * MODULES_IN_CODEWORD as f32;

    let left_x = bounding_box.min_x();
    let right_x = bounding_box.max_x() - codeword_width as i32;

    let left_column = scanning::scan_row_indicator_column(image, &bounding_box, left_x, codeword_width, RowIndicator::Left);
    let right_column = scanning::scan_row_indicator_column(image, &bounding_box, right_x, codeword_width, RowIndicator::Right);

    let metadata = left_column
        .barcode_metadata()
        .or_else(|| right_column.barcode_metadata())
        .ok_or_else(|| Error::Format("pdf417: unable to read row-indicator metadata".into()))?;

    scanning::validate_metadata_bounds(metadata.row_count(), metadata.column_count())?;

    let bounding_box = scanning::adjust_bounding_box(bounding_box, &left_column, &right_column, metadata.row_count());

    let mut detection_result = DetectionResult::new(metadata, bounding_box);
    let column_count = metadata.column_count() as usize;
    detection_result.set_column(0, left_column);
    detection_result.set_column(column_count + 1, right_column);

    for c in 1..=column_count {
        let x = left_x as f32 + codeword_width * c as f32;
        let reference = detection_result.column(0).expect("left indicator column was just set").clone();
        let column = scanning::scan_interior_column(image, &bounding_box, x as i32, codeword_width, &reference);
        detection_result.set_column(c, column);
    }

    scanning::adjust_row_numbers(&mut detection_result);
    log::trace!("pdf417: row-number reconciliation complete");

    for column in detection_result.columns.iter_mut().flatten() {
        column.remove_incorrect_codewords(metadata.row_count());
    }

    let matrix = scanning::create_barcode_matrix(&detection_result);
    log::debug!("pdf417: assembled {}x{} barcode matrix, ec level {}", metadata.row_count(), column_count, metadata.error_correction_level());

    let (codewords, erasures) = scanning::decode_codewords_with_retry(&matrix, metadata.error_correction_level())?;

    let parsed = highlevel::decode(&codewords[1.min(codewords.len())..]);
    if options.try_harder {
        if let Some(err) = &parsed.error {
            log::debug!("pdf417: high-level parse reported a recoverable error: {err}");
        }
    }
    Ok(to_decoder_result(parsed, codewords.len(), erasures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundingbox::Point;

    #[test]
    fn validate_metadata_bounds_is_reexported_and_consistent() {
        assert!(scanning::validate_metadata_bounds(10, 5).is_ok());
    }

    #[test]
    fn bounding_box_create_smoke_test() {
        let bb = BoundingBox::create(200, 200, Some(Point::new(0.0, 0.0)), Some(Point::new(0.0, 99.0)), Some(Point::new(100.0, 0.0)), Some(Point::new(100.0, 99.0)));
        assert!(bb.is_some());
    }
}
