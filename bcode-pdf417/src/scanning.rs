// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walks a binarized image inside a [`BoundingBox`], turns each column's module-width runs into
//! [`Codeword`]s, reconciles row numbers across columns into a [`DetectionResult`], then
//! assembles and error-corrects the final codeword sequence.

use bcode_core::errors::{checksum_error, format_error, Result};
use bcode_core::field::GaloisField;
use bcode_core::matrix::BitMatrix;
use bcode_core::reed_solomon;

use crate::boundingbox::BoundingBox;
use crate::codeword::{self, Codeword, MODULES_IN_CODEWORD};
use crate::detection::{DetectionResult, DetectionResultColumn, RowIndicator};
use crate::metadata::{BarcodeValue, MAX_ROWS_IN_BARCODE, MIN_ROWS_IN_BARCODE};

/// How many rounds of the three row-number-adjustment passes to run before giving up on reaching
/// a fixed point. Each pass only ever adds row numbers, never removes one, so this bounds the
/// number of passes rather than detecting convergence by comparing snapshots.
const MAX_ADJUST_ROUNDS: usize = 10;

const MAX_ERRORS: usize = 3;
const MAX_EC_CODEWORDS: usize = 512;

fn pdf417_field() -> GaloisField {
    GaloisField::new_prime(929, 3, 0)
}

/// Reads off the 8 alternating bar/space run lengths that make up one codeword, starting at
/// `start_x` on row `y`, scaled to a 17-module-wide codeword by the symbol's average module
/// width `module_width`.
pub fn module_bit_count(image: &BitMatrix, y: i32, start_x: i32, module_width: f32) -> Option<[i32; 8]> {
    if y < 0 || y as usize >= image.height() || start_x < 0 {
        return None;
    }
    let mut counts = [0i32; 8];
    let mut x = start_x;
    let width = image.width() as i32;
    let mut current_bit = if x >= 0 && x < width { image.get(x as usize, y as usize) } else { false };
    let mut idx = 0usize;
    let mut run = 0i32;
    while x < width && idx < 8 {
        let bit = image.get(x as usize, y as usize);
        if bit == current_bit {
            run += 1;
        } else {
            counts[idx] = ((run as f32) / module_width).round().max(1.0) as i32;
            idx += 1;
            current_bit = bit;
            run = 1;
        }
        x += 1;
    }
    if idx < 8 {
        counts[idx] = ((run as f32) / module_width).round().max(1.0) as i32;
        idx += 1;
    }
    if idx != 8 || counts.iter().sum::<i32>() == 0 {
        return None;
    }
    Some(counts)
}

/// Detects the codeword starting near `start_x` on row `y`, correcting the module-count sum back
/// to [`MODULES_IN_CODEWORD`] when scanning noise pushed it off by a module or two.
pub fn detect_codeword(image: &BitMatrix, y: i32, start_x: i32, end_x: i32, module_width: f32) -> Option<Codeword> {
    let mut counts = module_bit_count(image, y, start_x, module_width)?;
    let sum: i32 = counts.iter().sum();
    if sum != MODULES_IN_CODEWORD {
        let diff = MODULES_IN_CODEWORD - sum;
        let (idx, _) = counts.iter().enumerate().max_by_key(|&(_, &c)| c)?;
        counts[idx] = (counts[idx] + diff).max(1);
    }
    let bucket = codeword::bucket_number_from_counts(&counts);
    let pattern = codeword::decoded_value_from_module_bit_count(&counts);
    let value = codeword::get_codeword(pattern)?;
    let width = (end_x - start_x).max(1);
    Some(Codeword::new(start_x, start_x + width, bucket, value))
}

/// Builds the left or right row-indicator column by scanning a fixed x position down every row of
/// the bounding box and decoding whatever codeword is found there.
pub fn scan_row_indicator_column(
    image: &BitMatrix,
    bounding_box: &BoundingBox,
    x: i32,
    codeword_width: f32,
    indicator: RowIndicator,
) -> DetectionResultColumn {
    let mut column = DetectionResultColumn::new(*bounding_box, Some(indicator));
    let module_width = codeword_width / MODULES_IN_CODEWORD as f32;
    for y in bounding_box.min_y()..=bounding_box.max_y() {
        if let Some(cw) = detect_codeword(image, y, x, x + codeword_width as i32, module_width) {
            column.set_codeword(y, cw);
        }
    }
    column.set_row_numbers();
    column
}

/// Scans one interior data column, assigning each detected codeword the row number of its
/// nearest row-indicator neighbor (within [`crate::detection::ADJUST_ROW_NUMBER_SKIP`] rows) when
/// that row number is consistent with the codeword's own bucket. Codewords the indicator can't
/// place yet are left with an unknown row number for the later reconciliation passes to resolve.
pub fn scan_interior_column(
    image: &BitMatrix,
    bounding_box: &BoundingBox,
    x: i32,
    codeword_width: f32,
    left_indicator: &DetectionResultColumn,
) -> DetectionResultColumn {
    let mut column = DetectionResultColumn::new(*bounding_box, None);
    let module_width = codeword_width / MODULES_IN_CODEWORD as f32;
    for y in bounding_box.min_y()..=bounding_box.max_y() {
        if let Some(mut cw) = detect_codeword(image, y, x, x + codeword_width as i32, module_width) {
            if let Some(indicator_cw) = left_indicator.codeword_nearby(y) {
                if cw.is_valid_row_number(indicator_cw.row_number()) {
                    cw.set_row_number(indicator_cw.row_number());
                }
            }
            column.set_codeword(y, cw);
        }
    }
    column
}

/// Estimates, in pixel rows, how much of the symbol lies above/below the currently scanned
/// indicator column, from the average height between its consecutive resolved codewords and how
/// far its first/last resolved row number is from the symbol's actual row range.
fn missing_rows_for_column(column: &DetectionResultColumn, barcode_row_count: i32) -> Option<(i32, i32)> {
    let heights = column.row_heights();
    if heights.is_empty() {
        return None;
    }
    let avg_height = heights.iter().sum::<i32>() as f32 / heights.len() as f32;
    if avg_height <= 0.0 {
        return None;
    }
    let codewords = column.codewords();
    let first_row_number = codewords.iter().flatten().find(|cw| cw.has_valid_row_number())?.row_number();
    let last_row_number = codewords.iter().rev().flatten().find(|cw| cw.has_valid_row_number())?.row_number();

    let missing_start = first_row_number.max(0);
    let missing_end = (barcode_row_count - 1 - last_row_number).max(0);
    Some(((missing_start as f32 * avg_height).round() as i32, (missing_end as f32 * avg_height).round() as i32))
}

/// Extends `bounding_box` to cover whatever rows the left/right indicator columns imply are
/// missing from its top/bottom, per the row-height estimate of each column. Falls back to the
/// unmodified box when a side's estimate isn't available or extending it fails.
pub fn adjust_bounding_box(bounding_box: BoundingBox, left_indicator: &DetectionResultColumn, right_indicator: &DetectionResultColumn, barcode_row_count: i32) -> BoundingBox {
    let mut bounding_box = bounding_box;
    if let Some((start, end)) = missing_rows_for_column(left_indicator, barcode_row_count) {
        if let Some(adjusted) = bounding_box.add_missing_rows(start, end, true) {
            bounding_box = adjusted;
        }
    }
    if let Some((start, end)) = missing_rows_for_column(right_indicator, barcode_row_count) {
        if let Some(adjusted) = bounding_box.add_missing_rows(start, end, false) {
            bounding_box = adjusted;
        }
    }
    bounding_box
}

fn adjust_from_both_indicators(detection_result: &mut DetectionResult, column_count: usize, last_column: usize) -> bool {
    let mut changed = false;
    let (min_y, max_y) = (detection_result.bounding_box.min_y(), detection_result.bounding_box.max_y());
    for y in min_y..=max_y {
        let agreed = match (detection_result.column(0), detection_result.column(last_column)) {
            (Some(left), Some(right)) => match (left.get_codeword(y), right.get_codeword(y)) {
                (Some(l), Some(r)) if l.has_valid_row_number() && r.has_valid_row_number() && l.row_number() == r.row_number() => Some(l.row_number()),
                _ => None,
            },
            _ => None,
        };
        let Some(row_number) = agreed else { continue };
        for c in 1..=column_count {
            if let Some(cw) = detection_result.column_mut(c).and_then(|col| col.get_codeword_mut(y)) {
                if !cw.has_valid_row_number() && cw.is_valid_row_number(row_number) {
                    cw.set_row_number(row_number);
                    changed = true;
                }
            }
        }
    }
    changed
}

fn adjust_from_one_indicator(detection_result: &mut DetectionResult, column_count: usize, last_column: usize) -> bool {
    let mut changed = false;
    let (min_y, max_y) = (detection_result.bounding_box.min_y(), detection_result.bounding_box.max_y());
    for &indicator_idx in &[0usize, last_column] {
        for y in min_y..=max_y {
            let candidate = detection_result
                .column(indicator_idx)
                .and_then(|ind| ind.codeword_nearby(y))
                .filter(|cw| cw.has_valid_row_number())
                .map(|cw| cw.row_number());
            let Some(row_number) = candidate else { continue };
            for c in 1..=column_count {
                if let Some(cw) = detection_result.column_mut(c).and_then(|col| col.get_codeword_mut(y)) {
                    if !cw.has_valid_row_number() && cw.is_valid_row_number(row_number) {
                        cw.set_row_number(row_number);
                        changed = true;
                    }
                }
            }
        }
    }
    changed
}

/// For each interior codeword still missing a row number, checks the 14 neighbors within two rows
/// above/below and the same/left/right column for one with a resolved row number consistent with
/// this codeword's own bucket, taking the first match found.
fn adjust_from_neighbor_similarity(detection_result: &mut DetectionResult, column_count: usize, last_column: usize) -> bool {
    let mut changed = false;
    let (min_y, max_y) = (detection_result.bounding_box.min_y(), detection_result.bounding_box.max_y());
    for c in 1..=column_count {
        for y in min_y..=max_y {
            let own_bucket = match detection_result.column(c).and_then(|col| col.get_codeword(y)) {
                Some(cw) if !cw.has_valid_row_number() => cw.bucket(),
                _ => continue,
            };
            let mut found = None;
            'neighbors: for dy in -2i32..=2 {
                for dc in -1i32..=1 {
                    if dy == 0 && dc == 0 {
                        continue;
                    }
                    let nc = c as i32 + dc;
                    if nc < 0 || nc as usize > last_column {
                        continue;
                    }
                    if let Some(ncw) = detection_result.column(nc as usize).and_then(|col| col.get_codeword(y + dy)) {
                        if ncw.has_valid_row_number() && own_bucket == (ncw.row_number() % 3) * 3 {
                            found = Some(ncw.row_number());
                            break 'neighbors;
                        }
                    }
                }
            }
            if let Some(row_number) = found {
                if let Some(cw) = detection_result.column_mut(c).and_then(|col| col.get_codeword_mut(y)) {
                    cw.set_row_number(row_number);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Reconciles row numbers across interior columns with the row-indicator columns: first wherever
/// both indicators agree on a row, then from either indicator alone (within its own skip
/// tolerance), then by matching an already-resolved neighbor's bucket, repeating all three passes
/// until none of them find anything new.
pub fn adjust_row_numbers(detection_result: &mut DetectionResult) {
    let column_count = detection_result.barcode_column_count().max(0) as usize;
    let last_column = column_count + 1;
    for _ in 0..MAX_ADJUST_ROUNDS {
        let mut changed = adjust_from_both_indicators(detection_result, column_count, last_column);
        changed |= adjust_from_one_indicator(detection_result, column_count, last_column);
        changed |= adjust_from_neighbor_similarity(detection_result, column_count, last_column);
        if !changed {
            break;
        }
    }
}

/// Flattens a [`DetectionResult`] into the linear codeword sequence the Reed-Solomon step and
/// high-level decoder expect, voting among ambiguous cells and leaving unresolved cells as `-1`.
pub fn create_barcode_matrix(result: &DetectionResult) -> Vec<Vec<BarcodeValue>> {
    let row_count = result.barcode_row_count().max(0) as usize;
    let column_count = result.barcode_column_count().max(0) as usize + 2;
    let mut matrix = vec![vec![BarcodeValue::default(); column_count]; row_count];

    for (col_idx, column) in result.columns.iter().enumerate() {
        let Some(column) = column else { continue };
        for cw in column.codewords().iter().flatten() {
            let row = cw.row_number();
            if row >= 0 && (row as usize) < row_count {
                matrix[row as usize][col_idx].set_value(cw.value());
            }
        }
    }
    matrix
}

/// Resolves the voted barcode matrix into a flat codeword sequence, recording which cells were
/// still ambiguous (had more than one tied value) for the retry loop.
fn resolve_matrix(matrix: &[Vec<BarcodeValue>]) -> (Vec<i32>, Vec<(usize, usize, Vec<i32>)>) {
    let mut codewords = Vec::new();
    let mut ambiguous = Vec::new();
    for (row_idx, row) in matrix.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let values = cell.value();
            let chosen = match values.first() {
                Some(&v) => v,
                None => -1,
            };
            if values.len() > 1 {
                ambiguous.push((row_idx, col_idx, values));
            }
            codewords.push(chosen);
            let _ = codeword::MAX_CODEWORDS_IN_BARCODE;
        }
    }
    (codewords, ambiguous)
}

fn number_of_ec_codewords(ec_level: i32) -> usize {
    if !(0..=8).contains(&ec_level) {
        return 0;
    }
    2usize.pow((ec_level + 1) as u32)
}

/// Repairs `codewords[0]` (the symbol length descriptor) when it disagrees with the number of
/// codewords actually decoded minus the error-correction codewords.
fn verify_codeword_count(codewords: &mut [i32], num_ec_codewords: usize) -> Result<()> {
    if codewords.len() < 4 {
        return format_error("pdf417: too few codewords to verify length descriptor");
    }
    let number_of_codewords = codewords[0];
    if number_of_codewords > codewords.len() as i32 {
        return format_error("pdf417: length descriptor exceeds codewords present");
    }
    if number_of_codewords <= 0 {
        if codewords.len() >= num_ec_codewords {
            codewords[0] = (codewords.len() - num_ec_codewords) as i32;
        } else {
            return format_error("pdf417: unable to recover length descriptor");
        }
    }
    Ok(())
}

/// Corrects `codewords` in place against `ec_level`'s Reed-Solomon codewords, reporting erasures
/// (cells with no majority value) to bound the correction budget.
pub fn correct_errors(codewords: &mut Vec<i32>, erasure_count: usize, ec_level: i32) -> Result<()> {
    let num_ec_codewords = number_of_ec_codewords(ec_level);
    if num_ec_codewords == 0 || num_ec_codewords > MAX_EC_CODEWORDS {
        return format_error("pdf417: invalid error correction level");
    }
    if erasure_count > num_ec_codewords / 2 + MAX_ERRORS {
        return checksum_error("pdf417: too many erasures to correct");
    }
    if codewords.len() < num_ec_codewords {
        return format_error("pdf417: fewer codewords than error correction codewords");
    }
    for c in codewords.iter_mut() {
        if *c < 0 {
            *c = 0;
        }
    }
    let field = pdf417_field();
    reed_solomon::decode_with_erasures(&field, codewords, num_ec_codewords, erasure_count)?;
    verify_codeword_count(codewords, num_ec_codewords)?;
    let length = codewords[0] as usize;
    if length == 0 || length > codewords.len() {
        return format_error("pdf417: corrected length descriptor out of range");
    }
    codewords.truncate(length);
    Ok(())
}

/// Substitutes each ambiguous cell's tied values in turn (odometer-style, at most 100 tries) and
/// re-runs error correction, keeping the first attempt that doesn't report a checksum error.
pub fn decode_codewords_with_retry(matrix: &[Vec<BarcodeValue>], ec_level: i32) -> Result<(Vec<i32>, usize)> {
    let (base, ambiguous) = resolve_matrix(matrix);
    let ambiguous = &ambiguous[..];
    if ambiguous.is_empty() || ambiguous.len() > 8 {
        let mut codewords = base;
        let erasures = codewords.iter().filter(|&&v| v < 0).count();
        correct_errors(&mut codewords, erasures, ec_level)?;
        return Ok((codewords, erasures));
    }

    let mut counters = vec![0usize; ambiguous.len()];
    let mut tries = 0;
    loop {
        let mut attempt = base.clone();
        for (slot, &(row, col, ref values)) in counters.iter().zip(ambiguous.iter()) {
            let flat_index = row * matrix[0].len() + col;
            attempt[flat_index] = values[(*slot).min(values.len() - 1)];
        }
        let erasures = attempt.iter().filter(|&&v| v < 0).count();
        match correct_errors(&mut attempt, erasures, ec_level) {
            Ok(()) => return Ok((attempt, erasures)),
            Err(_) if tries < 100 => {
                tries += 1;
                let mut i = 0;
                loop {
                    if i == counters.len() {
                        return checksum_error("pdf417: exhausted ambiguous value combinations");
                    }
                    counters[i] += 1;
                    if counters[i] < ambiguous[i].2.len() {
                        break;
                    }
                    counters[i] = 0;
                    i += 1;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Caps the symbol's row and column counts to the values the standard allows.
pub fn validate_metadata_bounds(row_count: i32, column_count: i32) -> Result<()> {
    if !(MIN_ROWS_IN_BARCODE..=MAX_ROWS_IN_BARCODE).contains(&row_count) {
        return format_error(format!("pdf417: row count {row_count} out of range"));
    }
    if !(1..=30).contains(&column_count) {
        return format_error(format!("pdf417: column count {column_count} out of range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_of_ec_codewords_follows_power_of_two() {
        assert_eq!(number_of_ec_codewords(0), 2);
        assert_eq!(number_of_ec_codewords(8), 512);
    }

    #[test]
    fn verify_codeword_count_recovers_missing_descriptor() {
        let mut codewords = vec![0, 1, 2, 3, 4, 5, 6, 7];
        verify_codeword_count(&mut codewords, 2).unwrap();
        assert_eq!(codewords[0], 6);
    }

    #[test]
    fn validate_metadata_bounds_rejects_out_of_range_rows() {
        assert!(validate_metadata_bounds(1, 5).is_err());
        assert!(validate_metadata_bounds(10, 5).is_ok());
    }

    fn test_bounding_box() -> BoundingBox {
        use crate::boundingbox::Point;
        BoundingBox::create(100, 100, Some(Point::new(0.0, 0.0)), Some(Point::new(0.0, 2.0)), Some(Point::new(20.0, 0.0)), Some(Point::new(20.0, 2.0))).unwrap()
    }

    /// Row 0 is bucket 0, row 1 is bucket 3, row 2 is bucket 6 (`bucket == (row % 3) * 3`).
    fn indicator_column_with_rows(bb: BoundingBox, indicator: RowIndicator, rows: &[i32]) -> DetectionResultColumn {
        let mut col = DetectionResultColumn::new(bb, Some(indicator));
        for (y, &row) in rows.iter().enumerate() {
            let mut cw = Codeword::new(0, 17, (row % 3) * 3, row * 30);
            cw.set_row_number(row);
            col.set_codeword(y as i32, cw);
        }
        col
    }

    #[test]
    fn adjust_row_numbers_propagates_from_both_agreeing_indicators() {
        use crate::metadata::BarcodeMetadata;

        let bb = test_bounding_box();
        let metadata = BarcodeMetadata::new(1, 2, 1, 0);
        let mut result = DetectionResult::new(metadata, bb);
        result.set_column(0, indicator_column_with_rows(bb, RowIndicator::Left, &[0, 1, 2]));
        result.set_column(2, indicator_column_with_rows(bb, RowIndicator::Right, &[0, 1, 2]));

        let mut interior = DetectionResultColumn::new(bb, None);
        // Bucket matches row 1 (bucket 3) but has no row number yet.
        interior.set_codeword(1, Codeword::new(30, 47, 3, 500));
        result.set_column(1, interior);

        adjust_row_numbers(&mut result);

        let cw = result.column(1).unwrap().get_codeword(1).unwrap();
        assert_eq!(cw.row_number(), 1);
    }

    #[test]
    fn adjust_row_numbers_resolves_by_neighbor_bucket_match() {
        use crate::metadata::BarcodeMetadata;

        let bb = test_bounding_box();
        let metadata = BarcodeMetadata::new(2, 2, 1, 0);
        let mut result = DetectionResult::new(metadata, bb);
        // No indicators resolved at all; column 1 has a known row-1 codeword, column 2's row-1
        // codeword shares the same bucket but no row number of its own yet.
        let mut known = DetectionResultColumn::new(bb, None);
        let mut cw1 = Codeword::new(0, 17, 3, 500);
        cw1.set_row_number(1);
        known.set_codeword(1, cw1);
        result.set_column(1, known);

        let mut unknown = DetectionResultColumn::new(bb, None);
        unknown.set_codeword(1, Codeword::new(17, 34, 3, 500));
        result.set_column(2, unknown);

        adjust_row_numbers(&mut result);

        let cw = result.column(2).unwrap().get_codeword(1).unwrap();
        assert_eq!(cw.row_number(), 1);
    }
}
