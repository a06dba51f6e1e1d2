// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One column's worth of detected codewords, indexed by image row, plus the whole-symbol
//! assembly of columns into a barcode matrix with a reconciled row numbering.

use crate::boundingbox::BoundingBox;
use crate::codeword::Codeword;
use crate::metadata::BarcodeMetadata;

/// How far `codeword_nearby` will look past a missing row before giving up. Small skew or a
/// single bad scan line shouldn't break row-number propagation across a column.
pub const ADJUST_ROW_NUMBER_SKIP: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndicator {
    Left,
    Right,
}

/// Every codeword detected in one vertical strip of the symbol, indexed by image row relative to
/// the column's bounding box.
#[derive(Debug, Clone)]
pub struct DetectionResultColumn {
    bounding_box: BoundingBox,
    codewords: Vec<Option<Codeword>>,
    row_indicator: Option<RowIndicator>,
}

impl DetectionResultColumn {
    pub fn new(bounding_box: BoundingBox, row_indicator: Option<RowIndicator>) -> Self {
        let max_rows = (bounding_box.max_y() - bounding_box.min_y() + 1).max(0) as usize;
        DetectionResultColumn { bounding_box, codewords: vec![None; max_rows], row_indicator }
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn is_row_indicator(&self) -> bool {
        self.row_indicator.is_some()
    }

    fn index_of(&self, image_row: i32) -> Option<usize> {
        let idx = image_row - self.bounding_box.min_y() as i32;
        if idx >= 0 && (idx as usize) < self.codewords.len() {
            Some(idx as usize)
        } else {
            None
        }
    }

    pub fn get_codeword(&self, image_row: i32) -> Option<&Codeword> {
        self.index_of(image_row).and_then(|i| self.codewords[i].as_ref())
    }

    pub fn get_codeword_mut(&mut self, image_row: i32) -> Option<&mut Codeword> {
        let idx = self.index_of(image_row)?;
        self.codewords[idx].as_mut()
    }

    pub fn set_codeword(&mut self, image_row: i32, codeword: Codeword) {
        if let Some(i) = self.index_of(image_row) {
            self.codewords[i] = Some(codeword);
        }
    }

    /// The codeword at `image_row`, or the nearest one within [`ADJUST_ROW_NUMBER_SKIP`] rows if
    /// that exact row is empty.
    pub fn codeword_nearby(&self, image_row: i32) -> Option<&Codeword> {
        if let Some(cw) = self.get_codeword(image_row) {
            return Some(cw);
        }
        for skip in 1..=ADJUST_ROW_NUMBER_SKIP {
            if let Some(cw) = self.get_codeword(image_row - skip) {
                return Some(cw);
            }
            if let Some(cw) = self.get_codeword(image_row + skip) {
                return Some(cw);
            }
        }
        None
    }

    pub fn codewords(&self) -> &[Option<Codeword>] {
        &self.codewords
    }

    pub fn codewords_mut(&mut self) -> &mut [Option<Codeword>] {
        &mut self.codewords
    }

    /// Row-indicator columns encode their row number in their own value; this just replays that
    /// decode across every codeword already placed in the column.
    pub fn set_row_numbers(&mut self) {
        for cw in self.codewords.iter_mut().flatten() {
            cw.set_row_number_as_row_indicator_column();
        }
    }

    /// Drops codewords whose row number doesn't match the bucket it was read at, and codewords
    /// whose row number repeats more than the symbol's row count allows: both are symptoms of a
    /// misread module pattern rather than a real codeword.
    pub fn remove_incorrect_codewords(&mut self, barcode_row_count: i32) {
        for slot in self.codewords.iter_mut() {
            if let Some(cw) = slot {
                if !cw.has_valid_row_number() || cw.row_number() >= barcode_row_count {
                    *slot = None;
                }
            }
        }
    }

    /// Row heights implied by the gaps between consecutive detected codewords, used when later
    /// extending the bounding box to cover rows that were never directly scanned.
    pub fn row_heights(&self) -> Vec<i32> {
        let mut heights = Vec::new();
        let mut last_row_number = -1;
        for (idx, cw) in self.codewords.iter().enumerate() {
            if let Some(cw) = cw {
                let row_number = cw.row_number();
                if row_number >= 0 {
                    if last_row_number >= 0 {
                        heights.push(idx as i32 - last_row_number);
                    }
                    last_row_number = idx as i32;
                    let _ = row_number;
                }
            }
        }
        heights
    }

    /// For a row-indicator column, votes on the metadata (column count, EC level, row counts)
    /// implied by the row numbers decoded so far.
    pub fn barcode_metadata(&self) -> Option<BarcodeMetadata> {
        use std::collections::HashMap;

        let mut column_counts: HashMap<i32, u32> = HashMap::new();
        let mut row_upper_counts: HashMap<i32, u32> = HashMap::new();
        let mut row_lower_counts: HashMap<i32, u32> = HashMap::new();
        let mut ec_counts: HashMap<i32, u32> = HashMap::new();

        for cw in self.codewords.iter().flatten() {
            let row_number = cw.row_number();
            if row_number < 0 {
                continue;
            }
            let indicator_value = cw.value() % 30;
            match (row_number % 3 + if self.row_indicator == Some(RowIndicator::Right) { 2 } else { 0 }) % 3 {
                0 => *row_upper_counts.entry(indicator_value * 3 + 1).or_insert(0) += 1,
                1 => {
                    *ec_counts.entry(indicator_value / 3).or_insert(0) += 1;
                    *row_lower_counts.entry(indicator_value % 3).or_insert(0) += 1;
                }
                _ => *column_counts.entry(indicator_value + 1).or_insert(0) += 1,
            }
        }

        fn most_common(map: &std::collections::HashMap<i32, u32>) -> Option<i32> {
            map.iter().max_by_key(|&(_, &count)| count).map(|(&v, _)| v)
        }

        Some(BarcodeMetadata::new(
            most_common(&column_counts)?,
            most_common(&row_upper_counts)?,
            most_common(&row_lower_counts)?,
            most_common(&ec_counts)?,
        ))
    }
}

/// The whole symbol as detected so far: one [`DetectionResultColumn`] per barcode column, plus
/// the row-indicator-derived metadata that says how many of those columns are populated.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub metadata: BarcodeMetadata,
    pub columns: Vec<Option<DetectionResultColumn>>,
    pub bounding_box: BoundingBox,
}

impl DetectionResult {
    pub fn new(metadata: BarcodeMetadata, bounding_box: BoundingBox) -> Self {
        let column_count = metadata.column_count() as usize + 2;
        DetectionResult { metadata, columns: vec![None; column_count], bounding_box }
    }

    pub fn barcode_row_count(&self) -> i32 {
        self.metadata.row_count()
    }

    pub fn barcode_column_count(&self) -> i32 {
        self.metadata.column_count()
    }

    pub fn set_column(&mut self, column: usize, value: DetectionResultColumn) {
        if column < self.columns.len() {
            self.columns[column] = Some(value);
        }
    }

    pub fn column(&self, column: usize) -> Option<&DetectionResultColumn> {
        self.columns.get(column).and_then(|c| c.as_ref())
    }

    pub fn column_mut(&mut self, column: usize) -> Option<&mut DetectionResultColumn> {
        self.columns.get_mut(column).and_then(|c| c.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codeword_nearby_falls_back_within_skip_distance() {
        let bb = BoundingBox::create(100, 100, Some(crate::boundingbox::Point::new(0.0, 0.0)), Some(crate::boundingbox::Point::new(0.0, 9.0)), Some(crate::boundingbox::Point::new(10.0, 0.0)), Some(crate::boundingbox::Point::new(10.0, 9.0))).unwrap();
        let mut col = DetectionResultColumn::new(bb, None);
        col.set_codeword(3, Codeword::new(0, 10, 0, 5));
        assert!(col.get_codeword(4).is_none());
        assert!(col.codeword_nearby(4).is_some());
        assert!(col.codeword_nearby(6).is_none());
    }
}
