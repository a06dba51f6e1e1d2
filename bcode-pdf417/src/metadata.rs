// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The symbol's shape (columns, rows, EC level) as voted out of the row-indicator columns, plus
//! the generic value-with-confidence accumulator the rest of the scanning pipeline uses.

use std::collections::HashMap;

pub const MIN_ROWS_IN_BARCODE: i32 = 3;
pub const MAX_ROWS_IN_BARCODE: i32 = 90;

#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodeMetadata {
    column_count: i32,
    error_correction_level: i32,
    row_count_upper_part: i32,
    row_count_lower_part: i32,
}

impl BarcodeMetadata {
    pub fn new(column_count: i32, row_count_upper_part: i32, row_count_lower_part: i32, error_correction_level: i32) -> Self {
        BarcodeMetadata { column_count, error_correction_level, row_count_upper_part, row_count_lower_part }
    }

    pub fn column_count(&self) -> i32 {
        self.column_count
    }
    pub fn error_correction_level(&self) -> i32 {
        self.error_correction_level
    }
    pub fn row_count(&self) -> i32 {
        self.row_count_upper_part + self.row_count_lower_part
    }
    pub fn row_count_upper_part(&self) -> i32 {
        self.row_count_upper_part
    }
    pub fn row_count_lower_part(&self) -> i32 {
        self.row_count_lower_part
    }
}

/// Accumulates every observed value for one barcode-matrix cell, keeping a vote count per value:
/// `value()` returns every value tied for the highest count, so a cell with a single clean
/// reading resolves unambiguously while a cell seen with conflicting values stays ambiguous until
/// the scanning decoder's retry loop picks one.
#[derive(Debug, Clone, Default)]
pub struct BarcodeValue {
    values: HashMap<i32, u32>,
}

impl BarcodeValue {
    pub fn set_value(&mut self, value: i32) {
        *self.values.entry(value).or_insert(0) += 1;
    }

    pub fn value(&self) -> Vec<i32> {
        let Some(&max_confidence) = self.values.values().max() else {
            return Vec::new();
        };
        let mut result: Vec<i32> = self.values.iter().filter(|&(_, &count)| count == max_confidence).map(|(&v, _)| v).collect();
        result.sort_unstable();
        result
    }

    pub fn confidence(&self, value: i32) -> u32 {
        self.values.get(&value).copied().unwrap_or(0)
    }
}
