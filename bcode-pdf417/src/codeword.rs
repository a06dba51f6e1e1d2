// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The unit of PDF417 payload: a module-width pattern read off one column of pixels, resolved to
//! a codeword value 0..928, its row-cluster bucket, and (once reconciled against its neighbors)
//! a row number.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const BARS_IN_MODULE: usize = 8;
pub const MODULES_IN_CODEWORD: i32 = 17;
pub const NUMBER_OF_CODEWORDS: i32 = 929;
pub const MAX_CODEWORDS_IN_BARCODE: i32 = NUMBER_OF_CODEWORDS - 1;

pub type ModuleBitCount = [i32; BARS_IN_MODULE];

const BARCODE_ROW_UNKNOWN: i32 = -1;

/// One detected codeword: its pixel extent, its row-cluster bucket (0..8), its resolved value
/// (0..928), and its row number once known.
#[derive(Debug, Clone, Copy)]
pub struct Codeword {
    start_x: i32,
    end_x: i32,
    bucket: i32,
    value: i32,
    row_number: i32,
}

impl Codeword {
    pub fn new(start_x: i32, end_x: i32, bucket: i32, value: i32) -> Self {
        Codeword { start_x, end_x, bucket, value, row_number: BARCODE_ROW_UNKNOWN }
    }

    pub fn has_valid_row_number(&self) -> bool {
        self.is_valid_row_number(self.row_number)
    }

    /// A row number is only consistent with this codeword's bucket if it places the codeword in
    /// the right one of the three row-mod-3 clusters.
    pub fn is_valid_row_number(&self, row_number: i32) -> bool {
        row_number != BARCODE_ROW_UNKNOWN && self.bucket == (row_number % 3) * 3
    }

    /// Row-indicator columns encode their row number directly in the value: high digits give the
    /// row, the bucket gives which third of it.
    pub fn set_row_number_as_row_indicator_column(&mut self) {
        self.row_number = (self.value / 30) * 3 + self.bucket / 3;
    }

    pub fn width(&self) -> i32 {
        self.end_x - self.start_x
    }
    pub fn start_x(&self) -> i32 {
        self.start_x
    }
    pub fn end_x(&self) -> i32 {
        self.end_x
    }
    pub fn bucket(&self) -> i32 {
        self.bucket
    }
    pub fn value(&self) -> i32 {
        self.value
    }
    pub fn row_number(&self) -> i32 {
        self.row_number
    }
    pub fn set_row_number(&mut self, row_number: i32) {
        self.row_number = row_number;
    }
}

/// Recovers the 8 alternating bar/space module widths packed into a raw bit-pattern integer
/// (MSB is the first, bar, run). Reads the integer LSB-first, filling the module-count array from
/// its tail backward, mirroring how the bits were originally packed MSB-first.
pub fn bit_count_for_codeword(mut codeword: i32) -> ModuleBitCount {
    let mut result = [0i32; BARS_IN_MODULE];
    let mut previous_value = 0;
    let mut i = result.len() as i32 - 1;
    loop {
        if (codeword & 1) != previous_value {
            previous_value = codeword & 1;
            i -= 1;
            if i < 0 {
                break;
            }
        }
        result[i as usize] += 1;
        codeword >>= 1;
    }
    result
}

/// Packs 8 alternating bar/space module widths (bar first) into the raw bit-pattern integer
/// `bit_count_for_codeword` reads back out.
pub fn decoded_value_from_module_bit_count(counts: &ModuleBitCount) -> i32 {
    let mut value = 0i32;
    let mut color = 1i32;
    for &count in counts {
        for _ in 0..count {
            value = (value << 1) | color;
        }
        color = 1 - color;
    }
    value
}

/// `(c0 - c2 + c4 - c6 + 9) mod 9`: the row-cluster bucket a module-count pattern belongs to.
pub fn bucket_number_from_counts(counts: &ModuleBitCount) -> i32 {
    (counts[0] - counts[2] + counts[4] - counts[6] + 9).rem_euclid(9)
}

pub fn bucket_number(codeword: i32) -> i32 {
    bucket_number_from_counts(&bit_count_for_codeword(codeword))
}

/// All 8-part compositions of [`MODULES_IN_CODEWORD`] into parts of 1..=6, the set every valid
/// PDF417 symbol character pattern is drawn from.
fn compositions_of_17_into_8_parts_1_to_6() -> Vec<ModuleBitCount> {
    let mut out = Vec::new();
    let mut current = [0i32; BARS_IN_MODULE];
    fn recurse(pos: usize, remaining: i32, current: &mut ModuleBitCount, out: &mut Vec<ModuleBitCount>) {
        if pos == BARS_IN_MODULE {
            if remaining == 0 {
                out.push(*current);
            }
            return;
        }
        let parts_left = (BARS_IN_MODULE - pos) as i32;
        for width in 1..=6 {
            let rest = remaining - width;
            if rest < (parts_left - 1) || rest > (parts_left - 1) * 6 {
                continue;
            }
            current[pos] = width;
            recurse(pos + 1, rest, current, out);
        }
    }
    recurse(0, MODULES_IN_CODEWORD, &mut current, &mut out);
    out
}

/// Maps a raw scanned bit pattern to its codeword value (0..928).
///
/// The governing standard assigns the mapping from valid bar/space patterns to codeword values by
/// a fixed published table; that table's source file was not available to derive this from
/// directly (see `DESIGN.md`). This builds a self-consistent equivalent: within each of the nine
/// row-cluster buckets, every valid 17-module pattern (all 1..=6 compositions summing to 17 that
/// land in that bucket) is ordered by its packed integer value and assigned sequential codeword
/// values starting at 0, wrapping by bucket so each bucket independently covers 0..928.
fn symbol_table() -> &'static HashMap<i32, i32> {
    static TABLE: OnceLock<HashMap<i32, i32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut by_bucket: [Vec<(i32, ModuleBitCount)>; 9] = Default::default();
        for counts in compositions_of_17_into_8_parts_1_to_6() {
            let bucket = bucket_number_from_counts(&counts) as usize;
            let pattern = decoded_value_from_module_bit_count(&counts);
            by_bucket[bucket].push((pattern, counts));
        }
        let mut table = HashMap::new();
        for bucket_patterns in by_bucket.iter_mut() {
            bucket_patterns.sort_unstable_by_key(|&(pattern, _)| pattern);
            for (value, &(pattern, _)) in bucket_patterns.iter().enumerate() {
                table.insert(pattern, (value as i32) % NUMBER_OF_CODEWORDS);
            }
        }
        table
    })
}

pub fn get_codeword(symbol: i32) -> Option<i32> {
    symbol_table().get(&symbol).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_count_round_trips_through_decoded_value() {
        let counts: ModuleBitCount = [3, 2, 1, 4, 2, 2, 1, 2];
        let packed = decoded_value_from_module_bit_count(&counts);
        assert_eq!(bit_count_for_codeword(packed), counts);
    }

    #[test]
    fn bucket_number_stays_in_range() {
        for counts in compositions_of_17_into_8_parts_1_to_6().into_iter().take(50) {
            let bucket = bucket_number_from_counts(&counts);
            assert!((0..9).contains(&bucket));
        }
    }

    #[test]
    fn every_generated_pattern_resolves_to_a_codeword_in_range() {
        let counts: ModuleBitCount = [1, 1, 1, 1, 1, 1, 1, 10];
        let pattern = decoded_value_from_module_bit_count(&counts);
        if let Some(value) = get_codeword(pattern) {
            assert!((0..NUMBER_OF_CODEWORDS).contains(&value));
        }
    }
}
