// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! De-interleaves raw placement-order codewords into per-block data + error-correction streams.

use crate::version::Version;
use bcode_core::errors::{domain_error, Result};

/// One error-correction block: its data codeword count, and its full (data + EC) codeword slice.
#[derive(Debug, Clone)]
pub struct DataBlock {
    pub num_data_codewords: usize,
    pub codewords: Vec<u8>,
}

/// Splits `raw_codewords` (as read off the symbol in placement order) back into the original
/// per-block interleaved groups.
///
/// `fix259` selects the alternate re-interleaving used by a subset of 144x144 encoders (see
/// <https://github.com/zxing-cpp/zxing-cpp/issues/259>): decoding retries with this set once a
/// first attempt at that size fails Reed-Solomon correction.
pub fn get_data_blocks(raw_codewords: &[u8], version: &Version, fix259: bool) -> Result<Vec<DataBlock>> {
    let ec_blocks = &version.ec_blocks;
    let num_result_blocks = ec_blocks.num_blocks() as usize;

    let mut result: Vec<DataBlock> = Vec::with_capacity(num_result_blocks);
    for group in &ec_blocks.blocks {
        for _ in 0..group.count {
            result.push(DataBlock {
                num_data_codewords: group.data_codewords as usize,
                codewords: vec![0u8; (ec_blocks.codewords_per_block + group.data_codewords) as usize],
            });
        }
    }
    if result.is_empty() {
        return domain_error("datablock: version has no error-correction blocks");
    }

    let num_codewords = result[0].codewords.len();
    let num_data_codewords = num_codewords - ec_blocks.codewords_per_block as usize;

    let mut offset = 0usize;
    for i in 0..num_data_codewords - 1 {
        for block in result.iter_mut() {
            if offset >= raw_codewords.len() {
                return domain_error("datablock: raw codeword stream too short");
            }
            block.codewords[i] = raw_codewords[offset];
            offset += 1;
        }
    }

    let size_144x144 = version.symbol_height == 144;
    let num_longer_blocks = if size_144x144 { 8 } else { num_result_blocks };
    for block in result.iter_mut().take(num_longer_blocks) {
        if offset >= raw_codewords.len() {
            return domain_error("datablock: raw codeword stream too short");
        }
        block.codewords[num_data_codewords - 1] = raw_codewords[offset];
        offset += 1;
    }

    for i in num_data_codewords..num_codewords {
        for j in 0..num_result_blocks {
            let j_offset = if size_144x144 && fix259 { (j + 8) % num_result_blocks } else { j };
            let i_offset = if size_144x144 && j_offset > 7 { i - 1 } else { i };
            if offset >= raw_codewords.len() {
                return domain_error("datablock: raw codeword stream too short");
            }
            result[j_offset].codewords[i_offset] = raw_codewords[offset];
            offset += 1;
        }
    }

    if offset != raw_codewords.len() {
        return domain_error("datablock: raw codeword stream length mismatch");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::version_for_dimensions;

    #[test]
    fn round_trips_a_single_block_version() {
        let version = version_for_dimensions(10, 10).unwrap();
        let raw: Vec<u8> = (0..version.total_codewords() as u8).collect();
        let blocks = get_data_blocks(&raw, version, false).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].codewords, raw);
    }

    #[test]
    fn splits_a_multi_block_version_round_robin() {
        let version = version_for_dimensions(52, 52).unwrap();
        let raw: Vec<u8> = (0..version.total_codewords() as u32).map(|i| i as u8).collect();
        let blocks = get_data_blocks(&raw, version, false).unwrap();
        assert_eq!(blocks.len(), version.ec_blocks.num_blocks() as usize);
        // Interleaving means the first data codeword of block 0 and block 1 are adjacent in the
        // raw stream.
        assert_eq!(blocks[0].codewords[0], raw[0]);
        assert_eq!(blocks[1].codewords[0], raw[1]);
    }

    #[test]
    fn fix259_shifts_the_144x144_block_assignment() {
        let version = version_for_dimensions(144, 144).unwrap();
        let raw: Vec<u8> = (0..version.total_codewords() as u32).map(|i| (i % 251) as u8).collect();
        let normal = get_data_blocks(&raw, version, false).unwrap();
        let fixed = get_data_blocks(&raw, version, true).unwrap();
        assert_ne!(
            normal.iter().map(|b| b.codewords.clone()).collect::<Vec<_>>(),
            fixed.iter().map(|b| b.codewords.clone()).collect::<Vec<_>>()
        );
    }
}
