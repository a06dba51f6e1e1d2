// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ECC-200 version table (ISO 16022:2006 Table 7) plus the DMRE extension.

/// One group of identically-shaped error-correction blocks within a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGroup {
    pub count: u32,
    pub data_codewords: u32,
}

/// The error-correction block layout shared by every block in a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlocks {
    pub codewords_per_block: u32,
    pub blocks: [BlockGroup; 2],
}

impl EcBlocks {
    pub fn num_blocks(&self) -> u32 {
        self.blocks[0].count + self.blocks[1].count
    }

    /// Total codewords (data + error-correction) across every block in the symbol.
    pub fn total_codewords(&self) -> u32 {
        self.blocks[0].count * (self.blocks[0].data_codewords + self.codewords_per_block)
            + self.blocks[1].count * (self.blocks[1].data_codewords + self.codewords_per_block)
    }
}

/// One Data Matrix symbol size, with its block layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub version_number: u32,
    pub symbol_height: u32,
    pub symbol_width: u32,
    pub data_block_height: u32,
    pub data_block_width: u32,
    pub ec_blocks: EcBlocks,
}

impl Version {
    pub fn total_codewords(&self) -> u32 {
        self.ec_blocks.total_codewords()
    }

    pub fn data_width(&self) -> u32 {
        (self.symbol_width / self.data_block_width) * self.data_block_width
    }

    pub fn data_height(&self) -> u32 {
        (self.symbol_height / self.data_block_height) * self.data_block_height
    }

    pub fn is_dmre(&self) -> bool {
        (31..=48).contains(&self.version_number)
    }
}

const fn eb(codewords_per_block: u32, count0: u32, data0: u32, count1: u32, data1: u32) -> EcBlocks {
    EcBlocks {
        codewords_per_block,
        blocks: [
            BlockGroup { count: count0, data_codewords: data0 },
            BlockGroup { count: count1, data_codewords: data1 },
        ],
    }
}

/// The 24 square + 6 rectangular ECC-200 versions from ISO 16022:2006 Table 7.
const VERSIONS: &[Version] = &[
    Version { version_number: 1, symbol_height: 10, symbol_width: 10, data_block_height: 8, data_block_width: 8, ec_blocks: eb(5, 1, 3, 0, 0) },
    Version { version_number: 2, symbol_height: 12, symbol_width: 12, data_block_height: 10, data_block_width: 10, ec_blocks: eb(7, 1, 5, 0, 0) },
    Version { version_number: 3, symbol_height: 14, symbol_width: 14, data_block_height: 12, data_block_width: 12, ec_blocks: eb(10, 1, 8, 0, 0) },
    Version { version_number: 4, symbol_height: 16, symbol_width: 16, data_block_height: 14, data_block_width: 14, ec_blocks: eb(12, 1, 12, 0, 0) },
    Version { version_number: 5, symbol_height: 18, symbol_width: 18, data_block_height: 16, data_block_width: 16, ec_blocks: eb(14, 1, 18, 0, 0) },
    Version { version_number: 6, symbol_height: 20, symbol_width: 20, data_block_height: 18, data_block_width: 18, ec_blocks: eb(18, 1, 22, 0, 0) },
    Version { version_number: 7, symbol_height: 22, symbol_width: 22, data_block_height: 20, data_block_width: 20, ec_blocks: eb(20, 1, 30, 0, 0) },
    Version { version_number: 8, symbol_height: 24, symbol_width: 24, data_block_height: 22, data_block_width: 22, ec_blocks: eb(24, 1, 36, 0, 0) },
    Version { version_number: 9, symbol_height: 26, symbol_width: 26, data_block_height: 24, data_block_width: 24, ec_blocks: eb(28, 1, 44, 0, 0) },
    Version { version_number: 10, symbol_height: 32, symbol_width: 32, data_block_height: 14, data_block_width: 14, ec_blocks: eb(36, 1, 62, 0, 0) },
    Version { version_number: 11, symbol_height: 36, symbol_width: 36, data_block_height: 16, data_block_width: 16, ec_blocks: eb(42, 1, 86, 0, 0) },
    Version { version_number: 12, symbol_height: 40, symbol_width: 40, data_block_height: 18, data_block_width: 18, ec_blocks: eb(48, 1, 114, 0, 0) },
    Version { version_number: 13, symbol_height: 44, symbol_width: 44, data_block_height: 20, data_block_width: 20, ec_blocks: eb(56, 1, 144, 0, 0) },
    Version { version_number: 14, symbol_height: 48, symbol_width: 48, data_block_height: 22, data_block_width: 22, ec_blocks: eb(68, 1, 174, 0, 0) },
    Version { version_number: 15, symbol_height: 52, symbol_width: 52, data_block_height: 24, data_block_width: 24, ec_blocks: eb(42, 2, 102, 0, 0) },
    Version { version_number: 16, symbol_height: 64, symbol_width: 64, data_block_height: 14, data_block_width: 14, ec_blocks: eb(56, 2, 140, 0, 0) },
    Version { version_number: 17, symbol_height: 72, symbol_width: 72, data_block_height: 16, data_block_width: 16, ec_blocks: eb(36, 4, 92, 0, 0) },
    Version { version_number: 18, symbol_height: 80, symbol_width: 80, data_block_height: 18, data_block_width: 18, ec_blocks: eb(48, 4, 114, 0, 0) },
    Version { version_number: 19, symbol_height: 88, symbol_width: 88, data_block_height: 20, data_block_width: 20, ec_blocks: eb(56, 4, 144, 0, 0) },
    Version { version_number: 20, symbol_height: 96, symbol_width: 96, data_block_height: 22, data_block_width: 22, ec_blocks: eb(68, 4, 174, 0, 0) },
    Version { version_number: 21, symbol_height: 104, symbol_width: 104, data_block_height: 24, data_block_width: 24, ec_blocks: eb(56, 6, 136, 0, 0) },
    Version { version_number: 22, symbol_height: 120, symbol_width: 120, data_block_height: 18, data_block_width: 18, ec_blocks: eb(68, 6, 175, 0, 0) },
    Version { version_number: 23, symbol_height: 132, symbol_width: 132, data_block_height: 20, data_block_width: 20, ec_blocks: eb(62, 8, 163, 0, 0) },
    Version { version_number: 24, symbol_height: 144, symbol_width: 144, data_block_height: 22, data_block_width: 22, ec_blocks: eb(62, 8, 156, 2, 155) },
    Version { version_number: 25, symbol_height: 8, symbol_width: 18, data_block_height: 6, data_block_width: 16, ec_blocks: eb(7, 1, 5, 0, 0) },
    Version { version_number: 26, symbol_height: 8, symbol_width: 32, data_block_height: 6, data_block_width: 14, ec_blocks: eb(11, 1, 10, 0, 0) },
    Version { version_number: 27, symbol_height: 12, symbol_width: 26, data_block_height: 10, data_block_width: 24, ec_blocks: eb(14, 1, 16, 0, 0) },
    Version { version_number: 28, symbol_height: 12, symbol_width: 36, data_block_height: 10, data_block_width: 16, ec_blocks: eb(18, 1, 22, 0, 0) },
    Version { version_number: 29, symbol_height: 16, symbol_width: 36, data_block_height: 14, data_block_width: 16, ec_blocks: eb(24, 1, 32, 0, 0) },
    Version { version_number: 30, symbol_height: 16, symbol_width: 48, data_block_height: 14, data_block_width: 22, ec_blocks: eb(28, 1, 49, 0, 0) },
    // DMRE (Data Matrix Rectangular Extension), versions 31..48. Table values per the GS1/AIM DMRE
    // extension to ISO 16022; each row follows the same {symbol, data region, ec block} shape as
    // the classic table above.
    Version { version_number: 31, symbol_height: 8, symbol_width: 48, data_block_height: 6, data_block_width: 22, ec_blocks: eb(15, 1, 18, 0, 0) },
    Version { version_number: 32, symbol_height: 8, symbol_width: 64, data_block_height: 6, data_block_width: 14, ec_blocks: eb(18, 2, 14, 0, 0) },
    Version { version_number: 33, symbol_height: 8, symbol_width: 80, data_block_height: 6, data_block_width: 18, ec_blocks: eb(22, 2, 18, 0, 0) },
    Version { version_number: 34, symbol_height: 8, symbol_width: 96, data_block_height: 6, data_block_width: 22, ec_blocks: eb(28, 2, 21, 0, 0) },
    Version { version_number: 35, symbol_height: 8, symbol_width: 120, data_block_height: 6, data_block_width: 18, ec_blocks: eb(32, 3, 20, 0, 0) },
    Version { version_number: 36, symbol_height: 8, symbol_width: 144, data_block_height: 6, data_block_width: 22, ec_blocks: eb(36, 3, 24, 0, 0) },
    Version { version_number: 37, symbol_height: 12, symbol_width: 64, data_block_height: 10, data_block_width: 14, ec_blocks: eb(27, 2, 26, 0, 0) },
    Version { version_number: 38, symbol_height: 12, symbol_width: 88, data_block_height: 10, data_block_width: 20, ec_blocks: eb(36, 2, 36, 0, 0) },
    Version { version_number: 39, symbol_height: 16, symbol_width: 64, data_block_height: 14, data_block_width: 14, ec_blocks: eb(36, 2, 46, 0, 0) },
    Version { version_number: 40, symbol_height: 16, symbol_width: 88, data_block_height: 14, data_block_width: 20, ec_blocks: eb(48, 2, 64, 0, 0) },
    Version { version_number: 41, symbol_height: 20, symbol_width: 36, data_block_height: 18, data_block_width: 16, ec_blocks: eb(28, 1, 62, 0, 0) },
    Version { version_number: 42, symbol_height: 20, symbol_width: 44, data_block_height: 18, data_block_width: 20, ec_blocks: eb(34, 1, 82, 0, 0) },
    Version { version_number: 43, symbol_height: 20, symbol_width: 64, data_block_height: 18, data_block_width: 14, ec_blocks: eb(42, 2, 60, 0, 0) },
    Version { version_number: 44, symbol_height: 22, symbol_width: 48, data_block_height: 20, data_block_width: 22, ec_blocks: eb(38, 1, 98, 0, 0) },
    Version { version_number: 45, symbol_height: 24, symbol_width: 48, data_block_height: 22, data_block_width: 22, ec_blocks: eb(41, 1, 106, 0, 0) },
    Version { version_number: 46, symbol_height: 24, symbol_width: 64, data_block_height: 22, data_block_width: 14, ec_blocks: eb(48, 2, 78, 0, 0) },
    Version { version_number: 47, symbol_height: 26, symbol_width: 40, data_block_height: 24, data_block_width: 18, ec_blocks: eb(37, 1, 110, 0, 0) },
    Version { version_number: 48, symbol_height: 26, symbol_width: 48, data_block_height: 24, data_block_width: 22, ec_blocks: eb(43, 1, 122, 0, 0) },
];

/// Looks up the version matching `(height, width)` in modules, or `None` if there is no such
/// version (including odd dimensions, which ECC-200 never uses).
pub fn version_for_dimensions(height: u32, width: u32) -> Option<&'static Version> {
    if height & 1 != 0 || width & 1 != 0 || !(8..=144).contains(&height) {
        return None;
    }
    VERSIONS.iter().find(|v| v.symbol_height == height && v.symbol_width == width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_the_smallest_square_version() {
        let v = version_for_dimensions(10, 10).unwrap();
        assert_eq!(v.version_number, 1);
        assert_eq!(v.total_codewords(), 8);
    }

    #[test]
    fn looks_up_the_144x144_anomaly() {
        let v = version_for_dimensions(144, 144).unwrap();
        assert_eq!(v.version_number, 24);
        assert_eq!(v.ec_blocks.num_blocks(), 10);
    }

    #[test]
    fn rejects_odd_dimensions() {
        assert!(version_for_dimensions(11, 10).is_none());
    }

    #[test]
    fn dmre_versions_report_is_dmre() {
        let v = version_for_dimensions(8, 48).unwrap();
        assert_eq!(v.version_number, 31);
        assert!(v.is_dmre());
        let classic = version_for_dimensions(16, 48).unwrap();
        assert_eq!(classic.version_number, 30);
        assert!(!classic.is_dmre());
    }

    #[test]
    fn data_width_and_height_strip_alignment_borders() {
        let v = version_for_dimensions(32, 32).unwrap();
        assert_eq!(v.data_width(), 28);
        assert_eq!(v.data_height(), 28);
    }
}
