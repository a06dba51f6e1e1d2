// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ISO 16022 Annex M codeword placement sweep: a single traversal used both to write
//! codewords into a symbol and to read them back out, via a shared visitor.

use bcode_core::errors::{format_error, Result};
use bcode_core::BitMatrix;

type Positions = [(usize, usize); 8];

fn clamp(i: i32, max: i32) -> i32 {
    if i < 0 {
        i + max
    } else {
        i
    }
}

const CORNER1: [(i32, i32); 8] = [(-1, 0), (-1, 1), (-1, 2), (0, -2), (0, -1), (1, -1), (2, -1), (3, -1)];
const CORNER2: [(i32, i32); 8] = [(-3, 0), (-2, 0), (-1, 0), (0, -4), (0, -3), (0, -2), (0, -1), (1, -1)];
const CORNER3: [(i32, i32); 8] = [(-1, 0), (-1, -1), (0, -3), (0, -2), (0, -1), (1, -3), (1, -2), (1, -1)];
const CORNER4: [(i32, i32); 8] = [(-3, 0), (-2, 0), (-1, 0), (0, -2), (0, -1), (1, -1), (2, -1), (3, -1)];

fn corner_positions(delta: &[(i32, i32); 8], num_rows: i32, num_cols: i32) -> Positions {
    let mut result = [(0usize, 0usize); 8];
    for (i, &(dr, dc)) in delta.iter().enumerate() {
        result[i] = (clamp(dr, num_rows) as usize, clamp(dc, num_cols) as usize);
    }
    result
}

const UTAH_DELTA: [(i32, i32); 8] =
    [(-2, -2), (-2, -1), (-1, -2), (-1, -1), (-1, 0), (0, -2), (0, -1), (0, 0)];

fn utah_positions(row: i32, col: i32, num_rows: i32, num_cols: i32) -> Positions {
    let mut result = [(0usize, 0usize); 8];
    for (i, &(dr, dc)) in UTAH_DELTA.iter().enumerate() {
        let mut r = row + dr;
        let mut c = col + dc;
        if r < 0 {
            r += num_rows;
            c += 4 - ((num_rows + 4) % 8);
        }
        if c < 0 {
            c += num_cols;
            r += 4 - ((num_cols + 4) % 8);
        }
        if r >= num_rows {
            r -= num_rows;
        }
        result[i] = (r as usize, c as usize);
    }
    result
}

/// Sweeps every codeword position of a `num_cols`×`num_rows` symbol (Annex M.1), calling `visit`
/// once per codeword with that codeword's eight `(row, col)` bit positions in MSB-first order.
/// Returns a `num_cols`×`num_rows` matrix marking every cell the sweep touched.
fn visit_matrix(num_rows: usize, num_cols: usize, mut visit: impl FnMut(Positions)) -> BitMatrix {
    let nr = num_rows as i32;
    let nc = num_cols as i32;
    let mut visited = BitMatrix::new(num_cols, num_rows);

    let mut do_visit = |positions: Positions, visited: &mut BitMatrix, visit: &mut dyn FnMut(Positions)| {
        for &(r, c) in &positions {
            visited.set(c, r, true);
        }
        visit(positions);
    };

    let mut row: i32 = 4;
    let mut col: i32 = 0;

    loop {
        if row == nr && col == 0 {
            let p = corner_positions(&CORNER1, nr, nc);
            do_visit(p, &mut visited, &mut visit);
        } else if row == nr - 2 && col == 0 && nc % 4 != 0 {
            let p = corner_positions(&CORNER2, nr, nc);
            do_visit(p, &mut visited, &mut visit);
        } else if row == nr + 4 && col == 2 && nc % 8 == 0 {
            let p = corner_positions(&CORNER3, nr, nc);
            do_visit(p, &mut visited, &mut visit);
        } else if row == nr - 2 && col == 0 && nc % 8 == 4 {
            let p = corner_positions(&CORNER4, nr, nc);
            do_visit(p, &mut visited, &mut visit);
        }

        loop {
            if row < nr && col >= 0 && !visited.get(col as usize, row as usize) {
                let p = utah_positions(row, col, nr, nc);
                do_visit(p, &mut visited, &mut visit);
            }
            row -= 2;
            col += 2;
            if !(row >= 0 && col < nc) {
                break;
            }
        }
        row += 1;
        col += 3;

        loop {
            if row >= 0 && col < nc && !visited.get(col as usize, row as usize) {
                let p = utah_positions(row, col, nr, nc);
                do_visit(p, &mut visited, &mut visit);
            }
            row += 2;
            col -= 2;
            if !(row < nr && col >= 0) {
                break;
            }
        }
        row += 3;
        col += 1;

        if !(row < nr || col < nc) {
            break;
        }
    }

    visited
}

/// Writes `codewords` into a fresh `width`×`height` bit matrix via the Annex M.1 sweep.
pub fn place_codewords(codewords: &[u8], width: usize, height: usize) -> Result<BitMatrix> {
    let mut result = BitMatrix::new(width, height);
    let mut iter = codewords.iter();
    let mut exhausted = false;

    let visited = visit_matrix(height, width, |positions| {
        let Some(&codeword) = iter.next() else {
            exhausted = true;
            return;
        };
        let mut mask = 0x80u8;
        for &(r, c) in &positions {
            if codeword & mask != 0 {
                result.set(c, r, true);
            }
            mask >>= 1;
        }
    });

    if exhausted || iter.next().is_some() {
        return format_error("placement: codeword count does not match symbol size");
    }

    if !visited.get(width - 1, height - 1) {
        result.set(width - 1, height - 1, true);
        result.set(width - 2, height - 2, true);
    }
    Ok(result)
}

/// Reads `total_codewords` codewords out of a `width`×`height` data-bit matrix (alignment
/// borders already stripped) via the same Annex M.1 sweep used by `place_codewords`.
pub fn read_codewords(data_bits: &BitMatrix, total_codewords: usize) -> Result<Vec<u8>> {
    let width = data_bits.width();
    let height = data_bits.height();
    let mut result = Vec::with_capacity(total_codewords);

    visit_matrix(height, width, |positions| {
        let mut codeword = 0u8;
        for &(r, c) in &positions {
            codeword = (codeword << 1) | data_bits.get(c, r) as u8;
        }
        result.push(codeword);
    });

    if result.len() != total_codewords {
        return format_error("placement: read codeword count does not match version");
    }
    Ok(result)
}

/// Strips the one-module alignment border surrounding each data region, producing the plain
/// `dataWidth`×`dataHeight` grid `read_codewords` expects.
pub fn extract_data_bits(
    bits: &BitMatrix,
    data_width: usize,
    data_height: usize,
    data_block_width: usize,
    data_block_height: usize,
) -> BitMatrix {
    let mut result = BitMatrix::new(data_width, data_height);
    for y in 0..data_height {
        for x in 0..data_width {
            let ix = x + 1 + (x / data_block_width) * 2;
            let iy = y + 1 + (y / data_block_height) * 2;
            result.set(x, y, bits.get(ix, iy));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::version_for_dimensions;

    #[test]
    fn placement_round_trips_for_every_version() {
        for height in (8..=148u32).step_by(2) {
            for width in (8..=148u32).step_by(2) {
                let Some(version) = version_for_dimensions(height, width) else { continue };
                let total = version.total_codewords() as usize;
                let codewords: Vec<u8> = (0..total).map(|i| (i * 37 + 11) as u8).collect();
                let dw = version.data_width() as usize;
                let dh = version.data_height() as usize;
                let placed = place_codewords(&codewords, dw, dh).unwrap();
                let read_back = read_codewords(&placed, total).unwrap();
                assert_eq!(read_back, codewords, "version {}", version.version_number);
            }
        }
    }

    #[test]
    fn extract_data_bits_skips_alignment_borders() {
        let mut full = BitMatrix::new(12, 12);
        full.set(1, 1, true);
        let stripped = extract_data_bits(&full, 8, 8, 8, 8);
        assert!(stripped.get(0, 0));
    }
}
