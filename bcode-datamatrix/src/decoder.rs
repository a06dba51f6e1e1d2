// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level ECC-200 decode pipeline: version lookup, codeword placement, block
//! de-interleaving, Reed-Solomon correction, and bit-stream parsing, with a mirrored-matrix
//! retry for symbols captured flipped.

use bcode_core::errors::format_error;
use bcode_core::result::{DecoderResult, SymbologyIdentifier};
use bcode_core::{BitMatrix, DecoderOptions, GaloisField, Result};

use crate::bitstream;
use crate::datablock::get_data_blocks;
use crate::placement::{extract_data_bits, read_codewords};
use crate::version::{version_for_dimensions, Version};

fn field() -> GaloisField {
    // ISO 16022:2006 Annex E: GF(256) with primitive polynomial x^8 + x^5 + x^3 + x^2 + 1, and a
    // generator base of 1 (unlike PDF417's GF(929), which uses base 0).
    GaloisField::new_binary(0x012D, 2, 256, 1)
}

/// Corrects `codewords` (data followed by error-correction codewords) in place, returning how
/// many positions were actually fixed.
fn correct_errors(field: &GaloisField, codewords: &mut [u8], num_data_codewords: usize) -> Result<usize> {
    let mut as_ints: Vec<i32> = codewords.iter().map(|&b| b as i32).collect();
    let num_ec_codewords = as_ints.len() - num_data_codewords;
    bcode_core::reed_solomon::decode(field, &mut as_ints, num_ec_codewords)?;

    let mut corrected = 0;
    for (slot, &value) in codewords.iter_mut().zip(as_ints.iter()).take(num_data_codewords) {
        let value = value as u8;
        if *slot != value {
            corrected += 1;
        }
        *slot = value;
    }
    Ok(corrected)
}

struct Decoded {
    parsed: bitstream::ParsedContent,
    num_errors_corrected: usize,
}

fn do_decode(bits: &BitMatrix) -> Result<Decoded> {
    let Some(version) = version_for_dimensions(bits.height() as u32, bits.width() as u32) else {
        return format_error("invalid matrix dimension");
    };

    let data_bits = extract_data_bits(
        bits,
        version.data_width() as usize,
        version.data_height() as usize,
        version.data_block_width as usize,
        version.data_block_height as usize,
    );
    let codewords = read_codewords(&data_bits, version.total_codewords() as usize)?;
    if codewords.is_empty() {
        return format_error("invalid number of code words");
    }

    let gf = field();
    let mut fix259 = false;
    loop {
        match decode_with_blocks(&gf, &codewords, version, fix259) {
            Ok(decoded) => return Ok(decoded),
            Err(e) if e.kind() == "checksum" && version.version_number == 24 && !fix259 => {
                log::debug!("checksum failure on 144x144 symbol, retrying with fix259 interleaving");
                fix259 = true;
            }
            Err(e) => return Err(e),
        }
    }
}

fn decode_with_blocks(gf: &GaloisField, codewords: &[u8], version: &Version, fix259: bool) -> Result<Decoded> {
    let data_blocks = get_data_blocks(codewords, version, fix259)?;
    if data_blocks.is_empty() {
        return format_error("invalid number of data blocks");
    }

    let total_data_codewords: usize = data_blocks.iter().map(|b| b.num_data_codewords).sum();
    let mut result_bytes = vec![0u8; total_data_codewords];
    let block_count = data_blocks.len();
    let mut num_errors_corrected = 0;

    for (j, block) in data_blocks.into_iter().enumerate() {
        let mut codewords = block.codewords;
        num_errors_corrected += correct_errors(gf, &mut codewords, block.num_data_codewords)?;
        for (i, &byte) in codewords.iter().take(block.num_data_codewords).enumerate() {
            result_bytes[i * block_count + j] = byte;
        }
    }

    let parsed = bitstream::decode(&result_bytes, version.is_dmre());
    if let Some(e) = &parsed.error {
        return Err(e.clone());
    }
    Ok(Decoded { parsed, num_errors_corrected })
}

/// `res(x, y) = bits(width - 1 - y, height - 1 - x)`: the 90-degree-rotated mirror a symbol reads
/// as when its capture was flipped left-right.
fn flipped_l(bits: &BitMatrix) -> BitMatrix {
    let mut res = BitMatrix::new(bits.height(), bits.width());
    for y in 0..res.height() {
        for x in 0..res.width() {
            res.set(x, y, bits.get(bits.width() - 1 - y, bits.height() - 1 - x));
        }
    }
    res
}

fn to_decoder_result(decoded: Decoded, mirrored: bool) -> DecoderResult {
    let parsed = decoded.parsed;
    DecoderResult {
        symbology: SymbologyIdentifier::DataMatrix,
        text: parsed.text,
        raw_bytes: parsed.raw_bytes,
        content_type: parsed.content_type,
        num_errors_corrected: decoded.num_errors_corrected,
        num_erasures_corrected: 0,
        structured_append: parsed.structured_append,
        mirrored,
    }
}

/// Decodes one ECC-200 symbol from its captured bit matrix.
///
/// On a non-checksum failure, and when [`DecoderOptions::try_harder`] allows the extra pass,
/// retries against the matrix mirrored as [`flipped_l`] before giving up: a small fraction of
/// captures are flipped left-right by the scanning path, and the mirrored read only replaces the
/// first attempt when it does not itself fail on a checksum (a checksum failure there is as
/// strong a signal of "still wrong orientation" as of the original attempt).
pub fn decode(bits: &BitMatrix, options: &DecoderOptions) -> Result<DecoderResult> {
    let first = match do_decode(bits) {
        Ok(decoded) => return Ok(to_decoder_result(decoded, false)),
        Err(e) => e,
    };
    if !options.try_harder {
        return Err(first);
    }

    log::debug!("direct decode failed ({first}), retrying against the mirrored matrix");
    match do_decode(&flipped_l(bits)) {
        Ok(decoded) => Ok(to_decoder_result(decoded, true)),
        Err(mirrored_err) if mirrored_err.kind() != "checksum" => Err(mirrored_err),
        Err(_) => Err(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::place_codewords;
    use crate::version::version_for_dimensions;

    fn encode_rs(gf: &GaloisField, data: &[i32], num_ec: usize) -> Vec<i32> {
        use bcode_core::Polynomial;
        let mut generator = gf.one();
        for i in 0..num_ec as i32 {
            generator = generator.multiply(&Polynomial::new(vec![1, gf.exp(i + gf.generator_base())]), gf);
        }
        let info = Polynomial::new(data.to_vec());
        let info_padded = info.multiply_by_monomial(num_ec as i32, 1, gf);
        let remainder = poly_mod(gf, &info_padded, &generator);
        let mut result = data.to_vec();
        for i in 0..num_ec as i32 {
            result.push(remainder.coefficient(num_ec as i32 - 1 - i));
        }
        result
    }

    fn poly_mod(gf: &GaloisField, dividend: &bcode_core::Polynomial, divisor: &bcode_core::Polynomial) -> bcode_core::Polynomial {
        let mut remainder = dividend.clone();
        let divisor_leading = divisor.coefficient(divisor.degree());
        let inverse = gf.inverse(divisor_leading).unwrap();
        while remainder.degree() >= divisor.degree() && !remainder.is_zero() {
            let degree_diff = remainder.degree() - divisor.degree();
            let scale = gf.multiply(remainder.coefficient(remainder.degree()), inverse);
            let term = divisor.multiply_by_monomial(degree_diff, scale, gf);
            remainder = remainder.add_or_subtract(&term, gf);
        }
        remainder
    }

    #[test]
    fn decodes_a_full_symbol_round_trip() {
        // Version 3 (14x14) carries exactly 8 data codewords: 6 ASCII bytes for "AIMAIM" plus the
        // pad codeword and its one post-pad randomized filler.
        let version = version_for_dimensions(14, 14).unwrap();
        let gf = field();
        // "AIMAIM" in plain ASCII encodation, padded with the pad codeword.
        let data: Vec<i32> = vec![66, 74, 78, 66, 74, 78, 129, 56];
        let num_ec = version.ec_blocks.codewords_per_block as usize;
        let full = encode_rs(&gf, &data, num_ec);
        let codewords: Vec<u8> = full.iter().map(|&v| v as u8).collect();

        let placed = place_codewords(&codewords, version.data_width() as usize, version.data_height() as usize).unwrap();
        let mut symbol = BitMatrix::new(version.symbol_width as usize, version.symbol_height as usize);
        for y in 0..placed.height() {
            for x in 0..placed.width() {
                let sx = x + 1 + (x / version.data_block_width as usize) * 2;
                let sy = y + 1 + (y / version.data_block_height as usize) * 2;
                symbol.set(sx, sy, placed.get(x, y));
            }
        }

        let options = DecoderOptions::default();
        let result = decode(&symbol, &options).unwrap();
        assert_eq!(result.text, "AIMAIM");
        assert!(!result.mirrored);
    }
}
