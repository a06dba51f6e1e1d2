// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ECC-200 bit-stream interpretation: the six encodation modes (ASCII, C40, Text, X12, EDIFACT,
//! Base256), ECI, FNC1, Structured Append, and Reader Initialization.
//!
//! See ISO 16022:2006, 5.2 and Annex C.

use bcode_core::result::StructuredAppendInfo;
use bcode_core::{ContentType, Error};

const C40_BASIC_SET_CHARS: [u8; 40] = *b"***0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// Shared by both C40 and Text mode's shift-2 (punctuation) sub-set; the final entry is FNC1,
// emitted as ASCII GS (29).
const C40_SHIFT2_SET_CHARS: [u8; 28] = [
    b'!', b'"', b'#', b'$', b'%', b'&', b'\'', b'(', b')', b'*', b'+', b',', b'-', b'.', b'/', b':', b';', b'<',
    b'=', b'>', b'?', b'@', b'[', b'\\', b']', b'^', b'_', 29,
];
const TEXT_BASIC_SET_CHARS: [u8; 40] = *b"***0123456789abcdefghijklmnopqrstuvwxyz";
const TEXT_SHIFT3_SET_CHARS: [u8; 32] = [
    b'`', b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'J', b'K', b'L', b'M', b'N', b'O', b'P', b'Q',
    b'R', b'S', b'T', b'U', b'V', b'W', b'X', b'Y', b'Z', b'{', b'|', b'}', b'~', 127,
];

/// Result of a fully or partially decoded bit stream. The parser keeps going after the first
/// error so `text`/`raw_bytes` still carry whatever was recovered before the failure.
#[derive(Debug, Clone, Default)]
pub struct ParsedContent {
    pub text: String,
    pub raw_bytes: Vec<u8>,
    pub content_type: ContentType,
    pub structured_append: Option<StructuredAppendInfo>,
    pub reader_init: bool,
    pub symbology_modifier: char,
    pub error: Option<Error>,
}

/// A bit-level cursor over a byte slice, reading big-endian bit groups MSB-first (mirrors the
/// original `BitSource`).
struct BitSource<'a> {
    bytes: &'a [u8],
    byte_offset: usize,
    bit_offset: u32,
}

impl<'a> BitSource<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitSource { bytes, byte_offset: 0, bit_offset: 0 }
    }

    fn available(&self) -> usize {
        (self.bytes.len() - self.byte_offset) * 8 - self.bit_offset as usize
    }

    fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    fn bit_offset(&self) -> u32 {
        self.bit_offset
    }

    /// Reads `num_bits` (1..=8) MSB-first, returning a value in `0..(1 << num_bits)`.
    fn read_bits(&mut self, num_bits: u32) -> u32 {
        debug_assert!(num_bits <= 8);
        let mut result = 0u32;
        let mut bits_left = num_bits;
        while bits_left > 0 {
            let current_byte = self.bytes[self.byte_offset];
            let bits_available_in_byte = 8 - self.bit_offset;
            let take = bits_left.min(bits_available_in_byte);
            let shift = bits_available_in_byte - take;
            let mask = ((1u32 << take) - 1) << shift;
            let bits = ((current_byte as u32) & mask) >> shift;
            result = (result << take) | bits;
            self.bit_offset += take;
            if self.bit_offset == 8 {
                self.bit_offset = 0;
                self.byte_offset += 1;
            }
            bits_left -= take;
        }
        result
    }
}

/// Maps an ECI designator to the charset this crate knows how to convert into text. Designators
/// outside this table still parse correctly (so the bit cursor stays in sync) but their bytes fall
/// back to the default lossy UTF-8 rendering.
fn eci_charset_name(eci: i32) -> Option<&'static str> {
    match eci {
        3 => Some("ISO-8859-1"),
        26 => Some("UTF-8"),
        _ => None,
    }
}

/// Decodes `bytes` under `charset` into text. `None` (no ECI seen yet, or an unrecognized
/// designator) and `"UTF-8"` both fall back to lossy UTF-8 decoding; `"ISO-8859-1"` maps each byte
/// directly to the Unicode code point of the same value, which is what that charset is.
fn decode_span(bytes: &[u8], charset: Option<&'static str>) -> String {
    match charset {
        Some("ISO-8859-1") => bytes.iter().map(|&b| b as char).collect(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn parse_eci_value(bits: &mut BitSource) -> i32 {
    let first_byte = bits.read_bits(8) as i32;
    if first_byte <= 127 {
        return first_byte - 1;
    }
    let second_byte = bits.read_bits(8) as i32;
    if first_byte <= 191 {
        return (first_byte - 128) * 254 + 127 + second_byte - 1;
    }
    let third_byte = bits.read_bits(8) as i32;
    (first_byte - 192) * 64516 + 16383 + (second_byte - 1) * 254 + third_byte - 1
}

fn parse_structured_append(bits: &mut BitSource) -> StructuredAppendInfo {
    let symbol_sequence_indicator = bits.read_bits(8);
    let index = (symbol_sequence_indicator >> 4) as u8;
    let mut count = 17u8.wrapping_sub((symbol_sequence_indicator & 0x0F) as u8);
    if count == 17 || count <= index {
        count = 0;
    }
    let file_id1 = bits.read_bits(8);
    let file_id2 = bits.read_bits(8);
    let id = ((file_id1 << 8) | file_id2).to_string();
    StructuredAppendInfo { index, count, id: Some(id) }
}

/// Reads the next C40/Text triple: two bytes packed as `1600*c1 + 40*c2 + c3 + 1`. Returns `None`
/// once fewer than 16 bits remain, or the first byte is the unlatch codeword 254.
fn decode_next_triple(bits: &mut BitSource) -> Option<[i32; 3]> {
    if bits.available() < 16 {
        return None;
    }
    let first_byte = bits.read_bits(8);
    if first_byte == 254 {
        return None;
    }
    let full_bit_value = ((first_byte << 8) + bits.read_bits(8)) as i32 - 1;
    let a = full_bit_value / 1600;
    let rem = full_bit_value - a * 1600;
    let b = rem / 40;
    let c = rem - b * 40;
    Some([a, b, c])
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum C40OrText {
    C40,
    Text,
}

/// A one-shot upper-shift latch: the next emitted character gets +128, then the latch clears.
#[derive(Default)]
struct UpperShift {
    set: bool,
}

impl UpperShift {
    fn apply(&mut self, val: i32) -> i32 {
        let bias = if self.set { 128 } else { 0 };
        self.set = false;
        val + bias
    }
}

fn decode_c40_or_text_segment(bits: &mut BitSource, out: &mut Vec<u8>, mode: C40OrText) -> Result<(), Error> {
    let mut upper_shift = UpperShift::default();
    let mut shift = 0u32;

    let basic_set: &[u8] = if mode == C40OrText::C40 { &C40_BASIC_SET_CHARS } else { &TEXT_BASIC_SET_CHARS };

    while let Some(triple) = decode_next_triple(bits) {
        for c_value in triple {
            let current_shift = shift;
            shift = 0;
            match current_shift {
                0 => {
                    if c_value < 3 {
                        shift = (c_value + 1) as u32;
                    } else if c_value < 40 {
                        out.push(upper_shift.apply(basic_set[c_value as usize] as i32) as u8);
                    } else {
                        return Err(Error::Format("invalid value in C40 or Text segment".into()));
                    }
                }
                1 => out.push(upper_shift.apply(c_value) as u8),
                2 => {
                    if c_value < 28 {
                        let ch = C40_SHIFT2_SET_CHARS[c_value as usize] as i32;
                        out.push(upper_shift.apply(ch) as u8);
                    } else if c_value == 30 {
                        upper_shift.set = true;
                    } else {
                        return Err(Error::Format("invalid value in C40 or Text segment".into()));
                    }
                }
                3 => {
                    if mode == C40OrText::C40 {
                        out.push(upper_shift.apply(c_value + 96) as u8);
                    } else if (c_value as usize) < TEXT_SHIFT3_SET_CHARS.len() {
                        out.push(upper_shift.apply(TEXT_SHIFT3_SET_CHARS[c_value as usize] as i32) as u8);
                    } else {
                        return Err(Error::Format("invalid value in C40 or Text segment".into()));
                    }
                }
                _ => unreachable!(),
            }
        }
    }
    Ok(())
}

fn decode_x12_segment(bits: &mut BitSource, out: &mut Vec<u8>) -> Result<(), Error> {
    const SEG_CHARS: [u8; 4] = [b'\r', b'*', b'>', b' '];
    while let Some(triple) = decode_next_triple(bits) {
        for c_value in triple {
            if c_value < 4 {
                out.push(SEG_CHARS[c_value as usize]);
            } else if c_value < 14 {
                out.push((c_value + 44) as u8);
            } else if c_value < 40 {
                out.push((c_value + 51) as u8);
            } else {
                return Err(Error::Format("invalid value in AnsiX12 segment".into()));
            }
        }
    }
    Ok(())
}

fn decode_edifact_segment(bits: &mut BitSource, out: &mut Vec<u8>) {
    while bits.available() >= 24 {
        let mut unlatched = false;
        for _ in 0..4 {
            let edifact_value = bits.read_bits(6) as u8;
            if edifact_value == 0x1F {
                if bits.bit_offset() != 0 {
                    bits.read_bits(8 - bits.bit_offset());
                }
                unlatched = true;
                break;
            }
            let emitted = if edifact_value & 0x20 == 0 { edifact_value | 0x40 } else { edifact_value };
            out.push(emitted);
        }
        if unlatched {
            return;
        }
    }
}

fn unrandomize_255_state(randomized: u32, position: i32) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    let temp = randomized as i32 - pseudo_random;
    (if temp >= 0 { temp } else { temp + 256 }) as u8
}

fn decode_base256_segment(bits: &mut BitSource, out: &mut Vec<u8>) -> Result<(), Error> {
    let mut codeword_position = 1 + bits.byte_offset() as i32;
    let d1 = unrandomize_255_state(bits.read_bits(8), codeword_position);
    codeword_position += 1;

    let count: i32 = if d1 == 0 {
        (bits.available() / 8) as i32
    } else if d1 < 250 {
        d1 as i32
    } else {
        let d2 = unrandomize_255_state(bits.read_bits(8), codeword_position);
        codeword_position += 1;
        250 * (d1 as i32 - 249) + d2 as i32
    };

    if count < 0 {
        return Err(Error::Format("invalid count in Base256 segment".into()));
    }

    out.reserve(count as usize);
    for _ in 0..count {
        out.push(unrandomize_255_state(bits.read_bits(8), codeword_position));
        codeword_position += 1;
    }
    Ok(())
}

/// Parses the de-interleaved, RS-corrected data codewords of an ECC-200 symbol into text.
pub fn decode(bytes: &[u8], is_dmre: bool) -> ParsedContent {
    let mut bits = BitSource::new(bytes);
    let mut raw_bytes = Vec::new();
    let mut error: Option<Error> = None;
    let mut modifier = '1';
    let mut trailer = String::new();

    let mut sai: Option<StructuredAppendInfo> = None;
    let mut reader_init = false;
    let mut first_codeword = true;
    let mut done = false;
    let mut first_fnc1_position: usize = 1;
    // Each entry marks the `raw_bytes` offset at which a new ECI-directed charset took effect, so
    // the final text can be assembled span by span instead of under one charset for the whole
    // message. Starts with no ECI in effect.
    let mut eci_spans: Vec<(usize, Option<&'static str>)> = vec![(0, None)];

    let mut set_error = |e: Error, error: &mut Option<Error>| {
        if error.is_none() {
            *error = Some(e);
        }
    };
    let mut upper_shift = UpperShift::default();

    while !done && bits.available() >= 8 {
        let one_byte = bits.read_bits(8);
        match one_byte {
            0 => set_error(Error::Format("invalid 0 code word".into()), &mut error),
            129 => done = true,
            230 => {
                if let Err(e) = decode_c40_or_text_segment(&mut bits, &mut raw_bytes, C40OrText::C40) {
                    set_error(e, &mut error);
                }
            }
            231 => {
                if let Err(e) = decode_base256_segment(&mut bits, &mut raw_bytes) {
                    set_error(e, &mut error);
                }
            }
            232 => {
                if bits.byte_offset() == first_fnc1_position {
                    modifier = '2';
                } else if bits.byte_offset() == first_fnc1_position + 1 {
                    modifier = '3';
                } else {
                    raw_bytes.push(29);
                }
            }
            233 => {
                if !first_codeword {
                    set_error(Error::Format("structured append tag must be first code word".into()), &mut error);
                }
                sai = Some(parse_structured_append(&mut bits));
                first_fnc1_position = 5;
            }
            234 => {
                if !first_codeword {
                    set_error(Error::Format("reader programming tag must be first code word".into()), &mut error);
                }
                reader_init = true;
            }
            235 => upper_shift.set = true,
            236 => {
                raw_bytes.extend_from_slice(b"[)>\x1E05\x1D");
                trailer = format!("\x1E\x04{}", trailer);
            }
            237 => {
                raw_bytes.extend_from_slice(b"[)>\x1E06\x1D");
                trailer = format!("\x1E\x04{}", trailer);
            }
            238 => {
                if let Err(e) = decode_x12_segment(&mut bits, &mut raw_bytes) {
                    set_error(e, &mut error);
                }
            }
            239 => {
                if let Err(e) = decode_c40_or_text_segment(&mut bits, &mut raw_bytes, C40OrText::Text) {
                    set_error(e, &mut error);
                }
            }
            240 => decode_edifact_segment(&mut bits, &mut raw_bytes),
            241 => {
                let eci = parse_eci_value(&mut bits);
                eci_spans.push((raw_bytes.len(), eci_charset_name(eci)));
            }
            _ => {
                if one_byte <= 128 {
                    raw_bytes.push((upper_shift.apply(one_byte as i32) - 1) as u8);
                } else if one_byte <= 229 {
                    raw_bytes.extend_from_slice(format!("{:02}", one_byte - 130).as_bytes());
                } else if one_byte >= 242 {
                    if one_byte == 254 && bits.available() == 0 {
                        // Tolerated: some encoders emit a trailing unlatch-to-ASCII as the final
                        // code word even though ASCII was never left.
                    } else {
                        set_error(Error::Format("invalid code word".into()), &mut error);
                    }
                }
            }
        }
        first_codeword = false;
    }

    raw_bytes.extend_from_slice(trailer.as_bytes());

    let mut symbology_modifier = modifier;
    if is_dmre {
        symbology_modifier = char::from_u32(symbology_modifier as u32 + 6).unwrap_or(symbology_modifier);
    }

    let content_type = match modifier {
        '2' => ContentType::Gs1,
        '3' => ContentType::Mixed,
        _ if raw_bytes.starts_with(b"[)>") => ContentType::Iso15434,
        _ => ContentType::Text,
    };

    let mut text = String::new();
    for window in eci_spans.windows(2) {
        let (start, charset) = window[0];
        let end = window[1].0;
        text.push_str(&decode_span(&raw_bytes[start..end], charset));
    }
    if let Some(&(start, charset)) = eci_spans.last() {
        text.push_str(&decode_span(&raw_bytes[start..], charset));
    }

    ParsedContent { text, raw_bytes, content_type, structured_append: sai, reader_init, symbology_modifier, error }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_ascii() {
        let bytes = [66u8, 74, 78, 66, 74, 78, 129, 56, 35, 102, 192, 96, 226, 100, 156, 1, 107, 221];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "AIMAIM");
        assert!(result.error.is_none());
    }

    #[test]
    fn decodes_c40_latch_and_unlatch() {
        let bytes = [230u8, 91, 11, 91, 11, 91, 11, 254];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "AIMAIMAIM");
    }

    #[test]
    fn decodes_text_mode_lowercase() {
        let bytes = [239u8, 91, 11, 91, 11, 91, 11, 254];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "aimaimaim");
    }

    #[test]
    fn decodes_x12_segment() {
        let bytes = [238u8, 89, 233, 14, 192, 100, 207, 44, 31, 67];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "ABC>ABC123>AB");
    }

    #[test]
    fn decodes_two_digit_ascii_pairs() {
        let bytes = [130u8, 131, 228, 229];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "00019899");
    }

    #[test]
    fn fnc1_as_first_codeword_marks_gs1() {
        let bytes = [232u8, 150, 131];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "2001");
        assert_eq!(result.symbology_modifier, '2');
        assert_eq!(result.content_type, ContentType::Gs1);
    }

    #[test]
    fn tolerates_trailing_unlatch_with_no_remainder() {
        let bytes = [66u8, 254];
        let result = decode(&bytes, false);
        assert!(result.error.is_none());
    }

    #[test]
    fn eci_iso_8859_1_converts_high_bytes_into_latin1_code_points() {
        // ECI 241, designator byte 4 (value - 1 = 3 => ISO-8859-1), then Base256 latch (231) with a
        // single un-randomized data byte 0xE9 ('é' in Latin-1).
        let bytes = [241u8, 4, 231, 88, 213];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "\u{e9}");
    }

    #[test]
    fn eci_utf_8_falls_back_to_the_default_lossy_decoding() {
        let bytes = [241u8, 27, 66, 67];
        let result = decode(&bytes, false);
        assert_eq!(result.text, "AB");
    }
}
