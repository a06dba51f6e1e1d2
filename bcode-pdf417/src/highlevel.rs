// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interprets the error-corrected codeword sequence as text, bytes, and control segments: Text,
//! Byte, and Numeric Compaction, ECI designators, and the Macro PDF417 control block.
//!
//! See ISO/IEC 15438:2001(E) 4.4. Mirrors, on the decode side, the mode tables `PDFHighLevelEncoder`
//! uses to encode them.

use bcode_core::result::StructuredAppendInfo;
use bcode_core::{ContentType, Error};

const TEXT_COMPACTION: i32 = 900;
const BYTE_COMPACTION_LATCH: i32 = 901;
const NUMERIC_COMPACTION: i32 = 902;
const BYTE_COMPACTION_LATCH6: i32 = 924;
const SHIFT_TO_BYTE: i32 = 913;
const ECI_USER_DEFINED: i32 = 925;
const ECI_GENERAL_PURPOSE: i32 = 926;
const ECI_CHARSET: i32 = 927;
const BEGIN_MACRO_PDF417_CONTROL_BLOCK: i32 = 928;
const MACRO_PDF417_TERMINATOR: i32 = 922;
const MAX_NUMERIC_CODEWORDS_PER_CHUNK: usize = 15;

const TEXT_MIXED_CHARS: [u8; 25] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'&', b'\r', b'\t', b',', b':', b'#', b'-', b'.', b'$', b'/', b'+', b'%', b'*', b'=', b'^'];

const TEXT_PUNCTUATION_CHARS: [u8; 29] = [
    b';', b'<', b'>', b'@', b'[', b'\\', b']', b'_', b'`', b'~', b'!', b'\r', b'\t', b',', b':', b'\n', b'-', b'.', b'$', b'/', b'"', b'|', b'*', b'(',
    b')', b'?', b'{', b'}', b'\'',
];

fn mixed_char(code: i32) -> Option<char> {
    match code {
        0..=24 => Some(TEXT_MIXED_CHARS[code as usize] as char),
        26 => Some(' '),
        _ => None,
    }
}

fn punctuation_char(code: i32) -> Option<char> {
    if (0..29).contains(&code) {
        Some(TEXT_PUNCTUATION_CHARS[code as usize] as char)
    } else {
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextSubmode {
    Alpha,
    Lower,
    Mixed,
    Punctuation,
}

/// Unpacks each codeword into its two base-30 values and runs the four-submode state machine
/// `EncodeText` implements in reverse.
fn decode_text_compaction(codewords: &[i32]) -> String {
    let mut values = Vec::with_capacity(codewords.len() * 2);
    for &cw in codewords {
        values.push(cw / 30);
        values.push(cw % 30);
    }

    let mut text = String::new();
    let mut submode = TextSubmode::Alpha;
    let mut i = 0;
    while i < values.len() {
        let code = values[i];
        match submode {
            TextSubmode::Alpha => match code {
                0..=25 => text.push((b'A' + code as u8) as char),
                26 => text.push(' '),
                27 => submode = TextSubmode::Lower,
                28 => submode = TextSubmode::Mixed,
                29 => {
                    i += 1;
                    if let Some(&c) = values.get(i) {
                        if let Some(c) = punctuation_char(c) {
                            text.push(c);
                        }
                    }
                }
                _ => {}
            },
            TextSubmode::Lower => match code {
                0..=25 => text.push((b'a' + code as u8) as char),
                26 => text.push(' '),
                27 => {
                    i += 1;
                    if let Some(&c) = values.get(i) {
                        if (0..=25).contains(&c) {
                            text.push((b'A' + c as u8) as char);
                        }
                    }
                }
                28 => submode = TextSubmode::Mixed,
                29 => {
                    i += 1;
                    if let Some(&c) = values.get(i) {
                        if let Some(c) = punctuation_char(c) {
                            text.push(c);
                        }
                    }
                }
                _ => {}
            },
            TextSubmode::Mixed => {
                if let Some(c) = mixed_char(code) {
                    text.push(c);
                } else {
                    match code {
                        25 => submode = TextSubmode::Punctuation,
                        27 => submode = TextSubmode::Lower,
                        28 => submode = TextSubmode::Alpha,
                        29 => {
                            i += 1;
                            if let Some(&c) = values.get(i) {
                                if let Some(c) = punctuation_char(c) {
                                    text.push(c);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            TextSubmode::Punctuation => {
                if let Some(c) = punctuation_char(code) {
                    text.push(c);
                } else if code == 29 {
                    submode = TextSubmode::Alpha;
                }
            }
        }
        i += 1;
    }
    text
}

/// Decodes one Byte Compaction segment, starting at `codewords[start]` and running to the first
/// codeword that can't be part of a byte payload (>= 900) or the end of data.
///
/// `latch6` (mode [`BYTE_COMPACTION_LATCH6`]) always packs whole 6-byte groups into 5 codewords
/// each with no remainder. Plain [`BYTE_COMPACTION_LATCH`] is used whenever the byte count isn't a
/// multiple of 6, so its segment always ends in 1..=5 literal per-byte codewords; since the
/// remainder occupies as many codewords as bytes, a segment with a codeword count divisible by 5
/// can't be read as "one more full group" (`EncodeBinary` would have used `latch6` for that), so
/// the trailing 5 codewords in that case are literal bytes, not a packed group.
fn decode_byte_compaction(codewords: &[i32], start: usize, latch6: bool) -> (Vec<u8>, usize) {
    let segment_end = codewords[start..].iter().position(|&c| !(0..900).contains(&c)).map(|p| start + p).unwrap_or(codewords.len());
    let total = segment_end - start;
    let (full_groups, remainder_bytes) = if latch6 {
        (total / 5, 0)
    } else if total == 0 {
        (0, 0)
    } else if total % 5 != 0 {
        (total / 5, total % 5)
    } else {
        (total / 5 - 1, 5)
    };

    let mut bytes = Vec::new();
    let mut i = start;
    for _ in 0..full_groups {
        let mut t: u64 = 0;
        for &c in &codewords[i..i + 5] {
            t = t * 900 + c as u64;
        }
        bytes.extend_from_slice(&t.to_be_bytes()[2..8]);
        i += 5;
    }
    for _ in 0..remainder_bytes {
        bytes.push(codewords[i] as u8);
        i += 1;
    }
    (bytes, i)
}

/// Multiplies the decimal digit string `digits` (most-significant digit first) by `mul` and adds
/// `add`, growing the string if the result needs another digit. This is the one piece of bignum
/// arithmetic Numeric Compaction needs, so it is hand-rolled rather than pulling in a bigint crate.
fn decimal_mul_add(digits: &mut Vec<u8>, mul: u32, add: u32) {
    let mut carry: u64 = add as u64;
    for d in digits.iter_mut().rev() {
        let v = (*d as u64) * mul as u64 + carry;
        *d = (v % 10) as u8;
        carry = v / 10;
    }
    while carry > 0 {
        digits.insert(0, (carry % 10) as u8);
        carry /= 10;
    }
}

/// Decodes one Numeric Compaction segment: each run of up to [`MAX_NUMERIC_CODEWORDS_PER_CHUNK`]
/// codewords is Horner-evaluated in base 900 into a decimal bignum that implicitly carries a
/// synthetic leading `1` digit (mirroring `EncodeNumeric`'s `"1" + digits` prefix); stripping that
/// leading digit recovers the original decimal run, including any leading zeros it had.
fn decode_numeric_compaction(codewords: &[i32], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut i = start;
    while i < codewords.len() && (0..900).contains(&codewords[i]) {
        let mut digits: Vec<u8> = vec![0];
        let mut consumed = 0;
        while consumed < MAX_NUMERIC_CODEWORDS_PER_CHUNK && i < codewords.len() && (0..900).contains(&codewords[i]) {
            decimal_mul_add(&mut digits, 900, codewords[i] as u32);
            i += 1;
            consumed += 1;
        }
        let rendered: String = digits.iter().map(|&d| (b'0' + d) as char).collect();
        text.push_str(rendered.get(1..).unwrap_or(""));
    }
    (text, i)
}

fn eci_charset_name(eci: i32) -> Option<&'static str> {
    match eci {
        3 => Some("ISO-8859-1"),
        26 => Some("UTF-8"),
        _ => None,
    }
}

/// Decodes `bytes` under `charset` into text and appends it to `text`, per the rule that an ECI
/// designator "applies to subsequent Text/Byte data until superseded" (spec'd against Byte
/// Compaction output here; Text Compaction already emits through its own fixed ASCII tables).
/// `None` leaves `raw_bytes` as the only record of the data, since there is no charset to render
/// it under yet.
fn append_bytes_as_text(text: &mut String, bytes: &[u8], charset: Option<&'static str>) {
    match charset {
        Some("ISO-8859-1") => text.extend(bytes.iter().map(|&b| b as char)),
        Some("UTF-8") => text.push_str(&String::from_utf8_lossy(bytes)),
        _ => {}
    }
}

/// Result of parsing the high-level bit stream out of an error-corrected codeword sequence.
#[derive(Debug, Clone, Default)]
pub struct ParsedContent {
    pub text: String,
    pub raw_bytes: Vec<u8>,
    pub content_type: ContentType,
    pub structured_append: Option<StructuredAppendInfo>,
    pub error: Option<Error>,
}

struct MacroField {
    tag: i32,
    text: String,
}

/// Number of codewords the Segment Index field always occupies, regardless of how few decimal
/// digits the index itself needs.
const SEGMENT_INDEX_CODEWORDS: usize = 2;

/// Parses a Macro PDF417 control block: a fixed-width Numeric-Compaction segment index, an
/// unmarked File ID field (each codeword rendered as a zero-padded 3-digit decimal chunk and
/// concatenated, not folded into one bignum), then zero or more `923, tag, ...value` optional
/// fields, ending at the first [`MACRO_PDF417_TERMINATOR`] or at the end of data. Field tags 0
/// (file name), 3 (sender), and 4 (addressee) carry Text Compaction values; the rest carry
/// Numeric Compaction values.
fn parse_macro_block(codewords: &[i32], start: usize) -> (Option<StructuredAppendInfo>, usize) {
    const FIELD_MARKER: i32 = 923;
    let mut i = start;
    if i + SEGMENT_INDEX_CODEWORDS > codewords.len() {
        return (None, codewords.len());
    }
    let (segment_index_text, _) = decode_numeric_compaction(&codewords[..i + SEGMENT_INDEX_CODEWORDS], i);
    i += SEGMENT_INDEX_CODEWORDS;
    let segment_index: u8 = segment_index_text.parse().unwrap_or(0);

    let mut file_id = String::new();
    while i < codewords.len() && codewords[i] != FIELD_MARKER && codewords[i] != MACRO_PDF417_TERMINATOR {
        file_id.push_str(&format!("{:03}", codewords[i]));
        i += 1;
    }

    let mut fields = Vec::new();
    while i < codewords.len() && codewords[i] == FIELD_MARKER {
        i += 1;
        let Some(&tag) = codewords.get(i) else { break };
        i += 1;
        let is_text_field = matches!(tag, 0 | 3 | 4);
        if is_text_field {
            let segment_end = codewords[i..].iter().position(|&c| c == FIELD_MARKER || c == MACRO_PDF417_TERMINATOR).map(|p| i + p).unwrap_or(codewords.len());
            fields.push(MacroField { tag, text: decode_text_compaction(&codewords[i..segment_end]) });
            i = segment_end;
        } else {
            let (value, next) = decode_numeric_compaction(codewords, i);
            fields.push(MacroField { tag, text: value });
            i = next;
        }
    }
    if i < codewords.len() && codewords[i] == MACRO_PDF417_TERMINATOR {
        i += 1;
    }

    let count = fields.iter().find(|f| f.tag == 1).and_then(|f| f.text.parse::<u8>().ok()).unwrap_or(1);
    let id = if file_id.is_empty() { None } else { Some(file_id) };

    (Some(StructuredAppendInfo { index: segment_index, count, id }), i)
}

/// Parses the full error-corrected codeword sequence (with the symbol length descriptor already
/// stripped) into text, bytes, and any Structured Append placement. Keeps parsing after the first
/// unrecognized or malformed codeword so the caller still gets whatever content preceded it.
pub fn decode(codewords: &[i32]) -> ParsedContent {
    let mut result = ParsedContent::default();
    let mut saw_bytes = false;
    let mut saw_text = false;
    let mut eci_charset: Option<&'static str> = None;
    let mut saw_unrecognized_eci = false;

    // A PDF417 stream starts in Text Compaction mode implicitly; only a later mode switch needs
    // its own marker codeword. Consume that initial run before falling into the marker-driven loop.
    let mut i = 0;
    if codewords.first().is_some_and(|&c| c < 900) {
        let segment_end = codewords.iter().position(|&c| c >= 900).unwrap_or(codewords.len());
        result.text.push_str(&decode_text_compaction(&codewords[..segment_end]));
        saw_text = true;
        i = segment_end;
    }
    while i < codewords.len() {
        match codewords[i] {
            TEXT_COMPACTION => {
                let segment_end = codewords[i + 1..].iter().position(|&c| c >= 900).map(|p| i + 1 + p).unwrap_or(codewords.len());
                result.text.push_str(&decode_text_compaction(&codewords[i + 1..segment_end]));
                saw_text = true;
                i = segment_end;
            }
            BYTE_COMPACTION_LATCH | BYTE_COMPACTION_LATCH6 => {
                let latch6 = codewords[i] == BYTE_COMPACTION_LATCH6;
                let (bytes, next) = decode_byte_compaction(codewords, i + 1, latch6);
                append_bytes_as_text(&mut result.text, &bytes, eci_charset);
                result.raw_bytes.extend_from_slice(&bytes);
                saw_bytes = true;
                i = next;
            }
            SHIFT_TO_BYTE => {
                if let Some(&byte) = codewords.get(i + 1) {
                    append_bytes_as_text(&mut result.text, &[byte as u8], eci_charset);
                    result.raw_bytes.push(byte as u8);
                    saw_bytes = true;
                }
                i += 2;
            }
            NUMERIC_COMPACTION => {
                let (digits, next) = decode_numeric_compaction(codewords, i + 1);
                result.text.push_str(&digits);
                saw_text = true;
                i = next;
            }
            ECI_CHARSET => {
                if let Some(&eci) = codewords.get(i + 1) {
                    match eci_charset_name(eci) {
                        Some(name) => eci_charset = Some(name),
                        None => saw_unrecognized_eci = true,
                    }
                }
                i += 2;
            }
            ECI_GENERAL_PURPOSE => {
                if let (Some(&hi), Some(&lo)) = (codewords.get(i + 1), codewords.get(i + 2)) {
                    let eci = (hi + 1) * 900 + lo;
                    match eci_charset_name(eci) {
                        Some(name) => eci_charset = Some(name),
                        None => saw_unrecognized_eci = true,
                    }
                }
                i += 3;
            }
            ECI_USER_DEFINED => {
                saw_unrecognized_eci = true;
                i += 2;
            }
            BEGIN_MACRO_PDF417_CONTROL_BLOCK => {
                let (info, next) = parse_macro_block(codewords, i + 1);
                result.structured_append = info;
                i = next;
            }
            MACRO_PDF417_TERMINATOR => {
                i += 1;
            }
            _ => {
                if result.error.is_none() {
                    result.error = Some(Error::Format(format!("pdf417: unrecognized mode codeword {}", codewords[i])));
                }
                i += 1;
            }
        }
    }

    result.content_type = match (saw_text, saw_bytes, saw_unrecognized_eci) {
        (_, _, true) => ContentType::UnknownEci,
        (true, true, false) => ContentType::Mixed,
        (false, true, false) => ContentType::Binary,
        _ => ContentType::Text,
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_alpha_text() {
        let packed = pack_text(&[7, 26, 4, 11, 11, 14, 26, 22, 14, 17, 11, 3]);
        let text = decode_text_compaction(&packed);
        assert_eq!(text, "HELLO WORLD");
    }

    fn pack_text(tokens: &[i32]) -> Vec<i32> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() {
                out.push(tokens[i] * 30 + tokens[i + 1]);
                i += 2;
            } else {
                out.push(tokens[i] * 30 + 29);
                i += 1;
            }
        }
        out
    }

    #[test]
    fn decodes_lowercase_via_latch() {
        // LL(27), 'a'(0), 'b'(1)
        let packed = pack_text(&[27, 0, 1]);
        assert_eq!(decode_text_compaction(&packed), "ab");
    }

    #[test]
    fn byte_compaction_round_trips_a_six_byte_group() {
        let bytes: [u8; 6] = [0x41, 0x42, 0x43, 0x44, 0x45, 0x46];
        let mut t: u64 = 0;
        for &b in &bytes {
            t = (t << 8) | b as u64;
        }
        let mut chars = [0i32; 5];
        let mut t_mut = t;
        for c in chars.iter_mut() {
            *c = (t_mut % 900) as i32;
            t_mut /= 900;
        }
        chars.reverse();
        let (decoded, consumed) = decode_byte_compaction(&chars, 0, true);
        assert_eq!(decoded, bytes);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn byte_compaction_treats_a_five_codeword_remainder_as_literal_bytes() {
        // A segment whose codeword count is itself a multiple of 5 can still be all-literal: under
        // plain BYTE_COMPACTION_LATCH (not latch6) the byte count is never a multiple of 6, so a
        // 10-codeword segment is one packed 6-byte group followed by 5 literal bytes, not two
        // packed groups.
        let codewords = [213, 598, 413, 118, 87, 127, 127, 127, 127, 127];
        let (decoded, consumed) = decode_byte_compaction(&codewords, 0, false);
        assert_eq!(decoded, vec![0x7Fu8; 11]);
        assert_eq!(consumed, 10);
    }

    #[test]
    fn numeric_compaction_recovers_leading_zeros() {
        // BigInteger("1007") = 1007; base-900 digits of 1007 are [1, 107].
        let (digits, consumed) = decode_numeric_compaction(&[1, 107], 0);
        assert_eq!(digits, "007");
        assert_eq!(consumed, 2);
    }

    #[test]
    fn macro_block_recovers_segment_index_and_tagged_sender() {
        // Segment index field is always 2 codewords: Horner(0, 10) => 10 => strip leading '1' => "0".
        // No File ID codewords follow (923 comes immediately), then field 3 (sender) as text "AB".
        let sender = pack_text(&[0, 1]);
        let mut codewords = vec![0, 10, 923, 3];
        codewords.extend(sender);
        codewords.push(MACRO_PDF417_TERMINATOR);
        let (info, consumed) = parse_macro_block(&codewords, 0);
        let info = info.unwrap();
        assert_eq!(info.index, 0);
        assert_eq!(info.id, None);
        assert_eq!(info.count, 1);
        assert_eq!(consumed, codewords.len());
    }

    #[test]
    fn macro_block_reads_file_id_as_padded_codeword_concatenation() {
        // Segment index "0" (2 codewords), then File ID "017053" as two zero-padded 3-digit
        // codeword chunks (17, 53), then no optional fields.
        let codewords = [0, 10, 17, 53];
        let (info, consumed) = parse_macro_block(&codewords, 0);
        let info = info.unwrap();
        assert_eq!(info.index, 0);
        assert_eq!(info.id.as_deref(), Some("017053"));
        assert_eq!(consumed, codewords.len());
    }

    // The following cases mirror the seed scenarios from the governing specification, each given
    // as the full codeword sequence including the leading symbol length descriptor (as a scanning
    // decoder would hand off after error correction); `decode` is called the way `lib::decode`
    // calls it, with that descriptor already stripped off.

    #[test]
    fn decodes_default_text_compaction_without_a_leading_mode_marker() {
        let codewords = [16, 453, 178, 121, 236, 858, 834, 361, 431, 426, 746, 828, 570, 393, 17, 119];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.text, "PDF417 Symbology Standard");
        assert_eq!(parsed.content_type, ContentType::Text);
    }

    #[test]
    fn decodes_default_text_compaction_with_lowercase_and_trailing_space() {
        let codewords = [15, 810, 32, 94, 156, 218, 280, 342, 404, 466, 528, 590, 652, 714, 776];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.text, "abcdefghijklmnopqrstuvwxyz ");
    }

    #[test]
    fn decodes_byte_compaction_latch_to_eleven_raw_bytes() {
        let codewords = [12, 901, 213, 598, 413, 118, 87, 127, 127, 127, 127, 127];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.raw_bytes, vec![0x7F; 11]);
        assert_eq!(parsed.content_type, ContentType::Binary);
    }

    #[test]
    fn decodes_numeric_compaction_to_a_long_digit_run() {
        let codewords = [17, 902, 49, 98, 103, 675, 30, 186, 631, 467, 409, 266, 246, 677, 536, 811, 223];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.text, "1234567890123456789012345678901234567890123");
    }

    #[test]
    fn eci_iso_8859_1_converts_subsequent_byte_compaction_into_latin1_text() {
        // 927 3 selects ECI 3 (ISO-8859-1); 901 then latches Byte Compaction for a single literal
        // byte 0xE9 ('é' in Latin-1), which is not a multiple of 6 so it stays a literal remainder.
        let codewords = [4, 927, 3, 901, 0xE9];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.text, "\u{e9}");
        assert_eq!(parsed.raw_bytes, vec![0xE9]);
    }

    #[test]
    fn eci_superseded_by_a_later_designator_only_affects_bytes_after_it() {
        // First segment decodes under no ECI (text stays empty for its single byte), a later ECI 3
        // switch then makes the second Byte Compaction segment render as Latin-1.
        let codewords = [5, 901, 0x41, 927, 3, 901, 0xE9];
        let parsed = decode(&codewords[1..]);
        assert_eq!(parsed.text, "\u{e9}");
        assert_eq!(parsed.raw_bytes, vec![0x41, 0xE9]);
    }

    #[test]
    fn decodes_macro_header_with_file_id_sender_addressee_and_segment_count() {
        let codewords = [20, 928, 111, 100, 17, 53, 923, 1, 111, 104, 923, 3, 64, 416, 34, 923, 4, 258, 446, 67];
        let parsed = decode(&codewords[1..]);
        let append = parsed.structured_append.expect("macro header should produce structured append info");
        assert_eq!(append.index, 0);
        assert_eq!(append.count, 4);
        assert_eq!(append.id.as_deref(), Some("017053"));
    }
}
