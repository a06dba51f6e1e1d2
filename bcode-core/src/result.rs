// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types shared by every symbology decoder's public return value: the decoded content, its
//! classification, and the options a caller can pass in to influence decoding effort.

/// Caller-controlled knobs that influence how hard a decoder tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// When set, a decoder spends extra passes on ambiguous input: Data Matrix retries against
    /// the mirrored matrix on a non-checksum failure, PDF417 retries cells with ambiguous votes
    /// up to its retry cap. Leaving this unset favors speed over recall.
    pub try_harder: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions { try_harder: false }
    }
}

/// A coarse classification of the bytes a decode produced, mirroring the handful of content
/// shapes both symbologies can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Every byte decoded to printable text under the symbol's stated or inferred encoding.
    #[default]
    Text,
    /// The symbol carried an explicit Base256/byte-compaction segment, or bytes outside any
    /// printable range.
    Binary,
    /// The symbol mixed text segments with explicit binary segments.
    Mixed,
    /// The leading FNC1 marks this as a GS1 Application Identifier string.
    Gs1,
    /// The content is wrapped in an ISO/IEC 15434 envelope (Macro 05/06 or explicit `[)>`).
    Iso15434,
    /// An ECI designator selected a character set this implementation does not map to UTF-8.
    UnknownEci,
}

/// Structured Append placement for a symbol that is one part of a multi-symbol sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredAppendInfo {
    /// This symbol's 0-based position within the sequence.
    pub index: u8,
    /// The total number of symbols in the sequence.
    pub count: u8,
    /// An optional sequence identifier shared by every symbol in the group (PDF417 Macro only;
    /// Data Matrix Structured Append has no identifier field).
    pub id: Option<String>,
}

/// Identifies which symbology produced a [`DecoderResult`], for callers that decode through a
/// shared entry point and need to know which path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbologyIdentifier {
    DataMatrix,
    Pdf417,
}

/// The outcome of successfully decoding one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderResult {
    pub symbology: SymbologyIdentifier,
    /// The decoded text, after any ECI-directed character set conversion to UTF-8 (ISO-8859-1 and
    /// UTF-8 designators are converted; an unrecognized designator is reported via
    /// `ContentType::UnknownEci` instead of guessed at). For `ContentType::Binary` this is a lossy
    /// rendering; use `raw_bytes` for the exact payload.
    pub text: String,
    /// The raw decoded byte payload prior to any character-set interpretation.
    pub raw_bytes: Vec<u8>,
    pub content_type: ContentType,
    /// How many codewords the Reed-Solomon pass actually corrected.
    pub num_errors_corrected: usize,
    /// How many of those corrected positions were known erasures rather than detected errors.
    pub num_erasures_corrected: usize,
    pub structured_append: Option<StructuredAppendInfo>,
    /// True when the captured matrix had to be read mirrored (Data Matrix) to decode correctly.
    pub mirrored: bool,
}

impl DecoderResult {
    /// A result is considered valid once it exists: callers that just want a yes/no signal (for
    /// example, a batch scanner skipping a still image) can check this instead of matching on
    /// `Result<DecoderResult, Error>` themselves.
    pub fn is_valid(&self) -> bool {
        true
    }
}
