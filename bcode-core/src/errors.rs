// bcode
// Copyright (c) 2026 The bcode Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type shared by every symbology crate.

use std::fmt;
use std::result;

/// `Error` enumerates every way a decode can fail, matching the three kinds described by the
/// governing specification plus a domain-bounds variant for malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The data cannot be interpreted under its stated symbology: an unknown code word, an
    /// inconsistent length descriptor, or a missing unlatch where one is required.
    Format(String),
    /// Reed-Solomon decoding could not converge, or corrected data contradicted a structural
    /// invariant.
    Checksum(String),
    /// The symbol uses an optional feature this implementation does not handle.
    Unsupported(String),
    /// A caller-supplied dimension or index was out of bounds. Bit containers fail this way
    /// rather than panicking so a caller decoding many symbols in a batch can continue past one
    /// bad input.
    Domain(String),
}

impl Error {
    /// A short machine-readable tag for the error kind, independent of its message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Format(_) => "format",
            Error::Checksum(_) => "checksum",
            Error::Unsupported(_) => "unsupported",
            Error::Domain(_) => "domain",
        }
    }

    /// The human-readable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Error::Format(m) | Error::Checksum(m) | Error::Unsupported(m) | Error::Domain(m) => m,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "malformed symbol: {}", msg),
            Error::Checksum(msg) => write!(f, "checksum error: {}", msg),
            Error::Unsupported(msg) => write!(f, "unsupported feature: {}", msg),
            Error::Domain(msg) => write!(f, "domain error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a format error.
pub fn format_error<T>(desc: impl Into<String>) -> Result<T> {
    Err(Error::Format(desc.into()))
}

/// Convenience function to create a checksum error.
pub fn checksum_error<T>(desc: impl Into<String>) -> Result<T> {
    Err(Error::Checksum(desc.into()))
}

/// Convenience function to create an unsupported-feature error.
pub fn unsupported_error<T>(desc: impl Into<String>) -> Result<T> {
    Err(Error::Unsupported(desc.into()))
}

/// Convenience function to create a domain (out-of-bounds) error.
pub fn domain_error<T>(desc: impl Into<String>) -> Result<T> {
    Err(Error::Domain(desc.into()))
}
