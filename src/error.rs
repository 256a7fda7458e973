//! Error types for the PBO archive parser.
//!
//! This module defines the error hierarchy for all failure cases during
//! archive parsing: truncated buffers, structural corruption, codec
//! failures, and unsupported packing methods.
//!
//! Errors fall into two severity classes:
//!
//! - **Fatal to the archive**: [`ParserError::OutOfBounds`] and
//!   [`ParserError::MalformedArchive`] abort the whole parse, since the
//!   entry table itself cannot be trusted.
//! - **Fatal to one entry**: [`ParserError::DecompressionError`] and
//!   [`ParserError::UnsupportedCodec`] are caught by the extractor and
//!   surfaced as per-entry diagnostics; the remaining entries are still
//!   processed.

use thiserror::Error;

/// The main error type for PBO archive parsing operations.
///
/// # Example
///
/// ```
/// use pbo_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::MalformedArchive {
///         reason: "missing boundary marker".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading an archive file.
    ///
    /// The parsing core never performs I/O itself; this variant exists so
    /// callers that load archives from disk can propagate failures with
    /// the `?` operator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read would cross the end of the buffer.
    ///
    /// This indicates a truncated or corrupt archive and is fatal to the
    /// whole parse when raised while decoding the entry table.
    #[error("Out of bounds: expected {expected} bytes, but only {available} available")]
    OutOfBounds {
        /// The number of bytes that were needed.
        expected: usize,
        /// The number of bytes actually available.
        available: usize,
    },

    /// The archive structure is inconsistent.
    ///
    /// Raised when the entry table has no boundary marker, a property
    /// block never terminates, or the table would require more entries
    /// than the buffer could possibly encode.
    #[error("Malformed archive: {reason}")]
    MalformedArchive {
        /// A description of the structural inconsistency.
        reason: String,
    },

    /// An entry's packed data could not be expanded.
    ///
    /// Raised when the compressed byte stream cannot yield exactly the
    /// declared original size. Fatal to that entry only.
    #[error("Decompression failed: {reason}")]
    DecompressionError {
        /// A description of the decompression failure.
        reason: String,
    },

    /// An entry uses a packing method this parser does not support.
    ///
    /// Only raw storage (`0x00000000`), "Cprs" compression
    /// (`0x43707273`), and the "Vers" product marker (`0x56657273`) are
    /// recognized. Fatal to that entry only.
    #[error("Unsupported packing method: 0x{method:08X}")]
    UnsupportedCodec {
        /// The unrecognized packing method value.
        method: u32,
    },
}

impl ParserError {
    /// Creates an `OutOfBounds` error with the given sizes.
    ///
    /// # Arguments
    ///
    /// * `expected` - The number of bytes that were needed
    /// * `available` - The number of bytes actually available
    #[must_use]
    pub fn out_of_bounds(expected: usize, available: usize) -> Self {
        ParserError::OutOfBounds {
            expected,
            available,
        }
    }

    /// Creates a `MalformedArchive` error with the given reason.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        ParserError::MalformedArchive {
            reason: reason.into(),
        }
    }

    /// Creates a `DecompressionError` with the given reason.
    #[must_use]
    pub fn decompression(reason: impl Into<String>) -> Self {
        ParserError::DecompressionError {
            reason: reason.into(),
        }
    }

    /// Returns whether this error is fatal to the whole archive.
    ///
    /// Per-entry failures (`DecompressionError`, `UnsupportedCodec`) are
    /// not fatal; the extractor reports them as diagnostics and keeps
    /// going.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ParserError::Io(_)
                | ParserError::OutOfBounds { .. }
                | ParserError::MalformedArchive { .. }
        )
    }
}

/// A specialized Result type for PBO parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;
