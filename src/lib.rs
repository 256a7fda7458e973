//! # PBO Parser
//!
//! A defensive parser and script extractor for PBO-style packed mod
//! archives.
//!
//! Given an arbitrary byte blob, this library recovers the embedded
//! script-like text files (by extension, default `.c`/`.cpp`) while
//! rejecting or skipping malformed, partially corrupt, or unsupported
//! entries without panicking or reading out of bounds. The output is an
//! ordered list of extracted file records plus structured diagnostics
//! for anything that had to be skipped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pbo_parser::extract::extract_archive;
//! use pbo_parser::error::Result;
//!
//! fn scan(data: &[u8]) -> Result<()> {
//!     let extraction = extract_archive(data)?;
//!
//!     for file in &extraction.files {
//!         println!("{} ({} bytes)", file.path, file.size);
//!     }
//!     for diag in &extraction.diagnostics {
//!         eprintln!("skipped {}: {}", diag.file_name, diag.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`binary`] - Low-level bounds-checked reads of little-endian data
//! - [`format`] - Packing-method constants and classification
//! - [`header`] - Header entry and property block readers
//! - [`archive`] - Entry table parsing
//! - [`decompress`] - The custom back-reference codec
//! - [`extract`] - Data-region walking and script extraction
//!
//! ## Format Reference
//!
//! An archive is a file table of variable-length header entries (each a
//! null-terminated name plus five little-endian u32 fields), terminated
//! by an empty-name boundary marker, followed by the concatenated data
//! blocks in table order. A "Vers"-marked first entry announces a
//! metadata property block of null-terminated string pairs between
//! itself and the real table.
//!
//! Parsing is a pure function over an immutable buffer: no internal
//! I/O, no shared state, safe to run on independent archives from
//! multiple threads. Callers should bound the archive size before
//! loading it into memory.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod binary;
pub mod decompress;
pub mod error;
pub mod extract;
pub mod format;
pub mod header;

// Re-export commonly used types at the crate root
pub use archive::Archive;
pub use decompress::decompress;
pub use error::{ParserError, Result};
pub use extract::{
    extract, extract_archive, DiagnosticKind, EntryDiagnostic, ExtractOptions, ExtractedFile,
    Extraction,
};
pub use format::{PackingMethod, PACKING_COMPRESSED, PACKING_PRODUCT, PACKING_RAW};
pub use header::{HeaderEntry, PropertyPair};
