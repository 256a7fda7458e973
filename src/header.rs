//! Header entry and property block readers for PBO archives.
//!
//! The archive opens with a file table of variable-length header
//! entries, one per embedded file, terminated by a boundary marker (an
//! entry with an empty file name).
//!
//! # Entry Layout
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | `file_name` | variable | Null-terminated path, backslash separated |
//! | `packing_method` | 4 | Storage method (see [`crate::format`]) |
//! | `original_size` | 4 | Size after decompression |
//! | `reserved` | 4 | Unused by this parser |
//! | `time_stamp` | 4 | Unix timestamp of the packed file |
//! | `data_size` | 4 | Size of the entry's data block |
//!
//! All integers are little-endian.
//!
//! # Property Block
//!
//! When the very first entry carries the "Vers" product marker, a
//! metadata block of null-terminated `(name, value)` string pairs
//! follows it, terminated by an empty name (which has no paired value).
//! The block occupies the byte range between the marker entry and the
//! real file table; it is never file data.

use serde::Serialize;

use crate::binary::{read_cstring, read_u32_le};
use crate::error::{ParserError, Result};
use crate::format::{PackingMethod, PACKING_PRODUCT};

/// Size of the fixed-layout portion of a header entry (five u32s).
pub const ENTRY_FIXED_SIZE: usize = 20;

/// Smallest encodable header entry: an empty name's terminator plus the
/// fixed fields. Used to bound the entry count on hostile input.
pub const ENTRY_MIN_SIZE: usize = ENTRY_FIXED_SIZE + 1;

/// One slot of the archive's file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    /// The archive-internal path of the file, as encoded on disk.
    pub file_name: String,

    /// The raw packing-method value.
    pub packing_method: u32,

    /// The declared size of the file after decompression. For raw
    /// entries this commonly equals `data_size` or is zero.
    pub original_size: u32,

    /// Reserved field, carried through unchanged.
    pub reserved: u32,

    /// Timestamp of the packed file (seconds, Unix epoch).
    pub time_stamp: u32,

    /// The exact size of this entry's data block in the data region.
    pub data_size: u32,
}

impl HeaderEntry {
    /// Reads one header entry at the given offset.
    ///
    /// # Returns
    ///
    /// The populated entry and the offset immediately following it.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::OutOfBounds` if the buffer ends inside the
    /// entry.
    ///
    /// # Example
    ///
    /// ```
    /// use pbo_parser::header::HeaderEntry;
    ///
    /// let mut data = b"test.c\x00".to_vec();
    /// for v in [0u32, 5, 0, 0, 5] {
    ///     data.extend_from_slice(&v.to_le_bytes());
    /// }
    ///
    /// let (entry, next) = HeaderEntry::read(&data, 0).unwrap();
    /// assert_eq!(entry.file_name, "test.c");
    /// assert_eq!(entry.data_size, 5);
    /// assert_eq!(next, data.len());
    /// ```
    pub fn read(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (file_name, offset) = read_cstring(data, offset)?;
        let (packing_method, offset) = read_u32_le(data, offset)?;
        let (original_size, offset) = read_u32_le(data, offset)?;
        let (reserved, offset) = read_u32_le(data, offset)?;
        let (time_stamp, offset) = read_u32_le(data, offset)?;
        let (data_size, offset) = read_u32_le(data, offset)?;

        Ok((
            HeaderEntry {
                file_name,
                packing_method,
                original_size,
                reserved,
                time_stamp,
                data_size,
            },
            offset,
        ))
    }

    /// Returns the classified packing method of this entry.
    #[must_use]
    pub fn method(&self) -> PackingMethod {
        PackingMethod::from_u32(self.packing_method)
    }

    /// Returns whether this entry is the table's boundary marker.
    ///
    /// The marker is the single entry with an empty file name that
    /// terminates the table; it carries no data block.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.file_name.is_empty()
    }

    /// Returns whether this entry is the "Vers" product marker.
    ///
    /// Only meaningful on the first table entry, where it announces a
    /// property block.
    #[must_use]
    pub fn is_product_marker(&self) -> bool {
        self.packing_method == PACKING_PRODUCT
    }
}

/// One metadata pair from a product-marked archive's property block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyPair {
    /// Property name, e.g. `prefix` or `version`.
    pub name: String,
    /// Property value.
    pub value: String,
}

/// Reads the property block following a product-marker entry.
///
/// Pairs are accumulated until an empty name terminates the block; the
/// empty name has no paired value. No artificial pair-count bound is
/// imposed: a block that runs off the buffer end before terminating is
/// structural corruption.
///
/// # Returns
///
/// The accumulated pairs and the offset immediately following the
/// block's terminator.
///
/// # Errors
///
/// Returns `ParserError::MalformedArchive` if the buffer is exhausted
/// before the terminating empty name (runaway property block).
pub fn read_property_block(data: &[u8], offset: usize) -> Result<(Vec<PropertyPair>, usize)> {
    let mut pairs = Vec::new();
    let mut offset = offset;

    loop {
        let (name, next) = read_cstring(data, offset).map_err(runaway)?;
        offset = next;

        if name.is_empty() {
            return Ok((pairs, offset));
        }

        let (value, next) = read_cstring(data, offset).map_err(runaway)?;
        offset = next;
        pairs.push(PropertyPair { name, value });
    }
}

fn runaway(err: ParserError) -> ParserError {
    match err {
        ParserError::OutOfBounds { .. } => {
            ParserError::malformed("property block not terminated before end of buffer")
        }
        other => other,
    }
}
