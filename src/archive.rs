//! Entry table parsing for PBO archives.
//!
//! An archive is a file table followed by a data region:
//!
//! 1. Optionally, a first entry carrying the "Vers" product marker,
//!    immediately followed by a metadata property block.
//! 2. Zero or more content entries, one [`HeaderEntry`] each, in the
//!    order their data blocks appear in the data region.
//! 3. A boundary marker: one entry with an empty file name. It is not
//!    part of the table and carries no data block.
//! 4. The data region: each content entry's block, exactly `data_size`
//!    bytes, concatenated in table order.
//!
//! [`Archive::parse`] decodes steps 1-3 and records where step 4
//! begins. Parsing is a pure function over the immutable input buffer;
//! nothing is shared between calls, so independent archives can be
//! parsed concurrently.
//!
//! # Example
//!
//! ```
//! use pbo_parser::archive::Archive;
//!
//! // Empty table: just the boundary marker.
//! let data = [0u8; 21];
//! let archive = Archive::parse(&data).unwrap();
//! assert!(archive.entries.is_empty());
//! assert_eq!(archive.data_offset, 21);
//! ```

use serde::Serialize;

use crate::error::{ParserError, Result};
use crate::header::{read_property_block, HeaderEntry, PropertyPair, ENTRY_MIN_SIZE};

/// A parsed archive: the ordered file table, any metadata properties,
/// and the offset of the data region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    /// Content entries in on-disk order. The order is significant: data
    /// blocks appear in the data region in exactly this order.
    pub entries: Vec<HeaderEntry>,

    /// Metadata pairs from the property block, in on-disk order. Empty
    /// when the archive carries no product marker.
    pub properties: Vec<PropertyPair>,

    /// Byte offset of the data region, immediately after the boundary
    /// marker.
    pub data_offset: usize,
}

impl Archive {
    /// Parses the file table of an archive.
    ///
    /// Reads the first entry, consumes the property block when the
    /// entry is product-marked, then accumulates content entries until
    /// the boundary marker. The marker itself is not appended.
    ///
    /// # Errors
    ///
    /// - `ParserError::OutOfBounds` if the buffer ends inside an entry
    /// - `ParserError::MalformedArchive` if no boundary marker exists,
    ///   the property block never terminates, or the table would need
    ///   more entries than the buffer could possibly encode
    ///
    /// # Example
    ///
    /// ```
    /// use pbo_parser::archive::Archive;
    ///
    /// let mut data = b"init.c\x00".to_vec();
    /// for v in [0u32, 2, 0, 0, 2] {
    ///     data.extend_from_slice(&v.to_le_bytes());
    /// }
    /// data.extend_from_slice(&[0u8; 21]); // boundary marker
    /// data.extend_from_slice(b"hi");      // data region
    ///
    /// let archive = Archive::parse(&data).unwrap();
    /// assert_eq!(archive.entries.len(), 1);
    /// assert_eq!(archive.entries[0].file_name, "init.c");
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        // A pathological table cannot hold more entries than the buffer
        // can encode; each entry takes at least ENTRY_MIN_SIZE bytes.
        let max_entries = data.len() / ENTRY_MIN_SIZE + 1;

        let (first, mut offset) = HeaderEntry::read(data, 0)?;

        let mut entries = Vec::new();
        let mut properties = Vec::new();

        if first.is_product_marker() {
            let (pairs, next) = read_property_block(data, offset)?;
            properties = pairs;
            offset = next;
        } else if first.is_boundary() {
            // Empty table: the first entry is already the marker.
            return Ok(Archive {
                entries,
                properties,
                data_offset: offset,
            });
        } else {
            entries.push(first);
        }

        loop {
            if entries.len() >= max_entries {
                return Err(ParserError::malformed(format!(
                    "entry table exceeds {max_entries} entries for a {} byte buffer",
                    data.len()
                )));
            }

            let (entry, next) = HeaderEntry::read(data, offset).map_err(|err| match err {
                ParserError::OutOfBounds { .. } => {
                    ParserError::malformed("buffer exhausted before boundary marker")
                }
                other => other,
            })?;
            offset = next;

            if entry.is_boundary() {
                return Ok(Archive {
                    entries,
                    properties,
                    data_offset: offset,
                });
            }

            entries.push(entry);
        }
    }

    /// Returns the total declared size of the data region, saturating
    /// on overflow.
    #[must_use]
    pub fn declared_data_size(&self) -> usize {
        self.entries
            .iter()
            .fold(0usize, |acc, e| acc.saturating_add(e.data_size as usize))
    }

    /// Looks up a property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}
