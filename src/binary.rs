//! Binary reading utilities for parsing PBO archive buffers.
//!
//! This module provides the byte cursor used by every other parsing
//! layer: bounds-checked reads of little-endian 32-bit integers and
//! null-terminated strings over an immutable byte buffer. The offset is
//! threaded explicitly by the caller; each function returns the value
//! together with the offset immediately following it.
//!
//! # Endianness
//!
//! All multi-byte integers in the archive format are little-endian. The
//! functions here handle the conversion automatically.
//!
//! # Example
//!
//! ```
//! use pbo_parser::binary::{read_u32_le, read_cstring};
//!
//! let data = [b'H', b'i', 0x00, 0x26, 0x89, 0x01, 0x00];
//!
//! let (name, offset) = read_cstring(&data, 0).unwrap();
//! assert_eq!(name, "Hi");
//! assert_eq!(offset, 3);
//!
//! let (value, offset) = read_u32_le(&data, offset).unwrap();
//! assert_eq!(value, 0x0001_8926);
//! assert_eq!(offset, 7);
//! ```

use crate::error::{ParserError, Result};

/// Reads a little-endian u32 from the buffer at the given offset.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - The byte offset where the u32 starts
///
/// # Returns
///
/// The decoded value and the offset immediately following it.
///
/// # Errors
///
/// Returns `ParserError::OutOfBounds` if the buffer doesn't contain at
/// least 4 bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use pbo_parser::binary::read_u32_le;
///
/// let data = [0x78, 0x56, 0x34, 0x12];
/// let (value, next) = read_u32_le(&data, 0).unwrap();
/// assert_eq!(value, 0x1234_5678);
/// assert_eq!(next, 4);
/// ```
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<(u32, usize)> {
    const SIZE: usize = 4;

    let end = offset.checked_add(SIZE).filter(|&e| e <= data.len());
    let Some(end) = end else {
        return Err(ParserError::out_of_bounds(
            offset.saturating_add(SIZE),
            data.len(),
        ));
    };

    let slice = &data[offset..end];
    let value = u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]);
    Ok((value, end))
}

/// Reads a null-terminated string from the buffer at the given offset.
///
/// Bytes are scanned until a zero byte or the buffer end, whichever
/// comes first. The terminator is consumed but not included in the
/// returned string. An unterminated tail (no zero byte before buffer
/// end) is returned as-is; the next read at buffer end then reports
/// `OutOfBounds`, which is how runaway structures are detected.
///
/// The bytes decode with `String::from_utf8_lossy` so a hostile or
/// legacy-encoded name cannot abort the whole parse.
///
/// # Errors
///
/// Returns `ParserError::OutOfBounds` if `offset` is at or past the
/// buffer end.
///
/// # Example
///
/// ```
/// use pbo_parser::binary::read_cstring;
///
/// let data = b"test.c\x00rest";
/// let (name, next) = read_cstring(data, 0).unwrap();
/// assert_eq!(name, "test.c");
/// assert_eq!(next, 7);
/// ```
pub fn read_cstring(data: &[u8], offset: usize) -> Result<(String, usize)> {
    if offset >= data.len() {
        return Err(ParserError::out_of_bounds(offset + 1, data.len()));
    }

    let tail = &data[offset..];
    match tail.iter().position(|&b| b == 0) {
        Some(len) => {
            let value = String::from_utf8_lossy(&tail[..len]).into_owned();
            Ok((value, offset + len + 1))
        }
        None => {
            // No terminator before buffer end; consume everything.
            let value = String::from_utf8_lossy(tail).into_owned();
            Ok((value, data.len()))
        }
    }
}
