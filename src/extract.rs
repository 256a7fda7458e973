//! Script extraction from parsed archives.
//!
//! The extractor walks the data region that follows the boundary
//! marker, in table order, keeping a running offset. Entries whose file
//! name matches the configured extension set are decoded (raw or
//! through the decompressor); everything else is skipped. The offset
//! advances by each entry's declared `data_size` whether the entry was
//! decoded, filtered out, or failed.
//!
//! One bad entry never aborts the archive: per-entry failures become
//! [`EntryDiagnostic`] records alongside the successful results, so the
//! caller sees a partial result plus structured warnings instead of a
//! hard error.
//!
//! # Example
//!
//! ```
//! use pbo_parser::extract::extract_archive;
//!
//! let mut data = b"test.c\x00".to_vec();
//! for v in [0u32, 5, 0, 0, 5] {
//!     data.extend_from_slice(&v.to_le_bytes());
//! }
//! data.extend_from_slice(&[0u8; 21]); // boundary marker
//! data.extend_from_slice(b"hello");
//!
//! let extraction = extract_archive(&data).unwrap();
//! assert_eq!(extraction.files.len(), 1);
//! assert_eq!(extraction.files[0].content, "hello");
//! ```

use serde::Serialize;

use crate::archive::Archive;
use crate::decompress::decompress;
use crate::error::{ParserError, Result};
use crate::format::PackingMethod;

/// One successfully decoded script file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFile {
    /// The archive-internal path, as encoded on disk.
    pub path: String,

    /// The final path segment of `path`.
    pub name: String,

    /// The decoded text content.
    pub content: String,

    /// Byte length of `content`.
    pub size: usize,
}

/// Why an entry produced no [`ExtractedFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The entry's packing method is none of the known constants.
    UnsupportedCodec,

    /// The packed data could not yield the declared original size.
    DecompressionFailed,

    /// The entry's declared data block crosses the end of the buffer.
    Truncated,
}

/// A structured warning for one skipped or failed entry.
///
/// Diagnostics replace interleaved logging: the parser stays free of
/// output side effects and the caller decides how to render them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDiagnostic {
    /// The file name of the affected entry.
    pub file_name: String,

    /// The failure category.
    pub kind: DiagnosticKind,

    /// Human-readable detail.
    pub message: String,
}

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// File extensions to include, compared case-insensitively and
    /// without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for ExtractOptions {
    /// Includes `.c` and `.cpp` script files.
    fn default() -> Self {
        ExtractOptions {
            extensions: vec!["c".to_string(), "cpp".to_string()],
        }
    }
}

impl ExtractOptions {
    /// Returns whether a file name's extension is in the inclusion set.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        let Some(ext) = file_name.rsplit('.').next().filter(|e| *e != file_name) else {
            return false;
        };
        self.extensions.iter().any(|inc| inc.eq_ignore_ascii_case(ext))
    }
}

/// The result of walking an archive's data region: decoded files plus
/// per-entry warnings, both in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Extraction {
    /// Successfully decoded entries.
    pub files: Vec<ExtractedFile>,

    /// Entries that were skipped or failed, with reasons.
    pub diagnostics: Vec<EntryDiagnostic>,
}

/// Walks the data region of a parsed archive and decodes matching
/// entries.
///
/// The running offset starts at `archive.data_offset` and advances by
/// `data_size` for every entry regardless of outcome, so one corrupt
/// entry cannot shift the blocks of those after it.
///
/// # Arguments
///
/// * `data` - The raw bytes of the whole archive
/// * `archive` - The parsed entry table
/// * `options` - Which extensions to decode
#[must_use]
pub fn extract(data: &[u8], archive: &Archive, options: &ExtractOptions) -> Extraction {
    let mut extraction = Extraction::default();
    let mut offset = archive.data_offset;

    for entry in &archive.entries {
        let data_size = entry.data_size as usize;
        let block_end = offset.checked_add(data_size).filter(|&e| e <= data.len());

        if options.matches(&entry.file_name) {
            match block_end {
                Some(end) => {
                    match decode_entry(&data[offset..end], entry) {
                        Ok(content) => extraction.files.push(ExtractedFile {
                            name: basename(&entry.file_name).to_string(),
                            path: entry.file_name.clone(),
                            size: content.len(),
                            content,
                        }),
                        Err(err) => extraction.diagnostics.push(diagnostic(entry, &err)),
                    }
                }
                None => {
                    let err = ParserError::out_of_bounds(
                        offset.saturating_add(data_size),
                        data.len(),
                    );
                    extraction.diagnostics.push(diagnostic(entry, &err));
                }
            }
        }

        offset = offset.saturating_add(data_size);
    }

    extraction
}

/// Parses and extracts an archive in one call with default options.
///
/// # Errors
///
/// Returns the fatal errors of [`Archive::parse`]; per-entry failures
/// surface only as diagnostics on the returned [`Extraction`].
pub fn extract_archive(data: &[u8]) -> Result<Extraction> {
    let archive = Archive::parse(data)?;
    Ok(extract(data, &archive, &ExtractOptions::default()))
}

/// Decodes one entry's data block according to its packing method.
fn decode_entry(block: &[u8], entry: &crate::header::HeaderEntry) -> Result<String> {
    match entry.method() {
        PackingMethod::Raw => Ok(String::from_utf8_lossy(block).into_owned()),
        PackingMethod::Compressed => {
            let expanded = decompress(block, entry.original_size as usize)?;
            Ok(String::from_utf8_lossy(&expanded).into_owned())
        }
        PackingMethod::Product | PackingMethod::Unknown(_) => {
            Err(ParserError::UnsupportedCodec {
                method: entry.packing_method,
            })
        }
    }
}

/// Returns the final path segment of an archive-internal path.
///
/// Archive paths use backslashes, but forward slashes occur in the
/// wild; both are treated as separators.
fn basename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Maps a per-entry error to its diagnostic record.
fn diagnostic(entry: &crate::header::HeaderEntry, err: &ParserError) -> EntryDiagnostic {
    let kind = match err {
        ParserError::UnsupportedCodec { .. } => DiagnosticKind::UnsupportedCodec,
        ParserError::DecompressionError { .. } => DiagnosticKind::DecompressionFailed,
        _ => DiagnosticKind::Truncated,
    };
    EntryDiagnostic {
        file_name: entry.file_name.clone(),
        kind,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{PACKING_COMPRESSED, PACKING_RAW};
    use crate::header::HeaderEntry;

    fn entry(name: &str, method: u32, original: u32, data_size: u32) -> HeaderEntry {
        HeaderEntry {
            file_name: name.to_string(),
            packing_method: method,
            original_size: original,
            reserved: 0,
            time_stamp: 0,
            data_size,
        }
    }

    fn archive_with(entries: Vec<HeaderEntry>, data_offset: usize) -> Archive {
        Archive {
            entries,
            properties: Vec::new(),
            data_offset,
        }
    }

    // ========================
    // ExtractOptions tests
    // ========================

    #[test]
    fn test_options_default_extensions() {
        let options = ExtractOptions::default();
        assert!(options.matches("init.c"));
        assert!(options.matches("config.cpp"));
        assert!(options.matches("A\\B\\FILE.CPP"));
        assert!(options.matches("weird.C"));
        assert!(!options.matches("mission.sqf"));
        assert!(!options.matches("texture.paa"));
    }

    #[test]
    fn test_options_no_extension() {
        let options = ExtractOptions::default();
        assert!(!options.matches("README"));
        assert!(!options.matches(""));
    }

    #[test]
    fn test_options_custom_extensions() {
        let options = ExtractOptions {
            extensions: vec!["sqf".to_string()],
        };
        assert!(options.matches("fn_main.sqf"));
        assert!(!options.matches("config.cpp"));
    }

    // ========================
    // basename tests
    // ========================

    #[test]
    fn test_basename() {
        assert_eq!(basename("scripts\\ai\\patrol.c"), "patrol.c");
        assert_eq!(basename("flat.cpp"), "flat.cpp");
        assert_eq!(basename("mixed/slash\\style.c"), "style.c");
    }

    // ========================
    // extract tests
    // ========================

    #[test]
    fn test_extract_raw_entry() {
        let data = b"hello";
        let archive = archive_with(vec![entry("test.c", PACKING_RAW, 5, 5)], 0);

        let result = extract(data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "test.c");
        assert_eq!(result.files[0].name, "test.c");
        assert_eq!(result.files[0].content, "hello");
        assert_eq!(result.files[0].size, 5);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_extract_skips_unmatched_extension_without_decoding() {
        // The .paa entry's block is garbage, but it must only be
        // skipped over, never decoded.
        let mut data = vec![0xFF; 4];
        data.extend_from_slice(b"text");
        let archive = archive_with(
            vec![
                entry("img.paa", PACKING_RAW, 4, 4),
                entry("ok.c", PACKING_RAW, 4, 4),
            ],
            0,
        );

        let result = extract(&data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].content, "text");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_extract_offset_advances_for_every_entry() {
        // Three blocks of known sizes; the middle one is filtered out.
        let data = b"aaBBBcc";
        let archive = archive_with(
            vec![
                entry("one.c", PACKING_RAW, 2, 2),
                entry("skip.bin", PACKING_RAW, 3, 3),
                entry("two.c", PACKING_RAW, 2, 2),
            ],
            0,
        );

        let result = extract(data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].content, "aa");
        assert_eq!(result.files[1].content, "cc");
    }

    #[test]
    fn test_extract_compressed_entry() {
        // 'a' literal plus distance-1 length-5 back-reference.
        let packed = [0x01u8, b'a', 0x01, 0x02];
        let archive = archive_with(
            vec![entry("run.c", PACKING_COMPRESSED, 6, packed.len() as u32)],
            0,
        );

        let result = extract(&packed, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].content, "aaaaaa");
        assert_eq!(result.files[0].size, 6);
    }

    #[test]
    fn test_extract_decompression_failure_is_per_entry() {
        // First block is truncated packed data, second is fine.
        let mut data = vec![0xFFu8, b'x']; // claims 8 literals, has 1
        data.extend_from_slice(b"good");
        let archive = archive_with(
            vec![
                entry("bad.c", PACKING_COMPRESSED, 10, 2),
                entry("good.c", PACKING_RAW, 4, 4),
            ],
            0,
        );

        let result = extract(&data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "good.c");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].file_name, "bad.c");
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::DecompressionFailed);
    }

    #[test]
    fn test_extract_unsupported_codec_diagnostic() {
        let encrypted = u32::from_be_bytes(*b"Encr");
        let data = b"????rest";
        let archive = archive_with(
            vec![
                entry("locked.c", encrypted, 4, 4),
                entry("open.c", PACKING_RAW, 4, 4),
            ],
            0,
        );

        let result = extract(data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].content, "rest");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnsupportedCodec);
        assert!(result.diagnostics[0].message.contains("0x"));
    }

    #[test]
    fn test_extract_unsupported_codec_still_advances_offset() {
        let encrypted = u32::from_be_bytes(*b"Encr");
        let data = b"\x01\x02\x03next.c-content";
        let archive = archive_with(
            vec![
                entry("locked.c", encrypted, 3, 3),
                entry("next.c", PACKING_RAW, 14, 14),
            ],
            0,
        );

        let result = extract(data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].content, "next.c-content");
    }

    #[test]
    fn test_extract_truncated_block_diagnostic() {
        // Declared 100 bytes, buffer holds 5.
        let data = b"short";
        let archive = archive_with(vec![entry("big.c", PACKING_RAW, 100, 100)], 0);

        let result = extract(data, &archive, &ExtractOptions::default());
        assert!(result.files.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Truncated);
    }

    #[test]
    fn test_extract_filtered_entries_produce_no_diagnostics() {
        // A truncated block that the filter skips is not reported; only
        // matched entries get diagnostics.
        let data = b"";
        let archive = archive_with(vec![entry("huge.paa", PACKING_RAW, 100, 100)], 0);

        let result = extract(data, &archive, &ExtractOptions::default());
        assert!(result.files.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_extract_basename_from_nested_path() {
        let data = b"x";
        let archive = archive_with(
            vec![entry("addons\\core\\fn_start.c", PACKING_RAW, 1, 1)],
            0,
        );

        let result = extract(data, &archive, &ExtractOptions::default());
        assert_eq!(result.files[0].path, "addons\\core\\fn_start.c");
        assert_eq!(result.files[0].name, "fn_start.c");
    }

    #[test]
    fn test_extract_lossy_content_decode() {
        // 0xA9 is a Windows-1252 copyright sign; decode must not fail.
        let data = [b'/', b'/', 0xA9, b'\n'];
        let archive = archive_with(vec![entry("note.c", PACKING_RAW, 4, 4)], 0);

        let result = extract(&data, &archive, &ExtractOptions::default());
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].content.contains('\u{FFFD}'));
        assert_eq!(result.files[0].size, result.files[0].content.len());
    }
}
