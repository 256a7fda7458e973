//! The archive's byte-oriented back-reference decompressor.
//!
//! "Cprs"-packed data blocks expand through a custom LZ-style scheme.
//! The input is processed in rounds: each round starts with one control
//! byte whose bits are consumed low-to-high, one per sub-operation, up
//! to eight per round.
//!
//! - A **set** bit copies one literal byte from input to output.
//! - A **clear** bit reads a 2-byte little-endian pointer encoding a
//!   backward distance and a copy length:
//!   - `distance = (pointer & 0x00FF) + ((pointer & 0xF000) >> 4)`
//!   - `length = ((pointer & 0x0F00) >> 8) + 3`
//!
//!   The copy source starts `distance` bytes behind the write position
//!   and proceeds byte-by-byte, so it may overlap bytes written by the
//!   same operation. A source position before the start of the output
//!   emits a `0x20` space for each negative step; real copying resumes
//!   once the position reaches zero.
//!
//! Expansion stops when the output reaches the declared original size;
//! anything short of exactly that size is a [`DecompressionError`].
//!
//! The negative-position padding interacting with same-operation
//! copying is a compatibility requirement of the format, not something
//! derived from first principles. The loop is kept literal, one byte
//! per step, so its behavior can be compared against reference output.
//!
//! [`DecompressionError`]: crate::error::ParserError::DecompressionError
//!
//! # Example
//!
//! ```
//! use pbo_parser::decompress::decompress;
//!
//! // One literal 'a', then a distance-1 length-5 back-reference.
//! let packed = [0x01, b'a', 0x01, 0x02];
//! let out = decompress(&packed, 6).unwrap();
//! assert_eq!(out, b"aaaaaa");
//! ```

use crate::error::{ParserError, Result};

/// Byte emitted for the negative-reach portion of a back-reference.
const PAD_BYTE: u8 = 0x20;

/// Expands a compressed data block to exactly `original_size` bytes.
///
/// # Arguments
///
/// * `input` - The compressed bytes of one entry's data block
/// * `original_size` - The entry's declared decompressed size
///
/// # Errors
///
/// Returns `ParserError::DecompressionError` if the input ends before
/// the output is complete, or if a back-reference points at or past
/// the current write position (unwritten data).
///
/// # Guarantees
///
/// Never writes more than `original_size` bytes and never reads past
/// the end of `input`. Surplus input after the output is complete is
/// ignored.
pub fn decompress(input: &[u8], original_size: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(original_size);
    let mut pos = 0;

    while output.len() < original_size && pos < input.len() {
        let control = input[pos];
        pos += 1;

        for bit in 0..8 {
            if output.len() >= original_size || pos >= input.len() {
                break;
            }

            if control & (1 << bit) != 0 {
                output.push(input[pos]);
                pos += 1;
                continue;
            }

            if pos + 2 > input.len() {
                // Pointer cut off by the end of input; the size check
                // below reports the shortfall.
                pos = input.len();
                break;
            }
            let pointer = usize::from(u16::from_le_bytes([input[pos], input[pos + 1]]));
            pos += 2;

            let distance = (pointer & 0x00FF) + ((pointer & 0xF000) >> 4);
            let mut length = ((pointer & 0x0F00) >> 8) + 3;
            let mut source = output.len() as i64 - distance as i64;

            while length > 0 && output.len() < original_size {
                let byte = if source < 0 {
                    PAD_BYTE
                } else {
                    // A sane packer never references the write position
                    // itself or beyond it.
                    let index = usize::try_from(source).unwrap_or(usize::MAX);
                    if index >= output.len() {
                        return Err(ParserError::decompression(format!(
                            "back-reference source {index} at or past write position {}",
                            output.len()
                        )));
                    }
                    output[index]
                };
                output.push(byte);
                source += 1;
                length -= 1;
            }
        }
    }

    if output.len() != original_size {
        return Err(ParserError::decompression(format!(
            "input exhausted after {} of {original_size} output bytes",
            output.len()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs `data` as all-literal rounds (every control bit set).
    fn pack_literals(data: &[u8]) -> Vec<u8> {
        let mut packed = Vec::new();
        for chunk in data.chunks(8) {
            packed.push(0xFF);
            packed.extend_from_slice(chunk);
        }
        packed
    }

    /// Encodes a back-reference pointer for the given distance and
    /// length (3..=18).
    fn pointer(distance: usize, length: usize) -> [u8; 2] {
        assert!(distance <= 0x0FFF);
        assert!((3..=18).contains(&length));
        let p = (distance & 0xFF) | ((distance & 0xF00) << 4) | ((length - 3) << 8);
        (p as u16).to_le_bytes()
    }

    #[test]
    fn test_pointer_helper_round_trip() {
        let [lo, hi] = pointer(0x1AB, 7);
        let p = usize::from(u16::from_le_bytes([lo, hi]));
        assert_eq!((p & 0x00FF) + ((p & 0xF000) >> 4), 0x1AB);
        assert_eq!(((p & 0x0F00) >> 8) + 3, 7);
    }

    #[test]
    fn test_all_literal_identity() {
        let text = b"if (alive player) then { hint \"ok\"; };";
        let packed = pack_literals(text);

        let out = decompress(&packed, text.len()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_all_literal_identity_exact_multiple_of_eight() {
        let text = b"12345678";
        let packed = pack_literals(text);

        let out = decompress(&packed, 8).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_back_reference_run() {
        // 'a' then distance-1 length-5: classic RLE via self-overlap.
        let mut packed = vec![0x01, b'a'];
        packed.extend_from_slice(&pointer(1, 5));

        let out = decompress(&packed, 6).unwrap();
        assert_eq!(out, b"aaaaaa");
    }

    #[test]
    fn test_back_reference_copies_earlier_output() {
        // "abc" literal, then distance-3 length-3 copies it again.
        let mut packed = vec![0x07, b'a', b'b', b'c'];
        packed.extend_from_slice(&pointer(3, 3));

        let out = decompress(&packed, 6).unwrap();
        assert_eq!(out, b"abcabc");
    }

    #[test]
    fn test_negative_reach_pads_spaces() {
        // Back-reference into the void before the output: all pads.
        let mut packed = vec![0x00];
        packed.extend_from_slice(&pointer(5, 3));

        let out = decompress(&packed, 3).unwrap();
        assert_eq!(out, b"   ");
    }

    #[test]
    fn test_negative_reach_partial_then_copy() {
        // 'X' literal, then distance-2 length-3: one pad, then copying
        // resumes from output position 0.
        let mut packed = vec![0x01, b'X'];
        packed.extend_from_slice(&pointer(2, 3));

        let out = decompress(&packed, 4).unwrap();
        assert_eq!(out, b"X X ");
    }

    #[test]
    fn test_pad_count_matches_negative_reach() {
        // 2 literals, distance 6, length 6: exactly 4 pads then the
        // two literals copied back.
        let mut packed = vec![0x03, b'h', b'i'];
        packed.extend_from_slice(&pointer(6, 6));

        let out = decompress(&packed, 8).unwrap();
        assert_eq!(out, b"hi    hi");
    }

    #[test]
    fn test_output_never_exceeds_original_size() {
        // Length-18 back-reference against a 4-byte budget.
        let mut packed = vec![0x01, b'q'];
        packed.extend_from_slice(&pointer(1, 18));

        let out = decompress(&packed, 4).unwrap();
        assert_eq!(out, b"qqqq");
    }

    #[test]
    fn test_surplus_input_ignored() {
        let mut packed = pack_literals(b"done");
        packed.extend_from_slice(&[0xFF, 1, 2, 3, 4, 5, 6, 7, 8]);

        let out = decompress(&packed, 4).unwrap();
        assert_eq!(out, b"done");
    }

    #[test]
    fn test_truncated_input_fails() {
        // Declares 10 output bytes but only 2 literals exist.
        let packed = [0xFF, b'a', b'b'];
        let result = decompress(&packed, 10);
        assert!(matches!(
            result,
            Err(ParserError::DecompressionError { .. })
        ));
    }

    #[test]
    fn test_truncated_pointer_fails() {
        // A clear bit with only one byte left for the pointer.
        let packed = [0x00, 0x05];
        let result = decompress(&packed, 3);
        assert!(matches!(
            result,
            Err(ParserError::DecompressionError { .. })
        ));
    }

    #[test]
    fn test_empty_input_nonzero_size_fails() {
        let result = decompress(&[], 1);
        assert!(matches!(
            result,
            Err(ParserError::DecompressionError { .. })
        ));
    }

    #[test]
    fn test_zero_original_size() {
        assert_eq!(decompress(&[], 0).unwrap(), Vec::<u8>::new());
        assert_eq!(decompress(&[0xFF, b'x'], 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_zero_distance_is_corrupt() {
        let mut packed = vec![0x01, b'a'];
        packed.extend_from_slice(&pointer(0, 3));

        let result = decompress(&packed, 4);
        assert!(matches!(
            result,
            Err(ParserError::DecompressionError { .. })
        ));
    }

    #[test]
    fn test_multi_round_mixed_operations() {
        // Round 1: 8 literals. Round 2: back-reference to the start,
        // then two more literals.
        let mut packed = pack_literals(b"settings");
        packed.push(0b0000_0110); // bit0 clear (back-ref), bits 1-2 literals
        packed.extend_from_slice(&pointer(8, 3));
        packed.extend_from_slice(b"!?");

        let out = decompress(&packed, 13).unwrap();
        assert_eq!(out, b"settingsset!?");
    }
}
