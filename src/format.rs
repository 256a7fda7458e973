//! Packing-method constants and classification for PBO archives.
//!
//! Every entry in the file table declares how its data block is stored.
//! Three methods are documented for this container:
//!
//! - **Raw** (`0x00000000`): the data block is the file content verbatim.
//! - **Compressed** (`0x43707273`, ASCII "Cprs"): the data block is
//!   packed with the archive's byte-oriented back-reference codec.
//! - **Product marker** (`0x56657273`, ASCII "Vers"): only valid on the
//!   first table entry; flags that a metadata property block follows.
//!   Carries no data block of its own.
//!
//! Anything else is an unsupported historical variant and causes the
//! affected entry to be skipped with a diagnostic.
//!
//! # Example
//!
//! ```
//! use pbo_parser::format::PackingMethod;
//!
//! assert_eq!(PackingMethod::from_u32(0), PackingMethod::Raw);
//! assert_eq!(PackingMethod::from_u32(0x4370_7273), PackingMethod::Compressed);
//! assert!(matches!(
//!     PackingMethod::from_u32(0xDEAD_BEEF),
//!     PackingMethod::Unknown(0xDEAD_BEEF)
//! ));
//! ```

/// Packing method for raw (uncompressed) data blocks.
pub const PACKING_RAW: u32 = 0x0000_0000;

/// Packing method for compressed data blocks (ASCII "Cprs").
pub const PACKING_COMPRESSED: u32 = 0x4370_7273;

/// Packing method of the product/signature marker entry (ASCII "Vers").
pub const PACKING_PRODUCT: u32 = 0x5665_7273;

/// Classified packing method of a file-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingMethod {
    /// Raw storage: the data block is copied through unchanged.
    Raw,

    /// "Cprs" compression: the data block expands through the
    /// back-reference codec in [`crate::decompress`].
    Compressed,

    /// "Vers" product marker: metadata only, no data block. Meaningful
    /// only on the first table entry.
    Product,

    /// An unrecognized packing method. The wrapped value is the raw
    /// on-disk constant.
    Unknown(u32),
}

impl PackingMethod {
    /// Classifies a raw packing-method value from a header entry.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        match value {
            PACKING_RAW => PackingMethod::Raw,
            PACKING_COMPRESSED => PackingMethod::Compressed,
            PACKING_PRODUCT => PackingMethod::Product,
            other => PackingMethod::Unknown(other),
        }
    }

    /// Returns the on-disk constant for this method.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        match self {
            PackingMethod::Raw => PACKING_RAW,
            PackingMethod::Compressed => PACKING_COMPRESSED,
            PackingMethod::Product => PACKING_PRODUCT,
            PackingMethod::Unknown(v) => *v,
        }
    }

    /// Returns whether the extractor can decode data stored this way.
    ///
    /// The product marker is not extractable: it carries no data block.
    #[must_use]
    pub const fn is_extractable(&self) -> bool {
        matches!(self, PackingMethod::Raw | PackingMethod::Compressed)
    }
}

impl std::fmt::Display for PackingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackingMethod::Raw => write!(f, "raw"),
            PackingMethod::Compressed => write!(f, "Cprs"),
            PackingMethod::Product => write!(f, "Vers"),
            PackingMethod::Unknown(v) => write!(f, "unknown (0x{v:08X})"),
        }
    }
}
