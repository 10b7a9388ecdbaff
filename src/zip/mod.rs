//! Stored-mode ZIP archive writing and reading.
//!
//! ## Architecture
//!
//! - [`crc32`]: the CRC-32 checksum stored with every entry
//! - [`structures`]: binary records (local header, central directory header, EOCD)
//! - [`writer`]: the archive encoder, [`encode`]
//! - [`builder`]: folder/file facade over the encoder
//! - [`parser`] and [`extractor`]: read archives back and check them
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and raw data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! All integers are little-endian. Entries are written with method 0
//! (stored), version 2.0 and zeroed DOS timestamps.
//!
//! ## Limitations
//!
//! - No compression, no encryption
//! - No ZIP64: names up to 65535 bytes, entries and offsets below 4 GiB,
//!   at most 65535 entries
//! - Single-disk archives only

mod builder;
mod crc32;
mod error;
mod extractor;
mod parser;
mod structures;
mod writer;

pub use builder::{ArchiveBuilder, Folder};
pub use crc32::crc32;
pub use error::{EncodeError, EncodeResult};
pub use extractor::{VerifyReport, ZipExtractor};
pub use parser::ZipParser;
pub use structures::*;
pub use writer::{ArchiveEntry, encode, encoded_len};

/// Media type of the archives produced by [`encode`].
pub const MEDIA_TYPE: &str = "application/zip";
