//! # storezip
//!
//! Deterministic, uncompressed ZIP archives, and the profile export bundles
//! built on top of them.
//!
//! The core is [`encode`](crate::zip::encode): an ordered list of `(name, content)` pairs
//! becomes a complete stored-mode ZIP archive (local headers, central
//! directory, End of Central Directory) with a CRC-32 per entry. Timestamps
//! are fixed at zero, so equal input always gives byte-identical output.
//!
//! Around it the crate provides:
//!
//! - A reader ([`ZipExtractor`](crate::zip::ZipExtractor)) to list and verify archives
//! - Profile export: CSV rendering, a CSV with images inlined as data URIs,
//!   and a ZIP bundle with per-profile images
//! - A `storezip` command-line tool
//!
//! ## Example
//!
//! ```
//! use storezip::zip::{ArchiveEntry, encode};
//!
//! let archive = encode(&[
//!     ArchiveEntry::new("a.txt", "hi"),
//!     ArchiveEntry::new("b.txt", Vec::new()),
//! ])?;
//! assert_eq!(&archive[archive.len() - 22..][..4], b"PK\x05\x06");
//! # Ok::<(), storezip::zip::EncodeError>(())
//! ```

pub mod cli;
pub mod io;
pub mod profile;
pub mod zip;

pub use cli::Cli;
pub use io::{Fetcher, LocalFileReader, MemoryReader, ReadAt};
pub use profile::{ExportBundle, Profile, ProfileSet};
pub use self::zip::{ArchiveBuilder, ArchiveEntry, EncodeError, ZipExtractor, ZipFileEntry, encode};
