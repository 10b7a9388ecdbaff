//! Incremental collection of entries, with folder prefixes.
//!
//! ```
//! use storezip::zip::ArchiveBuilder;
//!
//! let mut zip = ArchiveBuilder::new();
//! zip.file("extracted_profiles.csv", "\"Name\"");
//! zip.folder("images").file("img_1.png", vec![0x89, b'P', b'N', b'G']);
//! let bytes = zip.finish().unwrap();
//! assert_eq!(&bytes[..4], b"PK\x03\x04");
//! ```

use super::error::EncodeResult;
use super::writer::{ArchiveEntry, encode};

/// Collects entries in insertion order and encodes them on [`finish`](Self::finish).
#[derive(Debug, Default, Clone)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at `name`. Names are not deduplicated.
    pub fn file(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.entries.push(ArchiveEntry::new(name, data));
        self
    }

    /// Handle that places files under `name/`. An empty name is the root.
    pub fn folder(&mut self, name: &str) -> Folder<'_> {
        Folder {
            builder: self,
            prefix: name.trim_end_matches('/').to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn finish(&self) -> EncodeResult<Vec<u8>> {
        encode(&self.entries)
    }
}

/// A folder inside an [`ArchiveBuilder`].
pub struct Folder<'a> {
    builder: &'a mut ArchiveBuilder,
    prefix: String,
}

impl Folder<'_> {
    fn join(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }

    pub fn file(&mut self, name: &str, data: impl Into<Vec<u8>>) -> &mut Self {
        let full = self.join(name);
        self.builder.file(full, data);
        self
    }

    /// Nested folder below this one.
    pub fn folder(&mut self, name: &str) -> Folder<'_> {
        let prefix = self.join(name.trim_end_matches('/'));
        Folder {
            builder: &mut *self.builder,
            prefix,
        }
    }
}
