//! Stored-mode ZIP archive encoder.
//!
//! Entries are written in the order given: every local header is followed
//! directly by its raw content, then the central directory repeats each
//! header (same order) with the offset of its local header, and a single
//! End of Central Directory record closes the archive.
//!
//! Timestamps are always zero, so the output depends only on the input.

use super::crc32::crc32;
use super::error::{EncodeError, EncodeResult};
use super::structures::{CentralDirectoryHeader, EndOfCentralDirectory, LocalFileHeader};

/// One file to place in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive, `/`-separated.
    pub name: String,
    /// Uncompressed payload.
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Per-entry values derived during a single `encode` call.
struct EntryRecord<'a> {
    name_bytes: &'a [u8],
    data: &'a [u8],
    crc32: u32,
    size: u32,
    local_offset: u32,
}

impl EntryRecord<'_> {
    fn local_header(&self) -> LocalFileHeader {
        LocalFileHeader::stored(self.name_bytes, self.crc32, self.size)
    }

    fn central_header(&self) -> CentralDirectoryHeader {
        CentralDirectoryHeader::for_local(self.local_header(), self.local_offset)
    }
}

/// Offsets computed ahead of serialization.
#[derive(Debug, PartialEq, Eq)]
struct Layout {
    offsets: Vec<u32>,
    cd_offset: u32,
    cd_size: u32,
    total_len: u64,
}

const MAX_ENTRIES: usize = u16::MAX as usize;
const MAX_NAME_LEN: usize = u16::MAX as usize;
const MAX_OFFSET: u64 = u32::MAX as u64;

/// Assign local header offsets and check every field limit of a
/// non-ZIP64 archive, given `(name, content length)` pairs.
fn plan<'a, I>(entries: I) -> EncodeResult<Layout>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut offsets = Vec::new();
    let mut offset = 0u64;
    let mut cd_size = 0u64;

    for (name, len) in entries {
        if name.len() > MAX_NAME_LEN {
            return Err(EncodeError::NameTooLong {
                name: name.to_string(),
                len: name.len(),
            });
        }
        if len > MAX_OFFSET {
            return Err(EncodeError::EntryTooLarge {
                name: name.to_string(),
                len,
            });
        }
        if offset > MAX_OFFSET {
            return Err(EncodeError::ArchiveTooLarge {
                name: name.to_string(),
            });
        }

        offsets.push(offset as u32);
        offset += (LocalFileHeader::SIZE + name.len()) as u64 + len;
        cd_size += (CentralDirectoryHeader::SIZE + name.len()) as u64;
    }

    if offsets.len() > MAX_ENTRIES {
        return Err(EncodeError::TooManyEntries(offsets.len()));
    }
    if offset > MAX_OFFSET || cd_size > MAX_OFFSET {
        return Err(EncodeError::ArchiveTooLarge {
            name: "<central directory>".to_string(),
        });
    }

    Ok(Layout {
        offsets,
        cd_offset: offset as u32,
        cd_size: cd_size as u32,
        total_len: offset + cd_size + EndOfCentralDirectory::SIZE as u64,
    })
}

/// Exact size of the archive [`encode`] produces for `entries`.
pub fn encoded_len(entries: &[ArchiveEntry]) -> u64 {
    let entries_len: u64 = entries
        .iter()
        .map(|e| {
            let name = e.name.len() as u64;
            (LocalFileHeader::SIZE as u64 + name + e.content.len() as u64)
                + (CentralDirectoryHeader::SIZE as u64 + name)
        })
        .sum();
    entries_len + EndOfCentralDirectory::SIZE as u64
}

/// Encode `entries` as an uncompressed ZIP archive.
///
/// Duplicate names are written as given. An empty list yields a bare
/// 22-byte End of Central Directory record.
///
/// # Errors
///
/// Fails with [`EncodeError`] when a name, an entry, the entry count or the
/// archive itself exceeds what 16/32-bit ZIP fields can describe.
///
/// # Examples
///
/// ```
/// use storezip::zip::{ArchiveEntry, encode};
///
/// let archive = encode(&[ArchiveEntry::new("a.txt", "hi")]).unwrap();
/// assert_eq!(&archive[..4], b"PK\x03\x04");
/// assert_eq!(archive.len(), 30 + 5 + 2 + 46 + 5 + 22);
/// ```
pub fn encode(entries: &[ArchiveEntry]) -> EncodeResult<Vec<u8>> {
    let layout = plan(
        entries
            .iter()
            .map(|e| (e.name.as_str(), e.content.len() as u64)),
    )?;

    let records: Vec<EntryRecord<'_>> = entries
        .iter()
        .zip(&layout.offsets)
        .map(|(entry, &local_offset)| EntryRecord {
            name_bytes: entry.name.as_bytes(),
            data: &entry.content,
            crc32: crc32(&entry.content),
            size: entry.content.len() as u32,
            local_offset,
        })
        .collect();

    let mut out = Vec::with_capacity(layout.total_len as usize);

    for record in &records {
        record.local_header().write_to(&mut out)?;
        out.extend_from_slice(record.data);
    }
    debug_assert_eq!(out.len() as u64, layout.cd_offset as u64);

    for record in &records {
        record.central_header().write_to(&mut out)?;
    }

    EndOfCentralDirectory::single_disk(records.len() as u16, layout.cd_size, layout.cd_offset)
        .write_to(&mut out)?;
    debug_assert_eq!(out.len() as u64, layout.total_len);

    log::debug!(
        "encoded {} entries into {} bytes (central directory at {})",
        records.len(),
        out.len(),
        layout.cd_offset
    );

    Ok(out)
}
