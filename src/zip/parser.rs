//! Low-level ZIP archive parser.
//!
//! Reads archives back through the [`ReadAt`] trait so that encoder output
//! can be listed and checked without trusting the encoder's own bookkeeping.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. Read the Central Directory to get metadata for all files
//! 3. For extraction, read each file's Local File Header and data
//!
//! ZIP64 and multi-disk archives are rejected.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Low-level ZIP file parser.
///
/// Typically used through [`ZipExtractor`](super::ZipExtractor)
/// rather than directly.
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the comment-less position first, then searches backwards for
    /// a signature whose comment length reaches exactly to the end of the
    /// file.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in file).
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            bail!("Not a valid ZIP file");
        }

        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_at(offset, &mut buf).await?;

        if let Ok(eocd) = EndOfCentralDirectory::from_bytes(&buf) {
            if eocd.comment_len == 0 {
                return Ok((eocd, offset));
            }
        }

        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_at(search_start, &mut buf).await?;

        let signature = EndOfCentralDirectory::SIGNATURE.to_le_bytes();
        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if buf[i..i + 4] != signature {
                continue;
            }
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        bail!("Not a valid ZIP file")
    }

    /// Whether a ZIP64 End of Central Directory Locator sits directly
    /// before the EOCD at `eocd_offset`.
    pub async fn has_zip64_locator(&self, eocd_offset: u64) -> Result<bool> {
        let locator_size = ZIP64_LOCATOR_SIZE as u64;
        if eocd_offset < locator_size {
            return Ok(false);
        }

        let mut sig = [0u8; 4];
        let read = self
            .reader
            .read_at(eocd_offset - locator_size, &mut sig)
            .await?;
        Ok(read == sig.len() && u32::from_le_bytes(sig) == ZIP64_LOCATOR_SIGNATURE)
    }

    /// List all files in the ZIP archive, in central directory order.
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        if eocd.has_zip64_sentinels() && self.has_zip64_locator(eocd_offset).await? {
            bail!("ZIP64 archives are not supported");
        }
        if eocd.is_multi_disk() {
            bail!("Multi-disk archives are not supported");
        }

        let cd_offset = eocd.cd_offset as u64;
        let cd_size = eocd.cd_size as u64;
        if cd_offset + cd_size > eocd_offset {
            bail!(
                "Central Directory ({} bytes at {}) overlaps the EOCD at {}",
                cd_size,
                cd_offset,
                eocd_offset
            );
        }

        // Read the entire Central Directory in one request
        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for _ in 0..eocd.total_entries {
            entries.push(Self::parse_cdfh(&mut cursor)?);
        }

        if cursor.position() != cd_size {
            log::warn!(
                "central directory holds {} bytes, {} parsed for {} entries",
                cd_size,
                cursor.position(),
                eocd.total_entries
            );
        }

        Ok(entries)
    }

    /// Parse a Central Directory File Header from a cursor.
    fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
        if cursor.read_u32::<LittleEndian>()? != CentralDirectoryHeader::SIGNATURE {
            bail!("Invalid Central Directory File Header");
        }

        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let _external_attrs = cursor.read_u32::<LittleEndian>()?;
        let lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes)?;
        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

        // Extra fields and comments are skipped; this crate never writes them
        cursor.set_position(
            cursor.position() + extra_field_length as u64 + file_comment_length as u64,
        );

        Ok(ZipFileEntry {
            file_name,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            lfh_offset,
            last_mod_time,
            last_mod_date,
        })
    }

    /// Read the Local File Header of `entry` and return it together with
    /// the byte offset where the entry's data begins.
    ///
    /// Fails when the local header disagrees with the central directory on
    /// the CRC-32 or the sizes.
    pub async fn read_local_header(&self, entry: &ZipFileEntry) -> Result<(LocalFileHeader, u64)> {
        let mut lfh_buf = vec![0u8; LocalFileHeader::SIZE];
        self.reader.read_at(entry.lfh_offset, &mut lfh_buf).await?;

        let (header, name_len) = LocalFileHeader::from_bytes(&lfh_buf)?;

        if header.crc32 != entry.crc32
            || header.compressed_size as u64 != entry.compressed_size
            || header.uncompressed_size as u64 != entry.uncompressed_size
        {
            bail!(
                "Local File Header of {} does not match its Central Directory record",
                entry.file_name
            );
        }

        // Data starts after: LFH (30 bytes) + filename + extra field
        let data_offset = entry.lfh_offset
            + LocalFileHeader::SIZE as u64
            + name_len as u64
            + header.extra_field_len as u64;

        Ok((header, data_offset))
    }

    /// Get the actual data offset for a file entry.
    pub async fn get_data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let (_, data_offset) = self.read_local_header(entry).await?;
        Ok(data_offset)
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}
