use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::crc32::crc32;
use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Outcome of [`ZipExtractor::verify`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Entries whose content matched the stored CRC-32 and size.
    pub ok: Vec<String>,
    /// `(name, reason)` for every entry that failed.
    pub failed: Vec<(String, String)>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all files in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Extract file data to memory, checking its CRC-32
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.compression_method != CompressionMethod::Stored {
            bail!(
                "Unsupported compression method: {} (only STORED/uncompressed is supported)",
                entry.compression_method.as_u16()
            );
        }
        if entry.compressed_size != entry.uncompressed_size {
            bail!(
                "Stored entry {} declares {} compressed but {} uncompressed bytes",
                entry.file_name,
                entry.compressed_size,
                entry.uncompressed_size
            );
        }

        let data_offset = self.parser.get_data_offset(entry).await?;

        let mut buf = vec![0u8; entry.uncompressed_size as usize];
        let read = self.parser.reader().read_at(data_offset, &mut buf).await?;
        if read != buf.len() {
            bail!(
                "Truncated entry {}: expected {} bytes, got {}",
                entry.file_name,
                buf.len(),
                read
            );
        }

        let actual = crc32(&buf);
        if actual != entry.crc32 {
            bail!(
                "CRC-32 mismatch for {}: header {:08x}, content {:08x}",
                entry.file_name,
                entry.crc32,
                actual
            );
        }

        Ok(buf)
    }

    /// Extract file to disk
    pub async fn extract_to_file(&self, entry: &ZipFileEntry, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path).await?;
        file.write_all(&data).await?;

        Ok(())
    }

    /// Extract every entry and check it against its headers.
    ///
    /// Per-entry failures are collected in the report; an unreadable
    /// central directory is returned as an error.
    pub async fn verify(&self) -> Result<VerifyReport> {
        let mut report = VerifyReport::default();
        for entry in self.list_files().await? {
            match self.extract_to_memory(&entry).await {
                Ok(_) => report.ok.push(entry.file_name),
                Err(e) => {
                    log::warn!("{}: {:#}", entry.file_name, e);
                    report.failed.push((entry.file_name, format!("{:#}", e)));
                }
            }
        }
        Ok(report)
    }
}
