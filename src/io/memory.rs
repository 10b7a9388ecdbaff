use super::ReadAt;
use anyhow::{Result, bail};
use async_trait::async_trait;

/// In-memory archive, e.g. the output of [`encode`](crate::zip::encode)
/// before it is written anywhere.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset > self.data.len() as u64 {
            bail!(
                "read at {} past the end of a {}-byte buffer",
                offset,
                self.data.len()
            );
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
