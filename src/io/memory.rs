use super::ReadAt;
use anyhow::Result;
use async_trait::async_trait;

/// An uploaded EPUB held entirely in memory.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read a whole file into memory, the way an upload buffer is filled.
    pub async fn from_file(path: &std::path::Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(data))
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let len = self.data.len() as u64;
        if offset >= len {
            return Ok(0);
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
