use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use flate2::Crc;
use flate2::read::DeflateDecoder;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Largest single entry we are willing to inflate.
///
/// Chapters are small; anything bigger than this is either a media file
/// we never need or a decompression bomb.
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// An opened ZIP container with its entries indexed by name.
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
    by_name: HashMap<String, usize>,
    max_entry_size: u64,
}

impl<R: ReadAt> ZipArchive<R> {
    /// Read the central directory and index it.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_files().await?;
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.file_name.clone(), i))
            .collect();

        Ok(Self {
            parser,
            entries,
            by_name,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        })
    }

    pub fn with_max_entry_size(mut self, limit: u64) -> Self {
        self.max_entry_size = limit;
        self
    }

    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ZipFileEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Read and decompress a named entry.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .with_context(|| format!("No such entry in archive: {}", name))?;
        self.read_entry(entry).await
    }

    /// Read a named entry as text.
    ///
    /// A UTF-8 byte order mark is dropped; invalid sequences are replaced
    /// rather than failing the whole chapter.
    pub async fn read_to_string(&self, name: &str) -> Result<String> {
        let bytes = self.read(name).await?;
        Ok(decode_text(&bytes))
    }

    pub async fn read_entry(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_directory() {
            bail!("{} is a directory", entry.file_name);
        }
        if entry.is_encrypted() {
            bail!("{} is encrypted", entry.file_name);
        }
        let declared = entry.uncompressed_size.max(entry.compressed_size);
        if declared > self.max_entry_size {
            bail!(
                "{} is too large ({} bytes, limit {})",
                entry.file_name,
                declared,
                self.max_entry_size
            );
        }

        let offset = self.parser.data_offset(entry).await?;
        let data_end = offset.checked_add(entry.compressed_size);
        if data_end.is_none_or(|end| end > self.parser.reader().size()) {
            bail!("{} extends past end of archive", entry.file_name);
        }
        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_exact_at(offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => inflate(&raw, entry.uncompressed_size)
                .with_context(|| format!("Cannot inflate {}", entry.file_name))?,
            CompressionMethod::Unknown(method) => {
                bail!(
                    "Unsupported compression method {} for {}",
                    method,
                    entry.file_name
                )
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "{}: expected {} bytes, got {}",
                entry.file_name,
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!("CRC mismatch for {}", entry.file_name);
        }

        Ok(data)
    }
}

fn inflate(raw: &[u8], expected: u64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected as usize);
    // One extra byte lets an over-long stream show up as a size mismatch.
    DeflateDecoder::new(raw)
        .take(expected + 1)
        .read_to_end(&mut out)?;
    Ok(out)
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            tracing::debug!("entry is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
