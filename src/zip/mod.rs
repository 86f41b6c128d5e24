//! ZIP container reading for EPUB archives.
//!
//! An EPUB is an OCF container: a plain ZIP whose entries are either
//! STORED or DEFLATE compressed. This module reads just enough of the
//! format to pull individual entries out of it.
//!
//! - [`structures`]: fixed records (EOCD, ZIP64 records, file entries)
//! - [`parser`]: central directory parsing over a [`ReadAt`](crate::io::ReadAt) source
//! - [`archive`]: name lookup, decompression and integrity checks
//!
//! Encryption and multi-disk archives are not supported.

mod archive;
mod parser;
mod structures;

pub use archive::{DEFAULT_MAX_ENTRY_SIZE, ZipArchive};
pub use parser::ZipParser;
pub use structures::*;
