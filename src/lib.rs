//! # runepub
//!
//! A terminal EPUB reader with HTTP URL support using Range requests.
//!
//! Books are opened from the local filesystem, from memory, or from a
//! remote HTTP server. Remote books are read with Range requests, so only
//! the archive's central directory, package documents and chapters are
//! downloaded.
//!
//! ## Features
//!
//! - Chapter list in spine order, resolved through the OPF manifest
//! - STORED and DEFLATE entries, ZIP64, CRC-checked reads
//! - Upload validation (file type, size limit)
//! - Forward/backward chapter navigation
//! - Font preference persisted to a JSON key-value store
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use runepub::{LocalFileReader, ReaderState, import_book, DEFAULT_MAX_UPLOAD};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new("moby-dick.epub".as_ref())?);
//!     let book = import_book("moby-dick.epub", reader, DEFAULT_MAX_UPLOAD).await?;
//!
//!     let mut state = ReaderState::new();
//!     state.load(book);
//!     for item in state.chapter_list() {
//!         println!("{}", item.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod epub;
pub mod error;
pub mod import;
pub mod io;
pub mod logging;
pub mod reader;
pub mod render;
pub mod settings;
pub mod zip;

pub use cli::Cli;
pub use config::Config;
pub use epub::{Book, Chapter};
pub use error::ImportError;
pub use import::{DEFAULT_MAX_UPLOAD, import_book, validate_upload};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
pub use reader::ReaderState;
pub use settings::{FontFamily, JsonFileStore, Preferences, Settings, SettingsStore};
pub use self::zip::{ZipArchive, ZipFileEntry};
