use std::sync::Arc;

use anyhow::{Context, Result};

use crate::io::ReadAt;
use crate::zip::ZipArchive;

use super::container::{CONTAINER_PATH, parse_container};
use super::html::chapter_title;
use super::package::{Metadata, parse_package};
use super::path::resolve_path;

const MIMETYPE_PATH: &str = "mimetype";
const EPUB_MIMETYPE: &str = "application/epub+zip";

/// One spine document, loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// The chapter document exactly as stored in the archive.
    pub content: String,
    /// Archive entry the chapter was read from.
    pub path: String,
}

/// A book's chapters in reading order.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub metadata: Metadata,
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Resolve the package and load every chapter of the spine.
    ///
    /// A chapter that cannot be read is logged and left out; the rest of
    /// the book still loads. Failing to read the container or the package
    /// document fails the whole load.
    pub async fn load<R: ReadAt>(reader: Arc<R>) -> Result<Self> {
        let archive = ZipArchive::open(reader).await?;
        check_mimetype(&archive).await;

        let container = archive
            .read(CONTAINER_PATH)
            .await
            .context("Cannot read container descriptor")?;
        let opf_path = parse_container(&container)?;

        let opf = archive
            .read(&opf_path)
            .await
            .with_context(|| format!("Cannot read package document {}", opf_path))?;
        let package = parse_package(&opf)?;

        let mut chapters = Vec::with_capacity(package.spine.len());
        for (idref, href) in package.reading_order() {
            let path = resolve_path(&opf_path, href);
            match archive.read_to_string(&path).await {
                Ok(content) => {
                    let title = chapter_title(&content, chapters.len());
                    tracing::debug!(%idref, %path, %title, "loaded chapter");
                    chapters.push(Chapter {
                        title,
                        content,
                        path,
                    });
                }
                Err(e) => {
                    tracing::warn!(%idref, %href, error = %format!("{:#}", e), "skipping unreadable chapter");
                }
            }
        }

        tracing::info!(
            title = package.metadata.title.as_deref().unwrap_or("untitled"),
            chapters = chapters.len(),
            "book loaded"
        );

        Ok(Self {
            metadata: package.metadata,
            chapters,
        })
    }

    /// Display title: package metadata, else the first chapter's title.
    pub fn title(&self) -> &str {
        self.metadata
            .title
            .as_deref()
            .or_else(|| self.chapters.first().map(|c| c.title.as_str()))
            .unwrap_or("Untitled")
    }
}

async fn check_mimetype<R: ReadAt>(archive: &ZipArchive<R>) {
    match archive.read(MIMETYPE_PATH).await {
        Ok(bytes) if bytes.trim_ascii() == EPUB_MIMETYPE.as_bytes() => {}
        Ok(bytes) => tracing::warn!(
            mimetype = %String::from_utf8_lossy(&bytes),
            "unexpected mimetype entry"
        ),
        Err(_) => tracing::warn!("archive has no mimetype entry"),
    }
}
