//! Upload validation and the import entry point.

use std::sync::Arc;

use crate::epub::Book;
use crate::error::ImportError;
use crate::io::ReadAt;

/// Largest accepted upload (50 MiB).
pub const DEFAULT_MAX_UPLOAD: u64 = 50 * 1024 * 1024;

/// Check the file name and size before touching the archive.
pub fn validate_upload(name: &str, size: u64, limit: u64) -> Result<(), ImportError> {
    if !name.to_lowercase().ends_with(".epub") {
        return Err(ImportError::InvalidFileType(name.to_string()));
    }
    if size > limit {
        return Err(ImportError::FileTooLarge { size, limit });
    }
    Ok(())
}

/// Validate an upload and load its chapters.
pub async fn import_book<R: ReadAt>(
    name: &str,
    reader: Arc<R>,
    limit: u64,
) -> Result<Book, ImportError> {
    validate_upload(name, reader.size(), limit).inspect_err(|e| {
        tracing::warn!(%name, error = ?e, "upload rejected");
    })?;

    Book::load(reader).await.map_err(|e| {
        tracing::error!(%name, error = %format!("{:#}", e), "error loading EPUB");
        ImportError::Malformed(format!("{:#}", e))
    })
}

/// File name of a local path or URL, used for upload validation.
pub fn source_name(source: &str) -> &str {
    let source = source.split(['?', '#']).next().unwrap_or_default();
    source.rsplit(['/', '\\']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(validate_upload("Moby-Dick.EPUB", 10, DEFAULT_MAX_UPLOAD).is_ok());
    }

    #[test]
    fn test_rejects_other_file_types() {
        assert_eq!(
            validate_upload("notes.pdf", 10, DEFAULT_MAX_UPLOAD),
            Err(ImportError::InvalidFileType("notes.pdf".to_string()))
        );
        assert!(validate_upload("book.epub.zip", 10, DEFAULT_MAX_UPLOAD).is_err());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_upload("a.epub", DEFAULT_MAX_UPLOAD, DEFAULT_MAX_UPLOAD).is_ok());
        assert_eq!(
            validate_upload("a.epub", DEFAULT_MAX_UPLOAD + 1, DEFAULT_MAX_UPLOAD),
            Err(ImportError::FileTooLarge {
                size: DEFAULT_MAX_UPLOAD + 1,
                limit: DEFAULT_MAX_UPLOAD
            })
        );
    }

    #[test]
    fn test_source_name() {
        assert_eq!(source_name("/books/moby.epub"), "moby.epub");
        assert_eq!(source_name("https://example.com/dl/moby.epub?token=1"), "moby.epub");
        assert_eq!(source_name("moby.epub"), "moby.epub");
    }

    #[tokio::test]
    async fn test_garbage_epub_is_malformed() {
        let reader = Arc::new(MemoryReader::new(b"not a zip archive at all".to_vec()));
        let err = import_book("fake.epub", reader, DEFAULT_MAX_UPLOAD)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
    }
}
