/// Why a book could not be imported.
///
/// `Display` gives the message shown to the reader; the underlying cause
/// is logged where the failure happens.
#[derive(Debug, PartialEq, Eq)]
pub enum ImportError {
    /// The source could not be opened at all (missing file, HTTP failure).
    Unavailable(String),
    InvalidFileType(String),
    FileTooLarge { size: u64, limit: u64 },
    /// The archive or its package documents could not be parsed.
    Malformed(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Unavailable(details) => write!(f, "Could not open book: {}", details),
            ImportError::InvalidFileType(_) => write!(f, "Please select a valid EPUB file."),
            ImportError::FileTooLarge { limit, .. } => write!(
                f,
                "File too large. Please select a file smaller than {}MB.",
                limit / (1024 * 1024)
            ),
            ImportError::Malformed(_) => write!(
                f,
                "Error loading EPUB file. Please ensure it's a valid EPUB format."
            ),
        }
    }
}

impl std::error::Error for ImportError {}
