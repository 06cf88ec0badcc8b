//! Error type for the parsing layer.
//!
//! Only document-level failures surface as [`BackendError`]; font and
//! operator anomalies are absorbed where they occur and reported as
//! warnings instead.

use textplace_core::PdfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// lopdf rejected the document or a page object has the wrong type.
    #[error("{0}")]
    Parse(String),

    #[error("reading document bytes: {0}")]
    Io(#[from] std::io::Error),

    #[error("page {index} requested but the document has {count}")]
    PageOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfError::ParseError(msg),
            BackendError::Io(e) => PdfError::IoError(e.to_string()),
            BackendError::PageOutOfRange { index, count } => PdfError::PageOutOfRange { index, count },
            BackendError::Core(e) => e,
        }
    }
}
