//! Error, warning, and option types for textplace.
//!
//! [`PdfError`] is fatal: the document could not be read at all.
//! [`ExtractWarning`] records a recoverable anomaly (a font fell back to a
//! default mapping, an operator was skipped, a form recursion was cut off)
//! while extraction continues. [`ExtractOptions`] configures limits.

use std::fmt;

use crate::unicode_norm::UnicodeNorm;

/// A failure that prevents a document from being extracted at all.
///
/// Problems confined to one font, operator, or form are never reported
/// this way; they become [`ExtractWarning`]s and extraction goes on.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The bytes are not a PDF this crate can read.
    ParseError(String),
    IoError(String),
    /// The document is encrypted. Decryption is not supported.
    PasswordRequired,
    PageOutOfRange { index: usize, count: usize },
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "malformed PDF: {msg}"),
            PdfError::IoError(msg) => write!(f, "cannot read PDF: {msg}"),
            PdfError::PasswordRequired => f.write_str("document is encrypted"),
            PdfError::PageOutOfRange { index, count } => {
                write!(f, "no page {index} in a document of {count} pages")
            }
            PdfError::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(e: std::io::Error) -> Self {
        PdfError::IoError(e.to_string())
    }
}

/// What kind of anomaly an [`ExtractWarning`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtractWarningCode {
    /// A font name is not defined in any enclosing resource scope, or text
    /// was shown before any font was selected.
    MissingFont,
    /// Wrong operand count or types; the operator had no effect.
    InvalidOperand,
    /// An object has the wrong type or cannot be decoded.
    MalformedObject,
    /// Recursion depth, form cycle, stream size, or placement count limit.
    ResourceLimitReached,
    /// A font dictionary entry was unusable and a default took its place.
    EncodingFallback,
}

impl ExtractWarningCode {
    /// Short kebab-case tag, stable across releases.
    pub fn tag(self) -> &'static str {
        match self {
            ExtractWarningCode::MissingFont => "missing-font",
            ExtractWarningCode::InvalidOperand => "invalid-operand",
            ExtractWarningCode::MalformedObject => "malformed-object",
            ExtractWarningCode::ResourceLimitReached => "limit-reached",
            ExtractWarningCode::EncodingFallback => "encoding-fallback",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A recoverable anomaly met during extraction, with where it happened.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    pub code: ExtractWarningCode,
    pub description: String,
    /// 0-based page index; filled in once the page is known.
    pub page: Option<usize>,
    /// Position of the offending operator in the page's operator sequence.
    pub operator_index: Option<usize>,
    pub font_name: Option<String>,
}

impl ExtractWarning {
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        ExtractWarning {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
            font_name: None,
        }
    }

    pub fn with_operator_context(
        code: ExtractWarningCode,
        description: impl Into<String>,
        operator_index: usize,
        font_name: Option<&str>,
    ) -> Self {
        let mut warning = Self::with_code(code, description);
        warning.operator_index = Some(operator_index);
        warning.font_name = font_name.map(String::from);
        warning
    }

    pub fn on_page(self, page: usize) -> Self {
        ExtractWarning {
            page: Some(page),
            ..self
        }
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(page) = self.page {
            write!(f, "page {page}: ")?;
        }
        write!(f, "{}: {}", self.code, self.description)?;
        match (&self.font_name, self.operator_index) {
            (Some(font), Some(index)) => write!(f, " (font {font}, operator {index})"),
            (Some(font), None) => write!(f, " (font {font})"),
            (None, Some(index)) => write!(f, " (operator {index})"),
            (None, None) => Ok(()),
        }
    }
}

/// Limits and switches for one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Maximum nesting depth of Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum decoded size of one content stream in bytes (default: 64 MiB).
    ///
    /// Larger streams are skipped with a warning.
    pub max_stream_bytes: usize,
    /// Maximum placements collected per page (default: 100,000).
    pub max_placements_per_page: usize,
    /// Record [`ExtractWarning`]s (default: true).
    pub collect_warnings: bool,
    /// Normalization applied to placement text (default: none).
    pub unicode_norm: UnicodeNorm,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_stream_bytes: 64 << 20,
            max_placements_per_page: 100_000,
            collect_warnings: true,
            unicode_norm: UnicodeNorm::None,
        }
    }
}
