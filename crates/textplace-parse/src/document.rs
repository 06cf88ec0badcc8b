//! lopdf-backed document access and per-page extraction.

use std::io::Read;

use lopdf::{Dictionary, Document, Object, ObjectId};
use textplace_core::{ExtractOptions, ExtractWarning, ExtractWarningCode, PdfError};

use crate::collector::{PageOutput, TextPlacementCollector};
use crate::dispatcher::dispatch_page;
use crate::error::BackendError;
use crate::objects::{as_dict, decode_stream, resolve};
use crate::registry::FontRegistry;
use crate::state::ResourceScope;

/// Upper bound on `/Parent` hops when looking up inherited page attributes.
const MAX_TREE_DEPTH: usize = 64;

/// A parsed PDF document with its pages in document order.
pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Parse a document held in memory.
    ///
    /// Encrypted documents are rejected with [`PdfError::PasswordRequired`].
    pub fn load(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        if inner.is_encrypted() {
            return Err(BackendError::Core(PdfError::PasswordRequired));
        }
        // get_pages is keyed by 1-based page number
        let page_ids = inner.get_pages().into_values().collect();
        Ok(Self { inner, page_ids })
    }

    /// Parse a document from any byte source.
    pub fn load_from<R: Read>(mut reader: R) -> Result<Self, BackendError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load(&bytes)
    }

    pub fn inner(&self) -> &Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BackendError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.inner
            .get_object(id)
            .ok()
            .and_then(as_dict)
            .ok_or_else(|| BackendError::Parse(format!("page {index} is not a dictionary")))
    }

    /// Decoded content of a page; an array of streams is joined with newlines.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let page = self.page_dict(index)?;
        let Some(contents) = page.get(b"Contents").ok().and_then(|o| resolve(&self.inner, o)) else {
            return Ok(Vec::new());
        };
        match contents {
            Object::Stream(stream) => decode_stream(stream),
            Object::Array(parts) => {
                let mut joined = Vec::new();
                for part in parts {
                    if let Some(Object::Stream(stream)) = resolve(&self.inner, part) {
                        if !joined.is_empty() {
                            joined.push(b'\n');
                        }
                        joined.extend(decode_stream(stream)?);
                    }
                }
                Ok(joined)
            }
            _ => Err(BackendError::Parse(format!(
                "page {index} /Contents is neither a stream nor an array"
            ))),
        }
    }

    /// The page's `/Resources`, inherited through `/Parent` when absent.
    pub fn page_resources(&self, index: usize) -> Result<Option<&Dictionary>, BackendError> {
        let mut node = self.page_dict(index)?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return Ok(resolve(&self.inner, resources).and_then(as_dict));
            }
            match node
                .get(b"Parent")
                .ok()
                .and_then(|p| resolve(&self.inner, p))
                .and_then(as_dict)
            {
                Some(parent) => node = parent,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Interpret one page.
    ///
    /// Fonts are decoded into `registry` on first use. An unreadable or
    /// oversized content stream yields an empty page with a warning; only an
    /// out-of-range index is an error.
    pub fn extract_page(
        &self,
        index: usize,
        registry: &mut FontRegistry,
        options: &ExtractOptions,
    ) -> Result<PageOutput, BackendError> {
        let mut early_warnings = Vec::new();
        let content = match self.page_content(index) {
            Ok(content) if content.len() > options.max_stream_bytes => {
                early_warnings.push(ExtractWarning::with_code(
                    ExtractWarningCode::ResourceLimitReached,
                    format!(
                        "content stream is {} bytes, over the {} byte limit; page skipped",
                        content.len(),
                        options.max_stream_bytes
                    ),
                ));
                Vec::new()
            }
            Ok(content) => content,
            Err(e @ BackendError::PageOutOfRange { .. }) => return Err(e),
            Err(e) => {
                early_warnings.push(ExtractWarning::with_code(
                    ExtractWarningCode::MalformedObject,
                    format!("content stream unreadable: {e}"),
                ));
                Vec::new()
            }
        };
        let scope = match self.page_resources(index)? {
            Some(resources) => ResourceScope::from_dictionary(&self.inner, resources),
            None => ResourceScope::default(),
        };

        let mut collector = TextPlacementCollector::new(&self.inner, registry, options);
        dispatch_page(&self.inner, &content, scope, &mut collector, options);
        let mut output = collector.on_done();

        if options.collect_warnings {
            early_warnings.append(&mut output.warnings);
            output.warnings = early_warnings;
        }
        output.warnings = output
            .warnings
            .into_iter()
            .map(|w| w.on_page(index))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = index,
            placements = output.placements.len(),
            warnings = output.warnings.len(),
            "page extracted"
        );
        Ok(output)
    }
}
