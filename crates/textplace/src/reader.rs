//! The document-level reader: extracts every page once and serves the result.

use std::collections::BTreeMap;
use std::io::Read;

#[cfg(feature = "parallel")]
use textplace_core::ExtractWarningCode;
use textplace_core::{
    ExtractOptions, ExtractWarning, FontDescription, FontId, PdfError, TextPlacement,
    normalize_placements,
};
use textplace_parse::{FontRegistry, PdfDocument};

use crate::pages::PageRange;

/// Document totals plus the description of every font that was used.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub page_count: usize,
    pub placement_count: usize,
    /// Ordered by [`FontId`].
    pub fonts: Vec<FontDescription>,
}

/// Positioned text runs extracted from a PDF document.
///
/// All pages are interpreted when the reader is constructed; afterwards it
/// is an immutable view over the placements (in page order, and in content
/// stream order within a page) and the fonts they reference.
///
/// # Example
///
/// ```ignore
/// let reader = TextPlacementReader::open("report.pdf")?;
/// println!("{} pages", reader.page_count());
/// for placement in reader.pages(2, Some(5)) {
///     println!("{} {:?} {}", placement.page, placement.bbox, placement.text);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TextPlacementReader {
    page_count: usize,
    placements: Vec<TextPlacement>,
    fonts: BTreeMap<FontId, FontDescription>,
    warnings: Vec<ExtractWarning>,
}

impl TextPlacementReader {
    /// Read and extract a PDF file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::IoError`] if the file cannot be read, and the
    /// errors of [`from_bytes`](Self::from_bytes) otherwise.
    #[cfg(feature = "std")]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PdfError> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    #[cfg(feature = "std")]
    pub fn open_with_options(
        path: impl AsRef<std::path::Path>,
        options: ExtractOptions,
    ) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| PdfError::IoError(e.to_string()))?;
        Self::from_bytes_with_options(&bytes, options)
    }

    /// Extract a PDF held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ParseError`] if the bytes are not a readable PDF,
    /// and [`PdfError::PasswordRequired`] if the document is encrypted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        Self::from_bytes_with_options(bytes, ExtractOptions::default())
    }

    pub fn from_bytes_with_options(bytes: &[u8], options: ExtractOptions) -> Result<Self, PdfError> {
        let doc = PdfDocument::load(bytes)?;
        Self::extract(&doc, &options)
    }

    /// Extract a PDF from any byte source, such as a file or a database blob.
    pub fn from_reader(reader: impl Read) -> Result<Self, PdfError> {
        Self::from_reader_with_options(reader, ExtractOptions::default())
    }

    pub fn from_reader_with_options(
        reader: impl Read,
        options: ExtractOptions,
    ) -> Result<Self, PdfError> {
        let doc = PdfDocument::load_from(reader)?;
        Self::extract(&doc, &options)
    }

    #[cfg(not(feature = "parallel"))]
    fn extract(doc: &PdfDocument, options: &ExtractOptions) -> Result<Self, PdfError> {
        let mut registry = FontRegistry::new();
        let mut placements = Vec::new();
        let mut warnings = Vec::new();
        for index in 0..doc.page_count() {
            let output = doc.extract_page(index, &mut registry, options)?;
            placements.extend(
                output
                    .placements
                    .into_iter()
                    .map(|p| p.into_text_placement(index)),
            );
            warnings.extend(output.warnings);
        }
        Ok(Self::assemble(doc.page_count(), placements, &registry, warnings, options))
    }

    /// Pages are interpreted concurrently, each with its own font registry;
    /// the registries are merged in page order so the first page to use a
    /// font supplies its description.
    #[cfg(feature = "parallel")]
    fn extract(doc: &PdfDocument, options: &ExtractOptions) -> Result<Self, PdfError> {
        use rayon::prelude::*;

        let pages = (0..doc.page_count())
            .into_par_iter()
            .map(|index| {
                let mut registry = FontRegistry::new();
                doc.extract_page(index, &mut registry, options)
                    .map(|output| (output, registry))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut registry = FontRegistry::new();
        let mut placements = Vec::new();
        let mut warnings = Vec::new();
        for (index, (output, page_registry)) in pages.into_iter().enumerate() {
            let renamed = registry.merge(page_registry);
            let mut dropped = 0usize;
            placements.extend(output.placements.into_iter().filter_map(|p| {
                let mut placement = p.into_text_placement(index);
                match renamed.get(&placement.font_id) {
                    Some(Some(id)) => placement.font_id = *id,
                    Some(None) => {
                        dropped += 1;
                        return None;
                    }
                    None => {}
                }
                Some(placement)
            }));
            warnings.extend(output.warnings);
            if dropped > 0 && options.collect_warnings {
                warnings.push(
                    ExtractWarning::with_code(
                        ExtractWarningCode::ResourceLimitReached,
                        format!("{dropped} placements dropped: no inline font ids left"),
                    )
                    .on_page(index),
                );
            }
        }
        Ok(Self::assemble(doc.page_count(), placements, &registry, warnings, options))
    }

    fn assemble(
        page_count: usize,
        mut placements: Vec<TextPlacement>,
        registry: &FontRegistry,
        warnings: Vec<ExtractWarning>,
        options: &ExtractOptions,
    ) -> Self {
        normalize_placements(&mut placements, options.unicode_norm);
        Self {
            page_count,
            placements,
            fonts: registry.descriptions(),
            warnings,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Descriptions of the fonts used by the document, keyed by id.
    ///
    /// Every `font_id` found in a placement has an entry here.
    pub fn fonts(&self) -> &BTreeMap<FontId, FontDescription> {
        &self.fonts
    }

    pub fn font(&self, id: FontId) -> Option<&FontDescription> {
        self.fonts.get(&id)
    }

    pub fn placements(&self) -> &[TextPlacement] {
        &self.placements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextPlacement> {
        self.placements.iter()
    }

    /// Placements on pages `start..end` (0-based, end exclusive).
    ///
    /// `None` as the end means through the last page.
    pub fn pages(&self, start: usize, end: Option<usize>) -> PageRange<'_> {
        PageRange::new(&self.placements, start, end)
    }

    /// Non-fatal problems met during extraction, in page order.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    pub fn summary(&self) -> Summary {
        Summary {
            page_count: self.page_count,
            placement_count: self.placements.len(),
            fonts: self.fonts.values().cloned().collect(),
        }
    }

    /// The summary as `{page_count, placement_count, fonts: [...]}`.
    #[cfg(feature = "serde")]
    pub fn summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "page_count": self.page_count,
            "placement_count": self.placements.len(),
            "fonts": self.fonts.values().collect::<Vec<_>>(),
        })
    }

    /// Every placement as a JSON array of flat `{page, font_id, x, y, width, height, text}` objects.
    #[cfg(feature = "serde")]
    pub fn placements_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.placements
                .iter()
                .map(|placement| serde_json::json!(placement))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a TextPlacementReader {
    type Item = &'a TextPlacement;
    type IntoIter = std::slice::Iter<'a, TextPlacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}
