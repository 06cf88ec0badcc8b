//! Document-level font registry.
//!
//! Decoders live in an arena owned by the extraction pass; graphics state
//! refers to them through [`FontHandle`] indices, so saving and restoring
//! state never clones a decoder.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document};
use textplace_core::{FontDescription, FontId};

use crate::font::FontDecoder;

/// Index of a decoder inside one [`FontRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(usize);

impl FontHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Append-only arena of font decoders keyed by font object identity.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    decoders: Vec<FontDecoder>,
    index: HashMap<FontId, FontHandle>,
    /// Inline font dictionaries have no object identity; they are keyed by content.
    inline_keys: HashMap<String, FontId>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the decoder for an indirect font object, building it on first use.
    ///
    /// The flag is `true` when this call built the decoder.
    pub fn get_or_build(
        &mut self,
        doc: &Document,
        font_id: FontId,
        font: &Dictionary,
    ) -> (FontHandle, bool) {
        if let Some(handle) = self.index.get(&font_id) {
            return (*handle, false);
        }
        let handle = self.insert(FontDecoder::build(doc, font_id, font));
        (handle, true)
    }

    /// Same as [`get_or_build`](Self::get_or_build) for a font dictionary
    /// written directly into a resource dictionary.
    ///
    /// Returns `None` once every inline font id is taken.
    pub fn get_or_build_inline(
        &mut self,
        doc: &Document,
        font: &Dictionary,
    ) -> Option<(FontHandle, bool)> {
        let key = format!("{font:?}");
        if let Some(handle) = self.inline_keys.get(&key).and_then(|id| self.index.get(id)) {
            return Some((*handle, false));
        }
        let font_id = self.next_inline_id()?;
        self.inline_keys.insert(key, font_id);
        let handle = self.insert(FontDecoder::build(doc, font_id, font));
        Some((handle, true))
    }

    /// Add a decoder under its own font id. An id already present keeps its decoder.
    pub fn insert(&mut self, decoder: FontDecoder) -> FontHandle {
        let font_id = decoder.font_id();
        if let Some(handle) = self.index.get(&font_id) {
            return *handle;
        }
        let handle = FontHandle(self.decoders.len());
        self.decoders.push(decoder);
        self.index.insert(font_id, handle);
        handle
    }

    pub fn handle(&self, font_id: FontId) -> Option<FontHandle> {
        self.index.get(&font_id).copied()
    }

    /// # Panics
    ///
    /// Panics if `handle` was issued by a different registry.
    pub fn decoder(&self, handle: FontHandle) -> &FontDecoder {
        &self.decoders[handle.0]
    }

    pub fn get(&self, font_id: FontId) -> Option<&FontDecoder> {
        self.handle(font_id).map(|h| self.decoder(h))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontDecoder> {
        self.decoders.iter()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Font descriptions ordered by font id.
    pub fn descriptions(&self) -> BTreeMap<FontId, FontDescription> {
        self.decoders
            .iter()
            .map(|d| (d.font_id(), d.description().clone()))
            .collect()
    }

    /// Fold another registry into this one, first writer wins.
    ///
    /// Indirect fonts keep their ids. Inline fonts are matched by content and
    /// may be renumbered; the returned map lists every id that changed so the
    /// caller can rewrite the placements extracted with `other`. An inline
    /// font that finds no free id maps to `None` and is not added.
    pub fn merge(&mut self, other: FontRegistry) -> HashMap<FontId, Option<FontId>> {
        let inline_by_id: HashMap<FontId, String> = other
            .inline_keys
            .into_iter()
            .map(|(key, id)| (id, key))
            .collect();
        let mut renamed = HashMap::new();

        for decoder in other.decoders {
            let old_id = decoder.font_id();
            match inline_by_id.get(&old_id) {
                Some(key) => {
                    let new_id = match self.inline_keys.get(key) {
                        Some(existing) => Some(*existing),
                        None => self.next_inline_id().inspect(|id| {
                            self.inline_keys.insert(key.clone(), *id);
                            self.insert(decoder.with_font_id(*id));
                        }),
                    };
                    if new_id != Some(old_id) {
                        renamed.insert(old_id, new_id);
                    }
                }
                None => {
                    self.insert(decoder);
                }
            }
        }
        renamed
    }

    fn next_inline_id(&self) -> Option<FontId> {
        u16::try_from(self.inline_keys.len() + 1)
            .ok()
            .map(FontId::inline)
    }
}
