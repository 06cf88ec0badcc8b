//! Unicode normalization for decoded placement text.

use unicode_normalization::UnicodeNormalization;

use crate::placement::TextPlacement;

/// Unicode normalization form to apply to decoded text.
///
/// Producers disagree on composed vs. decomposed accents and on whether
/// ligatures are expanded, so callers comparing text across documents may
/// want a canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnicodeNorm {
    /// Leave text as decoded (default).
    #[default]
    None,
    Nfc,
    Nfd,
    /// Compatibility composition; expands presentation ligatures such as U+FB01.
    Nfkc,
    Nfkd,
}

impl UnicodeNorm {
    pub fn normalize(&self, text: &str) -> String {
        match self {
            UnicodeNorm::None => text.to_string(),
            UnicodeNorm::Nfc => text.nfc().collect(),
            UnicodeNorm::Nfd => text.nfd().collect(),
            UnicodeNorm::Nfkc => text.nfkc().collect(),
            UnicodeNorm::Nfkd => text.nfkd().collect(),
        }
    }
}

/// Normalize the text of every placement in place.
pub fn normalize_placements(placements: &mut [TextPlacement], norm: UnicodeNorm) {
    if norm == UnicodeNorm::None {
        return;
    }
    for placement in placements {
        placement.text = norm.normalize(&placement.text);
    }
}
