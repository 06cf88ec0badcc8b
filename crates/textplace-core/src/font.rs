//! Font descriptions shared between the font registry and its consumers.

use crate::placement::FontId;

/// The `/Flags` bit field of a font descriptor (PDF 32000-1, table 123).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FontFlags(pub u32);

impl FontFlags {
    pub const FIXED_PITCH: u32 = 1 << 0;
    pub const SERIF: u32 = 1 << 1;
    pub const SYMBOLIC: u32 = 1 << 2;
    pub const SCRIPT: u32 = 1 << 3;
    pub const NONSYMBOLIC: u32 = 1 << 5;
    pub const ITALIC: u32 = 1 << 6;
    pub const ALL_CAP: u32 = 1 << 16;
    pub const SMALL_CAP: u32 = 1 << 17;
    pub const FORCE_BOLD: u32 = 1 << 18;

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.contains(Self::FIXED_PITCH)
    }

    pub fn is_serif(&self) -> bool {
        self.contains(Self::SERIF)
    }

    pub fn is_symbolic(&self) -> bool {
        self.contains(Self::SYMBOLIC)
    }

    pub fn is_italic(&self) -> bool {
        self.contains(Self::ITALIC)
    }
}

/// Immutable metrics and naming for one font object.
///
/// Built once when the font is first decoded and never updated afterwards.
/// Metric values are in glyph space (thousandths of an em).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontDescription {
    pub font_id: FontId,
    pub ascent: f64,
    /// Usually negative.
    pub descent: f64,
    /// Advance width of the space glyph, or an estimate when the font has none.
    pub space_width: f64,
    pub family_name: String,
    /// `/BaseFont` with any subset prefix (`ABCDEF+`) removed.
    pub font_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "font_stretch"))]
    pub stretch: String,
    #[cfg_attr(feature = "serde", serde(rename = "font_weight"))]
    pub weight: i32,
    #[cfg_attr(feature = "serde", serde(rename = "font_flags"))]
    pub flags: FontFlags,
}

impl FontDescription {
    /// Font size–scaled ascent in text space units.
    pub fn scaled_ascent(&self, font_size: f64) -> f64 {
        self.ascent * font_size / 1000.0
    }

    /// Font size–scaled descent in text space units.
    pub fn scaled_descent(&self, font_size: f64) -> f64 {
        self.descent * font_size / 1000.0
    }
}

/// Strip a subset tag such as `ABCDEF+` from a `/BaseFont` name.
///
/// Only a prefix of exactly six uppercase ASCII letters followed by `+` is
/// treated as a subset tag.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_report_individual_bits() {
        let flags = FontFlags(FontFlags::FIXED_PITCH | FontFlags::ITALIC);
        assert!(flags.is_fixed_pitch());
        assert!(flags.is_italic());
        assert!(!flags.is_serif());
        assert!(!flags.is_symbolic());
        assert_eq!(flags.bits(), 65);
    }

    #[test]
    fn scaled_metrics() {
        let desc = FontDescription {
            font_id: FontId(1, 0),
            ascent: 750.0,
            descent: -250.0,
            space_width: 250.0,
            family_name: String::new(),
            font_name: "Helvetica".to_string(),
            stretch: String::new(),
            weight: 400,
            flags: FontFlags::default(),
        };
        assert_eq!(desc.scaled_ascent(12.0), 9.0);
        assert_eq!(desc.scaled_descent(12.0), -3.0);
    }

    #[test]
    fn subset_prefix_removed() {
        assert_eq!(strip_subset_prefix("ABCDEF+Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("abcdef+Helvetica"), "abcdef+Helvetica");
        assert_eq!(strip_subset_prefix("ABC+Helvetica"), "ABC+Helvetica");
    }
}
