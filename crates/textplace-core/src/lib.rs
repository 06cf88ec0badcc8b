//! textplace-core: backend-independent data types for positioned text extraction.
//!
//! Provides the geometry primitives ([`Matrix`], [`BBox`]), the placement
//! records emitted per text run ([`ParsedTextPlacement`], [`TextPlacement`]),
//! font descriptions, single-byte encoding tables, and the error, warning,
//! and option types shared by the parsing and facade crates.

pub mod encoding;
pub mod error;
pub mod font;
pub mod geometry;
pub mod placement;
pub mod unicode_norm;

pub use encoding::{SimpleEncoding, StandardEncoding, glyph_name_to_unicode};
pub use error::{ExtractOptions, ExtractWarning, ExtractWarningCode, PdfError};
pub use font::{FontDescription, FontFlags, strip_subset_prefix};
pub use geometry::{BBox, Matrix};
pub use placement::{FontId, ParsedTextPlacement, PlacementBox, TextPlacement};
pub use unicode_norm::{UnicodeNorm, normalize_placements};
