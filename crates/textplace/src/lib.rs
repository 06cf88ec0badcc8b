//! textplace: extract positioned text runs from PDF documents.
//!
//! This is the public API facade crate. [`TextPlacementReader`] parses a
//! document, interprets every page, and exposes one [`TextPlacement`] per
//! shown string: its page, its bounding box in page coordinates, the font
//! that drew it, and its decoded text.
//!
//! # Architecture
//!
//! - **textplace-core**: geometry, placement records, font descriptions, encodings
//! - **textplace-parse**: font decoding and the content stream interpreter
//! - **textplace** (this crate): the reader that ties them together
//!
//! # Features
//!
//! - `std` (default): [`TextPlacementReader::open`] for file paths.
//! - `serde`: serialisable records plus JSON helpers on the reader.
//! - `parallel`: interpret pages concurrently with rayon.
//! - `tracing`: debug and warning events from the interpreter.

mod pages;
mod reader;

pub use pages::PageRange;
pub use reader::{Summary, TextPlacementReader};
pub use textplace_core;
pub use textplace_core::{
    BBox, ExtractOptions, ExtractWarning, ExtractWarningCode, FontDescription, FontFlags, FontId,
    Matrix, PdfError, PlacementBox, TextPlacement, UnicodeNorm,
};
pub use textplace_parse;
