//! textplace-parse: font decoding and content-stream interpretation.
//!
//! Built on `lopdf` for the object model. The pieces, leaves first:
//!
//! - [`tokenizer`]: lenient content-stream and CMap lexer.
//! - [`cmap`], [`widths`], [`font`]: the [`FontDecoder`] and what it is built from.
//! - [`registry`]: the per-document arena of decoders.
//! - [`collector`]: the [`TextPlacementCollector`] interpreter.
//! - [`dispatcher`]: the recursive driver that feeds a [`ContentHandler`] and
//!   follows form XObjects.
//! - [`document`]: page access and [`PdfDocument::extract_page`].

pub mod cmap;
pub mod collector;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod font;
pub mod handler;
mod objects;
pub mod registry;
pub mod state;
pub mod tokenizer;
pub mod widths;

pub use collector::{PageOutput, TextPlacementCollector};
pub use dispatcher::dispatch_page;
pub use document::PdfDocument;
pub use error::BackendError;
pub use font::{CodeLayout, DecodingStrategy, Displacement, FontDecoder};
pub use handler::ContentHandler;
pub use registry::{FontHandle, FontRegistry};
pub use state::{GraphicsState, ResourceScope};
pub use textplace_core;
