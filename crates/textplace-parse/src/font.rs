//! Font decoding: byte strings to Unicode text and glyph advance widths.
//!
//! A [`FontDecoder`] is built once per font dictionary and is immutable
//! afterwards. At construction it selects one [`DecodingStrategy`], highest
//! priority first:
//!
//! 1. [`ToUnicodeMapped`](DecodingStrategy::ToUnicodeMapped) when the font
//!    carries a usable `/ToUnicode` CMap (simple or composite fonts).
//! 2. [`SimpleEncoded`](DecodingStrategy::SimpleEncoded) for simple fonts
//!    whose `/Encoding` names a known base encoding, optionally with
//!    `/Differences`.
//! 3. [`CompositeWidthOnly`](DecodingStrategy::CompositeWidthOnly) for Type0
//!    fonts without a ToUnicode map; text falls back to an identity mapping.
//! 4. [`DefaultFallback`](DecodingStrategy::DefaultFallback) for simple fonts
//!    with no recognisable encoding.
//!
//! Decoding and width lookup are total. Unmapped codes contribute U+FFFD and
//! missing widths fall back to the font's default width.

use lopdf::{Dictionary, Document, Object};
use textplace_core::{
    ExtractWarning, ExtractWarningCode, FontDescription, FontFlags, FontId, SimpleEncoding,
    StandardEncoding, strip_subset_prefix,
};

use crate::cmap::{CidMap, ToUnicodeMap};
use crate::objects::{
    as_dict, decode_stream, get, get_array, get_dict, get_name, get_number, get_stream, get_text,
    number_of, resolve,
};
use crate::widths::WidthTable;

/// Default glyph width for simple fonts lacking both `/Widths` and `/MissingWidth`.
pub const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;
/// Default glyph width for CID fonts lacking `/DW`.
pub const DEFAULT_CID_WIDTH: f64 = 1000.0;
pub const DEFAULT_SIMPLE_ASCENT: f64 = 750.0;
pub const DEFAULT_SIMPLE_DESCENT: f64 = -250.0;
pub const DEFAULT_CID_ASCENT: f64 = 880.0;
pub const DEFAULT_CID_DESCENT: f64 = -120.0;
/// Space width estimate (a quarter em) when no space glyph can be located.
pub const DEFAULT_SPACE_WIDTH: f64 = 250.0;
const COURIER_WIDTH: f64 = 600.0;

/// How a shown byte string splits into character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLayout {
    /// One byte per code (simple fonts).
    SingleByte,
    /// Two big-endian bytes per code (composite fonts). A trailing odd byte
    /// is read as a one-byte code.
    TwoByte,
}

impl CodeLayout {
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        match self {
            CodeLayout::SingleByte => bytes.iter().map(|&b| u32::from(b)).collect(),
            CodeLayout::TwoByte => bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect(),
        }
    }
}

/// The text decoding strategy selected for a font.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodingStrategy {
    ToUnicodeMapped(ToUnicodeMap),
    SimpleEncoded(SimpleEncoding),
    CompositeWidthOnly,
    DefaultFallback(StandardEncoding),
}

impl DecodingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            DecodingStrategy::ToUnicodeMapped(_) => "ToUnicode",
            DecodingStrategy::SimpleEncoded(_) => "SimpleEncoding",
            DecodingStrategy::CompositeWidthOnly => "CompositeIdentity",
            DecodingStrategy::DefaultFallback(_) => "DefaultEncoding",
        }
    }

    fn decode_code(&self, code: u32, out: &mut String) {
        let mapped = match self {
            DecodingStrategy::ToUnicodeMapped(map) => map.lookup(code).map(|s| out.push_str(s)),
            DecodingStrategy::SimpleEncoded(encoding) => u8::try_from(code)
                .ok()
                .and_then(|b| encoding.lookup(b))
                .map(|s| out.push_str(s)),
            DecodingStrategy::CompositeWidthOnly => char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(|c| out.push(c)),
            DecodingStrategy::DefaultFallback(encoding) => u8::try_from(code)
                .ok()
                .and_then(|b| encoding.decode(b))
                .map(|c| out.push(c)),
        };
        if mapped.is_none() {
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn space_code(&self) -> Option<u32> {
        match self {
            DecodingStrategy::ToUnicodeMapped(map) => map.code_for(" "),
            DecodingStrategy::SimpleEncoded(encoding) => encoding.code_for(" ").map(u32::from),
            DecodingStrategy::CompositeWidthOnly => None,
            DecodingStrategy::DefaultFallback(encoding) => (0..=255u8)
                .find(|&b| encoding.decode(b) == Some(' '))
                .map(u32::from),
        }
    }
}

/// The advance of one glyph, in glyph space (thousandths of an em).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub width: f64,
    pub code: u32,
}

/// Decoder for one font object.
#[derive(Debug, Clone)]
pub struct FontDecoder {
    strategy: DecodingStrategy,
    layout: CodeLayout,
    /// Code → CID for composite fonts with an embedded CMap; identity otherwise.
    cid_map: Option<CidMap>,
    widths: WidthTable,
    /// Multiplier turning table widths into thousandths of an em (Type3 `/FontMatrix`).
    width_scale: f64,
    description: FontDescription,
    warnings: Vec<ExtractWarning>,
}

impl FontDecoder {
    /// Build a decoder from a font dictionary.
    ///
    /// Never fails: anomalies degrade to the next strategy or to fixed
    /// defaults and are recorded in [`warnings`](Self::warnings).
    pub fn build(doc: &Document, font_id: FontId, font: &Dictionary) -> Self {
        let mut warnings = Vec::new();
        let subtype = get_name(doc, font, b"Subtype").unwrap_or_default();
        let base_font = get_name(doc, font, b"BaseFont").unwrap_or_default();
        let font_name = strip_subset_prefix(&base_font).to_string();
        let composite = subtype == "Type0";

        let descendant = if composite {
            let found = descendant_font(doc, font);
            if found.is_none() {
                warnings.push(ExtractWarning::with_code(
                    ExtractWarningCode::MalformedObject,
                    format!("Type0 font {font_name} has no usable /DescendantFonts"),
                ));
            }
            found
        } else {
            None
        };
        let descriptor = get_dict(doc, descendant.unwrap_or(font), b"FontDescriptor");
        let flags = descriptor
            .and_then(|d| get_number(doc, d, b"Flags"))
            .map_or(FontFlags::default(), |bits| FontFlags(bits as u32));

        let strategy = select_strategy(doc, font, &subtype, composite, &mut warnings);

        let (layout, cid_map, widths) = if composite {
            let widths = match descendant {
                Some(cid_font) => cid_widths(doc, cid_font),
                None => WidthTable::new(DEFAULT_CID_WIDTH),
            };
            (CodeLayout::TwoByte, composite_cid_map(doc, font), widths)
        } else {
            let missing = descriptor
                .and_then(|d| get_number(doc, d, b"MissingWidth"))
                .filter(|w| *w > 0.0)
                .unwrap_or(DEFAULT_SIMPLE_WIDTH);
            let mut widths = WidthTable::from_simple_font(doc, font, missing);
            let courier = font_name.starts_with("Courier");
            if flags.is_fixed_pitch() || courier {
                let fallback = if courier {
                    COURIER_WIDTH
                } else {
                    widths.default_width()
                };
                let mono = widths.first_nonzero().unwrap_or(fallback);
                widths = widths.with_monospace(mono);
            }
            (CodeLayout::SingleByte, None, widths)
        };

        let width_scale = if subtype == "Type3" {
            type3_width_scale(doc, font)
        } else {
            1.0
        };

        let (ascent, descent) = vertical_metrics(doc, descriptor, composite);
        let family_name = descriptor
            .and_then(|d| get_text(doc, d, b"FontFamily"))
            .unwrap_or_else(|| family_from_name(&font_name));
        let stretch = descriptor
            .and_then(|d| get_name(doc, d, b"FontStretch"))
            .unwrap_or_default();
        let weight = descriptor
            .and_then(|d| get_number(doc, d, b"FontWeight"))
            .map(|w| w as i32)
            .unwrap_or_else(|| {
                if flags.contains(FontFlags::FORCE_BOLD) || font_name.contains("Bold") {
                    700
                } else {
                    400
                }
            });

        let mut decoder = FontDecoder {
            strategy,
            layout,
            cid_map,
            widths,
            width_scale,
            description: FontDescription {
                font_id,
                ascent,
                descent,
                space_width: DEFAULT_SPACE_WIDTH,
                family_name,
                font_name,
                stretch,
                weight,
                flags,
            },
            warnings,
        };
        decoder.description.space_width = decoder
            .find_space_code()
            .map(|code| decoder.width_of(code))
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_SPACE_WIDTH);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            font = %decoder.description.font_name,
            id = %font_id,
            strategy = decoder.strategy.name(),
            "built font decoder"
        );
        decoder
    }

    /// Decode a shown byte string to UTF-8 text.
    pub fn decode_text(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for code in self.layout.codes(bytes) {
            self.strategy.decode_code(code, &mut out);
        }
        out
    }

    /// Per-glyph advance widths for a shown byte string, in code order.
    pub fn compute_displacements(&self, bytes: &[u8]) -> Vec<Displacement> {
        self.layout
            .codes(bytes)
            .into_iter()
            .map(|code| Displacement {
                width: self.width_of(code),
                code,
            })
            .collect()
    }

    /// Advance width of `code` in thousandths of an em.
    pub fn width_of(&self, code: u32) -> f64 {
        let cid = self.cid_map.as_ref().map_or(code, |map| map.cid(code));
        self.widths.width(cid) * self.width_scale
    }

    /// The character code that decodes to a single space, if any.
    pub fn find_space_code(&self) -> Option<u32> {
        self.strategy.space_code()
    }

    /// Whether word spacing (`Tw`) applies to `code`: only the single-byte code 32.
    pub fn is_word_space(&self, code: u32) -> bool {
        self.layout == CodeLayout::SingleByte && code == 32
    }

    pub fn description(&self) -> &FontDescription {
        &self.description
    }

    pub fn font_id(&self) -> FontId {
        self.description.font_id
    }

    /// Re-key a decoder for an inline font when registries are merged.
    pub(crate) fn with_font_id(mut self, font_id: FontId) -> Self {
        self.description.font_id = font_id;
        self
    }

    pub fn strategy(&self) -> &DecodingStrategy {
        &self.strategy
    }

    pub fn layout(&self) -> CodeLayout {
        self.layout
    }

    pub fn widths(&self) -> &WidthTable {
        &self.widths
    }

    /// Anomalies absorbed while building the decoder.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }
}

fn select_strategy(
    doc: &Document,
    font: &Dictionary,
    subtype: &str,
    composite: bool,
    warnings: &mut Vec<ExtractWarning>,
) -> DecodingStrategy {
    if let Some(stream) = get_stream(doc, font, b"ToUnicode") {
        match decode_stream(stream) {
            Ok(bytes) => {
                let map = ToUnicodeMap::parse(&bytes);
                if !map.is_empty() {
                    return DecodingStrategy::ToUnicodeMapped(map);
                }
                warnings.push(ExtractWarning::with_code(
                    ExtractWarningCode::EncodingFallback,
                    "ToUnicode CMap has no usable mappings",
                ));
            }
            Err(e) => warnings.push(ExtractWarning::with_code(
                ExtractWarningCode::MalformedObject,
                format!("unreadable ToUnicode stream: {e}"),
            )),
        }
    }

    if composite {
        return DecodingStrategy::CompositeWidthOnly;
    }

    let builtin = builtin_encoding(subtype);
    match get(doc, font, b"Encoding") {
        Some(Object::Name(name)) => {
            let name = String::from_utf8_lossy(name);
            match StandardEncoding::from_name(&name) {
                Some(base) => DecodingStrategy::SimpleEncoded(SimpleEncoding::from_standard(base)),
                None => {
                    warnings.push(ExtractWarning::with_code(
                        ExtractWarningCode::EncodingFallback,
                        format!("unknown encoding /{name}, using {}", builtin.name()),
                    ));
                    DecodingStrategy::DefaultFallback(builtin)
                }
            }
        }
        Some(Object::Dictionary(dict)) => {
            let base = get_name(doc, dict, b"BaseEncoding")
                .and_then(|name| StandardEncoding::from_name(&name))
                .unwrap_or(builtin);
            let mut encoding = SimpleEncoding::from_standard(base);
            if let Some(differences) = get_array(doc, dict, b"Differences") {
                apply_differences(doc, &mut encoding, differences);
            }
            DecodingStrategy::SimpleEncoded(encoding)
        }
        Some(_) => {
            warnings.push(ExtractWarning::with_code(
                ExtractWarningCode::MalformedObject,
                "font /Encoding is neither a name nor a dictionary",
            ));
            DecodingStrategy::DefaultFallback(builtin)
        }
        None => DecodingStrategy::DefaultFallback(builtin),
    }
}

/// Built-in encoding assumed for a simple font with no usable `/Encoding`.
fn builtin_encoding(subtype: &str) -> StandardEncoding {
    if subtype == "TrueType" {
        StandardEncoding::WinAnsi
    } else {
        StandardEncoding::Standard
    }
}

/// Apply a `/Differences` array: each number restarts the code, each
/// following name assigns a glyph and advances the code by one.
fn apply_differences(doc: &Document, encoding: &mut SimpleEncoding, items: &[Object]) {
    let mut code: Option<u32> = None;
    for item in items {
        match resolve(doc, item) {
            Some(Object::Name(name)) => {
                if let Some(current) = code {
                    if let Ok(byte) = u8::try_from(current) {
                        encoding.apply_difference(byte, &String::from_utf8_lossy(name));
                    }
                    code = Some(current + 1);
                }
            }
            Some(other) => {
                code = number_of(other)
                    .filter(|v| *v >= 0.0)
                    .map(|v| v as u32);
            }
            None => {}
        }
    }
}

fn descendant_font<'a>(doc: &'a Document, font: &'a Dictionary) -> Option<&'a Dictionary> {
    let first = get_array(doc, font, b"DescendantFonts")?.first()?;
    as_dict(resolve(doc, first)?)
}

fn composite_cid_map(doc: &Document, font: &Dictionary) -> Option<CidMap> {
    match get(doc, font, b"Encoding")? {
        Object::Stream(stream) => {
            let map = CidMap::parse(&decode_stream(stream).ok()?);
            (!map.is_empty()).then_some(map)
        }
        // Identity-H/V, or a predefined CMap we have no tables for: codes are CIDs.
        _ => None,
    }
}

fn cid_widths(doc: &Document, cid_font: &Dictionary) -> WidthTable {
    let default_width = get_number(doc, cid_font, b"DW").unwrap_or(DEFAULT_CID_WIDTH);
    match get_array(doc, cid_font, b"W") {
        Some(w) => WidthTable::from_w_array(doc, w, default_width),
        None => WidthTable::new(default_width),
    }
}

fn type3_width_scale(doc: &Document, font: &Dictionary) -> f64 {
    get_array(doc, font, b"FontMatrix")
        .and_then(|m| m.first())
        .and_then(|a| resolve(doc, a))
        .and_then(number_of)
        .filter(|a| *a > 0.0)
        .map_or(1.0, |a| a * 1000.0)
}

/// Ascent and descent from the descriptor, its `/FontBBox`, or fixed defaults.
fn vertical_metrics(doc: &Document, descriptor: Option<&Dictionary>, composite: bool) -> (f64, f64) {
    let defaults = if composite {
        (DEFAULT_CID_ASCENT, DEFAULT_CID_DESCENT)
    } else {
        (DEFAULT_SIMPLE_ASCENT, DEFAULT_SIMPLE_DESCENT)
    };
    let Some(descriptor) = descriptor else {
        return defaults;
    };

    let ascent = get_number(doc, descriptor, b"Ascent");
    let descent = get_number(doc, descriptor, b"Descent");
    if let (Some(a), Some(d)) = (ascent, descent) {
        if a != 0.0 || d != 0.0 {
            return (a, -d.abs());
        }
    }

    let bbox: Option<Vec<f64>> = get_array(doc, descriptor, b"FontBBox").map(|items| {
        items
            .iter()
            .filter_map(|o| resolve(doc, o).and_then(number_of))
            .collect()
    });
    match bbox.as_deref() {
        Some([_, lly, _, ury]) if ury > lly => (*ury, lly.min(0.0)),
        _ => defaults,
    }
}

/// `Helvetica-Bold` → `Helvetica`, `Arial,Italic` → `Arial`.
fn family_from_name(font_name: &str) -> String {
    font_name
        .split(['-', ','])
        .next()
        .unwrap_or(font_name)
        .to_string()
}
