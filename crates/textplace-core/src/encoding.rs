//! Single-byte font encodings and glyph-name resolution.
//!
//! Covers the named base encodings a simple font may declare, the
//! `/Differences` override mechanism, and the mapping from PostScript glyph
//! names to Unicode text.

use unicode_normalization::UnicodeNormalization;

/// A named base encoding for simple fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardEncoding {
    /// `/WinAnsiEncoding`, Windows code page 1252.
    WinAnsi,
    /// `/MacRomanEncoding`, classic Mac OS Roman.
    MacRoman,
    /// `/StandardEncoding`, the Adobe standard Latin encoding.
    Standard,
    /// `/PDFDocEncoding`.
    PdfDoc,
}

impl StandardEncoding {
    /// Resolve a PDF encoding name (without the leading slash).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "MacRomanEncoding" => Some(Self::MacRoman),
            "StandardEncoding" => Some(Self::Standard),
            "PDFDocEncoding" => Some(Self::PdfDoc),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WinAnsi => "WinAnsiEncoding",
            Self::MacRoman => "MacRomanEncoding",
            Self::Standard => "StandardEncoding",
            Self::PdfDoc => "PDFDocEncoding",
        }
    }

    /// Unicode character for `code`, or `None` when the code is undefined.
    pub fn decode(&self, code: u8) -> Option<char> {
        match self {
            Self::WinAnsi => decode_single(encoding_rs::WINDOWS_1252, code),
            Self::MacRoman => decode_single(encoding_rs::MACINTOSH, code),
            Self::Standard => standard_encoding(code),
            Self::PdfDoc => pdf_doc_encoding(code),
        }
    }
}

fn decode_single(encoding: &'static encoding_rs::Encoding, code: u8) -> Option<char> {
    let bytes = [code];
    let (text, _) = encoding.decode_without_bom_handling(&bytes);
    text.chars()
        .next()
        .filter(|c| !c.is_control() && *c != char::REPLACEMENT_CHARACTER)
}

fn standard_encoding(code: u8) -> Option<char> {
    let c = match code {
        0x27 => '\u{2019}',
        0x60 => '\u{2018}',
        0x20..=0x7E => char::from(code),
        0xA1 => '¡',
        0xA2 => '¢',
        0xA3 => '£',
        0xA4 => '\u{2044}',
        0xA5 => '¥',
        0xA6 => '\u{0192}',
        0xA7 => '§',
        0xA8 => '¤',
        0xA9 => '\'',
        0xAA => '\u{201C}',
        0xAB => '«',
        0xAC => '\u{2039}',
        0xAD => '\u{203A}',
        0xAE => '\u{FB01}',
        0xAF => '\u{FB02}',
        0xB1 => '\u{2013}',
        0xB2 => '\u{2020}',
        0xB3 => '\u{2021}',
        0xB4 => '·',
        0xB6 => '¶',
        0xB7 => '\u{2022}',
        0xB8 => '\u{201A}',
        0xB9 => '\u{201E}',
        0xBA => '\u{201D}',
        0xBB => '»',
        0xBC => '\u{2026}',
        0xBD => '\u{2030}',
        0xBF => '¿',
        0xC1 => '`',
        0xC2 => '´',
        0xC3 => '\u{02C6}',
        0xC4 => '\u{02DC}',
        0xC5 => '¯',
        0xC6 => '\u{02D8}',
        0xC7 => '\u{02D9}',
        0xC8 => '¨',
        0xCA => '\u{02DA}',
        0xCB => '¸',
        0xCD => '\u{02DD}',
        0xCE => '\u{02DB}',
        0xCF => '\u{02C7}',
        0xD0 => '\u{2014}',
        0xE1 => 'Æ',
        0xE3 => 'ª',
        0xE8 => '\u{0141}',
        0xE9 => 'Ø',
        0xEA => '\u{0152}',
        0xEB => 'º',
        0xF1 => 'æ',
        0xF5 => '\u{0131}',
        0xF8 => '\u{0142}',
        0xF9 => 'ø',
        0xFA => '\u{0153}',
        0xFB => 'ß',
        _ => return None,
    };
    Some(c)
}

fn pdf_doc_encoding(code: u8) -> Option<char> {
    const HIGH: [char; 31] = [
        '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
        '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
        '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
        '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
        '\u{0153}', '\u{0161}', '\u{017E}',
    ];
    const ACCENTS: [char; 8] = [
        '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}',
        '\u{02DC}',
    ];
    match code {
        0x18..=0x1F => Some(ACCENTS[usize::from(code - 0x18)]),
        0x20..=0x7E => Some(char::from(code)),
        0x80..=0x9E => Some(HIGH[usize::from(code - 0x80)]),
        0xA0 => Some('\u{20AC}'),
        0xA1..=0xFF if code != 0xAD => Some(char::from(code)),
        _ => None,
    }
}

/// A 256-entry code → text table for a simple font.
///
/// Entries are strings rather than characters because a single glyph may
/// stand for several code points (ligatures such as `f_f_i`).
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEncoding {
    table: Vec<Option<String>>,
}

impl SimpleEncoding {
    /// A table with every code unmapped.
    pub fn empty() -> Self {
        Self {
            table: vec![None; 256],
        }
    }

    pub fn from_standard(base: StandardEncoding) -> Self {
        let table = (0..=255u8)
            .map(|code| base.decode(code).map(String::from))
            .collect();
        Self { table }
    }

    /// Override `code` with the glyph `glyph_name`.
    ///
    /// Glyph names that cannot be resolved to Unicode leave the code unmapped.
    pub fn apply_difference(&mut self, code: u8, glyph_name: &str) {
        self.table[usize::from(code)] = glyph_name_to_unicode(glyph_name);
    }

    /// Apply a sequence of `(code, glyph name)` overrides in order.
    pub fn apply_differences<'a>(&mut self, differences: impl IntoIterator<Item = (u8, &'a str)>) {
        for (code, name) in differences {
            self.apply_difference(code, name);
        }
    }

    pub fn lookup(&self, code: u8) -> Option<&str> {
        self.table[usize::from(code)].as_deref()
    }

    /// Find the first code whose text is exactly `text`.
    pub fn code_for(&self, text: &str) -> Option<u8> {
        self.table
            .iter()
            .position(|entry| entry.as_deref() == Some(text))
            .and_then(|index| u8::try_from(index).ok())
    }

    /// Number of codes with a mapping.
    pub fn mapped_count(&self) -> usize {
        self.table.iter().filter(|entry| entry.is_some()).count()
    }
}

/// Resolve a PostScript glyph name to the Unicode text it represents.
///
/// Handles the names of the Latin standard character set, `uniXXXX`
/// sequences, `uXXXX` to `uXXXXXX` values, accented Latin letters, and
/// names built from components (`f_f_i`) or carrying a variant suffix
/// (`a.sc`). Returns `None` for `.notdef` and unknown names.
pub fn glyph_name_to_unicode(name: &str) -> Option<String> {
    let base = match name.split_once('.') {
        Some(("", _)) => return None,
        Some((base, _)) => base,
        None => name,
    };

    if base.contains('_') {
        return base
            .split('_')
            .map(single_glyph)
            .collect::<Option<Vec<String>>>()
            .map(|parts| parts.concat());
    }
    single_glyph(base)
}

fn single_glyph(name: &str) -> Option<String> {
    if let Some(c) = named_glyph(name) {
        return Some(c.to_string());
    }
    if let Some(text) = name.strip_prefix("uni").and_then(uni_sequence) {
        return Some(text);
    }
    if let Some(c) = name
        .strip_prefix('u')
        .filter(|hex| (4..=6).contains(&hex.len()))
        .and_then(parse_scalar)
    {
        return Some(c.to_string());
    }
    if name.len() == 1 && name.as_bytes()[0].is_ascii_alphabetic() {
        return Some(name.to_string());
    }
    accented_letter(name).map(String::from)
}

fn uni_sequence(hex: &str) -> Option<String> {
    if hex.is_empty() || hex.len() % 4 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(4)
        .map(|i| parse_scalar(&hex[i..i + 4]))
        .collect()
}

fn parse_scalar(hex: &str) -> Option<char> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// `eacute`, `Ccedilla`, `zcaron`, ...: a base letter followed by an accent name.
fn accented_letter(name: &str) -> Option<char> {
    let mut chars = name.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let mark = match chars.as_str() {
        "grave" => '\u{0300}',
        "acute" => '\u{0301}',
        "circumflex" => '\u{0302}',
        "tilde" => '\u{0303}',
        "macron" => '\u{0304}',
        "breve" => '\u{0306}',
        "dotaccent" => '\u{0307}',
        "dieresis" => '\u{0308}',
        "ring" => '\u{030A}',
        "hungarumlaut" => '\u{030B}',
        "caron" => '\u{030C}',
        "cedilla" => '\u{0327}',
        "ogonek" => '\u{0328}',
        _ => return None,
    };
    let mut composed = [letter, mark].into_iter().nfc();
    match (composed.next(), composed.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn named_glyph(name: &str) -> Option<char> {
    let c = match name {
        "space" => ' ',
        "nbspace" => '\u{00A0}',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "exclamdown" => '¡',
        "cent" => '¢',
        "sterling" => '£',
        "currency" => '¤',
        "yen" => '¥',
        "brokenbar" => '¦',
        "section" => '§',
        "dieresis" => '¨',
        "copyright" => '©',
        "ordfeminine" => 'ª',
        "guillemotleft" => '«',
        "logicalnot" => '¬',
        "sfthyphen" => '\u{00AD}',
        "registered" => '®',
        "macron" => '¯',
        "degree" => '°',
        "plusminus" => '±',
        "twosuperior" => '²',
        "threesuperior" => '³',
        "acute" => '´',
        "mu" => 'µ',
        "paragraph" => '¶',
        "periodcentered" => '·',
        "cedilla" => '¸',
        "onesuperior" => '¹',
        "ordmasculine" => 'º',
        "guillemotright" => '»',
        "onequarter" => '¼',
        "onehalf" => '½',
        "threequarters" => '¾',
        "questiondown" => '¿',
        "AE" => 'Æ',
        "Eth" => 'Ð',
        "multiply" => '×',
        "Oslash" => 'Ø',
        "Thorn" => 'Þ',
        "germandbls" => 'ß',
        "ae" => 'æ',
        "eth" => 'ð',
        "divide" => '÷',
        "oslash" => 'ø',
        "thorn" => 'þ',
        "dotlessi" => '\u{0131}',
        "Lslash" => '\u{0141}',
        "lslash" => '\u{0142}',
        "OE" => '\u{0152}',
        "oe" => '\u{0153}',
        "florin" => '\u{0192}',
        "circumflex" => '\u{02C6}',
        "caron" => '\u{02C7}',
        "breve" => '\u{02D8}',
        "dotaccent" => '\u{02D9}',
        "ring" => '\u{02DA}',
        "ogonek" => '\u{02DB}',
        "tilde" => '\u{02DC}',
        "hungarumlaut" => '\u{02DD}',
        "Omega" => '\u{03A9}',
        "pi" => '\u{03C0}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotesinglbase" => '\u{201A}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotedblbase" => '\u{201E}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "bullet" => '\u{2022}',
        "ellipsis" => '\u{2026}',
        "perthousand" => '\u{2030}',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "fraction" => '\u{2044}',
        "Euro" => '\u{20AC}',
        "trademark" => '\u{2122}',
        "partialdiff" => '\u{2202}',
        "Delta" => '\u{2206}',
        "summation" => '\u{2211}',
        "minus" => '\u{2212}',
        "radical" => '\u{221A}',
        "infinity" => '\u{221E}',
        "integral" => '\u{222B}',
        "approxequal" => '\u{2248}',
        "notequal" => '\u{2260}',
        "lessequal" => '\u{2264}',
        "greaterequal" => '\u{2265}',
        "lozenge" => '\u{25CA}',
        "ff" => '\u{FB00}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "ffi" => '\u{FB03}',
        "ffl" => '\u{FB04}',
        _ => return None,
    };
    Some(c)
}
