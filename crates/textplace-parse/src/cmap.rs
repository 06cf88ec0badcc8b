//! ToUnicode CMap parsing.
//!
//! A ToUnicode CMap is a small PostScript program. Its interesting parts are
//! the `bfchar` and `bfrange` sections, which map source codes to UTF-16BE
//! destination strings. Embedded encoding CMaps of composite fonts use
//! `cidchar`/`cidrange` sections instead and parse into [`CidMap`].

use std::collections::HashMap;

use crate::tokenizer::{Operand, Operator, tokenize};

/// Upper bound on the number of codes a single `bfrange` entry may expand to.
const MAX_RANGE_SPAN: u32 = 0x1_0000;

/// A parsed ToUnicode map from character codes to Unicode text.
///
/// Destinations are strings because one code may expand to several code
/// points (a ligature glyph mapping to "ffi", for instance).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeMap {
    /// Parse the decoded bytes of a ToUnicode stream.
    ///
    /// Parsing is lenient; entries that cannot be understood are skipped,
    /// so the result may be empty.
    pub fn parse(data: &[u8]) -> Self {
        let mut map = ToUnicodeMap::default();
        for op in tokenize(data) {
            match op.name.as_str() {
                "endbfchar" => map.read_bfchar(&op),
                "endbfrange" => map.read_bfrange(&op),
                _ => {}
            }
        }
        map
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// First code (lowest numerically) whose destination is exactly `text`.
    pub fn code_for(&self, text: &str) -> Option<u32> {
        self.mappings
            .iter()
            .filter(|(_, dest)| dest.as_str() == text)
            .map(|(code, _)| *code)
            .min()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn read_bfchar(&mut self, op: &Operator) {
        for pair in op.operands.chunks_exact(2) {
            let (Some(src), Some(dst)) = (pair[0].as_bytes(), pair[1].as_bytes()) else {
                continue;
            };
            let Some(code) = code_value(src) else {
                continue;
            };
            self.mappings.insert(code, decode_utf16be(dst));
        }
    }

    fn read_bfrange(&mut self, op: &Operator) {
        for triple in op.operands.chunks_exact(3) {
            let (Some(low_bytes), Some(high_bytes)) = (triple[0].as_bytes(), triple[1].as_bytes())
            else {
                continue;
            };
            let (Some(low), Some(high)) = (code_value(low_bytes), code_value(high_bytes)) else {
                continue;
            };
            if high < low || high - low >= MAX_RANGE_SPAN {
                continue;
            }
            match &triple[2] {
                Operand::Array(destinations) => {
                    for (code, dst) in (low..=high).zip(destinations) {
                        if let Some(bytes) = dst.as_bytes() {
                            self.mappings.insert(code, decode_utf16be(bytes));
                        }
                    }
                }
                dst => {
                    let Some(start) = dst.as_bytes() else {
                        continue;
                    };
                    for (offset, code) in (low..=high).enumerate() {
                        self.mappings
                            .insert(code, decode_utf16be(&increment_last(start, offset as u32)));
                    }
                }
            }
        }
    }
}

/// Code-to-CID mapping from an embedded encoding CMap (`cidchar`/`cidrange`).
///
/// Codes outside every range map to themselves, which matches the
/// `Identity-H` behaviour most producers rely on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CidMap {
    singles: HashMap<u32, u32>,
    ranges: Vec<(u32, u32, u32)>,
}

impl CidMap {
    pub fn parse(data: &[u8]) -> Self {
        let mut map = CidMap::default();
        for op in tokenize(data) {
            match op.name.as_str() {
                "endcidchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        let code = pair[0].as_bytes().and_then(code_value);
                        let cid = pair[1].as_i64().and_then(|v| u32::try_from(v).ok());
                        if let (Some(code), Some(cid)) = (code, cid) {
                            map.singles.insert(code, cid);
                        }
                    }
                }
                "endcidrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        let low = triple[0].as_bytes().and_then(code_value);
                        let high = triple[1].as_bytes().and_then(code_value);
                        let cid = triple[2].as_i64().and_then(|v| u32::try_from(v).ok());
                        if let (Some(low), Some(high), Some(cid)) = (low, high, cid) {
                            if low <= high {
                                map.ranges.push((low, high, cid));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        map
    }

    pub fn cid(&self, code: u32) -> u32 {
        if let Some(cid) = self.singles.get(&code) {
            return *cid;
        }
        self.ranges
            .iter()
            .find(|(low, high, _)| (*low..=*high).contains(&code))
            .map_or(code, |(low, _, start)| start.saturating_add(code - low))
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }
}

/// Big-endian integer value of a source code of 1 to 4 bytes.
fn code_value(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    Some(bytes.iter().fold(0u32, |acc, &b| acc << 8 | u32::from(b)))
}

/// Add `offset` to the final 16-bit unit of a UTF-16BE destination.
fn increment_last(start: &[u8], offset: u32) -> Vec<u8> {
    let mut out = start.to_vec();
    let n = out.len();
    if n >= 2 {
        let last = u32::from(u16::from_be_bytes([out[n - 2], out[n - 1]])) + offset;
        let [hi, lo] = ((last & 0xFFFF) as u16).to_be_bytes();
        out[n - 2] = hi;
        out[n - 1] = lo;
    } else if n == 1 {
        out[0] = out[0].wrapping_add(offset as u8);
    }
    out
}

/// Decode a UTF-16BE destination string. A single byte is read as a code point.
fn decode_utf16be(bytes: &[u8]) -> String {
    if bytes.len() == 1 {
        return char::from(bytes[0]).to_string();
    }
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [lo] => u16::from(*lo),
            _ => 0,
        })
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0020>
<0011> <00660069>
endbfchar
2 beginbfrange
<0024> <0026> <0041>
<0030> <0032> [<0078> <0079> <D83DDE00>]
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn parses_bfchar_entries() {
        let map = ToUnicodeMap::parse(SAMPLE);
        assert_eq!(map.lookup(0x0003), Some(" "));
        assert_eq!(map.lookup(0x0011), Some("fi"));
    }

    #[test]
    fn parses_incrementing_bfrange() {
        let map = ToUnicodeMap::parse(SAMPLE);
        assert_eq!(map.lookup(0x0024), Some("A"));
        assert_eq!(map.lookup(0x0025), Some("B"));
        assert_eq!(map.lookup(0x0026), Some("C"));
        assert_eq!(map.lookup(0x0027), None);
    }

    #[test]
    fn parses_array_bfrange_with_surrogates() {
        let map = ToUnicodeMap::parse(SAMPLE);
        assert_eq!(map.lookup(0x0030), Some("x"));
        assert_eq!(map.lookup(0x0031), Some("y"));
        assert_eq!(map.lookup(0x0032), Some("\u{1F600}"));
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn single_byte_codes() {
        let map = ToUnicodeMap::parse(b"1 beginbfchar <20> <0020> endbfchar 1 beginbfrange <41> <42> <0061> endbfrange");
        assert_eq!(map.lookup(0x20), Some(" "));
        assert_eq!(map.lookup(0x41), Some("a"));
        assert_eq!(map.lookup(0x42), Some("b"));
    }

    #[test]
    fn code_for_finds_lowest_code() {
        let map = ToUnicodeMap::parse(b"2 beginbfchar <05> <0020> <03> <0020> endbfchar");
        assert_eq!(map.code_for(" "), Some(3));
        assert_eq!(map.code_for("z"), None);
    }

    #[test]
    fn garbage_yields_empty_map() {
        let map = ToUnicodeMap::parse(b"this is not a cmap )))");
        assert!(map.is_empty());
    }

    #[test]
    fn inverted_or_huge_ranges_are_ignored() {
        let map = ToUnicodeMap::parse(
            b"2 beginbfrange <0010> <0005> <0041> <00000000> <00FFFFFF> <0041> endbfrange",
        );
        assert!(map.is_empty());
    }

    #[test]
    fn odd_entry_counts_keep_complete_pairs() {
        let map = ToUnicodeMap::parse(b"2 beginbfchar <01> <0041> <02> endbfchar");
        assert_eq!(map.lookup(1), Some("A"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn cid_map_chars_and_ranges() {
        let map = CidMap::parse(
            b"1 begincidchar <0005> 900 endcidchar 1 begincidrange <0010> <0020> 100 endcidrange",
        );
        assert!(!map.is_empty());
        assert_eq!(map.cid(0x0005), 900);
        assert_eq!(map.cid(0x0010), 100);
        assert_eq!(map.cid(0x0015), 105);
        assert_eq!(map.cid(0x0030), 0x0030);
    }

    #[test]
    fn increment_carries_only_within_last_unit() {
        assert_eq!(increment_last(&[0x00, 0x41], 2), vec![0x00, 0x43]);
        assert_eq!(increment_last(&[0x00, 0x66, 0x00, 0x66], 1), vec![0x00, 0x66, 0x00, 0x67]);
    }
}
