//! Glyph advance width tables.
//!
//! Simple fonts index `/Widths` by `code - /FirstChar`; composite fonts
//! describe widths per CID with the `/W` array. Both share the same
//! lookup chain: monospace override, explicit entry, default width.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use crate::objects::{get_array, get_number, number_of, resolve};

/// Largest CID; `/W` ranges are clamped to it.
const MAX_CID: u32 = 0xFFFF;

/// Largest single-byte code.
const MAX_SIMPLE_CODE: u32 = 0xFF;

/// Advance widths in glyph space (thousandths of an em).
#[derive(Debug, Clone, PartialEq)]
pub struct WidthTable {
    widths: HashMap<u32, f64>,
    default_width: f64,
    monospace_width: Option<f64>,
}

impl WidthTable {
    pub fn new(default_width: f64) -> Self {
        Self {
            widths: HashMap::new(),
            default_width,
            monospace_width: None,
        }
    }

    /// Widths from a simple font's `/FirstChar` and `/Widths`.
    ///
    /// A `/FirstChar` outside the single-byte range discards the widths, and
    /// entries past code 255 are ignored.
    pub fn from_simple_font(doc: &Document, font: &Dictionary, default_width: f64) -> Self {
        let mut table = Self::new(default_width);
        let first_char = match get_number(doc, font, b"FirstChar") {
            None => Some(0),
            Some(v) if (0.0..=f64::from(MAX_SIMPLE_CODE)).contains(&v) => Some(v as u32),
            Some(_) => None,
        };
        if let (Some(first_char), Some(widths)) = (first_char, get_array(doc, font, b"Widths")) {
            for (code, obj) in (first_char..=MAX_SIMPLE_CODE).zip(widths) {
                if let Some(width) = resolve(doc, obj).and_then(number_of) {
                    table.widths.insert(code, width);
                }
            }
        }
        table
    }

    /// Widths from a CIDFont's `/W` array.
    ///
    /// Accepts both run forms: `c [w1 w2 ...]` assigns consecutive CIDs from
    /// `c`, and `c_first c_last w` assigns `w` to the whole range. Malformed
    /// runs are skipped.
    pub fn from_w_array(doc: &Document, items: &[Object], default_width: f64) -> Self {
        let mut table = Self::new(default_width);
        let resolved: Vec<&Object> = items.iter().filter_map(|o| resolve(doc, o)).collect();
        let mut i = 0;
        while i < resolved.len() {
            let Some(start) = cid_of(resolved[i]) else {
                i += 1;
                continue;
            };
            match resolved.get(i + 1) {
                Some(Object::Array(run)) => {
                    for (offset, obj) in run.iter().enumerate() {
                        let cid = start.saturating_add(offset as u32);
                        if cid > MAX_CID {
                            break;
                        }
                        if let Some(width) = resolve(doc, obj).and_then(number_of) {
                            table.widths.insert(cid, width);
                        }
                    }
                    i += 2;
                }
                Some(next) => {
                    let end = cid_of(next);
                    let width = resolved.get(i + 2).and_then(|o| number_of(o));
                    if let (Some(end), Some(width)) = (end, width) {
                        for cid in start..=end.min(MAX_CID) {
                            table.widths.insert(cid, width);
                        }
                    }
                    i += 3;
                }
                None => break,
            }
        }
        table
    }

    /// Force every lookup to return `width`.
    pub fn with_monospace(mut self, width: f64) -> Self {
        self.monospace_width = Some(width);
        self
    }

    /// Advance width for `code`, falling back to the default width.
    pub fn width(&self, code: u32) -> f64 {
        if let Some(mono) = self.monospace_width {
            return mono;
        }
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }

    pub fn default_width(&self) -> f64 {
        self.default_width
    }

    pub fn monospace_width(&self) -> Option<f64> {
        self.monospace_width
    }

    /// The lowest-coded non-zero explicit width, used to seed a monospace width.
    pub fn first_nonzero(&self) -> Option<f64> {
        self.widths
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .min_by_key(|(code, _)| **code)
            .map(|(_, w)| *w)
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

fn cid_of(obj: &Object) -> Option<u32> {
    match obj {
        Object::Integer(i) => u32::try_from(*i).ok(),
        Object::Real(r) if *r >= 0.0 => Some(f64::from(*r) as u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn ints(values: &[i64]) -> Vec<Object> {
        values.iter().map(|v| Object::Integer(*v)).collect()
    }

    #[test]
    fn simple_widths_offset_by_first_char() {
        let doc = Document::with_version("1.7");
        let font = dictionary! {
            "FirstChar" => 65,
            "Widths" => ints(&[722, 667, 722]),
        };
        let table = WidthTable::from_simple_font(&doc, &font, 500.0);
        assert_eq!(table.width(65), 722.0);
        assert_eq!(table.width(66), 667.0);
        assert_eq!(table.width(67), 722.0);
        assert_eq!(table.width(64), 500.0);
        assert_eq!(table.width(68), 500.0);
    }

    #[test]
    fn simple_widths_through_reference() {
        let mut doc = Document::with_version("1.7");
        let widths_id = doc.add_object(Object::Array(ints(&[250, 300])));
        let font = dictionary! { "FirstChar" => 32, "Widths" => widths_id };
        let table = WidthTable::from_simple_font(&doc, &font, 0.0);
        assert_eq!(table.width(32), 250.0);
        assert_eq!(table.width(33), 300.0);
    }

    #[test]
    fn first_char_outside_byte_range_is_ignored() {
        let doc = Document::with_version("1.7");
        let font = dictionary! {
            "FirstChar" => 4_294_967_295_i64,
            "Widths" => ints(&[500, 600]),
        };
        let table = WidthTable::from_simple_font(&doc, &font, 250.0);
        assert!(table.is_empty());
        assert_eq!(table.width(0), 250.0);

        let font = dictionary! { "FirstChar" => -3, "Widths" => ints(&[500]) };
        assert!(WidthTable::from_simple_font(&doc, &font, 250.0).is_empty());
    }

    #[test]
    fn widths_stop_at_last_byte_code() {
        let doc = Document::with_version("1.7");
        let font = dictionary! { "FirstChar" => 254, "Widths" => ints(&[100, 200, 300, 400]) };
        let table = WidthTable::from_simple_font(&doc, &font, 0.0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.width(255), 200.0);
        assert_eq!(table.width(256), 0.0);
    }

    #[test]
    fn w_array_list_form() {
        let doc = Document::with_version("1.7");
        let w = vec![Object::Integer(10), Object::Array(ints(&[500, 600, 700]))];
        let table = WidthTable::from_w_array(&doc, &w, 1000.0);
        assert_eq!(table.width(10), 500.0);
        assert_eq!(table.width(11), 600.0);
        assert_eq!(table.width(12), 700.0);
        assert_eq!(table.width(9), 1000.0);
        assert_eq!(table.width(13), 1000.0);
    }

    #[test]
    fn w_array_range_form_and_mixed() {
        let doc = Document::with_version("1.7");
        let mut w = ints(&[20, 25, 450]);
        w.push(Object::Integer(40));
        w.push(Object::Array(vec![Object::Real(333.5)]));
        let table = WidthTable::from_w_array(&doc, &w, 1000.0);
        for cid in 20..=25 {
            assert_eq!(table.width(cid), 450.0);
        }
        assert_eq!(table.width(26), 1000.0);
        assert_eq!(table.width(40), 333.5);
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn w_array_malformed_runs_skipped() {
        let doc = Document::with_version("1.7");
        let w = vec![
            Object::Name(b"junk".to_vec()),
            Object::Integer(5),
            Object::Array(ints(&[100])),
            Object::Integer(7),
        ];
        let table = WidthTable::from_w_array(&doc, &w, 1000.0);
        assert_eq!(table.width(5), 100.0);
        assert_eq!(table.width(7), 1000.0);
    }

    #[test]
    fn w_array_huge_range_is_clamped() {
        let doc = Document::with_version("1.7");
        let w = ints(&[65_530, 4_000_000_000, 10]);
        let table = WidthTable::from_w_array(&doc, &w, 1000.0);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn monospace_overrides_every_lookup() {
        let doc = Document::with_version("1.7");
        let font = dictionary! { "FirstChar" => 0, "Widths" => ints(&[0, 600, 500]) };
        let table = WidthTable::from_simple_font(&doc, &font, 0.0);
        assert_eq!(table.first_nonzero(), Some(600.0));
        let mono = table.with_monospace(600.0);
        assert_eq!(mono.width(2), 600.0);
        assert_eq!(mono.width(200), 600.0);
        assert_eq!(mono.first_nonzero(), Some(600.0));
    }
}
