//! Text-placement collector: the content-stream interpreter.
//!
//! [`TextPlacementCollector`] implements [`ContentHandler`]. A dispatcher
//! feeds it operators and scope changes; it keeps the graphics-state and
//! resource-scope stacks and emits one [`ParsedTextPlacement`] per string
//! run shown by `Tj`, `TJ`, `'` and `"`.
//!
//! For a run starting at text matrix `Tm` under `CTM`, each glyph advances
//!
//! ```text
//! tx = (w0 / 1000 × Tfs + Tc + Tw?) × Th
//! ```
//!
//! where `Tw` applies to the single-byte code 32 only. The local box spans
//! `0..Σtx` horizontally and the font's descent to ascent (scaled by `Tfs`,
//! shifted by `Ts`) vertically; the global box is the local box's four
//! corners mapped through `Tm × CTM`.

use lopdf::{Document, Object, ObjectId};
use textplace_core::{
    BBox, ExtractOptions, ExtractWarning, ExtractWarningCode, FontId, Matrix, ParsedTextPlacement,
};

use crate::handler::ContentHandler;
use crate::objects::{as_dict, get_array, number_of, resolve};
use crate::registry::{FontHandle, FontRegistry};
use crate::state::{GraphicsStack, GraphicsState, ResourceScope, ScopeStack};
use crate::tokenizer::{Operand, Operator};

/// Everything one page produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutput {
    /// Placements in program order, including those from nested forms.
    pub placements: Vec<ParsedTextPlacement>,
    pub warnings: Vec<ExtractWarning>,
}

/// Interpreter state for one page. Not reused across pages.
pub struct TextPlacementCollector<'a> {
    doc: &'a Document,
    registry: &'a mut FontRegistry,
    options: &'a ExtractOptions,
    graphics: GraphicsStack,
    scopes: ScopeStack,
    /// Graphics stack depth at each form entry, innermost last.
    form_marks: Vec<usize>,
    placements: Vec<ParsedTextPlacement>,
    warnings: Vec<ExtractWarning>,
    operator_index: usize,
    limit_reported: bool,
}

impl<'a> TextPlacementCollector<'a> {
    pub fn new(doc: &'a Document, registry: &'a mut FontRegistry, options: &'a ExtractOptions) -> Self {
        Self {
            doc,
            registry,
            options,
            graphics: GraphicsStack::default(),
            scopes: ScopeStack::default(),
            form_marks: Vec::new(),
            placements: Vec::new(),
            warnings: Vec::new(),
            operator_index: 0,
            limit_reported: false,
        }
    }

    pub fn graphics(&self) -> &GraphicsState {
        self.graphics.current()
    }

    pub fn placements(&self) -> &[ParsedTextPlacement] {
        &self.placements
    }

    /// Finish the page and hand back what was collected.
    pub fn on_done(self) -> PageOutput {
        PageOutput {
            placements: self.placements,
            warnings: self.warnings,
        }
    }

    fn warn(&mut self, warning: ExtractWarning) {
        if !self.options.collect_warnings {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(%warning, "content stream anomaly");
        self.warnings.push(warning);
    }

    fn invalid_operands(&mut self, index: usize, op: &Operator) {
        self.warn(ExtractWarning::with_operator_context(
            ExtractWarningCode::InvalidOperand,
            format!("{} skipped: unexpected operands {:?}", op.name, op.operands),
            index,
            None,
        ));
    }

    fn set_scalar(&mut self, index: usize, op: &Operator, apply: impl FnOnce(&mut GraphicsState, f64)) {
        match op.numbers::<1>() {
            Some([value]) => apply(self.graphics.current_mut(), value),
            None => self.invalid_operands(index, op),
        }
    }

    fn restore(&mut self) {
        let floor = self.form_marks.last().map_or(0, |mark| mark + 1);
        if self.graphics.depth() > floor {
            self.graphics.restore();
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("ignoring unbalanced Q");
        }
    }

    /// `Tf`.
    fn select_font(&mut self, index: usize, op: &Operator) {
        let [name, size] = op.operands.as_slice() else {
            self.invalid_operands(index, op);
            return;
        };
        let (Some(name), Some(size)) = (name.as_name(), size.as_f64()) else {
            self.invalid_operands(index, op);
            return;
        };
        let handle = self.font_by_name(index, name);
        let gs = self.graphics.current_mut();
        gs.font = handle;
        gs.font_size = size;
    }

    fn font_by_name(&mut self, index: usize, name: &str) -> Option<FontHandle> {
        let Some(obj) = self.scopes.font(name).cloned() else {
            self.warn(ExtractWarning::with_operator_context(
                ExtractWarningCode::MissingFont,
                format!("font /{name} is not defined in the current resources"),
                index,
                Some(name),
            ));
            return None;
        };
        let handle = self.load_font(index, &obj);
        if handle.is_none() && !matches!(obj, Object::Dictionary(_)) {
            self.warn(ExtractWarning::with_operator_context(
                ExtractWarningCode::MalformedObject,
                format!("font /{name} does not resolve to a font dictionary"),
                index,
                Some(name),
            ));
        }
        handle
    }

    /// Resolve a font object to a registry handle, building the decoder on first use.
    fn load_font(&mut self, index: usize, obj: &Object) -> Option<FontHandle> {
        let doc = self.doc;
        let (handle, created) = match obj {
            Object::Reference(id) => {
                let font_id = FontId::from(*id);
                match self.registry.handle(font_id) {
                    Some(handle) => (handle, false),
                    None => {
                        let dict = resolve(doc, obj).and_then(as_dict)?;
                        self.registry.get_or_build(doc, font_id, dict)
                    }
                }
            }
            Object::Dictionary(dict) => match self.registry.get_or_build_inline(doc, dict) {
                Some(found) => found,
                None => {
                    self.warn(ExtractWarning::with_operator_context(
                        ExtractWarningCode::ResourceLimitReached,
                        "no inline font ids left; font dictionary ignored",
                        index,
                        None,
                    ));
                    return None;
                }
            },
            _ => return None,
        };
        if created {
            let decoder = self.registry.decoder(handle);
            let font_name = decoder.description().font_name.clone();
            let absorbed: Vec<ExtractWarning> = decoder
                .warnings()
                .iter()
                .map(|w| ExtractWarning {
                    operator_index: Some(index),
                    font_name: Some(font_name.clone()),
                    ..w.clone()
                })
                .collect();
            for warning in absorbed {
                self.warn(warning);
            }
        }
        Some(handle)
    }

    /// `gs`: only the `/Font [font size]` entry affects text placement.
    fn apply_ext_gstate(&mut self, index: usize, name: &str) {
        let doc = self.doc;
        let Some(obj) = self.scopes.ext_gstate(name).cloned() else {
            self.warn(ExtractWarning::with_operator_context(
                ExtractWarningCode::InvalidOperand,
                format!("graphics state /{name} is not defined in the current resources"),
                index,
                None,
            ));
            return;
        };
        let Some(dict) = resolve(doc, &obj).and_then(as_dict) else {
            return;
        };
        if let Some([font, size]) = get_array(doc, dict, b"Font") {
            let size = resolve(doc, size).and_then(number_of);
            let handle = self.load_font(index, font);
            if let (Some(handle), Some(size)) = (handle, size) {
                let gs = self.graphics.current_mut();
                gs.font = Some(handle);
                gs.font_size = size;
            }
        }
    }

    /// Show one string run and emit its placement.
    fn show_text(&mut self, index: usize, bytes: &[u8]) {
        let gs = self.graphics.current();
        let Some(handle) = gs.font else {
            self.warn(ExtractWarning::with_operator_context(
                ExtractWarningCode::MissingFont,
                "text shown without a usable font",
                index,
                None,
            ));
            return;
        };
        if bytes.is_empty() {
            return;
        }

        let decoder = self.registry.decoder(handle);
        let font_size = gs.font_size;
        let scale = gs.horizontal_scale();
        let advance: f64 = decoder
            .compute_displacements(bytes)
            .iter()
            .map(|d| {
                let mut tx = d.width / 1000.0 * font_size + gs.char_spacing;
                if decoder.is_word_space(d.code) {
                    tx += gs.word_spacing;
                }
                tx * scale
            })
            .sum();

        let description = decoder.description();
        let matrix = gs.rendering_matrix();
        let local_bbox = BBox::new(
            0.0,
            description.scaled_descent(font_size) + gs.rise,
            advance,
            description.scaled_ascent(font_size) + gs.rise,
        );
        let space_width =
            (description.space_width / 1000.0 * font_size + gs.char_spacing + gs.word_spacing) * scale;
        let (space_x, space_y) = matrix.transform_vector(space_width, 0.0);
        let placement = ParsedTextPlacement {
            text: decoder.decode_text(bytes),
            font_id: description.font_id,
            matrix,
            local_bbox,
            global_bbox: local_bbox.transform(&matrix),
            space_width,
            global_space_width: [space_x, space_y],
        };

        self.graphics.current_mut().advance(advance);
        self.push_placement(index, placement);
    }

    /// `TJ`: strings interleaved with adjustments in thousandths of an em.
    fn show_adjusted(&mut self, index: usize, items: &[Operand]) {
        for item in items {
            if let Some(bytes) = item.as_bytes() {
                self.show_text(index, bytes);
            } else if let Some(adjustment) = item.as_f64() {
                let gs = self.graphics.current_mut();
                let tx = -adjustment / 1000.0 * gs.font_size * gs.horizontal_scale();
                gs.advance(tx);
            }
        }
    }

    fn push_placement(&mut self, index: usize, placement: ParsedTextPlacement) {
        if self.placements.len() >= self.options.max_placements_per_page {
            if !self.limit_reported {
                self.limit_reported = true;
                let limit = self.options.max_placements_per_page;
                self.warn(ExtractWarning::with_operator_context(
                    ExtractWarningCode::ResourceLimitReached,
                    format!("placement limit of {limit} per page reached; further text dropped"),
                    index,
                    None,
                ));
            }
            return;
        }
        self.placements.push(placement);
    }
}

impl ContentHandler for TextPlacementCollector<'_> {
    fn on_resources_read(&mut self, scope: ResourceScope) {
        self.scopes.push(scope);
    }

    fn on_operation(&mut self, op: &Operator) {
        let index = self.operator_index;
        self.operator_index += 1;

        match op.name.as_str() {
            "q" => self.graphics.save(),
            "Q" => self.restore(),
            "cm" => match op.numbers::<6>() {
                Some(values) => self
                    .graphics
                    .current_mut()
                    .concat_ctm(&Matrix::from_array(values)),
                None => self.invalid_operands(index, op),
            },
            "BT" => self.graphics.current_mut().begin_text(),
            "ET" => {}
            "Tc" => self.set_scalar(index, op, |gs, v| gs.char_spacing = v),
            "Tw" => self.set_scalar(index, op, |gs, v| gs.word_spacing = v),
            "Tz" => self.set_scalar(index, op, |gs, v| gs.horizontal_scaling = v),
            "TL" => self.set_scalar(index, op, |gs, v| gs.leading = v),
            "Ts" => self.set_scalar(index, op, |gs, v| gs.rise = v),
            "Tf" => self.select_font(index, op),
            "Td" => match op.numbers::<2>() {
                Some([tx, ty]) => self.graphics.current_mut().move_text_position(tx, ty),
                None => self.invalid_operands(index, op),
            },
            "TD" => match op.numbers::<2>() {
                Some([tx, ty]) => {
                    let gs = self.graphics.current_mut();
                    gs.leading = -ty;
                    gs.move_text_position(tx, ty);
                }
                None => self.invalid_operands(index, op),
            },
            "Tm" => match op.numbers::<6>() {
                Some(values) => self
                    .graphics
                    .current_mut()
                    .set_text_matrix(Matrix::from_array(values)),
                None => self.invalid_operands(index, op),
            },
            "T*" => self.graphics.current_mut().next_line(),
            "Tj" => match single_string(op) {
                Some(bytes) => self.show_text(index, bytes),
                None => self.invalid_operands(index, op),
            },
            "'" => match single_string(op) {
                Some(bytes) => {
                    self.graphics.current_mut().next_line();
                    self.show_text(index, bytes);
                }
                None => self.invalid_operands(index, op),
            },
            "\"" => match op.operands.as_slice() {
                [aw, ac, text] => match (aw.as_f64(), ac.as_f64(), text.as_bytes()) {
                    (Some(aw), Some(ac), Some(bytes)) => {
                        let gs = self.graphics.current_mut();
                        gs.word_spacing = aw;
                        gs.char_spacing = ac;
                        gs.next_line();
                        self.show_text(index, bytes);
                    }
                    _ => self.invalid_operands(index, op),
                },
                _ => self.invalid_operands(index, op),
            },
            "TJ" => match op.operands.as_slice() {
                [Operand::Array(items)] => self.show_adjusted(index, items),
                _ => self.invalid_operands(index, op),
            },
            "gs" => match op.operands.as_slice() {
                [Operand::Name(name)] => self.apply_ext_gstate(index, name),
                _ => self.invalid_operands(index, op),
            },
            _ => {}
        }
    }

    fn resolve_xobject(&self, name: &str) -> Option<ObjectId> {
        match self.scopes.xobject(name)? {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }

    fn on_form_enter(&mut self, matrix: Matrix) {
        self.form_marks.push(self.graphics.depth());
        self.graphics.save();
        self.graphics.current_mut().concat_ctm(&matrix);
    }

    fn on_xobject_end(&mut self) {
        let Some(mark) = self.form_marks.pop() else {
            return;
        };
        self.scopes.pop();
        self.graphics.restore_to(mark);
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        self.warn(warning);
    }
}

fn single_string(op: &Operator) -> Option<&[u8]> {
    match op.operands.as_slice() {
        [text] => text.as_bytes(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use lopdf::dictionary;

    const H: f64 = 722.0;
    const I: f64 = 222.0;
    const SPACE: f64 = 278.0;

    fn helvetica(doc: &mut Document) -> ObjectId {
        let mut widths = vec![Object::Integer(500); 95];
        widths[0] = Object::Integer(SPACE as i64);
        widths[usize::from(b'H' - 32)] = Object::Integer(H as i64);
        widths[usize::from(b'i' - 32)] = Object::Integer(I as i64);
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
            "FirstChar" => 32,
            "LastChar" => 126,
            "Widths" => widths,
        })
    }

    fn run_with(doc: &Document, scope: ResourceScope, options: &ExtractOptions, content: &[u8]) -> PageOutput {
        let mut registry = FontRegistry::new();
        let mut collector = TextPlacementCollector::new(doc, &mut registry, options);
        collector.on_resources_read(scope);
        for op in tokenize(content) {
            collector.on_operation(&op);
        }
        collector.on_done()
    }

    fn run(content: &[u8]) -> PageOutput {
        let mut doc = Document::with_version("1.7");
        let font = helvetica(&mut doc);
        let scope = ResourceScope::default().with_font("F1", Object::Reference(font));
        run_with(&doc, scope, &ExtractOptions::default(), content)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn assert_box(actual: &BBox, expected: [f64; 4]) {
        assert!(
            actual.approx_eq(&BBox::new(expected[0], expected[1], expected[2], expected[3]), 1e-6),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn single_run_after_td() {
        let out = run(b"BT /F1 12 Tf 100 700 Td (Hi) Tj ET");
        assert_eq!(out.placements.len(), 1);
        assert!(out.warnings.is_empty());
        let p = &out.placements[0];
        assert_eq!(p.text, "Hi");
        let width = (H + I) * 12.0 / 1000.0;
        assert_box(&p.local_bbox, [0.0, -3.0, width, 9.0]);
        assert_box(&p.global_bbox, [100.0, 697.0, 100.0 + width, 709.0]);
        assert_eq!(p.matrix, Matrix::translation(100.0, 700.0));
        assert!(approx(p.space_width, SPACE * 12.0 / 1000.0));
        assert!(approx(p.global_space_width[0], p.space_width));
        assert!(approx(p.global_space_width[1], 0.0));
    }

    #[test]
    fn zero_adjustment_matches_concatenation() {
        let joined = run(b"BT /F1 10 Tf [(Hi)] TJ (H) Tj ET");
        let split = run(b"BT /F1 10 Tf [(H) 0 (i)] TJ (H) Tj ET");

        let text: String = split.placements[..2].iter().map(|p| p.text.as_str()).collect();
        assert_eq!(text, joined.placements[0].text);
        let union = split.placements[0].global_bbox.union(&split.placements[1].global_bbox);
        assert!(union.approx_eq(&joined.placements[0].global_bbox, 1e-9));
        assert!(
            split.placements[2]
                .global_bbox
                .approx_eq(&joined.placements[1].global_bbox, 1e-9)
        );
    }

    #[test]
    fn tj_adjustment_shifts_next_run() {
        let out = run(b"BT /F1 10 Tf [(H) -1000 (i) 500 (H)] TJ ET");
        assert_eq!(out.placements.len(), 3);
        let h_end = H * 10.0 / 1000.0;
        assert!(approx(out.placements[1].global_bbox.x0, h_end + 10.0));
        let i_end = h_end + 10.0 + I * 10.0 / 1000.0;
        assert!(approx(out.placements[2].global_bbox.x0, i_end - 5.0));
    }

    #[test]
    fn word_and_char_spacing() {
        let out = run(b"BT /F1 10 Tf 3 Tw 1 Tc (H H) Tj ET");
        let p = &out.placements[0];
        let expected = (H + SPACE + H) * 10.0 / 1000.0 + 3.0 * 1.0 + 3.0;
        assert!(approx(p.global_bbox.width(), expected));
        assert!(approx(p.space_width, SPACE / 100.0 + 1.0 + 3.0));
    }

    #[test]
    fn horizontal_scaling_halves_advance() {
        let out = run(b"BT /F1 10 Tf 50 Tz (H) Tj (H) Tj ET");
        let expected = H * 10.0 / 1000.0 * 0.5;
        assert!(approx(out.placements[0].global_bbox.width(), expected));
        assert!(approx(out.placements[1].global_bbox.x0, expected));
    }

    #[test]
    fn leading_next_line_and_quotes() {
        let out = run(b"BT /F1 10 Tf 14 TL 50 500 Td (H) Tj T* (H) Tj (i) ' 2 1 (H) \" ET");
        let origins: Vec<(f64, f64)> = out
            .placements
            .iter()
            .map(|p| (p.matrix.e, p.matrix.f))
            .collect();
        assert_eq!(
            origins,
            vec![(50.0, 500.0), (50.0, 486.0), (50.0, 472.0), (50.0, 458.0)]
        );
        // `"` left its spacing in the state for the run it showed
        let last = &out.placements[3];
        assert!(approx(last.global_bbox.width(), H / 100.0 + 1.0));
    }

    #[test]
    fn capital_td_sets_leading() {
        let out = run(b"BT /F1 10 Tf 0 800 Td 0 -20 TD (H) Tj T* (H) Tj ET");
        assert!(approx(out.placements[0].matrix.f, 780.0));
        assert!(approx(out.placements[1].matrix.f, 760.0));
    }

    #[test]
    fn rotated_text_matrix_rotates_the_box() {
        let out = run(b"BT /F1 10 Tf 0 1 -1 0 200 100 Tm (H) Tj ET");
        let p = &out.placements[0];
        let w = H / 100.0;
        assert_box(&p.global_bbox, [192.5, 100.0, 202.5, 100.0 + w]);
        assert!(approx(p.global_space_width[0], 0.0));
        assert!(approx(p.global_space_width[1], SPACE / 100.0));

        let back = p.matrix.inverse().map(|inv| p.global_bbox.transform(&inv));
        assert!(back.is_some_and(|b| b.approx_eq(&p.local_bbox, 1e-9)));
    }

    #[test]
    fn ctm_is_saved_and_restored() {
        let out = run(b"q 2 0 0 2 10 10 cm BT /F1 10 Tf (H) Tj ET Q BT /F1 10 Tf (H) Tj ET");
        let w = H / 100.0;
        assert_box(&out.placements[0].global_bbox, [10.0, 5.0, 10.0 + 2.0 * w, 25.0]);
        assert_box(&out.placements[1].global_bbox, [0.0, -2.5, w, 7.5]);
    }

    #[test]
    fn font_selection_is_undone_by_restore() {
        let out = run(b"q BT /F1 10 Tf ET Q BT (H) Tj ET");
        assert!(out.placements.is_empty());
        assert_eq!(out.warnings[0].code, ExtractWarningCode::MissingFont);
    }

    #[test]
    fn text_rise_offsets_box() {
        let out = run(b"BT /F1 10 Tf 5 Ts (H) Tj ET");
        assert_box(&out.placements[0].local_bbox, [0.0, 2.5, H / 100.0, 12.5]);
    }

    #[test]
    fn undefined_font_skips_runs_with_warnings() {
        let out = run(b"BT /F9 12 Tf (x) Tj ET");
        assert!(out.placements.is_empty());
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].code, ExtractWarningCode::MissingFont);
        assert_eq!(out.warnings[0].font_name.as_deref(), Some("F9"));
        assert_eq!(out.warnings[0].operator_index, Some(1));
    }

    #[test]
    fn malformed_operands_skip_only_that_operator() {
        let out = run(b"BT /F1 12 Tf 100 Td (Hi) Tj 5 /X Tc (i) Tj ET");
        assert_eq!(out.placements.len(), 2);
        assert_eq!(out.placements[0].matrix, Matrix::IDENTITY);
        let codes: Vec<&ExtractWarningCode> = out.warnings.iter().map(|w| &w.code).collect();
        assert_eq!(
            codes,
            vec![&ExtractWarningCode::InvalidOperand, &ExtractWarningCode::InvalidOperand]
        );
    }

    #[test]
    fn unterminated_array_keeps_later_runs() {
        let out = run(b"BT /F1 12 Tf [(H) TJ (i) Tj ET BT (H) Tj ET");
        let texts: Vec<&str> = out.placements.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["H", "i", "H"]);
    }

    #[test]
    fn empty_string_emits_nothing() {
        let out = run(b"BT /F1 12 Tf () Tj [()] TJ ET");
        assert!(out.placements.is_empty());
    }

    #[test]
    fn ext_gstate_font_entry() {
        let mut doc = Document::with_version("1.7");
        let font = helvetica(&mut doc);
        let gs = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "Font" => vec![Object::Reference(font), Object::Integer(20)],
        });
        let resources = dictionary! { "ExtGState" => dictionary! { "GS1" => gs } };
        let scope = ResourceScope::from_dictionary(&doc, &resources);
        let out = run_with(&doc, scope, &ExtractOptions::default(), b"BT /GS1 gs (H) Tj ET");
        assert_eq!(out.placements.len(), 1);
        assert!(approx(out.placements[0].global_bbox.width(), H * 20.0 / 1000.0));
        assert_eq!(out.placements[0].font_id, FontId::from(font));
    }

    #[test]
    fn inline_font_dictionary() {
        let doc = Document::with_version("1.7");
        let inline = dictionary! { "Subtype" => "Type1", "BaseFont" => "Courier" };
        let scope = ResourceScope::default().with_font("F1", Object::Dictionary(inline));
        let out = run_with(&doc, scope, &ExtractOptions::default(), b"BT /F1 10 Tf (ab) Tj ET");
        let p = &out.placements[0];
        assert!(p.font_id.is_inline());
        assert!(approx(p.global_bbox.width(), 12.0));
    }

    #[test]
    fn placement_limit_is_enforced_once() {
        let mut doc = Document::with_version("1.7");
        let font = helvetica(&mut doc);
        let scope = ResourceScope::default().with_font("F1", Object::Reference(font));
        let options = ExtractOptions {
            max_placements_per_page: 2,
            ..ExtractOptions::default()
        };
        let out = run_with(&doc, scope, &options, b"BT /F1 10 Tf (a) Tj (b) Tj (c) Tj (d) Tj ET");
        assert_eq!(out.placements.len(), 2);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, ExtractWarningCode::ResourceLimitReached);
    }

    #[test]
    fn warnings_can_be_disabled() {
        let doc = Document::with_version("1.7");
        let options = ExtractOptions {
            collect_warnings: false,
            ..ExtractOptions::default()
        };
        let out = run_with(&doc, ResourceScope::default(), &options, b"BT /F1 10 Tf (a) Tj ET");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn form_hooks_scope_state() {
        let mut doc = Document::with_version("1.7");
        let font = helvetica(&mut doc);
        let mut registry = FontRegistry::new();
        let options = ExtractOptions::default();
        let mut collector = TextPlacementCollector::new(&doc, &mut registry, &options);
        collector.on_resources_read(ResourceScope::default().with_font("F1", Object::Reference(font)));

        collector.on_form_enter(Matrix::translation(300.0, 0.0));
        collector.on_resources_read(ResourceScope::default());
        for op in tokenize(b"q q BT /F1 10 Tf (H) Tj ET") {
            collector.on_operation(&op);
        }
        collector.on_xobject_end();
        assert_eq!(collector.graphics().ctm, Matrix::IDENTITY);
        for op in tokenize(b"BT /F1 10 Tf (H) Tj ET") {
            collector.on_operation(&op);
        }
        let out = collector.on_done();
        assert!(approx(out.placements[0].global_bbox.x0, 300.0));
        assert!(approx(out.placements[1].global_bbox.x0, 0.0));
    }
}
