//! Interpreter state: the graphics-state stack and the resource-scope stack.
//!
//! The graphics state carries the text parameters alongside the matrices so
//! a `q` saves everything with one clone. The text and line matrices are
//! not part of the PDF graphics state, so `Q` leaves them untouched.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use textplace_core::Matrix;

use crate::objects::get_dict;
use crate::registry::FontHandle;

/// Graphics and text state at one save level.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub font: Option<FontHandle>,
    pub font_size: f64,
    /// `Tc`, in unscaled text space units.
    pub char_spacing: f64,
    /// `Tw`, applied to single-byte code 32 only.
    pub word_spacing: f64,
    /// `Tz`, as a percentage (100 = normal).
    pub horizontal_scaling: f64,
    pub leading: f64,
    pub rise: f64,
    pub text_matrix: Matrix,
    pub line_matrix: Matrix,
    pub ctm: Matrix,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            ctm: Matrix::IDENTITY,
        }
    }
}

impl GraphicsState {
    /// `Tz` as a factor (1.0 = 100%).
    pub fn horizontal_scale(&self) -> f64 {
        self.horizontal_scaling / 100.0
    }

    /// `cm`: CTM' = m × CTM.
    pub fn concat_ctm(&mut self, m: &Matrix) {
        self.ctm = m.concat(&self.ctm);
    }

    /// `BT`: both text matrices reset to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    /// `Tm`: replace the text and line matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: move to the start of the next line, offset from the current line start.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `T*`: `Td` by `(0, -leading)`.
    pub fn next_line(&mut self) {
        self.move_text_position(0.0, -self.leading);
    }

    /// Shift the text matrix horizontally by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).concat(&self.text_matrix);
    }

    /// Text rendering matrix (without the font size and rise terms): Tm × CTM.
    pub fn rendering_matrix(&self) -> Matrix {
        self.text_matrix.concat(&self.ctm)
    }
}

/// The current graphics state plus the states saved by `q`.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStack {
    pub fn new(initial: GraphicsState) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Pop the last saved state, keeping the current text and line matrices.
    ///
    /// Returns `false` on an unbalanced `Q`.
    pub fn restore(&mut self) -> bool {
        let Some(mut saved) = self.saved.pop() else {
            return false;
        };
        saved.text_matrix = self.current.text_matrix;
        saved.line_matrix = self.current.line_matrix;
        self.current = saved;
        true
    }

    /// Unwind to `depth` saved states and then restore once more, discarding
    /// any `q` a nested stream left open.
    pub fn restore_to(&mut self, depth: usize) {
        self.saved.truncate(depth + 1);
        self.restore();
    }
}

/// Named resources visible in one lexical scope (a page or a form XObject).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceScope {
    fonts: HashMap<String, Object>,
    ext_gstates: HashMap<String, Object>,
    xobjects: HashMap<String, Object>,
}

impl ResourceScope {
    /// Read the `/Font`, `/ExtGState` and `/XObject` subdictionaries of a
    /// resource dictionary. Values are kept unresolved.
    pub fn from_dictionary(doc: &Document, resources: &Dictionary) -> Self {
        let entries = |key: &[u8]| -> HashMap<String, Object> {
            get_dict(doc, resources, key)
                .map(|dict| {
                    dict.iter()
                        .map(|(name, obj)| (String::from_utf8_lossy(name).into_owned(), obj.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };
        Self {
            fonts: entries(b"Font"),
            ext_gstates: entries(b"ExtGState"),
            xobjects: entries(b"XObject"),
        }
    }

    pub fn with_font(mut self, name: &str, font: Object) -> Self {
        self.fonts.insert(name.to_string(), font);
        self
    }

    pub fn with_xobject(mut self, name: &str, id: ObjectId) -> Self {
        self.xobjects.insert(name.to_string(), Object::Reference(id));
        self
    }

    pub fn font(&self, name: &str) -> Option<&Object> {
        self.fonts.get(name)
    }

    pub fn ext_gstate(&self, name: &str) -> Option<&Object> {
        self.ext_gstates.get(name)
    }

    pub fn xobject(&self, name: &str) -> Option<&Object> {
        self.xobjects.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.ext_gstates.is_empty() && self.xobjects.is_empty()
    }
}

/// Stack of resource scopes; lookups search innermost first.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<ResourceScope>,
}

impl ScopeStack {
    pub fn push(&mut self, scope: ResourceScope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<ResourceScope> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn font(&self, name: &str) -> Option<&Object> {
        self.scopes.iter().rev().find_map(|s| s.font(name))
    }

    pub fn ext_gstate(&self, name: &str) -> Option<&Object> {
        self.scopes.iter().rev().find_map(|s| s.ext_gstate(name))
    }

    pub fn xobject(&self, name: &str) -> Option<&Object> {
        self.scopes.iter().rev().find_map(|s| s.xobject(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn td_moves_from_line_start() {
        let mut gs = GraphicsState::default();
        gs.begin_text();
        gs.move_text_position(100.0, 700.0);
        gs.advance(30.0);
        gs.move_text_position(0.0, -14.0);
        assert_close((gs.text_matrix.e, gs.text_matrix.f), (100.0, 686.0));
        assert_eq!(gs.text_matrix, gs.line_matrix);
    }

    #[test]
    fn next_line_uses_leading() {
        let mut gs = GraphicsState {
            leading: 12.0,
            ..GraphicsState::default()
        };
        gs.set_text_matrix(Matrix::new(2.0, 0.0, 0.0, 2.0, 50.0, 500.0));
        gs.next_line();
        // the offset is in text space, so it is scaled by the matrix
        assert_close((gs.text_matrix.e, gs.text_matrix.f), (50.0, 476.0));
    }

    #[test]
    fn advance_follows_text_matrix_rotation() {
        let mut gs = GraphicsState::default();
        gs.set_text_matrix(Matrix::rotation(std::f64::consts::FRAC_PI_2));
        gs.advance(10.0);
        assert_close((gs.text_matrix.e, gs.text_matrix.f), (0.0, 10.0));
        assert_eq!(gs.line_matrix.e, 0.0);
    }

    #[test]
    fn cm_premultiplies() {
        let mut gs = GraphicsState::default();
        gs.concat_ctm(&Matrix::translation(10.0, 20.0));
        gs.concat_ctm(&Matrix::scale(2.0, 2.0));
        assert_close(gs.ctm.transform_point(1.0, 1.0), (12.0, 22.0));
    }

    #[test]
    fn restore_keeps_text_matrices() {
        let mut stack = GraphicsStack::default();
        stack.current_mut().font_size = 12.0;
        stack.save();
        stack.current_mut().font_size = 24.0;
        stack.current_mut().concat_ctm(&Matrix::scale(3.0, 3.0));
        stack.current_mut().move_text_position(5.0, 5.0);
        assert!(stack.restore());
        assert_eq!(stack.current().font_size, 12.0);
        assert_eq!(stack.current().ctm, Matrix::IDENTITY);
        assert_eq!(stack.current().text_matrix.e, 5.0);
        assert!(!stack.restore());
    }

    #[test]
    fn restore_to_discards_unbalanced_saves() {
        let mut stack = GraphicsStack::default();
        stack.save();
        let mark = stack.depth() - 1;
        stack.current_mut().char_spacing = 1.0;
        stack.save();
        stack.save();
        stack.restore_to(mark);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current().char_spacing, 0.0);
    }

    #[test]
    fn scope_lookup_prefers_innermost() {
        let mut doc = Document::with_version("1.7");
        let outer_font = doc.add_object(dictionary! { "BaseFont" => "Outer" });
        let inner_font = doc.add_object(dictionary! { "BaseFont" => "Inner" });
        let page = dictionary! {
            "Font" => dictionary! { "F1" => outer_font, "F2" => outer_font },
            "ExtGState" => dictionary! { "GS0" => dictionary! {} },
        };
        let form = dictionary! { "Font" => dictionary! { "F1" => inner_font } };

        let mut stack = ScopeStack::default();
        stack.push(ResourceScope::from_dictionary(&doc, &page));
        stack.push(ResourceScope::from_dictionary(&doc, &form));
        assert_eq!(stack.font("F1"), Some(&Object::Reference(inner_font)));
        assert_eq!(stack.font("F2"), Some(&Object::Reference(outer_font)));
        assert!(stack.ext_gstate("GS0").is_some());
        assert!(stack.font("F3").is_none());

        stack.pop();
        assert_eq!(stack.font("F1"), Some(&Object::Reference(outer_font)));
    }

    #[test]
    fn scope_reads_indirect_subdictionaries() {
        let mut doc = Document::with_version("1.7");
        let fonts = doc.add_object(dictionary! { "F1" => Object::Integer(1) });
        let scope = ResourceScope::from_dictionary(&doc, &dictionary! { "Font" => fonts });
        assert!(scope.font("F1").is_some());
        assert!(!scope.is_empty());
        assert!(ResourceScope::default().is_empty());
    }
}
