//! Callback interface between the content dispatcher and an interpreter.
//!
//! The dispatcher owns the recursion (tokenising streams, following `Do`
//! into form XObjects); the handler owns the state. Every other operator is
//! forwarded untouched through [`on_operation`](ContentHandler::on_operation).

use lopdf::ObjectId;
use textplace_core::{ExtractWarning, Matrix};

use crate::state::ResourceScope;
use crate::tokenizer::Operator;

pub trait ContentHandler {
    /// A new resource scope became active (the page, or a form being entered).
    fn on_resources_read(&mut self, scope: ResourceScope);

    /// One content-stream operator, in program order.
    fn on_operation(&mut self, op: &Operator);

    /// Look up an XObject name in the active scopes.
    ///
    /// Returns the referenced object id; XObjects are always indirect.
    fn resolve_xobject(&self, name: &str) -> Option<ObjectId>;

    /// A form XObject is about to run with `matrix` as its `/Matrix`.
    ///
    /// Called before the form's [`on_resources_read`](Self::on_resources_read).
    fn on_form_enter(&mut self, matrix: Matrix);

    /// The most recently entered form finished; its scope and state end here.
    fn on_xobject_end(&mut self);

    /// A problem the dispatcher absorbed (skipped form, unreadable stream).
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}
