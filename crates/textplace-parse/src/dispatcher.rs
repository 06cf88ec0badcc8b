//! Recursive content-stream driver.
//!
//! Tokenises a content stream, forwards each operator to a
//! [`ContentHandler`], and follows `Do` into form XObjects. Recursion is
//! bounded twice: by [`ExtractOptions::max_recursion_depth`] and by refusing
//! to enter a form that is already on the current invocation path. A `Do`
//! that would break either bound is skipped with a warning; extraction of
//! the rest of the stream continues.

use lopdf::{Document, Object, ObjectId};
use textplace_core::{ExtractOptions, ExtractWarning, ExtractWarningCode, Matrix};

use crate::handler::ContentHandler;
use crate::objects::{as_dict, decode_stream, get, get_array, get_name, number_of, resolve};
use crate::state::ResourceScope;
use crate::tokenizer::{Operand, Operator, tokenize};

/// Run a page's content through `handler`.
///
/// `resources` becomes the outermost scope.
pub fn dispatch_page(
    doc: &Document,
    content: &[u8],
    resources: ResourceScope,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
) {
    handler.on_resources_read(resources);
    let mut path = Vec::new();
    dispatch_stream(doc, content, handler, options, &mut path);
}

fn dispatch_stream(
    doc: &Document,
    content: &[u8],
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    path: &mut Vec<ObjectId>,
) {
    for op in tokenize(content) {
        if op.name == "Do" {
            invoke_xobject(doc, &op, handler, options, path);
        } else {
            handler.on_operation(&op);
        }
    }
}

fn invoke_xobject(
    doc: &Document,
    op: &Operator,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    path: &mut Vec<ObjectId>,
) {
    let [Operand::Name(name)] = op.operands.as_slice() else {
        handler.on_warning(ExtractWarning::with_code(
            ExtractWarningCode::InvalidOperand,
            format!("Do skipped: unexpected operands {:?}", op.operands),
        ));
        return;
    };
    let Some(id) = handler.resolve_xobject(name) else {
        #[cfg(feature = "tracing")]
        tracing::debug!(name = %name, "Do names no XObject in scope");
        return;
    };
    let Ok(Object::Stream(stream)) = doc.get_object(id) else {
        return;
    };
    if get_name(doc, &stream.dict, b"Subtype").as_deref() != Some("Form") {
        return;
    }

    if path.contains(&id) {
        handler.on_warning(ExtractWarning::with_code(
            ExtractWarningCode::ResourceLimitReached,
            format!("form XObject /{name} ({} {} R) invokes itself; skipped", id.0, id.1),
        ));
        return;
    }
    if path.len() >= options.max_recursion_depth {
        handler.on_warning(ExtractWarning::with_code(
            ExtractWarningCode::ResourceLimitReached,
            format!(
                "form XObject /{name} exceeds the nesting limit of {}; skipped",
                options.max_recursion_depth
            ),
        ));
        return;
    }

    let content = match decode_stream(stream) {
        Ok(content) => content,
        Err(e) => {
            handler.on_warning(ExtractWarning::with_code(
                ExtractWarningCode::MalformedObject,
                format!("form XObject /{name} could not be decoded: {e}"),
            ));
            return;
        }
    };
    if content.len() > options.max_stream_bytes {
        handler.on_warning(ExtractWarning::with_code(
            ExtractWarningCode::ResourceLimitReached,
            format!(
                "form XObject /{name} is {} bytes, over the {} byte limit; skipped",
                content.len(),
                options.max_stream_bytes
            ),
        ));
        return;
    }

    let scope = match get(doc, &stream.dict, b"Resources").and_then(as_dict) {
        Some(resources) => ResourceScope::from_dictionary(doc, resources),
        None => ResourceScope::default(),
    };

    handler.on_form_enter(form_matrix(doc, &stream.dict));
    handler.on_resources_read(scope);
    path.push(id);
    dispatch_stream(doc, &content, handler, options, path);
    path.pop();
    handler.on_xobject_end();
}

/// The form's `/Matrix`, or identity when absent or malformed.
fn form_matrix(doc: &Document, dict: &lopdf::Dictionary) -> Matrix {
    let values: Option<Vec<f64>> = get_array(doc, dict, b"Matrix").and_then(|items| {
        items
            .iter()
            .map(|o| resolve(doc, o).and_then(number_of))
            .collect()
    });
    match values.as_deref() {
        Some(&[a, b, c, d, e, f]) => Matrix::new(a, b, c, d, e, f),
        _ => Matrix::IDENTITY,
    }
}
