//! Enclosing-Definition Heuristic
//!
//! Approximates "which function's body holds this line" from annotations
//! alone: the callable definition with the greatest start line strictly
//! before the line. Lines inside a lambda or nested block are attributed to
//! the nearest preceding definition, which may be the lambda's outer
//! function or a sibling defined earlier in the file. That is a known
//! limitation.
//!
//! @module xrefs/enclosing

use super::context::SessionContext;
use super::patterns::{is_declaration_only, symbol_name};
use crate::index::{Annotation, Signature};

/// Method enclosing a line, resolved to its signature and display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    pub signature: Signature,
    pub name: String,
}

/// Nearest preceding callable definition among `annotations`
pub fn enclosing_in(annotations: &[Annotation], line: u32) -> Option<&Annotation> {
    let mut best: Option<&Annotation> = None;

    for annotation in annotations {
        if !annotation.kind.is_callable() || annotation.start_line() >= line {
            continue;
        }
        let Some(signature) = &annotation.signature else {
            continue;
        };
        if is_declaration_only(signature.as_str()) {
            continue;
        }
        // Strictly greater: ties keep the first one seen
        if best.map_or(true, |b| annotation.start_line() > b.start_line()) {
            best = Some(annotation);
        }
    }

    best
}

/// Enclosing method of `(file, line)`, using the session's annotation memo
pub fn enclosing_method(ctx: &SessionContext<'_>, file: &str, line: u32) -> Option<EnclosingMethod> {
    let annotations = ctx.annotations(file);
    let annotation = enclosing_in(&annotations, line)?;
    let signature = annotation.signature.clone()?;
    let name = symbol_name(signature.as_str());
    Some(EnclosingMethod { signature, name })
}
