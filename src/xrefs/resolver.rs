//! Symbol Resolver
//!
//! Maps an editor selection to a signature. Passes, in order:
//! 1. an annotation whose range holds the selection wins outright
//! 2. otherwise the nearest annotation within a few lines of the selection
//! 3. otherwise any annotation in the file whose signature names the word
//!    as a function (`word(`), member (`::word`) or class (`class-word`)
//! 4. otherwise the nearest annotation at any distance
//! 5. otherwise the first index-wide symbol search hit
//!
//! Only annotations whose text or signature contains the selected word are
//! candidates.
//!
//! @module xrefs/resolver

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::SessionContext;
use crate::core::error::{Error, Result};
use crate::index::{Annotation, Signature, SourceLocation};

/// Line distance within which a nearby annotation is accepted
pub const NEAREST_LINE_WINDOW: u32 = 10;

// =============================================================================
// SELECTION
// =============================================================================

/// Identifier picked in an editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Index-relative file
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Selected word
    pub text: String,
}

impl Selection {
    pub fn new(file: impl Into<String>, line: u32, column: u32, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            text: text.into(),
        }
    }

    /// Pull a preceding `:` or `~` into the word, so `~Foo` and `::Foo`
    /// select the destructor and the qualified name.
    pub fn widen(mut self, preceding: Option<char>) -> Self {
        if let Some(c @ (':' | '~')) = preceding {
            self.text.insert(0, c);
            self.column = self.column.saturating_sub(1);
        }
        self
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line, self.column)
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve `selection` to a signature, or `NotFound` naming the text
pub fn resolve(ctx: &SessionContext<'_>, selection: &Selection) -> Result<Signature> {
    let word = selection.text.as_str();
    if word.is_empty() {
        return Err(Error::NotFound {
            text: String::new(),
        });
    }

    let annotations = ctx.annotations(&selection.file);
    if let Some(signature) = resolve_in(&annotations, selection) {
        debug!("Resolved {} to {} from annotations", word, signature);
        return Ok(signature);
    }

    if let Some(signature) = ctx.search_symbols(word).into_iter().next() {
        debug!("Resolved {} to {} by symbol search", word, signature);
        return Ok(signature);
    }

    Err(Error::NotFound {
        text: word.to_string(),
    })
}

/// Annotation passes (1-4) over one file
pub fn resolve_in(annotations: &[Annotation], selection: &Selection) -> Option<Signature> {
    let word = selection.text.as_str();
    let candidates: Vec<(&Annotation, &Signature)> = annotations
        .iter()
        .filter_map(|a| a.signature.as_ref().map(|s| (a, s)))
        .filter(|(a, s)| a.text.contains(word) || s.as_str().contains(word))
        .collect();

    if let Some((_, signature)) = candidates
        .iter()
        .find(|(a, _)| a.range.contains(selection.line, selection.column))
    {
        return Some((*signature).clone());
    }

    // min_by_key keeps the first of equal distances
    let nearest = candidates
        .iter()
        .map(|(a, s)| (a.start_line().abs_diff(selection.line), *s))
        .filter(|(distance, _)| *distance < NEAREST_LINE_WINDOW)
        .min_by_key(|(distance, _)| *distance);
    if let Some((_, signature)) = nearest {
        return Some(signature.clone());
    }

    let call = format!("{}(", word);
    let member = format!("::{}", word);
    let class = format!("class-{}", word);
    if let Some(signature) = candidates.iter().map(|(_, s)| *s).find(|s| {
        let s = s.as_str();
        s.contains(&call) || s.contains(&member) || s.contains(&class)
    }) {
        return Some(signature.clone());
    }

    candidates
        .iter()
        .min_by_key(|(a, _)| a.start_line().abs_diff(selection.line))
        .map(|(_, s)| (*s).clone())
}
