//! Index Data Model
//!
//! Records returned by an index service. Every kind is a closed enum; text that
//! does not name a known kind is rejected when parsed instead of being carried
//! through as an opaque string.
//!
//! @module index/types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::Error;

// =============================================================================
// SIGNATURE
// =============================================================================

/// Canonical identifier of one symbol in the index.
///
/// Opaque: equality is exact string equality and nothing in the core parses
/// a signature except through `xrefs::patterns`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Signature {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Signature {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// LOCATIONS
// =============================================================================

/// A position in an indexed file. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Text range covered by an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl LineRange {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Single-line range
    pub fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self::new(line, start_column, line, end_column)
    }

    /// Check whether `(line, column)` falls inside the range (end exclusive)
    pub fn contains(&self, line: u32, column: u32) -> bool {
        let after_start = (line, column) >= (self.start_line, self.start_column);
        let before_end = (line, column) < (self.end_line, self.end_column);
        after_start && before_end
    }

    /// Start position as a sortable pair
    pub fn start(&self) -> (u32, u32) {
        (self.start_line, self.start_column)
    }
}

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// Classification of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Free function definition or declaration
    Function,
    /// Member function, constructor or destructor
    Method,
    /// Constant or enumerator
    Constant,
    /// Typedef / using alias
    TypeAlias,
    /// Class, struct, union or enum
    Type,
    /// Variable or field
    Variable,
    /// Plain cross-reference link without a symbol kind
    Link,
}

impl AnnotationKind {
    /// Kinds whose annotations open a function body
    pub fn is_callable(&self) -> bool {
        matches!(self, AnnotationKind::Function | AnnotationKind::Method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Function => "function",
            AnnotationKind::Method => "method",
            AnnotationKind::Constant => "constant",
            AnnotationKind::TypeAlias => "type_alias",
            AnnotationKind::Type => "type",
            AnnotationKind::Variable => "variable",
            AnnotationKind::Link => "link",
        }
    }
}

impl FromStr for AnnotationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "method" | "constructor" | "destructor" => Ok(Self::Method),
            "constant" | "enum_constant" | "enumerator" => Ok(Self::Constant),
            "type_alias" | "typedef" => Ok(Self::TypeAlias),
            "type" | "class" | "struct" | "union" | "enum" => Ok(Self::Type),
            "variable" | "field" => Ok(Self::Variable),
            "link" => Ok(Self::Link),
            _ => Err(Error::UnknownAnnotationKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index-provided fact attached to a range of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    pub range: LineRange,
    /// Source text covered by the range, as reported by the index
    #[serde(default)]
    pub text: String,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, signature: Option<Signature>, range: LineRange) -> Self {
        Self {
            kind,
            signature,
            range,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn start_line(&self) -> u32 {
        self.range.start_line
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// Relationship between a signature and an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    Definition,
    Declaration,
    Overrides,
    OverriddenBy,
    Reference,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Definition => "DEFINITION",
            EdgeKind::Declaration => "DECLARATION",
            EdgeKind::Overrides => "OVERRIDES",
            EdgeKind::OverriddenBy => "OVERRIDDEN_BY",
            EdgeKind::Reference => "REFERENCE",
        }
    }
}

impl FromStr for EdgeKind {
    type Err = Error;

    /// Accepts both the canonical names and the code-search wire names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFINITION" | "HAS_DEFINITION" => Ok(Self::Definition),
            "DECLARATION" | "HAS_DECLARATION" => Ok(Self::Declaration),
            "OVERRIDES" => Ok(Self::Overrides),
            "OVERRIDDEN_BY" => Ok(Self::OverriddenBy),
            "REFERENCE" | "REFERENCED_AT" => Ok(Self::Reference),
            _ => Err(Error::UnknownEdgeKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of edge kinds requested from the index
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[repr(transparent)]
    pub struct EdgeKinds: u8 {
        const DEFINITION = 0b0000_0001;
        const DECLARATION = 0b0000_0010;
        const OVERRIDES = 0b0000_0100;
        const OVERRIDDEN_BY = 0b0000_1000;
        const REFERENCE = 0b0001_0000;
    }
}

impl EdgeKinds {
    /// Everything the xref aggregator asks for
    pub const XREFS: EdgeKinds = EdgeKinds::all();

    pub fn has(&self, kind: EdgeKind) -> bool {
        self.contains(EdgeKinds::from(kind))
    }
}

impl From<EdgeKind> for EdgeKinds {
    fn from(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Definition => EdgeKinds::DEFINITION,
            EdgeKind::Declaration => EdgeKinds::DECLARATION,
            EdgeKind::Overrides => EdgeKinds::OVERRIDES,
            EdgeKind::OverriddenBy => EdgeKinds::OVERRIDDEN_BY,
            EdgeKind::Reference => EdgeKinds::REFERENCE,
        }
    }
}

/// A typed occurrence of a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    /// Signature the edge was requested for
    pub source: Signature,
    pub kind: EdgeKind,
    pub file: String,
    pub line: u32,
    /// Column of the occurrence, when the index reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Text of the line holding the occurrence
    pub snippet: String,
    /// Signature at the occurrence, when it differs from `source`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Signature>,
}

impl Edge {
    pub fn new(
        source: impl Into<Signature>,
        kind: EdgeKind,
        file: impl Into<String>,
        line: u32,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind,
            file: file.into(),
            line,
            column: None,
            snippet: snippet.into(),
            target: None,
        }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line, self.column.unwrap_or(0))
    }

    /// Sort position; an unknown column sorts after everything on its line
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column.unwrap_or(u32::MAX))
    }
}

// =============================================================================
// CALL GRAPH
// =============================================================================

/// One direct caller as reported by the index call-graph query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCallGraphEntry {
    /// Short name of the calling method
    pub identifier: String,
    /// Signature of the calling method
    pub signature: Signature,
    /// File holding the call site; absent for synthetic call sites
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub call_site_line: u32,
    pub call_site_column: u32,
    pub snippet_text: String,
    pub display_name: String,
}

impl RawCallGraphEntry {
    pub fn call_site(&self) -> Option<SourceLocation> {
        self.file_path
            .as_ref()
            .map(|file| SourceLocation::new(file.clone(), self.call_site_line, self.call_site_column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = LineRange::new(10, 4, 10, 7);
        assert!(range.contains(10, 4));
        assert!(range.contains(10, 6));
        assert!(!range.contains(10, 7));
        assert!(!range.contains(9, 5));
    }

    #[test]
    fn test_edge_kind_wire_names() {
        assert_eq!("REFERENCED_AT".parse::<EdgeKind>().unwrap(), EdgeKind::Reference);
        assert_eq!("HAS_DEFINITION".parse::<EdgeKind>().unwrap(), EdgeKind::Definition);
        assert!(matches!(
            "CALLED_BY".parse::<EdgeKind>(),
            Err(Error::UnknownEdgeKind { .. })
        ));
    }

    #[test]
    fn test_annotation_kind_rejects_unknown() {
        assert_eq!("TYPEDEF".parse::<AnnotationKind>().unwrap(), AnnotationKind::TypeAlias);
        assert!("macro".parse::<AnnotationKind>().is_err());
    }

    #[test]
    fn test_edge_kinds_set() {
        let kinds = EdgeKinds::REFERENCE | EdgeKinds::DEFINITION;
        assert!(kinds.has(EdgeKind::Reference));
        assert!(!kinds.has(EdgeKind::Overrides));
        assert!(EdgeKinds::XREFS.has(EdgeKind::OverriddenBy));
    }

    #[test]
    fn test_edge_position_without_column() {
        let edge = Edge::new("sig", EdgeKind::Reference, "a.cc", 3, "x");
        assert_eq!(edge.position(), (3, u32::MAX));
        assert_eq!(edge.location().column, 0);
    }

    #[test]
    fn test_call_site_requires_file() {
        let mut entry = RawCallGraphEntry {
            identifier: "Caller".to_string(),
            signature: Signature::from("cpp:Caller()"),
            file_path: Some("a.cc".to_string()),
            call_site_line: 12,
            call_site_column: 4,
            snippet_text: String::new(),
            display_name: "Caller()".to_string(),
        };
        assert_eq!(entry.call_site(), Some(SourceLocation::new("a.cc", 12, 4)));

        entry.file_path = None;
        assert_eq!(entry.call_site(), None);
    }
}
