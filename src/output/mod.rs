//! Output formatters for sessions
//!
//! Formats a session for the terminal:
//! - Plain: indented caller tree and grouped reference listing
//! - JSON: the same view for tooling
//!
//! Both honor the session's test filter.
//!
//! @module output

pub mod json;
pub mod plain;

use serde::Serialize;

use crate::index::{Edge, SourceLocation};
use crate::xrefs::{CallGraphNode, GraphTree, TreePath, XrefSession};

pub use json::JsonFormatter;
pub use plain::PlainFormatter;

// =============================================================================
// TYPES
// =============================================================================

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Indented text
    #[default]
    Plain,
    /// JSON for machine consumption
    Json,
}

/// Formats session views
pub trait SessionFormatter {
    /// Caller tree, then references and overrides
    fn format_callers(&self, session: &XrefSession<'_>) -> String;

    /// Definition, declaration, overrides and references
    fn format_xrefs(&self, session: &XrefSession<'_>) -> String;

    /// Jump target of the selection
    fn format_jump(&self, session: &XrefSession<'_>, target: Option<&SourceLocation>) -> String;
}

/// Create a formatter for the given format
pub fn create_formatter(format: OutputFormat) -> Box<dyn SessionFormatter> {
    match format {
        OutputFormat::Plain => Box::new(PlainFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

// =============================================================================
// SHARED VIEWS
// =============================================================================

/// References in one file, in listing order
#[derive(Debug, Clone, Serialize)]
pub struct FileGroup<'e> {
    pub file: &'e str,
    pub edges: Vec<&'e Edge>,
}

/// Group consecutive edges by file. When `hide_marker` is set, edges whose
/// file path contains it (case-insensitive) are skipped.
pub fn group_by_file<'e>(
    edges: impl IntoIterator<Item = &'e Edge>,
    hide_marker: Option<&str>,
) -> Vec<FileGroup<'e>> {
    let marker = hide_marker
        .filter(|m| !m.is_empty())
        .map(str::to_lowercase);
    let mut groups: Vec<FileGroup<'e>> = Vec::new();

    for edge in edges {
        if let Some(marker) = &marker {
            if edge.file.to_lowercase().contains(marker) {
                continue;
            }
        }
        match groups.last_mut() {
            Some(group) if group.file == edge.file => group.edges.push(edge),
            _ => groups.push(FileGroup {
                file: &edge.file,
                edges: vec![edge],
            }),
        }
    }

    groups
}

/// Visible caller with its visible children
#[derive(Debug, Clone, Serialize)]
pub struct CallerView<'t> {
    pub path: String,
    pub display_name: &'t str,
    pub file: &'t str,
    pub line: u32,
    pub col: u32,
    pub snippet: &'t str,
    pub calling_signature: &'t str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CallerView<'t>>>,
}

/// Visible part of the caller tree, nested
pub fn caller_views(tree: &GraphTree) -> Vec<CallerView<'_>> {
    views_for(tree, tree.roots(), &TreePath::default())
}

fn views_for<'t>(
    tree: &'t GraphTree,
    level: &'t [CallGraphNode],
    parent: &TreePath,
) -> Vec<CallerView<'t>> {
    level
        .iter()
        .enumerate()
        .filter(|(_, node)| !tree.is_hidden(node))
        .map(|(index, node)| {
            let path = parent.child(index);
            CallerView {
                path: path.to_string(),
                display_name: &node.display_name,
                file: &node.filename,
                line: node.line,
                col: node.col,
                snippet: &node.snippet_text,
                calling_signature: node.calling_signature.as_str(),
                children: node
                    .children
                    .as_ref()
                    .map(|children| views_for(tree, children, &path)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EdgeKind;

    fn reference(file: &str, line: u32) -> Edge {
        Edge::new("cpp:Foo", EdgeKind::Reference, file, line, "Foo();")
    }

    #[test]
    fn test_group_consecutive_files() {
        let edges = vec![
            reference("a.cc", 1),
            reference("a.cc", 5),
            reference("b.cc", 2),
            reference("a.cc", 9),
        ];
        let groups = group_by_file(&edges, None);
        let files: Vec<_> = groups.iter().map(|g| (g.file, g.edges.len())).collect();
        assert_eq!(files, vec![("a.cc", 2), ("b.cc", 1), ("a.cc", 1)]);
    }

    #[test]
    fn test_group_hides_test_files() {
        let edges = vec![
            reference("a.cc", 1),
            reference("a_unitTest.cc", 5),
            reference("a.cc", 9),
        ];
        let groups = group_by_file(&edges, Some("test"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].edges.len(), 2);
    }
}
