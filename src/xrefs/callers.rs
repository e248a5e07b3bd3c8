//! Call Graph Builder
//!
//! One level of callers for a signature:
//! 1. direct call-graph entries, with repeated call-site fragments and
//!    location-less synthetic entries dropped
//! 2. each entry labelled with its enclosing method
//! 3. state-loop dispatchers and dispatch stubs handed to their resolvers,
//!    which may replace the entry with the callers they uncover
//! 4. for low fan-in symbols, callers found through references only
//! 5. duplicates by display name removed, first occurrence kept
//!
//! Expansion of a node is a separate call on the node's calling signature.
//!
//! @module xrefs/callers

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::context::SessionContext;
use super::enclosing::{enclosing_method, EnclosingMethod};
use super::indirection::{dispatch_stub, message_dispatch, state_loop, Resolution};
use super::patterns::{
    short_name, symbol_name, trim_parameters, DispatchStubPattern, IndirectionFamily,
    MessageDispatchPattern, StateLoopPattern,
};
use crate::index::{Edge, EdgeKind, EdgeKinds, RawCallGraphEntry, Signature};

/// Label prefix of callers found through references
pub const REFERENCE_PREFIX: &str = "ref: ";

// =============================================================================
// NODE
// =============================================================================

/// One caller in the call graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphNode {
    /// File holding the call site
    pub filename: String,
    pub line: u32,
    pub col: u32,
    /// Text of the call-site line
    pub snippet_text: String,
    /// Short identifier of the calling method
    pub calling_method: String,
    /// Signature used to expand this node
    pub calling_signature: Signature,
    /// User-facing label
    pub display_name: String,
    /// `None` until expanded; `Some(vec![])` means expanded with no callers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CallGraphNode>>,
}

impl CallGraphNode {
    /// Node for a direct call-graph entry. `None` for entries without a file.
    pub fn from_entry(entry: &RawCallGraphEntry, display_name: String) -> Option<Self> {
        let site = entry.call_site()?;
        Some(Self {
            filename: site.file,
            line: site.line,
            col: site.column,
            snippet_text: entry.snippet_text.clone(),
            calling_method: entry.identifier.clone(),
            calling_signature: entry.signature.clone(),
            display_name,
            children: None,
        })
    }

    /// Node for a reference found inside `method`
    pub fn from_reference(edge: &Edge, method: &EnclosingMethod, display_name: String) -> Self {
        Self {
            filename: edge.file.clone(),
            line: edge.line,
            col: edge.column.unwrap_or(0),
            snippet_text: edge.snippet.clone(),
            calling_method: short_name(&method.name).to_string(),
            calling_signature: method.signature.clone(),
            display_name,
            children: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Display name contains `marker`, ignoring case
    pub fn is_test(&self, marker: &str) -> bool {
        !marker.is_empty()
            && self
                .display_name
                .to_lowercase()
                .contains(&marker.to_lowercase())
    }

    /// Prefix both labels with the family's provenance marker
    pub fn relabel(&mut self, family: IndirectionFamily) {
        self.display_name = family.label(&self.display_name);
        self.calling_method = family.label(&self.calling_method);
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Callers of `signature`, one level deep.
///
/// `known_references` are the signature's REFERENCE edges when the caller
/// already has them; otherwise they are fetched.
pub fn build_callers(
    ctx: &SessionContext<'_>,
    signature: &Signature,
    known_references: Option<&[Edge]>,
) -> Vec<CallGraphNode> {
    let entries = dedup_entries(ctx.direct_callers(signature));
    debug!("{} direct callers of {}", entries.len(), signature);

    let mut nodes = Vec::new();
    for entry in &entries {
        add_direct(ctx, signature, entry, &mut nodes);
    }

    let references: Vec<Edge> = match known_references {
        Some(edges) => edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Reference)
            .cloned()
            .collect(),
        None => ctx.edges(signature, EdgeKinds::REFERENCE),
    };

    if references.len() < ctx.config().reference_threshold {
        add_references(ctx, &references, &mut nodes);
    } else {
        trace!(
            "{} references of {}, skipping reference-derived callers",
            references.len(),
            signature
        );
    }

    dedup_display_names(nodes)
}

/// Drop entries without a file and entries repeating the last kept signature
fn dedup_entries(entries: Vec<RawCallGraphEntry>) -> Vec<RawCallGraphEntry> {
    let mut kept: Vec<RawCallGraphEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.file_path.is_none() {
            continue;
        }
        if kept.last().is_some_and(|last| last.signature == entry.signature) {
            continue;
        }
        kept.push(entry);
    }
    kept
}

fn display_name_for(ctx: &SessionContext<'_>, entry: &RawCallGraphEntry) -> String {
    if let Some(file) = &entry.file_path {
        if let Some(method) = enclosing_method(ctx, file, entry.call_site_line) {
            return method.name;
        }
    }

    let trimmed = trim_parameters(&entry.display_name);
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    let from_signature = symbol_name(entry.signature.as_str());
    if from_signature.is_empty() {
        entry.identifier.clone()
    } else {
        from_signature
    }
}

fn add_direct(
    ctx: &SessionContext<'_>,
    callee: &Signature,
    entry: &RawCallGraphEntry,
    nodes: &mut Vec<CallGraphNode>,
) {
    let display_name = display_name_for(ctx, entry);

    let resolution = if StateLoopPattern::is_dispatcher(&entry.identifier) {
        trace!("{} is a state-loop dispatcher", entry.identifier);
        state_loop::resolve(ctx, entry)
    } else if DispatchStubPattern::is_stub(&display_name) {
        trace!("{} is a dispatch stub", display_name);
        dispatch_stub::resolve(ctx, &display_name, callee)
    } else {
        Resolution::Unresolved
    };

    match resolution {
        Resolution::Replaced(resolved) => nodes.extend(resolved),
        Resolution::Unresolved => nodes.extend(CallGraphNode::from_entry(entry, display_name)),
    }
}

fn add_references(ctx: &SessionContext<'_>, references: &[Edge], nodes: &mut Vec<CallGraphNode>) {
    let mut seen: HashSet<String> = nodes.iter().map(|n| n.display_name.clone()).collect();

    for reference in references {
        let Some(method) = enclosing_method(ctx, &reference.file, reference.line) else {
            continue;
        };
        let label = format!("{}{}", REFERENCE_PREFIX, method.name);
        if seen.contains(&method.name) || seen.contains(&label) {
            continue;
        }

        if MessageDispatchPattern::is_handler(&method.name) {
            trace!("{} is a message handler", method.name);
            if let Resolution::Replaced(resolved) = message_dispatch::resolve(ctx, reference) {
                seen.extend(resolved.iter().map(|n| n.display_name.clone()));
                nodes.extend(resolved);
                continue;
            }
        }

        seen.insert(label.clone());
        nodes.push(CallGraphNode::from_reference(reference, &method, label));
    }
}

fn dedup_display_names(nodes: Vec<CallGraphNode>) -> Vec<CallGraphNode> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.display_name.clone()))
        .collect()
}
