//! Indirection Resolvers
//!
//! Each resolver recognizes one idiom that hides the real caller and tries to
//! replace the visible entry with the callers behind it. A resolver never
//! fails: anything it cannot resolve is reported as [`Resolution::Unresolved`]
//! and the builder keeps the raw entry.
//!
//! @module xrefs/indirection

pub mod dispatch_stub;
pub mod message_dispatch;
pub mod state_loop;

use super::callers::CallGraphNode;
use super::context::SessionContext;
use super::enclosing::enclosing_method;
use super::patterns::IndirectionFamily;
use crate::index::Edge;

/// Outcome of one resolver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Entry replaced by the callers found behind it (never empty)
    Replaced(Vec<CallGraphNode>),
    /// Nothing found; keep the raw entry
    Unresolved,
}

impl Resolution {
    pub fn from_nodes(nodes: Vec<CallGraphNode>) -> Self {
        if nodes.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::Replaced(nodes)
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Replaced(_))
    }
}

/// One node per reference, labelled with the family prefix and the method
/// enclosing the reference. References outside any method are skipped.
fn nodes_for_references<'e>(
    ctx: &SessionContext<'_>,
    family: IndirectionFamily,
    references: impl IntoIterator<Item = &'e Edge>,
) -> Vec<CallGraphNode> {
    references
        .into_iter()
        .filter_map(|reference| {
            let method = enclosing_method(ctx, &reference.file, reference.line)?;
            let label = family.label(&method.name);
            Some(CallGraphNode::from_reference(reference, &method, label))
        })
        .collect()
}
