//! Xref Aggregator
//!
//! @module xrefs/aggregate

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::context::SessionContext;
use crate::index::{Edge, EdgeKind, EdgeKinds, Signature, SourceLocation};

/// Structural relationships of one signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XrefSet {
    /// First definition seen
    pub definition: Option<Edge>,
    /// First declaration seen
    pub declaration: Option<Edge>,
    pub overrides: BTreeSet<Edge>,
    pub overridden_by: BTreeSet<Edge>,
    /// References in index order
    pub references: Vec<Edge>,
}

impl XrefSet {
    /// Fold edges into a set; later definitions and declarations are ignored
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut xrefs = XrefSet::default();

        for edge in edges {
            match edge.kind {
                EdgeKind::Definition => {
                    xrefs.definition.get_or_insert(edge);
                }
                EdgeKind::Declaration => {
                    xrefs.declaration.get_or_insert(edge);
                }
                EdgeKind::Overrides => {
                    xrefs.overrides.insert(edge);
                }
                EdgeKind::OverriddenBy => {
                    xrefs.overridden_by.insert(edge);
                }
                EdgeKind::Reference => xrefs.references.push(edge),
            }
        }

        xrefs
    }

    pub fn is_empty(&self) -> bool {
        self.definition.is_none()
            && self.declaration.is_none()
            && self.overrides.is_empty()
            && self.overridden_by.is_empty()
            && self.references.is_empty()
    }

    /// Where "go to definition" lands: the definition, else the declaration
    pub fn definition_target(&self) -> Option<SourceLocation> {
        self.definition
            .as_ref()
            .or(self.declaration.as_ref())
            .map(Edge::location)
    }

    /// Where "go to declaration" lands: the declaration, else the definition
    pub fn declaration_target(&self) -> Option<SourceLocation> {
        self.declaration
            .as_ref()
            .or(self.definition.as_ref())
            .map(Edge::location)
    }
}

/// Collect every relationship of `signature`. Never fails; missing data is an
/// empty set.
pub fn get_xrefs(ctx: &SessionContext<'_>, signature: &Signature) -> XrefSet {
    let xrefs = XrefSet::from_edges(ctx.edges(signature, EdgeKinds::XREFS));
    debug!(
        "Xrefs for {}: {} references, {} overrides, {} overridden",
        signature,
        xrefs.references.len(),
        xrefs.overrides.len(),
        xrefs.overridden_by.len()
    );
    xrefs
}
