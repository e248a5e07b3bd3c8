//! Dispatch-stub resolver
//!
//! Generated `FooStubDispatch::Accept` stubs forward interface calls to the
//! implementation, so the visible caller of `FooImpl::Bar` is the stub. The
//! resolver hops to the `Foo::Bar` interface declaration and reports its
//! callers instead.
//!
//! Recursion back into the builder holds the family guard, so a stub found
//! while resolving a stub stays a raw entry.
//!
//! @module xrefs/indirection/dispatch_stub

use std::cmp::Reverse;
use tracing::debug;

use super::Resolution;
use crate::index::Signature;
use crate::xrefs::callers::build_callers;
use crate::xrefs::context::SessionContext;
use crate::xrefs::patterns::{is_declaration_only, DispatchStubPattern, IndirectionFamily};

/// Replace a stub entry with the callers of the interface method.
///
/// `display_name` is the stub's resolved label; `original` is the signature
/// whose callers are being built.
pub fn resolve(ctx: &SessionContext<'_>, display_name: &str, original: &Signature) -> Resolution {
    let Some(_guard) = ctx.try_enter(IndirectionFamily::DispatchStub) else {
        debug!("Dispatch-stub resolution in flight, keeping {}", display_name);
        return Resolution::Unresolved;
    };
    let Some(_depth) = ctx.descend() else {
        return Resolution::Unresolved;
    };

    let Some(term) = DispatchStubPattern::search_term(display_name, original.as_str()) else {
        return Resolution::Unresolved;
    };
    let Some(interface) = best_candidate(ctx.search_symbols(&term), &term) else {
        debug!("No interface declaration for {}", term);
        return Resolution::Unresolved;
    };

    debug!("Stub {} forwards {}", display_name, interface);
    let mut nodes = build_callers(ctx, &interface, None);
    for node in &mut nodes {
        node.relabel(IndirectionFamily::DispatchStub);
    }
    Resolution::from_nodes(nodes)
}

/// Most specific candidate naming `term`: interface-header declarations
/// first, then any declaration, then the longest signature. Ties keep the
/// first candidate.
fn best_candidate(candidates: Vec<Signature>, term: &str) -> Option<Signature> {
    candidates
        .into_iter()
        .filter(|s| DispatchStubPattern::matches_term(s.as_str(), term) || s.as_str().contains(term))
        .min_by_key(|s| {
            let s = s.as_str();
            Reverse((
                DispatchStubPattern::is_interface_declaration(s),
                is_declaration_only(s),
                s.len(),
            ))
        })
}
