//! Session Context
//!
//! Per-session state shared by every component of one "find callers"
//! session:
//! - the index handle and graph configuration
//! - one reentrancy flag per indirection family
//! - the indirection nesting depth
//! - annotations already fetched for a file
//!
//! Index failures are absorbed here: every query helper logs and returns an
//! empty collection, so components above never see `UpstreamUnavailable`.
//!
//! The context is deliberately `!Sync`; a session services one operation at
//! a time.
//!
//! @module xrefs/context

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

use super::patterns::IndirectionFamily;
use crate::core::config::GraphConfig;
use crate::core::error::Result;
use crate::index::{Annotation, Edge, EdgeKinds, IndexClient, RawCallGraphEntry, Signature};

// =============================================================================
// CONTEXT
// =============================================================================

/// Request context for one session
pub struct SessionContext<'a> {
    index: &'a dyn IndexClient,
    config: GraphConfig,
    guards: [Cell<bool>; 3],
    depth: Cell<usize>,
    annotations: RefCell<HashMap<String, Rc<Vec<Annotation>>>>,
}

impl<'a> SessionContext<'a> {
    pub fn new(index: &'a dyn IndexClient, config: &GraphConfig) -> Self {
        Self {
            index,
            config: config.clone(),
            guards: [Cell::new(false), Cell::new(false), Cell::new(false)],
            depth: Cell::new(0),
            annotations: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Index queries (failures absorbed)
    // -------------------------------------------------------------------------

    /// Annotations for `file`, fetched at most once per session
    pub fn annotations(&self, file: &str) -> Rc<Vec<Annotation>> {
        if let Some(cached) = self.annotations.borrow().get(file) {
            return Rc::clone(cached);
        }

        match self.index.annotations(file) {
            Ok(annotations) => {
                let annotations = Rc::new(annotations);
                self.annotations
                    .borrow_mut()
                    .insert(file.to_string(), Rc::clone(&annotations));
                annotations
            }
            Err(e) => {
                warn!("Annotations for {} unavailable: {}", file, e);
                Rc::new(Vec::new())
            }
        }
    }

    pub fn edges(&self, signature: &Signature, kinds: EdgeKinds) -> Vec<Edge> {
        absorb("edges", signature.as_str(), self.index.edges(signature, kinds))
    }

    pub fn direct_callers(&self, signature: &Signature) -> Vec<RawCallGraphEntry> {
        absorb(
            "direct callers",
            signature.as_str(),
            self.index.direct_callers(signature),
        )
    }

    pub fn search_symbols(&self, pattern: &str) -> Vec<Signature> {
        absorb("symbol search", pattern, self.index.search_symbols(pattern))
    }

    // -------------------------------------------------------------------------
    // Reentrancy and depth
    // -------------------------------------------------------------------------

    /// Claim the family's flag; `None` while another invocation holds it
    pub fn try_enter(&self, family: IndirectionFamily) -> Option<ReentrancyGuard<'_>> {
        let flag = &self.guards[family.index()];
        if flag.replace(true) {
            trace!("{} resolution already in flight", family);
            return None;
        }
        Some(ReentrancyGuard { flag, family })
    }

    pub fn is_held(&self, family: IndirectionFamily) -> bool {
        self.guards[family.index()].get()
    }

    /// Current indirection nesting depth
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Enter one more level of indirection; `None` once the bound is reached
    pub fn descend(&self) -> Option<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.config.max_indirection_depth {
            trace!("Indirection depth bound {} reached", depth);
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthGuard { depth: &self.depth })
    }
}

fn absorb<T>(what: &str, subject: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Index {} for {} unavailable: {}", what, subject, e);
        Vec::new()
    })
}

// =============================================================================
// GUARDS
// =============================================================================

/// Held while one top-level resolver invocation of a family is running.
/// Released on drop, on success and failure alike.
pub struct ReentrancyGuard<'c> {
    flag: &'c Cell<bool>,
    family: IndirectionFamily,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        trace!("{} resolution released", self.family);
        self.flag.set(false);
    }
}

/// One level of indirection nesting, undone on drop
pub struct DepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{AnnotationKind, LineRange, MemoryIndex};

    #[test]
    fn test_guard_is_exclusive_per_family() {
        let index = MemoryIndex::new();
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        let guard = ctx.try_enter(IndirectionFamily::DispatchStub);
        assert!(guard.is_some());
        assert!(ctx.try_enter(IndirectionFamily::DispatchStub).is_none());
        assert!(ctx.try_enter(IndirectionFamily::StateLoop).is_some());

        drop(guard);
        assert!(!ctx.is_held(IndirectionFamily::DispatchStub));
        assert!(ctx.try_enter(IndirectionFamily::DispatchStub).is_some());
    }

    #[test]
    fn test_depth_bound() {
        let index = MemoryIndex::new();
        let config = GraphConfig {
            max_indirection_depth: 1,
            ..GraphConfig::default()
        };
        let ctx = SessionContext::new(&index, &config);

        let first = ctx.descend();
        assert!(first.is_some());
        assert_eq!(ctx.depth(), 1);
        assert!(ctx.descend().is_none());
        drop(first);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_annotations_fetched_once() {
        let mut index = MemoryIndex::new();
        index.add_annotation(
            "a.cc",
            Annotation::new(AnnotationKind::Function, None, LineRange::on_line(1, 0, 4)),
        );
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        assert_eq!(ctx.annotations("a.cc").len(), 1);
        assert_eq!(ctx.annotations("a.cc").len(), 1);
        assert_eq!(index.query_count(), 1);
    }

    #[test]
    fn test_upstream_failure_is_empty() {
        let mut index = MemoryIndex::new();
        index.set_unavailable(true);
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        assert!(ctx.annotations("a.cc").is_empty());
        assert!(ctx.direct_callers(&Signature::from("s")).is_empty());
        assert!(ctx.search_symbols("Foo").is_empty());
    }
}
