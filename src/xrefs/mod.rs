//! Cross References and Caller Graphs
//!
//! Resolution and graph construction over an [`IndexClient`](crate::index::IndexClient):
//! - selection → signature ([`resolver`])
//! - signature → definition, declaration, overrides, references ([`aggregate`])
//! - signature → callers, including callers hidden behind indirection
//!   ([`callers`], [`indirection`])
//! - an expandable caller tree per session ([`tree`], [`session`])
//!
//! @module xrefs

pub mod aggregate;
pub mod callers;
pub mod context;
pub mod enclosing;
pub mod indirection;
pub mod patterns;
pub mod resolver;
pub mod session;
pub mod tree;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use aggregate::{get_xrefs, XrefSet};
pub use callers::{build_callers, CallGraphNode, REFERENCE_PREFIX};
pub use context::{ReentrancyGuard, SessionContext};
pub use enclosing::{enclosing_method, EnclosingMethod};
pub use indirection::Resolution;
pub use patterns::{
    DispatchStubPattern, IndirectionFamily, MessageDispatchPattern, StateLoopPattern,
};
pub use resolver::{resolve, Selection};
pub use session::XrefSession;
pub use tree::{GraphTree, TreePath};
