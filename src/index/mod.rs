//! Index Client Adapter
//!
//! The core never talks to an index service directly. Everything it needs is
//! behind [`IndexClient`]:
//! - annotations covering a file
//! - typed edges for a signature
//! - direct call-graph callers of a signature
//! - symbol search by name
//!
//! Implementations report failures as `Error::UpstreamUnavailable`; the core
//! treats those as "no data".
//!
//! @module index

pub mod cache;
pub mod codesearch;
pub mod memory;
pub mod types;

use crate::core::error::Result;

pub use cache::ResponseCache;
pub use codesearch::CodeSearchClient;
pub use memory::MemoryIndex;
pub use types::{
    Annotation, AnnotationKind, Edge, EdgeKind, EdgeKinds, LineRange, RawCallGraphEntry,
    Signature, SourceLocation,
};

/// Query surface of a code-index service
pub trait IndexClient {
    /// All annotations for an index-relative file
    fn annotations(&self, file: &str) -> Result<Vec<Annotation>>;

    /// Edges of the requested kinds for `signature`, in index order
    fn edges(&self, signature: &Signature, kinds: EdgeKinds) -> Result<Vec<Edge>>;

    /// Direct callers of `signature`, in index order
    fn direct_callers(&self, signature: &Signature) -> Result<Vec<RawCallGraphEntry>>;

    /// Signatures whose name matches `pattern`, in index order
    fn search_symbols(&self, pattern: &str) -> Result<Vec<Signature>>;
}
