//! cxrefs - cross references and caller graphs from a code-search index
//!
//! Resolves an identifier picked in an editor to an index signature, collects
//! its definition, declaration, overrides and references, and grows a tree of
//! its callers on demand. Callers reached through state-machine loops,
//! generated interface stubs and message handlers are attributed to the code
//! that really triggers them.

pub mod cli;
pub mod core;
pub mod index;
pub mod output;
pub mod xrefs;

pub use core::config::Config;
pub use core::error::{Error, Result};
pub use index::{IndexClient, MemoryIndex, Signature};
pub use xrefs::{Selection, TreePath, XrefSession};
