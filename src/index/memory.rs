//! In-memory index
//!
//! Serves queries from fixture data. Used by tests and by the CLI's
//! `--fixture` mode, which loads the same shape from a JSON file.
//!
//! @module index/memory

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::{Annotation, Edge, EdgeKinds, RawCallGraphEntry, Signature};
use super::IndexClient;
use crate::core::error::{Error, Result};

/// Fixture-backed [`IndexClient`]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryIndex {
    /// Annotations per index-relative file
    annotations: HashMap<String, Vec<Annotation>>,
    /// All edges, in insertion order
    edges: Vec<Edge>,
    /// Direct callers per callee signature
    callers: HashMap<Signature, Vec<RawCallGraphEntry>>,
    /// Searchable symbols, in insertion order
    symbols: Vec<Signature>,
    /// Simulate an unreachable service
    #[serde(skip)]
    unavailable: bool,
    #[serde(skip)]
    queries: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixture data from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let index: MemoryIndex = serde_json::from_str(&content)?;
        Ok(index)
    }

    pub fn add_annotation(&mut self, file: &str, annotation: Annotation) -> &mut Self {
        self.annotations
            .entry(file.to_string())
            .or_default()
            .push(annotation);
        self
    }

    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    pub fn add_caller(&mut self, callee: &Signature, entry: RawCallGraphEntry) -> &mut Self {
        self.callers.entry(callee.clone()).or_default().push(entry);
        self
    }

    pub fn add_symbol(&mut self, signature: impl Into<Signature>) -> &mut Self {
        self.symbols.push(signature.into());
        self
    }

    /// Make every query fail as if the service were down
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Number of queries served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn begin_query(&self) -> Result<()> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if self.unavailable {
            return Err(Error::upstream("memory index marked unavailable"));
        }
        Ok(())
    }
}

impl IndexClient for MemoryIndex {
    fn annotations(&self, file: &str) -> Result<Vec<Annotation>> {
        self.begin_query()?;
        Ok(self.annotations.get(file).cloned().unwrap_or_default())
    }

    fn edges(&self, signature: &Signature, kinds: EdgeKinds) -> Result<Vec<Edge>> {
        self.begin_query()?;
        Ok(self
            .edges
            .iter()
            .filter(|e| &e.source == signature && kinds.has(e.kind))
            .cloned()
            .collect())
    }

    fn direct_callers(&self, signature: &Signature) -> Result<Vec<RawCallGraphEntry>> {
        self.begin_query()?;
        Ok(self.callers.get(signature).cloned().unwrap_or_default())
    }

    fn search_symbols(&self, pattern: &str) -> Result<Vec<Signature>> {
        self.begin_query()?;
        Ok(self
            .symbols
            .iter()
            .filter(|s| s.as_str().contains(pattern))
            .cloned()
            .collect())
    }
}
