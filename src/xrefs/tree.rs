//! Graph Tree State
//!
//! The lazily grown caller tree of one session. Nodes are addressed by a
//! [`TreePath`] of sibling indices from the root, re-resolved against the
//! current tree on every operation.
//!
//! The test filter only affects what is visible; hidden nodes keep their
//! children and come back unchanged when the filter is lifted.
//!
//! @module xrefs/tree

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use super::callers::CallGraphNode;
use crate::core::error::{Error, Result};

// =============================================================================
// PATH
// =============================================================================

/// Sibling indices from the root to a node, e.g. `0,2,1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TreePath(SmallVec<[usize; 8]>);

impl TreePath {
    pub fn new(indices: &[usize]) -> Self {
        Self(SmallVec::from_slice(indices))
    }

    pub fn root(index: usize) -> Self {
        Self::new(&[index])
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(index);
        path
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth; root nodes are at depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPath {
            input: s.to_string(),
        };

        if s.trim().is_empty() {
            return Err(invalid());
        }
        let indices = s
            .split(',')
            .map(|part| part.trim().parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<SmallVec<[usize; 8]>>>()?;
        Ok(Self(indices))
    }
}

// =============================================================================
// TREE
// =============================================================================

/// Caller tree of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphTree {
    roots: Vec<CallGraphNode>,
    show_tests: bool,
    test_marker: String,
}

impl GraphTree {
    pub fn new(roots: Vec<CallGraphNode>, test_marker: impl Into<String>) -> Self {
        Self {
            roots,
            show_tests: true,
            test_marker: test_marker.into(),
        }
    }

    pub fn roots(&self) -> &[CallGraphNode] {
        &self.roots
    }

    pub fn node(&self, path: &TreePath) -> Result<&CallGraphNode> {
        let stale = || Error::StalePath {
            path: path.to_string(),
        };
        let (last, ancestors) = path.indices().split_last().ok_or_else(stale)?;

        let mut level: &[CallGraphNode] = &self.roots;
        for &index in ancestors {
            level = level
                .get(index)
                .and_then(|node| node.children.as_deref())
                .ok_or_else(stale)?;
        }
        level.get(*last).ok_or_else(stale)
    }

    fn node_mut(&mut self, path: &TreePath) -> Result<&mut CallGraphNode> {
        let stale = || Error::StalePath {
            path: path.to_string(),
        };
        let (last, ancestors) = path.indices().split_last().ok_or_else(stale)?;

        let mut level: &mut Vec<CallGraphNode> = &mut self.roots;
        for &index in ancestors {
            level = level
                .get_mut(index)
                .and_then(|node| node.children.as_mut())
                .ok_or_else(stale)?;
        }
        level.get_mut(*last).ok_or_else(stale)
    }

    /// Attach children fetched by `fetch` to the node at `path`.
    ///
    /// An already expanded node is left as is. Returns the number of children.
    pub fn expand<F>(&mut self, path: &TreePath, fetch: F) -> Result<usize>
    where
        F: FnOnce(&CallGraphNode) -> Vec<CallGraphNode>,
    {
        let node = self.node_mut(path)?;
        if let Some(children) = &node.children {
            return Ok(children.len());
        }
        let children = fetch(node);
        let count = children.len();
        node.children = Some(children);
        Ok(count)
    }

    /// Forget the children of the node at `path`
    pub fn collapse(&mut self, path: &TreePath) -> Result<()> {
        self.node_mut(path)?.children = None;
        Ok(())
    }

    pub fn set_show_tests(&mut self, show: bool) {
        self.show_tests = show;
    }

    pub fn show_tests(&self) -> bool {
        self.show_tests
    }

    /// Hidden by the test filter
    pub fn is_hidden(&self, node: &CallGraphNode) -> bool {
        !self.show_tests && node.is_test(&self.test_marker)
    }

    /// Visible nodes in pre-order with their paths. Children of hidden or
    /// collapsed nodes are not visited.
    pub fn visible(&self) -> Vec<(TreePath, &CallGraphNode)> {
        let mut out = Vec::new();
        self.collect_visible(&self.roots, &TreePath::default(), &mut out);
        out
    }

    fn collect_visible<'t>(
        &'t self,
        level: &'t [CallGraphNode],
        parent: &TreePath,
        out: &mut Vec<(TreePath, &'t CallGraphNode)>,
    ) {
        for (index, node) in level.iter().enumerate() {
            if self.is_hidden(node) {
                continue;
            }
            let path = parent.child(index);
            out.push((path.clone(), node));
            if let Some(children) = &node.children {
                self.collect_visible(children, &path, out);
            }
        }
    }
}
