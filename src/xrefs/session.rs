//! Xref Session
//!
//! One interactive "find callers" session: a resolved selection, its xrefs
//! and the caller tree grown from it. Everything is kept so the presentation
//! can be regenerated without new queries. Opening a new selection means
//! opening a new session.
//!
//! The caller tree is built on first use, so sessions that only look at
//! xrefs or jump targets never query the call graph.
//!
//! @module xrefs/session

use once_cell::unsync::OnceCell;
use tracing::{debug, info};

use super::aggregate::{get_xrefs, XrefSet};
use super::callers::{build_callers, CallGraphNode};
use super::context::SessionContext;
use super::resolver::{resolve, Selection};
use super::tree::{GraphTree, TreePath};
use crate::core::config::GraphConfig;
use crate::core::error::{Error, Result};
use crate::index::{IndexClient, Signature, SourceLocation};

pub struct XrefSession<'a> {
    ctx: SessionContext<'a>,
    selection: Selection,
    signature: Signature,
    xrefs: XrefSet,
    tree: OnceCell<GraphTree>,
    show_tests: bool,
}

impl<'a> XrefSession<'a> {
    /// Resolve `selection` and fetch its xrefs.
    ///
    /// Fails only with `NotFound` when the selection resolves to nothing.
    pub fn open(index: &'a dyn IndexClient, config: &GraphConfig, selection: Selection) -> Result<Self> {
        let ctx = SessionContext::new(index, config);
        let signature = resolve(&ctx, &selection)?;
        info!("Opened session for {} ({})", selection.text, signature);

        let xrefs = get_xrefs(&ctx, &signature);

        Ok(Self {
            ctx,
            selection,
            signature,
            xrefs,
            tree: OnceCell::new(),
            show_tests: true,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn xrefs(&self) -> &XrefSet {
        &self.xrefs
    }

    /// Caller tree, building the first level of callers on first use
    pub fn tree(&self) -> &GraphTree {
        self.tree.get_or_init(|| {
            let roots = build_callers(&self.ctx, &self.signature, Some(&self.xrefs.references));
            debug!("Built {} root callers of {}", roots.len(), self.signature);
            let mut tree = GraphTree::new(roots, self.ctx.config().test_marker.clone());
            tree.set_show_tests(self.show_tests);
            tree
        })
    }

    /// Whether the caller tree has been built yet
    pub fn has_callers(&self) -> bool {
        self.tree.get().is_some()
    }

    /// Fetch callers of the node at `path`
    pub fn expand(&mut self, path: &TreePath) -> Result<usize> {
        self.tree();
        let ctx = &self.ctx;
        let Some(tree) = self.tree.get_mut() else {
            return Err(Error::StalePath {
                path: path.to_string(),
            });
        };
        let count = tree.expand(path, |node| build_callers(ctx, &node.calling_signature, None))?;
        debug!("Expanded {} with {} callers", path, count);
        Ok(count)
    }

    pub fn collapse(&mut self, path: &TreePath) -> Result<()> {
        self.tree();
        match self.tree.get_mut() {
            Some(tree) => tree.collapse(path),
            None => Err(Error::StalePath {
                path: path.to_string(),
            }),
        }
    }

    /// Show (`true`) or hide (`false`) callers and references that look like tests
    pub fn set_test_filter(&mut self, show: bool) {
        self.show_tests = show;
        if let Some(tree) = self.tree.get_mut() {
            tree.set_show_tests(show);
        }
    }

    pub fn show_tests(&self) -> bool {
        self.show_tests
    }

    /// Marker hiding test references while tests are hidden
    pub fn reference_filter(&self) -> Option<&str> {
        (!self.show_tests).then(|| self.ctx.config().test_marker.as_str())
    }

    pub fn node(&self, path: &TreePath) -> Result<&CallGraphNode> {
        self.tree().node(path)
    }

    /// Call site of the node at `path`, for navigation
    pub fn location_of(&self, path: &TreePath) -> Result<SourceLocation> {
        let node = self.tree().node(path)?;
        Ok(SourceLocation::new(node.filename.clone(), node.line, node.col))
    }

    pub fn jump_to_definition(&self) -> Option<SourceLocation> {
        self.xrefs.definition_target()
    }

    pub fn jump_to_declaration(&self) -> Option<SourceLocation> {
        self.xrefs.declaration_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{
        Annotation, AnnotationKind, Edge, EdgeKind, LineRange, MemoryIndex, RawCallGraphEntry,
    };

    const FOO: &str = "cpp:a::Foo()@a.cc";

    fn fixture() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index
            .add_annotation(
                "a.cc",
                Annotation::new(
                    AnnotationKind::Link,
                    Some(Signature::from(FOO)),
                    LineRange::on_line(10, 2, 5),
                )
                .with_text("Foo"),
            )
            .add_edge(Edge::new(FOO, EdgeKind::Definition, "a.cc", 10, "void Foo() {"))
            .add_edge(Edge::new(FOO, EdgeKind::Declaration, "a.h", 3, "void Foo();"))
            .add_caller(
                &Signature::from(FOO),
                RawCallGraphEntry {
                    identifier: "Bar".to_string(),
                    signature: Signature::from("cpp:a::Bar()"),
                    file_path: Some("b.cc".to_string()),
                    call_site_line: 7,
                    call_site_column: 2,
                    snippet_text: "Foo();".to_string(),
                    display_name: "a::Bar()".to_string(),
                },
            );
        index
    }

    #[test]
    fn test_open_and_navigate() {
        let index = fixture();
        let session = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 10, 3, "Foo"),
        )
        .unwrap();

        assert_eq!(session.signature().as_str(), FOO);
        assert_eq!(session.jump_to_definition().unwrap().file, "a.cc");
        assert_eq!(session.jump_to_declaration().unwrap().file, "a.h");

        let location = session.location_of(&TreePath::root(0)).unwrap();
        assert_eq!((location.file.as_str(), location.line), ("b.cc", 7));
    }

    #[test]
    fn test_expand_uses_calling_signature() {
        let mut index = fixture();
        index.add_caller(
            &Signature::from("cpp:a::Bar()"),
            RawCallGraphEntry {
                identifier: "Baz".to_string(),
                signature: Signature::from("cpp:a::Baz()"),
                file_path: Some("c.cc".to_string()),
                call_site_line: 1,
                call_site_column: 0,
                snippet_text: "Bar();".to_string(),
                display_name: "a::Baz()".to_string(),
            },
        );
        let mut session = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 10, 3, "Foo"),
        )
        .unwrap();

        assert_eq!(session.expand(&TreePath::root(0)).unwrap(), 1);
        assert_eq!(
            session.node(&TreePath::new(&[0, 0])).unwrap().display_name,
            "a::Baz"
        );
        assert!(matches!(
            session.expand(&TreePath::root(3)),
            Err(Error::StalePath { .. })
        ));
    }

    #[test]
    fn test_callers_built_on_first_use() {
        let index = fixture();
        let mut session = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 10, 3, "Foo"),
        )
        .unwrap();
        session.set_test_filter(false);
        let opened = index.query_count();

        assert!(session.jump_to_definition().is_some());
        assert!(!session.xrefs().is_empty());
        assert!(!session.has_callers());
        assert_eq!(index.query_count(), opened);

        assert_eq!(session.tree().roots().len(), 1);
        assert!(session.has_callers());
        assert!(!session.tree().show_tests());
        assert!(index.query_count() > opened);
    }

    #[test]
    fn test_open_unresolved_selection() {
        let index = fixture();
        let result = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 10, 3, "Nope"),
        );
        assert!(matches!(result, Err(Error::NotFound { text }) if text == "Nope"));
    }
}
