//! JSON output formatter
//!
//! Machine-readable session views for editor plugins and scripting.
//!
//! @module output/json

use serde::Serialize;

use super::{caller_views, group_by_file, CallerView, FileGroup, SessionFormatter};
use crate::index::{Edge, SourceLocation};
use crate::xrefs::{Selection, XrefSession};

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Serialize)]
struct CallersDocument<'s> {
    selection: &'s Selection,
    signature: &'s str,
    show_tests: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<&'s Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declaration: Option<&'s Edge>,
    callers: Vec<CallerView<'s>>,
    references: Vec<FileGroup<'s>>,
    overrides: Vec<&'s Edge>,
    overridden_by: Vec<&'s Edge>,
}

#[derive(Serialize)]
struct XrefsDocument<'s> {
    selection: &'s Selection,
    signature: &'s str,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<&'s Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declaration: Option<&'s Edge>,
    overrides: Vec<&'s Edge>,
    overridden_by: Vec<&'s Edge>,
    references: Vec<FileGroup<'s>>,
}

#[derive(Serialize)]
struct JumpDocument<'s> {
    selection: &'s Selection,
    target: Option<&'s SourceLocation>,
}

// =============================================================================
// FORMATTER IMPLEMENTATION
// =============================================================================

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON formatter (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFormatter for JsonFormatter {
    fn format_callers(&self, session: &XrefSession<'_>) -> String {
        let xrefs = session.xrefs();
        self.to_json(&CallersDocument {
            selection: session.selection(),
            signature: session.signature().as_str(),
            show_tests: session.show_tests(),
            definition: xrefs.definition.as_ref(),
            declaration: xrefs.declaration.as_ref(),
            callers: caller_views(session.tree()),
            references: group_by_file(&xrefs.references, session.reference_filter()),
            overrides: xrefs.overrides.iter().collect(),
            overridden_by: xrefs.overridden_by.iter().collect(),
        })
    }

    fn format_xrefs(&self, session: &XrefSession<'_>) -> String {
        let xrefs = session.xrefs();
        self.to_json(&XrefsDocument {
            selection: session.selection(),
            signature: session.signature().as_str(),
            definition: xrefs.definition.as_ref(),
            declaration: xrefs.declaration.as_ref(),
            overrides: xrefs.overrides.iter().collect(),
            overridden_by: xrefs.overridden_by.iter().collect(),
            references: group_by_file(&xrefs.references, session.reference_filter()),
        })
    }

    fn format_jump(&self, session: &XrefSession<'_>, target: Option<&SourceLocation>) -> String {
        self.to_json(&JumpDocument {
            selection: session.selection(),
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GraphConfig;
    use crate::index::{
        Annotation, AnnotationKind, EdgeKind, LineRange, MemoryIndex, RawCallGraphEntry, Signature,
    };
    use crate::xrefs::TreePath;

    const FOO: &str = "cpp:a::Foo()";

    fn fixture() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index
            .add_annotation(
                "a.cc",
                Annotation::new(
                    AnnotationKind::Link,
                    Some(Signature::from(FOO)),
                    LineRange::on_line(3, 0, 3),
                )
                .with_text("Foo"),
            )
            .add_edge(Edge::new(FOO, EdgeKind::Declaration, "a.h", 2, "void Foo();"))
            .add_caller(
                &Signature::from(FOO),
                RawCallGraphEntry {
                    identifier: "Bar".to_string(),
                    signature: Signature::from("cpp:Bar()"),
                    file_path: Some("b.cc".to_string()),
                    call_site_line: 7,
                    call_site_column: 2,
                    snippet_text: "Foo();".to_string(),
                    display_name: "Bar(int)".to_string(),
                },
            );
        index
    }

    #[test]
    fn test_format_callers_json() {
        let index = fixture();
        let mut session = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 3, 1, "Foo"),
        )
        .unwrap();
        session.expand(&TreePath::root(0)).unwrap();

        let output = JsonFormatter::compact().format_callers(&session);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["signature"], FOO);
        assert_eq!(value["declaration"]["file"], "a.h");
        assert_eq!(value["callers"][0]["display_name"], "Bar");
        assert_eq!(value["callers"][0]["path"], "0");
        assert_eq!(value["callers"][0]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_format_jump_json() {
        let index = fixture();
        let session = XrefSession::open(
            &index,
            &GraphConfig::default(),
            Selection::new("a.cc", 3, 1, "Foo"),
        )
        .unwrap();

        let target = session.jump_to_definition();
        let output = JsonFormatter::new().format_jump(&session, target.as_ref());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["target"]["file"], "a.h");
        assert_eq!(value["target"]["line"], 2);
    }
}
