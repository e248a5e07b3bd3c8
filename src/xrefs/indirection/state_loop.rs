//! State-loop resolver
//!
//! A `DoLoop` dispatcher calls the target from a `switch` on the next state.
//! The caller a reader cares about is whoever assigns that state, so the
//! state enumerator guarding the call site is traced to its writes.
//!
//! @module xrefs/indirection/state_loop

use tracing::debug;

use super::{nodes_for_references, Resolution};
use crate::index::{Annotation, AnnotationKind, EdgeKinds, RawCallGraphEntry, Signature};
use crate::xrefs::context::SessionContext;
use crate::xrefs::patterns::{IndirectionFamily, StateLoopPattern};

/// Replace a dispatcher entry with the methods that set its state
pub fn resolve(ctx: &SessionContext<'_>, entry: &RawCallGraphEntry) -> Resolution {
    let Some(_guard) = ctx.try_enter(IndirectionFamily::StateLoop) else {
        return Resolution::Unresolved;
    };
    let Some(file) = entry.file_path.as_deref() else {
        return Resolution::Unresolved;
    };

    let annotations = ctx.annotations(file);
    let position = (entry.call_site_line, entry.call_site_column);
    let Some(state) = preceding_state_constant(&annotations, position) else {
        debug!("No state constant before {}:{}", file, entry.call_site_line);
        return Resolution::Unresolved;
    };

    let references = ctx.edges(state, EdgeKinds::REFERENCE);
    let writes = references
        .iter()
        .filter(|r| !StateLoopPattern::is_state_read(&r.snippet));
    let nodes = nodes_for_references(ctx, IndirectionFamily::StateLoop, writes);

    debug!("{} state-loop callers through {}", nodes.len(), state);
    Resolution::from_nodes(nodes)
}

/// Nearest state constant starting strictly before `position`
fn preceding_state_constant(annotations: &[Annotation], position: (u32, u32)) -> Option<&Signature> {
    let mut best: Option<(&Annotation, &Signature)> = None;

    for annotation in annotations {
        if annotation.kind != AnnotationKind::Constant || annotation.range.start() >= position {
            continue;
        }
        let Some(signature) = &annotation.signature else {
            continue;
        };
        if !StateLoopPattern::is_state_constant(signature.as_str()) {
            continue;
        }
        if best.map_or(true, |(b, _)| annotation.range.start() > b.range.start()) {
            best = Some((annotation, signature));
        }
    }

    best.map(|(_, signature)| signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GraphConfig;
    use crate::index::{Edge, EdgeKind, LineRange, MemoryIndex};

    const STATE: &str = "cpp:net::Parser::STATE_SEND_BODY@parser.h";

    fn constant(line: u32, column: u32, signature: &str) -> Annotation {
        Annotation::new(
            AnnotationKind::Constant,
            Some(Signature::from(signature)),
            LineRange::on_line(line, column, column + 10),
        )
    }

    fn method(line: u32, signature: &str) -> Annotation {
        Annotation::new(
            AnnotationKind::Method,
            Some(Signature::from(signature)),
            LineRange::on_line(line, 0, 10),
        )
    }

    fn dispatcher() -> RawCallGraphEntry {
        RawCallGraphEntry {
            identifier: "DoLoop".to_string(),
            signature: Signature::from("cpp:net::Parser::DoLoop(int)"),
            file_path: Some("parser.cc".to_string()),
            call_site_line: 41,
            call_site_column: 11,
            snippet_text: "rv = DoSendBody();".to_string(),
            display_name: "net::Parser::DoLoop(int)".to_string(),
        }
    }

    #[test]
    fn test_nearest_preceding_state_constant() {
        let annotations = vec![
            constant(30, 9, "cpp:net::Parser::STATE_SEND_HEADERS"),
            constant(40, 9, STATE),
            constant(40, 30, "cpp:net::Parser::kMaxSize"),
            constant(42, 9, "cpp:net::Parser::STATE_DONE"),
        ];
        let found = preceding_state_constant(&annotations, (41, 11)).unwrap();
        assert_eq!(found.as_str(), STATE);
        assert!(preceding_state_constant(&annotations, (30, 9)).is_none());
    }

    #[test]
    fn test_resolves_to_state_writers() {
        let mut index = MemoryIndex::new();
        index
            .add_annotation("parser.cc", constant(40, 9, STATE))
            .add_annotation("parser.cc", method(10, "cpp:net::Parser::SendRequest()@parser.cc"))
            .add_annotation("parser.cc", method(35, "cpp:net::Parser::DoLoop(int)@parser.cc"))
            .add_edge(Edge::new(STATE, EdgeKind::Reference, "parser.cc", 12, "next_state_ = STATE_SEND_BODY;"))
            .add_edge(Edge::new(STATE, EdgeKind::Reference, "parser.cc", 40, "case STATE_SEND_BODY:"));
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        let Resolution::Replaced(nodes) = resolve(&ctx, &dispatcher()) else {
            panic!("expected state-loop callers");
        };
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].display_name, "doloop: net::Parser::SendRequest");
        assert_eq!(
            nodes[0].calling_signature.as_str(),
            "cpp:net::Parser::SendRequest()@parser.cc"
        );
        assert!(!ctx.is_held(IndirectionFamily::StateLoop));
    }

    #[test]
    fn test_only_reads_is_unresolved() {
        let mut index = MemoryIndex::new();
        index
            .add_annotation("parser.cc", constant(40, 9, STATE))
            .add_edge(Edge::new(STATE, EdgeKind::Reference, "parser.cc", 50, "if (next_state_ == STATE_SEND_BODY)"));
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        assert_eq!(resolve(&ctx, &dispatcher()), Resolution::Unresolved);
    }
}
