//! Message-dispatch resolver
//!
//! A reference inside `OnMessageReceived` is a handler table entry, not a
//! call. The message type declared before it is traced to the places that
//! construct the message.
//!
//! @module xrefs/indirection/message_dispatch

use tracing::debug;

use super::{nodes_for_references, Resolution};
use crate::index::{Annotation, AnnotationKind, Edge, EdgeKind, EdgeKinds, Signature};
use crate::xrefs::context::SessionContext;
use crate::xrefs::patterns::{IndirectionFamily, MessageDispatchPattern};

/// Replace a handler reference with the methods that send the message
pub fn resolve(ctx: &SessionContext<'_>, reference: &Edge) -> Resolution {
    let Some(_guard) = ctx.try_enter(IndirectionFamily::MessageDispatch) else {
        return Resolution::Unresolved;
    };

    let annotations = ctx.annotations(&reference.file);
    let Some(message) = preceding_type_alias(&annotations, reference.position()) else {
        debug!("No message type before {}:{}", reference.file, reference.line);
        return Resolution::Unresolved;
    };

    let references = ctx.edges(message, EdgeKinds::REFERENCE);
    let constructions = references.iter().filter(|r| {
        r.kind == EdgeKind::Reference && MessageDispatchPattern::is_construction(&r.snippet)
    });
    let nodes = nodes_for_references(ctx, IndirectionFamily::MessageDispatch, constructions);

    debug!("{} message senders of {}", nodes.len(), message);
    Resolution::from_nodes(nodes)
}

/// Nearest type alias starting at or before `position`
fn preceding_type_alias(annotations: &[Annotation], position: (u32, u32)) -> Option<&Signature> {
    let mut best: Option<(&Annotation, &Signature)> = None;

    for annotation in annotations {
        if annotation.kind != AnnotationKind::TypeAlias || annotation.range.start() > position {
            continue;
        }
        let Some(signature) = &annotation.signature else {
            continue;
        };
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
    use crate::index::{LineRange, MemoryIndex};

    const MESSAGE: &str = "cpp:FrameMsg_Stop@frame_messages.h";

    fn alias(line: u32, signature: &str) -> Annotation {
        Annotation::new(
            AnnotationKind::TypeAlias,
            Some(Signature::from(signature)),
            LineRange::on_line(line, 20, 34),
        )
    }

    fn method(file: &str, line: u32, signature: &str) -> (String, Annotation) {
        (
            file.to_string(),
            Annotation::new(
                AnnotationKind::Method,
                Some(Signature::from(signature)),
                LineRange::on_line(line, 0, 10),
            ),
        )
    }

    #[test]
    fn test_type_alias_on_dispatch_line_counts() {
        let annotations = vec![alias(10, "cpp:FrameMsg_Other"), alias(21, MESSAGE)];
        let reference = Edge::new("cpp:Stop", EdgeKind::Reference, "frame.cc", 21, "IPC_MESSAGE_HANDLER(FrameMsg_Stop, OnStop)");
        let found = preceding_type_alias(&annotations, reference.position()).unwrap();
        assert_eq!(found.as_str(), MESSAGE);
    }

    #[test]
    fn test_resolves_to_message_constructors() {
        let (handler_file, handler) = method("frame.cc", 15, "cpp:RenderFrameImpl::OnMessageReceived()");
        let (sender_file, sender) = method("host.cc", 30, "cpp:content::FrameHost::Stop()@host.cc");
        let mut index = MemoryIndex::new();
        index
            .add_annotation(&handler_file, handler)
            .add_annotation("frame.cc", alias(21, MESSAGE))
            .add_annotation(&sender_file, sender)
            .add_edge(Edge::new(MESSAGE, EdgeKind::Reference, "host.cc", 33, "Send(new FrameMsg_Stop(id));"))
            .add_edge(Edge::new(MESSAGE, EdgeKind::Reference, "frame.cc", 21, "IPC_MESSAGE_HANDLER(FrameMsg_Stop, OnStop)"));
        let ctx = SessionContext::new(&index, &GraphConfig::default());

        let reference = Edge::new("cpp:RenderFrameImpl::OnStop", EdgeKind::Reference, "frame.cc", 21, "IPC_MESSAGE_HANDLER(FrameMsg_Stop, OnStop)");
        let Resolution::Replaced(nodes) = resolve(&ctx, &reference) else {
            panic!("expected message senders");
        };
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].display_name, "ipc: content::FrameHost::Stop");
        assert_eq!(nodes[0].filename, "host.cc");
    }

    #[test]
    fn test_no_type_alias_is_unresolved() {
        let index = MemoryIndex::new();
        let ctx = SessionContext::new(&index, &GraphConfig::default());
        let reference = Edge::new("cpp:X", EdgeKind::Reference, "frame.cc", 21, "");
        assert!(!resolve(&ctx, &reference).is_resolved());
    }
}
