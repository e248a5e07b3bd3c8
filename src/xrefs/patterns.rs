//! Naming-convention matchers
//!
//! All string heuristics live here so their assumptions about signature and
//! identifier shapes can be tested without an index. Signatures look like
//! `cpp:net::class-HttpStreamParser::DoLoop(int)@chromium/../../net/x.cc|def`.
//!
//! @module xrefs/patterns

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

// =============================================================================
// SIGNATURE NAMES
// =============================================================================

static KIND_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:class|struct|union|enum|namespace)-").expect("valid regex"));

static DECL_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|decl(?:\||$)").expect("valid regex"));

/// Qualified, parameter-free name encoded in a signature.
///
/// Falls back to the raw signature when nothing recognisable is left.
pub fn symbol_name(signature: &str) -> String {
    let mut rest = signature;

    if let Some((lang, tail)) = rest.split_once(':') {
        let is_lang = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if is_lang && !tail.starts_with(':') {
            rest = tail;
        }
    }

    for stop in ['@', '|'] {
        if let Some((head, _)) = rest.split_once(stop) {
            rest = head;
        }
    }
    let name = KIND_MARKER.replace_all(trim_parameters(rest), "");
    let name = name.trim();

    if name.is_empty() {
        signature.to_string()
    } else {
        name.to_string()
    }
}

/// Last `::` segment of a qualified name
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// Display text up to the parameter list
pub fn trim_parameters(display: &str) -> &str {
    display.split('(').next().unwrap_or(display).trim()
}

/// Signature of a declaration seen only in a header
pub fn is_declaration_only(signature: &str) -> bool {
    DECL_ONLY.is_match(signature)
}

// =============================================================================
// INDIRECTION FAMILIES
// =============================================================================

/// Indirection idioms that hide the real caller of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndirectionFamily {
    /// State-machine loop branching on a state enumerator
    StateLoop,
    /// Generated interface stub forwarding to an implementation
    DispatchStub,
    /// Message handler dispatching on a message type
    MessageDispatch,
}

impl IndirectionFamily {
    /// Provenance prefix applied to display names produced by the family
    pub fn label_prefix(&self) -> &'static str {
        match self {
            IndirectionFamily::StateLoop => "doloop: ",
            IndirectionFamily::DispatchStub => "mojo: ",
            IndirectionFamily::MessageDispatch => "ipc: ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            IndirectionFamily::StateLoop => 0,
            IndirectionFamily::DispatchStub => 1,
            IndirectionFamily::MessageDispatch => 2,
        }
    }

    pub fn label(&self, name: &str) -> String {
        format!("{}{}", self.label_prefix(), name)
    }
}

impl fmt::Display for IndirectionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndirectionFamily::StateLoop => write!(f, "state-loop"),
            IndirectionFamily::DispatchStub => write!(f, "dispatch-stub"),
            IndirectionFamily::MessageDispatch => write!(f, "message-dispatch"),
        }
    }
}

// =============================================================================
// STATE LOOP
// =============================================================================

static DO_LOOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|::)DoLoop$").expect("valid regex"));

static STATE_CONSTANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:STATE_[A-Z0-9_]+|kState[A-Z]\w*)$").expect("valid regex"));

static STATE_READ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bcase\b|==|!=").expect("valid regex"));

/// `DoLoop` dispatchers that `switch` on a `next_state_` enumerator
pub struct StateLoopPattern;

impl StateLoopPattern {
    /// Call-site identifier names the loop itself
    pub fn is_dispatcher(identifier: &str) -> bool {
        DO_LOOP.is_match(trim_parameters(identifier))
    }

    /// Signature names a state enumerator (`STATE_READ_HEADERS`, `kStateIdle`)
    pub fn is_state_constant(signature: &str) -> bool {
        STATE_CONSTANT.is_match(short_name(&symbol_name(signature)))
    }

    /// Line compares or branches on the state rather than assigning it
    pub fn is_state_read(line_text: &str) -> bool {
        STATE_READ.is_match(line_text)
    }
}

// =============================================================================
// DISPATCH STUB
// =============================================================================

static STUB_ACCEPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[\w:]*::)?(?P<interface>\w+?)(?:StubDispatch|Stub)(?:<[^>]*>)?::Accept(?:WithResponder)?$",
    )
    .expect("valid regex")
});

/// Generated interface stubs (`FooStubDispatch::Accept`) forwarding to `FooImpl`
pub struct DispatchStubPattern;

impl DispatchStubPattern {
    /// Display name is a generated stub's dispatch entry point
    pub fn is_stub(display_name: &str) -> bool {
        STUB_ACCEPT.is_match(trim_parameters(display_name))
    }

    /// Interface name with the generated-class suffix stripped
    pub fn interface_name(display_name: &str) -> Option<&str> {
        STUB_ACCEPT
            .captures(trim_parameters(display_name))
            .and_then(|caps| caps.name("interface"))
            .map(|m| m.as_str())
    }

    /// `Interface::Method` search term for the interface declaration
    pub fn search_term(display_name: &str, original: &str) -> Option<String> {
        let interface = Self::interface_name(display_name)?;
        let qualified = symbol_name(original);
        let method = short_name(&qualified);
        if method.is_empty() {
            return None;
        }
        Some(format!("{}::{}", interface, method))
    }

    /// Signature looks like a declaration in a generated interface header
    pub fn is_interface_declaration(signature: &str) -> bool {
        signature.contains(".mojom") && is_declaration_only(signature)
    }

    /// Candidate matches the search term once kind markers are removed
    pub fn matches_term(signature: &str, term: &str) -> bool {
        let name = symbol_name(signature);
        name == term || name.ends_with(&format!("::{}", term))
    }
}

// =============================================================================
// MESSAGE DISPATCH
// =============================================================================

static MESSAGE_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|::)OnMessageReceived$").expect("valid regex"));

static CONSTRUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnew\s+[\w:]|\bmake_unique<").expect("valid regex"));

/// `OnMessageReceived` handlers keyed by a message type
pub struct MessageDispatchPattern;

impl MessageDispatchPattern {
    /// Enclosing method is a generic message entry point
    pub fn is_handler(name: &str) -> bool {
        MESSAGE_HANDLER.is_match(trim_parameters(name))
    }

    /// Line constructs a message object
    pub fn is_construction(line_text: &str) -> bool {
        CONSTRUCTION.is_match(line_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARSER_LOOP: &str =
        "cpp:net::class-HttpStreamParser::DoLoop(int)@chromium/../../net/http/http_stream_parser.cc|def";

    #[test]
    fn test_symbol_name_strips_decorations() {
        assert_eq!(symbol_name(PARSER_LOOP), "net::HttpStreamParser::DoLoop");
        assert_eq!(symbol_name("net::Foo::Bar"), "net::Foo::Bar");
        assert_eq!(symbol_name("sig1"), "sig1");
        assert_eq!(short_name("net::Foo::Bar"), "Bar");
    }

    #[test]
    fn test_declaration_only_marker() {
        assert!(is_declaration_only("cpp:a::B()@x.h|decl"));
        assert!(!is_declaration_only(PARSER_LOOP));
        assert!(!is_declaration_only("cpp:a::declare()"));
    }

    #[test]
    fn test_state_loop_pattern() {
        assert!(StateLoopPattern::is_dispatcher("DoLoop"));
        assert!(StateLoopPattern::is_dispatcher("net::HttpStreamParser::DoLoop(int)"));
        assert!(!StateLoopPattern::is_dispatcher("DoLoopback"));

        assert!(StateLoopPattern::is_state_constant(
            "cpp:net::HttpStreamParser::STATE_SEND_HEADERS@x.h"
        ));
        assert!(StateLoopPattern::is_state_constant("kStateIdle"));
        assert!(!StateLoopPattern::is_state_constant("cpp:net::kMaxRetries"));

        assert!(StateLoopPattern::is_state_read("case STATE_SEND_HEADERS:"));
        assert!(StateLoopPattern::is_state_read("if (next_state_ == STATE_DONE)"));
        assert!(!StateLoopPattern::is_state_read("next_state_ = STATE_SEND_HEADERS;"));
        assert!(!StateLoopPattern::is_state_read("// showcase STATE_X"));
    }

    #[test]
    fn test_dispatch_stub_pattern() {
        let display = "content::mojom::FrameHostStubDispatch::AcceptWithResponder";
        assert!(DispatchStubPattern::is_stub(display));
        assert_eq!(DispatchStubPattern::interface_name(display), Some("FrameHost"));
        assert!(!DispatchStubPattern::is_stub("content::FrameHostImpl::Accept"));

        let term = DispatchStubPattern::search_term(
            display,
            "cpp:content::class-RenderFrameHostImpl::DidStopLoading()@x.cc",
        );
        assert_eq!(term.as_deref(), Some("FrameHost::DidStopLoading"));
    }

    #[test]
    fn test_dispatch_candidate_ranking_inputs() {
        let decl = "cpp:content::mojom::class-FrameHost::DidStopLoading()@gen/frame.mojom.h|decl";
        assert!(DispatchStubPattern::is_interface_declaration(decl));
        assert!(DispatchStubPattern::matches_term(decl, "FrameHost::DidStopLoading"));
        assert!(!DispatchStubPattern::matches_term(
            "cpp:content::OtherFrameHost::DidStopLoading",
            "FrameHost::DidStopLoading"
        ));
    }

    #[test]
    fn test_message_dispatch_pattern() {
        assert!(MessageDispatchPattern::is_handler("content::RenderFrameImpl::OnMessageReceived"));
        assert!(!MessageDispatchPattern::is_handler("OnMessageReceivedForTesting"));
        assert!(MessageDispatchPattern::is_construction("Send(new FrameMsg_Stop(routing_id_));"));
        assert!(MessageDispatchPattern::is_construction("auto m = std::make_unique<FrameMsg_Stop>(id);"));
        assert!(!MessageDispatchPattern::is_construction("IPC_MESSAGE_HANDLER(FrameMsg_Stop, OnStop)"));
    }

    #[test]
    fn test_family_labels() {
        assert_eq!(IndirectionFamily::StateLoop.label("Foo::Bar"), "doloop: Foo::Bar");
        assert_eq!(IndirectionFamily::DispatchStub.label_prefix(), "mojo: ");
        assert_eq!(IndirectionFamily::MessageDispatch.label_prefix(), "ipc: ");
    }
}
