//! Plain text output
//!
//! Callers are drawn as an indented tree. `+` marks a collapsed node and `-`
//! an expanded one; the bracketed path is what `--expand` takes.
//!
//! @module output/plain

use std::fmt::Write;

use super::{caller_views, group_by_file, CallerView, FileGroup, SessionFormatter};
use crate::index::SourceLocation;
use crate::xrefs::XrefSession;

/// Plain text formatter (no ANSI codes)
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFormatter for PlainFormatter {
    fn format_callers(&self, session: &XrefSession<'_>) -> String {
        let mut output = header(session);
        let xrefs = session.xrefs();

        let callers = caller_views(session.tree());
        output.push_str("\nCallers:\n");
        if callers.is_empty() {
            output.push_str("  (none)\n");
        }
        write_callers(&mut output, &callers, 1);

        write_edges(
            &mut output,
            "References",
            group_by_file(&xrefs.references, session.reference_filter()),
        );
        write_edges(&mut output, "Overrides", group_by_file(&xrefs.overrides, None));
        write_edges(&mut output, "Overridden by", group_by_file(&xrefs.overridden_by, None));

        output
    }

    fn format_xrefs(&self, session: &XrefSession<'_>) -> String {
        let mut output = header(session);
        let xrefs = session.xrefs();

        if xrefs.is_empty() {
            output.push_str("\nNo cross references\n");
            return output;
        }

        write_edges(&mut output, "Overrides", group_by_file(&xrefs.overrides, None));
        write_edges(&mut output, "Overridden by", group_by_file(&xrefs.overridden_by, None));
        write_edges(
            &mut output,
            "References",
            group_by_file(&xrefs.references, session.reference_filter()),
        );

        output
    }

    fn format_jump(&self, session: &XrefSession<'_>, target: Option<&SourceLocation>) -> String {
        match target {
            Some(location) => format!("{}:{}\n", location.file, location.line),
            None => format!("No definition or declaration for {}\n", session.selection().text),
        }
    }
}

fn header(session: &XrefSession<'_>) -> String {
    let mut output = String::new();
    let xrefs = session.xrefs();

    let _ = writeln!(output, "{}  ({})", session.selection().text, session.signature());
    if let Some(definition) = &xrefs.definition {
        let _ = writeln!(output, "Definition:  {}:{}", definition.file, definition.line);
    }
    if let Some(declaration) = &xrefs.declaration {
        let _ = writeln!(output, "Declaration: {}:{}", declaration.file, declaration.line);
    }
    if !session.show_tests() {
        output.push_str("Tests hidden\n");
    }

    output
}

fn write_callers(output: &mut String, callers: &[CallerView<'_>], depth: usize) {
    for caller in callers {
        let marker = if caller.children.is_some() { '-' } else { '+' };
        let _ = writeln!(
            output,
            "{}{} [{}] {}  {}:{}",
            "  ".repeat(depth),
            marker,
            caller.path,
            caller.display_name,
            caller.file,
            caller.line
        );
        if let Some(children) = &caller.children {
            write_callers(output, children, depth + 1);
        }
    }
}

fn write_edges(output: &mut String, title: &str, groups: Vec<FileGroup<'_>>) {
    if groups.is_empty() {
        return;
    }

    let _ = writeln!(output, "\n{}:", title);
    for group in groups {
        let _ = writeln!(output, "  {}", group.file);
        for edge in group.edges {
            let _ = writeln!(output, "    {:>5}: {}", edge.line, edge.snippet.trim());
        }
    }
}
