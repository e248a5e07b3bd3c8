//! Callers command implementation
//!
//! @module cli/callers

use clap::Args;
use tracing::warn;

use super::{output_format, SelectionArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::create_formatter;
use crate::xrefs::{TreePath, XrefSession};

/// Arguments for the callers command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    cxrefs callers src/net/foo.cc 120 8 DoConnect
    cxrefs callers src/net/foo.cc 120 8 DoConnect --expand 0 --expand 0,2
    cxrefs callers src/net/foo.cc 120 8 DoConnect --hide-tests --json

Paths are the bracketed indices printed next to each caller.")]
pub struct CallersArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Expand the caller at PATH (e.g. 0,2); repeat to go deeper
    #[arg(short, long, value_name = "PATH")]
    pub expand: Vec<TreePath>,

    /// Hide callers that look like tests
    #[arg(long)]
    pub hide_tests: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Run the callers command
pub fn run(args: CallersArgs, config: &Config) -> Result<()> {
    let index = args.selection.open_index(config)?;
    let (selection, _) = args.selection.selection();
    let mut session = XrefSession::open(index.as_ref(), &config.graph, selection)?;

    for path in &args.expand {
        // Expansions are applied in order; a bad path does not stop the rest
        if let Err(e) = session.expand(path) {
            warn!("Cannot expand {}: {}", path, e);
        }
    }
    session.set_test_filter(!args.hide_tests);

    let formatter = create_formatter(output_format(args.json));
    print!("{}", formatter.format_callers(&session));
    Ok(())
}
