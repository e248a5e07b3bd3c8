//! Xrefs command implementation
//!
//! @module cli/xrefs

use clap::Args;

use super::{output_format, SelectionArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::create_formatter;
use crate::xrefs::XrefSession;

/// Arguments for the xrefs command
#[derive(Args, Debug)]
pub struct XrefsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Hide references from test files
    #[arg(long)]
    pub hide_tests: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Run the xrefs command
pub fn run(args: XrefsArgs, config: &Config) -> Result<()> {
    let index = args.selection.open_index(config)?;
    let (selection, _) = args.selection.selection();
    let mut session = XrefSession::open(index.as_ref(), &config.graph, selection)?;
    session.set_test_filter(!args.hide_tests);

    let formatter = create_formatter(output_format(args.json));
    print!("{}", formatter.format_xrefs(&session));
    Ok(())
}
