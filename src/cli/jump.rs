//! Jump command implementation
//!
//! Prints the definition (default) or declaration of the selected symbol,
//! falling back to the other when only one is known. When the selection was
//! given as a path inside a local checkout, the target is printed as a path
//! in that checkout.
//!
//! @module cli/jump

use clap::Args;

use super::{local_display, output_format, SelectionArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::create_formatter;
use crate::xrefs::XrefSession;

/// Arguments for the jump command
#[derive(Args, Debug)]
pub struct JumpArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Prefer the declaration over the definition
    #[arg(short, long)]
    pub declaration: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Run the jump command
pub fn run(args: JumpArgs, config: &Config) -> Result<()> {
    let index = args.selection.open_index(config)?;
    let (selection, checkout) = args.selection.selection();
    let session = XrefSession::open(index.as_ref(), &config.graph, selection)?;

    let target = if args.declaration {
        session.jump_to_declaration()
    } else {
        session.jump_to_definition()
    };

    if let (Some(location), Some(_), false) = (&target, &checkout, args.json) {
        println!("{}:{}", local_display(checkout.as_ref(), &location.file), location.line);
        return Ok(());
    }

    let formatter = create_formatter(output_format(args.json));
    print!("{}", formatter.format_jump(&session, target.as_ref()));
    Ok(())
}
