//! CLI command definitions and handlers

pub mod callers;
pub mod jump;
pub mod xrefs;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::project::IndexPath;
use crate::index::{CodeSearchClient, IndexClient, MemoryIndex};
use crate::output::OutputFormat;
use crate::xrefs::Selection;

const LONG_ABOUT: &str = r#"
Cross references and expandable caller graphs backed by a code-search index.

Point cxrefs at an identifier (file, line, column, word) and it resolves the
symbol, lists its definition, declaration, overrides and references, and
builds the tree of its callers. Callers hidden behind state-machine loops,
generated interface stubs and message handlers are traced through to the
code that really triggers the call.

EXAMPLES:
    cxrefs callers src/net/http/http_stream_parser.cc 412 9 DoSendBody
    cxrefs callers src/net/http/http_stream_parser.cc 412 9 DoSendBody --expand 0 --expand 0,1
    cxrefs callers ~/chromium/src/content/browser/foo.cc 88 4 Stop --hide-tests --json
    cxrefs xrefs src/base/logging.cc 120 6 LogMessage
    cxrefs jump src/base/logging.cc 120 6 LogMessage --declaration

LOGGING:
    CXREFS_LOG=debug cxrefs callers ...
"#;

/// Cross references and caller graphs
#[derive(Parser, Debug)]
#[command(name = "cxrefs")]
#[command(author, version)]
#[command(about = "Cross references and caller graphs from a code-search index")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: $CXREFS_HOME/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the caller tree of a symbol
    #[command(visible_alias = "c")]
    Callers(callers::CallersArgs),

    /// Show definition, declaration, overrides and references
    #[command(visible_alias = "x")]
    Xrefs(xrefs::XrefsArgs),

    /// Print where the definition (or declaration) lives
    #[command(visible_alias = "j")]
    Jump(jump::JumpArgs),
}

/// Identifier to resolve, shared by every command
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// File holding the identifier (local checkout path or index path)
    pub file: PathBuf,

    /// Line of the identifier (1-based)
    pub line: u32,

    /// Column of the identifier (0-based)
    pub column: u32,

    /// The identifier
    pub word: String,

    /// Character just before the word; `:` and `~` are pulled into it
    #[arg(long, value_name = "CHAR")]
    pub preceding: Option<char>,

    /// Serve queries from a JSON fixture instead of the remote index
    #[arg(long, value_name = "PATH")]
    pub fixture: Option<PathBuf>,
}

impl SelectionArgs {
    /// Selection in index terms, and the local checkout it came from
    pub fn selection(&self) -> (Selection, Option<IndexPath>) {
        let mapped = IndexPath::from_local(&self.file);
        let file = match &mapped {
            Some(path) => path.file.clone(),
            None => self.file.to_string_lossy().replace('\\', "/"),
        };
        debug!("Selection file {} maps to {}", self.file.display(), file);

        let selection =
            Selection::new(file, self.line, self.column, self.word.clone()).widen(self.preceding);
        (selection, mapped)
    }

    /// Index the session queries
    pub fn open_index(&self, config: &Config) -> Result<Box<dyn IndexClient>> {
        match &self.fixture {
            Some(path) => {
                info!("Using fixture index {}", path.display());
                Ok(Box::new(MemoryIndex::load(path)?))
            }
            None => Ok(Box::new(CodeSearchClient::new(config)?)),
        }
    }
}

/// Output format from a `--json` flag
pub fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Plain
    }
}

/// Local path for an index file when the selection came from a checkout
pub fn local_display(checkout: Option<&IndexPath>, index_file: &str) -> String {
    match checkout {
        Some(path) => path.to_local(index_file).display().to_string(),
        None => Path::new(index_file).display().to_string(),
    }
}
