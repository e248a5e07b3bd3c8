//! Logging setup
//!
//! `CXREFS_LOG` takes precedence over the configured default level:
//! ```bash
//! CXREFS_LOG=debug cxrefs callers src/net/foo.cc 120 8 DoConnect
//! CXREFS_LOG=cxrefs::xrefs=trace cxrefs xrefs ...
//! ```

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CXREFS_LOG";

/// Initialize logging. Only the first call takes effect.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
