//! Diagnostic logging for the CLI.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! picks those records up and writes them to stderr so stdout stays JSON.

use log::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber, honouring `RUST_LOG` when it parses.
///
/// Installing twice is harmless; the second attempt is ignored.
pub(crate) fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        debug!("logging subscriber already installed: {error}");
    }
}
