//! Logging setup for the CLI.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber once at startup.
///
/// `--verbose` selects debug level for the bask crates and wins over
/// `--quiet`; otherwise `RUST_LOG` is honored, falling back to info.
pub fn init(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("bask=debug,bask_cli=debug")
    } else if quiet {
        EnvFilter::new("bask=error,bask_cli=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bask=info,bask_cli=info"))
    };

    let fmt_layer = fmt::layer().with_target(false).with_ansi(!no_color).compact();

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
