//! Tracing setup for the `dreg` binary.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Directives used for `-v`. Dependencies such as hyper stay at the default level.
pub const VERBOSE_DIRECTIVES: &str = "dreg=debug,ociclient=debug";

const DEFAULT_DIRECTIVES: &str = "warn";

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_DIRECTIVES)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    }
}

/// Install the global subscriber. Logs share stderr with warnings; stdout
/// carries results only.
pub fn init(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}
