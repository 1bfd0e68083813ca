//! Tracing subscriber setup for the command-line front-end

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive (e.g. `usuppli=debug`)
pub const LOG_ENV: &str = "USUPPLI_LOG";

/// Install the global subscriber, writing to stderr.
///
/// `verbose` raises the default level from warn to debug; `quiet` lowers it to
/// error. A directive in `USUPPLI_LOG` takes precedence over both.
pub fn init(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    // A second init (e.g. from an embedding host) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
