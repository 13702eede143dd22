// Logging setup for the `generate` binary.
//
// Library crates only emit `tracing` events; this module installs the
// subscriber. The `-v` count picks a level for the workspace crates and
// `RUST_LOG`, when set, replaces the whole filter.

use tracing_subscriber::EnvFilter;

/// Workspace crates whose events are shown.
const CRATE_TARGETS: &[&str] = &["tunegen_prng", "tunegen_chain", "tunegen_music", "generate"];

/// Filter directive for a `-v` count: 0 warn, 1 info, 2 debug, 3+ trace.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flag.
/// Logs go to stderr so the summary on stdout stays clean.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
