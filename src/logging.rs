//! Structured logging initialization for the lighting CLI.
//!
//! Supports human-friendly and machine-readable (JSON) output with TTY
//! detection and verbosity control.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the tracing subscriber based on CLI flags and environment.
///
/// # Arguments
///
/// * `json_mode` - If true, output structured JSON logs for machine consumption
/// * `verbose` - Verbosity level: 0 = info, 1 = debug, 2+ = trace
/// * `quiet` - If true, suppress non-essential output (only errors)
///
/// # Environment Variables
///
/// * `RUST_LOG` - Override default filter (e.g., "zrgb=debug")
pub fn init_logging(json_mode: bool, verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "zrgb=error"
    } else {
        match verbose {
            0 => "zrgb=info",
            1 => "zrgb=debug",
            _ => "zrgb=trace",
        }
    };

    // Allow RUST_LOG to override, but use our default otherwise
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    if json_mode {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_ansi(io::stderr().is_terminal())
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so the
    // init path itself is covered by the CLI end-to-end tests.

    #[test]
    fn test_filter_directives() {
        assert!(EnvFilter::try_new("zrgb=info").is_ok());
        assert!(EnvFilter::try_new("zrgb=debug").is_ok());
        assert!(EnvFilter::try_new("zrgb=trace").is_ok());
        assert!(EnvFilter::try_new("zrgb=error").is_ok());
    }
}
