//! Diagnostic logging
//!
//! `tracing` events go to stderr so they never mix with forwarded compiler
//! output on stdout. The subscriber is only installed when asked for, either
//! with `-v` flags or through `TSPW_LOG` / `RUST_LOG`:
//!
//! ```bash
//! tspw -vv --compile .
//! TSPW_LOG="tspw::supervisor=trace" tspw .
//! ```

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count, if any.
fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("tspw=info"),
        2 => Some("tspw=debug"),
        _ => Some("tspw=trace"),
    }
}

/// Build the filter from `TSPW_LOG`, then `RUST_LOG`, then `-v`.
fn build_filter(verbose: u8) -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("TSPW_LOG") {
        return Some(EnvFilter::builder().parse_lossy(val));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    verbosity_directive(verbose).map(EnvFilter::new)
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when no verbosity or log filter was requested.
pub fn init_tracing(verbose: u8) {
    let Some(filter) = build_filter(verbose) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}
