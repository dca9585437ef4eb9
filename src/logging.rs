//! Logging setup.
//!
//! Diagnostics go through `tracing` to stderr so that stdout carries only the
//! status lines and the result table. The filter defaults to `warn` and can be
//! overridden with `MINIQUERY_LOG` or `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Default filter when no environment override is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the env filter from MINIQUERY_LOG, RUST_LOG, or the default.
fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env("MINIQUERY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}
