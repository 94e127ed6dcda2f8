#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! The scribble crates log through `tracing`. This module re-exports the
//! macros so downstream code can use a single path, and with the
//! `subscriber` feature provides [`init`] for binaries that want a ready
//! made `fmt` subscriber.
//!
//! ## Environment Variables
//!
//! 1. **`SCRIBBLE_LOG`** (highest priority) - scribble-specific filter
//! 2. **`RUST_LOG`** - standard tracing filter
//! 3. **Default** - `warn`

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable consulted first by [`init`].
pub const LOG_ENV: &str = "SCRIBBLE_LOG";

/// Filter directive used when neither environment variable is set.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive from the two environment values.
///
/// Empty values are treated as unset.
#[must_use]
pub fn resolve_directive(scribble_log: Option<&str>, rust_log: Option<&str>) -> String {
    scribble_log
        .filter(|v| !v.trim().is_empty())
        .or(rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or(DEFAULT_DIRECTIVE)
        .to_string()
}

/// Install a global `fmt` subscriber writing to stderr.
///
/// Returns `Ok(false)` when a global subscriber was already installed, so
/// calling this twice is harmless.
#[cfg(feature = "subscriber")]
pub fn init() -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let directive = resolve_directive(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
    );
    let filter = EnvFilter::try_new(&directive)?;

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .try_init()
        .is_ok();
    Ok(installed)
}
