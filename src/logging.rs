//! Logging and tracing utilities.
//!
//! Schema resolution emits `tracing` events: `debug` for every resolved
//! schema, `trace` for attributes skipped in a context and `warn` for
//! overwritten or rejected declarations. This module sets up a subscriber
//! for them. All logs are written to **stderr** so they never mix with
//! anything the host writes to stdout.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `provider_superschema=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show info logs (default)
//! RUST_LOG=info ./my-provider
//!
//! # Show every resolved schema
//! RUST_LOG=provider_superschema=debug ./my-provider
//!
//! # Also show which attributes each context skipped
//! RUST_LOG=provider_superschema=trace ./my-provider
//! ```

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// This sets up a `tracing` subscriber that:
/// - Writes to **stderr**
/// - Respects the `RUST_LOG` environment variable for filtering
/// - Defaults to `info` level if `RUST_LOG` is not set
/// - Uses a compact, human-readable format
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
///
/// # Example
///
/// ```ignore
/// use provider_superschema::init_logging;
///
/// fn main() {
///     init_logging();
///     tracing::info!("Provider starting");
/// }
/// ```
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level.
///
/// Like [`init_logging`], but allows specifying a default log level
/// that will be used if `RUST_LOG` is not set.
///
/// # Arguments
///
/// * `default_level` - The default log level (e.g., "debug", "info", "warn")
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this function does not panic if a subscriber
/// has already been set. This is useful in test scenarios.
///
/// # Example
///
/// ```
/// use provider_superschema::try_init_logging;
///
/// try_init_logging();
/// // A second subscriber is refused.
/// assert!(!try_init_logging());
/// ```
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}

fn subscriber(default_level: &str) -> impl SubscriberInitExt {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}
