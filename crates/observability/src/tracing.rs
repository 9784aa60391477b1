//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize JSON logs for the process.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` is used (falling
/// back to `info` if it does not parse). Safe to call multiple times.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
