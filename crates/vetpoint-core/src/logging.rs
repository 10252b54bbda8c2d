//! Tracing setup for host apps.

use tracing_subscriber::EnvFilter;

/// Filter used when neither the caller nor `RUST_LOG` supplies one.
pub const DEFAULT_LOG_FILTER: &str = "vetpoint_core=info";

/// Install a fmt subscriber.
///
/// `filter` takes precedence, then `RUST_LOG`, then [`DEFAULT_LOG_FILTER`].
/// Returns `false` if a global subscriber was already installed, which makes
/// repeated calls from the host harmless.
pub fn init_logging(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
}
