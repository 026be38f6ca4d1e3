//! Tracing subscriber setup.

use matchflow_core::error::{MatchflowError, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,matchflow=debug";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| MatchflowError::internal(format!("Failed to init subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The first call may race with other tests; only the repeat must fail
        let _ = init_tracing(DEFAULT_FILTER);
        assert!(init_tracing(DEFAULT_FILTER).is_err());
    }
}
