//! Auth-failure breaker for the proposal existence check.

use matchflow_core::config::{DEFAULT_AUTH_FAILURE_THRESHOLD, ResilienceSettings};
use std::sync::atomic::{AtomicU32, Ordering};

/// Counts transient auth failures on the existence check.
///
/// Once the count reaches the threshold the breaker stays tripped for the
/// rest of the process. Only [`reset`](Self::reset) closes it again; there is
/// no timed half-open state.
pub struct AuthFailureBreaker {
    failure_count: AtomicU32,
    threshold: u32,
}

impl AuthFailureBreaker {
    /// A threshold of 0 is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            failure_count: AtomicU32::new(0),
            threshold: threshold.max(1),
        }
    }

    pub fn from_settings(settings: &ResilienceSettings) -> Self {
        Self::new(settings.auth_failure_threshold)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    pub fn is_tripped(&self) -> bool {
        self.failure_count() >= self.threshold
    }

    /// Records one failure and returns the new count.
    pub fn record_failure(&self) -> u32 {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.threshold {
            tracing::warn!(
                "[AuthFailureBreaker] Tripped after {} auth failures; existence checks are skipped until reset",
                count
            );
        }
        count
    }

    pub fn reset(&self) {
        let previous = self.failure_count.swap(0, Ordering::SeqCst);
        tracing::info!("[AuthFailureBreaker] Reset (was {} failures)", previous);
    }
}

impl Default for AuthFailureBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_FAILURE_THRESHOLD)
    }
}

impl std::fmt::Debug for AuthFailureBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFailureBreaker")
            .field("failure_count", &self.failure_count())
            .field("threshold", &self.threshold)
            .finish()
    }
}
