//! Resilient wrapper around record store calls.

use super::breaker::AuthFailureBreaker;
use matchflow_core::identity::IdentityProvider;
use matchflow_core::store::StoreResult;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a guarded existence check.
#[derive(Debug, Clone, PartialEq)]
pub enum ExistenceCheck<T> {
    Found(T),
    Absent,
    /// The check was not answered; callers proceed as if absent.
    Skipped,
}

/// Issues store operations with one credential refresh and one retry on a
/// transient auth failure.
///
/// Every other error class is returned unchanged on the first attempt. The
/// refresh completes before the retry is issued.
#[derive(Clone)]
pub struct ResilientCaller {
    identity: Arc<dyn IdentityProvider>,
    breaker: Arc<AuthFailureBreaker>,
}

impl ResilientCaller {
    pub fn new(identity: Arc<dyn IdentityProvider>, breaker: Arc<AuthFailureBreaker>) -> Self {
        Self { identity, breaker }
    }

    pub fn breaker(&self) -> &AuthFailureBreaker {
        &self.breaker
    }

    /// Runs `op`, refreshing the credential and retrying once on TransientAuth.
    ///
    /// Whatever the retry returns is surfaced as-is. If the refresh itself
    /// fails, the original error is returned without retrying.
    pub async fn call<T, F, Fut>(&self, label: &str, op: F) -> StoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let err = match op().await {
            Err(err) if err.is_transient_auth() => err,
            other => return other,
        };

        tracing::warn!(
            "[ResilientCaller] {} hit transient auth failure ({}), refreshing credential",
            label,
            err
        );

        if let Err(refresh_err) = self.identity.refresh_credential().await {
            tracing::warn!(
                "[ResilientCaller] Credential refresh failed during {}: {}",
                label,
                refresh_err
            );
            return Err(err);
        }

        let retried = op().await;
        match &retried {
            Ok(_) => tracing::debug!("[ResilientCaller] {} succeeded after refresh", label),
            Err(retry_err) => tracing::warn!(
                "[ResilientCaller] {} failed after refresh: {}",
                label,
                retry_err
            ),
        }
        retried
    }

    /// Guarded lookup used before creating a record.
    ///
    /// Transient auth failures that survive the retry count towards the
    /// breaker and yield [`ExistenceCheck::Skipped`]. Once the breaker is
    /// tripped the lookup is not issued at all.
    pub async fn check_existing<T, F, Fut>(
        &self,
        label: &str,
        op: F,
    ) -> StoreResult<ExistenceCheck<T>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<Option<T>>>,
    {
        if self.breaker.is_tripped() {
            tracing::debug!(
                "[ResilientCaller] Breaker tripped ({} failures), skipping {}",
                self.breaker.failure_count(),
                label
            );
            return Ok(ExistenceCheck::Skipped);
        }

        match self.call(label, op).await {
            Ok(Some(found)) => Ok(ExistenceCheck::Found(found)),
            Ok(None) => Ok(ExistenceCheck::Absent),
            Err(err) if err.is_not_found() => Ok(ExistenceCheck::Absent),
            Err(err) if err.is_transient_auth() => {
                let count = self.breaker.record_failure();
                tracing::warn!(
                    "[ResilientCaller] {} unanswered ({}/{} auth failures), assuming absent",
                    label,
                    count,
                    self.breaker.threshold()
                );
                Ok(ExistenceCheck::Skipped)
            }
            Err(err) => Err(err),
        }
    }
}
