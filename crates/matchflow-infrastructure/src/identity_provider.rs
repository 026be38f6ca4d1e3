//! In-memory identity provider.

use async_trait::async_trait;
use matchflow_core::identity::{Identity, IdentityProvider};
use matchflow_core::store::{StoreError, StoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Holds one signed-in operator and rotates their token on refresh.
///
/// Cloning shares the credential state.
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    owner_id: String,
    token: Arc<RwLock<String>>,
    refreshes: Arc<AtomicU64>,
    refresh_fails: Arc<AtomicBool>,
}

impl InMemoryIdentityProvider {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            token: Arc::new(RwLock::new(Uuid::new_v4().to_string())),
            refreshes: Arc::new(AtomicU64::new(0)),
            refresh_fails: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Makes subsequent refreshes fail, as when the refresh credential
    /// itself has been revoked.
    pub fn set_refresh_fails(&self, fails: bool) {
        self.refresh_fails.store(fails, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn current_identity(&self) -> StoreResult<Identity> {
        let token = self.token.read().await.clone();
        Ok(Identity {
            owner_id: self.owner_id.clone(),
            token,
        })
    }

    async fn refresh_credential(&self) -> StoreResult<()> {
        if self.refresh_fails.load(Ordering::SeqCst) {
            return Err(StoreError::expired_credential("Refresh credential revoked"));
        }
        let mut token = self.token.write().await;
        *token = Uuid::new_v4().to_string();
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("[Identity] Rotated credential for {}", self.owner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let provider = InMemoryIdentityProvider::new("op-1");
        let before = provider.current_identity().await.unwrap();

        provider.refresh_credential().await.unwrap();
        let after = provider.current_identity().await.unwrap();

        assert_eq!(after.owner_id, "op-1");
        assert_ne!(before.token, after.token);
        assert_eq!(provider.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_revoked_refresh() {
        let provider = InMemoryIdentityProvider::new("op-1");
        provider.set_refresh_fails(true);

        let err = provider.refresh_credential().await.unwrap_err();
        assert!(err.is_transient_auth());
        assert_eq!(provider.refresh_count(), 0);
    }
}
