//! Session manager.
//!
//! Keeps at most one active review session per operator, archives the
//! previous one on creation, and maintains the batch progress counters.

use crate::resilience::ResilientCaller;
use matchflow_core::config::DEFAULT_HISTORY_LIMIT;
use matchflow_core::error::{MatchflowError, Result};
use matchflow_core::pair::SuggestedPair;
use matchflow_core::session::{MatchingSession, SessionBatch, SessionRepository, UnprocessedPairs};
use matchflow_core::store::StoreResult;
use std::sync::Arc;
use uuid::Uuid;

/// Manages the review sessions of operators.
///
/// Every store call goes through the [`ResilientCaller`].
pub struct SessionManager {
    sessions: Arc<dyn SessionRepository>,
    caller: ResilientCaller,
    history_limit: usize,
}

impl SessionManager {
    pub fn new(sessions: Arc<dyn SessionRepository>, caller: ResilientCaller) -> Self {
        Self {
            sessions,
            caller,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Sets the default number of sessions returned by [`list_history`](Self::list_history).
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit.max(1);
        self
    }

    /// Returns the operator's active session, or `None` if there is none.
    pub async fn get_active_session(&self, owner_id: &str) -> Result<Option<MatchingSession>> {
        let session = self
            .caller
            .call("find active session", || self.sessions.find_active(owner_id))
            .await;

        match session {
            Ok(session) => Ok(session),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Archives the current active session (if any) and starts a new one.
    ///
    /// A failed archival is logged and creation still goes ahead. If the
    /// insert then meets an active session (left by that failure or claimed
    /// by a concurrent creation), the active session is archived again and
    /// the insert retried once. When that second archival fails too, the
    /// archival cause is returned as [`MatchflowError::DataAccess`].
    pub async fn create_session(&self, owner_id: &str) -> Result<MatchingSession> {
        // Failure is logged; the insert decides whether it matters
        let _ = self.archive_active(owner_id).await;

        let session = MatchingSession::new(Uuid::new_v4().to_string(), owner_id);
        tracing::debug!("[SessionManager] Generated session ID: {}", session.id);

        let inserted = match self.insert_session(&session).await {
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(
                    "[SessionManager] Active slot for {} still taken ({}), archiving and retrying",
                    owner_id,
                    e
                );
                self.archive_active(owner_id).await.map_err(|cause| {
                    MatchflowError::data_access(format!(
                        "Could not archive the active session of {}: {}",
                        owner_id, cause
                    ))
                })?;
                self.insert_session(&session).await?
            }
            other => other?,
        };

        tracing::info!(
            "[SessionManager] Created session {} for {} (position {})",
            inserted.id,
            owner_id,
            inserted.position
        );
        Ok(inserted)
    }

    /// Overwrites the active session's batch and recomputes its counters.
    pub async fn update_active_session_batch(
        &self,
        owner_id: &str,
        pairs: Vec<SuggestedPair>,
    ) -> Result<MatchingSession> {
        let active = self
            .get_active_session(owner_id)
            .await?
            .ok_or_else(|| MatchflowError::not_found("MatchingSession", format!("active for {}", owner_id)))?;

        self.write_batch(&active.id, pairs).await
    }

    /// Overwrites the batch of a specific session, typically an archived one.
    pub async fn update_specific_session_batch(
        &self,
        owner_id: &str,
        session_id: &str,
        pairs: Vec<SuggestedPair>,
    ) -> Result<MatchingSession> {
        self.load_owned(owner_id, session_id).await?;
        self.write_batch(session_id, pairs).await
    }

    /// Lists archived sessions, newest first.
    ///
    /// `None` uses the configured history limit.
    pub async fn list_history(
        &self,
        owner_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MatchingSession>> {
        let limit = limit.unwrap_or(self.history_limit);
        let history = self
            .caller
            .call("list session history", || {
                self.sessions.list_archived(owner_id, limit)
            })
            .await?;

        tracing::debug!(
            "[SessionManager] {} archived sessions for {}",
            history.len(),
            owner_id
        );
        Ok(history)
    }

    /// Counts pairs of the active batch still waiting for review.
    pub async fn has_unprocessed_pairs(&self, owner_id: &str) -> Result<UnprocessedPairs> {
        let count = self
            .get_active_session(owner_id)
            .await?
            .map_or(0, |session| session.pending_count());
        Ok(UnprocessedPairs::from_count(count))
    }

    /// Deletes an archived session after checking ownership.
    ///
    /// The active session cannot be deleted; starting a new session archives it.
    pub async fn delete_session(&self, owner_id: &str, session_id: &str) -> Result<()> {
        let session = self.load_owned(owner_id, session_id).await?;
        if session.is_active {
            return Err(MatchflowError::validation(format!(
                "Session {} is active; only archived sessions can be deleted",
                session_id
            )));
        }

        let deleted = self
            .caller
            .call("delete session", || self.sessions.delete(owner_id, session_id))
            .await?;
        if deleted == 0 {
            return Err(MatchflowError::not_found("MatchingSession", session_id));
        }

        tracing::info!("[SessionManager] Deleted session {} of {}", session_id, owner_id);
        Ok(())
    }

    async fn archive_active(&self, owner_id: &str) -> StoreResult<u64> {
        let archived = self
            .caller
            .call("archive active session", || {
                self.sessions.deactivate_active(owner_id)
            })
            .await;

        match &archived {
            Ok(0) => tracing::debug!("[SessionManager] No active session to archive for {}", owner_id),
            Ok(n) => tracing::info!("[SessionManager] Archived {} session(s) for {}", n, owner_id),
            Err(e) => tracing::warn!(
                "[SessionManager] Failed to archive active session for {}: {}",
                owner_id,
                e
            ),
        }
        archived
    }

    async fn insert_session(&self, session: &MatchingSession) -> StoreResult<MatchingSession> {
        self.caller
            .call("insert session", || self.sessions.insert(session.clone()))
            .await
    }

    async fn load_owned(&self, owner_id: &str, session_id: &str) -> Result<MatchingSession> {
        let session = self
            .caller
            .call("find session", || self.sessions.find_by_id(session_id))
            .await?
            .ok_or_else(|| MatchflowError::not_found("MatchingSession", session_id))?;

        if !session.is_owned_by(owner_id) {
            tracing::warn!(
                "[SessionManager] {} attempted to access session {} owned by {}",
                owner_id,
                session_id,
                session.owner_id
            );
            return Err(MatchflowError::forbidden("MatchingSession", session_id));
        }
        Ok(session)
    }

    async fn write_batch(
        &self,
        session_id: &str,
        pairs: Vec<SuggestedPair>,
    ) -> Result<MatchingSession> {
        for pair in &pairs {
            pair.validate()?;
        }

        let batch = SessionBatch::from_pairs(pairs);
        tracing::debug!(
            "[SessionManager] Writing batch to {}: total={}, processed={}",
            session_id,
            batch.total_matches,
            batch.processed_matches
        );

        let updated = self
            .caller
            .call("update session batch", || {
                self.sessions.update_batch(session_id, batch.clone())
            })
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MatchflowError::not_found("MatchingSession", session_id)
                } else {
                    e.into()
                }
            })?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::AuthFailureBreaker;
    use async_trait::async_trait;
    use matchflow_core::identity::{Identity, IdentityProvider};
    use matchflow_core::pair::ReviewStatus;
    use matchflow_core::store::StoreError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StaticIdentity;

    #[async_trait]
    impl IdentityProvider for StaticIdentity {
        async fn current_identity(&self) -> StoreResult<Identity> {
            Ok(Identity {
                owner_id: "op-1".to_string(),
                token: "t".to_string(),
            })
        }

        async fn refresh_credential(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    /// Simple mock repository for testing
    #[derive(Default)]
    struct MockSessionRepository {
        sessions: Mutex<HashMap<String, MatchingSession>>,
        fail_archive: AtomicBool,
    }

    #[async_trait]
    impl SessionRepository for MockSessionRepository {
        async fn find_active(&self, owner_id: &str) -> StoreResult<Option<MatchingSession>> {
            let sessions = self.sessions.lock().unwrap();
            Ok(sessions
                .values()
                .find(|s| s.owner_id == owner_id && s.is_active)
                .cloned())
        }

        async fn find_by_id(&self, session_id: &str) -> StoreResult<Option<MatchingSession>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn insert(&self, session: MatchingSession) -> StoreResult<MatchingSession> {
            let mut sessions = self.sessions.lock().unwrap();
            if session.is_active
                && sessions
                    .values()
                    .any(|s| s.owner_id == session.owner_id && s.is_active)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: "one_active".to_string(),
                });
            }
            sessions.insert(session.id.clone(), session.clone());
            Ok(session)
        }

        async fn deactivate_active(&self, owner_id: &str) -> StoreResult<u64> {
            if self.fail_archive.load(Ordering::SeqCst) {
                return Err(StoreError::Other {
                    code: "500".to_string(),
                    message: "boom".to_string(),
                });
            }
            let mut sessions = self.sessions.lock().unwrap();
            let mut n = 0;
            for s in sessions.values_mut().filter(|s| s.owner_id == owner_id && s.is_active) {
                s.is_active = false;
                n += 1;
            }
            Ok(n)
        }

        async fn update_batch(
            &self,
            session_id: &str,
            batch: SessionBatch,
        ) -> StoreResult<MatchingSession> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
            batch.apply_to(session);
            Ok(session.clone())
        }

        async fn list_archived(
            &self,
            owner_id: &str,
            limit: usize,
        ) -> StoreResult<Vec<MatchingSession>> {
            let sessions = self.sessions.lock().unwrap();
            let mut archived: Vec<_> = sessions
                .values()
                .filter(|s| s.owner_id == owner_id && !s.is_active)
                .cloned()
                .collect();
            archived.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            archived.truncate(limit);
            Ok(archived)
        }

        async fn delete(&self, owner_id: &str, session_id: &str) -> StoreResult<u64> {
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.get(session_id) {
                Some(s) if s.owner_id == owner_id => {
                    sessions.remove(session_id);
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    fn manager(repo: Arc<MockSessionRepository>) -> SessionManager {
        let caller = ResilientCaller::new(
            Arc::new(StaticIdentity),
            Arc::new(AuthFailureBreaker::default()),
        );
        SessionManager::new(repo, caller)
    }

    #[tokio::test]
    async fn test_no_active_session_is_none() {
        let manager = manager(Arc::new(MockSessionRepository::default()));
        assert!(manager.get_active_session("op-1").await.unwrap().is_none());
        assert_eq!(
            manager.has_unprocessed_pairs("op-1").await.unwrap(),
            UnprocessedPairs::default()
        );
    }

    #[tokio::test]
    async fn test_create_archives_previous() {
        let repo = Arc::new(MockSessionRepository::default());
        let manager = manager(repo.clone());

        let first = manager.create_session("op-1").await.unwrap();
        let second = manager.create_session("op-1").await.unwrap();

        let active = manager.get_active_session("op-1").await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        let history = manager.list_history("op-1", None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, first.id);
    }

    #[tokio::test]
    async fn test_archive_failure_without_active_session_still_creates() {
        let repo = Arc::new(MockSessionRepository::default());
        repo.fail_archive.store(true, Ordering::SeqCst);
        let manager = manager(repo);

        let session = manager.create_session("op-1").await.unwrap();
        assert!(session.is_active);
    }

    #[tokio::test]
    async fn test_archive_failure_with_active_session_reports_cause() {
        let repo = Arc::new(MockSessionRepository::default());
        let manager = manager(repo.clone());
        let existing = manager.create_session("op-1").await.unwrap();
        repo.fail_archive.store(true, Ordering::SeqCst);

        let err = manager.create_session("op-1").await.unwrap_err();
        let MatchflowError::DataAccess(message) = &err else {
            panic!("expected a data access error, got {:?}", err);
        };
        assert!(message.contains("Could not archive"));
        assert!(message.contains("boom"));

        // The previous session stays the only active one
        let active = manager.get_active_session("op-1").await.unwrap().unwrap();
        assert_eq!(active.id, existing.id);
        assert_eq!(repo.sessions.lock().unwrap().len(), 1);

        repo.fail_archive.store(false, Ordering::SeqCst);
        let recovered = manager.create_session("op-1").await.unwrap();
        assert_ne!(recovered.id, existing.id);
    }

    #[tokio::test]
    async fn test_batch_update_recomputes_counters() {
        let repo = Arc::new(MockSessionRepository::default());
        let manager = manager(repo);
        manager.create_session("op-1").await.unwrap();

        let updated = manager
            .update_active_session_batch(
                "op-1",
                vec![
                    SuggestedPair::new("b1", "g1"),
                    SuggestedPair::new("b2", "g2").with_status(ReviewStatus::Approved),
                    SuggestedPair::new("b3", "g3").with_status(ReviewStatus::Skipped),
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.total_matches, 3);
        assert_eq!(updated.processed_matches, 2);
        let pending = manager.has_unprocessed_pairs("op-1").await.unwrap();
        assert!(pending.has_unprocessed);
        assert_eq!(pending.count, 1);
    }

    #[tokio::test]
    async fn test_batch_update_without_active_session() {
        let manager = manager(Arc::new(MockSessionRepository::default()));
        let err = manager
            .update_active_session_batch("op-1", Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_checks_ownership_and_activity() {
        let repo = Arc::new(MockSessionRepository::default());
        let manager = manager(repo.clone());
        let archived = manager.create_session("op-1").await.unwrap();
        let active = manager.create_session("op-1").await.unwrap();

        let err = manager.delete_session("op-2", &archived.id).await.unwrap_err();
        assert!(err.is_forbidden());

        let err = manager.delete_session("op-1", &active.id).await.unwrap_err();
        assert!(err.is_validation());

        let err = manager.delete_session("op-1", "missing").await.unwrap_err();
        assert!(err.is_not_found());

        manager.delete_session("op-1", &archived.id).await.unwrap();
        assert!(repo.sessions.lock().unwrap().get(&archived.id).is_none());
    }

    #[tokio::test]
    async fn test_update_specific_session_checks_owner() {
        let repo = Arc::new(MockSessionRepository::default());
        let manager = manager(repo);
        let archived = manager.create_session("op-1").await.unwrap();
        manager.create_session("op-1").await.unwrap();

        let err = manager
            .update_specific_session_batch("op-2", &archived.id, Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let updated = manager
            .update_specific_session_batch(
                "op-1",
                &archived.id,
                vec![SuggestedPair::new("b", "g").with_status(ReviewStatus::Rejected)],
            )
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.processed_matches, 1);
    }
}
