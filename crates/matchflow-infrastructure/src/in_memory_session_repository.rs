//! In-memory SessionRepository implementation.
//!
//! Behaves like the remote session table: the store assigns `position`,
//! owner filters apply to every owner-scoped call, and a partial unique
//! constraint allows only one active session per owner.

use async_trait::async_trait;
use matchflow_core::session::{
    MatchingSession, ONE_ACTIVE_SESSION_CONSTRAINT, SESSION_PKEY_CONSTRAINT, SessionBatch,
    SessionRepository,
};
use matchflow_core::store::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory session table.
///
/// Cloning shares the underlying table.
#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, MatchingSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored session, for assertions and debugging.
    pub async fn snapshot(&self) -> Vec<MatchingSession> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<MatchingSession> = sessions.values().cloned().collect();
        all.sort_by(|a, b| a.owner_id.cmp(&b.owner_id).then(a.position.cmp(&b.position)));
        all
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_active(&self, owner_id: &str) -> StoreResult<Option<MatchingSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.owner_id == owner_id && s.is_active)
            .cloned())
    }

    async fn find_by_id(&self, session_id: &str) -> StoreResult<Option<MatchingSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn insert(&self, mut session: MatchingSession) -> StoreResult<MatchingSession> {
        if session.owner_id.trim().is_empty() {
            return Err(StoreError::NotNullViolation {
                column: "owner_id".to_string(),
            });
        }

        let mut sessions = self.sessions.write().await;

        if session.id.is_empty() {
            session.id = Uuid::new_v4().to_string();
        }
        if sessions.contains_key(&session.id) {
            return Err(StoreError::UniqueViolation {
                constraint: SESSION_PKEY_CONSTRAINT.to_string(),
            });
        }
        if session.is_active
            && sessions
                .values()
                .any(|s| s.owner_id == session.owner_id && s.is_active)
        {
            return Err(StoreError::UniqueViolation {
                constraint: ONE_ACTIVE_SESSION_CONSTRAINT.to_string(),
            });
        }

        session.position = sessions
            .values()
            .filter(|s| s.owner_id == session.owner_id)
            .map(|s| s.position)
            .max()
            .map_or(0, |max| max + 1);

        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn deactivate_active(&self, owner_id: &str) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let mut archived = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.owner_id == owner_id && s.is_active)
        {
            session.is_active = false;
            archived += 1;
        }
        Ok(archived)
    }

    async fn update_batch(
        &self,
        session_id: &str,
        batch: SessionBatch,
    ) -> StoreResult<MatchingSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id).ok_or(StoreError::NotFound)?;
        batch.apply_to(session);
        Ok(session.clone())
    }

    async fn list_archived(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<MatchingSession>> {
        let sessions = self.sessions.read().await;
        let mut archived: Vec<MatchingSession> = sessions
            .values()
            .filter(|s| s.owner_id == owner_id && !s.is_active)
            .cloned()
            .collect();

        // Newest first; position breaks ties between sessions created in the same instant
        archived.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.position.cmp(&a.position))
        });
        archived.truncate(limit);
        Ok(archived)
    }

    async fn delete(&self, owner_id: &str, session_id: &str) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(session_id) {
            Some(session) if session.owner_id == owner_id => {
                sessions.remove(session_id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
