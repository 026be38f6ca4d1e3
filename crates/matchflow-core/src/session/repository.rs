//! Session repository trait.
//!
//! Defines the record store operations the session manager needs.

use super::model::{MatchingSession, SessionBatch};
use crate::store::StoreResult;
use async_trait::async_trait;

/// Store-side partial unique constraint allowing one active session per owner.
pub const ONE_ACTIVE_SESSION_CONSTRAINT: &str = "sessions_one_active_per_owner";
/// Store-side primary key constraint on the session ID.
pub const SESSION_PKEY_CONSTRAINT: &str = "sessions_pkey";

/// An abstract repository for matching sessions.
///
/// This trait decouples the session manager from the specific record store
/// (remote database, in-memory table, ...). Implementations return classified
/// [`StoreError`](crate::store::StoreError)s so callers can tell a missing
/// record from a rejected credential.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Assigning `position` on insert (one past the owner's current maximum)
/// - Filtering by `owner_id` on every owner-scoped operation
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds the owner's active session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(MatchingSession))`: Active session found
    /// - `Ok(None)`: The owner has no active session
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_active(&self, owner_id: &str) -> StoreResult<Option<MatchingSession>>;

    /// Finds a session by its ID, regardless of owner.
    async fn find_by_id(&self, session_id: &str) -> StoreResult<Option<MatchingSession>>;

    /// Inserts a new session and returns the stored record.
    ///
    /// The store assigns `position`; the value on the input is ignored.
    async fn insert(&self, session: MatchingSession) -> StoreResult<MatchingSession>;

    /// Marks every active session of the owner inactive.
    ///
    /// # Returns
    ///
    /// - `Ok(n)`: Number of sessions archived (0 when none was active)
    /// - `Err(_)`: Error occurred during the update
    async fn deactivate_active(&self, owner_id: &str) -> StoreResult<u64>;

    /// Replaces the batch and counters of a session.
    ///
    /// # Returns
    ///
    /// - `Ok(MatchingSession)`: Updated record
    /// - `Err(StoreError::NotFound)`: No session with that ID
    async fn update_batch(
        &self,
        session_id: &str,
        batch: SessionBatch,
    ) -> StoreResult<MatchingSession>;

    /// Lists the owner's archived sessions, newest first.
    async fn list_archived(&self, owner_id: &str, limit: usize)
    -> StoreResult<Vec<MatchingSession>>;

    /// Deletes sessions matching both owner and ID.
    ///
    /// # Returns
    ///
    /// - `Ok(n)`: Number of rows deleted
    /// - `Err(_)`: Error occurred during deletion
    async fn delete(&self, owner_id: &str, session_id: &str) -> StoreResult<u64>;
}
