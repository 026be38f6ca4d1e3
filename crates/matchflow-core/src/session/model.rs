//! Session domain model.

use crate::pair::SuggestedPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A batch of suggested pairs under review by one operator.
///
/// `total_matches` and `processed_matches` are derived from `session_data`
/// and are recomputed on every batch write, never edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Operator who owns the session
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    /// Exactly one session per owner may be active
    pub is_active: bool,
    /// Display rank among the owner's sessions, assigned by the store on insert
    pub position: i64,
    pub total_matches: usize,
    pub processed_matches: usize,
    /// Pairs under review, in display order
    #[serde(default)]
    pub session_data: Vec<SuggestedPair>,
}

impl MatchingSession {
    /// Creates an active, empty session for `owner_id`.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            created_at: Utc::now(),
            is_active: true,
            position: 0,
            total_matches: 0,
            processed_matches: 0,
            session_data: Vec::new(),
        }
    }

    /// Number of pairs still waiting for a review decision.
    pub fn pending_count(&self) -> usize {
        self.session_data
            .iter()
            .filter(|pair| !pair.status.is_processed())
            .count()
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Whole-batch replacement for a session's review data.
///
/// Writes overwrite `session_data` wholesale; the last writer wins at the
/// batch level. Two tabs editing the same batch concurrently is not handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBatch {
    pub session_data: Vec<SuggestedPair>,
    pub total_matches: usize,
    pub processed_matches: usize,
}

impl SessionBatch {
    /// Builds a batch and derives its progress counters.
    pub fn from_pairs(pairs: Vec<SuggestedPair>) -> Self {
        let total_matches = pairs.len();
        let processed_matches = pairs.iter().filter(|pair| pair.status.is_processed()).count();
        Self {
            session_data: pairs,
            total_matches,
            processed_matches,
        }
    }

    /// Writes the batch onto a session record.
    pub fn apply_to(self, session: &mut MatchingSession) {
        session.session_data = self.session_data;
        session.total_matches = self.total_matches;
        session.processed_matches = self.processed_matches;
    }
}

/// Result of asking whether the active batch still has work left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnprocessedPairs {
    pub has_unprocessed: bool,
    pub count: usize,
}

impl UnprocessedPairs {
    pub fn from_count(count: usize) -> Self {
        Self {
            has_unprocessed: count > 0,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::ReviewStatus;

    #[test]
    fn test_new_session_is_active_and_empty() {
        let session = MatchingSession::new("s-1", "op-1");
        assert!(session.is_active);
        assert_eq!(session.position, 0);
        assert_eq!(session.total_matches, 0);
        assert!(session.session_data.is_empty());
    }

    #[test]
    fn test_batch_counters() {
        let batch = SessionBatch::from_pairs(vec![
            SuggestedPair::new("b1", "g1"),
            SuggestedPair::new("b2", "g2").with_status(ReviewStatus::Approved),
            SuggestedPair::new("b3", "g3").with_status(ReviewStatus::Rejected),
            SuggestedPair::new("b4", "g4").with_status(ReviewStatus::Skipped),
        ]);
        assert_eq!(batch.total_matches, 4);
        assert_eq!(batch.processed_matches, 3);
    }

    #[test]
    fn test_apply_overwrites_previous_batch() {
        let mut session = MatchingSession::new("s-1", "op-1");
        SessionBatch::from_pairs(vec![
            SuggestedPair::new("b1", "g1"),
            SuggestedPair::new("b2", "g2"),
        ])
        .apply_to(&mut session);
        SessionBatch::from_pairs(vec![SuggestedPair::new("b9", "g9")]).apply_to(&mut session);

        assert_eq!(session.total_matches, 1);
        assert_eq!(session.session_data[0].boy_ref, "b9");
        assert_eq!(session.pending_count(), 1);
    }

    #[test]
    fn test_unprocessed_from_count() {
        assert_eq!(UnprocessedPairs::from_count(0), UnprocessedPairs::default());
        assert!(UnprocessedPairs::from_count(2).has_unprocessed);
    }
}
