//! In-memory ProposalRepository implementation.
//!
//! Enforces the same constraints as the remote proposal table: not-null on
//! the owner and candidate references, a score range check, and uniqueness
//! of `(owner_id, boy_ref, girl_ref)`. The uniqueness check and the insert
//! happen under one write lock, so concurrent inserts of the same pair
//! produce exactly one row.

use async_trait::async_trait;
use matchflow_core::proposal::repository::PROPOSAL_PAIR_CONSTRAINT;
use matchflow_core::proposal::{Proposal, ProposalFilter, ProposalRepository};
use matchflow_core::store::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Constraint reported when `match_score` leaves the 0.0-1.0 range.
pub const MATCH_SCORE_CHECK: &str = "proposals_match_score_check";

/// In-memory proposal table.
///
/// Cloning shares the underlying table.
#[derive(Clone, Default)]
pub struct InMemoryProposalRepository {
    proposals: Arc<RwLock<HashMap<String, Proposal>>>,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.proposals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.proposals.read().await.is_empty()
    }

    /// Stores a row as-is, bypassing constraints. Used to seed fixtures such
    /// as Proposals created long ago.
    pub async fn seed(&self, proposal: Proposal) {
        let mut proposals = self.proposals.write().await;
        proposals.insert(proposal.id.clone(), proposal);
    }
}

fn check_constraints(proposal: &Proposal) -> StoreResult<()> {
    for (column, value) in [
        ("owner_id", &proposal.owner_id),
        ("boy_ref", &proposal.boy_ref),
        ("girl_ref", &proposal.girl_ref),
    ] {
        if value.trim().is_empty() {
            return Err(StoreError::NotNullViolation {
                column: column.to_string(),
            });
        }
    }
    if !(0.0..=1.0).contains(&proposal.match_score) {
        return Err(StoreError::CheckViolation {
            constraint: MATCH_SCORE_CHECK.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn find_by_pair(
        &self,
        owner_id: &str,
        boy_ref: &str,
        girl_ref: &str,
    ) -> StoreResult<Option<Proposal>> {
        let proposals = self.proposals.read().await;
        Ok(proposals
            .values()
            .find(|p| p.owner_id == owner_id && p.boy_ref == boy_ref && p.girl_ref == girl_ref)
            .cloned())
    }

    async fn find_by_id(&self, proposal_id: &str) -> StoreResult<Option<Proposal>> {
        let proposals = self.proposals.read().await;
        Ok(proposals.get(proposal_id).cloned())
    }

    async fn insert(&self, mut proposal: Proposal) -> StoreResult<Proposal> {
        check_constraints(&proposal)?;

        let mut proposals = self.proposals.write().await;
        let duplicate = proposals.values().any(|p| {
            p.owner_id == proposal.owner_id
                && p.boy_ref == proposal.boy_ref
                && p.girl_ref == proposal.girl_ref
        });
        if duplicate {
            return Err(StoreError::UniqueViolation {
                constraint: PROPOSAL_PAIR_CONSTRAINT.to_string(),
            });
        }

        if proposal.id.is_empty() {
            proposal.id = Uuid::new_v4().to_string();
        }
        if proposals.contains_key(&proposal.id) {
            return Err(StoreError::UniqueViolation {
                constraint: "proposals_pkey".to_string(),
            });
        }

        proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(proposal)
    }

    async fn update(&self, proposal: &Proposal) -> StoreResult<Proposal> {
        check_constraints(proposal)?;

        let mut proposals = self.proposals.write().await;
        let stored = proposals
            .get_mut(&proposal.id)
            .ok_or(StoreError::NotFound)?;
        *stored = proposal.clone();
        Ok(stored.clone())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &ProposalFilter,
    ) -> StoreResult<Vec<Proposal>> {
        let proposals = self.proposals.read().await;
        let mut owned: Vec<Proposal> = proposals
            .values()
            .filter(|p| p.owner_id == owner_id && filter.matches(p))
            .cloned()
            .collect();

        // Sort by created_at descending (most recent first)
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            owned.truncate(limit);
        }
        Ok(owned)
    }
}
