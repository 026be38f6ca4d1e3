//! Proposal repository trait.
//!
//! Defines the record store operations for proposals.

use super::model::Proposal;
use super::status::ProposalStatus;
use crate::store::StoreResult;
use async_trait::async_trait;

/// Name of the store-side unique constraint over `(owner_id, boy_ref, girl_ref)`.
pub const PROPOSAL_PAIR_CONSTRAINT: &str = "proposals_owner_boy_girl_key";

/// Optional narrowing for proposal listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub limit: Option<usize>,
}

impl ProposalFilter {
    pub fn with_status(status: ProposalStatus) -> Self {
        Self {
            status: Some(status),
            limit: None,
        }
    }

    pub fn matches(&self, proposal: &Proposal) -> bool {
        self.status.is_none_or(|status| proposal.status == status)
    }
}

/// An abstract repository for managing proposal persistence.
///
/// # Implementation Notes
///
/// Implementations must enforce uniqueness of `(owner_id, boy_ref, girl_ref)`
/// on insert and report a violation as
/// [`StoreError::UniqueViolation`](crate::store::StoreError::UniqueViolation).
/// The application checks for an existing row first, but this constraint is
/// what actually prevents duplicates under concurrent promotion.
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Finds the owner's Proposal for a pair.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Proposal))`: Proposal found
    /// - `Ok(None)`: No Proposal for this pair
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_pair(
        &self,
        owner_id: &str,
        boy_ref: &str,
        girl_ref: &str,
    ) -> StoreResult<Option<Proposal>>;

    /// Finds a Proposal by its ID.
    async fn find_by_id(&self, proposal_id: &str) -> StoreResult<Option<Proposal>>;

    /// Inserts a new Proposal.
    ///
    /// # Returns
    ///
    /// - `Ok(Proposal)`: Stored record
    /// - `Err(StoreError::UniqueViolation)`: The pair already has a Proposal
    /// - `Err(StoreError::NotNullViolation)`: A required field was empty
    async fn insert(&self, proposal: Proposal) -> StoreResult<Proposal>;

    /// Writes back a modified Proposal.
    ///
    /// # Returns
    ///
    /// - `Ok(Proposal)`: Stored record
    /// - `Err(StoreError::NotFound)`: No Proposal with that ID
    async fn update(&self, proposal: &Proposal) -> StoreResult<Proposal>;

    /// Lists the owner's Proposals, newest first.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &ProposalFilter,
    ) -> StoreResult<Vec<Proposal>>;
}
