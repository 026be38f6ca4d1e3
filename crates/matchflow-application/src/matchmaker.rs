//! Operator-facing facade.
//!
//! `Matchmaker` resolves the signed-in operator through the identity
//! collaborator and delegates to the session and proposal services, so UI
//! callers never pass an owner ID themselves.

use crate::proposal::{
    PromotionOutcome, ProposalLifecycle, ProposalNotes, ProposalPromoter, ProposalUpdater,
};
use crate::resilience::{AuthFailureBreaker, ResilientCaller};
use crate::session::SessionManager;
use matchflow_core::config::MatchflowConfig;
use matchflow_core::error::Result;
use matchflow_core::identity::IdentityProvider;
use matchflow_core::pair::SuggestedPair;
use matchflow_core::proposal::{
    CandidateResponse, CandidateSide, Proposal, ProposalFilter, ProposalRepository, ProposalStatus,
};
use matchflow_core::session::{MatchingSession, SessionRepository, UnprocessedPairs};
use std::sync::Arc;

/// Entry point for the review and proposal workflow of one signed-in operator.
///
/// # Thread Safety
///
/// All services share one [`ResilientCaller`], so the auth-failure breaker is
/// process-wide for this instance.
pub struct Matchmaker {
    identity: Arc<dyn IdentityProvider>,
    caller: ResilientCaller,
    sessions: SessionManager,
    promoter: ProposalPromoter,
    lifecycle: ProposalLifecycle,
    notes: ProposalNotes,
}

impl Matchmaker {
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        proposal_repository: Arc<dyn ProposalRepository>,
        identity: Arc<dyn IdentityProvider>,
        config: &MatchflowConfig,
    ) -> Self {
        let breaker = Arc::new(AuthFailureBreaker::from_settings(&config.resilience));
        let caller = ResilientCaller::new(identity.clone(), breaker);
        let updater = ProposalUpdater::new(proposal_repository.clone(), caller.clone());

        Self {
            sessions: SessionManager::new(session_repository.clone(), caller.clone())
                .with_history_limit(config.session.history_limit),
            promoter: ProposalPromoter::new(proposal_repository, session_repository, caller.clone())
                .with_race_window(config.race_window()),
            lifecycle: ProposalLifecycle::new(updater.clone()),
            notes: ProposalNotes::new(updater),
            identity,
            caller,
        }
    }

    async fn owner_id(&self) -> Result<String> {
        let identity = self
            .caller
            .call("resolve identity", || self.identity.current_identity())
            .await?;
        Ok(identity.owner_id)
    }

    // ------------------------------------------------------------------
    // Review sessions
    // ------------------------------------------------------------------

    /// Archives the current batch and starts a new, empty one.
    pub async fn start_review(&self) -> Result<MatchingSession> {
        let owner_id = self.owner_id().await?;
        self.sessions.create_session(&owner_id).await
    }

    pub async fn active_session(&self) -> Result<Option<MatchingSession>> {
        let owner_id = self.owner_id().await?;
        self.sessions.get_active_session(&owner_id).await
    }

    /// Replaces the active batch with `pairs`.
    pub async fn save_review_batch(&self, pairs: Vec<SuggestedPair>) -> Result<MatchingSession> {
        let owner_id = self.owner_id().await?;
        self.sessions.update_active_session_batch(&owner_id, pairs).await
    }

    /// Replaces the batch of an archived session.
    pub async fn save_history_batch(
        &self,
        session_id: &str,
        pairs: Vec<SuggestedPair>,
    ) -> Result<MatchingSession> {
        let owner_id = self.owner_id().await?;
        self.sessions
            .update_specific_session_batch(&owner_id, session_id, pairs)
            .await
    }

    pub async fn pending_review(&self) -> Result<UnprocessedPairs> {
        let owner_id = self.owner_id().await?;
        self.sessions.has_unprocessed_pairs(&owner_id).await
    }

    pub async fn review_history(&self, limit: Option<usize>) -> Result<Vec<MatchingSession>> {
        let owner_id = self.owner_id().await?;
        self.sessions.list_history(&owner_id, limit).await
    }

    pub async fn delete_history_session(&self, session_id: &str) -> Result<()> {
        let owner_id = self.owner_id().await?;
        self.sessions.delete_session(&owner_id, session_id).await
    }

    // ------------------------------------------------------------------
    // Proposals
    // ------------------------------------------------------------------

    pub async fn promote(&self, pair: &SuggestedPair) -> Result<PromotionOutcome> {
        let owner_id = self.owner_id().await?;
        self.promoter.promote(&owner_id, pair).await
    }

    pub async fn proposal(&self, proposal_id: &str) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.lifecycle.get_proposal(&owner_id, proposal_id).await
    }

    pub async fn proposals(&self, filter: &ProposalFilter) -> Result<Vec<Proposal>> {
        let owner_id = self.owner_id().await?;
        self.lifecycle.list_proposals(&owner_id, filter).await
    }

    pub async fn set_status(
        &self,
        proposal_id: &str,
        status: ProposalStatus,
        note: &str,
    ) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.lifecycle
            .update_status(&owner_id, proposal_id, status, note)
            .await
    }

    pub async fn record_response(
        &self,
        proposal_id: &str,
        side: CandidateSide,
        response: CandidateResponse,
        reason: Option<&str>,
    ) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.lifecycle
            .update_candidate_response(&owner_id, proposal_id, side, response, reason)
            .await
    }

    pub async fn annotate(&self, proposal_id: &str, content: &str) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.notes.add_note(&owner_id, proposal_id, content).await
    }

    pub async fn edit_note(&self, proposal_id: &str, index: usize, content: &str) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.notes
            .edit_note(&owner_id, proposal_id, index, content)
            .await
    }

    pub async fn delete_note(&self, proposal_id: &str, index: usize) -> Result<Proposal> {
        let owner_id = self.owner_id().await?;
        self.notes.delete_note(&owner_id, proposal_id, index).await
    }

    // ------------------------------------------------------------------
    // Breaker
    // ------------------------------------------------------------------

    pub fn auth_failure_count(&self) -> u32 {
        self.caller.breaker().failure_count()
    }

    pub fn is_breaker_tripped(&self) -> bool {
        self.caller.breaker().is_tripped()
    }

    /// Operator-triggered reset of the existence-check breaker.
    pub fn reset_auth_breaker(&self) {
        self.caller.breaker().reset();
    }
}
