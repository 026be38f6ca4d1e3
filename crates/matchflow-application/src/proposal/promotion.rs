//! Promotion of reviewed pairs into Proposals.
//!
//! The existence check filters out pairs that were promoted earlier. A match
//! younger than the race window is treated as a concurrent creation still in
//! flight, so the insert is attempted anyway and the store's unique
//! constraint decides.

use crate::resilience::{ExistenceCheck, ResilientCaller};
use chrono::{Duration, Utc};
use matchflow_core::config::DEFAULT_RACE_WINDOW_SECS;
use matchflow_core::error::Result;
use matchflow_core::pair::SuggestedPair;
use matchflow_core::proposal::{Proposal, ProposalRepository};
use matchflow_core::session::SessionRepository;
use matchflow_core::store::StoreError;
use std::sync::Arc;
use uuid::Uuid;

/// What a promotion did.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// A new Proposal was stored.
    Created(Proposal),
    /// The pair was promoted earlier; nothing was written.
    AlreadyExists(Proposal),
    /// The store rejected the insert as a duplicate of a concurrent creation.
    Duplicate { existing_id: Option<String> },
}

impl PromotionOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// ID of the Proposal the pair now maps to, when known.
    pub fn proposal_id(&self) -> Option<&str> {
        match self {
            Self::Created(proposal) | Self::AlreadyExists(proposal) => Some(&proposal.id),
            Self::Duplicate { existing_id } => existing_id.as_deref(),
        }
    }
}

pub struct ProposalPromoter {
    proposals: Arc<dyn ProposalRepository>,
    sessions: Arc<dyn SessionRepository>,
    caller: ResilientCaller,
    race_window: Duration,
}

impl ProposalPromoter {
    pub fn new(
        proposals: Arc<dyn ProposalRepository>,
        sessions: Arc<dyn SessionRepository>,
        caller: ResilientCaller,
    ) -> Self {
        Self {
            proposals,
            sessions,
            caller,
            race_window: Duration::seconds(DEFAULT_RACE_WINDOW_SECS),
        }
    }

    pub fn with_race_window(mut self, race_window: Duration) -> Self {
        self.race_window = race_window;
        self
    }

    /// Materializes a Proposal for `pair` unless one already exists.
    ///
    /// Duplicates are reported through [`PromotionOutcome`], never as errors.
    /// Not-null and check violations surface as `Validation` errors.
    pub async fn promote(&self, owner_id: &str, pair: &SuggestedPair) -> Result<PromotionOutcome> {
        pair.validate()?;
        let (boy_ref, girl_ref) = (pair.boy_ref.as_str(), pair.girl_ref.as_str());

        let check = self
            .caller
            .check_existing("find proposal by pair", || {
                self.proposals.find_by_pair(owner_id, boy_ref, girl_ref)
            })
            .await?;

        match check {
            ExistenceCheck::Found(existing) => {
                let age = Utc::now() - existing.created_at;
                if age > self.race_window {
                    tracing::info!(
                        "[ProposalPromoter] Pair {}/{} already proposed as {} ({}s ago)",
                        boy_ref,
                        girl_ref,
                        existing.id,
                        age.num_seconds()
                    );
                    return Ok(PromotionOutcome::AlreadyExists(existing));
                }
                tracing::debug!(
                    "[ProposalPromoter] Proposal {} is {}ms old, treating as concurrent creation",
                    existing.id,
                    age.num_milliseconds()
                );
            }
            ExistenceCheck::Absent => {}
            ExistenceCheck::Skipped => tracing::debug!(
                "[ProposalPromoter] Existence check skipped for {}/{}, relying on unique constraint",
                boy_ref,
                girl_ref
            ),
        }

        let original_session_id = self
            .caller
            .call("find active session", || self.sessions.find_active(owner_id))
            .await
            .or_else(|e| if e.is_not_found() { Ok(None) } else { Err(e) })?
            .map(|session| session.id);

        let proposal = Proposal::from_suggestion(
            Uuid::new_v4().to_string(),
            owner_id,
            pair,
            original_session_id,
        );

        let inserted = self
            .caller
            .call("insert proposal", || self.proposals.insert(proposal.clone()))
            .await;

        match inserted {
            Ok(created) => {
                tracing::info!(
                    "[ProposalPromoter] Created proposal {} for {}/{} (score {:.2})",
                    created.id,
                    boy_ref,
                    girl_ref,
                    created.match_score
                );
                Ok(PromotionOutcome::Created(created))
            }
            Err(StoreError::UniqueViolation { constraint }) => {
                let existing_id = self.lookup_existing_id(owner_id, boy_ref, girl_ref).await;
                tracing::warn!(
                    "[ProposalPromoter] Duplicate proposal for {}/{} rejected by {} (existing: {:?})",
                    boy_ref,
                    girl_ref,
                    constraint,
                    existing_id
                );
                Ok(PromotionOutcome::Duplicate { existing_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup_existing_id(&self, owner_id: &str, boy_ref: &str, girl_ref: &str) -> Option<String> {
        match self
            .caller
            .call("find duplicate proposal", || {
                self.proposals.find_by_pair(owner_id, boy_ref, girl_ref)
            })
            .await
        {
            Ok(existing) => existing.map(|p| p.id),
            Err(e) => {
                tracing::debug!("[ProposalPromoter] Could not resolve duplicate: {}", e);
                None
            }
        }
    }
}
