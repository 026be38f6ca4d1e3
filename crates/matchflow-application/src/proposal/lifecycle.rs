//! Proposal status and candidate response operations.

use super::updater::ProposalUpdater;
use matchflow_core::error::Result;
use matchflow_core::proposal::{
    CandidateResponse, CandidateSide, Proposal, ProposalFilter, ProposalStatus,
};

/// Reads Proposals and moves them through the pipeline.
#[derive(Clone)]
pub struct ProposalLifecycle {
    updater: ProposalUpdater,
}

impl ProposalLifecycle {
    pub fn new(updater: ProposalUpdater) -> Self {
        Self { updater }
    }

    pub async fn get_proposal(&self, owner_id: &str, proposal_id: &str) -> Result<Proposal> {
        self.updater.load_owned(owner_id, proposal_id).await
    }

    /// Lists the operator's Proposals, newest first.
    pub async fn list_proposals(
        &self,
        owner_id: &str,
        filter: &ProposalFilter,
    ) -> Result<Vec<Proposal>> {
        let repository = self.updater.repository();
        let proposals = self
            .updater
            .caller()
            .call("list proposals", || repository.list_by_owner(owner_id, filter))
            .await?;
        Ok(proposals)
    }

    /// Moves a Proposal to `new_status`; `note` is mandatory.
    pub async fn update_status(
        &self,
        owner_id: &str,
        proposal_id: &str,
        new_status: ProposalStatus,
        note: &str,
    ) -> Result<Proposal> {
        let updated = self
            .updater
            .update(owner_id, proposal_id, |proposal| {
                proposal.change_status(new_status, note)
            })
            .await?;

        tracing::info!(
            "[ProposalLifecycle] Proposal {} moved to {}",
            proposal_id,
            new_status
        );
        Ok(updated)
    }

    /// Records a candidate's response. Does not change the status.
    pub async fn update_candidate_response(
        &self,
        owner_id: &str,
        proposal_id: &str,
        side: CandidateSide,
        response: CandidateResponse,
        reason: Option<&str>,
    ) -> Result<Proposal> {
        let updated = self
            .updater
            .update(owner_id, proposal_id, |proposal| {
                proposal.record_response(side, response, reason)
            })
            .await?;

        tracing::info!(
            "[ProposalLifecycle] Proposal {}: {} side responded {}",
            proposal_id,
            side,
            response
        );
        Ok(updated)
    }
}
