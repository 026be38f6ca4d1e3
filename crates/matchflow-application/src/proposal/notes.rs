//! Note history operations on stored Proposals.

use super::updater::ProposalUpdater;
use matchflow_core::error::Result;
use matchflow_core::proposal::Proposal;

#[derive(Clone)]
pub struct ProposalNotes {
    updater: ProposalUpdater,
}

impl ProposalNotes {
    pub fn new(updater: ProposalUpdater) -> Self {
        Self { updater }
    }

    /// Appends a free-standing note; the status is untouched.
    pub async fn add_note(&self, owner_id: &str, proposal_id: &str, content: &str) -> Result<Proposal> {
        let updated = self
            .updater
            .update(owner_id, proposal_id, |proposal| {
                proposal.notes_history.append(content, None)
            })
            .await?;
        tracing::debug!(
            "[ProposalNotes] Added note to {} ({} total)",
            proposal_id,
            updated.notes_history.len()
        );
        Ok(updated)
    }

    pub async fn edit_note(
        &self,
        owner_id: &str,
        proposal_id: &str,
        index: usize,
        content: &str,
    ) -> Result<Proposal> {
        let updated = self
            .updater
            .update(owner_id, proposal_id, |proposal| {
                proposal.notes_history.edit(index, content)
            })
            .await?;
        tracing::debug!("[ProposalNotes] Edited note {} of {}", index, proposal_id);
        Ok(updated)
    }

    /// Removes the note at `index`. Callers confirm with the operator first.
    pub async fn delete_note(&self, owner_id: &str, proposal_id: &str, index: usize) -> Result<Proposal> {
        let updated = self
            .updater
            .update(owner_id, proposal_id, |proposal| {
                proposal.notes_history.remove(index).map(|_| ())
            })
            .await?;
        tracing::info!("[ProposalNotes] Deleted note {} of {}", index, proposal_id);
        Ok(updated)
    }
}
