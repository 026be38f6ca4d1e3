//! Proposal updater helper for the common update pattern.
//!
//! Every Proposal mutation follows "find → check owner → mutate → touch
//! `updated_at` → save". `ProposalUpdater` owns that sequence so lifecycle
//! and note operations only supply the mutation.

use crate::resilience::ResilientCaller;
use matchflow_core::error::{MatchflowError, Result};
use matchflow_core::proposal::{Proposal, ProposalRepository};
use std::sync::Arc;

/// Helper struct for updating proposals with a common pattern.
#[derive(Clone)]
pub struct ProposalUpdater {
    repository: Arc<dyn ProposalRepository>,
    caller: ResilientCaller,
}

impl ProposalUpdater {
    pub fn new(repository: Arc<dyn ProposalRepository>, caller: ResilientCaller) -> Self {
        Self { repository, caller }
    }

    pub fn repository(&self) -> &Arc<dyn ProposalRepository> {
        &self.repository
    }

    pub fn caller(&self) -> &ResilientCaller {
        &self.caller
    }

    /// Loads a Proposal and verifies it belongs to `owner_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no Proposal has that ID
    /// - `Forbidden` if it belongs to another operator
    pub async fn load_owned(&self, owner_id: &str, proposal_id: &str) -> Result<Proposal> {
        let proposal = self
            .caller
            .call("find proposal", || self.repository.find_by_id(proposal_id))
            .await?
            .ok_or_else(|| MatchflowError::not_found("Proposal", proposal_id))?;

        if !proposal.is_owned_by(owner_id) {
            tracing::warn!(
                "[ProposalUpdater] {} attempted to modify proposal {} owned by {}",
                owner_id,
                proposal_id,
                proposal.owner_id
            );
            return Err(MatchflowError::forbidden("Proposal", proposal_id));
        }
        Ok(proposal)
    }

    /// Updates a Proposal by applying the given updater function.
    ///
    /// A failing `updater` aborts before anything is written.
    pub async fn update<F>(&self, owner_id: &str, proposal_id: &str, updater: F) -> Result<Proposal>
    where
        F: FnOnce(&mut Proposal) -> Result<()>,
    {
        let mut proposal = self.load_owned(owner_id, proposal_id).await?;
        tracing::debug!(
            "[ProposalUpdater] Loaded proposal: id={}, status={}",
            proposal.id,
            proposal.status
        );

        updater(&mut proposal)?;
        proposal.updated_at = chrono::Utc::now();

        let saved = self
            .caller
            .call("update proposal", || self.repository.update(&proposal))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MatchflowError::not_found("Proposal", proposal_id)
                } else {
                    e.into()
                }
            })?;

        tracing::debug!(
            "[ProposalUpdater] Proposal saved: id={}, status={}",
            saved.id,
            saved.status
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::AuthFailureBreaker;
    use async_trait::async_trait;
    use matchflow_core::identity::{Identity, IdentityProvider};
    use matchflow_core::pair::SuggestedPair;
    use matchflow_core::proposal::{ProposalFilter, ProposalStatus};
    use matchflow_core::store::{StoreError, StoreResult};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

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

    #[derive(Default)]
    struct MockProposalRepository {
        proposals: Mutex<HashMap<String, Proposal>>,
        writes: AtomicU32,
    }

    #[async_trait]
    impl ProposalRepository for MockProposalRepository {
        async fn find_by_pair(
            &self,
            _owner_id: &str,
            _boy_ref: &str,
            _girl_ref: &str,
        ) -> StoreResult<Option<Proposal>> {
            Ok(None)
        }

        async fn find_by_id(&self, proposal_id: &str) -> StoreResult<Option<Proposal>> {
            Ok(self.proposals.lock().unwrap().get(proposal_id).cloned())
        }

        async fn insert(&self, proposal: Proposal) -> StoreResult<Proposal> {
            Ok(proposal)
        }

        async fn update(&self, proposal: &Proposal) -> StoreResult<Proposal> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut proposals = self.proposals.lock().unwrap();
            let stored = proposals.get_mut(&proposal.id).ok_or(StoreError::NotFound)?;
            *stored = proposal.clone();
            Ok(proposal.clone())
        }

        async fn list_by_owner(
            &self,
            _owner_id: &str,
            _filter: &ProposalFilter,
        ) -> StoreResult<Vec<Proposal>> {
            Ok(Vec::new())
        }
    }

    fn setup() -> (Arc<MockProposalRepository>, ProposalUpdater) {
        let repo = Arc::new(MockProposalRepository::default());
        let mut proposal =
            Proposal::from_suggestion("p-1", "op-1", &SuggestedPair::new("b", "g"), None);
        proposal.updated_at = chrono::Utc::now() - chrono::Duration::hours(1);
        repo.proposals
            .lock()
            .unwrap()
            .insert(proposal.id.clone(), proposal);

        let caller = ResilientCaller::new(
            Arc::new(StaticIdentity),
            Arc::new(AuthFailureBreaker::default()),
        );
        (repo.clone(), ProposalUpdater::new(repo, caller))
    }

    #[tokio::test]
    async fn test_update_touches_updated_at() {
        let (repo, updater) = setup();
        let before = repo.proposals.lock().unwrap()["p-1"].updated_at;

        let updated = updater
            .update("op-1", "p-1", |p| p.change_status(ProposalStatus::Contacting, "Called"))
            .await
            .unwrap();

        assert_eq!(updated.status, ProposalStatus::Contacting);
        assert!(updated.updated_at > before);
        assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_foreign_owner_is_forbidden() {
        let (repo, updater) = setup();
        let err = updater
            .update("op-2", "p-1", |p| p.notes_history.append("hi", None))
            .await
            .unwrap_err();

        assert!(err.is_forbidden());
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_proposal_is_not_found() {
        let (_repo, updater) = setup();
        let err = updater.load_owned("op-1", "p-404").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_mutation_never_writes() {
        let (repo, updater) = setup();
        let err = updater
            .update("op-1", "p-1", |p| p.notes_history.edit(3, "x"))
            .await
            .unwrap_err();

        assert!(err.is_out_of_range());
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_each_update_reads_the_latest_record() {
        let (repo, updater) = setup();
        updater
            .update("op-1", "p-1", |p| p.notes_history.append("first", None))
            .await
            .unwrap();
        let updated = updater
            .update("op-1", "p-1", |p| p.notes_history.append("second", None))
            .await
            .unwrap();

        let contents: Vec<_> = updated
            .notes_history
            .iter()
            .map(|n| n.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(repo.proposals.lock().unwrap()["p-1"], updated);
    }
}
