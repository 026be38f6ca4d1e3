#![allow(dead_code)]

use async_trait::async_trait;
use matchflow_application::Matchmaker;
use matchflow_core::config::MatchflowConfig;
use matchflow_core::proposal::{Proposal, ProposalFilter, ProposalRepository};
use matchflow_core::store::{StoreError, StoreResult};
use matchflow_infrastructure::{
    InMemoryIdentityProvider, InMemoryProposalRepository, InMemorySessionRepository,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Shared in-memory store plus one operator's facade.
pub struct Harness {
    pub sessions: InMemorySessionRepository,
    pub proposals: InMemoryProposalRepository,
    pub identity: InMemoryIdentityProvider,
    pub matchmaker: Arc<Matchmaker>,
}

impl Harness {
    pub fn new(owner_id: &str) -> Self {
        let sessions = InMemorySessionRepository::new();
        let proposals = InMemoryProposalRepository::new();
        let identity = InMemoryIdentityProvider::new(owner_id);
        let matchmaker = Arc::new(Matchmaker::new(
            Arc::new(sessions.clone()),
            Arc::new(proposals.clone()),
            Arc::new(identity.clone()),
            &MatchflowConfig::default(),
        ));
        Self {
            sessions,
            proposals,
            identity,
            matchmaker,
        }
    }

    /// A facade for another operator over the same store.
    pub fn operator(&self, owner_id: &str) -> Matchmaker {
        Matchmaker::new(
            Arc::new(self.sessions.clone()),
            Arc::new(self.proposals.clone()),
            Arc::new(InMemoryIdentityProvider::new(owner_id)),
            &MatchflowConfig::default(),
        )
    }
}

/// Proposal table whose pair lookups can be made to fail with an expired
/// credential, as the remote store does.
#[derive(Clone, Default)]
pub struct FlakyProposalRepository {
    pub inner: InMemoryProposalRepository,
    pub fail_lookups: Arc<AtomicBool>,
    pub lookups: Arc<AtomicU32>,
    pub inserts: Arc<AtomicU32>,
}

impl FlakyProposalRepository {
    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> u32 {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProposalRepository for FlakyProposalRepository {
    async fn find_by_pair(
        &self,
        owner_id: &str,
        boy_ref: &str,
        girl_ref: &str,
    ) -> StoreResult<Option<Proposal>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::from_code("PGRST301", "JWT expired"));
        }
        self.inner.find_by_pair(owner_id, boy_ref, girl_ref).await
    }

    async fn find_by_id(&self, proposal_id: &str) -> StoreResult<Option<Proposal>> {
        self.inner.find_by_id(proposal_id).await
    }

    async fn insert(&self, proposal: Proposal) -> StoreResult<Proposal> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(proposal).await
    }

    async fn update(&self, proposal: &Proposal) -> StoreResult<Proposal> {
        self.inner.update(proposal).await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &ProposalFilter,
    ) -> StoreResult<Vec<Proposal>> {
        self.inner.list_by_owner(owner_id, filter).await
    }
}
