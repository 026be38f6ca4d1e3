//! Application layer for matchflow.
//!
//! This crate provides the services that drive the domain models in
//! `matchflow-core` against the repository and identity contracts: resilient
//! store access, the session manager, proposal promotion and lifecycle, and
//! the operator-facing [`Matchmaker`] facade.

pub mod matchmaker;
pub mod proposal;
pub mod resilience;
pub mod session;

pub use matchmaker::Matchmaker;
pub use proposal::{PromotionOutcome, ProposalLifecycle, ProposalNotes, ProposalPromoter};
pub use resilience::{AuthFailureBreaker, ExistenceCheck, ResilientCaller};
pub use session::SessionManager;
