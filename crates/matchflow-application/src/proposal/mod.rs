//! Proposal services.
//!
//! - `promotion`: Deduplicated creation from reviewed pairs
//! - `lifecycle`: Reads, status changes and candidate responses
//! - `notes`: Note history edits
//! - `updater`: Shared find → check owner → mutate → save sequence

mod lifecycle;
mod notes;
mod promotion;
mod updater;

pub use lifecycle::ProposalLifecycle;
pub use notes::ProposalNotes;
pub use promotion::{PromotionOutcome, ProposalPromoter};
pub use updater::ProposalUpdater;
