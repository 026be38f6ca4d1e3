//! Proposal domain module.
//!
//! A Proposal is the durable, deduplicated record that a pair has been put
//! forward. It carries its own pipeline status, per-candidate responses and
//! an editable note history.
//!
//! # Module Structure
//!
//! - `model`: Proposal entity and its state transitions (`Proposal`)
//! - `status`: Closed enums (`ProposalStatus`, `CandidateResponse`, `CandidateSide`, `RejectionSide`)
//! - `note`: Note history (`Note`, `NoteHistory`)
//! - `repository`: Repository trait for proposal persistence

mod model;
mod note;
pub mod repository;
mod status;

// Re-export public API
pub use model::Proposal;
pub use note::{Note, NoteHistory};
pub use repository::{ProposalFilter, ProposalRepository};
pub use status::{CandidateResponse, CandidateSide, ProposalStatus, RejectionSide};
