//! Session domain module.
//!
//! A matching session is the batch of suggested pairs an operator is
//! currently reviewing. At most one session per operator is active; older
//! sessions are archived and kept as history.
//!
//! # Module Structure
//!
//! - `model`: Session entity and batch recomputation (`MatchingSession`, `SessionBatch`)
//! - `repository`: Repository trait for session persistence
//!
//! # Usage
//!
//! ```ignore
//! use matchflow_core::session::{MatchingSession, SessionBatch, SessionRepository};
//! ```

mod model;
mod repository;

// Re-export public API
pub use model::{MatchingSession, SessionBatch, UnprocessedPairs};
pub use repository::{ONE_ACTIVE_SESSION_CONSTRAINT, SESSION_PKEY_CONSTRAINT, SessionRepository};
