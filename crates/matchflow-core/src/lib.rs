//! Domain layer of the matchflow engine.
//!
//! Holds the session and proposal models, their state rules, the classified
//! store errors, and the contracts (repository and identity traits) that the
//! application layer drives and the infrastructure layer implements.

pub mod config;
pub mod error;
pub mod identity;
pub mod pair;
pub mod proposal;
pub mod session;
pub mod store;

// Re-export common error types
pub use error::{MatchflowError, Result};
pub use store::{StoreError, StoreResult};
