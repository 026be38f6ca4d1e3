//! Resilient store access.
//!
//! - `breaker`: Process-scoped auth-failure counter for the existence check
//! - `caller`: Refresh-and-retry wrapper applied to every store call

mod breaker;
mod caller;

pub use breaker::AuthFailureBreaker;
pub use caller::{ExistenceCheck, ResilientCaller};
