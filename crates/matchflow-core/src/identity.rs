//! Identity collaborator contract.
//!
//! The identity provider issues the operator's session credential. The store
//! rejects a credential once it expires; refreshing it is the only recovery
//! the engine attempts on its own.

use crate::store::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Operator ID; owns sessions and proposals
    pub owner_id: String,
    /// Current access token
    pub token: String,
}

/// Provides and refreshes the operator's credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the currently signed-in operator.
    async fn current_identity(&self) -> StoreResult<Identity>;

    /// Exchanges the refresh credential for a new access token.
    async fn refresh_credential(&self) -> StoreResult<()>;
}
