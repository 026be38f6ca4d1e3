//! Error types for the matchflow engine.

use crate::proposal::repository::PROPOSAL_PAIR_CONSTRAINT;
use crate::session::{ONE_ACTIVE_SESSION_CONSTRAINT, SESSION_PKEY_CONSTRAINT};
use crate::store::StoreError;
use thiserror::Error;

/// A shared error type for every matchflow service.
///
/// This provides typed, structured error variants with automatic conversion
/// from the store adapter's classified errors and common library errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchflowError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The entity exists but belongs to a different operator
    #[error("Access denied: {entity_type} '{id}' is owned by another operator")]
    Forbidden {
        entity_type: &'static str,
        id: String,
    },

    /// Credential expired or rejected and a refresh did not help
    #[error("Authentication expired, please sign in again: {0}")]
    TransientAuth(String),

    /// A uniqueness constraint rejected the write
    #[error("{entity_type} already exists (unique constraint '{constraint}')")]
    AlreadyExists {
        entity_type: &'static str,
        constraint: String,
    },

    /// Input failed validation (missing field, bad value, missing reason)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A positional index did not address an existing entry
    #[error("Index {index} is out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// The requested state change is not allowed from the current state
    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// Data access error (store adapter)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MatchflowError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Forbidden error
    pub fn forbidden(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Forbidden {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an OutOfRange error
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Check if the caller should ask the operator to re-authenticate
    pub fn is_transient_auth(&self) -> bool {
        matches!(self, Self::TransientAuth(_))
    }

    /// Check if this is an AlreadyExists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<StoreError> for MatchflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("record", "unknown"),
            StoreError::TransientAuth { code, message } => {
                Self::TransientAuth(format!("{} ({})", message, code))
            }
            StoreError::UniqueViolation { constraint } => Self::AlreadyExists {
                entity_type: constrained_entity(&constraint),
                constraint,
            },
            StoreError::NotNullViolation { column } => {
                Self::Validation(format!("Missing required field: {}", column))
            }
            StoreError::CheckViolation { constraint } => {
                Self::Validation(format!("Value rejected by constraint: {}", constraint))
            }
            StoreError::Other { code, message } => {
                Self::DataAccess(format!("{} (code: {})", message, code))
            }
        }
    }
}

/// Names the entity guarded by a known store constraint.
fn constrained_entity(constraint: &str) -> &'static str {
    match constraint {
        PROPOSAL_PAIR_CONSTRAINT => "Proposal",
        ONE_ACTIVE_SESSION_CONSTRAINT => "Active MatchingSession",
        SESSION_PKEY_CONSTRAINT => "MatchingSession",
        _ => "Record",
    }
}

impl From<std::io::Error> for MatchflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for MatchflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MatchflowError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for MatchflowError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MatchflowError>`.
pub type Result<T> = std::result::Result<T, MatchflowError>;
