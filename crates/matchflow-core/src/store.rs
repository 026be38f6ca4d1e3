//! Record store error payloads.
//!
//! The durable record store reports failures as structured codes. This module
//! classifies those codes once so that every caller can match on a closed set
//! of error classes instead of inspecting raw strings.

use thiserror::Error;

/// Store code for "the single-row read matched nothing".
pub const CODE_NO_ROWS: &str = "PGRST116";
/// Store code for an expired or rejected credential.
pub const CODE_JWT_EXPIRED: &str = "PGRST301";
/// HTTP-style "not acceptable" status the store returns for stale credentials.
pub const CODE_NOT_ACCEPTABLE: &str = "406";
/// HTTP-style "unauthorized" status.
pub const CODE_UNAUTHORIZED: &str = "401";
/// SQLSTATE for a unique constraint violation.
pub const CODE_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for a not-null constraint violation.
pub const CODE_NOT_NULL_VIOLATION: &str = "23502";
/// SQLSTATE for a check constraint violation.
pub const CODE_CHECK_VIOLATION: &str = "23514";

/// Classified failure returned by a store adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("record not found")]
    NotFound,

    /// The credential was rejected; a refresh may fix it.
    #[error("credential rejected ({code}): {message}")]
    TransientAuth { code: String, message: String },

    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A required column was missing.
    #[error("not-null constraint violated on column {column}")]
    NotNullViolation { column: String },

    /// A check constraint rejected a value.
    #[error("check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// Anything else; never retried.
    #[error("store error ({code}): {message}")]
    Other { code: String, message: String },
}

impl StoreError {
    /// Classifies a raw store error code and message.
    ///
    /// For constraint violations the message is carried as the constraint or
    /// column name, which is what the store puts there.
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            CODE_NO_ROWS => Self::NotFound,
            CODE_JWT_EXPIRED | CODE_NOT_ACCEPTABLE | CODE_UNAUTHORIZED => Self::TransientAuth {
                code: code.to_string(),
                message,
            },
            CODE_UNIQUE_VIOLATION => Self::UniqueViolation {
                constraint: message,
            },
            CODE_NOT_NULL_VIOLATION => Self::NotNullViolation { column: message },
            CODE_CHECK_VIOLATION => Self::CheckViolation {
                constraint: message,
            },
            _ if message.to_lowercase().contains("jwt expired") => Self::TransientAuth {
                code: code.to_string(),
                message,
            },
            _ => Self::Other {
                code: code.to_string(),
                message,
            },
        }
    }

    /// Creates a TransientAuth error with the expired-credential code.
    pub fn expired_credential(message: impl Into<String>) -> Self {
        Self::TransientAuth {
            code: CODE_JWT_EXPIRED.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_transient_auth(&self) -> bool {
        matches!(self, Self::TransientAuth { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// A type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_auth_family() {
        assert!(StoreError::from_code("PGRST301", "JWT expired").is_transient_auth());
        assert!(StoreError::from_code("406", "Not Acceptable").is_transient_auth());
        assert!(StoreError::from_code("401", "Unauthorized").is_transient_auth());
        assert!(StoreError::from_code("XX000", "JWT expired at 12:00").is_transient_auth());
    }

    #[test]
    fn test_classifies_constraints() {
        assert_eq!(
            StoreError::from_code("23505", "proposals_owner_pair_key"),
            StoreError::UniqueViolation {
                constraint: "proposals_owner_pair_key".to_string()
            }
        );
        assert_eq!(
            StoreError::from_code("23502", "boy_ref"),
            StoreError::NotNullViolation {
                column: "boy_ref".to_string()
            }
        );
        assert!(matches!(
            StoreError::from_code("23514", "score_range"),
            StoreError::CheckViolation { .. }
        ));
    }

    #[test]
    fn test_no_rows_is_not_found_and_unknown_is_other() {
        assert!(StoreError::from_code("PGRST116", "0 rows").is_not_found());
        assert!(matches!(
            StoreError::from_code("57014", "statement timeout"),
            StoreError::Other { .. }
        ));
    }
}
