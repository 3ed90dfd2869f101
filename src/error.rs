//! Access control error types

use thiserror::Error;

use crate::sql::privileges::PrivilegeType;

/// Result type for access control operations
pub type AccessResult<T> = Result<T, AccessError>;

/// Access control errors
///
/// Every variant is terminal for the current request. Nothing in this crate
/// retries or recovers from them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No/invalid client certificate, CN mismatch or unknown user
    #[error("Client certificate authentication failed for user \"{user}\"")]
    AuthenticationFailed { user: String },

    /// Superuser-only statement attempted by a regular user
    #[error("User \"{user}\" is not authorized to execute statement")]
    Unauthorized { user: String },

    /// Fine-grained privilege missing
    ///
    /// `privilege_type` is `None` when the user lacks any privilege at the
    /// scope (remapped not-found errors).
    #[error("{}", permission_denied_message(.user, .privilege_type))]
    PermissionDenied {
        user: String,
        privilege_type: Option<PrivilegeType>,
    },

    /// Named user does not exist
    #[error("{0}")]
    ResourceUnknown(String),

    /// Operation not allowed on this target (e.g. altering a superuser)
    #[error("{0}")]
    UnsupportedOperation(String),

    /// User name already taken
    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    /// Statement kind without an access policy
    #[error("Can't handle \"{0}\"")]
    UnsupportedStatement(String),

    /// Metadata store failed to commit a write
    #[error("Metadata store error: {0}")]
    Store(String),

    /// Metadata encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl AccessError {
    pub fn permission_denied(user: &str, privilege_type: PrivilegeType) -> Self {
        AccessError::PermissionDenied {
            user: user.to_string(),
            privilege_type: Some(privilege_type),
        }
    }

    pub fn missing_any_privilege(user: &str) -> Self {
        AccessError::PermissionDenied {
            user: user.to_string(),
            privilege_type: None,
        }
    }

    pub fn unauthorized(user: &str) -> Self {
        AccessError::Unauthorized {
            user: user.to_string(),
        }
    }

    pub fn authentication_failed(user: &str) -> Self {
        AccessError::AuthenticationFailed {
            user: user.to_string(),
        }
    }

    /// Unknown user, as reported by DROP USER / GRANT / REVOKE
    pub fn user_unknown(user: &str) -> Self {
        AccessError::ResourceUnknown(format!("User '{}' does not exist", user))
    }
}

fn permission_denied_message(user: &str, privilege_type: &Option<PrivilegeType>) -> String {
    match privilege_type {
        Some(ty) => format!("Missing '{}' Privilege for user '{}'", ty, user),
        None => format!("Missing Privilege for user '{}'", user),
    }
}

impl From<bincode::Error> for AccessError {
    fn from(e: bincode::Error) -> Self {
        AccessError::Encoding(e.to_string())
    }
}
