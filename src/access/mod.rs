//! Statement access control
//!
//! - `validator`: decides whether a session may run an analyzed statement
//! - `exception`: turns not-found / already-exists errors into privilege
//!   denials for users that cannot see the scope

pub mod exception;
pub mod validator;

pub use exception::remap;
pub use validator::validate;

use crate::error::{AccessError, AccessResult};
use crate::sql::privileges::{PrivilegeClass, PrivilegeType};
use crate::user::User;

/// What a statement needs from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Only superusers pass
    Superuser,
    /// Exact (type, class, ident) grant
    Privilege {
        privilege_type: PrivilegeType,
        class: PrivilegeClass,
        ident: Option<String>,
    },
}

impl Requirement {
    /// Build a privilege requirement; DCL requirements become superuser-only
    pub fn privilege(privilege_type: PrivilegeType, class: PrivilegeClass, ident: Option<String>) -> Self {
        if privilege_type == PrivilegeType::Dcl {
            return Requirement::Superuser;
        }
        Requirement::Privilege {
            privilege_type,
            class,
            ident,
        }
    }

    pub fn cluster(privilege_type: PrivilegeType) -> Self {
        Requirement::privilege(privilege_type, PrivilegeClass::Cluster, None)
    }

    pub fn schema(privilege_type: PrivilegeType, schema: &str) -> Self {
        Requirement::privilege(privilege_type, PrivilegeClass::Schema, Some(schema.to_string()))
    }

    pub fn table(privilege_type: PrivilegeType, fqn: String) -> Self {
        Requirement::privilege(privilege_type, PrivilegeClass::Table, Some(fqn))
    }

    /// Check the requirement against a non-superuser
    pub fn check(&self, user: &User) -> AccessResult<()> {
        match self {
            Requirement::Superuser => raise_unauthorized(user),
            Requirement::Privilege {
                privilege_type,
                class,
                ident,
            } => raise_missing_privilege(user, *privilege_type, *class, ident.as_deref()),
        }
    }
}

/// Fail unless the user is a superuser
pub fn raise_unauthorized(user: &User) -> AccessResult<()> {
    if user.is_superuser() {
        return Ok(());
    }
    tracing::debug!(user = %user.name(), "Denied superuser-only statement");
    Err(AccessError::unauthorized(user.name()))
}

/// Fail unless the user holds exactly this grant
pub fn raise_missing_privilege(
    user: &User,
    privilege_type: PrivilegeType,
    class: PrivilegeClass,
    ident: Option<&str>,
) -> AccessResult<()> {
    if user.is_superuser() || user.has_privilege(privilege_type, class, ident) {
        return Ok(());
    }
    tracing::debug!(
        user = %user.name(),
        privilege = %privilege_type,
        class = %class,
        ident = ?ident,
        "Missing privilege"
    );
    Err(AccessError::permission_denied(user.name(), privilege_type))
}
