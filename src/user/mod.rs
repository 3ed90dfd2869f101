//! Users and the replicated user directory
//!
//! - `User`: immutable identity with roles and privileges
//! - `directory`: snapshots of all users and the cell publishing them
//! - `metadata`: replicated metadata sections
//! - `store`: metadata store seam and in-memory implementation
//! - `manager`: mutation and enforcement facade

pub mod directory;
pub mod manager;
pub mod metadata;
pub mod store;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sql::privileges::{PrivilegeClass, PrivilegeType, UserPrivileges};

pub use directory::{DirectoryCell, UserDirectory};
pub use manager::DirectoryManager;
pub use metadata::{MetadataChanged, UsersMetadata, UsersPrivilegesMetadata};
pub use store::{MemMetadataStore, MetadataStore, WriteRequest};

/// Name of the built-in superuser
pub const SUPERUSER_NAME: &str = "crate";

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Bypasses all privilege checks
    Superuser,
}

/// A user
///
/// Immutable once built; a privilege change produces a new `User` in a new
/// directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    name: String,
    roles: BTreeSet<UserRole>,
    privileges: UserPrivileges,
}

impl User {
    pub fn new(name: impl Into<String>, roles: BTreeSet<UserRole>, privileges: UserPrivileges) -> Self {
        User {
            name: name.into(),
            roles,
            privileges,
        }
    }

    /// Regular user without roles
    pub fn regular(name: impl Into<String>, privileges: UserPrivileges) -> Self {
        User::new(name, BTreeSet::new(), privileges)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.roles
    }

    pub fn privileges(&self) -> &UserPrivileges {
        &self.privileges
    }

    pub fn is_superuser(&self) -> bool {
        self.roles.contains(&UserRole::Superuser)
    }

    /// Exact (type, class, ident) GRANT check
    pub fn has_privilege(&self, privilege_type: PrivilegeType, class: PrivilegeClass, ident: Option<&str>) -> bool {
        self.privileges.has_privilege(privilege_type, class, ident)
    }

    /// Whether the user can see anything at the given scope
    pub fn has_any_privilege(&self, class: PrivilegeClass, ident: Option<&str>) -> bool {
        self.privileges.has_any_privilege(class, ident)
    }
}

/// The built-in superuser; never persisted
pub fn crate_user() -> User {
    User::new(
        SUPERUSER_NAME,
        BTreeSet::from([UserRole::Superuser]),
        UserPrivileges::new(),
    )
}
