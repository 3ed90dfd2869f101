//! Replicated metadata sections
//!
//! Users and their privileges are stored in two independent sections of the
//! cluster metadata. A change notification carries whichever sections are
//! present; a missing section means "no users" / "no privileges".

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AccessResult;
use crate::sql::privileges::{Privilege, UserPrivileges};

/// Names of all persisted (non built-in) users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersMetadata {
    users: BTreeSet<String>,
}

impl UsersMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UsersMetadata {
            users: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains(name)
    }

    /// Returns false if the name was already present
    pub fn add(&mut self, name: &str) -> bool {
        self.users.insert(name.to_string())
    }

    /// Returns false if the name was absent
    pub fn remove(&mut self, name: &str) -> bool {
        self.users.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn encode(&self) -> AccessResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> AccessResult<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Privilege records per user name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPrivilegesMetadata {
    privileges: BTreeMap<String, UserPrivileges>,
}

impl UsersPrivilegesMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_privileges(&self, name: &str) -> Option<&UserPrivileges> {
        self.privileges.get(name)
    }

    pub fn set_user_privileges(&mut self, name: &str, privileges: UserPrivileges) {
        self.privileges.insert(name.to_string(), privileges);
    }

    /// Apply one privilege to one user; returns whether the stored state changed
    pub fn apply(&mut self, name: &str, privilege: &Privilege) -> bool {
        let changed = self
            .privileges
            .entry(name.to_string())
            .or_default()
            .apply(privilege);
        if self.privileges.get(name).is_some_and(UserPrivileges::is_empty) {
            self.privileges.remove(name);
        }
        changed
    }

    pub fn drop_user(&mut self, name: &str) -> Option<UserPrivileges> {
        self.privileges.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserPrivileges)> {
        self.privileges.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn encode(&self) -> AccessResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> AccessResult<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Metadata-changed notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataChanged {
    /// Store version that produced this notification; 0 before any write
    pub version: u64,
    pub users: Option<UsersMetadata>,
    pub privileges: Option<UsersPrivilegesMetadata>,
}
