//! Privilege model
//!
//! Privileges are granted at three nested scopes:
//! - Cluster: everything
//! - Schema: `doc` - all tables of one schema
//! - Table: `doc.users` - one fully qualified table
//!
//! Typed checks (`has_privilege`) require a record at exactly the requested
//! scope. The scope hierarchy is only consulted for visibility
//! (`has_any_privilege`), where the most specific record wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Privilege types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrivilegeType {
    /// Read data
    Dql,
    /// Modify data
    Dml,
    /// Modify schema objects
    Ddl,
    /// Modify users and privileges
    Dcl,
}

impl PrivilegeType {
    /// All types, in declaration order
    pub const VALUES: [PrivilegeType; 4] = [
        PrivilegeType::Dql,
        PrivilegeType::Dml,
        PrivilegeType::Ddl,
        PrivilegeType::Dcl,
    ];

    /// Parse privilege type from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DQL" => Some(PrivilegeType::Dql),
            "DML" => Some(PrivilegeType::Dml),
            "DDL" => Some(PrivilegeType::Ddl),
            "DCL" => Some(PrivilegeType::Dcl),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            PrivilegeType::Dql => "DQL",
            PrivilegeType::Dml => "DML",
            PrivilegeType::Ddl => "DDL",
            PrivilegeType::Dcl => "DCL",
        }
    }

    /// Expansion of the ALL shorthand
    ///
    /// DCL is not part of it: access control changes stay with superusers.
    pub fn expand_all() -> Vec<PrivilegeType> {
        vec![PrivilegeType::Dql, PrivilegeType::Dml, PrivilegeType::Ddl]
    }
}

impl fmt::Display for PrivilegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Scope a privilege applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrivilegeClass {
    Cluster,
    Schema,
    Table,
}

impl PrivilegeClass {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CLUSTER" => Some(PrivilegeClass::Cluster),
            "SCHEMA" => Some(PrivilegeClass::Schema),
            "TABLE" => Some(PrivilegeClass::Table),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            PrivilegeClass::Cluster => "CLUSTER",
            PrivilegeClass::Schema => "SCHEMA",
            PrivilegeClass::Table => "TABLE",
        }
    }
}

impl fmt::Display for PrivilegeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Privilege state
///
/// `Revoke` only travels inside write requests; stored records are
/// always `Grant` or `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrivilegeState {
    Grant,
    Deny,
    Revoke,
}

/// Key of a privilege record: (type, class, ident)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrivilegeIdent {
    pub privilege_type: PrivilegeType,
    pub class: PrivilegeClass,
    pub ident: Option<String>,
}

impl PrivilegeIdent {
    pub fn new(privilege_type: PrivilegeType, class: PrivilegeClass, ident: Option<&str>) -> Self {
        PrivilegeIdent {
            privilege_type,
            class,
            ident: ident.map(str::to_string),
        }
    }
}

/// A privilege record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Privilege {
    pub state: PrivilegeState,
    pub privilege_type: PrivilegeType,
    pub class: PrivilegeClass,
    /// `None` for cluster, schema name for schema, `schema.table` for table
    pub ident: Option<String>,
    /// Superuser that issued the privilege
    pub grantor: String,
}

impl Privilege {
    pub fn new(
        state: PrivilegeState,
        privilege_type: PrivilegeType,
        class: PrivilegeClass,
        ident: Option<&str>,
        grantor: impl Into<String>,
    ) -> Self {
        Privilege {
            state,
            privilege_type,
            class,
            ident: ident.map(str::to_string),
            grantor: grantor.into(),
        }
    }

    /// Cluster-wide GRANT of one type
    pub fn cluster_grant(privilege_type: PrivilegeType, grantor: impl Into<String>) -> Self {
        Privilege::new(
            PrivilegeState::Grant,
            privilege_type,
            PrivilegeClass::Cluster,
            None,
            grantor,
        )
    }

    pub fn key(&self) -> PrivilegeIdent {
        PrivilegeIdent {
            privilege_type: self.privilege_type,
            class: self.class,
            ident: self.ident.clone(),
        }
    }
}

/// Scope chain used for visibility checks, most specific first
///
/// `(Table, "doc.users")` yields table `doc.users`, schema `doc`, cluster.
pub fn scope_chain(class: PrivilegeClass, ident: Option<&str>) -> Vec<(PrivilegeClass, Option<String>)> {
    let mut chain = Vec::with_capacity(3);
    match (class, ident) {
        (PrivilegeClass::Table, Some(table)) => {
            chain.push((PrivilegeClass::Table, Some(table.to_string())));
            if let Some((schema, _)) = table.split_once('.') {
                chain.push((PrivilegeClass::Schema, Some(schema.to_string())));
            }
        }
        (PrivilegeClass::Schema, Some(schema)) => {
            chain.push((PrivilegeClass::Schema, Some(schema.to_string())));
        }
        // Cluster, or a scoped class without ident: only the cluster level applies
        _ => {}
    }
    chain.push((PrivilegeClass::Cluster, None));
    chain
}

/// Privilege records of one user, keyed by (type, class, ident)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserPrivileges {
    records: BTreeMap<PrivilegeIdent, Privilege>,
}

impl UserPrivileges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_privileges(privileges: impl IntoIterator<Item = Privilege>) -> Self {
        let mut set = Self::new();
        for privilege in privileges {
            set.apply(&privilege);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Privilege> {
        self.records.values()
    }

    pub fn get(&self, key: &PrivilegeIdent) -> Option<&Privilege> {
        self.records.get(key)
    }

    /// Apply a GRANT, DENY or REVOKE; returns whether the stored state changed
    pub fn apply(&mut self, privilege: &Privilege) -> bool {
        let key = privilege.key();
        match privilege.state {
            PrivilegeState::Revoke => self.records.remove(&key).is_some(),
            PrivilegeState::Grant | PrivilegeState::Deny => {
                match self.records.get(&key) {
                    Some(existing) if existing.state == privilege.state => false,
                    _ => {
                        self.records.insert(key, privilege.clone());
                        true
                    }
                }
            }
        }
    }

    /// Exact-scope typed check; DCL is never satisfied by a record
    pub fn has_privilege(&self, privilege_type: PrivilegeType, class: PrivilegeClass, ident: Option<&str>) -> bool {
        if privilege_type == PrivilegeType::Dcl {
            return false;
        }
        let key = PrivilegeIdent::new(privilege_type, class, ident);
        matches!(self.records.get(&key), Some(p) if p.state == PrivilegeState::Grant)
    }

    /// Visibility check: any non-DCL type whose most specific record along
    /// the scope chain is a GRANT
    pub fn has_any_privilege(&self, class: PrivilegeClass, ident: Option<&str>) -> bool {
        let chain = scope_chain(class, ident);
        PrivilegeType::VALUES
            .iter()
            .filter(|ty| **ty != PrivilegeType::Dcl)
            .any(|ty| {
                chain
                    .iter()
                    .find_map(|(class, ident)| {
                        self.records
                            .get(&PrivilegeIdent::new(*ty, *class, ident.as_deref()))
                    })
                    .is_some_and(|p| p.state == PrivilegeState::Grant)
            })
    }
}
