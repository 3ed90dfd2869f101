//! GRANT / REVOKE statement nodes
//!
//! Produced by the SQL parser:
//! - `GRANT {type,...|ALL} [ON {SCHEMA|TABLE} ident,...] TO name,...`
//! - `REVOKE {type,...|ALL} [ON {SCHEMA|TABLE} ident,...] FROM name,...`
//!
//! `ALL` is expanded by the parser via [`PrivilegeType::expand_all`].

use std::collections::BTreeSet;

use super::privileges::{PrivilegeClass, PrivilegeType};

/// Scope a GRANT/REVOKE applies to; defaults to the whole cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeTarget {
    pub class: PrivilegeClass,
    /// Schema names or table names; empty for cluster
    pub idents: Vec<String>,
}

impl Default for PrivilegeTarget {
    fn default() -> Self {
        PrivilegeTarget {
            class: PrivilegeClass::Cluster,
            idents: Vec::new(),
        }
    }
}

impl PrivilegeTarget {
    pub fn schemas<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrivilegeTarget {
            class: PrivilegeClass::Schema,
            idents: schemas.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrivilegeTarget {
            class: PrivilegeClass::Table,
            idents: tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Idents as stored in privilege records
    ///
    /// Unqualified table names are qualified with `default_schema`; the
    /// cluster target yields a single `None`.
    pub fn resolved_idents(&self, default_schema: &str) -> Vec<Option<String>> {
        match self.class {
            PrivilegeClass::Cluster => vec![None],
            PrivilegeClass::Schema => self.idents.iter().cloned().map(Some).collect(),
            PrivilegeClass::Table => self
                .idents
                .iter()
                .map(|table| {
                    if table.contains('.') {
                        Some(table.clone())
                    } else {
                        Some(format!("{}.{}", default_schema, table))
                    }
                })
                .collect(),
        }
    }
}

/// `GRANT ... TO ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPrivilege {
    pub privilege_types: BTreeSet<PrivilegeType>,
    pub user_names: Vec<String>,
    pub on: PrivilegeTarget,
}

impl GrantPrivilege {
    pub fn new(
        privilege_types: impl IntoIterator<Item = PrivilegeType>,
        user_names: impl IntoIterator<Item = String>,
    ) -> Self {
        GrantPrivilege {
            privilege_types: privilege_types.into_iter().collect(),
            user_names: user_names.into_iter().collect(),
            on: PrivilegeTarget::default(),
        }
    }

    /// `GRANT ALL TO ...`
    pub fn all(user_names: impl IntoIterator<Item = String>) -> Self {
        GrantPrivilege::new(PrivilegeType::expand_all(), user_names)
    }

    #[must_use]
    pub fn on(mut self, target: PrivilegeTarget) -> Self {
        self.on = target;
        self
    }
}

/// `REVOKE ... FROM ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokePrivilege {
    pub privilege_types: BTreeSet<PrivilegeType>,
    pub user_names: Vec<String>,
    pub on: PrivilegeTarget,
}

impl RevokePrivilege {
    pub fn new(
        privilege_types: impl IntoIterator<Item = PrivilegeType>,
        user_names: impl IntoIterator<Item = String>,
    ) -> Self {
        RevokePrivilege {
            privilege_types: privilege_types.into_iter().collect(),
            user_names: user_names.into_iter().collect(),
            on: PrivilegeTarget::default(),
        }
    }

    /// `REVOKE ALL FROM ...`
    pub fn all(user_names: impl IntoIterator<Item = String>) -> Self {
        RevokePrivilege::new(PrivilegeType::expand_all(), user_names)
    }

    #[must_use]
    pub fn on(mut self, target: PrivilegeTarget) -> Self {
        self.on = target;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ident::DEFAULT_SCHEMA;

    #[test]
    fn test_grant_all_expands() {
        let grant = GrantPrivilege::all(vec!["ford".to_string()]);
        assert_eq!(grant.privilege_types.len(), 3);
        assert!(!grant.privilege_types.contains(&PrivilegeType::Dcl));
        assert_eq!(grant.on, PrivilegeTarget::default());
    }

    #[test]
    fn test_resolved_idents() {
        assert_eq!(PrivilegeTarget::default().resolved_idents(DEFAULT_SCHEMA), vec![None]);
        assert_eq!(
            PrivilegeTarget::tables(["users", "sys.cluster"]).resolved_idents("doc"),
            vec![Some("doc.users".to_string()), Some("sys.cluster".to_string())]
        );
        assert_eq!(
            PrivilegeTarget::schemas(["doc"]).resolved_idents("other"),
            vec![Some("doc".to_string())]
        );
    }
}
