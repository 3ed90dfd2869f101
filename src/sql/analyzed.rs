//! Analyzed statements
//!
//! The closed set of statement kinds the access layer decides on. Each
//! variant carries only the identities the privilege checks read.

use std::fmt;

use super::ast::{GrantPrivilege, RevokePrivilege};
use super::ident::TableIdent;
use super::privileges::{Privilege, PrivilegeState, PrivilegeType};
use super::relation::AnalyzedRelation;

/// Scope of a SET statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetScope {
    /// Cluster-wide setting (`SET GLOBAL [PERSISTENT|TRANSIENT]`)
    Global,
    /// `SET SESSION`
    Session,
    /// `SET LOCAL`
    Local,
    /// `SET name = value` without scope keyword
    Default,
}

/// Analyzed GRANT/REVOKE
#[derive(Debug, Clone, PartialEq)]
pub struct PrivilegesStatement {
    pub user_names: Vec<String>,
    pub privileges: Vec<Privilege>,
}

impl PrivilegesStatement {
    pub fn from_grant(grant: &GrantPrivilege, grantor: &str, default_schema: &str) -> Self {
        PrivilegesStatement {
            user_names: grant.user_names.clone(),
            privileges: expand(
                PrivilegeState::Grant,
                grant.privilege_types.iter().copied(),
                &grant.on,
                grantor,
                default_schema,
            ),
        }
    }

    pub fn from_revoke(revoke: &RevokePrivilege, grantor: &str, default_schema: &str) -> Self {
        PrivilegesStatement {
            user_names: revoke.user_names.clone(),
            privileges: expand(
                PrivilegeState::Revoke,
                revoke.privilege_types.iter().copied(),
                &revoke.on,
                grantor,
                default_schema,
            ),
        }
    }
}

// One record per (type, ident)
fn expand(
    state: PrivilegeState,
    types: impl Iterator<Item = PrivilegeType>,
    target: &super::ast::PrivilegeTarget,
    grantor: &str,
    default_schema: &str,
) -> Vec<Privilege> {
    let idents = target.resolved_idents(default_schema);
    types
        .flat_map(|ty| {
            idents
                .iter()
                .map(move |ident| Privilege::new(state, ty, target.class, ident.as_deref(), grantor))
        })
        .collect()
}

/// Analyzed statement
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedStatement {
    // ============ Access control ============
    /// CREATE USER
    CreateUser { user_name: String },
    /// DROP USER
    DropUser { user_name: String, if_exists: bool },
    /// GRANT / REVOKE
    Privileges(PrivilegesStatement),

    // ============ DDL ============
    /// CREATE TABLE
    CreateTable { table: TableIdent },
    /// CREATE BLOB TABLE
    CreateBlobTable { table: TableIdent },
    /// ALTER TABLE ... SET / RESET
    AlterTable { table: TableIdent },
    /// ALTER TABLE ... ADD COLUMN
    AddColumn { table: TableIdent },
    /// ALTER TABLE ... OPEN / CLOSE
    AlterTableOpenClose { table: TableIdent },
    /// ALTER TABLE ... RENAME TO
    AlterTableRename {
        source: TableIdent,
        target: TableIdent,
    },
    /// ALTER BLOB TABLE
    AlterBlobTable { table: TableIdent },
    /// DROP TABLE
    DropTable { table: TableIdent, if_exists: bool },
    /// DROP BLOB TABLE
    DropBlobTable { table: TableIdent, if_exists: bool },
    /// CREATE FUNCTION
    CreateFunction { schema: String, name: String },
    /// DROP FUNCTION
    DropFunction { schema: String, name: String },
    /// CREATE ANALYZER
    CreateAnalyzer { name: String },
    /// CREATE REPOSITORY
    CreateRepository { name: String },
    /// DROP REPOSITORY
    DropRepository { name: String },
    /// CREATE SNAPSHOT
    CreateSnapshot { repository: String, name: String },
    /// DROP SNAPSHOT
    DropSnapshot { repository: String, name: String },
    /// RESTORE SNAPSHOT
    RestoreSnapshot { repository: String, name: String },

    // ============ DML / DQL ============
    /// SELECT
    Select { relation: AnalyzedRelation },
    /// INSERT ... VALUES
    InsertFromValues { table: TableIdent },
    /// INSERT ... SELECT
    InsertFromSubQuery {
        table: TableIdent,
        sub_query: AnalyzedRelation,
    },
    /// UPDATE
    Update { source: AnalyzedRelation },
    /// DELETE
    Delete { relation: AnalyzedRelation },
    /// COPY ... FROM
    CopyFrom { table: TableIdent },
    /// COPY ... TO
    CopyTo { source: AnalyzedRelation },
    /// SHOW CREATE TABLE
    ShowCreateTable { table: TableIdent },
    /// REFRESH TABLE; names are index names, possibly partitions
    RefreshTable { index_names: Vec<String> },

    // ============ Administration ============
    /// OPTIMIZE TABLE
    OptimizeTable { tables: Vec<TableIdent> },
    /// SET
    Set { scope: SetScope },
    /// RESET GLOBAL
    Reset,
    /// KILL [ALL | job_id]
    Kill { job_id: Option<String> },
    /// BEGIN
    Begin,
    /// EXPLAIN <statement>
    Explain(Box<AnalyzedStatement>),

    /// Statement kind without an access policy; always rejected
    Unsupported { kind: String },
}

impl AnalyzedStatement {
    pub fn explain(statement: AnalyzedStatement) -> Self {
        AnalyzedStatement::Explain(Box::new(statement))
    }

    /// Short statement name for logs and errors
    pub fn kind(&self) -> &str {
        match self {
            AnalyzedStatement::CreateUser { .. } => "CreateUser",
            AnalyzedStatement::DropUser { .. } => "DropUser",
            AnalyzedStatement::Privileges(_) => "Privileges",
            AnalyzedStatement::CreateTable { .. } => "CreateTable",
            AnalyzedStatement::CreateBlobTable { .. } => "CreateBlobTable",
            AnalyzedStatement::AlterTable { .. } => "AlterTable",
            AnalyzedStatement::AddColumn { .. } => "AddColumn",
            AnalyzedStatement::AlterTableOpenClose { .. } => "AlterTableOpenClose",
            AnalyzedStatement::AlterTableRename { .. } => "AlterTableRename",
            AnalyzedStatement::AlterBlobTable { .. } => "AlterBlobTable",
            AnalyzedStatement::DropTable { .. } => "DropTable",
            AnalyzedStatement::DropBlobTable { .. } => "DropBlobTable",
            AnalyzedStatement::CreateFunction { .. } => "CreateFunction",
            AnalyzedStatement::DropFunction { .. } => "DropFunction",
            AnalyzedStatement::CreateAnalyzer { .. } => "CreateAnalyzer",
            AnalyzedStatement::CreateRepository { .. } => "CreateRepository",
            AnalyzedStatement::DropRepository { .. } => "DropRepository",
            AnalyzedStatement::CreateSnapshot { .. } => "CreateSnapshot",
            AnalyzedStatement::DropSnapshot { .. } => "DropSnapshot",
            AnalyzedStatement::RestoreSnapshot { .. } => "RestoreSnapshot",
            AnalyzedStatement::Select { .. } => "Select",
            AnalyzedStatement::InsertFromValues { .. } => "InsertFromValues",
            AnalyzedStatement::InsertFromSubQuery { .. } => "InsertFromSubQuery",
            AnalyzedStatement::Update { .. } => "Update",
            AnalyzedStatement::Delete { .. } => "Delete",
            AnalyzedStatement::CopyFrom { .. } => "CopyFrom",
            AnalyzedStatement::CopyTo { .. } => "CopyTo",
            AnalyzedStatement::ShowCreateTable { .. } => "ShowCreateTable",
            AnalyzedStatement::RefreshTable { .. } => "RefreshTable",
            AnalyzedStatement::OptimizeTable { .. } => "OptimizeTable",
            AnalyzedStatement::Set { .. } => "Set",
            AnalyzedStatement::Reset => "Reset",
            AnalyzedStatement::Kill { .. } => "Kill",
            AnalyzedStatement::Begin => "Begin",
            AnalyzedStatement::Explain(_) => "Explain",
            AnalyzedStatement::Unsupported { kind } => kind,
        }
    }
}

impl fmt::Display for AnalyzedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
