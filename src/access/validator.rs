//! Statement privilege validation
//!
//! Every analyzed statement maps to one or more requirements:
//! - access-control and cluster administration statements are superuser-only
//! - DDL on an existing table needs DDL on that table, creating objects needs
//!   DDL on the schema, repositories/snapshots/analyzers need cluster DDL
//! - reads and writes walk the relation tree and need DQL/DML on every table
//!   they touch
//!
//! Checks never fall back to a broader scope: a cluster DDL grant does not
//! allow altering a table.

use crate::error::{AccessError, AccessResult};
use crate::session::SessionContext;
use crate::sql::analyzed::{AnalyzedStatement, SetScope};
use crate::sql::ident::TableIdent;
use crate::sql::privileges::PrivilegeType;
use crate::sql::relation::AnalyzedRelation;
use crate::user::User;

use super::Requirement;

/// Check that the session may execute `statement`
///
/// Sessions without a user (authentication disabled) and superusers are
/// always allowed.
pub fn validate(statement: &AnalyzedStatement, session: &SessionContext) -> AccessResult<()> {
    match session.checked_user() {
        Some(user) => validate_for(statement, user),
        None => Ok(()),
    }
}

fn validate_for(statement: &AnalyzedStatement, user: &User) -> AccessResult<()> {
    use AnalyzedStatement::*;
    use PrivilegeType::{Ddl, Dml, Dql};

    match statement {
        CreateUser { .. }
        | DropUser { .. }
        | Privileges(_)
        | OptimizeTable { .. }
        | Reset
        | Kill { .. }
        | Set {
            scope: SetScope::Global,
        } => Requirement::Superuser.check(user),

        AlterTable { table }
        | AddColumn { table }
        | AlterTableOpenClose { table }
        | AlterBlobTable { table }
        | DropTable { table, .. }
        | DropBlobTable { table, .. } => table_requirement(Ddl, table).check(user),
        AlterTableRename { source, .. } => table_requirement(Ddl, source).check(user),

        CreateTable { table } | CreateBlobTable { table } => {
            Requirement::schema(Ddl, &table.schema).check(user)
        }
        CreateFunction { schema, .. } | DropFunction { schema, .. } => {
            Requirement::schema(Ddl, schema).check(user)
        }

        CreateAnalyzer { .. }
        | CreateRepository { .. }
        | DropRepository { .. }
        | CreateSnapshot { .. }
        | DropSnapshot { .. }
        | RestoreSnapshot { .. } => Requirement::cluster(Ddl).check(user),

        CopyFrom { table } | InsertFromValues { table } => table_requirement(Dml, table).check(user),

        ShowCreateTable { table } => table_requirement(Dql, table).check(user),
        RefreshTable { index_names } => index_names.iter().try_for_each(|index_name| {
            table_requirement(Dql, &TableIdent::from_index_name(index_name)).check(user)
        }),

        Set { .. } | Begin => Requirement::cluster(Dql).check(user),

        Select { relation } => validate_relation(relation, Dql, user),
        Update { source } => validate_relation(source, Dml, user),
        Delete { relation } => validate_relation(relation, Dml, user),
        CopyTo { source } => validate_relation(source, Dql, user),
        InsertFromSubQuery { table, sub_query } => {
            table_requirement(Dml, table).check(user)?;
            validate_relation(sub_query, Dql, user)
        }

        Explain(inner) => validate_for(inner, user),

        Unsupported { kind } => {
            tracing::warn!(kind = %kind, "No access policy for statement");
            Err(AccessError::UnsupportedStatement(kind.clone()))
        }
    }
}

/// Check `privilege_type` on every table the relation reads from
fn validate_relation(relation: &AnalyzedRelation, privilege_type: PrivilegeType, user: &User) -> AccessResult<()> {
    match relation {
        AnalyzedRelation::Table { ident } | AnalyzedRelation::DocTable { ident } => {
            table_requirement(privilege_type, ident).check(user)
        }
        AnalyzedRelation::TableFunction { backing, .. } => table_requirement(privilege_type, backing).check(user),
        AnalyzedRelation::MultiSource { sources } => sources
            .iter()
            .try_for_each(|(_, source)| validate_relation(source, privilege_type, user)),
        AnalyzedRelation::QueriedSelect { sub_relation, .. } => {
            validate_relation(sub_relation, privilege_type, user)
        }
    }
}

fn table_requirement(privilege_type: PrivilegeType, table: &TableIdent) -> Requirement {
    Requirement::table(privilege_type, table.fqn())
}
