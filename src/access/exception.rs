//! Not-found error remapping
//!
//! Errors such as "relation unknown" or "repository already exists" tell the
//! client whether an object exists. A user without any privilege at the
//! scope of the object gets a privilege denial instead. Scopes:
//!
//! | error | scope |
//! |---|---|
//! | table / relation unknown, table already exists | schema (session default if unqualified) |
//! | schema unknown | cluster |
//! | column / partition unknown | table |
//! | analyzer / repository / snapshot errors | cluster |
//! | function errors, table alias collisions | schema |

use crate::error::AccessError;
use crate::session::SessionContext;
use crate::sql::error::SqlError;
use crate::sql::privileges::PrivilegeClass;
use crate::user::User;

/// Remap `error` for the session's user
///
/// Returns the error unchanged for sessions without a user, superusers,
/// users with a privilege at the error's scope and errors that reveal
/// nothing (including denials, so remapping twice is a no-op).
pub fn remap(error: SqlError, session: &SessionContext) -> SqlError {
    let Some(user) = session.checked_user() else {
        return error;
    };
    let Some((class, ident)) = error_scope(&error, session.default_schema()) else {
        return error;
    };
    if user.has_any_privilege(class, ident.as_deref()) {
        error
    } else {
        deny(user, &error)
    }
}

fn deny(user: &User, error: &SqlError) -> SqlError {
    tracing::debug!(user = %user.name(), error = %error, "Hiding object from user without privileges");
    SqlError::Access(AccessError::missing_any_privilege(user.name()))
}

/// Scope a revealing error refers to; `None` for everything else
fn error_scope(error: &SqlError, default_schema: &str) -> Option<(PrivilegeClass, Option<String>)> {
    let schema = |name: &str| Some((PrivilegeClass::Schema, Some(name.to_string())));
    let cluster = || Some((PrivilegeClass::Cluster, None));

    match error {
        SqlError::TableUnknown(ident) => match ident.split_once('.') {
            Some((name, _)) => schema(name),
            None => schema(default_schema),
        },
        SqlError::RelationUnknown(name) => schema(name.schema().unwrap_or(default_schema)),
        SqlError::SchemaUnknown(_) => cluster(),
        SqlError::ColumnUnknown { table, .. } | SqlError::PartitionUnknown { table, .. } => {
            Some((PrivilegeClass::Table, Some(table.fqn())))
        }
        SqlError::AnalyzerUnknown(_) | SqlError::RepositoryUnknown(_) | SqlError::SnapshotUnknown { .. } => {
            cluster()
        }
        SqlError::UserDefinedFunctionUnknown { schema: name, .. } => schema(name),
        SqlError::TableAlreadyExists { schema: name, .. } => schema(name.as_deref().unwrap_or(default_schema)),
        SqlError::RepositoryAlreadyExists(_) | SqlError::SnapshotAlreadyExists { .. } => cluster(),
        SqlError::UserDefinedFunctionAlreadyExists { schema: name, .. }
        | SqlError::TableAliasSchema { schema: name, .. } => schema(name),
        SqlError::Access(_) | SqlError::Other(_) => None,
    }
}
