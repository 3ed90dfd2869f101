//! SQL error types
//!
//! Errors raised by analysis and execution that reveal whether an object
//! exists. They pass through [`crate::access::exception`] before reaching
//! the client.

use std::fmt;

use crate::error::AccessError;

use super::ident::{QualifiedName, TableIdent};

/// SQL error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// Table not found by its (possibly qualified) name
    TableUnknown(String),
    /// Relation not found during analysis
    RelationUnknown(QualifiedName),
    /// Schema not found
    SchemaUnknown(String),
    /// Column not found in a table
    ColumnUnknown { table: TableIdent, column: String },
    /// Partition not found in a partitioned table
    PartitionUnknown { table: TableIdent, partition: String },
    /// Analyzer not found
    AnalyzerUnknown(String),
    /// Snapshot repository not found
    RepositoryUnknown(String),
    /// Snapshot not found
    SnapshotUnknown { repository: String, snapshot: String },
    /// User defined function not found
    UserDefinedFunctionUnknown { schema: String, name: String },
    /// Table already exists; `schema` is `None` for unqualified names
    TableAlreadyExists { schema: Option<String>, name: String },
    /// Snapshot repository already exists
    RepositoryAlreadyExists(String),
    /// Snapshot already exists
    SnapshotAlreadyExists { repository: String, snapshot: String },
    /// User defined function already exists
    UserDefinedFunctionAlreadyExists { schema: String, name: String },
    /// Table alias collides with a table of the schema
    TableAliasSchema { schema: String, alias: String },
    /// Access control error
    Access(AccessError),
    /// Anything else; never remapped
    Other(String),
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlError::TableUnknown(name) => write!(f, "Relation '{}' unknown", name),
            SqlError::RelationUnknown(name) => write!(f, "Relation '{}' unknown", name),
            SqlError::SchemaUnknown(name) => write!(f, "Schema '{}' unknown", name),
            SqlError::ColumnUnknown { table, column } => {
                write!(f, "Column {} unknown in table '{}'", column, table)
            }
            SqlError::PartitionUnknown { table, partition } => {
                write!(f, "No partition for table '{}' with ident '{}'", table, partition)
            }
            SqlError::AnalyzerUnknown(name) => write!(f, "Analyzer '{}' unknown", name),
            SqlError::RepositoryUnknown(name) => write!(f, "Repository '{}' unknown", name),
            SqlError::SnapshotUnknown {
                repository,
                snapshot,
            } => write!(f, "Snapshot '{}.{}' unknown", repository, snapshot),
            SqlError::UserDefinedFunctionUnknown { schema, name } => {
                write!(f, "Unknown function: {}.{}", schema, name)
            }
            SqlError::TableAlreadyExists { schema, name } => match schema {
                Some(schema) => write!(f, "Relation '{}.{}' already exists.", schema, name),
                None => write!(f, "Relation '{}' already exists.", name),
            },
            SqlError::RepositoryAlreadyExists(name) => {
                write!(f, "Repository '{}' already exists", name)
            }
            SqlError::SnapshotAlreadyExists {
                repository,
                snapshot,
            } => write!(f, "Snapshot '{}.{}' already exists", repository, snapshot),
            SqlError::UserDefinedFunctionAlreadyExists { schema, name } => {
                write!(f, "User defined Function '{}.{}' already exists.", schema, name)
            }
            SqlError::TableAliasSchema { schema, alias } => write!(
                f,
                "The table alias '{}' collides with a table in schema '{}'",
                alias, schema
            ),
            SqlError::Access(e) => write!(f, "{}", e),
            SqlError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SqlError::Access(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AccessError> for SqlError {
    fn from(err: AccessError) -> Self {
        SqlError::Access(err)
    }
}

/// Result type for SQL operations
pub type SqlResult<T> = Result<T, SqlError>;
