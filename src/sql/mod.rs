//! SQL layer types consumed by access control
//!
//! This module provides:
//! - `privileges`: privilege records and scope matching
//! - `ident`: table identifiers and partition index names
//! - `relation` / `analyzed`: analyzed relations and statements
//! - `ast`: GRANT / REVOKE statement nodes
//! - `error`: errors that may be remapped to privilege denials

pub mod analyzed;
pub mod ast;
pub mod error;
pub mod ident;
pub mod privileges;
pub mod relation;

pub use analyzed::{AnalyzedStatement, PrivilegesStatement, SetScope};
pub use ast::{GrantPrivilege, PrivilegeTarget, RevokePrivilege};
pub use error::{SqlError, SqlResult};
pub use ident::{PartitionName, QualifiedName, TableIdent, DEFAULT_SCHEMA};
pub use privileges::{Privilege, PrivilegeClass, PrivilegeIdent, PrivilegeState, PrivilegeType, UserPrivileges};
pub use relation::AnalyzedRelation;
