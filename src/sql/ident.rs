//! Table and relation identifiers
//!
//! Tables live in schemas. Unqualified names resolve against the session's
//! default schema (`doc` unless configured otherwise).
//!
//! Partitioned tables store each partition in its own index named
//! `.partitioned.<table>.<ident>` (default schema) or
//! `<schema>..partitioned.<table>.<ident>`. An empty ident denotes the
//! partition template.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default schema name
pub const DEFAULT_SCHEMA: &str = "doc";

const PARTITIONED_TABLE_PREFIX: &str = ".partitioned.";
const SCHEMA_PARTITIONED_MARKER: &str = "..partitioned.";

/// Fully qualified table identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableIdent {
    pub schema: String,
    pub name: String,
}

impl TableIdent {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableIdent {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Table in the default schema
    pub fn doc(name: impl Into<String>) -> Self {
        TableIdent::new(DEFAULT_SCHEMA, name)
    }

    /// Resolve the table an index belongs to
    ///
    /// Partition indices map to their partitioned table, `schema.table`
    /// splits at the first dot, anything else lives in the default schema.
    pub fn from_index_name(index_name: &str) -> Self {
        if let Some(partition) = PartitionName::from_index_or_template(index_name) {
            return partition.table;
        }
        match index_name.split_once('.') {
            Some((schema, name)) => TableIdent::new(schema, name),
            None => TableIdent::doc(index_name),
        }
    }

    /// `schema.name`
    pub fn fqn(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Dotted name as written in the statement (`t`, `s.t`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QualifiedName {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a dotted string
    pub fn parse(name: &str) -> Self {
        QualifiedName::new(name.split('.'))
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Explicit schema part, if the name has more than one part
    pub fn schema(&self) -> Option<&str> {
        if self.parts.len() > 1 {
            self.parts.first().map(String::as_str)
        } else {
            None
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl From<&TableIdent> for QualifiedName {
    fn from(ident: &TableIdent) -> Self {
        QualifiedName::new([ident.schema.as_str(), ident.name.as_str()])
    }
}

/// Decoded partition index name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionName {
    pub table: TableIdent,
    /// Encoded partition values; empty for the template
    pub ident: String,
}

impl PartitionName {
    /// Whether an index name denotes a partition (or partition template)
    pub fn is_partition(index_name: &str) -> bool {
        Self::from_index_or_template(index_name).is_some()
    }

    pub fn from_index_or_template(index_name: &str) -> Option<Self> {
        let (schema, rest) = if let Some(rest) = index_name.strip_prefix(PARTITIONED_TABLE_PREFIX) {
            (DEFAULT_SCHEMA, rest)
        } else {
            let pos = index_name.find(SCHEMA_PARTITIONED_MARKER)?;
            (
                &index_name[..pos],
                &index_name[pos + SCHEMA_PARTITIONED_MARKER.len()..],
            )
        };
        let (table, ident) = rest.split_once('.')?;
        if schema.is_empty() || table.is_empty() {
            return None;
        }
        Some(PartitionName {
            table: TableIdent::new(schema, table),
            ident: ident.to_string(),
        })
    }

    pub fn is_template(&self) -> bool {
        self.ident.is_empty()
    }
}
