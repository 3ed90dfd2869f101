//! Analyzed relations
//!
//! Only the shape of the relation tree and the identities of its leaves are
//! modelled here; the analyzer owns everything else.

use super::ident::{QualifiedName, TableIdent};

/// Relation tree produced by the analyzer
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedRelation {
    /// System or information schema table (`sys.cluster`)
    Table { ident: TableIdent },
    /// Document table
    DocTable { ident: TableIdent },
    /// Table function (`unnest(...)`); checked against its backing table
    TableFunction {
        function: String,
        backing: TableIdent,
    },
    /// Join over several named sources
    MultiSource {
        sources: Vec<(QualifiedName, AnalyzedRelation)>,
    },
    /// Derived relation (`select ... from (select ...) t1`)
    QueriedSelect {
        alias: Option<QualifiedName>,
        sub_relation: Box<AnalyzedRelation>,
    },
}

impl AnalyzedRelation {
    pub fn table(ident: TableIdent) -> Self {
        AnalyzedRelation::Table { ident }
    }

    pub fn doc_table(ident: TableIdent) -> Self {
        AnalyzedRelation::DocTable { ident }
    }

    pub fn queried(alias: Option<&str>, sub_relation: AnalyzedRelation) -> Self {
        AnalyzedRelation::QueriedSelect {
            alias: alias.map(QualifiedName::parse),
            sub_relation: Box::new(sub_relation),
        }
    }

    /// Join over the given sources
    pub fn join(sources: Vec<(QualifiedName, AnalyzedRelation)>) -> Self {
        AnalyzedRelation::MultiSource { sources }
    }
}
