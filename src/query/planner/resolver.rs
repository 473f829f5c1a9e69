// Column Name Resolver
//
// This module maps bare column names to the relations defining them and
// qualifies names as `relation.column`.

use std::collections::HashMap;

use crate::catalog::Schema;
use crate::query::executor::result::{QueryError, QueryResult};

/// Split a qualified name at its last `.`; bare names have no relation
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((relation, column)) => (Some(relation), column),
        None => (None, name),
    }
}

/// Inverse mapping from column names to the relations that define them
#[derive(Debug, Clone)]
pub struct SchemaMap {
    columns: HashMap<String, Vec<String>>,
}

impl SchemaMap {
    /// Build the map; relations named by the query sort before the others,
    /// schema order is kept within each group
    pub fn new(schema: &Schema, named: &[String]) -> Self {
        let mut columns: HashMap<String, Vec<String>> = HashMap::new();
        for (relation, fields) in schema.relations() {
            for field in fields {
                columns
                    .entry(field.name().to_string())
                    .or_default()
                    .push(relation.to_string());
            }
        }
        for relations in columns.values_mut() {
            relations.sort_by_key(|relation| !named.contains(relation));
        }
        SchemaMap { columns }
    }

    /// Candidate relations for a bare column name, preferred first
    pub fn candidates(&self, column: &str) -> &[String] {
        self.columns
            .get(column)
            .map(|relations| relations.as_slice())
            .unwrap_or_default()
    }

    /// Qualify a column name; already qualified names are returned as-is
    pub fn resolve(&self, name: &str) -> QueryResult<String> {
        match split_qualified(name) {
            (Some(_), _) => Ok(name.to_string()),
            (None, column) => self
                .candidates(column)
                .first()
                .map(|relation| format!("{}.{}", relation, column))
                .ok_or_else(|| QueryError::UndefinedColumn(name.to_string())),
        }
    }
}
