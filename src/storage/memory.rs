// In-Memory Database
//
// A Database backed by vectors of already-typed records, one per relation.

use std::collections::HashMap;

use log::trace;

use super::{Database, Record, Records};
use crate::catalog::Schema;
use crate::common::value::cast;
use crate::query::executor::result::{QueryError, QueryResult};

/// Profile held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    schema: Schema,
    tables: HashMap<String, Vec<Record>>,
}

impl MemoryDatabase {
    /// Create an empty database for the given schema
    pub fn new(schema: Schema) -> Self {
        let tables = schema
            .relation_names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        MemoryDatabase { schema, tables }
    }

    /// Append a typed row; its arity must match the relation
    pub fn insert(&mut self, relation: &str, row: Record) -> QueryResult<()> {
        let arity = self.schema.fields(relation)?.len();
        if row.len() != arity {
            return Err(QueryError::Schema(format!(
                "relation {} has {} fields but row has {} values",
                relation,
                arity,
                row.len()
            )));
        }
        self.tables.entry(relation.to_string()).or_default().push(row);
        Ok(())
    }

    /// Append a row of raw cells, casting each by its field's datatype
    pub fn insert_raw(&mut self, relation: &str, cells: &[&str]) -> QueryResult<()> {
        let fields = self.schema.fields(relation)?;
        if cells.len() != fields.len() {
            return Err(QueryError::Schema(format!(
                "relation {} has {} fields but row has {} values",
                relation,
                fields.len(),
                cells.len()
            )));
        }
        let row = fields
            .iter()
            .zip(cells)
            .map(|(field, cell)| cast(field.datatype(), cell))
            .collect::<QueryResult<Record>>()?;
        self.insert(relation, row)
    }

    /// Append many typed rows
    pub fn extend<I>(&mut self, relation: &str, rows: I) -> QueryResult<()>
    where
        I: IntoIterator<Item = Record>,
    {
        for row in rows {
            self.insert(relation, row)?;
        }
        Ok(())
    }

    /// Number of rows stored for a relation
    pub fn row_count(&self, relation: &str) -> usize {
        self.tables.get(relation).map_or(0, |rows| rows.len())
    }
}

impl Database for MemoryDatabase {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn select_from<'a>(&'a self, relation: &str, columns: &[String]) -> QueryResult<Records<'a>> {
        let indices = columns
            .iter()
            .map(|col| {
                self.schema
                    .field_index(relation, col)
                    .ok_or_else(|| QueryError::UndefinedColumn(format!("{}.{}", relation, col)))
            })
            .collect::<QueryResult<Vec<usize>>>()?;
        let rows = self
            .tables
            .get(relation)
            .ok_or_else(|| QueryError::UnknownRelation(relation.to_string()))?;
        trace!("select_from {} {:?}: {} rows", relation, columns, rows.len());
        Ok(Box::new(
            rows.iter()
                .map(move |row| indices.iter().map(|&i| row[i].clone()).collect::<Record>()),
        ))
    }
}
