// Query Result Implementation
//
// This module defines the error type of the query engine and the Selection,
// the materialized result of a TSQL select query.

use std::collections::{HashMap, HashSet};
use std::slice;

use thiserror::Error;

use crate::catalog::Field;
use crate::query::parser::ParseError;
use crate::storage::Record;

/// Represents query execution error
#[derive(Error, Debug)]
pub enum QueryError {
    /// Malformed or unsupported query text
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),
    /// A bare column name that no relation defines
    #[error("Undefined column: {0}")]
    UndefinedColumn(String),
    /// A relation missing from the schema
    #[error("Unknown relation: {0}")]
    UnknownRelation(String),
    /// A relation shares no key with the relations already joined
    #[error("No shared keys for joining: {0}")]
    NoSharedKeys(String),
    /// A relation was joined twice
    #[error("Cannot join the same relation twice: {0}")]
    DuplicateJoin(String),
    /// Join mode other than inner or left
    #[error("Only 'inner' and 'left' join methods are allowed, got: {0}")]
    InvalidJoinMode(String),
    /// Disjoint relation sets with no single relation to bridge them
    #[error("Could not find relation to join: {0}")]
    NoPivotRelation(String),
    /// No remaining relation could be placed in the join order
    #[error("Infinite loop detected while ordering joins: {0}")]
    JoinOrderLoop(String),
    /// A `~`/`!~` pattern that does not compile
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),
    /// Error in data type conversion
    #[error("Type error: {0}")]
    TypeError(String),
    /// Malformed schema or row shape
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// The results of a select query
///
/// Rows hold every column fetched by the joins; the projection picks and
/// orders the columns yielded by iteration. Iterating again re-projects the
/// materialized rows without re-running any join.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Accumulated fields of all joined relations
    fields: Vec<Field>,
    /// Bare and `relation.column` names to positions in `fields`
    field_index: HashMap<String, usize>,
    /// Joined rows
    data: Vec<Record>,
    /// Requested projection, once finalized
    projection: Option<Vec<String>>,
    projection_indices: Vec<usize>,
    /// Relations joined so far
    joined: HashSet<String>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all accumulated fields
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get the fields in projection order
    pub fn projected_fields(&self) -> Vec<&Field> {
        match &self.projection {
            Some(_) => self
                .projection_indices
                .iter()
                .map(|&i| &self.fields[i])
                .collect(),
            None => self.fields.iter().collect(),
        }
    }

    /// Get the projection, if one has been set
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Position of a bare or qualified column name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    pub(crate) fn field_index(&self) -> &HashMap<String, usize> {
        &self.field_index
    }

    /// Check if a relation has been joined
    pub fn is_joined(&self, relation: &str) -> bool {
        self.joined.contains(relation)
    }

    /// Check if any relation has been joined yet
    pub fn has_joins(&self) -> bool {
        !self.joined.is_empty()
    }

    /// Get the joined rows with every accumulated column
    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate rows in projection order
    pub fn rows(&self) -> Rows<'_> {
        let indices = match &self.projection {
            Some(_) => self.projection_indices.clone(),
            None => (0..self.fields.len()).collect(),
        };
        Rows::new(&self.data, indices)
    }

    /// Iterate rows re-projected to `names`; no names means all fields
    pub fn select(&self, names: &[&str]) -> QueryResult<Rows<'_>> {
        let indices = if names.is_empty() {
            (0..self.fields.len()).collect()
        } else {
            self.resolve_indices(names.iter().copied())?
        };
        Ok(Rows::new(&self.data, indices))
    }

    fn resolve_indices<'a, I>(&self, names: I) -> QueryResult<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| {
                self.index_of(name)
                    .ok_or_else(|| QueryError::UndefinedColumn(name.to_string()))
            })
            .collect()
    }

    /// Append the fields of a newly joined relation
    ///
    /// Bare names keep pointing at their first occurrence; qualified names
    /// are added for every new field and for the `on` fields shared with
    /// earlier relations.
    pub(crate) fn merge_fields(&mut self, relation: &str, on: &[String], fields: Vec<Field>) {
        let offset = self.fields.len();
        for (i, field) in fields.into_iter().enumerate() {
            let position = offset + i;
            self.field_index
                .entry(field.name().to_string())
                .or_insert(position);
            self.field_index
                .insert(format!("{}.{}", relation, field.name()), position);
            self.fields.push(field);
        }
        for name in on {
            if let Some(&position) = self.field_index.get(name) {
                self.field_index
                    .insert(format!("{}.{}", relation, name), position);
            }
        }
        self.joined.insert(relation.to_string());
    }

    pub(crate) fn set_data(&mut self, data: Vec<Record>) {
        self.data = data;
    }

    pub(crate) fn take_data(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.data)
    }

    /// Keep only rows matching `predicate`
    pub(crate) fn retain<F>(&mut self, predicate: F)
    where
        F: Fn(&[crate::common::Value]) -> bool,
    {
        self.data.retain(|row| predicate(row.as_slice()));
    }

    /// Finalize the projection; every name must resolve
    pub(crate) fn set_projection(&mut self, projection: Vec<String>) -> QueryResult<()> {
        self.projection_indices = self.resolve_indices(projection.iter().map(String::as_str))?;
        self.projection = Some(projection);
        Ok(())
    }

    /// Format the selection as a string table
    pub fn to_string_table(&self) -> String {
        let headers: Vec<String> = match &self.projection {
            Some(projection) => projection.clone(),
            None => self.fields.iter().map(|f| f.name().to_string()).collect(),
        };
        if headers.is_empty() {
            return "Empty result".to_string();
        }

        let mut result = String::new();
        result.push_str("| ");
        for header in &headers {
            result.push_str(&format!("{} | ", header));
        }
        result.push('\n');

        result.push('|');
        for header in &headers {
            result.push_str(&format!("{}|", "-".repeat(header.len() + 2)));
        }
        result.push('\n');

        for row in self.rows() {
            result.push_str("| ");
            for value in row {
                result.push_str(&format!("{} | ", value));
            }
            result.push('\n');
        }
        result
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = Record;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

/// Iterator over projected rows of a Selection
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    rows: slice::Iter<'a, Record>,
    indices: Vec<usize>,
}

impl<'a> Rows<'a> {
    fn new(data: &'a [Record], indices: Vec<usize>) -> Self {
        Rows {
            rows: data.iter(),
            indices,
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let row = self.rows.next()?;
        Some(self.indices.iter().map(|&i| row[i].clone()).collect())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Rows<'_> {}
