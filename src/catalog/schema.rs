// Schema Management Module
//
// This module defines the DataType of profile fields and the Schema, the
// ordered mapping from relation names to their fields. Schemas are usually
// read from a profile's relations file.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use linked_hash_map::LinkedHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::query::executor::result::{QueryError, QueryResult};

/// Datatypes of profile fields
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    String,
    Date,
    /// Any other tag (e.g. `:float`), values are kept as strings
    Other(String),
}

impl DataType {
    /// Convert a relations-file tag (e.g. `:integer`) to a DataType
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            ":integer" => DataType::Integer,
            ":string" => DataType::String,
            ":date" => DataType::Date,
            other => DataType::Other(other.to_string()),
        }
    }

    /// Get the relations-file tag
    pub fn tag(&self) -> &str {
        match self {
            DataType::Integer => ":integer",
            DataType::String => ":string",
            DataType::Date => ":date",
            DataType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ordered mapping from relation name to its ordered fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    relations: LinkedHashMap<String, Vec<Field>>,
}

static RELATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<relation>\w\S*):$").expect("static relation pattern"));

static FIELD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^\s#]+)(?:\s+(?P<attrs>[^#]+))?(?:\s*#\s*(?P<comment>.*))?$")
        .expect("static field pattern")
});

impl Schema {
    /// Create a new, empty schema
    pub fn new() -> Self {
        Schema {
            relations: LinkedHashMap::new(),
        }
    }

    /// Add a relation; relation names and field names within it must be unique
    pub fn add_relation(&mut self, name: impl Into<String>, fields: Vec<Field>) -> QueryResult<()> {
        let name = name.into();
        if self.relations.contains_key(&name) {
            return Err(QueryError::Schema(format!("relation {} already defined", name)));
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(QueryError::Schema(format!(
                    "field {} defined twice in relation {}",
                    field.name(),
                    name
                )));
            }
        }
        self.relations.insert(name, fields);
        Ok(())
    }

    /// Builder-style variant of `add_relation`
    pub fn with_relation(mut self, name: impl Into<String>, fields: Vec<Field>) -> QueryResult<Self> {
        self.add_relation(name, fields)?;
        Ok(self)
    }

    /// Check if a relation exists
    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Get the fields of a relation
    pub fn relation(&self, name: &str) -> Option<&[Field]> {
        self.relations.get(name).map(|fields| fields.as_slice())
    }

    /// Get the fields of a relation or fail with `UnknownRelation`
    pub fn fields(&self, name: &str) -> QueryResult<&[Field]> {
        self.relation(name)
            .ok_or_else(|| QueryError::UnknownRelation(name.to_string()))
    }

    /// Iterate relations in schema order
    pub fn relations(&self) -> impl Iterator<Item = (&str, &[Field])> {
        self.relations
            .iter()
            .map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }

    /// Relation names in schema order
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(|name| name.as_str())
    }

    /// Names of the key fields of a relation
    pub fn keys(&self, name: &str) -> Vec<&str> {
        self.relation(name)
            .map(|fields| {
                fields
                    .iter()
                    .filter(|f| f.is_key())
                    .map(|f| f.name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Position of a field within its relation
    pub fn field_index(&self, relation: &str, field: &str) -> Option<usize> {
        self.relation(relation)?
            .iter()
            .position(|f| f.name() == field)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Parse a relations file, e.g.
    ///
    /// ```text
    /// item:
    ///   i-id :integer :key
    ///   i-input :string                     # the test sentence
    /// ```
    pub fn from_relations_str(s: &str) -> QueryResult<Self> {
        let mut schema = Schema::new();
        let mut current: Option<(String, Vec<Field>)> = None;

        for (lineno, raw_line) in s.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(caps) = RELATION_LINE.captures(line) {
                if let Some((name, fields)) = current.take() {
                    schema.add_relation(name, fields)?;
                }
                current = Some((caps["relation"].to_string(), Vec::new()));
                continue;
            }
            let (caps, fields) = match (FIELD_LINE.captures(line), current.as_mut()) {
                (Some(caps), Some((_, fields))) => (caps, fields),
                _ => {
                    return Err(QueryError::Schema(format!(
                        "invalid line {}: {}",
                        lineno + 1,
                        line
                    )))
                }
            };
            let mut attrs = caps
                .name("attrs")
                .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>())
                .unwrap_or_default()
                .into_iter();
            let datatype = attrs.next().ok_or_else(|| {
                QueryError::Schema(format!("missing datatype on line {}: {}", lineno + 1, line))
            })?;
            let attrs: Vec<&str> = attrs.collect();
            let comment = caps
                .name("comment")
                .map(|m| m.as_str().trim().to_string())
                .filter(|c| !c.is_empty());
            fields.push(Field::new(
                &caps["name"],
                DataType::from_tag(datatype),
                attrs.contains(&":key"),
                attrs.contains(&":partial"),
                comment,
            ));
        }

        if let Some((name, fields)) = current.take() {
            schema.add_relation(name, fields)?;
        }
        Ok(schema)
    }

    /// Read and parse a relations file from disk
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            QueryError::Schema(format!("cannot read relations file {}: {}", path.display(), e))
        })?;
        Schema::from_relations_str(&text)
    }
}

impl FromStr for Schema {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Schema::from_relations_str(s)
    }
}

/// Renders the schema in relations-file format.
impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, fields)) in self.relations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", name)?;
            for field in fields {
                writeln!(f, "{}", field)?;
            }
        }
        Ok(())
    }
}
