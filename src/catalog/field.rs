// Field Definition Module
//
// This module defines the Field type that describes one column of a profile
// relation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::DataType;

/// Represents a column in a profile relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    name: String,
    /// Column datatype
    datatype: DataType,
    /// Whether this column joins across relations
    is_key: bool,
    /// Whether this column is a partial key
    is_partial_key: bool,
    /// Free-text description from the relations file
    comment: Option<String>,
}

impl Field {
    /// Create a new field
    pub fn new(
        name: impl Into<String>,
        datatype: DataType,
        is_key: bool,
        is_partial_key: bool,
        comment: Option<String>,
    ) -> Self {
        Field {
            name: name.into(),
            datatype,
            is_key,
            is_partial_key,
            comment,
        }
    }

    /// Shorthand for a key field without a comment
    pub fn key(name: impl Into<String>, datatype: DataType) -> Self {
        Field::new(name, datatype, true, false, None)
    }

    /// Shorthand for a non-key field without a comment
    pub fn column(name: impl Into<String>, datatype: DataType) -> Self {
        Field::new(name, datatype, false, false, None)
    }

    /// Get the field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field datatype
    pub fn datatype(&self) -> &DataType {
        &self.datatype
    }

    /// Check if the field is a key
    pub fn is_key(&self) -> bool {
        self.is_key
    }

    /// Check if the field is a partial key
    pub fn is_partial_key(&self) -> bool {
        self.is_partial_key
    }

    /// Get the comment (if any)
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Renders the relations-file line for this field.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = format!("  {} {}", self.name, self.datatype);
        if self.is_key {
            line.push_str(" :key");
        }
        if self.is_partial_key {
            line.push_str(" :partial");
        }
        match &self.comment {
            Some(comment) if !comment.is_empty() => write!(f, "{:<40}# {}", line, comment),
            _ => write!(f, "{}", line),
        }
    }
}
