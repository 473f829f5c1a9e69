// TSQL Abstract Syntax Tree (AST) Implementation
//
// This module defines the parsed form of a TSQL query.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Value;

/// The kind of query; only selections are supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Select,
}

/// A parsed TSQL query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub projection: Projection,
    /// Relations named in the `from` clause, in order
    pub relations: Vec<String>,
    /// Conjunction of all `where` clauses
    pub condition: Option<Condition>,
}

/// Columns requested by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// All fields of the named relations (`*`)
    Wildcard,
    /// Bare or qualified column names
    Columns(Vec<String>),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// Regex search
    Match,
    /// Negated regex search
    NotMatch,
}

impl ComparisonOp {
    /// Map operator text to an operator; `=` is a synonym of `==`
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" | "=" => Some(ComparisonOp::Equal),
            "!=" => Some(ComparisonOp::NotEqual),
            "<" => Some(ComparisonOp::Less),
            "<=" => Some(ComparisonOp::LessEqual),
            ">" => Some(ComparisonOp::Greater),
            ">=" => Some(ComparisonOp::GreaterEqual),
            "~" => Some(ComparisonOp::Match),
            "!~" => Some(ComparisonOp::NotMatch),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
            ComparisonOp::Match => "~",
            ComparisonOp::NotMatch => "!~",
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, ComparisonOp::Match | ComparisonOp::NotMatch)
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Less | ComparisonOp::LessEqual | ComparisonOp::Greater | ComparisonOp::GreaterEqual
        )
    }
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    And,
    Or,
}

/// Filter condition tree; leaves are always comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Comparison {
        op: ComparisonOp,
        column: String,
        value: Value,
    },
    /// Two or more children joined by the same connective
    Boolean {
        op: BooleanOp,
        children: Vec<Condition>,
    },
    Not(Box<Condition>),
}

impl Condition {
    pub fn comparison(op: ComparisonOp, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Comparison {
            op,
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Boolean {
            op: BooleanOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Boolean {
            op: BooleanOp::Or,
            children,
        }
    }

    pub fn negate(child: Condition) -> Self {
        Condition::Not(Box::new(child))
    }

    /// Column names referenced by the comparisons, sorted and deduplicated
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut columns = BTreeSet::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut BTreeSet<&'a str>) {
        match self {
            Condition::Comparison { column, .. } => {
                columns.insert(column.as_str());
            }
            Condition::Boolean { children, .. } => {
                for child in children {
                    child.collect_columns(columns);
                }
            }
            Condition::Not(child) => child.collect_columns(columns),
        }
    }

    /// Rebuild the tree with every column name passed through `f`
    pub fn try_map_columns<E, F>(&self, f: &mut F) -> Result<Condition, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        Ok(match self {
            Condition::Comparison { op, column, value } => Condition::Comparison {
                op: *op,
                column: f(column)?,
                value: value.clone(),
            },
            Condition::Boolean { op, children } => Condition::Boolean {
                op: *op,
                children: children
                    .iter()
                    .map(|child| child.try_map_columns(f))
                    .collect::<Result<Vec<_>, E>>()?,
            },
            Condition::Not(child) => Condition::Not(Box::new(child.try_map_columns(f)?)),
        })
    }
}

fn fmt_literal(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
        other => write!(f, "{}", other),
    }
}

/// Renders the condition as TSQL text.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Comparison { op, column, value } => {
                write!(f, "{} {} ", column, op.symbol())?;
                fmt_literal(value, f)
            }
            Condition::Boolean { op, children } => {
                let connective = match op {
                    BooleanOp::And => " and ",
                    BooleanOp::Or => " or ",
                };
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(connective)?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Condition::Not(child) => write!(f, "not ({})", child),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select")?;
        match &self.projection {
            Projection::Wildcard => write!(f, " *")?,
            Projection::Columns(columns) => {
                for column in columns {
                    write!(f, " {}", column)?;
                }
            }
        }
        if !self.relations.is_empty() {
            write!(f, " from {}", self.relations.join(" "))?;
        }
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        Ok(())
    }
}
