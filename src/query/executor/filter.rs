// Condition Filter Implementation
//
// This module compiles a resolved condition tree into a row predicate.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use crate::common::Value;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::ast::{BooleanOp, ComparisonOp, Condition};

/// A compiled condition over joined rows
pub type Predicate = Box<dyn Fn(&[Value]) -> bool>;

static NULL: Value = Value::Null;

/// Compile `condition` against a field index of bare and qualified names
///
/// Column positions are looked up and regular expressions compiled once,
/// here, rather than per row.
pub fn compile_condition(
    condition: &Condition,
    field_index: &HashMap<String, usize>,
) -> QueryResult<Predicate> {
    match condition {
        Condition::Boolean { op, children } => {
            let predicates = children
                .iter()
                .map(|child| compile_condition(child, field_index))
                .collect::<QueryResult<Vec<Predicate>>>()?;
            let predicate: Predicate = match op {
                BooleanOp::And => Box::new(move |row: &[Value]| predicates.iter().all(|p| p(row))),
                BooleanOp::Or => Box::new(move |row: &[Value]| predicates.iter().any(|p| p(row))),
            };
            Ok(predicate)
        }
        Condition::Not(child) => {
            let predicate = compile_condition(child, field_index)?;
            Ok(Box::new(move |row: &[Value]| !predicate(row)))
        }
        Condition::Comparison { op, column, value } => {
            let index = field_index
                .get(column)
                .copied()
                .ok_or_else(|| QueryError::UndefinedColumn(column.clone()))?;
            if op.is_regex() {
                compile_regex(*op, index, value)
            } else {
                let op = *op;
                let literal = value.clone();
                Ok(Box::new(move |row: &[Value]| compare(op, cell(row, index), &literal)))
            }
        }
    }
}

fn compile_regex(op: ComparisonOp, index: usize, value: &Value) -> QueryResult<Predicate> {
    let pattern = value.as_str().ok_or_else(|| {
        QueryError::TypeError(format!("{} requires a string pattern, got {:?}", op.symbol(), value))
    })?;
    let regex =
        Regex::new(pattern).map_err(|e| QueryError::InvalidRegex(format!("{}: {}", pattern, e)))?;
    let negate = op == ComparisonOp::NotMatch;
    Ok(Box::new(move |row: &[Value]| {
        let found = match cell(row, index) {
            Value::Null => false,
            Value::String(s) => regex.is_match(s),
            other => regex.is_match(&other.to_string()),
        };
        found != negate
    }))
}

fn cell(row: &[Value], index: usize) -> &Value {
    row.get(index).unwrap_or(&NULL)
}

/// Typed comparison; values of different types are never equal or ordered
pub fn compare(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        _ => left.partial_cmp(right),
    };
    match op {
        ComparisonOp::Equal => ordering == Some(Ordering::Equal),
        ComparisonOp::NotEqual => ordering != Some(Ordering::Equal),
        ComparisonOp::Less => ordering == Some(Ordering::Less),
        ComparisonOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        ComparisonOp::Greater => ordering == Some(Ordering::Greater),
        ComparisonOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        ComparisonOp::Match | ComparisonOp::NotMatch => false,
    }
}
