// Hash Join Implementation
//
// This file joins the rows of one relation into a Selection. The rows of the
// new relation are buffered in a hash table keyed by the shared key columns
// and probed with each row already in the selection.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::trace;

use crate::catalog::Field;
use crate::common::Value;
use crate::query::executor::result::{QueryError, QueryResult, Selection};
use crate::storage::{Database, Record};

/// How unmatched selection rows are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinMode {
    /// Drop rows without a match
    #[default]
    Inner,
    /// Keep rows without a match, padding new columns with `Null`
    Left,
}

impl FromStr for JoinMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(JoinMode::Inner),
            "left" => Ok(JoinMode::Left),
            other => Err(QueryError::InvalidJoinMode(other.to_string())),
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMode::Inner => write!(f, "inner"),
            JoinMode::Left => write!(f, "left"),
        }
    }
}

/// Join `columns` of `relation` into `selection`
///
/// The first join loads the requested rows as they are. Later joins match on
/// the requested key columns already present in the selection; those columns
/// are not fetched again.
pub fn join(
    selection: &mut Selection,
    db: &dyn Database,
    relation: &str,
    columns: &[String],
    mode: JoinMode,
) -> QueryResult<()> {
    if selection.is_joined(relation) {
        return Err(QueryError::DuplicateJoin(relation.to_string()));
    }

    let all_fields = db.schema().fields(relation)?;
    let fields = columns
        .iter()
        .map(|column| {
            all_fields
                .iter()
                .find(|f| f.name() == column)
                .cloned()
                .ok_or_else(|| QueryError::UndefinedColumn(format!("{}.{}", relation, column)))
        })
        .collect::<QueryResult<Vec<Field>>>()?;

    if !selection.has_joins() {
        let data: Vec<Record> = db.select_from(relation, columns)?.collect();
        trace!("{} join {}: loaded {} rows", mode, relation, data.len());
        selection.merge_fields(relation, &[], fields);
        selection.set_data(data);
        return Ok(());
    }

    let on: Vec<String> = fields
        .iter()
        .filter(|f| f.is_key() && selection.index_of(f.name()).is_some())
        .map(|f| f.name().to_string())
        .collect();
    if on.is_empty() {
        return Err(QueryError::NoSharedKeys(relation.to_string()));
    }
    let fields: Vec<Field> = fields
        .into_iter()
        .filter(|f| !on.iter().any(|name| name == f.name()))
        .collect();
    let cols: Vec<String> = fields.iter().map(|f| f.name().to_string()).collect();

    let mut right: HashMap<Record, Vec<Record>> = HashMap::new();
    for (keys, row) in db.select_from(relation, &on)?.zip(db.select_from(relation, &cols)?) {
        right.entry(keys).or_default().push(row);
    }

    let left_indices = on
        .iter()
        .map(|name| {
            selection
                .index_of(name)
                .ok_or_else(|| QueryError::UndefinedColumn(name.clone()))
        })
        .collect::<QueryResult<Vec<usize>>>()?;

    let left_rows = selection.take_data();
    let left_count = left_rows.len();
    let mut data = Vec::with_capacity(left_count);
    for lrow in left_rows {
        let keys: Record = left_indices.iter().map(|&i| lrow[i].clone()).collect();
        match right.get(&keys) {
            Some(matches) => {
                for rrow in matches {
                    let mut row = lrow.clone();
                    row.extend(rrow.iter().cloned());
                    data.push(row);
                }
            }
            None if mode == JoinMode::Left => {
                let mut row = lrow;
                row.resize(row.len() + fields.len(), Value::Null);
                data.push(row);
            }
            None => {}
        }
    }
    trace!(
        "{} join {} on {:?}: {} rows -> {} rows",
        mode,
        relation,
        on,
        left_count,
        data.len()
    );

    selection.merge_fields(relation, &on, fields);
    selection.set_data(data);
    Ok(())
}
