// Execution Plan
//
// This module turns a parsed query into the list of joins to perform, the
// qualified projection and the resolved condition.

use log::debug;

use super::joins::{plan_joins, JoinStep};
use super::resolver::SchemaMap;
use crate::catalog::Schema;
use crate::query::executor::result::QueryResult;
use crate::query::parser::ast::{Condition, Projection, Query};

/// A plan for a single select query
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// Qualified `relation.column` names in output order
    pub projection: Vec<String>,
    /// Relations to join, in order
    pub joins: Vec<JoinStep>,
    /// Condition with every column qualified
    pub condition: Option<Condition>,
}

impl ExecutionPlan {
    /// Resolve the names of `query` against `schema` and plan its joins
    pub fn new(query: &Query, schema: &Schema) -> QueryResult<Self> {
        let schema_map = SchemaMap::new(schema, &query.relations);

        let projection = match &query.projection {
            Projection::Wildcard => project_all(&query.relations, schema)?,
            Projection::Columns(columns) => columns
                .iter()
                .map(|name| schema_map.resolve(name))
                .collect::<QueryResult<Vec<_>>>()?,
        };

        let (condition, condition_fields) = match &query.condition {
            Some(condition) => {
                let (resolved, fields) = resolve_condition(condition, &schema_map)?;
                (Some(resolved), fields)
            }
            None => (None, Vec::new()),
        };

        let joins = plan_joins(&projection, &condition_fields, &query.relations, schema)?;
        debug!("resolved projection: {:?}", projection);

        Ok(ExecutionPlan {
            projection,
            joins,
            condition,
        })
    }
}

/// All fields of the named relations; shared keys only once
pub fn project_all(relations: &[String], schema: &Schema) -> QueryResult<Vec<String>> {
    let mut projection = Vec::new();
    let mut keys_added: Vec<&str> = Vec::new();
    for relation in relations {
        for field in schema.fields(relation)? {
            if field.is_key() {
                if keys_added.contains(&field.name()) {
                    continue;
                }
                keys_added.push(field.name());
            }
            projection.push(format!("{}.{}", relation, field.name()));
        }
    }
    Ok(projection)
}

/// Qualify the columns of a condition; also returns the qualified names,
/// sorted and deduplicated
pub fn resolve_condition(
    condition: &Condition,
    schema_map: &SchemaMap,
) -> QueryResult<(Condition, Vec<String>)> {
    let resolved = condition.try_map_columns(&mut |column| schema_map.resolve(column))?;
    let fields = resolved.columns().into_iter().map(String::from).collect();
    Ok((resolved, fields))
}
