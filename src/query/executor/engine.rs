// Query Execution Engine Implementation
//
// This module runs TSQL select queries against a Database: plan the joins,
// perform them, filter the joined rows and set the final projection.

use log::{debug, trace};

use crate::query::executor::filter::compile_condition;
use crate::query::executor::join::{join, JoinMode};
use crate::query::executor::result::{QueryResult, Selection};
use crate::query::parser::ast::Query;
use crate::query::parser::{inspect_query, parse_select};
use crate::query::planner::ExecutionPlan;
use crate::storage::Database;

/// Per-query execution options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Join mode used for every planned join
    pub join_mode: JoinMode,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_join_mode(mut self, join_mode: JoinMode) -> Self {
        self.join_mode = join_mode;
        self
    }
}

/// Run a full query, starting with `select` or `retrieve`
///
/// ```no_run
/// # fn run(db: &tsdbql::MemoryDatabase) -> Result<(), tsdbql::QueryError> {
/// let selection = tsdbql::query("select i-id where i-length < 4", db)?;
/// for row in &selection {
///     println!("{:?}", row);
/// }
/// # Ok(())
/// # }
/// ```
pub fn query(text: &str, db: &dyn Database) -> QueryResult<Selection> {
    let query = inspect_query(text)?;
    execute(&query, db, &SelectOptions::default())
}

/// Run the body of a select query, e.g. `i-id where i-length < 4`
pub fn select(body: &str, db: &dyn Database) -> QueryResult<Selection> {
    select_with_options(body, db, &SelectOptions::default())
}

/// Run the body of a select query with explicit options
pub fn select_with_options(
    body: &str,
    db: &dyn Database,
    options: &SelectOptions,
) -> QueryResult<Selection> {
    let query = parse_select(body)?;
    execute(&query, db, options)
}

/// Execute an already parsed query
pub fn execute(query: &Query, db: &dyn Database, options: &SelectOptions) -> QueryResult<Selection> {
    let plan = ExecutionPlan::new(query, db.schema())?;
    debug!("executing {} with {} joins", query, plan.joins.len());

    let mut selection = Selection::new();
    for step in &plan.joins {
        join(&mut selection, db, &step.relation, &step.columns, options.join_mode)?;
    }

    if let Some(condition) = &plan.condition {
        let predicate = compile_condition(condition, selection.field_index())?;
        let before = selection.len();
        selection.retain(|row| predicate(row));
        trace!("filter {}: {} rows -> {} rows", condition, before, selection.len());
    }

    selection.set_projection(plan.projection)?;
    Ok(selection)
}
