// Query Planner Module
//
// This module resolves the column names of a parsed TSQL query against a
// schema and plans the joins needed to answer it.

pub mod resolver;
pub mod joins;
pub mod plan;

pub use self::joins::{plan_joins, pivot_relations, JoinStep, KeyGraph};
pub use self::plan::ExecutionPlan;
pub use self::resolver::SchemaMap;
