// TSQL Query Processing Module
//
// This module contains components for TSQL parsing, join planning and
// execution against a Database.

pub mod parser;
pub mod planner;
pub mod executor;

// Export key public interfaces
pub use parser::{inspect_query, Query};
pub use planner::ExecutionPlan;
pub use executor::engine::{query, select};
pub use executor::result::{QueryError, QueryResult, Selection};
