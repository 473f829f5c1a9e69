// Query Executor Module
//
// This module executes planned TSQL queries: hash joins into a Selection,
// condition filtering and projection.

pub mod result;
pub mod join;
pub mod filter;
pub mod engine;

pub use self::engine::{execute, query, select, select_with_options, SelectOptions};
pub use self::join::JoinMode;
pub use self::result::{QueryError, QueryResult, Rows, Selection};
