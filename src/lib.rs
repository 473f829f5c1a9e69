// TSDB Query Engine
//
// Structured access to [incr tsdb()] test-suite profiles and the TSQL
// query language for selecting, joining and filtering their rows.

pub mod common;
pub mod catalog;
pub mod storage;
pub mod query;

// Re-export key items for convenient access
pub use catalog::{DataType, Field, Schema};
pub use common::value::{cast, Value};
pub use storage::{Database, MemoryDatabase, Record};
pub use query::parser::{inspect_query, Query};
pub use query::executor::engine::{execute, query, select, select_with_options, SelectOptions};
pub use query::executor::join::JoinMode;
pub use query::executor::result::{QueryError, QueryResult, Selection};
