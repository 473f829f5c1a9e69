//! Catalog Module
//!
//! This module describes profile structure: the relations of a profile,
//! their fields, and which of those fields are join keys.

pub mod schema;
pub mod field;

// Re-export key types
pub use self::schema::{DataType, Schema};
pub use self::field::Field;
