// TSQL Parser Module
//
// This module is responsible for parsing TSQL queries and converting them
// into a Query representation.

// Re-export public components
pub mod lexer;
pub mod ast;
pub mod parser;

// Export key types
pub use self::parser::{inspect_query, parse_select, ParseError, ParseResult, Parser};
pub use self::lexer::{Lexer, Token, TokenType};
pub use self::ast::{BooleanOp, ComparisonOp, Condition, Projection, Query, QueryType};
