// TSQL Parser Implementation
//
// This module implements a recursive descent parser that converts tokens
// from the lexer into a Query.
//
//   select_body  := projection [from_clause] {where_clause}
//   projection   := '*' | column_ref {column_ref}
//   from_clause  := 'from' id {id}
//   where_clause := 'where' disjunction
//   disjunction  := conjunction {'or' conjunction}
//   conjunction  := unary {'and' unary}
//   unary        := 'not' disjunction | '(' disjunction ')' | comparison
//   comparison   := column_ref operator literal

use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenType};
use crate::catalog::DataType;
use crate::common::value::cast;
use crate::common::Value;

/// TSQL syntax errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A token of none of the `expected` types was found
    UnexpectedToken { expected: Vec<TokenType>, found: Token },
    /// A literal token whose text cannot be converted
    InvalidLiteral { reason: String, token: Token },
    /// `select *` without a `from` clause
    WildcardWithoutFrom(String),
    /// Query types other than select/retrieve
    UnsupportedQuery(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found } => {
                let expected: Vec<&str> = expected.iter().map(|t| t.description()).collect();
                write!(
                    f,
                    "expected {}, found {} at line {}, column {}",
                    expected.join(" or "),
                    found,
                    found.line,
                    found.column
                )
            }
            ParseError::InvalidLiteral { reason, token } => write!(
                f,
                "invalid literal {} at line {}, column {}: {}",
                token, token.line, token.column, reason
            ),
            ParseError::WildcardWithoutFrom(query) => {
                write!(f, "'select *' requires a 'from' clause: {}", query)
            }
            ParseError::UnsupportedQuery(kind) => write!(f, "'{}' queries are not supported", kind),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// TSQL Parser for constructing a Query from tokens
pub struct Parser {
    input: String,
    tokens: Peekable<IntoIter<Token>>,
    current_token: Option<Token>,
}

impl Parser {
    /// Create a new parser from a TSQL query string
    pub fn new(input: &str) -> Self {
        let tokens = Lexer::tokenize(input);
        let mut parser = Parser {
            input: input.to_string(),
            tokens: tokens.into_iter().peekable(),
            current_token: None,
        };
        parser.next_token();
        parser
    }

    /// Advance to the next token
    fn next_token(&mut self) -> Option<Token> {
        let previous = self.current_token.take();
        self.current_token = self.tokens.next();
        previous
    }

    /// The current token, or a synthetic EOF past the end
    fn current(&self) -> Token {
        self.current_token.clone().unwrap_or_else(|| Token {
            token_type: TokenType::EOF,
            literal: String::new(),
            line: 0,
            column: 0,
        })
    }

    /// Check if the current token is of the given type
    fn current_token_is(&self, token_type: TokenType) -> bool {
        matches!(&self.current_token, Some(token) if token.token_type == token_type)
    }

    /// Consume the current token if it has the given type
    fn accept(&mut self, token_type: TokenType) -> Option<Token> {
        if self.current_token_is(token_type) {
            self.next_token()
        } else {
            None
        }
    }

    /// Consume the current token, which must have the given type
    fn expect(&mut self, token_type: TokenType) -> ParseResult<Token> {
        self.choice(&[token_type])
    }

    /// Consume the current token, which must have one of the given types
    fn choice(&mut self, token_types: &[TokenType]) -> ParseResult<Token> {
        if token_types.iter().any(|t| self.current_token_is(*t)) {
            if let Some(token) = self.next_token() {
                return Ok(token);
            }
        }
        Err(ParseError::UnexpectedToken {
            expected: token_types.to_vec(),
            found: self.current(),
        })
    }

    /// Parse a full query, starting with its `select`/`retrieve` keyword
    pub fn parse_query(&mut self) -> ParseResult<Query> {
        let token = self.current();
        match token.token_type {
            TokenType::IDENTIFIER => {
                let kind = token.literal.to_lowercase();
                if kind == "select" || kind == "retrieve" {
                    self.next_token();
                    self.parse_select()
                } else {
                    Err(ParseError::UnsupportedQuery(kind))
                }
            }
            TokenType::EOF => Err(ParseError::UnexpectedToken {
                expected: vec![TokenType::IDENTIFIER],
                found: token,
            }),
            _ => Err(ParseError::UnsupportedQuery(token.literal.to_lowercase())),
        }
    }

    /// Parse the body of a select query (without the leading keyword)
    pub fn parse_select(&mut self) -> ParseResult<Query> {
        let projection = self.parse_projection()?;
        let relations = self.parse_from()?;
        let condition = self.parse_where()?;
        self.expect(TokenType::EOF)?;

        if projection == Projection::Wildcard && relations.is_empty() {
            return Err(ParseError::WildcardWithoutFrom(self.input.clone()));
        }

        Ok(Query {
            query_type: QueryType::Select,
            projection,
            relations,
            condition,
        })
    }

    fn parse_projection(&mut self) -> ParseResult<Projection> {
        let token = self.choice(&[
            TokenType::STAR,
            TokenType::QualifiedIdentifier,
            TokenType::IDENTIFIER,
        ])?;
        if token.token_type == TokenType::STAR {
            return Ok(Projection::Wildcard);
        }
        let mut columns = vec![token.literal];
        while let Some(token) = self
            .accept(TokenType::QualifiedIdentifier)
            .or_else(|| self.accept(TokenType::IDENTIFIER))
        {
            columns.push(token.literal);
        }
        Ok(Projection::Columns(columns))
    }

    fn parse_from(&mut self) -> ParseResult<Vec<String>> {
        let mut relations = Vec::new();
        if self.accept(TokenType::FROM).is_some() {
            relations.push(self.expect(TokenType::IDENTIFIER)?.literal);
            while let Some(token) = self.accept(TokenType::IDENTIFIER) {
                relations.push(token.literal);
            }
        }
        Ok(relations)
    }

    /// Each `where` clause is one conjunct of the overall condition
    fn parse_where(&mut self) -> ParseResult<Option<Condition>> {
        let mut conditions = Vec::new();
        while self.accept(TokenType::WHERE).is_some() {
            conditions.push(self.parse_disjunction()?);
        }
        Ok(match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Condition::and(conditions)),
        })
    }

    fn parse_disjunction(&mut self) -> ParseResult<Condition> {
        let mut conditions = vec![self.parse_conjunction()?];
        while self.accept(TokenType::OR).is_some() {
            conditions.push(self.parse_conjunction()?);
        }
        Ok(collapse(BooleanOp::Or, conditions))
    }

    fn parse_conjunction(&mut self) -> ParseResult<Condition> {
        let mut conditions = vec![self.parse_unary()?];
        while self.accept(TokenType::AND).is_some() {
            conditions.push(self.parse_unary()?);
        }
        Ok(collapse(BooleanOp::And, conditions))
    }

    fn parse_unary(&mut self) -> ParseResult<Condition> {
        let token = self.choice(&[
            TokenType::NOT,
            TokenType::LeftParen,
            TokenType::QualifiedIdentifier,
            TokenType::IDENTIFIER,
        ])?;
        match token.token_type {
            TokenType::NOT => Ok(Condition::negate(self.parse_disjunction()?)),
            TokenType::LeftParen => {
                let condition = self.parse_disjunction()?;
                self.expect(TokenType::RightParen)?;
                Ok(condition)
            }
            _ => self.parse_comparison(token.literal),
        }
    }

    fn parse_comparison(&mut self, column: String) -> ParseResult<Condition> {
        let op_token = self.expect(TokenType::OP)?;
        let op = ComparisonOp::from_symbol(&op_token.literal).ok_or_else(|| ParseError::InvalidLiteral {
            reason: "unknown comparison operator".to_string(),
            token: op_token.clone(),
        })?;

        let allowed: &[TokenType] = if op.is_regex() {
            &[TokenType::DqString, TokenType::SqString]
        } else if op.is_ordering() {
            &[
                TokenType::INTEGER,
                TokenType::YyyyMmDd,
                TokenType::DdMmYy,
                TokenType::KwDate,
            ]
        } else {
            &[
                TokenType::INTEGER,
                TokenType::DqString,
                TokenType::SqString,
                TokenType::YyyyMmDd,
                TokenType::DdMmYy,
                TokenType::KwDate,
            ]
        };
        let token = self.choice(allowed)?;
        let value = literal_value(&token)?;

        Ok(Condition::Comparison { op, column, value })
    }
}

/// A single child stands alone; several become one Boolean node
fn collapse(op: BooleanOp, mut conditions: Vec<Condition>) -> Condition {
    if conditions.len() == 1 {
        conditions.remove(0)
    } else {
        Condition::Boolean {
            op,
            children: conditions,
        }
    }
}

/// Convert a literal token to its typed value
fn literal_value(token: &Token) -> ParseResult<Value> {
    match token.token_type {
        TokenType::INTEGER => token
            .literal
            .trim_start_matches('+')
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| ParseError::InvalidLiteral {
                reason: e.to_string(),
                token: token.clone(),
            }),
        TokenType::DqString => Ok(Value::String(unquote(&token.literal, '"'))),
        TokenType::SqString => Ok(Value::String(unquote(&token.literal, '\''))),
        TokenType::YyyyMmDd | TokenType::DdMmYy | TokenType::KwDate => {
            cast(&DataType::Date, &token.literal).map_err(|e| ParseError::InvalidLiteral {
                reason: e.to_string(),
                token: token.clone(),
            })
        }
        _ => Err(ParseError::InvalidLiteral {
            reason: "not a literal".to_string(),
            token: token.clone(),
        }),
    }
}

/// Strip the surrounding quotes and unescape the quote character only;
/// other backslash sequences are kept for the regex engine.
fn unquote(literal: &str, quote: char) -> String {
    let inner = &literal[quote.len_utf8()..literal.len() - quote.len_utf8()];
    let escaped = format!("\\{}", quote);
    inner.replace(&escaped, &quote.to_string())
}

/// Parse a full query string (`select ...` or `retrieve ...`)
pub fn inspect_query(query: &str) -> ParseResult<Query> {
    Parser::new(query).parse_query()
}

/// Parse the body of a select query, without the leading keyword
pub fn parse_select(body: &str) -> ParseResult<Query> {
    Parser::new(body).parse_select()
}
