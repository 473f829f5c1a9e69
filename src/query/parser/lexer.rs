// TSQL Lexer Implementation
//
// This module tokenizes TSQL query strings. Tokens are recognized by a
// static, ordered table of patterns: at each position every rule is tried,
// the longest match wins and ties go to the rule listed first.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// TSQL Token types
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenType {
    // Keywords
    FROM,
    WHERE,
    REPORT,

    // Punctuation
    STAR,           // *
    DOT,            // .
    LeftParen,      // (
    RightParen,     // )

    // Operators
    OP,             // == = != ~ !~ < <= > >=
    AND,            // && & and
    OR,             // || | or
    NOT,            // ! not

    // Literals
    DqString,       // "..."
    SqString,       // '...'
    YyyyMmDd,       // 2018-10-07 13:45
    DdMmYy,         // 07-oct-18
    KwDate,         // now :today
    INTEGER,

    // Identifiers
    QualifiedIdentifier,
    IDENTIFIER,

    // Special
    UNEXPECTED,
    EOF,
}

impl TokenType {
    /// Human-readable description used in syntax errors
    pub fn description(&self) -> &'static str {
        match self {
            TokenType::FROM => "from",
            TokenType::WHERE => "where",
            TokenType::REPORT => "report",
            TokenType::STAR => "*",
            TokenType::DOT => ".",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::OP => "a comparison operator",
            TokenType::AND => "'&&', '&', or 'and'",
            TokenType::OR => "'||', '|', or 'or'",
            TokenType::NOT => "'!' or 'not'",
            TokenType::DqString => "a double-quoted string",
            TokenType::SqString => "a single-quoted string",
            TokenType::YyyyMmDd => "a YYYY-MM-DD date",
            TokenType::DdMmYy => "a DD-MM-YY date",
            TokenType::KwDate => "'now' or ':today'",
            TokenType::INTEGER => "an integer",
            TokenType::QualifiedIdentifier => "a qualified identifier",
            TokenType::IDENTIFIER => "a simple identifier",
            TokenType::UNEXPECTED => "an unexpected character",
            TokenType::EOF => "end of input",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A Token represents a lexical unit in the TSQL query
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.token_type == TokenType::EOF {
            write!(f, "end of input")
        } else {
            write!(f, "'{}'", self.literal)
        }
    }
}

const MONTH: &str = "(?:[0-9][0-9]?|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)";
const DAY: &str = "[0-9]{1,2}";
const TIME: &str = r"(?:[ \t]*\([0-9]{2}:[0-9]{2}(?::[0-9]{2})?\)|[ \t]+[0-9]{2}:[0-9]{2}(?::[0-9]{2})?)";
const ID: &str = "[a-zA-Z][-_a-zA-Z0-9]*";

/// The token rules in priority order
static TOKEN_RULES: Lazy<Vec<(Regex, TokenType)>> = Lazy::new(|| {
    let yyyy_mm_dd = format!("[0-9]{{4}}-{MONTH}(?:-{DAY})?{TIME}?");
    let dd_mm_yy = format!("(?:{DAY}-)?{MONTH}-(?:[0-9]{{2}})?[0-9]{{2}}{TIME}?");
    let qid = format!(r"{ID}\.{ID}");
    let rules: Vec<(String, TokenType)> = vec![
        ("from".into(), TokenType::FROM),
        ("where".into(), TokenType::WHERE),
        ("report".into(), TokenType::REPORT),
        (r"\*".into(), TokenType::STAR),
        (r"\.".into(), TokenType::DOT),
        ("==|=|!=|~|!~|<=|<|>=|>".into(), TokenType::OP),
        ("&&|&|and".into(), TokenType::AND),
        (r"\|\||\||or".into(), TokenType::OR),
        ("!|not".into(), TokenType::NOT),
        (r"\(".into(), TokenType::LeftParen),
        (r"\)".into(), TokenType::RightParen),
        (r#""[^"\\]*(?:\\.[^"\\]*)*""#.into(), TokenType::DqString),
        (r"'[^'\\]*(?:\\.[^'\\]*)*'".into(), TokenType::SqString),
        (yyyy_mm_dd, TokenType::YyyyMmDd),
        (dd_mm_yy, TokenType::DdMmYy),
        (":today|now".into(), TokenType::KwDate),
        (r"[+-]?[0-9]+".into(), TokenType::INTEGER),
        (qid, TokenType::QualifiedIdentifier),
        (ID.into(), TokenType::IDENTIFIER),
        (r"\S".into(), TokenType::UNEXPECTED),
    ];
    rules
        .into_iter()
        .map(|(pattern, token_type)| {
            let re = Regex::new(&format!("^(?:{})", pattern)).expect("static token pattern");
            (re, token_type)
        })
        .collect()
});

/// TSQL Lexer for breaking a query string into tokens
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from a TSQL query string
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input; the last token is always EOF
    pub fn tokenize(input: &'a str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.token_type == TokenType::EOF;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Advance past `len` bytes, keeping line and column current
    fn advance(&mut self, len: usize) {
        let consumed = &self.input[self.position..self.position + len];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += len;
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let len = rest.len() - rest.trim_start().len();
        self.advance(len);
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;
        let rest = &self.input[self.position..];
        if rest.is_empty() {
            return Token {
                token_type: TokenType::EOF,
                literal: String::new(),
                line,
                column,
            };
        }

        let mut best: Option<(usize, TokenType)> = None;
        for (re, token_type) in TOKEN_RULES.iter() {
            if let Some(m) = re.find(rest) {
                let len = m.end();
                if len > 0 && best.is_none_or(|(best_len, _)| len > best_len) {
                    best = Some((len, *token_type));
                }
            }
        }

        // `\S` always matches a non-whitespace char, so this only covers the impossible case
        let (len, token_type) = best.unwrap_or_else(|| {
            (rest.chars().next().map_or(1, char::len_utf8), TokenType::UNEXPECTED)
        });
        let literal = rest[..len].to_string();
        self.advance(len);

        Token {
            token_type,
            literal,
            line,
            column,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.token_type == TokenType::EOF {
            None
        } else {
            Some(token)
        }
    }
}
