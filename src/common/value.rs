// Typed Values
//
// This module defines the values stored in profile rows and used as query
// literals, plus the datatype-directed cast from raw cell text.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::catalog::DataType;
use crate::query::executor::result::{QueryError, QueryResult};

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    String(String),
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

/// Only values of the same type are ordered; everything else is incomparable.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => {
                if d.hour() == 0 && d.minute() == 0 && d.second() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// Cast raw cell text to a value of the given datatype.
///
/// Empty integer and date cells become `Null`; datatypes without a native
/// representation are kept as strings.
pub fn cast(datatype: &DataType, raw: &str) -> QueryResult<Value> {
    match datatype {
        DataType::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            trimmed
                .trim_start_matches('+')
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| QueryError::TypeError(format!("cannot cast '{}' to :integer: {}", raw, e)))
        }
        DataType::Date => {
            if raw.trim().is_empty() {
                return Ok(Value::Null);
            }
            parse_datetime(raw)
                .map(Value::Date)
                .ok_or_else(|| QueryError::TypeError(format!("cannot cast '{}' to :date", raw)))
        }
        DataType::String | DataType::Other(_) => Ok(Value::String(raw.to_string())),
    }
}

const TIME_SUFFIX: &str = r"(?:\s*\(?(?P<H>[0-9]{2}):(?P<M>[0-9]{2})(?::(?P<S>[0-9]{2}))?\)?)?";

static YYYY_MM_DD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<y>[0-9]{{4}})-(?P<m>[0-9]{{1,2}}|[A-Za-z]{{3}})(?:-(?P<d>[0-9]{{1,2}}))?{}\s*$",
        TIME_SUFFIX
    ))
    .expect("static date pattern")
});

static DD_MM_YY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:(?P<d>[0-9]{{1,2}})-)?(?P<m>[0-9]{{1,2}}|[A-Za-z]{{3}})-(?P<y>[0-9]{{2}}(?:[0-9]{{2}})?){}\s*$",
        TIME_SUFFIX
    ))
    .expect("static date pattern")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse the date forms accepted in profiles and queries.
///
/// `now`, `today` and `:today` resolve to the current local time.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if matches!(s, "now" | "today" | ":today" | ":now") {
        return Some(Local::now().naive_local());
    }
    YYYY_MM_DD
        .captures(s)
        .or_else(|| DD_MM_YY.captures(s))
        .and_then(|caps| datetime_from_captures(&caps))
}

fn datetime_from_captures(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let year_text = caps.name("y")?.as_str();
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        // POSIX %y pivot
        year += if year < 69 { 2000 } else { 1900 };
    }
    let month_text = caps.name("m")?.as_str();
    let month: u32 = match MONTHS.iter().position(|m| m.eq_ignore_ascii_case(month_text)) {
        Some(i) => i as u32 + 1,
        None => month_text.parse().ok()?,
    };
    let day: u32 = match caps.name("d") {
        Some(d) => d.as_str().parse().ok()?,
        None => 1,
    };
    let field = |name: &str| -> Option<u32> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(field("H")?, field("M")?, field("S")?)
}
