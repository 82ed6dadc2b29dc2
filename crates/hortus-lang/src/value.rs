//! Typed literals and the runtime scalars they express to.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;

/// A literal from a search string, typed at parse time.
///
/// Bare words go through [`parse_typed_value`]; quoted words are always
/// strings, and `|datetime|...|` literals are always dates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer or float literal, kept as a float.
    Number(f64),
    /// `|datetime|Y,M,D|` literal.
    DateTime(NaiveDateTime),
    /// The bare word `None`.
    Null,
    /// The bare word `Empty`: the empty collection, distinct from null.
    Empty,
    /// Anything else.
    String(String),
}

/// A runtime scalar: what record fields hold and what a [`Value`] expresses to.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// Only produced by [`Value::Empty`]; never stored in a record field.
    Empty,
}

/// Classify a bare literal.
///
/// Tries, in order: integer, float, `None`, `Empty`, and finally falls back to
/// the raw string.
pub fn parse_typed_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int as f64);
    }
    if looks_numeric(raw) {
        if let Ok(float) = raw.parse::<f64>() {
            return Value::Number(float);
        }
    }
    match raw {
        "None" => Value::Null,
        "Empty" => Value::Empty,
        _ => Value::String(raw.to_string()),
    }
}

/// Guards the float parse so that words such as `inf` or `NaN` stay strings.
fn looks_numeric(raw: &str) -> bool {
    raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

impl Value {
    /// The canonical runtime value for this literal.
    pub fn express(&self) -> Datum {
        match self {
            Value::Number(n) => Datum::Number(*n),
            Value::DateTime(dt) => Datum::DateTime(*dt),
            Value::Null => Datum::Null,
            Value::Empty => Datum::Empty,
            Value::String(s) => Datum::Text(s.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::DateTime(_) => "datetime",
            Value::Null => "null",
            Value::Empty => "empty",
            Value::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text used when the literal is matched as a pattern (`like`, `contains`).
    ///
    /// Numbers are written without a trailing `.0` so that `contains 12`
    /// finds `"A12"`. Null and Empty have no pattern form.
    pub fn pattern_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Null | Value::Empty => None,
        }
    }

    /// Render as a SQL-style literal for the canonical query text.
    pub fn sql_literal(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Null => "NULL".to_string(),
            Value::Empty => "EMPTY".to_string(),
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

/// Whole floats keep one decimal place (`113.0`), others print as-is.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_literal())
    }
}

// `Empty` stands for the empty collection, so it compares equal to one.
impl<T> PartialEq<[T]> for Value {
    fn eq(&self, other: &[T]) -> bool {
        matches!(self, Value::Empty) && other.is_empty()
    }
}

impl<T> PartialEq<Vec<T>> for Value {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T, S> PartialEq<HashSet<T, S>> for Value {
    fn eq(&self, other: &HashSet<T, S>) -> bool {
        matches!(self, Value::Empty) && other.is_empty()
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Number(n) if n == other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::String(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used for pattern matching against any column type.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Datum::Null | Datum::Empty => None,
            Datum::Bool(b) => Some(b.to_string()),
            Datum::Number(n) => Some(n.to_string()),
            Datum::Text(s) => Some(s.clone()),
            Datum::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<i64> for Datum {
    fn from(n: i64) -> Self {
        Datum::Number(n as f64)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(dt: NaiveDateTime) -> Self {
        Datum::DateTime(dt)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Datum::Null)
    }
}
