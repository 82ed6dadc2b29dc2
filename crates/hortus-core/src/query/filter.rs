//! Scalar comparison and pattern matching used by the executor.

use std::cmp::Ordering;

use hortus_lang::Datum;

/// Comparison helpers over runtime scalars.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Order two scalars of the same kind; `None` for mismatched kinds.
    pub fn compare_datum(a: &Datum, b: &Datum) -> Option<Ordering> {
        match (a, b) {
            (Datum::Number(a), Datum::Number(b)) => a.partial_cmp(b),
            (Datum::Text(a), Datum::Text(b)) => Some(a.cmp(b)),
            (Datum::DateTime(a), Datum::DateTime(b)) => Some(a.cmp(b)),
            (Datum::Bool(a), Datum::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality of two scalars; values of different kinds are never equal.
    pub fn datum_equal(a: &Datum, b: &Datum) -> bool {
        Self::compare_datum(a, b) == Some(Ordering::Equal)
    }

    /// Whether a column value counts as null for `is None` tests.
    pub fn is_null(value: &Datum, empty_string_is_null: bool) -> bool {
        match value {
            Datum::Null => true,
            Datum::Text(s) => empty_string_is_null && s.is_empty(),
            _ => false,
        }
    }

    /// Match a string against a SQL LIKE pattern.
    ///
    /// `%` matches any run of characters, `_` exactly one, and a backslash
    /// makes the next character literal. Matching is case-sensitive; callers
    /// lowercase both sides for `like`.
    pub fn like_match(value: &str, pattern: &str) -> bool {
        let pattern = LikeToken::parse(pattern);
        let value: Vec<char> = value.chars().collect();

        let (mut v, mut p) = (0, 0);
        // Position of the last `%` seen and the value index it was tried at.
        let mut backtrack: Option<(usize, usize)> = None;

        while v < value.len() {
            match pattern.get(p) {
                Some(LikeToken::Any) => {
                    backtrack = Some((p, v));
                    p += 1;
                    continue;
                }
                Some(LikeToken::One) => {
                    v += 1;
                    p += 1;
                    continue;
                }
                Some(LikeToken::Char(c)) if *c == value[v] => {
                    v += 1;
                    p += 1;
                    continue;
                }
                _ => {}
            }
            match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    v = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            }
        }

        pattern[p..].iter().all(|t| *t == LikeToken::Any)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    Any,
    One,
    Char(char),
}

impl LikeToken {
    fn parse(pattern: &str) -> Vec<LikeToken> {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            tokens.push(match c {
                '%' => LikeToken::Any,
                '_' => LikeToken::One,
                '\\' => LikeToken::Char(chars.next().unwrap_or('\\')),
                c => LikeToken::Char(c),
            });
        }
        tokens
    }
}
