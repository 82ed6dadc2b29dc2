//! Parse errors with position and expected/found context.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Error produced while tokenizing or parsing a search string.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Human readable message.
    pub message: String,
    /// Where in the search string the error was detected, in bytes.
    pub span: Span,
    /// What the parser was looking for, if known.
    pub expected: Option<String>,
    /// What it found instead.
    pub found: Option<String>,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
            hint: None,
        }
    }

    /// Create an "expected X, found Y" error.
    pub fn expected(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        let expected = expected.into();
        let found = found.into();
        Self {
            message: format!("expected {}, found {}", expected, found),
            span,
            expected: Some(expected),
            found: Some(found),
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Byte offset at which the error starts.
    ///
    /// Use [`ParseError::char_offset`] when reporting the position to users.
    pub fn offset(&self) -> usize {
        self.span.start
    }

    /// Character offset at which the error starts in `source`.
    pub fn char_offset(&self, source: &str) -> usize {
        source
            .get(..self.span.start)
            .map_or(self.span.start, |prefix| prefix.chars().count())
    }

    /// Format the error with the offending line and a caret under the span.
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = offset_to_line_col(source, self.span.start);
        let mut result = format!("error: {}\n", self.message);
        result.push_str(&format!("  --> line {}:{}\n", line, col));

        if let Some(source_line) = source.lines().nth(line - 1) {
            result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));
            for _ in 0..col {
                result.push(' ');
            }
            result.push('^');

            let remaining = source_line.chars().count().saturating_sub(col);
            let underline = self.span.len().saturating_sub(1).min(remaining);
            for _ in 0..underline {
                result.push('~');
            }
            result.push('\n');
        }

        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_found_message() {
        let err = ParseError::expected("an operator", "word `Orchidaceae`", Span::new(13, 24));
        assert_eq!(err.to_string(), "expected an operator, found word `Orchidaceae`");
        assert_eq!(err.expected.as_deref(), Some("an operator"));
        assert_eq!(err.found.as_deref(), Some("word `Orchidaceae`"));
        assert_eq!(err.offset(), 13);
    }

    #[test]
    fn test_error_formatting() {
        let source = "genus where family.family Orchidaceae";
        let err = ParseError::expected("an operator", "word `Orchidaceae`", Span::new(26, 37))
            .with_hint("compare with '=', '!=', 'like', 'contains' or 'is'");

        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:27"));
        assert!(formatted.contains("expected an operator"));
        assert!(formatted.contains("^~~~~~~~~~"));
        assert!(formatted.contains("hint: compare with"));
    }

    #[test]
    fn test_char_offset_counts_characters() {
        let source = "Aloë where";
        let err = crate::parse_string(source).unwrap_err();
        assert_eq!(err.offset(), 11);
        assert_eq!(err.char_offset(source), 10);
        assert!(err.format_with_source(source).contains("line 1:11"));
    }
}
