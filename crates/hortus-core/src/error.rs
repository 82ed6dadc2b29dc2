//! Core error types.

use hortus_lang::{ParseError, Span};
use thiserror::Error;

/// Errors returned by searches.
#[derive(Debug, Error)]
pub enum Error {
    /// The search string did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The search string parsed but does not fit the schema.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The session failed; passed through untouched.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Format the error, with a caret diagnostic when it has a position.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            Error::Parse(e) => e.format_with_source(source),
            Error::Compile(e) => e.format_with_source(source),
            Error::Storage(e) => format!("error: {}\n", e),
        }
    }
}

/// Error produced when a parsed search cannot be bound to the schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub kind: CompileErrorKind,
    pub span: Option<Span>,
}

/// What went wrong during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// Unknown domain, entity or alias.
    UnresolvedDomain,
    /// A path leaf is neither a column nor a relation of the entity it ends on.
    AmbiguousPath,
    /// Aggregate function other than `count`.
    UnsupportedAggregate,
    /// A path crosses a relation the schema does not define.
    JoinResolution,
    /// The operand cannot be used with the operator or column.
    InvalidOperand,
    /// Aggregate comparison outside the top-level conjunction.
    MisplacedAggregate,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        // Unspanned nodes built by strategies carry the default span.
        if span != Span::default() {
            self.span = Some(span);
        }
        self
    }

    pub fn unresolved_domain(name: &str) -> Self {
        Self::new(
            CompileErrorKind::UnresolvedDomain,
            format!("unknown domain '{}'", name),
        )
    }

    pub fn join_resolution(entity: &str, relation: &str) -> Self {
        Self::new(
            CompileErrorKind::JoinResolution,
            format!("entity '{}' has no relation '{}'", entity, relation),
        )
    }

    pub fn ambiguous_path(entity: &str, leaf: &str) -> Self {
        Self::new(
            CompileErrorKind::AmbiguousPath,
            format!("'{}' is not a column or relation of '{}'", leaf, entity),
        )
    }

    pub fn invalid_operand(message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::InvalidOperand, message)
    }

    /// Format with a caret diagnostic under the offending span.
    pub fn format_with_source(&self, source: &str) -> String {
        match self.span {
            Some(span) => ParseError::new(self.message.clone(), span).format_with_source(source),
            None => format!("error: {}\n", self.message),
        }
    }
}

/// A failure inside a [`Session`](crate::storage::Session).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(Box<dyn std::error::Error + Send + Sync>);

impl StorageError {
    /// Wrap a backend error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }

    /// The wrapped backend error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_diagnostic() {
        let source = "genus where famly.family=x";
        let err = CompileError::join_resolution("genus", "famly").with_span(Span::new(12, 17));
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:13"));
        assert!(formatted.contains("^~~~~"));
    }

    #[test]
    fn test_default_span_is_dropped() {
        let err = CompileError::unresolved_domain("nope").with_span(Span::default());
        assert_eq!(err.span, None);
        assert_eq!(err.format_with_source("nope=x"), "error: unknown domain 'nope'\n");
    }

    #[test]
    fn test_storage_error_passthrough() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "query timed out");
        let err: Error = StorageError::new(io).into();
        assert_eq!(err.to_string(), "storage error: query timed out");
        if let Error::Storage(inner) = &err {
            let io = inner.inner().downcast_ref::<std::io::Error>().unwrap();
            assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
        }
    }
}
