//! Byte-offset tracking for search strings.

/// A half-open byte range into the search string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span sitting at `offset`, used for end-of-input errors.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A parsed item together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
    /// Source text of a literal whose typed value does not reproduce it,
    /// e.g. the number `2001.0010`.
    pub raw: Option<String>,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self {
            value,
            span,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Map the inner value, keeping the span and source text.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
            raw: self.raw,
        }
    }
}

/// Convert a byte offset to a 1-based (line, column) pair.
///
/// Search strings are almost always a single line, but pasted multi-line
/// queries still get sensible positions.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let domain = Span::new(0, 5);
        let filter = Span::new(12, 30);
        assert_eq!(domain.merge(filter), Span::new(0, 30));
        assert_eq!(filter.merge(domain), Span::new(0, 30));
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "genus where\nfamily.family=Orchidaceae";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 6), (1, 7));
        assert_eq!(offset_to_line_col(source, 12), (2, 1));
        assert_eq!(offset_to_line_col(source, 19), (2, 8));
    }

    #[test]
    fn test_empty_span_at_end() {
        let span = Span::at(9);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }
}
