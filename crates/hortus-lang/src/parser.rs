//! Recursive descent parser for search strings.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::span::{Span, Spanned};
use crate::value::{parse_typed_value, Value};

/// Deepest allowed nesting of parentheses and `not`.
pub const MAX_NESTING: usize = 64;

/// Parser over a fully tokenized search string.
pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Tokenize `source` and create a parser over it.
    pub fn new(source: &'source str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
        })
    }

    /// Parse a complete statement and require the input to be exhausted.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let first = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::new("empty search string", Span::at(0)))?;

        let statement = match (&first.token, self.peek_nth(1).map(|t| &t.token)) {
            (Token::Word(_), Some(Token::Eq | Token::EqEq)) => {
                Statement::Domain(self.parse_domain_expression()?)
            }
            (Token::Word(_), Some(Token::Where)) => Statement::Query(self.parse_query()?),
            _ => {
                let values = self.parse_trailing_values()?;
                let span = span_of(&values, first.span);
                Statement::Values(ValueList { values, span })
            }
        };

        self.expect_end()?;
        Ok(statement)
    }

    /// `domain (= | ==) (value_list | *)`
    fn parse_domain_expression(&mut self) -> Result<DomainExpression, ParseError> {
        let domain = self.expect_identifier()?;
        let op_tok = self.next_token()?;
        let op = match op_tok.token {
            Token::Eq => DomainOp::Partial,
            Token::EqEq => DomainOp::Exact,
            other => {
                return Err(ParseError::expected("`=` or `==`", other.describe(), op_tok.span))
            }
        };

        let is_wildcard = matches!(self.peek(), Some(SpannedToken { token: Token::Word(w), .. }) if w == "*")
            && self.peek_nth(1).is_none();
        if is_wildcard {
            let star = self.next_token()?;
            return Ok(DomainExpression {
                span: domain.span.merge(star.span),
                domain,
                op,
                values: DomainValues::Wildcard,
            });
        }

        let values = self.parse_trailing_values()?;
        Ok(DomainExpression {
            span: span_of(&values, domain.span.merge(op_tok.span)),
            domain,
            op,
            values: DomainValues::List(values),
        })
    }

    /// `domain where filter`
    fn parse_query(&mut self) -> Result<Query, ParseError> {
        let domain = self.expect_identifier()?;
        self.expect_token(Token::Where)?;
        let filter = self.parse_filter()?;
        let end = self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.span);

        Ok(Query {
            span: end.map_or(domain.span, |end| domain.span.merge(end)),
            domain,
            filter,
        })
    }

    /// Parse a filter expression.
    pub fn parse_filter(&mut self) -> Result<Filter, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Filter, ParseError> {
        let mut conditions = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            conditions.push(self.parse_and()?);
        }
        Ok(Filter::or(conditions))
    }

    fn parse_and(&mut self) -> Result<Filter, ParseError> {
        let mut conditions = vec![self.parse_unary()?];
        while self.eat(&Token::And) {
            conditions.push(self.parse_unary()?);
        }
        Ok(Filter::and(conditions))
    }

    fn parse_unary(&mut self) -> Result<Filter, ParseError> {
        if let Some(tok) = self.peek() {
            if tok.token == Token::Not {
                let span = tok.span;
                self.next_token()?;
                self.enter(span)?;
                let inner = self.parse_unary();
                self.depth -= 1;
                return Ok(Filter::not(inner?));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Filter, ParseError> {
        let tok = self.next_token()?;
        let word = match tok.token {
            Token::LParen => {
                self.enter(tok.span)?;
                let inner = self.parse_filter();
                self.depth -= 1;
                let inner = inner?;
                self.expect_token(Token::RParen)?;
                return Ok(inner);
            }
            Token::Word(word) => Spanned::new(word, tok.span),
            other => {
                return Err(ParseError::expected("a path or `(`", other.describe(), tok.span))
            }
        };

        if self.eat(&Token::LParen) {
            return self.parse_aggregate(word);
        }

        let path = parse_path(&word.value, word.span)?;
        let op_tok = self.next_token()?;
        match op_tok.token {
            Token::Between => {
                let low = self.parse_value()?;
                self.expect_token(Token::And)?;
                let high = self.parse_value()?;
                Ok(Filter::Between { path, low, high })
            }
            Token::In => {
                let values = if self.eat(&Token::LParen) {
                    let values = self.parse_value_list()?;
                    self.expect_token(Token::RParen)?;
                    values
                } else {
                    self.parse_value_list()?
                };
                Ok(Filter::In { path, values })
            }
            token => {
                let op = self.comparison_op(token, op_tok.span)?;
                let value = self.parse_value()?;
                Ok(Filter::Comparison { path, op, value })
            }
        }
    }

    /// `function(path) op value`, after the opening parenthesis.
    fn parse_aggregate(&mut self, function: Spanned<String>) -> Result<Filter, ParseError> {
        let path_tok = self.next_token()?;
        let path = match path_tok.token {
            Token::Word(word) => parse_path(&word, path_tok.span)?,
            other => return Err(ParseError::expected("a path", other.describe(), path_tok.span)),
        };
        self.expect_token(Token::RParen)?;

        let op_tok = self.next_token()?;
        let op = self.comparison_op(op_tok.token, op_tok.span)?;
        let value = self.parse_value()?;

        Ok(Filter::Aggregate {
            function,
            path,
            op,
            value,
        })
    }

    /// Map an operator token, consuming the `not` of `is not`.
    fn comparison_op(&mut self, token: Token, span: Span) -> Result<ComparisonOp, ParseError> {
        let op = match token {
            Token::Eq | Token::EqEq => ComparisonOp::Eq,
            Token::Ne => ComparisonOp::Ne,
            Token::Lt => ComparisonOp::Lt,
            Token::Le => ComparisonOp::Le,
            Token::Gt => ComparisonOp::Gt,
            Token::Ge => ComparisonOp::Ge,
            Token::Like => ComparisonOp::Like,
            Token::Contains => ComparisonOp::Contains,
            Token::Is if self.eat(&Token::Not) => ComparisonOp::IsNot,
            Token::Is => ComparisonOp::Is,
            other => {
                return Err(ParseError::expected("an operator", other.describe(), span)
                    .with_hint("compare with '=', '!=', '<', 'like', 'contains', 'is' or 'between'"))
            }
        };
        Ok(op)
    }

    /// One or more values separated by commas and/or whitespace.
    ///
    /// Stops at the first token that cannot start a value, except right after
    /// a comma where another value is required. A keyword ends the list
    /// unless it follows a comma, so `id in 1, 2 and x=1` stops before `and`.
    pub fn parse_value_list(&mut self) -> Result<Vec<Spanned<Value>>, ParseError> {
        self.parse_values(false)
    }

    /// A value list that runs to the end of the input, keywords included.
    ///
    /// Domain expressions and bare value searches have nothing after their
    /// values, so `gen=Ixora Or` is two values.
    pub fn parse_trailing_values(&mut self) -> Result<Vec<Spanned<Value>>, ParseError> {
        let values = self.parse_values(true)?;
        self.expect_end()?;
        Ok(values)
    }

    fn parse_values(&mut self, keywords: bool) -> Result<Vec<Spanned<Value>>, ParseError> {
        let mut values = vec![self.parse_value()?];
        loop {
            if self.eat(&Token::Comma) {
                values.push(self.parse_value()?);
            } else if self.peek().is_some_and(|t| {
                t.token.is_value() || (keywords && t.token.is_word_keyword(self.slice(t.span)))
            }) {
                values.push(self.parse_value()?);
            } else {
                break;
            }
        }
        Ok(values)
    }

    /// A single literal.
    ///
    /// Keywords typed where a value is expected are bare words, so
    /// `genus contains Or` looks for `Or`.
    pub fn parse_value(&mut self) -> Result<Spanned<Value>, ParseError> {
        let tok = self.next_token()?;
        let value = match tok.token {
            Token::Quoted(text) => Value::String(text),
            Token::DateTime(dt) => Value::DateTime(dt),
            other => {
                let slice = self.slice(tok.span);
                let Some(word) = other.as_bare_word(slice) else {
                    return Err(ParseError::expected("a value", other.describe(), tok.span));
                };
                let value = parse_typed_value(&word);
                if matches!(value, Value::Number(_)) {
                    return Ok(Spanned::new(value, tok.span).with_raw(word));
                }
                value
            }
        };
        Ok(Spanned::new(value, tok.span))
    }

    /// Source text under a token.
    fn slice(&self, span: Span) -> &'source str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    /// Require that every token has been consumed.
    pub fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(ParseError::expected(
                "end of input",
                tok.token.describe(),
                tok.span,
            )),
        }
    }

    fn expect_identifier(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Word(word) if is_identifier(&word) => Ok(Spanned::new(word, tok.span)),
            other => Err(ParseError::expected("a domain name", other.describe(), tok.span)),
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::expected(
                expected.describe(),
                tok.token.describe(),
                tok.span,
            ))
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or_else(|| {
            ParseError::new("unexpected end of input", Span::at(self.source.len()))
        })?;
        self.pos += 1;
        Ok(tok)
    }

    /// Consume the next token if it matches.
    fn eat(&mut self, token: &Token) -> bool {
        if self.peek().is_some_and(|t| &t.token == token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.pos + n)
    }

    fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                format!("filter nested deeper than {} levels", MAX_NESTING),
                span,
            ));
        }
        self.depth += 1;
        Ok(())
    }
}

fn span_of(values: &[Spanned<Value>], start: Span) -> Span {
    values.last().map_or(start, |last| start.merge(last.span))
}

/// Split a dotted word into path hops, validating each one.
fn parse_path(word: &str, span: Span) -> Result<Path, ParseError> {
    let mut hops = Vec::new();
    let mut offset = span.start;
    for hop in word.split('.') {
        if !is_identifier(hop) {
            let hop_span = Span::new(offset, offset + hop.len().max(1));
            let found = if hop.is_empty() {
                "an empty path segment".to_string()
            } else {
                format!("`{}`", hop)
            };
            return Err(ParseError::expected("an identifier", found, hop_span));
        }
        hops.push(hop.to_string());
        offset += hop.len() + 1;
    }
    Ok(Path::new(hops, span))
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parse a complete search string.
pub fn parse_string(source: &str) -> Result<Statement, ParseError> {
    Parser::new(source)?.parse_statement()
}

/// Parse exactly one value.
pub fn parse_value(source: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(source)?;
    let value = parser.parse_value()?;
    parser.expect_end()?;
    Ok(value.value)
}

/// Parse a whole string as a value list.
pub fn parse_value_list(source: &str) -> Result<Vec<Value>, ParseError> {
    Ok(parse_spanned_values(source)?
        .into_iter()
        .map(|v| v.value)
        .collect())
}

/// Parse a whole string as a value list, keeping spans and source text.
pub fn parse_spanned_values(source: &str) -> Result<Vec<Spanned<Value>>, ParseError> {
    Parser::new(source)?.parse_trailing_values()
}
