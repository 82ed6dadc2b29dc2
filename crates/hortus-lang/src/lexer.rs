//! Lexer for search strings using logos.
//!
//! Keywords are matched case-insensitively. Because logos always takes the
//! longest match, a word such as `notes` or `island` lexes as a single
//! [`Token::Word`] and is never split into a keyword plus trailing text.

use chrono::{NaiveDate, NaiveDateTime};
use logos::Logos;

use crate::error::ParseError;
use crate::span::Span;

/// Token types for the search language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Keywords
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("and", ignore(ascii_case))]
    #[token("&&")]
    And,
    #[token("or", ignore(ascii_case))]
    #[token("||")]
    Or,
    #[token("not", ignore(ascii_case))]
    #[token("!")]
    Not,
    #[token("between", ignore(ascii_case))]
    Between,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("contains", ignore(ascii_case))]
    Contains,
    #[token("is", ignore(ascii_case))]
    Is,

    // Comparison operators
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    /// `|datetime|2008,1,31|`, optionally followed by hour, minute, second.
    #[regex(r"\|datetime\|[^|]*\|", |lex| parse_datetime_literal(lex.slice()))]
    DateTime(NaiveDateTime),

    /// Single- or double-quoted value with the quotes removed.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    Quoted(String),

    /// A bare word: identifiers, dotted paths, numbers, `*`, wildcards.
    #[regex(r"[\p{L}\p{N}_%.*;:\-]+", |lex| lex.slice().to_string())]
    Word(String),
}

impl Token {
    /// Short description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Where => "`where`".into(),
            Token::And => "`and`".into(),
            Token::Or => "`or`".into(),
            Token::Not => "`not`".into(),
            Token::Between => "`between`".into(),
            Token::In => "`in`".into(),
            Token::Like => "`like`".into(),
            Token::Contains => "`contains`".into(),
            Token::Is => "`is`".into(),
            Token::EqEq => "`==`".into(),
            Token::Eq => "`=`".into(),
            Token::Ne => "`!=`".into(),
            Token::Le => "`<=`".into(),
            Token::Ge => "`>=`".into(),
            Token::Lt => "`<`".into(),
            Token::Gt => "`>`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::Comma => "`,`".into(),
            Token::DateTime(dt) => format!("datetime `{}`", dt),
            Token::Quoted(s) => format!("quoted value \"{}\"", s),
            Token::Word(w) => format!("word `{}`", w),
        }
    }

    /// Whether this token can start a value.
    ///
    /// Keywords are not counted: in a whitespace-separated list `a and b`
    /// the `and` ends the list.
    pub fn is_value(&self) -> bool {
        matches!(self, Token::Word(_) | Token::Quoted(_) | Token::DateTime(_))
    }

    /// Whether this is a keyword spelled with letters, such as `Or` or `IN`.
    pub fn is_word_keyword(&self, slice: &str) -> bool {
        matches!(
            self,
            Token::Where
                | Token::And
                | Token::Or
                | Token::Not
                | Token::Between
                | Token::In
                | Token::Like
                | Token::Contains
                | Token::Is
        ) && slice.starts_with(|c: char| c.is_ascii_alphabetic())
    }

    /// The bare word this token stands for in value position.
    ///
    /// `slice` is the token's source text, so a keyword keeps the case it was
    /// typed with: `gen=Or` searches for `Or`.
    pub fn as_bare_word(&self, slice: &str) -> Option<String> {
        match self {
            Token::Word(word) => Some(word.clone()),
            keyword if keyword.is_word_keyword(slice) => Some(slice.to_string()),
            _ => None,
        }
    }
}

/// Strip the surrounding quotes and resolve escapes.
fn unquote(slice: &str) -> String {
    unescape(&slice[1..slice.len() - 1])
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(quote @ ('\\' | '"' | '\'')) => result.push(quote),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Parse the body of a `|datetime|...|` literal.
fn parse_datetime_literal(slice: &str) -> Option<NaiveDateTime> {
    let body = slice.strip_prefix("|datetime|")?.strip_suffix('|')?;
    let parts = body
        .split(',')
        .map(|part| part.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if !(3..=6).contains(&parts.len()) {
        return None;
    }

    let part = |i: usize| parts.get(i).copied().unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(part(0)).ok()?,
        u32::try_from(part(1)).ok()?,
        u32::try_from(part(2)).ok()?,
    )?;
    date.and_hms_opt(
        u32::try_from(part(3)).ok()?,
        u32::try_from(part(4)).ok()?,
        u32::try_from(part(5)).ok()?,
    )
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens or a positioned error.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }

    fn error_for(&self) -> ParseError {
        let slice = self.inner.slice();
        let span: Span = self.inner.span().into();
        match slice.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                ParseError::new(format!("unterminated quoted value starting with {}", quote), span)
                    .with_hint(format!("close the value with a matching {}", quote))
            }
            Some('|') => ParseError::new("malformed datetime literal", span)
                .with_hint("write dates as |datetime|YEAR,MONTH,DAY|"),
            Some(other) => ParseError::new(format!("unexpected character '{}'", other), span),
            None => ParseError::new("unexpected end of input", span),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(token) => Some(Ok(SpannedToken {
                token,
                span: self.inner.span().into(),
            })),
            Err(()) => Some(Err(self.error_for())),
        }
    }
}

/// Tokenize a whole search string, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_query_tokens() {
        assert_eq!(
            tokens("genus where family.family=Orchidaceae"),
            vec![
                Token::Word("genus".into()),
                Token::Where,
                Token::Word("family.family".into()),
                Token::Eq,
                Token::Word("Orchidaceae".into()),
            ]
        );
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(
            tokens("WHERE And OR nOt BETWEEN In LIKE contains IS"),
            vec![
                Token::Where,
                Token::And,
                Token::Or,
                Token::Not,
                Token::Between,
                Token::In,
                Token::Like,
                Token::Contains,
                Token::Is,
            ]
        );
    }

    #[test]
    fn test_symbolic_logical_operators() {
        assert_eq!(tokens("&& || !"), vec![Token::And, Token::Or, Token::Not]);
        assert_eq!(tokens("!="), vec![Token::Ne]);
    }

    #[test]
    fn test_keywords_as_bare_words() {
        assert_eq!(Token::Or.as_bare_word("Or"), Some("Or".to_string()));
        assert_eq!(Token::In.as_bare_word("IN"), Some("IN".to_string()));
        assert_eq!(
            Token::Word("Ixora".into()).as_bare_word("Ixora"),
            Some("Ixora".to_string())
        );
        assert_eq!(Token::Or.as_bare_word("||"), None);
        assert_eq!(Token::Not.as_bare_word("!"), None);
        assert_eq!(Token::Eq.as_bare_word("="), None);
    }

    #[test]
    fn test_keyword_prefixes_stay_words() {
        assert_eq!(
            tokens("notes island order android isle"),
            vec![
                Token::Word("notes".into()),
                Token::Word("island".into()),
                Token::Word("order".into()),
                Token::Word("android".into()),
                Token::Word("isle".into()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("= == != < <= > >="),
            vec![
                Token::Eq,
                Token::EqEq,
                Token::Ne,
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
            ]
        );
    }

    #[test]
    fn test_quoted_values() {
        assert_eq!(
            tokens(r#""test1 test2" 'it''s' "say \"hi\"""#),
            vec![
                Token::Quoted("test1 test2".into()),
                Token::Quoted("it".into()),
                Token::Quoted("s".into()),
                Token::Quoted("say \"hi\"".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = tokenize("\"test").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.span.start, 0);

        let err = tokenize("family='tes").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.span.start, 7);
    }

    #[test]
    fn test_datetime_literal() {
        let toks = tokens("|datetime|2008,1,31|");
        let expected = NaiveDate::from_ymd_opt(2008, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(toks, vec![Token::DateTime(expected)]);

        let toks = tokens("|datetime|2008, 1, 31, 14, 30|");
        let expected = NaiveDate::from_ymd_opt(2008, 1, 31)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(toks, vec![Token::DateTime(expected)]);
    }

    #[test]
    fn test_invalid_datetime_is_error() {
        assert!(tokenize("|datetime|2008,13,1|").is_err());
        assert!(tokenize("|datetime|soon|").is_err());
    }

    #[test]
    fn test_bare_word_charset() {
        assert_eq!(tokens("%.-_*"), vec![Token::Word("%.-_*".into())]);
        assert_eq!(tokens("*"), vec![Token::Word("*".into())]);
        assert_eq!(tokens("-0.5"), vec![Token::Word("-0.5".into())]);
        assert_eq!(tokens("Aloë"), vec![Token::Word("Aloë".into())]);
        assert!(tokenize("$").is_err());
    }

    #[test]
    fn test_value_list_punctuation() {
        assert_eq!(
            tokens("in (1, 2,4)"),
            vec![
                Token::In,
                Token::LParen,
                Token::Word("1".into()),
                Token::Comma,
                Token::Word("2".into()),
                Token::Comma,
                Token::Word("4".into()),
                Token::RParen,
            ]
        );
    }
}
