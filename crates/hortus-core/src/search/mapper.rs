//! The composite strategy that picks an interpretation from the input's shape.

use hortus_lang::{
    parse_string, parse_typed_value, tokenize, DomainExpression, DomainOp, DomainValues,
    ParseError, Query, Statement, Value, ValueList,
};
use hortus_lang::lexer::Token;
use tracing::debug;

use super::value::column_filter;
use super::{BinomialSearch, DomainSearch, QuerySearch, SearchContext, SearchStrategy, ValueSearch};
use crate::error::{CompileError, Result};
use crate::storage::{ResultSet, Session};

/// How a search string will be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchShape {
    /// Bare values with no domain.
    Values(ValueList),
    /// `domain=values` or `domain==values`.
    Domain(DomainExpression),
    /// Exactly two bare words.
    Binomial { genus: String, epithet: String },
    /// `domain where filter`.
    Query(Query),
}

impl SearchShape {
    pub fn name(&self) -> &'static str {
        match self {
            SearchShape::Values(_) => "values",
            SearchShape::Domain(_) => "domain",
            SearchShape::Binomial { .. } => "binomial",
            SearchShape::Query(_) => "query",
        }
    }
}

/// Classify a search string.
///
/// Two unquoted, non-numeric words are the binomial shorthand; everything
/// else is parsed and classified by its statement kind.
pub fn classify(text: &str) -> std::result::Result<SearchShape, ParseError> {
    let tokens = tokenize(text)?;
    if let [first, second] = tokens.as_slice() {
        if let (Token::Word(genus), Token::Word(epithet)) = (&first.token, &second.token) {
            let is_word = |w: &str| matches!(parse_typed_value(w), Value::String(_));
            if is_word(genus) && is_word(epithet) {
                return Ok(SearchShape::Binomial {
                    genus: genus.clone(),
                    epithet: epithet.clone(),
                });
            }
        }
    }

    Ok(match parse_string(text)? {
        Statement::Values(values) => SearchShape::Values(values),
        Statement::Domain(expr) => SearchShape::Domain(expr),
        Statement::Query(query) => SearchShape::Query(query),
    })
}

/// Dispatches to the value, domain, binomial or query strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapperSearch {
    values: ValueSearch,
    domain: DomainSearch,
    binomial: BinomialSearch,
    query: QuerySearch,
}

impl MapperSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search that has already been classified.
    pub fn search_shape(
        &self,
        shape: &SearchShape,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        match shape {
            SearchShape::Values(list) => self.values.search_values(&list.values, ctx, session),
            SearchShape::Domain(expr) => self.domain.search_expression(expr, ctx, session),
            SearchShape::Binomial { genus, epithet } => {
                let mut results = self.binomial.search_pair(genus, epithet, ctx, session)?;
                let words = parse_string(&format!("{} {}", genus, epithet))?;
                if let Statement::Values(list) = words {
                    results.union(self.values.search_values(&list.values, ctx, session)?);
                }
                Ok(results)
            }
            SearchShape::Query(query) => self.query.search_query(query, ctx, session),
        }
    }

    /// The canonical query text each part of the search would run.
    pub fn explain(&self, text: &str, ctx: &SearchContext<'_>) -> Result<Vec<String>> {
        let compiler = ctx.compiler();
        let lines = match classify(text)? {
            SearchShape::Query(query) => vec![compiler.compile(&query)?.explain()],
            SearchShape::Domain(expr) => {
                let shortcut = ctx
                    .shortcuts
                    .resolve(ctx.schema, &expr.domain.value)
                    .ok_or_else(|| {
                        CompileError::unresolved_domain(&expr.domain.value).with_span(expr.domain.span)
                    })?;
                let filter = match &expr.values {
                    DomainValues::Wildcard => None,
                    DomainValues::List(values) => column_filter(
                        &shortcut.column,
                        values,
                        expr.op == DomainOp::Exact,
                    ),
                };
                vec![compiler.compile_filter(&shortcut.entity, filter.as_ref())?.explain()]
            }
            SearchShape::Values(list) => self.explain_values(&list, ctx)?,
            SearchShape::Binomial { genus, epithet } => {
                let config = &ctx.config.binomial;
                let mut lines = vec![format!(
                    "binomial: {}.{} starts with '{}' and {}.{{{}}} starts with '{}' (case-insensitive if nothing matches)",
                    config.genus_entity,
                    config.genus_column,
                    genus,
                    config.species_entity,
                    config.epithet_columns.join(", "),
                    epithet
                )];
                if let Statement::Values(list) = parse_string(text)? {
                    lines.extend(self.explain_values(&list, ctx)?);
                }
                lines
            }
        };
        Ok(lines)
    }

    fn explain_values(&self, list: &ValueList, ctx: &SearchContext<'_>) -> Result<Vec<String>> {
        let compiler = ctx.compiler();
        let mut lines = Vec::new();
        for entity in ctx.schema.searchable_entities() {
            let Some(column) = entity.search_column() else {
                continue;
            };
            if let Some(filter) = column_filter(column, &list.values, false) {
                lines.push(compiler.compile_filter(&entity.name, Some(&filter))?.explain());
            }
        }
        Ok(lines)
    }
}

impl SearchStrategy for MapperSearch {
    fn name(&self) -> &'static str {
        "MapperSearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        let shape = classify(text)?;
        debug!(shape = shape.name(), "dispatching search");
        let results = self.search_shape(&shape, ctx, session)?;
        debug!(shape = shape.name(), matches = results.len(), "search finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_values() {
        assert_eq!(classify("family1").unwrap().name(), "values");
        assert_eq!(classify("Ixora coccinea L.").unwrap().name(), "values");
        assert_eq!(classify("\"Ixora coccinea\"").unwrap().name(), "values");
        assert_eq!(classify("'Ixora' coccinea").unwrap().name(), "values");
        assert_eq!(classify("2001 12").unwrap().name(), "values");
    }

    #[test]
    fn test_classify_binomial() {
        assert_eq!(
            classify("Ix cocc").unwrap(),
            SearchShape::Binomial {
                genus: "Ix".into(),
                epithet: "cocc".into()
            }
        );
    }

    #[test]
    fn test_classify_domain_and_query() {
        assert_eq!(classify("fam=family1").unwrap().name(), "domain");
        assert_eq!(classify("gen==Ixora").unwrap().name(), "domain");
        assert_eq!(classify("genus where id<3").unwrap().name(), "query");
    }

    #[test]
    fn test_classify_errors() {
        assert!(classify("genus where").is_err());
        assert!(classify("$").is_err());
    }
}
