//! `domain=values` shortcut search.

use hortus_lang::{parse_string, DomainExpression, DomainOp, DomainValues, ParseError, Statement};
use tracing::debug;

use super::value::column_filter;
use super::{SearchContext, SearchStrategy};
use crate::error::{CompileError, Result};
use crate::storage::{ResultSet, Session};

/// Searches one entity's default column, reached by alias or entity name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainSearch;

impl DomainSearch {
    pub fn search_expression(
        &self,
        expr: &DomainExpression,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let shortcut = ctx
            .shortcuts
            .resolve(ctx.schema, &expr.domain.value)
            .ok_or_else(|| CompileError::unresolved_domain(&expr.domain.value).with_span(expr.domain.span))?;

        let filter = match &expr.values {
            DomainValues::Wildcard => None,
            DomainValues::List(values) => {
                match column_filter(&shortcut.column, values, expr.op == DomainOp::Exact) {
                    Some(filter) => Some(filter),
                    None => return Ok(ResultSet::new()),
                }
            }
        };

        let compiled = ctx.compiler().compile_filter(&shortcut.entity, filter.as_ref())?;
        debug!(domain = %expr.domain.value, entity = %shortcut.entity, sql = compiled.sql(), "domain search");
        ctx.execute(&compiled, session)
    }
}

impl SearchStrategy for DomainSearch {
    fn name(&self) -> &'static str {
        "DomainSearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        match parse_string(text)? {
            Statement::Domain(expr) => self.search_expression(&expr, ctx, session),
            other => Err(ParseError::expected(
                "a domain expression such as `fam=Orchidaceae`",
                "another kind of search",
                other.span(),
            )
            .into()),
        }
    }
}
