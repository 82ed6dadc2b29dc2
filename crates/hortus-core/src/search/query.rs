//! Full `domain where filter` search.

use hortus_lang::{parse_string, ParseError, Query, Statement};
use tracing::debug;

use super::{SearchContext, SearchStrategy};
use crate::error::Result;
use crate::storage::{ResultSet, Session};

/// Parses, compiles and executes a full query.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySearch;

impl QuerySearch {
    pub fn search_query(
        &self,
        query: &Query,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let compiled = ctx.compiler().compile(query)?;
        debug!(sql = compiled.sql(), joins = compiled.joins.len(), "query search");
        ctx.execute(&compiled, session)
    }
}

impl SearchStrategy for QuerySearch {
    fn name(&self) -> &'static str {
        "QuerySearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        match parse_string(text)? {
            Statement::Query(query) => self.search_query(&query, ctx, session),
            other => Err(ParseError::expected(
                "a query such as `genus where family.family=Orchidaceae`",
                "another kind of search",
                other.span(),
            )
            .into()),
        }
    }
}
