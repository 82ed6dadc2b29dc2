//! Bare value search across every searchable entity.

use hortus_lang::{parse_spanned_values, ComparisonOp, Filter, Path, Spanned, Value};
use tracing::debug;

use super::{SearchContext, SearchStrategy};
use crate::error::Result;
use crate::storage::{ResultSet, Session};

/// Matches each value against the default search column of every entity
/// that has one, and unions the results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSearch;

impl ValueSearch {
    /// Search for already parsed values.
    pub fn search_values<'v>(
        &self,
        values: impl IntoIterator<Item = &'v Spanned<Value>> + Clone,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let compiler = ctx.compiler();
        let mut results = ResultSet::new();

        for entity in ctx.schema.searchable_entities() {
            let Some(column) = entity.search_column() else {
                continue;
            };
            let Some(filter) = column_filter(column, values.clone(), false) else {
                continue;
            };
            let compiled = compiler.compile_filter(&entity.name, Some(&filter))?;
            let found = ctx.execute(&compiled, session)?;
            debug!(entity = %entity.name, matches = found.len(), "value search");
            results.union(found);
        }

        Ok(results)
    }
}

impl SearchStrategy for ValueSearch {
    fn name(&self) -> &'static str {
        "ValueSearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        let values = parse_spanned_values(text)?;
        self.search_values(&values, ctx, session)
    }
}

/// OR of one condition per value on `column`.
///
/// Partial matching uses `contains`, exact matching `=`. `None` is always a
/// null test and `Empty` never matches a column, so it is skipped. Returns
/// `None` when no value is left.
pub(crate) fn column_filter<'v>(
    column: &str,
    values: impl IntoIterator<Item = &'v Spanned<Value>>,
    exact: bool,
) -> Option<Filter> {
    let conditions: Vec<Filter> = values
        .into_iter()
        .filter(|v| !v.value.is_empty_sentinel())
        .map(|v| {
            let op = if exact || v.value.is_null() {
                ComparisonOp::Eq
            } else {
                ComparisonOp::Contains
            };
            Filter::Comparison {
                path: Path::new(vec![column.to_string()], v.span),
                op,
                value: v.clone(),
            }
        })
        .collect();

    if conditions.is_empty() {
        None
    } else {
        Some(Filter::or(conditions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hortus_lang::Span;

    fn spanned(values: &[Value]) -> Vec<Spanned<Value>> {
        values.iter().cloned().map(|v| Spanned::new(v, Span::default())).collect()
    }

    #[test]
    fn test_column_filter_shapes() {
        let values = spanned(&[Value::String("Ix".into()), Value::Null, Value::Empty]);
        let filter = column_filter("genus", &values, false).unwrap();
        assert_eq!(filter.to_string(), "((genus CONTAINS 'Ix') OR (genus = NULL))");

        let filter = column_filter("genus", &values[..1], true).unwrap();
        assert_eq!(filter.to_string(), "(genus = 'Ix')");

        assert!(column_filter("genus", &spanned(&[Value::Empty]), false).is_none());
    }
}
