//! Canonical SQL-style rendering of parsed statements.
//!
//! Every comparison is wrapped in parentheses, every `and`/`or` group is
//! wrapped as a whole, and `not` is written as a prefix without its own
//! parentheses. The output is therefore unambiguous regardless of precedence:
//!
//! ```text
//! SELECT * FROM species WHERE ((family = 1.0) OR ((family = 2.0) AND NOT (genus.id = 3.0)))
//! ```

use std::fmt;

use crate::ast::{ComparisonOp, DomainExpression, DomainValues, Filter, Path, Query, Statement};
use crate::value::Value;

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hops.join("."))
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Comparison { path, op, value } => {
                write!(f, "({} {} {})", path, op, value.value)
            }
            Filter::Between { path, low, high } => {
                write!(f, "({} BETWEEN {} AND {})", path, low.value, high.value)
            }
            Filter::In { path, values } => {
                write!(f, "({} IN (", path)?;
                write_joined(f, values.iter().map(|v| &v.value), ", ")?;
                f.write_str("))")
            }
            Filter::Not(inner) => write!(f, "NOT {}", inner),
            Filter::And(children) => write_group(f, children, " AND "),
            Filter::Or(children) => write_group(f, children, " OR "),
            Filter::Aggregate {
                function,
                path,
                op,
                value,
            } => write!(f, "({}({}) {} {})", function.value, path, op, value.value),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, children: &[Filter], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    write_joined(f, children.iter(), separator)?;
    f.write_str(")")
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {} WHERE {}", self.domain.value, self.filter)
    }
}

impl fmt::Display for DomainExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.domain.value, self.op.as_str())?;
        match &self.values {
            DomainValues::Wildcard => f.write_str("*"),
            DomainValues::List(values) => write_joined(f, values.iter().map(|v| &v.value), ", "),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Domain(domain) => write!(f, "{}", domain),
            Statement::Query(query) => write!(f, "{}", query),
            Statement::Values(list) => write_joined(f, list.values.iter().map(|v| &v.value), ", "),
        }
    }
}

/// Render a value list the way it appears inside `IN (...)`.
pub fn render_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(Value::sql_literal)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Filter;
    use pretty_assertions::assert_eq;

    fn name(v: &str) -> Value {
        Value::String(v.into())
    }

    #[test]
    fn test_render_nested_groups() {
        let filter = Filter::Or(vec![
            Filter::compare("family", ComparisonOp::Eq, Value::Number(1.0)),
            Filter::And(vec![
                Filter::compare("family", ComparisonOp::Eq, Value::Number(2.0)),
                Filter::not(Filter::compare("genus.id", ComparisonOp::Eq, Value::Number(3.0))),
            ]),
        ]);
        assert_eq!(
            filter.to_string(),
            "((family = 1.0) OR ((family = 2.0) AND NOT (genus.id = 3.0)))"
        );
    }

    #[test]
    fn test_render_keyword_operators() {
        let like = Filter::compare("family.family", ComparisonOp::Like, name("family%"));
        assert_eq!(like.to_string(), "(family.family LIKE 'family%')");

        let is_not = Filter::compare("author", ComparisonOp::IsNot, Value::Null);
        assert_eq!(is_not.to_string(), "(author IS NOT NULL)");
    }

    #[test]
    fn test_render_values() {
        assert_eq!(
            render_values(&[Value::Number(1.0), name("a'b"), Value::Empty]),
            "1.0, 'a''b', EMPTY"
        );
    }
}
