//! Abstract syntax tree for search strings.

use crate::span::{Span, Spanned};
use crate::value::Value;

/// A parsed search string.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `domain=values`, `domain==values` or `domain=*`.
    Domain(DomainExpression),
    /// `domain where filter`.
    Query(Query),
    /// One or more bare values with no domain.
    Values(ValueList),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Domain(d) => d.span,
            Statement::Query(q) => q.span,
            Statement::Values(v) => v.span,
        }
    }
}

/// `domain (= | ==) (value_list | *)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainExpression {
    /// Entity name or shortcut alias.
    pub domain: Spanned<String>,
    pub op: DomainOp,
    pub values: DomainValues,
    pub span: Span,
}

/// Operator of a domain expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOp {
    /// `=`: case-insensitive partial match on the default column.
    Partial,
    /// `==`: exact match on the default column.
    Exact,
}

impl DomainOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainOp::Partial => "=",
            DomainOp::Exact => "==",
        }
    }
}

/// Right-hand side of a domain expression.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainValues {
    /// `*`: every record of the domain.
    Wildcard,
    List(Vec<Spanned<Value>>),
}

/// `domain where filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub domain: Spanned<String>,
    pub filter: Filter,
    pub span: Span,
}

/// Bare values searched across every entity's default column.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueList {
    pub values: Vec<Spanned<Value>>,
    pub span: Span,
}

impl ValueList {
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|v| &v.value)
    }
}

/// A dotted attribute reference: relation hops followed by a leaf name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pub hops: Vec<String>,
    pub span: Span,
}

impl Path {
    pub fn new(hops: Vec<String>, span: Span) -> Self {
        Self { hops, span }
    }

    /// Build a path from a dotted string, without position information.
    pub fn dotted(path: &str) -> Self {
        Self::new(path.split('.').map(str::to_string).collect(), Span::default())
    }

    /// The relation hops, i.e. every segment but the last.
    pub fn relations(&self) -> &[String] {
        match self.hops.split_last() {
            Some((_, relations)) => relations,
            None => &[],
        }
    }

    /// The leaf attribute name.
    pub fn leaf(&self) -> &str {
        self.hops.last().map(String::as_str).unwrap_or_default()
    }

    pub fn dotted_name(&self) -> String {
        self.hops.join(".")
    }
}

/// A predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `path op value`.
    Comparison {
        path: Path,
        op: ComparisonOp,
        value: Spanned<Value>,
    },
    /// `path between low and high`, inclusive.
    Between {
        path: Path,
        low: Spanned<Value>,
        high: Spanned<Value>,
    },
    /// `path in v1, v2, ...`.
    In {
        path: Path,
        values: Vec<Spanned<Value>>,
    },
    Not(Box<Filter>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// `function(path) op value`. Only `count` compiles.
    Aggregate {
        function: Spanned<String>,
        path: Path,
        op: ComparisonOp,
        value: Spanned<Value>,
    },
}

impl Filter {
    /// AND of conditions; a single condition is returned unwrapped.
    pub fn and(mut conditions: Vec<Filter>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Filter::And(conditions)
        }
    }

    /// OR of conditions; a single condition is returned unwrapped.
    pub fn or(mut conditions: Vec<Filter>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Filter::Or(conditions)
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Convenience constructor for an unspanned comparison.
    pub fn compare(path: &str, op: ComparisonOp, value: Value) -> Self {
        Filter::Comparison {
            path: Path::dotted(path),
            op,
            value: Spanned::new(value, Span::default()),
        }
    }

    /// The path this node tests, for leaf nodes.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Filter::Comparison { path, .. }
            | Filter::Between { path, .. }
            | Filter::In { path, .. }
            | Filter::Aggregate { path, .. } => Some(path),
            Filter::Not(_) | Filter::And(_) | Filter::Or(_) => None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Filter::Aggregate { .. })
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `=` or `==`.
    Eq,
    /// `!=`.
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-insensitive pattern match; the caller supplies `%` and `_`.
    Like,
    /// Case-insensitive substring match.
    Contains,
    /// `is`: null test against `None`, otherwise equality.
    Is,
    /// `is not`.
    IsNot,
}

impl ComparisonOp {
    /// Canonical spelling used when rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Like => "LIKE",
            ComparisonOp::Contains => "CONTAINS",
            ComparisonOp::Is => "IS",
            ComparisonOp::IsNot => "IS NOT",
        }
    }

    /// Whether the operator orders its operands.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge
        )
    }
}
