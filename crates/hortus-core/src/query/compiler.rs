//! Binds parsed filters to the schema.
//!
//! Compilation resolves the domain, turns every relation-hop prefix reported
//! by [`needs_join`] into exactly one join clause, resolves each path leaf
//! against the entity at the end of its own path, and lowers the filter into
//! a [`Predicate`] tree. Top-level `count(...)` conjuncts become
//! [`HavingClause`]s evaluated per root record.
//!
//! The AST is only borrowed, so compiling it twice gives the same result.

use std::collections::HashMap;
use std::fmt::Write as _;

use hortus_lang::{
    needs_join, ComparisonOp, Datum, Filter, JoinPath, Path, Query, Span, Spanned, Value,
};
use tracing::debug;

use crate::catalog::{FieldType, RelationDef, Schema, ShortcutTable, IDENTITY_FIELD};
use crate::error::{CompileError, CompileErrorKind};

/// A column on the root record or on one of the joined records.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Index into [`CompiledQuery::joins`]; `None` for the root entity.
    pub join: Option<usize>,
    pub column: String,
}

/// Scalar comparison operators after lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn from_ast(op: ComparisonOp) -> Option<Self> {
        match op {
            ComparisonOp::Eq | ComparisonOp::Is => Some(CompareOp::Eq),
            ComparisonOp::Ne | ComparisonOp::IsNot => Some(CompareOp::Ne),
            ComparisonOp::Lt => Some(CompareOp::Lt),
            ComparisonOp::Le => Some(CompareOp::Le),
            ComparisonOp::Gt => Some(CompareOp::Gt),
            ComparisonOp::Ge => Some(CompareOp::Ge),
            ComparisonOp::Like | ComparisonOp::Contains => None,
        }
    }

    /// Apply to the result of an ordering comparison.
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
            CompareOp::Lt => ordering == Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Ge => ordering != Less,
        }
    }
}

/// An executable condition over one join binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: Datum,
    },
    /// Case-insensitive LIKE; `pattern` is already lowercased.
    Like { column: ColumnRef, pattern: String },
    /// Explicit null test.
    IsNull {
        column: ColumnRef,
        negated: bool,
        empty_string_is_null: bool,
    },
    /// Inclusive range.
    Between {
        column: ColumnRef,
        low: Datum,
        high: Datum,
    },
    In { column: ColumnRef, values: Vec<Datum> },
    /// Whether `relation`, followed from the record at `join`, reaches nothing.
    RelationEmpty {
        join: Option<usize>,
        relation: RelationDef,
        negated: bool,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// One relation traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Full hop sequence from the root.
    pub path: JoinPath,
    /// The clause this one continues from; `None` joins from the root.
    pub parent: Option<usize>,
    pub relation: RelationDef,
}

/// `count(column) op value`, evaluated per root record.
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub column: ColumnRef,
    pub op: CompareOp,
    pub value: f64,
}

/// A query bound to the schema and ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Root entity.
    pub entity: String,
    pub joins: Vec<JoinClause>,
    /// `None` selects every root record.
    pub predicate: Option<Predicate>,
    pub having: Vec<HavingClause>,
    sql: String,
}

impl CompiledQuery {
    /// Canonical rendering: `SELECT * FROM <domain> WHERE <predicate>`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Multi-line description of the plan for diagnostics.
    pub fn explain(&self) -> String {
        let mut out = format!("{}\n  root: {}\n", self.sql, self.entity);
        for (i, join) in self.joins.iter().enumerate() {
            let from = match join.parent {
                Some(parent) => format!("#{}", parent),
                None => "root".to_string(),
            };
            let _ = writeln!(
                out,
                "  join #{} {} -> {} ({}.{} = {}.{}) from {}",
                i,
                join.path,
                join.relation.to_entity,
                join.relation.from_entity,
                join.relation.from_field,
                join.relation.to_entity,
                join.relation.to_field,
                from
            );
        }
        for having in &self.having {
            let _ = writeln!(
                out,
                "  having count({}) {} {}",
                having.column.column,
                having.op.as_str(),
                having.value
            );
        }
        out
    }
}

/// Compiles parsed queries against a schema.
pub struct Compiler<'a> {
    schema: &'a Schema,
    shortcuts: &'a ShortcutTable,
    empty_string_is_null: bool,
}

/// Per-compilation state.
struct Scope<'q> {
    root: &'q str,
    joins: Vec<JoinClause>,
    index: HashMap<Vec<String>, usize>,
}

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema, shortcuts: &'a ShortcutTable) -> Self {
        Self {
            schema,
            shortcuts,
            empty_string_is_null: true,
        }
    }

    /// Whether null tests also accept the empty string.
    pub fn with_empty_string_is_null(mut self, enabled: bool) -> Self {
        self.empty_string_is_null = enabled;
        self
    }

    /// Resolve a domain through the shortcut table or as an entity name.
    pub fn resolve_domain(&self, domain: &Spanned<String>) -> Result<String, CompileError> {
        if let Some(shortcut) = self.shortcuts.get(&domain.value) {
            return Ok(shortcut.entity.clone());
        }
        match self.schema.get_entity(&domain.value) {
            Some(entity) => Ok(entity.name.clone()),
            None => Err(CompileError::unresolved_domain(&domain.value).with_span(domain.span)),
        }
    }

    /// Compile a `domain where filter` query.
    pub fn compile(&self, query: &Query) -> Result<CompiledQuery, CompileError> {
        let entity = self.resolve_domain(&query.domain)?;
        let mut compiled = self.compile_filter(&entity, Some(&query.filter))?;
        compiled.sql = query.to_string();
        Ok(compiled)
    }

    /// Compile a filter rooted at an already resolved entity.
    ///
    /// With no filter every record of the entity is selected.
    pub fn compile_filter(
        &self,
        entity: &str,
        filter: Option<&Filter>,
    ) -> Result<CompiledQuery, CompileError> {
        if self.schema.get_entity(entity).is_none() {
            return Err(CompileError::unresolved_domain(entity));
        }

        let Some(filter) = filter else {
            return Ok(CompiledQuery {
                entity: entity.to_string(),
                joins: Vec::new(),
                predicate: None,
                having: Vec::new(),
                sql: format!("SELECT * FROM {}", entity),
            });
        };

        let mut scope = Scope {
            root: entity,
            joins: Vec::new(),
            index: HashMap::new(),
        };
        for path in needs_join(filter) {
            self.add_join(&mut scope, &path)
                .map_err(|e| with_path_span(e, filter, &path))?;
        }

        let conjuncts: Vec<&Filter> = match filter {
            Filter::And(children) => children.iter().collect(),
            other => vec![other],
        };
        let mut predicates = Vec::new();
        let mut having = Vec::new();
        for conjunct in conjuncts {
            if let Filter::Aggregate {
                function,
                path,
                op,
                value,
            } = conjunct
            {
                having.push(self.compile_aggregate(&scope, function, path, *op, value)?);
            } else {
                predicates.push(self.lower(&scope, conjunct)?);
            }
        }

        let predicate = match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        };

        debug!(
            entity = %entity,
            joins = scope.joins.len(),
            having = having.len(),
            "compiled filter"
        );

        Ok(CompiledQuery {
            entity: entity.to_string(),
            joins: scope.joins,
            predicate,
            having,
            sql: format!("SELECT * FROM {} WHERE {}", entity, filter),
        })
    }

    /// Add a clause for `path` and for any prefix not yet joined.
    fn add_join(&self, scope: &mut Scope<'_>, path: &JoinPath) -> Result<(), CompileError> {
        for depth in 1..=path.len() {
            let prefix = &path.hops[..depth];
            if scope.index.contains_key(prefix) {
                continue;
            }
            let parent = if depth == 1 {
                None
            } else {
                scope.index.get(&path.hops[..depth - 1]).copied()
            };
            let from_entity = match parent {
                Some(i) => scope.joins[i].relation.to_entity.as_str(),
                None => scope.root,
            };
            let name = &prefix[depth - 1];
            let relation = self
                .schema
                .relation(from_entity, name)
                .ok_or_else(|| CompileError::join_resolution(from_entity, name))?
                .clone();

            scope.index.insert(prefix.to_vec(), scope.joins.len());
            scope.joins.push(JoinClause {
                path: JoinPath::new(prefix.to_vec()),
                parent,
                relation,
            });
        }
        Ok(())
    }

    fn lower(&self, scope: &Scope<'_>, filter: &Filter) -> Result<Predicate, CompileError> {
        match filter {
            Filter::And(children) => Ok(Predicate::And(
                children
                    .iter()
                    .map(|c| self.lower(scope, c))
                    .collect::<Result<_, _>>()?,
            )),
            Filter::Or(children) => Ok(Predicate::Or(
                children
                    .iter()
                    .map(|c| self.lower(scope, c))
                    .collect::<Result<_, _>>()?,
            )),
            Filter::Not(inner) => Ok(Predicate::Not(Box::new(self.lower(scope, inner)?))),
            Filter::Aggregate { function, .. } => Err(CompileError::new(
                CompileErrorKind::MisplacedAggregate,
                format!(
                    "{}(...) may only be combined with 'and' at the top level",
                    function.value
                ),
            )
            .with_span(function.span)),
            Filter::Comparison { path, op, value } => self.lower_comparison(scope, path, *op, value),
            Filter::Between { path, low, high } => {
                let (column, field_type) = self.typed_column(scope, path)?;
                Ok(Predicate::Between {
                    column,
                    low: scalar(low, "between", field_type)?,
                    high: scalar(high, "between", field_type)?,
                })
            }
            Filter::In { path, values } => {
                let (column, field_type) = self.typed_column(scope, path)?;
                let values = values
                    .iter()
                    .map(|v| match v.value {
                        Value::Empty => Err(empty_operand(v.span, "in")),
                        _ => Ok(coerce(v, field_type)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Predicate::In { column, values })
            }
        }
    }

    fn lower_comparison(
        &self,
        scope: &Scope<'_>,
        path: &Path,
        op: ComparisonOp,
        value: &Spanned<Value>,
    ) -> Result<Predicate, CompileError> {
        let (join, owner) = self.owner(scope, path)?;
        let leaf = path.leaf();

        if !self.has_column(owner, leaf) {
            let relation = self
                .schema
                .relation(owner, leaf)
                .ok_or_else(|| CompileError::ambiguous_path(owner, leaf).with_span(path.span))?;
            let negated = match (op, &value.value) {
                (ComparisonOp::Eq | ComparisonOp::Is, Value::Empty) => false,
                (ComparisonOp::Ne | ComparisonOp::IsNot, Value::Empty) => true,
                _ => {
                    return Err(CompileError::new(
                        CompileErrorKind::AmbiguousPath,
                        format!(
                            "'{}' is a relation of '{}'; compare one of its columns or test it against Empty",
                            leaf, owner
                        ),
                    )
                    .with_span(path.span))
                }
            };
            return Ok(Predicate::RelationEmpty {
                join,
                relation: relation.clone(),
                negated,
            });
        }

        let field_type = self.field_type(owner, leaf);
        let column = ColumnRef {
            join,
            column: leaf.to_string(),
        };
        match (&value.value, op) {
            (Value::Empty, _) => Err(empty_operand(value.span, op.as_str())),
            (Value::Null, ComparisonOp::Eq | ComparisonOp::Is) => Ok(Predicate::IsNull {
                column,
                negated: false,
                empty_string_is_null: self.empty_string_is_null,
            }),
            (Value::Null, ComparisonOp::Ne | ComparisonOp::IsNot) => Ok(Predicate::IsNull {
                column,
                negated: true,
                empty_string_is_null: self.empty_string_is_null,
            }),
            (Value::Null, op) => Err(CompileError::invalid_operand(format!(
                "None can only be tested with 'is', 'is not', '=' or '!=', not '{}'",
                op.as_str()
            ))
            .with_span(value.span)),
            (_, ComparisonOp::Like) => Ok(Predicate::Like {
                column,
                pattern: pattern_of(value).to_lowercase(),
            }),
            (_, ComparisonOp::Contains) => Ok(Predicate::Like {
                column,
                pattern: format!("%{}%", pattern_of(value).to_lowercase()),
            }),
            (_, op) => match CompareOp::from_ast(op) {
                Some(op) => Ok(Predicate::Compare {
                    column,
                    op,
                    value: coerce(value, field_type),
                }),
                None => Err(CompileError::invalid_operand(format!(
                    "operator '{}' cannot be used here",
                    op.as_str()
                ))
                .with_span(value.span)),
            },
        }
    }

    fn compile_aggregate(
        &self,
        scope: &Scope<'_>,
        function: &Spanned<String>,
        path: &Path,
        op: ComparisonOp,
        value: &Spanned<Value>,
    ) -> Result<HavingClause, CompileError> {
        if !function.value.eq_ignore_ascii_case("count") {
            return Err(CompileError::new(
                CompileErrorKind::UnsupportedAggregate,
                format!("unsupported aggregate '{}'; only count is supported", function.value),
            )
            .with_span(function.span));
        }
        let column = self.column(scope, path)?;
        let op = CompareOp::from_ast(op).ok_or_else(|| {
            CompileError::invalid_operand(format!("count cannot be compared with '{}'", op.as_str()))
                .with_span(value.span)
        })?;
        let value = value.value.as_number().ok_or_else(|| {
            CompileError::invalid_operand(format!(
                "count must be compared with a number, not {}",
                value.value.type_name()
            ))
            .with_span(value.span)
        })?;

        Ok(HavingClause { column, op, value })
    }

    /// Resolve the join and entity a path's leaf belongs to.
    fn owner<'s>(
        &self,
        scope: &'s Scope<'_>,
        path: &Path,
    ) -> Result<(Option<usize>, &'s str), CompileError> {
        let relations = path.relations();
        if relations.is_empty() {
            return Ok((None, scope.root));
        }
        let join = scope.index.get(relations).copied().ok_or_else(|| {
            CompileError::new(
                CompileErrorKind::JoinResolution,
                format!("no join for '{}'", relations.join(".")),
            )
            .with_span(path.span)
        })?;
        Ok((Some(join), scope.joins[join].relation.to_entity.as_str()))
    }

    /// A path whose leaf must be a column.
    fn column(&self, scope: &Scope<'_>, path: &Path) -> Result<ColumnRef, CompileError> {
        Ok(self.typed_column(scope, path)?.0)
    }

    fn typed_column(
        &self,
        scope: &Scope<'_>,
        path: &Path,
    ) -> Result<(ColumnRef, Option<FieldType>), CompileError> {
        let (join, owner) = self.owner(scope, path)?;
        if !self.has_column(owner, path.leaf()) {
            return Err(CompileError::ambiguous_path(owner, path.leaf()).with_span(path.span));
        }
        let column = ColumnRef {
            join,
            column: path.leaf().to_string(),
        };
        Ok((column, self.field_type(owner, path.leaf())))
    }

    /// Declared type of a column; the identity is always a number.
    fn field_type(&self, entity: &str, column: &str) -> Option<FieldType> {
        if column == IDENTITY_FIELD {
            return Some(FieldType::Number);
        }
        self.schema
            .get_entity(entity)?
            .get_field(column)
            .map(|f| f.field_type)
    }

    fn has_column(&self, entity: &str, column: &str) -> bool {
        self.schema
            .get_entity(entity)
            .is_some_and(|e| e.has_column(column))
    }
}

/// Pattern text of a literal, as typed when it came from the source.
fn pattern_of(value: &Spanned<Value>) -> String {
    match (&value.value, &value.raw) {
        (Value::Number(_), Some(raw)) => raw.clone(),
        (literal, _) => literal.pattern_text().unwrap_or_default(),
    }
}

/// Express a literal as the kind of value its column holds.
///
/// A number compared with a text column becomes its source text, so
/// `code=2001.0010` matches the code `"2001.0010"`. A quoted number compared
/// with a number column becomes a number.
fn coerce(value: &Spanned<Value>, field_type: Option<FieldType>) -> Datum {
    match (&value.value, field_type) {
        (Value::Number(_), Some(FieldType::Text)) => Datum::Text(pattern_of(value)),
        (Value::String(text), Some(FieldType::Number)) => match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Datum::Number(n),
            _ => Datum::Text(text.clone()),
        },
        (literal, _) => literal.express(),
    }
}

fn scalar(
    value: &Spanned<Value>,
    op: &str,
    field_type: Option<FieldType>,
) -> Result<Datum, CompileError> {
    match value.value {
        Value::Null => Err(CompileError::invalid_operand(format!("None cannot be used with '{}'", op))
            .with_span(value.span)),
        Value::Empty => Err(empty_operand(value.span, op)),
        _ => Ok(coerce(value, field_type)),
    }
}

fn empty_operand(span: Span, op: &str) -> CompileError {
    CompileError::invalid_operand(format!(
        "Empty can only be compared with a relation using '=' or '!=', not '{}'",
        op
    ))
    .with_span(span)
}

/// Point a join error at the first path that needed the join.
fn with_path_span(err: CompileError, filter: &Filter, join: &JoinPath) -> CompileError {
    let mut stack = vec![filter];
    while let Some(node) = stack.pop() {
        match node {
            Filter::And(children) | Filter::Or(children) => stack.extend(children.iter().rev()),
            Filter::Not(inner) => stack.push(inner),
            leaf => {
                if let Some(path) = leaf.path() {
                    if path.relations() == join.hops.as_slice() {
                        return err.with_span(path.span);
                    }
                }
            }
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, FieldDef};
    use hortus_lang::{parse_string, Statement};
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::new()
            .with_entity(
                EntityDef::new("family")
                    .with_fields([FieldDef::text("family"), FieldDef::text("qualifier")])
                    .with_search_column("family")
                    .with_alias("fam"),
            )
            .with_entity(
                EntityDef::new("genus")
                    .with_fields([
                        FieldDef::text("genus"),
                        FieldDef::text("author"),
                        FieldDef::number("family_id"),
                    ])
                    .with_search_column("genus")
                    .with_alias("gen"),
            )
            .with_entity(
                EntityDef::new("species")
                    .with_fields([FieldDef::text("sp"), FieldDef::number("genus_id")]),
            )
            .with_entity(
                EntityDef::new("accession")
                    .with_fields([FieldDef::text("code"), FieldDef::number("species_id")]),
            )
            .with_entity(
                EntityDef::new("plant")
                    .with_fields([FieldDef::text("code"), FieldDef::number("accession_id")]),
            )
            .with_relation(RelationDef::many_to_one("family", "genus", "family_id", "family"))
            .with_relation(RelationDef::one_to_many("genera", "family", "genus", "family_id"))
            .with_relation(RelationDef::many_to_one("genus", "species", "genus_id", "genus"))
            .with_relation(RelationDef::one_to_many("species", "genus", "species", "genus_id"))
            .with_relation(RelationDef::many_to_one("species", "accession", "species_id", "species"))
            .with_relation(RelationDef::many_to_one("accession", "plant", "accession_id", "accession"))
    }

    fn compile(source: &str) -> Result<CompiledQuery, CompileError> {
        let schema = schema();
        let shortcuts = ShortcutTable::from_schema(&schema);
        let Statement::Query(query) = parse_string(source).unwrap() else {
            panic!("expected a query");
        };
        Compiler::new(&schema, &shortcuts).compile(&query)
    }

    fn kind(source: &str) -> CompileErrorKind {
        compile(source).unwrap_err().kind
    }

    #[test]
    fn test_sql_rendering() {
        let compiled = compile("species where genus.genus=genus1").unwrap();
        assert_eq!(compiled.sql(), "SELECT * FROM species WHERE (genus.genus = 'genus1')");
    }

    #[test]
    fn test_sql_needs_resolvable_paths() {
        // `species.genus` reads as a relation named `species` on species.
        let source = "species where species.genus=genus1";
        assert_eq!(
            parse_string(source).unwrap().to_string(),
            "SELECT * FROM species WHERE (species.genus = 'genus1')"
        );
        assert_eq!(kind(source), CompileErrorKind::JoinResolution);
    }

    #[test]
    fn test_literals_coerced_to_column_type() {
        let code = |join| ColumnRef {
            join,
            column: "code".into(),
        };

        let compiled = compile("accession where code=2001.0010").unwrap();
        assert_eq!(
            compiled.predicate,
            Some(Predicate::Compare {
                column: code(None),
                op: CompareOp::Eq,
                value: Datum::Text("2001.0010".into()),
            })
        );

        let compiled = compile("accession where code between 2001.0001 and 2001.0100").unwrap();
        assert_eq!(
            compiled.predicate,
            Some(Predicate::Between {
                column: code(None),
                low: Datum::Text("2001.0001".into()),
                high: Datum::Text("2001.0100".into()),
            })
        );

        let compiled = compile("plant where accession.code contains 2001.0010").unwrap();
        assert_eq!(
            compiled.predicate,
            Some(Predicate::Like {
                column: code(Some(0)),
                pattern: "%2001.0010%".into(),
            })
        );

        let compiled = compile("accession where species_id in '3', 4").unwrap();
        assert!(matches!(
            compiled.predicate,
            Some(Predicate::In { ref values, .. })
                if *values == [Datum::Number(3.0), Datum::Number(4.0)]
        ));
    }

    #[test]
    fn test_joins_once_per_prefix() {
        let compiled = compile("plant where accession.id=4 or accession.species.id=3 or accession.code=x").unwrap();
        let paths: Vec<String> = compiled.joins.iter().map(|j| j.path.to_string()).collect();
        assert_eq!(paths, vec!["accession", "accession.species"]);
        assert_eq!(compiled.joins[1].parent, Some(0));
    }

    #[test]
    fn test_implicit_prefix_join() {
        let compiled = compile("plant where accession.species.id=113").unwrap();
        assert_eq!(compiled.joins.len(), 2);
        assert_eq!(compiled.joins[0].relation.to_entity, "accession");
        assert_eq!(compiled.joins[1].relation.to_entity, "species");
        assert_eq!(
            compiled.predicate,
            Some(Predicate::Compare {
                column: ColumnRef {
                    join: Some(1),
                    column: "id".into()
                },
                op: CompareOp::Eq,
                value: Datum::Number(113.0),
            })
        );
    }

    #[test]
    fn test_leaf_resolves_against_own_entity() {
        // `id` exists on every entity; each occurrence binds to its own join.
        let compiled = compile("plant where id=1 and accession.id=2 and accession.species.id=3").unwrap();
        let Some(Predicate::And(preds)) = compiled.predicate else {
            panic!("expected and");
        };
        let joins: Vec<Option<usize>> = preds
            .iter()
            .map(|p| match p {
                Predicate::Compare { column, .. } => column.join,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(joins, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_alias_domain() {
        let compiled = compile("gen where id<3").unwrap();
        assert_eq!(compiled.entity, "genus");
        assert_eq!(compiled.sql(), "SELECT * FROM gen WHERE (id < 3.0)");
    }

    #[test]
    fn test_null_tests() {
        for (source, negated) in [
            ("genus where author is None", false),
            ("genus where author = None", false),
            ("genus where author is not None", true),
            ("genus where author != None", true),
        ] {
            let compiled = compile(source).unwrap();
            assert!(
                matches!(compiled.predicate, Some(Predicate::IsNull { negated: n, .. }) if n == negated),
                "{}",
                source
            );
        }
        assert_eq!(kind("genus where author < None"), CompileErrorKind::InvalidOperand);
    }

    #[test]
    fn test_like_and_contains_patterns() {
        let compiled = compile("genus where genus like 'IX%'").unwrap();
        assert!(matches!(compiled.predicate, Some(Predicate::Like { ref pattern, .. }) if pattern == "ix%"));

        let compiled = compile("genus where genus contains Or").unwrap();
        assert!(matches!(compiled.predicate, Some(Predicate::Like { ref pattern, .. }) if pattern == "%or%"));
    }

    #[test]
    fn test_relation_emptiness() {
        let compiled = compile("family where genera = Empty").unwrap();
        assert!(matches!(
            compiled.predicate,
            Some(Predicate::RelationEmpty { negated: false, join: None, .. })
        ));
        let compiled = compile("family where genera != Empty").unwrap();
        assert!(matches!(compiled.predicate, Some(Predicate::RelationEmpty { negated: true, .. })));

        assert_eq!(kind("family where genera = x"), CompileErrorKind::AmbiguousPath);
        assert_eq!(kind("genus where author = Empty"), CompileErrorKind::InvalidOperand);
    }

    #[test]
    fn test_aggregate_becomes_having() {
        let compiled = compile("genus where count(species.id) > 1 and genus like 'i%'").unwrap();
        assert_eq!(compiled.having.len(), 1);
        assert_eq!(compiled.having[0].op, CompareOp::Gt);
        assert_eq!(compiled.having[0].value, 1.0);
        assert_eq!(compiled.having[0].column.join, Some(0));
        assert!(matches!(compiled.predicate, Some(Predicate::Like { .. })));

        let only = compile("genus where count(species.id) >= 2").unwrap();
        assert!(only.predicate.is_none());
    }

    #[test]
    fn test_aggregate_errors() {
        assert_eq!(kind("genus where sum(species.id) > 1"), CompileErrorKind::UnsupportedAggregate);
        assert_eq!(
            kind("genus where genus=x or count(species.id) > 1"),
            CompileErrorKind::MisplacedAggregate
        );
        assert_eq!(kind("genus where count(species.id) > many"), CompileErrorKind::InvalidOperand);
        assert_eq!(kind("genus where count(species.id) like 1"), CompileErrorKind::InvalidOperand);
    }

    #[test]
    fn test_resolution_errors() {
        let err = compile("cultivar where id=1").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnresolvedDomain);
        assert_eq!(err.span, Some(Span::new(0, 8)));

        let err = compile("genus where famly.family=x").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::JoinResolution);
        assert_eq!(err.span, Some(Span::new(12, 24)));

        assert_eq!(kind("genus where family.nope=x"), CompileErrorKind::AmbiguousPath);
        assert_eq!(kind("genus where nope=x"), CompileErrorKind::AmbiguousPath);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let schema = schema();
        let shortcuts = ShortcutTable::from_schema(&schema);
        let Statement::Query(query) =
            parse_string("plant where accession.species.id=1 or not accession.code like '20%'").unwrap()
        else {
            panic!("expected a query");
        };
        let before = query.clone();
        let compiler = Compiler::new(&schema, &shortcuts);
        let first = compiler.compile(&query).unwrap();
        let second = compiler.compile(&query).unwrap();
        assert_eq!(first, second);
        assert_eq!(query, before);
    }

    #[test]
    fn test_wildcard_compilation() {
        let schema = schema();
        let shortcuts = ShortcutTable::from_schema(&schema);
        let compiled = Compiler::new(&schema, &shortcuts).compile_filter("genus", None).unwrap();
        assert_eq!(compiled.sql(), "SELECT * FROM genus");
        assert!(compiled.predicate.is_none());
    }

    #[test]
    fn test_explain_lists_joins() {
        let compiled = compile("plant where accession.species.id=113").unwrap();
        let explain = compiled.explain();
        assert!(explain.contains("join #0 accession -> accession"));
        assert!(explain.contains("join #1 accession.species -> species"));
        assert!(explain.contains("from #0"));
    }
}
