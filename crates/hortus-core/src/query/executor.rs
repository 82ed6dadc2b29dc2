//! Query executor.
//!
//! For every root record the executor enumerates the inner-join bindings of
//! the compiled join clauses, evaluates the predicate on each binding with
//! SQL three-valued logic, and keeps the root when at least one binding is
//! definitely true. Having clauses count over the matching bindings of the
//! root, the way `GROUP BY root.id HAVING count(...)` would.

use hortus_lang::Datum;
use tracing::{debug, trace};

use super::compiler::{ColumnRef, CompareOp, CompiledQuery, HavingClause, JoinClause, Predicate};
use super::filter::FilterEvaluator;
use crate::error::StorageError;
use crate::storage::{Record, ResultSet, Session};

static NULL: Datum = Datum::Null;

/// One combination of joined records, indexed like the join clauses.
type Binding = Vec<Record>;

/// Runs compiled queries against a session.
pub struct QueryExecutor<'a> {
    session: &'a dyn Session,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    /// Execute a compiled query, returning the matching root records.
    pub fn execute(&self, query: &CompiledQuery) -> Result<ResultSet, StorageError> {
        let roots = self.session.scan(&query.entity)?;
        let scanned = roots.len();
        let mut results = ResultSet::new();

        for root in roots {
            let bindings = self.bindings(&root, &query.joins)?;
            let mut matching = Vec::new();
            for binding in bindings {
                let matched = match &query.predicate {
                    Some(predicate) => self.evaluate(predicate, &root, &binding)? == Some(true),
                    None => true,
                };
                if matched {
                    matching.push(binding);
                }
            }

            if matching.is_empty() {
                continue;
            }
            if query
                .having
                .iter()
                .all(|having| having_holds(having, &root, &matching))
            {
                results.insert(root);
            }
        }

        debug!(
            entity = %query.entity,
            scanned,
            matches = results.len(),
            "executed query"
        );
        Ok(results)
    }

    /// Every inner-join combination of related records for `root`.
    fn bindings(&self, root: &Record, joins: &[JoinClause]) -> Result<Vec<Binding>, StorageError> {
        let mut bindings: Vec<Binding> = vec![Vec::with_capacity(joins.len())];

        for join in joins {
            let mut next = Vec::new();
            for binding in bindings {
                let parent = match join.parent {
                    Some(i) => match binding.get(i) {
                        Some(record) => record,
                        None => continue,
                    },
                    None => root,
                };
                let related = self.session.related(parent, &join.relation)?;
                for record in related {
                    let mut extended = binding.clone();
                    extended.push(record);
                    next.push(extended);
                }
            }
            bindings = next;
            if bindings.is_empty() {
                trace!(root = root.id, join = %join.path, "no related records");
                break;
            }
        }

        Ok(bindings)
    }

    /// Evaluate a predicate; `None` is SQL's unknown.
    fn evaluate(
        &self,
        predicate: &Predicate,
        root: &Record,
        binding: &Binding,
    ) -> Result<Option<bool>, StorageError> {
        let result = match predicate {
            Predicate::Compare { column, op, value } => {
                let actual = resolve(column, root, binding);
                if actual.is_null() {
                    None
                } else {
                    match FilterEvaluator::compare_datum(actual, value) {
                        Some(ordering) => Some(op.accepts(ordering)),
                        // Values of different kinds are unequal but unordered.
                        None => match op {
                            CompareOp::Eq => Some(false),
                            CompareOp::Ne => Some(true),
                            _ => None,
                        },
                    }
                }
            }
            Predicate::Like { column, pattern } => resolve(column, root, binding)
                .to_text()
                .map(|text| FilterEvaluator::like_match(&text.to_lowercase(), pattern)),
            Predicate::IsNull {
                column,
                negated,
                empty_string_is_null,
            } => {
                let is_null =
                    FilterEvaluator::is_null(resolve(column, root, binding), *empty_string_is_null);
                Some(is_null != *negated)
            }
            Predicate::Between { column, low, high } => {
                let actual = resolve(column, root, binding);
                if actual.is_null() {
                    None
                } else {
                    let above = FilterEvaluator::compare_datum(actual, low).map(|o| o.is_ge());
                    let below = FilterEvaluator::compare_datum(actual, high).map(|o| o.is_le());
                    and3([above, below])
                }
            }
            Predicate::In { column, values } => {
                let actual = resolve(column, root, binding);
                if actual.is_null() {
                    None
                } else if values.iter().any(|v| FilterEvaluator::datum_equal(actual, v)) {
                    Some(true)
                } else if values.iter().any(Datum::is_null) {
                    None
                } else {
                    Some(false)
                }
            }
            Predicate::RelationEmpty {
                join,
                relation,
                negated,
            } => {
                let source = match join {
                    Some(i) => binding.get(*i).unwrap_or(root),
                    None => root,
                };
                let empty = self.session.related(source, relation)?.is_empty();
                Some(empty != *negated)
            }
            Predicate::Not(inner) => self.evaluate(inner, root, binding)?.map(|b| !b),
            Predicate::And(children) => {
                let mut result = Some(true);
                for child in children {
                    match self.evaluate(child, root, binding)? {
                        Some(false) => return Ok(Some(false)),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Predicate::Or(children) => {
                let mut result = Some(false);
                for child in children {
                    match self.evaluate(child, root, binding)? {
                        Some(true) => return Ok(Some(true)),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
        };
        Ok(result)
    }
}

fn resolve<'r>(column: &ColumnRef, root: &'r Record, binding: &'r Binding) -> &'r Datum {
    match column.join {
        None => root.get(&column.column),
        Some(i) => binding.get(i).map_or(&NULL, |record| record.get(&column.column)),
    }
}

fn and3(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut result = Some(true);
    for value in values {
        match value {
            Some(false) => return Some(false),
            None => result = None,
            Some(true) => {}
        }
    }
    result
}

fn having_holds(having: &HavingClause, root: &Record, matching: &[Binding]) -> bool {
    let count = matching
        .iter()
        .filter(|binding| !resolve(&having.column, root, binding).is_null())
        .count() as f64;
    count
        .partial_cmp(&having.value)
        .is_some_and(|ordering| having.op.accepts(ordering))
}
