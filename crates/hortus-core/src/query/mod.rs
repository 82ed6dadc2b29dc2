//! Query compilation and execution.
//!
//! A parsed `domain where filter` query is bound to the schema by the
//! [`Compiler`] and run against a session by the [`QueryExecutor`].

mod compiler;
mod executor;
mod filter;

pub use compiler::{
    ColumnRef, CompareOp, CompiledQuery, Compiler, HavingClause, JoinClause, Predicate,
};
pub use executor::QueryExecutor;
pub use filter::FilterEvaluator;
