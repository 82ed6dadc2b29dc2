//! The strategy interface.

use crate::catalog::{Schema, ShortcutTable};
use crate::error::Result;
use crate::query::{CompiledQuery, Compiler, QueryExecutor};
use crate::storage::{ResultSet, Session};

use super::SearchConfig;

/// Everything a strategy may read besides the session.
///
/// Built once by the engine and borrowed by every search.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub schema: &'a Schema,
    pub shortcuts: &'a ShortcutTable,
    pub config: &'a SearchConfig,
}

impl<'a> SearchContext<'a> {
    pub fn new(schema: &'a Schema, shortcuts: &'a ShortcutTable, config: &'a SearchConfig) -> Self {
        Self {
            schema,
            shortcuts,
            config,
        }
    }

    /// A compiler honouring the configuration.
    pub fn compiler(&self) -> Compiler<'a> {
        Compiler::new(self.schema, self.shortcuts)
            .with_empty_string_is_null(self.config.empty_string_is_null)
    }

    /// Execute a compiled query against `session`.
    pub fn execute(&self, query: &CompiledQuery, session: &dyn Session) -> Result<ResultSet> {
        Ok(QueryExecutor::new(session).execute(query)?)
    }
}

/// One named way of interpreting a search string.
pub trait SearchStrategy: Send + Sync {
    /// Name under which the strategy is registered.
    fn name(&self) -> &'static str;

    /// Run the search and return the matching records.
    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet>;
}
