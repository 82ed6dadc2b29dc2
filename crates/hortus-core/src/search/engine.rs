//! The immutable search engine.

use tracing::debug;

use super::{MapperSearch, SearchConfig, SearchContext, SearchStrategy, StrategyRegistry, SynonymSearch};
use crate::catalog::{Schema, ShortcutTable};
use crate::error::{CompileError, Result};
use crate::storage::{ResultSet, Session};

/// Schema, shortcuts, configuration and strategies, built once at startup.
///
/// The engine holds no per-search state; every call borrows it immutably.
#[derive(Debug)]
pub struct SearchEngine {
    schema: Schema,
    shortcuts: ShortcutTable,
    config: SearchConfig,
    registry: StrategyRegistry,
    default_strategy: SynonymSearch,
}

impl SearchEngine {
    /// Validate `schema` and build the shortcut table and default registry.
    pub fn new(schema: Schema, config: SearchConfig) -> std::result::Result<Self, CompileError> {
        schema.validate()?;
        let shortcuts = ShortcutTable::from_schema(&schema);
        debug!(
            entities = schema.entities.len(),
            relations = schema.relations.len(),
            shortcuts = shortcuts.len(),
            "search engine ready"
        );
        Ok(Self {
            schema,
            shortcuts,
            config,
            registry: StrategyRegistry::with_defaults(),
            default_strategy: SynonymSearch::new(MapperSearch::new()),
        })
    }

    /// Replace the strategy registry.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn context(&self) -> SearchContext<'_> {
        SearchContext::new(&self.schema, &self.shortcuts, &self.config)
    }

    /// Search with the composite strategy and synonym resolution.
    pub fn search(&self, text: &str, session: &dyn Session) -> Result<ResultSet> {
        self.default_strategy.search(text, &self.context(), session)
    }

    /// Search with the strategy registered under `name`.
    ///
    /// Returns `None` when no such strategy exists.
    pub fn search_with(&self, name: &str, text: &str, session: &dyn Session) -> Option<Result<ResultSet>> {
        let strategy = self.registry.get_strategy(name)?;
        debug!(strategy = name, "search with named strategy");
        Some(strategy.search(text, &self.context(), session))
    }

    pub fn get_strategy(&self, name: &str) -> Option<&dyn SearchStrategy> {
        self.registry.get_strategy(name)
    }

    /// What `search` would run for `text`, without touching a session.
    pub fn explain(&self, text: &str) -> Result<Vec<String>> {
        self.default_strategy.inner().explain(text, &self.context())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shortcuts(&self) -> &ShortcutTable {
        &self.shortcuts
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }
}
