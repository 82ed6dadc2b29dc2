//! Named strategy lookup.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{
    BinomialSearch, DomainSearch, MapperSearch, QuerySearch, SearchStrategy, SynonymSearch,
    ValueSearch,
};

/// Strategies by name. Registering a name twice replaces the first entry.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, Box<dyn SearchStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MapperSearch::new());
        registry.register(ValueSearch);
        registry.register(DomainSearch);
        registry.register(QuerySearch);
        registry.register(BinomialSearch);
        registry.register(SynonymSearch::new(MapperSearch::new()));
        registry
    }

    pub fn register<S: SearchStrategy + 'static>(&mut self, strategy: S) {
        let name = strategy.name();
        if self.strategies.insert(name, Box::new(strategy)).is_some() {
            debug!(strategy = name, "replaced registered strategy");
        }
    }

    /// The strategy registered under `name`, if any.
    pub fn get_strategy(&self, name: &str) -> Option<&dyn SearchStrategy> {
        self.strategies.get(name).map(|s| s.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
