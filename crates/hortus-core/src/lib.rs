//! Hortus Core - schema catalog, query compilation and search strategies.
//!
//! This crate binds the query language from `hortus-lang` to an entity graph.
//! A [`SearchEngine`] is built once from a [`Schema`] and a [`SearchConfig`]
//! and then answers searches against any [`Session`]:
//!
//! ```
//! use hortus_core::{EntityDef, FieldDef, MemorySession, Record, Schema, SearchConfig, SearchEngine};
//!
//! let schema = Schema::new().with_entity(
//!     EntityDef::new("family")
//!         .with_field(FieldDef::text("family"))
//!         .with_search_column("family")
//!         .with_alias("fam"),
//! );
//! let engine = SearchEngine::new(schema, SearchConfig::default()).unwrap();
//!
//! let session = MemorySession::new()
//!     .with_record(Record::new("family", 1).with("family", "Orchidaceae"))
//!     .with_record(Record::new("family", 2).with("family", "Rubiaceae"));
//!
//! let results = engine.search("fam=orchid", &session).unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod catalog;
pub mod error;
pub mod query;
pub mod search;
pub mod storage;

pub use catalog::{
    Cardinality, EntityDef, FieldDef, FieldType, RelationDef, Schema, SearchDef, Shortcut,
    ShortcutTable,
};
pub use error::{CompileError, CompileErrorKind, Error, Result, StorageError};
pub use query::{CompiledQuery, Compiler, QueryExecutor};
pub use search::{
    BinomialConfig, BinomialSearch, DomainSearch, MapperSearch, QuerySearch, SearchConfig,
    SearchContext, SearchEngine, SearchShape, SearchStrategy, StrategyRegistry, SynonymOverlay,
    SynonymSearch, ValueSearch,
};
pub use storage::{MemorySession, Record, RecordKey, ResultSet, Session};
