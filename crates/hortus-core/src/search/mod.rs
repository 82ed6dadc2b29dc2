//! Search strategies.
//!
//! A search string is interpreted by a [`SearchStrategy`]. The composite
//! [`MapperSearch`] looks at the shape of the input and hands it to the
//! value, domain, binomial or query strategy; [`SynonymOverlay`] resolves
//! synonyms in whatever another strategy returns. The [`SearchEngine`] owns
//! the schema, shortcuts, configuration and registry and is the usual entry
//! point.

mod binomial;
mod config;
mod domain;
mod engine;
mod mapper;
mod query;
mod registry;
mod strategy;
mod synonym;
mod value;

pub use binomial::BinomialSearch;
pub use config::{BinomialConfig, SearchConfig};
pub use domain::DomainSearch;
pub use engine::SearchEngine;
pub use mapper::{classify, MapperSearch, SearchShape};
pub use query::QuerySearch;
pub use registry::StrategyRegistry;
pub use strategy::{SearchContext, SearchStrategy};
pub use synonym::{SynonymOverlay, SynonymSearch};
pub use value::ValueSearch;
