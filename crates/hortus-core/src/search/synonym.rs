//! Synonym resolution on top of another strategy.

use tracing::debug;

use super::{MapperSearch, SearchContext, SearchStrategy};
use crate::error::{CompileError, Result};
use crate::storage::{ResultSet, Session};

/// Wraps a strategy and resolves synonym records in its results.
///
/// A record is a synonym when its entity declares an accepted relation and
/// that relation leads somewhere. With `accepted_for_synonyms` set the
/// synonym is replaced by its accepted record(s); otherwise it is dropped.
#[derive(Debug, Clone, Default)]
pub struct SynonymOverlay<S> {
    inner: S,
}

impl<S: SearchStrategy> SynonymOverlay<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Apply synonym resolution to an existing result set.
    pub fn resolve(
        &self,
        results: ResultSet,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let mut resolved = ResultSet::new();

        for record in results {
            let accepted_relation = ctx
                .schema
                .get_entity(&record.entity)
                .and_then(|entity| entity.accepted_relation.as_deref());
            let Some(name) = accepted_relation else {
                resolved.insert(record);
                continue;
            };

            let relation = ctx
                .schema
                .relation(&record.entity, name)
                .ok_or_else(|| CompileError::join_resolution(&record.entity, name))?;
            let accepted = session.related(&record, relation)?;
            if accepted.is_empty() {
                resolved.insert(record);
                continue;
            }

            if ctx.config.accepted_for_synonyms {
                debug!(
                    entity = %record.entity,
                    id = record.id,
                    accepted = accepted.len(),
                    "replacing synonym with accepted record"
                );
                resolved.extend(accepted);
            } else {
                debug!(entity = %record.entity, id = record.id, "dropping synonym");
            }
        }

        Ok(resolved)
    }
}

impl<S: SearchStrategy> SearchStrategy for SynonymOverlay<S> {
    fn name(&self) -> &'static str {
        "SynonymSearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        let results = self.inner.search(text, ctx, session)?;
        self.resolve(results, ctx, session)
    }
}

/// The overlay the engine searches with by default.
pub type SynonymSearch = SynonymOverlay<MapperSearch>;
