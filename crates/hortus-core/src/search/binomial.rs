//! Two-word genus/epithet shorthand.
//!
//! `Ix cocc` finds species whose genus name starts with `Ix` and whose
//! epithet (or any other configured epithet column) starts with `cocc`.
//! Matching is case-sensitive first; only when that finds nothing are the
//! same prefixes tried case-insensitively.

use std::collections::BTreeSet;

use hortus_lang::{ParseError, Span};
use tracing::debug;

use super::{SearchContext, SearchStrategy};
use crate::error::{CompileError, Result};
use crate::storage::{Record, ResultSet, Session};

#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialSearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseMode {
    Sensitive,
    Insensitive,
}

impl CaseMode {
    fn starts_with(self, text: &str, prefix: &str) -> bool {
        match self {
            CaseMode::Sensitive => text.starts_with(prefix),
            CaseMode::Insensitive => text.to_lowercase().starts_with(&prefix.to_lowercase()),
        }
    }
}

impl BinomialSearch {
    /// Species matching `genus_prefix epithet_prefix`.
    pub fn search_pair(
        &self,
        genus_prefix: &str,
        epithet_prefix: &str,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let exact = self.tier(genus_prefix, epithet_prefix, CaseMode::Sensitive, ctx, session)?;
        if !exact.is_empty() {
            debug!(matches = exact.len(), "binomial search");
            return Ok(exact);
        }

        let relaxed = self.tier(genus_prefix, epithet_prefix, CaseMode::Insensitive, ctx, session)?;
        debug!(matches = relaxed.len(), "binomial search fell back to case-insensitive prefixes");
        Ok(relaxed)
    }

    fn tier(
        &self,
        genus_prefix: &str,
        epithet_prefix: &str,
        mode: CaseMode,
        ctx: &SearchContext<'_>,
        session: &dyn Session,
    ) -> Result<ResultSet> {
        let config = &ctx.config.binomial;
        let relation = ctx
            .schema
            .relation(&config.species_entity, &config.genus_relation)
            .ok_or_else(|| CompileError::join_resolution(&config.species_entity, &config.genus_relation))?;

        let genera: BTreeSet<u64> = session
            .scan(&config.genus_entity)?
            .into_iter()
            .filter(|genus| text_matches(genus, &config.genus_column, genus_prefix, mode))
            .map(|genus| genus.id)
            .collect();
        if genera.is_empty() {
            return Ok(ResultSet::new());
        }

        let mut results = ResultSet::new();
        for species in session.scan(&config.species_entity)? {
            let epithet_matches = config
                .epithet_columns
                .iter()
                .any(|column| text_matches(&species, column, epithet_prefix, mode));
            if !epithet_matches {
                continue;
            }
            let in_genus = session
                .related(&species, relation)?
                .iter()
                .any(|genus| genera.contains(&genus.id));
            if in_genus {
                results.insert(species);
            }
        }
        Ok(results)
    }
}

fn text_matches(record: &Record, column: &str, prefix: &str, mode: CaseMode) -> bool {
    record
        .get(column)
        .as_text()
        .is_some_and(|text| mode.starts_with(text, prefix))
}

/// Split a search string into exactly two words.
fn split_pair(text: &str) -> Option<(&str, &str)> {
    let mut words = text.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(genus), Some(epithet), None) => Some((genus, epithet)),
        _ => None,
    }
}

impl SearchStrategy for BinomialSearch {
    fn name(&self) -> &'static str {
        "BinomialSearch"
    }

    fn search(&self, text: &str, ctx: &SearchContext<'_>, session: &dyn Session) -> Result<ResultSet> {
        let (genus, epithet) = split_pair(text).ok_or_else(|| {
            ParseError::new("expected a genus and an epithet", Span::new(0, text.len()))
                .with_hint("write the two words as e.g. `Ix cocc`")
        })?;
        self.search_pair(genus, epithet, ctx, session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("Ix cocc"), Some(("Ix", "cocc")));
        assert_eq!(split_pair("  Ix \t cocc "), Some(("Ix", "cocc")));
        assert_eq!(split_pair("Ixora"), None);
        assert_eq!(split_pair("Ixora coccinea L."), None);
    }

    #[test]
    fn test_case_modes() {
        assert!(CaseMode::Sensitive.starts_with("Ixora", "Ix"));
        assert!(!CaseMode::Sensitive.starts_with("Ixora", "ix"));
        assert!(CaseMode::Insensitive.starts_with("Ixora", "iX"));
    }
}
