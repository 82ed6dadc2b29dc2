//! Entity definitions.

use super::field::FieldDef;
use serde::{Deserialize, Serialize};

/// Name of the identity column every entity carries.
pub const IDENTITY_FIELD: &str = "id";

/// An entity (table) in the searchable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within the schema).
    pub name: String,
    /// Column definitions, not counting the implicit `id`.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Default search column and aliases, if bare values should match this entity.
    #[serde(default)]
    pub search: Option<SearchDef>,
    /// Relation leading from a synonym record to its accepted record.
    #[serde(default)]
    pub accepted_relation: Option<String>,
}

/// How bare values and domain shortcuts reach an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDef {
    /// Column matched by value and domain searches.
    pub column: String,
    /// Short names usable as a domain, e.g. `fam`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl EntityDef {
    /// Create an entity with no columns besides `id`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            search: None,
            accepted_relation: None,
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Make the entity searchable by bare value through `column`.
    pub fn with_search_column(mut self, column: impl Into<String>) -> Self {
        let aliases = self.search.take().map(|s| s.aliases).unwrap_or_default();
        self.search = Some(SearchDef {
            column: column.into(),
            aliases,
        });
        self
    }

    /// Register a shortcut alias. Has no effect without a search column.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(search) = self.search.as_mut() {
            search.aliases.push(alias.into());
        }
        self
    }

    /// Mark records of this entity as possible synonyms of the record
    /// reached through `relation`.
    pub fn with_accepted_relation(mut self, relation: impl Into<String>) -> Self {
        self.accepted_relation = Some(relation.into());
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is a column, including the implicit identity.
    pub fn has_column(&self, name: &str) -> bool {
        name == IDENTITY_FIELD || self.get_field(name).is_some()
    }

    /// The default search column, if any.
    pub fn search_column(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.column.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_builder() {
        let genus = EntityDef::new("genus")
            .with_field(FieldDef::text("genus"))
            .with_field(FieldDef::text("author"))
            .with_search_column("genus")
            .with_alias("gen");

        assert!(genus.has_column("id"));
        assert!(genus.has_column("author"));
        assert!(!genus.has_column("family"));
        assert_eq!(genus.search_column(), Some("genus"));
        assert_eq!(genus.search.unwrap().aliases, vec!["gen".to_string()]);
    }

    #[test]
    fn test_alias_without_search_column_is_ignored() {
        let plant = EntityDef::new("plant").with_alias("p");
        assert!(plant.search.is_none());
    }
}
