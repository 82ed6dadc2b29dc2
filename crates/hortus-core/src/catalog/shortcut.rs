//! Domain shortcut aliases.

use std::collections::BTreeMap;

use super::schema::Schema;

/// Where a domain name leads: an entity and its default search column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub entity: String,
    pub column: String,
}

/// Read-only table of domain aliases, built once from the schema.
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    aliases: BTreeMap<String, Shortcut>,
}

impl ShortcutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every alias declared on a searchable entity.
    ///
    /// When two entities claim the same alias the first one declared wins.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut table = Self::new();
        for entity in &schema.entities {
            let Some(search) = &entity.search else { continue };
            for alias in &search.aliases {
                if table.aliases.contains_key(alias) {
                    tracing::warn!(alias = %alias, entity = %entity.name, "duplicate shortcut alias ignored");
                    continue;
                }
                table.insert(alias.clone(), &entity.name, &search.column);
            }
        }
        table
    }

    pub fn insert(&mut self, alias: impl Into<String>, entity: &str, column: &str) {
        self.aliases.insert(
            alias.into(),
            Shortcut {
                entity: entity.to_string(),
                column: column.to_string(),
            },
        );
    }

    pub fn get(&self, alias: &str) -> Option<&Shortcut> {
        self.aliases.get(alias)
    }

    /// Resolve a domain: an alias first, then a searchable entity name.
    pub fn resolve(&self, schema: &Schema, domain: &str) -> Option<Shortcut> {
        if let Some(shortcut) = self.get(domain) {
            return Some(shortcut.clone());
        }
        let entity = schema.get_entity(domain)?;
        Some(Shortcut {
            entity: entity.name.clone(),
            column: entity.search_column()?.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Shortcut)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
