//! The schema: every entity and relation a search can reach.

use serde::{Deserialize, Serialize};

use super::{EntityDef, RelationDef};
use crate::error::{CompileError, CompileErrorKind};

/// Entities and relations supplied by the schema collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// The relation called `name` leaving `entity`.
    pub fn relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.relations
            .iter()
            .find(|r| r.from_entity == entity && r.name == name)
    }

    /// All relations leaving `entity`.
    pub fn relations_from<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a RelationDef> {
        self.relations.iter().filter(move |r| r.from_entity == entity)
    }

    /// Entities with a default search column, in declaration order.
    pub fn searchable_entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.iter().filter(|e| e.search.is_some())
    }

    /// Check that every reference in the schema points at something real.
    pub fn validate(&self) -> Result<(), CompileError> {
        for (i, entity) in self.entities.iter().enumerate() {
            if self.entities[..i].iter().any(|e| e.name == entity.name) {
                return Err(CompileError::new(
                    CompileErrorKind::UnresolvedDomain,
                    format!("entity '{}' is defined twice", entity.name),
                ));
            }
            if let Some(column) = entity.search_column() {
                if !entity.has_column(column) {
                    return Err(CompileError::ambiguous_path(&entity.name, column));
                }
            }
            if let Some(relation) = &entity.accepted_relation {
                if self.relation(&entity.name, relation).is_none() {
                    return Err(CompileError::join_resolution(&entity.name, relation));
                }
            }
        }

        for relation in &self.relations {
            for (entity, field) in [
                (&relation.from_entity, &relation.from_field),
                (&relation.to_entity, &relation.to_field),
            ] {
                let def = self
                    .get_entity(entity)
                    .ok_or_else(|| CompileError::unresolved_domain(entity))?;
                if !def.has_column(field) {
                    return Err(CompileError::ambiguous_path(entity, field));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldDef;

    fn schema() -> Schema {
        Schema::new()
            .with_entity(
                EntityDef::new("family")
                    .with_field(FieldDef::text("family"))
                    .with_search_column("family"),
            )
            .with_entity(
                EntityDef::new("genus")
                    .with_field(FieldDef::text("genus"))
                    .with_field(FieldDef::number("family_id")),
            )
            .with_relation(RelationDef::many_to_one("family", "genus", "family_id", "family"))
            .with_relation(RelationDef::one_to_many("genera", "family", "genus", "family_id"))
    }

    #[test]
    fn test_relation_lookup_is_per_entity() {
        let schema = schema();
        assert_eq!(schema.relation("genus", "family").unwrap().to_entity, "family");
        assert!(schema.relation("family", "family").is_none());
        assert_eq!(schema.relations_from("family").count(), 1);
    }

    #[test]
    fn test_searchable_entities() {
        let names: Vec<_> = schema().searchable_entities().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["family".to_string()]);
    }

    #[test]
    fn test_validate() {
        assert!(schema().validate().is_ok());

        let broken = schema().with_relation(RelationDef::many_to_one("order", "genus", "family_id", "order"));
        let err = broken.validate().unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnresolvedDomain);

        let bad_column = Schema::new().with_entity(EntityDef::new("genus").with_search_column("name"));
        assert_eq!(bad_column.validate().unwrap_err().kind, CompileErrorKind::AmbiguousPath);
    }
}
