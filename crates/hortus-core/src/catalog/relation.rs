//! Relation definitions between entities.

use serde::{Deserialize, Serialize};

/// Cardinality of a relation, seen from its source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one related record on each side.
    OneToOne,
    /// Many related records (e.g. `family.genera`).
    OneToMany,
    /// At most one related record (e.g. `genus.family`).
    ManyToOne,
}

/// A named, directed relation.
///
/// Records are related when `from_field` on the source record equals
/// `to_field` on the target record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name, unique per source entity.
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Field on the source entity.
    pub from_field: String,
    /// Target entity name.
    pub to_entity: String,
    /// Field on the target entity.
    pub to_field: String,
    pub cardinality: Cardinality,
}

impl RelationDef {
    /// Many records of `from_entity` point at one record of `to_entity`.
    ///
    /// `from_field` holds the target's `id`.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            to_field: "id".to_string(),
            cardinality: Cardinality::ManyToOne,
        }
    }

    /// One record of `from_entity` has many records of `to_entity` whose
    /// `to_field` holds its `id`.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: "id".to_string(),
            to_entity: to_entity.into(),
            to_field: to_field.into(),
            cardinality: Cardinality::OneToMany,
        }
    }

    /// One-to-one relation through an arbitrary pair of fields.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            to_field: to_field.into(),
            cardinality: Cardinality::OneToOne,
        }
    }

    /// Whether following the relation can yield more than one record.
    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::OneToMany
    }
}
