//! Schema catalog for the search engine.
//!
//! The catalog describes the entity graph a search runs over: each entity's
//! columns, the relations between entities, which column a bare value is
//! matched against, and the short aliases users may type instead of an
//! entity name.

mod entity;
mod field;
mod relation;
mod schema;
mod shortcut;

pub use entity::{EntityDef, SearchDef, IDENTITY_FIELD};
pub use field::{FieldDef, FieldType};
pub use relation::{Cardinality, RelationDef};
pub use schema::Schema;
pub use shortcut::{Shortcut, ShortcutTable};
