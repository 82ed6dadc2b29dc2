//! The read interface searches run against.

use super::Record;
use crate::catalog::RelationDef;
use crate::error::StorageError;

/// Read access to the records of a schema.
///
/// Errors are returned untouched to the caller of the search.
pub trait Session {
    /// Every record of `entity`.
    fn scan(&self, entity: &str) -> Result<Vec<Record>, StorageError>;

    /// A single record by identity.
    fn get(&self, entity: &str, id: u64) -> Result<Option<Record>, StorageError> {
        Ok(self.scan(entity)?.into_iter().find(|r| r.id == id))
    }

    /// Records reached from `record` through `relation`.
    ///
    /// A null key on the source side relates to nothing.
    fn related(&self, record: &Record, relation: &RelationDef) -> Result<Vec<Record>, StorageError> {
        let key = record.get(&relation.from_field);
        if key.is_null() {
            return Ok(Vec::new());
        }
        Ok(self
            .scan(&relation.to_entity)?
            .into_iter()
            .filter(|candidate| candidate.get(&relation.to_field) == key)
            .collect())
    }
}

impl<S: Session + ?Sized> Session for &S {
    fn scan(&self, entity: &str) -> Result<Vec<Record>, StorageError> {
        (**self).scan(entity)
    }

    fn get(&self, entity: &str, id: u64) -> Result<Option<Record>, StorageError> {
        (**self).get(entity, id)
    }

    fn related(&self, record: &Record, relation: &RelationDef) -> Result<Vec<Record>, StorageError> {
        (**self).related(record, relation)
    }
}
