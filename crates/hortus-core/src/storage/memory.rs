//! In-memory session.

use std::collections::BTreeMap;

use super::{Record, Session};
use crate::error::StorageError;

/// Records held in memory, keyed by entity then identity.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    tables: BTreeMap<String, BTreeMap<u64, Record>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn insert(&mut self, record: Record) {
        self.tables
            .entry(record.entity.clone())
            .or_default()
            .insert(record.id, record);
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.insert(record);
        self
    }

    /// Number of records held for `entity`.
    pub fn count(&self, entity: &str) -> usize {
        self.tables.get(entity).map_or(0, BTreeMap::len)
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl Extend<Record> for MemorySession {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.insert(record);
        }
    }
}

impl FromIterator<Record> for MemorySession {
    fn from_iter<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let mut session = Self::new();
        session.extend(records);
        session
    }
}

impl Session for MemorySession {
    fn scan(&self, entity: &str) -> Result<Vec<Record>, StorageError> {
        Ok(self
            .tables
            .get(entity)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get(&self, entity: &str, id: u64) -> Result<Option<Record>, StorageError> {
        Ok(self.tables.get(entity).and_then(|t| t.get(&id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RelationDef;
    use hortus_lang::Datum;

    fn session() -> MemorySession {
        [
            Record::new("family", 1).with("family", "Rubiaceae"),
            Record::new("family", 2).with("family", "Orchidaceae"),
            Record::new("genus", 1).with("genus", "Ixora").with("family_id", 1i64),
            Record::new("genus", 2).with("genus", "Coffea").with("family_id", 1i64),
            Record::new("genus", 3).with("genus", "Dendrobium").with("family_id", 2i64),
            Record::new("genus", 4).with("genus", "Incertae"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_scan_and_get() {
        let session = session();
        assert_eq!(session.scan("genus").unwrap().len(), 4);
        assert!(session.scan("plant").unwrap().is_empty());
        assert_eq!(session.get("family", 2).unwrap().unwrap().get("family"), &Datum::Text("Orchidaceae".into()));
        assert!(session.get("family", 9).unwrap().is_none());
        assert_eq!(session.count("family"), 2);
    }

    #[test]
    fn test_related_both_directions() {
        let session = session();
        let to_family = RelationDef::many_to_one("family", "genus", "family_id", "family");
        let genera = RelationDef::one_to_many("genera", "family", "genus", "family_id");

        let ixora = session.get("genus", 1).unwrap().unwrap();
        let family = session.related(&ixora, &to_family).unwrap();
        assert_eq!(family.len(), 1);
        assert_eq!(family[0].id, 1);

        let rubiaceae = session.get("family", 1).unwrap().unwrap();
        let ids: Vec<u64> = session.related(&rubiaceae, &genera).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);

        // A missing foreign key relates to nothing.
        let orphan = session.get("genus", 4).unwrap().unwrap();
        assert!(session.related(&orphan, &to_family).unwrap().is_empty());
    }
}
