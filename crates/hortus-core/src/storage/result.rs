//! Search results.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use super::{Record, RecordKey};

/// Records returned by a search, deduplicated by identity.
///
/// Iteration is ordered by entity name then id, which keeps output stable;
/// callers must not rely on any other ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: BTreeMap<RecordKey, Record>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; returns false if it was already present.
    pub fn insert(&mut self, record: Record) -> bool {
        match self.records.entry(record.key()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Add every record of `other`.
    pub fn union(&mut self, other: ResultSet) {
        for (key, record) in other.records {
            self.records.entry(key).or_insert(record);
        }
    }

    pub fn remove(&mut self, key: &RecordKey) -> Option<Record> {
        self.records.remove(key)
    }

    pub fn contains(&self, entity: &str, id: u64) -> bool {
        self.records.contains_key(&RecordKey {
            entity: entity.to_string(),
            id,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Ids of the results belonging to `entity`.
    pub fn ids(&self, entity: &str) -> BTreeSet<u64> {
        self.records
            .keys()
            .filter(|key| key.entity == entity)
            .map(|key| key.id)
            .collect()
    }

    /// Distinct entity names present in the results.
    pub fn entities(&self) -> BTreeSet<&str> {
        self.records.keys().map(|key| key.entity.as_str()).collect()
    }
}

impl FromIterator<Record> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let mut set = Self::new();
        set.extend(records);
        set
    }
}

impl Extend<Record> for ResultSet {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.insert(record);
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = btree_map::IntoValues<RecordKey, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_by_identity() {
        let mut set = ResultSet::new();
        assert!(set.insert(Record::new("genus", 1).with("genus", "Ixora")));
        assert!(!set.insert(Record::new("genus", 1).with("genus", "changed")));
        assert!(set.insert(Record::new("family", 1)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.entities().into_iter().collect::<Vec<_>>(), vec!["family", "genus"]);
    }

    #[test]
    fn test_union_and_ids() {
        let mut a: ResultSet = [Record::new("genus", 1), Record::new("genus", 3)].into_iter().collect();
        let b: ResultSet = [Record::new("genus", 3), Record::new("species", 3)].into_iter().collect();
        a.union(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.ids("genus"), BTreeSet::from([1, 3]));
        assert!(a.contains("species", 3));
        assert!(!a.contains("species", 1));
    }
}
