//! Entity records.

use std::collections::BTreeMap;

use hortus_lang::Datum;

use crate::catalog::IDENTITY_FIELD;

/// Identity of a record across the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub entity: String,
    pub id: u64,
}

/// One row of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: String,
    pub id: u64,
    pub fields: BTreeMap<String, Datum>,
}

/// Returned for columns a record does not carry.
static NULL: Datum = Datum::Null;

impl Record {
    /// Create a record; the `id` column is filled in from `id`.
    pub fn new(entity: impl Into<String>, id: u64) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(IDENTITY_FIELD.to_string(), Datum::Number(id as f64));
        Self {
            entity: entity.into(),
            id,
            fields,
        }
    }

    /// Set a column.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Datum>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Datum>) {
        let field = field.into();
        if field == IDENTITY_FIELD {
            return;
        }
        self.fields.insert(field, value.into());
    }

    /// Column value; missing columns read as null.
    pub fn get(&self, field: &str) -> &Datum {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            entity: self.entity.clone(),
            id: self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_column() {
        let record = Record::new("genus", 7).with("genus", "Ixora").with("id", 99i64);
        assert_eq!(record.get("id"), &Datum::Number(7.0));
        assert_eq!(record.get("genus"), &Datum::Text("Ixora".into()));
        assert_eq!(record.get("author"), &Datum::Null);
    }

    #[test]
    fn test_key_ordering() {
        let a = Record::new("family", 2).key();
        let b = Record::new("genus", 1).key();
        assert!(a < b);
    }
}
