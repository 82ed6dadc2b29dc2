//! JSON fixtures: a schema, an optional search configuration and records.
//!
//! ```json
//! {
//!   "schema": { "entities": [...], "relations": [...] },
//!   "config": { "accepted_for_synonyms": true },
//!   "records": { "family": [{ "id": 1, "family": "Orchidaceae" }] }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use hortus_core::catalog::IDENTITY_FIELD;
use hortus_core::{FieldType, MemorySession, Record, Schema, SearchConfig};
use hortus_lang::Datum;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{entity} record #{index}: {message}")]
    Record {
        entity: String,
        index: usize,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    schema: Schema,
    #[serde(default)]
    config: SearchConfig,
    #[serde(default)]
    records: BTreeMap<String, Vec<serde_json::Map<String, serde_json::Value>>>,
}

/// A loaded fixture.
#[derive(Debug)]
pub struct Fixture {
    pub schema: Schema,
    pub config: SearchConfig,
    pub session: MemorySession,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        let raw: RawFixture = serde_json::from_str(text)?;
        let mut session = MemorySession::new();

        for (entity, rows) in &raw.records {
            for (index, row) in rows.iter().enumerate() {
                let record = to_record(&raw.schema, entity, row).map_err(|message| {
                    FixtureError::Record {
                        entity: entity.clone(),
                        index,
                        message,
                    }
                })?;
                session.insert(record);
            }
            debug!(entity = %entity, records = rows.len(), "loaded records");
        }

        Ok(Self {
            schema: raw.schema,
            config: raw.config,
            session,
        })
    }
}

fn to_record(
    schema: &Schema,
    entity: &str,
    row: &serde_json::Map<String, serde_json::Value>,
) -> Result<Record, String> {
    let def = schema
        .get_entity(entity)
        .ok_or_else(|| format!("unknown entity '{}'", entity))?;
    let id = row
        .get(IDENTITY_FIELD)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "missing or non-integer 'id'".to_string())?;

    let mut record = Record::new(entity, id);
    for (name, value) in row {
        if name == IDENTITY_FIELD {
            continue;
        }
        let field = def
            .get_field(name)
            .ok_or_else(|| format!("unknown column '{}'", name))?;
        record.set(name.clone(), to_datum(field.field_type, value)?);
    }
    Ok(record)
}

fn to_datum(field_type: FieldType, value: &serde_json::Value) -> Result<Datum, String> {
    use serde_json::Value as Json;

    let datum = match (field_type, value) {
        (_, Json::Null) => Datum::Null,
        (FieldType::Text, Json::String(s)) => Datum::Text(s.clone()),
        (FieldType::Number, Json::Number(n)) => {
            Datum::Number(n.as_f64().ok_or_else(|| format!("number {} out of range", n))?)
        }
        (FieldType::Bool, Json::Bool(b)) => Datum::Bool(*b),
        (FieldType::DateTime, Json::String(s)) => Datum::DateTime(parse_datetime(s)?),
        (expected, found) => {
            return Err(format!("expected {:?}, found {}", expected, found));
        }
    };
    Ok(datum)
}

/// `2001-12-25T10:00:00`, `2001-12-25 10:00:00` or a bare `2001-12-25`.
fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("invalid datetime '{}'", text))
}

/// Two orchid genera, used by the tests of every module.
#[cfg(test)]
pub(crate) const SAMPLE_FIXTURE: &str = r#"{
    "schema": {
        "entities": [
            {
                "name": "family",
                "fields": [{ "name": "family" }],
                "search": { "column": "family", "aliases": ["fam"] }
            },
            {
                "name": "genus",
                "fields": [
                    { "name": "genus" },
                    { "name": "family_id", "type": "number" },
                    { "name": "described", "type": "date_time" }
                ],
                "search": { "column": "genus", "aliases": ["gen"] }
            }
        ],
        "relations": [
            {
                "name": "family",
                "from_entity": "genus",
                "from_field": "family_id",
                "to_entity": "family",
                "to_field": "id",
                "cardinality": "many_to_one"
            }
        ]
    },
    "config": { "accepted_for_synonyms": false },
    "records": {
        "family": [{ "id": 1, "family": "Orchidaceae" }],
        "genus": [
            { "id": 1, "genus": "Dendrobium", "family_id": 1, "described": "1799-01-01" },
            { "id": 2, "genus": "Vanda", "family_id": 1, "described": null }
        ]
    }
}"#;
