//! Output formatters for search results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use hortus_core::catalog::IDENTITY_FIELD;
use hortus_core::{Record, ResultSet, Schema};
use hortus_lang::Datum;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the records a search returned.
    fn format_results(&self, results: &ResultSet, schema: &Schema) -> String;

    /// Format the queries a search would run.
    fn format_explain(&self, lines: &[String]) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_results(&self, results: &ResultSet, schema: &Schema) -> String {
        let mut output = String::new();

        for entity in results.entities() {
            if !output.is_empty() {
                output.push_str("\n\n");
            }
            let records: Vec<&Record> = results.iter().filter(|r| r.entity == entity).collect();
            output.push_str(&format!("{} ({})\n", entity, records.len()));
            output.push_str(&records_as_table(&columns(schema, entity, &records), &records));
        }

        if output.is_empty() {
            output = "No results".to_string();
        }

        output
    }

    fn format_explain(&self, lines: &[String]) -> String {
        lines.join("\n\n")
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_results(&self, results: &ResultSet, _schema: &Schema) -> String {
        let mut obj = serde_json::Map::new();

        for record in results.iter() {
            let row: serde_json::Map<String, serde_json::Value> = record
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), datum_to_json(value)))
                .collect();
            let rows = obj
                .entry(record.entity.clone())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if let serde_json::Value::Array(rows) = rows {
                rows.push(serde_json::Value::Object(row));
            }
        }

        serde_json::to_string_pretty(&serde_json::Value::Object(obj))
            .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_explain(&self, lines: &[String]) -> String {
        serde_json::to_string_pretty(lines).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({
            "error": error
        })
        .to_string()
    }
}

/// `id` first, then the schema's columns, then anything else the records carry.
fn columns(schema: &Schema, entity: &str, records: &[&Record]) -> Vec<String> {
    let mut columns = vec![IDENTITY_FIELD.to_string()];
    if let Some(def) = schema.get_entity(entity) {
        columns.extend(def.fields.iter().map(|f| f.name.clone()));
    }
    for record in records {
        for name in record.fields.keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

fn records_as_table(columns: &[String], records: &[&Record]) -> String {
    let mut table = Table::new();
    table.set_header(columns.iter().map(Cell::new).collect::<Vec<_>>());

    for record in records {
        let row: Vec<Cell> = columns
            .iter()
            .map(|c| Cell::new(format_datum(record.get(c))))
            .collect();
        table.add_row(row);
    }

    table.to_string()
}

/// Format a value for display.
fn format_datum(value: &Datum) -> String {
    match value {
        Datum::Null => "NULL".to_string(),
        Datum::Empty => String::new(),
        other => other.to_text().unwrap_or_default(),
    }
}

fn datum_to_json(value: &Datum) -> serde_json::Value {
    match value {
        Datum::Null | Datum::Empty => serde_json::Value::Null,
        Datum::Bool(b) => serde_json::Value::Bool(*b),
        Datum::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            serde_json::Value::from(*n as i64)
        }
        Datum::Number(n) => serde_json::Value::from(*n),
        Datum::Text(s) => serde_json::Value::String(s.clone()),
        Datum::DateTime(dt) => serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}
