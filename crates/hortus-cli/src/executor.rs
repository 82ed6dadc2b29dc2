//! Search execution.

use crate::formatter::Formatter;
use hortus_core::{Error, MemorySession, SearchEngine};
use thiserror::Error;
use tracing::info;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Parse, compile or storage error, rendered against the input.
    #[error("{0}")]
    Search(String),

    /// No strategy registered under this name.
    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },
}

impl ExecuteError {
    fn search(err: Error, input: &str) -> Self {
        ExecuteError::Search(err.format_with_source(input))
    }
}

/// What to do with one search string.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Run this registered strategy instead of the default one.
    pub strategy: Option<String>,
    /// Print the queries instead of running them.
    pub explain: bool,
}

/// Run a search and return formatted output.
pub fn execute(
    engine: &SearchEngine,
    session: &MemorySession,
    input: &str,
    options: &ExecuteOptions,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    if options.explain {
        let lines = engine
            .explain(input)
            .map_err(|e| ExecuteError::search(e, input))?;
        return Ok(formatter.format_explain(&lines));
    }

    let results = match &options.strategy {
        Some(name) => engine
            .search_with(name, input, session)
            .ok_or_else(|| ExecuteError::UnknownStrategy {
                name: name.clone(),
                available: engine.registry().names().collect::<Vec<_>>().join(", "),
            })?,
        None => engine.search(input, session),
    }
    .map_err(|e| ExecuteError::search(e, input))?;

    info!(query = input, matches = results.len(), "search finished");
    Ok(formatter.format_results(&results, engine.schema()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixture, SAMPLE_FIXTURE};
    use crate::formatter::{create_formatter, OutputFormat};

    fn run(input: &str, options: &ExecuteOptions) -> Result<String, ExecuteError> {
        let fixture = Fixture::from_json(SAMPLE_FIXTURE).unwrap();
        let engine = SearchEngine::new(fixture.schema, fixture.config).unwrap();
        let formatter = create_formatter(OutputFormat::Json);
        execute(&engine, &fixture.session, input, options, &*formatter)
    }

    #[test]
    fn test_execute_search() {
        let output = run("genus where family.family=Orchidaceae and id=2", &ExecuteOptions::default())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["genus"][0]["genus"], "Vanda");
    }

    #[test]
    fn test_execute_with_strategy() {
        let options = ExecuteOptions {
            strategy: Some("ValueSearch".into()),
            ..Default::default()
        };
        let output = run("dendro", &options).unwrap();
        assert!(output.contains("Dendrobium"));

        let options = ExecuteOptions {
            strategy: Some("NotExisting".into()),
            ..Default::default()
        };
        let err = run("dendro", &options).unwrap_err();
        assert!(matches!(err, ExecuteError::UnknownStrategy { .. }));
        assert!(err.to_string().contains("MapperSearch"));
    }

    #[test]
    fn test_execute_explain() {
        let options = ExecuteOptions {
            explain: true,
            ..Default::default()
        };
        let output = run("gen where described > |datetime|1800,1,1|", &options).unwrap();
        assert!(output.contains("SELECT * FROM gen WHERE"));
    }

    #[test]
    fn test_execute_reports_errors_against_input() {
        let err = run("genus where colour=red", &ExecuteOptions::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("colour"));
        assert!(message.contains('^'));
    }
}
