//! Hortus Command-Line Client
//!
//! Loads a JSON fixture and runs searches against it.

mod executor;
mod fixture;
mod formatter;

use std::path::{Path, PathBuf};

use clap::Parser;
use executor::{ExecuteError, ExecuteOptions};
use fixture::{Fixture, FixtureError};
use formatter::OutputFormat;
use hortus_core::{CompileError, SearchEngine};
use thiserror::Error;
use tracing::debug;

/// Hortus Command-Line Client
#[derive(Parser, Debug)]
#[command(name = "hortus")]
#[command(version, about = "Search a botanical collection with the hortus query language")]
pub struct Args {
    /// JSON fixture holding the schema, configuration and records
    #[arg(short = 'd', long)]
    pub data: PathBuf,

    /// Search to run, e.g. "genus where family.family=Orchidaceae"
    pub query: Option<String>,

    /// Run searches from file, one per line
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Run this registered strategy instead of the default one
    #[arg(short = 's', long)]
    pub strategy: Option<String>,

    /// Print the queries a search would run instead of running it
    #[arg(long)]
    pub explain: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Drop synonyms from results instead of replacing them with their accepted record
    #[arg(long)]
    pub no_accepted_synonyms: bool,
}

/// Errors that stop the client.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("invalid schema: {0}")]
    Schema(#[from] CompileError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error("cannot read {path}: {source}")]
    Script {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to search: pass a query or --file")]
    NoInput,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hortus_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut fixture = Fixture::load(&args.data)?;
    if args.no_accepted_synonyms {
        fixture.config.accepted_for_synonyms = false;
    }
    let engine = SearchEngine::new(fixture.schema, fixture.config)?;
    debug!(strategies = ?engine.registry(), "engine built");

    let formatter = formatter::create_formatter(args.format);
    let options = ExecuteOptions {
        strategy: args.strategy,
        explain: args.explain,
    };

    if let Some(query) = &args.query {
        let output = executor::execute(&engine, &fixture.session, query, &options, &*formatter)?;
        println!("{}", output);
        Ok(())
    } else if let Some(file) = &args.file {
        run_script(&engine, &fixture.session, file, &options, &*formatter)
    } else {
        Err(CliError::NoInput)
    }
}

/// Run each non-empty, non-comment line of a file as a search.
fn run_script(
    engine: &SearchEngine,
    session: &hortus_core::MemorySession,
    file: &Path,
    options: &ExecuteOptions,
    formatter: &dyn formatter::Formatter,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(file).map_err(|source| CliError::Script {
        path: file.display().to_string(),
        source,
    })?;

    for search in script_lines(&content) {
        match executor::execute(engine, session, search, options, formatter) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("{}", formatter.format_error(&format!("'{}': {}", search, e)));
                // Continue with next search
            }
        }
    }

    Ok(())
}

fn script_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::io::Write;

    fn fixture_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(fixture::SAMPLE_FIXTURE.as_bytes()).unwrap();
        file
    }

    fn args(data: &Path, rest: &[&str]) -> Args {
        let mut argv: Vec<OsString> = vec!["hortus".into(), "--data".into(), data.into()];
        argv.extend(rest.iter().map(OsString::from));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "hortus",
            "--data",
            "plants.json",
            "--format",
            "json",
            "--no-accepted-synonyms",
            "fam=orch",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("plants.json"));
        assert_eq!(args.query.as_deref(), Some("fam=orch"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.no_accepted_synonyms);
        assert!(!args.explain);

        assert!(Args::try_parse_from(["hortus", "fam=orch"]).is_err());
    }

    #[test]
    fn test_script_lines() {
        let lines: Vec<&str> = script_lines("fam=orch\n\n  # comment\n  gen=vanda  \n").collect();
        assert_eq!(lines, vec!["fam=orch", "gen=vanda"]);
    }

    #[test]
    fn test_run_query_and_script() {
        let data = fixture_file();
        let mut script = tempfile::NamedTempFile::new().unwrap();
        writeln!(script, "gen=vanda\ngenus where nothing=1\n").unwrap();

        let script_path = script.path().display().to_string();
        assert!(run(args(data.path(), &["--file", &script_path])).is_ok());
        assert!(run(args(data.path(), &["--explain", "gen=*"])).is_ok());
        assert!(run(args(data.path(), &["--strategy", "DomainSearch", "gen=vanda"])).is_ok());
    }

    #[test]
    fn test_run_errors() {
        let data = fixture_file();

        assert!(matches!(run(args(data.path(), &[])), Err(CliError::NoInput)));
        assert!(matches!(
            run(args(data.path(), &["genus where"])),
            Err(CliError::Execute(_))
        ));
        assert!(matches!(
            run(args(Path::new("/nonexistent/hortus.json"), &["x"])),
            Err(CliError::Fixture(_))
        ));
    }
}
