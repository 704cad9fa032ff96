//! Insight CLI
//!
//! Command-line interface for running JSON queries against dataset files on
//! disk, without starting the API server.
//!
//! # Usage
//!
//! ```bash
//! insight --help
//! insight query q.json --sections courses=data/courses.json
//! insight query q.json --rooms rooms=data/rooms.json --max-rows 100
//! insight validate q.json
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use shared::config::{QueryConfig, DEFAULT_MAX_RESULT_ROWS};
use shared::models::{Dataset, DatasetKind};
use shared::query::{parse_query, perform_query, validate_query};
use shared::storage::{DatasetStore, InMemoryDatasetStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Insight CLI - query course sections and rooms from the command line
#[derive(Parser)]
#[command(name = "insight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load datasets and run a query file against them
    Query {
        /// Path to the JSON query document
        query_file: PathBuf,

        /// Sections dataset as `id=path`; may be repeated
        #[arg(long = "sections", value_parser = parse_source)]
        sections: Vec<DatasetSource>,

        /// Rooms dataset as `id=path`; may be repeated
        #[arg(long = "rooms", value_parser = parse_source)]
        rooms: Vec<DatasetSource>,

        /// Maximum number of result rows
        #[arg(long, env = "INSIGHT_MAX_RESULT_ROWS", default_value_t = DEFAULT_MAX_RESULT_ROWS)]
        max_rows: usize,
    },

    /// Parse and validate a query file without running it
    Validate {
        /// Path to the JSON query document
        query_file: PathBuf,
    },
}

/// A dataset id paired with the file it is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DatasetSource {
    id: String,
    path: PathBuf,
}

fn parse_source(arg: &str) -> Result<DatasetSource, String> {
    match arg.split_once('=') {
        Some((id, path)) if !id.is_empty() && !path.is_empty() => Ok(DatasetSource {
            id: id.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(format!("expected id=path, got '{arg}'")),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Extracts rows from a dataset file.
///
/// Accepts a bare array of rows, or an object carrying them under `result`.
fn rows_from(value: Value) -> anyhow::Result<Vec<Value>> {
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => bail!("Dataset file must be an array or an object with a 'result' array"),
        },
        _ => bail!("Dataset file must be an array or an object with a 'result' array"),
    }
}

fn load(
    store: &InMemoryDatasetStore,
    kind: DatasetKind,
    sources: &[DatasetSource],
) -> anyhow::Result<()> {
    for source in sources {
        let rows = rows_from(read_json(&source.path)?)
            .with_context(|| format!("Failed to load {}", source.path.display()))?;
        let dataset = Dataset::from_json_rows(source.id.as_str(), kind, rows)
            .with_context(|| format!("Failed to load dataset '{}'", source.id))?;
        let rows = dataset.len();
        store.add(dataset)?;
        tracing::info!(dataset = %source.id, %kind, rows, "Loaded dataset");
    }
    Ok(())
}

fn run_query(
    query_file: &Path,
    sections: &[DatasetSource],
    rooms: &[DatasetSource],
    max_rows: usize,
) -> anyhow::Result<Value> {
    let config = QueryConfig::new(max_rows);
    config.validate().map_err(anyhow::Error::msg)?;

    let store = InMemoryDatasetStore::new();
    load(&store, DatasetKind::Sections, sections)?;
    load(&store, DatasetKind::Rooms, rooms)?;

    let query = read_json(query_file)?;
    let rows = perform_query(&query, &store, &config)
        .map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;
    Ok(serde_json::json!({ "result": rows }))
}

fn validate_file(query_file: &Path) -> anyhow::Result<()> {
    let raw = read_json(query_file)?;
    let query = parse_query(&raw).context("structural_error")?;
    validate_query(&query).context("semantic_error")?;
    println!("{query}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Query {
            query_file,
            sections,
            rooms,
            max_rows,
        }) => {
            let output = run_query(&query_file, &sections, &rooms, max_rows)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(Commands::Validate { query_file }) => validate_file(&query_file)?,
        None => {
            println!("Insight CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["insight"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_query_command() {
        let cli = Cli::try_parse_from([
            "insight",
            "query",
            "q.json",
            "--sections",
            "courses=data/courses.json",
            "--sections",
            "old=data/old.json",
            "--rooms",
            "rooms=data/rooms.json",
            "--max-rows",
            "10",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Query {
                query_file,
                sections,
                rooms,
                max_rows,
            }) => {
                assert_eq!(query_file, PathBuf::from("q.json"));
                assert_eq!(sections.len(), 2);
                assert_eq!(sections[0].id, "courses");
                assert_eq!(sections[1].path, PathBuf::from("data/old.json"));
                assert_eq!(rooms[0].id, "rooms");
                assert_eq!(max_rows, 10);
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_source() {
        assert!(Cli::try_parse_from(["insight", "query", "q.json", "--sections", "courses"]).is_err());
        assert!(Cli::try_parse_from(["insight", "query", "q.json", "--rooms", "=x.json"]).is_err());
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from(["insight", "validate", "q.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate { .. })));
    }

    #[test]
    fn test_rows_from_accepts_course_file_shape() {
        assert_eq!(rows_from(json!([{"a": 1}])).unwrap().len(), 1);
        assert_eq!(rows_from(json!({"result": [{"a": 1}, {"a": 2}]})).unwrap().len(), 2);
        assert!(rows_from(json!({"rows": []})).is_err());
        assert!(rows_from(json!("x")).is_err());
    }

    #[test]
    fn test_run_query_from_files() {
        let dir = std::env::temp_dir().join(format!("insight-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let data = dir.join("courses.json");
        std::fs::write(
            &data,
            json!({"result": [
                {"id": 1, "Course": "310", "Title": "sw eng", "Professor": "holmes",
                 "Subject": "cpsc", "Year": "2015", "Avg": 91.5, "Pass": 10, "Fail": 1,
                 "Audit": 0, "Section": "101"},
                {"id": 2, "Course": "100", "Title": "calc", "Professor": "gauss",
                 "Subject": "math", "Year": "2016", "Avg": 70.0, "Pass": 10, "Fail": 1,
                 "Audit": 0, "Section": "101"}
            ]})
            .to_string(),
        )
        .unwrap();

        let query = dir.join("query.json");
        std::fs::write(
            &query,
            json!({
                "WHERE": {"GT": {"courses_avg": 90}},
                "OPTIONS": {"COLUMNS": ["courses_dept", "courses_avg"]}
            })
            .to_string(),
        )
        .unwrap();

        let sources = [DatasetSource {
            id: "courses".to_string(),
            path: data,
        }];
        let output = run_query(&query, &sources, &[], 10).unwrap();
        assert_eq!(
            output,
            json!({"result": [{"courses_dept": "cpsc", "courses_avg": 91.5}]})
        );

        let error = run_query(&query, &[], &[], 10).unwrap_err();
        assert!(error.to_string().starts_with("not_found"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
