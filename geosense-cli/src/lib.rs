//! Command-line boundary for the GeoSense pipeline.
//!
//! Path resolution (flags with env-overridable defaults) happens here and
//! only here; the library crates receive fully resolved paths.

#![forbid(unsafe_code)]

mod error;

pub use error::CliError;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geosense_core::{ReadingStore, SqliteReadingStore};
use geosense_data::{IngestReport, ValuePolicy, ingest_geojson};

const ENV_SOURCE: &str = "GEOSENSE_SOURCE";
const ENV_DATABASE: &str = "GEOSENSE_DATABASE";
const DEFAULT_DATABASE: &str = "geosense.db";

/// Run the GeoSense CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => {
            let summary = run_ingest(&args)?;
            write_line(&summary)
        }
        Command::Readings(args) => {
            let json = readings_json(&args)?;
            write_line(&json)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geosense",
    about = "GeoJSON ingestion and sensor reading queries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Materialize a GeoJSON source into the embedded database.
    Ingest(IngestArgs),
    /// Print the sensor readings relation as JSON.
    Readings(ReadingsArgs),
}

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser)]
struct IngestArgs {
    /// Path to the GeoJSON source file.
    #[arg(long, value_name = "path", env = ENV_SOURCE)]
    source: PathBuf,
    /// Path to the embedded database file.
    #[arg(long, value_name = "path", env = ENV_DATABASE, default_value = DEFAULT_DATABASE)]
    database: PathBuf,
    /// Take reading values from this feature property instead of
    /// synthesising them.
    #[arg(long, value_name = "name")]
    value_property: Option<String>,
}

/// CLI arguments for the `readings` subcommand.
#[derive(Debug, Clone, Parser)]
struct ReadingsArgs {
    /// Path to the embedded database file.
    #[arg(long, value_name = "path", env = ENV_DATABASE, default_value = DEFAULT_DATABASE)]
    database: PathBuf,
}

impl IngestArgs {
    fn value_policy(&self) -> ValuePolicy {
        self.value_property
            .clone()
            .map_or_else(ValuePolicy::default, ValuePolicy::Property)
    }
}

fn run_ingest(args: &IngestArgs) -> Result<String, CliError> {
    let report = ingest_geojson(&args.source, &args.database, &args.value_policy())?;
    Ok(render_report(&report))
}

fn readings_json(args: &ReadingsArgs) -> Result<String, CliError> {
    let store = SqliteReadingStore::new(&args.database);
    let readings = store.list_readings().map_err(|source| CliError::Readings {
        path: args.database.clone(),
        source,
    })?;
    serde_json::to_string_pretty(&readings).map_err(CliError::SerializeReadings)
}

fn render_report(report: &IngestReport) -> String {
    let raw = relation_state(report.schema.raw_table_created);
    let readings = relation_state(report.schema.readings_table_created);
    format!(
        "decoded {} features; geojson_data {raw}; sensor_readings {readings} \
         ({} materialized, {} skipped)",
        report.features, report.schema.readings_materialized, report.schema.rows_skipped
    )
}

const fn relation_state(created: bool) -> &'static str {
    if created { "created" } else { "already present" }
}

fn write_line(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}").map_err(CliError::WriteOutput)
}
