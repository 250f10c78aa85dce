//! Error types emitted by the GeoSense CLI.

use std::path::PathBuf;

use geosense_core::QueryError;
use geosense_data::IngestError;
use thiserror::Error;

/// Errors emitted by the GeoSense CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Running the ingestion pipeline failed.
    #[error("failed to ingest GeoJSON data: {0}")]
    Ingest(#[from] IngestError),
    /// Reading the sensor readings relation failed. The user-facing message
    /// stays generic; the query detail travels in the source chain.
    #[error("failed to read sensor readings from {path:?}")]
    Readings {
        /// Database the query ran against.
        path: PathBuf,
        /// Underlying query failure.
        #[source]
        source: QueryError,
    },
    /// Serializing readings to JSON failed.
    #[error("failed to serialize sensor readings: {0}")]
    SerializeReadings(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
