//! GeoJSON ingestion and schema derivation for the GeoSense engine.
//!
//! Responsibilities:
//! - Decode GeoJSON sources into feature records.
//! - Materialize the raw import and derived reading relations.
//! - Keep connection lifetimes scoped to one ingestion pass.
//!
//! Boundaries:
//! - Domain types live in `geosense-core`.
//! - Boundary concerns (argument parsing, output formatting) live in the CLI.

#![forbid(unsafe_code)]

pub mod ingest;

pub use ingest::{
    IngestError, IngestReport, MAX_SENSOR_READINGS, SchemaError, SchemaSummary, ValuePolicy,
    ingest_geojson, point_coordinate,
};
