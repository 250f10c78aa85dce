//! GeoJSON ingestion pipeline.
//!
//! The pipeline locates the source file, decodes it into feature records,
//! and materializes the raw and derived relations inside one scoped
//! connection. Per-row geometry defects are absorbed (the row is excluded);
//! file-level and connection-level failures abort the pass as typed errors.

use std::path::{Path, PathBuf};

use geosense_core::{ConnectionError, with_connection};
use thiserror::Error;

pub mod geometry;
pub mod schema;
mod source;

pub use geometry::point_coordinate;
pub use schema::{MAX_SENSOR_READINGS, SchemaError, SchemaSummary, ValuePolicy, build_schema};

/// Detailed report of one ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of feature records decoded from the source file.
    pub features: usize,
    /// What the schema builder did with the decoded features.
    pub schema: SchemaSummary,
}

/// Errors returned when ingesting a GeoJSON source file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The resolved source path does not exist on disk. Checked before any
    /// open or parse attempt so the failure is unambiguous.
    #[error("source file {path:?} does not exist")]
    MissingSource {
        /// Path that failed the existence check.
        path: PathBuf,
    },
    /// Reading the source file failed.
    #[error("failed to read GeoJSON source at {path:?}")]
    ReadSource {
        /// Path of the unreadable source file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The source file is not valid GeoJSON.
    #[error("failed to parse GeoJSON source at {path:?}")]
    ParseSource {
        /// Path of the malformed source file.
        path: PathBuf,
        /// Decoding failure reported by the `geojson` crate.
        #[source]
        source: geojson::Error,
    },
    /// Acquiring or releasing the database connection failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// Building the persisted relations failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Ingest a GeoJSON source file into the database at `db_path`.
///
/// Either both relations end up created (or already existed) and the report
/// describes the pass, or a typed error is returned and nothing is
/// committed. The connection is acquired after the source is decoded and
/// released before this returns, on every path.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use geosense_data::{ValuePolicy, ingest_geojson};
///
/// # fn main() -> Result<(), geosense_data::IngestError> {
/// let report = ingest_geojson(
///     Path::new("stations.geojson"),
///     Path::new("readings.db"),
///     &ValuePolicy::default(),
/// )?;
/// println!("materialized {} readings", report.schema.readings_materialized);
/// # Ok(())
/// # }
/// ```
pub fn ingest_geojson(
    source_path: &Path,
    db_path: &Path,
    policy: &ValuePolicy,
) -> Result<IngestReport, IngestError> {
    if !source_path.is_file() {
        return Err(IngestError::MissingSource {
            path: source_path.to_path_buf(),
        });
    }

    let features = source::load_features(source_path)?;
    let schema = with_connection(db_path, |connection| {
        build_schema(connection, &features, policy).map_err(IngestError::from)
    })?;

    Ok(IngestReport {
        features: features.len(),
        schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    #[rstest]
    fn missing_source_fails_before_any_connection_opens(temp_dir: TempDir) {
        let source = temp_dir.path().join("absent.geojson");
        let database = temp_dir.path().join("readings.db");

        let error = ingest_geojson(&source, &database, &ValuePolicy::default())
            .expect_err("missing source should fail");

        match error {
            IngestError::MissingSource { path } => assert_eq!(path, source),
            other => panic!("expected missing-source error, got {other:?}"),
        }
        // Opening a connection would have created the database file.
        assert!(!database.exists(), "no connection may be opened");
    }

    #[rstest]
    fn malformed_source_fails_before_any_connection_opens(temp_dir: TempDir) {
        let source = temp_dir.path().join("broken.geojson");
        std::fs::write(&source, "{ not geojson").expect("write source");
        let database = temp_dir.path().join("readings.db");

        let error = ingest_geojson(&source, &database, &ValuePolicy::default())
            .expect_err("malformed source should fail");

        assert!(matches!(error, IngestError::ParseSource { .. }));
        assert!(!database.exists(), "no connection may be opened");
    }

    #[rstest]
    fn unreachable_database_is_a_connection_error(temp_dir: TempDir) {
        let source = temp_dir.path().join("stations.geojson");
        std::fs::write(
            &source,
            r#"{"type": "Point", "coordinates": [10.0, 20.0]}"#,
        )
        .expect("write source");
        let database = temp_dir.path().join("missing-dir").join("readings.db");

        let error = ingest_geojson(&source, &database, &ValuePolicy::default())
            .expect_err("unreachable database should fail");
        assert!(matches!(
            error,
            IngestError::Connection(ConnectionError::Open { .. })
        ));
    }
}
