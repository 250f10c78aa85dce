//! SQLite-backed read side of the sensor readings relation.

use std::path::{Path, PathBuf};

use log::warn;
use rusqlite::{Connection, Row};
use thiserror::Error;

use crate::SensorReading;

use super::guard::{ConnectionError, with_connection};
use super::ReadingStore;

/// Errors raised when querying the sensor readings relation.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Acquiring or releasing the database connection failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// Executing the read against an open connection failed, for example
    /// because the relation does not exist yet.
    #[error("failed to query sensor_readings in {path:?}")]
    Execute {
        /// Database the query ran against.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Read-only reading store backed by an embedded SQLite database file.
///
/// The store holds only the database path. Every call acquires its own
/// scoped connection through [`with_connection`], so no handle outlives a
/// single logical operation and concurrent callers never share one.
#[derive(Debug, Clone)]
pub struct SqliteReadingStore {
    db_path: PathBuf,
}

impl SqliteReadingStore {
    /// Create a store for the database file at `db_path`.
    ///
    /// The file is not touched until a query runs.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Location of the backing database file.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    fn execute_error(&self, source: rusqlite::Error) -> QueryError {
        QueryError::Execute {
            path: self.db_path.clone(),
            source,
        }
    }

    fn read_all(&self, connection: &Connection) -> Result<Vec<SensorReading>, QueryError> {
        let mut statement = connection
            .prepare("SELECT id, latitude, longitude, value FROM sensor_readings ORDER BY id")
            .map_err(|source| self.execute_error(source))?;

        let rows = statement
            .query_map([], |row| Ok(read_reading(row)))
            .map_err(|source| self.execute_error(source))?;

        let mut readings = Vec::new();
        for row in rows {
            match row.map_err(|source| self.execute_error(source))? {
                Ok(reading) => readings.push(reading),
                // Malformed rows are excluded rather than failing the whole
                // read; the relation contract is four non-null columns.
                Err(source) => warn!("dropping malformed sensor_readings row: {source}"),
            }
        }
        Ok(readings)
    }
}

impl ReadingStore for SqliteReadingStore {
    fn list_readings(&self) -> Result<Vec<SensorReading>, QueryError> {
        with_connection(&self.db_path, |connection| self.read_all(connection))
    }
}

fn read_reading(row: &Row<'_>) -> Result<SensorReading, rusqlite::Error> {
    Ok(SensorReading {
        id: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        value: row.get(3)?,
    })
}
