//! Scoped acquisition and release of SQLite connections.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;

/// Errors raised while acquiring or releasing a database connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Opening the database file failed.
    #[error("failed to open database at {path:?}")]
    Open {
        /// Location of the database file on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Closing the database file failed after the body completed.
    #[error("failed to close database at {path:?}")]
    Close {
        /// Location of the database file on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Run `body` against a connection scoped to the database at `path`.
///
/// The connection is acquired on entry and released exactly once on every
/// exit path: normal returns close it explicitly so close failures surface,
/// and an unwinding `body` releases it through drop. The raw handle never
/// escapes the scope, and the caller supplies the resolved path; the guard
/// holds no defaults of its own.
///
/// If acquisition itself fails, `body` is never invoked and the caller
/// receives [`ConnectionError::Open`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use geosense_core::{QueryError, with_connection};
///
/// # fn main() -> Result<(), QueryError> {
/// let path = Path::new("readings.db");
/// let rows: i64 = with_connection(path, |connection| {
///     connection
///         .query_row("SELECT COUNT(*) FROM sensor_readings", [], |row| row.get(0))
///         .map_err(|source| QueryError::Execute {
///             path: path.to_path_buf(),
///             source,
///         })
/// })?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub fn with_connection<T, E, F>(path: &Path, body: F) -> Result<T, E>
where
    E: From<ConnectionError>,
    F: FnOnce(&mut Connection) -> Result<T, E>,
{
    let mut connection = Connection::open(path).map_err(|source| {
        E::from(ConnectionError::Open {
            path: path.to_path_buf(),
            source,
        })
    })?;

    let result = body(&mut connection);

    if let Err((unclosed, source)) = connection.close() {
        // Dropping the handed-back handle re-attempts the close.
        drop(unclosed);
        return match result {
            Ok(_) => Err(E::from(ConnectionError::Close {
                path: path.to_path_buf(),
                source,
            })),
            Err(error) => Err(error),
        };
    }

    result
}
