//! Data access primitives for persisted sensor readings.
//!
//! The [`ReadingStore`] trait defines a read-only interface over the
//! `sensor_readings` relation. The [`with_connection`] guard scopes every
//! database connection to one logical operation; both ingestion and queries
//! go through it rather than managing raw handles.

mod guard;
mod sqlite;

pub use guard::{ConnectionError, with_connection};
pub use sqlite::{QueryError, SqliteReadingStore};

use crate::SensorReading;

/// Read-only access to persisted sensor readings.
///
/// Implementers return the full relation in ascending `id` order. Rows that
/// do not carry the expected four-column shape are excluded by the
/// implementation rather than surfaced to callers.
///
/// # Examples
///
/// ```
/// use geosense_core::{QueryError, ReadingStore, SensorReading};
///
/// struct MemoryStore {
///     readings: Vec<SensorReading>,
/// }
///
/// impl ReadingStore for MemoryStore {
///     fn list_readings(&self) -> Result<Vec<SensorReading>, QueryError> {
///         Ok(self.readings.clone())
///     }
/// }
///
/// let store = MemoryStore {
///     readings: vec![SensorReading::new(1, 52.52, 13.405, 7.5)],
/// };
/// assert_eq!(store.list_readings().expect("list readings").len(), 1);
/// ```
pub trait ReadingStore {
    /// Return every persisted sensor reading, ordered by `id`.
    fn list_readings(&self) -> Result<Vec<SensorReading>, QueryError>;
}
