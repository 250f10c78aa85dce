//! Core domain types for the GeoSense engine.
//!
//! The crate defines the canonical [`SensorReading`] entity, the scoped
//! connection guard shared by ingestion and queries, and the read-only
//! [`ReadingStore`] access trait with its SQLite implementation.

#![forbid(unsafe_code)]

pub mod store;

pub use store::{ConnectionError, QueryError, ReadingStore, SqliteReadingStore, with_connection};

/// A single flattened sensor reading derived from a point geometry.
///
/// Readings are produced once during ingestion and are immutable afterwards.
/// Identifiers are positional: they are assigned 1-based in raw-row order
/// within one ingestion pass and are not stable across re-ingestion of a
/// reordered source.
///
/// # Examples
///
/// ```
/// use geosense_core::SensorReading;
///
/// let reading = SensorReading::new(1, 52.52, 13.405, 7.5);
/// assert_eq!(reading.id, 1);
/// assert_eq!(reading.latitude, 52.52);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Positional identifier, 1-based and strictly increasing.
    pub id: i64,
    /// Geometry Y coordinate in degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Geometry X coordinate in degrees, within `[-180, 180]`.
    pub longitude: f64,
    /// Measurement value, synthetic or sourced from a feature property.
    pub value: f64,
}

impl SensorReading {
    /// Constructs a reading from its relation row values.
    #[must_use]
    pub const fn new(id: i64, latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            value,
        }
    }
}
