//! Facade crate for the GeoSense reading engine.
//!
//! This crate re-exports the core domain types together with the SQLite-backed
//! reading store and the connection guard shared by ingestion and queries.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//!
//! use geosense_engine::{SensorReading, SqliteReadingStore};
//!
//! let store = SqliteReadingStore::new("readings.db");
//! assert_eq!(store.database_path(), Path::new("readings.db"));
//!
//! let reading = SensorReading::new(1, 52.52, 13.405, 7.5);
//! assert_eq!(reading.longitude, 13.405);
//! ```

#![forbid(unsafe_code)]

pub use geosense_core::{
    ConnectionError, QueryError, ReadingStore, SensorReading, SqliteReadingStore, with_connection,
};
