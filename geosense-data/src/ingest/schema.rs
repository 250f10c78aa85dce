//! Idempotent creation of the raw import and derived reading relations.

use std::collections::BTreeSet;

use geojson::{Feature, Geometry};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::geometry::point_coordinate;

/// Upper bound on rows materialized into `sensor_readings` by one ingestion
/// pass. Excess eligible features are silently truncated to keep the derived
/// relation bounded for the serving workload.
pub const MAX_SENSOR_READINGS: usize = 1000;

/// Name of the geometry column in the raw import relation.
const GEOMETRY_COLUMN: &str = "geometry";

/// Policy for filling the `value` column of derived readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePolicy {
    /// Fill with uniform random values in `[0, 100)`. A seed makes the fill
    /// reproducible; without one each pass draws from entropy.
    Synthetic {
        /// Optional seed for a reproducible fill.
        seed: Option<u64>,
    },
    /// Take the named feature property from the raw row. Rows whose property
    /// is missing or not numeric are excluded like extraction failures.
    Property(String),
}

impl Default for ValuePolicy {
    fn default() -> Self {
        Self::Synthetic { seed: None }
    }
}

/// Outcome of one schema-builder invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaSummary {
    /// Whether `geojson_data` was created by this pass (`false`: it already
    /// existed and was left untouched).
    pub raw_table_created: bool,
    /// Whether `sensor_readings` was created by this pass.
    pub readings_table_created: bool,
    /// Rows materialized into `sensor_readings` by this pass.
    pub readings_materialized: usize,
    /// Raw rows scanned but excluded (no extractable point geometry, or no
    /// usable value under the active policy).
    pub rows_skipped: usize,
}

/// Errors raised while building the persisted relations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Beginning the ingestion transaction failed.
    #[error("failed to begin ingestion transaction")]
    Begin {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A schema step failed against the open transaction.
    #[error("failed to execute schema step '{step}'")]
    Step {
        /// Human-readable name of the failed step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Serializing a feature geometry for the raw import failed.
    #[error("failed to serialize geometry for raw import")]
    SerializeGeometry {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Committing the ingestion transaction failed.
    #[error("failed to commit ingestion transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Idempotently ensure both persisted relations exist.
///
/// `geojson_data` mirrors the source: one row per feature, a TEXT column per
/// property plus the GeoJSON-encoded geometry. `sensor_readings` is derived
/// from it by scanning in rowid order, extracting point coordinates,
/// assigning 1-based sequential ids and filling `value` per `policy`, capped
/// at [`MAX_SENSOR_READINGS`] rows. Each relation is created and populated
/// only when absent; an existing relation is left untouched, so source
/// schema drift across runs is not reflected. Both steps commit in one
/// transaction; on error nothing is persisted.
///
/// # Examples
/// ```
/// use geojson::{Feature, Geometry, Value};
/// use geosense_data::ingest::{ValuePolicy, build_schema};
/// use rusqlite::Connection;
///
/// let mut connection = Connection::open_in_memory().expect("open in-memory database");
/// let feature = Feature {
///     bbox: None,
///     geometry: Some(Geometry::new(Value::Point(vec![13.405, 52.52]))),
///     id: None,
///     properties: None,
///     foreign_members: None,
/// };
/// let summary =
///     build_schema(&mut connection, &[feature], &ValuePolicy::default()).expect("build schema");
/// assert!(summary.raw_table_created);
/// assert_eq!(summary.readings_materialized, 1);
/// ```
pub fn build_schema(
    connection: &mut Connection,
    features: &[Feature],
    policy: &ValuePolicy,
) -> Result<SchemaSummary, SchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Begin { source })?;

    let mut summary = SchemaSummary::default();

    if !table_exists(&transaction, "geojson_data")? {
        create_raw_relation(&transaction, features)?;
        summary.raw_table_created = true;
    }

    if !table_exists(&transaction, "sensor_readings")? {
        run_step(
            &transaction,
            "create sensor_readings",
            "CREATE TABLE sensor_readings (
                id INTEGER PRIMARY KEY,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                value REAL NOT NULL
            )",
        )?;
        let (materialized, skipped) = populate_readings(&transaction, policy)?;
        summary.readings_table_created = true;
        summary.readings_materialized = materialized;
        summary.rows_skipped = skipped;
        if skipped > 0 {
            warn!("skipped {skipped} raw rows without an extractable reading");
        }
    }

    transaction
        .commit()
        .map_err(|source| SchemaError::Commit { source })?;

    Ok(summary)
}

fn step(step: &'static str) -> impl FnOnce(rusqlite::Error) -> SchemaError {
    move |source| SchemaError::Step { step, source }
}

fn run_step(
    transaction: &Transaction<'_>,
    name: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction.execute(sql, []).map(|_| ()).map_err(step(name))
}

fn table_exists(transaction: &Transaction<'_>, name: &str) -> Result<bool, SchemaError> {
    transaction
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(step("probe relation existence"))
}

fn create_raw_relation(
    transaction: &Transaction<'_>,
    features: &[Feature],
) -> Result<(), SchemaError> {
    let columns = property_columns(features);

    let mut definitions: Vec<String> = columns
        .iter()
        .map(|name| format!("{} TEXT", quote_identifier(name)))
        .collect();
    definitions.push(format!("{} TEXT", quote_identifier(GEOMETRY_COLUMN)));
    let ddl = format!("CREATE TABLE geojson_data ({})", definitions.join(", "));
    run_step(transaction, "create geojson_data", &ddl)?;

    if features.is_empty() {
        return Ok(());
    }

    let mut names: Vec<String> = columns.iter().map(|name| quote_identifier(name)).collect();
    names.push(quote_identifier(GEOMETRY_COLUMN));
    let placeholders: Vec<String> = (1..=names.len()).map(|index| format!("?{index}")).collect();
    let insert_sql = format!(
        "INSERT INTO geojson_data ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    );
    let mut statement = transaction
        .prepare(&insert_sql)
        .map_err(step("prepare raw insert"))?;

    for feature in features {
        let mut row: Vec<Option<String>> = columns
            .iter()
            .map(|name| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|properties| properties.get(name))
                    .and_then(property_text)
            })
            .collect();
        row.push(geometry_text(feature.geometry.as_ref())?);
        statement
            .execute(params_from_iter(row.iter()))
            .map_err(step("insert raw feature"))?;
    }

    Ok(())
}

fn property_columns(features: &[Feature]) -> Vec<String> {
    let mut columns = BTreeSet::new();
    for feature in features {
        let Some(properties) = feature.properties.as_ref() else {
            continue;
        };
        for name in properties.keys() {
            if name == GEOMETRY_COLUMN {
                warn!("skipping feature property named '{GEOMETRY_COLUMN}'");
                continue;
            }
            columns.insert(name.clone());
        }
    }
    columns.into_iter().collect()
}

// Scalar strings are stored verbatim; any other JSON value keeps its compact
// JSON encoding. Null and absent properties map to SQL NULL.
fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn geometry_text(geometry: Option<&Geometry>) -> Result<Option<String>, SchemaError> {
    geometry
        .map(|value| serde_json::to_string(value))
        .transpose()
        .map_err(|source| SchemaError::SerializeGeometry { source })
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn populate_readings(
    transaction: &Transaction<'_>,
    policy: &ValuePolicy,
) -> Result<(usize, usize), SchemaError> {
    let select_sql = match policy {
        ValuePolicy::Property(name) => format!(
            "SELECT {}, {} FROM geojson_data ORDER BY rowid",
            quote_identifier(GEOMETRY_COLUMN),
            quote_identifier(name)
        ),
        ValuePolicy::Synthetic { .. } => format!(
            "SELECT {} FROM geojson_data ORDER BY rowid",
            quote_identifier(GEOMETRY_COLUMN)
        ),
    };
    let mut select = transaction
        .prepare(&select_sql)
        .map_err(step("prepare raw scan"))?;
    let mut insert = transaction
        .prepare("INSERT INTO sensor_readings (id, latitude, longitude, value) VALUES (?1, ?2, ?3, ?4)")
        .map_err(step("prepare reading insert"))?;

    let mut rng = match policy {
        ValuePolicy::Synthetic { seed: Some(seed) } => StdRng::seed_from_u64(*seed),
        _ => StdRng::from_entropy(),
    };

    let mut rows = select.query([]).map_err(step("scan geojson_data"))?;
    let mut materialized = 0usize;
    let mut skipped = 0usize;
    let mut next_id = 0i64;

    while let Some(row) = rows.next().map_err(step("scan geojson_data"))? {
        if materialized == MAX_SENSOR_READINGS {
            break;
        }

        let geometry: Option<String> = row.get(0).map_err(step("read raw geometry"))?;
        let Some(coordinate) = geometry.as_deref().and_then(stored_point_coordinate) else {
            skipped += 1;
            continue;
        };

        let value = match policy {
            ValuePolicy::Synthetic { .. } => rng.gen_range(0.0..100.0),
            ValuePolicy::Property(_) => {
                let raw: Option<String> = row.get(1).map_err(step("read value property"))?;
                match numeric_value(raw.as_deref()) {
                    Some(value) => value,
                    None => {
                        skipped += 1;
                        continue;
                    }
                }
            }
        };

        materialized += 1;
        next_id += 1;
        insert
            .execute(params![next_id, coordinate.y, coordinate.x, value])
            .map_err(step("insert sensor reading"))?;
    }

    Ok((materialized, skipped))
}

fn stored_point_coordinate(text: &str) -> Option<geo::Coord<f64>> {
    match serde_json::from_str::<Geometry>(text) {
        Ok(geometry) => point_coordinate(&geometry),
        Err(error) => {
            warn!("dropping raw row with undecodable geometry: {error}");
            None
        }
    }
}

fn numeric_value(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
