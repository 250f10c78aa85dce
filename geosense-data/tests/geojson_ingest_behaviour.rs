//! End-to-end behaviour of the GeoJSON ingestion pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use geosense_core::{ReadingStore, SqliteReadingStore};
use geosense_data::{MAX_SENSOR_READINGS, ValuePolicy, ingest_geojson};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use serde_json::{Value, json};
use tempfile::TempDir;

fn point_feature(lon: f64, lat: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon, lat]},
        "properties": properties,
    })
}

fn polygon_feature() -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
        },
        "properties": {"kind": "zone"},
    })
}

fn write_collection(dir: &Path, name: &str, features: &[Value]) -> PathBuf {
    let path = dir.join(name);
    let collection = json!({"type": "FeatureCollection", "features": features});
    fs::write(&path, collection.to_string()).expect("write source file");
    path
}

fn count(database: &Path, table: &str) -> i64 {
    let connection = Connection::open(database).expect("open database");
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .expect("count rows")
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

#[rstest]
fn mixed_geometries_yield_point_rows_with_sequential_ids(temp_dir: TempDir) {
    let source = write_collection(
        temp_dir.path(),
        "stations.geojson",
        &[
            point_feature(10.0, 20.0, json!({"station": "alpha"})),
            polygon_feature(),
            point_feature(-5.0, -30.0, json!({"station": "beta"})),
        ],
    );
    let database = temp_dir.path().join("readings.db");

    let report =
        ingest_geojson(&source, &database, &ValuePolicy::default()).expect("ingest source");
    assert_eq!(report.features, 3);
    assert_eq!(report.schema.readings_materialized, 2);
    assert_eq!(report.schema.rows_skipped, 1);

    let readings = SqliteReadingStore::new(&database)
        .list_readings()
        .expect("list readings");
    assert_eq!(readings.len(), 2);

    let positions: Vec<(i64, f64, f64)> = readings
        .iter()
        .map(|reading| (reading.id, reading.latitude, reading.longitude))
        .collect();
    // Latitude is the geometry Y coordinate, longitude the X coordinate.
    assert_eq!(positions, vec![(1, 20.0, 10.0), (2, -30.0, -5.0)]);
    assert!(
        readings
            .iter()
            .all(|reading| (0.0..100.0).contains(&reading.value))
    );
}

#[rstest]
fn raw_relation_keeps_every_feature(temp_dir: TempDir) {
    let source = write_collection(
        temp_dir.path(),
        "stations.geojson",
        &[
            point_feature(10.0, 20.0, json!({"station": "alpha"})),
            polygon_feature(),
            point_feature(-5.0, -30.0, Value::Null),
        ],
    );
    let database = temp_dir.path().join("readings.db");

    ingest_geojson(&source, &database, &ValuePolicy::default()).expect("ingest source");

    assert_eq!(count(&database, "geojson_data"), 3);
}

#[rstest]
fn excess_eligible_features_are_truncated(temp_dir: TempDir) {
    let features: Vec<Value> = (0..=MAX_SENSOR_READINGS)
        .map(|index| {
            let offset = 0.0001 * index_as_f64(index);
            point_feature(offset, offset, json!({"index": index}))
        })
        .collect();
    assert_eq!(features.len(), MAX_SENSOR_READINGS + 1);
    let source = write_collection(temp_dir.path(), "dense.geojson", &features);
    let database = temp_dir.path().join("readings.db");

    let report =
        ingest_geojson(&source, &database, &ValuePolicy::default()).expect("ingest source");
    assert_eq!(report.features, MAX_SENSOR_READINGS + 1);
    assert_eq!(report.schema.readings_materialized, MAX_SENSOR_READINGS);

    assert_eq!(count(&database, "geojson_data"), 1001);
    assert_eq!(count(&database, "sensor_readings"), 1000);
}

#[rstest]
fn repeated_ingestion_is_idempotent(temp_dir: TempDir) {
    let source = write_collection(
        temp_dir.path(),
        "stations.geojson",
        &[point_feature(10.0, 20.0, json!({"station": "alpha"}))],
    );
    let database = temp_dir.path().join("readings.db");

    let first = ingest_geojson(&source, &database, &ValuePolicy::default()).expect("first pass");
    assert!(first.schema.raw_table_created);
    assert!(first.schema.readings_table_created);

    // A second pass, even against a grown source, must leave both relations
    // untouched: creation is create-if-absent.
    let grown = write_collection(
        temp_dir.path(),
        "grown.geojson",
        &[
            point_feature(10.0, 20.0, json!({"station": "alpha"})),
            point_feature(11.0, 21.0, json!({"station": "gamma"})),
        ],
    );
    let second = ingest_geojson(&grown, &database, &ValuePolicy::default()).expect("second pass");
    assert!(!second.schema.raw_table_created);
    assert!(!second.schema.readings_table_created);
    assert_eq!(second.schema.readings_materialized, 0);

    assert_eq!(count(&database, "geojson_data"), 1);
    assert_eq!(count(&database, "sensor_readings"), 1);
}

#[rstest]
fn property_policy_sources_values_from_the_raw_relation(temp_dir: TempDir) {
    let source = write_collection(
        temp_dir.path(),
        "stations.geojson",
        &[
            point_feature(10.0, 20.0, json!({"reading": 42.5})),
            point_feature(11.0, 21.0, json!({"station": "no reading"})),
        ],
    );
    let database = temp_dir.path().join("readings.db");
    let policy = ValuePolicy::Property("reading".to_owned());

    let report = ingest_geojson(&source, &database, &policy).expect("ingest source");
    assert_eq!(report.schema.readings_materialized, 1);
    assert_eq!(report.schema.rows_skipped, 1);

    let readings = SqliteReadingStore::new(&database)
        .list_readings()
        .expect("list readings");
    assert_eq!(readings.len(), 1);
    assert_eq!(readings.first().map(|reading| reading.value), Some(42.5));
}

#[rstest]
fn seeded_synthetic_fill_is_reproducible(temp_dir: TempDir) {
    let features = vec![
        point_feature(10.0, 20.0, Value::Null),
        point_feature(11.0, 21.0, Value::Null),
    ];
    let source = write_collection(temp_dir.path(), "stations.geojson", &features);
    let policy = ValuePolicy::Synthetic { seed: Some(99) };

    let first_db = temp_dir.path().join("first.db");
    let second_db = temp_dir.path().join("second.db");
    ingest_geojson(&source, &first_db, &policy).expect("first ingest");
    ingest_geojson(&source, &second_db, &policy).expect("second ingest");

    let first = SqliteReadingStore::new(&first_db)
        .list_readings()
        .expect("first readings");
    let second = SqliteReadingStore::new(&second_db)
        .list_readings()
        .expect("second readings");
    assert_eq!(first, second);
}

fn index_as_f64(index: usize) -> f64 {
    u32::try_from(index).map(f64::from).unwrap_or(0.0)
}
