//! GeoJSON source decoding.

use std::fs;
use std::path::Path;

use geojson::{Feature, GeoJson};

use super::IngestError;

/// Read and decode the source file into feature records.
///
/// Accepts a feature collection, a single feature, or a bare geometry; the
/// latter two are lifted into a one-element feature list. The caller is
/// responsible for checking that `path` exists before invoking this.
pub(crate) fn load_features(path: &Path) -> Result<Vec<Feature>, IngestError> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson = contents
        .parse::<GeoJson>()
        .map_err(|source| IngestError::ParseSource {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(flatten(geojson))
}

fn flatten(geojson: GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    }
}
