//! Point-coordinate extraction from GeoJSON geometries.

use geo::Coord;
use geojson::{Geometry, Value};

/// Extract the coordinate of a point geometry.
///
/// Returns `Some` only for point geometries whose longitude and latitude are
/// finite and within `[-180, 180]` / `[-90, 90]` degrees. Any other geometry
/// type, a short position array, or a non-finite or out-of-range coordinate
/// yields `None`; callers exclude such rows instead of aborting, which keeps
/// ingestion robust to mixed-geometry sources. A trailing altitude element is
/// ignored. No validation beyond range and finiteness is performed.
///
/// # Examples
///
/// ```
/// use geojson::{Geometry, Value};
/// use geosense_data::point_coordinate;
///
/// let point = Geometry::new(Value::Point(vec![13.405, 52.52]));
/// let coordinate = point_coordinate(&point).expect("point geometry");
/// assert_eq!(coordinate.x, 13.405);
/// assert_eq!(coordinate.y, 52.52);
///
/// let line = Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));
/// assert!(point_coordinate(&line).is_none());
/// ```
#[must_use]
pub fn point_coordinate(geometry: &Geometry) -> Option<Coord<f64>> {
    let Value::Point(position) = &geometry.value else {
        return None;
    };
    let lon = *position.first()?;
    let lat = *position.get(1)?;
    (lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat))
    .then_some(Coord { x: lon, y: lat })
}
