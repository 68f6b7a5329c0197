use anyhow::{Context, Result};
use std::path::Path;
use crate::core::{GeoPoint, Route};
use chrono::{DateTime, Duration, Utc};
use geojson::{GeoJson, Geometry, Value};

/// Load a route from a GeoJSON file
pub fn load_geojson<P: AsRef<Path>>(path: P, spacing: Duration) -> Result<Route> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
    parse_geojson(&text, Utc::now(), spacing)
}

/// Parse the first line geometry in a GeoJSON document
///
/// Accepts a bare geometry, a Feature, or a FeatureCollection. A
/// MultiLineString is flattened in order. GeoJSON carries no time, so
/// waypoints are spaced `spacing` apart from `anchor`.
pub fn parse_geojson(text: &str, anchor: DateTime<Utc>, spacing: Duration) -> Result<Route> {
    let gj: GeoJson = text.parse().context("Failed to parse GeoJSON")?;

    let positions = match &gj {
        GeoJson::Geometry(geometry) => line_positions(geometry),
        GeoJson::Feature(feature) => feature.geometry.as_ref().and_then(line_positions),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .find_map(line_positions),
    }
    .context("GeoJSON contains no LineString geometry")?;

    Ok(Route::from_positions(positions, anchor, spacing)?)
}

/// GeoJSON positions are `[lon, lat, ...]`
fn to_point(position: &[f64]) -> Option<GeoPoint> {
    match position {
        [lon, lat, ..] => Some(GeoPoint::new(*lat, *lon)),
        _ => None,
    }
}

fn line_positions(geometry: &Geometry) -> Option<Vec<GeoPoint>> {
    match &geometry.value {
        Value::LineString(line) => line.iter().map(|p| to_point(p)).collect(),
        Value::MultiLineString(lines) => lines.iter().flatten().map(|p| to_point(p)).collect(),
        Value::GeometryCollection(geometries) => geometries.iter().find_map(line_positions),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidRouteError;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_linestring() {
        let text = r#"{"type": "LineString", "coordinates": [[78.4867, 17.385], [78.48, 17.39], [78.4035, 17.4933]]}"#;
        let route = parse_geojson(text, anchor(), Duration::seconds(5)).unwrap();
        assert_eq!(route.len(), 3);
        assert_eq!(route.waypoints()[0].latitude, 17.385);
        assert_eq!(route.waypoints()[0].longitude, 78.4867);
        assert_eq!(route.end_time(), anchor() + Duration::seconds(10));
    }

    #[test]
    fn test_parse_feature_collection_skips_points() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"type": "stop"},
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
                {"type": "Feature", "properties": {"type": "route"},
                 "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 0.0]]}}
            ]
        }"#;
        let route = parse_geojson(text, anchor(), Duration::seconds(1)).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.waypoints()[1].longitude, 1.0);
    }

    #[test]
    fn test_parse_multilinestring() {
        let text = r#"{"type": "Feature", "properties": {}, "geometry":
            {"type": "MultiLineString", "coordinates": [[[0, 0], [0, 1]], [[0, 2], [0, 3]]]}}"#;
        let route = parse_geojson(text, anchor(), Duration::seconds(1)).unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.waypoints()[3].latitude, 3.0);
    }

    #[test]
    fn test_no_line_geometry() {
        let text = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        let err = parse_geojson(text, anchor(), Duration::seconds(1)).unwrap_err();
        assert!(err.to_string().contains("no LineString"));
    }

    #[test]
    fn test_empty_linestring() {
        let text = r#"{"type": "LineString", "coordinates": []}"#;
        let err = parse_geojson(text, anchor(), Duration::seconds(1)).unwrap_err();
        assert_eq!(err.downcast_ref::<InvalidRouteError>(), Some(&InvalidRouteError::Empty));
    }
}
