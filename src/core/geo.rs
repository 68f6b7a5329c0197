//! Great-circle helpers used for route metrics and marker orientation.

use crate::core::GeoPoint;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in metres
pub fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing from `a` towards `b` in degrees, in (-180, 180]
///
/// North is 0, east is 90. The value is not normalized to [0, 360), so a
/// westward heading comes out as -90.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    y.atan2(x).to_degrees()
}

/// Linear interpolation between two positions, `t` clamped to [0, 1]
///
/// Good enough for animating a marker across one short route segment.
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t)
}

/// Human readable distance: metres up to 1 km, kilometres above
pub fn format_distance(meters: f64) -> String {
    if meters > 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.2} m", meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_at_equator() {
        let d = haversine(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::new(17.385, 78.4867);
        assert_eq!(haversine(p, p), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = GeoPoint::new(17.385, 78.4867);
        let b = GeoPoint::new(17.4933, 78.4035);
        assert!((haversine(a, b) - haversine(b, a)).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((bearing(origin, GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(-1.0, 0.0)).abs() - 180.0).abs() < 1e-9);
        assert!((bearing(origin, GeoPoint::new(0.0, -1.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_clamps() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(2.0, 4.0);
        assert_eq!(interpolate(a, b, 0.5), GeoPoint::new(1.0, 2.0));
        assert_eq!(interpolate(a, b, -1.0), a);
        assert_eq!(interpolate(a, b, 3.0), b);
        assert_eq!(interpolate(a, b, f64::NAN), a);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0.00 m");
        assert_eq!(format_distance(999.456), "999.46 m");
        assert_eq!(format_distance(1000.0), "1000.00 m");
        assert_eq!(format_distance(12_340.0), "12.34 km");
    }
}
