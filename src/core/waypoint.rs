use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A single timestamped position along a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Instant the vehicle is at this position
    pub timestamp: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    /// Position without the timestamp
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn has_finite_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_waypoint_position() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let wp = Waypoint::new(17.385, 78.4867, ts);
        assert_eq!(wp.position(), GeoPoint::new(17.385, 78.4867));
        assert_eq!(wp.timestamp, ts);
    }

    #[test]
    fn test_non_finite_coordinates() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(Waypoint::new(1.0, 2.0, ts).has_finite_coordinates());
        assert!(!Waypoint::new(f64::NAN, 2.0, ts).has_finite_coordinates());
        assert!(!Waypoint::new(1.0, f64::INFINITY, ts).has_finite_coordinates());
    }
}
