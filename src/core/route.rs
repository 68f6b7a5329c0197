use crate::core::{geo, GeoPoint, Waypoint};
use crate::error::InvalidRouteError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A validated, non-empty waypoint sequence with non-decreasing timestamps
///
/// All derived metrics are pure functions of an index into the route, so the
/// playback engine only has to track where it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

/// One of several alternative routes returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRoute {
    pub name: String,
    pub route: Route,
}

impl Route {
    /// Validate and wrap a waypoint sequence
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, InvalidRouteError> {
        if waypoints.is_empty() {
            return Err(InvalidRouteError::Empty);
        }

        for (index, wp) in waypoints.iter().enumerate() {
            if !wp.has_finite_coordinates() {
                return Err(InvalidRouteError::NonFiniteCoordinate { index });
            }
        }

        // Equal timestamps are zero-duration segments, not errors
        if let Some(index) = waypoints
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(InvalidRouteError::NonMonotonicTimestamp { index: index + 1 });
        }

        Ok(Self { waypoints })
    }

    /// Build a route from bare coordinates, spacing timestamps evenly from `anchor`
    pub fn from_positions(
        positions: impl IntoIterator<Item = GeoPoint>,
        anchor: DateTime<Utc>,
        spacing: Duration,
    ) -> Result<Self, InvalidRouteError> {
        let waypoints = positions
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                let timestamp = spaced_timestamp(anchor, spacing, index)
                    .ok_or(InvalidRouteError::TimestampOutOfRange { index })?;
                Ok(Waypoint::new(p.lat, p.lon, timestamp))
            })
            .collect::<Result<Vec<_>, InvalidRouteError>>()?;
        Self::new(waypoints)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Index of the terminal waypoint
    pub fn max_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.waypoints[0].timestamp
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.waypoints[self.max_index()].timestamp
    }

    /// Wall-clock time between waypoint `index` and the one after it
    ///
    /// `None` at the terminal waypoint.
    pub fn segment_duration(&self, index: usize) -> Option<Duration> {
        let from = self.waypoints.get(index)?;
        let to = self.waypoints.get(index + 1)?;
        Some(to.timestamp - from.timestamp)
    }

    /// Whole seconds from the first waypoint to `index`, floored
    pub fn elapsed_seconds(&self, index: usize) -> i64 {
        let index = index.min(self.max_index());
        (self.waypoints[index].timestamp - self.start_time()).num_seconds()
    }

    /// Haversine distance of the segment ending at `index`
    fn segment_distance_m(&self, index: usize) -> f64 {
        if index == 0 || index > self.max_index() {
            return 0.0;
        }
        geo::haversine(
            self.waypoints[index - 1].position(),
            self.waypoints[index].position(),
        )
    }

    /// Cumulative great-circle distance from the start up to `index`
    pub fn distance_covered_m(&self, index: usize) -> f64 {
        let index = index.min(self.max_index());
        (1..=index).map(|i| self.segment_distance_m(i)).sum()
    }

    /// Average speed over the segment ending at `index`
    ///
    /// Zero at the first waypoint and across zero-duration segments.
    pub fn speed_mps(&self, index: usize) -> f64 {
        if index == 0 || index > self.max_index() {
            return 0.0;
        }
        let dt = self.waypoints[index].timestamp - self.waypoints[index - 1].timestamp;
        let secs = dt.to_std().map(|d| d.as_secs_f64()).unwrap_or(0.0);
        if secs <= 0.0 {
            return 0.0;
        }
        self.segment_distance_m(index) / secs
    }

    /// Heading from `index` towards the next waypoint, 0 at the terminal waypoint
    pub fn bearing_deg(&self, index: usize) -> f64 {
        match (self.waypoints.get(index), self.waypoints.get(index + 1)) {
            (Some(from), Some(to)) => geo::bearing(from.position(), to.position()),
            _ => 0.0,
        }
    }

    /// Every position along the route, for drawing the full polyline
    pub fn full_path(&self) -> Vec<GeoPoint> {
        self.waypoints.iter().map(Waypoint::position).collect()
    }

    /// Positions from `index` to the end, for drawing what is left to travel
    pub fn remaining_path(&self, index: usize) -> Vec<GeoPoint> {
        let index = index.min(self.max_index());
        self.waypoints[index..].iter().map(Waypoint::position).collect()
    }
}

/// `anchor + spacing * index`, or `None` when that leaves chrono's range
pub(crate) fn spaced_timestamp(
    anchor: DateTime<Utc>,
    spacing: Duration,
    index: usize,
) -> Option<DateTime<Utc>> {
    let offset = spacing.checked_mul(i32::try_from(index).ok()?)?;
    anchor.checked_add_signed(offset)
}
