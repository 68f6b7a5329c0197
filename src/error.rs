use thiserror::Error;

/// A waypoint sequence that cannot be played back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRouteError {
    #[error("route has no waypoints")]
    Empty,

    #[error("timestamp at waypoint {index} is earlier than the one before it")]
    NonMonotonicTimestamp { index: usize },

    #[error("waypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("timestamp for waypoint {index} is out of range")]
    TimestampOutOfRange { index: usize },
}

/// A route provider could not produce a route
#[derive(Debug, Error)]
pub enum RouteUnavailableError {
    #[error("routing request failed: {0}")]
    Request(String),

    #[error("routing service returned HTTP {0}")]
    Status(u16),

    #[error("could not decode routing response: {0}")]
    Decode(String),

    #[error("no route found: {0}")]
    NoRoute(String),

    #[error(transparent)]
    Invalid(#[from] InvalidRouteError),
}

impl From<reqwest::Error> for RouteUnavailableError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RouteUnavailableError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RouteUnavailableError::Status(status.as_u16())
        } else {
            RouteUnavailableError::Request(err.to_string())
        }
    }
}
