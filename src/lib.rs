//! Playback of a vehicle moving along a timestamped route.
//!
//! A [`PlaybackEngine`] owns a validated [`Route`] and the current waypoint
//! index, advances on its own at the pace of the route's timestamps, and
//! derives elapsed time, distance, speed and heading from the index. Routes
//! come from a [`provider::RouteProvider`] or from files via [`input`].

pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod playback;
pub mod provider;

pub use crate::core::{GeoPoint, NamedRoute, Route, Waypoint};
pub use error::{InvalidRouteError, RouteUnavailableError};
pub use playback::{PlaybackCommand, PlaybackEngine, PlaybackSnapshot, PlaybackState};
