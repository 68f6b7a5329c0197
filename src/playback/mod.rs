pub mod clock;
pub mod engine;
pub mod runner;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use engine::PlaybackEngine;
pub use runner::{spawn, PlaybackHandle};

use crate::core::{Route, Waypoint};
use serde::Serialize;

/// Where playback is and whether it is advancing on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
}

/// User intents forwarded by the presentation layer
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    Play,
    Pause,
    TogglePlayPause,
    Restart,
    Seek(i64),
    Load(Route),
}

/// Per-frame read model for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub current_waypoint: Waypoint,
    pub is_playing: bool,
    pub elapsed_seconds: i64,
    pub distance_covered_meters: f64,
    pub instantaneous_speed_mps: f64,
    pub bearing_degrees: f64,
    pub current_index: usize,
    pub max_index: usize,
}

impl PlaybackSnapshot {
    /// Derive the read model for `state` on `route`
    pub fn new(route: &Route, state: PlaybackState) -> Self {
        let index = state.current_index.min(route.max_index());
        Self {
            current_waypoint: route.waypoints()[index],
            is_playing: state.is_playing,
            elapsed_seconds: route.elapsed_seconds(index),
            distance_covered_meters: route.distance_covered_m(index),
            instantaneous_speed_mps: route.speed_mps(index),
            bearing_degrees: route.bearing_deg(index),
            current_index: index,
            max_index: route.max_index(),
        }
    }

    /// Single status line for terminal output
    pub fn status_line(&self) -> String {
        format!(
            "[{}/{}] {} elapsed {}s  speed {:.2} m/s  distance {}  heading {:.1}°  ({:.6}, {:.6})",
            self.current_index,
            self.max_index,
            if self.is_playing { "▶" } else { "⏸" },
            self.elapsed_seconds,
            self.instantaneous_speed_mps,
            crate::core::geo::format_distance(self.distance_covered_meters),
            self.bearing_degrees,
            self.current_waypoint.latitude,
            self.current_waypoint.longitude,
        )
    }
}
