use crate::core::{geo, GeoPoint, Route, Waypoint};
use crate::error::InvalidRouteError;
use crate::playback::clock::{Clock, SystemClock};
use crate::playback::{PlaybackCommand, PlaybackSnapshot, PlaybackState};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A scheduled move from `from_index` to the next waypoint
///
/// Only valid while the route generation and index it was armed for are
/// still current; anything else makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAdvance {
    due: Instant,
    generation: u64,
    from_index: usize,
}

/// Playback engine for a timestamped route
///
/// Starts idle (no route). Once a route is loaded, playback sits paused at
/// the first waypoint until `play` is called. While playing, the engine keeps
/// at most one pending advance whose delay is the gap between the current and
/// next waypoint timestamps; `update` fires it once the clock passes the
/// deadline.
pub struct PlaybackEngine<C: Clock = SystemClock> {
    route: Option<Route>,
    /// Bumped on every load so advances armed for an older route never apply
    generation: u64,
    state: PlaybackState,
    pending: Option<PendingAdvance>,
    clock: C,
}

impl PlaybackEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PlaybackEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PlaybackEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            route: None,
            generation: 0,
            state: PlaybackState::default(),
            pending: None,
            clock,
        }
    }

    /// Validate and load a waypoint sequence
    ///
    /// On failure the engine keeps whatever it was playing before.
    pub fn load(&mut self, waypoints: Vec<Waypoint>) -> Result<(), InvalidRouteError> {
        let route = Route::new(waypoints)?;
        self.load_route(route);
        Ok(())
    }

    /// Replace the current route and reset to the first waypoint, paused
    pub fn load_route(&mut self, route: Route) {
        self.pending = None;
        self.generation += 1;
        self.state = PlaybackState::default();
        info!(
            "Loaded route with {} waypoints spanning {}s",
            route.len(),
            route.elapsed_seconds(route.max_index())
        );
        self.route = Some(route);
    }

    /// Drop the route and go back to idle
    pub fn unload(&mut self) {
        self.pending = None;
        self.generation += 1;
        self.state = PlaybackState::default();
        self.route = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.route.is_some()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Start or resume auto-advance
    pub fn play(&mut self) {
        let Some(route) = &self.route else {
            return;
        };
        if self.state.current_index >= route.max_index() {
            // Nothing left to advance to
            self.state.is_playing = false;
            return;
        }

        debug!("Play from waypoint {}", self.state.current_index);
        self.state.is_playing = true;
        let now = self.clock.now();
        self.arm(now);
    }

    /// Stop auto-advance and cancel the pending advance
    pub fn pause(&mut self) {
        if self.state.is_playing {
            debug!("Pause at waypoint {}", self.state.current_index);
        }
        self.state.is_playing = false;
        self.pending = None;
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Back to the first waypoint, paused
    pub fn restart(&mut self) {
        if self.route.is_none() {
            return;
        }
        self.pending = None;
        self.state = PlaybackState::default();
    }

    /// Jump to a waypoint, clamping out-of-range targets
    ///
    /// Keeps the playing state, except that landing on the terminal waypoint
    /// pauses. While playing, the next advance is re-armed from the new
    /// position.
    pub fn seek(&mut self, target: i64) {
        let Some(route) = &self.route else {
            return;
        };
        let max_index = route.max_index();
        let index = target.clamp(0, max_index as i64) as usize;

        self.pending = None;
        self.state.current_index = index;
        debug!("Seek to waypoint {} (requested {})", index, target);

        if index == max_index {
            self.state.is_playing = false;
        } else if self.state.is_playing {
            let now = self.clock.now();
            self.arm(now);
        }
    }

    pub fn apply(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::TogglePlayPause => self.toggle_play_pause(),
            PlaybackCommand::Restart => self.restart(),
            PlaybackCommand::Seek(target) => self.seek(target),
            PlaybackCommand::Load(route) => self.load_route(route),
        }
    }

    /// Fire every pending advance whose deadline has passed
    ///
    /// Call this from the scheduling loop or once per frame. Each re-armed
    /// advance is measured from the previous deadline rather than from now,
    /// so a late poll catches up without drifting. Returns true if the index
    /// moved.
    pub fn update(&mut self) -> bool {
        let now = self.clock.now();
        let mut advanced = false;

        while let Some(pending) = self.pending {
            if pending.due > now {
                break;
            }
            self.pending = None;
            if !self.tick(pending) {
                break;
            }
            advanced = true;
        }

        advanced
    }

    /// When the pending advance is due, if there is one
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply one fired advance, re-checking the guard at fire time
    fn tick(&mut self, fired: PendingAdvance) -> bool {
        if !self.state.is_playing
            || fired.generation != self.generation
            || fired.from_index != self.state.current_index
        {
            debug!("Discarding stale advance from waypoint {}", fired.from_index);
            return false;
        }
        let Some(route) = &self.route else {
            return false;
        };
        let max_index = route.max_index();
        if self.state.current_index >= max_index {
            self.state.is_playing = false;
            return false;
        }

        self.state.current_index += 1;
        if self.state.current_index == max_index {
            debug!("Reached final waypoint {}", max_index);
            self.state.is_playing = false;
        } else {
            self.arm(fired.due);
        }
        true
    }

    /// Schedule the advance out of the current waypoint, measured from `from`
    fn arm(&mut self, from: Instant) {
        let Some(route) = &self.route else {
            return;
        };
        let index = self.state.current_index;
        let Some(gap) = route.segment_duration(index) else {
            return;
        };
        let delay = gap.to_std().unwrap_or(Duration::ZERO);

        self.pending = Some(PendingAdvance {
            due: from + delay,
            generation: self.generation,
            from_index: index,
        });
    }

    pub fn state(&self) -> Option<PlaybackState> {
        self.route.as_ref().map(|_| self.state)
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn current_index(&self) -> Option<usize> {
        self.route.as_ref().map(|_| self.state.current_index)
    }

    pub fn max_index(&self) -> Option<usize> {
        self.route.as_ref().map(Route::max_index)
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.route.as_ref()?.get(self.state.current_index)
    }

    pub fn elapsed_seconds(&self) -> Option<i64> {
        Some(self.route.as_ref()?.elapsed_seconds(self.state.current_index))
    }

    pub fn distance_covered_meters(&self) -> Option<f64> {
        Some(self.route.as_ref()?.distance_covered_m(self.state.current_index))
    }

    pub fn instantaneous_speed_mps(&self) -> Option<f64> {
        Some(self.route.as_ref()?.speed_mps(self.state.current_index))
    }

    pub fn bearing_degrees(&self) -> Option<f64> {
        Some(self.route.as_ref()?.bearing_deg(self.state.current_index))
    }

    /// Position between the current and next waypoint, by time until the pending advance
    ///
    /// Lets a marker glide along a segment instead of jumping. Equals the
    /// current waypoint whenever nothing is pending.
    pub fn interpolated_position(&self) -> Option<GeoPoint> {
        let route = self.route.as_ref()?;
        let index = self.state.current_index;
        let current = route.get(index)?.position();

        let (Some(pending), Some(next), Some(gap)) = (
            self.pending,
            route.get(index + 1),
            route.segment_duration(index),
        ) else {
            return Some(current);
        };

        let total = gap.to_std().unwrap_or(Duration::ZERO).as_secs_f64();
        if total <= 0.0 {
            return Some(current);
        }
        let remaining = pending.due.saturating_duration_since(self.clock.now()).as_secs_f64();
        Some(geo::interpolate(current, next.position(), 1.0 - remaining / total))
    }

    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let route = self.route.as_ref()?;
        Some(PlaybackSnapshot::new(route, self.state))
    }
}
