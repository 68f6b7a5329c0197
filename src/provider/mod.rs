pub mod osrm;
pub mod mock;

pub use osrm::OsrmProvider;
pub use mock::StaticRouteProvider;

use async_trait::async_trait;
use crate::core::{GeoPoint, NamedRoute, Route};
use crate::error::RouteUnavailableError;
use crate::playback::{Clock, PlaybackEngine};
use tracing::{info, warn};

/// Source of routes between two coordinates
///
/// Implementations:
/// - OSRM HTTP routing service
/// - Static in-memory routes for tests and offline use
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Get the name/identifier of this provider
    fn name(&self) -> &str;

    /// Best route from `start` to `end`
    async fn fetch_route(&self, start: GeoPoint, end: GeoPoint) -> Result<Route, RouteUnavailableError>;

    /// All alternatives the provider offers, best first
    async fn fetch_alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<NamedRoute>, RouteUnavailableError>;
}

/// Fetch a route and load it into `engine`
///
/// If the provider fails the engine is left untouched, so an engine that had
/// nothing loaded stays idle.
pub async fn fetch_and_load<C: Clock>(
    provider: &dyn RouteProvider,
    engine: &mut PlaybackEngine<C>,
    start: GeoPoint,
    end: GeoPoint,
) -> Result<(), RouteUnavailableError> {
    match provider.fetch_route(start, end).await {
        Ok(route) => {
            info!("{} returned a route of {} waypoints", provider.name(), route.len());
            engine.load_route(route);
            Ok(())
        }
        Err(e) => {
            warn!("{} could not provide a route from {} to {}: {}", provider.name(), start, end, e);
            Err(e)
        }
    }
}

/// Alternative routes with one of them chosen for playback
#[derive(Debug, Clone)]
pub struct RouteSelection {
    routes: Vec<NamedRoute>,
    selected: usize,
}

impl RouteSelection {
    /// `None` if there are no alternatives to choose from
    pub fn new(routes: Vec<NamedRoute>) -> Option<Self> {
        if routes.is_empty() {
            return None;
        }
        Some(Self { routes, selected: 0 })
    }

    pub async fn fetch(
        provider: &dyn RouteProvider,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Self, RouteUnavailableError> {
        let routes = provider.fetch_alternatives(start, end).await?;
        Self::new(routes).ok_or_else(|| RouteUnavailableError::NoRoute("provider returned no alternatives".to_string()))
    }

    pub fn routes(&self) -> &[NamedRoute] {
        &self.routes
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &NamedRoute {
        &self.routes[self.selected]
    }

    /// Choose an alternative and load it, resetting playback
    ///
    /// Out-of-range choices are clamped to the last alternative.
    pub fn select<C: Clock>(&mut self, index: usize, engine: &mut PlaybackEngine<C>) -> &NamedRoute {
        self.selected = index.min(self.routes.len() - 1);
        let chosen = &self.routes[self.selected];
        info!("Selected {}", chosen.name);
        engine.load_route(chosen.route.clone());
        chosen
    }
}
