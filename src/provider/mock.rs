use async_trait::async_trait;
use crate::core::{GeoPoint, NamedRoute, Route};
use crate::error::{InvalidRouteError, RouteUnavailableError};
use crate::provider::RouteProvider;
use chrono::{Duration, Utc};

/// Route provider serving fixed routes from memory
///
/// Returns the same alternatives regardless of the requested endpoints, or a
/// fixed failure. Useful for tests and for playing back a route without
/// network access.
pub struct StaticRouteProvider {
    name: String,
    routes: Vec<Route>,
    failure: Option<String>,
}

impl StaticRouteProvider {
    /// Serve already built routes, best first
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            name: "static".to_string(),
            routes,
            failure: None,
        }
    }

    /// Serve coordinate lists, spacing timestamps one second apart from now
    pub fn with_positions(paths: Vec<Vec<GeoPoint>>) -> Result<Self, InvalidRouteError> {
        let anchor = Utc::now();
        let routes = paths
            .into_iter()
            .map(|path| Route::from_positions(path, anchor, Duration::seconds(1)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(routes))
    }

    /// Fail every request with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            name: "static".to_string(),
            routes: Vec::new(),
            failure: Some(message.to_string()),
        }
    }

    fn check(&self) -> Result<(), RouteUnavailableError> {
        match &self.failure {
            Some(message) => Err(RouteUnavailableError::Request(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RouteProvider for StaticRouteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_route(&self, _start: GeoPoint, _end: GeoPoint) -> Result<Route, RouteUnavailableError> {
        self.check()?;
        self.routes
            .first()
            .cloned()
            .ok_or_else(|| RouteUnavailableError::NoRoute("no static routes configured".to_string()))
    }

    async fn fetch_alternatives(
        &self,
        _start: GeoPoint,
        _end: GeoPoint,
    ) -> Result<Vec<NamedRoute>, RouteUnavailableError> {
        self.check()?;
        Ok(self
            .routes
            .iter()
            .enumerate()
            .map(|(i, route)| NamedRoute {
                name: format!("Route {}", i + 1),
                route: route.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_provider_has_no_route() {
        let provider = StaticRouteProvider::new(Vec::new());
        let result = provider.fetch_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)).await;
        assert!(matches!(result, Err(RouteUnavailableError::NoRoute(_))));
        let alternatives = provider
            .fetch_alternatives(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0))
            .await
            .unwrap();
        assert!(alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_positions_get_one_second_spacing() {
        let provider = StaticRouteProvider::with_positions(vec![vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.5),
            GeoPoint::new(0.0, 1.0),
        ]])
        .unwrap();
        let route = provider.fetch_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)).await.unwrap();
        assert_eq!(route.elapsed_seconds(2), 2);
    }

    #[test]
    fn test_invalid_positions_rejected() {
        let result = StaticRouteProvider::with_positions(vec![
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)],
            Vec::new(),
        ]);
        assert_eq!(result.err(), Some(InvalidRouteError::Empty));

        let result = StaticRouteProvider::with_positions(vec![vec![GeoPoint::new(f64::NAN, 0.0)]]);
        assert_eq!(result.err(), Some(InvalidRouteError::NonFiniteCoordinate { index: 0 }));
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = StaticRouteProvider::failing("offline");
        let err = provider
            .fetch_alternatives(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "routing request failed: offline");
    }
}
