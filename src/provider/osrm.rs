use async_trait::async_trait;
use crate::core::{GeoPoint, NamedRoute, Route};
use crate::error::RouteUnavailableError;
use crate::provider::RouteProvider;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// Public OSRM instance for car routing
pub const DEFAULT_BASE_URL: &str = "https://routing.openstreetmap.de/routed-car";

/// Route provider backed by an OSRM `route` service
///
/// OSRM only returns geometry, so every coordinate of the polyline becomes a
/// waypoint and timestamps are synthesized at a fixed spacing starting from
/// the moment the response arrives.
pub struct OsrmProvider {
    client: reqwest::Client,
    base_url: String,
    spacing: Duration,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

impl OsrmProvider {
    pub fn new(base_url: &str, spacing: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            spacing,
        }
    }

    /// Build the driving route URL for a start/end pair
    pub fn route_url(&self, start: GeoPoint, end: GeoPoint, alternatives: bool) -> String {
        let mut url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, start.lon, start.lat, end.lon, end.lat
        );
        if alternatives {
            url.push_str("&alternatives=true");
        }
        url
    }

    async fn request(&self, url: &str) -> Result<String, RouteUnavailableError> {
        debug!("Requesting {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // OSRM reports "NoRoute" and friends with a 400 and a JSON body
        if !status.is_success() && status.as_u16() != 400 {
            return Err(RouteUnavailableError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn fetch(&self, start: GeoPoint, end: GeoPoint, alternatives: bool) -> Result<Vec<NamedRoute>, RouteUnavailableError> {
        let body = self.request(&self.route_url(start, end, alternatives)).await?;
        parse_routes(&body, Utc::now(), self.spacing)
    }
}

/// Decode an OSRM response body into named routes
///
/// Timestamps start at `anchor` and step by `spacing` per coordinate.
pub fn parse_routes(
    body: &str,
    anchor: DateTime<Utc>,
    spacing: Duration,
) -> Result<Vec<NamedRoute>, RouteUnavailableError> {
    let response: OsrmResponse =
        serde_json::from_str(body).map_err(|e| RouteUnavailableError::Decode(e.to_string()))?;

    if response.code != "Ok" {
        let message = response.message.unwrap_or_default();
        return Err(RouteUnavailableError::NoRoute(format!("{}: {}", response.code, message)));
    }
    if response.routes.is_empty() {
        return Err(RouteUnavailableError::NoRoute("response contained no routes".to_string()));
    }

    response
        .routes
        .into_iter()
        .enumerate()
        .map(|(i, osrm)| -> Result<NamedRoute, RouteUnavailableError> {
            debug!(
                "Route {}: {} points, {:.0} m, {:.0} s",
                i + 1,
                osrm.geometry.coordinates.len(),
                osrm.distance,
                osrm.duration
            );
            let positions = osrm
                .geometry
                .coordinates
                .iter()
                .map(|[lon, lat]| GeoPoint::new(*lat, *lon));
            Ok(NamedRoute {
                name: format!("Route {}", i + 1),
                route: Route::from_positions(positions, anchor, spacing)?,
            })
        })
        .collect()
}

#[async_trait]
impl RouteProvider for OsrmProvider {
    fn name(&self) -> &str {
        "osrm"
    }

    async fn fetch_route(&self, start: GeoPoint, end: GeoPoint) -> Result<Route, RouteUnavailableError> {
        let mut routes = self.fetch(start, end, false).await?;
        Ok(routes.swap_remove(0).route)
    }

    async fn fetch_alternatives(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Vec<NamedRoute>, RouteUnavailableError> {
        self.fetch(start, end, true).await
    }
}
