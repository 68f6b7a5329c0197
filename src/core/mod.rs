pub mod waypoint;
pub mod geo;
pub mod route;

pub use waypoint::{GeoPoint, Waypoint};
pub use route::{NamedRoute, Route};
