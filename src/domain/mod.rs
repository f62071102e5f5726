//! # Core Data Model
//!
//! Immutable records shared by the whole pipeline: validated conductor
//! parameters, the line route and its discretized points, weather-station
//! observations, and the physical bounds that gate interpolation and
//! sampling results.

pub mod bounds;
pub mod conductor;
pub mod route;
pub mod weather;

pub use bounds::PhysicalBounds;
pub use conductor::{ConductorParameterError, ConductorParameters};
pub use route::{LinePoint, Route, RouteError, RouteVertex};
pub use weather::{EnvironmentalVariable, StationObservation};
