//! # Geoprocessing
//!
//! Coordinate projection and line-route discretization. The projection is a
//! pluggable trait so a proper CRS transform can be substituted; the default
//! equirectangular projection is adequate for distances up to the full line
//! length.

pub mod discretizer;
pub mod projection;

pub use discretizer::LineDiscretizer;
pub use projection::{EquirectangularProjection, Projector};
