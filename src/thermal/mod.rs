//! # CIGRE Steady-State Thermal Model
//!
//! Heat balance of an overhead conductor per CIGRE TB 601: Joule and solar
//! gains against convective and radiative cooling, solved for the steady
//! conductor temperature with a bracketed root finder, plus the inverse
//! ampacity computation.

pub mod model;
pub mod solar;
pub mod solver;

pub use model::{AmpacityEstimate, ThermalBalanceSolver};
pub use solar::{SolarGeometry, DEFAULT_SHAPE_FACTOR};
pub use solver::SolverFailure;
