//! # Monte Carlo Uncertainty Propagation
//!
//! Samples environmental realizations from the kriged mean/variance fields,
//! feeds them through the nonlinear thermal solver and accumulates the
//! empirical conductor-temperature distribution per (point, hour), plus a
//! perturbation-based sensitivity analysis.

pub mod monte_carlo;
pub mod sampling;
pub mod sensitivity;

pub use monte_carlo::{MonteCarloConfig, MonteCarloSimulator, SimulationOutcome};
pub use sampling::{
    fold_attack_angle, CellInputs, EnvironmentalEstimate, EnvironmentalSample,
    SamplingDistribution,
};
pub use sensitivity::{analyze_sensitivity, SensitivityReport};
