//! # Line Thermal Risk
//!
//! Probabilistic thermal risk and ampacity analysis for overhead transmission
//! lines. Weather-station observations are interpolated onto the discretized
//! line route with ordinary kriging, propagated through the CIGRE steady-state
//! heat balance with Monte Carlo sampling, and reduced to exceedance
//! probabilities and risk categories per line point and hour.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod geo;
pub mod io;
pub mod kriging;
pub mod risk;
pub mod simulation;
pub mod telemetry;
pub mod thermal;
pub mod validation;
