//! # Ordinary Kriging Engine
//!
//! Per-timestamp, per-variable geostatistical interpolation from scattered
//! station observations onto the line points: empirical semivariogram,
//! parametric variogram fitting, holdout cross-validation model selection,
//! the ordinary-kriging solve itself, and physically-grounded post-filtering
//! of the results.

pub mod engine;
pub mod selector;
pub mod variogram;

pub use engine::{InterpolationQuality, KrigedSlice, KrigingConfig, KrigingEngine, KrigingError};
pub use selector::VariogramSelector;
pub use variogram::{EmpiricalVariogram, FittedVariogram, VariogramKind};
