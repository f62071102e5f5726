//! # Risk Evaluation
//!
//! Reduces a Monte Carlo conductor-temperature distribution to actionable
//! metrics: percentiles, exceedance probability against the design limit, a
//! categorical classification with recommended actions, confidence
//! intervals, normality tests and an Arrhenius-based service-life estimate.

pub mod evaluator;
pub mod stats;

pub use evaluator::{
    classify, confidence_interval, confidence_temperature, exceedance_probability,
    life_reduction_factor, LifeEstimate, RiskAssessment, RiskCategory, RiskEvaluator,
};
pub use stats::{normality_test, percentile, DistributionSummary, NormalityMethod, NormalityTest};
