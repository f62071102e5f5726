//! # Analysis Orchestration
//!
//! Sequences the pipeline: route discretization, per-timestamp kriging of
//! every environmental variable, the parallel (point x hour) Monte Carlo
//! loop, risk evaluation and the final result records, reports and
//! hour-of-day trends.

pub mod record;
pub mod report;
pub mod runner;

pub use record::{AnalysisRecord, RunSummary};
pub use report::{build_risk_report, HourlyTrends, RiskReport};
pub use runner::{AnalysisConfig, AnalysisError, AnalysisOutput, AnalysisRunner};
