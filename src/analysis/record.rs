use crate::kriging::InterpolationQuality;
use crate::risk::RiskCategory;
use chrono::NaiveDateTime;
use serde::Serialize;

/// One row of the result table: everything the consumer needs about one
/// (point, hour) cell.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub point_id: usize,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub chainage_m: f64,
    pub azimuth_deg: f64,
    pub operating_current_a: f64,
    pub air_temp_mean_c: f64,
    pub radiation_mean_wm2: f64,
    pub wind_u_mean_ms: f64,
    pub wind_v_mean_ms: f64,
    pub conductor_temp_mean_c: f64,
    pub conductor_temp_p90_c: f64,
    pub conductor_temp_p95_c: f64,
    pub exceedance_probability: f64,
    pub risk_category: RiskCategory,
    pub ampacity_a: f64,
    pub ampacity_cooling_deficit: bool,
    pub valid_iterations: usize,
    pub failed_iterations: usize,
    pub success_rate: f64,
}

/// Aggregate health of a finished run. The run as a whole succeeds even with
/// partial interpolation or simulation failures; this summary is how a
/// consumer judges how much to trust the table.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub line_points: usize,
    pub timestamps: usize,
    pub total_cells: usize,
    /// Cells with at least one accepted Monte Carlo iteration
    pub simulated_cells: usize,
    /// Cells that produced an all-NaN result
    pub empty_cells: usize,
    pub kriging_slices: usize,
    pub kriging_degraded_slices: usize,
    pub interpolation_quality: InterpolationQuality,
}
