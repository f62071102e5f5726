use super::record::{AnalysisRecord, RunSummary};
use crate::domain::{
    weather, EnvironmentalVariable, PhysicalBounds, Route, RouteError, StationObservation,
};
use crate::geo::{EquirectangularProjection, LineDiscretizer, Projector};
use crate::kriging::{KrigedSlice, KrigingConfig, KrigingEngine};
use crate::risk::RiskEvaluator;
use crate::simulation::{
    fold_attack_angle, CellInputs, EnvironmentalEstimate, MonteCarloConfig, MonteCarloSimulator,
};
use crate::thermal::{SolarGeometry, ThermalBalanceSolver};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Distance between discretized line points, meters
    pub spacing_m: f64,
    /// Operating current assumed for every cell, A
    pub operating_current_a: f64,
    /// Design temperature limit, C
    pub design_limit_c: f64,
    /// Percentile reported as the confidence temperature
    pub confidence_percentile: f64,
    /// Compute the solar shape factor geometrically from point latitude and
    /// timestamp; false falls back to the fixed average factor
    pub use_solar_geometry: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spacing_m: 1000.0,
            operating_current_a: 500.0,
            design_limit_c: 75.0,
            confidence_percentile: 90.0,
            use_solar_geometry: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("route is invalid: {0}")]
    Route(#[from] RouteError),

    #[error("no weather observations supplied")]
    NoObservations,

    #[error("route discretization produced no points")]
    NoLinePoints,
}

/// The kriged field of all four variables at one timestamp.
struct HourlyField {
    air_temp: KrigedSlice,
    radiation: KrigedSlice,
    wind_u: KrigedSlice,
    wind_v: KrigedSlice,
}

impl HourlyField {
    fn slice(&self, variable: EnvironmentalVariable) -> &KrigedSlice {
        match variable {
            EnvironmentalVariable::AirTemperature => &self.air_temp,
            EnvironmentalVariable::GlobalRadiation => &self.radiation,
            EnvironmentalVariable::WindU => &self.wind_u,
            EnvironmentalVariable::WindV => &self.wind_v,
        }
    }

    fn cell_inputs(&self, point_index: usize) -> CellInputs {
        let estimate = |variable: EnvironmentalVariable| {
            let slice = self.slice(variable);
            EnvironmentalEstimate {
                mean: slice.mean[point_index],
                std_dev: slice.std_dev(point_index),
            }
        };
        CellInputs {
            air_temp: estimate(EnvironmentalVariable::AirTemperature),
            radiation: estimate(EnvironmentalVariable::GlobalRadiation),
            wind_u: estimate(EnvironmentalVariable::WindU),
            wind_v: estimate(EnvironmentalVariable::WindV),
        }
    }
}

pub struct AnalysisOutput {
    pub records: Vec<AnalysisRecord>,
    pub summary: RunSummary,
}

/// Runs the full pipeline for one conductor and one route.
///
/// Kriging for a timestamp completes across all variables before any
/// simulation of that hour; the (point, hour) cells themselves are
/// independent and run in parallel, each with a seed derived from the point
/// id and timestamp so results do not depend on scheduling.
pub struct AnalysisRunner {
    solver: ThermalBalanceSolver,
    analysis: AnalysisConfig,
    kriging: KrigingConfig,
    monte_carlo: MonteCarloConfig,
    bounds: PhysicalBounds,
}

impl AnalysisRunner {
    pub fn new(
        solver: ThermalBalanceSolver,
        analysis: AnalysisConfig,
        kriging: KrigingConfig,
        monte_carlo: MonteCarloConfig,
        bounds: PhysicalBounds,
    ) -> Self {
        Self {
            solver,
            analysis,
            kriging,
            monte_carlo,
            bounds,
        }
    }

    pub fn run(
        &self,
        route: &Route,
        observations: &[StationObservation],
    ) -> Result<AnalysisOutput, AnalysisError> {
        if observations.is_empty() {
            return Err(AnalysisError::NoObservations);
        }

        let origin = route.vertices()[0];
        let projector = EquirectangularProjection::new(origin.latitude, origin.longitude);

        let points =
            LineDiscretizer::new(self.analysis.spacing_m).discretize(route, &projector);
        if points.is_empty() {
            return Err(AnalysisError::NoLinePoints);
        }
        let targets: Vec<(f64, f64)> = points.iter().map(|p| (p.x_m, p.y_m)).collect();
        info!(
            points = points.len(),
            spacing_m = self.analysis.spacing_m,
            "route discretized"
        );

        let mut engine = KrigingEngine::new(self.kriging.clone(), self.bounds);
        let grouped = weather::group_by_timestamp(observations);
        let mut fields: BTreeMap<NaiveDateTime, HourlyField> = BTreeMap::new();
        for (&timestamp, hour_observations) in &grouped {
            let field = self.krige_hour(&mut engine, timestamp, hour_observations, &projector, &targets);
            fields.insert(timestamp, field);
        }
        info!(
            timestamps = fields.len(),
            degraded = engine.degraded_slices(),
            quality = %engine.quality(),
            "kriging finished"
        );

        let simulator = MonteCarloSimulator::new(&self.solver, self.bounds, self.monte_carlo);
        let evaluator = RiskEvaluator::new(
            self.analysis.design_limit_c,
            self.analysis.confidence_percentile,
        );

        let cells: Vec<(usize, &NaiveDateTime, &HourlyField)> = points
            .iter()
            .map(|p| p.id)
            .flat_map(|point_id| fields.iter().map(move |(ts, field)| (point_id, ts, field)))
            .collect();

        let records: Vec<AnalysisRecord> = cells
            .par_iter()
            .map(|(point_id, timestamp, field)| {
                self.simulate_cell(&points[*point_id], timestamp, field, &simulator, &evaluator)
            })
            .collect();

        let simulated_cells = records.iter().filter(|r| r.valid_iterations > 0).count();
        let summary = RunSummary {
            line_points: points.len(),
            timestamps: fields.len(),
            total_cells: records.len(),
            simulated_cells,
            empty_cells: records.len() - simulated_cells,
            kriging_slices: engine.total_slices(),
            kriging_degraded_slices: engine.degraded_slices(),
            interpolation_quality: engine.quality(),
        };

        Ok(AnalysisOutput { records, summary })
    }

    fn krige_hour(
        &self,
        engine: &mut KrigingEngine,
        timestamp: NaiveDateTime,
        hour_observations: &[&StationObservation],
        projector: &dyn Projector,
        targets: &[(f64, f64)],
    ) -> HourlyField {
        let coords: Vec<(f64, f64)> = hour_observations
            .iter()
            .map(|o| projector.project(o.latitude, o.longitude))
            .collect();

        let mut interpolate = |variable: EnvironmentalVariable| {
            let values: Vec<f64> = hour_observations.iter().map(|o| o.value(variable)).collect();
            engine.interpolate(timestamp, variable, &coords, &values, targets)
        };

        HourlyField {
            air_temp: interpolate(EnvironmentalVariable::AirTemperature),
            radiation: interpolate(EnvironmentalVariable::GlobalRadiation),
            wind_u: interpolate(EnvironmentalVariable::WindU),
            wind_v: interpolate(EnvironmentalVariable::WindV),
        }
    }

    fn simulate_cell(
        &self,
        point: &crate::domain::LinePoint,
        timestamp: &NaiveDateTime,
        field: &HourlyField,
        simulator: &MonteCarloSimulator<'_>,
        evaluator: &RiskEvaluator,
    ) -> AnalysisRecord {
        let inputs = field.cell_inputs(point.id);
        let seed = derive_cell_seed(self.monte_carlo.base_seed, point.id, timestamp);

        let solar_geometry = if self.analysis.use_solar_geometry {
            Some(SolarGeometry {
                latitude_deg: point.latitude,
                day_of_year: timestamp.ordinal(),
                hour: timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0,
            })
        } else {
            None
        };

        let outcome = simulator.run(
            &inputs,
            point.azimuth_deg,
            self.analysis.operating_current_a,
            solar_geometry.as_ref(),
            seed,
        );
        let assessment = evaluator.assess(&outcome.temperatures);

        // Ampacity is a deterministic companion figure computed at the
        // kriged means.
        let (ampacity_a, cooling_deficit) = if inputs.has_nan() {
            (f64::NAN, false)
        } else {
            let wind_speed = self
                .bounds
                .clamp_wind_speed(inputs.wind_u.mean.hypot(inputs.wind_v.mean));
            let wind_direction =
                (inputs.wind_v.mean.atan2(inputs.wind_u.mean).to_degrees() + 360.0) % 360.0;
            let attack_angle = fold_attack_angle(wind_direction, point.azimuth_deg);
            let estimate = self.solver.ampacity(
                self.analysis.design_limit_c,
                inputs.radiation.mean,
                point.azimuth_deg,
                wind_speed,
                attack_angle,
                inputs.air_temp.mean,
                solar_geometry.as_ref(),
            );
            (estimate.current_a, estimate.cooling_deficit)
        };

        AnalysisRecord {
            point_id: point.id,
            timestamp: *timestamp,
            latitude: point.latitude,
            longitude: point.longitude,
            chainage_m: point.chainage_m,
            azimuth_deg: point.azimuth_deg,
            operating_current_a: self.analysis.operating_current_a,
            air_temp_mean_c: inputs.air_temp.mean,
            radiation_mean_wm2: inputs.radiation.mean,
            wind_u_mean_ms: inputs.wind_u.mean,
            wind_v_mean_ms: inputs.wind_v.mean,
            conductor_temp_mean_c: outcome.summary.mean,
            conductor_temp_p90_c: outcome.summary.p90,
            conductor_temp_p95_c: outcome.summary.p95,
            exceedance_probability: assessment.exceedance_probability,
            risk_category: assessment.category,
            ampacity_a,
            ampacity_cooling_deficit: cooling_deficit,
            valid_iterations: outcome.valid_iterations,
            failed_iterations: outcome.failed_iterations,
            success_rate: outcome.success_rate,
        }
    }
}

/// Deterministic per-cell seed from the base seed, point id and timestamp
/// (splitmix64 finalizer). Parallel execution stays reproducible because no
/// cell shares a random stream with another.
fn derive_cell_seed(base_seed: u64, point_id: usize, timestamp: &NaiveDateTime) -> u64 {
    let mut z = base_seed
        .wrapping_add((point_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(timestamp.and_utc().timestamp() as u64);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
