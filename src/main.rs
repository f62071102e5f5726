use anyhow::Result;
use line_thermal_risk::analysis::{AnalysisRunner, HourlyTrends};
use line_thermal_risk::config::Config;
use line_thermal_risk::thermal::ThermalBalanceSolver;
use line_thermal_risk::validation::{self, DataQuality};
use line_thermal_risk::{io, telemetry};
use tracing::{info, warn};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::load()?;

    let conductor = io::load_conductor_parameters(&cfg.io.conductor_path)?;
    let route = io::load_route(&cfg.io.route_path)?;
    let observations = io::load_observations(&cfg.io.stations_path)?;
    info!(
        stations_rows = observations.len(),
        vertices = route.vertices().len(),
        "inputs loaded"
    );

    let (observations, data_report) = validation::screen_observations(observations);
    if data_report.quality == DataQuality::Poor {
        warn!(
            usability = format!("{:.1}%", data_report.usability * 100.0),
            "weather data quality is poor; results will be mostly empty"
        );
    }
    for recommendation in &data_report.recommendations {
        warn!("{recommendation}");
    }

    let runner = AnalysisRunner::new(
        ThermalBalanceSolver::new(conductor),
        cfg.analysis,
        cfg.kriging.clone(),
        cfg.monte_carlo,
        cfg.bounds,
    );
    let output = runner.run(&route, &observations)?;

    io::write_records(&cfg.io.output_path, &output.records)?;

    let trends = HourlyTrends::from_records(&output.records);
    if let (Some(temp_hour), Some(risk_hour)) =
        (trends.peak_temperature_hour, trends.peak_risk_hour)
    {
        info!(
            peak_temperature_hour = temp_hour,
            peak_risk_hour = risk_hour,
            "critical hours identified"
        );
    }

    if let Some(worst) = output
        .records
        .iter()
        .filter(|r| r.exceedance_probability.is_finite())
        .max_by(|a, b| a.exceedance_probability.total_cmp(&b.exceedance_probability))
    {
        info!(
            point_id = worst.point_id,
            timestamp = %worst.timestamp,
            exceedance = worst.exceedance_probability,
            p90_c = worst.conductor_temp_p90_c,
            category = %worst.risk_category,
            action = worst.risk_category.recommended_action(),
            "worst cell"
        );
    }

    let summary = &output.summary;
    info!(
        line_points = summary.line_points,
        timestamps = summary.timestamps,
        simulated_cells = summary.simulated_cells,
        empty_cells = summary.empty_cells,
        kriging_degraded = summary.kriging_degraded_slices,
        interpolation_quality = %summary.interpolation_quality,
        data_quality = %data_report.quality,
        "analysis finished"
    );

    Ok(())
}
