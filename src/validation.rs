//! # Weather-Record Screening
//!
//! Ingest-time validation of station observations: records outside the
//! instrument-plausible ranges are dropped before they reach interpolation,
//! and a per-station usability report with an aggregate quality verdict is
//! produced so the operator can judge how much data survived.

use crate::domain::StationObservation;
use serde::Serialize;
use tracing::{info, warn};

/// Plausible instrument ranges for raw records. Wider than the physical
/// bounds used downstream: screening rejects impossible readings, the
/// post-filter rejects implausible interpolations.
const AIR_TEMP_RANGE_C: (f64, f64) = (-50.0, 60.0);
const RADIATION_RANGE_WM2: (f64, f64) = (0.0, 1400.0);
const WIND_COMPONENT_RANGE_MS: (f64, f64) = (-50.0, 50.0);

/// Aggregate data-quality verdict over all stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DataQuality {
    Excellent,
    Good,
    Regular,
    Poor,
}

impl DataQuality {
    pub fn from_usability(usability: f64) -> Self {
        if usability >= 0.9 {
            DataQuality::Excellent
        } else if usability >= 0.8 {
            DataQuality::Good
        } else if usability >= 0.7 {
            DataQuality::Regular
        } else {
            DataQuality::Poor
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StationQuality {
    pub station_id: String,
    pub original_records: usize,
    pub valid_records: usize,
    pub usability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub stations: Vec<StationQuality>,
    pub total_original: usize,
    pub total_valid: usize,
    pub usability: f64,
    pub quality: DataQuality,
    pub recommendations: Vec<String>,
}

/// Drop records with any reading outside the plausible instrument ranges.
///
/// A NaN reading is kept: it marks "no data" for one variable and the
/// kriging stage handles it per variable, whereas an out-of-range reading
/// marks a broken record.
pub fn screen_observations(
    observations: Vec<StationObservation>,
) -> (Vec<StationObservation>, ValidationReport) {
    let mut counts: std::collections::BTreeMap<String, (usize, usize)> =
        std::collections::BTreeMap::new();
    let mut kept = Vec::with_capacity(observations.len());
    let total_original = observations.len();

    for observation in observations {
        let (original, valid) = counts.entry(observation.station_id.clone()).or_default();
        *original += 1;

        if record_is_plausible(&observation) {
            *valid += 1;
            kept.push(observation);
        } else {
            warn!(
                station = %observation.station_id,
                timestamp = %observation.timestamp,
                "observation outside plausible ranges, dropped"
            );
        }
    }

    let per_station: Vec<StationQuality> = counts
        .into_iter()
        .map(|(station_id, (original, valid))| StationQuality {
            station_id,
            original_records: original,
            valid_records: valid,
            usability: if original > 0 {
                valid as f64 / original as f64
            } else {
                0.0
            },
        })
        .collect();

    let total_valid = kept.len();
    let usability = if total_original > 0 {
        total_valid as f64 / total_original as f64
    } else {
        0.0
    };
    let quality = DataQuality::from_usability(usability);

    let mut recommendations = Vec::new();
    if usability < 0.7 {
        recommendations
            .push("Overall usability is low - review station data collection".to_string());
    }
    for station in &per_station {
        if station.usability < 0.5 {
            recommendations.push(format!(
                "Station {} lost more than half of its records - inspect the sensor",
                station.station_id
            ));
        }
    }

    info!(
        total_original,
        total_valid,
        usability = format!("{:.1}%", usability * 100.0),
        %quality,
        "weather records screened"
    );

    let report = ValidationReport {
        stations: per_station,
        total_original,
        total_valid,
        usability,
        quality,
        recommendations,
    };
    (kept, report)
}

fn record_is_plausible(observation: &StationObservation) -> bool {
    in_range_or_nan(observation.air_temp_c, AIR_TEMP_RANGE_C)
        && in_range_or_nan(observation.global_radiation_wm2, RADIATION_RANGE_WM2)
        && in_range_or_nan(observation.wind_u_ms, WIND_COMPONENT_RANGE_MS)
        && in_range_or_nan(observation.wind_v_ms, WIND_COMPONENT_RANGE_MS)
}

fn in_range_or_nan(value: f64, (lo, hi): (f64, f64)) -> bool {
    value.is_nan() || (lo..=hi).contains(&value)
}
