use crate::domain::{ConductorParameters, Route, RouteVertex, StationObservation};
use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ConductorFile {
    diameter_m: f64,
    resistance_ac_25: f64,
    resistance_ac_75: f64,
    emissivity: f64,
    absorptivity: f64,
}

/// Load and validate conductor parameters from a JSON file.
pub fn load_conductor_parameters(path: &Path) -> Result<ConductorParameters> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading conductor parameters from {}", path.display()))?;
    let file: ConductorFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing conductor parameters in {}", path.display()))?;
    Ok(ConductorParameters::new(
        file.diameter_m,
        file.resistance_ac_25,
        file.resistance_ac_75,
        file.emissivity,
        file.absorptivity,
    )?)
}

/// Load and validate the route polyline from a CSV file with columns
/// `chainage_m, azimuth_deg, latitude, longitude`.
pub fn load_route(path: &Path) -> Result<Route> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading route from {}", path.display()))?;
    let mut vertices: Vec<RouteVertex> = Vec::new();
    for record in reader.deserialize() {
        vertices.push(record.with_context(|| format!("parsing route row in {}", path.display()))?);
    }
    Ok(Route::new(vertices)?)
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    station_id: String,
    timestamp: String,
    latitude: f64,
    longitude: f64,
    air_temp_c: Option<f64>,
    global_radiation_wm2: Option<f64>,
    wind_speed_ms: Option<f64>,
    wind_direction_deg: Option<f64>,
}

/// Load hourly station observations from a CSV file.
///
/// Wind arrives as speed and direction and is decomposed into u/v
/// components (mathematical convention, so `atan2(v, u)` recovers the
/// direction). Empty fields become NaN, meaning "no data".
pub fn load_observations(path: &Path) -> Result<Vec<StationObservation>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading station observations from {}", path.display()))?;

    let mut observations = Vec::new();
    for record in reader.deserialize() {
        let record: StationRecord =
            record.with_context(|| format!("parsing station row in {}", path.display()))?;
        let timestamp = parse_timestamp(&record.timestamp)?;

        let (wind_u_ms, wind_v_ms) = match (record.wind_speed_ms, record.wind_direction_deg) {
            (Some(speed), Some(direction)) if speed.is_finite() && direction.is_finite() => {
                let direction_rad = direction.to_radians();
                (speed * direction_rad.cos(), speed * direction_rad.sin())
            }
            _ => (f64::NAN, f64::NAN),
        };

        observations.push(StationObservation {
            station_id: record.station_id,
            timestamp,
            latitude: record.latitude,
            longitude: record.longitude,
            air_temp_c: record.air_temp_c.unwrap_or(f64::NAN),
            global_radiation_wm2: record.global_radiation_wm2.unwrap_or(f64::NAN),
            wind_u_ms,
            wind_v_ms,
        });
    }

    Ok(observations)
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    bail!("unrecognized timestamp format: {raw}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("line-thermal-risk-{name}"));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_conductor_parameters() {
        let path = temp_file(
            "conductor.json",
            r#"{
                "diameter_m": 0.02814,
                "resistance_ac_25": 7.28e-5,
                "resistance_ac_75": 9.09e-5,
                "emissivity": 0.8,
                "absorptivity": 0.8
            }"#,
        );
        let params = load_conductor_parameters(&path).unwrap();
        assert_eq!(params.diameter_m, 0.02814);
    }

    #[test]
    fn test_invalid_conductor_is_rejected() {
        let path = temp_file(
            "bad-conductor.json",
            r#"{
                "diameter_m": 0.02814,
                "resistance_ac_25": 9.09e-5,
                "resistance_ac_75": 7.28e-5,
                "emissivity": 0.8,
                "absorptivity": 0.8
            }"#,
        );
        assert!(load_conductor_parameters(&path).is_err());
    }

    #[test]
    fn test_load_route_csv() {
        let path = temp_file(
            "route.csv",
            "chainage_m,azimuth_deg,latitude,longitude\n\
             0.0,10.0,-15.60,-47.80\n\
             2000.0,12.0,-15.58,-47.80\n",
        );
        let route = load_route(&path).unwrap();
        assert_eq!(route.vertices().len(), 2);
        assert_eq!(route.vertices()[1].azimuth_deg, 12.0);
    }

    #[test]
    fn test_load_observations_decomposes_wind() {
        let path = temp_file(
            "stations.csv",
            "station_id,timestamp,latitude,longitude,air_temp_c,global_radiation_wm2,wind_speed_ms,wind_direction_deg\n\
             A,2024-01-15 12:00:00,-15.5,-47.8,25.0,800.0,2.0,90.0\n\
             B,2024-01-15 12:00:00,-15.6,-47.9,26.0,,,\n",
        );
        let observations = load_observations(&path).unwrap();
        assert_eq!(observations.len(), 2);

        // 2 m/s at 90 degrees: u = 0, v = 2 in the mathematical convention.
        assert!(observations[0].wind_u_ms.abs() < 1e-12);
        assert!((observations[0].wind_v_ms - 2.0).abs() < 1e-12);

        assert!(observations[1].global_radiation_wm2.is_nan());
        assert!(observations[1].wind_u_ms.is_nan());
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let path = temp_file(
            "bad-ts.csv",
            "station_id,timestamp,latitude,longitude,air_temp_c,global_radiation_wm2,wind_speed_ms,wind_direction_deg\n\
             A,15/01/2024 12h,-15.5,-47.8,25.0,800.0,2.0,90.0\n",
        );
        assert!(load_observations(&path).is_err());
    }
}
