use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The environmental variables interpolated onto the line and sampled in the
/// Monte Carlo stage. Wind is carried as u/v components so that interpolation
/// stays linear; speed and direction are reconstructed after sampling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum EnvironmentalVariable {
    AirTemperature,
    GlobalRadiation,
    WindU,
    WindV,
}

impl EnvironmentalVariable {
    pub const ALL: [EnvironmentalVariable; 4] = [
        EnvironmentalVariable::AirTemperature,
        EnvironmentalVariable::GlobalRadiation,
        EnvironmentalVariable::WindU,
        EnvironmentalVariable::WindV,
    ];

    /// Whether the variable is physically non-negative (relevant for
    /// lognormal sampling).
    pub fn is_strictly_positive(&self) -> bool {
        matches!(self, EnvironmentalVariable::GlobalRadiation)
    }
}

/// One hourly record from one weather station, already screened by the
/// validation layer. NaN in any field means "no data", never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationObservation {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    /// Dry-bulb air temperature, C
    pub air_temp_c: f64,
    /// Global horizontal radiation, W/m2
    pub global_radiation_wm2: f64,
    /// Zonal wind component, m/s
    pub wind_u_ms: f64,
    /// Meridional wind component, m/s
    pub wind_v_ms: f64,
}

impl StationObservation {
    pub fn value(&self, variable: EnvironmentalVariable) -> f64 {
        match variable {
            EnvironmentalVariable::AirTemperature => self.air_temp_c,
            EnvironmentalVariable::GlobalRadiation => self.global_radiation_wm2,
            EnvironmentalVariable::WindU => self.wind_u_ms,
            EnvironmentalVariable::WindV => self.wind_v_ms,
        }
    }
}

/// Group observations by timestamp, ordered. Output ordering is explicit so
/// the result table never depends on input record order.
pub fn group_by_timestamp(
    observations: &[StationObservation],
) -> BTreeMap<NaiveDateTime, Vec<&StationObservation>> {
    let mut grouped: BTreeMap<NaiveDateTime, Vec<&StationObservation>> = BTreeMap::new();
    for obs in observations {
        grouped.entry(obs.timestamp).or_default().push(obs);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(station: &str, hour: u32) -> StationObservation {
        StationObservation {
            station_id: station.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            latitude: -15.5,
            longitude: -47.8,
            air_temp_c: 25.0,
            global_radiation_wm2: 800.0,
            wind_u_ms: 1.5,
            wind_v_ms: 1.0,
        }
    }

    #[test]
    fn test_group_by_timestamp_is_ordered() {
        let observations = vec![obs("B", 14), obs("A", 12), obs("B", 12), obs("A", 13)];
        let grouped = group_by_timestamp(&observations);

        let hours: Vec<u32> = grouped.keys().map(|t| chrono::Timelike::hour(t)).collect();
        assert_eq!(hours, vec![12, 13, 14]);
        assert_eq!(grouped.values().next().unwrap().len(), 2);
    }

    #[test]
    fn test_variable_accessor() {
        let o = obs("A", 12);
        assert_eq!(o.value(EnvironmentalVariable::AirTemperature), 25.0);
        assert_eq!(o.value(EnvironmentalVariable::WindV), 1.0);
    }
}
