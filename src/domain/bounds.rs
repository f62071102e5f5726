use super::weather::EnvironmentalVariable;
use serde::{Deserialize, Serialize};

/// Hard physical ranges for the environmental variables.
///
/// Shared by the kriging post-filter (values outside become NaN, never
/// clamped) and Monte Carlo sampling (samples are clamped so a large sigma
/// cannot escape the valid domain).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalBounds {
    /// Air temperature range, C
    pub air_temp_c: (f64, f64),
    /// Global radiation range, W/m2
    pub radiation_wm2: (f64, f64),
    /// Wind component (u or v) range, m/s
    pub wind_component_ms: (f64, f64),
    /// Wind speed range, m/s
    pub wind_speed_ms: (f64, f64),
}

impl Default for PhysicalBounds {
    fn default() -> Self {
        Self {
            air_temp_c: (-10.0, 55.0),
            radiation_wm2: (0.0, 1400.0),
            wind_component_ms: (-50.0, 50.0),
            wind_speed_ms: (0.0, 50.0),
        }
    }
}

impl PhysicalBounds {
    pub fn range_for(&self, variable: EnvironmentalVariable) -> (f64, f64) {
        match variable {
            EnvironmentalVariable::AirTemperature => self.air_temp_c,
            EnvironmentalVariable::GlobalRadiation => self.radiation_wm2,
            EnvironmentalVariable::WindU | EnvironmentalVariable::WindV => self.wind_component_ms,
        }
    }

    /// Clamp a sampled value into the variable's physical range. NaN passes
    /// through unchanged (no data stays no data).
    pub fn clamp(&self, variable: EnvironmentalVariable, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        let (lo, hi) = self.range_for(variable);
        value.clamp(lo, hi)
    }

    /// Replace an interpolated value outside the variable's physical range
    /// with NaN. Clamping here would fabricate a plausible-looking but wrong
    /// value; NaN marks the estimate as unusable.
    pub fn filter(&self, variable: EnvironmentalVariable, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        let (lo, hi) = self.range_for(variable);
        if value < lo || value > hi {
            f64::NAN
        } else {
            value
        }
    }

    pub fn clamp_wind_speed(&self, speed: f64) -> f64 {
        if speed.is_nan() {
            return speed;
        }
        speed.clamp(self.wind_speed_ms.0, self.wind_speed_ms.1)
    }
}
