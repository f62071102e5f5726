use crate::domain::{EnvironmentalVariable, PhysicalBounds};
use rand::rngs::StdRng;
use rand_distr::{Distribution, LogNormal, Normal, Triangular};
use serde::Deserialize;

/// Sampling distribution family for the environmental draws.
///
/// Lognormal applies only to strictly-positive variables (radiation), with
/// moments matched to the kriged mean and standard deviation; everything
/// else stays normal. Triangular is a bounded alternative with half-width
/// sqrt(6) sigma so the first two moments match the normal case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SamplingDistribution {
    #[default]
    Normal,
    LogNormal,
    Triangular,
}

/// Kriged mean and standard deviation of one variable at one line point.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentalEstimate {
    pub mean: f64,
    pub std_dev: f64,
}

/// The four per-variable estimates feeding one (point, hour) simulation.
#[derive(Debug, Clone, Copy)]
pub struct CellInputs {
    pub air_temp: EnvironmentalEstimate,
    pub radiation: EnvironmentalEstimate,
    pub wind_u: EnvironmentalEstimate,
    pub wind_v: EnvironmentalEstimate,
}

impl CellInputs {
    pub fn estimate(&self, variable: EnvironmentalVariable) -> EnvironmentalEstimate {
        match variable {
            EnvironmentalVariable::AirTemperature => self.air_temp,
            EnvironmentalVariable::GlobalRadiation => self.radiation,
            EnvironmentalVariable::WindU => self.wind_u,
            EnvironmentalVariable::WindV => self.wind_v,
        }
    }

    /// Copy with one variable's mean scaled; used by the sensitivity
    /// analysis.
    pub fn with_mean_scaled(&self, variable: EnvironmentalVariable, factor: f64) -> Self {
        let mut scaled = *self;
        let estimate = match variable {
            EnvironmentalVariable::AirTemperature => &mut scaled.air_temp,
            EnvironmentalVariable::GlobalRadiation => &mut scaled.radiation,
            EnvironmentalVariable::WindU => &mut scaled.wind_u,
            EnvironmentalVariable::WindV => &mut scaled.wind_v,
        };
        estimate.mean *= factor;
        scaled
    }

    pub fn has_nan(&self) -> bool {
        EnvironmentalVariable::ALL
            .iter()
            .any(|v| self.estimate(*v).mean.is_nan())
    }
}

/// One Monte Carlo draw of the environment, with the wind reconstructed from
/// its sampled components. Ephemeral: created and consumed within one
/// iteration.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentalSample {
    pub air_temp_c: f64,
    pub solar_radiation_wm2: f64,
    pub wind_u_ms: f64,
    pub wind_v_ms: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub wind_attack_angle_deg: f64,
}

impl EnvironmentalSample {
    pub fn draw(
        inputs: &CellInputs,
        bounds: &PhysicalBounds,
        distribution: SamplingDistribution,
        line_azimuth_deg: f64,
        rng: &mut StdRng,
    ) -> Self {
        let mut sample_of = |variable: EnvironmentalVariable| -> f64 {
            let estimate = inputs.estimate(variable);
            let raw = sample_value(distribution, variable, estimate.mean, estimate.std_dev, rng);
            bounds.clamp(variable, raw)
        };

        let air_temp_c = sample_of(EnvironmentalVariable::AirTemperature);
        let solar_radiation_wm2 = sample_of(EnvironmentalVariable::GlobalRadiation);
        let wind_u_ms = sample_of(EnvironmentalVariable::WindU);
        let wind_v_ms = sample_of(EnvironmentalVariable::WindV);

        let wind_speed_ms =
            bounds.clamp_wind_speed((wind_u_ms * wind_u_ms + wind_v_ms * wind_v_ms).sqrt());
        let wind_direction_deg = (wind_v_ms.atan2(wind_u_ms).to_degrees() + 360.0) % 360.0;
        let wind_attack_angle_deg = fold_attack_angle(wind_direction_deg, line_azimuth_deg);

        Self {
            air_temp_c,
            solar_radiation_wm2,
            wind_u_ms,
            wind_v_ms,
            wind_speed_ms,
            wind_direction_deg,
            wind_attack_angle_deg,
        }
    }
}

/// Wind attack angle relative to the conductor, folded into [0, 90] degrees.
/// The thermal model is symmetric about perpendicular incidence.
pub fn fold_attack_angle(wind_direction_deg: f64, line_azimuth_deg: f64) -> f64 {
    let mut angle = (wind_direction_deg - line_azimuth_deg).abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    if angle > 90.0 {
        angle = 180.0 - angle;
    }
    angle
}

/// Draw one value. A non-positive or non-finite sigma degenerates to the
/// mean; a NaN mean stays NaN (no data is not sampled around).
fn sample_value(
    distribution: SamplingDistribution,
    variable: EnvironmentalVariable,
    mean: f64,
    std_dev: f64,
    rng: &mut StdRng,
) -> f64 {
    if !mean.is_finite() {
        return f64::NAN;
    }
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return mean;
    }

    match distribution {
        SamplingDistribution::Normal => sample_normal(mean, std_dev, rng),
        SamplingDistribution::LogNormal => {
            if variable.is_strictly_positive() && mean > 0.0 {
                // Match the first two moments of the target distribution.
                let sigma_sq = (1.0 + (std_dev * std_dev) / (mean * mean)).ln();
                let mu = mean.ln() - sigma_sq / 2.0;
                match LogNormal::new(mu, sigma_sq.sqrt()) {
                    Ok(dist) => dist.sample(rng),
                    Err(_) => mean,
                }
            } else {
                sample_normal(mean, std_dev, rng)
            }
        }
        SamplingDistribution::Triangular => {
            let half_width = 6.0_f64.sqrt() * std_dev;
            match Triangular::new(mean - half_width, mean + half_width, mean) {
                Ok(dist) => dist.sample(rng),
                Err(_) => mean,
            }
        }
    }
}

fn sample_normal(mean: f64, std_dev: f64, rng: &mut StdRng) -> f64 {
    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}
