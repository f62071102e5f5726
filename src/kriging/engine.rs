use super::selector::VariogramSelector;
use super::variogram::{self, EmpiricalVariogram, FittedVariogram, VariogramKind};
use crate::domain::{EnvironmentalVariable, PhysicalBounds};
use chrono::NaiveDateTime;
use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Kriging and model-selection settings. The candidate lists and the
/// radiation penalty constants are empirically chosen defaults, kept
/// configurable rather than hard-coded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KrigingConfig {
    /// Uniform lag bins for the empirical semivariogram
    pub lag_bins: usize,
    /// Minimum stations with data for interpolation to be attempted
    pub min_stations: usize,
    /// Minimum stations for cross-validation model selection
    pub cv_min_stations: usize,
    /// Train share of the holdout split
    pub cv_train_fraction: f64,
    /// Weight of the kriging-variance penalty applied to radiation scores
    pub radiation_penalty_weight: f64,
    /// Cap on the variance ratio inside the radiation penalty
    pub radiation_penalty_cap: f64,
    /// Candidate models for radiation (smoother families first)
    pub candidates_radiation: Vec<VariogramKind>,
    /// Candidate models for every other variable
    pub candidates_default: Vec<VariogramKind>,
    /// Seed for the deterministic holdout split
    pub selection_seed: u64,
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            lag_bins: variogram::DEFAULT_LAG_BINS,
            min_stations: 2,
            cv_min_stations: 4,
            cv_train_fraction: 0.8,
            radiation_penalty_weight: 0.1,
            radiation_penalty_cap: 10.0,
            candidates_radiation: vec![
                VariogramKind::Gaussian,
                VariogramKind::Spherical,
                VariogramKind::Exponential,
                VariogramKind::Linear,
            ],
            candidates_default: vec![
                VariogramKind::Linear,
                VariogramKind::Power,
                VariogramKind::Gaussian,
                VariogramKind::Spherical,
                VariogramKind::Exponential,
            ],
            selection_seed: 7,
        }
    }
}

#[derive(Debug, Error)]
pub enum KrigingError {
    #[error("{available} station(s) with data, {required} required")]
    InsufficientStations { available: usize, required: usize },

    #[error("station geometry is degenerate (coincident points)")]
    DegenerateGeometry,

    #[error("kriging system is singular")]
    SingularSystem,
}

/// Interpolation result for one (timestamp, variable): mean and kriging
/// variance aligned to the line-point order. NaN entries mean "no usable
/// estimate here", never zero.
#[derive(Debug, Clone)]
pub struct KrigedSlice {
    pub timestamp: NaiveDateTime,
    pub variable: EnvironmentalVariable,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
}

impl KrigedSlice {
    pub fn all_nan(timestamp: NaiveDateTime, variable: EnvironmentalVariable, len: usize) -> Self {
        Self {
            timestamp,
            variable,
            mean: vec![f64::NAN; len],
            variance: vec![f64::NAN; len],
        }
    }

    pub fn std_dev(&self, index: usize) -> f64 {
        self.variance[index].max(0.0).sqrt()
    }

    pub fn has_nan(&self) -> bool {
        self.mean.iter().any(|v| v.is_nan())
    }
}

/// Aggregate verdict on the interpolation stage, derived from the fraction
/// of slices that degraded to NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum InterpolationQuality {
    Good,
    Regular,
    Bad,
}

impl InterpolationQuality {
    pub fn from_failure_fraction(fraction: f64) -> Self {
        if fraction <= 0.1 {
            InterpolationQuality::Good
        } else if fraction <= 0.3 {
            InterpolationQuality::Regular
        } else {
            InterpolationQuality::Bad
        }
    }
}

/// Ordinary kriging engine with per-variable variogram-model caching.
///
/// Failures degrade to all-NaN slices and are counted toward the final
/// quality verdict; they never abort the run.
pub struct KrigingEngine {
    config: KrigingConfig,
    bounds: PhysicalBounds,
    selector: VariogramSelector,
    total_slices: usize,
    degraded_slices: usize,
}

impl KrigingEngine {
    pub fn new(config: KrigingConfig, bounds: PhysicalBounds) -> Self {
        let selector = VariogramSelector::from_config(&config);
        Self {
            config,
            bounds,
            selector,
            total_slices: 0,
            degraded_slices: 0,
        }
    }

    /// Interpolate one variable at one timestamp onto the target points.
    ///
    /// Observations with non-finite values are dropped first; fewer than
    /// `min_stations` remaining, or any numerical failure, degrades to an
    /// all-NaN slice.
    pub fn interpolate(
        &mut self,
        timestamp: NaiveDateTime,
        variable: EnvironmentalVariable,
        station_coords: &[(f64, f64)],
        station_values: &[f64],
        targets: &[(f64, f64)],
    ) -> KrigedSlice {
        self.total_slices += 1;
        match self.try_interpolate(timestamp, variable, station_coords, station_values, targets) {
            Ok(slice) => {
                if slice.has_nan() {
                    self.degraded_slices += 1;
                }
                slice
            }
            Err(error) => {
                warn!(%timestamp, %variable, %error, "kriging degraded to NaN slice");
                self.degraded_slices += 1;
                KrigedSlice::all_nan(timestamp, variable, targets.len())
            }
        }
    }

    fn try_interpolate(
        &mut self,
        timestamp: NaiveDateTime,
        variable: EnvironmentalVariable,
        station_coords: &[(f64, f64)],
        station_values: &[f64],
        targets: &[(f64, f64)],
    ) -> Result<KrigedSlice, KrigingError> {
        let mut coords = Vec::with_capacity(station_coords.len());
        let mut values = Vec::with_capacity(station_values.len());
        for (coord, value) in station_coords.iter().zip(station_values) {
            if value.is_finite() {
                coords.push(*coord);
                values.push(*value);
            }
        }

        if coords.len() < self.config.min_stations {
            return Err(KrigingError::InsufficientStations {
                available: coords.len(),
                required: self.config.min_stations,
            });
        }

        let kind = self.selector.select(variable, &coords, &values);
        let empirical =
            EmpiricalVariogram::from_observations(&coords, &values, self.config.lag_bins)
                .ok_or(KrigingError::DegenerateGeometry)?;
        let model = variogram::fit(kind, &empirical);
        debug!(%timestamp, %variable, model = %model.kind(), "kriging slice");

        let (mut mean, variance) = ordinary_kriging(&model, &coords, &values, targets)?;

        for value in mean.iter_mut() {
            *value = self.bounds.filter(variable, *value);
        }

        Ok(KrigedSlice {
            timestamp,
            variable,
            mean,
            variance,
        })
    }

    pub fn total_slices(&self) -> usize {
        self.total_slices
    }

    pub fn degraded_slices(&self) -> usize {
        self.degraded_slices
    }

    /// Quality verdict over everything interpolated so far.
    pub fn quality(&self) -> InterpolationQuality {
        if self.total_slices == 0 {
            return InterpolationQuality::Bad;
        }
        InterpolationQuality::from_failure_fraction(
            self.degraded_slices as f64 / self.total_slices as f64,
        )
    }
}

/// Solve the ordinary-kriging system for every target point.
///
/// Returns the estimate and the kriging variance (floored at zero: small
/// negative variances are numerical artifacts, not physics) per target.
pub fn ordinary_kriging(
    model: &FittedVariogram,
    station_coords: &[(f64, f64)],
    station_values: &[f64],
    targets: &[(f64, f64)],
) -> Result<(Vec<f64>, Vec<f64>), KrigingError> {
    let n = station_coords.len();
    if n < 2 {
        return Err(KrigingError::InsufficientStations {
            available: n,
            required: 2,
        });
    }

    // No spatial structure at all (e.g. a constant field): every weighting is
    // equivalent, the sample mean is the estimate and carries no kriging
    // variance.
    let max_pair_distance = max_pair_distance(station_coords);
    if max_pair_distance <= 0.0 {
        return Err(KrigingError::DegenerateGeometry);
    }
    if model.semivariance(max_pair_distance).abs() < 1e-12 {
        let mean = station_values.iter().sum::<f64>() / n as f64;
        return Ok((vec![mean; targets.len()], vec![0.0; targets.len()]));
    }

    let distance = |a: (f64, f64), b: (f64, f64)| -> f64 {
        let dx = a.0 - b.0;
        let dy = a.1 - b.1;
        (dx * dx + dy * dy).sqrt()
    };

    // (n+1) x (n+1) system with the unbiasedness constraint in the last
    // row/column; the diagonal is zero by definition of the semivariance.
    let matrix = DMatrix::<f64>::from_fn(n + 1, n + 1, |i, j| {
        if i == n && j == n {
            0.0
        } else if i == n || j == n {
            1.0
        } else if i == j {
            0.0
        } else {
            model.semivariance(distance(station_coords[i], station_coords[j]))
        }
    });

    let lu = matrix.lu();

    let mut means = Vec::with_capacity(targets.len());
    let mut variances = Vec::with_capacity(targets.len());
    for target in targets {
        let rhs = DVector::<f64>::from_fn(n + 1, |i, _| {
            if i == n {
                1.0
            } else {
                model.semivariance(distance(station_coords[i], *target))
            }
        });

        let solution = lu.solve(&rhs).ok_or(KrigingError::SingularSystem)?;

        let mut estimate = 0.0;
        let mut variance = 0.0;
        for i in 0..n {
            estimate += solution[i] * station_values[i];
            variance += solution[i] * rhs[i];
        }
        variance += solution[n];

        if !estimate.is_finite() {
            return Err(KrigingError::SingularSystem);
        }

        means.push(estimate);
        variances.push(variance.max(0.0));
    }

    Ok((means, variances))
}

fn max_pair_distance(coords: &[(f64, f64)]) -> f64 {
    let mut max = 0.0_f64;
    for i in 0..coords.len() {
        for j in (i + 1)..coords.len() {
            let dx = coords[i].0 - coords[j].0;
            let dy = coords[i].1 - coords[j].1;
            max = max.max((dx * dx + dy * dy).sqrt());
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn square_stations() -> Vec<(f64, f64)> {
        vec![
            (0.0, 0.0),
            (10_000.0, 0.0),
            (0.0, 10_000.0),
            (10_000.0, 10_000.0),
        ]
    }

    #[test]
    fn test_single_station_degrades_to_nan() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        let slice = engine.interpolate(
            hour(12),
            EnvironmentalVariable::AirTemperature,
            &[(0.0, 0.0)],
            &[25.0],
            &[(1.0, 1.0), (2.0, 2.0)],
        );
        assert_eq!(slice.mean.len(), 2);
        assert!(slice.mean.iter().all(|v| v.is_nan()));
        assert!(slice.variance.iter().all(|v| v.is_nan()));
        assert_eq!(engine.degraded_slices(), 1);
    }

    #[test]
    fn test_nan_values_do_not_count_as_stations() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        let slice = engine.interpolate(
            hour(12),
            EnvironmentalVariable::AirTemperature,
            &square_stations(),
            &[25.0, f64::NAN, f64::NAN, f64::NAN],
            &[(5000.0, 5000.0)],
        );
        assert!(slice.mean[0].is_nan());
    }

    #[test]
    fn test_gradient_field_interpolates_between_extremes() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        // Temperature rising eastward: 20 C in the west, 30 C in the east.
        let slice = engine.interpolate(
            hour(12),
            EnvironmentalVariable::AirTemperature,
            &square_stations(),
            &[20.0, 30.0, 20.0, 30.0],
            &[(5000.0, 5000.0)],
        );
        assert!(
            slice.mean[0] > 22.0 && slice.mean[0] < 28.0,
            "center estimate {}",
            slice.mean[0]
        );
        assert!(slice.variance[0] >= 0.0);
    }

    #[test]
    fn test_variance_never_negative() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        let targets: Vec<(f64, f64)> = (0..20)
            .map(|i| (i as f64 * 500.0, i as f64 * 250.0))
            .collect();
        let slice = engine.interpolate(
            hour(12),
            EnvironmentalVariable::AirTemperature,
            &square_stations(),
            &[20.0, 26.0, 23.0, 29.0],
            &targets,
        );
        for v in &slice.variance {
            assert!(v.is_nan() || *v >= 0.0);
        }
    }

    #[test]
    fn test_constant_field_yields_sample_mean() {
        let model = FittedVariogram::Linear {
            slope: 0.0,
            nugget: 0.0,
        };
        let (means, variances) = ordinary_kriging(
            &model,
            &square_stations(),
            &[15.0, 15.0, 15.0, 15.0],
            &[(2500.0, 2500.0)],
        )
        .unwrap();
        assert_eq!(means[0], 15.0);
        assert_eq!(variances[0], 0.0);
    }

    #[test]
    fn test_out_of_range_radiation_is_filtered_to_nan() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        // A uniform 2000 W/m2 field interpolates to 2000 everywhere, which is
        // outside the physical range and must come back as NaN, not 1400.
        let slice = engine.interpolate(
            hour(12),
            EnvironmentalVariable::GlobalRadiation,
            &square_stations(),
            &[2000.0, 2000.0, 2000.0, 2000.0],
            &[(5000.0, 5000.0)],
        );
        assert!(slice.mean[0].is_nan());
    }

    #[test]
    fn test_quality_verdict_tracks_failures() {
        let mut engine = KrigingEngine::new(KrigingConfig::default(), PhysicalBounds::default());
        for h in 0..10 {
            engine.interpolate(
                hour(h),
                EnvironmentalVariable::AirTemperature,
                &square_stations(),
                &[20.0, 26.0, 23.0, 29.0],
                &[(5000.0, 5000.0)],
            );
        }
        assert_eq!(engine.quality(), InterpolationQuality::Good);

        for h in 10..20 {
            engine.interpolate(
                hour(h),
                EnvironmentalVariable::AirTemperature,
                &[(0.0, 0.0)],
                &[25.0],
                &[(5000.0, 5000.0)],
            );
        }
        assert_eq!(engine.quality(), InterpolationQuality::Bad);
    }

    #[test]
    fn test_quality_thresholds() {
        assert_eq!(
            InterpolationQuality::from_failure_fraction(0.05),
            InterpolationQuality::Good
        );
        assert_eq!(
            InterpolationQuality::from_failure_fraction(0.2),
            InterpolationQuality::Regular
        );
        assert_eq!(
            InterpolationQuality::from_failure_fraction(0.5),
            InterpolationQuality::Bad
        );
    }
}
