use super::engine::{ordinary_kriging, KrigingConfig};
use super::variogram::{self, EmpiricalVariogram, VariogramKind};
use crate::domain::EnvironmentalVariable;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

/// Picks the variogram family per variable by holdout cross-validation.
///
/// The choice is cached per variable for the whole run: station geometry is
/// roughly stable across the analysis window, so re-selecting every hour
/// buys rigor at a cost that is not worth paying by default. With fewer than
/// `cv_min_stations` stations the linear model is used (and not cached) —
/// cross-validation on so few points is noise.
pub struct VariogramSelector {
    candidates_default: Vec<VariogramKind>,
    candidates_radiation: Vec<VariogramKind>,
    cv_min_stations: usize,
    train_fraction: f64,
    penalty_weight: f64,
    penalty_cap: f64,
    seed: u64,
    cache: HashMap<EnvironmentalVariable, VariogramKind>,
}

impl VariogramSelector {
    pub fn from_config(config: &KrigingConfig) -> Self {
        Self {
            candidates_default: config.candidates_default.clone(),
            candidates_radiation: config.candidates_radiation.clone(),
            cv_min_stations: config.cv_min_stations,
            train_fraction: config.cv_train_fraction,
            penalty_weight: config.radiation_penalty_weight,
            penalty_cap: config.radiation_penalty_cap,
            seed: config.selection_seed,
            cache: HashMap::new(),
        }
    }

    pub fn select(
        &mut self,
        variable: EnvironmentalVariable,
        coords: &[(f64, f64)],
        values: &[f64],
    ) -> VariogramKind {
        if let Some(kind) = self.cache.get(&variable) {
            return *kind;
        }

        if coords.len() < self.cv_min_stations {
            return VariogramKind::Linear;
        }

        let kind = self.cross_validate(variable, coords, values);
        debug!(%variable, model = %kind, "variogram model selected");
        self.cache.insert(variable, kind);
        kind
    }

    fn candidates(&self, variable: EnvironmentalVariable) -> &[VariogramKind] {
        if variable == EnvironmentalVariable::GlobalRadiation {
            &self.candidates_radiation
        } else {
            &self.candidates_default
        }
    }

    fn cross_validate(
        &self,
        variable: EnvironmentalVariable,
        coords: &[(f64, f64)],
        values: &[f64],
    ) -> VariogramKind {
        let n = coords.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(variable_tag(variable)));
        indices.shuffle(&mut rng);

        let train_count = ((n as f64 * self.train_fraction).round() as usize)
            .clamp(2, n - 1);
        let (train_idx, validate_idx) = indices.split_at(train_count);

        let train_coords: Vec<(f64, f64)> = train_idx.iter().map(|&i| coords[i]).collect();
        let train_values: Vec<f64> = train_idx.iter().map(|&i| values[i]).collect();
        let validate_coords: Vec<(f64, f64)> = validate_idx.iter().map(|&i| coords[i]).collect();
        let validate_values: Vec<f64> = validate_idx.iter().map(|&i| values[i]).collect();

        let sample_variance = population_variance(values);

        let candidates = self.candidates(variable);
        let mut best = candidates[0];
        let mut best_score = f64::INFINITY;
        for &kind in candidates {
            let score = self.score(
                kind,
                variable,
                &train_coords,
                &train_values,
                &validate_coords,
                &validate_values,
                sample_variance,
            );
            if score < best_score {
                best_score = score;
                best = kind;
            }
        }

        if best_score.is_infinite() {
            // Every candidate failed to score; fall back to the simplest
            // family.
            return VariogramKind::Linear;
        }
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn score(
        &self,
        kind: VariogramKind,
        variable: EnvironmentalVariable,
        train_coords: &[(f64, f64)],
        train_values: &[f64],
        validate_coords: &[(f64, f64)],
        validate_values: &[f64],
        sample_variance: f64,
    ) -> f64 {
        let empirical = match EmpiricalVariogram::from_observations(
            train_coords,
            train_values,
            variogram::DEFAULT_LAG_BINS,
        ) {
            Some(e) => e,
            None => return f64::INFINITY,
        };
        let model = variogram::fit(kind, &empirical);

        let (predicted, variances) =
            match ordinary_kriging(&model, train_coords, train_values, validate_coords) {
                Ok(result) => result,
                Err(_) => return f64::INFINITY,
            };

        let mut squared_error = 0.0;
        let mut count = 0usize;
        for (p, actual) in predicted.iter().zip(validate_values) {
            if p.is_finite() {
                squared_error += (p - actual).powi(2);
                count += 1;
            }
        }
        if count == 0 {
            return f64::INFINITY;
        }
        let rmse = (squared_error / count as f64).sqrt();

        // Radiation additionally penalizes models with inflated kriging
        // variance relative to the spread of the data itself.
        if variable == EnvironmentalVariable::GlobalRadiation && sample_variance > 0.0 {
            let mean_variance = variances.iter().sum::<f64>() / variances.len() as f64;
            let ratio = (mean_variance / sample_variance).min(self.penalty_cap);
            rmse * (1.0 + self.penalty_weight * ratio)
        } else {
            rmse
        }
    }
}

fn variable_tag(variable: EnvironmentalVariable) -> u64 {
    EnvironmentalVariable::ALL
        .iter()
        .position(|v| *v == variable)
        .unwrap_or(0) as u64
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
