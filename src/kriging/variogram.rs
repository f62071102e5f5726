use serde::{Deserialize, Serialize};

/// Number of uniform lag bins in the empirical semivariogram.
pub const DEFAULT_LAG_BINS: usize = 6;

/// Parametric variogram families. Forms follow the conventions of the usual
/// ordinary-kriging toolkits so fitted parameters transfer directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VariogramKind {
    Linear,
    Power,
    Gaussian,
    Spherical,
    Exponential,
}

/// A fitted variogram: semivariance as a function of separation distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedVariogram {
    Linear {
        slope: f64,
        nugget: f64,
    },
    Power {
        scale: f64,
        exponent: f64,
        nugget: f64,
    },
    Gaussian {
        psill: f64,
        range_m: f64,
        nugget: f64,
    },
    Spherical {
        psill: f64,
        range_m: f64,
        nugget: f64,
    },
    Exponential {
        psill: f64,
        range_m: f64,
        nugget: f64,
    },
}

impl FittedVariogram {
    pub fn kind(&self) -> VariogramKind {
        match self {
            FittedVariogram::Linear { .. } => VariogramKind::Linear,
            FittedVariogram::Power { .. } => VariogramKind::Power,
            FittedVariogram::Gaussian { .. } => VariogramKind::Gaussian,
            FittedVariogram::Spherical { .. } => VariogramKind::Spherical,
            FittedVariogram::Exponential { .. } => VariogramKind::Exponential,
        }
    }

    /// Semivariance at separation `distance_m`.
    pub fn semivariance(&self, distance_m: f64) -> f64 {
        let d = distance_m.max(0.0);
        match *self {
            FittedVariogram::Linear { slope, nugget } => slope * d + nugget,
            FittedVariogram::Power {
                scale,
                exponent,
                nugget,
            } => scale * d.powf(exponent) + nugget,
            FittedVariogram::Gaussian {
                psill,
                range_m,
                nugget,
            } => {
                let effective = range_m * 4.0 / 7.0;
                psill * (1.0 - (-(d * d) / (effective * effective)).exp()) + nugget
            }
            FittedVariogram::Spherical {
                psill,
                range_m,
                nugget,
            } => {
                if d < range_m {
                    let r = d / range_m;
                    psill * (1.5 * r - 0.5 * r * r * r) + nugget
                } else {
                    psill + nugget
                }
            }
            FittedVariogram::Exponential {
                psill,
                range_m,
                nugget,
            } => psill * (1.0 - (-d / (range_m / 3.0)).exp()) + nugget,
        }
    }
}

/// Binned empirical semivariogram of one set of scattered observations.
#[derive(Debug, Clone)]
pub struct EmpiricalVariogram {
    /// Mean pair separation per bin, meters
    pub lags: Vec<f64>,
    /// Mean semivariance per bin
    pub semivariances: Vec<f64>,
    /// Largest pair separation observed, meters
    pub max_distance: f64,
}

impl EmpiricalVariogram {
    /// Bin all station pairs into `bins` uniform distance classes.
    ///
    /// Returns None when fewer than two points or when all points coincide;
    /// no variogram can be estimated in either case.
    pub fn from_observations(coords: &[(f64, f64)], values: &[f64], bins: usize) -> Option<Self> {
        if coords.len() < 2 || coords.len() != values.len() {
            return None;
        }

        let mut pairs = Vec::with_capacity(coords.len() * (coords.len() - 1) / 2);
        let mut max_distance = 0.0_f64;
        for i in 0..coords.len() {
            for j in (i + 1)..coords.len() {
                let dx = coords[i].0 - coords[j].0;
                let dy = coords[i].1 - coords[j].1;
                let distance = (dx * dx + dy * dy).sqrt();
                let semivariance = 0.5 * (values[i] - values[j]).powi(2);
                max_distance = max_distance.max(distance);
                pairs.push((distance, semivariance));
            }
        }

        if max_distance <= 0.0 {
            return None;
        }

        let bins = bins.max(1);
        let width = max_distance / bins as f64;
        let mut lag_sums = vec![0.0_f64; bins];
        let mut semi_sums = vec![0.0_f64; bins];
        let mut counts = vec![0_usize; bins];
        for (distance, semivariance) in pairs {
            let idx = ((distance / width) as usize).min(bins - 1);
            lag_sums[idx] += distance;
            semi_sums[idx] += semivariance;
            counts[idx] += 1;
        }

        let mut lags = Vec::new();
        let mut semivariances = Vec::new();
        for i in 0..bins {
            if counts[i] > 0 {
                lags.push(lag_sums[i] / counts[i] as f64);
                semivariances.push(semi_sums[i] / counts[i] as f64);
            }
        }

        Some(Self {
            lags,
            semivariances,
            max_distance,
        })
    }
}

/// Fit one variogram family to an empirical semivariogram.
///
/// Families linear in their parameters are solved by least squares; the
/// bounded families fix the shape per candidate range from a deterministic
/// grid and solve sill/nugget linearly, keeping the whole fit reproducible.
pub fn fit(kind: VariogramKind, empirical: &EmpiricalVariogram) -> FittedVariogram {
    match kind {
        VariogramKind::Linear => {
            let (slope, nugget) = linear_least_squares(&empirical.lags, &empirical.semivariances);
            FittedVariogram::Linear {
                slope: slope.max(0.0),
                nugget: nugget.max(0.0),
            }
        }
        VariogramKind::Power => fit_power(empirical),
        VariogramKind::Gaussian => fit_bounded(empirical, VariogramKind::Gaussian),
        VariogramKind::Spherical => fit_bounded(empirical, VariogramKind::Spherical),
        VariogramKind::Exponential => fit_bounded(empirical, VariogramKind::Exponential),
    }
}

/// Ordinary least squares of y = slope * x + intercept.
fn linear_least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance += (x - mean_x) * (x - mean_x);
    }
    if variance <= 0.0 {
        return (0.0, mean_y);
    }
    let slope = covariance / variance;
    (slope, mean_y - slope * mean_x)
}

fn sum_squared_error(model: &FittedVariogram, empirical: &EmpiricalVariogram) -> f64 {
    empirical
        .lags
        .iter()
        .zip(&empirical.semivariances)
        .map(|(lag, semi)| {
            let diff = model.semivariance(*lag) - semi;
            diff * diff
        })
        .sum()
}

fn fit_power(empirical: &EmpiricalVariogram) -> FittedVariogram {
    let mut best = FittedVariogram::Power {
        scale: 0.0,
        exponent: 1.0,
        nugget: 0.0,
    };
    let mut best_sse = f64::INFINITY;

    let mut exponent = 0.1;
    while exponent < 1.99 {
        let transformed: Vec<f64> = empirical.lags.iter().map(|d| d.powf(exponent)).collect();
        let (scale, nugget) = linear_least_squares(&transformed, &empirical.semivariances);
        let candidate = FittedVariogram::Power {
            scale: scale.max(0.0),
            exponent,
            nugget: nugget.max(0.0),
        };
        let sse = sum_squared_error(&candidate, empirical);
        if sse < best_sse {
            best_sse = sse;
            best = candidate;
        }
        exponent += 0.05;
    }

    best
}

fn fit_bounded(empirical: &EmpiricalVariogram, kind: VariogramKind) -> FittedVariogram {
    let build = |psill: f64, range_m: f64, nugget: f64| match kind {
        VariogramKind::Gaussian => FittedVariogram::Gaussian {
            psill,
            range_m,
            nugget,
        },
        VariogramKind::Spherical => FittedVariogram::Spherical {
            psill,
            range_m,
            nugget,
        },
        _ => FittedVariogram::Exponential {
            psill,
            range_m,
            nugget,
        },
    };

    let mut best = build(0.0, empirical.max_distance, 0.0);
    let mut best_sse = f64::INFINITY;

    // Log-spaced candidate ranges between a small fraction of the extent and
    // twice the extent.
    let lo = (empirical.max_distance / 50.0).max(1e-6);
    let hi = empirical.max_distance * 2.0;
    let steps = 40;
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        let range_m = lo * (hi / lo).powf(t);

        // With the range fixed the model is linear in (psill, nugget):
        // gamma = psill * basis(d) + nugget.
        let unit = build(1.0, range_m, 0.0);
        let basis: Vec<f64> = empirical.lags.iter().map(|d| unit.semivariance(*d)).collect();
        let (psill, nugget) = linear_least_squares(&basis, &empirical.semivariances);
        let candidate = build(psill.max(1e-12), range_m, nugget.max(0.0));
        let sse = sum_squared_error(&candidate, empirical);
        if sse < best_sse {
            best_sse = sse;
            best = candidate;
        }
    }

    best
}
