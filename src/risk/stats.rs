use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Sample-size threshold between Shapiro-Wilk and Kolmogorov-Smirnov.
const SHAPIRO_WILK_MAX_N: usize = 5000;

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("standard normal")
}

/// Keep only finite entries, sorted ascending.
pub fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by_key(|v| OrderedFloat(*v));
    finite
}

/// Percentile with linear interpolation between order statistics, over
/// finite values only. NaN when nothing finite remains.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let finite = finite_sorted(values);
    percentile_of_sorted(&finite, p)
}

pub(crate) fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return f64::NAN;
    }
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Descriptive statistics of a temperature distribution. All fields are NaN
/// when no finite values are present.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p10: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl DistributionSummary {
    pub fn nan() -> Self {
        Self {
            mean: f64::NAN,
            median: f64::NAN,
            std_dev: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p5: f64::NAN,
            p10: f64::NAN,
            p90: f64::NAN,
            p95: f64::NAN,
            p99: f64::NAN,
        }
    }

    pub fn from_values(values: &[f64]) -> Self {
        let finite = finite_sorted(values);
        if finite.is_empty() {
            return Self::nan();
        }
        Self {
            mean: mean(&finite),
            median: percentile_of_sorted(&finite, 50.0),
            std_dev: std_dev(&finite),
            min: finite[0],
            max: finite[finite.len() - 1],
            p5: percentile_of_sorted(&finite, 5.0),
            p10: percentile_of_sorted(&finite, 10.0),
            p90: percentile_of_sorted(&finite, 90.0),
            p95: percentile_of_sorted(&finite, 95.0),
            p99: percentile_of_sorted(&finite, 99.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum NormalityMethod {
    #[strum(serialize = "Shapiro-Wilk")]
    ShapiroWilk,
    #[strum(serialize = "Kolmogorov-Smirnov")]
    KolmogorovSmirnov,
    #[strum(serialize = "insufficient data")]
    Insufficient,
}

#[derive(Debug, Clone, Copy)]
pub struct NormalityTest {
    pub method: NormalityMethod,
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
}

/// Test a distribution for normality at the given significance level.
///
/// Shapiro-Wilk below 5000 samples, Kolmogorov-Smirnov against a normal with
/// the sample moments above it. At least 3 finite values are required.
pub fn normality_test(values: &[f64], alpha: f64) -> NormalityTest {
    let finite = finite_sorted(values);
    if finite.len() < 3 {
        return NormalityTest {
            method: NormalityMethod::Insufficient,
            statistic: f64::NAN,
            p_value: f64::NAN,
            is_normal: false,
        };
    }

    let (method, statistic, p_value) = if finite.len() < SHAPIRO_WILK_MAX_N {
        let (w, p) = shapiro_wilk(&finite);
        (NormalityMethod::ShapiroWilk, w, p)
    } else {
        let (d, p) = kolmogorov_smirnov(&finite, mean(&finite), std_dev(&finite));
        (NormalityMethod::KolmogorovSmirnov, d, p)
    };

    NormalityTest {
        method,
        statistic,
        p_value,
        is_normal: p_value > alpha,
    }
}

/// Shapiro-Wilk W test, Royston's AS R94 approximation. Input must be sorted
/// ascending with at least 3 entries. Returns (W, p).
pub fn shapiro_wilk(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len();
    let nf = n as f64;
    let normal = standard_normal();

    let sample_mean = mean(sorted);
    let sse: f64 = sorted.iter().map(|x| (x - sample_mean).powi(2)).sum();
    if sse <= 0.0 {
        return (f64::NAN, f64::NAN);
    }

    // Expected normal order statistics (Blom scores)
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let m_sum_sq: f64 = m.iter().map(|v| v * v).sum();

    let mut a = vec![0.0_f64; n];
    if n == 3 {
        a[0] = -(0.5_f64.sqrt());
        a[2] = 0.5_f64.sqrt();
    } else {
        let c: Vec<f64> = m.iter().map(|v| v / m_sum_sq.sqrt()).collect();
        let u = 1.0 / nf.sqrt();

        let a_n = c[n - 1] + 0.221157 * u - 0.147981 * u.powi(2) - 2.071190 * u.powi(3)
            + 4.434685 * u.powi(4)
            - 2.706056 * u.powi(5);

        if n > 5 {
            let a_n1 = c[n - 2] + 0.042981 * u - 0.293762 * u.powi(2) - 1.752461 * u.powi(3)
                + 5.682633 * u.powi(4)
                - 3.582633 * u.powi(5);
            let phi = (m_sum_sq - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
                / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
            let phi_sqrt = phi.sqrt();
            for i in 2..(n - 2) {
                a[i] = m[i] / phi_sqrt;
            }
            a[n - 1] = a_n;
            a[n - 2] = a_n1;
            a[0] = -a_n;
            a[1] = -a_n1;
        } else {
            let phi = (m_sum_sq - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
            let phi_sqrt = phi.sqrt();
            for i in 1..(n - 1) {
                a[i] = m[i] / phi_sqrt;
            }
            a[n - 1] = a_n;
            a[0] = -a_n;
        }
    }

    let numerator: f64 = a.iter().zip(sorted).map(|(ai, xi)| ai * xi).sum::<f64>();
    let w = (numerator * numerator / sse).min(1.0);

    let p = if n == 3 {
        let p = 6.0 / std::f64::consts::PI
            * (w.sqrt().asin() - (0.75_f64).sqrt().asin());
        p.clamp(0.0, 1.0)
    } else if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        let g = -(gamma - (1.0 - w).ln()).ln();
        let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf.powi(2) - 0.0006714 * nf.powi(3);
        let sigma = (1.3822 - 0.77857 * nf + 0.062767 * nf.powi(2) - 0.0020322 * nf.powi(3)).exp();
        1.0 - normal.cdf((g - mu) / sigma)
    } else {
        let ln_n = nf.ln();
        let g = (1.0 - w).ln();
        let mu = -1.5861 - 0.31082 * ln_n - 0.083751 * ln_n.powi(2) + 0.0038915 * ln_n.powi(3);
        let sigma = (-0.4803 - 0.082676 * ln_n + 0.0030302 * ln_n.powi(2)).exp();
        1.0 - normal.cdf((g - mu) / sigma)
    };

    (w, p)
}

/// One-sample Kolmogorov-Smirnov test against N(mean, std). Input must be
/// sorted ascending. Returns (D, p) with the asymptotic p-value.
pub fn kolmogorov_smirnov(sorted: &[f64], mean: f64, std: f64) -> (f64, f64) {
    let n = sorted.len();
    if n == 0 || !std.is_finite() || std <= 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let nf = n as f64;
    let normal = standard_normal();

    let mut d = 0.0_f64;
    for (i, x) in sorted.iter().enumerate() {
        let cdf = normal.cdf((x - mean) / std);
        let upper = (i + 1) as f64 / nf - cdf;
        let lower = cdf - i as f64 / nf;
        d = d.max(upper).max(lower);
    }

    let lambda = (nf.sqrt() + 0.12 + 0.11 / nf.sqrt()) * d;
    let mut p = 0.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = 2.0 * (-1.0_f64).powi(k as i32 - 1) * (-2.0 * kf * kf * lambda * lambda).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }

    (d, p.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A sample that follows the normal quantiles exactly.
    fn normal_scores(n: usize) -> Vec<f64> {
        let normal = standard_normal();
        (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn test_percentile_interpolates_linearly() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert!((percentile(&values, 50.0) - 5.5).abs() < 1e-12);
        assert!((percentile(&values, 90.0) - 9.1).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 10.0);
    }

    #[test]
    fn test_percentile_ignores_non_finite() {
        let values = vec![f64::NAN, 1.0, f64::INFINITY, 2.0, 3.0];
        assert!((percentile(&values, 50.0) - 2.0).abs() < 1e-12);
        assert!(percentile(&[f64::NAN, f64::NAN], 50.0).is_nan());
    }

    #[test]
    fn test_summary_of_empty_distribution_is_nan() {
        let summary = DistributionSummary::from_values(&[]);
        assert!(summary.mean.is_nan());
        assert!(summary.p90.is_nan());
    }

    #[test]
    fn test_summary_orders_percentiles() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64).sin() * 10.0 + 60.0).collect();
        let summary = DistributionSummary::from_values(&values);
        assert!(summary.p5 <= summary.p10);
        assert!(summary.p10 <= summary.p90);
        assert!(summary.p90 <= summary.p95);
        assert!(summary.p95 <= summary.p99);
        assert!(summary.min <= summary.p5);
        assert!(summary.p99 <= summary.max);
    }

    #[test]
    fn test_shapiro_wilk_accepts_normal_sample() {
        let sample = normal_scores(50);
        let (w, p) = shapiro_wilk(&sample);
        assert!(w > 0.98, "W was {w}");
        assert!(p > 0.05, "p was {p}");
    }

    #[test]
    fn test_shapiro_wilk_rejects_skewed_sample() {
        let sample: Vec<f64> = normal_scores(50).iter().map(|z| (2.0 * z).exp()).collect();
        let sorted = finite_sorted(&sample);
        let (_, p) = shapiro_wilk(&sorted);
        assert!(p < 0.01, "p was {p}");
    }

    #[test]
    fn test_kolmogorov_smirnov_accepts_normal_sample() {
        let sample = normal_scores(6000);
        let (d, p) = kolmogorov_smirnov(&sample, mean(&sample), std_dev(&sample));
        assert!(d < 0.02, "D was {d}");
        assert!(p > 0.2, "p was {p}");
    }

    #[test]
    fn test_normality_dispatch_by_sample_size() {
        let small = normality_test(&normal_scores(100), 0.05);
        assert_eq!(small.method, NormalityMethod::ShapiroWilk);
        assert!(small.is_normal);

        let large = normality_test(&normal_scores(6000), 0.05);
        assert_eq!(large.method, NormalityMethod::KolmogorovSmirnov);
        assert!(large.is_normal);

        let tiny = normality_test(&[1.0, 2.0], 0.05);
        assert_eq!(tiny.method, NormalityMethod::Insufficient);
        assert!(tiny.p_value.is_nan());
    }

    #[test]
    fn test_constant_sample_has_undefined_w() {
        let (w, p) = shapiro_wilk(&[5.0, 5.0, 5.0, 5.0]);
        assert!(w.is_nan());
        assert!(p.is_nan());
    }
}
