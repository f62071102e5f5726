use super::stats::{self, finite_sorted, percentile_of_sorted};
use serde::Serialize;

const KELVIN_OFFSET: f64 = 273.15;

/// Default Arrhenius activation-energy factor for conductor aging, K.
pub const DEFAULT_ARRHENIUS_FACTOR: f64 = 15_000.0;

/// Thermal-risk category, thresholds per NBR 5422 practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
    Critical,
    Undefined,
}

impl RiskCategory {
    pub fn description(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low risk (< 1%)",
            RiskCategory::Moderate => "Moderate risk (1-5%)",
            RiskCategory::High => "High risk (5-10%)",
            RiskCategory::Critical => "Critical risk (> 10%)",
            RiskCategory::Undefined => "Undefined risk (insufficient data)",
        }
    }

    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Operate normally",
            RiskCategory::Moderate => "Reinforce monitoring",
            RiskCategory::High => "Review operational limits",
            RiskCategory::Critical => "Immediate intervention required",
            RiskCategory::Undefined => "Review input data",
        }
    }
}

/// Probability that the conductor temperature exceeds `limit_c`, strictly
/// greater, over finite values only. NaN when nothing finite remains.
pub fn exceedance_probability(temperatures: &[f64], limit_c: f64) -> f64 {
    let finite = finite_sorted(temperatures);
    if finite.is_empty() {
        return f64::NAN;
    }
    let exceedances = finite.iter().filter(|t| **t > limit_c).count();
    exceedances as f64 / finite.len() as f64
}

/// Temperature at the given percentile of the distribution.
pub fn confidence_temperature(temperatures: &[f64], percentile: f64) -> f64 {
    stats::percentile(temperatures, percentile)
}

/// Classify an exceedance probability into a risk category.
pub fn classify(probability: f64) -> RiskCategory {
    if probability.is_nan() {
        RiskCategory::Undefined
    } else if probability < 0.01 {
        RiskCategory::Low
    } else if probability < 0.05 {
        RiskCategory::Moderate
    } else if probability < 0.10 {
        RiskCategory::High
    } else {
        RiskCategory::Critical
    }
}

/// Symmetric percentile confidence interval at the given level. Requires at
/// least two finite values; NaN bounds otherwise.
pub fn confidence_interval(temperatures: &[f64], level: f64) -> (f64, f64) {
    let finite = finite_sorted(temperatures);
    if finite.len() < 2 || !(0.0..1.0).contains(&level) {
        return (f64::NAN, f64::NAN);
    }
    let alpha = 1.0 - level;
    (
        percentile_of_sorted(&finite, alpha / 2.0 * 100.0),
        percentile_of_sorted(&finite, (1.0 - alpha / 2.0) * 100.0),
    )
}

/// Arrhenius-law service-life estimate relative to operation at the nominal
/// temperature.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LifeEstimate {
    /// Aging acceleration factor; > 1 means faster aging than nominal
    pub reduction_factor: f64,
    /// Relative remaining life, 1 / reduction_factor
    pub relative_life: f64,
    pub mean_operating_temp_c: f64,
    pub nominal_temp_c: f64,
}

pub fn life_reduction_factor(
    temperatures: &[f64],
    nominal_temp_c: f64,
    arrhenius_factor: f64,
) -> LifeEstimate {
    let finite = finite_sorted(temperatures);
    if finite.is_empty() {
        return LifeEstimate {
            reduction_factor: f64::NAN,
            relative_life: f64::NAN,
            mean_operating_temp_c: f64::NAN,
            nominal_temp_c,
        };
    }

    let mean_operating_temp_c = stats::mean(&finite);
    let nominal_k = nominal_temp_c + KELVIN_OFFSET;
    let operating_k = mean_operating_temp_c + KELVIN_OFFSET;
    let reduction_factor = (arrhenius_factor * (1.0 / nominal_k - 1.0 / operating_k)).exp();

    LifeEstimate {
        reduction_factor,
        relative_life: 1.0 / reduction_factor,
        mean_operating_temp_c,
        nominal_temp_c,
    }
}

/// Risk metrics for one (point, hour) cell.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskAssessment {
    pub exceedance_probability: f64,
    pub confidence_temperature_c: f64,
    pub category: RiskCategory,
}

/// Evaluator configured with the design limit and confidence percentile of
/// the analysis. Stateless; assessments are recomputed per distribution.
#[derive(Debug, Clone, Copy)]
pub struct RiskEvaluator {
    pub design_limit_c: f64,
    pub confidence_percentile: f64,
}

impl RiskEvaluator {
    pub fn new(design_limit_c: f64, confidence_percentile: f64) -> Self {
        Self {
            design_limit_c,
            confidence_percentile,
        }
    }

    pub fn assess(&self, temperatures: &[f64]) -> RiskAssessment {
        let probability = exceedance_probability(temperatures, self.design_limit_c);
        RiskAssessment {
            exceedance_probability: probability,
            confidence_temperature_c: confidence_temperature(
                temperatures,
                self.confidence_percentile,
            ),
            category: classify(probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0099, RiskCategory::Low)]
    #[case(0.01, RiskCategory::Moderate)]
    #[case(0.049, RiskCategory::Moderate)]
    #[case(0.05, RiskCategory::High)]
    #[case(0.099, RiskCategory::High)]
    #[case(0.10, RiskCategory::Critical)]
    #[case(0.5, RiskCategory::Critical)]
    fn test_classification_boundaries(#[case] probability: f64, #[case] expected: RiskCategory) {
        assert_eq!(classify(probability), expected);
    }

    #[test]
    fn test_nan_probability_is_undefined() {
        assert_eq!(classify(f64::NAN), RiskCategory::Undefined);
    }

    #[test]
    fn test_exceedance_extremes() {
        let below = vec![60.0, 65.0, 70.0];
        assert_eq!(exceedance_probability(&below, 75.0), 0.0);

        let above = vec![80.0, 85.0, 90.0];
        assert_eq!(exceedance_probability(&above, 75.0), 1.0);

        // Strictly greater: values at the limit do not count.
        assert_eq!(exceedance_probability(&[75.0, 75.0], 75.0), 0.0);
    }

    #[test]
    fn test_exceedance_of_empty_distribution_is_nan() {
        assert!(exceedance_probability(&[], 75.0).is_nan());
        assert!(exceedance_probability(&[f64::NAN], 75.0).is_nan());
    }

    proptest! {
        #[test]
        fn test_exceedance_probability_bounds(
            values in prop::collection::vec(-50.0_f64..250.0, 1..200),
            limit in 0.0_f64..150.0,
        ) {
            let p = exceedance_probability(&values, limit);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_confidence_interval_needs_two_values() {
        let (lo, hi) = confidence_interval(&[60.0], 0.95);
        assert!(lo.is_nan() && hi.is_nan());

        let values: Vec<f64> = (0..100).map(|i| 50.0 + i as f64 * 0.3).collect();
        let (lo, hi) = confidence_interval(&values, 0.95);
        assert!(lo < hi);
        assert!(lo >= 50.0 && hi <= 80.0);
    }

    #[test]
    fn test_life_reduction_above_nominal() {
        let hot = vec![85.0; 100];
        let estimate = life_reduction_factor(&hot, 75.0, DEFAULT_ARRHENIUS_FACTOR);
        assert!(estimate.reduction_factor > 1.0);
        assert!(estimate.relative_life < 1.0);

        let cool = vec![55.0; 100];
        let estimate = life_reduction_factor(&cool, 75.0, DEFAULT_ARRHENIUS_FACTOR);
        assert!(estimate.reduction_factor < 1.0);
        assert!(estimate.relative_life > 1.0);
    }

    #[test]
    fn test_assessment_combines_metrics() {
        let values: Vec<f64> = (0..1000)
            .map(|i| if i < 30 { 80.0 } else { 60.0 })
            .collect();
        let evaluator = RiskEvaluator::new(75.0, 90.0);
        let assessment = evaluator.assess(&values);
        assert!((assessment.exceedance_probability - 0.03).abs() < 1e-12);
        assert_eq!(assessment.category, RiskCategory::Moderate);
        assert!(assessment.confidence_temperature_c <= 80.0);
    }
}
