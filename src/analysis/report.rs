use super::record::AnalysisRecord;
use crate::risk::{self, LifeEstimate, NormalityTest, RiskCategory};
use std::collections::BTreeMap;

/// Relative-life threshold below which replacement should be evaluated.
const LIFE_CONCERN_THRESHOLD: f64 = 0.8;
const NORMALITY_ALPHA: f64 = 0.05;
const CONFIDENCE_LEVEL: f64 = 0.95;

/// Narrative risk report for one temperature distribution, mirroring what an
/// operations engineer expects to read next to the raw numbers.
#[derive(Debug, Clone)]
pub struct RiskReport {
    pub label: String,
    pub category: RiskCategory,
    pub confidence_temperature_c: f64,
    pub exceedance_probability: f64,
    pub headline: String,
    pub recommendations: Vec<String>,
    pub life: LifeEstimate,
    pub normality: NormalityTest,
    /// Symmetric 95% interval of the distribution
    pub confidence_interval_95: (f64, f64),
}

/// Build the narrative report for one (point, hour) distribution against the
/// design limit.
pub fn build_risk_report(
    temperatures: &[f64],
    design_limit_c: f64,
    confidence_percentile: f64,
    label: &str,
) -> RiskReport {
    let probability = risk::exceedance_probability(temperatures, design_limit_c);
    let category = risk::classify(probability);
    let confidence = risk::confidence_temperature(temperatures, confidence_percentile);
    let life = risk::life_reduction_factor(
        temperatures,
        design_limit_c,
        risk::evaluator::DEFAULT_ARRHENIUS_FACTOR,
    );
    let normality = risk::normality_test(temperatures, NORMALITY_ALPHA);
    let confidence_interval_95 = risk::confidence_interval(temperatures, CONFIDENCE_LEVEL);

    let headline = match category {
        RiskCategory::Low => format!(
            "Safe operation. P{confidence_percentile:.0} temperature ({confidence:.1} C) well below the {design_limit_c:.0} C limit."
        ),
        RiskCategory::Moderate => format!(
            "Acceptable operation with monitoring. P{confidence_percentile:.0} temperature ({confidence:.1} C) close to the limit."
        ),
        RiskCategory::High => {
            "Attention required. High probability of exceeding the operating limit.".to_string()
        }
        RiskCategory::Critical => format!(
            "Critical situation. P{confidence_percentile:.0} temperature ({confidence:.1} C) significantly exceeds the limit."
        ),
        RiskCategory::Undefined => {
            "Risk undefined: the simulation produced no usable temperatures.".to_string()
        }
    };

    let mut recommendations: Vec<String> = match category {
        RiskCategory::Low => vec![
            "Maintain normal operation".into(),
            "Routine periodic review".into(),
        ],
        RiskCategory::Moderate => vec![
            "Intensify conductor temperature monitoring".into(),
            "Review ambient conditions during load peaks".into(),
        ],
        RiskCategory::High => vec![
            "Review operating current limits".into(),
            "Consider cooling improvements".into(),
            "Deploy continuous monitoring".into(),
        ],
        RiskCategory::Critical => vec![
            "Reduce operating load immediately".into(),
            "Investigate thermal overload causes".into(),
            "Consider conductor replacement or upgrade".into(),
        ],
        RiskCategory::Undefined => vec!["Review input data".into()],
    };
    if life.relative_life.is_finite() && life.relative_life < LIFE_CONCERN_THRESHOLD {
        recommendations.push("Service life may be compromised - evaluate replacement".into());
    }

    RiskReport {
        label: label.to_string(),
        category,
        confidence_temperature_c: confidence,
        exceedance_probability: probability,
        headline,
        recommendations,
        life,
        normality,
        confidence_interval_95,
    }
}

/// Aggregates of the result table by hour of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourTrend {
    pub cells: usize,
    pub mean_p90_c: f64,
    pub max_p90_c: f64,
    pub mean_exceedance: f64,
    pub max_exceedance: f64,
    pub min_ampacity_a: f64,
}

/// Hour-of-day view over a finished run: which hours drive the thermal risk.
#[derive(Debug, Clone, Default)]
pub struct HourlyTrends {
    pub by_hour: BTreeMap<u32, HourTrend>,
    /// Hour with the highest P90 temperature
    pub peak_temperature_hour: Option<u32>,
    /// Hour with the highest exceedance probability
    pub peak_risk_hour: Option<u32>,
}

impl HourlyTrends {
    /// NaN cells (failed kriging or empty simulations) are skipped; an
    /// all-NaN input produces an empty trend table.
    pub fn from_records(records: &[AnalysisRecord]) -> Self {
        use chrono::Timelike;

        struct Accumulator {
            cells: usize,
            p90_sum: f64,
            p90_max: f64,
            exceedance_sum: f64,
            exceedance_max: f64,
            ampacity_min: f64,
        }

        let mut accumulators: BTreeMap<u32, Accumulator> = BTreeMap::new();
        for record in records {
            if !record.conductor_temp_p90_c.is_finite() {
                continue;
            }
            let entry = accumulators
                .entry(record.timestamp.hour())
                .or_insert(Accumulator {
                    cells: 0,
                    p90_sum: 0.0,
                    p90_max: f64::NEG_INFINITY,
                    exceedance_sum: 0.0,
                    exceedance_max: 0.0,
                    ampacity_min: f64::INFINITY,
                });
            entry.cells += 1;
            entry.p90_sum += record.conductor_temp_p90_c;
            entry.p90_max = entry.p90_max.max(record.conductor_temp_p90_c);
            if record.exceedance_probability.is_finite() {
                entry.exceedance_sum += record.exceedance_probability;
                entry.exceedance_max = entry.exceedance_max.max(record.exceedance_probability);
            }
            if record.ampacity_a.is_finite() {
                entry.ampacity_min = entry.ampacity_min.min(record.ampacity_a);
            }
        }

        let mut by_hour = BTreeMap::new();
        for (hour, acc) in accumulators {
            by_hour.insert(
                hour,
                HourTrend {
                    cells: acc.cells,
                    mean_p90_c: acc.p90_sum / acc.cells as f64,
                    max_p90_c: acc.p90_max,
                    mean_exceedance: acc.exceedance_sum / acc.cells as f64,
                    max_exceedance: acc.exceedance_max,
                    min_ampacity_a: if acc.ampacity_min.is_finite() {
                        acc.ampacity_min
                    } else {
                        f64::NAN
                    },
                },
            );
        }

        let peak_temperature_hour = by_hour
            .iter()
            .max_by(|a, b| a.1.max_p90_c.total_cmp(&b.1.max_p90_c))
            .map(|(hour, _)| *hour);
        let peak_risk_hour = by_hour
            .iter()
            .max_by(|a, b| a.1.max_exceedance.total_cmp(&b.1.max_exceedance))
            .map(|(hour, _)| *hour);

        Self {
            by_hour,
            peak_temperature_hour,
            peak_risk_hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(hour: u32, p90: f64, exceedance: f64, ampacity: f64) -> AnalysisRecord {
        AnalysisRecord {
            point_id: 0,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            latitude: -15.5,
            longitude: -47.8,
            chainage_m: 0.0,
            azimuth_deg: 0.0,
            operating_current_a: 500.0,
            air_temp_mean_c: 25.0,
            radiation_mean_wm2: 750.0,
            wind_u_mean_ms: 1.5,
            wind_v_mean_ms: 0.5,
            conductor_temp_mean_c: p90 - 5.0,
            conductor_temp_p90_c: p90,
            conductor_temp_p95_c: p90 + 2.0,
            exceedance_probability: exceedance,
            risk_category: crate::risk::classify(exceedance),
            ampacity_a: ampacity,
            ampacity_cooling_deficit: false,
            valid_iterations: 100,
            failed_iterations: 0,
            success_rate: 1.0,
        }
    }

    #[test]
    fn test_low_risk_report_reads_safe() {
        // A gaussian-looking spread around 55 C, far from the 75 C limit.
        let temps: Vec<f64> = (0..200)
            .map(|i| 55.0 + 3.0 * ((i as f64 / 200.0) * 2.0 - 1.0))
            .collect();
        let report = build_risk_report(&temps, 75.0, 90.0, "km 12");
        assert_eq!(report.category, RiskCategory::Low);
        assert!(report.headline.starts_with("Safe operation"));
        assert_eq!(report.recommendations.len(), 2);

        let (lo, hi) = report.confidence_interval_95;
        assert!(lo < hi);
        assert!(report.normality.p_value.is_finite());
    }

    #[test]
    fn test_critical_report_flags_life_concern() {
        // Running well above the limit: critical category and a compromised
        // service-life note.
        let temps = vec![95.0; 200];
        let report = build_risk_report(&temps, 75.0, 90.0, "km 3");
        assert_eq!(report.category, RiskCategory::Critical);
        assert!(report.life.relative_life < 0.8);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("Service life")));
    }

    #[test]
    fn test_empty_distribution_reports_undefined() {
        let report = build_risk_report(&[], 75.0, 90.0, "km 0");
        assert_eq!(report.category, RiskCategory::Undefined);
        assert!(report.exceedance_probability.is_nan());
    }

    #[test]
    fn test_trends_identify_critical_hours() {
        let records = vec![
            record(3, 45.0, 0.0, 900.0),
            record(9, 60.0, 0.01, 750.0),
            record(14, 72.0, 0.08, 600.0),
            record(14, 70.0, 0.06, 640.0),
            record(20, 55.0, 0.0, 820.0),
        ];
        let trends = HourlyTrends::from_records(&records);

        assert_eq!(trends.peak_temperature_hour, Some(14));
        assert_eq!(trends.peak_risk_hour, Some(14));
        let afternoon = &trends.by_hour[&14];
        assert_eq!(afternoon.cells, 2);
        assert!((afternoon.mean_p90_c - 71.0).abs() < 1e-9);
        assert_eq!(afternoon.min_ampacity_a, 600.0);
    }

    #[test]
    fn test_trends_skip_nan_cells() {
        let records = vec![record(3, f64::NAN, f64::NAN, f64::NAN)];
        let trends = HourlyTrends::from_records(&records);
        assert!(trends.by_hour.is_empty());
        assert_eq!(trends.peak_temperature_hour, None);
    }
}
