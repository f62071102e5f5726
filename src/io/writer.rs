use crate::analysis::AnalysisRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Write the hourly result table as CSV, creating parent directories as
/// needed.
pub fn write_records(path: &Path, records: &[AnalysisRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating result file {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing result row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing result file {}", path.display()))?;

    info!(rows = records.len(), path = %path.display(), "result table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskCategory;
    use chrono::NaiveDate;

    #[test]
    fn test_written_table_has_header_and_rows() {
        let record = AnalysisRecord {
            point_id: 0,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(12, 0, 0)
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
            conductor_temp_mean_c: 52.0,
            conductor_temp_p90_c: 55.0,
            conductor_temp_p95_c: 56.0,
            exceedance_probability: 0.0,
            risk_category: RiskCategory::Low,
            ampacity_a: 900.0,
            ampacity_cooling_deficit: false,
            valid_iterations: 100,
            failed_iterations: 0,
            success_rate: 1.0,
        };

        let path = std::env::temp_dir().join("line-thermal-risk-results.csv");
        write_records(&path, &[record]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("point_id,timestamp"));
        assert!(header.contains("risk_category"));
        assert_eq!(lines.count(), 1);
    }
}
