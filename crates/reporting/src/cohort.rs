//! Cohort analysis: retention rates derived from retained-count cohorts.

use pulseboard_core::types::RetentionCohort;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRates {
    pub cohort: String,
    pub cohort_size: u64,
    /// Percentages rounded to one decimal.
    pub day_1: f64,
    pub day_7: f64,
    pub day_30: f64,
    pub day_90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRates {
    pub day_1: f64,
    pub day_7: f64,
    pub day_30: f64,
    pub day_90: f64,
}

fn rate(retained: f64, size: u64) -> f64 {
    if size == 0 {
        return 0.0;
    }
    (retained / size as f64 * 1000.0).round() / 10.0
}

pub fn retention_rates(cohorts: &[RetentionCohort]) -> Vec<CohortRates> {
    cohorts
        .iter()
        .map(|c| CohortRates {
            cohort: c.cohort.clone(),
            cohort_size: c.cohort_size,
            day_1: rate(c.day_1, c.cohort_size),
            day_7: rate(c.day_7, c.cohort_size),
            day_30: rate(c.day_30, c.cohort_size),
            day_90: rate(c.day_90, c.cohort_size),
        })
        .collect()
}

/// Column means of the cohort rates; zeros for no cohorts.
pub fn average_rates(rows: &[CohortRates]) -> AverageRates {
    let n = rows.len().max(1) as f64;
    let mean = |f: fn(&CohortRates) -> f64| rows.iter().map(f).sum::<f64>() / n;
    AverageRates {
        day_1: mean(|r| r.day_1),
        day_7: mean(|r| r.day_7),
        day_30: mean(|r| r.day_30),
        day_90: mean(|r| r.day_90),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort(size: u64, d1: f64, d7: f64, d30: f64, d90: f64) -> RetentionCohort {
        RetentionCohort {
            cohort: "2026-10".into(),
            cohort_size: size,
            day_1: d1,
            day_7: d7,
            day_30: d30,
            day_90: d90,
        }
    }

    #[test]
    fn test_rates_rounded() {
        let rows = retention_rates(&[cohort(1000, 685.0, 521.4, 382.26, 223.0)]);
        assert_eq!(rows[0].day_1, 68.5);
        assert_eq!(rows[0].day_7, 52.1);
        assert_eq!(rows[0].day_30, 38.2);
        assert_eq!(rows[0].day_90, 22.3);
    }

    #[test]
    fn test_zero_size_cohort() {
        let rows = retention_rates(&[cohort(0, 0.0, 0.0, 0.0, 0.0)]);
        assert_eq!(rows[0].day_1, 0.0);
    }

    #[test]
    fn test_average() {
        let rows = retention_rates(&[
            cohort(100, 70.0, 50.0, 30.0, 20.0),
            cohort(100, 66.0, 46.0, 26.0, 16.0),
        ]);
        let avg = average_rates(&rows);
        assert_eq!(avg.day_1, 68.0);
        assert_eq!(avg.day_90, 18.0);
        assert_eq!(average_rates(&[]).day_7, 0.0);
    }
}
