//! Re-aggregation of daily records into weekly and monthly buckets.

use chrono::Datelike;
use pulseboard_core::types::DailyMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRollup {
    pub iso_year: i32,
    pub iso_week: u32,
    /// "Week N".
    pub label: String,
    pub sessions: u64,
    pub page_views: u64,
    pub users: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// "YYYY-MM".
    pub month: String,
    pub sessions: u64,
    pub users: u64,
    pub page_views: u64,
}

/// Sum daily records per ISO week, ascending by (ISO year, week).
pub fn weekly_rollup(records: &[DailyMetrics]) -> Vec<WeeklyRollup> {
    let mut weeks: BTreeMap<(i32, u32), WeeklyRollup> = BTreeMap::new();

    for r in records {
        let iso = r.date.iso_week();
        let week = weeks
            .entry((iso.year(), iso.week()))
            .or_insert_with(|| WeeklyRollup {
                iso_year: iso.year(),
                iso_week: iso.week(),
                label: format!("Week {}", iso.week()),
                sessions: 0,
                page_views: 0,
                users: 0,
                conversions: 0,
            });
        week.sessions += r.sessions;
        week.page_views += r.page_views;
        week.users += r.users;
        week.conversions += r.conversions;
    }

    weeks.into_values().collect()
}

/// Sum daily records per calendar month, ascending.
pub fn monthly_rollup(records: &[DailyMetrics]) -> Vec<MonthlyRollup> {
    let mut months: BTreeMap<(i32, u32), MonthlyRollup> = BTreeMap::new();

    for r in records {
        let month = months
            .entry((r.date.year(), r.date.month()))
            .or_insert_with(|| MonthlyRollup {
                month: r.date.format("%Y-%m").to_string(),
                sessions: 0,
                users: 0,
                page_views: 0,
            });
        month.sessions += r.sessions;
        month.users += r.users;
        month.page_views += r.page_views;
    }

    months.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32, sessions: u64) -> DailyMetrics {
        DailyMetrics {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            sessions,
            page_views: sessions * 3,
            users: sessions / 2,
            bounce_rate: 0.4,
            avg_duration: 300.0,
            conversions: sessions / 50,
        }
    }

    #[test]
    fn test_weekly_groups_by_iso_week() {
        // 2026-10-11 is a Sunday (week 41); 2026-10-12 starts week 42.
        let records = vec![
            day(2026, 10, 10, 100),
            day(2026, 10, 11, 200),
            day(2026, 10, 12, 400),
        ];
        let weeks = weekly_rollup(&records);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].label, "Week 41");
        assert_eq!(weeks[0].sessions, 300);
        assert_eq!(weeks[0].page_views, 900);
        assert_eq!(weeks[1].label, "Week 42");
        assert_eq!(weeks[1].conversions, 8);
    }

    #[test]
    fn test_weekly_orders_across_year_boundary() {
        // 2026-12-31 is ISO week 53 of 2026; 2027-01-04 is week 1 of 2027.
        let records = vec![day(2026, 12, 31, 10), day(2027, 1, 4, 20)];
        let weeks = weekly_rollup(&records);
        assert_eq!(weeks[0].iso_year, 2026);
        assert_eq!(weeks[1].iso_year, 2027);
        assert_eq!(weeks[1].iso_week, 1);
    }

    #[test]
    fn test_monthly() {
        let records = vec![
            day(2026, 9, 29, 100),
            day(2026, 9, 30, 100),
            day(2026, 10, 1, 50),
        ];
        let months = monthly_rollup(&records);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2026-09");
        assert_eq!(months[0].sessions, 200);
        assert_eq!(months[0].users, 100);
        assert_eq!(months[1].month, "2026-10");
        assert_eq!(months[1].page_views, 150);
    }

    #[test]
    fn test_empty() {
        assert!(weekly_rollup(&[]).is_empty());
        assert!(monthly_rollup(&[]).is_empty());
    }
}
