//! End-to-end flow: log in, pull datasets through the cache, compute deltas,
//! export, refresh, and run a mock query.

use chrono::NaiveDate;
use pulseboard_core::config::AppConfig;
use pulseboard_core::types::{Dataset, DatasetKind};
use pulseboard_core::PulseError;
use pulseboard_generator::query::{sample_query, MockTable};
use pulseboard_generator::{QueryConsole, SyntheticMetricsGenerator};
use pulseboard_platform::SessionContext;
use pulseboard_reporting::{export_csv, format_period_over_period, Dashboard, DashboardView};
use std::sync::Arc;

fn generator() -> SyntheticMetricsGenerator {
    let anchor = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    SyntheticMetricsGenerator::anchored(AppConfig::default().generator.seed, anchor)
}

#[test]
fn test_gated_dashboard_flow() {
    let config = AppConfig::default();
    let mut session = SessionContext::new(config.default_data_source());
    assert!(matches!(
        session.require_authenticated(),
        Err(PulseError::Unauthenticated)
    ));
    session
        .login(&config.auth.username, &config.auth.password, &config.auth)
        .unwrap();
    session.require_authenticated().unwrap();

    let dashboard = Dashboard::with_generator(generator(), &config);
    let first = dashboard.cache().get_or_compute(DatasetKind::Daily, 30);
    let again = dashboard.cache().get_or_compute(DatasetKind::Daily, 30);
    assert!(Arc::ptr_eq(&first, &again));

    let sessions = first.series("sessions").unwrap();
    let delta = format_period_over_period(&sessions, 7);
    assert!(delta.starts_with('+') || delta.starts_with('-'));
    assert!(delta.ends_with('%'));
    assert_eq!(format_period_over_period(&sessions, 16), "N/A");

    let csv = export_csv(&first.to_table());
    assert_eq!(csv.lines().count(), 31);
    assert!(csv.starts_with("date,sessions,page_views,users,bounce_rate,avg_duration,conversions\n"));
    assert!(csv.lines().last().unwrap().starts_with("\"2026-10-18\","));

    let view = dashboard.render(DashboardView::Acquisition).unwrap();
    assert_eq!(view["channels"]["rows"][0][0], "Organic Search");
    assert_eq!(view["channels"]["rows"][0][2], 0.0);

    dashboard.refresh();
    let recomputed = dashboard.cache().get_or_compute(DatasetKind::Daily, 30);
    assert!(!Arc::ptr_eq(&first, &recomputed));
    assert_eq!(*first, *recomputed);
}

#[test]
fn test_separate_dashboards_do_not_share_cache() {
    let config = AppConfig::default();
    let a = Dashboard::with_generator(generator(), &config);
    let b = Dashboard::with_generator(generator(), &config);

    let from_a = a.cache().get_or_compute(DatasetKind::Revenue, 90);
    assert!(b.cache().is_empty());
    let from_b = b.cache().get_or_compute(DatasetKind::Revenue, 90);
    assert!(!Arc::ptr_eq(&from_a, &from_b));
    assert_eq!(from_a, from_b);

    a.refresh();
    assert_eq!(b.cache().len(), 1);
}

#[test]
fn test_retention_alias_and_decay() {
    let config = AppConfig::default();
    let dashboard = Dashboard::with_generator(generator(), &config);
    let kind: DatasetKind = "cohort".parse().unwrap();
    let cohorts = dashboard.cache().get_or_compute(kind, 0);

    let Dataset::Retention(records) = &*cohorts else {
        panic!("expected retention dataset");
    };
    assert_eq!(records.len(), 6);
    for r in records {
        assert!(r.day_1 >= r.day_7 && r.day_7 >= r.day_30 && r.day_30 >= r.day_90);
    }
}

#[test]
fn test_query_console_alongside_dashboard() {
    let console = QueryConsole::new(generator());
    let result = console
        .execute(sample_query("Revenue by Product").unwrap())
        .unwrap();
    assert_eq!(result.matched, MockTable::ProductRevenue);
    let csv = export_csv(&result.table);
    assert_eq!(csv.lines().count(), 11);

    assert!(console.execute("UPDATE revenue SET x = 1").is_err());
}
