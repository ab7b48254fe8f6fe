//! Dashboard views assembled from cached synthetic datasets.

use crate::cohort::{average_rates, retention_rates, AverageRates, CohortRates};
use crate::delta::{last_bucket_change, period_over_period, Delta};
use crate::rollup::{monthly_rollup, weekly_rollup, MonthlyRollup, WeeklyRollup};
use pulseboard_cache::DatasetCache;
use pulseboard_core::config::{AppConfig, GeneratorConfig};
use pulseboard_core::error::{PulseError, PulseResult};
use pulseboard_core::types::{
    AcquisitionMetrics, DailyMetrics, DataTable, Dataset, DatasetKind, RetentionCohort,
    RevenueMetrics,
};
use pulseboard_generator::SyntheticMetricsGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Trailing window for the daily KPI deltas.
const DAILY_DELTA_WINDOW: usize = 7;
/// Trailing window for revenue KPIs.
const REVENUE_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    Daily,
    Weekly,
    Monthly,
    Monetization,
    Acquisition,
    Retention,
}

impl DashboardView {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardView::Daily => "daily",
            DashboardView::Weekly => "weekly",
            DashboardView::Monthly => "monthly",
            DashboardView::Monetization => "monetization",
            DashboardView::Acquisition => "acquisition",
            DashboardView::Retention => "retention",
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardView {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(DashboardView::Daily),
            "weekly" => Ok(DashboardView::Weekly),
            "monthly" => Ok(DashboardView::Monthly),
            "monetization" => Ok(DashboardView::Monetization),
            "acquisition" => Ok(DashboardView::Acquisition),
            "retention" => Ok(DashboardView::Retention),
            other => Err(PulseError::UnknownOption {
                category: "view",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficKpis {
    pub total_sessions: u64,
    pub total_users: u64,
    pub avg_bounce_rate: f64,
    pub avg_duration_secs: f64,
    /// "Xm Ys".
    pub avg_duration_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyView {
    pub kpis: TrafficKpis,
    pub sessions_delta: Delta,
    pub users_delta: Delta,
    pub daily: DataTable,
    pub hourly: DataTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyView {
    pub weeks: Vec<WeeklyRollup>,
    pub last_week_sessions: u64,
    pub last_week_users: u64,
    pub last_week_conversion_rate: f64,
    pub sessions_wow: Delta,
    pub users_wow: Delta,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyView {
    pub months: Vec<MonthlyRollup>,
    pub last_month_users: u64,
    pub last_month_sessions: u64,
    pub last_month_page_views: u64,
    pub sessions_mom: Delta,
    pub users_mom: Delta,
    pub page_views_mom: Delta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonetizationView {
    pub total_revenue: f64,
    /// Mean of the trailing 30 daily revenues, times 30.
    pub mrr: f64,
    pub avg_arpu: f64,
    pub revenue_delta: Delta,
    pub recent: DataTable,
    pub breakdown: Vec<ProductRevenue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionView {
    pub total_users: u64,
    pub total_cost: f64,
    pub blended_cpa: f64,
    /// Fraction of users from cost-free channels.
    pub organic_share: f64,
    pub paid_channels: Vec<String>,
    pub channels: DataTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetentionView {
    pub cohorts: Vec<CohortRates>,
    pub average: AverageRates,
    pub table: DataTable,
}

/// One session's dashboard: a dataset cache plus the configured sizes.
pub struct Dashboard {
    cache: DatasetCache,
    sizes: GeneratorConfig,
}

impl Dashboard {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_generator(
            SyntheticMetricsGenerator::from_config(&config.generator),
            config,
        )
    }

    pub fn with_generator(generator: SyntheticMetricsGenerator, config: &AppConfig) -> Self {
        Self {
            cache: DatasetCache::new(generator, config.cache.max_entries),
            sizes: config.generator.clone(),
        }
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Drop all cached datasets. Returns how many were removed.
    pub fn refresh(&self) -> usize {
        self.cache.invalidate_all()
    }

    /// Serialize the requested view.
    pub fn render(&self, view: DashboardView) -> PulseResult<serde_json::Value> {
        let value = match view {
            DashboardView::Daily => serde_json::to_value(self.daily())?,
            DashboardView::Weekly => serde_json::to_value(self.weekly())?,
            DashboardView::Monthly => serde_json::to_value(self.monthly())?,
            DashboardView::Monetization => serde_json::to_value(self.monetization())?,
            DashboardView::Acquisition => serde_json::to_value(self.acquisition())?,
            DashboardView::Retention => serde_json::to_value(self.retention())?,
        };
        info!(view = %view, "Dashboard view assembled");
        Ok(value)
    }

    pub fn daily(&self) -> DailyView {
        let daily = self.cache.get_or_compute(DatasetKind::Daily, self.sizes.daily_days);
        let hourly = self.cache.get_or_compute(DatasetKind::Hourly, 0);
        let records = daily_records(&daily);

        let sessions: Vec<f64> = records.iter().map(|r| r.sessions as f64).collect();
        let users: Vec<f64> = records.iter().map(|r| r.users as f64).collect();
        let avg_duration = mean(records.iter().map(|r| r.avg_duration));

        DailyView {
            kpis: TrafficKpis {
                total_sessions: records.iter().map(|r| r.sessions).sum(),
                total_users: records.iter().map(|r| r.users).sum(),
                avg_bounce_rate: mean(records.iter().map(|r| r.bounce_rate)),
                avg_duration_secs: avg_duration,
                avg_duration_label: duration_label(avg_duration),
            },
            sessions_delta: period_over_period(&sessions, DAILY_DELTA_WINDOW),
            users_delta: period_over_period(&users, DAILY_DELTA_WINDOW),
            daily: daily.to_table(),
            hourly: hourly.to_table(),
        }
    }

    pub fn weekly(&self) -> WeeklyView {
        let daily = self.cache.get_or_compute(DatasetKind::Daily, self.sizes.weekly_days);
        let weeks = weekly_rollup(daily_records(&daily));

        let sessions: Vec<f64> = weeks.iter().map(|w| w.sessions as f64).collect();
        let users: Vec<f64> = weeks.iter().map(|w| w.users as f64).collect();
        let (last_sessions, last_users, last_conversions) = weeks
            .last()
            .map(|w| (w.sessions, w.users, w.conversions))
            .unwrap_or_default();

        WeeklyView {
            last_week_sessions: last_sessions,
            last_week_users: last_users,
            last_week_conversion_rate: ratio(last_conversions as f64, last_sessions as f64),
            sessions_wow: last_bucket_change(&sessions),
            users_wow: last_bucket_change(&users),
            weeks,
        }
    }

    pub fn monthly(&self) -> MonthlyView {
        let daily = self.cache.get_or_compute(DatasetKind::Daily, self.sizes.monthly_days);
        let months = monthly_rollup(daily_records(&daily));

        let column = |f: fn(&MonthlyRollup) -> u64| -> Vec<f64> {
            months.iter().map(|m| f(m) as f64).collect()
        };
        let sessions_mom = last_bucket_change(&column(|m| m.sessions));
        let users_mom = last_bucket_change(&column(|m| m.users));
        let page_views_mom = last_bucket_change(&column(|m| m.page_views));
        let (users, sessions, page_views) = months
            .last()
            .map(|m| (m.users, m.sessions, m.page_views))
            .unwrap_or_default();

        MonthlyView {
            last_month_users: users,
            last_month_sessions: sessions,
            last_month_page_views: page_views,
            sessions_mom,
            users_mom,
            page_views_mom,
            months,
        }
    }

    pub fn monetization(&self) -> MonetizationView {
        let revenue = self.cache.get_or_compute(DatasetKind::Revenue, self.sizes.revenue_days);
        let records = revenue_records(&revenue);

        let daily_revenue: Vec<f64> = records.iter().map(|r| r.revenue).collect();
        let trailing = &daily_revenue[daily_revenue.len().saturating_sub(REVENUE_WINDOW)..];

        MonetizationView {
            total_revenue: daily_revenue.iter().sum(),
            mrr: mean(trailing.iter().copied()) * 30.0,
            avg_arpu: mean(records.iter().map(|r| r.arpu)),
            revenue_delta: period_over_period(&daily_revenue, REVENUE_WINDOW),
            recent: revenue.to_table().tail(REVENUE_WINDOW),
            breakdown: revenue_breakdown(),
        }
    }

    pub fn acquisition(&self) -> AcquisitionView {
        let acquisition = self.cache.get_or_compute(DatasetKind::Acquisition, 0);
        let records = acquisition_records(&acquisition);

        let total_users: u64 = records.iter().map(|r| r.users).sum();
        let total_cost: f64 = records.iter().map(|r| r.cost).sum();
        let free_users: u64 = records
            .iter()
            .filter(|r| r.cost == 0.0)
            .map(|r| r.users)
            .sum();

        AcquisitionView {
            total_users,
            total_cost,
            blended_cpa: ratio(total_cost, total_users as f64),
            organic_share: ratio(free_users as f64, total_users as f64),
            paid_channels: records
                .iter()
                .filter(|r| r.cost > 0.0)
                .map(|r| r.channel.clone())
                .collect(),
            channels: acquisition.to_table(),
        }
    }

    pub fn retention(&self) -> RetentionView {
        let retention = self.cache.get_or_compute(DatasetKind::Retention, 0);
        let cohorts = retention_rates(retention_records(&retention));

        RetentionView {
            average: average_rates(&cohorts),
            cohorts,
            table: retention.to_table(),
        }
    }
}

/// Fixed product revenue split shown next to the revenue charts.
pub fn revenue_breakdown() -> Vec<ProductRevenue> {
    [
        ("Premium Plan", 45000.0, 25.1),
        ("Basic Plan", 28000.0, 15.6),
        ("Enterprise", 85000.0, 47.5),
        ("Add-ons", 12000.0, 6.7),
        ("One-time", 8000.0, 4.5),
    ]
    .into_iter()
    .map(|(product, revenue, percentage)| ProductRevenue {
        product: product.to_string(),
        revenue,
        percentage,
    })
    .collect()
}

/// Render seconds as "Xm Ys".
pub fn duration_label(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    format!("{}m {}s", whole / 60, whole % 60)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn daily_records(ds: &Dataset) -> &[DailyMetrics] {
    match ds {
        Dataset::Daily(r) => r,
        _ => &[],
    }
}

fn revenue_records(ds: &Dataset) -> &[RevenueMetrics] {
    match ds {
        Dataset::Revenue(r) => r,
        _ => &[],
    }
}

fn acquisition_records(ds: &Dataset) -> &[AcquisitionMetrics] {
    match ds {
        Dataset::Acquisition(r) => r,
        _ => &[],
    }
}

fn retention_records(ds: &Dataset) -> &[RetentionCohort] {
    match ds {
        Dataset::Retention(r) => r,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pulseboard_generator::DEFAULT_SEED;

    fn dashboard() -> Dashboard {
        let anchor = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        Dashboard::with_generator(
            SyntheticMetricsGenerator::anchored(DEFAULT_SEED, anchor),
            &AppConfig::default(),
        )
    }

    #[test]
    fn test_duration_label() {
        assert_eq!(duration_label(0.0), "0m 0s");
        assert_eq!(duration_label(299.9), "4m 59s");
        assert_eq!(duration_label(420.0), "7m 0s");
    }

    #[test]
    fn test_daily_view() {
        let view = dashboard().daily();
        assert_eq!(view.daily.row_count(), 30);
        assert_eq!(view.hourly.row_count(), 24);
        assert!(view.kpis.total_users <= view.kpis.total_sessions);
        assert!((0.35..=0.55).contains(&view.kpis.avg_bounce_rate));
        assert!(view.sessions_delta.is_applicable());
        assert!(view.kpis.avg_duration_label.ends_with('s'));
    }

    #[test]
    fn test_weekly_view() {
        let view = dashboard().weekly();
        // 28 days ending on a Sunday cover exactly four ISO weeks.
        assert_eq!(view.weeks.len(), 4);
        assert_eq!(view.weeks[3].label, "Week 42");
        assert_eq!(view.last_week_sessions, view.weeks[3].sessions);
        assert!(view.last_week_conversion_rate > 0.0 && view.last_week_conversion_rate < 0.05);
        assert!(view.sessions_wow.is_applicable());
    }

    #[test]
    fn test_monthly_view() {
        let view = dashboard().monthly();
        let labels: Vec<&str> = view.months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2026-07", "2026-08", "2026-09", "2026-10"]);
        let total: u64 = view.months.iter().map(|m| m.sessions).sum();
        let daily = dashboard().cache().get_or_compute(DatasetKind::Daily, 90);
        let expected: f64 = daily.series("sessions").unwrap().iter().sum();
        assert_eq!(total as f64, expected);
        assert_eq!(view.last_month_sessions, view.months[3].sessions);
    }

    #[test]
    fn test_monetization_view() {
        let view = dashboard().monetization();
        assert_eq!(view.recent.row_count(), 30);
        assert!(view.total_revenue > 90.0 * 5000.0);
        assert!(view.mrr >= 30.0 * 5000.0 && view.mrr < 30.0 * 15000.0);
        assert!(view.revenue_delta.is_applicable());
        assert_eq!(view.breakdown.len(), 5);
        assert_eq!(view.breakdown[2].product, "Enterprise");
    }

    #[test]
    fn test_acquisition_view() {
        let view = dashboard().acquisition();
        assert_eq!(view.channels.row_count(), 6);
        assert_eq!(view.paid_channels, vec!["Paid Search", "Social Media", "Email"]);
        assert!(view.organic_share > 0.0 && view.organic_share < 1.0);
        assert!(view.blended_cpa > 0.0);
    }

    #[test]
    fn test_retention_view() {
        let view = dashboard().retention();
        assert_eq!(view.cohorts.len(), 6);
        assert!(view.average.day_1 >= 65.0 && view.average.day_1 <= 75.0);
        assert!(view.average.day_90 >= 15.0 && view.average.day_90 <= 25.0);
    }

    #[test]
    fn test_views_share_cached_daily() {
        let dash = dashboard();
        dash.daily();
        dash.daily();
        // daily(30) + hourly
        assert_eq!(dash.cache().len(), 2);
        dash.weekly();
        assert_eq!(dash.cache().len(), 3);
        assert_eq!(dash.refresh(), 3);
        assert!(dash.cache().is_empty());
    }

    #[test]
    fn test_render_and_parse_view() {
        let dash = dashboard();
        for name in ["daily", "weekly", "monthly", "monetization", "acquisition", "retention"] {
            let view: DashboardView = name.parse().unwrap();
            let value = dash.render(view).unwrap();
            assert!(value.is_object());
        }
        assert!("custom".parse::<DashboardView>().is_err());
    }
}
