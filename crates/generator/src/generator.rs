//! Deterministic synthetic analytics data: daily traffic, hourly traffic,
//! revenue, acquisition channels, and retention cohorts.
//!
//! Every dataset call builds its own RNG from the configured seed, so the
//! output depends only on the size parameter, the seed, and the anchor date.

use chrono::{Datelike, Days, Duration, NaiveDate, Utc, Weekday};
use pulseboard_core::config::GeneratorConfig;
use pulseboard_core::types::{
    AcquisitionMetrics, DailyMetrics, Dataset, DatasetKind, HourlyMetrics, RetentionCohort,
    RevenueMetrics,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use tracing::{debug, warn};

pub const DEFAULT_SEED: u64 = 42;

const WEEKEND_FACTOR: f64 = 0.7;
const RETENTION_COHORTS: i64 = 6;

/// An acquisition channel and the ranges its rows are drawn from.
struct Channel {
    name: &'static str,
    users: Range<u64>,
    /// `None` for cost-free channels.
    cost_per_user: Option<Range<f64>>,
}

static CHANNELS: [Channel; 6] = [
    Channel {
        name: "Organic Search",
        users: 800..1200,
        cost_per_user: None,
    },
    Channel {
        name: "Paid Search",
        users: 600..900,
        cost_per_user: Some(35.0..55.0),
    },
    Channel {
        name: "Social Media",
        users: 300..600,
        cost_per_user: Some(25.0..45.0),
    },
    Channel {
        name: "Email",
        users: 200..400,
        cost_per_user: Some(5.0..15.0),
    },
    Channel {
        name: "Referral",
        users: 150..350,
        cost_per_user: None,
    },
    Channel {
        name: "Direct",
        users: 100..300,
        cost_per_user: None,
    },
];

/// Names of the channels that never carry acquisition cost.
pub fn cost_free_channels() -> impl Iterator<Item = &'static str> {
    CHANNELS
        .iter()
        .filter(|c| c.cost_per_user.is_none())
        .map(|c| c.name)
}

#[derive(Debug, Clone, Copy)]
pub struct SyntheticMetricsGenerator {
    seed: u64,
    anchor: Option<NaiveDate>,
}

impl SyntheticMetricsGenerator {
    /// Generator whose date buckets end on the current UTC date.
    pub fn new(seed: u64) -> Self {
        Self { seed, anchor: None }
    }

    /// Generator whose date buckets end on `anchor` instead of today.
    pub fn anchored(seed: u64, anchor: NaiveDate) -> Self {
        Self {
            seed,
            anchor: Some(anchor),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The date the generated time buckets end on.
    pub fn today(&self) -> NaiveDate {
        self.anchor.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// A fresh RNG at the start of the seeded stream.
    pub(crate) fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Dispatch by kind. `size` is ignored by the sizeless kinds.
    pub fn generate(&self, kind: DatasetKind, size: i64) -> Dataset {
        metrics::counter!("generator.datasets", "kind" => kind.as_str()).increment(1);
        debug!(kind = %kind, size = size, seed = self.seed, "Generating dataset");
        match kind {
            DatasetKind::Daily => self.generate_daily(size),
            DatasetKind::Hourly => self.generate_hourly(),
            DatasetKind::Revenue => self.generate_revenue(size),
            DatasetKind::Acquisition => self.generate_acquisition(),
            DatasetKind::Retention => self.generate_retention(),
        }
    }

    pub fn generate_daily(&self, days: i64) -> Dataset {
        let mut rng = self.rng();
        let records = self
            .trailing_dates(DatasetKind::Daily, days)
            .into_iter()
            .map(|date| {
                let base = 1000 + rng.gen_range(-200i64..300);
                let factor = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                    WEEKEND_FACTOR
                } else {
                    1.0
                };

                let sessions = (base as f64 * factor) as u64;
                let page_views = (sessions as f64 * rng.gen_range(2.5..4.5)) as u64;
                let users = (sessions as f64 * rng.gen_range(0.7..0.9)) as u64;
                let bounce_rate = rng.gen_range(0.35..0.55);
                let avg_duration = rng.gen_range(180.0..420.0);
                let conversions = (sessions as f64 * rng.gen_range(0.02..0.05)) as u64;

                DailyMetrics {
                    date,
                    sessions,
                    page_views,
                    users,
                    bounce_rate,
                    avg_duration,
                    conversions,
                }
            })
            .collect();

        Dataset::Daily(records)
    }

    pub fn generate_hourly(&self) -> Dataset {
        let mut rng = self.rng();
        let records = (0..24u32)
            .map(|hour| {
                let sessions = (100.0 * hour_factor(hour) * rng.gen_range(0.8..1.2)) as u64;
                let page_views = (sessions as f64 * rng.gen_range(2.0..4.0)) as u64;

                HourlyMetrics {
                    hour: format!("{hour:02}:00"),
                    sessions,
                    page_views,
                    users: (sessions as f64 * 0.8) as u64,
                }
            })
            .collect();

        Dataset::Hourly(records)
    }

    pub fn generate_revenue(&self, days: i64) -> Dataset {
        let mut rng = self.rng();
        let records = self
            .trailing_dates(DatasetKind::Revenue, days)
            .into_iter()
            .map(|date| {
                let revenue: f64 = rng.gen_range(5000.0..15000.0);
                let transactions = rng.gen_range(50u64..200);
                let paying_users = rng.gen_range(800u64..1200);
                let arpu = revenue / paying_users.max(1) as f64;
                let new_customers = rng.gen_range(20u64..80);
                let churn_rate = rng.gen_range(0.02..0.08);

                RevenueMetrics {
                    date,
                    revenue,
                    transactions,
                    arpu,
                    mrr: revenue * 30.0,
                    new_customers,
                    churn_rate,
                }
            })
            .collect();

        Dataset::Revenue(records)
    }

    pub fn generate_acquisition(&self) -> Dataset {
        let mut rng = self.rng();
        let records = CHANNELS
            .iter()
            .map(|channel| {
                let users = rng.gen_range(channel.users.clone());
                let cost = match &channel.cost_per_user {
                    Some(range) => users as f64 * rng.gen_range(range.clone()),
                    None => 0.0,
                };
                let cpa = if users > 0 { cost / users as f64 } else { 0.0 };

                AcquisitionMetrics {
                    channel: channel.name.to_string(),
                    users,
                    cost,
                    cpa,
                    conversion_rate: rng.gen_range(0.02..0.08),
                }
            })
            .collect();

        Dataset::Acquisition(records)
    }

    pub fn generate_retention(&self) -> Dataset {
        let mut rng = self.rng();
        let today = self.today();

        // Drawn newest cohort first, emitted oldest first.
        let mut records: Vec<RetentionCohort> = (0..RETENTION_COHORTS)
            .map(|i| {
                let month = today - Duration::days(30 * i);
                let cohort_size = rng.gen_range(800u64..1500);
                let size = cohort_size as f64;

                RetentionCohort {
                    cohort: month.format("%Y-%m").to_string(),
                    cohort_size,
                    day_1: size * rng.gen_range(0.65..=0.75),
                    day_7: size * rng.gen_range(0.45..=0.55),
                    day_30: size * rng.gen_range(0.25..=0.35),
                    day_90: size * rng.gen_range(0.15..=0.25),
                }
            })
            .collect();
        records.reverse();

        Dataset::Retention(records)
    }

    /// The last `days` calendar days ending on the anchor date, oldest first.
    fn trailing_dates(&self, kind: DatasetKind, days: i64) -> Vec<NaiveDate> {
        if days <= 0 {
            warn!(kind = %kind, days = days, "Non-positive size, returning empty dataset");
            return Vec::new();
        }
        // `days > 0` here, so the cast cannot wrap.
        let Some(start) = self.today().checked_sub_days(Days::new(days as u64 - 1)) else {
            warn!(
                kind = %kind,
                days = days,
                "Size reaches past the earliest date, returning empty dataset"
            );
            return Vec::new();
        };
        start.iter_days().take(days as usize).collect()
    }
}

impl Default for SyntheticMetricsGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Relative traffic level for an hour of the day.
fn hour_factor(hour: u32) -> f64 {
    match hour {
        0..=6 => 0.3,
        7..=9 => 0.8,
        10..=17 => 1.0,
        18..=22 => 0.9,
        _ => 0.5,
    }
}
