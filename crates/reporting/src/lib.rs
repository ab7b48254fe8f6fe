//! Dashboard reporting: KPI deltas, weekly/monthly rollups, cohort retention
//! rates, view assembly, and table export.

pub mod cohort;
pub mod dashboard;
pub mod delta;
pub mod export;
pub mod rollup;

pub use dashboard::{Dashboard, DashboardView};
pub use delta::{format_period_over_period, last_bucket_change, period_over_period, Delta};
pub use export::{export_csv, export_json};
