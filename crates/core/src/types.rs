use crate::error::{PulseError, PulseResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// The kinds of synthetic dataset the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Daily,
    Hourly,
    Revenue,
    Acquisition,
    Retention,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Daily,
        DatasetKind::Hourly,
        DatasetKind::Revenue,
        DatasetKind::Acquisition,
        DatasetKind::Retention,
    ];

    /// Whether the size parameter changes the output of this kind.
    pub fn takes_size(&self) -> bool {
        matches!(self, DatasetKind::Daily | DatasetKind::Revenue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Daily => "daily",
            DatasetKind::Hourly => "hourly",
            DatasetKind::Revenue => "revenue",
            DatasetKind::Acquisition => "acquisition",
            DatasetKind::Retention => "retention",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(DatasetKind::Daily),
            "hourly" => Ok(DatasetKind::Hourly),
            "revenue" => Ok(DatasetKind::Revenue),
            "acquisition" => Ok(DatasetKind::Acquisition),
            "retention" | "cohort" => Ok(DatasetKind::Retention),
            other => Err(PulseError::UnknownDataset(other.to_string())),
        }
    }
}

/// A single row of a dataset: one bucket and its measured fields.
pub trait MetricRecord {
    /// Column names, bucket column first.
    const COLUMNS: &'static [&'static str];

    /// Cell values in `COLUMNS` order.
    fn values(&self) -> Vec<Value>;

    /// Numeric value of `field`, if the field exists and is numeric.
    fn numeric(&self, field: &str) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub sessions: u64,
    pub page_views: u64,
    pub users: u64,
    pub bounce_rate: f64,
    /// Seconds.
    pub avg_duration: f64,
    pub conversions: u64,
}

impl MetricRecord for DailyMetrics {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "sessions",
        "page_views",
        "users",
        "bounce_rate",
        "avg_duration",
        "conversions",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.date.format("%Y-%m-%d").to_string()),
            json!(self.sessions),
            json!(self.page_views),
            json!(self.users),
            json!(self.bounce_rate),
            json!(self.avg_duration),
            json!(self.conversions),
        ]
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "sessions" => Some(self.sessions as f64),
            "page_views" => Some(self.page_views as f64),
            "users" => Some(self.users as f64),
            "bounce_rate" => Some(self.bounce_rate),
            "avg_duration" => Some(self.avg_duration),
            "conversions" => Some(self.conversions as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyMetrics {
    /// "HH:00" label.
    pub hour: String,
    pub sessions: u64,
    pub page_views: u64,
    pub users: u64,
}

impl MetricRecord for HourlyMetrics {
    const COLUMNS: &'static [&'static str] = &["hour", "sessions", "page_views", "users"];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.hour),
            json!(self.sessions),
            json!(self.page_views),
            json!(self.users),
        ]
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "sessions" => Some(self.sessions as f64),
            "page_views" => Some(self.page_views as f64),
            "users" => Some(self.users as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transactions: u64,
    pub arpu: f64,
    /// Same-day revenue extrapolated to 30 days.
    pub mrr: f64,
    pub new_customers: u64,
    pub churn_rate: f64,
}

impl MetricRecord for RevenueMetrics {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "revenue",
        "transactions",
        "arpu",
        "mrr",
        "new_customers",
        "churn_rate",
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.date.format("%Y-%m-%d").to_string()),
            json!(self.revenue),
            json!(self.transactions),
            json!(self.arpu),
            json!(self.mrr),
            json!(self.new_customers),
            json!(self.churn_rate),
        ]
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "revenue" => Some(self.revenue),
            "transactions" => Some(self.transactions as f64),
            "arpu" => Some(self.arpu),
            "mrr" => Some(self.mrr),
            "new_customers" => Some(self.new_customers as f64),
            "churn_rate" => Some(self.churn_rate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionMetrics {
    pub channel: String,
    pub users: u64,
    pub cost: f64,
    pub cpa: f64,
    pub conversion_rate: f64,
}

impl MetricRecord for AcquisitionMetrics {
    const COLUMNS: &'static [&'static str] =
        &["channel", "users", "cost", "cpa", "conversion_rate"];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.channel),
            json!(self.users),
            json!(self.cost),
            json!(self.cpa),
            json!(self.conversion_rate),
        ]
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "users" => Some(self.users as f64),
            "cost" => Some(self.cost),
            "cpa" => Some(self.cpa),
            "conversion_rate" => Some(self.conversion_rate),
            _ => None,
        }
    }
}

/// Retained user counts per cohort. `day_n` values are absolute counts,
/// divide by `cohort_size` for rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionCohort {
    /// "YYYY-MM".
    pub cohort: String,
    pub cohort_size: u64,
    pub day_1: f64,
    pub day_7: f64,
    pub day_30: f64,
    pub day_90: f64,
}

impl MetricRecord for RetentionCohort {
    const COLUMNS: &'static [&'static str] =
        &["cohort", "cohort_size", "day_1", "day_7", "day_30", "day_90"];

    fn values(&self) -> Vec<Value> {
        vec![
            json!(self.cohort),
            json!(self.cohort_size),
            json!(self.day_1),
            json!(self.day_7),
            json!(self.day_30),
            json!(self.day_90),
        ]
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "cohort_size" => Some(self.cohort_size as f64),
            "day_1" => Some(self.day_1),
            "day_7" => Some(self.day_7),
            "day_30" => Some(self.day_30),
            "day_90" => Some(self.day_90),
            _ => None,
        }
    }
}

/// Ordered records from one generator call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum Dataset {
    Daily(Vec<DailyMetrics>),
    Hourly(Vec<HourlyMetrics>),
    Revenue(Vec<RevenueMetrics>),
    Acquisition(Vec<AcquisitionMetrics>),
    Retention(Vec<RetentionCohort>),
}

impl Dataset {
    pub fn empty(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Daily => Dataset::Daily(Vec::new()),
            DatasetKind::Hourly => Dataset::Hourly(Vec::new()),
            DatasetKind::Revenue => Dataset::Revenue(Vec::new()),
            DatasetKind::Acquisition => Dataset::Acquisition(Vec::new()),
            DatasetKind::Retention => Dataset::Retention(Vec::new()),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Daily(_) => DatasetKind::Daily,
            Dataset::Hourly(_) => DatasetKind::Hourly,
            Dataset::Revenue(_) => DatasetKind::Revenue,
            Dataset::Acquisition(_) => DatasetKind::Acquisition,
            Dataset::Retention(_) => DatasetKind::Retention,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Daily(r) => r.len(),
            Dataset::Hourly(r) => r.len(),
            Dataset::Revenue(r) => r.len(),
            Dataset::Acquisition(r) => r.len(),
            Dataset::Retention(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::Daily(_) => DailyMetrics::COLUMNS,
            Dataset::Hourly(_) => HourlyMetrics::COLUMNS,
            Dataset::Revenue(_) => RevenueMetrics::COLUMNS,
            Dataset::Acquisition(_) => AcquisitionMetrics::COLUMNS,
            Dataset::Retention(_) => RetentionCohort::COLUMNS,
        }
    }

    /// Values of a numeric column in dataset order.
    pub fn series(&self, field: &str) -> PulseResult<Vec<f64>> {
        let values = match self {
            Dataset::Daily(r) => series_of(r, field),
            Dataset::Hourly(r) => series_of(r, field),
            Dataset::Revenue(r) => series_of(r, field),
            Dataset::Acquisition(r) => series_of(r, field),
            Dataset::Retention(r) => series_of(r, field),
        };
        // An empty dataset still validates the field name against its columns.
        match values {
            Some(v) => Ok(v),
            None if self.is_empty() && self.columns().iter().skip(1).any(|c| *c == field) => {
                Ok(Vec::new())
            }
            None => Err(PulseError::UnknownField {
                kind: self.kind().to_string(),
                field: field.to_string(),
            }),
        }
    }

    pub fn to_table(&self) -> DataTable {
        match self {
            Dataset::Daily(r) => table_of(r),
            Dataset::Hourly(r) => table_of(r),
            Dataset::Revenue(r) => table_of(r),
            Dataset::Acquisition(r) => table_of(r),
            Dataset::Retention(r) => table_of(r),
        }
    }
}

fn series_of<R: MetricRecord>(records: &[R], field: &str) -> Option<Vec<f64>> {
    if records.is_empty() {
        return None;
    }
    records.iter().map(|r| r.numeric(field)).collect()
}

fn table_of<R: MetricRecord>(records: &[R]) -> DataTable {
    DataTable {
        columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: records.iter().map(R::values).collect(),
    }
}

/// Column names plus rows of JSON cells. The presentation-facing form of a
/// dataset or a mock query result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Keep only the trailing `n` rows.
    pub fn tail(&self, n: usize) -> DataTable {
        let skip = self.rows.len().saturating_sub(n);
        DataTable {
            columns: self.columns.clone(),
            rows: self.rows[skip..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(day: u32, sessions: u64) -> DailyMetrics {
        DailyMetrics {
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            sessions,
            page_views: sessions * 3,
            users: sessions / 2,
            bounce_rate: 0.4,
            avg_duration: 200.0,
            conversions: 10,
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("daily".parse::<DatasetKind>().unwrap(), DatasetKind::Daily);
        assert_eq!(" Revenue ".parse::<DatasetKind>().unwrap(), DatasetKind::Revenue);
        assert_eq!("cohort".parse::<DatasetKind>().unwrap(), DatasetKind::Retention);
        assert!(matches!(
            "weekly".parse::<DatasetKind>(),
            Err(PulseError::UnknownDataset(_))
        ));
    }

    #[test]
    fn test_takes_size() {
        assert!(DatasetKind::Daily.takes_size());
        assert!(DatasetKind::Revenue.takes_size());
        assert!(!DatasetKind::Hourly.takes_size());
        assert!(!DatasetKind::Retention.takes_size());
    }

    #[test]
    fn test_series_and_table() {
        let ds = Dataset::Daily(vec![daily(1, 100), daily(2, 200)]);
        assert_eq!(ds.kind(), DatasetKind::Daily);
        assert_eq!(ds.series("sessions").unwrap(), vec![100.0, 200.0]);
        assert!(matches!(
            ds.series("date"),
            Err(PulseError::UnknownField { .. })
        ));

        let table = ds.to_table();
        assert_eq!(table.columns[0], "date");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1][0], json!("2026-10-02"));
        assert_eq!(table.tail(1).rows[0][1], json!(200));
    }

    #[test]
    fn test_empty_dataset_series() {
        let ds = Dataset::empty(DatasetKind::Revenue);
        assert!(ds.is_empty());
        assert!(ds.series("revenue").unwrap().is_empty());
        assert!(ds.series("sessions").is_err());
        assert_eq!(ds.to_table().columns.len(), 7);
    }

    #[test]
    fn test_dataset_serializes_tagged() {
        let ds = Dataset::Daily(vec![daily(3, 50)]);
        let value = serde_json::to_value(&ds).unwrap();
        assert_eq!(value["kind"], json!("daily"));
        assert_eq!(value["records"][0]["date"], json!("2026-10-03"));
    }
}
