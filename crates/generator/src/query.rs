//! Mock query console. Statements are never executed: the text is checked for
//! a leading `SELECT` and keyword-matched to one of three canned tables.

use crate::generator::SyntheticMetricsGenerator;
use chrono::{Datelike, Duration, NaiveDate};
use pulseboard_core::error::{PulseError, PulseResult};
use pulseboard_core::types::DataTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

pub const SAMPLE_QUERIES: &[(&str, &str)] = &[
    (
        "Daily Sessions",
        "SELECT
    DATE(start_time) as date,
    COUNT(*) as sessions,
    COUNT(DISTINCT user_id) as unique_users,
    AVG(duration_seconds) as avg_duration
FROM user_sessions
WHERE start_time >= CURRENT_DATE - INTERVAL '30 days'
GROUP BY DATE(start_time)
ORDER BY date DESC;",
    ),
    (
        "Revenue by Product",
        "SELECT
    product_id,
    COUNT(*) as transactions,
    SUM(amount) as total_revenue,
    AVG(amount) as avg_transaction_value
FROM revenue_events
WHERE created_at >= CURRENT_DATE - INTERVAL '7 days'
GROUP BY product_id
ORDER BY total_revenue DESC
LIMIT 10;",
    ),
    (
        "User Retention",
        "SELECT
    DATE_TRUNC('month', signup_date) as cohort_month,
    COUNT(*) as cohort_size,
    COUNT(CASE WHEN last_active >= signup_date + INTERVAL '1 day' THEN 1 END) as day_1_retained
FROM user_metrics
WHERE signup_date >= CURRENT_DATE - INTERVAL '6 months'
GROUP BY DATE_TRUNC('month', signup_date)
ORDER BY cohort_month DESC;",
    ),
];

/// Look up a sample query by name, ignoring case.
pub fn sample_query(name: &str) -> Option<&'static str> {
    SAMPLE_QUERIES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|(_, sql)| *sql)
}

/// Which canned table a statement was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockTable {
    Sessions,
    ProductRevenue,
    Retention,
}

impl MockTable {
    fn classify(sql: &str) -> Self {
        let lower = sql.to_lowercase();
        if lower.contains("user_sessions") {
            MockTable::Sessions
        } else if lower.contains("revenue") {
            MockTable::ProductRevenue
        } else {
            MockTable::Retention
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub matched: MockTable,
    pub table: DataTable,
    pub rows_returned: usize,
    pub execution_time_ms: u64,
}

pub struct QueryConsole {
    generator: SyntheticMetricsGenerator,
}

impl QueryConsole {
    pub fn new(generator: SyntheticMetricsGenerator) -> Self {
        Self { generator }
    }

    /// Only `SELECT` statements pass.
    pub fn validate(&self, sql: &str) -> PulseResult<()> {
        let head = sql.trim_start();
        let is_select = head
            .get(..6)
            .is_some_and(|kw| kw.eq_ignore_ascii_case("select"));
        if is_select {
            Ok(())
        } else {
            warn!("Rejected non-SELECT statement");
            Err(PulseError::Query(
                "Only SELECT queries are allowed".to_string(),
            ))
        }
    }

    pub fn execute(&self, sql: &str) -> PulseResult<QueryResult> {
        self.validate(sql)?;

        let matched = MockTable::classify(sql);
        let mut rng = self.generator.rng();
        let today = self.generator.today();

        let table = match matched {
            MockTable::Sessions => sessions_table(&mut rng, today),
            MockTable::ProductRevenue => product_revenue_table(&mut rng),
            MockTable::Retention => retention_table(&mut rng, today),
        };
        let execution_time_ms = rng.gen_range(150..800);

        debug!(matched = ?matched, rows = table.row_count(), "Mock query served");

        Ok(QueryResult {
            matched,
            rows_returned: table.row_count(),
            table,
            execution_time_ms,
        })
    }
}

fn draw_column<R: Rng>(rng: &mut R, n: usize, low: u64, high: u64) -> Vec<u64> {
    (0..n).map(|_| rng.gen_range(low..high)).collect()
}

fn sessions_table<R: Rng>(rng: &mut R, today: NaiveDate) -> DataTable {
    const ROWS: i64 = 10;
    let sessions = draw_column(rng, ROWS as usize, 800, 1500);
    let users = draw_column(rng, ROWS as usize, 600, 1200);
    let durations = draw_column(rng, ROWS as usize, 180, 420);

    let rows = (0..ROWS)
        .map(|i| {
            let date = today - Duration::days(ROWS - 1 - i);
            let i = i as usize;
            vec![
                json!(date.format("%Y-%m-%d").to_string()),
                json!(sessions[i]),
                json!(users[i]),
                json!(durations[i]),
            ]
        })
        .collect();

    DataTable {
        columns: columns(&["date", "sessions", "unique_users", "avg_duration"]),
        rows,
    }
}

fn product_revenue_table<R: Rng>(rng: &mut R) -> DataTable {
    const ROWS: usize = 10;
    let transactions = draw_column(rng, ROWS, 50, 200);
    let revenue = draw_column(rng, ROWS, 5000, 25000);
    let avg_value: Vec<f64> = (0..ROWS)
        .map(|_| (rng.gen_range(25.0..150.0_f64) * 100.0).round() / 100.0)
        .collect();

    let rows = (0..ROWS)
        .map(|i| {
            vec![
                json!(format!("PROD_{:03}", i + 1)),
                json!(transactions[i]),
                json!(revenue[i]),
                json!(avg_value[i]),
            ]
        })
        .collect();

    DataTable {
        columns: columns(&[
            "product_id",
            "transactions",
            "total_revenue",
            "avg_transaction_value",
        ]),
        rows,
    }
}

fn retention_table<R: Rng>(rng: &mut R, today: NaiveDate) -> DataTable {
    let months = trailing_month_ends(today, 6);
    let sizes = draw_column(rng, months.len(), 800, 1500);
    let retained = draw_column(rng, months.len(), 500, 1000);

    let rows = months
        .iter()
        .enumerate()
        .map(|(i, date)| {
            vec![
                json!(date.format("%Y-%m-%d").to_string()),
                json!(sizes[i]),
                json!(retained[i]),
            ]
        })
        .collect();

    DataTable {
        columns: columns(&["cohort_month", "cohort_size", "day_1_retained"]),
        rows,
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| c.to_string()).collect()
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// The `count` most recent month-end dates on or before `today`, oldest first.
fn trailing_month_ends(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let (mut year, mut month) = (today.year(), today.month());
    let mut ends = Vec::with_capacity(count);

    while ends.len() < count {
        if let Some(end) = month_end(year, month).filter(|end| *end <= today) {
            ends.push(end);
        }
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }

    ends.reverse();
    ends
}
