//! Percentage-change labels for KPI cards.

use serde::{Serialize, Serializer};
use std::fmt;

/// A percentage change, or the marker for an undefined change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Change(f64),
    NotApplicable,
}

impl Delta {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Delta::Change(p) => Some(*p),
            Delta::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Delta::Change(_))
    }

    fn between(curr: f64, prev: f64) -> Self {
        if prev == 0.0 {
            Delta::NotApplicable
        } else {
            Delta::Change((curr - prev) / prev * 100.0)
        }
    }
}

/// Explicit sign, one decimal: "+12.3%", "-4.0%"; "N/A" when undefined.
impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::Change(p) => write!(f, "{p:+.1}%"),
            Delta::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Compare the sum of the last `window` values with the `window` before it.
pub fn period_over_period(series: &[f64], window: usize) -> Delta {
    let Some(needed) = window.checked_mul(2) else {
        return Delta::NotApplicable;
    };
    if series.len() < needed {
        return Delta::NotApplicable;
    }
    let split = series.len() - window;
    let curr: f64 = series[split..].iter().sum();
    let prev: f64 = series[split - window..split].iter().sum();
    Delta::between(curr, prev)
}

pub fn format_period_over_period(series: &[f64], window: usize) -> String {
    period_over_period(series, window).to_string()
}

/// Week-over-week / month-over-month: last bucket against the one before it.
pub fn last_bucket_change(buckets: &[f64]) -> Delta {
    match buckets {
        [.., prev, last] => Delta::between(*last, *prev),
        _ => Delta::NotApplicable,
    }
}
