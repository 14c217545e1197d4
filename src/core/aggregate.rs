//! Summary metrics over record sets
//!
//! Pure aggregation functions behind the dashboard rollups: counts,
//! percentages, averages, and the one overdue rule shared by every
//! register. Empty inputs yield 0 rather than an error so summary cards
//! stay renderable before data loads.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::record::Record;

/// Total record count
pub fn count(records: &[Record]) -> usize {
    records.len()
}

/// Count of records matching a sub-predicate
pub fn count_where<F>(records: &[Record], predicate: F) -> usize
where
    F: Fn(&Record) -> bool,
{
    records.iter().filter(|r| predicate(r)).count()
}

/// Share of records matching the predicate, in [0, 100].
///
/// Defined as 0 for an empty record set.
pub fn percentage<F>(records: &[Record], predicate: F) -> f64
where
    F: Fn(&Record) -> bool,
{
    if records.is_empty() {
        return 0.0;
    }
    100.0 * count_where(records, predicate) as f64 / records.len() as f64
}

/// Arithmetic mean of a numeric field across the records that define it.
///
/// Records without the field are skipped, not treated as zero. Returns 0
/// when no record defines the field.
pub fn average(records: &[Record], field: &str) -> f64 {
    let values: Vec<f64> = records.iter().filter_map(|r| r.number(field)).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Count of records whose date field is strictly before `now` and whose
/// status is not terminal.
///
/// This is the single overdue rule for the whole toolkit. Terminal status
/// comparison is case-insensitive; a record with no status counts when its
/// date is past, a record with no date never counts.
pub fn overdue_count(
    records: &[Record],
    date_field: &str,
    terminal_statuses: &[&str],
    now: NaiveDate,
) -> usize {
    records
        .iter()
        .filter(|r| {
            let Some(date) = r.date(date_field) else {
                return false;
            };
            if date >= now {
                return false;
            }
            match r.category("status") {
                Some(status) => !terminal_statuses
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(status)),
                None => true,
            }
        })
        .count()
}

/// Record counts per value of a categorical field, lowercased.
///
/// Records without the field are omitted from the map.
pub fn counts_by_category(records: &[Record], field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(value) = record.category(field) {
            *counts.entry(value.to_lowercase()).or_insert(0) += 1;
        }
    }
    counts
}

/// Direction of change for a metric against its comparison point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// A derived statistic shown on a dashboard summary card
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetric {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl SummaryMetric {
    /// A plain count metric
    pub fn count(label: impl Into<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            value: value as f64,
            trend: None,
        }
    }

    /// A percentage metric, rounded to one decimal place
    pub fn percent(label: impl Into<String>, value: f64) -> Self {
        Self::measure(label, value)
    }

    /// A general numeric metric (average, score), rounded to one decimal place
    pub fn measure(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: (value * 10.0).round() / 10.0,
            trend: None,
        }
    }

    /// Attach a trend indicator
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new("R1")
                .with_category("status", "Open")
                .with_category("severity", "Critical")
                .with_date("due_date", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            Record::new("R2")
                .with_category("status", "Completed")
                .with_category("severity", "High")
                .with_date("due_date", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        ]
    }

    #[test]
    fn test_overdue_count_exempts_terminal_status() {
        let records = sample_records();
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        // R2 is past due but completed; only R1 counts
        assert_eq!(overdue_count(&records, "due_date", &["completed"], now), 1);
    }

    #[test]
    fn test_overdue_count_ignores_future_dates() {
        let records = sample_records();
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // R1 due 2024-01-05 is not yet overdue; R2 due today is not strictly past
        assert_eq!(overdue_count(&records, "due_date", &["completed"], now), 0);
    }

    #[test]
    fn test_overdue_count_missing_date_never_counts() {
        let records = vec![Record::new("R1").with_category("status", "open")];
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(overdue_count(&records, "due_date", &[], now), 0);
    }

    #[test]
    fn test_percentage_half_critical() {
        let records = sample_records();
        let pct = percentage(&records, |r| {
            r.category("severity")
                .is_some_and(|s| s.eq_ignore_ascii_case("critical"))
        });
        assert_eq!(pct, 50.0);
    }

    #[test]
    fn test_percentage_empty_is_zero() {
        assert_eq!(percentage(&[], |_| true), 0.0);
    }

    #[test]
    fn test_percentage_is_monotonic_in_matches() {
        let mut records = sample_records();
        let is_critical = |r: &Record| {
            r.category("severity")
                .is_some_and(|s| s.eq_ignore_ascii_case("critical"))
        };
        let before = percentage(&records, is_critical);
        records.push(
            Record::new("R3").with_category("severity", "critical"),
        );
        let after = percentage(&records, is_critical);
        assert!(after >= before);
    }

    #[test]
    fn test_average_skips_records_without_field() {
        let records = vec![
            Record::new("P1").with_number("progress", 100.0),
            Record::new("P2").with_number("progress", 50.0),
            Record::new("P3"),
        ];
        assert_eq!(average(&records, "progress"), 75.0);
        assert_eq!(average(&records, "risk_score"), 0.0);
    }

    #[test]
    fn test_counts_by_category_lowercases_values() {
        let records = vec![
            Record::new("I1").with_category("severity", "High"),
            Record::new("I2").with_category("severity", "high"),
            Record::new("I3").with_category("severity", "Low"),
            Record::new("I4"),
        ];
        let counts = counts_by_category(&records, "severity");
        assert_eq!(counts.get("high"), Some(&2));
        assert_eq!(counts.get("low"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_count_where() {
        let records = sample_records();
        assert_eq!(count(&records), 2);
        assert_eq!(
            count_where(&records, |r| r
                .category("status")
                .is_some_and(|s| s.eq_ignore_ascii_case("open"))),
            1
        );
    }

    #[test]
    fn test_summary_metric_rounding() {
        let metric = SummaryMetric::percent("implemented", 66.666);
        assert_eq!(metric.value, 66.7);
        assert!(metric.trend.is_none());
    }
}
