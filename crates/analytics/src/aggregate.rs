use crate::error::AnalyticsError;
use crate::filter::filter_rows_by_date;
use crate::report::AggregationResult;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use core_types::{DateSelector, RecordSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical weekday order. The position of a label is its sort rank.
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Sort rank of a weekday label (Monday = 0 ... Sunday = 6).
pub fn weekday_rank(label: &str) -> Option<usize> {
    WEEKDAY_ORDER.iter().position(|day| *day == label)
}

fn weekday_label(day: Weekday) -> &'static str {
    WEEKDAY_ORDER[day.num_days_from_monday() as usize]
}

/// A grouping key derived from a timestamp. Buckets are ordered by `rank`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Bucket {
    pub rank: i64,
    pub label: String,
}

/// The time buckets sales can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    /// Calendar day, labelled `YYYY-MM-DD`.
    Day,
    /// Hour of day, labelled `HH:00`.
    Hour,
    /// Day of week, labelled with its English name, Monday first.
    Weekday,
    /// Calendar month number, labelled `1` to `12`.
    Month,
    /// Calendar year, labelled `YYYY`.
    Year,
}

impl TimeBucket {
    pub fn bucket(&self, ts: &NaiveDateTime) -> Bucket {
        match self {
            TimeBucket::Day => Bucket {
                rank: i64::from(ts.date().num_days_from_ce()),
                label: ts.date().format("%Y-%m-%d").to_string(),
            },
            TimeBucket::Hour => Bucket {
                rank: i64::from(ts.hour()),
                label: format!("{:02}:00", ts.hour()),
            },
            TimeBucket::Weekday => {
                let label = weekday_label(ts.weekday());
                Bucket {
                    rank: weekday_rank(label).map_or(i64::MAX, |rank| rank as i64),
                    label: label.to_string(),
                }
            }
            TimeBucket::Month => Bucket {
                rank: i64::from(ts.month()),
                label: ts.month().to_string(),
            },
            TimeBucket::Year => Bucket {
                rank: i64::from(ts.year()),
                label: ts.year().to_string(),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Day => "day",
            TimeBucket::Hour => "hour",
            TimeBucket::Weekday => "weekday",
            TimeBucket::Month => "month",
            TimeBucket::Year => "year",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TimeBucket::Day),
            "hour" => Ok(TimeBucket::Hour),
            "weekday" => Ok(TimeBucket::Weekday),
            "month" => Ok(TimeBucket::Month),
            "year" => Ok(TimeBucket::Year),
            other => Err(format!(
                "unknown time bucket '{}', expected day, hour, weekday, month or year",
                other
            )),
        }
    }
}

/// Groups records by the bucket of their date and reduces each group to the sum
/// of `value_column` and the number of non-empty `id_column` entries.
///
/// Output is ordered by bucket rank. Records with an empty date are skipped and
/// empty values add nothing to the sum. An empty record set yields an empty
/// result.
pub fn aggregate_by_bucket<F>(
    records: &RecordSet,
    date_column: &str,
    bucket_fn: F,
    value_column: &str,
    id_column: &str,
) -> Result<AggregationResult, AnalyticsError>
where
    F: Fn(&NaiveDateTime) -> Bucket,
{
    let working = records.normalize_dates(date_column)?;
    let date_idx = working.require_column(date_column)?;
    let value_idx = working.require_column(value_column)?;
    let id_idx = working.require_column(id_column)?;

    let mut groups: BTreeMap<Bucket, (Decimal, usize)> = BTreeMap::new();
    for row in working.rows() {
        let Some(ts) = row.get(date_idx).and_then(|v| v.as_timestamp()) else {
            continue;
        };
        let value = match row.get(value_idx) {
            Some(v) => v.as_decimal(value_column)?.unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        };
        let has_id = row.get(id_idx).is_some_and(|v| !v.is_null());

        let (total, count) = groups.entry(bucket_fn(ts)).or_insert((Decimal::ZERO, 0));
        *total = total.checked_add(value).ok_or_else(|| {
            AnalyticsError::Calculation(format!("sum of '{}' overflowed", value_column))
        })?;
        if has_id {
            *count += 1;
        }
    }

    tracing::debug!(records = working.len(), buckets = groups.len(), "Aggregated records by bucket");

    let mut result = AggregationResult::default();
    for (bucket, (total, count)) in groups {
        result.labels.push(bucket.label);
        result.totals.push(total);
        result.counts.push(count);
    }
    Ok(result)
}

/// Filters sales by `selector`, then aggregates them per `bucket`.
pub fn sales_per(
    records: &RecordSet,
    bucket: TimeBucket,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    let filtered = filter_rows_by_date(records, date_column, selector)?;
    aggregate_by_bucket(
        &filtered,
        date_column,
        |ts| bucket.bucket(ts),
        total_value_column,
        id_column,
    )
}

pub fn sales_per_day(
    records: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    sales_per(records, TimeBucket::Day, total_value_column, date_column, id_column, selector)
}

pub fn sales_per_hour(
    records: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    sales_per(records, TimeBucket::Hour, total_value_column, date_column, id_column, selector)
}

pub fn sales_per_weekday(
    records: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    sales_per(records, TimeBucket::Weekday, total_value_column, date_column, id_column, selector)
}

pub fn sales_per_month(
    records: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    sales_per(records, TimeBucket::Month, total_value_column, date_column, id_column, selector)
}

pub fn sales_per_year(
    records: &RecordSet,
    total_value_column: &str,
    date_column: &str,
    id_column: &str,
    selector: Option<&DateSelector>,
) -> Result<AggregationResult, AnalyticsError> {
    sales_per(records, TimeBucket::Year, total_value_column, date_column, id_column, selector)
}
