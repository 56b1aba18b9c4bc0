use core_types::{CoreError, DateSelector, Record, RecordSet, Value};
use rust_decimal::Decimal;
use serde::Serialize;

/// Totals and counts per time bucket, as parallel sequences aligned by index.
///
/// Buckets with no records are absent rather than zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    pub labels: Vec<String>,
    pub totals: Vec<Decimal>,
    pub counts: Vec<usize>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum of the counts over all buckets.
    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal, usize)> {
        self.labels
            .iter()
            .zip(&self.totals)
            .zip(&self.counts)
            .map(|((label, total), count)| (label.as_str(), *total, *count))
    }
}

/// Group keys and their summed values in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub keys: Vec<Value>,
    pub values: Vec<Decimal>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, Decimal)> {
        self.keys.iter().zip(self.values.iter().copied())
    }

    /// Turns the ranking back into a two-column record set, one row per entry.
    pub fn to_record_set(&self, key_column: &str, value_column: &str) -> Result<RecordSet, CoreError> {
        let rows = self
            .iter()
            .map(|(key, value)| Record::new(vec![key.clone(), Value::Number(value)]))
            .collect();
        RecordSet::new(vec![key_column.to_string(), value_column.to_string()], rows)
    }
}

/// A standardized sales report handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    pub selector: Option<DateSelector>,
    pub total_revenue: Decimal,
    pub expenditure: Decimal,
    pub profit: Decimal,
    pub top_selling: Ranking,
    pub top_profitable: Ranking,
    pub sales_per_weekday: AggregationResult,
    pub sales_per_hour: AggregationResult,
}
