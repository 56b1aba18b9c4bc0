use crate::error::AnalyticsError;
use core_types::{DateSelector, RecordSet};

/// Narrows a record set to the rows whose date falls on the selected days.
///
/// With no selector the input is returned unchanged. Otherwise the date column
/// of a working copy is normalized first, and the returned set carries the
/// normalized timestamps. Rows with an empty date never match. Only the calendar
/// day is compared, never the time of day.
pub fn filter_rows_by_date(
    records: &RecordSet,
    date_column: &str,
    selector: Option<&DateSelector>,
) -> Result<RecordSet, AnalyticsError> {
    let Some(selector) = selector else {
        return Ok(records.clone());
    };

    let working = records.normalize_dates(date_column)?;
    let idx = working.require_column(date_column)?;

    let filtered = working.retain_rows(|row| {
        row.get(idx)
            .and_then(|value| value.as_timestamp())
            .is_some_and(|ts| selector.matches(ts.date()))
    });

    tracing::debug!(
        column = date_column,
        before = records.len(),
        after = filtered.len(),
        "Filtered records by date"
    );

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CoreError, Value, parse_date};

    fn daily_sales() -> RecordSet {
        RecordSet::from_rows(
            &["id", "date"],
            (1..=5).map(|day| {
                vec![
                    Value::from(day),
                    Value::from(format!("2024-01-0{} 1{}:30:00", day, day)),
                ]
            }),
        )
        .unwrap()
    }

    fn selector(dates: &[&str]) -> Option<DateSelector> {
        DateSelector::from_strs(dates).unwrap()
    }

    fn ids(records: &RecordSet) -> Vec<String> {
        records
            .column_values("id")
            .unwrap()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_no_selector_returns_input_unchanged() {
        let records = daily_sales();
        let filtered = filter_rows_by_date(&records, "date", None).unwrap();
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_single_date_ignores_time_of_day() {
        let records = daily_sales();
        let filtered =
            filter_rows_by_date(&records, "date", selector(&["2024-01-03"]).as_ref()).unwrap();
        assert_eq!(ids(&filtered), vec!["3"]);
    }

    #[test]
    fn test_interval_is_inclusive() {
        let records = daily_sales();
        let all = filter_rows_by_date(
            &records,
            "date",
            selector(&["2024-01-01", "2024-01-05"]).as_ref(),
        )
        .unwrap();
        assert_eq!(all.len(), 5);

        let middle = filter_rows_by_date(
            &records,
            "date",
            selector(&["2024-01-02", "2024-01-04"]).as_ref(),
        )
        .unwrap();
        assert_eq!(ids(&middle), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_reversed_interval_is_positional_and_matches_nothing() {
        let records = daily_sales();
        let filtered = filter_rows_by_date(
            &records,
            "date",
            selector(&["2024-01-05", "2024-01-01"]).as_ref(),
        )
        .unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.columns(), records.columns());
    }

    #[test]
    fn test_more_than_two_dates_is_set_membership() {
        let records = daily_sales();
        let filtered = filter_rows_by_date(
            &records,
            "date",
            selector(&["2024-01-05", "2024-01-01", "2024-01-03"]).as_ref(),
        )
        .unwrap();
        // Membership keeps input order, not selector order.
        assert_eq!(ids(&filtered), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_rows_without_a_date_never_match() {
        let records = RecordSet::from_rows(
            &["id", "date"],
            vec![
                vec![Value::from(1), Value::Null],
                vec![Value::from(2), Value::from("2024-01-01")],
            ],
        )
        .unwrap();
        let day = DateSelector::single(parse_date("2024-01-01").unwrap());
        let filtered = filter_rows_by_date(&records, "date", Some(&day)).unwrap();
        assert_eq!(ids(&filtered), vec!["2"]);
    }

    #[test]
    fn test_unparseable_date_is_an_input_type_error() {
        let records = RecordSet::from_rows(
            &["id", "date"],
            vec![vec![Value::from(1), Value::from("first of january")]],
        )
        .unwrap();
        let err = filter_rows_by_date(&records, "date", selector(&["2024-01-01"]).as_ref())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Core(CoreError::InputType(_, _))));
    }

    #[test]
    fn test_missing_date_column_is_an_invalid_argument() {
        let records = daily_sales();
        let err = filter_rows_by_date(&records, "sold_at", selector(&["2024-01-01"]).as_ref())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Core(CoreError::InvalidArgument(_))));
    }
}
