use crate::enums::RangeOrder;
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp layouts accepted on ingestion, tried in order.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a calendar date in the strict `YYYY-MM-DD` layout.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::InputType(
            "date".to_string(),
            format!("'{}' is not a valid date, use the format 'YYYY-MM-DD'", value),
        )
    })
}

/// Parses a timestamp in any of the layouts the record sets are known to carry.
///
/// A bare `YYYY-MM-DD` is read as midnight. RFC 3339 values keep their wall-clock
/// time in the offset they were written in.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, CoreError> {
    let trimmed = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(CoreError::InputType(
        "timestamp".to_string(),
        format!("'{}' cannot be interpreted as a date", value),
    ))
}

/// A caller-specified date filter.
///
/// Only the calendar day is ever compared; time-of-day is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSelector {
    /// Exactly one calendar day.
    Single { date: NaiveDate },
    /// A closed interval. `start` and `end` are positional and are not reordered.
    Interval { start: NaiveDate, end: NaiveDate },
    /// Set membership over an explicit list of days.
    Dates { dates: Vec<NaiveDate> },
}

impl DateSelector {
    pub fn single(date: NaiveDate) -> Self {
        DateSelector::Single { date }
    }

    pub fn interval(start: NaiveDate, end: NaiveDate) -> Self {
        DateSelector::Interval { start, end }
    }

    /// Builds a selector from a list the way callers supply it: one date selects
    /// that day, two dates form an interval, more than two are matched exactly.
    /// An empty list selects nothing and yields `None`.
    pub fn from_dates(dates: Vec<NaiveDate>) -> Option<Self> {
        match dates.len() {
            0 => None,
            1 => Some(DateSelector::single(dates[0])),
            2 => Some(DateSelector::interval(dates[0], dates[1])),
            _ => Some(DateSelector::Dates { dates }),
        }
    }

    /// Parses caller-supplied strings into a selector. Each entry may be a plain
    /// date or a full timestamp; only its date component is kept.
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Result<Option<Self>, CoreError> {
        let mut dates = Vec::with_capacity(values.len());
        for value in values {
            let ts = parse_timestamp(value.as_ref()).map_err(|_| {
                CoreError::InputType(
                    "date selector".to_string(),
                    format!("'{}' cannot be interpreted as a date", value.as_ref()),
                )
            })?;
            dates.push(ts.date());
        }
        Ok(Self::from_dates(dates))
    }

    /// Whether the given calendar day is selected.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DateSelector::Single { date: day } => *day == date,
            DateSelector::Interval { start, end } => *start <= date && date <= *end,
            DateSelector::Dates { dates } => dates.contains(&date),
        }
    }

    /// True for an interval whose start falls after its end.
    pub fn is_reversed(&self) -> bool {
        matches!(self, DateSelector::Interval { start, end } if start > end)
    }

    /// Resolves a reversed interval according to the given policy. Any other
    /// selector is returned untouched.
    pub fn apply_range_order(self, order: RangeOrder) -> Result<Self, CoreError> {
        match self {
            DateSelector::Interval { start, end } if start > end => match order {
                RangeOrder::Literal => Ok(self),
                RangeOrder::Swap => {
                    tracing::debug!(%start, %end, "Swapping reversed date interval");
                    Ok(DateSelector::interval(end, start))
                }
                RangeOrder::Reject => Err(CoreError::InvalidArgument(format!(
                    "date interval starts on {} which is after its end {}",
                    start, end
                ))),
            },
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date_strict_format() {
        assert_eq!(day("2024-01-31"), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        let err = parse_date("31/01/2024").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let plain = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(plain.hour(), 0);

        let spaced = parse_timestamp("2024-03-05 14:30:00").unwrap();
        assert_eq!(spaced.hour(), 14);

        let iso = parse_timestamp("2024-03-05T09:15:30.250").unwrap();
        assert_eq!(iso.minute(), 15);

        let offset = parse_timestamp("2024-03-05T23:10:00-03:00").unwrap();
        assert_eq!(offset.date(), day("2024-03-05"));
        assert_eq!(offset.hour(), 23);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, CoreError::InputType(_, _)));
    }

    #[test]
    fn test_from_strs_by_length() {
        assert_eq!(DateSelector::from_strs::<&str>(&[]).unwrap(), None);
        assert_eq!(
            DateSelector::from_strs(&["2024-01-01"]).unwrap(),
            Some(DateSelector::single(day("2024-01-01")))
        );
        assert_eq!(
            DateSelector::from_strs(&["2024-01-05", "2024-01-01"]).unwrap(),
            Some(DateSelector::interval(day("2024-01-05"), day("2024-01-01")))
        );
        assert!(matches!(
            DateSelector::from_strs(&["2024-01-01", "2024-01-03", "2024-01-09"]).unwrap(),
            Some(DateSelector::Dates { ref dates }) if dates.len() == 3
        ));
    }

    #[test]
    fn test_from_strs_reports_offending_value() {
        let err = DateSelector::from_strs(&["2024-01-01", "not-a-date"]).unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_matches_ignores_nothing_but_the_day() {
        let interval = DateSelector::interval(day("2024-01-02"), day("2024-01-04"));
        assert!(!interval.matches(day("2024-01-01")));
        assert!(interval.matches(day("2024-01-02")));
        assert!(interval.matches(day("2024-01-04")));
        assert!(!interval.matches(day("2024-01-05")));

        let reversed = DateSelector::interval(day("2024-01-04"), day("2024-01-02"));
        assert!(!reversed.matches(day("2024-01-03")));
    }

    #[test]
    fn test_apply_range_order_policies() {
        let reversed = DateSelector::interval(day("2024-01-05"), day("2024-01-01"));
        assert!(reversed.is_reversed());

        assert_eq!(
            reversed.clone().apply_range_order(RangeOrder::Literal).unwrap(),
            reversed
        );
        assert_eq!(
            reversed.clone().apply_range_order(RangeOrder::Swap).unwrap(),
            DateSelector::interval(day("2024-01-01"), day("2024-01-05"))
        );
        assert!(matches!(
            reversed.apply_range_order(RangeOrder::Reject),
            Err(CoreError::InvalidArgument(_))
        ));

        let ordered = DateSelector::single(day("2024-01-01"));
        assert_eq!(ordered.clone().apply_range_order(RangeOrder::Reject).unwrap(), ordered);
    }
}
