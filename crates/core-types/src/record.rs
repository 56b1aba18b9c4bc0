use crate::dates::parse_timestamp;
use crate::error::CoreError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A single scalar cell of a record set.
///
/// The derived ordering (variant first, then payload) lets any value act as a
/// grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Number(Decimal),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reads the value as a decimal. `Null` yields `None`; text is parsed.
    pub fn as_decimal(&self, column: &str) -> Result<Option<Decimal>, CoreError> {
        match self {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            Value::Text(s) => Decimal::from_str(s.trim())
                .map(Some)
                .map_err(|_| CoreError::InputType(column.to_string(), format!("'{}' is not a number", s))),
            Value::Timestamp(ts) => Err(CoreError::InputType(
                column.to_string(),
                format!("timestamp {} is not a number", ts),
            )),
        }
    }

    /// Reads a value that has already been through date normalization.
    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Decimal::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Decimal::from(value))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

/// One row of a record set. Cells are positional and line up with the owning
/// set's column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered sequence of uniform-width records sharing one column list.
///
/// Record sets are never mutated by the analytics; every transformation returns
/// a new set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl RecordSet {
    /// Creates a record set, rejecting duplicate column names and rows whose
    /// width differs from the column list.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Result<Self, CoreError> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(CoreError::InvalidArgument(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(CoreError::InvalidArgument(format!(
                "row {} has {} values but the record set has {} columns",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor from string column names and raw value rows.
    pub fn from_rows<C, R>(columns: &[C], rows: R) -> Result<Self, CoreError>
    where
        C: AsRef<str>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows.into_iter().map(Record::new).collect(),
        )
    }

    /// An empty set with the same columns.
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Looks up a column that the caller cannot proceed without.
    pub fn require_column(&self, name: &str) -> Result<usize, CoreError> {
        self.column_index(name).ok_or_else(|| {
            CoreError::InvalidArgument(format!(
                "record set has no column '{}' (available: {})",
                name,
                self.columns.join(", ")
            ))
        })
    }

    /// Iterates the values of one column in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Value>, CoreError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row.values[idx]))
    }

    /// Keeps the rows for which `keep` returns true, preserving their order.
    pub fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Returns a copy whose `column` holds only `Timestamp` or `Null` values.
    ///
    /// This is the single point where text dates are parsed; everything
    /// downstream compares canonical timestamps.
    pub fn normalize_dates(&self, column: &str) -> Result<Self, CoreError> {
        let idx = self.require_column(column)?;

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let normalized = match &row.values[idx] {
                Value::Null => Value::Null,
                Value::Timestamp(ts) => Value::Timestamp(*ts),
                Value::Text(s) if s.trim().is_empty() => Value::Null,
                Value::Text(s) => Value::Timestamp(parse_timestamp(s).map_err(|_| {
                    CoreError::InputType(
                        column.to_string(),
                        format!("'{}' cannot be interpreted as a date", s),
                    )
                })?),
                Value::Number(n) => {
                    return Err(CoreError::InputType(
                        column.to_string(),
                        format!("number {} cannot be interpreted as a date", n),
                    ));
                }
            };

            let mut values = row.values.clone();
            values[idx] = normalized;
            rows.push(Record::new(values));
        }

        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }
}
