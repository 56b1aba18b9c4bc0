use crate::error::IngestError;
use core_types::{Record, RecordSet, Value};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// How a CSV export is laid out.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Interprets one cell: blank is `Null`, anything that parses as a decimal is a
/// `Number`, the rest stays `Text`. Codes written with leading zeros (`007`)
/// stay `Text` so that they keep their spelling and never merge with `7`.
/// Dates are left as text; the analytics normalize them when a date column is
/// first used.
fn infer_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if has_leading_zero(trimmed) {
        return Value::Text(trimmed.to_string());
    }
    match Decimal::from_str(trimmed) {
        Ok(number) => Value::Number(number),
        Err(_) => Value::Text(trimmed.to_string()),
    }
}

/// True for `0` followed by another digit, after an optional sign.
fn has_leading_zero(cell: &str) -> bool {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell).as_bytes();
    matches!(digits, [b'0', next, ..] if next.is_ascii_digit())
}

/// Reads a CSV document with a header row into a record set.
pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<RecordSet, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(Record::new(record.iter().map(infer_value).collect()));
    }

    Ok(RecordSet::new(columns, rows)?)
}

/// Opens and reads a CSV file into a record set.
pub fn load_csv(path: &Path, options: &CsvOptions) -> Result<RecordSet, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_csv(BufReader::new(file), options)?;

    tracing::debug!(
        path = %path.display(),
        rows = records.len(),
        columns = records.columns().len(),
        "Loaded CSV record set"
    );
    Ok(records)
}
