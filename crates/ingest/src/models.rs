use crate::error::IngestError;
use core_types::{Record, RecordSet, Value};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::str::FromStr;

fn json_number(column: &str, number: &serde_json::Number) -> Result<Value, IngestError> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Value::Number)
        .map_err(|_| {
            IngestError::Shape(format!("field '{}' holds {} which is not a decimal", column, text))
        })
}

fn json_to_value(column: &str, json: &Json) -> Result<Value, IngestError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Text(b.to_string())),
        Json::Number(n) => json_number(column, n),
        Json::String(s) => Ok(Value::Text(s.clone())),
        Json::Array(_) | Json::Object(_) => Err(IngestError::Shape(format!(
            "field '{}' is nested and cannot be a column",
            column
        ))),
    }
}

fn as_object(index: usize, json: Json) -> Result<Map<String, Json>, IngestError> {
    match json {
        Json::Object(map) => Ok(map),
        other => Err(IngestError::Shape(format!(
            "model {} serialized to {} instead of an object",
            index,
            match other {
                Json::Array(_) => "an array",
                _ => "a scalar",
            }
        ))),
    }
}

/// Turns a list of same-typed models into a record set.
///
/// Each model is serialized to an object whose fields become the columns, in
/// declaration order. Every model must produce the same fields.
pub fn from_models<T: Serialize>(models: &[T]) -> Result<RecordSet, IngestError> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::with_capacity(models.len());

    for (index, model) in models.iter().enumerate() {
        let object = as_object(index, serde_json::to_value(model)?)?;
        let columns = columns.get_or_insert_with(|| object.keys().cloned().collect());

        if object.len() != columns.len() {
            return Err(IngestError::Shape(format!(
                "model {} has {} fields but the first model has {}",
                index,
                object.len(),
                columns.len()
            )));
        }

        let mut values = Vec::with_capacity(columns.len());
        for column in columns.iter() {
            let json = object.get(column).ok_or_else(|| {
                IngestError::Shape(format!("model {} has no field '{}'", index, column))
            })?;
            values.push(json_to_value(column, json)?);
        }
        rows.push(Record::new(values));
    }

    Ok(RecordSet::new(columns.unwrap_or_default(), rows)?)
}
