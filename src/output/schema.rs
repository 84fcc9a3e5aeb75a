//! Arrow schema inference and record to Arrow conversion
//!
//! Records are flat JSON objects whose values may still be nested. Nested
//! objects and arrays are written as JSON text; scalar columns keep a native
//! Arrow type when every value in the column agrees.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Column stamped on every row with the time the run was written
pub const LOADED_AT_COLUMN: &str = "_etl_loaded_at";

/// Infer an Arrow schema from a set of records
///
/// Columns appear in first-seen order. All fields are nullable; a column
/// holding only nulls is typed as a string. The loaded-at column is never
/// part of the inferred schema.
pub fn infer_schema(records: &[Record]) -> Schema {
    let mut order: Vec<String> = Vec::new();
    let mut field_types: HashMap<String, DataType> = HashMap::new();

    for record in records {
        for (key, value) in record {
            if key == LOADED_AT_COLUMN {
                continue;
            }
            let inferred_type = infer_type(value);
            match field_types.get_mut(key) {
                Some(existing) => *existing = merge_types(existing, &inferred_type),
                None => {
                    order.push(key.clone());
                    field_types.insert(key.clone(), inferred_type);
                }
            }
        }
    }

    let fields: Vec<Field> = order
        .into_iter()
        .map(|name| {
            let dtype = match field_types.remove(&name) {
                Some(DataType::Null) | None => DataType::Utf8,
                Some(dtype) => dtype,
            };
            Field::new(name, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Type of the loaded-at column
pub fn loaded_at_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Convert records to an Arrow RecordBatch
///
/// The batch carries every inferred column followed by the loaded-at column,
/// set to `loaded_at` on every row.
pub fn records_to_batch(records: &[Record], loaded_at: DateTime<Utc>) -> Result<RecordBatch> {
    let inferred = infer_schema(records);

    let mut fields: Vec<Field> = Vec::with_capacity(inferred.fields().len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(inferred.fields().len() + 1);

    for field in inferred.fields() {
        let values: Vec<Option<&JsonValue>> = records
            .iter()
            .map(|record| record.get(field.name()).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_array(&values, field.data_type()));
        fields.push(field.as_ref().clone());
    }

    let stamp = vec![loaded_at.timestamp_micros(); records.len()];
    columns.push(Arc::new(
        TimestampMicrosecondArray::from(stamp).with_timezone("UTC"),
    ));
    fields.push(Field::new(LOADED_AT_COLUMN, loaded_at_type(), false));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_bool))
                .collect();
            Arc::new(arr)
        }

        DataType::Int64 => {
            let arr: Int64Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64))
                .collect();
            Arc::new(arr)
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_f64))
                .collect();
            Arc::new(arr)
        }

        // Strings stay raw, everything else is JSON text
        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Arc::new(arr)
        }
    }
}
