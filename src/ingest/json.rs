//! JSON parser
//!
//! Accepted layouts:
//! - an array of records (`[{"a": 1}, {"a": 2}]`); arrays and scalars as
//!   elements become positional columns `0, 1, ...`
//! - an object of columns, either `{"a": {"0": 1, "1": 2}}` or `{"a": [1, 2]}`
//! - a single record object
//! - newline-delimited records, one object per line
//!
//! Nested values inside a cell are kept as their JSON text.

use crate::ingest::ParseError;
use crate::table::{Cell, TableRows};
use serde_json::{Map, Value};
use std::collections::HashMap;

type Record = Vec<(String, Value)>;

/// Parses JSON text into a table
pub fn parse_json(raw: &str) -> Result<TableRows, ParseError> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            return match parse_json_lines(raw) {
                Some(result) => result,
                None => Err(ParseError::Json(err)),
            };
        }
    };

    let (columns, records) = match value {
        Value::Array(items) => (Vec::new(), items.into_iter().map(element_to_record).collect()),
        Value::Object(map) => object_to_records(map)?,
        other => {
            return Err(ParseError::Shape(format!(
                "expected an array or an object, found {}",
                type_name(&other)
            )))
        }
    };

    records_to_rows(columns, records)
}

/// Tries newline-delimited JSON; `None` unless every line is an object
fn parse_json_lines(raw: &str) -> Option<Result<TableRows, ParseError>> {
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return None;
    }

    let mut records = Vec::with_capacity(lines.len());
    for line in lines {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => records.push(map.into_iter().collect()),
            _ => return None,
        }
    }

    tracing::debug!("Parsed input as newline-delimited JSON");
    Some(records_to_rows(Vec::new(), records))
}

fn element_to_record(element: Value) -> Record {
    match element {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v))
            .collect(),
        scalar => vec![("0".to_string(), scalar)],
    }
}

/// Returns the column names known up front along with the records
///
/// Column-oriented layouts name their columns even when they hold no rows.
fn object_to_records(map: Map<String, Value>) -> Result<(Vec<String>, Vec<Record>), ParseError> {
    if map.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let columns: Vec<String> = map.keys().cloned().collect();

    if map.values().all(Value::is_object) {
        return Ok((columns, index_columns_to_records(map)));
    }

    if map.values().all(Value::is_array) {
        return Ok((columns, list_columns_to_records(map)?));
    }

    Ok((Vec::new(), vec![map.into_iter().collect()]))
}

/// `{"col": {"idx": value}}`, rows ordered by first-seen index
fn index_columns_to_records(map: Map<String, Value>) -> Vec<Record> {
    let mut index: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<Record> = Vec::new();

    for (column, values) in map {
        let Value::Object(values) = values else {
            continue;
        };
        for (key, value) in values {
            let row = *positions.entry(key.clone()).or_insert_with(|| {
                index.push(key.clone());
                records.push(Vec::new());
                index.len() - 1
            });
            records[row].push((column.clone(), value));
        }
    }

    records
}

/// `{"col": [v0, v1, ...]}`, all lists of equal length
fn list_columns_to_records(map: Map<String, Value>) -> Result<Vec<Record>, ParseError> {
    let mut expected: Option<(String, usize)> = None;
    let mut records: Vec<Record> = Vec::new();

    for (column, values) in map {
        let Value::Array(values) = values else {
            continue;
        };

        match &expected {
            None => {
                records = (0..values.len()).map(|_| Vec::new()).collect();
                expected = Some((column.clone(), values.len()));
            }
            Some((first, len)) if *len != values.len() => {
                return Err(ParseError::Shape(format!(
                    "column '{}' has {} values but column '{}' has {}",
                    column,
                    values.len(),
                    first,
                    len
                )));
            }
            Some(_) => {}
        }

        for (row, value) in values.into_iter().enumerate() {
            records[row].push((column.clone(), value));
        }
    }

    Ok(records)
}

/// Columns are `known` followed by any other record keys in first-seen order
fn records_to_rows(known: Vec<String>, records: Vec<Record>) -> Result<TableRows, ParseError> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for key in known {
        if !positions.contains_key(&key) {
            positions.insert(key.clone(), columns.len());
            columns.push(key);
        }
    }

    for record in &records {
        for (key, _) in record {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
    }

    if columns.is_empty() {
        return Err(ParseError::Shape("JSON input contains no columns".to_string()));
    }

    let width = columns.len();
    let mut table = TableRows::new(columns);
    for record in records {
        let mut row = vec![Cell::Null; width];
        for (key, value) in record {
            row[positions[&key]] = value_to_cell(value);
        }
        table.push_row(row)?;
    }

    Ok(table)
}

fn value_to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map_or(Cell::Null, Cell::Float),
        },
        Value::String(s) => Cell::Text(s),
        nested => Cell::Text(nested.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
