//! Row-keyed table with named columns.
//!
//! This is the pipeline's input and output shape. Rows keep the key they
//! arrived with, so dropping placeholder rows never renumbers the survivors.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{CellValue, Row, RowKey};

static NULL_CELL: CellValue = CellValue::Null;

/// A table of rows keyed by their original index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in order of first appearance.
    columns: Vec<String>,
    /// Rows keyed by original row index.
    rows: BTreeMap<RowKey, Row>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for column in columns {
            table.ensure_column(column.into());
        }
        table
    }

    /// Build a table from positional rows. Row keys are the positions.
    ///
    /// Rows shorter than the column list read as missing in the trailing
    /// columns; rows longer than it are a shape error.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for (idx, values) in rows.into_iter().enumerate() {
            if values.len() > table.columns.len() {
                return Err(Error::input_shape(format!(
                    "row {} has {} values but the table has {} columns",
                    idx,
                    values.len(),
                    table.columns.len()
                )));
            }
            let row: Row = table.columns.iter().cloned().zip(values).collect();
            table.rows.insert(idx as RowKey, row);
        }
        Ok(table)
    }

    /// Parse a table from JSON.
    ///
    /// Accepts an object of row objects keyed by non-negative integers
    /// (`{"0": {"price": "1.5"}}`) or an array of row objects, where the
    /// array position becomes the row key.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Build a table from an already parsed JSON value.
    pub fn from_json_value(value: Value) -> Result<Self> {
        let keyed_rows: Vec<(RowKey, Value)> = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, row)| {
                    key.trim()
                        .parse::<RowKey>()
                        .map(|k| (k, row))
                        .map_err(|_| Error::input_shape(format!("row key '{}' is not a row index", key)))
                })
                .collect::<Result<_>>()?,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, row)| (idx as RowKey, row))
                .collect(),
            other => {
                return Err(Error::input_shape(format!(
                    "expected an object or array of rows, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut table = Self::default();
        for (key, row) in keyed_rows {
            let fields = match row {
                Value::Object(fields) => fields,
                other => {
                    return Err(Error::input_shape(format!(
                        "row {} is {}, not a mapping of named fields",
                        key,
                        json_kind(&other)
                    )))
                }
            };

            let mut cells = Row::new();
            for (column, raw) in fields {
                let cell: CellValue = serde_json::from_value(raw).map_err(|_| {
                    Error::input_shape(format!(
                        "row {} column '{}' holds a nested value that is not a cell",
                        key, column
                    ))
                })?;
                table.ensure_column(column.clone());
                cells.insert(column, cell);
            }

            if table.rows.insert(key, cells).is_some() {
                return Err(Error::input_shape(format!("duplicate row key {}", key)));
            }
        }
        Ok(table)
    }

    /// Serialize to the object-of-rows JSON form.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First column by position, if any.
    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// Does the table have this column?
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row keys in ascending order.
    pub fn row_keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.rows.keys().copied()
    }

    /// Iterate rows with their keys.
    pub fn rows(&self) -> impl Iterator<Item = (RowKey, &Row)> {
        self.rows.iter().map(|(k, r)| (*k, r))
    }

    /// Borrow a row.
    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.rows.get(&key)
    }

    /// Cell at (row, column). Absent cells read as missing.
    pub fn cell(&self, key: RowKey, column: &str) -> &CellValue {
        self.rows
            .get(&key)
            .and_then(|row| row.get(column))
            .unwrap_or(&NULL_CELL)
    }

    /// Insert or replace a row, registering any new columns.
    pub fn insert_row(&mut self, key: RowKey, row: Row) {
        for column in row.keys() {
            self.ensure_column(column.clone());
        }
        self.rows.insert(key, row);
    }

    /// Append a column, filling it from `values` by row key.
    ///
    /// Rows with no entry in `values` get a missing cell. An existing column
    /// of the same name is overwritten in place.
    pub fn set_column(&mut self, column: &str, mut values: BTreeMap<RowKey, CellValue>) {
        self.ensure_column(column.to_string());
        for (key, row) in self.rows.iter_mut() {
            let cell = values.remove(key).unwrap_or_default();
            row.insert(column.to_string(), cell);
        }
    }

    fn ensure_column(&mut self, column: String) {
        if !self.has_column(&column) {
            self.columns.push(column);
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (key, row) in &self.rows {
            let ordered: Vec<(&String, &CellValue)> = self
                .columns
                .iter()
                .map(|c| (c, row.get(c).unwrap_or(&NULL_CELL)))
                .collect();
            map.serialize_entry(&key.to_string(), &OrderedRow(ordered))?;
        }
        map.end()
    }
}

struct OrderedRow<'a>(Vec<(&'a String, &'a CellValue)>);

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().copied())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
